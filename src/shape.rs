//! Shapes - the nodes of the scene graph.
//!
//! Shapes never own each other directly. Every reference, including the end
//! points of a line, is a [`ShapeId`] into the [`crate::Document`] arena, so a
//! single point may be shared by any number of shapes.

use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable handle of a shape inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(Uuid);

impl ShapeId {
    /// Create a new unique shape id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a style in the style library
pub type StyleId = String;

/// Visual properties looked up by renderers through a [`StyleId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub stroke: Color32,
    pub fill: Color32,
    pub thickness: f32,
    pub is_stroked: bool,
    pub is_filled: bool,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke: Color32::BLACK,
            fill: Color32::TRANSPARENT,
            thickness: 2.0,
            is_stroked: true,
            is_filled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FillRule {
    #[default]
    EvenOdd,
    Nonzero,
}

/// The closed set of shape variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ShapeKind {
    Point {
        position: Pos2,
    },
    Line {
        start: ShapeId,
        end: ShapeId,
    },
    CubicBezier {
        start: ShapeId,
        point1: ShapeId,
        point2: ShapeId,
        point3: ShapeId,
    },
    QuadraticBezier {
        start: ShapeId,
        point1: ShapeId,
        point2: ShapeId,
    },
    Conic {
        start: ShapeId,
        point1: ShapeId,
        point2: ShapeId,
        weight: f32,
    },
    Rectangle {
        top_left: ShapeId,
        bottom_right: ShapeId,
        radius_x: f32,
        radius_y: f32,
    },
    Ellipse {
        top_left: ShapeId,
        bottom_right: ShapeId,
    },
    /// Circle through `point` around `center`
    Circle {
        center: ShapeId,
        point: ShapeId,
    },
    Text {
        top_left: ShapeId,
        bottom_right: ShapeId,
        text: String,
    },
    Figure {
        shapes: Vec<ShapeId>,
        is_closed: bool,
        is_filled: bool,
    },
    Path {
        figures: Vec<ShapeId>,
        fill_rule: FillRule,
    },
    /// Extra connection points of a group live in [`Shape::points`].
    Group {
        title: String,
        shapes: Vec<ShapeId>,
    },
    /// Placement of a shared group template; never mutates the template.
    Reference {
        title: String,
        template: ShapeId,
        offset: egui::Vec2,
    },
    /// Container of committed or in-progress shapes plus guide lines.
    Canvas {
        shapes: Vec<ShapeId>,
        guides: Vec<ShapeId>,
        width: f32,
        height: f32,
    },
}

impl ShapeKind {
    /// Short lowercase name of the variant
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Point { .. } => "point",
            ShapeKind::Line { .. } => "line",
            ShapeKind::CubicBezier { .. } => "cubic bezier",
            ShapeKind::QuadraticBezier { .. } => "quadratic bezier",
            ShapeKind::Conic { .. } => "conic",
            ShapeKind::Rectangle { .. } => "rectangle",
            ShapeKind::Ellipse { .. } => "ellipse",
            ShapeKind::Circle { .. } => "circle",
            ShapeKind::Text { .. } => "text",
            ShapeKind::Figure { .. } => "figure",
            ShapeKind::Path { .. } => "path",
            ShapeKind::Group { .. } => "group",
            ShapeKind::Reference { .. } => "reference",
            ShapeKind::Canvas { .. } => "canvas",
        }
    }

    /// Structural points (start, end, control and corner points) in drawing order.
    pub fn structural_points(&self) -> Vec<ShapeId> {
        match self {
            ShapeKind::Line { start, end } => vec![*start, *end],
            ShapeKind::CubicBezier { start, point1, point2, point3 } => {
                vec![*start, *point1, *point2, *point3]
            }
            ShapeKind::QuadraticBezier { start, point1, point2 }
            | ShapeKind::Conic { start, point1, point2, .. } => vec![*start, *point1, *point2],
            ShapeKind::Rectangle { top_left, bottom_right, .. }
            | ShapeKind::Ellipse { top_left, bottom_right }
            | ShapeKind::Text { top_left, bottom_right, .. } => vec![*top_left, *bottom_right],
            ShapeKind::Circle { center, point } => vec![*center, *point],
            ShapeKind::Point { .. }
            | ShapeKind::Figure { .. }
            | ShapeKind::Path { .. }
            | ShapeKind::Group { .. }
            | ShapeKind::Reference { .. }
            | ShapeKind::Canvas { .. } => Vec::new(),
        }
    }

    /// Child shapes held by composite variants.
    pub fn children(&self) -> &[ShapeId] {
        match self {
            ShapeKind::Figure { shapes, .. }
            | ShapeKind::Group { shapes, .. }
            | ShapeKind::Canvas { shapes, .. } => shapes,
            ShapeKind::Path { figures, .. } => figures,
            _ => &[],
        }
    }

    /// Replace every structural reference to `from` with `to`. Returns true if anything changed.
    pub fn replace_point(&mut self, from: ShapeId, to: ShapeId) -> bool {
        let mut changed = false;
        let mut swap = |slot: &mut ShapeId| {
            if *slot == from {
                *slot = to;
                changed = true;
            }
        };
        match self {
            ShapeKind::Line { start, end } => {
                swap(start);
                swap(end);
            }
            ShapeKind::CubicBezier { start, point1, point2, point3 } => {
                swap(start);
                swap(point1);
                swap(point2);
                swap(point3);
            }
            ShapeKind::QuadraticBezier { start, point1, point2 }
            | ShapeKind::Conic { start, point1, point2, .. } => {
                swap(start);
                swap(point1);
                swap(point2);
            }
            ShapeKind::Rectangle { top_left, bottom_right, .. }
            | ShapeKind::Ellipse { top_left, bottom_right }
            | ShapeKind::Text { top_left, bottom_right, .. } => {
                swap(top_left);
                swap(bottom_right);
            }
            ShapeKind::Circle { center, point } => {
                swap(center);
                swap(point);
            }
            _ => {}
        }
        changed
    }

    /// Rewrite every id this variant refers to through `map`.
    pub(crate) fn remap(&mut self, map: &mut impl FnMut(ShapeId) -> ShapeId) {
        match self {
            ShapeKind::Point { .. } => {}
            ShapeKind::Line { start, end } => {
                *start = map(*start);
                *end = map(*end);
            }
            ShapeKind::CubicBezier { start, point1, point2, point3 } => {
                *start = map(*start);
                *point1 = map(*point1);
                *point2 = map(*point2);
                *point3 = map(*point3);
            }
            ShapeKind::QuadraticBezier { start, point1, point2 }
            | ShapeKind::Conic { start, point1, point2, .. } => {
                *start = map(*start);
                *point1 = map(*point1);
                *point2 = map(*point2);
            }
            ShapeKind::Rectangle { top_left, bottom_right, .. }
            | ShapeKind::Ellipse { top_left, bottom_right }
            | ShapeKind::Text { top_left, bottom_right, .. } => {
                *top_left = map(*top_left);
                *bottom_right = map(*bottom_right);
            }
            ShapeKind::Circle { center, point } => {
                *center = map(*center);
                *point = map(*point);
            }
            ShapeKind::Figure { shapes, .. } | ShapeKind::Group { shapes, .. } => {
                shapes.iter_mut().for_each(|id| *id = map(*id));
            }
            ShapeKind::Path { figures, .. } => {
                figures.iter_mut().for_each(|id| *id = map(*id));
            }
            // Templates are shared, never copied along with a reference.
            ShapeKind::Reference { .. } => {}
            ShapeKind::Canvas { shapes, guides, .. } => {
                shapes.iter_mut().for_each(|id| *id = map(*id));
                guides.iter_mut().for_each(|id| *id = map(*id));
            }
        }
    }
}

/// A node of the scene graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    /// Style looked up in the style library; `None` uses the renderer default
    pub style: Option<StyleId>,
    /// Shape that created this point. Bookkeeping only, never used for lifetime.
    pub owner: Option<ShapeId>,
    /// Points the shape "contains" for deletion and iteration, besides its
    /// structural points. Groups keep their connection points here.
    pub points: Vec<ShapeId>,
    /// Set whenever geometry changes so renderers can drop cached output
    pub is_dirty: bool,
}

impl Shape {
    pub fn new(kind: ShapeKind, style: Option<StyleId>) -> Self {
        Self {
            id: ShapeId::new(),
            kind,
            style,
            owner: None,
            points: Vec::new(),
            is_dirty: true,
        }
    }

    pub fn point(position: Pos2, style: Option<StyleId>) -> Self {
        Self::new(ShapeKind::Point { position }, style)
    }

    pub fn is_point(&self) -> bool {
        matches!(self.kind, ShapeKind::Point { .. })
    }

    pub fn position(&self) -> Option<Pos2> {
        match self.kind {
            ShapeKind::Point { position } => Some(position),
            _ => None,
        }
    }

    /// Every point id this shape refers to directly, structural ones first.
    pub fn direct_points(&self) -> Vec<ShapeId> {
        let mut points = self.kind.structural_points();
        for id in &self.points {
            if !points.contains(id) {
                points.push(*id);
            }
        }
        points
    }
}

//! Intersections between a freshly drawn line and the committed scene.
//!
//! `find` creates a point shape for every crossing, shows it in the working
//! canvas and selects it. The line tools refresh the markers on every pointer
//! event and split the new line at the points found on commit. `clear` takes
//! the markers out of the working canvas again. The
//! point shapes themselves stay in the arena because a split line may now
//! refer to them.

use egui::Pos2;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::context::ToolContext;
use crate::document::Document;
use crate::geometry::cmp_points;
use crate::shape::{ShapeId, ShapeKind};

mod ellipse;
mod line;
mod rectangle;

pub use ellipse::EllipseLineIntersection;
pub use line::LineLineIntersection;
pub use rectangle::RectangleLineIntersection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntersectionSettings {
    pub is_enabled: bool,
}

impl Default for IntersectionSettings {
    fn default() -> Self {
        Self { is_enabled: true }
    }
}

pub trait PointIntersection {
    fn title(&self) -> &'static str;

    fn is_enabled(&self) -> bool;

    /// Points found by the last `find`
    fn intersections(&self) -> &[ShapeId];

    /// Crossings of the segment `start`..`end` with one candidate shape
    fn crossings(&self, doc: &Document, candidate: ShapeId, start: Pos2, end: Pos2) -> Vec<Pos2>;

    /// Crossing points stored by `find`
    fn found_mut(&mut self) -> &mut Found;

    /// Intersect `line` with every eligible shape of the current container.
    fn find(&mut self, ctx: &mut dyn ToolContext, line: ShapeId) {
        if !self.is_enabled() {
            return;
        }
        let positions = ctx.document().structural_positions(line);
        let [start, end] = positions.as_slice() else {
            return;
        };
        let (start, end) = (*start, *end);

        let current = ctx.current_container();
        let mut candidates = Vec::new();
        collect_candidates(ctx.document(), ctx.document().shapes_of(current), line, &mut candidates);
        let mut points: Vec<Pos2> = candidates
            .iter()
            .flat_map(|c| self.crossings(ctx.document(), *c, start, end))
            .collect();
        points.sort_by(cmp_points);
        points.dedup();
        if points.is_empty() {
            return;
        }

        debug!("{}: {} crossing(s)", self.title(), points.len());
        let working = ctx.working_container();
        let style = ctx.point_style();
        for p in points {
            let doc = ctx.document_mut();
            let id = doc.add_point(p, style.clone(), None);
            // Markers only show on canvases; figure contexts do not get them.
            if doc.canvas_size(working).is_some() {
                if let Err(err) = doc.add_shape(working, id) {
                    warn!("{}: marker not shown: {err}", self.title());
                }
            }
            ctx.selection_mut().select(id);
            self.found_mut().push(working, id);
        }
    }

    fn clear(&mut self, ctx: &mut dyn ToolContext) {
        let found = self.found_mut();
        let Some(container) = found.container.take() else {
            return;
        };
        for id in found.points.drain(..) {
            ctx.document_mut().remove_shape(container, id);
            ctx.selection_mut().deselect(id);
        }
    }
}

/// Bookkeeping shared by the intersection kinds.
#[derive(Debug, Clone, Default)]
pub struct Found {
    container: Option<ShapeId>,
    points: Vec<ShapeId>,
}

impl Found {
    fn push(&mut self, container: ShapeId, id: ShapeId) {
        self.container = Some(container);
        self.points.push(id);
    }

    pub fn points(&self) -> &[ShapeId] {
        &self.points
    }
}

/// Leaf shapes of the scene, looking into figures, paths and groups.
fn collect_candidates(doc: &Document, ids: &[ShapeId], exclude: ShapeId, out: &mut Vec<ShapeId>) {
    for id in ids {
        if *id == exclude {
            continue;
        }
        match doc.kind(*id) {
            Some(ShapeKind::Figure { shapes, .. } | ShapeKind::Group { shapes, .. }) => {
                collect_candidates(doc, shapes, exclude, out);
            }
            Some(ShapeKind::Path { figures, .. }) => collect_candidates(doc, figures, exclude, out),
            Some(_) => out.push(*id),
            None => {}
        }
    }
}

/// All available intersection kinds, dispatched by match.
#[derive(Debug, Clone)]
pub enum PointIntersectionType {
    Line(LineLineIntersection),
    Rectangle(RectangleLineIntersection),
    Ellipse(EllipseLineIntersection),
}

impl PointIntersection for PointIntersectionType {
    fn title(&self) -> &'static str {
        match self {
            Self::Line(i) => i.title(),
            Self::Rectangle(i) => i.title(),
            Self::Ellipse(i) => i.title(),
        }
    }

    fn is_enabled(&self) -> bool {
        match self {
            Self::Line(i) => i.is_enabled(),
            Self::Rectangle(i) => i.is_enabled(),
            Self::Ellipse(i) => i.is_enabled(),
        }
    }

    fn intersections(&self) -> &[ShapeId] {
        match self {
            Self::Line(i) => i.intersections(),
            Self::Rectangle(i) => i.intersections(),
            Self::Ellipse(i) => i.intersections(),
        }
    }

    fn crossings(&self, doc: &Document, candidate: ShapeId, start: Pos2, end: Pos2) -> Vec<Pos2> {
        match self {
            Self::Line(i) => i.crossings(doc, candidate, start, end),
            Self::Rectangle(i) => i.crossings(doc, candidate, start, end),
            Self::Ellipse(i) => i.crossings(doc, candidate, start, end),
        }
    }

    fn found_mut(&mut self) -> &mut Found {
        match self {
            Self::Line(i) => i.found_mut(),
            Self::Rectangle(i) => i.found_mut(),
            Self::Ellipse(i) => i.found_mut(),
        }
    }
}

/// Line, rectangle and ellipse intersections, all enabled.
pub fn default_intersections() -> Vec<PointIntersectionType> {
    vec![
        PointIntersectionType::Line(LineLineIntersection::default()),
        PointIntersectionType::Rectangle(RectangleLineIntersection::default()),
        PointIntersectionType::Ellipse(EllipseLineIntersection::default()),
    ]
}

pub fn find_all(intersections: &mut [PointIntersectionType], ctx: &mut dyn ToolContext, line: ShapeId) {
    for intersection in intersections.iter_mut() {
        intersection.find(ctx, line);
    }
}

pub fn clear_all(intersections: &mut [PointIntersectionType], ctx: &mut dyn ToolContext) {
    for intersection in intersections.iter_mut() {
        intersection.clear(ctx);
    }
}

/// Every intersection point currently found, in discovery order.
pub fn found_points(intersections: &[PointIntersectionType]) -> Vec<ShapeId> {
    intersections
        .iter()
        .flat_map(|i| i.intersections().iter().copied())
        .collect()
}

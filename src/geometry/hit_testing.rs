//! Hit testing: screen queries to topmost point or shape.
//!
//! Every shape variant has a point strategy, a contains strategy and an
//! overlap strategy, selected by an exhaustive match. Radii are given in
//! screen pixels and divided by the view scale, so hit tests stay pixel
//! accurate at any zoom.

use egui::{Modifiers, Pos2, Rect};
use kurbo::{CubicBez, ParamCurve, ParamCurveNearest, QuadBez};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::geometry::{distance_to_line_segment, flatten_conic, segment_intersects_rect};
use crate::input::is_held;
use crate::shape::{ShapeId, ShapeKind};

/// Radius used when no tool setting overrides it
pub const DEFAULT_HIT_RADIUS: f32 = 7.0;

/// Segments used to flatten curves for overlap and conic distance tests
const CURVE_SEGMENTS: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitTestSettings {
    /// Held while clicking a group or path to hit the member shape instead
    pub drill_down_modifier: Modifiers,
    /// Accuracy passed to the nearest-point solver for Bézier curves
    pub curve_accuracy: f64,
}

impl Default for HitTestSettings {
    fn default() -> Self {
        Self {
            drill_down_modifier: Modifiers::ALT,
            curve_accuracy: 1e-3,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HitTest {
    pub settings: HitTestSettings,
}

impl HitTest {
    pub fn new(settings: HitTestSettings) -> Self {
        Self { settings }
    }

    /// Topmost point within `radius` of `target`, skipping `excluding`.
    ///
    /// `shapes` are searched back to front: later shapes are on top.
    #[allow(clippy::too_many_arguments)]
    pub fn try_to_get_point(
        &self,
        doc: &Document,
        shapes: &[ShapeId],
        target: Pos2,
        radius: f32,
        scale: f32,
        _modifier: Modifiers,
        excluding: Option<ShapeId>,
    ) -> Option<ShapeId> {
        let radius = scaled(radius, scale);
        shapes
            .iter()
            .rev()
            .find_map(|id| self.point_in(doc, *id, target, radius, excluding))
    }

    /// Closest point within `radius` of `target`, skipping `excluding`.
    /// Ties go to the shape found first.
    pub fn nearest_point(
        &self,
        doc: &Document,
        shapes: &[ShapeId],
        target: Pos2,
        radius: f32,
        scale: f32,
        excluding: Option<ShapeId>,
    ) -> Option<ShapeId> {
        let radius = scaled(radius, scale);
        shapes
            .iter()
            .flat_map(|id| doc.points_of(*id))
            .filter(|p| Some(*p) != excluding)
            .filter_map(|p| doc.position(p).map(|pos| (p, pos.distance(target))))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p)
    }

    /// Topmost shape containing `target`.
    pub fn try_to_get_shape(
        &self,
        doc: &Document,
        shapes: &[ShapeId],
        target: Pos2,
        radius: f32,
        scale: f32,
        modifier: Modifiers,
    ) -> Option<ShapeId> {
        let radius = scaled(radius, scale);
        let drill = is_held(modifier, self.settings.drill_down_modifier);
        shapes
            .iter()
            .rev()
            .find_map(|id| self.contains(doc, *id, target, radius, drill))
    }

    /// All shapes touching `rect`, topmost first. `None` when nothing matches.
    pub fn try_to_get_shapes(
        &self,
        doc: &Document,
        shapes: &[ShapeId],
        rect: Rect,
        radius: f32,
        scale: f32,
        _modifier: Modifiers,
    ) -> Option<Vec<ShapeId>> {
        let rect = rect.expand(scaled(radius, scale));
        let found: Vec<ShapeId> = shapes
            .iter()
            .rev()
            .filter(|id| self.overlaps(doc, **id, rect))
            .copied()
            .collect();
        (!found.is_empty()).then_some(found)
    }

    fn point_in(
        &self,
        doc: &Document,
        id: ShapeId,
        target: Pos2,
        radius: f32,
        excluding: Option<ShapeId>,
    ) -> Option<ShapeId> {
        let shape = doc.get(id)?;
        match &shape.kind {
            ShapeKind::Point { position } => {
                (Some(id) != excluding && position.distance(target) <= radius).then_some(id)
            }
            ShapeKind::Line { .. }
            | ShapeKind::CubicBezier { .. }
            | ShapeKind::QuadraticBezier { .. }
            | ShapeKind::Conic { .. }
            | ShapeKind::Rectangle { .. }
            | ShapeKind::Ellipse { .. }
            | ShapeKind::Circle { .. }
            | ShapeKind::Text { .. } => shape
                .direct_points()
                .into_iter()
                .find_map(|p| self.point_in(doc, p, target, radius, excluding)),
            ShapeKind::Figure { .. }
            | ShapeKind::Path { .. }
            | ShapeKind::Group { .. }
            | ShapeKind::Canvas { .. } => shape
                .points
                .iter()
                .chain(shape.kind.children().iter().rev())
                .find_map(|child| self.point_in(doc, *child, target, radius, excluding)),
            // Template points are shared and not editable through a placement.
            ShapeKind::Reference { .. } => None,
        }
    }

    fn contains(&self, doc: &Document, id: ShapeId, target: Pos2, radius: f32, drill: bool) -> Option<ShapeId> {
        let shape = doc.get(id)?;
        let hit = match &shape.kind {
            ShapeKind::Point { position } => position.distance(target) <= radius,
            ShapeKind::Line { start, end } => {
                let (Some(a), Some(b)) = (doc.position(*start), doc.position(*end)) else {
                    return None;
                };
                distance_to_line_segment(target, a, b) <= radius
            }
            ShapeKind::CubicBezier { .. } => {
                let [p0, p1, p2, p3] = positions::<4>(doc, id)?;
                let curve = CubicBez::new(to_kurbo(p0), to_kurbo(p1), to_kurbo(p2), to_kurbo(p3));
                let nearest = curve.nearest(to_kurbo(target), self.settings.curve_accuracy);
                nearest.distance_sq.sqrt() <= f64::from(radius)
            }
            ShapeKind::QuadraticBezier { .. } => {
                let [p0, p1, p2] = positions::<3>(doc, id)?;
                let curve = QuadBez::new(to_kurbo(p0), to_kurbo(p1), to_kurbo(p2));
                let nearest = curve.nearest(to_kurbo(target), self.settings.curve_accuracy);
                nearest.distance_sq.sqrt() <= f64::from(radius)
            }
            ShapeKind::Conic { weight, .. } => {
                let [p0, p1, p2] = positions::<3>(doc, id)?;
                flatten_conic(p0, p1, p2, *weight, CURVE_SEGMENTS)
                    .windows(2)
                    .any(|w| distance_to_line_segment(target, w[0], w[1]) <= radius)
            }
            ShapeKind::Rectangle { .. } | ShapeKind::Text { .. } => {
                let [a, b] = positions::<2>(doc, id)?;
                Rect::from_two_pos(a, b).expand(radius).contains(target)
            }
            ShapeKind::Ellipse { .. } => {
                let [a, b] = positions::<2>(doc, id)?;
                ellipse_contains(Rect::from_two_pos(a, b).expand(radius), target)
            }
            ShapeKind::Circle { center, point } => {
                let (Some(c), Some(p)) = (doc.position(*center), doc.position(*point)) else {
                    return None;
                };
                c.distance(target) <= c.distance(p) + radius
            }
            ShapeKind::Figure { .. } | ShapeKind::Path { .. } | ShapeKind::Group { .. } => {
                let inner = shape
                    .kind
                    .children()
                    .iter()
                    .rev()
                    .chain(shape.points.iter())
                    .find_map(|child| self.contains(doc, *child, target, radius, drill))?;
                return Some(if drill { inner } else { id });
            }
            ShapeKind::Reference { template, offset, .. } => {
                self.contains(doc, *template, target - *offset, radius, false).is_some()
            }
            ShapeKind::Canvas { .. } => {
                return shape
                    .kind
                    .children()
                    .iter()
                    .rev()
                    .find_map(|child| self.contains(doc, *child, target, radius, drill));
            }
        };
        hit.then_some(id)
    }

    fn overlaps(&self, doc: &Document, id: ShapeId, rect: Rect) -> bool {
        let Some(shape) = doc.get(id) else {
            return false;
        };
        match &shape.kind {
            ShapeKind::Point { position } => rect.contains(*position),
            ShapeKind::Line { start, end } => match (doc.position(*start), doc.position(*end)) {
                (Some(a), Some(b)) => segment_intersects_rect(a, b, rect),
                _ => false,
            },
            ShapeKind::CubicBezier { .. } => positions::<4>(doc, id).is_some_and(|[p0, p1, p2, p3]| {
                let curve = CubicBez::new(to_kurbo(p0), to_kurbo(p1), to_kurbo(p2), to_kurbo(p3));
                polyline_overlaps(&sample(&curve), rect)
            }),
            ShapeKind::QuadraticBezier { .. } => positions::<3>(doc, id).is_some_and(|[p0, p1, p2]| {
                let curve = QuadBez::new(to_kurbo(p0), to_kurbo(p1), to_kurbo(p2));
                polyline_overlaps(&sample(&curve), rect)
            }),
            ShapeKind::Conic { weight, .. } => positions::<3>(doc, id).is_some_and(|[p0, p1, p2]| {
                polyline_overlaps(&flatten_conic(p0, p1, p2, *weight, CURVE_SEGMENTS), rect)
            }),
            ShapeKind::Rectangle { .. }
            | ShapeKind::Text { .. }
            | ShapeKind::Ellipse { .. }
            | ShapeKind::Circle { .. } => doc.bounds(id).is_some_and(|b| b.intersects(rect)),
            ShapeKind::Figure { .. }
            | ShapeKind::Path { .. }
            | ShapeKind::Group { .. }
            | ShapeKind::Canvas { .. } => shape
                .kind
                .children()
                .iter()
                .chain(shape.points.iter())
                .any(|child| self.overlaps(doc, *child, rect)),
            ShapeKind::Reference { template, offset, .. } => self.overlaps(doc, *template, rect.translate(-*offset)),
        }
    }
}

fn scaled(radius: f32, scale: f32) -> f32 {
    if scale > 0.0 { radius / scale } else { radius }
}

fn to_kurbo(p: Pos2) -> kurbo::Point {
    kurbo::Point::new(p.x as f64, p.y as f64)
}

/// Structural point positions of a shape as a fixed-size array.
fn positions<const N: usize>(doc: &Document, id: ShapeId) -> Option<[Pos2; N]> {
    doc.structural_positions(id).try_into().ok()
}

fn sample(curve: &impl ParamCurve) -> Vec<Pos2> {
    (0..=CURVE_SEGMENTS)
        .map(|i| {
            let p = curve.eval(i as f64 / CURVE_SEGMENTS as f64);
            Pos2::new(p.x as f32, p.y as f32)
        })
        .collect()
}

fn polyline_overlaps(points: &[Pos2], rect: Rect) -> bool {
    points.windows(2).any(|w| segment_intersects_rect(w[0], w[1], rect))
}

fn ellipse_contains(rect: Rect, target: Pos2) -> bool {
    let rx = rect.width() / 2.0;
    let ry = rect.height() / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let d = target - rect.center();
    (d.x * d.x) / (rx * rx) + (d.y * d.y) / (ry * ry) <= 1.0
}

use egui::Pos2;

use super::{Found, IntersectionSettings, PointIntersection};
use crate::document::Document;
use crate::geometry::segment_intersection;
use crate::shape::{ShapeId, ShapeKind};

/// Crossings with committed lines.
#[derive(Debug, Clone, Default)]
pub struct LineLineIntersection {
    pub settings: IntersectionSettings,
    found: Found,
}

impl LineLineIntersection {
    pub fn new(settings: IntersectionSettings) -> Self {
        Self {
            settings,
            found: Found::default(),
        }
    }
}

impl PointIntersection for LineLineIntersection {
    fn title(&self) -> &'static str {
        "Line-Line"
    }

    fn is_enabled(&self) -> bool {
        self.settings.is_enabled
    }

    fn intersections(&self) -> &[ShapeId] {
        self.found.points()
    }

    fn crossings(&self, doc: &Document, candidate: ShapeId, start: Pos2, end: Pos2) -> Vec<Pos2> {
        if !matches!(doc.kind(candidate), Some(ShapeKind::Line { .. })) {
            return Vec::new();
        }
        match doc.structural_positions(candidate).as_slice() {
            [a, b] => segment_intersection(start, end, *a, *b).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    fn found_mut(&mut self) -> &mut Found {
        &mut self.found
    }
}

#[cfg(test)]
mod tests {
    use egui::pos2;

    use super::*;
    use crate::context::EditorContext;
    use crate::shape::Shape;

    fn add_line(ctx: &mut EditorContext, a: Pos2, b: Pos2) -> ShapeId {
        let doc = &mut ctx.document;
        let start = doc.add_point(a, None, None);
        let end = doc.add_point(b, None, None);
        let line = doc.insert(Shape::new(ShapeKind::Line { start, end }, None));
        doc.add_shape(ctx.current_container, line).unwrap();
        line
    }

    #[test]
    fn test_shared_crossing_gets_one_marker() {
        let mut ctx = EditorContext::new(400.0, 400.0);
        add_line(&mut ctx, pos2(200.0, 100.0), pos2(200.0, 300.0));
        add_line(&mut ctx, pos2(150.0, 100.0), pos2(150.0, 300.0));
        // Crosses the new line where the first one does.
        add_line(&mut ctx, pos2(100.0, 100.0), pos2(300.0, 300.0));

        let a = ctx.document.add_point(pos2(0.0, 200.0), None, None);
        let b = ctx.document.add_point(pos2(400.0, 200.0), None, None);
        let line = ctx.document.insert(Shape::new(ShapeKind::Line { start: a, end: b }, None));

        let mut intersection = LineLineIntersection::default();
        intersection.find(&mut ctx, line);
        let xs: Vec<f32> = intersection
            .intersections()
            .iter()
            .filter_map(|p| ctx.document.position(*p))
            .map(|p| p.x)
            .collect();
        assert_eq!(xs, vec![150.0, 200.0]);
        assert_eq!(ctx.document.shapes_of(ctx.working_container).len(), 2);
    }
}

use egui::Pos2;

use super::{Found, IntersectionSettings, PointIntersection};
use crate::document::Document;
use crate::geometry::ellipse_segment_intersections;
use crate::shape::{ShapeId, ShapeKind};

/// Crossings with committed ellipses and circles.
#[derive(Debug, Clone, Default)]
pub struct EllipseLineIntersection {
    pub settings: IntersectionSettings,
    found: Found,
}

impl EllipseLineIntersection {
    pub fn new(settings: IntersectionSettings) -> Self {
        Self {
            settings,
            found: Found::default(),
        }
    }
}

impl PointIntersection for EllipseLineIntersection {
    fn title(&self) -> &'static str {
        "Ellipse-Line"
    }

    fn is_enabled(&self) -> bool {
        self.settings.is_enabled
    }

    fn intersections(&self) -> &[ShapeId] {
        self.found.points()
    }

    fn crossings(&self, doc: &Document, candidate: ShapeId, start: Pos2, end: Pos2) -> Vec<Pos2> {
        match doc.kind(candidate) {
            Some(ShapeKind::Ellipse { .. } | ShapeKind::Circle { .. }) => doc
                .bounds(candidate)
                .map(|rect| ellipse_segment_intersections(rect, start, end))
                .unwrap_or_default(),
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

    #[test]
    fn test_line_through_circle_finds_two_points() {
        let mut ctx = EditorContext::new(400.0, 400.0);
        let doc = &mut ctx.document;
        let center = doc.add_point(pos2(100.0, 100.0), None, None);
        let rim = doc.add_point(pos2(150.0, 100.0), None, None);
        let circle = doc.insert(Shape::new(ShapeKind::Circle { center, point: rim }, None));
        doc.add_shape(ctx.current_container, circle).unwrap();

        let a = doc.add_point(pos2(0.0, 100.0), None, None);
        let b = doc.add_point(pos2(200.0, 100.0), None, None);
        let line = doc.insert(Shape::new(ShapeKind::Line { start: a, end: b }, None));

        let mut intersection = EllipseLineIntersection::default();
        intersection.find(&mut ctx, line);
        let found = intersection.intersections().to_vec();
        assert_eq!(found.len(), 2);
        let xs: Vec<f32> = found.iter().filter_map(|p| ctx.document.position(*p)).map(|p| p.x).collect();
        assert!((xs[0] - 50.0).abs() < 1e-3);
        assert!((xs[1] - 150.0).abs() < 1e-3);
        assert!(found.iter().all(|p| ctx.selection.is_selected(*p)));

        intersection.clear(&mut ctx);
        assert!(ctx.document.shapes_of(ctx.working_container).is_empty());
        assert!(ctx.selection.is_empty());
    }
}

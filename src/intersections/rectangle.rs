use egui::{Pos2, Rect};

use super::{Found, IntersectionSettings, PointIntersection};
use crate::document::Document;
use crate::geometry::rect_segment_intersections;
use crate::shape::{ShapeId, ShapeKind};

/// Crossings with the four edges of committed rectangles.
#[derive(Debug, Clone, Default)]
pub struct RectangleLineIntersection {
    pub settings: IntersectionSettings,
    found: Found,
}

impl RectangleLineIntersection {
    pub fn new(settings: IntersectionSettings) -> Self {
        Self {
            settings,
            found: Found::default(),
        }
    }
}

impl PointIntersection for RectangleLineIntersection {
    fn title(&self) -> &'static str {
        "Rectangle-Line"
    }

    fn is_enabled(&self) -> bool {
        self.settings.is_enabled
    }

    fn intersections(&self) -> &[ShapeId] {
        self.found.points()
    }

    fn crossings(&self, doc: &Document, candidate: ShapeId, start: Pos2, end: Pos2) -> Vec<Pos2> {
        if !matches!(doc.kind(candidate), Some(ShapeKind::Rectangle { .. })) {
            return Vec::new();
        }
        match doc.structural_positions(candidate).as_slice() {
            [a, b] => rect_segment_intersections(Rect::from_two_pos(*a, *b), start, end),
            _ => Vec::new(),
        }
    }

    fn found_mut(&mut self) -> &mut Found {
        &mut self.found
    }
}

use egui::{Pos2, pos2};
use serde::{Deserialize, Serialize};

use super::{GuideSet, PointFilter};
use crate::context::ToolContext;
use crate::document::Document;
use crate::geometry::{nearest_point_on_segment, segment_intersection};
use crate::shape::{ShapeId, ShapeKind, StyleId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineSnapSettings {
    pub is_enabled: bool,
    pub enable_guides: bool,
    /// Search the segments of committed shapes
    pub snap_to_shapes: bool,
    /// Search the guide lines of the current canvas
    pub snap_to_guides: bool,
    pub snap_to_points: bool,
    pub snap_to_middles: bool,
    pub snap_to_intersections: bool,
    pub snap_horizontal: bool,
    pub snap_vertical: bool,
    pub snap_to_nearest: bool,
    /// Screen distance in pixels
    pub threshold: f32,
    pub guide_style: Option<StyleId>,
}

impl Default for LineSnapSettings {
    fn default() -> Self {
        Self {
            is_enabled: true,
            enable_guides: false,
            snap_to_shapes: true,
            snap_to_guides: true,
            snap_to_points: true,
            snap_to_middles: true,
            snap_to_intersections: true,
            snap_horizontal: false,
            snap_vertical: false,
            snap_to_nearest: true,
            threshold: 10.0,
            guide_style: None,
        }
    }
}

/// Snaps to end points, middles, crossings and edges of existing segments.
#[derive(Debug, Clone, Default)]
pub struct LineSnapPointFilter {
    pub settings: LineSnapSettings,
    guides: GuideSet,
}

type Segment = (Pos2, Pos2);

impl LineSnapPointFilter {
    pub fn new(settings: LineSnapSettings) -> Self {
        Self {
            settings,
            guides: GuideSet::default(),
        }
    }

    fn collect_segments(doc: &Document, ids: &[ShapeId], out: &mut Vec<Segment>) {
        for id in ids {
            let Some(kind) = doc.kind(*id) else {
                continue;
            };
            match kind {
                ShapeKind::Line { .. } => {
                    if let [a, b] = doc.structural_positions(*id).as_slice() {
                        out.push((*a, *b));
                    }
                }
                ShapeKind::Rectangle { .. } => {
                    if let [a, b] = doc.structural_positions(*id).as_slice() {
                        let corners = [*a, pos2(b.x, a.y), *b, pos2(a.x, b.y)];
                        for i in 0..4 {
                            out.push((corners[i], corners[(i + 1) % 4]));
                        }
                    }
                }
                ShapeKind::Figure { shapes, .. } | ShapeKind::Group { shapes, .. } => {
                    Self::collect_segments(doc, shapes, out);
                }
                ShapeKind::Path { figures, .. } => Self::collect_segments(doc, figures, out),
                _ => {}
            }
        }
    }

    fn closest(target: Pos2, candidates: impl Iterator<Item = Pos2>, threshold: f32) -> Option<Pos2> {
        candidates
            .map(|p| (p, p.distance(target)))
            .filter(|(_, d)| *d <= threshold)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p)
    }

    fn snap(&self, segments: &[Segment], pos: &mut Pos2, threshold: f32) -> Option<SnapKind> {
        let s = &self.settings;
        let ends = || segments.iter().flat_map(|(a, b)| [*a, *b]);

        if s.snap_to_points {
            if let Some(p) = Self::closest(*pos, ends(), threshold) {
                *pos = p;
                return Some(SnapKind::Point);
            }
        }
        if s.snap_to_middles {
            let middles = segments.iter().map(|(a, b)| a.lerp(*b, 0.5));
            if let Some(p) = Self::closest(*pos, middles, threshold) {
                *pos = p;
                return Some(SnapKind::Point);
            }
        }
        if s.snap_to_intersections {
            let crossings = segments.iter().enumerate().flat_map(|(i, (a0, a1))| {
                segments[i + 1..]
                    .iter()
                    .filter_map(move |(b0, b1)| segment_intersection(*a0, *a1, *b0, *b1))
            });
            if let Some(p) = Self::closest(*pos, crossings, threshold) {
                *pos = p;
                return Some(SnapKind::Point);
            }
        }

        let mut aligned = None;
        if s.snap_horizontal {
            let y = pos.y;
            let found = ends()
                .filter(|p| (p.y - y).abs() <= threshold)
                .min_by(|a, b| (a.y - y).abs().total_cmp(&(b.y - y).abs()));
            if let Some(p) = found {
                pos.y = p.y;
                aligned = Some(SnapKind::Aligned { from: p });
            }
        }
        if s.snap_vertical {
            let x = pos.x;
            let found = ends()
                .filter(|p| (p.x - x).abs() <= threshold)
                .min_by(|a, b| (a.x - x).abs().total_cmp(&(b.x - x).abs()));
            if let Some(p) = found {
                pos.x = p.x;
                aligned = Some(SnapKind::Aligned { from: p });
            }
        }
        if aligned.is_some() {
            return aligned;
        }

        if s.snap_to_nearest {
            let target = *pos;
            let nearest = segments.iter().map(|(a, b)| nearest_point_on_segment(target, *a, *b));
            if let Some(p) = Self::closest(target, nearest, threshold) {
                *pos = p;
                return Some(SnapKind::Point);
            }
        }
        None
    }
}

enum SnapKind {
    Point,
    Aligned { from: Pos2 },
}

impl PointFilter for LineSnapPointFilter {
    fn title(&self) -> &'static str {
        "Line-Snap"
    }

    fn process(&mut self, ctx: &mut dyn ToolContext, pos: &mut Pos2) -> bool {
        if !self.settings.is_enabled {
            return false;
        }
        let current = ctx.current_container();
        let doc = ctx.document();
        let mut segments = Vec::new();
        if self.settings.snap_to_shapes {
            Self::collect_segments(doc, doc.shapes_of(current), &mut segments);
        }
        if self.settings.snap_to_guides {
            Self::collect_segments(doc, doc.guides_of(current), &mut segments);
        }
        if segments.is_empty() {
            return false;
        }

        let threshold = self.settings.threshold / ctx.view_scale().max(f32::EPSILON);
        let Some(kind) = self.snap(&segments, pos, threshold) else {
            return false;
        };

        if self.settings.enable_guides {
            let style = self.settings.guide_style.clone();
            match kind {
                SnapKind::Point => self.guides.add_cross(ctx, *pos, threshold, style),
                SnapKind::Aligned { from } => self.guides.add(ctx, from, *pos, style),
            }
        }
        true
    }

    fn clear(&mut self, ctx: &mut dyn ToolContext) {
        self.guides.clear(ctx);
    }
}

//! Point filters rewrite a pointer coordinate before a tool uses it.
//!
//! Filters run in registration order and the first one that claims the
//! point stops the chain. A filter may draw guide lines into the working
//! canvas; [`PointFilter::clear`] removes exactly those.

use egui::Pos2;
use log::trace;

use crate::context::ToolContext;
use crate::shape::{Shape, ShapeId, ShapeKind, StyleId};

mod grid_snap;
mod line_snap;

pub use grid_snap::{GridSnapMode, GridSnapPointFilter, GridSnapSettings};
pub use line_snap::{LineSnapPointFilter, LineSnapSettings};

pub trait PointFilter {
    fn title(&self) -> &'static str;

    /// Rewrite `pos` in place. Returns true if the filter claimed the point.
    fn process(&mut self, ctx: &mut dyn ToolContext, pos: &mut Pos2) -> bool;

    /// Remove the guides drawn by the last `process` call.
    fn clear(&mut self, ctx: &mut dyn ToolContext);
}

/// All available filters, dispatched by match.
#[derive(Debug, Clone)]
pub enum PointFilterType {
    Grid(GridSnapPointFilter),
    LineSnap(LineSnapPointFilter),
}

impl PointFilter for PointFilterType {
    fn title(&self) -> &'static str {
        match self {
            Self::Grid(filter) => filter.title(),
            Self::LineSnap(filter) => filter.title(),
        }
    }

    fn process(&mut self, ctx: &mut dyn ToolContext, pos: &mut Pos2) -> bool {
        match self {
            Self::Grid(filter) => filter.process(ctx, pos),
            Self::LineSnap(filter) => filter.process(ctx, pos),
        }
    }

    fn clear(&mut self, ctx: &mut dyn ToolContext) {
        match self {
            Self::Grid(filter) => filter.clear(ctx),
            Self::LineSnap(filter) => filter.clear(ctx),
        }
    }
}

/// The chain every drawing tool starts with: line snapping, then the grid.
pub fn default_filters() -> Vec<PointFilterType> {
    vec![
        PointFilterType::LineSnap(LineSnapPointFilter::default()),
        PointFilterType::Grid(GridSnapPointFilter::default()),
    ]
}

/// Clear old guides, then run filters until one claims `pos`.
pub fn process_all(filters: &mut [PointFilterType], ctx: &mut dyn ToolContext, pos: &mut Pos2) -> bool {
    clear_all(filters, ctx);
    let claimed = filters.iter_mut().any(|f| f.process(ctx, pos));
    if claimed {
        trace!("point filter moved pointer to {pos:?}");
    }
    claimed
}

pub fn clear_all(filters: &mut [PointFilterType], ctx: &mut dyn ToolContext) {
    for filter in filters.iter_mut() {
        filter.clear(ctx);
    }
}

/// Guide lines a filter added, and the canvas they were added to.
#[derive(Debug, Clone, Default)]
pub(crate) struct GuideSet {
    container: Option<ShapeId>,
    lines: Vec<ShapeId>,
}

impl GuideSet {
    /// Add a guide line from `a` to `b` to the working canvas.
    pub(crate) fn add(&mut self, ctx: &mut dyn ToolContext, a: Pos2, b: Pos2, style: Option<StyleId>) {
        let working = ctx.working_container();
        let doc = ctx.document_mut();
        if doc.canvas_size(working).is_none() {
            return;
        }
        let start = doc.add_point(a, style.clone(), None);
        let end = doc.add_point(b, style.clone(), None);
        let line = doc.insert(Shape::new(ShapeKind::Line { start, end }, style));
        doc.add_guide(working, line);
        self.container = Some(working);
        self.lines.push(line);
    }

    /// Crosshair through `center`.
    pub(crate) fn add_cross(&mut self, ctx: &mut dyn ToolContext, center: Pos2, half: f32, style: Option<StyleId>) {
        self.add(ctx, center - egui::vec2(half, 0.0), center + egui::vec2(half, 0.0), style.clone());
        self.add(ctx, center - egui::vec2(0.0, half), center + egui::vec2(0.0, half), style);
    }

    pub(crate) fn clear(&mut self, ctx: &mut dyn ToolContext) {
        let Some(container) = self.container.take() else {
            return;
        };
        let doc = ctx.document_mut();
        for line in self.lines.drain(..) {
            doc.remove_guide(container, line);
            if let Some(shape) = doc.remove(line) {
                for point in shape.kind.structural_points() {
                    doc.remove(point);
                }
            }
        }
    }
}

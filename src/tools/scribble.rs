use egui::{Modifiers, Pos2};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{Tool, ToolOutcome, create_shape, deselect_points, new_point};
use crate::context::ToolContext;
use crate::error::EditorResult;
use crate::filters::{self, PointFilterType};
use crate::geometry::simplify_indices;
use crate::shape::{FillRule, ShapeId, ShapeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScribbleToolState {
    #[default]
    None,
    Points,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScribbleToolSettings {
    /// Run Ramer-Douglas-Peucker over the stroke before committing
    pub simplify: bool,
    /// Distance below which a point is dropped by the simplification
    pub epsilon: f32,
    pub fill_rule: FillRule,
    pub is_closed: bool,
    pub is_filled: bool,
}

impl Default for ScribbleToolSettings {
    fn default() -> Self {
        Self {
            simplify: true,
            epsilon: 1.0,
            fill_rule: FillRule::EvenOdd,
            is_closed: false,
            is_filled: false,
        }
    }
}

/// Freehand drawing: one line segment per pointer move while the button is
/// held, collected in a single-figure path.
#[derive(Debug, Clone)]
pub struct ScribbleTool {
    pub settings: ScribbleToolSettings,
    pub filters: Vec<PointFilterType>,
    state: ScribbleToolState,
    path: Option<ShapeId>,
    figure: Option<ShapeId>,
    points: Vec<ShapeId>,
}

impl Default for ScribbleTool {
    fn default() -> Self {
        Self::new(ScribbleToolSettings::default(), filters::default_filters())
    }
}

impl ScribbleTool {
    pub fn new(settings: ScribbleToolSettings, filters: Vec<PointFilterType>) -> Self {
        Self {
            settings,
            filters,
            state: ScribbleToolState::None,
            path: None,
            figure: None,
            points: Vec::new(),
        }
    }

    pub fn state(&self) -> ScribbleToolState {
        self.state
    }

    pub fn path(&self) -> Option<ShapeId> {
        self.path
    }

    /// Rebuild the figure's segments through the points kept by simplification.
    fn simplify(&mut self, ctx: &mut dyn ToolContext, figure: ShapeId) -> EditorResult<()> {
        let positions: Vec<Pos2> = self.points.iter().filter_map(|p| ctx.document().position(*p)).collect();
        if positions.len() != self.points.len() || positions.len() < 3 {
            return Ok(());
        }
        let keep = simplify_indices(&positions, self.settings.epsilon);
        if keep.len() == self.points.len() {
            return Ok(());
        }

        let old_segments = ctx.document().shapes_of(figure).to_vec();
        let kept: Vec<ShapeId> = keep.iter().map(|i| self.points[*i]).collect();
        let doc = ctx.document_mut();
        for segment in &old_segments {
            doc.remove_shape(figure, *segment);
            doc.remove(*segment);
        }
        for point in self.points.iter().filter(|p| !kept.contains(p)) {
            doc.remove(*point);
        }
        for pair in kept.windows(2) {
            let line = create_shape(
                ctx,
                ShapeKind::Line {
                    start: pair[0],
                    end: pair[1],
                },
            );
            ctx.document_mut().add_shape(figure, line)?;
        }
        debug!("scribble simplified from {} to {} points", self.points.len(), kept.len());
        self.points = kept;
        Ok(())
    }

    fn reset(&mut self, ctx: &mut dyn ToolContext) {
        self.path = None;
        self.figure = None;
        self.points.clear();
        filters::clear_all(&mut self.filters, ctx);
        self.state = ScribbleToolState::None;
        ctx.release();
        ctx.redraw();
    }
}

impl Tool for ScribbleTool {
    fn name(&self) -> &'static str {
        "Scribble"
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            ScribbleToolState::None => "None",
            ScribbleToolState::Points => "Points",
        }
    }

    fn left_down(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, _modifier: Modifiers) -> EditorResult<ToolOutcome> {
        if self.state == ScribbleToolState::Points {
            return Ok(ToolOutcome::None);
        }
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);

        let start = new_point(ctx, pos);
        let figure = create_shape(
            ctx,
            ShapeKind::Figure {
                shapes: Vec::new(),
                is_closed: self.settings.is_closed,
                is_filled: self.settings.is_filled,
            },
        );
        let path = create_shape(
            ctx,
            ShapeKind::Path {
                figures: vec![figure],
                fill_rule: self.settings.fill_rule,
            },
        );
        let working = ctx.working_container();
        ctx.document_mut().add_shape(working, path)?;
        ctx.capture();

        self.points = vec![start];
        self.figure = Some(figure);
        self.path = Some(path);
        self.state = ScribbleToolState::Points;
        Ok(ToolOutcome::None)
    }

    fn left_up(&mut self, ctx: &mut dyn ToolContext, _pos: Pos2, _modifier: Modifiers) -> EditorResult<ToolOutcome> {
        if self.state != ScribbleToolState::Points {
            return Ok(ToolOutcome::None);
        }
        let (Some(path), Some(figure)) = (self.path, self.figure) else {
            self.reset(ctx);
            return Ok(ToolOutcome::None);
        };

        let working = ctx.working_container();
        ctx.document_mut().remove_shape(working, path);
        if self.settings.simplify {
            self.simplify(ctx, figure)?;
        }

        if ctx.document().shapes_of(figure).is_empty() {
            deselect_points(ctx, path);
            let doc = ctx.document_mut();
            doc.remove(path);
            doc.remove(figure);
            for point in &self.points {
                doc.remove(*point);
            }
            debug!("scribble discarded: no movement");
            self.reset(ctx);
            return Ok(ToolOutcome::Discarded("scribble has no segments"));
        }

        let current = ctx.current_container();
        ctx.document_mut().add_shape(current, path)?;
        debug!("scribble committed with {} points", self.points.len());
        self.reset(ctx);
        Ok(ToolOutcome::Committed(vec![path]))
    }

    fn right_down(&mut self, ctx: &mut dyn ToolContext, _pos: Pos2, _modifier: Modifiers) -> EditorResult<ToolOutcome> {
        if self.state == ScribbleToolState::None {
            return Ok(ToolOutcome::None);
        }
        self.clean(ctx);
        Ok(ToolOutcome::Cancelled)
    }

    fn move_pointer(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, _modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        let (ScribbleToolState::Points, Some(figure), Some(&last)) = (self.state, self.figure, self.points.last()) else {
            return Ok(ToolOutcome::None);
        };
        if ctx.document().position(last) == Some(pos) {
            return Ok(ToolOutcome::None);
        }
        let point = new_point(ctx, pos);
        let line = create_shape(ctx, ShapeKind::Line { start: last, end: point });
        ctx.document_mut().add_shape(figure, line)?;
        self.points.push(point);
        ctx.redraw();
        Ok(ToolOutcome::None)
    }

    fn clean(&mut self, ctx: &mut dyn ToolContext) {
        if let Some(path) = self.path {
            let working = ctx.working_container();
            ctx.document_mut().remove_shape(working, path);
            ctx.document_mut().remove(path);
        }
        self.reset(ctx);
    }
}

use egui::{Modifiers, Pos2};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    Tool, ToolOutcome, begin_shape, commit_shape, create_shape, discard_shape, hover_point, move_points, new_point,
    resolve_point, structural_points,
};
use crate::context::ToolContext;
use crate::error::EditorResult;
use crate::filters::{self, PointFilterType};
use crate::geometry::hit_testing::DEFAULT_HIT_RADIUS;
use crate::shape::{ShapeId, ShapeKind};

/// Clicks go start, end (`Point2`), then the control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuadraticBezierToolState {
    #[default]
    StartPoint,
    Point1,
    Point2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadraticBezierToolSettings {
    pub connect_points: bool,
    pub hit_threshold: f32,
}

impl Default for QuadraticBezierToolSettings {
    fn default() -> Self {
        Self {
            connect_points: true,
            hit_threshold: DEFAULT_HIT_RADIUS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuadraticBezierTool {
    pub settings: QuadraticBezierToolSettings,
    pub filters: Vec<PointFilterType>,
    state: QuadraticBezierToolState,
    curve: Option<ShapeId>,
}

impl Default for QuadraticBezierTool {
    fn default() -> Self {
        Self::new(QuadraticBezierToolSettings::default(), filters::default_filters())
    }
}

impl QuadraticBezierTool {
    pub fn new(settings: QuadraticBezierToolSettings, filters: Vec<PointFilterType>) -> Self {
        Self {
            settings,
            filters,
            state: QuadraticBezierToolState::StartPoint,
            curve: None,
        }
    }

    pub fn state(&self) -> QuadraticBezierToolState {
        self.state
    }

    pub fn curve(&self) -> Option<ShapeId> {
        self.curve
    }
}

impl Tool for QuadraticBezierTool {
    fn name(&self) -> &'static str {
        "QuadraticBezier"
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            QuadraticBezierToolState::StartPoint => "StartPoint",
            QuadraticBezierToolState::Point1 => "Point1",
            QuadraticBezierToolState::Point2 => "Point2",
        }
    }

    fn left_down(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        let s = self.settings.clone();

        let Some(curve) = self.curve else {
            let start = ctx.get_next_point(pos, s.connect_points, s.hit_threshold, modifier);
            let point1 = new_point(ctx, pos);
            let point2 = new_point(ctx, pos);
            let curve = create_shape(ctx, ShapeKind::QuadraticBezier { start, point1, point2 });
            begin_shape(ctx, curve)?;
            self.curve = Some(curve);
            self.state = QuadraticBezierToolState::Point2;
            return Ok(ToolOutcome::None);
        };

        let [_, point1, point2] = structural_points(ctx, curve)[..] else {
            self.clean(ctx);
            return Ok(ToolOutcome::None);
        };
        match self.state {
            QuadraticBezierToolState::StartPoint => Ok(ToolOutcome::None),
            QuadraticBezierToolState::Point2 => {
                resolve_point(ctx, curve, point2, pos, s.connect_points, s.hit_threshold, modifier);
                self.state = QuadraticBezierToolState::Point1;
                ctx.redraw();
                Ok(ToolOutcome::None)
            }
            QuadraticBezierToolState::Point1 => {
                move_points(ctx, &[point1], pos);
                commit_shape(ctx, curve)?;
                filters::clear_all(&mut self.filters, ctx);
                self.curve = None;
                self.state = QuadraticBezierToolState::StartPoint;
                debug!("quadratic bezier committed");
                Ok(ToolOutcome::Committed(vec![curve]))
            }
        }
    }

    fn right_down(&mut self, ctx: &mut dyn ToolContext, _pos: Pos2, _modifier: Modifiers) -> EditorResult<ToolOutcome> {
        if self.state == QuadraticBezierToolState::StartPoint {
            return Ok(ToolOutcome::None);
        }
        self.clean(ctx);
        Ok(ToolOutcome::Cancelled)
    }

    fn move_pointer(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        let Some(curve) = self.curve else {
            hover_point(ctx, pos, self.settings.connect_points, self.settings.hit_threshold, modifier);
            return Ok(ToolOutcome::None);
        };
        if let [_, point1, point2] = structural_points(ctx, curve)[..] {
            match self.state {
                QuadraticBezierToolState::StartPoint => {}
                QuadraticBezierToolState::Point2 => move_points(ctx, &[point1, point2], pos),
                QuadraticBezierToolState::Point1 => move_points(ctx, &[point1], pos),
            }
        }
        Ok(ToolOutcome::None)
    }

    fn clean(&mut self, ctx: &mut dyn ToolContext) {
        if let Some(curve) = self.curve.take() {
            discard_shape(ctx, curve);
        }
        ctx.release();
        filters::clear_all(&mut self.filters, ctx);
        self.state = QuadraticBezierToolState::StartPoint;
    }
}

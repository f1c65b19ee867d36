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

/// Clicks go start, end (`Point3`), then the two control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CubicBezierToolState {
    #[default]
    StartPoint,
    Point1,
    Point2,
    Point3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubicBezierToolSettings {
    pub connect_points: bool,
    pub hit_threshold: f32,
}

impl Default for CubicBezierToolSettings {
    fn default() -> Self {
        Self {
            connect_points: true,
            hit_threshold: DEFAULT_HIT_RADIUS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CubicBezierTool {
    pub settings: CubicBezierToolSettings,
    pub filters: Vec<PointFilterType>,
    state: CubicBezierToolState,
    curve: Option<ShapeId>,
}

impl Default for CubicBezierTool {
    fn default() -> Self {
        Self::new(CubicBezierToolSettings::default(), filters::default_filters())
    }
}

impl CubicBezierTool {
    pub fn new(settings: CubicBezierToolSettings, filters: Vec<PointFilterType>) -> Self {
        Self {
            settings,
            filters,
            state: CubicBezierToolState::StartPoint,
            curve: None,
        }
    }

    pub fn state(&self) -> CubicBezierToolState {
        self.state
    }

    pub fn curve(&self) -> Option<ShapeId> {
        self.curve
    }
}

impl Tool for CubicBezierTool {
    fn name(&self) -> &'static str {
        "CubicBezier"
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            CubicBezierToolState::StartPoint => "StartPoint",
            CubicBezierToolState::Point1 => "Point1",
            CubicBezierToolState::Point2 => "Point2",
            CubicBezierToolState::Point3 => "Point3",
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
            let point3 = new_point(ctx, pos);
            let curve = create_shape(
                ctx,
                ShapeKind::CubicBezier {
                    start,
                    point1,
                    point2,
                    point3,
                },
            );
            begin_shape(ctx, curve)?;
            self.curve = Some(curve);
            self.state = CubicBezierToolState::Point3;
            return Ok(ToolOutcome::None);
        };

        let [_, point1, point2, point3] = structural_points(ctx, curve)[..] else {
            self.clean(ctx);
            return Ok(ToolOutcome::None);
        };
        match self.state {
            CubicBezierToolState::StartPoint => Ok(ToolOutcome::None),
            CubicBezierToolState::Point3 => {
                resolve_point(ctx, curve, point3, pos, s.connect_points, s.hit_threshold, modifier);
                self.state = CubicBezierToolState::Point1;
                ctx.redraw();
                Ok(ToolOutcome::None)
            }
            CubicBezierToolState::Point1 => {
                move_points(ctx, &[point1], pos);
                self.state = CubicBezierToolState::Point2;
                Ok(ToolOutcome::None)
            }
            CubicBezierToolState::Point2 => {
                move_points(ctx, &[point2], pos);
                commit_shape(ctx, curve)?;
                filters::clear_all(&mut self.filters, ctx);
                self.curve = None;
                self.state = CubicBezierToolState::StartPoint;
                debug!("cubic bezier committed");
                Ok(ToolOutcome::Committed(vec![curve]))
            }
        }
    }

    fn right_down(&mut self, ctx: &mut dyn ToolContext, _pos: Pos2, _modifier: Modifiers) -> EditorResult<ToolOutcome> {
        if self.state == CubicBezierToolState::StartPoint {
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
        if let [_, point1, point2, point3] = structural_points(ctx, curve)[..] {
            match self.state {
                CubicBezierToolState::StartPoint => {}
                CubicBezierToolState::Point3 => move_points(ctx, &[point2, point3], pos),
                CubicBezierToolState::Point1 => move_points(ctx, &[point1], pos),
                CubicBezierToolState::Point2 => move_points(ctx, &[point2], pos),
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
        self.state = CubicBezierToolState::StartPoint;
    }
}

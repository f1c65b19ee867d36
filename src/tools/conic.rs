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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConicToolState {
    #[default]
    StartPoint,
    Point1,
    Point2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConicToolSettings {
    pub connect_points: bool,
    pub hit_threshold: f32,
    /// Weight of the control point given to new conics
    pub weight: f32,
}

impl Default for ConicToolSettings {
    fn default() -> Self {
        Self {
            connect_points: true,
            hit_threshold: DEFAULT_HIT_RADIUS,
            weight: 0.5,
        }
    }
}

/// Rational quadratic curve, drawn like a quadratic Bézier.
#[derive(Debug, Clone)]
pub struct ConicTool {
    pub settings: ConicToolSettings,
    pub filters: Vec<PointFilterType>,
    state: ConicToolState,
    conic: Option<ShapeId>,
}

impl Default for ConicTool {
    fn default() -> Self {
        Self::new(ConicToolSettings::default(), filters::default_filters())
    }
}

impl ConicTool {
    pub fn new(settings: ConicToolSettings, filters: Vec<PointFilterType>) -> Self {
        Self {
            settings,
            filters,
            state: ConicToolState::StartPoint,
            conic: None,
        }
    }

    pub fn state(&self) -> ConicToolState {
        self.state
    }

    pub fn conic(&self) -> Option<ShapeId> {
        self.conic
    }
}

impl Tool for ConicTool {
    fn name(&self) -> &'static str {
        "Conic"
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            ConicToolState::StartPoint => "StartPoint",
            ConicToolState::Point1 => "Point1",
            ConicToolState::Point2 => "Point2",
        }
    }

    fn left_down(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        let s = self.settings.clone();

        let Some(conic) = self.conic else {
            let start = ctx.get_next_point(pos, s.connect_points, s.hit_threshold, modifier);
            let point1 = new_point(ctx, pos);
            let point2 = new_point(ctx, pos);
            let conic = create_shape(
                ctx,
                ShapeKind::Conic {
                    start,
                    point1,
                    point2,
                    weight: s.weight,
                },
            );
            begin_shape(ctx, conic)?;
            self.conic = Some(conic);
            self.state = ConicToolState::Point2;
            return Ok(ToolOutcome::None);
        };

        let [_, point1, point2] = structural_points(ctx, conic)[..] else {
            self.clean(ctx);
            return Ok(ToolOutcome::None);
        };
        match self.state {
            ConicToolState::StartPoint => Ok(ToolOutcome::None),
            ConicToolState::Point2 => {
                resolve_point(ctx, conic, point2, pos, s.connect_points, s.hit_threshold, modifier);
                self.state = ConicToolState::Point1;
                ctx.redraw();
                Ok(ToolOutcome::None)
            }
            ConicToolState::Point1 => {
                move_points(ctx, &[point1], pos);
                commit_shape(ctx, conic)?;
                filters::clear_all(&mut self.filters, ctx);
                self.conic = None;
                self.state = ConicToolState::StartPoint;
                debug!("conic committed (weight {})", s.weight);
                Ok(ToolOutcome::Committed(vec![conic]))
            }
        }
    }

    fn right_down(&mut self, ctx: &mut dyn ToolContext, _pos: Pos2, _modifier: Modifiers) -> EditorResult<ToolOutcome> {
        if self.state == ConicToolState::StartPoint {
            return Ok(ToolOutcome::None);
        }
        self.clean(ctx);
        Ok(ToolOutcome::Cancelled)
    }

    fn move_pointer(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        let Some(conic) = self.conic else {
            hover_point(ctx, pos, self.settings.connect_points, self.settings.hit_threshold, modifier);
            return Ok(ToolOutcome::None);
        };
        if let [_, point1, point2] = structural_points(ctx, conic)[..] {
            match self.state {
                ConicToolState::StartPoint => {}
                ConicToolState::Point2 => move_points(ctx, &[point1, point2], pos),
                ConicToolState::Point1 => move_points(ctx, &[point1], pos),
            }
        }
        Ok(ToolOutcome::None)
    }

    fn clean(&mut self, ctx: &mut dyn ToolContext) {
        if let Some(conic) = self.conic.take() {
            discard_shape(ctx, conic);
        }
        ctx.release();
        filters::clear_all(&mut self.filters, ctx);
        self.state = ConicToolState::StartPoint;
    }
}

use egui::{Modifiers, Pos2};
use log::debug;
use serde::{Deserialize, Serialize};

use super::two_point::TwoPointGesture;
use super::{Tool, ToolOutcome, hover_point};
use crate::context::ToolContext;
use crate::error::EditorResult;
use crate::filters::{self, PointFilterType};
use crate::geometry::hit_testing::DEFAULT_HIT_RADIUS;
use crate::shape::{ShapeId, ShapeKind};

/// First click places the center, the second a point on the rim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CircleToolState {
    #[default]
    StartPoint,
    Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleToolSettings {
    pub connect_points: bool,
    pub hit_threshold: f32,
}

impl Default for CircleToolSettings {
    fn default() -> Self {
        Self {
            connect_points: true,
            hit_threshold: DEFAULT_HIT_RADIUS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircleTool {
    pub settings: CircleToolSettings,
    pub filters: Vec<PointFilterType>,
    state: CircleToolState,
    gesture: TwoPointGesture,
}

impl Default for CircleTool {
    fn default() -> Self {
        Self::new(CircleToolSettings::default(), filters::default_filters())
    }
}

impl CircleTool {
    pub fn new(settings: CircleToolSettings, filters: Vec<PointFilterType>) -> Self {
        Self {
            settings,
            filters,
            state: CircleToolState::StartPoint,
            gesture: TwoPointGesture::default(),
        }
    }

    pub fn state(&self) -> CircleToolState {
        self.state
    }

    pub fn circle(&self) -> Option<ShapeId> {
        self.gesture.shape()
    }
}

impl Tool for CircleTool {
    fn name(&self) -> &'static str {
        "Circle"
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            CircleToolState::StartPoint => "StartPoint",
            CircleToolState::Point => "Point",
        }
    }

    fn left_down(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        let hit = (self.settings.connect_points, self.settings.hit_threshold);
        match self.state {
            CircleToolState::StartPoint => {
                self.gesture
                    .begin(ctx, pos, modifier, hit, |center, point| ShapeKind::Circle { center, point })?;
                self.state = CircleToolState::Point;
                Ok(ToolOutcome::None)
            }
            CircleToolState::Point => {
                let committed = self.gesture.finish(ctx, pos, modifier, hit)?;
                filters::clear_all(&mut self.filters, ctx);
                self.state = CircleToolState::StartPoint;
                debug!("circle committed: {committed:?}");
                Ok(committed.map_or(ToolOutcome::None, |id| ToolOutcome::Committed(vec![id])))
            }
        }
    }

    fn right_down(&mut self, ctx: &mut dyn ToolContext, _pos: Pos2, _modifier: Modifiers) -> EditorResult<ToolOutcome> {
        if self.state == CircleToolState::StartPoint {
            return Ok(ToolOutcome::None);
        }
        self.clean(ctx);
        Ok(ToolOutcome::Cancelled)
    }

    fn move_pointer(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        match self.state {
            CircleToolState::StartPoint => {
                hover_point(ctx, pos, self.settings.connect_points, self.settings.hit_threshold, modifier);
            }
            CircleToolState::Point => self.gesture.follow(ctx, pos),
        }
        Ok(ToolOutcome::None)
    }

    fn clean(&mut self, ctx: &mut dyn ToolContext) {
        self.gesture.cancel(ctx);
        filters::clear_all(&mut self.filters, ctx);
        self.state = CircleToolState::StartPoint;
    }
}

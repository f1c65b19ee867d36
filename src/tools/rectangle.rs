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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RectangleToolState {
    #[default]
    StartPoint,
    BottomRight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectangleToolSettings {
    pub connect_points: bool,
    pub hit_threshold: f32,
    /// Corner radii given to new rectangles
    pub radius_x: f32,
    pub radius_y: f32,
}

impl Default for RectangleToolSettings {
    fn default() -> Self {
        Self {
            connect_points: true,
            hit_threshold: DEFAULT_HIT_RADIUS,
            radius_x: 0.0,
            radius_y: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RectangleTool {
    pub settings: RectangleToolSettings,
    pub filters: Vec<PointFilterType>,
    state: RectangleToolState,
    gesture: TwoPointGesture,
}

impl Default for RectangleTool {
    fn default() -> Self {
        Self::new(RectangleToolSettings::default(), filters::default_filters())
    }
}

impl RectangleTool {
    pub fn new(settings: RectangleToolSettings, filters: Vec<PointFilterType>) -> Self {
        Self {
            settings,
            filters,
            state: RectangleToolState::StartPoint,
            gesture: TwoPointGesture::default(),
        }
    }

    pub fn state(&self) -> RectangleToolState {
        self.state
    }

    pub fn rectangle(&self) -> Option<ShapeId> {
        self.gesture.shape()
    }
}

impl Tool for RectangleTool {
    fn name(&self) -> &'static str {
        "Rectangle"
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            RectangleToolState::StartPoint => "StartPoint",
            RectangleToolState::BottomRight => "BottomRight",
        }
    }

    fn left_down(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        let hit = (self.settings.connect_points, self.settings.hit_threshold);
        match self.state {
            RectangleToolState::StartPoint => {
                let (radius_x, radius_y) = (self.settings.radius_x, self.settings.radius_y);
                self.gesture.begin(ctx, pos, modifier, hit, |top_left, bottom_right| ShapeKind::Rectangle {
                    top_left,
                    bottom_right,
                    radius_x,
                    radius_y,
                })?;
                self.state = RectangleToolState::BottomRight;
                Ok(ToolOutcome::None)
            }
            RectangleToolState::BottomRight => {
                let committed = self.gesture.finish(ctx, pos, modifier, hit)?;
                filters::clear_all(&mut self.filters, ctx);
                self.state = RectangleToolState::StartPoint;
                debug!("rectangle committed: {committed:?}");
                Ok(committed.map_or(ToolOutcome::None, |id| ToolOutcome::Committed(vec![id])))
            }
        }
    }

    fn right_down(&mut self, ctx: &mut dyn ToolContext, _pos: Pos2, _modifier: Modifiers) -> EditorResult<ToolOutcome> {
        if self.state == RectangleToolState::StartPoint {
            return Ok(ToolOutcome::None);
        }
        self.clean(ctx);
        Ok(ToolOutcome::Cancelled)
    }

    fn move_pointer(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        match self.state {
            RectangleToolState::StartPoint => {
                hover_point(ctx, pos, self.settings.connect_points, self.settings.hit_threshold, modifier);
            }
            RectangleToolState::BottomRight => self.gesture.follow(ctx, pos),
        }
        Ok(ToolOutcome::None)
    }

    fn clean(&mut self, ctx: &mut dyn ToolContext) {
        self.gesture.cancel(ctx);
        filters::clear_all(&mut self.filters, ctx);
        self.state = RectangleToolState::StartPoint;
    }
}

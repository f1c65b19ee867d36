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
pub enum EllipseToolState {
    #[default]
    StartPoint,
    BottomRight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EllipseToolSettings {
    pub connect_points: bool,
    pub hit_threshold: f32,
}

impl Default for EllipseToolSettings {
    fn default() -> Self {
        Self {
            connect_points: true,
            hit_threshold: DEFAULT_HIT_RADIUS,
        }
    }
}

/// Ellipse inscribed in the box spanned by two clicks.
#[derive(Debug, Clone)]
pub struct EllipseTool {
    pub settings: EllipseToolSettings,
    pub filters: Vec<PointFilterType>,
    state: EllipseToolState,
    gesture: TwoPointGesture,
}

impl Default for EllipseTool {
    fn default() -> Self {
        Self::new(EllipseToolSettings::default(), filters::default_filters())
    }
}

impl EllipseTool {
    pub fn new(settings: EllipseToolSettings, filters: Vec<PointFilterType>) -> Self {
        Self {
            settings,
            filters,
            state: EllipseToolState::StartPoint,
            gesture: TwoPointGesture::default(),
        }
    }

    pub fn state(&self) -> EllipseToolState {
        self.state
    }

    pub fn ellipse(&self) -> Option<ShapeId> {
        self.gesture.shape()
    }
}

impl Tool for EllipseTool {
    fn name(&self) -> &'static str {
        "Ellipse"
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            EllipseToolState::StartPoint => "StartPoint",
            EllipseToolState::BottomRight => "BottomRight",
        }
    }

    fn left_down(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        let hit = (self.settings.connect_points, self.settings.hit_threshold);
        match self.state {
            EllipseToolState::StartPoint => {
                self.gesture.begin(ctx, pos, modifier, hit, |top_left, bottom_right| ShapeKind::Ellipse {
                    top_left,
                    bottom_right,
                })?;
                self.state = EllipseToolState::BottomRight;
                Ok(ToolOutcome::None)
            }
            EllipseToolState::BottomRight => {
                let committed = self.gesture.finish(ctx, pos, modifier, hit)?;
                filters::clear_all(&mut self.filters, ctx);
                self.state = EllipseToolState::StartPoint;
                debug!("ellipse committed: {committed:?}");
                Ok(committed.map_or(ToolOutcome::None, |id| ToolOutcome::Committed(vec![id])))
            }
        }
    }

    fn right_down(&mut self, ctx: &mut dyn ToolContext, _pos: Pos2, _modifier: Modifiers) -> EditorResult<ToolOutcome> {
        if self.state == EllipseToolState::StartPoint {
            return Ok(ToolOutcome::None);
        }
        self.clean(ctx);
        Ok(ToolOutcome::Cancelled)
    }

    fn move_pointer(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        match self.state {
            EllipseToolState::StartPoint => {
                hover_point(ctx, pos, self.settings.connect_points, self.settings.hit_threshold, modifier);
            }
            EllipseToolState::BottomRight => self.gesture.follow(ctx, pos),
        }
        Ok(ToolOutcome::None)
    }

    fn clean(&mut self, ctx: &mut dyn ToolContext) {
        self.gesture.cancel(ctx);
        filters::clear_all(&mut self.filters, ctx);
        self.state = EllipseToolState::StartPoint;
    }
}

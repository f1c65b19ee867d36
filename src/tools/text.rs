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
pub enum TextToolState {
    #[default]
    StartPoint,
    BottomRight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextToolSettings {
    pub connect_points: bool,
    pub hit_threshold: f32,
    /// Text placed in new boxes; editing happens outside the tool
    pub text: String,
}

impl Default for TextToolSettings {
    fn default() -> Self {
        Self {
            connect_points: true,
            hit_threshold: DEFAULT_HIT_RADIUS,
            text: "Text".to_string(),
        }
    }
}

/// Places a text box. Layout and shaping belong to the renderer.
#[derive(Debug, Clone)]
pub struct TextTool {
    pub settings: TextToolSettings,
    pub filters: Vec<PointFilterType>,
    state: TextToolState,
    gesture: TwoPointGesture,
}

impl Default for TextTool {
    fn default() -> Self {
        Self::new(TextToolSettings::default(), filters::default_filters())
    }
}

impl TextTool {
    pub fn new(settings: TextToolSettings, filters: Vec<PointFilterType>) -> Self {
        Self {
            settings,
            filters,
            state: TextToolState::StartPoint,
            gesture: TwoPointGesture::default(),
        }
    }

    pub fn state(&self) -> TextToolState {
        self.state
    }

    pub fn text(&self) -> Option<ShapeId> {
        self.gesture.shape()
    }
}

impl Tool for TextTool {
    fn name(&self) -> &'static str {
        "Text"
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            TextToolState::StartPoint => "StartPoint",
            TextToolState::BottomRight => "BottomRight",
        }
    }

    fn left_down(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        let hit = (self.settings.connect_points, self.settings.hit_threshold);
        match self.state {
            TextToolState::StartPoint => {
                let text = self.settings.text.clone();
                self.gesture.begin(ctx, pos, modifier, hit, |top_left, bottom_right| ShapeKind::Text {
                    top_left,
                    bottom_right,
                    text,
                })?;
                self.state = TextToolState::BottomRight;
                Ok(ToolOutcome::None)
            }
            TextToolState::BottomRight => {
                let committed = self.gesture.finish(ctx, pos, modifier, hit)?;
                filters::clear_all(&mut self.filters, ctx);
                self.state = TextToolState::StartPoint;
                debug!("text committed: {committed:?}");
                Ok(committed.map_or(ToolOutcome::None, |id| ToolOutcome::Committed(vec![id])))
            }
        }
    }

    fn right_down(&mut self, ctx: &mut dyn ToolContext, _pos: Pos2, _modifier: Modifiers) -> EditorResult<ToolOutcome> {
        if self.state == TextToolState::StartPoint {
            return Ok(ToolOutcome::None);
        }
        self.clean(ctx);
        Ok(ToolOutcome::Cancelled)
    }

    fn move_pointer(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        match self.state {
            TextToolState::StartPoint => {
                hover_point(ctx, pos, self.settings.connect_points, self.settings.hit_threshold, modifier);
            }
            TextToolState::BottomRight => self.gesture.follow(ctx, pos),
        }
        Ok(ToolOutcome::None)
    }

    fn clean(&mut self, ctx: &mut dyn ToolContext) {
        self.gesture.cancel(ctx);
        filters::clear_all(&mut self.filters, ctx);
        self.state = TextToolState::StartPoint;
    }
}

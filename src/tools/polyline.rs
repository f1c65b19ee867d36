use egui::{Modifiers, Pos2};
use log::debug;

use super::line::{commit_line, start_line, track_intersections};
use super::{LineToolSettings, Tool, ToolOutcome, discard_shape, hover_point, move_points, resolve_point, structural_points};
use crate::context::ToolContext;
use crate::error::EditorResult;
use crate::filters::{self, PointFilterType};
use crate::intersections::{self, PointIntersectionType};
use crate::shape::ShapeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolyLineToolState {
    #[default]
    StartPoint,
    Point,
}

/// Chained lines: every click commits a segment and starts the next one
/// from its end. A right click drops the pending segment.
#[derive(Debug, Clone)]
pub struct PolyLineTool {
    pub settings: LineToolSettings,
    pub filters: Vec<PointFilterType>,
    pub intersections: Vec<PointIntersectionType>,
    state: PolyLineToolState,
    line: Option<ShapeId>,
}

impl Default for PolyLineTool {
    fn default() -> Self {
        Self::new(
            LineToolSettings::default(),
            filters::default_filters(),
            intersections::default_intersections(),
        )
    }
}

impl PolyLineTool {
    pub fn new(
        settings: LineToolSettings,
        filters: Vec<PointFilterType>,
        intersections: Vec<PointIntersectionType>,
    ) -> Self {
        Self {
            settings,
            filters,
            intersections,
            state: PolyLineToolState::StartPoint,
            line: None,
        }
    }

    pub fn state(&self) -> PolyLineToolState {
        self.state
    }

    pub fn line(&self) -> Option<ShapeId> {
        self.line
    }
}

impl Tool for PolyLineTool {
    fn name(&self) -> &'static str {
        "PolyLine"
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            PolyLineToolState::StartPoint => "StartPoint",
            PolyLineToolState::Point => "Point",
        }
    }

    fn left_down(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        let s = self.settings.clone();
        match self.state {
            PolyLineToolState::StartPoint => {
                let start = ctx.get_next_point(pos, s.connect_points, s.hit_threshold, modifier);
                self.line = Some(start_line(ctx, start, pos)?);
                track_intersections(ctx, self.line, &mut self.intersections);
                self.state = PolyLineToolState::Point;
                Ok(ToolOutcome::None)
            }
            PolyLineToolState::Point => {
                let Some(line) = self.line.take() else {
                    self.clean(ctx);
                    return Ok(ToolOutcome::None);
                };
                let Some(&end) = structural_points(ctx, line).last() else {
                    self.clean(ctx);
                    return Ok(ToolOutcome::None);
                };
                let end = resolve_point(ctx, line, end, pos, s.connect_points, s.hit_threshold, modifier);
                let segments = commit_line(ctx, line, &mut self.intersections, s.split_intersections)?;

                // Continue from the point just placed.
                self.line = Some(start_line(ctx, end, pos)?);
                track_intersections(ctx, self.line, &mut self.intersections);
                debug!("polyline: {} segment(s) committed, continuing", segments.len());
                Ok(ToolOutcome::Committed(segments))
            }
        }
    }

    fn right_down(&mut self, ctx: &mut dyn ToolContext, _pos: Pos2, _modifier: Modifiers) -> EditorResult<ToolOutcome> {
        match self.state {
            PolyLineToolState::StartPoint => Ok(ToolOutcome::None),
            PolyLineToolState::Point => {
                self.clean(ctx);
                Ok(ToolOutcome::Cancelled)
            }
        }
    }

    fn move_pointer(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        match (self.state, self.line) {
            (PolyLineToolState::Point, Some(line)) => {
                if let Some(&end) = structural_points(ctx, line).last() {
                    move_points(ctx, &[end], pos);
                }
                track_intersections(ctx, Some(line), &mut self.intersections);
            }
            _ => hover_point(ctx, pos, self.settings.connect_points, self.settings.hit_threshold, modifier),
        }
        Ok(ToolOutcome::None)
    }

    fn clean(&mut self, ctx: &mut dyn ToolContext) {
        if let Some(line) = self.line.take() {
            discard_shape(ctx, line);
        }
        ctx.release();
        filters::clear_all(&mut self.filters, ctx);
        intersections::clear_all(&mut self.intersections, ctx);
        self.state = PolyLineToolState::StartPoint;
    }
}

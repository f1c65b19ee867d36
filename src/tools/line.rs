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
use crate::geometry::cmp_points;
use crate::geometry::hit_testing::DEFAULT_HIT_RADIUS;
use crate::intersections::{self, PointIntersectionType};
use crate::shape::{ShapeId, ShapeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineToolState {
    #[default]
    StartPoint,
    Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineToolSettings {
    /// Reuse existing points under the pointer for the end points
    pub connect_points: bool,
    pub hit_threshold: f32,
    /// Replace a committed line by its pieces between intersections
    pub split_intersections: bool,
}

impl Default for LineToolSettings {
    fn default() -> Self {
        Self {
            connect_points: true,
            hit_threshold: DEFAULT_HIT_RADIUS,
            split_intersections: false,
        }
    }
}

/// Two clicks: start point, end point.
#[derive(Debug, Clone)]
pub struct LineTool {
    pub settings: LineToolSettings,
    pub filters: Vec<PointFilterType>,
    pub intersections: Vec<PointIntersectionType>,
    state: LineToolState,
    line: Option<ShapeId>,
}

impl Default for LineTool {
    fn default() -> Self {
        Self::new(
            LineToolSettings::default(),
            filters::default_filters(),
            intersections::default_intersections(),
        )
    }
}

impl LineTool {
    pub fn new(
        settings: LineToolSettings,
        filters: Vec<PointFilterType>,
        intersections: Vec<PointIntersectionType>,
    ) -> Self {
        Self {
            settings,
            filters,
            intersections,
            state: LineToolState::StartPoint,
            line: None,
        }
    }

    pub fn state(&self) -> LineToolState {
        self.state
    }

    /// The in-progress line, if any
    pub fn line(&self) -> Option<ShapeId> {
        self.line
    }

    fn reset(&mut self, ctx: &mut dyn ToolContext) {
        filters::clear_all(&mut self.filters, ctx);
        intersections::clear_all(&mut self.intersections, ctx);
        self.state = LineToolState::StartPoint;
    }
}

/// Create a line from the point a click at `pos` resolves to, with its end
/// following the pointer, and put it in the working container.
pub(crate) fn start_line(
    ctx: &mut dyn ToolContext,
    start: ShapeId,
    pos: Pos2,
) -> EditorResult<ShapeId> {
    let end = new_point(ctx, pos);
    let line = create_shape(ctx, ShapeKind::Line { start, end });
    begin_shape(ctx, line)?;
    Ok(line)
}

/// Replace the crossing markers with those of the in-progress line.
pub(crate) fn track_intersections(
    ctx: &mut dyn ToolContext,
    line: Option<ShapeId>,
    intersections: &mut [PointIntersectionType],
) {
    intersections::clear_all(intersections, ctx);
    if let Some(line) = line {
        intersections::find_all(intersections, ctx, line);
    }
}

/// Commit a finished line, splitting it at intersections when asked.
/// Returns the committed segment ids.
pub(crate) fn commit_line(
    ctx: &mut dyn ToolContext,
    line: ShapeId,
    intersections: &mut [PointIntersectionType],
    split: bool,
) -> EditorResult<Vec<ShapeId>> {
    intersections::clear_all(intersections, ctx);
    commit_shape(ctx, line)?;
    intersections::find_all(intersections, ctx, line);
    let found = intersections::found_points(intersections);
    let segments = if split && !found.is_empty() {
        split_line(ctx, line, &found)?
    } else {
        vec![line]
    };
    intersections::clear_all(intersections, ctx);
    Ok(segments)
}

/// Replace a committed line by segments between its end points and `points`.
///
/// The break points are the end points and `points` ordered by x then y;
/// points at equal coordinates are merged, keeping the line's own end points.
fn split_line(ctx: &mut dyn ToolContext, line: ShapeId, points: &[ShapeId]) -> EditorResult<Vec<ShapeId>> {
    let Some(ShapeKind::Line { start, end }) = ctx.document().kind(line).cloned() else {
        return Ok(vec![line]);
    };
    let doc = ctx.document();
    let mut stops: Vec<(ShapeId, Pos2)> = std::iter::once(start)
        .chain(points.iter().copied())
        .chain(std::iter::once(end))
        .filter_map(|id| doc.position(id).map(|p| (id, p)))
        .collect();
    stops.sort_by(|a, b| cmp_points(&a.1, &b.1));

    let mut merged: Vec<(ShapeId, Pos2)> = Vec::with_capacity(stops.len());
    for stop in stops {
        match merged.last_mut() {
            Some(last) if last.1 == stop.1 => {
                if stop.0 == start || stop.0 == end {
                    *last = stop;
                }
            }
            _ => merged.push(stop),
        }
    }
    if merged.len() < 3 {
        return Ok(vec![line]);
    }

    let current = ctx.current_container();
    let index = ctx
        .document()
        .shapes_of(current)
        .iter()
        .position(|s| *s == line)
        .unwrap_or(usize::MAX);
    let style = ctx.document().get(line).and_then(|s| s.style.clone());
    ctx.document_mut().remove_shape(current, line);
    ctx.document_mut().remove(line);

    let mut segments = Vec::with_capacity(merged.len() - 1);
    for (i, pair) in merged.windows(2).enumerate() {
        let segment = create_shape(
            ctx,
            ShapeKind::Line {
                start: pair[0].0,
                end: pair[1].0,
            },
        );
        if let Some(shape) = ctx.document_mut().get_mut(segment) {
            shape.style = style.clone();
        }
        ctx.document_mut().insert_shape(current, index.saturating_add(i), segment)?;
        segments.push(segment);
    }
    debug!("split line into {} segments", segments.len());
    Ok(segments)
}

impl Tool for LineTool {
    fn name(&self) -> &'static str {
        "Line"
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            LineToolState::StartPoint => "StartPoint",
            LineToolState::Point => "Point",
        }
    }

    fn left_down(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        match self.state {
            LineToolState::StartPoint => {
                let s = self.settings.clone();
                let start = ctx.get_next_point(pos, s.connect_points, s.hit_threshold, modifier);
                self.line = Some(start_line(ctx, start, pos)?);
                track_intersections(ctx, self.line, &mut self.intersections);
                self.state = LineToolState::Point;
                debug!("line started at {pos:?}");
                Ok(ToolOutcome::None)
            }
            LineToolState::Point => {
                let Some(line) = self.line.take() else {
                    self.reset(ctx);
                    return Ok(ToolOutcome::None);
                };
                if let [_, end] = structural_points(ctx, line)[..] {
                    let s = self.settings.clone();
                    resolve_point(ctx, line, end, pos, s.connect_points, s.hit_threshold, modifier);
                }
                let segments = commit_line(ctx, line, &mut self.intersections, self.settings.split_intersections)?;
                self.reset(ctx);
                Ok(ToolOutcome::Committed(segments))
            }
        }
    }

    fn right_down(&mut self, ctx: &mut dyn ToolContext, _pos: Pos2, _modifier: Modifiers) -> EditorResult<ToolOutcome> {
        match self.state {
            LineToolState::StartPoint => Ok(ToolOutcome::None),
            LineToolState::Point => {
                self.clean(ctx);
                Ok(ToolOutcome::Cancelled)
            }
        }
    }

    fn move_pointer(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        match self.state {
            LineToolState::StartPoint => {
                hover_point(ctx, pos, self.settings.connect_points, self.settings.hit_threshold, modifier);
            }
            LineToolState::Point => {
                if let Some(line) = self.line {
                    if let [_, end] = structural_points(ctx, line)[..] {
                        move_points(ctx, &[end], pos);
                    }
                }
                track_intersections(ctx, self.line, &mut self.intersections);
            }
        }
        Ok(ToolOutcome::None)
    }

    fn clean(&mut self, ctx: &mut dyn ToolContext) {
        if let Some(line) = self.line.take() {
            discard_shape(ctx, line);
        }
        ctx.release();
        self.reset(ctx);
    }
}

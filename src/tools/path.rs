use egui::{Modifiers, Pos2};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{
    ConicTool, ConicToolSettings, ConicToolState, CubicBezierTool, CubicBezierToolSettings, CubicBezierToolState,
    LineTool, LineToolSettings, LineToolState, QuadraticBezierTool, QuadraticBezierToolSettings,
    QuadraticBezierToolState, Tool, ToolOutcome, create_shape, deselect_points, hover_point,
};
use crate::context::{FigureContext, ToolContext};
use crate::error::EditorResult;
use crate::filters::{self, PointFilterType};
use crate::geometry::hit_testing::DEFAULT_HIT_RADIUS;
use crate::shape::{FillRule, ShapeId, ShapeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathToolState {
    #[default]
    None,
    /// A path exists in the working container and collects segments
    Figure,
}

/// Segment kind the path tool currently draws. `Move` starts a new figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PathSubTool {
    #[default]
    Line,
    CubicBezier,
    QuadraticBezier,
    Conic,
    Move,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathToolSettings {
    pub fill_rule: FillRule,
    pub is_closed: bool,
    pub is_filled: bool,
    pub connect_points: bool,
    pub hit_threshold: f32,
    pub sub_tool: PathSubTool,
}

impl Default for PathToolSettings {
    fn default() -> Self {
        Self {
            fill_rule: FillRule::EvenOdd,
            is_closed: true,
            is_filled: true,
            connect_points: true,
            hit_threshold: DEFAULT_HIT_RADIUS,
            sub_tool: PathSubTool::Line,
        }
    }
}

/// Builds one path out of line and curve segments.
///
/// Segments are drawn by ordinary line and curve tools running against a
/// [`FigureContext`], so their "current container" is the figure being
/// drawn. Every committed segment immediately starts the next one at its end
/// point. A right click finishes the path.
#[derive(Debug, Clone)]
pub struct PathTool {
    pub settings: PathToolSettings,
    pub filters: Vec<PointFilterType>,
    line: LineTool,
    cubic_bezier: CubicBezierTool,
    quadratic_bezier: QuadraticBezierTool,
    conic: ConicTool,
    sub_tool: PathSubTool,
    previous_sub_tool: PathSubTool,
    state: PathToolState,
    path: Option<ShapeId>,
    figure: Option<ShapeId>,
}

impl Default for PathTool {
    fn default() -> Self {
        Self::new(PathToolSettings::default(), filters::default_filters())
    }
}

impl PathTool {
    pub fn new(settings: PathToolSettings, filters: Vec<PointFilterType>) -> Self {
        let line = LineToolSettings {
            connect_points: settings.connect_points,
            hit_threshold: settings.hit_threshold,
            split_intersections: false,
        };
        let cubic = CubicBezierToolSettings {
            connect_points: settings.connect_points,
            hit_threshold: settings.hit_threshold,
        };
        let quadratic = QuadraticBezierToolSettings {
            connect_points: settings.connect_points,
            hit_threshold: settings.hit_threshold,
        };
        let conic = ConicToolSettings {
            connect_points: settings.connect_points,
            hit_threshold: settings.hit_threshold,
            ..ConicToolSettings::default()
        };
        let sub_tool = settings.sub_tool;
        // Snapping runs once on the real context before delegating.
        Self {
            settings,
            filters,
            line: LineTool::new(line, Vec::new(), Vec::new()),
            cubic_bezier: CubicBezierTool::new(cubic, Vec::new()),
            quadratic_bezier: QuadraticBezierTool::new(quadratic, Vec::new()),
            conic: ConicTool::new(conic, Vec::new()),
            sub_tool,
            previous_sub_tool: PathSubTool::Line,
            state: PathToolState::None,
            path: None,
            figure: None,
        }
    }

    pub fn state(&self) -> PathToolState {
        self.state
    }

    pub fn sub_tool(&self) -> PathSubTool {
        self.sub_tool
    }

    pub fn path(&self) -> Option<ShapeId> {
        self.path
    }

    pub fn figure(&self) -> Option<ShapeId> {
        self.figure
    }

    /// Switch the segment kind. A segment in progress is dropped.
    pub fn set_sub_tool(&mut self, ctx: &mut dyn ToolContext, sub_tool: PathSubTool) {
        if sub_tool == self.sub_tool {
            return;
        }
        self.clean_sub_tool(ctx);
        if sub_tool == PathSubTool::Move {
            self.previous_sub_tool = self.sub_tool;
        }
        debug!("path sub tool {:?} -> {sub_tool:?}", self.sub_tool);
        self.sub_tool = sub_tool;
    }

    fn active(&mut self) -> Option<&mut dyn Tool> {
        match self.sub_tool {
            PathSubTool::Line => Some(&mut self.line),
            PathSubTool::CubicBezier => Some(&mut self.cubic_bezier),
            PathSubTool::QuadraticBezier => Some(&mut self.quadratic_bezier),
            PathSubTool::Conic => Some(&mut self.conic),
            PathSubTool::Move => None,
        }
    }

    /// True when the active sub tool waits for the first point of a segment.
    fn is_sub_tool_idle(&self) -> bool {
        match self.sub_tool {
            PathSubTool::Line => self.line.state() == LineToolState::StartPoint,
            PathSubTool::CubicBezier => self.cubic_bezier.state() == CubicBezierToolState::StartPoint,
            PathSubTool::QuadraticBezier => self.quadratic_bezier.state() == QuadraticBezierToolState::StartPoint,
            PathSubTool::Conic => self.conic.state() == ConicToolState::StartPoint,
            PathSubTool::Move => true,
        }
    }

    fn clean_sub_tool(&mut self, ctx: &mut dyn ToolContext) {
        let Some(figure) = self.figure else {
            return;
        };
        let mut scoped = FigureContext::new(ctx, figure);
        if let Some(tool) = self.active() {
            tool.clean(&mut scoped);
        }
    }

    fn new_figure(&self, ctx: &mut dyn ToolContext) -> ShapeId {
        create_shape(
            ctx,
            ShapeKind::Figure {
                shapes: Vec::new(),
                is_closed: self.settings.is_closed,
                is_filled: self.settings.is_filled,
            },
        )
    }

    fn start_path(&mut self, ctx: &mut dyn ToolContext) -> EditorResult<()> {
        let figure = self.new_figure(ctx);
        let path = create_shape(
            ctx,
            ShapeKind::Path {
                figures: vec![figure],
                fill_rule: self.settings.fill_rule,
            },
        );
        let working = ctx.working_container();
        ctx.document_mut().add_shape(working, path)?;
        self.path = Some(path);
        self.figure = Some(figure);
        self.state = PathToolState::Figure;
        debug!("path started");
        Ok(())
    }

    /// Leave the current figure and open another one in the same path. An
    /// empty current figure is reused.
    fn move_to_new_figure(&mut self, ctx: &mut dyn ToolContext) -> EditorResult<()> {
        let (Some(path), Some(figure)) = (self.path, self.figure) else {
            return Ok(());
        };
        if !ctx.document().shapes_of(figure).is_empty() {
            let next = self.new_figure(ctx);
            ctx.document_mut().add_shape(path, next)?;
            self.figure = Some(next);
            debug!("path: new figure");
        }
        Ok(())
    }

    /// Run a left click through the active sub tool inside `figure`.
    fn delegate_left_down(
        &mut self,
        ctx: &mut dyn ToolContext,
        figure: ShapeId,
        pos: Pos2,
        modifier: Modifiers,
    ) -> EditorResult<ToolOutcome> {
        let chain = if self.is_sub_tool_idle() {
            ctx.document().last_point(figure)?
        } else {
            None
        };
        let mut scoped = FigureContext::new(ctx, figure);
        scoped.chain_from(chain);
        match self.active() {
            Some(tool) => tool.left_down(&mut scoped, pos, modifier),
            None => Ok(ToolOutcome::None),
        }
    }

    /// Take the path out of the working container and commit it if any figure
    /// has segments. Empty figures are dropped.
    fn finish(&mut self, ctx: &mut dyn ToolContext) -> EditorResult<ToolOutcome> {
        self.clean_sub_tool(ctx);
        let Some(path) = self.path else {
            self.reset(ctx);
            return Ok(ToolOutcome::None);
        };

        let working = ctx.working_container();
        ctx.document_mut().remove_shape(working, path);
        deselect_points(ctx, path);

        let figures = ctx.document().shapes_of(path).to_vec();
        for figure in figures {
            if ctx.document().shapes_of(figure).is_empty() {
                ctx.document_mut().remove_shape(path, figure);
                ctx.document_mut().remove(figure);
            }
        }

        if ctx.document().shapes_of(path).is_empty() {
            ctx.document_mut().remove(path);
            warn!("path discarded: no segments");
            self.reset(ctx);
            return Ok(ToolOutcome::Discarded("path has no segments"));
        }

        let current = ctx.current_container();
        ctx.document_mut().add_shape(current, path)?;
        debug!("path committed with {} figure(s)", ctx.document().shapes_of(path).len());
        self.reset(ctx);
        Ok(ToolOutcome::Committed(vec![path]))
    }

    fn reset(&mut self, ctx: &mut dyn ToolContext) {
        self.path = None;
        self.figure = None;
        self.state = PathToolState::None;
        filters::clear_all(&mut self.filters, ctx);
        ctx.release();
        ctx.redraw();
    }
}

impl Tool for PathTool {
    fn name(&self) -> &'static str {
        "Path"
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            PathToolState::None => "None",
            PathToolState::Figure => "Figure",
        }
    }

    fn left_down(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);

        if self.sub_tool == PathSubTool::Move {
            self.move_to_new_figure(ctx)?;
            self.sub_tool = self.previous_sub_tool;
        }
        if self.path.is_none() {
            self.start_path(ctx)?;
        }
        let Some(figure) = self.figure else {
            return Ok(ToolOutcome::None);
        };

        let outcome = self.delegate_left_down(ctx, figure, pos, modifier)?;
        if outcome.is_committed() {
            // Continue with a new segment from the end of the committed one.
            self.delegate_left_down(ctx, figure, pos, modifier)?;
        }
        ctx.capture();
        Ok(ToolOutcome::None)
    }

    fn right_down(&mut self, ctx: &mut dyn ToolContext, _pos: Pos2, _modifier: Modifiers) -> EditorResult<ToolOutcome> {
        if self.state == PathToolState::None {
            return Ok(ToolOutcome::None);
        }
        self.finish(ctx)
    }

    fn move_pointer(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        let mut pos = pos;
        filters::process_all(&mut self.filters, ctx, &mut pos);
        let Some(figure) = self.figure else {
            hover_point(ctx, pos, self.settings.connect_points, self.settings.hit_threshold, modifier);
            return Ok(ToolOutcome::None);
        };
        let mut scoped = FigureContext::new(ctx, figure);
        match self.active() {
            Some(tool) => tool.move_pointer(&mut scoped, pos, modifier),
            None => Ok(ToolOutcome::None),
        }
    }

    fn clean(&mut self, ctx: &mut dyn ToolContext) {
        self.clean_sub_tool(ctx);
        if let Some(path) = self.path {
            let working = ctx.working_container();
            deselect_points(ctx, path);
            ctx.document_mut().remove_shape(working, path);
            ctx.document_mut().remove(path);
        }
        self.reset(ctx);
    }
}

#[cfg(test)]
mod tests {
    use egui::pos2;

    use super::*;
    use crate::context::EditorContext;

    fn tool() -> PathTool {
        PathTool::new(PathToolSettings::default(), Vec::new())
    }

    #[test]
    fn test_segments_chain_inside_one_figure() {
        let mut ctx = EditorContext::new(500.0, 500.0);
        let mut path_tool = tool();
        let none = Modifiers::NONE;

        path_tool.left_down(&mut ctx, pos2(0.0, 0.0), none).unwrap();
        path_tool.left_down(&mut ctx, pos2(100.0, 0.0), none).unwrap();
        path_tool.left_down(&mut ctx, pos2(100.0, 100.0), none).unwrap();
        let outcome = path_tool.right_down(&mut ctx, pos2(100.0, 100.0), none).unwrap();

        let ToolOutcome::Committed(ids) = outcome else {
            panic!("expected commit, got {outcome:?}");
        };
        let figures = ctx.document.shapes_of(ids[0]).to_vec();
        assert_eq!(figures.len(), 1);
        let segments = ctx.document.shapes_of(figures[0]).to_vec();
        assert_eq!(segments.len(), 2);

        let Some(ShapeKind::Line { end, .. }) = ctx.document.kind(segments[0]).cloned() else {
            panic!("expected line");
        };
        let Some(ShapeKind::Line { start, .. }) = ctx.document.kind(segments[1]).cloned() else {
            panic!("expected line");
        };
        assert_eq!(end, start);
        assert!(!ctx.input.is_captured());
        assert!(ctx.document.shapes_of(ctx.working_container).is_empty());
    }

    #[test]
    fn test_empty_path_is_discarded() {
        let mut ctx = EditorContext::new(500.0, 500.0);
        let mut path_tool = tool();
        path_tool.left_down(&mut ctx, pos2(0.0, 0.0), Modifiers::NONE).unwrap();
        let outcome = path_tool.right_down(&mut ctx, pos2(0.0, 0.0), Modifiers::NONE).unwrap();
        assert_eq!(outcome, ToolOutcome::Discarded("path has no segments"));
        assert!(ctx.document.shapes_of(ctx.current_container).is_empty());
    }

    #[test]
    fn test_move_opens_new_figure_and_restores_sub_tool() {
        let mut ctx = EditorContext::new(500.0, 500.0);
        let mut path_tool = tool();
        let none = Modifiers::NONE;
        path_tool.set_sub_tool(&mut ctx, PathSubTool::CubicBezier);

        path_tool.left_down(&mut ctx, pos2(0.0, 0.0), none).unwrap();
        path_tool.left_down(&mut ctx, pos2(90.0, 0.0), none).unwrap();
        path_tool.left_down(&mut ctx, pos2(30.0, 30.0), none).unwrap();
        path_tool.left_down(&mut ctx, pos2(60.0, 30.0), none).unwrap();

        path_tool.set_sub_tool(&mut ctx, PathSubTool::Move);
        path_tool.left_down(&mut ctx, pos2(200.0, 200.0), none).unwrap();
        assert_eq!(path_tool.sub_tool(), PathSubTool::CubicBezier);

        let path = path_tool.path().unwrap();
        assert_eq!(ctx.document.shapes_of(path).len(), 2);

        let outcome = path_tool.right_down(&mut ctx, pos2(0.0, 0.0), none).unwrap();
        let ToolOutcome::Committed(ids) = outcome else {
            panic!("expected commit, got {outcome:?}");
        };
        // The second figure never got a segment and is dropped.
        assert_eq!(ctx.document.shapes_of(ids[0]).len(), 1);
    }
}

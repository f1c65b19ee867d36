use egui::{Modifiers, Pos2};
use log::debug;

use crate::context::ToolContext;
use crate::error::{EditorError, EditorResult};
use crate::shape::{Shape, ShapeId, ShapeKind};

/// What a pointer event did to the document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ToolOutcome {
    /// Nothing committed; the gesture may still be in progress
    #[default]
    None,
    /// Shapes added to (or changed in) the current container
    Committed(Vec<ShapeId>),
    /// The gesture ended but its result was invalid and dropped
    Discarded(&'static str),
    /// The gesture was aborted by the user
    Cancelled,
}

impl ToolOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// Tool trait defines the interface for all drawing tools.
///
/// Every handler receives the context it mutates, the pointer position in
/// document coordinates and the modifier keys held.
pub trait Tool {
    /// Return the name of the tool
    fn name(&self) -> &'static str;

    /// Name of the current state, for hosts and diagnostics
    fn state_name(&self) -> &'static str;

    fn left_down(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome>;

    fn left_up(&mut self, _ctx: &mut dyn ToolContext, _pos: Pos2, _modifier: Modifiers) -> EditorResult<ToolOutcome> {
        Ok(ToolOutcome::None)
    }

    /// Cancels a gesture that is past its first point.
    fn right_down(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome>;

    fn right_up(&mut self, _ctx: &mut dyn ToolContext, _pos: Pos2, _modifier: Modifiers) -> EditorResult<ToolOutcome> {
        Ok(ToolOutcome::None)
    }

    fn move_pointer(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome>;

    /// Drop any in-progress shape and guides, release capture and return to
    /// the entry state. Calling it twice is harmless.
    fn clean(&mut self, ctx: &mut dyn ToolContext);
}

mod circle;
mod conic;
mod cubic_bezier;
mod ellipse;
mod line;
mod path;
mod polyline;
mod quadratic_bezier;
mod rectangle;
mod scribble;
mod selection_tool;
mod text;
mod two_point;

pub use circle::{CircleTool, CircleToolSettings, CircleToolState};
pub use conic::{ConicTool, ConicToolSettings, ConicToolState};
pub use cubic_bezier::{CubicBezierTool, CubicBezierToolSettings, CubicBezierToolState};
pub use ellipse::{EllipseTool, EllipseToolSettings, EllipseToolState};
pub use line::{LineTool, LineToolSettings, LineToolState};
pub use path::{PathSubTool, PathTool, PathToolSettings, PathToolState};
pub use polyline::{PolyLineTool, PolyLineToolState};
pub use quadratic_bezier::{QuadraticBezierTool, QuadraticBezierToolSettings, QuadraticBezierToolState};
pub use rectangle::{RectangleTool, RectangleToolSettings, RectangleToolState};
pub use scribble::{ScribbleTool, ScribbleToolSettings, ScribbleToolState};
pub use selection_tool::{
    Align, Distribute, SelectionCommand, SelectionTool, SelectionToolSettings, SelectionToolState, Stack, ZOrder,
};
pub use text::{TextTool, TextToolSettings, TextToolState};

/// Enum representing all available tool types
/// This allows us to avoid using Box<dyn Tool> and simplifies memory management
#[derive(Debug, Clone)]
pub enum ToolType {
    Line(LineTool),
    PolyLine(PolyLineTool),
    CubicBezier(CubicBezierTool),
    QuadraticBezier(QuadraticBezierTool),
    Conic(ConicTool),
    Rectangle(RectangleTool),
    Ellipse(EllipseTool),
    Circle(CircleTool),
    Text(TextTool),
    Scribble(ScribbleTool),
    Path(PathTool),
    Selection(SelectionTool),
}

macro_rules! dispatch {
    ($self:ident, $tool:ident => $body:expr) => {
        match $self {
            ToolType::Line($tool) => $body,
            ToolType::PolyLine($tool) => $body,
            ToolType::CubicBezier($tool) => $body,
            ToolType::QuadraticBezier($tool) => $body,
            ToolType::Conic($tool) => $body,
            ToolType::Rectangle($tool) => $body,
            ToolType::Ellipse($tool) => $body,
            ToolType::Circle($tool) => $body,
            ToolType::Text($tool) => $body,
            ToolType::Scribble($tool) => $body,
            ToolType::Path($tool) => $body,
            ToolType::Selection($tool) => $body,
        }
    };
}

impl Tool for ToolType {
    fn name(&self) -> &'static str {
        dispatch!(self, tool => tool.name())
    }

    fn state_name(&self) -> &'static str {
        dispatch!(self, tool => tool.state_name())
    }

    fn left_down(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        dispatch!(self, tool => tool.left_down(ctx, pos, modifier))
    }

    fn left_up(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        dispatch!(self, tool => tool.left_up(ctx, pos, modifier))
    }

    fn right_down(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        dispatch!(self, tool => tool.right_down(ctx, pos, modifier))
    }

    fn right_up(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        dispatch!(self, tool => tool.right_up(ctx, pos, modifier))
    }

    fn move_pointer(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        dispatch!(self, tool => tool.move_pointer(ctx, pos, modifier))
    }

    fn clean(&mut self, ctx: &mut dyn ToolContext) {
        dispatch!(self, tool => tool.clean(ctx))
    }
}

/// Names accepted by [`new_tool`], in toolbar order.
pub const TOOL_NAMES: [&str; 12] = [
    "Selection",
    "Line",
    "PolyLine",
    "CubicBezier",
    "QuadraticBezier",
    "Conic",
    "Rectangle",
    "Ellipse",
    "Circle",
    "Text",
    "Scribble",
    "Path",
];

/// Factory function to create a tool with default settings by name.
///
/// # Errors
///
/// Returns [`EditorError::UnknownTool`] for names not in [`TOOL_NAMES`].
pub fn new_tool(name: &str) -> EditorResult<ToolType> {
    let tool = match name {
        "Selection" => ToolType::Selection(SelectionTool::default()),
        "Line" => ToolType::Line(LineTool::default()),
        "PolyLine" => ToolType::PolyLine(PolyLineTool::default()),
        "CubicBezier" => ToolType::CubicBezier(CubicBezierTool::default()),
        "QuadraticBezier" => ToolType::QuadraticBezier(QuadraticBezierTool::default()),
        "Conic" => ToolType::Conic(ConicTool::default()),
        "Rectangle" => ToolType::Rectangle(RectangleTool::default()),
        "Ellipse" => ToolType::Ellipse(EllipseTool::default()),
        "Circle" => ToolType::Circle(CircleTool::default()),
        "Text" => ToolType::Text(TextTool::default()),
        "Scribble" => ToolType::Scribble(ScribbleTool::default()),
        "Path" => ToolType::Path(PathTool::default()),
        other => return Err(EditorError::UnknownTool(other.to_string())),
    };
    Ok(tool)
}

// --- helpers shared by the tools ---------------------------------------------

pub(crate) fn select_points(ctx: &mut dyn ToolContext, shape: ShapeId) {
    let points = ctx.document().points_of(shape);
    ctx.selection_mut().select_all(points);
}

pub(crate) fn deselect_points(ctx: &mut dyn ToolContext, shape: ShapeId) {
    let points = ctx.document().points_of(shape);
    ctx.selection_mut().deselect_all(points);
}

/// A fresh, unconnected point at `pos`.
pub(crate) fn new_point(ctx: &mut dyn ToolContext, pos: Pos2) -> ShapeId {
    let style = ctx.point_style();
    ctx.document_mut().add_point(pos, style, None)
}

/// Insert a new shape in the current style and record it as owner of any of
/// its points that have none yet.
pub(crate) fn create_shape(ctx: &mut dyn ToolContext, kind: ShapeKind) -> ShapeId {
    let style = ctx.current_style();
    let doc = ctx.document_mut();
    let points = kind.structural_points();
    let id = doc.insert(Shape::new(kind, style));
    for point in points {
        if let Some(p) = doc.get_mut(point) {
            if p.owner.is_none() {
                p.owner = Some(id);
            }
        }
    }
    id
}

/// Put an in-progress shape in the working container, select its points and
/// capture the pointer.
pub(crate) fn begin_shape(ctx: &mut dyn ToolContext, shape: ShapeId) -> EditorResult<()> {
    let working = ctx.working_container();
    ctx.document_mut().add_shape(working, shape)?;
    select_points(ctx, shape);
    ctx.capture();
    ctx.redraw();
    Ok(())
}

/// Move a finished shape from the working to the current container.
pub(crate) fn commit_shape(ctx: &mut dyn ToolContext, shape: ShapeId) -> EditorResult<()> {
    let working = ctx.working_container();
    let current = ctx.current_container();
    ctx.document_mut().remove_shape(working, shape);
    deselect_points(ctx, shape);
    ctx.document_mut().add_shape(current, shape)?;
    ctx.release();
    ctx.redraw();
    debug!("committed {shape}");
    Ok(())
}

/// Drop an in-progress shape. Points it shares with committed shapes stay.
pub(crate) fn discard_shape(ctx: &mut dyn ToolContext, shape: ShapeId) {
    let working = ctx.working_container();
    deselect_points(ctx, shape);
    ctx.document_mut().remove_shape(working, shape);
    ctx.document_mut().remove(shape);
    ctx.release();
    ctx.redraw();
    debug!("discarded {shape}");
}

/// Existing point of the current container within `radius` of `pos`.
pub(crate) fn find_point(
    ctx: &dyn ToolContext,
    pos: Pos2,
    radius: f32,
    modifier: Modifiers,
    excluding: Option<ShapeId>,
) -> Option<ShapeId> {
    let hit_test = ctx.hit_test()?;
    let doc = ctx.document();
    let shapes = doc.shapes_of(ctx.current_container());
    hit_test.try_to_get_point(doc, shapes, pos, radius, ctx.view_scale(), modifier, excluding)
}

/// Idle feedback: hover the point a click would connect to.
pub(crate) fn hover_point(ctx: &mut dyn ToolContext, pos: Pos2, connect: bool, radius: f32, modifier: Modifiers) {
    let target = if connect {
        find_point(ctx, pos, radius, modifier, None)
    } else {
        None
    };
    let changed = ctx.selection().hovered() != target;
    match target {
        Some(point) => ctx.selection_mut().hover(point),
        None => ctx.selection_mut().dehover(),
    }
    if changed {
        ctx.redraw();
    }
}

/// Fix the placeholder point of `shape` at `pos`.
///
/// With `connect`, an existing point under the pointer replaces the
/// placeholder inside `shape` and the placeholder is dropped.
pub(crate) fn resolve_point(
    ctx: &mut dyn ToolContext,
    shape: ShapeId,
    placeholder: ShapeId,
    pos: Pos2,
    connect: bool,
    radius: f32,
    modifier: Modifiers,
) -> ShapeId {
    if connect {
        if let Some(hit) = find_point(ctx, pos, radius, modifier, Some(placeholder)) {
            let doc = ctx.document_mut();
            doc.replace_point_in(shape, placeholder, hit);
            doc.remove(placeholder);
            ctx.selection_mut().deselect(placeholder);
            ctx.selection_mut().select(hit);
            debug!("connected to point {hit}");
            return hit;
        }
    }
    ctx.document_mut().set_position(placeholder, pos);
    placeholder
}

/// Structural point ids of a shape, empty if it is gone.
pub(crate) fn structural_points(ctx: &dyn ToolContext, shape: ShapeId) -> Vec<ShapeId> {
    ctx.document()
        .kind(shape)
        .map(ShapeKind::structural_points)
        .unwrap_or_default()
}

/// Move several points to `pos`.
pub(crate) fn move_points(ctx: &mut dyn ToolContext, points: &[ShapeId], pos: Pos2) {
    let doc = ctx.document_mut();
    for point in points {
        doc.set_position(*point, pos);
    }
    ctx.redraw();
}

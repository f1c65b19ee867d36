//! The editor session: one context, the tool set, the active tool and the
//! undo history.

use egui::{Modifiers, PointerButton, Pos2};
use log::{debug, info};

use crate::config::EditorConfig;
use crate::context::{EditorContext, ToolContext};
use crate::document::Document;
use crate::error::{EditorError, EditorResult};
use crate::history::History;
use crate::path_converter::GeometryPathConverter;
use crate::selection::SelectionState;
use crate::tools::{SelectionCommand, Tool, ToolOutcome, ToolType};

/// Pointer input as the host reports it, in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down(PointerButton),
    Up(PointerButton),
    Move,
}

/// Routes pointer events to the current tool and records undo history
/// around every gesture that changes the document.
#[derive(Debug)]
pub struct Editor {
    context: EditorContext,
    tools: Vec<ToolType>,
    current: usize,
    history: History,
    /// Document as it was when the gesture in progress started
    checkpoint: Option<Document>,
}

impl Editor {
    /// Editor over an empty document, with every tool built from `config`
    /// and the selection tool active.
    ///
    /// # Errors
    ///
    /// Propagates failures from building the tool set.
    pub fn new(config: &EditorConfig) -> EditorResult<Self> {
        let mut context = EditorContext::new(config.canvas_width, config.canvas_height)
            .with_path_converter(Box::new(GeometryPathConverter));
        context.hit_test = Some(config.hit_test());
        Self::with_context(context, config)
    }

    /// Editor over an existing context, e.g. one with a host input service.
    ///
    /// # Errors
    ///
    /// Propagates failures from building the tool set.
    pub fn with_context(context: EditorContext, config: &EditorConfig) -> EditorResult<Self> {
        let tools = config.tools()?;
        let current = tools.iter().position(|t| t.name() == "Selection").unwrap_or(0);
        Ok(Self {
            context,
            tools,
            current,
            history: History::default(),
            checkpoint: None,
        })
    }

    pub fn context(&self) -> &EditorContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut EditorContext {
        &mut self.context
    }

    pub fn document(&self) -> &Document {
        &self.context.document
    }

    pub fn selection(&self) -> &SelectionState {
        &self.context.selection
    }

    pub fn tools(&self) -> &[ToolType] {
        &self.tools
    }

    pub fn tool(&self) -> &ToolType {
        &self.tools[self.current]
    }

    pub fn tool_mut(&mut self) -> &mut ToolType {
        &mut self.tools[self.current]
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Zoom factor of the host view; hit radii are divided by it.
    pub fn set_view_scale(&mut self, scale: f32) {
        if scale > 0.0 {
            self.context.view_scale = scale;
        }
    }

    /// Make another tool current. The outgoing tool is cleaned first, so no
    /// preview or pointer capture outlives it.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownTool`] if no tool has that name; the
    /// current tool is left untouched.
    pub fn set_tool(&mut self, name: &str) -> EditorResult<()> {
        let index = self
            .tools
            .iter()
            .position(|t| t.name() == name)
            .ok_or_else(|| EditorError::UnknownTool(name.to_string()))?;
        if index != self.current {
            self.clean_tool();
            info!("tool {} -> {name}", self.tool().name());
            self.current = index;
        }
        Ok(())
    }

    /// Drop whatever the current tool has in progress, as a host does on
    /// Escape. Harmless when the tool is idle.
    pub fn clean_tool(&mut self) {
        let tool = &mut self.tools[self.current];
        tool.clean(&mut self.context);
        self.checkpoint = None;
    }

    /// Forward a pointer event to the current tool.
    ///
    /// # Errors
    ///
    /// Propagates contract violations raised by the tool.
    pub fn handle(&mut self, event: PointerEvent, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        if matches!(event, PointerEvent::Down(_)) && self.checkpoint.is_none() {
            self.checkpoint = Some(self.context.document.clone());
        }

        let tool = &mut self.tools[self.current];
        let ctx = &mut self.context;
        let outcome = match event {
            PointerEvent::Down(PointerButton::Primary) => tool.left_down(ctx, pos, modifier)?,
            PointerEvent::Up(PointerButton::Primary) => tool.left_up(ctx, pos, modifier)?,
            PointerEvent::Down(PointerButton::Secondary) => tool.right_down(ctx, pos, modifier)?,
            PointerEvent::Up(PointerButton::Secondary) => tool.right_up(ctx, pos, modifier)?,
            PointerEvent::Move => tool.move_pointer(ctx, pos, modifier)?,
            PointerEvent::Down(_) | PointerEvent::Up(_) => ToolOutcome::None,
        };

        match &outcome {
            ToolOutcome::Committed(ids) => {
                if let Some(before) = self.checkpoint.take() {
                    self.history.record(before);
                }
                debug!("{} committed {} shape(s)", self.tool().name(), ids.len());
            }
            ToolOutcome::Discarded(reason) => {
                debug!("{} discarded: {reason}", self.tool().name());
                self.checkpoint = None;
            }
            ToolOutcome::Cancelled => self.checkpoint = None,
            ToolOutcome::None => {}
        }
        // A gesture that ended without committing leaves nothing to undo.
        if !self.context.input.is_captured() {
            self.checkpoint = None;
        }
        Ok(outcome)
    }

    pub fn left_down(&mut self, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        self.handle(PointerEvent::Down(PointerButton::Primary), pos, modifier)
    }

    pub fn left_up(&mut self, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        self.handle(PointerEvent::Up(PointerButton::Primary), pos, modifier)
    }

    pub fn right_down(&mut self, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        self.handle(PointerEvent::Down(PointerButton::Secondary), pos, modifier)
    }

    pub fn right_up(&mut self, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        self.handle(PointerEvent::Up(PointerButton::Secondary), pos, modifier)
    }

    pub fn move_pointer(&mut self, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        self.handle(PointerEvent::Move, pos, modifier)
    }

    /// Run a selection operation, whatever tool is current.
    ///
    /// # Errors
    ///
    /// Propagates contract violations raised by the operation.
    pub fn execute(&mut self, command: SelectionCommand) -> EditorResult<ToolOutcome> {
        self.clean_tool();
        let before = self.context.document.clone();
        let Some(selection) = self.tools.iter_mut().find_map(|t| match t {
            ToolType::Selection(tool) => Some(tool),
            _ => None,
        }) else {
            return Ok(ToolOutcome::None);
        };
        let outcome = selection.execute(&mut self.context, command)?;
        if outcome.is_committed() {
            self.history.record(before);
        }
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Returns [`EditorError::EmptyHistory`] when there is nothing to undo.
    pub fn undo(&mut self) -> EditorResult<()> {
        self.clean_tool();
        self.history.undo(&mut self.context.document)?;
        self.after_restore()
    }

    /// # Errors
    ///
    /// Returns [`EditorError::EmptyHistory`] when there is nothing to redo.
    pub fn redo(&mut self) -> EditorResult<()> {
        self.clean_tool();
        self.history.redo(&mut self.context.document)?;
        self.after_restore()
    }

    /// A restored document may hold previews or ids the selection no
    /// longer knows about; start from an empty working canvas and selection.
    fn after_restore(&mut self) -> EditorResult<()> {
        let working = self.context.working_container;
        let doc = &mut self.context.document;
        doc.set_shapes(working, Vec::new())?;
        for guide in doc.guides_of(working).to_vec() {
            doc.remove_guide(working, guide);
        }
        self.context.selection.clear();
        self.context.selection.dehover();
        self.context.redraw();
        Ok(())
    }

    /// Drop arena entries nothing refers to any more.
    pub fn prune(&mut self) -> usize {
        self.context.document.prune()
    }
}

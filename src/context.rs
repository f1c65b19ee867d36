//! What a tool sees of the editor.
//!
//! Tools never hold the document or the selection themselves; every call
//! receives a [`ToolContext`]. [`EditorContext`] is the real one.
//! [`FigureContext`] wraps another context and scopes both containers to a
//! single figure, which is how the path tool reuses the line and curve tools.

use egui::{Modifiers, Pos2};
use log::debug;

use crate::document::Document;
use crate::error::{EditorError, EditorResult};
use crate::geometry::hit_testing::HitTest;
use crate::input::{HeadlessInput, InputService};
use crate::path_converter::PathConverter;
use crate::selection::SelectionState;
use crate::shape::{ShapeId, StyleId};

pub trait ToolContext {
    fn document(&self) -> &Document;
    fn document_mut(&mut self) -> &mut Document;

    /// Container committed shapes are added to
    fn current_container(&self) -> ShapeId;
    /// Container holding in-progress previews and guides
    fn working_container(&self) -> ShapeId;

    /// # Errors
    ///
    /// Scoped contexts refuse reassignment.
    fn set_current_container(&mut self, id: ShapeId) -> EditorResult<()>;

    /// # Errors
    ///
    /// Scoped contexts refuse reassignment.
    fn set_working_container(&mut self, id: ShapeId) -> EditorResult<()>;

    fn selection(&self) -> &SelectionState;
    fn selection_mut(&mut self) -> &mut SelectionState;

    fn hit_test(&self) -> Option<&HitTest>;
    fn input(&mut self) -> &mut dyn InputService;

    /// Current zoom factor of the view
    fn view_scale(&self) -> f32;

    fn path_converter(&self) -> Option<&dyn PathConverter>;

    /// The document together with the path converter, for conversions that
    /// write new shapes.
    fn document_with_converter(&mut self) -> (&mut Document, Option<&dyn PathConverter>);

    /// Style stamped onto newly drawn shapes
    fn current_style(&self) -> Option<StyleId> {
        self.document().styles.current.clone()
    }

    /// Style stamped onto newly created points
    fn point_style(&self) -> Option<StyleId> {
        self.document().styles.point_style.clone()
    }

    /// Point for a click at `pos`.
    ///
    /// With `connect`, an existing point of the current container within
    /// `radius` is reused so the new shape shares it. Otherwise, or without a
    /// hit test service, a fresh point is created.
    fn get_next_point(&mut self, pos: Pos2, connect: bool, radius: f32, modifier: Modifiers) -> ShapeId {
        if connect {
            if let Some(hit_test) = self.hit_test() {
                let current = self.current_container();
                let doc = self.document();
                let found = hit_test.try_to_get_point(
                    doc,
                    doc.shapes_of(current),
                    pos,
                    radius,
                    self.view_scale(),
                    modifier,
                    None,
                );
                if let Some(point) = found {
                    return point;
                }
            }
        }
        let style = self.point_style();
        self.document_mut().add_point(pos, style, None)
    }

    fn capture(&mut self) {
        self.input().capture();
    }

    fn release(&mut self) {
        self.input().release();
    }

    fn redraw(&mut self) {
        self.input().redraw();
    }
}

/// The editor's own context: one document with a current and a working canvas.
pub struct EditorContext {
    pub document: Document,
    pub current_container: ShapeId,
    pub working_container: ShapeId,
    pub selection: SelectionState,
    pub hit_test: Option<HitTest>,
    pub input: Box<dyn InputService>,
    pub path_converter: Option<Box<dyn PathConverter>>,
    pub view_scale: f32,
}

impl std::fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorContext")
            .field("current_container", &self.current_container)
            .field("working_container", &self.working_container)
            .field("selection", &self.selection)
            .field("view_scale", &self.view_scale)
            .field("captured", &self.input.is_captured())
            .finish_non_exhaustive()
    }
}

impl EditorContext {
    /// Empty document with two canvases of the given size, a hit test service
    /// and headless input.
    pub fn new(width: f32, height: f32) -> Self {
        let mut document = Document::new();
        let current_container = document.add_canvas(width, height);
        let working_container = document.add_canvas(width, height);
        Self {
            document,
            current_container,
            working_container,
            selection: SelectionState::new(),
            hit_test: Some(HitTest::default()),
            input: Box::new(HeadlessInput::new()),
            path_converter: None,
            view_scale: 1.0,
        }
    }

    /// Context over an existing document.
    ///
    /// # Errors
    ///
    /// Fails if either container id is not a shape of the document.
    pub fn with_document(document: Document, current: ShapeId, working: ShapeId) -> EditorResult<Self> {
        for id in [current, working] {
            if !document.contains(id) {
                return Err(EditorError::ShapeNotFound(id));
            }
        }
        Ok(Self {
            document,
            current_container: current,
            working_container: working,
            selection: SelectionState::new(),
            hit_test: Some(HitTest::default()),
            input: Box::new(HeadlessInput::new()),
            path_converter: None,
            view_scale: 1.0,
        })
    }

    #[must_use]
    pub fn with_input(mut self, input: Box<dyn InputService>) -> Self {
        self.input = input;
        self
    }

    #[must_use]
    pub fn with_path_converter(mut self, converter: Box<dyn PathConverter>) -> Self {
        self.path_converter = Some(converter);
        self
    }
}

impl ToolContext for EditorContext {
    fn document(&self) -> &Document {
        &self.document
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    fn current_container(&self) -> ShapeId {
        self.current_container
    }

    fn working_container(&self) -> ShapeId {
        self.working_container
    }

    fn set_current_container(&mut self, id: ShapeId) -> EditorResult<()> {
        if !self.document.contains(id) {
            return Err(EditorError::ShapeNotFound(id));
        }
        self.current_container = id;
        Ok(())
    }

    fn set_working_container(&mut self, id: ShapeId) -> EditorResult<()> {
        if !self.document.contains(id) {
            return Err(EditorError::ShapeNotFound(id));
        }
        self.working_container = id;
        Ok(())
    }

    fn selection(&self) -> &SelectionState {
        &self.selection
    }

    fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    fn hit_test(&self) -> Option<&HitTest> {
        self.hit_test.as_ref()
    }

    fn input(&mut self) -> &mut dyn InputService {
        self.input.as_mut()
    }

    fn view_scale(&self) -> f32 {
        self.view_scale
    }

    fn path_converter(&self) -> Option<&dyn PathConverter> {
        self.path_converter.as_deref()
    }

    fn document_with_converter(&mut self) -> (&mut Document, Option<&dyn PathConverter>) {
        (&mut self.document, self.path_converter.as_deref())
    }
}

/// A context whose current and working containers are one figure.
///
/// Everything else is forwarded to the wrapped context. The first point
/// requested after [`FigureContext::chain_from`] is the given point, so a new
/// segment starts where the previous one ended.
pub struct FigureContext<'a> {
    inner: &'a mut dyn ToolContext,
    figure: ShapeId,
    next_start: Option<ShapeId>,
}

impl<'a> FigureContext<'a> {
    pub fn new(inner: &'a mut dyn ToolContext, figure: ShapeId) -> Self {
        Self {
            inner,
            figure,
            next_start: None,
        }
    }

    /// Hand out `point` for the next `get_next_point` call.
    pub fn chain_from(&mut self, point: Option<ShapeId>) {
        self.next_start = point;
    }

    pub fn figure(&self) -> ShapeId {
        self.figure
    }
}

impl ToolContext for FigureContext<'_> {
    fn document(&self) -> &Document {
        self.inner.document()
    }

    fn document_mut(&mut self) -> &mut Document {
        self.inner.document_mut()
    }

    fn current_container(&self) -> ShapeId {
        self.figure
    }

    fn working_container(&self) -> ShapeId {
        self.figure
    }

    fn set_current_container(&mut self, _id: ShapeId) -> EditorResult<()> {
        Err(EditorError::ContainerReassignment { container: "current" })
    }

    fn set_working_container(&mut self, _id: ShapeId) -> EditorResult<()> {
        Err(EditorError::ContainerReassignment { container: "working" })
    }

    fn selection(&self) -> &SelectionState {
        self.inner.selection()
    }

    fn selection_mut(&mut self) -> &mut SelectionState {
        self.inner.selection_mut()
    }

    fn hit_test(&self) -> Option<&HitTest> {
        self.inner.hit_test()
    }

    fn input(&mut self) -> &mut dyn InputService {
        self.inner.input()
    }

    fn view_scale(&self) -> f32 {
        self.inner.view_scale()
    }

    fn path_converter(&self) -> Option<&dyn PathConverter> {
        self.inner.path_converter()
    }

    fn document_with_converter(&mut self) -> (&mut Document, Option<&dyn PathConverter>) {
        self.inner.document_with_converter()
    }

    fn current_style(&self) -> Option<StyleId> {
        self.inner.current_style()
    }

    fn point_style(&self) -> Option<StyleId> {
        self.inner.point_style()
    }

    fn get_next_point(&mut self, pos: Pos2, connect: bool, radius: f32, modifier: Modifiers) -> ShapeId {
        if let Some(point) = self.next_start.take() {
            debug!("continuing figure {} from point {point}", self.figure);
            return point;
        }
        self.inner.get_next_point(pos, connect, radius, modifier)
    }
}

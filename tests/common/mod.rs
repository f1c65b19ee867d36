#![allow(dead_code)]

use egui::{Modifiers, Pos2};
use vector_paint::{Editor, EditorConfig, Shape, ShapeId, ShapeKind, ToolOutcome};

pub const NONE: Modifiers = Modifiers::NONE;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn editor() -> Editor {
    editor_with(&EditorConfig::default())
}

pub fn editor_with(config: &EditorConfig) -> Editor {
    init_logger();
    Editor::new(config).unwrap()
}

/// Press and release the primary button at `pos`; returns what the press did.
pub fn click(editor: &mut Editor, pos: Pos2) -> ToolOutcome {
    let outcome = editor.left_down(pos, NONE).unwrap();
    editor.left_up(pos, NONE).unwrap();
    outcome
}

/// Press, drag through `path` and release at its last position; returns
/// what the release did.
pub fn drag(editor: &mut Editor, from: Pos2, path: &[Pos2], modifier: Modifiers) -> ToolOutcome {
    editor.left_down(from, modifier).unwrap();
    for pos in path {
        editor.move_pointer(*pos, modifier).unwrap();
    }
    let end = path.last().copied().unwrap_or(from);
    editor.left_up(end, modifier).unwrap()
}

pub fn committed(outcome: ToolOutcome) -> Vec<ShapeId> {
    match outcome {
        ToolOutcome::Committed(ids) => ids,
        other => panic!("expected a commit, got {other:?}"),
    }
}

/// Committed shapes of the editor's current canvas
pub fn current_shapes(editor: &Editor) -> Vec<ShapeId> {
    editor.document().shapes_of(editor.context().current_container).to_vec()
}

pub fn working_shapes(editor: &Editor) -> Vec<ShapeId> {
    editor.document().shapes_of(editor.context().working_container).to_vec()
}

/// A line added straight into the current canvas, bypassing the tools.
pub fn add_line(editor: &mut Editor, a: Pos2, b: Pos2) -> ShapeId {
    let ctx = editor.context_mut();
    let current = ctx.current_container;
    let doc = &mut ctx.document;
    let start = doc.add_point(a, None, None);
    let end = doc.add_point(b, None, None);
    let id = doc.insert(Shape::new(ShapeKind::Line { start, end }, None));
    doc.add_shape(current, id).unwrap();
    id
}

pub fn kind(editor: &Editor, id: ShapeId) -> ShapeKind {
    editor.document().kind(id).cloned().unwrap()
}

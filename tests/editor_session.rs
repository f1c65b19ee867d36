mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{NONE, add_line, click, committed, current_shapes, drag, editor, editor_with, kind, working_shapes};
use egui::pos2;
use vector_paint::tools::{PathSubTool, TOOL_NAMES, new_tool};
use vector_paint::{
    Document, Editor, EditorConfig, EditorContext, EditorError, InputService, SelectionCommand, ShapeId, ShapeKind, Tool,
    ToolOutcome,
};

#[test]
fn test_starts_with_selection_tool() {
    let editor = editor();
    assert_eq!(editor.tool().name(), "Selection");
    let names: Vec<&str> = editor.tools().iter().map(|t| t.name()).collect();
    assert_eq!(names, TOOL_NAMES);
    assert_eq!(editor.document().canvas_size(editor.context().current_container), Some(egui::vec2(800.0, 600.0)));
}

#[test]
fn test_unknown_tool_keeps_current() {
    let mut editor = editor();
    editor.set_tool("Line").unwrap();
    let result = editor.set_tool("Airbrush");
    assert!(matches!(result, Err(EditorError::UnknownTool(name)) if name == "Airbrush"));
    assert_eq!(editor.tool().name(), "Line");
}

#[test]
fn test_switching_tool_drops_gesture_in_progress() {
    let mut editor = editor();
    editor.set_tool("Line").unwrap();
    click(&mut editor, pos2(100.0, 100.0));
    assert!(editor.context().input.is_captured());

    editor.set_tool("Rectangle").unwrap();
    assert!(working_shapes(&editor).is_empty());
    assert!(current_shapes(&editor).is_empty());
    assert!(!editor.context().input.is_captured());

    // The next click starts a rectangle, not a leftover line.
    click(&mut editor, pos2(100.0, 100.0));
    let ids = committed(click(&mut editor, pos2(200.0, 200.0)));
    assert!(matches!(kind(&editor, ids[0]), ShapeKind::Rectangle { .. }));
}

#[test]
fn test_undo_and_redo_drawing() {
    let mut editor = editor();
    editor.set_tool("Line").unwrap();
    click(&mut editor, pos2(100.0, 100.0));
    let line = committed(click(&mut editor, pos2(300.0, 100.0)))[0];
    click(&mut editor, pos2(100.0, 300.0));
    let second = committed(click(&mut editor, pos2(300.0, 300.0)))[0];

    editor.undo().unwrap();
    assert_eq!(current_shapes(&editor), vec![line]);
    editor.undo().unwrap();
    assert!(current_shapes(&editor).is_empty());
    assert!(matches!(editor.undo(), Err(EditorError::EmptyHistory("undo"))));

    editor.redo().unwrap();
    editor.redo().unwrap();
    assert_eq!(current_shapes(&editor), vec![line, second]);
    assert!(!editor.history().can_redo());
}

#[test]
fn test_new_change_clears_redo() {
    let mut editor = editor();
    editor.set_tool("Line").unwrap();
    click(&mut editor, pos2(100.0, 100.0));
    committed(click(&mut editor, pos2(300.0, 100.0)));
    editor.undo().unwrap();
    assert!(editor.history().can_redo());

    click(&mut editor, pos2(100.0, 300.0));
    committed(click(&mut editor, pos2(300.0, 300.0)));
    assert!(!editor.history().can_redo());
}

#[test]
fn test_undo_clears_selection_and_previews() {
    let mut editor = editor();
    let line = add_line(&mut editor, pos2(100.0, 100.0), pos2(300.0, 100.0));
    editor.context_mut().selection.select(line);
    committed(editor.execute(SelectionCommand::Delete).unwrap());
    assert!(current_shapes(&editor).is_empty());

    editor.set_tool("Line").unwrap();
    click(&mut editor, pos2(400.0, 400.0));
    editor.undo().unwrap();

    assert_eq!(current_shapes(&editor), vec![line]);
    assert!(working_shapes(&editor).is_empty());
    assert!(editor.selection().is_empty());
    assert!(!editor.context().input.is_captured());
}

#[test]
fn test_commands_without_effect_are_not_recorded() {
    let mut editor = editor();
    assert_eq!(editor.execute(SelectionCommand::Group).unwrap(), ToolOutcome::None);
    assert_eq!(editor.execute(SelectionCommand::Delete).unwrap(), ToolOutcome::None);
    assert!(!editor.history().can_undo());
}

#[test]
fn test_prune_drops_deleted_shapes() {
    let mut editor = editor();
    let line = add_line(&mut editor, pos2(100.0, 100.0), pos2(300.0, 100.0));
    let kept = add_line(&mut editor, pos2(100.0, 300.0), pos2(300.0, 300.0));
    editor.context_mut().selection.select(line);
    committed(editor.execute(SelectionCommand::Delete).unwrap());

    assert!(editor.document().contains(line));
    assert!(editor.prune() >= 3);
    assert!(!editor.document().contains(line));
    assert!(editor.document().contains(kept));
    assert_eq!(editor.prune(), 0);
}

#[test]
fn test_view_scale_shrinks_connect_radius() {
    let mut editor = editor();
    let line = add_line(&mut editor, pos2(100.0, 100.0), pos2(300.0, 100.0));
    let start = editor.document().points_of(line)[0];
    let end = editor.document().points_of(line)[1];
    editor.set_tool("Line").unwrap();

    editor.set_view_scale(4.0);
    click(&mut editor, pos2(95.0, 100.0));
    let far = committed(click(&mut editor, pos2(95.0, 300.0)))[0];
    assert_ne!(editor.document().points_of(far)[0], start);

    editor.set_view_scale(1.0);
    click(&mut editor, pos2(305.0, 100.0));
    let near = committed(click(&mut editor, pos2(450.0, 300.0)))[0];
    assert_eq!(editor.document().points_of(near)[0], end);
}

#[test]
fn test_path_tool_builds_one_path() {
    let mut editor = editor();
    editor.set_tool("Path").unwrap();
    assert_eq!(click(&mut editor, pos2(100.0, 100.0)), ToolOutcome::None);
    assert_eq!(click(&mut editor, pos2(300.0, 100.0)), ToolOutcome::None);
    assert_eq!(click(&mut editor, pos2(300.0, 300.0)), ToolOutcome::None);
    assert!(current_shapes(&editor).is_empty());

    let ids = committed(editor.right_down(pos2(300.0, 300.0), NONE).unwrap());
    assert_eq!(current_shapes(&editor), ids);
    let ShapeKind::Path { figures, .. } = kind(&editor, ids[0]) else {
        panic!("expected a path");
    };
    assert_eq!(figures.len(), 1);
    let ShapeKind::Figure { shapes, is_closed, .. } = kind(&editor, figures[0]) else {
        panic!("expected a figure");
    };
    assert_eq!(shapes.len(), 2);
    assert!(is_closed);
    assert!(working_shapes(&editor).is_empty());

    editor.undo().unwrap();
    assert!(current_shapes(&editor).is_empty());
}

#[test]
fn test_path_tool_with_curve_sub_tool() {
    let mut config = EditorConfig::default();
    config.path.sub_tool = PathSubTool::QuadraticBezier;
    let mut editor = editor_with(&config);
    editor.set_tool("Path").unwrap();

    click(&mut editor, pos2(100.0, 300.0));
    click(&mut editor, pos2(300.0, 300.0));
    click(&mut editor, pos2(200.0, 200.0));
    let ids = committed(editor.right_down(pos2(0.0, 0.0), NONE).unwrap());

    let doc = editor.document();
    let figure = doc.shapes_of(ids[0])[0];
    let segments = doc.shapes_of(figure);
    assert_eq!(segments.len(), 1);
    assert!(matches!(doc.kind(segments[0]), Some(ShapeKind::QuadraticBezier { .. })));
}

#[test]
fn test_path_without_segments_is_discarded() {
    let mut editor = editor();
    editor.set_tool("Path").unwrap();
    click(&mut editor, pos2(100.0, 100.0));
    let outcome = editor.right_down(pos2(100.0, 100.0), NONE).unwrap();
    assert_eq!(outcome, ToolOutcome::Discarded("path has no segments"));
    assert!(current_shapes(&editor).is_empty());
    assert!(!editor.history().can_undo());
}

#[test]
fn test_scribble_stroke() {
    let mut editor = editor();
    editor.set_tool("Scribble").unwrap();
    let stroke: Vec<_> = (1..=20)
        .map(|i| {
            let x = 100.0 + i as f32 * 10.0;
            let y = if i <= 10 { 100.0 } else { 100.0 + (i - 10) as f32 * 10.0 };
            pos2(x, y)
        })
        .collect();

    let ids = committed(drag(&mut editor, pos2(100.0, 100.0), &stroke, NONE));
    let doc = editor.document();
    let figure = doc.shapes_of(ids[0])[0];
    // Two straight runs survive simplification.
    assert_eq!(doc.shapes_of(figure).len(), 2);
    assert!(editor.history().can_undo());
}

#[test]
fn test_config_file_round_trip() {
    let mut config = EditorConfig::default();
    config.canvas_width = 1024.0;
    config.line_snap.threshold = 4.0;
    config.path.sub_tool = PathSubTool::Conic;
    let path = std::env::temp_dir().join(format!("vector_paint_config_{}.json", std::process::id()));

    config.save(&path).unwrap();
    let loaded = EditorConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded, config);
    let editor = editor_with(&loaded);
    assert_eq!(
        editor.document().canvas_size(editor.context().current_container),
        Some(egui::vec2(1024.0, 600.0))
    );
}

#[test]
fn test_missing_config_file_is_an_error() {
    let result = EditorConfig::load("/definitely/not/here/config.json");
    assert!(matches!(result, Err(EditorError::Io(_))));
}

/// Host input layer that logs every request.
struct RecordingInput {
    log: Rc<RefCell<Vec<&'static str>>>,
    captured: bool,
}

impl InputService for RecordingInput {
    fn capture(&mut self) {
        self.captured = true;
        self.log.borrow_mut().push("capture");
    }

    fn release(&mut self) {
        self.captured = false;
        self.log.borrow_mut().push("release");
    }

    fn redraw(&mut self) {
        self.log.borrow_mut().push("redraw");
    }

    fn is_captured(&self) -> bool {
        self.captured
    }
}

#[test]
fn test_host_document_and_input() {
    common::init_logger();
    let mut document = Document::new();
    let current = document.add_canvas(400.0, 300.0);
    let working = document.add_canvas(400.0, 300.0);
    let log = Rc::new(RefCell::new(Vec::new()));
    let input = RecordingInput {
        log: Rc::clone(&log),
        captured: false,
    };
    let context = EditorContext::with_document(document, current, working)
        .unwrap()
        .with_input(Box::new(input));
    let mut editor = Editor::with_context(context, &EditorConfig::default()).unwrap();
    editor.set_tool("Line").unwrap();

    click(&mut editor, pos2(50.0, 50.0));
    let ids = committed(click(&mut editor, pos2(150.0, 50.0)));

    assert_eq!(editor.document().shapes_of(current), &ids[..]);
    let log = log.borrow();
    assert_eq!(log.iter().filter(|e| **e == "capture").count(), 1);
    assert!(log.contains(&"release"));
    assert!(log.contains(&"redraw"));
    assert!(!editor.context().input.is_captured());
}

#[test]
fn test_host_document_must_hold_containers() {
    let document = Document::new();
    let missing = ShapeId::new();
    let result = EditorContext::with_document(document, missing, missing);
    assert!(matches!(result, Err(EditorError::ShapeNotFound(id)) if id == missing));
}

#[test]
fn test_tool_factory() {
    let tool = new_tool("Conic").unwrap();
    assert_eq!(tool.name(), "Conic");
    assert_eq!(tool.state_name(), "StartPoint");
    assert!(matches!(new_tool("Brush"), Err(EditorError::UnknownTool(_))));
}

#[test]
fn test_clean_twice_mid_gesture() {
    let mut editor = editor();
    let line = add_line(&mut editor, pos2(100.0, 100.0), pos2(300.0, 100.0));
    editor.context_mut().selection.select(line);

    for (tool, modifier) in [("Line", NONE), ("Path", NONE), ("Selection", egui::Modifiers::SHIFT)] {
        editor.set_tool(tool).unwrap();
        editor.left_down(pos2(500.0, 500.0), modifier).unwrap();
        editor.move_pointer(pos2(550.0, 450.0), modifier).unwrap();
        assert!(!working_shapes(&editor).is_empty(), "{tool}");
        assert!(editor.context().input.is_captured(), "{tool}");

        editor.clean_tool();
        editor.clean_tool();

        assert!(working_shapes(&editor).is_empty(), "{tool}");
        assert!(!editor.context().input.is_captured(), "{tool}");
        assert_eq!(current_shapes(&editor), vec![line], "{tool}");
        assert_eq!(editor.selection().selected(), &[line], "{tool}");
        assert!(!editor.history().can_undo(), "{tool}");
    }
}

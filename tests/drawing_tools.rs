mod common;

use common::{NONE, click, committed, current_shapes, editor, editor_with, kind, working_shapes};
use egui::{Modifiers, pos2};
use vector_paint::{EditorConfig, ShapeKind, Tool, ToolOutcome};

#[test]
fn test_line_commits_on_second_click() {
    let mut editor = editor();
    editor.set_tool("Line").unwrap();

    assert_eq!(click(&mut editor, pos2(100.0, 100.0)), ToolOutcome::None);
    assert!(editor.context().input.is_captured());
    assert_eq!(working_shapes(&editor).len(), 1);

    editor.move_pointer(pos2(250.0, 180.0), NONE).unwrap();
    let ids = committed(click(&mut editor, pos2(300.0, 100.0)));

    assert_eq!(ids.len(), 1);
    assert_eq!(current_shapes(&editor), ids);
    assert!(working_shapes(&editor).is_empty());
    assert!(!editor.context().input.is_captured());
    assert_eq!(
        editor.document().structural_positions(ids[0]),
        vec![pos2(100.0, 100.0), pos2(300.0, 100.0)]
    );
    assert!(editor.history().can_undo());
}

#[test]
fn test_line_connects_to_existing_end_point() {
    let mut editor = editor();
    editor.set_tool("Line").unwrap();
    click(&mut editor, pos2(100.0, 100.0));
    let first = committed(click(&mut editor, pos2(300.0, 100.0)))[0];

    click(&mut editor, pos2(303.0, 102.0));
    let second = committed(click(&mut editor, pos2(300.0, 300.0)))[0];

    let ShapeKind::Line { end, .. } = kind(&editor, first) else {
        panic!("expected a line");
    };
    let ShapeKind::Line { start, .. } = kind(&editor, second) else {
        panic!("expected a line");
    };
    assert_eq!(start, end);

    // Moving the shared point changes both lines.
    editor.context_mut().document.set_position(end, pos2(310.0, 110.0));
    assert_eq!(editor.document().structural_positions(first)[1], pos2(310.0, 110.0));
    assert_eq!(editor.document().structural_positions(second)[0], pos2(310.0, 110.0));
}

#[test]
fn test_connect_can_be_switched_off() {
    let mut config = EditorConfig::default();
    config.line.connect_points = false;
    config.line_snap.is_enabled = false;
    let mut editor = editor_with(&config);
    editor.set_tool("Line").unwrap();
    click(&mut editor, pos2(100.0, 100.0));
    let first = committed(click(&mut editor, pos2(300.0, 100.0)))[0];
    click(&mut editor, pos2(300.0, 100.0));
    let second = committed(click(&mut editor, pos2(300.0, 300.0)))[0];

    let ShapeKind::Line { end, .. } = kind(&editor, first) else {
        panic!("expected a line");
    };
    let ShapeKind::Line { start, .. } = kind(&editor, second) else {
        panic!("expected a line");
    };
    assert_ne!(start, end);
}

#[test]
fn test_right_click_cancels_line() {
    let mut editor = editor();
    editor.set_tool("Line").unwrap();
    click(&mut editor, pos2(100.0, 100.0));

    let outcome = editor.right_down(pos2(100.0, 100.0), NONE).unwrap();
    assert_eq!(outcome, ToolOutcome::Cancelled);
    assert!(current_shapes(&editor).is_empty());
    assert!(working_shapes(&editor).is_empty());
    assert!(!editor.context().input.is_captured());
    assert!(!editor.history().can_undo());
    assert_eq!(editor.tool().state_name(), "StartPoint");

    // Right click while idle does nothing.
    assert_eq!(editor.right_down(pos2(0.0, 0.0), NONE).unwrap(), ToolOutcome::None);
}

#[test]
fn test_polyline_chains_segments() {
    let mut editor = editor();
    editor.set_tool("PolyLine").unwrap();

    click(&mut editor, pos2(100.0, 100.0));
    let a = committed(click(&mut editor, pos2(250.0, 100.0)));
    let b = committed(click(&mut editor, pos2(250.0, 250.0)));
    assert_eq!((a.len(), b.len()), (1, 1));
    // The next segment is already following the pointer.
    assert_eq!(working_shapes(&editor).len(), 1);

    assert_eq!(editor.right_down(pos2(0.0, 0.0), NONE).unwrap(), ToolOutcome::Cancelled);
    assert_eq!(current_shapes(&editor), vec![a[0], b[0]]);
    assert!(working_shapes(&editor).is_empty());

    let ShapeKind::Line { end, .. } = kind(&editor, a[0]) else {
        panic!("expected a line");
    };
    let ShapeKind::Line { start, .. } = kind(&editor, b[0]) else {
        panic!("expected a line");
    };
    assert_eq!(start, end);
}

#[test]
fn test_line_splits_at_intersections() {
    let mut config = EditorConfig::default();
    config.line.split_intersections = true;
    let mut editor = editor_with(&config);
    editor.set_tool("Line").unwrap();

    click(&mut editor, pos2(100.0, 200.0));
    committed(click(&mut editor, pos2(300.0, 200.0)));

    click(&mut editor, pos2(200.0, 100.0));
    let segments = committed(click(&mut editor, pos2(200.0, 300.0)));

    assert_eq!(segments.len(), 2);
    assert_eq!(current_shapes(&editor).len(), 3);
    let doc = editor.document();
    let first = doc.structural_positions(segments[0]);
    let second = doc.structural_positions(segments[1]);
    assert_eq!(first, vec![pos2(200.0, 100.0), pos2(200.0, 200.0)]);
    assert_eq!(second, vec![pos2(200.0, 200.0), pos2(200.0, 300.0)]);
    assert_eq!(doc.points_of(segments[0])[1], doc.points_of(segments[1])[0]);
    // Crossing markers do not outlive the gesture.
    assert!(working_shapes(&editor).is_empty());
}

#[test]
fn test_cubic_bezier_takes_four_clicks() {
    let mut editor = editor();
    editor.set_tool("CubicBezier").unwrap();

    click(&mut editor, pos2(100.0, 100.0));
    assert_eq!(editor.tool().state_name(), "Point3");
    click(&mut editor, pos2(400.0, 100.0));
    assert_eq!(editor.tool().state_name(), "Point1");
    click(&mut editor, pos2(200.0, 50.0));
    assert_eq!(editor.tool().state_name(), "Point2");
    let ids = committed(click(&mut editor, pos2(300.0, 50.0)));

    assert!(matches!(kind(&editor, ids[0]), ShapeKind::CubicBezier { .. }));
    assert_eq!(
        editor.document().structural_positions(ids[0]),
        vec![pos2(100.0, 100.0), pos2(200.0, 50.0), pos2(300.0, 50.0), pos2(400.0, 100.0)]
    );
    assert_eq!(editor.tool().state_name(), "StartPoint");
}

#[test]
fn test_quadratic_bezier_end_point_before_control() {
    let mut editor = editor();
    editor.set_tool("QuadraticBezier").unwrap();

    click(&mut editor, pos2(100.0, 300.0));
    click(&mut editor, pos2(300.0, 300.0));
    editor.move_pointer(pos2(180.0, 210.0), NONE).unwrap();
    let ids = committed(click(&mut editor, pos2(200.0, 200.0)));

    assert_eq!(
        editor.document().structural_positions(ids[0]),
        vec![pos2(100.0, 300.0), pos2(200.0, 200.0), pos2(300.0, 300.0)]
    );
}

#[test]
fn test_conic_uses_configured_weight() {
    let mut config = EditorConfig::default();
    config.conic.weight = 2.0;
    let mut editor = editor_with(&config);
    editor.set_tool("Conic").unwrap();

    click(&mut editor, pos2(100.0, 300.0));
    click(&mut editor, pos2(300.0, 300.0));
    let ids = committed(click(&mut editor, pos2(200.0, 200.0)));

    let ShapeKind::Conic { weight, .. } = kind(&editor, ids[0]) else {
        panic!("expected a conic");
    };
    assert_eq!(weight, 2.0);
}

#[test]
fn test_curve_cancelled_midway_leaves_nothing() {
    let mut editor = editor();
    editor.set_tool("CubicBezier").unwrap();
    click(&mut editor, pos2(100.0, 100.0));
    click(&mut editor, pos2(400.0, 100.0));

    assert_eq!(editor.right_down(pos2(0.0, 0.0), NONE).unwrap(), ToolOutcome::Cancelled);
    assert!(current_shapes(&editor).is_empty());
    assert!(working_shapes(&editor).is_empty());
    assert!(editor.selection().is_empty());
}

#[test]
fn test_two_point_shapes() {
    for name in ["Rectangle", "Ellipse", "Text"] {
        let mut editor = editor();
        editor.set_tool(name).unwrap();
        click(&mut editor, pos2(100.0, 100.0));
        editor.move_pointer(pos2(150.0, 120.0), NONE).unwrap();
        assert_eq!(
            editor.document().structural_positions(working_shapes(&editor)[0])[1],
            pos2(150.0, 120.0)
        );
        let ids = committed(click(&mut editor, pos2(200.0, 150.0)));

        let bounds = editor.document().bounds(ids[0]).unwrap();
        assert_eq!(bounds.min, pos2(100.0, 100.0), "{name}");
        assert_eq!(bounds.max, pos2(200.0, 150.0), "{name}");
    }
}

#[test]
fn test_text_tool_uses_configured_text() {
    let mut config = EditorConfig::default();
    config.text.text = "Hello".to_string();
    let mut editor = editor_with(&config);
    editor.set_tool("Text").unwrap();
    click(&mut editor, pos2(100.0, 100.0));
    let ids = committed(click(&mut editor, pos2(200.0, 150.0)));

    let ShapeKind::Text { text, .. } = kind(&editor, ids[0]) else {
        panic!("expected text");
    };
    assert_eq!(text, "Hello");
}

#[test]
fn test_circle_around_center() {
    let mut editor = editor();
    editor.set_tool("Circle").unwrap();
    click(&mut editor, pos2(300.0, 300.0));
    let ids = committed(click(&mut editor, pos2(340.0, 300.0)));

    let bounds = editor.document().bounds(ids[0]).unwrap();
    assert_eq!(bounds.center(), pos2(300.0, 300.0));
    assert_eq!(bounds.width(), 80.0);
}

#[test]
fn test_rectangle_corner_snaps_to_line_end() {
    let mut editor = editor();
    let line = common::add_line(&mut editor, pos2(100.0, 100.0), pos2(100.0, 300.0));
    editor.set_tool("Rectangle").unwrap();

    click(&mut editor, pos2(104.0, 296.0));
    let ids = committed(click(&mut editor, pos2(250.0, 400.0)));

    let doc = editor.document();
    assert_eq!(doc.points_of(ids[0])[0], doc.points_of(line)[1]);
}

#[test]
fn test_grid_snap_rounds_clicks() {
    let mut config = EditorConfig::default();
    config.grid_snap.is_enabled = true;
    config.grid_snap.grid_size_x = 50.0;
    config.grid_snap.grid_size_y = 50.0;
    let mut editor = editor_with(&config);
    editor.set_tool("Line").unwrap();

    click(&mut editor, pos2(96.0, 104.0));
    let ids = committed(click(&mut editor, pos2(212.0, 140.0)));
    assert_eq!(
        editor.document().structural_positions(ids[0]),
        vec![pos2(100.0, 100.0), pos2(200.0, 150.0)]
    );
}

#[test]
fn test_hover_marks_connectable_point() {
    let mut editor = editor();
    let line = common::add_line(&mut editor, pos2(100.0, 100.0), pos2(300.0, 100.0));
    editor.set_tool("Line").unwrap();

    editor.move_pointer(pos2(302.0, 101.0), NONE).unwrap();
    let end = editor.document().points_of(line)[1];
    assert_eq!(editor.selection().hovered(), Some(end));

    editor.move_pointer(pos2(200.0, 400.0), Modifiers::NONE).unwrap();
    assert_eq!(editor.selection().hovered(), None);
}

fn crossing_markers(editor: &vector_paint::Editor) -> Vec<egui::Pos2> {
    let doc = editor.document();
    working_shapes(editor)
        .into_iter()
        .filter(|id| doc.is_point(*id))
        .filter_map(|id| doc.position(id))
        .collect()
}

#[test]
fn test_crossing_markers_follow_the_pointer() {
    let mut editor = editor();
    common::add_line(&mut editor, pos2(100.0, 200.0), pos2(300.0, 200.0));
    editor.set_tool("Line").unwrap();

    click(&mut editor, pos2(200.0, 100.0));
    editor.move_pointer(pos2(200.0, 300.0), NONE).unwrap();
    assert_eq!(crossing_markers(&editor), vec![pos2(200.0, 200.0)]);

    editor.move_pointer(pos2(250.0, 150.0), NONE).unwrap();
    assert!(crossing_markers(&editor).is_empty());

    editor.move_pointer(pos2(200.0, 300.0), NONE).unwrap();
    assert_eq!(crossing_markers(&editor).len(), 1);
    assert_eq!(editor.right_down(pos2(200.0, 300.0), NONE).unwrap(), ToolOutcome::Cancelled);
    assert!(working_shapes(&editor).is_empty());
    assert!(editor.selection().is_empty());

    click(&mut editor, pos2(200.0, 100.0));
    editor.move_pointer(pos2(200.0, 300.0), NONE).unwrap();
    committed(click(&mut editor, pos2(200.0, 300.0)));
    assert!(working_shapes(&editor).is_empty());
    assert_eq!(current_shapes(&editor).len(), 2);
}

#[test]
fn test_polyline_shows_crossing_markers() {
    let mut editor = editor();
    common::add_line(&mut editor, pos2(100.0, 200.0), pos2(300.0, 200.0));
    editor.set_tool("PolyLine").unwrap();

    click(&mut editor, pos2(150.0, 100.0));
    committed(click(&mut editor, pos2(250.0, 100.0)));
    editor.move_pointer(pos2(250.0, 300.0), NONE).unwrap();
    // The joint with the previous segment counts as a crossing too.
    assert_eq!(crossing_markers(&editor), vec![pos2(250.0, 100.0), pos2(250.0, 200.0)]);

    editor.right_down(pos2(250.0, 300.0), NONE).unwrap();
    assert!(working_shapes(&editor).is_empty());
}

//! Integration tests: authoring history and preview isolation.

use dlg_core::{Dialog, DialogProperties, ElementId, ElementSpec};
use dlg_editor::EditorSession;
use dlg_script::EmptyCatalog;
use pretty_assertions::assert_eq;

fn session() -> EditorSession {
    let _ = env_logger::builder().is_test(true).try_init();
    EditorSession::new(DialogProperties::default())
}

fn attr(s: &EditorSession, id: ElementId, key: &str) -> String {
    s.dialog()
        .element(id)
        .and_then(|e| e.attr(key))
        .unwrap_or_default()
        .to_string()
}

// ─── Basic undo/redo ────────────────────────────────────────────────────

#[test]
fn undo_restores_previous_value() {
    let mut s = session();
    let id = s.create(ElementSpec::new("Input").at(10.0, 10.0)).unwrap();
    s.set_attr(id, "width", "200").unwrap();
    s.set_attr(id, "width", "300").unwrap();

    assert_eq!(s.undo().unwrap().as_deref(), Some("edit properties"));
    assert_eq!(attr(&s, id, "width"), "200");
    s.undo().unwrap();
    assert_eq!(attr(&s, id, "width"), "120");
    s.redo().unwrap();
    assert_eq!(attr(&s, id, "width"), "200");
}

#[test]
fn undo_create_then_redo_keeps_the_id() {
    let mut s = session();
    let id = s.create(ElementSpec::new("Button").named("ok")).unwrap();
    s.undo().unwrap();
    assert!(s.dialog().element(id).is_none());
    assert!(s.selection().is_empty());

    s.redo().unwrap();
    assert_eq!(s.dialog().by_name("ok").map(|e| e.id), Some(id));
}

#[test]
fn nothing_to_undo_is_none() {
    let mut s = session();
    assert_eq!(s.undo().unwrap(), None);
    assert_eq!(s.redo().unwrap(), None);
}

// ─── Reactions and renames ──────────────────────────────────────────────

#[test]
fn undo_restores_radio_siblings() {
    let mut s = session();
    let a = s.create(ElementSpec::new("Radio").attr("group", "g")).unwrap();
    let b = s.create(ElementSpec::new("Radio").attr("group", "g")).unwrap();
    s.set_attr(a, "isSelected", "true").unwrap();
    s.set_attr(b, "isSelected", "true").unwrap();
    assert_eq!(attr(&s, a, "isSelected"), "false");

    s.undo().unwrap();
    assert_eq!(attr(&s, a, "isSelected"), "true");
    assert_eq!(attr(&s, b, "isSelected"), "false");
}

#[test]
fn undo_rename_restores_script_references() {
    let mut dialog = Dialog::new(DialogProperties::default());
    let id = dialog.create(ElementSpec::new("Label").named("title")).unwrap();
    dialog.set_script("ui.on('title', 'click', show);\n");
    let mut s = EditorSession::from_dialog(dialog);

    s.set_attr(id, "nameid", "heading").unwrap();
    assert_eq!(s.dialog().script(), "ui.on('heading', 'click', show);\n");

    s.undo().unwrap();
    assert_eq!(attr(&s, id, "nameid"), "title");
    assert_eq!(s.dialog().script(), "ui.on('title', 'click', show);\n");
}

// ─── Structure ──────────────────────────────────────────────────────────

#[test]
fn undo_group_restores_siblings() {
    let mut s = session();
    let a = s.create(ElementSpec::new("Checkbox").at(10.0, 10.0)).unwrap();
    let b = s.create(ElementSpec::new("Checkbox").at(40.0, 10.0)).unwrap();
    let c = s.create(ElementSpec::new("Checkbox").at(70.0, 10.0)).unwrap();

    let g = s.group(&[a, b]).unwrap();
    assert_eq!(s.dialog().registry().children(None), vec![g, c]);
    assert_eq!(s.selection(), &[g]);

    s.undo().unwrap();
    assert_eq!(s.dialog().registry().children(None), vec![a, b, c]);
    assert_eq!(attr(&s, b, "left"), "40");
}

#[test]
fn delete_selection_is_one_step() {
    let mut s = session();
    let a = s.create(ElementSpec::new("Label")).unwrap();
    let b = s.create(ElementSpec::new("Label")).unwrap();
    s.select(a);
    s.extend_selection(b);

    assert_eq!(s.remove_selected().unwrap(), 2);
    assert!(s.dialog().registry().is_empty());

    assert_eq!(s.undo().unwrap().as_deref(), Some("delete selection"));
    assert_eq!(s.dialog().registry().len(), 2);
}

// ─── Gestures ───────────────────────────────────────────────────────────

#[test]
fn nudge_is_a_single_undo_step() {
    let mut s = session();
    let id = s.create(ElementSpec::new("Button").at(10.0, 10.0)).unwrap();
    for _ in 0..5 {
        s.nudge_selection(2.0, 1.0).unwrap();
    }
    assert_eq!(attr(&s, id, "left"), "20");
    assert_eq!(attr(&s, id, "top"), "15");

    s.undo().unwrap();
    assert_eq!(attr(&s, id, "left"), "18");

    s.begin_gesture().unwrap();
    s.nudge_selection(5.0, 0.0).unwrap();
    s.nudge_selection(5.0, 0.0).unwrap();
    s.end_gesture("drag").unwrap();
    assert_eq!(attr(&s, id, "left"), "28");
    assert_eq!(s.undo().unwrap().as_deref(), Some("drag"));
    assert_eq!(attr(&s, id, "left"), "18");
}

// ─── Preview ────────────────────────────────────────────────────────────

#[test]
fn preview_never_touches_the_authored_dialog() {
    let mut s = session();
    let id = s.create(ElementSpec::new("Input").named("name")).unwrap();

    let mut ui = s.preview(Box::new(EmptyCatalog));
    ui.set_value("name", "typed in preview").unwrap();
    ui.hide("name").unwrap();

    assert_eq!(attr(&s, id, "value"), "");
    assert!(s.dialog().element(id).unwrap().is_visible());
    assert!(ui.dialog().context().selection().is_empty());
}

#[test]
fn json_round_trip_keeps_elements() {
    let mut s = session();
    s.create(ElementSpec::new("Slider").named("level")).unwrap();
    let json = s.to_json().unwrap();

    let loaded = EditorSession::from_json(&json).unwrap();
    assert!(loaded.dialog().by_name("level").is_some());
    assert!(!loaded.can_undo());
}

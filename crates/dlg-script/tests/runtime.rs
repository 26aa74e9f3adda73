//! Scenario tests: scripts driving a previewed dialog.

use dlg_core::{Dialog, DialogProperties, ElementSpec, NoticeLevel};
use dlg_script::{
    EmptyCatalog, Interaction, ScriptError, ScriptValue, StaticCatalog, Ui, Variable,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn ui_with(build: impl FnOnce(&mut Dialog)) -> Ui {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut dialog = Dialog::new(DialogProperties::default());
    build(&mut dialog);
    Ui::new(dialog, Box::new(EmptyCatalog))
}

fn survey() -> Ui {
    ui_with(|d| {
        d.create(ElementSpec::new("Radio").named("male").attr("group", "sex"))
            .unwrap();
        d.create(ElementSpec::new("Radio").named("female").attr("group", "sex"))
            .unwrap();
        d.create(
            ElementSpec::new("Container")
                .named("vars")
                .attr("selection", "multiple")
                .attr("itemType", "numeric")
                .attr("items", "age,income,city")
                .attr("itemTypes", "numeric,numeric,string"),
        )
        .unwrap();
        d.create(ElementSpec::new("Button").named("run")).unwrap();
        d.create(ElementSpec::new("Input").named("title")).unwrap();
    })
}

/// Records the names seen by a handler.
fn recorder() -> (Rc<RefCell<Vec<String>>>, impl FnMut(&mut Ui, &dlg_script::Event) -> Result<(), ScriptError>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let handler = move |_: &mut Ui, event: &dlg_script::Event| {
        sink.borrow_mut().push(event.name.clone());
        Ok(())
    };
    (seen, handler)
}

// ─── Values ──────────────────────────────────────────────────────────────

#[test]
fn counter_values_are_clamped_to_range() {
    let mut ui = ui_with(|d| {
        d.create(
            ElementSpec::new("Counter")
                .named("n")
                .attr("minval", "1")
                .attr("startval", "2")
                .attr("maxval", "5"),
        )
        .unwrap();
    });
    ui.set_value("n", 10).unwrap();
    assert_eq!(ui.get_value("n").unwrap(), ScriptValue::Number(5.0));
    ui.set_value("n", -3).unwrap();
    assert_eq!(ui.get_value("n").unwrap(), ScriptValue::Number(1.0));
}

#[test]
fn missing_element_is_an_error_for_mutations() {
    let mut ui = survey();
    assert!(matches!(
        ui.set_value("nope", "x"),
        Err(ScriptError::ElementNotFound(name)) if name == "nope"
    ));
}

#[test]
fn unsupported_operation_warns_once() {
    let mut ui = survey();
    ui.set_value("run", "x").unwrap();
    ui.set_value("run", "y").unwrap();
    let warnings: Vec<_> = ui
        .drain_notices()
        .into_iter()
        .filter(|n| n.level == NoticeLevel::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
}

#[test]
fn loaded_duplicate_names_address_one_element_each() {
    let _ = env_logger::builder().is_test(true).try_init();
    let json = r#"{ "elements": [
        { "id": "input_1", "type": "Input", "attributes": { "nameid": "x", "value": "" } },
        { "id": "input_2", "type": "Input", "attributes": { "nameid": "x", "value": "" } }
    ] }"#;
    let mut ui = Ui::new(Dialog::from_json(json).unwrap(), Box::new(EmptyCatalog));

    ui.set_value("x", "first").unwrap();
    ui.set_value("input1", "second").unwrap();
    assert_eq!(ui.get_value("x").unwrap(), ScriptValue::Text("first".into()));
    assert_eq!(ui.get_value("input1").unwrap(), ScriptValue::Text("second".into()));
}

// ─── Radio groups ────────────────────────────────────────────────────────

#[test]
fn checking_a_radio_deselects_its_siblings() {
    let mut ui = survey();
    ui.check("male").unwrap();
    ui.check("female").unwrap();
    assert!(ui.is_unchecked("male"));
    assert!(ui.is_checked("female"));
    assert_eq!(ui.get_selected("sex").unwrap(), ScriptValue::Text("female".into()));
}

#[test]
fn set_selected_on_group_value_picks_member() {
    let mut ui = survey();
    assert_eq!(ui.get_selected("sex").unwrap(), ScriptValue::Null);
    ui.set_selected("sex", "male").unwrap();
    assert!(ui.is_checked("male"));
    assert!(ui.set_selected("sex", "other").is_err());
    assert!(matches!(
        ui.get_selected("nothing"),
        Err(ScriptError::TargetNotFound(_))
    ));
}

#[test]
fn group_handler_runs_only_for_selected_member() {
    let mut ui = survey();
    let (seen, handler) = recorder();
    ui.on_change("sex", handler).unwrap();

    assert!(ui.interact("male", Interaction::Click).unwrap());
    assert!(ui.interact("female", Interaction::Click).unwrap());
    // the deselected sibling changed too, but programmatically
    assert_eq!(*seen.borrow(), vec!["male".to_string(), "female".to_string()]);
}

// ─── Containers ──────────────────────────────────────────────────────────

#[test]
fn filtered_items_cannot_be_selected() {
    let mut ui = survey();
    ui.select("vars", "age").unwrap();
    assert!(matches!(
        ui.select("vars", "city"),
        Err(ScriptError::ItemDisabled { item, .. }) if item == "city"
    ));
    assert_eq!(ui.get_selected("vars").unwrap(), ScriptValue::List(vec!["age".into()]));
}

#[test]
fn container_content_operations() {
    let mut ui = survey();
    ui.set_value("vars", vec!["age", "income"]).unwrap();
    ui.add_value("vars", "weight").unwrap();
    ui.clear_value("vars").unwrap();
    assert_eq!(ui.get_value("vars").unwrap(), ScriptValue::List(Vec::new()));

    let state = ui.dialog().container_state(ui.dialog().by_name("vars").unwrap().id).unwrap();
    assert_eq!(state.len(), 4);

    ui.remove_value("vars", "weight").unwrap();
    assert!(matches!(
        ui.remove_value("vars", "weight"),
        Err(ScriptError::UnknownItem { .. })
    ));

    ui.clear_container("vars").unwrap();
    let state = ui.dialog().container_state(ui.dialog().by_name("vars").unwrap().id).unwrap();
    assert!(state.is_empty());
}

#[test]
fn catalog_variables_fill_a_container() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut dialog = Dialog::new(DialogProperties::default());
    dialog
        .create(ElementSpec::new("Container").named("vars").attr("selection", "multiple"))
        .unwrap();
    let catalog = StaticCatalog::new().with_dataset(
        "survey",
        vec![Variable::new("age", "numeric"), Variable::new("city", "string")],
    );
    let mut ui = Ui::new(dialog, Box::new(catalog));

    assert_eq!(ui.list_datasets(), vec!["survey".to_string()]);
    assert!(ui.list_variables("missing").is_empty());
    let items = ui.list_variables("survey").into_iter().map(Into::into).collect();
    ui.add_items("vars", items).unwrap();
    ui.select("vars", vec!["age", "city"]).unwrap();
    assert_eq!(ui.get_value("vars").unwrap(), ScriptValue::List(vec!["age".into(), "city".into()]));
}

// ─── Events ──────────────────────────────────────────────────────────────

#[test]
fn unknown_event_name_is_rejected() {
    let mut ui = survey();
    assert!(matches!(
        ui.on("run", "hover", |_, _| Ok(())),
        Err(ScriptError::UnsupportedEvent(e)) if e == "hover"
    ));
    assert!(matches!(
        ui.on("ghost", "click", |_, _| Ok(())),
        Err(ScriptError::TargetNotFound(_))
    ));
}

#[test]
fn programmatic_changes_do_not_fire_handlers() {
    let mut ui = survey();
    let (seen, handler) = recorder();
    ui.on_input("title", handler).unwrap();

    ui.set_value("title", "quiet").unwrap();
    assert!(seen.borrow().is_empty());

    assert!(ui.interact("title", Interaction::Input("typed".into())).unwrap());
    ui.trigger("title", "input").unwrap();
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn handlers_can_drive_other_elements() {
    let mut ui = survey();
    ui.on_click("run", |ui, _| ui.hide("vars")).unwrap();
    ui.interact("run", Interaction::Click).unwrap();
    assert!(ui.is_hidden("vars"));
}

#[test]
fn failing_handler_posts_an_error_notice() {
    let mut ui = survey();
    ui.on_click("run", |ui, _| ui.show("missing")).unwrap();
    ui.interact("run", Interaction::Click).unwrap();
    let errors: Vec<_> = ui
        .drain_notices()
        .into_iter()
        .filter(|n| n.level == NoticeLevel::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].detail.as_deref().unwrap_or_default().contains("missing"));
}

#[test]
fn reload_replaces_all_handlers() {
    let mut ui = survey();
    let (old, handler) = recorder();
    ui.on_click("run", handler).unwrap();
    ui.on_click("run", |_, _| Ok(())).unwrap();

    let (new, handler) = recorder();
    ui.reload(move |ui| ui.on_click("run", handler).map(|_| ()))
        .unwrap();
    assert_eq!(ui.handlers().len(), 1);

    ui.interact("run", Interaction::Click).unwrap();
    assert!(old.borrow().is_empty());
    assert_eq!(new.borrow().len(), 1);
}

#[test]
fn handler_may_dispose_everything_while_running() {
    let mut ui = survey();
    ui.on_click("run", |ui, _| {
        ui.dispose_all();
        Ok(())
    })
    .unwrap();
    ui.interact("run", Interaction::Click).unwrap();
    assert!(ui.handlers().is_empty());
}

// ─── Queries and presentation ────────────────────────────────────────────

#[test]
fn soft_queries_answer_false_for_missing_targets() {
    let ui = survey();
    assert!(!ui.is_visible("ghost"));
    assert!(!ui.is_hidden("ghost"));
    assert!(!ui.is_checked("ghost"));
    assert!(!ui.is_enabled("ghost"));
    assert!(!ui.is_disabled("ghost"));
}

#[test]
fn disabled_elements_ignore_interaction_in_preview() {
    let mut ui = survey();
    let (seen, handler) = recorder();
    ui.on_click("run", handler).unwrap();
    ui.disable("run").unwrap();
    assert!(!ui.interact("run", Interaction::Click).unwrap());
    ui.enable("run").unwrap();
    assert!(ui.interact("run", Interaction::Click).unwrap());
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn clicks_apply_only_to_clickable_kinds() {
    let mut ui = ui_with(|d| {
        d.create(ElementSpec::new("Label").named("caption")).unwrap();
        d.create(ElementSpec::new("Button").named("ok")).unwrap();
    });
    let (seen, handler) = recorder();
    ui.on_click("caption", handler).unwrap();

    assert!(!ui.interact("caption", Interaction::Click).unwrap());
    assert!(ui.interact("ok", Interaction::Click).unwrap());
    assert!(seen.borrow().is_empty());
}

// ─── Messaging ───────────────────────────────────────────────────────────

#[test]
fn validation_errors_attach_to_elements() {
    let mut ui = survey();
    ui.add_error(["title", "vars"], "required").unwrap();
    ui.add_error("title", "too short").unwrap();
    assert_eq!(ui.errors("title"), vec!["required".to_string(), "too short".to_string()]);

    ui.clear_error("title", Some("required")).unwrap();
    assert_eq!(ui.errors("title"), vec!["too short".to_string()]);
    ui.clear_error(vec!["title", "vars"], None).unwrap();
    assert!(ui.errors("vars").is_empty());

    assert!(ui.add_error(["title", "ghost"], "x").is_err());
    assert!(ui.errors("title").is_empty());
}

#[test]
fn messages_are_forwarded_to_the_host() {
    let mut ui = survey();
    ui.show_message("Done", Some("3 rows"), Some("warning"));
    let mut host = Vec::new();
    ui.forward_notices(&mut host);
    assert_eq!(host.len(), 1);
    assert_eq!(host[0].level, NoticeLevel::Warning);
    assert_eq!(host[0].detail.as_deref(), Some("3 rows"));
    assert!(ui.drain_notices().is_empty());
}

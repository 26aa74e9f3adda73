//! The procedural surface scripts call during preview.
//!
//! `Ui` owns one live dialog and addresses elements by nameid. Lookups of
//! missing elements fail for mutating calls and answer `false` for
//! queries. Calls an element type does not support warn once per
//! (element, operation) and do nothing. Programmatic changes never fire
//! event handlers; only simulated interactions and `trigger` do.

use crate::catalog::{DataCatalog, Variable};
use crate::error::ScriptError;
use crate::events::{Event, EventKind, Handler, HandlerId, HandlerRegistry, Scope};
use crate::value::ScriptValue;
use dlg_core::codec::{encode_bool, encode_list, encode_number};
use dlg_core::{
    AttrMap, ContainerItem, Dialog, DisplayPolicy, ElementId, ElementKind, Notice, NoticeLevel,
    NoticeSink, Row, StateError, ValueSlot,
};

/// One or more element names, for the batch forms of `add_error` and
/// `clear_error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Names(pub Vec<String>);

impl From<&str> for Names {
    fn from(name: &str) -> Self {
        Names(vec![name.to_string()])
    }
}

impl From<String> for Names {
    fn from(name: String) -> Self {
        Names(vec![name])
    }
}

impl From<Vec<&str>> for Names {
    fn from(names: Vec<&str>) -> Self {
        Names(names.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Names {
    fn from(names: [&str; N]) -> Self {
        Names(names.iter().map(|s| s.to_string()).collect())
    }
}

/// A simulated user interaction with one element.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Click,
    Input(String),
    SelectItem { index: usize, shift: bool },
    CycleRow(usize),
    MoveRow { from: usize, to: usize },
    Adjust(f64),
}

pub struct Ui {
    dialog: Dialog,
    catalog: Box<dyn DataCatalog>,
    handlers: HandlerRegistry,
}

impl std::fmt::Debug for Ui {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ui")
            .field("dialog", &self.dialog)
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

impl Ui {
    /// Bind to a dialog for preview. The dialog switches to the preview
    /// display policy.
    pub fn new(mut dialog: Dialog, catalog: Box<dyn DataCatalog>) -> Self {
        dialog.set_policy(DisplayPolicy::Preview);
        Self {
            dialog,
            catalog,
            handlers: HandlerRegistry::new(),
        }
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub fn into_dialog(self) -> Dialog {
        self.dialog
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.dialog.context_mut().drain_notices()
    }

    pub fn forward_notices(&mut self, sink: &mut dyn NoticeSink) {
        self.dialog.context_mut().forward_notices(sink);
    }

    // ─── Lookup helpers ──────────────────────────────────────────────────

    fn resolve(&self, name: &str) -> Result<(ElementId, ElementKind), ScriptError> {
        self.dialog
            .by_name(name)
            .map(|e| (e.id, e.kind))
            .ok_or_else(|| ScriptError::ElementNotFound(name.to_string()))
    }

    fn unsupported(&mut self, id: ElementId, operation: &'static str) {
        let kind = self.dialog.element(id).map(|e| e.kind);
        let message = match kind {
            Some(kind) => format!("`{operation}` is not supported for {kind} `{id}`"),
            None => format!("`{operation}` is not supported for `{id}`"),
        };
        self.dialog.context_mut().warn_once(id, operation, &message);
    }

    fn set(&mut self, id: ElementId, key: &str, value: String) -> Result<bool, ScriptError> {
        let res = self.dialog.set_attr(id, key, value)?;
        Ok(!res.changed.is_empty())
    }

    fn flag(&self, name: &str, test: impl Fn(&dlg_core::Element) -> bool) -> bool {
        self.dialog.by_name(name).is_some_and(test)
    }

    /// The script-facing value of an element.
    fn value_of(&self, id: ElementId) -> ScriptValue {
        let Some(element) = self.dialog.element(id) else {
            return ScriptValue::Null;
        };
        match element.kind.value_slot() {
            ValueSlot::Text(key) => ScriptValue::Text(element.attr(key).unwrap_or_default().to_string()),
            ValueSlot::Toggle(key) => ScriptValue::Bool(element.flag(key)),
            ValueSlot::Number(key) => element
                .number(key)
                .map(ScriptValue::Number)
                .unwrap_or_default(),
            ValueSlot::List => match element.kind {
                ElementKind::Container => self
                    .dialog
                    .container_state(id)
                    .map(|s| ScriptValue::List(s.selected()))
                    .unwrap_or_default(),
                _ => self
                    .dialog
                    .choicelist_state(id)
                    .map(|s| ScriptValue::List(s.value()))
                    .unwrap_or_default(),
            },
            ValueSlot::None => ScriptValue::Null,
        }
    }

    // ─── Value ───────────────────────────────────────────────────────────

    pub fn get_value(&mut self, name: &str) -> Result<ScriptValue, ScriptError> {
        let (id, kind) = self.resolve(name)?;
        if kind.value_slot() == ValueSlot::None {
            self.unsupported(id, "getValue");
        }
        Ok(self.value_of(id))
    }

    pub fn set_value(&mut self, name: &str, value: impl Into<ScriptValue>) -> Result<(), ScriptError> {
        let (id, kind) = self.resolve(name)?;
        let value = value.into();
        match kind.value_slot() {
            ValueSlot::Text(key) => {
                let text = value
                    .as_text()
                    .ok_or_else(|| ScriptError::invalid(name, "expected text"))?;
                self.set(id, key, text)?;
            }
            ValueSlot::Toggle(key) => {
                let on = value
                    .as_bool()
                    .ok_or_else(|| ScriptError::invalid(name, "expected true or false"))?;
                self.set(id, key, encode_bool(on))?;
            }
            ValueSlot::Number(key) => {
                let n = value
                    .as_number()
                    .ok_or_else(|| ScriptError::invalid(name, "expected a number"))?;
                let n = self.clamp_counter(id, kind, n);
                self.set(id, key, encode_number(n))?;
            }
            ValueSlot::List if kind == ElementKind::Container => {
                self.dialog
                    .set_active(id, &value.as_list())
                    .map_err(|e| ScriptError::from_state(name, e))?;
            }
            ValueSlot::List => {
                let rows = value
                    .as_list()
                    .iter()
                    .map(|token| Row::parse(token))
                    .collect::<Result<Vec<_>, StateError>>()
                    .map_err(|e| ScriptError::from_state(name, e))?;
                self.dialog
                    .set_rows(id, &rows)
                    .map_err(|e| ScriptError::from_state(name, e))?;
            }
            ValueSlot::None => self.unsupported(id, "setValue"),
        }
        Ok(())
    }

    /// Counters take the nearest value within `[minval, maxval]`.
    fn clamp_counter(&self, id: ElementId, kind: ElementKind, n: f64) -> f64 {
        if kind != ElementKind::Counter {
            return n;
        }
        let Some(e) = self.dialog.element(id) else {
            return n;
        };
        let min = e.number("minval").unwrap_or(f64::NEG_INFINITY);
        let max = e.number("maxval").unwrap_or(f64::INFINITY);
        if min <= max { n.clamp(min, max) } else { n }
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Selected value: active labels of a container, the value of a
    /// select, or for a radio group value the nameid of its selected
    /// member (`Null` when none is).
    pub fn get_selected(&mut self, name: &str) -> Result<ScriptValue, ScriptError> {
        if let Ok((id, kind)) = self.resolve(name) {
            return Ok(match kind {
                ElementKind::Container | ElementKind::Select | ElementKind::Radio => {
                    self.value_of(id)
                }
                _ => {
                    self.unsupported(id, "getSelected");
                    ScriptValue::Null
                }
            });
        }
        let members = self.dialog.registry().radio_group(name);
        if members.is_empty() {
            return Err(ScriptError::TargetNotFound(name.to_string()));
        }
        Ok(members
            .into_iter()
            .filter_map(|m| self.dialog.element(m))
            .find(|e| e.flag("isSelected"))
            .map(|e| ScriptValue::Text(e.nameid().to_string()))
            .unwrap_or_default())
    }

    /// Replace the selection exactly.
    pub fn set_selected(&mut self, name: &str, value: impl Into<ScriptValue>) -> Result<(), ScriptError> {
        let value = value.into();
        if let Ok((id, kind)) = self.resolve(name) {
            return match kind {
                ElementKind::Container | ElementKind::Select | ElementKind::Radio => {
                    self.set_value(name, value)
                }
                _ => {
                    self.unsupported(id, "setSelected");
                    Ok(())
                }
            };
        }
        let members = self.dialog.registry().radio_group(name);
        if members.is_empty() {
            return Err(ScriptError::TargetNotFound(name.to_string()));
        }
        let wanted = value.as_text().unwrap_or_default();
        let member = members
            .into_iter()
            .find(|m| self.dialog.element(*m).is_some_and(|e| e.nameid() == wanted))
            .ok_or_else(|| ScriptError::invalid(name, format!("`{wanted}` is not in this radio group")))?;
        self.set(member, "isSelected", encode_bool(true))?;
        Ok(())
    }

    /// Toggle each given item of a container (the legacy additive form).
    pub fn select(&mut self, name: &str, value: impl Into<ScriptValue>) -> Result<(), ScriptError> {
        let (id, kind) = self.resolve(name)?;
        let value = value.into();
        match kind {
            ElementKind::Container => {
                for label in value.as_list() {
                    self.dialog
                        .toggle_item(id, &label)
                        .map_err(|e| ScriptError::from_state(name, e))?;
                }
                Ok(())
            }
            ElementKind::Select => self.set_value(name, value),
            _ => {
                self.unsupported(id, "select");
                Ok(())
            }
        }
    }

    /// Append items to a container or select.
    pub fn add_value(&mut self, name: &str, value: impl Into<ScriptValue>) -> Result<(), ScriptError> {
        let items = value
            .into()
            .as_list()
            .into_iter()
            .map(|label| ContainerItem::new(label, None))
            .collect();
        self.add_items(name, items)
    }

    /// Append typed items, e.g. variables from the data catalog.
    pub fn add_items(&mut self, name: &str, items: Vec<ContainerItem>) -> Result<(), ScriptError> {
        let (id, kind) = self.resolve(name)?;
        match kind {
            ElementKind::Container => {
                for item in items {
                    self.dialog
                        .add_item(id, item)
                        .map_err(|e| ScriptError::from_state(name, e))?;
                }
            }
            ElementKind::Select => {
                let mut current = self
                    .dialog
                    .element(id)
                    .map(|e| e.list("items"))
                    .unwrap_or_default();
                for item in items {
                    if !current.contains(&item.label) {
                        current.push(item.label);
                    }
                }
                self.set(id, "items", encode_list(&current))?;
            }
            _ => self.unsupported(id, "addValue"),
        }
        Ok(())
    }

    /// Remove items by label. Unknown labels are an error for containers.
    pub fn remove_value(&mut self, name: &str, value: impl Into<ScriptValue>) -> Result<(), ScriptError> {
        let (id, kind) = self.resolve(name)?;
        let labels = value.into().as_list();
        match kind {
            ElementKind::Container => {
                for label in &labels {
                    self.dialog
                        .remove_item(id, label)
                        .map_err(|e| ScriptError::from_state(name, e))?;
                }
            }
            ElementKind::Select => {
                let mut current = self
                    .dialog
                    .element(id)
                    .map(|e| e.list("items"))
                    .unwrap_or_default();
                current.retain(|item| !labels.contains(item));
                self.set(id, "items", encode_list(&current))?;
            }
            _ => self.unsupported(id, "removeValue"),
        }
        Ok(())
    }

    /// Clear the selection or the text value, keeping any items.
    pub fn clear_value(&mut self, name: &str) -> Result<(), ScriptError> {
        let (id, kind) = self.resolve(name)?;
        match kind {
            ElementKind::Container => {
                self.dialog
                    .clear_active(id)
                    .map_err(|e| ScriptError::from_state(name, e))?;
            }
            ElementKind::Input | ElementKind::Select | ElementKind::Label => {
                self.set(id, "value", String::new())?;
            }
            ElementKind::ChoiceList => {
                self.dialog
                    .set_rows(id, &[])
                    .map_err(|e| ScriptError::from_state(name, e))?;
            }
            _ => self.unsupported(id, "clearValue"),
        }
        Ok(())
    }

    /// Remove every item.
    pub fn clear_container(&mut self, name: &str) -> Result<(), ScriptError> {
        let (id, kind) = self.resolve(name)?;
        match kind {
            ElementKind::Container => {
                self.dialog
                    .clear_items(id)
                    .map_err(|e| ScriptError::from_state(name, e))?;
            }
            ElementKind::Select | ElementKind::ChoiceList => {
                let mut batch = AttrMap::new();
                batch.insert("items".into(), String::new());
                self.dialog.update(id, batch)?;
            }
            _ => self.unsupported(id, "clearContainer"),
        }
        Ok(())
    }

    pub fn check(&mut self, name: &str) -> Result<(), ScriptError> {
        self.set_toggle(name, true, "check")
    }

    pub fn uncheck(&mut self, name: &str) -> Result<(), ScriptError> {
        self.set_toggle(name, false, "uncheck")
    }

    fn set_toggle(&mut self, name: &str, on: bool, operation: &'static str) -> Result<(), ScriptError> {
        let (id, kind) = self.resolve(name)?;
        match kind.value_slot() {
            ValueSlot::Toggle(key) => {
                self.set(id, key, encode_bool(on))?;
            }
            _ => self.unsupported(id, operation),
        }
        Ok(())
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn is_checked(&self, name: &str) -> bool {
        self.flag(name, |e| match e.kind.value_slot() {
            ValueSlot::Toggle(key) => e.flag(key),
            _ => false,
        })
    }

    pub fn is_unchecked(&self, name: &str) -> bool {
        self.flag(name, |e| match e.kind.value_slot() {
            ValueSlot::Toggle(key) => !e.flag(key),
            _ => false,
        })
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.flag(name, |e| e.is_visible())
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.flag(name, |e| !e.is_visible())
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.flag(name, |e| e.is_enabled())
    }

    pub fn is_disabled(&self, name: &str) -> bool {
        self.flag(name, |e| !e.is_enabled())
    }

    // ─── Visibility and enablement ───────────────────────────────────────

    pub fn show(&mut self, name: &str) -> Result<(), ScriptError> {
        let (id, _) = self.resolve(name)?;
        self.set(id, "isVisible", encode_bool(true)).map(|_| ())
    }

    pub fn hide(&mut self, name: &str) -> Result<(), ScriptError> {
        let (id, _) = self.resolve(name)?;
        self.set(id, "isVisible", encode_bool(false)).map(|_| ())
    }

    pub fn enable(&mut self, name: &str) -> Result<(), ScriptError> {
        let (id, _) = self.resolve(name)?;
        self.set(id, "isEnabled", encode_bool(true)).map(|_| ())
    }

    pub fn disable(&mut self, name: &str) -> Result<(), ScriptError> {
        let (id, _) = self.resolve(name)?;
        self.set(id, "isEnabled", encode_bool(false)).map(|_| ())
    }

    // ─── Events ──────────────────────────────────────────────────────────

    /// Subscribe to `event` on the element named `name`. A name that is
    /// not an element but a radio group value subscribes every member;
    /// the handler then runs only for the member that is selected.
    pub fn on<F>(&mut self, name: &str, event: &str, handler: F) -> Result<HandlerId, ScriptError>
    where
        F: FnMut(&mut Ui, &Event) -> Result<(), ScriptError> + 'static,
    {
        let kind: EventKind = event.parse()?;
        self.subscribe(name, kind, Box::new(handler))
    }

    pub fn on_click<F>(&mut self, name: &str, handler: F) -> Result<HandlerId, ScriptError>
    where
        F: FnMut(&mut Ui, &Event) -> Result<(), ScriptError> + 'static,
    {
        self.subscribe(name, EventKind::Click, Box::new(handler))
    }

    pub fn on_change<F>(&mut self, name: &str, handler: F) -> Result<HandlerId, ScriptError>
    where
        F: FnMut(&mut Ui, &Event) -> Result<(), ScriptError> + 'static,
    {
        self.subscribe(name, EventKind::Change, Box::new(handler))
    }

    pub fn on_input<F>(&mut self, name: &str, handler: F) -> Result<HandlerId, ScriptError>
    where
        F: FnMut(&mut Ui, &Event) -> Result<(), ScriptError> + 'static,
    {
        self.subscribe(name, EventKind::Input, Box::new(handler))
    }

    fn subscribe(&mut self, name: &str, kind: EventKind, handler: Handler) -> Result<HandlerId, ScriptError> {
        if let Ok((id, _)) = self.resolve(name) {
            return Ok(self.handlers.add(&[id], kind, Scope::Element, handler));
        }
        let members = self.dialog.registry().radio_group(name);
        if members.is_empty() {
            return Err(ScriptError::TargetNotFound(name.to_string()));
        }
        log::debug!("`{kind}` handler on radio group `{name}` ({} members)", members.len());
        Ok(self
            .handlers
            .add(&members, kind, Scope::RadioGroup(name.to_string()), handler))
    }

    /// Fire `event` on the named element as if the user caused it. For a
    /// radio group value, fires on the selected member.
    pub fn trigger(&mut self, name: &str, event: &str) -> Result<(), ScriptError> {
        let kind: EventKind = event.parse()?;
        let target = match self.resolve(name) {
            Ok((id, _)) => Some(id),
            Err(_) => {
                let members = self.dialog.registry().radio_group(name);
                if members.is_empty() {
                    return Err(ScriptError::TargetNotFound(name.to_string()));
                }
                members
                    .into_iter()
                    .find(|m| self.dialog.element(*m).is_some_and(|e| e.flag("isSelected")))
            }
        };
        if let Some(id) = target {
            self.fire(id, kind);
        }
        Ok(())
    }

    /// Run every handler listening on (target, kind). Handler errors are
    /// contained: logged and posted as error notices.
    fn fire(&mut self, target: ElementId, kind: EventKind) {
        let listeners = self.handlers.listeners(target, kind);
        if listeners.is_empty() {
            return;
        }
        let event = Event {
            kind,
            target,
            name: self
                .dialog
                .element(target)
                .map(|e| e.nameid().to_string())
                .unwrap_or_default(),
            value: self.value_of(target),
        };
        for hid in listeners {
            let runs = match self.handlers.scope(hid) {
                Some(Scope::Element) => true,
                Some(Scope::RadioGroup(_)) => self
                    .dialog
                    .element(target)
                    .is_some_and(|e| e.flag("isSelected")),
                None => false,
            };
            if !runs {
                continue;
            }
            let Some(mut handler) = self.handlers.take(hid) else {
                continue;
            };
            if let Err(err) = handler(self, &event) {
                log::warn!("`{kind}` handler on `{}` failed: {err}", event.name);
                self.dialog.context_mut().post(
                    Notice::new(NoticeLevel::Error, Some(target), "Script error")
                        .with_detail(err.to_string()),
                );
            }
            self.handlers.restore(hid, handler);
        }
    }

    // ─── Messaging ───────────────────────────────────────────────────────

    /// Post a message for the host to display. `kind` is `info` (default),
    /// `warning` or `error`.
    pub fn show_message(&mut self, message: &str, detail: Option<&str>, kind: Option<&str>) {
        let level = match kind {
            Some("error") => NoticeLevel::Error,
            Some("warning") => NoticeLevel::Warning,
            _ => NoticeLevel::Info,
        };
        let mut notice = Notice::new(level, None, message);
        if let Some(detail) = detail {
            notice = notice.with_detail(detail);
        }
        self.dialog.context_mut().post(notice);
    }

    /// Attach a validation message to each named element.
    pub fn add_error(&mut self, names: impl Into<Names>, message: &str) -> Result<(), ScriptError> {
        let ids = self.resolve_all(names.into())?;
        for id in ids {
            self.dialog.context_mut().annotate(id, message);
        }
        Ok(())
    }

    /// Remove one validation message, or all of them when `message` is
    /// `None`.
    pub fn clear_error(&mut self, names: impl Into<Names>, message: Option<&str>) -> Result<(), ScriptError> {
        let ids = self.resolve_all(names.into())?;
        for id in ids {
            self.dialog.context_mut().clear_annotation(id, message);
        }
        Ok(())
    }

    pub fn errors(&self, name: &str) -> Vec<String> {
        self.dialog
            .by_name(name)
            .map(|e| self.dialog.context().annotations(e.id).to_vec())
            .unwrap_or_default()
    }

    /// All names must resolve before anything is applied.
    fn resolve_all(&self, names: Names) -> Result<Vec<ElementId>, ScriptError> {
        names
            .0
            .iter()
            .map(|name| self.resolve(name).map(|(id, _)| id))
            .collect()
    }

    // ─── Data catalog ────────────────────────────────────────────────────

    pub fn list_datasets(&self) -> Vec<String> {
        self.catalog.datasets()
    }

    /// Variables of a dataset; empty when it does not exist.
    pub fn list_variables(&self, dataset: &str) -> Vec<Variable> {
        self.catalog.variables(dataset).unwrap_or_else(|| {
            log::debug!("no dataset `{dataset}` in catalog");
            Vec::new()
        })
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Drop every handler registered through this instance.
    pub fn dispose_all(&mut self) -> usize {
        let count = self.handlers.dispose_all();
        log::debug!("disposed {count} handler(s)");
        count
    }

    /// Dispose all handlers, then run `install` to register the new
    /// script's handlers.
    pub fn reload<F>(&mut self, install: F) -> Result<(), ScriptError>
    where
        F: FnOnce(&mut Ui) -> Result<(), ScriptError>,
    {
        self.dispose_all();
        install(self)
    }

    // ─── Simulated interaction ───────────────────────────────────────────

    /// Deliver a user interaction. Returns `false` when the element is not
    /// interactive (hidden or disabled in preview) or the interaction did
    /// not apply to it.
    pub fn interact(&mut self, name: &str, interaction: Interaction) -> Result<bool, ScriptError> {
        let (id, kind) = self.resolve(name)?;
        if !self.dialog.presentation(id).is_some_and(|p| p.interactive) {
            log::debug!("`{name}` is not interactive");
            return Ok(false);
        }

        let changed = match (interaction, kind) {
            (Interaction::Click, ElementKind::Checkbox) => {
                let on = !self.is_checked(name);
                self.set(id, "isChecked", encode_bool(on))?
            }
            (Interaction::Click, ElementKind::Radio) => {
                self.set(id, "isSelected", encode_bool(true))?
            }
            (Interaction::Click, ElementKind::Button) => false,
            (Interaction::Input(text), ElementKind::Input | ElementKind::Select) => {
                let res = self.dialog.set_attr(id, "value", text)?;
                if res.is_rejected("value") {
                    return Ok(false);
                }
                if kind == ElementKind::Input && !res.changed.is_empty() {
                    self.fire(id, EventKind::Input);
                }
                !res.changed.is_empty()
            }
            (Interaction::SelectItem { index, shift }, ElementKind::Container) => {
                match self.dialog.activate_item(id, index, shift) {
                    Ok(res) => !res.changed.is_empty(),
                    Err(StateError::ItemDisabled(_)) => return Ok(false),
                    Err(err) => return Err(ScriptError::from_state(name, err)),
                }
            }
            (Interaction::CycleRow(index), ElementKind::ChoiceList) => {
                let res = self
                    .dialog
                    .cycle_row(id, index)
                    .map_err(|e| ScriptError::from_state(name, e))?;
                !res.changed.is_empty()
            }
            (Interaction::MoveRow { from, to }, ElementKind::ChoiceList) => {
                match self.dialog.move_row(id, from, to) {
                    Ok(res) => !res.changed.is_empty(),
                    Err(StateError::NotSortable) => return Ok(false),
                    Err(err) => return Err(ScriptError::from_state(name, err)),
                }
            }
            (Interaction::Adjust(n), ElementKind::Counter | ElementKind::Slider) => {
                let key = if kind == ElementKind::Counter { "startval" } else { "value" };
                let n = self.clamp_counter(id, kind, n);
                self.set(id, key, encode_number(n))?
            }
            (interaction, _) => {
                log::debug!("{interaction:?} does not apply to {kind} `{name}`");
                return Ok(false);
            }
        };

        if matches!(kind, ElementKind::Button | ElementKind::Checkbox | ElementKind::Radio) {
            self.fire(id, EventKind::Click);
        }
        if changed {
            self.fire(id, EventKind::Change);
        }
        Ok(true)
    }
}

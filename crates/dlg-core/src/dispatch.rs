//! Update Dispatcher: the only path by which attribute values change.
//!
//! A batch is resolved against the element's current state without
//! touching the store, then committed in one step. Rejected keys keep
//! their previous value and are reported in the [`Resolution`]; accepted
//! keys may be coerced (rounded, clamped, canonicalised).

use crate::choicelist::{CHOICELIST_KEYS, ChoiceListState, decode_state};
use crate::codec::{decode_bool, decode_list, decode_number, encode_bool, encode_number};
use crate::color::{is_color_key, is_valid_color};
use crate::container::{CONTAINER_KEYS, ContainerState, SelectionMode};
use crate::context::{ChangeNotification, Notice, NoticeLevel};
use crate::dialog::Dialog;
use crate::error::UpdateError;
use crate::id::ElementId;
use crate::model::{AttrMap, DialogProperties, Element, ElementKind};
use crate::naming::{is_valid_nameid, rewrite_references};
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const BOOL_KEYS: [&str; 7] = [
    "isVisible",
    "isEnabled",
    "isChecked",
    "isSelected",
    "orderSelection",
    "ordering",
    "sortable",
];
const COUNTER_KEYS: [&str; 3] = ["minval", "startval", "maxval"];

// Button label metrics, in multiples of the font size.
const CHAR_WIDTH: f64 = 0.6;
const LINE_HEIGHT: f64 = 1.25;
const PAD_X: f64 = 12.0;
const PAD_Y: f64 = 6.0;

// ─── Config ──────────────────────────────────────────────────────────────

/// How hidden and disabled elements are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayPolicy {
    /// Authoring canvas: dimmed but still selectable and laid out.
    #[default]
    Editing,
    /// Live preview: hidden elements leave layout and interaction.
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Presentation {
    pub opacity: f32,
    pub interactive: bool,
    pub in_layout: bool,
}

impl Presentation {
    pub const DIMMED: f32 = 0.4;

    pub fn derive(policy: DisplayPolicy, visible: bool, enabled: bool) -> Self {
        match policy {
            DisplayPolicy::Editing => Self {
                opacity: if visible && enabled { 1.0 } else { Self::DIMMED },
                interactive: true,
                in_layout: true,
            },
            DisplayPolicy::Preview if !visible => Self {
                opacity: 0.0,
                interactive: false,
                in_layout: false,
            },
            DisplayPolicy::Preview => Self {
                opacity: if enabled { 1.0 } else { Self::DIMMED },
                interactive: enabled,
                in_layout: true,
            },
        }
    }
}

/// Per-dialog dispatcher settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    pub policy: DisplayPolicy,
    /// Horizontal minimum (width, height) per element type.
    pub min_sizes: BTreeMap<ElementKind, (f64, f64)>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            policy: DisplayPolicy::Editing,
            min_sizes: ElementKind::ALL
                .into_iter()
                .map(|kind| (kind, kind.min_size()))
                .collect(),
        }
    }
}

impl DispatchConfig {
    pub fn min_size(&self, kind: ElementKind, vertical: bool) -> (f64, f64) {
        let (w, h) = self
            .min_sizes
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.min_size());
        if vertical { (h, w) } else { (w, h) }
    }
}

// ─── Results ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyKey,
    NotABoolean,
    NotANumber,
    InvalidName,
    DuplicateName,
    InvalidDirection,
    InvalidLineClamp,
    InvalidSelectionMode,
    InvalidState,
    NotAnOption,
    EmptyGroup,
    CounterRange,
    InvalidColor,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RejectReason::EmptyKey => "attribute keys must not be empty",
            RejectReason::NotABoolean => "expected `true` or `false`",
            RejectReason::NotANumber => "expected a number",
            RejectReason::InvalidName => "names must start with a letter or `_` and use only letters, digits and `_`",
            RejectReason::DuplicateName => "name is already in use",
            RejectReason::InvalidDirection => "expected `horizontal` or `vertical`",
            RejectReason::InvalidLineClamp => "line clamp must be a whole number of at least 1",
            RejectReason::InvalidSelectionMode => "expected `single` or `multiple`",
            RejectReason::InvalidState => "malformed row state",
            RejectReason::NotAnOption => "value is not one of the items",
            RejectReason::EmptyGroup => "radio group must not be empty",
            RejectReason::CounterRange => "counter needs minval <= startval <= maxval",
            RejectReason::InvalidColor => "not a valid color",
        })
    }
}

/// A key whose new value was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub key: String,
    pub attempted: String,
    /// The value still in the store, if the key existed.
    pub kept: Option<String>,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Every accepted key with its resolved value.
    pub committed: AttrMap,
    pub rejections: Vec<Rejection>,
    /// Keys whose stored value actually changed.
    pub changed: Vec<String>,
}

impl Resolution {
    pub fn is_rejected(&self, key: &str) -> bool {
        self.rejections.iter().any(|r| r.key == key)
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.committed.get(key).map(String::as_str)
    }
}

// ─── Resolver ────────────────────────────────────────────────────────────

struct Resolved {
    committed: AttrMap,
    rejections: Vec<Rejection>,
    rename: Option<(String, String)>,
}

struct Resolver<'a> {
    element: &'a Element,
    registry: &'a Registry,
    props: &'a DialogProperties,
    config: &'a DispatchConfig,
    pending: AttrMap,
    out: AttrMap,
    rejections: Vec<Rejection>,
    rename: Option<(String, String)>,
}

impl<'a> Resolver<'a> {
    fn current(&self, key: &str) -> Option<&'a str> {
        self.element.attr(key)
    }

    /// Value as it will be after this batch, so far.
    fn view(&self, key: &str) -> Option<&str> {
        self.out
            .get(key)
            .map(String::as_str)
            .or_else(|| self.current(key))
    }

    fn view_number(&self, key: &str) -> f64 {
        self.view(key).and_then(decode_number).unwrap_or(0.0)
    }

    fn accept(&mut self, key: &str, value: String) {
        log::trace!("accept {key} = {value:?}");
        self.out.insert(key.to_string(), value);
    }

    fn reject(&mut self, key: &str, attempted: String, reason: RejectReason) {
        log::trace!("reject {key} = {attempted:?}: {reason}");
        self.rejections.push(Rejection {
            key: key.to_string(),
            attempted,
            kept: self.current(key).map(str::to_string),
            reason,
        });
    }

    fn take(&mut self, key: &str) -> Option<String> {
        self.pending.remove(key)
    }

    fn take_number(&mut self, key: &str) -> Option<f64> {
        let raw = self.take(key)?;
        match decode_number(&raw) {
            Some(n) => Some(n),
            None => {
                self.reject(key, raw, RejectReason::NotANumber);
                None
            }
        }
    }

    fn touches(&self, keys: &[&str]) -> bool {
        keys.iter()
            .any(|k| self.pending.contains_key(*k) || self.out.contains_key(*k))
    }

    /// Current attributes overlaid with everything resolved so far.
    fn merged(&self) -> AttrMap {
        let mut merged = self.element.attrs().clone();
        merged.extend(self.out.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    fn run(mut self) -> Resolved {
        if let Some(raw) = self.take("") {
            self.reject("", raw, RejectReason::EmptyKey);
        }
        self.booleans();
        self.nameid();
        self.direction();
        match self.element.kind {
            ElementKind::Button => self.button_metrics(),
            ElementKind::Container => self.container(),
            ElementKind::ChoiceList => self.choicelist(),
            ElementKind::Select => self.select(),
            ElementKind::Radio => self.radio_group(),
            _ => {}
        }
        self.sizes();
        self.positions();
        if self.element.kind == ElementKind::Counter {
            self.counter();
        }
        if self.element.kind == ElementKind::Slider
            && let Some(v) = self.take_number("value")
        {
            self.accept("value", encode_number(v.clamp(0.0, 1.0)));
        }
        self.colors();

        for (key, value) in std::mem::take(&mut self.pending) {
            self.accept(&key, value);
        }
        Resolved {
            committed: self.out,
            rejections: self.rejections,
            rename: self.rename,
        }
    }

    fn booleans(&mut self) {
        for key in BOOL_KEYS {
            if let Some(raw) = self.take(key) {
                match decode_bool(&raw) {
                    Some(b) => self.accept(key, encode_bool(b)),
                    None => self.reject(key, raw, RejectReason::NotABoolean),
                }
            }
        }
    }

    fn nameid(&mut self) {
        let Some(raw) = self.take("nameid") else {
            return;
        };
        let old = self.current("nameid").unwrap_or_default();
        if raw == old {
            return;
        }
        if !is_valid_nameid(&raw) {
            self.reject("nameid", raw, RejectReason::InvalidName);
        } else if self.registry.is_name_taken(&raw) {
            self.reject("nameid", raw, RejectReason::DuplicateName);
        } else {
            self.rename = Some((old.to_string(), raw.clone()));
            self.accept("nameid", raw);
        }
    }

    fn direction(&mut self) {
        if !self.element.kind.has_direction() {
            return;
        }
        let Some(raw) = self.take("direction") else {
            return;
        };
        if raw != "horizontal" && raw != "vertical" {
            self.reject("direction", raw, RejectReason::InvalidDirection);
            return;
        }
        let before = self.current("direction").unwrap_or("horizontal");
        if raw != before {
            let rect = self.element.rect();
            self.pending
                .entry("width".into())
                .or_insert_with(|| encode_number(rect.height));
            self.pending
                .entry("height".into())
                .or_insert_with(|| encode_number(rect.width));
        }
        self.accept("direction", raw);
    }

    /// A new label or line clamp resizes the button to fit its text.
    fn button_metrics(&mut self) {
        let mut touched = false;
        if let Some(raw) = self.take("lineClamp") {
            match decode_number(&raw).filter(|n| n.fract() == 0.0 && *n >= 1.0) {
                Some(n) => {
                    self.accept("lineClamp", encode_number(n));
                    touched = true;
                }
                None => self.reject("lineClamp", raw, RejectReason::InvalidLineClamp),
            }
        }
        if let Some(raw) = self.take("label") {
            self.accept("label", raw);
            touched = true;
        }
        if !touched {
            return;
        }

        let font_size = self
            .element
            .number("fontSize")
            .unwrap_or(self.props.font_size);
        let chars = self.view("label").unwrap_or_default().chars().count().max(1) as f64;
        let lines = self.view_number("lineClamp").max(1.0).min(chars);
        let width = (chars * CHAR_WIDTH * font_size / lines).ceil() + 2.0 * PAD_X;
        let height = (lines * LINE_HEIGHT * font_size).ceil() + 2.0 * PAD_Y;
        self.pending
            .entry("width".into())
            .or_insert_with(|| encode_number(width));
        self.pending
            .entry("height".into())
            .or_insert_with(|| encode_number(height));
    }

    /// Mode, filter and item data are normalised together so the active
    /// set always satisfies the filter and the selection mode.
    fn container(&mut self) {
        if !self.touches(&CONTAINER_KEYS) {
            return;
        }
        if let Some(raw) = self.take("selection") {
            match SelectionMode::parse(&raw) {
                Some(mode) => self.accept("selection", mode.as_str().to_string()),
                None => self.reject("selection", raw, RejectReason::InvalidSelectionMode),
            }
        }
        for key in ["itemType", "items", "itemTypes", "active", "selectionOrder"] {
            if let Some(raw) = self.take(key) {
                self.accept(key, raw);
            }
        }
        let state = ContainerState::from_attrs(&self.merged());
        for (key, value) in state.to_attrs() {
            self.accept(&key, value);
        }
    }

    fn choicelist(&mut self) {
        if !self.touches(&CHOICELIST_KEYS) {
            return;
        }
        if let Some(raw) = self.take("items") {
            self.accept("items", raw);
        }
        if let Some(raw) = self.take("state") {
            match decode_state(&raw) {
                Ok(_) => self.accept("state", raw),
                Err(_) => self.reject("state", raw, RejectReason::InvalidState),
            }
        }
        let mut merged = self.merged();
        let state = match ChoiceListState::from_attrs(&merged) {
            Ok(state) => state,
            Err(err) => {
                // the stored state itself is unreadable: start from all-off
                log::warn!("`{}`: {err}", self.element.id);
                merged.remove("state");
                match ChoiceListState::from_attrs(&merged) {
                    Ok(state) => state,
                    Err(_) => return,
                }
            }
        };
        for (key, value) in state.to_attrs() {
            self.accept(&key, value);
        }
    }

    fn select(&mut self) {
        let items_changed = match self.take("items") {
            Some(raw) => {
                self.accept("items", raw);
                true
            }
            None => false,
        };
        let items = decode_list(self.view("items").unwrap_or_default());
        if let Some(raw) = self.take("value") {
            if raw.is_empty() || items.contains(&raw) {
                self.accept("value", raw);
            } else {
                self.reject("value", raw, RejectReason::NotAnOption);
            }
        } else if items_changed {
            let value = self.current("value").unwrap_or_default();
            if !value.is_empty() && !items.iter().any(|i| i == value) {
                self.accept("value", String::new());
            }
        }
    }

    fn radio_group(&mut self) {
        if let Some(raw) = self.take("group") {
            if raw.trim().is_empty() {
                self.reject("group", raw, RejectReason::EmptyGroup);
            } else {
                self.accept("group", raw);
            }
        }
    }

    /// Sizes are rounded and clamped to the type minimum and to the space
    /// left between the element's origin and the canvas edge.
    fn sizes(&mut self) {
        let kind = self.element.kind;
        let vertical = kind.has_direction() && self.view("direction") == Some("vertical");
        let (min_w, min_h) = self.config.min_size(kind, vertical);
        let (ox, oy) = self.registry.parent_origin(self.element.id);
        let canvas = (self.props.width, self.props.height);

        for (size_key, pos_key, min, origin, extent) in [
            ("width", "left", min_w, ox, canvas.0),
            ("height", "top", min_h, oy, canvas.1),
        ] {
            let Some(size) = self.take_number(size_key) else {
                continue;
            };
            let rel = self
                .pending
                .get(pos_key)
                .and_then(|raw| decode_number(raw))
                .unwrap_or_else(|| self.view_number(pos_key))
                .round();
            let abs = (origin + rel).clamp(0.0, (extent - min).max(0.0));
            let max = (extent - abs).max(min);
            self.accept(size_key, encode_number(size.round().clamp(min, max)));
        }
    }

    /// Positions are rounded and clamped so the box stays on the canvas.
    fn positions(&mut self) {
        let (ox, oy) = self.registry.parent_origin(self.element.id);
        for (pos_key, size_key, origin, extent) in [
            ("left", "width", ox, self.props.width),
            ("top", "height", oy, self.props.height),
        ] {
            let Some(pos) = self.take_number(pos_key) else {
                continue;
            };
            let size = self.view_number(size_key);
            let abs = (origin + pos.round()).clamp(0.0, (extent - size).max(0.0));
            self.accept(pos_key, encode_number(abs - origin));
        }
    }

    /// All range keys in the batch are accepted together or not at all.
    fn counter(&mut self) {
        let mut proposed: Vec<(&str, String, f64)> = Vec::new();
        for key in COUNTER_KEYS {
            if let Some(raw) = self.take(key) {
                match decode_number(&raw) {
                    Some(n) => proposed.push((key, raw, n)),
                    None => self.reject(key, raw, RejectReason::NotANumber),
                }
            }
        }
        if proposed.is_empty() {
            return;
        }
        let value = |key: &str| {
            proposed
                .iter()
                .find(|(k, _, _)| *k == key)
                .map(|(_, _, n)| *n)
                .unwrap_or_else(|| self.element.number(key).unwrap_or(0.0))
        };
        let (min, start, max) = (value("minval"), value("startval"), value("maxval"));
        if min <= start && start <= max {
            for (key, _, n) in proposed {
                self.accept(key, encode_number(n));
            }
        } else {
            for (key, raw, _) in proposed {
                self.reject(key, raw, RejectReason::CounterRange);
            }
        }
    }

    fn colors(&mut self) {
        let keys: Vec<String> = self
            .pending
            .keys()
            .filter(|k| is_color_key(k))
            .cloned()
            .collect();
        for key in keys {
            let Some(raw) = self.take(&key) else {
                continue;
            };
            if is_valid_color(&raw) {
                self.accept(&key, raw.trim().to_string());
            } else {
                self.reject(&key, raw, RejectReason::InvalidColor);
            }
        }
    }
}

// ─── Dialog entry points ─────────────────────────────────────────────────

impl Dialog {
    /// Validate, coerce and commit one attribute batch.
    ///
    /// # Errors
    /// Only when `id` names no element. Invalid values are reported in the
    /// returned `Resolution`, never as errors.
    pub fn update(&mut self, id: ElementId, batch: AttrMap) -> Result<Resolution, UpdateError> {
        self.apply(id, batch, true)
    }

    /// Convenience for a single-key batch.
    pub fn set_attr(
        &mut self,
        id: ElementId,
        key: &str,
        value: impl Into<String>,
    ) -> Result<Resolution, UpdateError> {
        let mut batch = AttrMap::new();
        batch.insert(key.to_string(), value.into());
        self.update(id, batch)
    }

    pub(crate) fn apply(
        &mut self,
        id: ElementId,
        batch: AttrMap,
        notify: bool,
    ) -> Result<Resolution, UpdateError> {
        let element = self.registry.get(id).ok_or(UpdateError::NotFound(id))?;
        let resolved = Resolver {
            element,
            registry: &self.registry,
            props: &self.props,
            config: &self.config,
            pending: batch,
            out: AttrMap::new(),
            rejections: Vec::new(),
            rename: None,
        }
        .run();
        let changed: Vec<String> = resolved
            .committed
            .iter()
            .filter(|(key, value)| element.attr(key) != Some(value.as_str()))
            .map(|(key, _)| key.clone())
            .collect();

        for rejection in &resolved.rejections {
            let message = match rejection.reason {
                RejectReason::DuplicateName => {
                    format!("nameid `{}` is already in use", rejection.attempted)
                }
                reason => format!("`{}` on `{id}`: {reason}", rejection.key),
            };
            log::warn!("{message}");
            self.ctx.post(
                Notice::new(NoticeLevel::Warning, Some(id), message)
                    .with_detail(format!("rejected value: {:?}", rejection.attempted)),
            );
        }

        let resolution = Resolution {
            committed: resolved.committed,
            rejections: resolved.rejections,
            changed,
        };
        if resolution.changed.is_empty() {
            return Ok(resolution);
        }

        if let Some(element) = self.registry.get_mut(id) {
            element.commit(&resolution.committed);
        }
        if let Some((old, new)) = resolved.rename
            && !old.is_empty()
        {
            let (script, count) = rewrite_references(&self.script, &old, &new);
            if count > 0 {
                self.script = script;
            }
        }
        log::debug!("committed {:?} on `{id}`", resolution.changed);
        if notify {
            self.ctx.notify(ChangeNotification {
                element: id,
                keys: resolution.changed.clone(),
            });
        }

        self.radio_exclusivity(id, &resolution.changed);
        Ok(resolution)
    }

    /// A radio that became selected (or joined a group while selected)
    /// deselects every other member of its group.
    fn radio_exclusivity(&mut self, id: ElementId, changed: &[String]) {
        let Some(element) = self.registry.get(id) else {
            return;
        };
        if element.kind != ElementKind::Radio
            || !element.flag("isSelected")
            || !changed.iter().any(|k| k == "isSelected" || k == "group")
        {
            return;
        }
        let group = element.attr("group").unwrap_or_default().to_string();
        let others: Vec<ElementId> = self
            .registry
            .radio_group(&group)
            .into_iter()
            .filter(|other| *other != id)
            .filter(|other| self.registry.get(*other).is_some_and(|e| e.flag("isSelected")))
            .collect();
        for other in others {
            if let Err(err) = self.set_attr(other, "isSelected", "false") {
                log::warn!("{err}");
            }
        }
    }
}

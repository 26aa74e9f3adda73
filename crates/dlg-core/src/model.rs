//! Core data model for dialogs.
//!
//! An element is a typed widget whose whole state lives in a flat,
//! string-keyed attribute map. Geometry (`left`, `top`, `width`, `height`)
//! is relative to the owning group's origin, or to the canvas for
//! top-level elements.

use crate::codec::{decode_bool, decode_list, decode_number};
use crate::id::ElementId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An element's canonical state. Keys and values are always strings.
pub type AttrMap = BTreeMap<String, String>;

// ─── Element kinds ───────────────────────────────────────────────────────

/// The closed set of element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementKind {
    Button,
    Input,
    Select,
    Checkbox,
    Radio,
    Counter,
    Slider,
    Label,
    Separator,
    Container,
    ChoiceList,
    Group,
}

/// Which attribute carries an element's script-facing value, and how it
/// decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSlot {
    None,
    Text(&'static str),
    Toggle(&'static str),
    Number(&'static str),
    List,
}

impl ElementKind {
    pub const ALL: [ElementKind; 12] = [
        ElementKind::Button,
        ElementKind::Input,
        ElementKind::Select,
        ElementKind::Checkbox,
        ElementKind::Radio,
        ElementKind::Counter,
        ElementKind::Slider,
        ElementKind::Label,
        ElementKind::Separator,
        ElementKind::Container,
        ElementKind::ChoiceList,
        ElementKind::Group,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Button => "Button",
            ElementKind::Input => "Input",
            ElementKind::Select => "Select",
            ElementKind::Checkbox => "Checkbox",
            ElementKind::Radio => "Radio",
            ElementKind::Counter => "Counter",
            ElementKind::Slider => "Slider",
            ElementKind::Label => "Label",
            ElementKind::Separator => "Separator",
            ElementKind::Container => "Container",
            ElementKind::ChoiceList => "ChoiceList",
            ElementKind::Group => "Group",
        }
    }

    /// Case-insensitive lookup by type name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Prefix for generated ids and nameids (`button1`, `radio_4`).
    pub fn prefix(self) -> &'static str {
        match self {
            ElementKind::Button => "button",
            ElementKind::Input => "input",
            ElementKind::Select => "select",
            ElementKind::Checkbox => "checkbox",
            ElementKind::Radio => "radio",
            ElementKind::Counter => "counter",
            ElementKind::Slider => "slider",
            ElementKind::Label => "label",
            ElementKind::Separator => "separator",
            ElementKind::Container => "container",
            ElementKind::ChoiceList => "choicelist",
            ElementKind::Group => "group",
        }
    }

    /// Minimum (width, height) for the horizontal orientation.
    pub fn min_size(self) -> (f64, f64) {
        match self {
            ElementKind::Button => (20.0, 16.0),
            ElementKind::Input => (40.0, 20.0),
            ElementKind::Select => (60.0, 20.0),
            ElementKind::Checkbox | ElementKind::Radio => (14.0, 14.0),
            ElementKind::Counter => (50.0, 20.0),
            ElementKind::Slider => (40.0, 8.0),
            ElementKind::Label => (10.0, 10.0),
            ElementKind::Separator | ElementKind::Group => (1.0, 1.0),
            ElementKind::Container => (60.0, 40.0),
            ElementKind::ChoiceList => (80.0, 40.0),
        }
    }

    pub fn default_size(self) -> (f64, f64) {
        match self {
            ElementKind::Button => (80.0, 26.0),
            ElementKind::Input => (120.0, 24.0),
            ElementKind::Select => (120.0, 24.0),
            ElementKind::Checkbox | ElementKind::Radio => (14.0, 14.0),
            ElementKind::Counter => (60.0, 24.0),
            ElementKind::Slider => (120.0, 12.0),
            ElementKind::Label => (60.0, 18.0),
            ElementKind::Separator => (200.0, 1.0),
            ElementKind::Container => (150.0, 120.0),
            ElementKind::ChoiceList => (150.0, 120.0),
            ElementKind::Group => (1.0, 1.0),
        }
    }

    /// Type-specific attributes seeded by the element factory.
    pub fn defaults(self) -> &'static [(&'static str, &'static str)] {
        match self {
            ElementKind::Button => &[
                ("label", "Button"),
                ("lineClamp", "1"),
                ("color", "#F0F0F0"),
                ("fontColor", "#000000"),
            ],
            ElementKind::Input => &[("value", "")],
            ElementKind::Select => &[("items", ""), ("value", "")],
            ElementKind::Checkbox => &[("isChecked", "false"), ("color", "#558DD5")],
            ElementKind::Radio => &[
                ("group", "radiogroup1"),
                ("isSelected", "false"),
                ("color", "#558DD5"),
            ],
            ElementKind::Counter => &[("minval", "0"), ("startval", "0"), ("maxval", "10")],
            ElementKind::Slider => &[
                ("direction", "horizontal"),
                ("value", "0.5"),
                ("color", "#75C775"),
            ],
            ElementKind::Label => &[("value", "Label"), ("fontColor", "#000000")],
            ElementKind::Separator => &[("direction", "horizontal"), ("color", "#000000")],
            ElementKind::Container => &[
                ("selection", "single"),
                ("itemType", "any"),
                ("items", ""),
                ("itemTypes", ""),
                ("active", ""),
                ("orderSelection", "false"),
                ("selectionOrder", ""),
            ],
            ElementKind::ChoiceList => &[
                ("items", ""),
                ("state", ""),
                ("ordering", "true"),
                ("sortable", "true"),
            ],
            ElementKind::Group => &[],
        }
    }

    pub fn value_slot(self) -> ValueSlot {
        match self {
            ElementKind::Input | ElementKind::Select | ElementKind::Label => {
                ValueSlot::Text("value")
            }
            ElementKind::Checkbox => ValueSlot::Toggle("isChecked"),
            ElementKind::Radio => ValueSlot::Toggle("isSelected"),
            ElementKind::Counter => ValueSlot::Number("startval"),
            ElementKind::Slider => ValueSlot::Number("value"),
            ElementKind::Container | ElementKind::ChoiceList => ValueSlot::List,
            ElementKind::Button | ElementKind::Separator | ElementKind::Group => ValueSlot::None,
        }
    }

    /// Whether `direction` swaps the element's width and height.
    pub fn has_direction(self) -> bool {
        matches!(self, ElementKind::Separator | ElementKind::Slider)
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Axis-aligned box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        Bounds {
            left,
            top,
            width: self.right().max(other.right()) - left,
            height: self.bottom().max(other.bottom()) - top,
        }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Bounds {
        Bounds {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }
}

// ─── Elements ────────────────────────────────────────────────────────────

/// A single element of a dialog.
///
/// The attribute map is private: reads go through the accessors, writes
/// only through the update dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    attrs: AttrMap,
}

impl Element {
    pub(crate) fn new(id: ElementId, kind: ElementKind, attrs: AttrMap) -> Self {
        Self { id, kind, attrs }
    }

    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn nameid(&self) -> &str {
        self.attr("nameid").unwrap_or_default()
    }

    /// Decoded boolean, `false` when absent or malformed.
    pub fn flag(&self, key: &str) -> bool {
        self.attr(key).and_then(decode_bool).unwrap_or(false)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.attr(key).and_then(decode_number)
    }

    pub fn list(&self, key: &str) -> Vec<String> {
        self.attr(key).map(decode_list).unwrap_or_default()
    }

    pub fn is_visible(&self) -> bool {
        self.attr("isVisible").and_then(decode_bool).unwrap_or(true)
    }

    pub fn is_enabled(&self) -> bool {
        self.attr("isEnabled").and_then(decode_bool).unwrap_or(true)
    }

    /// Geometry relative to the parent's origin.
    pub fn rect(&self) -> Bounds {
        Bounds {
            left: self.number("left").unwrap_or(0.0),
            top: self.number("top").unwrap_or(0.0),
            width: self.number("width").unwrap_or(0.0),
            height: self.number("height").unwrap_or(0.0),
        }
    }

    /// Minimum (width, height), honoring a vertical `direction`.
    pub fn min_size(&self) -> (f64, f64) {
        let (w, h) = self.kind.min_size();
        if self.kind.has_direction() && self.attr("direction") == Some("vertical") {
            (h, w)
        } else {
            (w, h)
        }
    }

    /// Overwrite the given keys. Reserved for the dispatcher's commit step.
    pub(crate) fn commit(&mut self, batch: &AttrMap) {
        for (key, value) in batch {
            self.attrs.insert(key.clone(), value.clone());
        }
    }
}

// ─── Dialog properties ───────────────────────────────────────────────────

/// Dialog-wide settings: canvas size and global font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DialogProperties {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub font_family: String,
    pub font_size: f64,
    pub background: String,
}

impl Default for DialogProperties {
    fn default() -> Self {
        Self {
            title: "Dialog".into(),
            width: 640.0,
            height: 480.0,
            font_family: "Arial".into(),
            font_size: 13.0,
            background: "#FFFFFF".into(),
        }
    }
}

impl DialogProperties {
    pub fn canvas(&self) -> Bounds {
        Bounds {
            left: 0.0,
            top: 0.0,
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(kind: ElementKind, pairs: &[(&str, &str)]) -> Element {
        let attrs = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Element::new(ElementId::intern("e_1"), kind, attrs)
    }

    #[test]
    fn kind_names_roundtrip() {
        for kind in ElementKind::ALL {
            assert_eq!(ElementKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ElementKind::from_name("choicelist"), Some(ElementKind::ChoiceList));
        assert_eq!(ElementKind::from_name("Spinner"), None);
    }

    #[test]
    fn vertical_direction_swaps_min_size() {
        let slider = element(ElementKind::Slider, &[("direction", "vertical")]);
        assert_eq!(slider.min_size(), (8.0, 40.0));
        let sep = element(ElementKind::Separator, &[]);
        assert_eq!(sep.min_size(), (1.0, 1.0));
    }

    #[test]
    fn accessors_decode_canonical_strings() {
        let e = element(
            ElementKind::Container,
            &[("left", "10"), ("width", "5.5"), ("isVisible", "false"), ("items", "a,b")],
        );
        assert_eq!(e.rect().left, 10.0);
        assert_eq!(e.rect().width, 5.5);
        assert!(!e.is_visible());
        assert!(e.is_enabled());
        assert_eq!(e.list("items"), vec!["a", "b"]);
    }

    #[test]
    fn bounds_union() {
        let a = Bounds { left: 0.0, top: 10.0, width: 10.0, height: 10.0 };
        let b = Bounds { left: 20.0, top: 0.0, width: 5.0, height: 5.0 };
        let u = a.union(&b);
        assert_eq!(u, Bounds { left: 0.0, top: 0.0, width: 25.0, height: 20.0 });
    }
}

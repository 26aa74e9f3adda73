//! Container item activation.
//!
//! A container holds labelled items, each optionally tagged with an item
//! type. The `itemType` filter disables items of any other type; disabled
//! items are never active. In `single` mode at most one item is active.
//! When `orderSelection` is on, `selectionOrder` lists the active labels
//! in the order they were activated.

use crate::codec::{decode_bool, decode_list, encode_list};
use crate::dialog::Dialog;
use crate::dispatch::Resolution;
use crate::error::StateError;
use crate::id::ElementId;
use crate::model::{AttrMap, ElementKind};

/// Attributes that feed the container state machine.
pub(crate) const CONTAINER_KEYS: [&str; 7] = [
    "selection",
    "itemType",
    "items",
    "itemTypes",
    "active",
    "orderSelection",
    "selectionOrder",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Single,
    Multiple,
}

impl SelectionMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "single" => Some(SelectionMode::Single),
            "multiple" => Some(SelectionMode::Multiple),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SelectionMode::Single => "single",
            SelectionMode::Multiple => "multiple",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerItem {
    pub label: String,
    pub item_type: Option<String>,
}

impl ContainerItem {
    pub fn new(label: impl Into<String>, item_type: Option<String>) -> Self {
        Self {
            label: label.into(),
            item_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Active,
    Inactive,
    /// Filtered out by `itemType`: inactive and not selectable.
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerState {
    pub mode: SelectionMode,
    /// `None` accepts every item.
    pub filter: Option<String>,
    pub remember_order: bool,
    items: Vec<ContainerItem>,
    active: Vec<bool>,
    order: Vec<String>,
}

impl ContainerState {
    /// Decode from canonical attributes. Unknown `selection` values fall
    /// back to single mode; the dispatcher rejects them before this runs.
    pub fn from_attrs(attrs: &AttrMap) -> Self {
        let get = |key: &str| attrs.get(key).map(String::as_str).unwrap_or_default();
        let labels = decode_list(get("items"));
        let types = decode_list(get("itemTypes"));

        let mut items: Vec<ContainerItem> = Vec::with_capacity(labels.len());
        for (i, label) in labels.into_iter().enumerate() {
            if items.iter().any(|it| it.label == label) {
                continue;
            }
            let item_type = types.get(i).filter(|t| !t.is_empty()).cloned();
            items.push(ContainerItem { label, item_type });
        }

        let active_labels = decode_list(get("active"));
        let active = items
            .iter()
            .map(|it| active_labels.contains(&it.label))
            .collect();
        let filter = match get("itemType").trim() {
            "" | "any" => None,
            t => Some(t.to_string()),
        };

        let mut state = Self {
            mode: SelectionMode::parse(get("selection")).unwrap_or_default(),
            filter,
            remember_order: decode_bool(get("orderSelection")).unwrap_or(false),
            items,
            active,
            order: decode_list(get("selectionOrder")),
        };
        state.normalize();
        state
    }

    /// Canonical encoding of the item data (configuration keys excluded).
    pub fn to_attrs(&self) -> AttrMap {
        let labels: Vec<&str> = self.items.iter().map(|it| it.label.as_str()).collect();
        let types: Vec<&str> = self
            .items
            .iter()
            .map(|it| it.item_type.as_deref().unwrap_or_default())
            .collect();
        let mut out = AttrMap::new();
        out.insert("items".into(), encode_list(&labels));
        out.insert("itemTypes".into(), encode_list(&types));
        out.insert("active".into(), encode_list(&self.active_labels()));
        out.insert("selectionOrder".into(), encode_list(&self.order));
        out
    }

    pub fn items(&self) -> &[ContainerItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.items.iter().position(|it| it.label == label)
    }

    pub fn is_eligible(&self, index: usize) -> bool {
        match (&self.filter, self.items.get(index)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(filter), Some(item)) => item.item_type.as_deref() == Some(filter.as_str()),
        }
    }

    pub fn state(&self, index: usize) -> Option<ItemState> {
        if index >= self.items.len() {
            return None;
        }
        Some(if !self.is_eligible(index) {
            ItemState::Disabled
        } else if self.active[index] {
            ItemState::Active
        } else {
            ItemState::Inactive
        })
    }

    /// Active labels in item order.
    pub fn active_labels(&self) -> Vec<String> {
        self.items
            .iter()
            .zip(&self.active)
            .filter(|(_, on)| **on)
            .map(|(it, _)| it.label.clone())
            .collect()
    }

    /// Active labels in activation order when order is remembered, item
    /// order otherwise.
    pub fn selected(&self) -> Vec<String> {
        if self.remember_order {
            self.order.clone()
        } else {
            self.active_labels()
        }
    }

    pub fn selection_order(&self) -> &[String] {
        &self.order
    }

    /// Restore every invariant: filtered items inactive, single mode holds
    /// at most one active item, and the selection order mirrors the active
    /// set.
    pub fn normalize(&mut self) {
        for i in 0..self.items.len() {
            if !self.is_eligible(i) {
                self.active[i] = false;
            }
        }
        if self.mode == SelectionMode::Single {
            // keep the most recently ordered item, else the first one
            let keep = self
                .order
                .iter()
                .rev()
                .find_map(|label| self.position(label).filter(|i| self.active[*i]))
                .or_else(|| self.active.iter().position(|on| *on));
            for (i, on) in self.active.iter_mut().enumerate() {
                *on = Some(i) == keep;
            }
        }
        self.sync_order(&[]);
    }

    /// Drop inactive labels from the order, then append `activated`
    /// followed by any active label still missing, de-duplicated.
    fn sync_order(&mut self, activated: &[usize]) {
        if !self.remember_order {
            self.order.clear();
            return;
        }
        let active = self.active_labels();
        self.order.retain(|label| active.contains(label));
        let mut seen = std::collections::HashSet::new();
        self.order.retain(|label| seen.insert(label.clone()));

        let missing: Vec<String> = activated
            .iter()
            .filter_map(|i| self.items.get(*i).map(|it| it.label.clone()))
            .chain(active)
            .collect();
        for label in missing {
            if !self.order.contains(&label) {
                self.order.push(label);
            }
        }
    }

    /// Click on item `index`. A shift-click in multiple mode with a known
    /// `anchor` applies the clicked item's new state to the whole range
    /// between the two, skipping disabled items.
    pub fn activate(
        &mut self,
        index: usize,
        shift: bool,
        anchor: Option<usize>,
    ) -> Result<(), StateError> {
        let len = self.items.len();
        if index >= len {
            return Err(StateError::IndexOutOfRange { index, len });
        }
        if !self.is_eligible(index) {
            return Err(StateError::ItemDisabled(self.items[index].label.clone()));
        }

        let target = !self.active[index];
        let mut activated = Vec::new();
        match (self.mode, shift, anchor.filter(|a| *a < len)) {
            (SelectionMode::Single, _, _) => {
                self.active.iter_mut().for_each(|on| *on = false);
                self.active[index] = target;
                activated.push(index);
            }
            (SelectionMode::Multiple, true, Some(anchor)) => {
                let (lo, hi) = (anchor.min(index), anchor.max(index));
                for i in lo..=hi {
                    if self.is_eligible(i) {
                        self.active[i] = target;
                        activated.push(i);
                    }
                }
            }
            (SelectionMode::Multiple, _, _) => {
                self.active[index] = target;
                activated.push(index);
            }
        }
        if !target {
            activated.clear();
        }
        self.sync_order(&activated);
        Ok(())
    }

    /// Toggle the item labelled `label`, as an unshifted click.
    pub fn toggle_label(&mut self, label: &str) -> Result<(), StateError> {
        let index = self
            .position(label)
            .ok_or_else(|| StateError::UnknownItem(label.to_string()))?;
        self.activate(index, false, None)
    }

    /// Replace the active set with exactly `labels`, kept in that order.
    pub fn set_active<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<(), StateError> {
        let mut indices = Vec::with_capacity(labels.len());
        for label in labels {
            let label = label.as_ref();
            let index = self
                .position(label)
                .ok_or_else(|| StateError::UnknownItem(label.to_string()))?;
            if !self.is_eligible(index) {
                return Err(StateError::ItemDisabled(label.to_string()));
            }
            if !indices.contains(&index) {
                indices.push(index);
            }
        }
        if self.mode == SelectionMode::Single && indices.len() > 1 {
            return Err(StateError::TooManyForSingle(indices.len()));
        }
        for (i, on) in self.active.iter_mut().enumerate() {
            *on = indices.contains(&i);
        }
        self.order.clear();
        self.sync_order(&indices);
        Ok(())
    }

    /// Append an item. Returns false when the label already exists.
    pub fn add_item(&mut self, item: ContainerItem) -> bool {
        if self.position(&item.label).is_some() {
            return false;
        }
        self.items.push(item);
        self.active.push(false);
        true
    }

    pub fn remove_item(&mut self, label: &str) -> bool {
        let Some(index) = self.position(label) else {
            return false;
        };
        self.items.remove(index);
        self.active.remove(index);
        self.sync_order(&[]);
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.active.clear();
        self.order.clear();
    }

    /// Deactivate everything, keeping the items.
    pub fn deselect_all(&mut self) {
        self.active.iter_mut().for_each(|on| *on = false);
        self.order.clear();
    }
}

// ─── Dialog operations ───────────────────────────────────────────────────

impl Dialog {
    /// Current state of a container element.
    pub fn container_state(&self, id: ElementId) -> Result<ContainerState, StateError> {
        let element = self.registry.get(id).ok_or(StateError::NotFound(id))?;
        if element.kind != ElementKind::Container {
            return Err(StateError::WrongKind {
                id,
                actual: element.kind,
                expected: ElementKind::Container,
            });
        }
        Ok(ContainerState::from_attrs(element.attrs()))
    }

    fn edit_container(
        &mut self,
        id: ElementId,
        edit: impl FnOnce(&mut ContainerState, &mut Self) -> Result<(), StateError>,
    ) -> Result<Resolution, StateError> {
        let mut state = self.container_state(id)?;
        edit(&mut state, self)?;
        self.update(id, state.to_attrs())
            .map_err(|_| StateError::NotFound(id))
    }

    /// Click on item `index`; `shift` extends from the last clicked item.
    pub fn activate_item(
        &mut self,
        id: ElementId,
        index: usize,
        shift: bool,
    ) -> Result<Resolution, StateError> {
        self.edit_container(id, |state, dialog| {
            let anchor = dialog.ctx.anchor(id);
            state.activate(index, shift, anchor)?;
            if !shift || anchor.is_none() {
                dialog.ctx.set_anchor(id, Some(index));
            }
            Ok(())
        })
    }

    pub fn toggle_item(&mut self, id: ElementId, label: &str) -> Result<Resolution, StateError> {
        self.edit_container(id, |state, dialog| {
            state.toggle_label(label)?;
            dialog.ctx.set_anchor(id, state.position(label));
            Ok(())
        })
    }

    pub fn set_active<S: AsRef<str>>(
        &mut self,
        id: ElementId,
        labels: &[S],
    ) -> Result<Resolution, StateError> {
        self.edit_container(id, |state, _| state.set_active(labels))
    }

    pub fn add_item(
        &mut self,
        id: ElementId,
        item: ContainerItem,
    ) -> Result<Resolution, StateError> {
        self.edit_container(id, |state, _| {
            if !state.add_item(item) {
                log::debug!("container `{id}` already holds that item");
            }
            Ok(())
        })
    }

    pub fn remove_item(&mut self, id: ElementId, label: &str) -> Result<Resolution, StateError> {
        self.edit_container(id, |state, dialog| {
            if !state.remove_item(label) {
                return Err(StateError::UnknownItem(label.to_string()));
            }
            dialog.ctx.set_anchor(id, None);
            Ok(())
        })
    }

    pub fn clear_items(&mut self, id: ElementId) -> Result<Resolution, StateError> {
        self.edit_container(id, |state, dialog| {
            state.clear();
            dialog.ctx.set_anchor(id, None);
            Ok(())
        })
    }

    /// Deactivate every item of a container.
    pub fn clear_active(&mut self, id: ElementId) -> Result<Resolution, StateError> {
        self.edit_container(id, |state, dialog| {
            state.deselect_all();
            dialog.ctx.set_anchor(id, None);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state(mode: &str, filter: &str, items: &[(&str, &str)]) -> ContainerState {
        let labels: Vec<&str> = items.iter().map(|(l, _)| *l).collect();
        let types: Vec<&str> = items.iter().map(|(_, t)| *t).collect();
        let mut attrs = AttrMap::new();
        attrs.insert("selection".into(), mode.into());
        attrs.insert("itemType".into(), filter.into());
        attrs.insert("items".into(), encode_list(&labels));
        attrs.insert("itemTypes".into(), encode_list(&types));
        attrs.insert("orderSelection".into(), "true".into());
        ContainerState::from_attrs(&attrs)
    }

    #[test]
    fn single_mode_replaces_previous() {
        let mut s = state("single", "any", &[("a", ""), ("b", ""), ("c", "")]);
        s.activate(0, false, None).unwrap();
        s.activate(1, false, Some(0)).unwrap();
        assert_eq!(s.active_labels(), vec!["b"]);
        // clicking the active item again turns it off
        s.activate(1, false, Some(1)).unwrap();
        assert!(s.active_labels().is_empty());
    }

    #[test]
    fn shift_range_skips_disabled_items() {
        let mut s = state(
            "multiple",
            "numeric",
            &[("a", "numeric"), ("b", "string"), ("c", "numeric"), ("d", "numeric"), ("e", "numeric")],
        );
        s.activate(0, false, None).unwrap();
        s.activate(3, true, Some(0)).unwrap();
        assert_eq!(s.active_labels(), vec!["a", "c", "d"]);
        assert_eq!(s.state(1), Some(ItemState::Disabled));
        assert_eq!(s.state(4), Some(ItemState::Inactive));

        // shift-clicking an active item collapses the range
        s.activate(2, true, Some(0)).unwrap();
        assert_eq!(s.active_labels(), vec!["d"]);
    }

    #[test]
    fn disabled_item_cannot_be_activated() {
        let mut s = state("multiple", "numeric", &[("age", "numeric"), ("name", "string")]);
        assert_eq!(
            s.toggle_label("name"),
            Err(StateError::ItemDisabled("name".into()))
        );
        assert!(s.active_labels().is_empty());
    }

    #[test]
    fn selection_order_tracks_activation() {
        let mut s = state("multiple", "any", &[("a", ""), ("b", ""), ("c", "")]);
        s.toggle_label("c").unwrap();
        s.toggle_label("a").unwrap();
        s.toggle_label("b").unwrap();
        assert_eq!(s.selection_order(), &["c", "a", "b"]);
        s.toggle_label("a").unwrap();
        assert_eq!(s.selection_order(), &["c", "b"]);
        s.remove_item("c");
        assert_eq!(s.selected(), vec!["b"]);
    }

    #[test]
    fn set_active_is_exact() {
        let mut s = state("multiple", "any", &[("a", ""), ("b", ""), ("c", "")]);
        s.toggle_label("a").unwrap();
        s.set_active(&["c", "b"]).unwrap();
        assert_eq!(s.active_labels(), vec!["b", "c"]);
        assert_eq!(s.selection_order(), &["c", "b"]);
        assert_eq!(s.set_active(&["zz"]), Err(StateError::UnknownItem("zz".into())));

        let mut single = state("single", "any", &[("a", ""), ("b", "")]);
        assert_eq!(single.set_active(&["a", "b"]), Err(StateError::TooManyForSingle(2)));
    }

    #[test]
    fn filter_change_deactivates_ineligible() {
        let mut s = state("multiple", "any", &[("a", "numeric"), ("b", "string")]);
        s.set_active(&["a", "b"]).unwrap();
        s.filter = Some("numeric".into());
        s.normalize();
        assert_eq!(s.active_labels(), vec!["a"]);
    }
}

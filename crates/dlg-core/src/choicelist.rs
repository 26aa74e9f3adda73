//! Sortable choice lists: rows with a tri-state order marker.
//!
//! The persisted state is the `state` attribute, a list of `label:order`
//! tokens. A sample state (see [`sample_state`]) exists only for
//! non-interactive previews and is never written back.

use crate::codec::{decode_bool, decode_list, encode_list};
use crate::dialog::Dialog;
use crate::dispatch::Resolution;
use crate::error::StateError;
use crate::id::ElementId;
use crate::model::{AttrMap, ElementKind};
use serde::{Deserialize, Serialize};

pub(crate) const CHOICELIST_KEYS: [&str; 4] = ["items", "state", "ordering", "sortable"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Off,
    Asc,
    Desc,
}

impl Order {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "off" => Some(Order::Off),
            "asc" => Some(Order::Asc),
            "desc" => Some(Order::Desc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Order::Off => "off",
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }

    /// off → asc → desc → off, skipping desc without `ordering`.
    pub fn next(self, ordering: bool) -> Self {
        match self {
            Order::Off => Order::Asc,
            Order::Asc if ordering => Order::Desc,
            Order::Asc | Order::Desc => Order::Off,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub label: String,
    pub order: Order,
}

impl Row {
    pub fn parse(token: &str) -> Result<Self, StateError> {
        let malformed = || StateError::MalformedState(token.to_string());
        let (label, order) = token.rsplit_once(':').ok_or_else(malformed)?;
        Ok(Row {
            label: label.to_string(),
            order: Order::parse(order).ok_or_else(malformed)?,
        })
    }

    pub fn token(&self) -> String {
        format!("{}:{}", self.label, self.order.as_str())
    }
}

/// Decode `label:order` tokens. Labels may contain colons; the marker is
/// everything after the last one.
pub fn decode_state(raw: &str) -> Result<Vec<Row>, StateError> {
    decode_list(raw).iter().map(|token| Row::parse(token)).collect()
}

pub fn encode_state(rows: &[Row]) -> String {
    let tokens: Vec<String> = rows.iter().map(Row::token).collect();
    encode_list(&tokens)
}

/// Preview-only state: the first row ascending, the second descending
/// (ascending without `ordering`), the rest off.
pub fn sample_state<S: AsRef<str>>(labels: &[S], ordering: bool) -> Vec<Row> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| Row {
            label: label.as_ref().to_string(),
            order: match i {
                0 => Order::Asc,
                1 if ordering => Order::Desc,
                1 => Order::Asc,
                _ => Order::Off,
            },
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceListState {
    pub rows: Vec<Row>,
    pub ordering: bool,
    pub sortable: bool,
}

impl ChoiceListState {
    /// Rows follow `items`; each takes its marker from `state` (off when
    /// missing). Fails only on a malformed `state` token.
    pub fn from_attrs(attrs: &AttrMap) -> Result<Self, StateError> {
        let get = |key: &str| attrs.get(key).map(String::as_str).unwrap_or_default();
        let saved = decode_state(get("state"))?;
        let mut state = Self {
            rows: Vec::new(),
            ordering: decode_bool(get("ordering")).unwrap_or(true),
            sortable: decode_bool(get("sortable")).unwrap_or(true),
        };
        for label in decode_list(get("items")) {
            if state.rows.iter().any(|r| r.label == label) {
                continue;
            }
            let order = saved
                .iter()
                .find(|r| r.label == label)
                .map(|r| r.order)
                .unwrap_or_default();
            state.rows.push(Row { label, order });
        }
        state.normalize();
        Ok(state)
    }

    pub fn to_attrs(&self) -> AttrMap {
        let labels: Vec<&str> = self.rows.iter().map(|r| r.label.as_str()).collect();
        let mut out = AttrMap::new();
        out.insert("items".into(), encode_list(&labels));
        out.insert("state".into(), encode_state(&self.rows));
        out
    }

    /// Without `ordering`, a descending marker degrades to ascending.
    pub fn normalize(&mut self) {
        if !self.ordering {
            for row in &mut self.rows {
                if row.order == Order::Desc {
                    row.order = Order::Asc;
                }
            }
        }
    }

    /// Tokens of every row that is not off, in row order.
    pub fn value(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter(|r| r.order != Order::Off)
            .map(Row::token)
            .collect()
    }

    pub fn cycle(&mut self, index: usize) -> Result<Order, StateError> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(StateError::IndexOutOfRange { index, len })?;
        row.order = row.order.next(self.ordering);
        Ok(row.order)
    }

    /// Move a row, keeping its marker.
    pub fn move_row(&mut self, from: usize, to: usize) -> Result<(), StateError> {
        if !self.sortable {
            return Err(StateError::NotSortable);
        }
        let len = self.rows.len();
        for index in [from, to] {
            if index >= len {
                return Err(StateError::IndexOutOfRange { index, len });
            }
        }
        let row = self.rows.remove(from);
        self.rows.insert(to, row);
        Ok(())
    }

    /// Replace the markers with exactly the given rows; others go off.
    pub fn set_rows(&mut self, rows: &[Row]) -> Result<(), StateError> {
        for row in rows {
            if !self.rows.iter().any(|r| r.label == row.label) {
                return Err(StateError::UnknownItem(row.label.clone()));
            }
        }
        for row in &mut self.rows {
            row.order = rows
                .iter()
                .find(|r| r.label == row.label)
                .map(|r| r.order)
                .unwrap_or_default();
        }
        self.normalize();
        Ok(())
    }
}

// ─── Dialog operations ───────────────────────────────────────────────────

impl Dialog {
    pub fn choicelist_state(&self, id: ElementId) -> Result<ChoiceListState, StateError> {
        let element = self.registry.get(id).ok_or(StateError::NotFound(id))?;
        if element.kind != ElementKind::ChoiceList {
            return Err(StateError::WrongKind {
                id,
                actual: element.kind,
                expected: ElementKind::ChoiceList,
            });
        }
        ChoiceListState::from_attrs(element.attrs())
    }

    fn edit_choicelist(
        &mut self,
        id: ElementId,
        edit: impl FnOnce(&mut ChoiceListState) -> Result<(), StateError>,
    ) -> Result<Resolution, StateError> {
        let mut state = self.choicelist_state(id)?;
        edit(&mut state)?;
        self.update(id, state.to_attrs())
            .map_err(|_| StateError::NotFound(id))
    }

    /// Advance row `index` to its next marker.
    pub fn cycle_row(&mut self, id: ElementId, index: usize) -> Result<Resolution, StateError> {
        self.edit_choicelist(id, |state| state.cycle(index).map(|_| ()))
    }

    pub fn move_row(
        &mut self,
        id: ElementId,
        from: usize,
        to: usize,
    ) -> Result<Resolution, StateError> {
        self.edit_choicelist(id, |state| state.move_row(from, to))
    }

    pub fn set_rows(&mut self, id: ElementId, rows: &[Row]) -> Result<Resolution, StateError> {
        self.edit_choicelist(id, |state| state.set_rows(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn list(items: &str, state: &str, ordering: bool) -> ChoiceListState {
        let mut attrs = AttrMap::new();
        attrs.insert("items".into(), items.into());
        attrs.insert("state".into(), state.into());
        attrs.insert("ordering".into(), ordering.to_string());
        ChoiceListState::from_attrs(&attrs).unwrap()
    }

    #[test]
    fn cycle_with_ordering() {
        let mut s = list("a,b", "", true);
        let seen: Vec<Order> = (0..4).map(|_| s.cycle(0).unwrap()).collect();
        assert_eq!(seen, vec![Order::Asc, Order::Desc, Order::Off, Order::Asc]);
    }

    #[test]
    fn cycle_without_ordering() {
        let mut s = list("a", "", false);
        let seen: Vec<Order> = (0..3).map(|_| s.cycle(0).unwrap()).collect();
        assert_eq!(seen, vec![Order::Asc, Order::Off, Order::Asc]);
    }

    #[test]
    fn move_keeps_marker() {
        let mut s = list("a,b,c", "a:desc,c:asc", true);
        s.move_row(0, 2).unwrap();
        assert_eq!(s.value(), vec!["c:asc", "a:desc"]);
        assert_eq!(encode_state(&s.rows), "b:off,c:asc,a:desc");
    }

    #[test]
    fn labels_with_colons_split_at_last() {
        let rows = decode_state("ratio a:b:asc").unwrap();
        assert_eq!(rows[0].label, "ratio a:b");
        assert_eq!(rows[0].order, Order::Asc);
        assert!(decode_state("broken").is_err());
        assert!(decode_state("x:sideways").is_err());
    }

    #[test]
    fn desc_degrades_without_ordering() {
        let s = list("a", "a:desc", false);
        assert_eq!(s.rows[0].order, Order::Asc);
    }

    #[test]
    fn sample_state_markers() {
        let rows = sample_state(&["x", "y", "z"], true);
        let orders: Vec<Order> = rows.iter().map(|r| r.order).collect();
        assert_eq!(orders, vec![Order::Asc, Order::Desc, Order::Off]);
        assert_eq!(sample_state(&["x", "y"], false)[1].order, Order::Asc);
    }

    #[test]
    fn unsortable_rows_stay_put() {
        let mut s = list("a,b", "", true);
        s.sortable = false;
        assert_eq!(s.move_row(0, 1), Err(StateError::NotSortable));
    }
}

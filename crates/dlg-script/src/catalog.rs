//! The read-only data catalog collaborator.

use crate::error::ScriptError;
use dlg_core::ContainerItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Variable {
    pub fn new(label: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: kind.into(),
        }
    }
}

impl From<Variable> for ContainerItem {
    fn from(v: Variable) -> Self {
        ContainerItem::new(v.label, Some(v.kind).filter(|k| !k.is_empty()))
    }
}

/// Named datasets, each a list of variables. Consumers never mutate it.
pub trait DataCatalog {
    fn datasets(&self) -> Vec<String>;
    /// `None` when the dataset does not exist.
    fn variables(&self, dataset: &str) -> Option<Vec<Variable>>;
}

/// A catalog with no datasets.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCatalog;

impl DataCatalog for EmptyCatalog {
    fn datasets(&self) -> Vec<String> {
        Vec::new()
    }

    fn variables(&self, _dataset: &str) -> Option<Vec<Variable>> {
        None
    }
}

/// An in-memory catalog, loadable from JSON of the form
/// `{ "dataset": [ { "label": "...", "type": "..." } ] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticCatalog {
    datasets: BTreeMap<String, Vec<Variable>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(mut self, name: impl Into<String>, variables: Vec<Variable>) -> Self {
        self.datasets.insert(name.into(), variables);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl DataCatalog for StaticCatalog {
    fn datasets(&self) -> Vec<String> {
        self.datasets.keys().cloned().collect()
    }

    fn variables(&self, dataset: &str) -> Option<Vec<Variable>> {
        self.datasets.get(dataset).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn static_catalog_from_json() {
        let catalog = StaticCatalog::from_json(
            r#"{ "survey": [ { "label": "age", "type": "numeric" }, { "label": "city", "type": "string" } ] }"#,
        )
        .unwrap();
        assert_eq!(catalog.datasets(), vec!["survey"]);
        assert_eq!(catalog.variables("survey").unwrap()[0], Variable::new("age", "numeric"));
        assert_eq!(catalog.variables("missing"), None);
    }

    #[test]
    fn variables_become_typed_items() {
        let item: ContainerItem = Variable::new("age", "numeric").into();
        assert_eq!(item.item_type.as_deref(), Some("numeric"));
    }
}

//! Persisted dialog documents.
//!
//! JSON is the on-disk form; MessagePack snapshots are the compact form
//! used for undo history. Attribute maps round-trip exactly: loading
//! writes them straight into the registry without dispatcher coercion.

use crate::codec::encode_bool;
use crate::context::{Notice, NoticeLevel};
use crate::dialog::Dialog;
use crate::error::DocumentError;
use crate::id::ElementId;
use crate::lint::lint_dialog;
use crate::model::{AttrMap, DialogProperties, Element, ElementKind};
use crate::naming::next_free_name;
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ElementId>,
    pub attributes: AttrMap,
}

/// Properties, elements in document order (parents before children,
/// siblings back to front), and the script source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DialogDocument {
    pub properties: DialogProperties,
    pub elements: Vec<ElementRecord>,
    pub script: String,
}

impl DialogDocument {
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, DocumentError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }

    pub fn to_snapshot(&self) -> Result<Vec<u8>, DocumentError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }
}

impl Dialog {
    pub fn to_document(&self) -> DialogDocument {
        DialogDocument {
            properties: self.props.clone(),
            elements: self
                .registry
                .iter()
                .map(|e| ElementRecord {
                    id: e.id,
                    kind: e.kind,
                    parent: self.registry.parent_of(e.id),
                    attributes: e.attrs().clone(),
                })
                .collect(),
            script: self.script.clone(),
        }
    }

    pub fn from_document(doc: DialogDocument) -> Result<Self, DocumentError> {
        let mut dialog = Dialog::default();
        dialog.restore(doc)?;
        Ok(dialog)
    }

    /// Replace properties, elements and script with the document's,
    /// keeping the dispatch config and any context state that still
    /// refers to existing elements. On error the dialog is unchanged.
    ///
    /// Repeated nameids and extra selected radios are repaired in document
    /// order with a warning each; other lint findings are only reported.
    pub fn restore(&mut self, doc: DialogDocument) -> Result<(), DocumentError> {
        let mut registry = Registry::new();
        for record in doc.elements {
            if registry.contains(record.id) {
                return Err(DocumentError::DuplicateId(record.id));
            }
            if let Some(parent) = record.parent {
                match registry.get(parent) {
                    None => {
                        return Err(DocumentError::UnknownParent {
                            id: record.id,
                            parent,
                        });
                    }
                    Some(p) if p.kind != ElementKind::Group => {
                        return Err(DocumentError::NotAGroup {
                            id: record.id,
                            parent,
                        });
                    }
                    Some(_) => {}
                }
            }
            registry.reserve(record.kind, record.id);
            registry.insert(
                record.parent,
                Element::new(record.id, record.kind, record.attributes),
            );
        }

        let repairs = repair(&mut registry);

        let gone: Vec<ElementId> = self
            .registry
            .iter()
            .map(|e| e.id)
            .filter(|id| !registry.contains(*id))
            .collect();
        self.ctx.evict(&gone);
        self.registry = registry;
        self.props = doc.properties;
        self.script = doc.script;

        for notice in repairs {
            self.ctx.post(notice);
        }
        for diag in lint_dialog(self) {
            log::warn!("{}: {}", diag.rule, diag.message);
            self.ctx.post(
                Notice::new(NoticeLevel::Warning, Some(diag.element), diag.message)
                    .with_detail(diag.rule),
            );
        }
        log::debug!("restored dialog with {} element(s)", self.registry.len());
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        self.to_document().to_json()
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Self::from_document(DialogDocument::from_json(json)?)
    }

    pub fn to_snapshot(&self) -> Result<Vec<u8>, DocumentError> {
        self.to_document().to_snapshot()
    }
}

/// Rename later holders of a taken nameid and deselect every radio after
/// the first selected one in its group.
fn repair(registry: &mut Registry) -> Vec<Notice> {
    let mut notices = Vec::new();
    let mut names = HashSet::new();
    let mut groups = HashSet::new();
    let mut renames = Vec::new();
    let mut deselects = Vec::new();
    for element in registry.iter() {
        if !names.insert(element.nameid().to_string()) {
            renames.push((element.id, element.kind, element.nameid().to_string()));
        }
        if element.kind == ElementKind::Radio
            && element.flag("isSelected")
            && !groups.insert(element.attr("group").unwrap_or_default().to_string())
        {
            deselects.push(element.id);
        }
    }

    for (id, kind, old) in renames {
        let name = next_free_name(registry, kind.prefix());
        if let Some(element) = registry.get_mut(id) {
            element.commit(&AttrMap::from([("nameid".to_string(), name.clone())]));
        }
        log::warn!("nameid `{old}` on `{id}` is already taken, renamed to `{name}`");
        notices.push(
            Notice::new(NoticeLevel::Warning, Some(id), format!("nameid `{old}` was taken; renamed to `{name}`"))
                .with_detail("duplicate-nameid"),
        );
    }
    for id in deselects {
        if let Some(element) = registry.get_mut(id) {
            element.commit(&AttrMap::from([("isSelected".to_string(), encode_bool(false))]));
        }
        log::warn!("radio `{id}` deselected, its group already has a selection");
        notices.push(
            Notice::new(NoticeLevel::Warning, Some(id), "another radio in the group is selected; deselected")
                .with_detail("radio-exclusivity"),
        );
    }
    notices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::ElementSpec;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_roundtrip_is_lossless() {
        let mut d = Dialog::new(DialogProperties::default());
        let a = d
            .create(ElementSpec::new("Container").attr("items", "x\\,y,z").attr("custom", "kept"))
            .unwrap();
        let b = d.create(ElementSpec::new("Label").at(40.0, 50.0)).unwrap();
        let g = d.make_group(&[a, b]).unwrap();
        d.set_script("ui.onClick('label1', f);");

        let json = d.to_json().unwrap();
        let loaded = Dialog::from_json(&json).unwrap();
        assert_eq!(loaded.to_document(), d.to_document());
        assert_eq!(loaded.registry().parent_of(b), Some(g));
        assert_eq!(loaded.element(a).unwrap().attr("custom"), Some("kept"));
    }

    #[test]
    fn loaded_ids_are_not_reissued() {
        let json = r#"{
            "elements": [
                { "id": "label_7", "type": "Label", "attributes": { "nameid": "label1" } }
            ]
        }"#;
        let mut d = Dialog::from_json(json).unwrap();
        let next = d.create(ElementSpec::new("Label")).unwrap();
        assert_eq!(next.as_str(), "label_8");
        assert_eq!(d.element(next).unwrap().nameid(), "label2");
    }

    #[test]
    fn structural_errors_are_reported() {
        let json = r#"{ "elements": [
            { "id": "a_1", "type": "Label", "parent": "missing_1", "attributes": {} }
        ] }"#;
        assert!(matches!(
            Dialog::from_json(json),
            Err(DocumentError::UnknownParent { .. })
        ));
        assert!(matches!(Dialog::from_json("{"), Err(DocumentError::Json(_))));
    }

    #[test]
    fn repeated_names_and_selections_are_repaired_on_load() {
        let json = r#"{ "elements": [
            { "id": "radio_1", "type": "Radio", "attributes": { "nameid": "r", "group": "g", "isSelected": "true" } },
            { "id": "radio_2", "type": "Radio", "attributes": { "nameid": "r", "group": "g", "isSelected": "true" } }
        ] }"#;
        let d = Dialog::from_json(json).unwrap();
        let first = ElementId::intern("radio_1");
        let second = ElementId::intern("radio_2");

        assert_eq!(d.element(first).unwrap().nameid(), "r");
        assert_eq!(d.element(second).unwrap().nameid(), "radio1");
        assert!(d.element(first).unwrap().flag("isSelected"));
        assert!(!d.element(second).unwrap().flag("isSelected"));
        assert!(lint_dialog(&d).is_empty());

        let repaired: Vec<(Option<ElementId>, &str)> = d
            .context()
            .notices()
            .iter()
            .filter(|n| n.level == NoticeLevel::Warning)
            .map(|n| (n.element, n.detail.as_deref().unwrap_or_default()))
            .collect();
        assert_eq!(
            repaired,
            vec![(Some(second), "duplicate-nameid"), (Some(second), "radio-exclusivity")]
        );
    }

    #[test]
    fn other_lint_findings_become_notices() {
        let json = r#"{ "elements": [
            { "id": "label_1", "type": "Label", "attributes": { "nameid": "l", "color": "nope" } }
        ] }"#;
        let d = Dialog::from_json(json).unwrap();
        let rules: Vec<&str> = d
            .context()
            .notices()
            .iter()
            .filter_map(|n| n.detail.as_deref())
            .collect();
        assert_eq!(rules, vec!["invalid-color"]);
    }

    #[test]
    fn snapshot_roundtrip() {
        let mut d = Dialog::new(DialogProperties::default());
        d.create(ElementSpec::new("Slider").attr("value", "0.25")).unwrap();
        let bytes = d.to_snapshot().unwrap();
        let doc = DialogDocument::from_snapshot(&bytes).unwrap();
        assert_eq!(doc, d.to_document());
    }
}

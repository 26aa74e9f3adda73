//! Element factory: the only way elements (other than groups) come into
//! being.

use crate::codec::{decode_number, encode_number};
use crate::context::{ChangeNotification, Notice, NoticeLevel};
use crate::dialog::Dialog;
use crate::error::FactoryError;
use crate::id::ElementId;
use crate::model::{AttrMap, Element, ElementKind};
use crate::naming::resolve_name;
use serde::{Deserialize, Serialize};

/// Attributes that must decode as numbers at creation time.
const NUMERIC_KEYS: [&str; 7] = ["left", "top", "width", "height", "minval", "startval", "maxval"];

/// A request to create one element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSpec {
    /// Type name, matched case-insensitively.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nameid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ElementId>,
    #[serde(default)]
    pub attrs: AttrMap,
}

impl ElementSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn named(mut self, nameid: impl Into<String>) -> Self {
        self.nameid = Some(nameid.into());
        self
    }

    pub fn in_group(mut self, parent: ElementId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn at(self, left: f64, top: f64) -> Self {
        self.attr("left", encode_number(left))
            .attr("top", encode_number(top))
    }
}

impl Dialog {
    /// Create an element from `spec`.
    ///
    /// The request is validated as a whole before anything is stored; on
    /// failure an error notice is posted and the dialog is unchanged. On
    /// success the element gets a fresh id, a unique nameid, its type
    /// defaults, and then the caller's attributes run through the
    /// dispatcher like any other update.
    pub fn create(&mut self, spec: ElementSpec) -> Result<ElementId, FactoryError> {
        let kind = match self.validate_spec(&spec) {
            Ok(kind) => kind,
            Err(err) => {
                log::warn!("cannot create element: {err}");
                self.ctx.post(
                    Notice::new(NoticeLevel::Error, None, "Cannot create element")
                        .with_detail(err.to_string()),
                );
                return Err(err);
            }
        };

        let ElementSpec {
            nameid,
            parent,
            mut attrs,
            ..
        } = spec;
        let requested = nameid.or_else(|| attrs.remove("nameid"));
        attrs.remove("nameid");

        let id = self.registry.next_id(kind);
        let name = resolve_name(&self.registry, kind, requested.as_deref());
        if let Some(requested) = requested.filter(|r| *r != name) {
            self.ctx.warn(
                Some(id),
                format!("nameid `{requested}` is unavailable; using `{name}`"),
            );
        }

        let (width, height) = kind.default_size();
        let mut base = AttrMap::new();
        base.insert("nameid".into(), name);
        base.insert("left".into(), "0".into());
        base.insert("top".into(), "0".into());
        base.insert("width".into(), encode_number(width));
        base.insert("height".into(), encode_number(height));
        base.insert("isVisible".into(), "true".into());
        base.insert("isEnabled".into(), "true".into());
        for (key, value) in kind.defaults() {
            base.insert((*key).to_string(), (*value).to_string());
        }
        if kind == ElementKind::Counter
            && !attrs.contains_key("minval")
            && let Some(start) = attrs.get("startval").cloned()
        {
            attrs.insert("minval".into(), start);
        }

        self.registry.insert(parent, Element::new(id, kind, base));
        log::debug!("created {kind} `{id}`");

        if !attrs.is_empty()
            && let Err(err) = self.apply(id, attrs, false)
        {
            log::error!("{err}");
        }
        let keys = self
            .registry
            .get(id)
            .map(|e| e.attrs().keys().cloned().collect())
            .unwrap_or_default();
        self.ctx.notify(ChangeNotification { element: id, keys });
        Ok(id)
    }

    fn validate_spec(&self, spec: &ElementSpec) -> Result<ElementKind, FactoryError> {
        let kind = ElementKind::from_name(&spec.kind)
            .ok_or_else(|| FactoryError::UnknownType(spec.kind.clone()))?;
        if kind == ElementKind::Group {
            return Err(FactoryError::GroupNotAllowed);
        }
        if spec.attrs.keys().any(|k| k.trim().is_empty()) {
            return Err(FactoryError::EmptyKey);
        }
        for key in NUMERIC_KEYS {
            if let Some(value) = spec.attrs.get(key)
                && decode_number(value).is_none()
            {
                return Err(FactoryError::NotANumber {
                    key: key.to_string(),
                    value: value.clone(),
                });
            }
        }
        if let Some(parent) = spec.parent {
            let group = self
                .registry
                .get(parent)
                .ok_or_else(|| FactoryError::UnknownParent(parent.to_string()))?;
            if group.kind != ElementKind::Group {
                return Err(FactoryError::NotAGroup(parent.to_string()));
            }
        }
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DialogProperties;
    use pretty_assertions::assert_eq;

    fn dialog() -> Dialog {
        Dialog::new(DialogProperties::default())
    }

    #[test]
    fn assigns_lowest_free_name() {
        let mut d = dialog();
        let a = d.create(ElementSpec::new("label")).unwrap();
        let b = d.create(ElementSpec::new("Label")).unwrap();
        assert_eq!(d.element(a).unwrap().nameid(), "label1");
        assert_eq!(d.element(b).unwrap().nameid(), "label2");
        assert_eq!(a.as_str(), "label_1");
    }

    #[test]
    fn colliding_name_falls_back_with_warning() {
        let mut d = dialog();
        d.create(ElementSpec::new("Button").named("ok")).unwrap();
        let second = d.create(ElementSpec::new("Button").named("ok")).unwrap();
        assert_eq!(d.element(second).unwrap().nameid(), "button1");
        assert!(
            d.context()
                .notices()
                .iter()
                .any(|n| n.level == NoticeLevel::Warning && n.message.contains("`ok`"))
        );
    }

    #[test]
    fn malformed_spec_mutates_nothing() {
        let mut d = dialog();
        assert_eq!(
            d.create(ElementSpec::new("Spinner")),
            Err(FactoryError::UnknownType("Spinner".into()))
        );
        assert_eq!(
            d.create(ElementSpec::new("Input").attr("left", "ten")),
            Err(FactoryError::NotANumber {
                key: "left".into(),
                value: "ten".into()
            })
        );
        assert_eq!(d.create(ElementSpec::new("Group")), Err(FactoryError::GroupNotAllowed));
        assert!(d.registry().is_empty());
        assert_eq!(d.context().notices().len(), 3);
        assert!(d.context().notices().iter().all(|n| n.level == NoticeLevel::Error));
    }

    #[test]
    fn parent_must_be_a_group() {
        let mut d = dialog();
        let label = d.create(ElementSpec::new("Label")).unwrap();
        assert_eq!(
            d.create(ElementSpec::new("Label").in_group(label)),
            Err(FactoryError::NotAGroup(label.to_string()))
        );
    }

    #[test]
    fn counter_min_defaults_from_start() {
        let mut d = dialog();
        let c = d.create(ElementSpec::new("Counter").attr("startval", "3")).unwrap();
        let e = d.element(c).unwrap();
        assert_eq!(e.attr("minval"), Some("3"));
        assert_eq!(e.attr("startval"), Some("3"));

        let explicit = d
            .create(ElementSpec::new("Counter").attr("startval", "3").attr("minval", "1"))
            .unwrap();
        assert_eq!(d.element(explicit).unwrap().attr("minval"), Some("1"));
    }

    #[test]
    fn creation_emits_one_notification() {
        let mut d = dialog();
        let id = d
            .create(ElementSpec::new("Checkbox").at(10.0, 20.0).attr("isChecked", "true"))
            .unwrap();
        let changes = d.context_mut().drain_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].element, id);
        assert!(changes[0].keys.contains(&"isChecked".to_string()));
        assert_eq!(d.element(id).unwrap().rect().left, 10.0);
    }
}

//! The dialog aggregate: properties, element registry, script source and
//! the per-dialog runtime context.

use crate::codec::encode_number;
use crate::context::{ChangeNotification, Context};
use crate::dispatch::{DispatchConfig, DisplayPolicy, Presentation};
use crate::error::UpdateError;
use crate::id::ElementId;
use crate::model::{AttrMap, DialogProperties, Element};
use crate::registry::Registry;

#[derive(Debug, Clone, Default)]
pub struct Dialog {
    pub(crate) props: DialogProperties,
    pub(crate) registry: Registry,
    pub(crate) script: String,
    pub(crate) ctx: Context,
    pub(crate) config: DispatchConfig,
}

impl Dialog {
    pub fn new(props: DialogProperties) -> Self {
        Self {
            props,
            ..Self::default()
        }
    }

    pub fn with_config(props: DialogProperties, config: DispatchConfig) -> Self {
        Self {
            props,
            config,
            ..Self::default()
        }
    }

    pub fn properties(&self) -> &DialogProperties {
        &self.props
    }

    /// Replace the dialog-wide settings, then pull every element back
    /// inside the canvas, parents before their children.
    pub fn set_properties(&mut self, props: DialogProperties) {
        self.props = props;
        let ids: Vec<ElementId> = self.registry.iter().map(|e| e.id).collect();
        for id in ids {
            if let Err(err) = self.reclamp(id) {
                log::warn!("{err}");
            }
        }
    }

    /// Re-run an element's geometry through the dispatcher. Positions go
    /// first so an element slides back onto the canvas before it shrinks.
    /// One notification covers both passes.
    fn reclamp(&mut self, id: ElementId) -> Result<(), UpdateError> {
        let Some(rect) = self.registry.get(id).map(Element::rect) else {
            return Ok(());
        };
        let mut keys = Vec::new();
        for pass in [
            [("left", rect.left), ("top", rect.top)],
            [("width", rect.width), ("height", rect.height)],
        ] {
            let batch: AttrMap = pass
                .into_iter()
                .map(|(key, value)| (key.to_string(), encode_number(value)))
                .collect();
            keys.extend(self.apply(id, batch, false)?.changed);
        }
        if !keys.is_empty() {
            log::debug!("re-clamped {keys:?} on `{id}`");
            self.ctx.notify(ChangeNotification { element: id, keys });
        }
        Ok(())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.registry.get(id)
    }

    pub fn by_name(&self, nameid: &str) -> Option<&Element> {
        self.registry.get_by_name(nameid)
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn set_script(&mut self, script: impl Into<String>) {
        self.script = script.into();
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn set_policy(&mut self, policy: DisplayPolicy) {
        self.config.policy = policy;
    }

    /// How an element is shown under the current display policy. Hidden or
    /// disabled ancestors apply to their descendants.
    pub fn presentation(&self, id: ElementId) -> Option<Presentation> {
        let element = self.registry.get(id)?;
        let mut visible = element.is_visible();
        let mut enabled = element.is_enabled();
        let mut current = id;
        while let Some(parent) = self.registry.parent_of(current) {
            if let Some(p) = self.registry.get(parent) {
                visible &= p.is_visible();
                enabled &= p.is_enabled();
            }
            current = parent;
        }
        Some(Presentation::derive(self.config.policy, visible, enabled))
    }

    /// Delete an element and its descendants, evicting them from the
    /// selection, highlight and annotation state.
    pub fn remove(&mut self, id: ElementId) -> Vec<Element> {
        let removed = self.registry.remove(id);
        if !removed.is_empty() {
            let ids: Vec<ElementId> = removed.iter().map(|e| e.id).collect();
            self.ctx.evict(&ids);
            log::debug!("removed {} element(s) rooted at `{id}`", ids.len());
        }
        removed
    }
}

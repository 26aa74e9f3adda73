//! Bounding boxes, grouping and z-order.

use crate::codec::encode_number;
use crate::context::ChangeNotification;
use crate::dialog::Dialog;
use crate::error::GroupError;
use crate::id::ElementId;
use crate::model::{AttrMap, Bounds, Element, ElementKind};
use crate::naming::next_free_name;
use crate::registry::Arrange;

fn position_batch(left: f64, top: f64) -> AttrMap {
    let mut batch = AttrMap::new();
    batch.insert("left".into(), encode_number(left));
    batch.insert("top".into(), encode_number(top));
    batch
}

impl Dialog {
    /// Tightest canvas-space box around `ids`. Unknown ids are ignored;
    /// `None` when nothing remains.
    pub fn compute_bounds(&self, ids: &[ElementId]) -> Option<Bounds> {
        ids.iter()
            .filter_map(|id| self.registry.absolute_bounds(*id))
            .reduce(|acc, b| acc.union(&b))
    }

    /// Wrap sibling elements in a new group placed at their bounding box.
    /// Members keep their absolute position and relative z-order; the
    /// group takes the z slot of the frontmost member.
    pub fn make_group(&mut self, ids: &[ElementId]) -> Result<ElementId, GroupError> {
        let mut members: Vec<ElementId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !members.contains(id) {
                members.push(*id);
            }
        }
        if members.len() < 2 {
            return Err(GroupError::TooFew(members.len()));
        }
        if let Some(missing) = members.iter().find(|id| !self.registry.contains(**id)) {
            return Err(GroupError::NotFound(*missing));
        }
        let parent = self.registry.parent_of(members[0]);
        if members.iter().any(|id| self.registry.parent_of(*id) != parent) {
            return Err(GroupError::MixedParents);
        }

        let bounds = self
            .compute_bounds(&members)
            .ok_or(GroupError::NotFound(members[0]))?;
        members.sort_by_key(|id| self.registry.z_index(*id).unwrap_or(0));
        let siblings = self.registry.children(parent);
        let front = members
            .iter()
            .filter_map(|id| self.registry.z_index(*id))
            .max()
            .unwrap_or(0);
        let slot = siblings[..=front.min(siblings.len().saturating_sub(1))]
            .iter()
            .filter(|s| !members.contains(s))
            .count();
        let absolute: Vec<(ElementId, Bounds)> = members
            .iter()
            .filter_map(|id| self.registry.absolute_bounds(*id).map(|b| (*id, b)))
            .collect();

        let (ox, oy) = match parent {
            Some(p) => self
                .registry
                .absolute_bounds(p)
                .map(|b| (b.left, b.top))
                .unwrap_or((0.0, 0.0)),
            None => (0.0, 0.0),
        };
        let group = self.registry.next_id(ElementKind::Group);
        let mut attrs = AttrMap::new();
        attrs.insert("nameid".into(), next_free_name(&self.registry, ElementKind::Group.prefix()));
        attrs.insert("left".into(), encode_number((bounds.left - ox).round()));
        attrs.insert("top".into(), encode_number((bounds.top - oy).round()));
        attrs.insert("width".into(), encode_number(bounds.width.round().max(1.0)));
        attrs.insert("height".into(), encode_number(bounds.height.round().max(1.0)));
        attrs.insert("isVisible".into(), "true".into());
        attrs.insert("isEnabled".into(), "true".into());
        self.registry
            .insert(parent, Element::new(group, ElementKind::Group, attrs));
        self.registry.reparent(group, parent, Some(slot));

        let origin = self
            .registry
            .absolute_bounds(group)
            .map(|b| (b.left, b.top))
            .unwrap_or((bounds.left, bounds.top));
        for (id, abs) in absolute {
            self.registry.reparent(id, Some(group), None);
            let batch = position_batch(abs.left - origin.0, abs.top - origin.1);
            if let Err(err) = self.update(id, batch) {
                log::warn!("{err}");
            }
        }

        let keys = self
            .registry
            .get(group)
            .map(|e| e.attrs().keys().cloned().collect())
            .unwrap_or_default();
        self.ctx.notify(ChangeNotification { element: group, keys });
        log::debug!("grouped {} element(s) into `{group}`", members.len());
        Ok(group)
    }

    /// Dissolve a group. Its children move to the group's parent at the
    /// group's z slot, keeping their absolute positions. Returns them in
    /// z-order.
    pub fn ungroup(&mut self, id: ElementId) -> Result<Vec<ElementId>, GroupError> {
        let group = self.registry.get(id).ok_or(GroupError::NotFound(id))?;
        if group.kind != ElementKind::Group {
            return Err(GroupError::NotAGroup(id));
        }
        let offset = group.rect();
        let parent = self.registry.parent_of(id);
        let slot = self.registry.z_index(id).unwrap_or(0);
        let children = self.registry.children(Some(id));

        for (i, child) in children.iter().enumerate() {
            let rel = self
                .registry
                .get(*child)
                .map(Element::rect)
                .unwrap_or_default();
            self.registry.reparent(*child, parent, Some(slot + i));
            let batch = position_batch(rel.left + offset.left, rel.top + offset.top);
            if let Err(err) = self.update(*child, batch) {
                log::warn!("{err}");
            }
        }
        self.remove(id);
        log::debug!("ungrouped `{id}` into {} element(s)", children.len());
        Ok(children)
    }

    /// Reorder one element within its parent. Returns whether anything moved.
    pub fn arrange(&mut self, id: ElementId, arrange: Arrange) -> bool {
        self.registry.arrange(id, arrange)
    }
}

//! Element registry: the canonical per-dialog store.
//!
//! Elements live in a `StableDiGraph` whose edges go from a group to its
//! children. Top-level elements have no incoming edge. Child order (z-order,
//! last = front) is kept explicitly per parent, so it survives edge churn.

use crate::id::ElementId;
use crate::model::{Bounds, Element, ElementKind};
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Registry {
    graph: StableDiGraph<Element, ()>,
    index: HashMap<ElementId, NodeIndex>,
    /// Z-order of top-level elements.
    top: Vec<NodeIndex>,
    /// Z-order of each group's children.
    order: HashMap<NodeIndex, Vec<NodeIndex>>,
    /// Last serial handed out per id prefix.
    serials: HashMap<&'static str, u64>,
}

/// Z-order operations within a parent's child list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Arrange {
    BringToFront,
    SendToBack,
    BringForward,
    SendBackward,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    /// Look up an element by its human-facing nameid (case-sensitive).
    pub fn get_by_name(&self, nameid: &str) -> Option<&Element> {
        self.iter().find(|e| e.nameid() == nameid)
    }

    pub fn is_name_taken(&self, nameid: &str) -> bool {
        self.graph
            .node_weights()
            .any(|element| element.nameid() == nameid)
    }

    /// Owning group, or `None` for top-level (and unknown) elements.
    pub fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        let idx = self.index.get(&id)?;
        self.parent_index(*idx).map(|p| self.graph[p].id)
    }

    fn parent_index(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
    }

    /// Children of `parent` (or top-level elements for `None`) in z-order.
    pub fn children(&self, parent: Option<ElementId>) -> Vec<ElementId> {
        self.siblings(parent)
            .map(|list| list.iter().map(|idx| self.graph[*idx].id).collect())
            .unwrap_or_default()
    }

    fn siblings(&self, parent: Option<ElementId>) -> Option<&Vec<NodeIndex>> {
        match parent {
            None => Some(&self.top),
            Some(pid) => {
                let pidx = self.index.get(&pid)?;
                self.order.get(pidx)
            }
        }
    }

    fn siblings_mut(&mut self, parent: Option<NodeIndex>) -> &mut Vec<NodeIndex> {
        match parent {
            None => &mut self.top,
            Some(pidx) => self.order.entry(pidx).or_default(),
        }
    }

    /// All elements in document order: depth-first, back to front.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        let mut out = Vec::with_capacity(self.index.len());
        self.collect_depth_first(&self.top, &mut out);
        out.into_iter().map(|idx| &self.graph[idx])
    }

    fn collect_depth_first(&self, list: &[NodeIndex], out: &mut Vec<NodeIndex>) {
        for &idx in list {
            out.push(idx);
            if let Some(children) = self.order.get(&idx) {
                self.collect_depth_first(children, out);
            }
        }
    }

    /// Radio elements whose `group` attribute equals `group`, in document order.
    pub fn radio_group(&self, group: &str) -> Vec<ElementId> {
        self.iter()
            .filter(|e| e.kind == ElementKind::Radio && e.attr("group") == Some(group))
            .map(|e| e.id)
            .collect()
    }

    /// Sum of ancestor offsets: the absolute origin `id`'s geometry is relative to.
    pub fn parent_origin(&self, id: ElementId) -> (f64, f64) {
        match self.parent_of(id) {
            Some(parent) => self
                .absolute_bounds(parent)
                .map(|b| (b.left, b.top))
                .unwrap_or((0.0, 0.0)),
            None => (0.0, 0.0),
        }
    }

    /// Geometry in canvas coordinates.
    pub fn absolute_bounds(&self, id: ElementId) -> Option<Bounds> {
        let rect = self.get(id)?.rect();
        let (ox, oy) = self.parent_origin(id);
        Some(rect.translate(ox, oy))
    }

    // ─── Structural mutation (crate-internal) ────────────────────────────

    /// Allocate the next unused id for `kind` in this dialog.
    pub(crate) fn next_id(&mut self, kind: ElementKind) -> ElementId {
        let prefix = kind.prefix();
        loop {
            let serial = self.serials.entry(prefix).or_insert(0);
            *serial += 1;
            let id = ElementId::with_serial(prefix, *serial);
            if !self.contains(id) {
                return id;
            }
        }
    }

    /// Make sure later `next_id` calls skip an id loaded from a document.
    pub(crate) fn reserve(&mut self, kind: ElementKind, id: ElementId) {
        if let Some(serial) = id.serial() {
            let slot = self.serials.entry(kind.prefix()).or_insert(0);
            *slot = (*slot).max(serial);
        }
    }

    /// Insert at the front of `parent`'s z-order. The caller guarantees the
    /// id is fresh and the parent (if any) is a known group.
    pub(crate) fn insert(&mut self, parent: Option<ElementId>, element: Element) {
        let id = element.id;
        let parent_idx = parent.and_then(|p| self.index.get(&p).copied());
        let idx = self.graph.add_node(element);
        if let Some(pidx) = parent_idx {
            self.graph.add_edge(pidx, idx, ());
        }
        self.siblings_mut(parent_idx).push(idx);
        self.index.insert(id, idx);
    }

    /// Remove an element and all its descendants. Returns them, removed
    /// element first.
    pub(crate) fn remove(&mut self, id: ElementId) -> Vec<Element> {
        let Some(idx) = self.index.get(&id).copied() else {
            return Vec::new();
        };
        let parent = self.parent_index(idx);
        self.siblings_mut(parent).retain(|s| *s != idx);

        let mut doomed = vec![idx];
        if let Some(children) = self.order.get(&idx) {
            self.collect_depth_first(children, &mut doomed);
        }
        let mut removed = Vec::with_capacity(doomed.len());
        for d in doomed {
            self.order.remove(&d);
            if let Some(element) = self.graph.remove_node(d) {
                self.index.remove(&element.id);
                removed.push(element);
            }
        }
        removed
    }

    /// Move `id` under `new_parent` at z-position `position` (front when `None`).
    pub(crate) fn reparent(
        &mut self,
        id: ElementId,
        new_parent: Option<ElementId>,
        position: Option<usize>,
    ) {
        let Some(idx) = self.index.get(&id).copied() else {
            return;
        };
        let old_parent = self.parent_index(idx);
        self.siblings_mut(old_parent).retain(|s| *s != idx);
        if let Some(old) = old_parent
            && let Some(edge) = self.graph.find_edge(old, idx)
        {
            self.graph.remove_edge(edge);
        }

        let new_idx = new_parent.and_then(|p| self.index.get(&p).copied());
        if let Some(pidx) = new_idx {
            self.graph.add_edge(pidx, idx, ());
        }
        let list = self.siblings_mut(new_idx);
        let at = position.unwrap_or(list.len()).min(list.len());
        list.insert(at, idx);
    }

    /// Position of `id` within its parent's z-order.
    pub fn z_index(&self, id: ElementId) -> Option<usize> {
        let idx = self.index.get(&id)?;
        let parent = self.parent_of(id);
        self.siblings(parent)?.iter().position(|s| s == idx)
    }

    /// Reorder `id` within its parent's child list. Returns true if the
    /// z-order changed. Relative order of the other siblings is preserved.
    pub(crate) fn arrange(&mut self, id: ElementId, arrange: Arrange) -> bool {
        let Some(idx) = self.index.get(&id).copied() else {
            return false;
        };
        let parent = self.parent_index(idx);
        let siblings = self.siblings_mut(parent);
        let Some(pos) = siblings.iter().position(|&s| s == idx) else {
            return false;
        };
        let last = siblings.len() - 1;
        let to = match arrange {
            Arrange::BringToFront => last,
            Arrange::SendToBack => 0,
            Arrange::BringForward => (pos + 1).min(last),
            Arrange::SendBackward => pos.saturating_sub(1),
        };
        if to == pos {
            return false;
        }
        let child = siblings.remove(pos);
        siblings.insert(to, child);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttrMap;

    fn add(reg: &mut Registry, kind: ElementKind, parent: Option<ElementId>) -> ElementId {
        let id = reg.next_id(kind);
        let mut attrs = AttrMap::new();
        attrs.insert("nameid".into(), id.as_str().replace('_', ""));
        reg.insert(parent, Element::new(id, kind, attrs));
        id
    }

    #[test]
    fn insert_and_lookup() {
        let mut reg = Registry::new();
        let a = add(&mut reg, ElementKind::Button, None);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(a).map(|e| e.kind), Some(ElementKind::Button));
        assert_eq!(reg.get_by_name("button1").map(|e| e.id), Some(a));
        assert_eq!(reg.children(None), vec![a]);
    }

    #[test]
    fn ids_are_per_registry() {
        let mut one = Registry::new();
        let mut two = Registry::new();
        assert_eq!(one.next_id(ElementKind::Label), two.next_id(ElementKind::Label));
    }

    #[test]
    fn arrange_preserves_relative_order() {
        let mut reg = Registry::new();
        let a = add(&mut reg, ElementKind::Label, None);
        let b = add(&mut reg, ElementKind::Label, None);
        let c = add(&mut reg, ElementKind::Label, None);
        let d = add(&mut reg, ElementKind::Label, None);

        assert!(reg.arrange(a, Arrange::BringToFront));
        assert_eq!(reg.children(None), vec![b, c, d, a]);
        assert!(reg.arrange(d, Arrange::SendToBack));
        assert_eq!(reg.children(None), vec![d, b, c, a]);
        assert!(reg.arrange(b, Arrange::BringForward));
        assert_eq!(reg.children(None), vec![d, c, b, a]);
        assert!(reg.arrange(b, Arrange::SendBackward));
        assert_eq!(reg.children(None), vec![d, b, c, a]);
        assert!(!reg.arrange(d, Arrange::SendBackward));
        assert!(!reg.arrange(a, Arrange::BringForward));
    }

    #[test]
    fn remove_takes_descendants() {
        let mut reg = Registry::new();
        let g = add(&mut reg, ElementKind::Group, None);
        let a = add(&mut reg, ElementKind::Label, Some(g));
        let b = add(&mut reg, ElementKind::Label, Some(g));
        let other = add(&mut reg, ElementKind::Label, None);

        let removed = reg.remove(g);
        let ids: Vec<ElementId> = removed.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![g, a, b]);
        assert_eq!(reg.children(None), vec![other]);
        assert!(!reg.contains(a));
    }

    #[test]
    fn reparent_moves_between_lists() {
        let mut reg = Registry::new();
        let g = add(&mut reg, ElementKind::Group, None);
        let a = add(&mut reg, ElementKind::Label, None);
        reg.reparent(a, Some(g), None);
        assert_eq!(reg.children(None), vec![g]);
        assert_eq!(reg.children(Some(g)), vec![a]);
        assert_eq!(reg.parent_of(a), Some(g));

        reg.reparent(a, None, Some(0));
        assert_eq!(reg.children(None), vec![a, g]);
        assert_eq!(reg.parent_of(a), None);
    }
}

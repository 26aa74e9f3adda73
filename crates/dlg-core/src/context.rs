//! Per-dialog runtime context.
//!
//! Everything that would otherwise be process-wide lives here: the
//! notice outbox, the warn-once set, change notifications, selection and
//! highlight state, shift-click anchors, and validation annotations.

use crate::id::ElementId;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-facing message for the host to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub element: Option<ElementId>,
    pub message: String,
    pub detail: Option<String>,
}

impl Notice {
    pub fn new(level: NoticeLevel, element: Option<ElementId>, message: impl Into<String>) -> Self {
        Self {
            level,
            element,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// The external collaborator that displays notices.
pub trait NoticeSink {
    fn post(&mut self, notice: Notice);
}

impl NoticeSink for Vec<Notice> {
    fn post(&mut self, notice: Notice) {
        self.push(notice);
    }
}

/// Emitted once per committed batch that changed at least one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotification {
    pub element: ElementId,
    pub keys: Vec<String>,
}

/// Per-dialog state beside the registry. Notices and change notifications
/// accumulate until the host takes them with `drain_notices`,
/// `forward_notices` or `drain_changes`; nothing here trims them.
#[derive(Debug, Clone, Default)]
pub struct Context {
    notices: Vec<Notice>,
    warned: HashSet<(ElementId, &'static str)>,
    changes: Vec<ChangeNotification>,
    selection: Vec<ElementId>,
    highlight: Option<ElementId>,
    anchors: HashMap<ElementId, usize>,
    annotations: HashMap<ElementId, Vec<String>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Notices ─────────────────────────────────────────────────────────

    pub fn post(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn warn(&mut self, element: Option<ElementId>, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.post(Notice::new(NoticeLevel::Warning, element, message));
    }

    /// Warn at most once per (element, operation). Returns whether the
    /// warning was emitted.
    pub fn warn_once(&mut self, element: ElementId, operation: &'static str, message: &str) -> bool {
        if !self.warned.insert((element, operation)) {
            return false;
        }
        self.warn(Some(element), message);
        true
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Hand every pending notice to an external sink.
    pub fn forward_notices(&mut self, sink: &mut dyn NoticeSink) {
        for notice in self.notices.drain(..) {
            sink.post(notice);
        }
    }

    // ─── Change notifications ────────────────────────────────────────────

    pub(crate) fn notify(&mut self, change: ChangeNotification) {
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[ChangeNotification] {
        &self.changes
    }

    pub fn drain_changes(&mut self) -> Vec<ChangeNotification> {
        std::mem::take(&mut self.changes)
    }

    // ─── Selection & highlight ───────────────────────────────────────────

    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    /// Replace the selection with a single element.
    pub fn select(&mut self, id: ElementId) {
        self.selection.clear();
        self.selection.push(id);
    }

    /// Toggle `id` in or out of the selection.
    pub fn extend_selection(&mut self, id: ElementId) {
        if let Some(pos) = self.selection.iter().position(|s| *s == id) {
            self.selection.remove(pos);
        } else {
            self.selection.push(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn highlight(&mut self, id: Option<ElementId>) {
        self.highlight = id;
    }

    pub fn highlighted(&self) -> Option<ElementId> {
        self.highlight
    }

    // ─── Shift-click anchors ─────────────────────────────────────────────

    pub(crate) fn anchor(&self, id: ElementId) -> Option<usize> {
        self.anchors.get(&id).copied()
    }

    pub(crate) fn set_anchor(&mut self, id: ElementId, index: Option<usize>) {
        match index {
            Some(i) => self.anchors.insert(id, i),
            None => self.anchors.remove(&id),
        };
    }

    // ─── Validation annotations ──────────────────────────────────────────

    pub fn annotate(&mut self, id: ElementId, message: impl Into<String>) {
        let message = message.into();
        let list = self.annotations.entry(id).or_default();
        if !list.contains(&message) {
            list.push(message);
        }
    }

    /// Remove one annotation, or all of them when `message` is `None`.
    pub fn clear_annotation(&mut self, id: ElementId, message: Option<&str>) {
        match message {
            None => {
                self.annotations.remove(&id);
            }
            Some(m) => {
                if let Some(list) = self.annotations.get_mut(&id) {
                    list.retain(|existing| existing != m);
                    if list.is_empty() {
                        self.annotations.remove(&id);
                    }
                }
            }
        }
    }

    pub fn annotations(&self, id: ElementId) -> &[String] {
        self.annotations.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Drop every piece of state that references removed elements.
    pub(crate) fn evict(&mut self, ids: &[ElementId]) {
        self.selection.retain(|s| !ids.contains(s));
        if self.highlight.is_some_and(|h| ids.contains(&h)) {
            self.highlight = None;
        }
        for id in ids {
            self.anchors.remove(id);
            self.annotations.remove(id);
        }
        self.warned.retain(|(id, _)| !ids.contains(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warn_once_per_element_and_operation() {
        let mut ctx = Context::new();
        let a = ElementId::intern("label_1");
        assert!(ctx.warn_once(a, "setValue", "unsupported"));
        assert!(!ctx.warn_once(a, "setValue", "unsupported"));
        assert!(ctx.warn_once(a, "getValue", "unsupported"));
        assert_eq!(ctx.notices().len(), 2);
    }

    #[test]
    fn evict_clears_selection_and_highlight() {
        let mut ctx = Context::new();
        let a = ElementId::intern("button_1");
        let b = ElementId::intern("button_2");
        ctx.select(a);
        ctx.extend_selection(b);
        ctx.highlight(Some(a));
        ctx.annotate(a, "required");
        ctx.evict(&[a]);
        assert_eq!(ctx.selection(), &[b]);
        assert_eq!(ctx.highlighted(), None);
        assert!(ctx.annotations(a).is_empty());
    }

    #[test]
    fn forward_notices_drains_outbox() {
        let mut ctx = Context::new();
        ctx.warn(None, "first");
        let mut sink: Vec<Notice> = Vec::new();
        ctx.forward_notices(&mut sink);
        assert_eq!(sink.len(), 1);
        assert!(ctx.notices().is_empty());
    }
}

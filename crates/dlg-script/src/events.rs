//! Event subscriptions.
//!
//! Handlers are stored once and referenced from a listener list keyed by
//! (element, event kind). A handler is taken out of its slot while it
//! runs, so it may freely call back into the API, including `dispose_all`.

use crate::api::Ui;
use crate::error::ScriptError;
use crate::value::ScriptValue;
use dlg_core::ElementId;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Change,
    Input,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Click, EventKind::Change, EventKind::Input];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Change => "change",
            EventKind::Input => "input",
        }
    }
}

impl FromStr for EventKind {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ScriptError::UnsupportedEvent(s.to_string()))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a handler receives.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub target: ElementId,
    /// The target's nameid at the time the event fired.
    pub name: String,
    pub value: ScriptValue,
}

pub type Handler = Box<dyn FnMut(&mut Ui, &Event) -> Result<(), ScriptError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Which firings a handler responds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Element,
    /// Subscribed through a radio group value: runs only when the member
    /// that fired is the selected one.
    RadioGroup(String),
}

struct Slot {
    /// `None` while the handler is running.
    handler: Option<Handler>,
    scope: Scope,
}

#[derive(Default)]
pub struct HandlerRegistry {
    next: u64,
    slots: HashMap<HandlerId, Slot>,
    listeners: HashMap<(ElementId, EventKind), SmallVec<[HandlerId; 2]>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.slots.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one handler for `kind` on every target. A target listed
    /// twice gets the listener once.
    pub fn add(
        &mut self,
        targets: &[ElementId],
        kind: EventKind,
        scope: Scope,
        handler: Handler,
    ) -> HandlerId {
        self.next += 1;
        let id = HandlerId(self.next);
        self.slots.insert(
            id,
            Slot {
                handler: Some(handler),
                scope,
            },
        );
        for target in targets {
            let list = self.listeners.entry((*target, kind)).or_default();
            if !list.contains(&id) {
                list.push(id);
            }
        }
        id
    }

    /// Handlers listening on (target, kind), in registration order.
    pub fn listeners(&self, target: ElementId, kind: EventKind) -> SmallVec<[HandlerId; 2]> {
        self.listeners
            .get(&(target, kind))
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn scope(&self, id: HandlerId) -> Option<&Scope> {
        self.slots.get(&id).map(|slot| &slot.scope)
    }

    /// Borrow a handler out for a call. `None` if it was disposed or is
    /// already running.
    pub(crate) fn take(&mut self, id: HandlerId) -> Option<Handler> {
        self.slots.get_mut(&id)?.handler.take()
    }

    /// Put a handler back after its call, unless it was disposed meanwhile.
    pub(crate) fn restore(&mut self, id: HandlerId, handler: Handler) {
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.handler = Some(handler);
        }
    }

    pub fn remove(&mut self, id: HandlerId) -> bool {
        if self.slots.remove(&id).is_none() {
            return false;
        }
        self.listeners.retain(|_, list| {
            list.retain(|h| *h != id);
            !list.is_empty()
        });
        true
    }

    /// Drop every handler. Returns how many there were.
    pub fn dispose_all(&mut self) -> usize {
        let count = self.slots.len();
        self.slots.clear();
        self.listeners.clear();
        count
    }
}

//! Runtime API for previewing dialogs: the calls a dialog's script makes
//! against live elements.

pub mod api;
pub mod catalog;
pub mod error;
pub mod events;
pub mod value;

pub use api::{Interaction, Names, Ui};
pub use catalog::{DataCatalog, EmptyCatalog, StaticCatalog, Variable};
pub use error::ScriptError;
pub use events::{Event, EventKind, Handler, HandlerId, HandlerRegistry, Scope};
pub use value::ScriptValue;

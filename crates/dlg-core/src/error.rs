//! Error types for structural and lookup failures.
//!
//! Validation problems (bad color, out-of-range number, duplicate name) are
//! not errors: the dispatcher reverts them and reports a `Rejection`.

use crate::id::ElementId;
use crate::model::ElementKind;
use thiserror::Error;

/// The target of an update could not be found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error("no element with id `{0}`")]
    NotFound(ElementId),
}

/// Malformed input to the element factory. Nothing is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactoryError {
    #[error("unknown element type `{0}`")]
    UnknownType(String),
    #[error("groups are created by grouping existing elements")]
    GroupNotAllowed,
    #[error("attribute keys must not be empty")]
    EmptyKey,
    #[error("attribute `{key}` expects a number, got `{value}`")]
    NotANumber { key: String, value: String },
    #[error("parent `{0}` does not exist")]
    UnknownParent(String),
    #[error("parent `{0}` is not a group")]
    NotAGroup(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("grouping needs at least two elements, got {0}")]
    TooFew(usize),
    #[error("no element with id `{0}`")]
    NotFound(ElementId),
    #[error("elements to group must share one parent")]
    MixedParents,
    #[error("`{0}` is not a group")]
    NotAGroup(ElementId),
}

/// Container and choice-list state machine failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("no element with id `{0}`")]
    NotFound(ElementId),
    #[error("`{id}` is a {actual}, expected a {expected}")]
    WrongKind {
        id: ElementId,
        actual: ElementKind,
        expected: ElementKind,
    },
    #[error("index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("item `{0}` is disabled by the item type filter")]
    ItemDisabled(String),
    #[error("no item labelled `{0}`")]
    UnknownItem(String),
    #[error("single selection mode accepts one item, got {0}")]
    TooManyForSingle(usize),
    #[error("rows are not sortable")]
    NotSortable,
    #[error("malformed state token `{0}`")]
    MalformedState(String),
}

/// Loading or saving a persisted dialog document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("snapshot decoding failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("duplicate element id `{0}`")]
    DuplicateId(ElementId),
    #[error("element `{id}` refers to unknown parent `{parent}`")]
    UnknownParent { id: ElementId, parent: ElementId },
    #[error("element `{id}` has non-group parent `{parent}`")]
    NotAGroup { id: ElementId, parent: ElementId },
}

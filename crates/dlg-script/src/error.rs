use dlg_core::{StateError, UpdateError};
use thiserror::Error;

/// Errors surfaced to scripts. Soft queries never produce these; they
/// answer `false` or empty instead.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("no element named `{0}`")]
    ElementNotFound(String),
    #[error("no element or radio group named `{0}`")]
    TargetNotFound(String),
    #[error("unsupported event `{0}`; expected one of click, change, input")]
    UnsupportedEvent(String),
    #[error("`{element}`: item `{item}` is not selectable under the current item type filter")]
    ItemDisabled { element: String, item: String },
    #[error("`{element}` has no item `{item}`")]
    UnknownItem { element: String, item: String },
    #[error("`{element}`: {message}")]
    InvalidValue { element: String, message: String },
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Update(#[from] UpdateError),
    #[error("invalid catalog data: {0}")]
    Catalog(#[from] serde_json::Error),
}

impl ScriptError {
    /// Attach the script-facing element name to a state machine error.
    pub(crate) fn from_state(element: &str, err: StateError) -> Self {
        match err {
            StateError::ItemDisabled(item) => ScriptError::ItemDisabled {
                element: element.to_string(),
                item,
            },
            StateError::UnknownItem(item) => ScriptError::UnknownItem {
                element: element.to_string(),
                item,
            },
            StateError::TooManyForSingle(n) => ScriptError::InvalidValue {
                element: element.to_string(),
                message: format!("single selection accepts one item, got {n}"),
            },
            StateError::MalformedState(token) => ScriptError::InvalidValue {
                element: element.to_string(),
                message: format!("malformed row state `{token}`"),
            },
            other => ScriptError::State(other),
        }
    }

    pub(crate) fn invalid(element: &str, message: impl Into<String>) -> Self {
        ScriptError::InvalidValue {
            element: element.to_string(),
            message: message.into(),
        }
    }
}

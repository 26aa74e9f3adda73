use crate::commands::Outcome;
use dlg_core::{DocumentError, ElementId, FactoryError, GroupError, UpdateError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Update(#[from] UpdateError),
    #[error(transparent)]
    Create(#[from] FactoryError),
    #[error(transparent)]
    Group(#[from] GroupError),
    #[error("document: {0}")]
    Document(#[from] DocumentError),
    #[error("no element `{0}`")]
    NotFound(ElementId),
    #[error("{action} produced {outcome:?}")]
    UnexpectedOutcome { action: &'static str, outcome: Outcome },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unexpected_outcome_names_the_action() {
        let err = EditError::UnexpectedOutcome {
            action: "group",
            outcome: Outcome::Arranged(false),
        };
        assert_eq!(err.to_string(), "group produced Arranged(false)");
    }
}

pub mod commands;
pub mod error;
pub mod session;

pub use commands::{Command, CommandStack, EditMutation, Outcome};
pub use error::EditError;
pub use session::EditorSession;

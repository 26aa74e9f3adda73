//! Undo/redo command stack.
//!
//! Every authoring mutation runs through `CommandStack::execute`, which
//! records how to reverse it:
//!
//! - An attribute batch whose effects stayed on its own element is kept as
//!   a `Single` command: the forward batch plus an inverse batch holding
//!   the previous values of every changed key.
//! - Structural edits, and batches whose reactions reached other elements
//!   or the script, are kept as a `Snapshot` of the whole document before
//!   and after (MessagePack).
//!
//! Gestures use the same snapshot form: `begin_batch` captures the
//! document, every mutation until `end_batch` is applied live, and the
//! gesture becomes a single undo step.

use crate::error::EditError;
use dlg_core::{
    AttrMap, Arrange, Dialog, DialogDocument, ElementId, ElementSpec, Resolution,
};

pub const DEFAULT_DEPTH: usize = 100;

/// An authoring edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditMutation {
    Update { id: ElementId, batch: AttrMap },
    Create { spec: ElementSpec },
    Remove { id: ElementId },
    Group { ids: Vec<ElementId> },
    Ungroup { id: ElementId },
    Arrange { id: ElementId, arrange: Arrange },
}

/// What a mutation did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Updated(Resolution),
    Created(ElementId),
    Removed(Vec<ElementId>),
    Grouped(ElementId),
    Ungrouped(Vec<ElementId>),
    Arranged(bool),
}

impl Outcome {
    /// Whether the dialog was left untouched.
    pub fn is_noop(&self) -> bool {
        match self {
            Outcome::Updated(res) => res.changed.is_empty(),
            Outcome::Removed(ids) => ids.is_empty(),
            Outcome::Arranged(moved) => !moved,
            Outcome::Created(_) | Outcome::Grouped(_) | Outcome::Ungrouped(_) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    Single {
        forward: Box<EditMutation>,
        inverse: Box<EditMutation>,
        description: String,
    },
    Snapshot {
        before: Vec<u8>,
        after: Vec<u8>,
        description: String,
    },
}

impl Command {
    pub fn description(&self) -> &str {
        match self {
            Command::Single { description, .. } | Command::Snapshot { description, .. } => {
                description
            }
        }
    }
}

#[derive(Debug)]
pub struct CommandStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    batch_snapshot: Option<Vec<u8>>,
    batch_dirty: bool,
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth.min(DEFAULT_DEPTH)),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            batch_depth: 0,
            batch_snapshot: None,
            batch_dirty: false,
        }
    }

    /// Start a gesture. Batches nest; only the outermost one records.
    pub fn begin_batch(&mut self, dialog: &Dialog) -> Result<(), EditError> {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(dialog.to_snapshot()?);
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
        Ok(())
    }

    /// End a gesture. When the outermost batch closes and the document
    /// changed, one snapshot command is pushed.
    pub fn end_batch(&mut self, dialog: &Dialog, description: &str) -> Result<(), EditError> {
        if self.batch_depth == 0 {
            return Ok(());
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return Ok(());
        }
        let before = self.batch_snapshot.take();
        let dirty = std::mem::take(&mut self.batch_dirty);
        if let Some(before) = before
            && dirty
        {
            let after = dialog.to_snapshot()?;
            if before != after {
                self.push(Command::Snapshot {
                    before,
                    after,
                    description: description.to_string(),
                });
            } else {
                log::trace!("gesture `{description}` left the document unchanged");
            }
        }
        Ok(())
    }

    /// Apply `mutation` and record it for undo. A mutation that changes
    /// nothing records nothing. The pre-state is held as a document and
    /// only encoded when the command ends up a `Snapshot`.
    pub fn execute(
        &mut self,
        dialog: &mut Dialog,
        mutation: EditMutation,
        description: &str,
    ) -> Result<Outcome, EditError> {
        if self.batch_depth > 0 {
            let outcome = apply(dialog, mutation)?;
            self.batch_dirty |= !outcome.is_noop();
            return Ok(outcome);
        }

        let before = dialog.to_document();
        let previous = match &mutation {
            EditMutation::Update { id, .. } => Some(
                dialog
                    .element(*id)
                    .ok_or(EditError::NotFound(*id))?
                    .attrs()
                    .clone(),
            ),
            _ => None,
        };
        let script_before = dialog.script().to_string();
        let seen = dialog.context().changes().len();

        let outcome = apply(dialog, mutation.clone())?;
        if outcome.is_noop() {
            return Ok(outcome);
        }

        let inverse = match (&mutation, &outcome, previous) {
            (EditMutation::Update { id, .. }, Outcome::Updated(res), Some(previous))
                if dialog.script() == script_before
                    && dialog
                        .context()
                        .changes()
                        .get(seen..)
                        .is_some_and(|new| new.iter().all(|c| c.element == *id)) =>
            {
                inverse_batch(&previous, &res.changed).map(|batch| EditMutation::Update {
                    id: *id,
                    batch,
                })
            }
            _ => None,
        };

        let command = match inverse {
            Some(inverse) => Command::Single {
                forward: Box::new(mutation),
                inverse: Box::new(inverse),
                description: description.to_string(),
            },
            None => Command::Snapshot {
                before: before.to_snapshot()?,
                after: dialog.to_snapshot()?,
                description: description.to_string(),
            },
        };
        self.push(command);
        Ok(outcome)
    }

    fn push(&mut self, command: Command) {
        log::debug!("recorded `{}`", command.description());
        self.undo_stack.push(command);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Undo the last command. Returns its description.
    pub fn undo(&mut self, dialog: &mut Dialog) -> Result<Option<String>, EditError> {
        let Some(command) = self.undo_stack.pop() else {
            return Ok(None);
        };
        let result = match &command {
            Command::Single { inverse, .. } => apply(dialog, (**inverse).clone()).map(|_| ()),
            Command::Snapshot { before, .. } => restore(dialog, before),
        };
        if let Err(err) = result {
            self.undo_stack.push(command);
            return Err(err);
        }
        let description = command.description().to_string();
        self.redo_stack.push(command);
        Ok(Some(description))
    }

    /// Redo the last undone command. Returns its description.
    pub fn redo(&mut self, dialog: &mut Dialog) -> Result<Option<String>, EditError> {
        let Some(command) = self.redo_stack.pop() else {
            return Ok(None);
        };
        let result = match &command {
            Command::Single { forward, .. } => apply(dialog, (**forward).clone()).map(|_| ()),
            Command::Snapshot { after, .. } => restore(dialog, after),
        };
        if let Err(err) = result {
            self.redo_stack.push(command);
            return Err(err);
        }
        let description = command.description().to_string();
        self.undo_stack.push(command);
        Ok(Some(description))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Forget all history, e.g. after loading a different document.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch_depth = 0;
        self.batch_snapshot = None;
        self.batch_dirty = false;
    }
}

/// Previous values of `changed`. `None` when a key did not exist before,
/// since no batch can delete it again.
fn inverse_batch(previous: &AttrMap, changed: &[String]) -> Option<AttrMap> {
    changed
        .iter()
        .map(|key| previous.get(key).map(|old| (key.clone(), old.clone())))
        .collect()
}

fn restore(dialog: &mut Dialog, bytes: &[u8]) -> Result<(), EditError> {
    dialog.restore(DialogDocument::from_snapshot(bytes)?)?;
    Ok(())
}

fn apply(dialog: &mut Dialog, mutation: EditMutation) -> Result<Outcome, EditError> {
    Ok(match mutation {
        EditMutation::Update { id, batch } => Outcome::Updated(dialog.update(id, batch)?),
        EditMutation::Create { spec } => Outcome::Created(dialog.create(spec)?),
        EditMutation::Remove { id } => {
            Outcome::Removed(dialog.remove(id).into_iter().map(|e| e.id).collect())
        }
        EditMutation::Group { ids } => Outcome::Grouped(dialog.make_group(&ids)?),
        EditMutation::Ungroup { id } => Outcome::Ungrouped(dialog.ungroup(id)?),
        EditMutation::Arrange { id, arrange } => Outcome::Arranged(dialog.arrange(id, arrange)),
    })
}

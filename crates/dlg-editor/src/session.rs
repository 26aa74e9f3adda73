//! Authoring session: the dialog being built, its undo history and the
//! editor selection.
//!
//! The session is the only writer of the authored dialog. Previews run on
//! a clone, so nothing a script does in preview reaches the document.

use crate::commands::{CommandStack, EditMutation, Outcome};
use crate::error::EditError;
use dlg_core::{
    Arrange, AttrMap, ChangeNotification, Dialog, DialogProperties, ElementId, ElementSpec,
    Notice, Resolution,
};
use dlg_script::{DataCatalog, Ui};

#[derive(Debug, Default)]
pub struct EditorSession {
    dialog: Dialog,
    stack: CommandStack,
}

impl EditorSession {
    pub fn new(props: DialogProperties) -> Self {
        Self::from_dialog(Dialog::new(props))
    }

    pub fn from_dialog(dialog: Dialog) -> Self {
        Self {
            dialog,
            stack: CommandStack::default(),
        }
    }

    pub fn with_history_depth(mut self, max_depth: usize) -> Self {
        self.stack = CommandStack::new(max_depth);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, EditError> {
        Ok(Self::from_dialog(Dialog::from_json(json)?))
    }

    pub fn to_json(&self) -> Result<String, EditError> {
        Ok(self.dialog.to_json()?)
    }

    /// Replace the document wholesale and drop the history.
    pub fn load_json(&mut self, json: &str) -> Result<(), EditError> {
        let doc = dlg_core::DialogDocument::from_json(json)?;
        self.dialog.restore(doc)?;
        self.stack.clear();
        Ok(())
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub fn history(&self) -> &CommandStack {
        &self.stack
    }

    // ─── Edits ───────────────────────────────────────────────────────────

    pub fn execute(&mut self, mutation: EditMutation, description: &str) -> Result<Outcome, EditError> {
        self.stack.execute(&mut self.dialog, mutation, description)
    }

    pub fn update(&mut self, id: ElementId, batch: AttrMap) -> Result<Resolution, EditError> {
        match self.execute(EditMutation::Update { id, batch }, "edit properties")? {
            Outcome::Updated(res) => Ok(res),
            _ => Ok(Resolution::default()),
        }
    }

    pub fn set_attr(&mut self, id: ElementId, key: &str, value: impl Into<String>) -> Result<Resolution, EditError> {
        let mut batch = AttrMap::new();
        batch.insert(key.to_string(), value.into());
        self.update(id, batch)
    }

    /// Create an element and make it the sole selection.
    pub fn create(&mut self, spec: ElementSpec) -> Result<ElementId, EditError> {
        let description = format!("add {}", spec.kind);
        match self.execute(EditMutation::Create { spec }, &description)? {
            Outcome::Created(id) => {
                self.dialog.context_mut().select(id);
                Ok(id)
            }
            outcome => Err(EditError::UnexpectedOutcome { action: "create", outcome }),
        }
    }

    pub fn remove(&mut self, id: ElementId) -> Result<Vec<ElementId>, EditError> {
        match self.execute(EditMutation::Remove { id }, "delete")? {
            Outcome::Removed(ids) => Ok(ids),
            _ => Ok(Vec::new()),
        }
    }

    /// Delete every selected element as one undo step.
    pub fn remove_selected(&mut self) -> Result<usize, EditError> {
        let ids = self.dialog.context().selection().to_vec();
        if ids.is_empty() {
            return Ok(0);
        }
        self.stack.begin_batch(&self.dialog)?;
        let mut removed = 0;
        for id in ids {
            if self.dialog.element(id).is_some() {
                removed += self.execute(EditMutation::Remove { id }, "delete")
                    .map(|o| match o {
                        Outcome::Removed(ids) => ids.len(),
                        _ => 0,
                    })?;
            }
        }
        self.stack.end_batch(&self.dialog, "delete selection")?;
        Ok(removed)
    }

    pub fn group(&mut self, ids: &[ElementId]) -> Result<ElementId, EditError> {
        match self.execute(EditMutation::Group { ids: ids.to_vec() }, "group")? {
            Outcome::Grouped(group) => {
                self.dialog.context_mut().select(group);
                Ok(group)
            }
            outcome => Err(EditError::UnexpectedOutcome { action: "group", outcome }),
        }
    }

    /// Group the current selection.
    pub fn group_selection(&mut self) -> Result<ElementId, EditError> {
        let ids = self.dialog.context().selection().to_vec();
        self.group(&ids)
    }

    pub fn ungroup(&mut self, id: ElementId) -> Result<Vec<ElementId>, EditError> {
        match self.execute(EditMutation::Ungroup { id }, "ungroup")? {
            Outcome::Ungrouped(children) => {
                let ctx = self.dialog.context_mut();
                ctx.clear_selection();
                for child in &children {
                    ctx.extend_selection(*child);
                }
                Ok(children)
            }
            _ => Ok(Vec::new()),
        }
    }

    pub fn arrange(&mut self, id: ElementId, arrange: Arrange) -> Result<bool, EditError> {
        let outcome = self.execute(EditMutation::Arrange { id, arrange }, "arrange")?;
        Ok(matches!(outcome, Outcome::Arranged(true)))
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    /// Start a gesture such as a drag; every edit until `end_gesture` is
    /// undone together.
    pub fn begin_gesture(&mut self) -> Result<(), EditError> {
        self.stack.begin_batch(&self.dialog)
    }

    pub fn end_gesture(&mut self, description: &str) -> Result<(), EditError> {
        self.stack.end_batch(&self.dialog, description)
    }

    /// Offset every selected element, clamped by the dispatcher.
    pub fn nudge_selection(&mut self, dx: f64, dy: f64) -> Result<(), EditError> {
        let ids = self.dialog.context().selection().to_vec();
        self.begin_gesture()?;
        for id in ids {
            let Some(rect) = self.dialog.element(id).map(|e| e.rect()) else {
                continue;
            };
            let mut batch = AttrMap::new();
            batch.insert("left".into(), dlg_core::codec::encode_number(rect.left + dx));
            batch.insert("top".into(), dlg_core::codec::encode_number(rect.top + dy));
            self.execute(EditMutation::Update { id, batch }, "move")?;
        }
        self.end_gesture("move")
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> Result<Option<String>, EditError> {
        self.stack.undo(&mut self.dialog)
    }

    pub fn redo(&mut self) -> Result<Option<String>, EditError> {
        self.stack.redo(&mut self.dialog)
    }

    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select(&mut self, id: ElementId) {
        self.dialog.context_mut().select(id);
    }

    pub fn extend_selection(&mut self, id: ElementId) {
        self.dialog.context_mut().extend_selection(id);
    }

    pub fn clear_selection(&mut self) {
        self.dialog.context_mut().clear_selection();
    }

    pub fn selection(&self) -> &[ElementId] {
        self.dialog.context().selection()
    }

    pub fn highlight(&mut self, id: Option<ElementId>) {
        self.dialog.context_mut().highlight(id);
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.dialog.context_mut().drain_notices()
    }

    pub fn drain_changes(&mut self) -> Vec<ChangeNotification> {
        self.dialog.context_mut().drain_changes()
    }

    // ─── Preview ─────────────────────────────────────────────────────────

    /// Launch a preview on a copy of the authored dialog. Editing state
    /// (selection, pending notices and changes) is not carried over.
    pub fn preview(&self, catalog: Box<dyn DataCatalog>) -> Ui {
        let mut copy = self.dialog.clone();
        let ctx = copy.context_mut();
        ctx.clear_selection();
        ctx.highlight(None);
        ctx.drain_notices();
        ctx.drain_changes();
        log::debug!("launching preview of `{}`", copy.properties().title);
        Ui::new(copy, catalog)
    }
}

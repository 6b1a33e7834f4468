/// Row Actions and Mutation Messages
///
/// Row-level actions (copy a value, edit, delete) receive an explicit
/// `RowContext` for the row they act on. Edits and deletes are not applied by
/// the engine: they become `RowMutation` messages handed to the host through
/// `RowMutationHandler`, and the host answers with success or a
/// `MutationError`. After a successful mutation the host refreshes the data
/// with `TableController::set_rows`.

use crate::error::{FieldErrors, MutationError};
use crate::table::{Row, RowId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name to new value, in field order.
pub type RowPatch = BTreeMap<String, String>;

/// Mutation request sent to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RowMutation {
    /// Replace the listed fields of a row
    Update { id: RowId, patch: RowPatch },

    /// Remove a row
    Delete { id: RowId },
}

impl RowMutation {
    pub fn id(&self) -> &RowId {
        match self {
            RowMutation::Update { id, .. } | RowMutation::Delete { id } => id,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Implemented by the host to apply mutations to its data store.
pub trait RowMutationHandler {
    fn update(&mut self, id: &RowId, patch: &RowPatch) -> Result<(), MutationError>;
    fn delete(&mut self, id: &RowId) -> Result<(), MutationError>;
}

/// Route a mutation to the matching handler method.
pub fn dispatch<H>(handler: &mut H, mutation: &RowMutation) -> Result<(), MutationError>
where
    H: RowMutationHandler + ?Sized,
{
    let result = match mutation {
        RowMutation::Update { id, patch } => handler.update(id, patch),
        RowMutation::Delete { id } => handler.delete(id),
    };

    if let Err(err) = &result {
        log::warn!("mutation on row '{}' rejected: {}", mutation.id(), err);
    }
    result
}

/// The row a row action operates on.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    pub row: &'a Row,
    /// Position of the row in the current sorted view.
    pub position: usize,
    pub selected: bool,
}

impl<'a> RowContext<'a> {
    pub fn id(&self) -> &'a RowId {
        self.row.id()
    }

    /// Text of one cell, as placed on the clipboard.
    pub fn copy_value(&self, column: &str) -> String {
        self.row.get(column).map(|v| v.to_text()).unwrap_or_default()
    }

    pub fn delete_request(&self) -> RowMutation {
        RowMutation::Delete { id: self.row.id().clone() }
    }
}

/// State of the edit dialog for one row.
///
/// The draft starts from the row's current values. Submitting sends the
/// whole draft as an `Update`; what happens next depends on the host's
/// answer:
///
/// - success closes the dialog
/// - `Validation` keeps it open and shows the errors next to each field
/// - `NotFound` closes it (the row is gone, the host should refresh)
/// - `Failed` keeps it open with a form-level message
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    id: RowId,
    original: RowPatch,
    draft: RowPatch,
    errors: FieldErrors,
    form_error: Option<String>,
    open: bool,
}

impl EditSession {
    /// Open the dialog for the row in `ctx`, editing `fields`.
    pub fn open(ctx: &RowContext<'_>, fields: &[&str]) -> Self {
        let original: RowPatch = fields
            .iter()
            .map(|field| (field.to_string(), ctx.copy_value(field)))
            .collect();

        EditSession {
            id: ctx.id().clone(),
            draft: original.clone(),
            original,
            errors: FieldErrors::new(),
            form_error: None,
            open: true,
        }
    }

    pub fn id(&self) -> &RowId {
        &self.id
    }

    /// Change one draft field. Fields the session was not opened with are
    /// ignored; returns whether the field exists.
    pub fn set_field(&mut self, field: &str, value: impl Into<String>) -> bool {
        match self.draft.get_mut(field) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => {
                log::debug!("edit session for '{}' has no field '{}'", self.id, field);
                false
            }
        }
    }

    pub fn field(&self, field: &str) -> Option<&str> {
        self.draft.get(field).map(String::as_str)
    }

    pub fn draft(&self) -> &RowPatch {
        &self.draft
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.original
    }

    /// Restore the original values and clear all errors.
    pub fn reset(&mut self) {
        self.draft = self.original.clone();
        self.errors = FieldErrors::new();
        self.form_error = None;
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Close without submitting.
    pub fn cancel(&mut self) {
        self.reset();
        self.open = false;
    }

    /// Send the draft to `handler`. The outcome is always returned.
    pub fn submit<H>(&mut self, handler: &mut H) -> Result<(), MutationError>
    where
        H: RowMutationHandler + ?Sized,
    {
        if !self.open {
            return Err(MutationError::Failed("edit session is closed".to_string()));
        }

        self.errors = FieldErrors::new();
        self.form_error = None;

        let mutation = RowMutation::Update {
            id: self.id.clone(),
            patch: self.draft.clone(),
        };

        let result = dispatch(handler, &mutation);
        match &result {
            Ok(()) => self.open = false,
            Err(MutationError::Validation(errors)) => self.errors = errors.clone(),
            Err(MutationError::NotFound(_)) => self.open = false,
            Err(MutationError::Failed(message)) => self.form_error = Some(message.clone()),
        }
        result
    }
}

/// Two-step delete: the user must confirm before the request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    id: RowId,
    open: bool,
}

impl DeleteConfirmation {
    pub fn open(ctx: &RowContext<'_>) -> Self {
        DeleteConfirmation {
            id: ctx.id().clone(),
            open: true,
        }
    }

    pub fn id(&self) -> &RowId {
        &self.id
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn cancel(&mut self) {
        self.open = false;
    }

    /// Send the delete. The dialog closes whatever the outcome.
    pub fn confirm<H>(&mut self, handler: &mut H) -> Result<(), MutationError>
    where
        H: RowMutationHandler + ?Sized,
    {
        if !self.open {
            return Err(MutationError::Failed("delete confirmation is closed".to_string()));
        }
        self.open = false;
        dispatch(handler, &RowMutation::Delete { id: self.id.clone() })
    }
}

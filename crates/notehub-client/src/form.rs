//! State of the create-note form.
//!
//! A form lives from "open" to either cancel or a successful submit, and a
//! fresh one is created each time the form is opened. Submitting validates
//! the draft first; an invalid draft records per-field messages and is not
//! sent. A valid draft disables the submit control until the request
//! settles, so a second submit in the meantime is refused.

use notehub_core::{Field, FieldErrors, NewNote, NoteDraft, validate_draft};

/// Why a submit attempt did not produce a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitBlocked {
    /// The draft failed client-side validation.
    #[error("invalid note: {0}")]
    Invalid(FieldErrors),

    /// A submit is already in progress.
    #[error("a submit is already in progress")]
    InProgress,
}

/// The create-note form: draft, field errors and submit state.
#[derive(Debug, Clone, Default)]
pub struct NoteForm {
    draft: NoteDraft,
    errors: FieldErrors,
    submitting: bool,
}

impl NoteForm {
    /// An empty form with the default tag selected.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &NoteDraft {
        &self.draft
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.draft.content = content.into();
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.draft.tag = tag.into();
    }

    /// Errors from the last submit attempt.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Inline message shown under one field.
    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(field)
    }

    /// True while the submit control is disabled.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Validates the draft and, when valid, disables the submit control.
    ///
    /// Returns the request body to send.
    pub fn begin_submit(&mut self) -> Result<NewNote, SubmitBlocked> {
        if self.submitting {
            return Err(SubmitBlocked::InProgress);
        }

        match validate_draft(&self.draft) {
            Ok(note) => {
                self.errors = FieldErrors::default();
                self.submitting = true;
                Ok(note)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(SubmitBlocked::Invalid(errors))
            }
        }
    }

    /// Re-enables the submit control after a failed request.
    ///
    /// The draft is kept so the user can try again.
    pub fn submit_failed(&mut self) {
        self.submitting = false;
    }
}

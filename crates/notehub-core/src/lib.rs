//! Core types for the NoteHub client.
//!
//! - [`types`]: notes, tags, list pages and query keys as exchanged with
//!   the remote notes API
//! - [`validation`]: the pure draft validation function used before any
//!   create request is sent

pub mod types;
pub mod validation;

pub use types::{
    DEFAULT_PER_PAGE, NewNote, Note, NoteDraft, NoteId, NoteTag, NotesPage, ParseTagError,
    QueryKey,
};
pub use validation::{
    CONTENT_MAX_LEN, Field, FieldErrors, TITLE_MAX_LEN, TITLE_MIN_LEN, validate_draft,
};

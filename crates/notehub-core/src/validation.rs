//! Client-side validation of note drafts.
//!
//! [`validate_draft`] is a pure function: it maps a [`NoteDraft`] to either
//! the request body to send or a set of per-field messages. A draft that
//! fails here never reaches the network.
//!
//! Rules:
//! - title: required, 3 to 50 characters
//! - content: optional, at most 500 characters
//! - tag: required, one of the five [`NoteTag`] names
//!
//! Lengths count Unicode scalar values, not bytes.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::types::{NewNote, NoteDraft, NoteTag};

/// Minimum title length.
pub const TITLE_MIN_LEN: usize = 3;

/// Maximum title length.
pub const TITLE_MAX_LEN: usize = 50;

/// Maximum content length.
pub const CONTENT_MAX_LEN: usize = 500;

/// A form field that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Content,
    Tag,
}

impl Field {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation messages keyed by field, at most one per field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    /// True when no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Message for one field, if it failed.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Failed fields in form order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    fn insert(&mut self, field: Field, message: &str) {
        self.0.entry(field).or_insert_with(|| message.to_string());
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Validates a draft, returning the body to submit or every field error.
pub fn validate_draft(draft: &NoteDraft) -> Result<NewNote, FieldErrors> {
    let mut errors = FieldErrors::default();

    let title_len = draft.title.chars().count();
    if title_len == 0 {
        errors.insert(Field::Title, "Title is required");
    } else if title_len < TITLE_MIN_LEN {
        errors.insert(Field::Title, "Title is too short");
    } else if title_len > TITLE_MAX_LEN {
        errors.insert(Field::Title, "Title is too long");
    }

    if draft.content.chars().count() > CONTENT_MAX_LEN {
        errors.insert(Field::Content, "Too long");
    }

    let tag = if draft.tag.is_empty() {
        errors.insert(Field::Tag, "Tag is required");
        None
    } else {
        match draft.tag.parse::<NoteTag>() {
            Ok(tag) => Some(tag),
            Err(_) => {
                errors.insert(Field::Tag, "Invalid tag");
                None
            }
        }
    };

    match tag {
        Some(tag) if errors.is_empty() => Ok(NewNote {
            title: draft.title.clone(),
            content: draft.content.clone(),
            tag,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, content: &str, tag: &str) -> NoteDraft {
        NoteDraft {
            title: title.to_string(),
            content: content.to_string(),
            tag: tag.to_string(),
        }
    }

    #[test]
    fn valid_draft_becomes_new_note() {
        let note = validate_draft(&draft("Groceries", "eggs", "Shopping")).unwrap();
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content, "eggs");
        assert_eq!(note.tag, NoteTag::Shopping);
    }

    #[test]
    fn short_title_is_rejected() {
        let errors = validate_draft(&draft("ab", "", "Todo")).unwrap_err();
        assert_eq!(errors.get(Field::Title), Some("Title is too short"));
        assert_eq!(errors.get(Field::Content), None);
        assert_eq!(errors.get(Field::Tag), None);
    }

    #[test]
    fn empty_title_is_required() {
        let errors = validate_draft(&draft("", "", "Todo")).unwrap_err();
        assert_eq!(errors.get(Field::Title), Some("Title is required"));
    }

    #[test]
    fn title_length_bounds_are_inclusive() {
        assert!(validate_draft(&draft("abc", "", "Work")).is_ok());
        assert!(validate_draft(&draft(&"a".repeat(TITLE_MAX_LEN), "", "Work")).is_ok());

        let errors = validate_draft(&draft(&"a".repeat(TITLE_MAX_LEN + 1), "", "Work")).unwrap_err();
        assert_eq!(errors.get(Field::Title), Some("Title is too long"));
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        // Three characters, nine bytes.
        assert!(validate_draft(&draft("日本語", "", "Personal")).is_ok());
    }

    #[test]
    fn content_is_optional_but_bounded() {
        assert!(validate_draft(&draft("Title", "", "Todo")).is_ok());
        assert!(validate_draft(&draft("Title", &"x".repeat(CONTENT_MAX_LEN), "Todo")).is_ok());

        let errors =
            validate_draft(&draft("Title", &"x".repeat(CONTENT_MAX_LEN + 1), "Todo")).unwrap_err();
        assert_eq!(errors.get(Field::Content), Some("Too long"));
    }

    #[test]
    fn tag_must_be_known() {
        let errors = validate_draft(&draft("Title", "", "Errands")).unwrap_err();
        assert_eq!(errors.get(Field::Tag), Some("Invalid tag"));

        let errors = validate_draft(&draft("Title", "", "")).unwrap_err();
        assert_eq!(errors.get(Field::Tag), Some("Tag is required"));
    }

    #[test]
    fn every_failing_field_is_reported() {
        let errors = validate_draft(&draft("", &"x".repeat(501), "nope")).unwrap_err();
        let fields: Vec<Field> = errors.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec![Field::Title, Field::Content, Field::Tag]);
        assert_eq!(
            errors.to_string(),
            "title: Title is required; content: Too long; tag: Invalid tag"
        );
    }
}

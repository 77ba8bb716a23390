//! Data types exchanged with the remote notes API.
//!
//! Notes are owned by the remote service. The client only ever holds
//! transient copies whose lifetime is bounded by the query cache, and it
//! never mutates a [`Note`] in place: cached pages are replaced wholesale.
//!
//! All wire types use the camelCase field names of the remote API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of notes requested per page unless a caller overrides it.
pub const DEFAULT_PER_PAGE: u32 = 12;

// ============================================================================
// ID Types
// ============================================================================

/// Identifier of a note, assigned by the remote service.
///
/// Opaque to the client; it is only echoed back in `GET`/`DELETE` paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub String);

impl NoteId {
    /// Creates a NoteId from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NoteId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for NoteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ============================================================================
// Tags
// ============================================================================

/// The fixed set of tags a note can carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteTag {
    #[default]
    Todo,
    Work,
    Personal,
    Meeting,
    Shopping,
}

impl NoteTag {
    /// Every tag, in the order they are offered to the user.
    pub const ALL: [NoteTag; 5] = [
        NoteTag::Todo,
        NoteTag::Work,
        NoteTag::Personal,
        NoteTag::Meeting,
        NoteTag::Shopping,
    ];

    /// Wire name of the tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "Todo",
            Self::Work => "Work",
            Self::Personal => "Personal",
            Self::Meeting => "Meeting",
            Self::Shopping => "Shopping",
        }
    }
}

impl fmt::Display for NoteTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names none of the known tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tag: {0}")]
pub struct ParseTagError(pub String);

impl FromStr for NoteTag {
    type Err = ParseTagError;

    /// Tag names match exactly; `"todo"` is not `Todo`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| ParseTagError(s.to_string()))
    }
}

// ============================================================================
// Notes
// ============================================================================

/// A note as returned by the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub tag: NoteTag,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page of list results.
///
/// Note order is whatever the remote service returns for the query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesPage {
    pub notes: Vec<Note>,
    #[serde(default)]
    pub total_pages: u32,
}

impl NotesPage {
    /// True when the query matched nothing on this page.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

// ============================================================================
// Drafts
// ============================================================================

/// Form contents as typed by the user, before validation.
///
/// The tag is kept as raw text so that an unknown value can be reported
/// as a field error instead of being unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub tag: String,
}

impl Default for NoteDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            tag: NoteTag::default().to_string(),
        }
    }
}

/// A draft that passed validation; the request body of `POST /notes`.
///
/// Only [`crate::validate_draft`] constructs this outside of tests, so a
/// `NewNote` in hand means the client-side rules held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub tag: NoteTag,
}

// ============================================================================
// Query keys
// ============================================================================

/// Identifies one cacheable list query: search text plus page number.
///
/// Distinct keys never share a cache slot. The page is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey {
    search: String,
    page: u32,
}

impl QueryKey {
    /// Cache namespace every list key lives under.
    pub const NAMESPACE: &'static str = "notes";

    /// Creates a key; a page of 0 is treated as page 1.
    #[must_use]
    pub fn new(search: impl Into<String>, page: u32) -> Self {
        Self {
            search: search.into(),
            page: page.max(1),
        }
    }

    /// The first page of an unfiltered listing.
    #[must_use]
    pub fn initial() -> Self {
        Self::new("", 1)
    }

    /// The committed search text.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// The `search` query parameter, absent when the search is empty.
    #[must_use]
    pub fn search_param(&self) -> Option<&str> {
        if self.search.is_empty() {
            None
        } else {
            Some(&self.search)
        }
    }

    /// Same search, different page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self::new(self.search.clone(), page)
    }
}

impl Default for QueryKey {
    fn default() -> Self {
        Self::initial()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {:?}, {}]", Self::NAMESPACE, self.search, self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTE_JSON: &str = r#"{
        "id": "65ca67e7ae7f10c88b598384",
        "title": "Weekly sync",
        "content": "Agenda: roadmap",
        "tag": "Meeting",
        "createdAt": "2024-02-12T18:47:35.000Z",
        "updatedAt": "2024-02-12T18:47:35.000Z"
    }"#;

    #[test]
    fn note_deserializes_from_remote_shape() {
        let note: Note = serde_json::from_str(NOTE_JSON).unwrap();
        assert_eq!(note.id.as_str(), "65ca67e7ae7f10c88b598384");
        assert_eq!(note.tag, NoteTag::Meeting);
        assert_eq!(note.content, "Agenda: roadmap");
    }

    #[test]
    fn note_without_content_defaults_to_empty() {
        let json = r#"{"id":"1","title":"abc","tag":"Todo",
            "createdAt":"2024-02-12T18:47:35Z","updatedAt":"2024-02-12T18:47:35Z"}"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert!(note.content.is_empty());
    }

    #[test]
    fn notes_page_uses_camel_case_total_pages() {
        let page: NotesPage = serde_json::from_str(r#"{"notes":[],"totalPages":3}"#).unwrap();
        assert_eq!(page.total_pages, 3);
        assert!(page.is_empty());
    }

    #[test]
    fn tag_parse_is_exact() {
        assert_eq!("Shopping".parse::<NoteTag>(), Ok(NoteTag::Shopping));
        assert!("shopping".parse::<NoteTag>().is_err());
        assert!("".parse::<NoteTag>().is_err());
    }

    #[test]
    fn new_note_serializes_request_body() {
        let body = NewNote {
            title: "Buy milk".to_string(),
            content: String::new(),
            tag: NoteTag::Shopping,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"title": "Buy milk", "content": "", "tag": "Shopping"})
        );
    }

    #[test]
    fn query_key_clamps_page_zero() {
        assert_eq!(QueryKey::new("x", 0).page(), 1);
    }

    #[test]
    fn query_key_search_param_absent_iff_empty() {
        assert_eq!(QueryKey::new("", 2).search_param(), None);
        assert_eq!(QueryKey::new("meeting", 1).search_param(), Some("meeting"));
        assert_eq!(QueryKey::new(" ", 1).search_param(), Some(" "));
    }

    #[test]
    fn query_keys_differ_by_either_component() {
        let a = QueryKey::new("a", 1);
        assert_ne!(a, QueryKey::new("a", 2));
        assert_ne!(a, QueryKey::new("b", 1));
        assert_eq!(a, QueryKey::new("a", 1));
        assert_eq!(a.with_page(4), QueryKey::new("a", 4));
    }

    #[test]
    fn draft_defaults_to_todo_tag() {
        assert_eq!(NoteDraft::default().tag, "Todo");
    }
}

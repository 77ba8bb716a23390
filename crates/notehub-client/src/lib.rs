//! Client for the NoteHub notes service.
//!
//! - [`config`]: immutable client configuration (base URL, bearer token)
//! - [`api`]: the [`NotesApi`] trait and its reqwest implementation
//! - [`cache`]: per-query page cache with in-flight de-duplication,
//!   stale-while-revalidate and coarse invalidation
//! - [`controller`]: debounced search text and page number
//! - [`form`]: create-note form state
//! - [`session`]: the notes screen tying all of the above together

pub mod api;
pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{HttpNotesApi, NotesApi, build_client};
pub use cache::{CacheConfig, CacheStats, CacheStatus, CachedPage, QueryCache};
pub use config::{ClientConfig, ConfigError, DEFAULT_BASE_URL};
pub use controller::{SEARCH_DEBOUNCE, SearchController};
pub use error::{ApiError, ApiResult};
pub use form::{NoteForm, SubmitBlocked};
pub use session::{
    Board, NOTICE_DURATION, Notice, NoticeKind, NotesSession, SessionConfig, SessionEvent,
    SubmitOutcome,
};

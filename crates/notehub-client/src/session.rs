//! The notes screen: search box, paged list, notices and the create form.
//!
//! [`NotesSession`] ties the [`SearchController`], the [`QueryCache`] and the
//! create-note [`NoteForm`] together on a single task:
//!
//! ```text
//! keystroke -> debounce -> commit (page = 1) -> cache lookup/fetch -> board
//! submit -> validate -> POST /notes -> invalidate all pages -> refetch current
//! ```
//!
//! Fetches run on spawned tasks and report back through a channel that
//! [`NotesSession::next_event`] drains. Each result is tagged with the key it
//! was issued for and is applied only if that key is still current, so a slow
//! response for a superseded search never overwrites newer data. While a new
//! key is loading, the last page shown stays on screen as a placeholder.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use notehub_core::{Note, NoteId, NotesPage, QueryKey};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api::NotesApi;
use crate::cache::{CacheConfig, QueryCache};
use crate::controller::{SEARCH_DEBOUNCE, SearchController};
use crate::error::{ApiError, ApiResult};
use crate::form::{NoteForm, SubmitBlocked};

/// How long a notice stays on screen.
pub const NOTICE_DURATION: Duration = Duration::from_secs(1);

/// Shown when a search matches nothing.
pub const NO_RESULTS_MESSAGE: &str = "No notes found for your request.";

/// Shown after a note is created.
pub const NOTE_ADDED_MESSAGE: &str = "Note added!";

/// Session tuning.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Quiet period before typed search text is committed.
    pub debounce: Duration,
    pub cache: CacheConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: SEARCH_DEBOUNCE,
            cache: CacheConfig::default(),
        }
    }
}

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// A transient message (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub duration: Duration,
}

/// Something that changed the screen.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The debounced search text was committed.
    SearchCommitted(QueryKey),
    /// A page for the current key arrived and is shown.
    PageLoaded { key: QueryKey, count: usize },
    /// A request for the current key failed.
    LoadFailed { key: QueryKey, error: ApiError },
    /// A page arrived for a key that is no longer current and was ignored.
    Discarded(QueryKey),
}

/// Outcome of submitting the create form.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The note was created; the form is closed.
    Created(Note),
    /// Nothing was sent.
    Blocked(SubmitBlocked),
    /// The request failed; the form stays open with the draft.
    Failed(ApiError),
    /// The form is not open.
    NoForm,
}

/// Everything needed to draw the screen.
#[derive(Debug, Clone)]
pub struct Board<'a> {
    /// Search box contents (the uncommitted draft).
    pub search_text: &'a str,
    /// Committed search and page.
    pub key: QueryKey,
    /// Notes to list; empty when there is nothing to show for the key.
    pub notes: &'a [Note],
    /// The listed notes belong to a previous key while the current loads.
    pub placeholder: bool,
    /// Nothing to show yet and a request is pending.
    pub loading: bool,
    /// Error view for the current key, shown alongside `notes` when a
    /// refresh of an already listed page failed.
    pub error: Option<&'a ApiError>,
    pub total_pages: u32,
    /// Pagination controls are drawn only with more than one page.
    pub show_pagination: bool,
}

#[derive(Debug)]
struct ShownPage {
    key: QueryKey,
    page: NotesPage,
}

#[derive(Debug)]
struct Loaded {
    key: QueryKey,
    result: ApiResult<NotesPage>,
}

/// State and workflow of the notes screen.
pub struct NotesSession<A> {
    cache: QueryCache<A>,
    controller: SearchController,
    shown: Option<ShownPage>,
    error: Option<ApiError>,
    form: Option<NoteForm>,
    notices: VecDeque<Notice>,
    results_tx: mpsc::UnboundedSender<Loaded>,
    results_rx: mpsc::UnboundedReceiver<Loaded>,
}

impl<A: NotesApi> NotesSession<A> {
    /// Creates a session on the first page of an unfiltered listing.
    ///
    /// Nothing is fetched until [`NotesSession::start`].
    pub fn new(api: Arc<A>, config: SessionConfig) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            cache: QueryCache::with_config(api, config.cache),
            controller: SearchController::new(config.debounce),
            shown: None,
            error: None,
            form: None,
            notices: VecDeque::new(),
            results_tx,
            results_rx,
        }
    }

    /// Loads the initial page.
    pub fn start(&mut self) {
        self.load_current();
    }

    pub fn cache(&self) -> &QueryCache<A> {
        &self.cache
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    /// The open create form, if any.
    pub fn form(&self) -> Option<&NoteForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut NoteForm> {
        self.form.as_mut()
    }

    /// Snapshot of what the screen shows.
    ///
    /// A failed refresh of the page already on screen keeps that page
    /// listed next to the error; only a key with nothing to show is blank.
    pub fn board(&self) -> Board<'_> {
        let key = self.controller.key();
        let error = self.error.as_ref();
        let visible = self
            .shown
            .as_ref()
            .filter(|shown| error.is_none() || shown.key == key);
        let notes: &[Note] = match visible {
            Some(shown) => shown.page.notes.as_slice(),
            None => &[],
        };

        Board {
            search_text: self.controller.draft(),
            placeholder: visible.is_some_and(|shown| shown.key != key),
            loading: self.shown.is_none() && error.is_none(),
            show_pagination: visible.is_some() && self.controller.pagination_visible(),
            total_pages: self.controller.total_pages(),
            key,
            notes,
            error,
        }
    }

    /// Drains pending notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Records a keystroke in the search box.
    pub fn type_search(&mut self, text: impl Into<String>) {
        self.controller.input(text);
    }

    pub fn next_page(&mut self) -> bool {
        let moved = self.controller.next_page().is_some();
        if moved {
            self.load_current();
        }
        moved
    }

    pub fn prev_page(&mut self) -> bool {
        let moved = self.controller.prev_page().is_some();
        if moved {
            self.load_current();
        }
        moved
    }

    pub fn go_to_page(&mut self, page: u32) -> bool {
        let moved = self.controller.go_to_page(page).is_some();
        if moved {
            self.load_current();
        }
        moved
    }

    /// Re-issues the current query after an error.
    pub fn retry(&mut self) {
        let key = self.controller.key();
        debug!(%key, "retrying");
        self.error = None;
        self.spawn_fetch(key);
    }

    /// Waits for the next debounce commit or fetch result and applies it.
    ///
    /// Cancel-safe: dropping the future loses nothing.
    pub async fn next_event(&mut self) -> SessionEvent {
        let deadline = self.controller.deadline();

        tokio::select! {
            Some(loaded) = self.results_rx.recv() => self.apply(loaded),
            () = sleep_until(deadline) => {
                let key = self.controller.commit();
                self.load_current();
                SessionEvent::SearchCommitted(key)
            }
        }
    }

    /// Opens a fresh create form, discarding any previous draft.
    pub fn open_form(&mut self) -> &mut NoteForm {
        self.form.insert(NoteForm::new())
    }

    /// Closes the form without side effects.
    pub fn cancel_form(&mut self) {
        if self.form.take().is_some() {
            debug!("create form cancelled");
        }
    }

    /// Validates and submits the open form.
    ///
    /// On success the form closes, a notice is queued, every cached page is
    /// invalidated and the current page is refetched. On failure the form
    /// stays open with its draft and an error notice is queued.
    pub async fn submit_form(&mut self) -> SubmitOutcome {
        let Some(form) = self.form.as_mut() else {
            return SubmitOutcome::NoForm;
        };
        let note = match form.begin_submit() {
            Ok(note) => note,
            Err(blocked) => return SubmitOutcome::Blocked(blocked),
        };

        match self.cache.api().create_note(&note).await {
            Ok(created) => {
                info!(id = %created.id, "note created");
                self.notify(NoticeKind::Success, NOTE_ADDED_MESSAGE);
                self.form = None;
                self.refresh_after_write();
                SubmitOutcome::Created(created)
            }
            Err(err) => {
                warn!(error = %err, "note creation failed");
                if let Some(form) = self.form.as_mut() {
                    form.submit_failed();
                }
                self.notify(NoticeKind::Error, format!("Could not create note: {err}"));
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Fetches one note for the detail view.
    pub async fn open_note(&self, id: &NoteId) -> ApiResult<Note> {
        self.cache.api().get_note(id).await
    }

    /// Deletes a note, then invalidates and refetches like a create does.
    pub async fn delete_note(&mut self, id: &NoteId) -> ApiResult<Note> {
        match self.cache.api().delete_note(id).await {
            Ok(deleted) => {
                info!(id = %deleted.id, "note deleted");
                self.notify(NoticeKind::Success, "Note deleted.");
                self.refresh_after_write();
                Ok(deleted)
            }
            Err(err) => {
                warn!(id = %id, error = %err, "note deletion failed");
                self.notify(NoticeKind::Error, format!("Could not delete note: {err}"));
                Err(err)
            }
        }
    }

    fn refresh_after_write(&mut self) {
        self.cache.invalidate_all();
        self.load_current();
    }

    /// Shows what the cache has for the current key and fetches unless the
    /// cached page is fresh. Without a cached page the previous page stays
    /// up as a placeholder.
    fn load_current(&mut self) {
        self.cache.evict_expired();

        let key = self.controller.key();
        self.error = None;

        if let Some(cached) = self.cache.peek(&key) {
            let fresh = cached.is_fresh();
            self.show(key.clone(), cached.page);
            if fresh {
                return;
            }
        }

        self.spawn_fetch(key);
    }

    fn spawn_fetch(&self, key: QueryKey) {
        let cache = self.cache.clone();
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let result = cache.fetch(&key).await;
            // The receiver only goes away with the session.
            let _ = results.send(Loaded { key, result });
        });
    }

    fn apply(&mut self, loaded: Loaded) -> SessionEvent {
        let Loaded { key, result } = loaded;

        if key != self.controller.key() {
            debug!(%key, "ignoring result for superseded key");
            return SessionEvent::Discarded(key);
        }

        match result {
            Ok(page) => {
                // The cache keeps the newest page when responses race.
                let page = self.cache.peek(&key).map(|c| c.page).unwrap_or(page);
                let count = page.notes.len();
                self.error = None;
                self.show(key.clone(), page);
                SessionEvent::PageLoaded { key, count }
            }
            Err(error) => {
                self.error = Some(error.clone());
                SessionEvent::LoadFailed { key, error }
            }
        }
    }

    fn show(&mut self, key: QueryKey, page: NotesPage) {
        let already_empty = self
            .shown
            .as_ref()
            .is_some_and(|s| s.key == key && s.page.is_empty());
        if page.is_empty() && !already_empty {
            self.notify(NoticeKind::Info, NO_RESULTS_MESSAGE);
        }

        self.controller.set_total_pages(page.total_pages);
        self.shown = Some(ShownPage { key, page });
    }

    fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notices.push_back(Notice {
            kind,
            message: message.into(),
            duration: NOTICE_DURATION,
        });
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

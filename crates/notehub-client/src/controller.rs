//! Search and pagination state.
//!
//! The controller owns two committed values, the search text and the page
//! number, which together form the current [`QueryKey`]. Keystrokes only
//! update a draft; the draft is committed as the search once input has been
//! quiet for the debounce period. Each keystroke restarts that period, so
//! intermediate values typed in a burst are never committed.
//!
//! Committing a search always resets the page to 1. Changing the page never
//! touches the search.

use std::time::Duration;

use notehub_core::QueryKey;
use tokio::time::Instant;
use tracing::debug;

/// Quiet period after the last keystroke before a search is committed.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);

/// Owns the search box and pager state.
#[derive(Debug, Clone)]
pub struct SearchController {
    debounce: Duration,
    /// Text as typed, shown immediately.
    draft: String,
    /// Deadline of the pending commit, if a keystroke is waiting.
    deadline: Option<Instant>,
    search: String,
    page: u32,
    /// Page count of the latest successful fetch for the current key.
    total_pages: u32,
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl SearchController {
    /// Creates a controller at the first page of an unfiltered listing.
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            draft: String::new(),
            deadline: None,
            search: String::new(),
            page: 1,
            total_pages: 0,
        }
    }

    /// The key of the committed state.
    pub fn key(&self) -> QueryKey {
        QueryKey::new(self.search.clone(), self.page)
    }

    /// The search box contents.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// The committed search text.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// The committed page.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// When the pending commit fires, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Records a keystroke: updates the draft and restarts the quiet period.
    pub fn input(&mut self, text: impl Into<String>) {
        self.draft = text.into();
        self.deadline = Some(Instant::now() + self.debounce);
    }

    /// Commits the draft if the quiet period has elapsed by `now`.
    ///
    /// Returns the new key when a commit happened.
    pub fn poll_commit(&mut self, now: Instant) -> Option<QueryKey> {
        match self.deadline {
            Some(deadline) if deadline <= now => Some(self.commit()),
            _ => None,
        }
    }

    /// Commits the draft immediately, cancelling the pending timer.
    ///
    /// The page resets to 1 even when the text did not change.
    pub fn commit(&mut self) -> QueryKey {
        self.deadline = None;
        self.search = self.draft.clone();
        self.page = 1;
        debug!(search = %self.search, "search committed");
        self.key()
    }

    /// Records the page count of a result for the current key.
    pub fn set_total_pages(&mut self, total_pages: u32) {
        self.total_pages = total_pages;
    }

    /// Pagination controls are shown only when there is more than one page.
    pub fn pagination_visible(&self) -> bool {
        self.total_pages > 1
    }

    /// Moves to `page`, clamped to the known page range.
    ///
    /// Returns the new key, or `None` when the page did not change.
    pub fn go_to_page(&mut self, page: u32) -> Option<QueryKey> {
        let last = self.total_pages.max(1);
        let page = page.clamp(1, last);
        if page == self.page {
            return None;
        }
        self.page = page;
        Some(self.key())
    }

    pub fn next_page(&mut self) -> Option<QueryKey> {
        self.go_to_page(self.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> Option<QueryKey> {
        self.go_to_page(self.page.saturating_sub(1))
    }
}

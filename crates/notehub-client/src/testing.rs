//! In-memory [`NotesApi`] double for unit tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use notehub_core::{NewNote, Note, NoteId, NoteTag, NotesPage, QueryKey};

use crate::api::NotesApi;
use crate::error::{ApiError, ApiResult};

#[derive(Default)]
struct FakeState {
    notes: Vec<Note>,
    list_calls: Vec<QueryKey>,
    create_calls: usize,
    delays: HashMap<String, Duration>,
    failing_lists: usize,
    fail_creates: bool,
    next_id: u64,
}

/// Serves notes from memory with per-search latency and records calls.
///
/// Results are computed when the response is produced, after the delay,
/// like a real server answering late.
#[derive(Default)]
pub(crate) struct FakeNotesApi {
    state: Mutex<FakeState>,
}

pub(crate) fn make_note(id: u64, title: &str, content: &str) -> Note {
    let at = Utc.with_ymd_and_hms(2024, 2, 12, 18, 0, 0).unwrap();
    Note {
        id: NoteId::new(format!("note-{id}")),
        title: title.to_string(),
        content: content.to_string(),
        tag: NoteTag::Todo,
        created_at: at,
        updated_at: at,
    }
}

impl FakeNotesApi {
    /// A fake holding `count` notes titled "Note 0", "Note 1", ...
    pub(crate) fn with_notes(count: u64) -> Self {
        let api = Self::default();
        for _ in 0..count {
            let n = api.lock().next_id;
            api.add_note(&format!("Note {n}"), "");
        }
        api
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub(crate) fn add_note(&self, title: &str, content: &str) -> Note {
        let mut state = self.lock();
        let note = make_note(state.next_id, title, content);
        state.next_id += 1;
        state.notes.push(note.clone());
        note
    }

    pub(crate) fn set_delay(&self, search: &str, delay: Duration) {
        self.lock().delays.insert(search.to_string(), delay);
    }

    pub(crate) fn fail_next_lists(&self, count: usize) {
        self.lock().failing_lists = count;
    }

    pub(crate) fn fail_creates(&self, fail: bool) {
        self.lock().fail_creates = fail;
    }

    pub(crate) fn list_calls(&self) -> Vec<QueryKey> {
        self.lock().list_calls.clone()
    }

    pub(crate) fn create_calls(&self) -> usize {
        self.lock().create_calls
    }

    fn page_of(&self, search: &str, page: u32, per_page: u32) -> NotesPage {
        let state = self.lock();
        let needle = search.to_lowercase();
        let matching: Vec<&Note> = state
            .notes
            .iter()
            .filter(|n| {
                needle.is_empty()
                    || n.title.to_lowercase().contains(&needle)
                    || n.content.to_lowercase().contains(&needle)
            })
            .collect();

        let per_page = per_page as usize;
        let total_pages = matching.len().div_ceil(per_page) as u32;
        let notes = matching
            .into_iter()
            .skip((page as usize - 1) * per_page)
            .take(per_page)
            .cloned()
            .collect();

        NotesPage { notes, total_pages }
    }
}

impl NotesApi for FakeNotesApi {
    fn list_notes(
        &self,
        search: &str,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = ApiResult<NotesPage>> + Send {
        let search = search.to_string();
        async move {
            let delay = {
                let mut state = self.lock();
                state.list_calls.push(QueryKey::new(search.clone(), page));
                state.delays.get(&search).copied().unwrap_or_default()
            };
            tokio::time::sleep(delay).await;

            {
                let mut state = self.lock();
                if state.failing_lists > 0 {
                    state.failing_lists -= 1;
                    return Err(ApiError::Network {
                        message: "connection reset".to_string(),
                    });
                }
            }

            Ok(self.page_of(&search, page, per_page))
        }
    }

    fn get_note(&self, id: &NoteId) -> impl Future<Output = ApiResult<Note>> + Send {
        let found = self.lock().notes.iter().find(|n| &n.id == id).cloned();
        async move {
            found.ok_or_else(|| ApiError::Remote {
                status: 404,
                body: "Note not found".to_string(),
            })
        }
    }

    fn create_note(&self, note: &NewNote) -> impl Future<Output = ApiResult<Note>> + Send {
        let note = note.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let fail = {
                let mut state = self.lock();
                state.create_calls += 1;
                state.fail_creates
            };
            if fail {
                return Err(ApiError::Remote {
                    status: 500,
                    body: "Internal Server Error".to_string(),
                });
            }
            let mut created = self.add_note(&note.title, &note.content);
            created.tag = note.tag;
            Ok(created)
        }
    }

    fn delete_note(&self, id: &NoteId) -> impl Future<Output = ApiResult<Note>> + Send {
        let removed = {
            let mut state = self.lock();
            let index = state.notes.iter().position(|n| &n.id == id);
            index.map(|i| state.notes.remove(i))
        };
        async move {
            removed.ok_or_else(|| ApiError::Remote {
                status: 404,
                body: "Note not found".to_string(),
            })
        }
    }
}

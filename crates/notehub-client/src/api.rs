//! HTTP client for the remote notes API.
//!
//! Endpoints:
//! - `GET /notes?search=&page=&perPage=` - list one page of notes
//! - `GET /notes/{id}` - fetch one note
//! - `POST /notes` - create a note
//! - `DELETE /notes/{id}` - delete a note
//!
//! Every request carries the bearer token from [`ClientConfig`]. There is
//! no local retry and no idempotency key: submitting the same draft twice
//! creates two notes.

use std::future::Future;
use std::sync::Arc;

use notehub_core::{NewNote, Note, NoteId, NotesPage};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult, error_message};

/// Operations offered by the remote notes service.
///
/// [`HttpNotesApi`] is the production implementation; the cache and
/// session are generic over this trait so they can run against doubles.
pub trait NotesApi: Send + Sync + 'static {
    /// Lists one page of notes. An empty `search` means no filter.
    fn list_notes(
        &self,
        search: &str,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = ApiResult<NotesPage>> + Send;

    /// Fetches a single note.
    fn get_note(&self, id: &NoteId) -> impl Future<Output = ApiResult<Note>> + Send;

    /// Creates a note from a validated draft.
    fn create_note(&self, note: &NewNote) -> impl Future<Output = ApiResult<Note>> + Send;

    /// Deletes a note, returning the deleted record.
    fn delete_note(&self, id: &NoteId) -> impl Future<Output = ApiResult<Note>> + Send;
}

/// Query string of `GET /notes`.
///
/// `search` is left out entirely when empty.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListNotesParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
    page: u32,
    per_page: u32,
}

impl<'a> ListNotesParams<'a> {
    fn new(search: &'a str, page: u32, per_page: u32) -> Self {
        Self {
            search: (!search.is_empty()).then_some(search),
            page,
            per_page,
        }
    }
}

/// Build an HTTP client that sends the configured bearer token by default.
pub fn build_client(config: &ClientConfig) -> ApiResult<reqwest::Client> {
    let mut value =
        HeaderValue::from_str(&config.authorization()).map_err(|e| ApiError::InvalidToken {
            message: e.to_string(),
        })?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);

    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .build()?)
}

/// [`NotesApi`] over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpNotesApi {
    client: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl HttpNotesApi {
    /// Create a client for the given configuration.
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let client = build_client(&config)?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// The configuration every request is built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn note_url(&self, id: &NoteId) -> String {
        self.config.url(&format!("/notes/{}", id))
    }
}

/// Send a request and decode a 2xx body, mapping everything else to
/// [`ApiError::Remote`].
async fn make_request<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> ApiResult<T> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        Ok(response.json::<T>().await?)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Remote {
            status: status.as_u16(),
            body: error_message(&body),
        })
    }
}

impl NotesApi for HttpNotesApi {
    fn list_notes(
        &self,
        search: &str,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = ApiResult<NotesPage>> + Send {
        let params = ListNotesParams::new(search, page, per_page);
        async move {
            debug!(?params, "GET /notes");
            let request = self.client.get(self.config.url("/notes")).query(&params);
            make_request(request).await
        }
    }

    fn get_note(&self, id: &NoteId) -> impl Future<Output = ApiResult<Note>> + Send {
        let url = self.note_url(id);
        async move {
            debug!(%url, "GET note");
            make_request(self.client.get(&url)).await
        }
    }

    fn create_note(&self, note: &NewNote) -> impl Future<Output = ApiResult<Note>> + Send {
        async move {
            debug!(title = %note.title, tag = %note.tag, "POST /notes");
            let request = self.client.post(self.config.url("/notes")).json(note);
            make_request(request).await.map_err(|err| match err {
                ApiError::Remote {
                    status: status @ (400 | 422),
                    body,
                } => ApiError::ValidationRejected {
                    status,
                    message: body,
                },
                other => other,
            })
        }
    }

    fn delete_note(&self, id: &NoteId) -> impl Future<Output = ApiResult<Note>> + Send {
        let url = self.note_url(id);
        async move {
            debug!(%url, "DELETE note");
            make_request(self.client.delete(&url)).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_string(params: &ListNotesParams<'_>) -> String {
        let client = reqwest::Client::new();
        let request = client
            .get("http://localhost/notes")
            .query(params)
            .build()
            .unwrap();
        request.url().query().unwrap_or_default().to_string()
    }

    #[test]
    fn list_params_omit_empty_search() {
        let params = ListNotesParams::new("", 2, 12);
        assert_eq!(query_string(&params), "page=2&perPage=12");
    }

    #[test]
    fn list_params_include_search_first() {
        let params = ListNotesParams::new("meeting", 1, 12);
        assert_eq!(query_string(&params), "search=meeting&page=1&perPage=12");
    }

    #[test]
    fn list_params_encode_search_text() {
        let params = ListNotesParams::new("a&b c", 1, 12);
        assert_eq!(query_string(&params), "search=a%26b+c&page=1&perPage=12");
    }

    #[test]
    fn client_builds_with_valid_token() {
        let config = ClientConfig::new("http://localhost:3000", "abc").unwrap();
        let api = HttpNotesApi::new(config).unwrap();
        assert_eq!(api.config().base_url(), "http://localhost:3000");
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let config = ClientConfig::new("http://localhost:3000", "abc\ndef").unwrap();
        assert!(matches!(
            HttpNotesApi::new(config),
            Err(ApiError::InvalidToken { .. })
        ));
    }
}

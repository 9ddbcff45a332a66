use crate::{
    api::{DeleteAck, Note, NoteDraft, ValidationError},
    option::{ConfigError, NoteServiceOptions},
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
#[cfg(feature = "tracing")]
use tracing::{debug, warn};
use url::Url;

const NOTES_COLLECTION: &str = "notes";

/// The error type for the note service.
///
/// This is a closed set: callers switch on the variant, never on transport types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NoteServiceError {
    /// The draft failed the local pre-flight check and was never sent.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    /// The backend reported the note with this id as absent.
    #[error("Note not found: {0}")]
    NotFound(String),
    /// The backend could not be reached (connection refused, DNS failure, timeout).
    #[error("{0}. Please check if the backend server is running.")]
    ServiceUnavailable(String),
    /// Any other non-success status, or a response that could not be decoded.
    #[error("Transport error: {message}")]
    Transport {
        /// The HTTP status, when a response was received.
        status: Option<u16>,
        /// A description of the failure.
        message: String,
    },
}

impl NoteServiceError {
    /// Returns `true` if the backend could not be reached at all.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, NoteServiceError::ServiceUnavailable(_))
    }

    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            NoteServiceError::NotFound(_) => Some(StatusCode::NOT_FOUND.as_u16()),
            NoteServiceError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    fn from_reqwest(err: reqwest::Error, action: &str) -> Self {
        if is_unreachable(&err) {
            NoteServiceError::ServiceUnavailable(format!("Failed to {action}: {err}"))
        } else {
            NoteServiceError::Transport {
                status: err.status().map(|status| status.as_u16()),
                message: format!("Failed to {action}: {err}"),
            }
        }
    }
}

#[cfg(not(target_family = "wasm"))]
fn is_unreachable(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

// A failed `fetch` surfaces as a request error without any status.
#[cfg(target_family = "wasm")]
fn is_unreachable(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout() || (err.is_request() && err.status().is_none())
}

/// A stateless HTTP client for the notes API.
///
/// Every call issues a fresh request; there is no caching and no retrying.
#[derive(Debug, Clone)]
pub struct NoteService {
    client: Client,
    base_url: Url,
}

impl NoteService {
    /// Creates a new [`NoteService`] against [`DEFAULT_API_BASE_URL`](crate::option::DEFAULT_API_BASE_URL).
    pub fn new() -> Result<Self, ConfigError> {
        Self::new_with_options(NoteServiceOptions::default())
    }

    /// Creates a new [`NoteService`] with the given options.
    pub fn new_with_options(options: NoteServiceOptions) -> Result<Self, ConfigError> {
        let base_url = options.base_url()?;

        #[allow(unused_mut)]
        let mut builder = Client::builder();
        #[cfg(not(target_family = "wasm"))]
        if let Some(timeout) = options.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// The base URL every request is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches every note.
    pub async fn list(&self) -> Result<Vec<Note>, NoteServiceError> {
        let request = self.client.get(self.notes_url(None));
        let response = self.execute(request, "fetch notes", None).await?;
        Self::decode(response).await
    }

    /// Fetches a single note by id.
    pub async fn get(&self, id: &str) -> Result<Note, NoteServiceError> {
        let request = self.client.get(self.notes_url(Some(id)));
        let response = self.execute(request, "fetch note", Some(id)).await?;
        Self::decode(response).await
    }

    /// Creates a note from a draft. The draft is trimmed and validated before any request is made.
    pub async fn create(&self, draft: &NoteDraft) -> Result<Note, NoteServiceError> {
        let draft = draft.validate()?;
        let request = self.client.post(self.notes_url(None)).json(&draft);
        let response = self.execute(request, "create note", None).await?;
        Self::decode(response).await
    }

    /// Replaces the title and content of a note. The draft is trimmed and validated first.
    pub async fn update(&self, id: &str, draft: &NoteDraft) -> Result<Note, NoteServiceError> {
        let draft = draft.validate()?;
        let request = self.client.put(self.notes_url(Some(id))).json(&draft);
        let response = self.execute(request, "update note", Some(id)).await?;
        Self::decode(response).await
    }

    /// Deletes a note by id.
    pub async fn delete(&self, id: &str) -> Result<DeleteAck, NoteServiceError> {
        let request = self.client.delete(self.notes_url(Some(id)));
        self.execute(request, "delete note", Some(id)).await?;
        Ok(DeleteAck::default())
    }

    /// Builds `{base}/notes` or `{base}/notes/{id}`, with the id as one encoded segment.
    fn notes_url(&self, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(NOTES_COLLECTION);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    /// Sends a request and classifies its outcome. 404 means [`NoteServiceError::NotFound`]
    /// only for requests addressing a single note.
    async fn execute(
        &self,
        request: RequestBuilder,
        action: &str,
        id: Option<&str>,
    ) -> Result<Response, NoteServiceError> {
        #[cfg(feature = "tracing")]
        debug!(action, id, "sending notes API request");

        let response = request.send().await.map_err(|e| {
            let err = NoteServiceError::from_reqwest(e, action);
            #[cfg(feature = "tracing")]
            warn!(action, error = %err, "notes API request failed");
            err
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if let (StatusCode::NOT_FOUND, Some(id)) = (status, id) {
            return Err(NoteServiceError::NotFound(id.to_string()));
        }

        #[cfg(feature = "tracing")]
        warn!(action, status = status.as_u16(), "notes API returned an error status");
        Err(NoteServiceError::Transport {
            status: Some(status.as_u16()),
            message: format!("Failed to {action}: {status}"),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, NoteServiceError> {
        let status = response.status().as_u16();
        response
            .json::<T>()
            .await
            .map_err(|e| NoteServiceError::Transport {
                status: Some(status),
                message: format!("Failed to decode response: {e}"),
            })
    }
}

#[cfg(all(test, not(target_family = "wasm")))]
mod tests {
    use super::*;
    use crate::test_utils::{note_json, service_for, unreachable_base_url};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn notes_url_appends_encoded_segments() {
        let service = NoteService::new_with_options(
            NoteServiceOptions::builder()
                .api_base_url("http://localhost:5000/api/")
                .build(),
        )
        .unwrap();
        assert_eq!(
            service.notes_url(None).as_str(),
            "http://localhost:5000/api/notes"
        );
        assert_eq!(
            service.notes_url(Some("a/b c")).as_str(),
            "http://localhost:5000/api/notes/a%2Fb%20c"
        );
    }

    #[tokio::test]
    async fn list_returns_notes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                note_json("1", "First", "one"),
                note_json("2", "Second", "two"),
            ])))
            .mount(&server)
            .await;

        let notes = service_for(&server).list().await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, "1");
        assert_eq!(notes[1].title, "Second");
        assert!(notes.iter().all(|note| !note.is_local));
    }

    #[tokio::test]
    async fn list_error_status_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notes"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = service_for(&server).list().await.unwrap_err();
        assert!(matches!(
            err,
            NoteServiceError::Transport {
                status: Some(500),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn list_not_found_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notes"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = service_for(&server).list().await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(matches!(err, NoteServiceError::Transport { .. }));
    }

    #[tokio::test]
    async fn unreachable_backend_is_service_unavailable() {
        let service = NoteService::new_with_options(
            NoteServiceOptions::builder()
                .api_base_url(unreachable_base_url())
                .build(),
        )
        .unwrap();

        let err = service.list().await.unwrap_err();
        assert!(err.is_service_unavailable(), "unexpected error: {err:?}");

        let err = service
            .create(&NoteDraft::new("A", "B"))
            .await
            .unwrap_err();
        assert!(err.is_service_unavailable(), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn get_missing_note_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notes/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Note not found"
            })))
            .mount(&server)
            .await;

        let err = service_for(&server).get("missing").await.unwrap_err();
        assert_eq!(err, NoteServiceError::NotFound("missing".to_string()));
    }

    #[tokio::test]
    async fn create_sends_trimmed_draft() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/notes"))
            .and(body_json(json!({ "title": "A", "content": "B" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(note_json("srv-1", "A", "B")))
            .expect(1)
            .mount(&server)
            .await;

        let note = service_for(&server)
            .create(&NoteDraft::new("  A ", "B\n"))
            .await
            .unwrap();
        assert_eq!(note.id, "srv-1");
        assert_eq!(note.title, "A");
        assert_eq!(note.content, "B");
    }

    #[tokio::test]
    async fn invalid_drafts_never_reach_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let service = service_for(&server);
        let err = service.create(&NoteDraft::new(" ", "B")).await.unwrap_err();
        assert_eq!(err, NoteServiceError::Validation(ValidationError::EmptyTitle));
        let err = service
            .update("id1", &NoteDraft::new("", "x"))
            .await
            .unwrap_err();
        assert_eq!(err, NoteServiceError::Validation(ValidationError::EmptyTitle));
        let err = service
            .update("id1", &NoteDraft::new("t", "\t"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            NoteServiceError::Validation(ValidationError::EmptyContent)
        );
    }

    #[tokio::test]
    async fn create_rejected_by_backend_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/notes"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let err = service_for(&server)
            .create(&NoteDraft::new("A", "B"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_service_unavailable());
    }

    #[tokio::test]
    async fn update_then_get_returns_new_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/notes/id1"))
            .and(body_json(json!({ "title": "T", "content": "C" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(note_json("id1", "T", "C")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/notes/id1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(note_json("id1", "T", "C")))
            .mount(&server)
            .await;

        let service = service_for(&server);
        let updated = service
            .update("id1", &NoteDraft::new("T", "C"))
            .await
            .unwrap();
        assert_eq!((updated.title.as_str(), updated.content.as_str()), ("T", "C"));
        let fetched = service.get("id1").await.unwrap();
        assert_eq!(fetched.title, "T");
        assert_eq!(fetched.content, "C");
    }

    #[tokio::test]
    async fn update_missing_note_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/notes/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = service_for(&server)
            .update("gone", &NoteDraft::new("T", "C"))
            .await
            .unwrap_err();
        assert_eq!(err, NoteServiceError::NotFound("gone".to_string()));
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/notes/id1"))
            .respond_with(ResponseTemplate::new(204))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/notes/id1"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let service = service_for(&server);
        let ack = service.delete("id1").await.unwrap();
        assert!(ack.success);
        let err = service.delete("id1").await.unwrap_err();
        assert_eq!(err, NoteServiceError::NotFound("id1".to_string()));
    }

    #[tokio::test]
    async fn malformed_body_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notes/id1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = service_for(&server).get("id1").await.unwrap_err();
        assert!(matches!(
            err,
            NoteServiceError::Transport {
                status: Some(200),
                ..
            }
        ));
    }
}

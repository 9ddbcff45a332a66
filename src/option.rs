//! Client, notebook and reconciler options and configuration types.
//!
//! The notes API location is never a process-wide constant: it is read from
//! [`NoteServiceOptions`] when a [`NoteService`](crate::NoteService) is constructed.

use crate::{
    storage::NoteStorage,
    util::callback::{OnChange, OnError},
};
use serde::Deserialize;
use std::{fmt, time::Duration};
use thiserror::Error;
use url::Url;

/// The notes API base URL used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// The environment variable read by [`NoteServiceOptions::from_env`] for the base URL.
pub const ENV_API_BASE_URL: &str = "NOTES_API_BASE_URL";
/// The environment variable read by [`NoteServiceOptions::from_env`] for the request timeout.
pub const ENV_API_TIMEOUT_MS: &str = "NOTES_API_TIMEOUT_MS";

/// An invalid client configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `apiBaseUrl` is not a valid URL.
    #[error("invalid apiBaseUrl `{url}`: {source}")]
    InvalidBaseUrl {
        /// The configured value.
        url: String,
        /// Why it failed to parse.
        source: url::ParseError,
    },
    /// `apiBaseUrl` cannot have path segments appended, e.g. `mailto:` or `data:` URLs.
    #[error("apiBaseUrl `{0}` cannot be used as a base URL")]
    NotABase(String),
    /// The HTTP client could not be initialized.
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Options for creating a new [`NoteService`](crate::NoteService).
///
/// Deserializes from camelCase configuration, e.g. `{"apiBaseUrl": "https://notes.example/api"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, bon::Builder)]
#[serde(rename_all = "camelCase")]
#[builder(on(String, into))]
pub struct NoteServiceOptions {
    /// The base URL of the notes API. If not provided, [`DEFAULT_API_BASE_URL`] is used.
    pub api_base_url: Option<String>,

    /// Per-request timeout in milliseconds. Requests that time out are reported as
    /// [`NoteServiceError::ServiceUnavailable`](crate::NoteServiceError::ServiceUnavailable).
    /// Ignored in the browser, where the fetch API governs timeouts.
    pub timeout_ms: Option<u64>,
}

impl NoteServiceOptions {
    /// Reads options from [`ENV_API_BASE_URL`] and [`ENV_API_TIMEOUT_MS`].
    ///
    /// Unset variables fall back to defaults; a timeout that is not a number is ignored.
    pub fn from_env() -> Self {
        Self {
            api_base_url: std::env::var(ENV_API_BASE_URL).ok(),
            timeout_ms: std::env::var(ENV_API_TIMEOUT_MS)
                .ok()
                .and_then(|value| value.trim().parse().ok()),
        }
    }

    /// Returns the configured timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Parses the configured base URL, or the default one.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .api_base_url
            .as_deref()
            .map(str::trim)
            .unwrap_or(DEFAULT_API_BASE_URL);
        let url = Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            source,
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::NotABase(raw.to_string()));
        }
        Ok(url)
    }
}

/// Options for creating a new [`Notebook`](crate::Notebook).
#[derive(Default, bon::Builder)]
pub struct NotebookOptions {
    /// Options for the underlying [`NoteService`](crate::NoteService). Defaults apply if not provided.
    pub service: Option<NoteServiceOptions>,

    /// Storage for notes awaiting reconciliation. If not provided, an in-memory
    /// [`MemoryStorage`](crate::storage::MemoryStorage) is used and local notes do not outlive the process.
    #[builder(into)]
    pub storage: Option<Box<dyn NoteStorage>>,

    /// Callback in case an operation fails.
    #[builder(into)]
    pub on_error: Option<OnError>,

    /// Callback after every change to the displayed collection.
    #[builder(into)]
    pub on_change: Option<OnChange>,
}

impl fmt::Debug for NotebookOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotebookOptions")
            .field("service", &self.service)
            .field("storage", &self.storage.as_ref().map(|_| "<storage>"))
            .field("on_error", &self.on_error)
            .field("on_change", &self.on_change)
            .finish()
    }
}

/// Options for the background [`Reconciler`](crate::Reconciler).
#[derive(Debug, Clone, Default, PartialEq, Eq, bon::Builder)]
pub struct ReconcilerOptions {
    /// Time between reconciliation cycles. If not provided, 30 seconds is used.
    pub interval: Option<Duration>,

    /// If set to `true`, the first cycle runs as soon as the reconciler starts
    /// instead of after the first interval.
    pub run_immediately: Option<bool>,
}

impl ReconcilerOptions {
    /// Default time between reconciliation cycles.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

    pub(crate) fn interval(&self) -> Duration {
        self.interval.unwrap_or(Self::DEFAULT_INTERVAL)
    }

    pub(crate) fn run_immediately(&self) -> bool {
        self.run_immediately.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_url() {
        let url = NoteServiceOptions::default().base_url().unwrap();
        assert_eq!(url.as_str(), DEFAULT_API_BASE_URL);
    }

    #[test]
    fn api_base_url_from_camel_case_config() {
        let options: NoteServiceOptions = serde_json::from_str(
            r#"{"apiBaseUrl": "https://notes.example.com/v2/api", "timeoutMs": 2500}"#,
        )
        .unwrap();
        assert_eq!(
            options.base_url().unwrap().as_str(),
            "https://notes.example.com/v2/api"
        );
        assert_eq!(options.timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn invalid_base_urls_are_rejected() {
        let options = NoteServiceOptions::builder()
            .api_base_url("not a url")
            .build();
        assert!(matches!(
            options.base_url(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));

        let options = NoteServiceOptions::builder()
            .api_base_url("mailto:notes@example.com")
            .build();
        assert!(matches!(options.base_url(), Err(ConfigError::NotABase(_))));
    }

    #[test]
    fn reconciler_defaults() {
        let options = ReconcilerOptions::default();
        assert_eq!(options.interval(), ReconcilerOptions::DEFAULT_INTERVAL);
        assert!(!options.run_immediately());
    }
}

//! # fetcher: units of daily data acquisition
//!
//! A [`Fetcher`] acquires one named value for an etude and reports the
//! [`Schema`] of what it returns. The daily runner calls [`Fetcher::fetch`]
//! once per resource and folds the [`FetchOutcome`] into the etude's result.
//!
//! ## Variants
//! - [`StaticFetcher`]: a constant value; always succeeds.
//! - [`UrlFetcher`]: one HTTP GET with a fixed timeout. JSON bodies are decoded,
//!   anything else is returned as text.
//! - [`TransformingFetcher`]: a [`UrlFetcher`] followed by a pure mapping step.
//!
//! ## Errors
//! Construction problems (a URL that is not http/https, an HTTP client that
//! cannot be built) are [`FetcherError`]s and surface immediately. Everything
//! that goes wrong during `fetch` becomes a failed [`FetchOutcome`] with a
//! descriptive message; `fetch` itself never returns an error.
//!
//! ## Mocking
//! The trait is annotated for `mockall`, so tests can inject `MockFetcher`
//! instances with arbitrary outcomes.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::schema::Schema;

/// Timeout applied to a [`UrlFetcher`] unless one is given explicitly.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a single fetch attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub success: bool,
    /// The fetched value; `Value::Null` when the fetch failed.
    pub value: Value,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn success(value: Value) -> Self {
        Self {
            success: true,
            value,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            value: Value::Null,
            error: Some(message.into()),
        }
    }
}

/// Configuration errors raised while building a fetcher.
#[derive(Debug, Error)]
pub enum FetcherError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid URL '{url}': scheme must be http or https, got '{scheme}'")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Error returned by a [`TransformingFetcher`] mapping step.
pub type TransformError = Box<dyn std::error::Error + Send + Sync>;

/// A unit of data acquisition with a declared schema.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Acquire the value. Failures are reported in the outcome, never raised.
    async fn fetch(&self) -> FetchOutcome;

    /// Shape of the value a successful fetch returns.
    fn schema(&self) -> Schema;
}

/// Returns a fixed value.
#[derive(Debug, Clone)]
pub struct StaticFetcher {
    data: Value,
    schema: Schema,
}

impl StaticFetcher {
    /// Builds a fetcher whose schema is inferred from `data`.
    pub fn new(data: Value) -> Self {
        let schema = Schema::infer(&data);
        Self { data, schema }
    }

    pub fn with_schema(data: Value, schema: Schema) -> Self {
        Self { data, schema }
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self) -> FetchOutcome {
        FetchOutcome::success(self.data.clone())
    }

    fn schema(&self) -> Schema {
        self.schema.clone()
    }
}

/// Fetches a URL with a single GET request.
#[derive(Debug, Clone)]
pub struct UrlFetcher {
    url: reqwest::Url,
    schema: Schema,
    timeout: Duration,
    client: reqwest::Client,
}

impl UrlFetcher {
    pub fn new(url: &str, schema: Schema) -> Result<Self, FetcherError> {
        Self::with_timeout(url, schema, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: &str, schema: Schema, timeout: Duration) -> Result<Self, FetcherError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetcherError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetcherError::UnsupportedScheme {
                url: url.to_string(),
                scheme: parsed.scheme().to_string(),
            });
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: parsed,
            schema,
            timeout,
            client,
        })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Performs the GET and decodes the body, or returns a failure message.
    async fn get(&self) -> Result<Value, String> {
        debug!(url = %self.url, timeout = ?self.timeout, "Sending GET request");
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| self.describe(&e))?;
        let body = response.text().await.map_err(|e| self.describe(&e))?;
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!(url = %self.url, error = %e, "Response body is not JSON, keeping raw text");
                Ok(Value::String(body))
            }
        }
    }

    fn describe(&self, e: &reqwest::Error) -> String {
        let message = if e.is_timeout() {
            format!(
                "Timeout error when fetching {} after {:?}.",
                self.url, self.timeout
            )
        } else if let Some(status) = e.status() {
            format!(
                "HTTP error {} when fetching {}: {}",
                status.as_u16(),
                self.url,
                e
            )
        } else if e.is_connect() || e.is_request() || e.is_redirect() {
            format!("Request error when fetching {}: {}", self.url, e)
        } else {
            format!("Unexpected error fetching {}: {}", self.url, e)
        };
        warn!(url = %self.url, error = %message, "GET request failed");
        message
    }
}

#[async_trait]
impl Fetcher for UrlFetcher {
    async fn fetch(&self) -> FetchOutcome {
        match self.get().await {
            Ok(value) => FetchOutcome::success(value),
            Err(message) => FetchOutcome::failure(message),
        }
    }

    fn schema(&self) -> Schema {
        self.schema.clone()
    }
}

type Transform = Box<dyn Fn(Value) -> Result<Value, TransformError> + Send + Sync>;

/// Fetches a URL, then maps the decoded body through a caller-supplied function.
///
/// The declared schema describes the mapped value, not the raw response.
pub struct TransformingFetcher {
    source: UrlFetcher,
    schema: Schema,
    transform: Transform,
}

impl TransformingFetcher {
    pub fn new<F>(source: UrlFetcher, schema: Schema, transform: F) -> Self
    where
        F: Fn(Value) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        Self {
            source,
            schema,
            transform: Box::new(transform),
        }
    }
}

#[async_trait]
impl Fetcher for TransformingFetcher {
    async fn fetch(&self) -> FetchOutcome {
        let raw = match self.source.get().await {
            Ok(raw) => raw,
            Err(message) => return FetchOutcome::failure(message),
        };
        match (self.transform)(raw) {
            Ok(value) => FetchOutcome::success(value),
            Err(e) => {
                warn!(url = self.source.url(), error = %e, "Transform step failed");
                FetchOutcome::failure(format!(
                    "Failed to transform data fetched from {}: {}",
                    self.source.url(),
                    e
                ))
            }
        }
    }

    fn schema(&self) -> Schema {
        self.schema.clone()
    }
}

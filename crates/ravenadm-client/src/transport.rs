//! Admin transport: the three server calls compaction needs.
//!
//! All calls address the server's system database.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ETAG, HeaderMap, HeaderName, LAST_MODIFIED};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;

use crate::error::TransportError;

const USER_AGENT: &str = concat!("ravenadm/", env!("CARGO_PKG_VERSION"));

/// A document fetched from the system database.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document body.
    pub body: Value,
    /// Version tag the server assigned on the last write.
    pub etag: Option<String>,
    /// Time of the last write, as sent in `Last-Modified`.
    pub last_modified: Option<String>,
}

impl Document {
    /// Wraps a body that carries no write metadata.
    #[must_use]
    pub fn new(body: Value) -> Self {
        Self {
            body,
            etag: None,
            last_modified: None,
        }
    }
}

/// Server operations used by the compaction initiator and monitor.
#[async_trait]
pub trait AdminTransport: Send + Sync {
    /// Deletes the document at `key`.
    ///
    /// Deleting a document that does not exist succeeds.
    async fn delete_document(&self, key: &str) -> Result<(), TransportError>;

    /// Fetches the document at `key`, or `None` if it does not exist.
    async fn get_document(&self, key: &str) -> Result<Option<Document>, TransportError>;

    /// Issues a `POST` with an empty body to `path`.
    async fn post(&self, path: &str, query: &[(&str, &str)]) -> Result<(), TransportError>;
}

/// [`AdminTransport`] over HTTP.
///
/// Documents are addressed as `/docs?id=<key>` so the key reaches the server
/// unchanged, dot segments and slashes included.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: Url,
    client: Client,
}

impl HttpTransport {
    /// Creates a transport for the server at `base_url`.
    ///
    /// `timeout` bounds each request from connect to the end of the body.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute HTTP(S) URL or the
    /// HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url).map_err(|e| TransportError::InvalidUrl {
            message: format!("{base_url}: {e}"),
        })?;

        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl {
                message: format!("{base_url}: expected an http or https server URL"),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::request("failed to create HTTP client", e))?;

        Ok(Self { base_url, client })
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| TransportError::InvalidUrl {
                    message: format!("{}: cannot be a base URL", self.base_url),
                })?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn document_url(&self, key: &str) -> Result<Url, TransportError> {
        self.url("/docs", &[("id", key)])
    }

    async fn send(request: RequestBuilder) -> Result<Response, TransportError> {
        request
            .send()
            .await
            .map_err(|e| TransportError::request(format!("request failed: {e}"), e))
    }

    async fn status_error(response: Response) -> TransportError {
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!(error = %err, %status, "failed to read error response body");
                String::new()
            }
        };
        TransportError::status(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            body,
        )
    }
}

fn header_string(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_matches('"').to_string())
}

#[async_trait]
impl AdminTransport for HttpTransport {
    async fn delete_document(&self, key: &str) -> Result<(), TransportError> {
        let url = self.document_url(key)?;
        tracing::debug!(%url, "deleting document");

        let response = Self::send(self.client.delete(url)).await?;
        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(Self::status_error(response).await)
        }
    }

    async fn get_document(&self, key: &str) -> Result<Option<Document>, TransportError> {
        let url = self.document_url(key)?;
        tracing::trace!(%url, "fetching document");

        let response = Self::send(self.client.get(url)).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let etag = header_string(response.headers(), &ETAG);
                let last_modified = header_string(response.headers(), &LAST_MODIFIED);
                let body = response.json::<Value>().await.map_err(|e| {
                    TransportError::InvalidResponse {
                        message: format!("document {key} is not JSON"),
                        source: Some(Box::new(e)),
                    }
                })?;
                Ok(Some(Document {
                    body,
                    etag,
                    last_modified,
                }))
            }
            _ => Err(Self::status_error(response).await),
        }
    }

    async fn post(&self, path: &str, query: &[(&str, &str)]) -> Result<(), TransportError> {
        let url = self.url(path, query)?;
        tracing::debug!(%url, "posting admin request");

        let request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_LENGTH, 0);
        let response = Self::send(request).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::status_error(response).await)
        }
    }
}

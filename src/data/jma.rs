//! Blocking HTTP access to the JMA chart endpoints.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::header::LAST_MODIFIED;

use crate::error::AppError;

/// Status and body of a GET. Non-success responses carry an empty body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Read-only access to the remote chart source.
///
/// `Err` means the request itself failed; an HTTP error status is an `Ok`
/// response the caller inspects.
pub trait HttpSource {
    fn get(&self, url: &str) -> Result<HttpResponse, AppError>;

    /// Server-reported modification instant from a metadata-only request.
    ///
    /// `Ok(None)` when the header is absent, unparseable, or the status is not a success.
    fn last_modified(&self, url: &str) -> Result<Option<DateTime<Utc>>, AppError>;
}

pub struct JmaClient {
    client: Client,
}

impl JmaClient {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("briefwx/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::new(3, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpSource for JmaClient {
    fn get(&self, url: &str) -> Result<HttpResponse, AppError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::new(3, format!("GET {url} failed: {e}")))?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            return Ok(HttpResponse {
                status,
                body: Vec::new(),
            });
        }

        let body = resp
            .bytes()
            .map_err(|e| AppError::new(3, format!("Failed to read body of {url}: {e}")))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }

    fn last_modified(&self, url: &str) -> Result<Option<DateTime<Utc>>, AppError> {
        let resp = self
            .client
            .head(url)
            .send()
            .map_err(|e| AppError::new(3, format!("HEAD {url} failed: {e}")))?;

        if !resp.status().is_success() {
            return Ok(None);
        }

        Ok(resp
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_http_date))
    }
}

/// Parse an HTTP-date (`Sun, 10 May 2026 03:12:45 GMT`).
pub fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

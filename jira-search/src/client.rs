use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, StatusCode};
use thiserror::Error;

use crate::{
    models::{SearchRequest, SearchResponse},
    JiraUrl,
};

/// Jira Cloud removed `/rest/api/3/search`; `/search/jql` is its
/// replacement.
const SEARCH_PATH: &str = "/rest/api/3/search/jql";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Non-2xx bodies are carried into the error for logging; cap them so a
/// huge HTML error page cannot blow up a log line.
const ERROR_BODY_LIMIT: usize = 256;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl SearchError {
    /// Short classification label, stable across error messages. Used as
    /// a metric tag and a span attribute.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::Timeout => "timeout",
            SearchError::Transport(_) => "transport_error",
            SearchError::HttpStatus { .. } => "http_status",
            SearchError::Decode(_) => "decode_error",
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout
        } else if err.is_decode() {
            SearchError::Decode(err.to_string())
        } else {
            SearchError::Transport(err.to_string())
        }
    }
}

/// Jira Cloud credential pair (email + API token), sent as Basic auth.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    api_token: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            api_token: api_token.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// Abstraction over the search call so the poll loop can be exercised
/// without real network requests.
#[async_trait]
pub trait IssueSearcher: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError>;
}

/// Thin client for the Jira search endpoint. One outbound request per
/// `search` call; retry policy belongs to the caller's cadence.
#[derive(Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    base_url: JiraUrl,
    credentials: Credentials,
}

impl SearchClient {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self, SearchError> {
        Self::with_timeout(base_url, credentials, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: JiraUrl::new(base_url),
            credentials,
        })
    }

    pub async fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchError> {
        let url = self.base_url.append_path(SEARCH_PATH);

        let response = self
            .http
            .post(url.as_ref())
            .basic_auth(&self.credentials.email, Some(&self.credentials.api_token))
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::HttpStatus {
                status,
                body: truncate_on_char_boundary(body, ERROR_BODY_LIMIT),
            });
        }

        Ok(response.json::<SearchResponse>().await?)
    }
}

fn truncate_on_char_boundary(mut body: String, limit: usize) -> String {
    if body.len() > limit {
        let mut end = limit;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}

#[async_trait]
impl IssueSearcher for SearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        SearchClient::search(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_are_stable_labels() {
        assert_eq!(SearchError::Timeout.kind(), "timeout");
        assert_eq!(SearchError::Transport("reset".into()).kind(), "transport_error");
        assert_eq!(
            SearchError::HttpStatus {
                status: StatusCode::UNAUTHORIZED,
                body: String::new(),
            }
            .kind(),
            "http_status"
        );
        assert_eq!(SearchError::Decode("bad json".into()).kind(), "decode_error");
    }

    #[test]
    fn http_status_error_carries_status_detail() {
        let err = SearchError::HttpStatus {
            status: StatusCode::UNAUTHORIZED,
            body: "Basic auth failed".into(),
        };

        let message = err.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("Basic auth failed"));
    }

    #[test]
    fn body_truncation_respects_char_boundaries() {
        let body = "é".repeat(200);
        let truncated = truncate_on_char_boundary(body, ERROR_BODY_LIMIT);

        assert!(truncated.len() <= ERROR_BODY_LIMIT);
        assert!(truncated.chars().all(|c| c == 'é'));
    }

    #[test]
    fn credentials_debug_redacts_token() {
        let credentials = Credentials::new("dev@example.com", "super-secret");
        let debug = format!("{:?}", credentials);

        assert!(debug.contains("dev@example.com"));
        assert!(!debug.contains("super-secret"));
    }
}

//! HTTP client for the Urimalsaem open API search endpoint.
//!
//! One call to [`DictionaryClient::search`] is exactly one outbound GET. There
//! is no retry and no caching; failures are classified and returned as-is.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use super::types::{SearchQuery, SearchResult};
use super::wire::RawResponse;
use super::Dictionary;
use crate::config::{ApiConfig, ApiKey};
use crate::error::SearchError;

/// Upstream error codes meaning the key is unknown or not yet approved.
const AUTH_ERROR_CODES: [&str; 2] = ["020", "021"];

/// Maximum number of body characters kept in [`SearchError::Request`].
const BODY_EXCERPT_CHARS: usize = 200;

/// Client for the dictionary search API.
#[derive(Debug, Clone)]
pub struct DictionaryClient {
    http: reqwest::Client,
    base_url: String,
    api_key: ApiKey,
}

impl DictionaryClient {
    /// Creates a client sharing an existing connection pool.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: ApiKey) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Builds the underlying `reqwest` client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn http_client(config: &ApiConfig) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
    }

    /// Builds a client with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn from_config(config: &ApiConfig, api_key: ApiKey) -> reqwest::Result<Self> {
        Ok(Self::new(
            Self::http_client(config)?,
            config.base_url.clone(),
            api_key,
        ))
    }

    /// Returns the search endpoint URL.
    #[must_use]
    pub fn search_url(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }

    /// Query string for `query`, in the order the upstream documents them.
    ///
    /// `target`, `part` and `sort` are only sent in advanced mode.
    #[must_use]
    pub fn query_pairs(&self, query: &SearchQuery) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("key", self.api_key.expose().to_string()),
            ("q", query.trimmed_word().to_string()),
            ("req_type", "json".to_string()),
            ("num", query.count.to_string()),
            ("start", query.start.to_string()),
            (
                "advanced",
                if query.advanced_mode { "y" } else { "n" }.to_string(),
            ),
        ];

        if query.advanced_mode {
            pairs.push(("target", query.target.to_string()));
            pairs.push(("part", "word".to_string()));
            pairs.push(("sort", "dict".to_string()));
        }

        pairs
    }

    /// Searches the dictionary.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Validation`] before any I/O if the query is out
    /// of range; otherwise whatever [`classify_response`] makes of the reply.
    #[tracing::instrument(
        name = "dictionary_search",
        skip_all,
        fields(word = %query.trimmed_word(), num = query.count)
    )]
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResult, SearchError> {
        query.validate()?;

        let started = Instant::now();
        let response = self
            .http
            .get(self.search_url())
            .query(&self.query_pairs(query))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SearchError::Network(e.without_url()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Network(e.without_url()))?;

        let outcome = classify_response(status, &content_type, &body);
        let duration_ms = started.elapsed().as_millis();
        match &outcome {
            Ok(result) => debug!(
                status = status.as_u16(),
                duration_ms,
                total = result.total,
                "Dictionary API call succeeded"
            ),
            Err(e) => warn!(
                status = status.as_u16(),
                duration_ms,
                error = %e,
                "Dictionary API call failed"
            ),
        }
        outcome
    }
}

#[async_trait]
impl Dictionary for DictionaryClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult, SearchError> {
        Self::search(self, query).await
    }
}

/// Turns an upstream reply into a result or a classified error.
///
/// Precedence: 429, HTML error page, other non-2xx, non-object body,
/// `error` object with an auth code, any other `error` object, success.
///
/// # Errors
///
/// Returns the [`SearchError`] variant matching the first rule that applies.
pub fn classify_response(
    status: StatusCode,
    content_type: &str,
    body: &str,
) -> Result<SearchResult, SearchError> {
    if !status.is_success() {
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimit);
        }

        // Bad keys get an HTML error page rather than a JSON error object.
        if is_html(content_type, body) {
            return Err(SearchError::Auth {
                message: format!(
                    "the API key is invalid or has not been approved (status {})",
                    status.as_u16()
                ),
            });
        }

        return Err(SearchError::Request {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
        });
    }

    let format_error = || SearchError::Format {
        content_type: content_type.to_string(),
    };

    let value: Value = serde_json::from_str(body.trim()).map_err(|_| format_error())?;
    if !value.is_object() {
        return Err(format_error());
    }
    let raw: RawResponse = serde_json::from_value(value).map_err(|_| format_error())?;

    if let Some(error) = raw.error {
        if AUTH_ERROR_CODES.contains(&error.error_code.as_str()) {
            return Err(SearchError::Auth {
                message: error.message,
            });
        }
        return Err(SearchError::Api {
            code: error.error_code,
            message: error.message,
        });
    }

    Ok(raw.channel.map(SearchResult::from).unwrap_or_default())
}

fn is_html(content_type: &str, body: &str) -> bool {
    if content_type.contains("json") {
        return false;
    }
    let head = body.trim_start().to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html") || head.contains("<!doctype html")
}

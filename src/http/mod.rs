//! HTTP transports.
//!
//! - [`server`]: MCP over HTTP (`POST /mcp`, `POST /mcp/v1`)
//! - [`edge`]: a plain `/search` endpoint plus `POST /mcp`, for edge hosting
//!
//! Both routers share [`AppState`], answer every `OPTIONS` request with 204
//! and put permissive CORS headers on every response. Errors are JSON
//! bodies of the form `{"success": false, "error": "..."}`.

pub mod edge;
pub mod server;

use std::io;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::{ApiConfig, ApiKey, HttpConfig};
use crate::dictionary::DictionaryClient;
use crate::error::{ConfigError, ErrorKind, SearchError};
use crate::mcp::{Dispatcher, RpcRequest};

/// Display name reported by the metadata endpoints.
pub const DISPLAY_NAME: &str = "우리말샘 MCP 서버";

/// State shared by every request.
///
/// The connection pool is shared; a [`DictionaryClient`] is built per request.
#[derive(Debug, Clone)]
pub struct AppState {
    base_url: Arc<str>,
    api_key: Option<ApiKey>,
    http: reqwest::Client,
}

impl AppState {
    /// Creates the state from API settings and an optional key.
    ///
    /// A missing key is not an error here; requests that need it get a 500.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, api_key: Option<ApiKey>) -> reqwest::Result<Self> {
        Ok(Self {
            base_url: Arc::from(config.base_url.as_str()),
            api_key,
            http: DictionaryClient::http_client(config)?,
        })
    }

    /// Builds a client for one request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Config`] if no API key is configured.
    pub fn dictionary(&self) -> Result<DictionaryClient, HttpError> {
        let api_key = self.api_key.clone().ok_or(ConfigError::MissingApiKey)?;
        Ok(DictionaryClient::new(
            self.http.clone(),
            self.base_url.as_ref(),
            api_key,
        ))
    }
}

/// Errors returned to HTTP callers.
#[derive(Error, Debug)]
pub enum HttpError {
    /// Server misconfiguration, such as a missing API key.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Bad request parameters.
    #[error("{0}")]
    BadRequest(String),

    /// The route exists but not for this method.
    #[error("method not allowed, use {0}")]
    MethodNotAllowed(&'static str),

    /// No such route.
    #[error("unknown endpoint")]
    NotFound,

    /// The dictionary search failed.
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl HttpError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Search(e) => kind_status(e.kind()),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = json!({
            "success": false,
            "error": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

fn kind_status(kind: ErrorKind) -> StatusCode {
    StatusCode::from_u16(kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Dispatches one MCP call with a per-request client.
///
/// JSON-RPC replies, errors included, always travel with status 200.
async fn answer_rpc(dictionary: DictionaryClient, request: RpcRequest) -> Response {
    info!(method = request.method.as_deref().unwrap_or_default(), "MCP request");
    let response = Dispatcher::new(dictionary).dispatch(request).await;
    Json(response).into_response()
}

/// Wraps `router` with CORS handling and request tracing.
fn finish(router: Router, allow_methods: &'static str) -> Router {
    router
        .layer(middleware::from_fn(move |request: Request, next: Next| {
            cors(allow_methods, request, next)
        }))
        .layer(TraceLayer::new_for_http())
}

async fn cors(allow_methods: &'static str, request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(allow_methods),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

async fn not_found() -> HttpError {
    HttpError::NotFound
}

/// Binds to the configured address and serves `router` until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or serving fails.
pub async fn serve(router: Router, config: &HttpConfig) -> io::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(address = %listener.local_addr()?, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, initiating graceful shutdown");
}

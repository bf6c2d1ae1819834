//! Edge-hosted transport.
//!
//! Serves two shapes side by side:
//!
//! - `GET|POST /search`: direct JSON search, `{success, total, items, copyright}`
//! - `POST /mcp`: the same JSON-RPC envelope as [`super::server`], except that
//!   an empty, unparseable or non-object body falls back to `tools/list`
//!
//! `word` and `num` come from the query string on GET and from a JSON body on
//! POST. `num` must be 1-100 here; the dictionary then applies its own range.
//! A query string that cannot be decoded is a 400 like any other bad input.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{answer_rpc, finish, not_found, AppState, HttpError, DISPLAY_NAME};
use crate::dictionary::{format_json, Dictionary, SearchQuery, SearchResponse, COPYRIGHT};
use crate::mcp::dispatcher::{integer_arg, DEFAULT_NUM};
use crate::mcp::RpcRequest;

/// CORS methods advertised by this router.
const ALLOW_METHODS: &str = "GET, POST, OPTIONS";

/// Accepted `num` range on `/search`.
const NUM_RANGE: std::ops::RangeInclusive<u64> = 1..=100;

const NUM_ERROR: &str = "num must be an integer between 1 and 100";

/// Builds the edge router.
pub fn router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(metadata).fallback(get_method_not_allowed))
        .route(
            "/search",
            get(search_get)
                .post(search_post)
                .fallback(search_method_not_allowed),
        )
        .route("/mcp", post(mcp).fallback(post_method_not_allowed))
        .fallback(not_found)
        .with_state(state);

    finish(router, ALLOW_METHODS)
}

async fn metadata() -> Json<Value> {
    Json(json!({
        "name": DISPLAY_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/search": "Word search (GET or POST)",
            "/mcp": "MCP over HTTP (POST)",
        },
        "copyright": COPYRIGHT,
    }))
}

/// Query string of `GET /search`.
#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    word: Option<String>,
    num: Option<String>,
}

/// JSON body of `POST /search`.
#[derive(Debug, Default, Deserialize)]
struct SearchBody {
    #[serde(default)]
    word: Option<String>,
    #[serde(default)]
    num: Option<Value>,
}

async fn search_get(
    State(state): State<AppState>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, HttpError> {
    let Query(params) = query.map_err(|e| HttpError::BadRequest(e.body_text()))?;
    let dictionary = state.dictionary()?;
    let num = num_from_query(params.num.as_deref())?;
    run_search(&dictionary, params.word.as_deref(), num).await
}

async fn search_post(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SearchResponse>, HttpError> {
    let dictionary = state.dictionary()?;
    let body: SearchBody = if body.trim_ascii().is_empty() {
        SearchBody::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| HttpError::BadRequest(format!("invalid JSON body: {e}")))?
    };
    let num = num_from_json(body.num.as_ref())?;
    run_search(&dictionary, body.word.as_deref(), num).await
}

fn num_from_query(raw: Option<&str>) -> Result<u32, HttpError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_NUM),
        Some(raw) => raw
            .parse::<u64>()
            .ok()
            .and_then(checked_num)
            .ok_or_else(|| HttpError::BadRequest(NUM_ERROR.to_string())),
    }
}

fn num_from_json(value: Option<&Value>) -> Result<u32, HttpError> {
    match value {
        None | Some(Value::Null) => Ok(DEFAULT_NUM),
        Some(value) => integer_arg(value)
            .and_then(checked_num)
            .ok_or_else(|| HttpError::BadRequest(NUM_ERROR.to_string())),
    }
}

fn checked_num(n: u64) -> Option<u32> {
    if NUM_RANGE.contains(&n) {
        u32::try_from(n).ok()
    } else {
        None
    }
}

async fn run_search<D: Dictionary>(
    dictionary: &D,
    word: Option<&str>,
    num: u32,
) -> Result<Json<SearchResponse>, HttpError> {
    let Some(word) = word.map(str::trim).filter(|w| !w.is_empty()) else {
        return Err(HttpError::BadRequest("word parameter is required".to_string()));
    };

    let started = Instant::now();
    let query = SearchQuery::new(word).with_count(num);
    let result = dictionary.search(&query).await?;

    info!(
        word,
        num,
        total = result.total,
        duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Search served"
    );
    Ok(Json(format_json(&result)))
}

async fn mcp(State(state): State<AppState>, body: Bytes) -> Result<Response, HttpError> {
    let dictionary = state.dictionary()?;
    Ok(answer_rpc(dictionary, parse_body_or_tools_list(&body)).await)
}

/// Parses a request body, falling back to an implicit `tools/list`.
fn parse_body_or_tools_list(body: &[u8]) -> RpcRequest {
    if body.trim_ascii().is_empty() {
        return RpcRequest::implicit_tools_list();
    }
    RpcRequest::from_slice(body).unwrap_or_else(|e| {
        debug!(code = e.error.code, "Unusable MCP body, answering tools/list");
        RpcRequest::implicit_tools_list()
    })
}

async fn get_method_not_allowed() -> HttpError {
    HttpError::MethodNotAllowed("GET")
}

async fn post_method_not_allowed() -> HttpError {
    HttpError::MethodNotAllowed("POST")
}

async fn search_method_not_allowed() -> HttpError {
    HttpError::MethodNotAllowed("GET or POST")
}

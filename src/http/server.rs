//! MCP over HTTP.
//!
//! | Route             | Method | Reply                         |
//! |-------------------|--------|-------------------------------|
//! | `/`               | GET    | server metadata               |
//! | `/mcp`, `/mcp/v1` | POST   | JSON-RPC reply                |
//! | any               | OPTIONS| 204                           |
//!
//! An empty body is an implicit `tools/list` (id 1), which some clients send
//! when they first connect. A body that is not JSON gets a -32700 reply, and
//! JSON that is not a request object (a batch array, say) gets -32600.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use super::{answer_rpc, finish, not_found, AppState, HttpError, DISPLAY_NAME};
use crate::dictionary::COPYRIGHT;
use crate::mcp::{JsonRpcError, RpcRequest, RpcResponse};

/// CORS methods advertised by this router.
const ALLOW_METHODS: &str = "POST, OPTIONS";

/// Builds the MCP-over-HTTP router.
pub fn router(state: AppState) -> Router {
    let mcp = post(mcp).fallback(mcp_method_not_allowed);

    let router = Router::new()
        .route("/", get(metadata).fallback(metadata_method_not_allowed))
        .route("/mcp", mcp.clone())
        .route("/mcp/v1", mcp)
        .fallback(not_found)
        .with_state(state);

    finish(router, ALLOW_METHODS)
}

async fn metadata() -> Json<Value> {
    Json(json!({
        "name": DISPLAY_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "MCP over HTTP",
        "endpoint": "/mcp",
        "copyright": COPYRIGHT,
    }))
}

async fn mcp(State(state): State<AppState>, body: Bytes) -> Result<Response, HttpError> {
    let dictionary = state.dictionary()?;

    let request = match parse_body(&body) {
        Ok(request) => request,
        Err(error) => return Ok(Json(RpcResponse::from(error)).into_response()),
    };

    Ok(answer_rpc(dictionary, request).await)
}

/// Parses a request body; whitespace-only bodies become an implicit `tools/list`.
fn parse_body(body: &[u8]) -> Result<RpcRequest, JsonRpcError> {
    if body.trim_ascii().is_empty() {
        return Ok(RpcRequest::implicit_tools_list());
    }
    RpcRequest::from_slice(body)
}

async fn mcp_method_not_allowed() -> HttpError {
    HttpError::MethodNotAllowed("POST")
}

async fn metadata_method_not_allowed() -> HttpError {
    HttpError::MethodNotAllowed("GET")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::RequestId;

    #[test]
    fn empty_body_is_implicit_tools_list() {
        for body in [&b""[..], b"  \n"] {
            let request = parse_body(body).unwrap();
            assert_eq!(request.method.as_deref(), Some("tools/list"));
            assert_eq!(request.id, Some(RequestId::Number(1)));
        }
    }

    #[test]
    fn garbage_body_is_parse_error() {
        let err = parse_body(b"{not json").unwrap_err();
        assert_eq!(err.error.code, -32700);
    }

    #[test]
    fn array_body_is_invalid_request() {
        for body in [&b"[]"[..], b" [ ] \n"] {
            let err = parse_body(body).unwrap_err();
            assert_eq!(err.error.code, -32600);
        }
    }

    #[test]
    fn lenient_body_is_accepted() {
        let request = parse_body(br#"{"id":"a","method":"initialize"}"#).unwrap();
        assert_eq!(request.id, Some(RequestId::String("a".to_string())));
        assert!(request.jsonrpc.is_none());
    }
}

//! Transport-independent MCP method dispatch.
//!
//! The dispatcher holds no session state: every call is answered on its own,
//! so the same instance serves stdio, HTTP and edge transports alike.
//!
//! | Method                      | Reply                                   |
//! |-----------------------------|-----------------------------------------|
//! | `initialize`                | capabilities and server identity        |
//! | `notifications/initialized` | `null` result                           |
//! | `ping`                      | empty object                            |
//! | `tools/list`                | the `search_word` descriptor            |
//! | `tools/call`                | tool result; -32602 on malformed params |
//! | anything else               | -32601                                  |

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::dictionary::{format_text, Dictionary, SearchQuery};
use crate::mcp::protocol::{
    ErrorCode, JsonRpcError, JsonRpcErrorData, JsonRpcResponse, RequestId, RpcRequest,
    RpcResponse, MCP_PROTOCOL_VERSION, SERVER_NAME,
};

/// Name of the only tool this server exposes.
pub const SEARCH_WORD_TOOL: &str = "search_word";

/// Result count used when the caller does not pass `num`.
pub const DEFAULT_NUM: u32 = 10;

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolCapabilities>,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            tools: Some(ToolCapabilities::default()),
        }
    }
}

/// Tool-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change during the session.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// A tool definition for tools/list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }
}

/// Returns the list of available tools.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        name: SEARCH_WORD_TOOL.to_string(),
        description: Some(
            "Search the Urimalsaem (우리말샘) Korean dictionary. Returns each matching \
             entry with its part of speech, origin, definitions, categories and usage \
             examples."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "word": {
                    "type": "string",
                    "description": "The word to look up"
                },
                "num": {
                    "type": "integer",
                    "description": "Number of results (default: 10, max: 100)",
                    "default": DEFAULT_NUM,
                    "minimum": 1,
                    "maximum": 100
                }
            },
            "required": ["word"]
        }),
    }]
}

/// Routes JSON-RPC calls to handlers backed by a [`Dictionary`].
#[derive(Debug, Clone)]
pub struct Dispatcher<D> {
    dictionary: D,
}

impl<D: Dictionary> Dispatcher<D> {
    /// Creates a dispatcher over `dictionary`.
    pub const fn new(dictionary: D) -> Self {
        Self { dictionary }
    }

    /// Answers one call.
    ///
    /// Never fails: protocol problems become JSON-RPC error replies.
    #[tracing::instrument(
        name = "dispatch",
        skip_all,
        fields(method = request.method.as_deref().unwrap_or_default())
    )]
    pub async fn dispatch(&self, request: RpcRequest) -> RpcResponse {
        let id = request.id.clone();
        let Some(method) = request.method.as_deref() else {
            return JsonRpcError::new(id, JsonRpcErrorData::from_code(ErrorCode::MethodNotFound))
                .into();
        };

        let outcome = match method {
            "initialize" => Ok(Self::handle_initialize(id)),
            "notifications/initialized" => Ok(JsonRpcResponse::success(id, Value::Null)),
            "ping" => Ok(JsonRpcResponse::success(id, json!({}))),
            "tools/list" => Ok(Self::handle_tools_list(id)),
            "tools/call" => self.handle_tools_call(id, request.params.as_ref()).await,
            other => Err(JsonRpcError::method_not_found(id, other)),
        };

        match outcome {
            Ok(response) => response.into(),
            Err(error) => {
                debug!(code = error.error.code, message = %error.error.message, "Replying with error");
                error.into()
            }
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(id: Option<RequestId>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        });

        JsonRpcResponse::success(id, result)
    }

    /// Handles the tools/list request.
    fn handle_tools_list(id: Option<RequestId>) -> JsonRpcResponse {
        let result = json!({
            "tools": tool_definitions(),
        });

        JsonRpcResponse::success(id, result)
    }

    /// Handles the tools/call request.
    async fn handle_tools_call(
        &self,
        id: Option<RequestId>,
        params: Option<&Value>,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        let params: ToolCallParams = params
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| {
                JsonRpcError::invalid_params(id.clone(), format!("Invalid tool call params: {e}"))
            })?
            .ok_or_else(|| JsonRpcError::invalid_params(id.clone(), "Missing tool call params"))?;

        if params.name.is_empty() {
            return Err(JsonRpcError::invalid_params(id, "Tool name must not be empty"));
        }

        let result = match params.name.as_str() {
            SEARCH_WORD_TOOL => self.call_search_word(&params.arguments).await,
            // Unknown tool
            _ => ToolCallResult::error(format!("Unknown tool: {}", params.name)),
        };

        let result_value = serde_json::to_value(&result).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialise tool call result");
            JsonRpcError::internal_error(id.clone(), "Internal error: failed to serialise result")
        })?;

        Ok(JsonRpcResponse::success(id, result_value))
    }

    /// Runs `search_word`.
    ///
    /// Every search failure, whatever its kind, comes back as an `isError`
    /// tool result carrying the error message.
    async fn call_search_word(&self, arguments: &Value) -> ToolCallResult {
        let Some(word) = arguments
            .get("word")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|w| !w.is_empty())
        else {
            warn!("search_word called without a word");
            return ToolCallResult::error("Error: missing required parameter: word");
        };

        let num = match arguments.get("num") {
            None | Some(Value::Null) => DEFAULT_NUM,
            Some(value) => match integer_arg(value) {
                // 0 means "not set", matching clients that send falsy defaults
                Some(0) => DEFAULT_NUM,
                Some(n) => u32::try_from(n).unwrap_or(u32::MAX),
                None => return ToolCallResult::error("Error: num must be a non-negative integer"),
            },
        };

        info!(word, num, "search_word");
        let query = SearchQuery::new(word).with_count(num);

        match self.dictionary.search(&query).await {
            Ok(result) => ToolCallResult::text(format_text(&result)),
            Err(e) => {
                warn!(kind = ?e.kind(), error = %e, "search_word failed");
                ToolCallResult::error(format!("Error: {e}"))
            }
        }
    }
}

/// Accepts `20` and `20.0`; rejects fractions, negatives and non-numbers.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub(crate) fn integer_arg(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

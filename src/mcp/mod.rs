//! Model Context Protocol (MCP) server implementation.
//!
//! Exposes the dictionary as a single MCP tool, `search_word`. Method
//! routing lives in [`dispatcher`] and knows nothing about framing, so the
//! stdio loop in [`server`] and the HTTP routers in [`crate::http`] share it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MCP Server                          │
//! │                                                              │
//! │   ┌─────────────┐    ┌──────────────┐    ┌──────────────┐    │
//! │   │  Transport  │───▶│  Dispatcher  │───▶│  Dictionary  │    │
//! │   │ stdio/HTTP  │    │  (stateless) │    │   (client)   │    │
//! │   └─────────────┘    └──────────────┘    └──────────────┘    │
//! │          │                  │                                │
//! │          ▼                  ▼                                │
//! │   ┌──────────────────────────────────────┐                   │
//! │   │          JSON-RPC Messages           │                   │
//! │   └──────────────────────────────────────┘                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2025-06-18.

pub mod dispatcher;
pub mod protocol;
pub mod server;
pub mod transport;

pub use dispatcher::{tool_definitions, Dispatcher, ToolCallResult, SEARCH_WORD_TOOL};
pub use protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcRequest, RpcResponse, MCP_PROTOCOL_VERSION,
    SERVER_NAME,
};
pub use server::McpServer;
pub use transport::StdioTransport;

//! malsaem-mcp: MCP server for the Urimalsaem (우리말샘) Korean dictionary
//!
//! Exposes one tool, `search_word`, that forwards a query to the Urimalsaem
//! open API and renders the reply as Korean text for an AI assistant.
//!
//! # Transports
//!
//! - **stdio**: newline-delimited JSON-RPC for local MCP clients
//! - **HTTP**: JSON-RPC over `POST /mcp`
//! - **Edge**: metadata, a plain `/search` endpoint and `/mcp`, with CORS
//!
//! # Modules
//!
//! - [`config`]: Configuration loading and API key resolution
//! - [`dictionary`]: Upstream client, result model and formatting
//! - [`error`]: Error types
//! - [`http`]: HTTP and edge routers
//! - [`mcp`]: MCP protocol implementation

pub mod config;
pub mod dictionary;
pub mod error;
pub mod http;
pub mod mcp;

//! Urimalsaem dictionary access.
//!
//! - [`client`]: builds the outbound request and classifies the reply
//! - [`types`]: query and result model
//! - [`format`]: text and JSON rendering
//!
//! The [`Dictionary`] trait is what the MCP dispatcher and the HTTP
//! transports depend on; [`DictionaryClient`] is the production
//! implementation.

pub mod client;
pub mod format;
pub mod types;
mod wire;

pub use client::{classify_response, DictionaryClient};
pub use format::{format_json, format_text, SearchResponse, COPYRIGHT, COPYRIGHT_NOTICE};
pub use types::{ExampleInfo, SearchQuery, SearchResult, SenseInfo, WordItem};

use async_trait::async_trait;

use crate::error::SearchError;

/// Something that can answer a dictionary search.
#[async_trait]
pub trait Dictionary: Send + Sync {
    /// Runs one search. Implementations must validate `query` first.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult, SearchError>;
}

//! Search query and result model.

use serde::Serialize;

use crate::error::SearchError;

/// Smallest accepted result count.
pub const MIN_COUNT: u32 = 10;
/// Largest accepted result count.
pub const MAX_COUNT: u32 = 100;
/// Smallest accepted start offset.
pub const MIN_START: u32 = 1;
/// Largest accepted start offset.
pub const MAX_START: u32 = 1000;
/// Smallest accepted search target.
pub const MIN_TARGET: u32 = 1;
/// Largest accepted search target.
pub const MAX_TARGET: u32 = 10;

/// Parameters for one dictionary search.
///
/// Values are checked by [`SearchQuery::validate`]; out-of-range values are
/// rejected, never clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// The word to look up. Trimmed before sending.
    pub word: String,
    /// Number of results per page (`num`).
    pub count: u32,
    /// 1-based start offset (`start`).
    pub start: u32,
    /// Enables `target`, `part` and `sort`.
    pub advanced_mode: bool,
    /// Search target (1 = headword, 2 = definition, ...).
    pub target: u32,
}

impl SearchQuery {
    /// Creates a query for `word` with default paging and advanced mode on.
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            count: MIN_COUNT,
            start: MIN_START,
            advanced_mode: true,
            target: MIN_TARGET,
        }
    }

    /// Sets the number of results.
    #[must_use]
    pub const fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Sets the start offset.
    #[must_use]
    pub const fn with_start(mut self, start: u32) -> Self {
        self.start = start;
        self
    }

    /// Enables or disables advanced mode.
    #[must_use]
    pub const fn with_advanced_mode(mut self, advanced_mode: bool) -> Self {
        self.advanced_mode = advanced_mode;
        self
    }

    /// Sets the search target.
    #[must_use]
    pub const fn with_target(mut self, target: u32) -> Self {
        self.target = target;
        self
    }

    /// Returns the word with surrounding whitespace removed.
    #[must_use]
    pub fn trimmed_word(&self) -> &str {
        self.word.trim()
    }

    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Validation`] naming the first offending parameter.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.trimmed_word().is_empty() {
            return Err(SearchError::validation("word must not be empty"));
        }
        if !(MIN_COUNT..=MAX_COUNT).contains(&self.count) {
            return Err(SearchError::validation(format!(
                "num must be between {MIN_COUNT} and {MAX_COUNT} (got {})",
                self.count
            )));
        }
        if !(MIN_START..=MAX_START).contains(&self.start) {
            return Err(SearchError::validation(format!(
                "start must be between {MIN_START} and {MAX_START} (got {})",
                self.start
            )));
        }
        if !(MIN_TARGET..=MAX_TARGET).contains(&self.target) {
            return Err(SearchError::validation(format!(
                "target must be between {MIN_TARGET} and {MAX_TARGET} (got {})",
                self.target
            )));
        }
        Ok(())
    }
}

/// Parsed search response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Total matches reported upstream (may exceed `items.len()`).
    pub total: u64,
    /// Entries on this page, in upstream order.
    pub items: Vec<WordItem>,
}

impl SearchResult {
    /// Returns `true` if the page has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One dictionary entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordItem {
    /// Headword. Empty if the upstream omitted it.
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_code: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_unit: Option<String>,
    /// Part-of-speech style tag, e.g. `일반어`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_type: Option<String>,
    /// Origin spelling for loanwords and Sino-Korean words.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_type: Option<String>,
    pub senses: Vec<SenseInfo>,
}

/// One sense (meaning) of an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SenseInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sense_no: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub sense_type: Option<String>,
    /// Subject category, e.g. `생물`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub examples: Vec<ExampleInfo>,
    /// Link to the sign-language dictionary entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign_language_link: Option<String>,
}

/// A usage example.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExampleInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

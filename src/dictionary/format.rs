//! Text and JSON rendering of search results.
//!
//! The text layout is consumed by language models and golden tests alike, so
//! it is fixed: same input, same bytes.

use std::fmt::Write as _;

use serde::Serialize;

use super::types::{SearchResult, WordItem};

/// Data source and license, as required by CC BY-SA 2.0 KR.
pub const COPYRIGHT: &str = "우리말샘(국립국어원), CC BY-SA 2.0 KR";

/// Attribution appended to every text rendering.
pub const COPYRIGHT_NOTICE: &str = "\n\n출처: 우리말샘(국립국어원), CC BY-SA 2.0 KR";

/// Message used when a search matched nothing.
pub const NO_RESULTS: &str = "검색 결과가 없습니다.";

/// Renders a result as a numbered, human-readable list.
#[must_use]
pub fn format_text(result: &SearchResult) -> String {
    if result.is_empty() {
        return format!("{NO_RESULTS}{COPYRIGHT_NOTICE}");
    }

    let mut out = format!("검색 결과: {}개\n\n", result.total);
    for (index, item) in result.items.iter().enumerate() {
        write_item(&mut out, index + 1, item);
        out.push('\n');
    }
    out.push_str(COPYRIGHT_NOTICE);
    out
}

// `write!` into a String cannot fail.
fn write_item(out: &mut String, number: usize, item: &WordItem) {
    if !item.word.is_empty() {
        let _ = write!(out, "[{number}] {}", item.word);
        if let Some(unit) = &item.word_unit {
            let _ = write!(out, " ({unit})");
        }
        if let Some(word_type) = &item.word_type {
            let _ = write!(out, " [{word_type}]");
        }
        if let Some(origin) = &item.original_language {
            let _ = write!(out, " - {origin}");
            if let Some(language) = &item.language_type {
                let _ = write!(out, " ({language})");
            }
        }
        out.push('\n');
    }

    for (sense_index, sense) in item.senses.iter().enumerate() {
        if let Some(definition) = &sense.definition {
            let _ = write!(out, "  {}. {definition}", sense_index + 1);
            if let Some(sense_type) = &sense.sense_type {
                let _ = write!(out, " [{sense_type}]");
            }
            out.push('\n');
        }

        if let Some(category) = &sense.category {
            let _ = writeln!(out, "     분류: {category}");
        }

        for example in &sense.examples {
            let Some(text) = &example.example else {
                continue;
            };
            let _ = write!(out, "     예: {text}");
            if let Some(source) = &example.source {
                let _ = write!(out, " (출전: {source})");
            }
            out.push('\n');
        }

        if let Some(link) = &sense.sign_language_link {
            let _ = writeln!(out, "     수어 정보: {link}");
        }
    }
}

/// Structured body returned by the `/search` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub total: u64,
    pub items: Vec<WordItem>,
    pub copyright: &'static str,
}

/// Projects a result into the `/search` JSON body.
#[must_use]
pub fn format_json(result: &SearchResult) -> SearchResponse {
    SearchResponse {
        success: true,
        total: result.total,
        items: result.items.clone(),
        copyright: COPYRIGHT,
    }
}

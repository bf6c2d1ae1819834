//! Upstream response shapes.
//!
//! The open API is loose about cardinality: `channel.item`, `senseinfo`,
//! `example_info`, `cat_info` and `original_language_info` each arrive as
//! either a single object or an array. Every such field is normalised to a
//! `Vec` here, so nothing downstream has to care. Empty strings are treated
//! as absent.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::types::{ExampleInfo, SearchResult, SenseInfo, WordItem};

/// Top-level response body: either a `channel` or an `error`.
#[derive(Debug, Default, Deserialize)]
pub struct RawResponse {
    #[serde(default)]
    pub channel: Option<RawChannel>,
    #[serde(default, deserialize_with = "lenient_error")]
    pub error: Option<RawApiError>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawChannel {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub item: Vec<RawItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawApiError {
    #[serde(default, deserialize_with = "lenient_code")]
    pub error_code: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawItem {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub target_code: Option<u64>,
    #[serde(default)]
    pub wordinfo: Option<RawWordInfo>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub senseinfo: Vec<RawSenseInfo>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawWordInfo {
    #[serde(default)]
    pub word: Option<String>,
    #[serde(default)]
    pub word_unit: Option<String>,
    #[serde(default)]
    pub word_type: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub original_language_info: Vec<RawOriginalLanguage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawOriginalLanguage {
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub language_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawSenseInfo {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub sense_no: Option<u64>,
    #[serde(default, rename = "type")]
    pub sense_type: Option<String>,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub cat_info: Vec<RawCategory>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub example_info: Vec<RawExample>,
    #[serde(default)]
    pub sl_info_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCategory {
    #[serde(default)]
    pub cat: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawExample {
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}

/// Accepts `12`, `"12"` or `null`.
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Error codes come back as `"020"` or as bare numbers.
fn lenient_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// Strings as-is, `null` as empty, anything else as its JSON text.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    })
}

/// Any non-null `error` value is an upstream error, object or not.
fn lenient_error<'de, D>(deserializer: D) -> Result<Option<RawApiError>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(object @ Value::Object(_)) => Some(RawApiError::deserialize(object).unwrap_or_default()),
        Some(Value::String(message)) => Some(RawApiError {
            message,
            ..RawApiError::default()
        }),
        Some(other) => Some(RawApiError {
            message: other.to_string(),
            ..RawApiError::default()
        }),
    })
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl From<RawChannel> for SearchResult {
    fn from(channel: RawChannel) -> Self {
        Self {
            total: channel.total.unwrap_or(0),
            items: channel.item.into_iter().map(WordItem::from).collect(),
        }
    }
}

impl From<RawItem> for WordItem {
    fn from(item: RawItem) -> Self {
        let info = item.wordinfo.unwrap_or_default();
        let origin = info
            .original_language_info
            .into_iter()
            .find(|o| o.original_language.as_deref().is_some_and(|s| !s.is_empty()))
            .unwrap_or_default();

        Self {
            word: info.word.unwrap_or_default(),
            target_code: item.target_code,
            word_unit: present(info.word_unit),
            word_type: present(info.word_type),
            original_language: present(origin.original_language),
            language_type: present(origin.language_type),
            senses: item.senseinfo.into_iter().map(SenseInfo::from).collect(),
        }
    }
}

impl From<RawSenseInfo> for SenseInfo {
    fn from(sense: RawSenseInfo) -> Self {
        Self {
            sense_no: sense.sense_no,
            definition: present(sense.definition),
            sense_type: present(sense.sense_type),
            category: sense.cat_info.into_iter().find_map(|c| present(c.cat)),
            examples: sense
                .example_info
                .into_iter()
                .map(|e| ExampleInfo {
                    example: present(e.example),
                    source: present(e.source),
                })
                .collect(),
            sign_language_link: present(sense.sl_info_link),
        }
    }
}

//! Shared helpers for integration tests.
//!
//! [`FakeUpstream`] is an in-process stand-in for the dictionary open API,
//! bound to an ephemeral port. It answers every search with a canned reply
//! and records how often, and with which query, it was called.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use malsaem_mcp::config::{ApiConfig, ApiKey};
use malsaem_mcp::dictionary::DictionaryClient;

pub const TEST_KEY: &str = "TEST-KEY-0123";

/// A canned upstream reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    pub fn json(value: &Value) -> Self {
        Self::json_with_status(StatusCode::OK, value)
    }

    pub fn json_with_status(status: StatusCode, value: &Value) -> Self {
        Self {
            status,
            content_type: "application/json;charset=UTF-8",
            body: value.to_string(),
        }
    }

    pub fn html(status: StatusCode) -> Self {
        Self {
            status,
            content_type: "text/html;charset=UTF-8",
            body: "<!DOCTYPE html><html><body>Unregistered key</body></html>".to_string(),
        }
    }

    pub fn text(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.to_string(),
        }
    }
}

struct Shared {
    reply: Reply,
    calls: AtomicUsize,
    last_query: Mutex<Option<HashMap<String, String>>>,
}

/// Handle to a running fake upstream.
#[derive(Clone)]
pub struct FakeUpstream {
    pub base_url: String,
    shared: Arc<Shared>,
}

impl FakeUpstream {
    pub async fn spawn(reply: Reply) -> Self {
        let shared = Arc::new(Shared {
            reply,
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        });

        let app = Router::new()
            .route("/api/search", get(search))
            .with_state(shared.clone());
        let base = serve(app).await;

        Self {
            base_url: format!("{base}/api"),
            shared,
        }
    }

    pub fn calls(&self) -> usize {
        self.shared.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> HashMap<String, String> {
        self.shared
            .last_query
            .lock()
            .unwrap()
            .clone()
            .expect("upstream was never called")
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            ..ApiConfig::default()
        }
    }

    pub fn client(&self) -> DictionaryClient {
        DictionaryClient::from_config(&self.api_config(), test_key()).unwrap()
    }
}

async fn search(
    State(shared): State<Arc<Shared>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    shared.calls.fetch_add(1, Ordering::SeqCst);
    *shared.last_query.lock().unwrap() = Some(query);

    let reply = &shared.reply;
    (
        reply.status,
        [(header::CONTENT_TYPE, reply.content_type)],
        reply.body.clone(),
    )
        .into_response()
}

/// Serves `router` on an ephemeral port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn test_key() -> ApiKey {
    ApiKey::new(TEST_KEY).unwrap()
}

/// A realistic two-item success body.
pub fn two_items() -> Value {
    json!({
        "channel": {
            "total": 2,
            "num": 10,
            "title": "우리말샘 검색 결과",
            "item": [
                {
                    "target_code": 63297,
                    "wordinfo": {
                        "word": "나무",
                        "word_unit": "단어",
                        "word_type": "고유어"
                    },
                    "senseinfo": {
                        "sense_no": "1",
                        "definition": "줄기나 가지가 목질로 된 여러해살이 식물.",
                        "type": "일반어",
                        "pos": "명사",
                        "cat_info": { "cat": "식물" },
                        "example_info": [
                            { "example": "나무를 심다.", "source": "" },
                            { "example": "나무 그늘에서 쉬다." }
                        ]
                    }
                },
                {
                    "target_code": "412345",
                    "wordinfo": {
                        "word": "나무-하다",
                        "word_unit": "단어",
                        "word_type": "고유어"
                    },
                    "senseinfo": [
                        { "sense_no": 1, "definition": "땔나무를 베거나 주워 모으다.", "type": "일반어" }
                    ]
                }
            ]
        }
    })
}

/// A success body whose `item` is a single object.
pub fn single_item() -> Value {
    json!({
        "channel": {
            "total": "1",
            "item": {
                "target_code": 1,
                "wordinfo": {
                    "word": "사과",
                    "original_language_info": {
                        "original_language": "沙果",
                        "language_type": "한자"
                    }
                },
                "senseinfo": { "definition": "사과나무의 열매." }
            }
        }
    })
}

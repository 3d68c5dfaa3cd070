//! In-process stand-in for the Gemini `generateContent` endpoint.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine;
use latelier::config::Config;
use serde_json::{json, Value};

pub const API_KEY: &str = "test-key";

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Error(u16, String),
}

#[derive(Debug, Clone)]
pub struct Call {
    pub model: String,
    pub api_key: Option<String>,
    pub body: Value,
}

struct Inner {
    analysis: Reply,
    speech: Reply,
    calls: Vec<Call>,
}

#[derive(Clone)]
pub struct MockGemini {
    pub addr: SocketAddr,
    inner: Arc<Mutex<Inner>>,
}

impl MockGemini {
    pub async fn start() -> Self {
        let inner = Arc::new(Mutex::new(Inner {
            analysis: Reply::Json(text_reply(&cafe_analysis_json().to_string())),
            speech: Reply::Json(audio_reply(&tone_pcm(2400))),
            calls: Vec::new(),
        }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new()
            .route("/v1beta/models/{name}", post(generate))
            .with_state(inner.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, inner }
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.gemini.endpoint = format!("http://{}/v1beta", self.addr);
        config.gemini.api_key = API_KEY.into();
        config.gemini.timeout_secs = Some(10);
        config
    }

    pub fn set_analysis(&self, reply: Reply) {
        self.inner.lock().unwrap().analysis = reply;
    }

    pub fn set_speech(&self, reply: Reply) {
        self.inner.lock().unwrap().speech = reply;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn speech_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.model.contains("tts")).collect()
    }
}

async fn generate(
    State(inner): State<Arc<Mutex<Inner>>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let model = name.trim_end_matches(":generateContent").to_string();
    let reply = {
        let mut inner = inner.lock().unwrap();
        inner.calls.push(Call {
            model: model.clone(),
            api_key: headers
                .get("x-goog-api-key")
                .and_then(|v| v.to_str().ok())
                .map(String::from),
            body,
        });
        if model.contains("tts") {
            inner.speech.clone()
        } else {
            inner.analysis.clone()
        }
    };

    // Give callers a window in which the request is in flight.
    tokio::time::sleep(Duration::from_millis(20)).await;

    match reply {
        Reply::Json(value) => Json(value).into_response(),
        Reply::Error(status, message) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = json!({ "error": { "code": status.as_u16(), "message": message } });
            (status, Json(body)).into_response()
        }
    }
}

pub fn text_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }]
    })
}

pub fn audio_reply(pcm: &[u8]) -> Value {
    let data = base64::engine::general_purpose::STANDARD.encode(pcm);
    json!({
        "candidates": [{
            "content": { "parts": [{ "inlineData": { "mimeType": "audio/L16;rate=24000", "data": data } }] },
            "finishReason": "STOP"
        }]
    })
}

/// `frames` samples of a quiet square wave as 16-bit little-endian PCM.
pub fn tone_pcm(frames: usize) -> Vec<u8> {
    (0..frames)
        .flat_map(|i| {
            let sample: i16 = if (i / 50) % 2 == 0 { 4096 } else { -4096 };
            sample.to_le_bytes()
        })
        .collect()
}

/// Breakdown of "我今天去咖啡店看书。" as the analysis model returns it.
pub fn cafe_analysis_json() -> Value {
    json!({
        "translatedText": "Aujourd'hui, je suis allé au café pour lire.",
        "segmentedText": [
            {"text": "Aujourd'hui, ", "role": "modifier", "meaning_cn": "今天", "meaning_en": "Today", "grammar_info": "Adverb of time"},
            {"text": "je ", "role": "subject", "meaning_cn": "我", "meaning_en": "I", "grammar_info": "Subject pronoun"},
            {"text": "suis allé ", "role": "predicate", "meaning_cn": "去了", "meaning_en": "went", "grammar_info": "Main verb in passé composé"},
            {"text": "au ", "role": "preposition", "meaning_cn": "到", "meaning_en": "to the", "grammar_info": "à + le contraction"},
            {"text": "café ", "role": "object", "meaning_cn": "咖啡店", "meaning_en": "café", "grammar_info": "Complement of place"},
            {"text": "pour lire.", "role": "connective", "meaning_cn": "为了看书", "meaning_en": "to read", "grammar_info": "Purpose clause"}
        ],
        "grammarPoints": [
            {"point": "Passé composé avec être", "explanation": "Aller takes être in the passé composé.", "example": "Je suis allé au café."}
        ],
        "verbConjugations": [
            {"infinitive": "aller", "tense": "passé composé", "group": "3e groupe", "explanation": "Irregular verb of movement."},
            {"infinitive": "lire", "tense": "infinitif", "group": "3e groupe", "explanation": "Infinitive after pour."}
        ],
        "vocabulary": [
            {"word": "café", "gender": "masculine", "meaning": "咖啡店", "pos": "noun"},
            {"word": "aller", "gender": "N/A", "meaning": "去", "pos": "verb"},
            {"word": "lire", "gender": "N/A", "meaning": "看书", "pos": "verb"}
        ],
        "fixedExpressions": [
            {"expression": "aller au café", "meaning": "去咖啡馆", "context": "Everyday leisure."}
        ]
    })
}

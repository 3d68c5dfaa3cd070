//! Gemini `generateContent` transport shared by analysis and speech.
//!
//! Sends `POST {endpoint}/models/{model}:generateContent` with the API key in
//! the `x-goog-api-key` header and decodes the response envelope. The key is
//! resolved once at construction; a missing key only fails when a call is made.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::GeminiConfig;
use crate::error::GeminiError;

#[derive(Clone)]
pub struct GeminiClient {
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, GeminiError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            warn!("No Gemini API key found; requests will fail until one is configured");
        }

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    pub fn url_for(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.endpoint)
    }

    /// One `generateContent` call. No retry.
    pub async fn generate(
        &self,
        model: &str,
        body: &Value,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;
        let t0 = Instant::now();

        let resp = self
            .client
            .post(self.url_for(model))
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = service_message(&text).unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            });
            warn!("Gemini model {model} returned {status}: {message}");
            return Err(GeminiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let response = resp.json::<GenerateContentResponse>().await?;
        debug!(
            "Gemini model {model} answered in {}ms ({} candidates)",
            t0.elapsed().as_millis(),
            response.candidates.len()
        );
        Ok(response)
    }
}

/// Extract `error.message` from a Gemini error body.
fn service_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value["error"]["message"]
        .as_str()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub text: Option<String>,
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: Option<String>,
    pub data: String,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// All text parts of the first candidate joined, `None` when there is no text.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// First non-empty inline data part of the first candidate.
    pub fn inline_data(&self) -> Option<&InlineData> {
        self.first_parts()
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| !d.data.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn text_joins_parts_of_first_candidate() {
        let resp = parse(json!({
            "candidates": [
                {"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}, "finishReason": "STOP"},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }));
        assert_eq!(resp.text().as_deref(), Some("{\"a\":1}"));
        assert_eq!(resp.candidates[0].finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn blank_or_missing_text_is_none() {
        assert!(parse(json!({})).text().is_none());
        assert!(parse(json!({"candidates": [{"content": {"parts": [{"text": "  "}]}}]})).text().is_none());
        assert!(parse(json!({"candidates": [{"finishReason": "SAFETY"}]})).text().is_none());
    }

    #[test]
    fn inline_data_skips_empty_parts() {
        let resp = parse(json!({
            "candidates": [{"content": {"parts": [
                {"text": "here you go"},
                {"inlineData": {"mimeType": "audio/L16;rate=24000", "data": ""}},
                {"inlineData": {"mimeType": "audio/L16;rate=24000", "data": "AAA="}}
            ]}}]
        }));
        let data = resp.inline_data().unwrap();
        assert_eq!(data.data, "AAA=");
        assert_eq!(data.mime_type.as_deref(), Some("audio/L16;rate=24000"));
    }

    #[test]
    fn service_message_reads_error_body() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(service_message(body).as_deref(), Some("API key not valid."));
        assert!(service_message("<html>bad gateway</html>").is_none());
    }

    #[test]
    fn url_uses_trimmed_endpoint() {
        let client = GeminiClient::new(&GeminiConfig {
            endpoint: "http://localhost:9000/v1beta/".into(),
            api_key: "k".into(),
            timeout_secs: Some(5),
        })
        .unwrap();
        assert_eq!(
            client.url_for("gemini-3-pro-preview"),
            "http://localhost:9000/v1beta/models/gemini-3-pro-preview:generateContent"
        );
    }
}

//! Diary translation and grammatical breakdown via the analysis model.
//!
//! The request pins the answer to a JSON schema so the reply deserializes
//! straight into [`DiaryAnalysis`]; anything that does not is a failed call.

use std::time::Instant;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::gemini::GeminiClient;
use crate::model::{DiaryAnalysis, SegmentRole};

const PROMPT_TEMPLATE: &str = r#"Translate the following diary entry into natural, expressive French.
Then give a detailed grammatical analysis and a structural breakdown:
1. Grammar points (tenses, agreements).
2. The verb conjugations used.
3. Key vocabulary: list EVERY significant word of the French translation with its gender (if applicable), its meaning in Chinese and its part of speech (pos).
4. Fixed expressions or idioms used.
5. Structural breakdown as a "segmentedText" array. Each segment has:
   - "text": the French text segment.
   - "role": one of ['subject', 'object', 'predicate', 'preposition', 'modifier', 'connective', 'other'].
   - "meaning_cn": meaning in Chinese.
   - "meaning_en": meaning in English.
   - "grammar_info": a short grammar explanation in English (e.g. "Direct object", "Main verb in passé composé").

Role rules:
- Subject (主语) and object (宾语) -> 'subject' or 'object'.
- Predicate (谓语) -> 'predicate'.
- Preposition (介词) -> 'preposition'.
- Everything else -> 'modifier', 'connective' or 'other'.

Joining all "text" fields of "segmentedText" must reproduce 'translatedText' exactly, spaces and punctuation included.

Diary Entry: {text}"#;

pub struct AnalysisClient {
    gemini: GeminiClient,
    model: String,
}

impl AnalysisClient {
    pub fn new(gemini: GeminiClient, config: &AnalysisConfig) -> Self {
        Self {
            gemini,
            model: config.model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Translate and analyze one diary entry. One outbound call, no retry.
    pub async fn analyze(&self, text: &str) -> Result<DiaryAnalysis, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let t0 = Instant::now();
        info!("Analyzing diary entry ({} chars) with {}", text.chars().count(), self.model);

        let response = self.gemini.generate(&self.model, &request_body(text)).await?;
        let payload = response.text().ok_or(AnalysisError::EmptyResponse)?;
        debug!("Analysis payload: {} bytes", payload.len());

        let analysis = parse_analysis(&payload)?;
        info!(
            "Analysis ready in {}ms: {} segments, {} grammar points, {} words",
            t0.elapsed().as_millis(),
            analysis.segmented_text.len(),
            analysis.grammar_points.len(),
            analysis.vocabulary.len()
        );
        Ok(analysis)
    }
}

pub fn build_prompt(text: &str) -> String {
    PROMPT_TEMPLATE.replace("{text}", text)
}

/// Full `generateContent` body: prompt plus JSON response schema.
pub fn request_body(text: &str) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": build_prompt(text) }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        }
    })
}

fn string_fields(names: &[&str]) -> Value {
    let properties: serde_json::Map<String, Value> = names
        .iter()
        .map(|name| (name.to_string(), json!({ "type": "STRING" })))
        .collect();
    json!({ "type": "OBJECT", "properties": properties, "required": names })
}

/// Schema the model's answer must follow.
pub fn response_schema() -> Value {
    let roles: Vec<&str> = SegmentRole::ALL.iter().map(|r| r.as_str()).collect();

    let mut vocabulary = string_fields(&["word", "gender", "meaning", "pos"]);
    vocabulary["properties"]["pos"]["description"] =
        "Part of speech: noun, verb, adjective, adverb, preposition, etc.".into();

    json!({
        "type": "OBJECT",
        "properties": {
            "translatedText": { "type": "STRING" },
            "segmentedText": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "text": { "type": "STRING" },
                        "role": { "type": "STRING", "enum": roles },
                        "meaning_cn": { "type": "STRING" },
                        "meaning_en": { "type": "STRING" },
                        "grammar_info": { "type": "STRING" }
                    },
                    "required": ["text", "role", "meaning_cn", "meaning_en", "grammar_info"]
                }
            },
            "grammarPoints": {
                "type": "ARRAY",
                "items": string_fields(&["point", "explanation", "example"])
            },
            "verbConjugations": {
                "type": "ARRAY",
                "items": string_fields(&["infinitive", "tense", "group", "explanation"])
            },
            "vocabulary": { "type": "ARRAY", "items": vocabulary },
            "fixedExpressions": {
                "type": "ARRAY",
                "items": string_fields(&["expression", "meaning", "context"])
            },
            "culturalNote": { "type": "STRING" }
        },
        "required": [
            "translatedText",
            "segmentedText",
            "grammarPoints",
            "verbConjugations",
            "vocabulary",
            "fixedExpressions"
        ]
    })
}

/// Parse and validate the model's JSON answer.
pub fn parse_analysis(payload: &str) -> Result<DiaryAnalysis, AnalysisError> {
    let analysis: DiaryAnalysis = serde_json::from_str(strip_code_fence(payload.trim()))?;

    if analysis.translated_text.trim().is_empty() {
        return Err(AnalysisError::IncompletePayload(
            "translatedText is empty".into(),
        ));
    }
    if !analysis.segments_match_translation() {
        let joined = analysis.joined_segments();
        warn!(
            "Segments do not reproduce translation: {:?} vs {:?}",
            joined, analysis.translated_text
        );
        return Err(AnalysisError::SegmentMismatch { joined });
    }

    Ok(analysis)
}

/// Models occasionally wrap JSON mode output in a ```json fence.
fn strip_code_fence(payload: &str) -> &str {
    let Some(rest) = payload.strip_prefix("```") else {
        return payload;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

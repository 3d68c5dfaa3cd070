//! Text-to-speech through the Gemini TTS model.

use std::time::Instant;

use serde_json::{json, Value};
use tracing::{debug, info};

use super::pcm::{decode_base64_pcm, AudioBuffer};
use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::gemini::GeminiClient;

pub struct SpeechClient {
    gemini: GeminiClient,
    model: String,
    voice: String,
    sample_rate: u32,
    channels: u16,
}

impl SpeechClient {
    pub fn new(gemini: GeminiClient, config: &SpeechConfig) -> Self {
        Self {
            gemini,
            model: config.model.clone(),
            voice: config.voice.clone(),
            sample_rate: config.sample_rate,
            channels: config.channels,
        }
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Synthesize `text` and decode it into a playable buffer.
    pub async fn synthesize(&self, text: &str) -> Result<AudioBuffer, SpeechError> {
        let t0 = Instant::now();
        let response = self
            .gemini
            .generate(&self.model, &request_body(text, &self.voice))
            .await?;

        let inline = response.inline_data().ok_or(SpeechError::NoAudio)?;
        debug!(
            "Speech payload: {} base64 chars ({})",
            inline.data.len(),
            inline.mime_type.as_deref().unwrap_or("no mime type")
        );

        let buffer = decode_base64_pcm(&inline.data, self.sample_rate, self.channels)?;
        info!(
            "Synthesized {:.1}s of speech in {}ms with voice {}",
            buffer.duration().as_secs_f64(),
            t0.elapsed().as_millis(),
            self.voice
        );
        Ok(buffer)
    }
}

pub fn request_body(text: &str, voice: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": format!("Say clearly in French: {text}") }] }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": voice } }
            }
        }
    })
}

//! Raw PCM decoding for synthesized speech.
//!
//! The speech model returns base64 of little-endian signed 16-bit samples,
//! interleaved when there is more than one channel.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::SpeechError;

/// Decoded, playable audio: interleaved f32 samples in [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }
}

/// base64 → bytes → i16 LE → f32 (divided by 32768).
pub fn decode_base64_pcm(
    data: &str,
    sample_rate: u32,
    channels: u16,
) -> Result<AudioBuffer, SpeechError> {
    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| SpeechError::MalformedAudio(format!("invalid base64: {e}")))?;
    pcm16_to_buffer(&bytes, sample_rate, channels)
}

pub fn pcm16_to_buffer(
    bytes: &[u8],
    sample_rate: u32,
    channels: u16,
) -> Result<AudioBuffer, SpeechError> {
    if bytes.is_empty() {
        return Err(SpeechError::NoAudio);
    }
    if bytes.len() % 2 != 0 {
        return Err(SpeechError::MalformedAudio(format!(
            "{} bytes is not a whole number of 16-bit samples",
            bytes.len()
        )));
    }

    let samples: Vec<f32> = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect();

    Ok(AudioBuffer {
        samples,
        sample_rate,
        channels: channels.max(1),
    })
}

//! Speech synthesis and playback.
//!
//! Components:
//! - `client`: Gemini TTS request returning base64 PCM
//! - `pcm`: base64 16-bit PCM → f32 audio buffer
//! - `player`: idle/loading/playing state machine over one output
//! - `output`: the audio sink (rodio with the `playback` feature)

pub mod client;
pub mod output;
pub mod pcm;
pub mod player;

pub use client::SpeechClient;
pub use output::{AudioOutput, UnavailableOutput};
pub use pcm::AudioBuffer;
pub use player::{PlaybackSpeed, SpeakOutcome, SpeechPlayer, SpeechRequest, SpeechState};

#[cfg(feature = "playback")]
pub use output::RodioOutput;

//! Single-slot speech playback state machine.
//!
//! IDLE → LOADING(text) → PLAYING(text) → IDLE
//!
//! Every request gets a ticket. A synthesis result is only played when its
//! ticket is still the active one, so a slow reply for an abandoned text is
//! dropped instead of talking over the current one.

use tracing::{debug, info};

use super::output::AudioOutput;
use super::pcm::AudioBuffer;
use crate::error::SpeechError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackSpeed {
    Half,
    Slow,
    #[default]
    Normal,
    Fast,
    Faster,
}

impl PlaybackSpeed {
    pub const ALL: [PlaybackSpeed; 5] = [
        Self::Half,
        Self::Slow,
        Self::Normal,
        Self::Fast,
        Self::Faster,
    ];

    pub fn multiplier(self) -> f32 {
        match self {
            Self::Half => 0.5,
            Self::Slow => 0.7,
            Self::Normal => 1.0,
            Self::Fast => 1.2,
            Self::Faster => 1.5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Half => "0.5x",
            Self::Slow => "0.7x",
            Self::Normal => "1x",
            Self::Fast => "1.2x",
            Self::Faster => "1.5x",
        }
    }

    /// Exact match on one of the offered multipliers.
    pub fn from_multiplier(value: f32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|speed| (speed.multiplier() - value).abs() < f32::EPSILON)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeechState {
    Idle,
    Loading {
        text: String,
        ticket: u64,
        speed: PlaybackSpeed,
    },
    Playing {
        text: String,
        ticket: u64,
    },
}

impl std::fmt::Display for SpeechState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Loading { ticket, .. } => write!(f, "LOADING#{ticket}"),
            Self::Playing { ticket, .. } => write!(f, "PLAYING#{ticket}"),
        }
    }
}

/// A synthesis call the caller must issue.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub ticket: u64,
    pub text: String,
}

/// What a `speak` call resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeakOutcome {
    /// Fetch audio for this request; the player is now loading.
    Fetch(SpeechRequest),
    /// The text was playing and has been stopped.
    Stopped,
    /// The text is already loading.
    Ignored,
}

#[derive(Debug)]
pub struct SpeechPlayer {
    state: SpeechState,
    speed: PlaybackSpeed,
    next_ticket: u64,
}

impl Default for SpeechPlayer {
    fn default() -> Self {
        Self::new(PlaybackSpeed::default())
    }
}

impl SpeechPlayer {
    pub fn new(speed: PlaybackSpeed) -> Self {
        Self {
            state: SpeechState::Idle,
            speed,
            next_ticket: 1,
        }
    }

    pub fn state(&self) -> &SpeechState {
        &self.state
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    /// Applies to the next request only.
    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
    }

    pub fn is_loading(&self, text: &str) -> bool {
        matches!(&self.state, SpeechState::Loading { text: t, .. } if t == text)
    }

    pub fn is_playing(&self, text: &str) -> bool {
        matches!(&self.state, SpeechState::Playing { text: t, .. } if t == text)
    }

    pub fn is_idle(&self) -> bool {
        self.state == SpeechState::Idle
    }

    /// User pressed the speech button for `text`.
    pub fn speak(&mut self, text: &str, output: &mut dyn AudioOutput) -> SpeakOutcome {
        if self.is_playing(text) {
            output.stop();
            info!("Speech: {} → IDLE (toggled off)", self.state);
            self.state = SpeechState::Idle;
            return SpeakOutcome::Stopped;
        }
        if self.is_loading(text) {
            return SpeakOutcome::Ignored;
        }

        if matches!(self.state, SpeechState::Playing { .. }) {
            output.stop();
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.state = SpeechState::Loading {
            text: text.to_string(),
            ticket,
            speed: self.speed,
        };
        info!("Speech: → {} ({} chars)", self.state, text.chars().count());

        SpeakOutcome::Fetch(SpeechRequest {
            ticket,
            text: text.to_string(),
        })
    }

    /// A synthesis call finished. Returns the error to surface, if this
    /// result belongs to the active request and it failed.
    pub fn on_audio(
        &mut self,
        ticket: u64,
        result: Result<AudioBuffer, SpeechError>,
        output: &mut dyn AudioOutput,
    ) -> Result<(), SpeechError> {
        let (text, speed) = match &self.state {
            SpeechState::Loading {
                text,
                ticket: active,
                speed,
            } if *active == ticket => (text.clone(), *speed),
            _ => {
                debug!("Dropping stale speech result #{ticket} (state {})", self.state);
                return Ok(());
            }
        };

        let started = result.and_then(|buffer| {
            debug!("Playing {:.1}s of speech at {}", buffer.duration().as_secs_f64(), speed.label());
            output.play(buffer, speed.multiplier())
        });

        match started {
            Ok(()) => {
                self.state = SpeechState::Playing { text, ticket };
                info!("Speech: LOADING#{ticket} → {}", self.state);
                Ok(())
            }
            Err(e) => {
                self.state = SpeechState::Idle;
                Err(e)
            }
        }
    }

    /// Poll the output; playing → idle once it has drained.
    pub fn tick(&mut self, output: &dyn AudioOutput) {
        if matches!(self.state, SpeechState::Playing { .. }) && output.is_finished() {
            debug!("Speech: {} → IDLE (finished)", self.state);
            self.state = SpeechState::Idle;
        }
    }

    /// Stop whatever is playing and forget any pending request.
    pub fn stop(&mut self, output: &mut dyn AudioOutput) {
        output.stop();
        self.state = SpeechState::Idle;
    }
}

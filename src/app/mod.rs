//! Application state and the controller that drives it.
//!
//! The UI never mutates state directly: it renders from [`AppState`] and
//! emits [`Action`]s, which [`Controller::dispatch`] applies.

pub mod controller;
pub mod state;

pub use controller::{AppEvent, Controller};
pub use state::{AppState, RequestStatus, ResultPane, FALLBACK_ERROR};

use crate::speech::PlaybackSpeed;

/// Every interaction the presentation layer can trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    EditText(String),
    Submit,
    SelectHistory(String),
    DeleteHistory(String),
    RequestClearHistory,
    ResolveClearHistory(bool),
    ToggleSegment(usize),
    CloseSegmentPanel,
    Speak(String),
    SetSpeed(PlaybackSpeed),
    DismissSpeechAlert,
}

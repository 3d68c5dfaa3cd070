//! latelier: French diary translation with grammar breakdown and speech.
//!
//! A diary entry goes to the analysis model, the structured result is kept in
//! a capped local history, and any French fragment of it can be read aloud
//! through the speech model.

pub mod analysis;
pub mod app;
pub mod config;
pub mod error;
pub mod gemini;
pub mod history;
pub mod model;
pub mod speech;

#[cfg(feature = "gui")]
pub mod ui;

pub use app::{Action, AppState, Controller, RequestStatus};
pub use config::Config;
pub use error::{AnalysisError, GeminiError, SpeechError};
pub use history::{HistoryItem, HistoryStore};
pub use model::DiaryAnalysis;

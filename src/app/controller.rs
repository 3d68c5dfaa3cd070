//! Bridges UI actions to the network collaborators.
//!
//! The controller lives on the UI thread with the state it owns. Analysis
//! and synthesis calls run as tokio tasks; their results come back over a
//! channel and are folded into state by [`Controller::poll`].

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::state::AppState;
use super::Action;
use crate::analysis::AnalysisClient;
use crate::config::Config;
use crate::error::{AnalysisError, GeminiError, SpeechError};
use crate::gemini::GeminiClient;
use crate::history::HistoryStore;
use crate::model::DiaryAnalysis;
use crate::speech::{
    AudioBuffer, AudioOutput, PlaybackSpeed, SpeakOutcome, SpeechClient, SpeechPlayer,
};

/// Completion of a background call.
#[derive(Debug)]
pub enum AppEvent {
    AnalysisFinished {
        original_text: String,
        result: Result<DiaryAnalysis, AnalysisError>,
    },
    SpeechFetched {
        ticket: u64,
        result: Result<AudioBuffer, SpeechError>,
    },
}

pub struct Controller {
    state: AppState,
    output: Box<dyn AudioOutput>,
    analysis: Arc<AnalysisClient>,
    speech: Arc<SpeechClient>,
    runtime: Handle,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl Controller {
    pub fn new(
        config: &Config,
        history: HistoryStore,
        output: Box<dyn AudioOutput>,
        runtime: Handle,
    ) -> Result<Self, GeminiError> {
        let gemini = GeminiClient::new(&config.gemini)?;
        let analysis = AnalysisClient::new(gemini.clone(), &config.analysis);
        let speech = SpeechClient::new(gemini, &config.speech);

        let speed = PlaybackSpeed::from_multiplier(config.speech.default_speed).unwrap_or_else(|| {
            warn!(
                "Unsupported default speed {}, using {}",
                config.speech.default_speed,
                PlaybackSpeed::default().label()
            );
            PlaybackSpeed::default()
        });

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        info!(
            "Controller ready (analysis: {}, voice: {}, {} history items)",
            analysis.model(),
            speech.voice(),
            history.len()
        );

        Ok(Self {
            state: AppState::new(history, SpeechPlayer::new(speed)),
            output,
            analysis: Arc::new(analysis),
            speech: Arc::new(speech),
            runtime,
            events_tx,
            events_rx,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// True while a call is in flight or audio is playing.
    pub fn is_busy(&self) -> bool {
        self.state.is_submitting() || !self.state.speech().is_idle()
    }

    pub fn dispatch(&mut self, action: Action) {
        debug!("Action: {action:?}");
        match action {
            Action::EditText(text) => self.state.set_diary_text(text),
            Action::Submit => self.submit(),
            Action::SelectHistory(id) => {
                self.state.select_history(&id);
            }
            Action::DeleteHistory(id) => self.state.delete_history(&id),
            Action::RequestClearHistory => self.state.request_clear(),
            Action::ResolveClearHistory(confirmed) => self.state.resolve_clear(confirmed),
            Action::ToggleSegment(index) => self.state.toggle_segment(index),
            Action::CloseSegmentPanel => self.state.close_segment_panel(),
            Action::Speak(text) => self.speak(&text),
            Action::SetSpeed(speed) => self.state.speech_mut().set_speed(speed),
            Action::DismissSpeechAlert => self.state.dismiss_speech_alert(),
        }
    }

    fn submit(&mut self) {
        let Some(text) = self.state.begin_submit() else {
            return;
        };

        let client = self.analysis.clone();
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = client.analyze(&text).await;
            let _ = tx.send(AppEvent::AnalysisFinished {
                original_text: text,
                result,
            });
        });
    }

    fn speak(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let outcome = self.state.speech_mut().speak(text, self.output.as_mut());
        let SpeakOutcome::Fetch(request) = outcome else {
            return;
        };

        let client = self.speech.clone();
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = client.synthesize(&request.text).await;
            let _ = tx.send(AppEvent::SpeechFetched {
                ticket: request.ticket,
                result,
            });
        });
    }

    /// Apply finished calls and advance playback. Returns the number of events applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        self.state.speech_mut().tick(self.output.as_ref());
        applied
    }

    fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::AnalysisFinished {
                original_text,
                result,
            } => self.state.finish_submit(original_text, result),
            AppEvent::SpeechFetched { ticket, result } => {
                let outcome = self
                    .state
                    .speech_mut()
                    .on_audio(ticket, result, self.output.as_mut());
                if let Err(e) = outcome {
                    warn!("Speech failed: {e}");
                    self.state
                        .show_speech_alert(format!("Erreur de synthèse vocale: {e}"));
                }
            }
        }
    }
}

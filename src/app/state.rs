//! Application state and its update operations.
//!
//! Everything the UI shows is derived from [`AppState`]; every user-visible
//! change goes through one of its methods.

use tracing::{info, warn};

use crate::error::AnalysisError;
use crate::history::{HistoryItem, HistoryStore};
use crate::model::{DiaryAnalysis, SentenceSegment};
use crate::speech::SpeechPlayer;

pub const FALLBACK_ERROR: &str = "Désolé, une erreur est survenue.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestStatus {
    Idle,
    Loading,
    Success,
    Error(String),
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Loading => write!(f, "LOADING"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Error(_) => write!(f, "ERROR"),
        }
    }
}

/// Whether the view still waits on the analysis call in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingSubmit {
    Shown,
    /// The user moved to another entry or reset the view; the result only
    /// goes to history.
    Detached,
}

/// What the result pane shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultPane<'a> {
    Loading,
    Analysis(&'a DiaryAnalysis),
    Placeholder,
}

#[derive(Debug)]
pub struct AppState {
    diary_text: String,
    analysis: Option<DiaryAnalysis>,
    status: RequestStatus,
    history: HistoryStore,
    active_history_id: Option<String>,
    selected_segment: Option<usize>,
    clear_pending: bool,
    pending_submit: Option<PendingSubmit>,
    speech: SpeechPlayer,
    speech_alert: Option<String>,
}

impl AppState {
    pub fn new(history: HistoryStore, speech: SpeechPlayer) -> Self {
        Self {
            diary_text: String::new(),
            analysis: None,
            status: RequestStatus::Idle,
            history,
            active_history_id: None,
            selected_segment: None,
            clear_pending: false,
            pending_submit: None,
            speech,
            speech_alert: None,
        }
    }

    pub fn diary_text(&self) -> &str {
        &self.diary_text
    }

    pub fn analysis(&self) -> Option<&DiaryAnalysis> {
        self.analysis.as_ref()
    }

    pub fn status(&self) -> &RequestStatus {
        &self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            RequestStatus::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn active_history_id(&self) -> Option<&str> {
        self.active_history_id.as_deref()
    }

    pub fn speech(&self) -> &SpeechPlayer {
        &self.speech
    }

    pub fn speech_mut(&mut self) -> &mut SpeechPlayer {
        &mut self.speech
    }

    pub fn speech_alert(&self) -> Option<&str> {
        self.speech_alert.as_deref()
    }

    pub fn clear_pending(&self) -> bool {
        self.clear_pending
    }

    pub fn is_loading(&self) -> bool {
        self.status == RequestStatus::Loading
    }

    /// True from `begin_submit` until its result arrives, even when the
    /// view has moved on.
    pub fn is_submitting(&self) -> bool {
        self.pending_submit.is_some()
    }

    pub fn can_submit(&self) -> bool {
        !self.is_submitting() && !self.diary_text.trim().is_empty()
    }

    pub fn result_pane(&self) -> ResultPane<'_> {
        match (&self.status, &self.analysis) {
            (RequestStatus::Loading, _) => ResultPane::Loading,
            (RequestStatus::Success | RequestStatus::Error(_), Some(analysis)) => {
                ResultPane::Analysis(analysis)
            }
            _ => ResultPane::Placeholder,
        }
    }

    /// Edit the diary text. Never resubmits. Text that no longer matches the
    /// selected history entry detaches the selection; the analysis stays shown.
    pub fn set_diary_text(&mut self, text: impl Into<String>) {
        self.diary_text = text.into();

        let detached = self
            .active_history_id
            .as_deref()
            .and_then(|id| self.history.get(id))
            .is_some_and(|item| item.original_text != self.diary_text);
        if detached {
            self.active_history_id = None;
        }
    }

    /// Move to loading and hand back the text to analyze, if submitting is allowed.
    pub fn begin_submit(&mut self) -> Option<String> {
        if !self.can_submit() {
            return None;
        }
        info!("Request: {} → LOADING", self.status);
        self.status = RequestStatus::Loading;
        self.pending_submit = Some(PendingSubmit::Shown);
        self.active_history_id = None;
        self.selected_segment = None;
        Some(self.diary_text.clone())
    }

    pub fn finish_submit(
        &mut self,
        original_text: String,
        result: Result<DiaryAnalysis, AnalysisError>,
    ) {
        match self.pending_submit.take() {
            Some(PendingSubmit::Shown) => {}
            Some(PendingSubmit::Detached) => {
                match result {
                    Ok(analysis) => {
                        self.history.append(HistoryItem::new(original_text, analysis));
                        info!("Background analysis saved ({} in history)", self.history.len());
                    }
                    Err(e) => warn!("Background analysis failed: {e}"),
                }
                return;
            }
            None => {
                warn!("Dropping analysis result with no submit in flight");
                return;
            }
        }

        match result {
            Ok(analysis) => {
                let item = HistoryItem::new(original_text, analysis.clone());
                self.active_history_id = Some(item.id.clone());
                self.history.append(item);
                self.analysis = Some(analysis);
                self.selected_segment = None;
                self.status = RequestStatus::Success;
                info!("Request: LOADING → SUCCESS ({} in history)", self.history.len());
            }
            Err(e) => {
                warn!("Analysis failed: {e}");
                let message = e.to_string();
                let message = if message.trim().is_empty() {
                    FALLBACK_ERROR.to_string()
                } else {
                    message
                };
                self.status = RequestStatus::Error(message);
            }
        }
    }

    /// Show a past entry. Returns false for an unknown id.
    pub fn select_history(&mut self, id: &str) -> bool {
        let Some(item) = self.history.get(id) else {
            return false;
        };
        self.diary_text = item.original_text.clone();
        self.analysis = Some(item.analysis.clone());
        self.active_history_id = Some(item.id.clone());
        self.selected_segment = None;
        self.status = RequestStatus::Success;
        self.detach_submit();
        true
    }

    pub fn delete_history(&mut self, id: &str) {
        if !self.history.remove(id) {
            return;
        }
        if self.active_history_id.as_deref() == Some(id) {
            self.reset_view();
        }
    }

    /// Ask for confirmation before wiping history.
    pub fn request_clear(&mut self) {
        if !self.history.is_empty() {
            self.clear_pending = true;
        }
    }

    /// Answer the confirmation. Declining leaves everything untouched.
    pub fn resolve_clear(&mut self, confirmed: bool) {
        if !std::mem::take(&mut self.clear_pending) || !confirmed {
            return;
        }
        info!("Clearing {} history items", self.history.len());
        self.history.clear();
        self.reset_view();
    }

    fn reset_view(&mut self) {
        self.analysis = None;
        self.diary_text.clear();
        self.active_history_id = None;
        self.selected_segment = None;
        self.status = RequestStatus::Idle;
        self.detach_submit();
    }

    fn detach_submit(&mut self) {
        if let Some(pending) = self.pending_submit.as_mut() {
            *pending = PendingSubmit::Detached;
        }
    }

    pub fn selected_segment_index(&self) -> Option<usize> {
        self.selected_segment
    }

    pub fn selected_segment(&self) -> Option<&SentenceSegment> {
        let index = self.selected_segment?;
        self.analysis.as_ref()?.segmented_text.get(index)
    }

    /// Open a segment's detail panel, or close it when it is already open.
    pub fn toggle_segment(&mut self, index: usize) {
        let exists = self
            .analysis
            .as_ref()
            .is_some_and(|a| index < a.segmented_text.len());
        self.selected_segment = match self.selected_segment {
            Some(open) if open == index => None,
            _ if exists => Some(index),
            current => current,
        };
    }

    pub fn close_segment_panel(&mut self) {
        self.selected_segment = None;
    }

    pub fn show_speech_alert(&mut self, message: impl Into<String>) {
        self.speech_alert = Some(message.into());
    }

    pub fn dismiss_speech_alert(&mut self) {
        self.speech_alert = None;
    }
}

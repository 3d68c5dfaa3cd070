mod common;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use common::{MockGemini, Reply};
use latelier::app::ResultPane;
use latelier::history::HistoryStore;
use latelier::speech::{AudioBuffer, AudioOutput, UnavailableOutput};
use latelier::{Action, Controller, RequestStatus, SpeechError};
use tokio::runtime::Handle;

const ENTRY: &str = "我今天去咖啡店看书。";

#[derive(Debug, Default)]
struct OutputLog {
    played: Vec<(usize, f32)>,
    stops: usize,
    playing: bool,
}

/// Output whose playback only ends when a test says so.
#[derive(Clone, Default)]
struct SharedOutput(Arc<Mutex<OutputLog>>);

impl SharedOutput {
    fn log(&self) -> std::sync::MutexGuard<'_, OutputLog> {
        self.0.lock().unwrap()
    }
}

impl AudioOutput for SharedOutput {
    fn play(&mut self, buffer: AudioBuffer, speed: f32) -> Result<(), SpeechError> {
        let mut log = self.log();
        log.played.push((buffer.frames(), speed));
        log.playing = true;
        Ok(())
    }

    fn stop(&mut self) {
        let mut log = self.log();
        log.stops += 1;
        log.playing = false;
    }

    fn is_finished(&self) -> bool {
        !self.log().playing
    }
}

fn controller(mock: &MockGemini, dir: &tempfile::TempDir, output: SharedOutput) -> Controller {
    let history = HistoryStore::load(dir.path().join("history.json"));
    Controller::new(&mock.config(), history, Box::new(output), Handle::current()).unwrap()
}

async fn wait_for(controller: &mut Controller, done: impl Fn(&Controller) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        controller.poll();
        if done(controller) {
            return;
        }
        assert!(Instant::now() < deadline, "timed out waiting for controller");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn submit_records_first_history_entry() {
    let mock = MockGemini::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut controller = controller(&mock, &dir, SharedOutput::default());

    controller.dispatch(Action::EditText(ENTRY.into()));
    controller.dispatch(Action::Submit);
    assert!(controller.state().is_loading());
    assert!(matches!(controller.state().result_pane(), ResultPane::Loading));

    // A second submit while loading is refused.
    controller.dispatch(Action::Submit);

    wait_for(&mut controller, |c| !c.state().is_loading()).await;

    let state = controller.state();
    assert_eq!(state.status(), &RequestStatus::Success);
    assert_eq!(state.history().len(), 1);
    let item = &state.history().items()[0];
    assert_eq!(item.original_text, ENTRY);
    assert_eq!(state.active_history_id(), Some(item.id.as_str()));
    assert_eq!(mock.calls().len(), 1);

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("history.json")).unwrap())
            .unwrap();
    assert_eq!(saved[0]["originalText"], ENTRY);

    let reloaded = HistoryStore::load(dir.path().join("history.json"));
    assert_eq!(reloaded.items()[0].id, item.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_analysis_keeps_history() {
    let mock = MockGemini::start().await;
    mock.set_analysis(Reply::Error(503, "The model is overloaded".into()));
    let dir = tempfile::tempdir().unwrap();
    let mut controller = controller(&mock, &dir, SharedOutput::default());

    controller.dispatch(Action::EditText(ENTRY.into()));
    controller.dispatch(Action::Submit);
    wait_for(&mut controller, |c| !c.state().is_loading()).await;

    let state = controller.state();
    assert!(state.error_message().unwrap().contains("The model is overloaded"));
    assert!(state.history().is_empty());
    assert!(state.can_submit());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn double_click_while_loading_fetches_once() {
    let mock = MockGemini::start().await;
    let dir = tempfile::tempdir().unwrap();
    let output = SharedOutput::default();
    let mut controller = controller(&mock, &dir, output.clone());

    controller.dispatch(Action::Speak("Bonjour".into()));
    controller.dispatch(Action::Speak("Bonjour".into()));
    assert!(controller.state().speech().is_loading("Bonjour"));

    wait_for(&mut controller, |c| c.state().speech().is_playing("Bonjour")).await;
    assert_eq!(mock.speech_calls().len(), 1);
    assert_eq!(output.log().played.len(), 1);

    // Clicking the playing text stops it without a new call.
    controller.dispatch(Action::Speak("Bonjour".into()));
    assert!(controller.state().speech().is_idle());
    assert!(!output.log().playing);
    assert_eq!(output.log().stops, 1);
    assert_eq!(mock.speech_calls().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn switching_text_drops_earlier_audio() {
    let mock = MockGemini::start().await;
    let dir = tempfile::tempdir().unwrap();
    let output = SharedOutput::default();
    let mut controller = controller(&mock, &dir, output.clone());

    controller.dispatch(Action::SetSpeed(latelier::speech::PlaybackSpeed::Slow));
    controller.dispatch(Action::Speak("le café".into()));
    controller.dispatch(Action::Speak("lire".into()));
    assert!(controller.state().speech().is_loading("lire"));

    wait_for(&mut controller, |c| c.state().speech().is_playing("lire")).await;
    // Let the earlier reply land too.
    tokio::time::sleep(Duration::from_millis(200)).await;
    controller.poll();

    assert_eq!(mock.speech_calls().len(), 2);
    assert!(controller.state().speech().is_playing("lire"));
    let played = output.log().played.clone();
    assert_eq!(played.len(), 1);
    assert_eq!(played[0].1, 0.7);

    // Playback ending on its own returns the player to idle.
    output.log().playing = false;
    controller.poll();
    assert!(controller.state().speech().is_idle());
    assert!(!controller.is_busy());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn speech_failure_raises_alert() {
    let mock = MockGemini::start().await;
    mock.set_speech(Reply::Json(common::text_reply("no audio here")));
    let dir = tempfile::tempdir().unwrap();
    let mut controller = controller(&mock, &dir, SharedOutput::default());

    controller.dispatch(Action::Speak("Bonjour".into()));
    wait_for(&mut controller, |c| c.state().speech_alert().is_some()).await;

    let alert = controller.state().speech_alert().unwrap();
    assert!(alert.contains("No audio data received from the AI model."));
    assert!(controller.state().speech().is_idle());

    controller.dispatch(Action::DismissSpeechAlert);
    assert!(controller.state().speech_alert().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_audio_device_raises_alert() {
    let mock = MockGemini::start().await;
    let dir = tempfile::tempdir().unwrap();
    let history = HistoryStore::load(dir.path().join("history.json"));
    let output = UnavailableOutput::new("no default output device");
    let mut controller =
        Controller::new(&mock.config(), history, Box::new(output), Handle::current()).unwrap();

    controller.dispatch(Action::Speak("Bonjour".into()));
    wait_for(&mut controller, |c| c.state().speech_alert().is_some()).await;

    let alert = controller.state().speech_alert().unwrap();
    assert!(alert.starts_with("Erreur de synthèse vocale"));
    assert!(alert.contains("no audio output device"));
    assert!(controller.state().speech().is_idle());
    assert!(!controller.is_busy());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn opening_history_mid_submit_keeps_the_selection() {
    let mock = MockGemini::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut controller = controller(&mock, &dir, SharedOutput::default());

    controller.dispatch(Action::EditText(ENTRY.into()));
    controller.dispatch(Action::Submit);
    wait_for(&mut controller, |c| !c.state().is_submitting()).await;
    let old = controller.state().history().items()[0].id.clone();

    controller.dispatch(Action::EditText("Il pleut.".into()));
    controller.dispatch(Action::Submit);
    controller.dispatch(Action::SelectHistory(old.clone()));
    assert!(controller.is_busy());
    controller.dispatch(Action::Submit);

    wait_for(&mut controller, |c| !c.state().is_submitting()).await;

    let state = controller.state();
    assert_eq!(mock.calls().len(), 2);
    assert_eq!(state.active_history_id(), Some(old.as_str()));
    assert_eq!(state.diary_text(), ENTRY);
    assert_eq!(state.history().len(), 2);
    assert_eq!(state.history().items()[0].original_text, "Il pleut.");
}

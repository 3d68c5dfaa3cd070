//! The single audio output shared by every speech button.
//!
//! At most one buffer plays at a time: `play` replaces whatever is playing.

use super::pcm::AudioBuffer;
use crate::error::SpeechError;

pub trait AudioOutput {
    /// Start playing `buffer` at `speed`, stopping anything already playing.
    fn play(&mut self, buffer: AudioBuffer, speed: f32) -> Result<(), SpeechError>;

    /// Stop immediately. No-op when idle.
    fn stop(&mut self);

    /// True once the last started buffer has been fully played or stopped.
    fn is_finished(&self) -> bool;
}

/// Stand-in when no audio device could be opened. Every `play` fails, so
/// the caller surfaces the problem instead of pretending to speak.
#[derive(Debug, Clone)]
pub struct UnavailableOutput {
    reason: String,
}

impl UnavailableOutput {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl AudioOutput for UnavailableOutput {
    fn play(&mut self, _buffer: AudioBuffer, _speed: f32) -> Result<(), SpeechError> {
        Err(SpeechError::Playback(format!(
            "no audio output device ({})",
            self.reason
        )))
    }

    fn stop(&mut self) {}

    fn is_finished(&self) -> bool {
        true
    }
}

#[cfg(feature = "playback")]
pub use rodio_output::RodioOutput;

#[cfg(feature = "playback")]
mod rodio_output {
    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, OutputStreamBuilder, Sink};
    use tracing::info;

    use super::{AudioBuffer, AudioOutput};
    use crate::error::SpeechError;

    /// rodio-backed output. The stream stays open for the process lifetime.
    pub struct RodioOutput {
        stream: OutputStream,
        sink: Option<Sink>,
    }

    impl RodioOutput {
        pub fn open() -> Result<Self, SpeechError> {
            let stream = OutputStreamBuilder::open_default_stream()
                .map_err(|e| SpeechError::Playback(format!("Failed to open audio output: {e}")))?;
            info!("Audio output opened");
            Ok(Self { stream, sink: None })
        }
    }

    impl AudioOutput for RodioOutput {
        fn play(&mut self, buffer: AudioBuffer, speed: f32) -> Result<(), SpeechError> {
            self.stop();

            let sink = Sink::connect_new(self.stream.mixer());
            sink.set_speed(speed);
            sink.append(SamplesBuffer::new(
                buffer.channels,
                buffer.sample_rate,
                buffer.samples,
            ));
            self.sink = Some(sink);
            Ok(())
        }

        fn stop(&mut self) {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
        }

        fn is_finished(&self) -> bool {
            self.sink.as_ref().map_or(true, Sink::empty)
        }
    }
}

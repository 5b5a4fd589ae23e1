//! `SpeechEngine` trait, speech events and the playback guard.

use tokio::task::JoinHandle;

use crate::error::PracticeError;
use crate::speech::voice::Voice;

/// Identifies one call to [`SpeechEngine::speak`].
pub type UtteranceId = u64;

// ---------------------------------------------------------------------------
// SpeechEvent
// ---------------------------------------------------------------------------

/// Progress report for one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechEvent {
    pub utterance: UtteranceId,
    pub kind: SpeechEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEventKind {
    Started,
    /// The synthesizer reached the word starting at `char_index` of the
    /// spoken text.
    Boundary { char_index: usize },
    Ended,
    Failed(String),
}

impl SpeechEvent {
    pub fn new(utterance: UtteranceId, kind: SpeechEventKind) -> Self {
        Self { utterance, kind }
    }

    /// `true` for `Ended` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, SpeechEventKind::Ended | SpeechEventKind::Failed(_))
    }
}

// ---------------------------------------------------------------------------
// PlaybackHandle
// ---------------------------------------------------------------------------

/// RAII guard for one utterance.
///
/// Dropping it aborts the playback task, which kills the synthesizer
/// process.  No further events are sent for the utterance after that,
/// though ones already queued may still be delivered.
#[derive(Debug)]
pub struct PlaybackHandle {
    utterance: UtteranceId,
    task: Option<JoinHandle<()>>,
}

impl PlaybackHandle {
    pub fn new(utterance: UtteranceId, task: JoinHandle<()>) -> Self {
        Self {
            utterance,
            task: Some(task),
        }
    }

    /// A handle with nothing behind it, for engines that play synchronously
    /// or test doubles.
    pub fn detached(utterance: UtteranceId) -> Self {
        Self {
            utterance,
            task: None,
        }
    }

    pub fn utterance(&self) -> UtteranceId {
        self.utterance
    }

    /// Stop playback now.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                log::debug!("speech: cancelling utterance {}", self.utterance);
            }
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechEngine trait
// ---------------------------------------------------------------------------

/// Text-to-speech backend.
///
/// `speak` returns as soon as playback has been scheduled; progress arrives
/// as [`SpeechEvent`]s on the channel the engine was built with.
pub trait SpeechEngine {
    /// Voices this engine can speak with.
    fn voices(&self) -> Vec<Voice>;

    /// Start speaking `text`.  `voice` is a [`Voice::id`]; `None` uses the
    /// engine's default.
    fn speak(
        &self,
        utterance: UtteranceId,
        text: &str,
        voice: Option<&str>,
    ) -> Result<PlaybackHandle, PracticeError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

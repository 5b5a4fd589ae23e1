//! Practice controller: the single owner of the session's state.
//!
//! [`PracticeController`] lives on the UI thread.  Device adapters are passed
//! in per call (`&dyn SpeechEngine`, `&dyn Microphone`) and the LLM contracts
//! are split into `begin_*` (build the request, mark it in flight) and
//! `complete_*` (apply the answer), so the controller never blocks and
//! never awaits.
//!
//! Every failure is returned to the caller *and* queued as a [`Notice`]; the
//! UI only has to drain [`PracticeController::drain_notices`].

use std::collections::VecDeque;

use crate::audio::{ActiveRecording, Microphone, RecorderEvent, RecordingArtifact};
use crate::error::PracticeError;
use crate::llm::GenerationRequest;
use crate::scoring::{ScoringRequest, ScoringResult};
use crate::session::highlight::{merge_highlights, WordHighlight};
use crate::session::state::{Notice, PracticeState};
use crate::speech::{PlaybackHandle, SpeechEngine, SpeechEvent, SpeechEventKind, UtteranceId};
use crate::text::{sentences_or_whole, token_at_char, tokenize};

/// Correlates a `begin_*` call with its `complete_*` call.
pub type Ticket = u64;

/// An utterance being spoken for the current sentence.
struct ActivePlayback {
    handle: PlaybackHandle,
    /// What was passed to the synthesizer.
    text: String,
    /// Sentence token index of `text`'s first token.
    base_token: usize,
    /// Sentence token index reached so far.
    spoken: Option<usize>,
}

// ---------------------------------------------------------------------------
// PracticeController
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct PracticeController {
    sentences: Vec<String>,
    index: usize,

    recording: Option<Box<dyn ActiveRecording>>,
    artifact: Option<RecordingArtifact>,
    result: Option<ScoringResult>,
    playback: Option<ActivePlayback>,

    pending_scoring: Option<Ticket>,
    pending_generation: Option<Ticket>,
    next_ticket: Ticket,
    next_utterance: UtteranceId,

    voice: Option<String>,
    notices: VecDeque<Notice>,
}

impl PracticeController {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn state(&self) -> PracticeState {
        if self.sentences.is_empty() {
            PracticeState::Idle
        } else if self.recording.is_some() {
            PracticeState::Recording
        } else if self.pending_scoring.is_some() {
            PracticeState::Scoring
        } else if self.playback.is_some() {
            PracticeState::Listening
        } else if self.result.is_some() {
            PracticeState::Scored
        } else {
            PracticeState::Browsing
        }
    }

    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_sentence(&self) -> Option<&str> {
        self.sentences.get(self.index).map(String::as_str)
    }

    pub fn artifact(&self) -> Option<&RecordingArtifact> {
        self.artifact.as_ref()
    }

    pub fn result(&self) -> Option<&ScoringResult> {
        self.result.as_ref()
    }

    pub fn is_generating(&self) -> bool {
        self.pending_generation.is_some()
    }

    pub fn is_listening(&self) -> bool {
        self.playback.is_some()
    }

    /// Seconds captured by the live recording, if any.
    pub fn recording_secs(&self) -> Option<f32> {
        self.recording.as_ref().map(|r| r.elapsed_secs())
    }

    pub fn can_go_prev(&self) -> bool {
        !self.state().is_busy() && self.index > 0
    }

    pub fn can_go_next(&self) -> bool {
        !self.state().is_busy() && self.index + 1 < self.sentences.len()
    }

    pub fn voice(&self) -> Option<&str> {
        self.voice.as_deref()
    }

    pub fn set_voice(&mut self, voice: Option<String>) {
        self.voice = voice;
    }

    /// Tokens of the current sentence with their display highlight.
    pub fn highlighted_words(&self) -> Vec<WordHighlight> {
        let Some(sentence) = self.current_sentence() else {
            return Vec::new();
        };
        let spoken = self.playback.as_ref().and_then(|p| p.spoken);
        merge_highlights(sentence, spoken, self.result.as_ref())
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    // -----------------------------------------------------------------------
    // Text & navigation
    // -----------------------------------------------------------------------

    /// Segment `text` and select its first sentence.  Blank text clears the
    /// practice area.  Returns the number of sentences loaded.
    pub fn load_text(&mut self, text: &str) -> Result<usize, PracticeError> {
        if self.state().is_busy() {
            return self.refuse(PracticeError::InvalidAction(
                "finish recording or wait for the analysis before loading new text".into(),
            ));
        }

        self.stop_listening();
        self.sentences = sentences_or_whole(text);
        self.index = 0;
        self.discard_attempt();

        let count = self.sentences.len();
        log::debug!("session: loaded {count} sentence(s)");
        if count == 0 {
            self.notify(Notice::info("Text Cleared", "Practice area reset."));
        } else {
            self.notify(Notice::info(
                "Text Processed",
                format!("Found {count} sentence(s)."),
            ));
        }
        Ok(count)
    }

    /// Move to the next sentence.  `Ok(false)` at the end of the list.
    pub fn next(&mut self) -> Result<bool, PracticeError> {
        self.navigate(1)
    }

    /// Move to the previous sentence.  `Ok(false)` at the start of the list.
    pub fn prev(&mut self) -> Result<bool, PracticeError> {
        self.navigate(-1)
    }

    fn navigate(&mut self, step: isize) -> Result<bool, PracticeError> {
        if self.state().is_busy() {
            return self.refuse(PracticeError::InvalidAction(
                "finish recording or wait for the analysis before changing sentence".into(),
            ));
        }
        let Some(target) = self.index.checked_add_signed(step) else {
            return Ok(false);
        };
        if target >= self.sentences.len() {
            return Ok(false);
        }

        self.stop_listening();
        self.discard_attempt();
        self.index = target;
        log::debug!("session: sentence {} of {}", target + 1, self.sentences.len());
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Speech
    // -----------------------------------------------------------------------

    /// Speak the current sentence, replacing any playback in progress.  A
    /// live recording is stopped and kept first.
    pub fn start_listening(&mut self, engine: &dyn SpeechEngine) -> Result<(), PracticeError> {
        let Some(sentence) = self.current_sentence().map(str::to_string) else {
            return self.refuse(PracticeError::InvalidAction("there is no sentence to listen to".into()));
        };
        self.speak(engine, sentence, 0)
    }

    /// Speak a single token of the current sentence.
    pub fn listen_word(
        &mut self,
        engine: &dyn SpeechEngine,
        token_index: usize,
    ) -> Result<(), PracticeError> {
        let word = self
            .current_sentence()
            .and_then(|s| tokenize(s).get(token_index).map(|w| w.to_string()));
        let Some(word) = word else {
            return self.refuse(PracticeError::InvalidAction("there is no such word to listen to".into()));
        };
        self.speak(engine, word, token_index)
    }

    fn speak(
        &mut self,
        engine: &dyn SpeechEngine,
        text: String,
        base_token: usize,
    ) -> Result<(), PracticeError> {
        self.stop_listening();
        if self.recording.is_some() {
            self.stop_recording()?;
        }

        self.next_utterance += 1;
        let utterance = self.next_utterance;
        match engine.speak(utterance, &text, self.voice.as_deref()) {
            Ok(handle) => {
                self.playback = Some(ActivePlayback {
                    handle,
                    text,
                    base_token,
                    spoken: None,
                });
                Ok(())
            }
            Err(e) => self.refuse(e),
        }
    }

    /// Cancel playback.  Events still queued for it are ignored.
    pub fn stop_listening(&mut self) {
        if let Some(playback) = self.playback.take() {
            playback.handle.cancel();
        }
    }

    /// Apply one event from the speech engine.
    pub fn on_speech_event(&mut self, event: SpeechEvent) {
        let Some(playback) = self
            .playback
            .as_mut()
            .filter(|p| p.handle.utterance() == event.utterance)
        else {
            log::debug!("session: ignoring event for stale utterance {}", event.utterance);
            return;
        };

        let terminal = event.is_terminal();
        match event.kind {
            SpeechEventKind::Boundary { char_index } => {
                if let Some(token) = token_at_char(&playback.text, char_index) {
                    playback.spoken = Some(playback.base_token + token);
                }
            }
            SpeechEventKind::Failed(detail) => {
                log::warn!("session: speech failed: {detail}");
                self.notify_error(&PracticeError::SpeechUnavailable(detail));
            }
            SpeechEventKind::Started | SpeechEventKind::Ended => {}
        }
        if terminal {
            self.playback = None;
        }
    }

    // -----------------------------------------------------------------------
    // Recording
    // -----------------------------------------------------------------------

    /// Open the microphone for the current sentence, discarding any earlier
    /// recording and result.  Playback is cancelled first.
    pub fn start_recording(&mut self, mic: &dyn Microphone) -> Result<(), PracticeError> {
        if self.current_sentence().is_none() {
            return self.refuse(PracticeError::InvalidAction("there is no sentence to record".into()));
        }
        match self.state() {
            PracticeState::Recording => {
                return self.refuse(PracticeError::InvalidAction("already recording".into()));
            }
            PracticeState::Scoring => {
                return self.refuse(PracticeError::InvalidAction(
                    "wait for the analysis to finish before recording again".into(),
                ));
            }
            _ => {}
        }

        self.stop_listening();
        self.discard_attempt();

        match mic.start() {
            Ok(recording) => {
                self.recording = Some(recording);
                log::debug!("session: recording sentence {}", self.index + 1);
                self.notify(Notice::info("Recording Started", "Read the sentence aloud."));
                Ok(())
            }
            Err(e) => self.refuse(e),
        }
    }

    /// Close the microphone and keep what was captured as the artifact for
    /// the current sentence.
    pub fn stop_recording(&mut self) -> Result<(), PracticeError> {
        let Some(recording) = self.recording.take() else {
            return self.refuse(PracticeError::InvalidAction("not recording".into()));
        };

        let secs = recording.elapsed_secs();
        match recording.finish() {
            Ok(artifact) => {
                self.artifact = Some(artifact);
                self.notify(Notice::info(
                    "Recording Stopped",
                    format!("Captured {secs:.1}s of audio."),
                ));
                Ok(())
            }
            Err(e) => self.refuse(e),
        }
    }

    /// Drain the live recording's events.  A stream failure abandons the
    /// recording and releases the device.
    pub fn poll_recording(&mut self) {
        let Some(recording) = self.recording.as_mut() else {
            return;
        };
        let failure = recording.poll().into_iter().find_map(|event| match event {
            RecorderEvent::Failed(e) => Some(e),
            RecorderEvent::Data { .. } => None,
        });
        if let Some(e) = failure {
            self.recording = None;
            log::warn!("session: recording abandoned: {e}");
            self.notify_error(&e);
        }
    }

    // -----------------------------------------------------------------------
    // Scoring
    // -----------------------------------------------------------------------

    /// Build the scoring request for the current sentence and its artifact.
    pub fn begin_scoring(&mut self) -> Result<(Ticket, ScoringRequest), PracticeError> {
        if self.pending_scoring.is_some() {
            return self.refuse(PracticeError::InvalidAction("an analysis is already running".into()));
        }
        if self.recording.is_some() {
            return self.refuse(PracticeError::InvalidAction(
                "stop recording before analyzing".into(),
            ));
        }
        let Some(sentence) = self.current_sentence().map(str::to_string) else {
            return self.refuse(PracticeError::InvalidAction("there is no sentence to analyze".into()));
        };
        let Some(artifact) = self.artifact.as_ref() else {
            return self.refuse(PracticeError::InvalidAction(
                "record your voice for the current sentence first".into(),
            ));
        };

        let request = ScoringRequest {
            sentence,
            user_recording: artifact.to_data_uri(),
        };
        let ticket = self.issue_ticket();
        self.pending_scoring = Some(ticket);
        self.result = None;
        log::debug!("session: scoring ticket {ticket}");
        Ok((ticket, request))
    }

    /// Apply the scorer's answer for `ticket`.
    pub fn complete_scoring(
        &mut self,
        ticket: Ticket,
        outcome: Result<ScoringResult, PracticeError>,
    ) {
        if self.pending_scoring != Some(ticket) {
            log::warn!("session: dropping result for stale scoring ticket {ticket}");
            return;
        }
        self.pending_scoring = None;

        let outcome = outcome.and_then(|result| {
            let sentence = self.current_sentence().unwrap_or_default();
            result.validate(sentence).map(|()| result)
        });
        match outcome {
            Ok(result) => {
                log::info!("session: scored {}%", result.accuracy_percentage);
                self.result = Some(result);
                self.notify(Notice::info("Analysis Complete", "Pronunciation feedback is ready."));
            }
            Err(e) => {
                log::error!("session: scoring failed: {e}");
                self.notify_error(&e);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Generation
    // -----------------------------------------------------------------------

    /// Mark a generation request in flight.
    pub fn begin_generation(
        &mut self,
        topic: &str,
        count: u8,
    ) -> Result<(Ticket, GenerationRequest), PracticeError> {
        if self.pending_generation.is_some() {
            return self.refuse(PracticeError::InvalidAction("sentences are already being generated".into()));
        }
        if self.pending_scoring.is_some() {
            return self.refuse(PracticeError::InvalidAction(
                "wait for the analysis to finish before generating".into(),
            ));
        }

        let topic = match topic.trim() {
            "" => GenerationRequest::default().topic,
            t => t.to_string(),
        };
        let ticket = self.issue_ticket();
        self.pending_generation = Some(ticket);
        Ok((ticket, GenerationRequest::new(topic, count)))
    }

    /// Apply the generator's answer for `ticket`.  On success the sentences
    /// are joined into one practice text, loaded, and returned so the UI can
    /// show it in the input box.
    pub fn complete_generation(
        &mut self,
        ticket: Ticket,
        outcome: Result<Vec<String>, PracticeError>,
    ) -> Option<String> {
        if self.pending_generation != Some(ticket) {
            log::warn!("session: dropping sentences for stale generation ticket {ticket}");
            return None;
        }
        self.pending_generation = None;

        match outcome {
            Ok(sentences) if !sentences.is_empty() => {
                let text = sentences.join(" ");
                if self.load_text(&text).is_ok() {
                    self.notify(Notice::info(
                        "Sentences Generated",
                        "New sentences loaded for practice.",
                    ));
                }
                Some(text)
            }
            Ok(_) => {
                self.notify_error(&PracticeError::GenerationUnavailable(
                    "the generator returned no sentences".into(),
                ));
                None
            }
            Err(e) => {
                log::error!("session: generation failed: {e}");
                self.notify_error(&e);
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Drop the artifact and result of the current attempt.
    fn discard_attempt(&mut self) {
        self.artifact = None;
        self.result = None;
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    fn notify_error(&mut self, e: &PracticeError) {
        self.notices.push_back(Notice::from(e));
    }

    fn refuse<T>(&mut self, e: PracticeError) -> Result<T, PracticeError> {
        log::debug!("session: refused: {e}");
        self.notify_error(&e);
        Err(e)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

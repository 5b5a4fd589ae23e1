//! `SpeechEngine` backed by the `espeak-ng` command-line synthesizer.
//!
//! Each utterance runs `espeak-ng [-v <voice>] -s <wpm> -- <text>` as a
//! child process on the tokio runtime.  The CLI reports no word events, so
//! `Boundary` events are estimated on a timer from token lengths and the
//! configured speaking rate; `Ended` is sent when the process exits.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

use crate::config::SpeechConfig;
use crate::error::PracticeError;
use crate::speech::engine::{
    PlaybackHandle, SpeechEngine, SpeechEvent, SpeechEventKind, UtteranceId,
};
use crate::speech::voice::{parse_voice_list, Voice};
use crate::text::token_spans;

/// Average characters per spoken word, trailing space included.
const AVG_WORD_CHARS: f64 = 6.0;

// ---------------------------------------------------------------------------
// EspeakEngine
// ---------------------------------------------------------------------------

pub struct EspeakEngine {
    config: SpeechConfig,
    runtime: Handle,
    events: UnboundedSender<SpeechEvent>,
    voices: Vec<Voice>,
}

impl EspeakEngine {
    /// Build the engine and query the installed voices for
    /// `config.locale`.  A missing synthesizer leaves the voice list empty;
    /// [`speak`](SpeechEngine::speak) then reports `SpeechUnavailable`.
    pub fn new(config: SpeechConfig, runtime: Handle, events: UnboundedSender<SpeechEvent>) -> Self {
        let voices = match list_voices(&config.program, &config.locale) {
            Ok(voices) => {
                log::info!(
                    "speech: {} {} voice(s) available",
                    voices.len(),
                    config.locale
                );
                voices
            }
            Err(e) => {
                log::warn!("speech: {e}");
                Vec::new()
            }
        };

        Self {
            config,
            runtime,
            events,
            voices,
        }
    }

    fn command(&self, text: &str, voice: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.config.program);
        if let Some(voice) = voice {
            cmd.arg("-v").arg(voice);
        }
        cmd.arg("-s")
            .arg(self.config.words_per_minute.to_string())
            .arg("--")
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

impl SpeechEngine for EspeakEngine {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(
        &self,
        utterance: UtteranceId,
        text: &str,
        voice: Option<&str>,
    ) -> Result<PlaybackHandle, PracticeError> {
        if text.trim().is_empty() {
            return Err(PracticeError::InvalidAction("nothing to speak".into()));
        }

        // Child processes must be registered with a runtime.
        let _guard = self.runtime.enter();
        let child = self.command(text, voice).spawn().map_err(|e| {
            PracticeError::SpeechUnavailable(format!(
                "could not start {}: {e}",
                self.config.program
            ))
        })?;

        log::debug!("speech: utterance {utterance} started ({} chars)", text.chars().count());
        let schedule = boundary_schedule(text, self.config.words_per_minute);
        let task = self.runtime.spawn(drive_utterance(
            child,
            schedule,
            utterance,
            self.events.clone(),
        ));
        Ok(PlaybackHandle::new(utterance, task))
    }
}

// ---------------------------------------------------------------------------
// Playback task
// ---------------------------------------------------------------------------

async fn drive_utterance(
    mut child: Child,
    schedule: Vec<(Duration, usize)>,
    utterance: UtteranceId,
    events: UnboundedSender<SpeechEvent>,
) {
    let send = |kind| {
        // The UI may already be gone on shutdown.
        let _ = events.send(SpeechEvent::new(utterance, kind));
    };

    send(SpeechEventKind::Started);
    let start = Instant::now();

    let wait = child.wait();
    tokio::pin!(wait);

    for (offset, char_index) in schedule {
        tokio::select! {
            status = &mut wait => {
                send(exit_event(status));
                return;
            }
            _ = tokio::time::sleep_until(start + offset) => {
                send(SpeechEventKind::Boundary { char_index });
            }
        }
    }

    send(exit_event(wait.await));
}

fn exit_event(status: std::io::Result<std::process::ExitStatus>) -> SpeechEventKind {
    match status {
        Ok(s) if s.success() => SpeechEventKind::Ended,
        Ok(s) => SpeechEventKind::Failed(format!("synthesizer exited with {s}")),
        Err(e) => SpeechEventKind::Failed(format!("synthesizer wait failed: {e}")),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Estimated `(offset, char_index)` at which each token of `text` is spoken.
///
/// A token's duration is proportional to its length (plus one for the
/// following pause) at `words_per_minute`.
///
/// ```rust
/// use std::time::Duration;
/// use speakeasy::speech::boundary_schedule;
///
/// let schedule = boundary_schedule("Hello world.", 60);
/// assert_eq!(schedule[0], (Duration::ZERO, 0));
/// assert_eq!(schedule[1].1, 6);
/// assert!(schedule[1].0.abs_diff(Duration::from_secs(1)) < Duration::from_millis(1));
/// ```
pub fn boundary_schedule(text: &str, words_per_minute: u32) -> Vec<(Duration, usize)> {
    let secs_per_char = 60.0 / (f64::from(words_per_minute.max(1)) * AVG_WORD_CHARS);
    let mut at = 0.0;
    token_spans(text)
        .into_iter()
        .map(|span| {
            let entry = (Duration::from_secs_f64(at), span.start);
            at += (span.end - span.start + 1) as f64 * secs_per_char;
            entry
        })
        .collect()
}

fn list_voices(program: &str, locale: &str) -> Result<Vec<Voice>, PracticeError> {
    let output = std::process::Command::new(program)
        .arg(format!("--voices={locale}"))
        .stdin(Stdio::null())
        .output()
        .map_err(|e| PracticeError::SpeechUnavailable(format!("could not run {program}: {e}")))?;

    if !output.status.success() {
        return Err(PracticeError::SpeechUnavailable(format!(
            "{program} --voices exited with {}",
            output.status
        )));
    }
    Ok(parse_voice_list(&String::from_utf8_lossy(&output.stdout)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_synth() -> SpeechConfig {
        SpeechConfig {
            program: "speakeasy-no-such-synthesizer".into(),
            ..SpeechConfig::default()
        }
    }

    #[test]
    fn schedule_has_one_entry_per_token() {
        let schedule = boundary_schedule("The quick  brown fox.", 150);
        let starts: Vec<usize> = schedule.iter().map(|(_, c)| *c).collect();
        assert_eq!(starts, vec![0, 4, 11, 17]);
        assert!(schedule.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn schedule_scales_with_rate() {
        let slow = boundary_schedule("one two", 60);
        let fast = boundary_schedule("one two", 120);
        let diff = slow[1].0.as_secs_f64() - 2.0 * fast[1].0.as_secs_f64();
        assert!(diff.abs() < 1e-6);
    }

    #[test]
    fn schedule_for_blank_text_is_empty() {
        assert!(boundary_schedule("   ", 150).is_empty());
    }

    #[test]
    fn zero_rate_does_not_divide_by_zero() {
        assert_eq!(boundary_schedule("a b", 0).len(), 2);
    }

    #[tokio::test]
    async fn missing_synthesizer_is_unavailable() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let engine = EspeakEngine::new(missing_synth(), Handle::current(), tx);

        assert!(engine.voices().is_empty());
        assert!(matches!(
            engine.speak(1, "Hello.", None),
            Err(PracticeError::SpeechUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn blank_text_is_refused() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let engine = EspeakEngine::new(missing_synth(), Handle::current(), tx);
        assert!(matches!(
            engine.speak(1, "  ", None),
            Err(PracticeError::InvalidAction(_))
        ));
    }
}

//! Error taxonomy shared by every practice operation.
//!
//! All variants are recoverable: the controller turns them into a transient
//! [`Notice`](crate::session::Notice) and the user may retry the action.

use thiserror::Error;

/// Failures surfaced to the user while practising.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PracticeError {
    /// Microphone access was refused by the OS or the audio backend.
    #[error("microphone permission denied: {0}")]
    PermissionDenied(String),

    /// No input device / recording backend is available.
    #[error("recording device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The sentence generator failed or produced nothing.
    #[error("sentence generation unavailable: {0}")]
    GenerationUnavailable(String),

    /// The pronunciation scorer could not be reached or answered garbage.
    #[error("pronunciation scoring unavailable: {0}")]
    ScoringUnavailable(String),

    /// The scorer answered, but the word partition does not match the sentence.
    #[error("malformed scoring result: {0}")]
    MalformedScoringResult(String),

    /// The speech synthesizer is missing or failed to start.
    #[error("speech output unavailable: {0}")]
    SpeechUnavailable(String),

    /// The requested action is not allowed in the current state.
    #[error("{0}")]
    InvalidAction(String),
}

impl PracticeError {
    /// Short title used for notices.
    pub fn title(&self) -> &'static str {
        match self {
            PracticeError::PermissionDenied(_) => "Microphone Blocked",
            PracticeError::DeviceUnavailable(_) => "Recording Error",
            PracticeError::GenerationUnavailable(_) => "Generation Error",
            PracticeError::ScoringUnavailable(_) => "Analysis Error",
            PracticeError::MalformedScoringResult(_) => "Analysis Error",
            PracticeError::SpeechUnavailable(_) => "Speech Error",
            PracticeError::InvalidAction(_) => "Not Available",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let err = PracticeError::ScoringUnavailable("timed out".into());
        assert_eq!(
            err.to_string(),
            "pronunciation scoring unavailable: timed out"
        );
    }

    #[test]
    fn scoring_failures_share_a_title() {
        assert_eq!(
            PracticeError::ScoringUnavailable(String::new()).title(),
            PracticeError::MalformedScoringResult(String::new()).title()
        );
    }
}

//! Practice state machine and user-facing notices.

use crate::error::PracticeError;

// ---------------------------------------------------------------------------
// PracticeState
// ---------------------------------------------------------------------------

/// Observable state of the practice session.
///
/// ```text
/// Idle ──load / generate──▶ Browsing ──listen──▶ Listening ──end──▶ Browsing
///                              │  ▲
///                              │  └──stop──── Recording ◀──record──┘
///                              │
///                              └──analyze (artifact present)──▶ Scoring
///                                       ──ok──▶ Scored   ──error──▶ Browsing
/// Scored ──next / prev / record──▶ Browsing (result discarded)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PracticeState {
    /// No sentences loaded.
    #[default]
    Idle,
    /// A sentence is selected and nothing is running.
    Browsing,
    /// The synthesizer is speaking.
    Listening,
    /// The microphone is open.
    Recording,
    /// A scoring request is in flight.
    Scoring,
    /// A scoring result is shown for the current sentence.
    Scored,
}

impl PracticeState {
    /// `true` while navigation and loading new text are refused.
    ///
    /// ```
    /// use speakeasy::session::PracticeState;
    ///
    /// assert!(PracticeState::Recording.is_busy());
    /// assert!(PracticeState::Scoring.is_busy());
    /// assert!(!PracticeState::Listening.is_busy());
    /// assert!(!PracticeState::Scored.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(self, PracticeState::Recording | PracticeState::Scoring)
    }

    /// A short human-readable label suitable for the status bar.
    pub fn label(&self) -> &'static str {
        match self {
            PracticeState::Idle => "No text",
            PracticeState::Browsing => "Ready",
            PracticeState::Listening => "Speaking",
            PracticeState::Recording => "Recording",
            PracticeState::Scoring => "Analyzing",
            PracticeState::Scored => "Feedback ready",
        }
    }
}

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub is_error: bool,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            is_error: true,
        }
    }
}

impl From<&PracticeError> for Notice {
    fn from(e: &PracticeError) -> Self {
        Notice::error(e.title(), e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        assert_eq!(PracticeState::default(), PracticeState::Idle);
    }

    #[test]
    fn only_recording_and_scoring_are_busy() {
        for state in [
            PracticeState::Idle,
            PracticeState::Browsing,
            PracticeState::Listening,
            PracticeState::Scored,
        ] {
            assert!(!state.is_busy(), "{state:?}");
        }
    }

    #[test]
    fn labels() {
        assert_eq!(PracticeState::Scoring.label(), "Analyzing");
        assert_eq!(PracticeState::Idle.label(), "No text");
    }

    #[test]
    fn error_notice_uses_error_title() {
        let notice = Notice::from(&PracticeError::PermissionDenied("no".into()));
        assert!(notice.is_error);
        assert_eq!(notice.title, "Microphone Blocked");
        assert!(notice.message.contains("no"));
    }
}

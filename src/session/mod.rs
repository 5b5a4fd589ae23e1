//! Application controller for a practice session.
//!
//! # Architecture
//!
//! ```text
//!              egui update()  (UI thread)
//!                    │
//!                    ▼
//!          PracticeController ── speak ──▶ SpeechEngine ──SpeechEvent──┐
//!            │   ▲       │                                           │
//!            │   │       └── start ──▶ Microphone ─▶ ActiveRecording   │
//!            │   │                                                   │
//!   begin_*  │   │ complete_*          on_speech_event ◀─────────────┘
//!            ▼   │
//!   SessionCommand (mpsc) ─▶ SessionWorker::run()  ← tokio task
//!                                 ├─ SentenceGenerator::generate
//!                                 └─ PronunciationScorer::score
//!                            ◀─ SessionUpdate (mpsc)
//! ```
//!
//! The controller is the only owner of the sentence list, the recording,
//! the artifact and the scoring result.  The worker owns nothing but the
//! two LLM collaborators.

pub mod controller;
pub mod highlight;
pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use controller::{PracticeController, Ticket};
pub use highlight::{merge_highlights, HighlightKind, WordHighlight};
pub use runner::{SessionCommand, SessionUpdate, SessionWorker};
pub use state::{Notice, PracticeState};

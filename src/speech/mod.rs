//! Speech output adapter: text-to-speech with typed progress events.
//!
//! # Architecture
//!
//! ```text
//! PracticeController ──speak(utterance, text)──▶ SpeechEngine
//!                                                   │ spawns synthesizer
//!                                                   ▼
//!          SpeechEvent { utterance, Started | Boundary | Ended | Failed }
//!                                                   │ (tokio mpsc)
//! egui update() ◀───────────────────────────────────┘
//!   └─▶ PracticeController::on_speech_event
//! ```
//!
//! Every event carries the utterance id it belongs to.  Cancelling playback
//! drops its [`PlaybackHandle`], which kills the synthesizer; any event that
//! still arrives for a cancelled utterance is ignored by the controller.

pub mod engine;
pub mod espeak;
pub mod voice;

pub use engine::{PlaybackHandle, SpeechEngine, SpeechEvent, SpeechEventKind, UtteranceId};
pub use espeak::{boundary_schedule, EspeakEngine};
pub use voice::{parse_voice_list, pick_default_voice, Voice};

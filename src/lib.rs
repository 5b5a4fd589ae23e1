//! SpeakEasy: pronunciation practice on the desktop.
//!
//! Paste or generate text, step through it sentence by sentence, listen to
//! each sentence, record yourself reading it and get word-level feedback
//! from an audio-capable language model.
//!
//! | Module | Role |
//! |--------|------|
//! | [`text`] | sentence segmentation and tokenization |
//! | [`scoring`] | scoring request/result contract |
//! | [`llm`] | LLM-backed scorer and sentence generator |
//! | [`audio`] | microphone capture into a WAV artifact |
//! | [`speech`] | text-to-speech with word progress events |
//! | [`session`] | practice state machine and async worker |
//! | [`app`] | egui front end |

pub mod app;
pub mod audio;
pub mod config;
pub mod error;
pub mod llm;
pub mod scoring;
pub mod session;
pub mod speech;
pub mod text;

pub use error::PracticeError;

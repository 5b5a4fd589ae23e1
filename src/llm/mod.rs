//! LLM-backed collaborators for SpeakEasy.
//!
//! This module provides:
//! * [`ChatClient`]: OpenAI-compatible `/v1/chat/completions` transport.
//! * [`PronunciationScorer`] / [`ApiScorer`]: sentence + recording →
//!   [`ScoringResult`](crate::scoring::ScoringResult).
//! * [`SentenceGenerator`] / [`ApiGenerator`]: topic + count → sentences.
//! * [`PromptBuilder`]: the chat messages for both contracts.
//! * [`LlmError`]: transport-level failures, mapped to
//!   [`PracticeError`](crate::error::PracticeError) at the trait boundary.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use speakeasy::config::AppConfig;
//! use speakeasy::llm::{ApiGenerator, GenerationRequest, SentenceGenerator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let generator = ApiGenerator::from_config(&config.llm);
//!
//!     let request = GenerationRequest::new("ordering food", 3);
//!     for sentence in generator.generate(&request).await.unwrap() {
//!         println!("{sentence}");
//!     }
//! }
//! ```

pub mod client;
pub mod generator;
pub mod prompt;
pub mod scorer;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{ChatClient, LlmError};
pub use generator::{ApiGenerator, GenerationRequest, SentenceGenerator};
pub use prompt::PromptBuilder;
pub use scorer::{ApiScorer, PronunciationScorer};

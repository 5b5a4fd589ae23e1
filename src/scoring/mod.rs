//! Pronunciation scoring contract.
//!
//! * [`ScoringRequest`]: sentence + recording (base64 data URI).
//! * [`ScoringResult`]: feedback, correct / incorrect word partition and
//!   accuracy percentage, checked against the sentence's tokens.
//! * [`accuracy_percentage`]: the rounding rule every result obeys.
//!
//! How the result is produced (an LLM today) lives in
//! [`crate::llm::scorer`]; this module only knows the contract.

pub mod result;

pub use result::{accuracy_percentage, ScoringRequest, ScoringResult};

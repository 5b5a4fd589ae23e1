//! `SentenceGenerator` trait and the LLM-backed `ApiGenerator`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::PracticeError;
use crate::llm::client::{ChatClient, LlmError};
use crate::llm::prompt::PromptBuilder;

/// Smallest number of sentences a request may ask for.
pub const MIN_SENTENCES: u8 = 1;
/// Largest number of sentences a request may ask for.
pub const MAX_SENTENCES: u8 = 10;
/// Sentence count used when none is given.
pub const DEFAULT_SENTENCES: u8 = 5;

// ---------------------------------------------------------------------------
// GenerationRequest
// ---------------------------------------------------------------------------

/// Input to the sentence generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub topic: String,
    /// Always within `1..=10`.
    pub sentence_count: u8,
}

impl GenerationRequest {
    /// Build a request, clamping `count` into `1..=10`.
    ///
    /// ```rust
    /// use speakeasy::llm::GenerationRequest;
    ///
    /// assert_eq!(GenerationRequest::new("food", 0).sentence_count, 1);
    /// assert_eq!(GenerationRequest::new("food", 42).sentence_count, 10);
    /// ```
    pub fn new(topic: impl Into<String>, count: u8) -> Self {
        Self {
            topic: topic.into(),
            sentence_count: count.clamp(MIN_SENTENCES, MAX_SENTENCES),
        }
    }
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self::new("common daily phrases", DEFAULT_SENTENCES)
    }
}

// ---------------------------------------------------------------------------
// SentenceGenerator trait
// ---------------------------------------------------------------------------

/// Async interface for practice-sentence generators.
///
/// An `Ok` value is never empty; "nothing generated" is
/// [`PracticeError::GenerationUnavailable`].
#[async_trait]
pub trait SentenceGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, PracticeError>;
}

// ---------------------------------------------------------------------------
// ApiGenerator
// ---------------------------------------------------------------------------

/// Generates sentences through an OpenAI-compatible chat model.
pub struct ApiGenerator {
    client: ChatClient,
    model: String,
    prompt_builder: PromptBuilder,
}

impl ApiGenerator {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            client: ChatClient::from_config(config),
            model: config.generation_model.clone(),
            prompt_builder: PromptBuilder::new(),
        }
    }
}

#[async_trait]
impl SentenceGenerator for ApiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, PracticeError> {
        let (system_msg, user_msg) = self
            .prompt_builder
            .generation_chat(&request.topic, request.sentence_count);

        let messages = vec![
            serde_json::json!({ "role": "system", "content": system_msg }),
            serde_json::json!({ "role": "user",   "content": user_msg   }),
        ];

        let reply = self
            .client
            .complete_json(&self.model, messages)
            .await
            .map_err(generation_unavailable)?;

        parse_generation_reply(&reply, request.sentence_count)
    }
}

// ---------------------------------------------------------------------------
// Reply parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GenerationReply {
    #[serde(default)]
    sentences: Vec<String>,
}

/// Parse the model's JSON reply, dropping blank entries and anything past
/// `count`.
pub fn parse_generation_reply(reply: &str, count: u8) -> Result<Vec<String>, PracticeError> {
    let reply: GenerationReply = serde_json::from_str(reply)
        .map_err(|e| generation_unavailable(LlmError::Parse(e.to_string())))?;

    let sentences: Vec<String> = reply
        .sentences
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(usize::from(count))
        .collect();

    if sentences.is_empty() {
        return Err(PracticeError::GenerationUnavailable(
            "the generator returned no sentences".into(),
        ));
    }
    if sentences.len() < usize::from(count) {
        log::warn!(
            "generator: asked for {count} sentences, got {}",
            sentences.len()
        );
    }
    Ok(sentences)
}

fn generation_unavailable(e: LlmError) -> PracticeError {
    log::warn!("generator: {e}");
    PracticeError::GenerationUnavailable(e.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_matches_contract() {
        let req = GenerationRequest::default();
        assert_eq!(req.sentence_count, 5);
        assert_eq!(req.topic, "common daily phrases");
    }

    #[test]
    fn count_is_clamped() {
        assert_eq!(GenerationRequest::new("x", 0).sentence_count, 1);
        assert_eq!(GenerationRequest::new("x", 10).sentence_count, 10);
        assert_eq!(GenerationRequest::new("x", 11).sentence_count, 10);
    }

    #[test]
    fn request_wire_format() {
        let json = serde_json::to_value(GenerationRequest::new("pets", 3)).unwrap();
        assert_eq!(json, serde_json::json!({ "topic": "pets", "sentenceCount": 3 }));
    }

    #[test]
    fn reply_is_trimmed_and_capped() {
        let reply = r#"{"sentences": ["  One.  ", "", "Two!", "Three?"]}"#;
        assert_eq!(parse_generation_reply(reply, 2).unwrap(), vec!["One.", "Two!"]);
    }

    #[test]
    fn short_reply_is_accepted() {
        let reply = r#"{"sentences": ["Only one."]}"#;
        assert_eq!(parse_generation_reply(reply, 5).unwrap(), vec!["Only one."]);
    }

    #[test]
    fn empty_reply_is_unavailable() {
        assert!(matches!(
            parse_generation_reply(r#"{"sentences": []}"#, 5),
            Err(PracticeError::GenerationUnavailable(_))
        ));
        assert!(matches!(
            parse_generation_reply(r#"{}"#, 5),
            Err(PracticeError::GenerationUnavailable(_))
        ));
    }

    #[test]
    fn garbage_reply_is_unavailable() {
        assert!(matches!(
            parse_generation_reply("Sure! Here are some sentences", 5),
            Err(PracticeError::GenerationUnavailable(_))
        ));
    }

    #[test]
    fn generator_is_object_safe() {
        let generator: Box<dyn SentenceGenerator> =
            Box::new(ApiGenerator::from_config(&LlmConfig::default()));
        drop(generator);
    }
}

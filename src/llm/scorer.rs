//! `PronunciationScorer` trait and the LLM-backed `ApiScorer`.
//!
//! `ApiScorer` sends the sentence as text and the recording as an
//! `input_audio` content part to an audio-capable chat model, then checks the
//! reply against the sentence before handing it out.

use async_trait::async_trait;
use serde::Deserialize;

use crate::audio::parse_data_uri;
use crate::config::LlmConfig;
use crate::error::PracticeError;
use crate::llm::client::{ChatClient, LlmError};
use crate::llm::prompt::PromptBuilder;
use crate::scoring::{ScoringRequest, ScoringResult};

// ---------------------------------------------------------------------------
// PronunciationScorer trait
// ---------------------------------------------------------------------------

/// Async interface for pronunciation scoring backends.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// behind an `Arc<dyn PronunciationScorer>`.  A returned `Ok` result has
/// already passed [`ScoringResult::validate`] for `request.sentence`.
#[async_trait]
pub trait PronunciationScorer: Send + Sync {
    async fn score(&self, request: &ScoringRequest) -> Result<ScoringResult, PracticeError>;
}

// ---------------------------------------------------------------------------
// ApiScorer
// ---------------------------------------------------------------------------

/// Scores recordings through an OpenAI-compatible audio chat model.
pub struct ApiScorer {
    client: ChatClient,
    model: String,
    prompt_builder: PromptBuilder,
}

impl ApiScorer {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            client: ChatClient::from_config(config),
            model: config.scoring_model.clone(),
            prompt_builder: PromptBuilder::new(),
        }
    }
}

#[async_trait]
impl PronunciationScorer for ApiScorer {
    async fn score(&self, request: &ScoringRequest) -> Result<ScoringResult, PracticeError> {
        let (mime, data) = parse_data_uri(&request.user_recording).ok_or_else(|| {
            PracticeError::ScoringUnavailable("recording is not a base64 data URI".into())
        })?;
        let format = audio_format(mime).ok_or_else(|| {
            PracticeError::ScoringUnavailable(format!("unsupported recording format {mime}"))
        })?;

        let (system_msg, user_msg) = self.prompt_builder.scoring_chat(&request.sentence);
        let messages = vec![
            serde_json::json!({ "role": "system", "content": system_msg }),
            serde_json::json!({
                "role": "user",
                "content": [
                    { "type": "text", "text": user_msg },
                    { "type": "input_audio", "input_audio": { "data": data, "format": format } }
                ]
            }),
        ];

        let reply = self
            .client
            .complete_json(&self.model, messages)
            .await
            .map_err(scoring_unavailable)?;

        parse_scoring_reply(&request.sentence, &reply)
    }
}

// ---------------------------------------------------------------------------
// Reply parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoringReply {
    feedback: String,
    #[serde(default)]
    correct_words: Vec<String>,
    #[serde(default)]
    incorrect_words: Vec<String>,
    accuracy_percentage: Option<f64>,
}

/// Parse and validate the model's JSON reply for `sentence`.
///
/// Unparseable JSON is [`PracticeError::ScoringUnavailable`]; a reply whose
/// word lists do not partition the sentence is
/// [`PracticeError::MalformedScoringResult`].  The accuracy percentage is
/// always recomputed from the word lists.
pub fn parse_scoring_reply(sentence: &str, reply: &str) -> Result<ScoringResult, PracticeError> {
    let reply: ScoringReply = serde_json::from_str(reply)
        .map_err(|e| scoring_unavailable(LlmError::Parse(e.to_string())))?;

    let reported = reply.accuracy_percentage;
    let result = ScoringResult::new(
        sentence,
        reply.feedback,
        reply.correct_words,
        reply.incorrect_words,
    )?;

    if let Some(reported) = reported {
        if (reported - f64::from(result.accuracy_percentage)).abs() >= 0.5 {
            log::warn!(
                "scorer: model reported {reported}% but word lists give {}%",
                result.accuracy_percentage
            );
        }
    }
    Ok(result)
}

/// Map a recording MIME type to the `input_audio.format` value.
fn audio_format(mime: &str) -> Option<&'static str> {
    let base = mime.split(';').next().unwrap_or(mime).trim();
    match base {
        "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => Some("wav"),
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        _ => None,
    }
}

fn scoring_unavailable(e: LlmError) -> PracticeError {
    log::warn!("scorer: {e}");
    PracticeError::ScoringUnavailable(e.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Prompt builder for pronunciation scoring and sentence generation.
//!
//! [`PromptBuilder`] produces `(system_msg, user_msg)` pairs for an
//! OpenAI-compatible `/v1/chat/completions` endpoint.  The scoring prompt
//! restates the tokenization, partition and rounding rules that
//! [`ScoringResult::new`](crate::scoring::ScoringResult::new) enforces, so a
//! well-behaved model produces results that validate.

use crate::text::tokenize;

// ---------------------------------------------------------------------------
// System instructions
// ---------------------------------------------------------------------------

const SCORING_INSTRUCTION: &str = "\
You are an expert pronunciation tutor. You listen to a learner reading one
sentence aloud and judge each word of that sentence.

Rules:
1. The words to judge are the sentence split on whitespace. Punctuation stays
   attached to its word: if the sentence contains \"end.\", judge \"end.\".
2. Put every word of the sentence in exactly one list: correctWords if it was
   pronounced correctly, incorrectWords if it was mispronounced or skipped.
   Copy words exactly as they appear in the sentence, including case and
   punctuation. Repeated words appear once per occurrence.
3. accuracyPercentage = round(100 * correct / total words). It is 0 when the
   sentence has no words.
4. feedback is a short, constructive, non-empty summary for the learner.
5. Reply with ONLY a JSON object of the form
   {\"feedback\": string, \"correctWords\": [string], \"incorrectWords\": [string], \"accuracyPercentage\": number}";

const SCORING_EXAMPLE: &str = "
Example:
Sentence: \"The quick brown fox jumps.\"
The learner says \"The\", \"quick\" and \"jumps.\" well but mispronounces \"brown\" and \"fox\".
Reply: {\"feedback\": \"Good rhythm. Open the vowel in 'brown' and voice the 'f' in 'fox'.\", \"correctWords\": [\"The\", \"quick\", \"jumps.\"], \"incorrectWords\": [\"brown\", \"fox\"], \"accuracyPercentage\": 60}
";

const GENERATION_INSTRUCTION: &str = "\
You write practice sentences for language learners working on pronunciation.

Rules:
1. Sentences are short, natural and easy to pronounce.
2. Each sentence ends with '.', '!' or '?'.
3. Reply with ONLY a JSON object of the form {\"sentences\": [string]}.";

const GENERATION_EXAMPLE: &str = "
Example reply for 3 sentences about pets:
{\"sentences\": [\"The cat sleeps on the sofa.\", \"My dog loves long walks.\", \"Do you have a pet?\"]}
";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds chat messages for the two LLM contracts.
///
/// # Example
/// ```rust
/// use speakeasy::llm::PromptBuilder;
///
/// let (system, user) = PromptBuilder::new().scoring_chat("Hello there.");
/// assert!(system.contains("pronunciation"));
/// assert!(user.contains("\"Hello there.\""));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// `(system_msg, user_msg)` for scoring `sentence`.  The recording is
    /// attached by the caller as a separate audio content part.
    pub fn scoring_chat(&self, sentence: &str) -> (String, String) {
        let tokens = tokenize(sentence);
        let listed = serde_json::to_string(&tokens).unwrap_or_else(|_| "[]".into());

        let mut user_msg = String::with_capacity(1024);
        user_msg.push_str(SCORING_EXAMPLE);
        user_msg.push_str(&format!(
            "\nSentence to analyze: \"{sentence}\"\nWords to judge ({} total): {listed}\n\
             The learner's recording is attached.\n",
            tokens.len()
        ));

        (SCORING_INSTRUCTION.to_string(), user_msg)
    }

    /// `(system_msg, user_msg)` asking for `count` sentences about `topic`.
    pub fn generation_chat(&self, topic: &str, count: u8) -> (String, String) {
        let mut user_msg = String::with_capacity(256);
        user_msg.push_str(GENERATION_EXAMPLE);
        user_msg.push_str(&format!(
            "\nGenerate {count} sentences on the topic of \"{topic}\".\n"
        ));
        (GENERATION_INSTRUCTION.to_string(), user_msg)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

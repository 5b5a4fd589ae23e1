//! Scoring request / result types and the partition invariant.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::PracticeError;
use crate::text::tokenize;

// ---------------------------------------------------------------------------
// ScoringRequest
// ---------------------------------------------------------------------------

/// Input to the pronunciation scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRequest {
    /// The sentence the user tried to read.
    pub sentence: String,
    /// The attempt as `data:<mime>;base64,<data>`.
    pub user_recording: String,
}

// ---------------------------------------------------------------------------
// Accuracy
// ---------------------------------------------------------------------------

/// `round(100 * correct / total)`, rounding halves up; `0` when `total == 0`.
///
/// ```rust
/// use speakeasy::scoring::accuracy_percentage;
///
/// assert_eq!(accuracy_percentage(3, 5), 60);
/// assert_eq!(accuracy_percentage(1, 8), 13); // 12.5 rounds up
/// assert_eq!(accuracy_percentage(0, 0), 0);
/// ```
pub fn accuracy_percentage(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total);
    ((200 * correct + total) / (2 * total)) as u8
}

// ---------------------------------------------------------------------------
// ScoringResult
// ---------------------------------------------------------------------------

/// Word-level pronunciation feedback for one (sentence, recording) pair.
///
/// A value of this type is only ever built through [`ScoringResult::new`],
/// which enforces the partition invariant, so anything the UI displays is
/// complete and consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringResult {
    pub feedback: String,
    pub correct_words: Vec<String>,
    pub incorrect_words: Vec<String>,
    pub accuracy_percentage: u8,
}

impl ScoringResult {
    /// Build a result for `sentence`, computing the accuracy percentage.
    ///
    /// # Errors
    ///
    /// [`PracticeError::MalformedScoringResult`] when the feedback is blank,
    /// a word appears in both lists, or the two lists together do not cover
    /// the sentence's tokens exactly once.
    pub fn new(
        sentence: &str,
        feedback: impl Into<String>,
        correct_words: Vec<String>,
        incorrect_words: Vec<String>,
    ) -> Result<Self, PracticeError> {
        let total = correct_words.len() + incorrect_words.len();
        let result = Self {
            feedback: feedback.into().trim().to_string(),
            accuracy_percentage: accuracy_percentage(correct_words.len(), total),
            correct_words,
            incorrect_words,
        };
        result.validate(sentence)?;
        Ok(result)
    }

    /// Check this result against `sentence`.
    pub fn validate(&self, sentence: &str) -> Result<(), PracticeError> {
        if self.feedback.trim().is_empty() {
            return Err(malformed("feedback is empty"));
        }

        let correct: HashSet<&str> = self.correct_words.iter().map(String::as_str).collect();
        if let Some(word) = self
            .incorrect_words
            .iter()
            .find(|w| correct.contains(w.as_str()))
        {
            return Err(malformed(format!("{word:?} is both correct and incorrect")));
        }

        // Multiset difference: sentence tokens minus reported words.
        let mut remaining: HashMap<&str, isize> = HashMap::new();
        for token in tokenize(sentence) {
            *remaining.entry(token).or_default() += 1;
        }
        for word in self.correct_words.iter().chain(&self.incorrect_words) {
            *remaining.entry(word.as_str()).or_default() -= 1;
        }

        let mut extra: Vec<&str> = Vec::new();
        let mut missing: Vec<&str> = Vec::new();
        for (word, n) in remaining {
            if n < 0 {
                extra.push(word);
            } else if n > 0 {
                missing.push(word);
            }
        }
        if !missing.is_empty() || !extra.is_empty() {
            missing.sort_unstable();
            extra.sort_unstable();
            return Err(malformed(format!(
                "word lists do not match the sentence (missing {missing:?}, unexpected {extra:?})"
            )));
        }

        let total = self.correct_words.len() + self.incorrect_words.len();
        let expected = accuracy_percentage(self.correct_words.len(), total);
        if self.accuracy_percentage != expected {
            return Err(malformed(format!(
                "accuracy {} does not match {expected}",
                self.accuracy_percentage
            )));
        }

        Ok(())
    }

    /// Number of scored tokens.
    pub fn token_count(&self) -> usize {
        self.correct_words.len() + self.incorrect_words.len()
    }
}

fn malformed(msg: impl Into<String>) -> PracticeError {
    PracticeError::MalformedScoringResult(msg.into())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    const FOX: &str = "The quick brown fox jumps.";

    #[test]
    fn worked_example_is_sixty_percent() {
        let result = ScoringResult::new(
            FOX,
            "Work on the vowel in brown.",
            words(&["The", "quick", "jumps."]),
            words(&["brown", "fox"]),
        )
        .unwrap();

        assert_eq!(result.accuracy_percentage, 60);
        assert_eq!(result.token_count(), 5);
    }

    #[test]
    fn perfect_and_zero_scores() {
        assert_eq!(accuracy_percentage(5, 5), 100);
        assert_eq!(accuracy_percentage(0, 5), 0);
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(accuracy_percentage(2, 3), 67);
        assert_eq!(accuracy_percentage(1, 3), 33);
        assert_eq!(accuracy_percentage(1, 200), 1); // 0.5 -> 1
    }

    #[test]
    fn empty_sentence_scores_zero() {
        let result = ScoringResult::new("", "Nothing to read.", vec![], vec![]).unwrap();
        assert_eq!(result.accuracy_percentage, 0);
    }

    #[test]
    fn missing_token_is_malformed() {
        let err = ScoringResult::new(
            FOX,
            "ok",
            words(&["The", "quick"]),
            words(&["brown", "fox"]),
        )
        .unwrap_err();
        assert!(matches!(err, PracticeError::MalformedScoringResult(_)));
        assert!(err.to_string().contains("jumps."));
    }

    #[test]
    fn overlapping_lists_are_malformed() {
        let err = ScoringResult::new(
            "red red",
            "ok",
            words(&["red"]),
            words(&["red"]),
        )
        .unwrap_err();
        assert!(matches!(err, PracticeError::MalformedScoringResult(_)));
    }

    #[test]
    fn token_match_is_case_sensitive() {
        let err = ScoringResult::new(
            FOX,
            "ok",
            words(&["the", "quick", "jumps."]),
            words(&["brown", "fox"]),
        )
        .unwrap_err();
        assert!(matches!(err, PracticeError::MalformedScoringResult(_)));
    }

    #[test]
    fn stripped_punctuation_is_malformed() {
        assert!(ScoringResult::new(
            FOX,
            "ok",
            words(&["The", "quick", "jumps"]),
            words(&["brown", "fox"]),
        )
        .is_err());
    }

    #[test]
    fn duplicate_tokens_must_all_be_reported() {
        assert!(ScoringResult::new("go go go", "ok", words(&["go", "go", "go"]), vec![]).is_ok());
        assert!(ScoringResult::new("go go go", "ok", words(&["go"]), vec![]).is_err());
    }

    #[test]
    fn blank_feedback_is_malformed() {
        assert!(ScoringResult::new("Hi.", "   ", words(&["Hi."]), vec![]).is_err());
    }

    #[test]
    fn tampered_accuracy_fails_validation() {
        let mut result =
            ScoringResult::new(FOX, "ok", words(&["The", "quick", "brown", "fox", "jumps."]), vec![])
                .unwrap();
        result.accuracy_percentage = 90;
        assert!(result.validate(FOX).is_err());
    }

    #[test]
    fn wire_format_is_camel_case() {
        let result = ScoringResult::new("Hi.", "Good.", words(&["Hi."]), vec![]).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["accuracyPercentage"], 100);
        assert_eq!(json["correctWords"][0], "Hi.");
        assert!(json["incorrectWords"].as_array().unwrap().is_empty());
    }
}

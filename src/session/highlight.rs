//! Word-highlight merge for the displayed sentence.

use std::collections::HashSet;

use crate::scoring::ScoringResult;
use crate::text::{normalize_token, tokenize};

/// How one token of the sentence is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightKind {
    Plain,
    /// Being spoken right now.
    Current,
    Correct,
    Incorrect,
}

/// One displayed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordHighlight {
    pub text: String,
    pub kind: HighlightKind,
}

/// Merge playback progress and scoring feedback onto `sentence`.
///
/// With `spoken` set (playback active), that token is `Current` and the rest
/// are `Plain`.  Otherwise, with a result, each token is `Incorrect` when its
/// normalized form appears among the normalized incorrect words, `Correct`
/// when it appears among the correct words, and `Plain` otherwise.
/// Normalizing lower-cases and strips surrounding punctuation on both sides.
///
/// ```rust
/// use speakeasy::session::{merge_highlights, HighlightKind};
///
/// let words = merge_highlights("Hi there.", Some(1), None);
/// assert_eq!(words[1].kind, HighlightKind::Current);
/// assert_eq!(words[0].kind, HighlightKind::Plain);
/// ```
pub fn merge_highlights(
    sentence: &str,
    spoken: Option<usize>,
    result: Option<&ScoringResult>,
) -> Vec<WordHighlight> {
    let tokens = tokenize(sentence);

    if let Some(current) = spoken {
        return tokens
            .into_iter()
            .enumerate()
            .map(|(i, t)| WordHighlight {
                text: t.to_string(),
                kind: if i == current {
                    HighlightKind::Current
                } else {
                    HighlightKind::Plain
                },
            })
            .collect();
    }

    let Some(result) = result else {
        return tokens
            .into_iter()
            .map(|t| WordHighlight {
                text: t.to_string(),
                kind: HighlightKind::Plain,
            })
            .collect();
    };

    let correct: HashSet<String> = result.correct_words.iter().map(|w| normalize_token(w)).collect();
    let incorrect: HashSet<String> =
        result.incorrect_words.iter().map(|w| normalize_token(w)).collect();

    tokens
        .into_iter()
        .map(|t| {
            let key = normalize_token(t);
            let kind = if incorrect.contains(&key) {
                HighlightKind::Incorrect
            } else if correct.contains(&key) {
                HighlightKind::Correct
            } else {
                HighlightKind::Plain
            };
            WordHighlight {
                text: t.to_string(),
                kind,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FOX: &str = "The quick brown fox jumps.";

    fn fox_result() -> ScoringResult {
        ScoringResult::new(
            FOX,
            "Nice try.",
            vec!["The".into(), "quick".into(), "jumps.".into()],
            vec!["brown".into(), "fox".into()],
        )
        .unwrap()
    }

    fn kinds(words: &[WordHighlight]) -> Vec<HighlightKind> {
        words.iter().map(|w| w.kind).collect()
    }

    #[test]
    fn plain_without_playback_or_result() {
        let words = merge_highlights(FOX, None, None);
        assert_eq!(words.len(), 5);
        assert!(words.iter().all(|w| w.kind == HighlightKind::Plain));
        assert_eq!(words[4].text, "jumps.");
    }

    #[test]
    fn result_marks_each_token() {
        use HighlightKind::*;
        let words = merge_highlights(FOX, None, Some(&fox_result()));
        assert_eq!(kinds(&words), vec![Correct, Correct, Incorrect, Incorrect, Correct]);
    }

    #[test]
    fn playback_overrides_result() {
        use HighlightKind::*;
        let words = merge_highlights(FOX, Some(2), Some(&fox_result()));
        assert_eq!(kinds(&words), vec![Plain, Plain, Current, Plain, Plain]);
    }

    #[test]
    fn matching_ignores_case_and_punctuation() {
        let result = ScoringResult {
            feedback: "ok".into(),
            correct_words: vec!["hello".into()],
            incorrect_words: vec!["World".into()],
            accuracy_percentage: 50,
        };
        use HighlightKind::*;
        let words = merge_highlights("Hello, world!", None, Some(&result));
        assert_eq!(kinds(&words), vec![Correct, Incorrect]);
    }

    #[test]
    fn empty_sentence_has_no_words() {
        assert!(merge_highlights("  ", Some(0), None).is_empty());
    }
}

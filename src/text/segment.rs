//! Sentence segmentation.
//!
//! A sentence is a run that starts at a non-whitespace character and ends at
//! the first `.`, `!` or `?` that is followed by whitespace or the end of the
//! text.  A trailing run with no terminator becomes its own sentence.  `.`
//! does not cross line breaks, so every line is segmented on its own.
//!
//! The pattern has no look-around, so `fancy_regex` hands it whole to the
//! linear-time `regex` engine and long lines never hit the backtracking
//! limit.  The whitespace after a terminator is consumed and trimmed off.

use fancy_regex::Regex;
use once_cell::sync::Lazy;

static RE_SENTENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S.*?[.!?](?:\s|$)|\S.*").unwrap());

/// Split `text` into trimmed, non-empty sentences, preserving source order.
///
/// Total over all inputs: empty or whitespace-only text yields an empty
/// vector, text without terminal punctuation yields a single sentence.
///
/// ```rust
/// use speakeasy::text::segment_sentences;
///
/// assert!(segment_sentences("   ").is_empty());
/// assert_eq!(segment_sentences("Hello world"), vec!["Hello world"]);
/// assert_eq!(segment_sentences("Hi. Bye!"), vec!["Hi.", "Bye!"]);
/// ```
pub fn segment_sentences(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    RE_SENTENCE
        .find_iter(text)
        .map_while(|m| match m {
            Ok(m) => Some(m.as_str().trim()),
            Err(e) => {
                log::warn!("segment: regex aborted ({e}); keeping sentences found so far");
                None
            }
        })
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Segment `text`, falling back to the whole trimmed text as a single
/// sentence when segmentation finds nothing but the text is not blank.
pub fn sentences_or_whole(text: &str) -> Vec<String> {
    let sentences = segment_sentences(text);
    let trimmed = text.trim();
    if sentences.is_empty() && !trimmed.is_empty() {
        return vec![trimmed.to_string()];
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_nothing() {
        assert!(segment_sentences("").is_empty());
    }

    #[test]
    fn whitespace_only_yields_nothing() {
        assert!(segment_sentences("   ").is_empty());
        assert!(segment_sentences("\n\t \n").is_empty());
    }

    #[test]
    fn no_terminator_is_one_sentence() {
        assert_eq!(segment_sentences("Hello world"), vec!["Hello world"]);
    }

    #[test]
    fn splits_on_terminal_punctuation() {
        assert_eq!(segment_sentences("Hi. Bye!"), vec!["Hi.", "Bye!"]);
    }

    #[test]
    fn multiple_spaces_and_unterminated_tail() {
        assert_eq!(
            segment_sentences("One.  Two?   Three"),
            vec!["One.", "Two?", "Three"]
        );
    }

    #[test]
    fn leading_and_trailing_whitespace_is_trimmed() {
        assert_eq!(
            segment_sentences("   The cat sat.   The dog ran.   "),
            vec!["The cat sat.", "The dog ran."]
        );
    }

    #[test]
    fn punctuation_inside_a_word_does_not_split() {
        assert_eq!(
            segment_sentences("It costs 3.50 dollars. Cheap!"),
            vec!["It costs 3.50 dollars.", "Cheap!"]
        );
    }

    #[test]
    fn ellipsis_ends_at_last_dot() {
        assert_eq!(
            segment_sentences("Wait... what?"),
            vec!["Wait...", "what?"]
        );
    }

    #[test]
    fn line_breaks_separate_sentences() {
        assert_eq!(
            segment_sentences("First line\nSecond line."),
            vec!["First line", "Second line."]
        );
    }

    #[test]
    fn single_character_tail_is_kept() {
        assert_eq!(segment_sentences("Go. A"), vec!["Go.", "A"]);
    }

    #[test]
    fn rejoining_keeps_the_sentences() {
        let texts = [
            "",
            "   ",
            "Hello world",
            "Hi. Bye!",
            "One.  Two?   Three",
            "   The cat sat.   The dog ran.   ",
            "It costs 3.50 dollars. Cheap!",
            "Wait... what?",
            "First line\nSecond line.",
            "Go. A",
            "The sun is out.\n\nBirds sing!   Do you hear them?",
            "Really?! Yes.\tNo",
        ];
        for text in texts {
            let first = segment_sentences(text);
            let again = segment_sentences(&first.join(" "));
            assert_eq!(again, first, "rejoining {text:?}");
        }
    }

    #[test]
    fn long_unpunctuated_line_is_one_sentence() {
        let text = "word ".repeat(1 << 18);
        let sentences = segment_sentences(&text);
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0], text.trim());
    }

    #[test]
    fn long_line_keeps_its_trailing_sentence() {
        let text = format!("{}end. Tail", "word ".repeat(1 << 18));
        let sentences = segment_sentences(&text);
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].ends_with("end."));
        assert_eq!(sentences[1], "Tail");
    }

    #[test]
    fn fallback_uses_whole_trimmed_text() {
        assert_eq!(sentences_or_whole("  hello  "), vec!["hello"]);
        assert!(sentences_or_whole("  ").is_empty());
        assert_eq!(sentences_or_whole("A. B."), vec!["A.", "B."]);
    }
}

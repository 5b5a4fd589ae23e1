//! Whitespace tokenization and token lookup.
//!
//! A token is a maximal run of non-whitespace characters; punctuation stays
//! attached to the word it touches (`"jumps."` is one token).

/// Char-offset span of a token inside its sentence (`start..end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

/// Split `sentence` on whitespace.
pub fn tokenize(sentence: &str) -> Vec<&str> {
    sentence.split_whitespace().collect()
}

/// Number of tokens in `sentence`.
pub fn token_count(sentence: &str) -> usize {
    sentence.split_whitespace().count()
}

/// Char-offset spans for every token, in order.
pub fn token_spans(sentence: &str) -> Vec<TokenSpan> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    let mut count = 0;

    for (i, c) in sentence.chars().enumerate() {
        count = i + 1;
        match (c.is_whitespace(), start) {
            (false, None) => start = Some(i),
            (true, Some(s)) => {
                spans.push(TokenSpan { start: s, end: i });
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push(TokenSpan { start: s, end: count });
    }
    spans
}

/// Map a char offset reported by the synthesizer to a token index.
///
/// The whitespace after a token belongs to that token, and offsets before
/// the first token map to it.  Returns `None` when the sentence has no
/// tokens or the offset lies past the end of the sentence.
pub fn token_at_char(sentence: &str, char_index: usize) -> Option<usize> {
    if char_index >= sentence.chars().count() {
        return None;
    }
    let spans = token_spans(sentence);
    if spans.is_empty() {
        return None;
    }
    let idx = spans
        .iter()
        .rposition(|span| span.start <= char_index)
        .unwrap_or(0);
    Some(idx)
}

/// Lower-case `token` and strip surrounding punctuation, for matching
/// scorer output against displayed tokens.
pub fn normalize_token(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_stays_on_token() {
        assert_eq!(
            tokenize("The quick brown fox jumps."),
            vec!["The", "quick", "brown", "fox", "jumps."]
        );
    }

    #[test]
    fn empty_sentence_has_no_tokens() {
        assert!(tokenize("").is_empty());
        assert_eq!(token_count("   "), 0);
    }

    #[test]
    fn spans_track_char_offsets() {
        let spans = token_spans("Hi  there!");
        assert_eq!(
            spans,
            vec![
                TokenSpan { start: 0, end: 2 },
                TokenSpan { start: 4, end: 10 },
            ]
        );
    }

    #[test]
    fn spans_count_chars_not_bytes() {
        let spans = token_spans("café au lait");
        assert_eq!(spans[1], TokenSpan { start: 5, end: 7 });
    }

    #[test]
    fn char_offset_maps_to_token() {
        let s = "The quick brown";
        assert_eq!(token_at_char(s, 0), Some(0));
        assert_eq!(token_at_char(s, 3), Some(0)); // trailing space
        assert_eq!(token_at_char(s, 4), Some(1));
        assert_eq!(token_at_char(s, 10), Some(2));
    }

    #[test]
    fn char_offset_past_end_is_none() {
        assert_eq!(token_at_char("Hi", 2), None);
        assert_eq!(token_at_char("", 0), None);
    }

    #[test]
    fn normalization_lowercases_and_strips() {
        assert_eq!(normalize_token("Jumps."), "jumps");
        assert_eq!(normalize_token("\"Hello,\""), "hello");
        assert_eq!(normalize_token("don't"), "don't");
        assert_eq!(normalize_token("?!"), "");
    }
}

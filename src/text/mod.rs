//! Text handling: sentence segmentation and word tokenization.
//!
//! Both the pronunciation scorer and the word highlighter go through
//! [`tokenize`], so correctness badges always line up with the tokens the
//! user sees.
//!
//! ```rust
//! use speakeasy::text::{segment_sentences, tokenize};
//!
//! let sentences = segment_sentences("Hi there. How are you?");
//! assert_eq!(sentences, vec!["Hi there.", "How are you?"]);
//! assert_eq!(tokenize(&sentences[1]), vec!["How", "are", "you?"]);
//! ```

pub mod segment;
pub mod token;

pub use segment::{segment_sentences, sentences_or_whole};
pub use token::{normalize_token, token_at_char, token_count, token_spans, tokenize, TokenSpan};

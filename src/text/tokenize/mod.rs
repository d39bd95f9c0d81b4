//! Word-level tokenization.
//!
//! Subword tokenizers belong to whichever model consumes the ids; the
//! pipeline only needs a deterministic word splitter to build its vocabulary.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Splits text into string tokens.
pub trait Tokenizer {
    /// Tokenizes `text`.
    ///
    /// # Errors
    ///
    /// Implementations may reject input they cannot handle.
    fn tokenize(&self, text: &str) -> Result<Vec<String>>;
}

/// Word tokenizer that separates punctuation and keeps contractions.
///
/// - Splits on Unicode whitespace
/// - Emits ASCII punctuation (except apostrophes) as separate tokens
/// - Optionally lower-cases every token
///
/// # Examples
///
/// ```
/// use patclass::text::{Tokenizer, WordTokenizer};
///
/// let tokenizer = WordTokenizer::new();
/// let tokens = tokenizer.tokenize("A rotary pump, don't stall.").unwrap();
/// assert_eq!(tokens, vec!["a", "rotary", "pump", ",", "don't", "stall", "."]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTokenizer {
    lowercase: bool,
}

impl Default for WordTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl WordTokenizer {
    /// Creates a lower-casing word tokenizer.
    #[must_use]
    pub fn new() -> Self {
        Self { lowercase: true }
    }

    /// Keep the original casing.
    #[must_use]
    pub fn case_sensitive() -> Self {
        Self { lowercase: false }
    }

    fn is_separator(c: char) -> bool {
        c.is_ascii_punctuation() && c != '\''
    }

    fn finish(&self, token: &mut String, tokens: &mut Vec<String>) {
        if token.is_empty() {
            return;
        }
        let done = std::mem::take(token);
        tokens.push(if self.lowercase {
            done.to_lowercase()
        } else {
            done
        });
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let mut tokens = Vec::new();
        let mut current = String::new();

        for ch in text.chars() {
            if ch.is_whitespace() {
                self.finish(&mut current, &mut tokens);
            } else if Self::is_separator(ch) {
                self.finish(&mut current, &mut tokens);
                tokens.push(ch.to_string());
            } else {
                current.push(ch);
            }
        }
        self.finish(&mut current, &mut tokens);

        Ok(tokens)
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;

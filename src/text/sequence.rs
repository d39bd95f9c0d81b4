//! Fixed-length token id sequences.

use super::tokenize::{Tokenizer, WordTokenizer};
use crate::error::{PatclassError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Padding token, always id 0.
pub const PAD_TOKEN: &str = "[PAD]";
/// Out-of-vocabulary token, always id 1.
pub const UNK_TOKEN: &str = "[UNK]";
pub const PAD_ID: u32 = 0;
pub const UNK_ID: u32 = 1;

/// Token to id mapping with reserved padding and unknown ids.
///
/// Ids after the reserved ones are assigned by descending corpus frequency,
/// ties broken lexicographically, so the same corpus always produces the same
/// vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    tokens: Vec<String>,
    index: HashMap<String, u32>,
}

impl Vocabulary {
    /// Builds a vocabulary from tokenized documents.
    ///
    /// Tokens seen fewer than `min_frequency` times are left out. With
    /// `max_size`, only the most frequent tokens are kept so that the
    /// vocabulary (reserved ids included) holds at most `max_size` entries.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::InvalidHyperparameter`] if `max_size` leaves no
    /// room for the reserved tokens.
    pub fn build<I, D>(documents: I, min_frequency: usize, max_size: Option<usize>) -> Result<Self>
    where
        I: IntoIterator<Item = D>,
        D: AsRef<[String]>,
    {
        if let Some(max) = max_size {
            if max < 2 {
                return Err(PatclassError::invalid_hyperparameter(
                    "max_vocab_size",
                    max,
                    ">= 2 (room for [PAD] and [UNK])",
                ));
            }
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        let documents: Vec<D> = documents.into_iter().collect();
        for doc in &documents {
            for token in doc.as_ref() {
                *counts.entry(token.as_str()).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = counts
            .into_iter()
            .filter(|&(token, count)| count >= min_frequency && token != PAD_TOKEN && token != UNK_TOKEN)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        if let Some(max) = max_size {
            ranked.truncate(max - 2);
        }

        let tokens = [PAD_TOKEN, UNK_TOKEN]
            .into_iter()
            .chain(ranked.into_iter().map(|(t, _)| t))
            .map(str::to_string)
            .collect();
        Self::from_tokens(tokens)
    }

    /// Creates a vocabulary from tokens in id order.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::FormatError`] if the reserved tokens are not at
    /// ids 0 and 1 or a token repeats.
    pub fn from_tokens(tokens: Vec<String>) -> Result<Self> {
        if tokens.first().map(String::as_str) != Some(PAD_TOKEN)
            || tokens.get(1).map(String::as_str) != Some(UNK_TOKEN)
        {
            return Err(PatclassError::FormatError {
                message: format!("vocabulary must start with {PAD_TOKEN} and {UNK_TOKEN}"),
            });
        }

        let mut index = HashMap::with_capacity(tokens.len());
        for (id, token) in tokens.iter().enumerate() {
            let id = u32::try_from(id).map_err(|_| PatclassError::FormatError {
                message: "vocabulary exceeds u32 ids".to_string(),
            })?;
            if index.insert(token.clone(), id).is_some() {
                return Err(PatclassError::FormatError {
                    message: format!("duplicate vocabulary token '{token}'"),
                });
            }
        }
        Ok(Self { tokens, index })
    }

    /// Id of `token`, or [`UNK_ID`].
    #[must_use]
    pub fn id(&self, token: &str) -> u32 {
        self.index.get(token).copied().unwrap_or(UNK_ID)
    }

    #[must_use]
    pub fn token(&self, id: u32) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    /// Number of ids, reserved ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when only the reserved tokens are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.len() <= 2
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = PatclassError;

    fn try_from(tokens: Vec<String>) -> Result<Self> {
        Self::from_tokens(tokens)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocab: Vocabulary) -> Self {
        vocab.tokens
    }
}

/// Token ids of one text plus its attention mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedText {
    pub ids: Vec<u32>,
    /// 1 for real tokens, 0 for padding
    pub attention_mask: Vec<u8>,
}

/// Encodes text into fixed-length id sequences.
///
/// Sequences longer than `max_length` are truncated; shorter ones are
/// right-padded with [`PAD_ID`].
///
/// # Examples
///
/// ```
/// use patclass::text::{SequenceEncoder, PAD_ID};
///
/// let mut encoder = SequenceEncoder::new(6);
/// encoder.fit(&["rotary pump", "rotary valve"]).unwrap();
///
/// let encoded = encoder.encode("rotary pump").unwrap();
/// assert_eq!(encoded.ids.len(), 6);
/// assert_eq!(encoded.ids[2], PAD_ID);
/// assert_eq!(encoded.attention_mask, vec![1, 1, 0, 0, 0, 0]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceEncoder {
    tokenizer: WordTokenizer,
    max_length: usize,
    min_frequency: usize,
    max_vocab_size: Option<usize>,
    vocab: Option<Vocabulary>,
}

impl SequenceEncoder {
    /// Creates an unfitted encoder producing sequences of `max_length` ids.
    #[must_use]
    pub fn new(max_length: usize) -> Self {
        Self {
            tokenizer: WordTokenizer::new(),
            max_length,
            min_frequency: 1,
            max_vocab_size: None,
            vocab: None,
        }
    }

    #[must_use]
    pub fn with_min_frequency(mut self, min_frequency: usize) -> Self {
        self.min_frequency = min_frequency;
        self
    }

    #[must_use]
    pub fn with_max_vocab_size(mut self, max_vocab_size: Option<usize>) -> Self {
        self.max_vocab_size = max_vocab_size;
        self
    }

    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: WordTokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    #[must_use]
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    #[must_use]
    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocab.as_ref()
    }

    /// Number of distinct ids the encoder can emit (0 before fit).
    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.vocab.as_ref().map_or(0, Vocabulary::len)
    }

    /// Builds the vocabulary from `texts`.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::InvalidHyperparameter`] for a zero
    /// `max_length` or a too small vocabulary limit, and
    /// [`PatclassError::EmptyInput`] if `texts` is empty.
    pub fn fit<S: AsRef<str>>(&mut self, texts: &[S]) -> Result<()> {
        if self.max_length == 0 {
            return Err(PatclassError::invalid_hyperparameter(
                "max_sequence_length",
                0,
                ">0",
            ));
        }
        if texts.is_empty() {
            return Err(PatclassError::empty_input("cannot fit vocabulary"));
        }

        let documents = texts
            .iter()
            .map(|t| self.tokenizer.tokenize(t.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        self.vocab = Some(Vocabulary::build(
            &documents,
            self.min_frequency,
            self.max_vocab_size,
        )?);
        Ok(())
    }

    /// Encodes one text.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::NotFitted`] before [`fit`](Self::fit).
    pub fn encode(&self, text: &str) -> Result<EncodedText> {
        let vocab = self.vocab.as_ref().ok_or_else(|| PatclassError::NotFitted {
            what: "SequenceEncoder".to_string(),
        })?;

        let mut ids: Vec<u32> = self
            .tokenizer
            .tokenize(text)?
            .iter()
            .take(self.max_length)
            .map(|t| vocab.id(t))
            .collect();
        let real = ids.len();
        ids.resize(self.max_length, PAD_ID);

        let mut attention_mask = vec![1u8; real];
        attention_mask.resize(self.max_length, 0);
        Ok(EncodedText {
            ids,
            attention_mask,
        })
    }

    /// Encodes many texts, keeping only the ids.
    ///
    /// # Errors
    ///
    /// Same as [`encode`](Self::encode).
    pub fn encode_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Vec<u32>>> {
        texts
            .iter()
            .map(|t| self.encode(t.as_ref()).map(|e| e.ids))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn test_vocabulary_order() {
        let docs = vec![tokens(&["pump", "valve", "pump"]), tokens(&["gear", "valve", "pump"])];
        let vocab = Vocabulary::build(&docs, 1, None).expect("build");
        assert_eq!(vocab.token(0), Some(PAD_TOKEN));
        assert_eq!(vocab.token(1), Some(UNK_TOKEN));
        assert_eq!(vocab.id("pump"), 2);
        assert_eq!(vocab.id("valve"), 3);
        assert_eq!(vocab.id("gear"), 4);
        assert_eq!(vocab.id("turbine"), UNK_ID);
        assert_eq!(vocab.len(), 5);
    }

    #[test]
    fn test_vocabulary_ties_are_lexicographic() {
        let docs = vec![tokens(&["zeta", "alpha", "mid"])];
        let vocab = Vocabulary::build(&docs, 1, None).expect("build");
        assert_eq!(vocab.token(2), Some("alpha"));
        assert_eq!(vocab.token(3), Some("mid"));
        assert_eq!(vocab.token(4), Some("zeta"));
    }

    #[test]
    fn test_vocabulary_limits() {
        let docs = vec![tokens(&["a", "a", "b", "b", "c"])];
        let vocab = Vocabulary::build(&docs, 2, None).expect("build");
        assert!(!vocab.contains("c"));

        let vocab = Vocabulary::build(&docs, 1, Some(3)).expect("build");
        assert_eq!(vocab.len(), 3);
        assert!(vocab.contains("a"));

        assert!(Vocabulary::build(&docs, 1, Some(1)).is_err());
    }

    #[test]
    fn test_vocabulary_serde_rebuilds_index() {
        let docs = vec![tokens(&["pump", "valve"])];
        let vocab = Vocabulary::build(&docs, 1, None).expect("build");
        let json = serde_json::to_string(&vocab).expect("serialize");
        assert!(json.starts_with("[\"[PAD]\",\"[UNK]\""));
        let restored: Vocabulary = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, vocab);
        assert_eq!(restored.id("valve"), vocab.id("valve"));

        assert!(serde_json::from_str::<Vocabulary>("[\"pump\"]").is_err());
    }

    #[test]
    fn test_truncate_and_pad() {
        let mut encoder = SequenceEncoder::new(3);
        encoder.fit(&["one two three four five"]).expect("fit");

        let long = encoder.encode("one two three four five").expect("encode");
        assert_eq!(long.ids.len(), 3);
        assert_eq!(long.attention_mask, vec![1, 1, 1]);
        assert!(long.ids.iter().all(|&id| id > UNK_ID));

        let short = encoder.encode("two").expect("encode");
        assert_eq!(short.ids[1..], [PAD_ID, PAD_ID]);
        assert_eq!(short.attention_mask, vec![1, 0, 0]);

        let empty = encoder.encode("").expect("encode");
        assert_eq!(empty.ids, vec![PAD_ID; 3]);
    }

    #[test]
    fn test_unknown_words_map_to_unk() {
        let mut encoder = SequenceEncoder::new(4);
        encoder.fit(&["pump"]).expect("fit");
        let encoded = encoder.encode("pump turbine").expect("encode");
        assert_eq!(encoded.ids[1], UNK_ID);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let texts = ["A rotary pump.", "A check valve for pumps.", "Gear train."];
        let mut a = SequenceEncoder::new(8);
        let mut b = SequenceEncoder::new(8);
        a.fit(&texts).expect("fit");
        b.fit(&texts).expect("fit");
        assert_eq!(
            a.encode_batch(&texts).expect("encode"),
            b.encode_batch(&texts).expect("encode")
        );
    }

    #[test]
    fn test_not_fitted_and_bad_length() {
        assert!(matches!(
            SequenceEncoder::new(4).encode("x"),
            Err(PatclassError::NotFitted { .. })
        ));
        assert!(SequenceEncoder::new(0).fit(&["x"]).is_err());
        let empty: [&str; 0] = [];
        assert!(SequenceEncoder::new(4).fit(&empty).is_err());
    }
}

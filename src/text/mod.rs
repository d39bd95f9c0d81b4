//! Text processing for the title/abstract pipeline.
//!
//! - [`WordTokenizer`]: deterministic word splitting
//! - [`Vocabulary`]: frequency-ranked token ids with reserved `[PAD]`/`[UNK]`
//! - [`SequenceEncoder`]: fixed-length, padded id sequences

pub mod sequence;
pub mod tokenize;

pub use sequence::{EncodedText, SequenceEncoder, Vocabulary, PAD_ID, PAD_TOKEN, UNK_ID, UNK_TOKEN};
pub use tokenize::{Tokenizer, WordTokenizer};

//! Tagger adapter boundary.
//!
//! The annotator only sees the [`Tagger`] trait. Any model (a rule-based
//! lexicon, a remote service, a batched neural tagger) plugs in behind it
//! without changing the annotated data model.

pub mod lexicon;

pub use lexicon::LexiconTagger;

use crate::error::TaggerError;
use serde::{Deserialize, Serialize};

/// Coarse tags the core relies on.
pub mod tags {
    pub const NOUN: &str = "NOUN";
    pub const PROPN: &str = "PROPN";
    pub const VERB: &str = "VERB";
    pub const AUX: &str = "AUX";
    pub const ADJ: &str = "ADJ";
    pub const ADV: &str = "ADV";
    pub const PRON: &str = "PRON";
    pub const DET: &str = "DET";
    pub const ADP: &str = "ADP";
    pub const PART: &str = "PART";
    pub const CCONJ: &str = "CCONJ";
    pub const SCONJ: &str = "SCONJ";
    pub const INTJ: &str = "INTJ";
    pub const NUM: &str = "NUM";
    pub const PUNCT: &str = "PUNCT";
    pub const SPACE: &str = "SPACE";
}

/// One token as returned by a tagger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    /// Surface form as it appears in the text.
    pub surface: String,
    /// Coarse (universal) part-of-speech tag.
    pub coarse: String,
    /// Fine-grained, tagger-specific tag.
    pub fine: String,
}

impl TaggedToken {
    pub fn new(surface: impl Into<String>, coarse: &str, fine: &str) -> Self {
        Self {
            surface: surface.into(),
            coarse: coarse.to_string(),
            fine: fine.to_string(),
        }
    }

    /// Punctuation or whitespace: excluded from every annotated sequence.
    pub fn is_filtered(&self) -> bool {
        self.coarse == tags::PUNCT
            || self.coarse == tags::SPACE
            || self.surface.trim().is_empty()
            || self.surface.chars().all(|c| c.is_ascii_punctuation())
    }

    pub fn is_pronoun(&self) -> bool {
        self.coarse == tags::PRON
    }
}

/// Converts raw text into tagged tokens.
///
/// Implementations must be deterministic for a given model version.
pub trait Tagger: Send + Sync {
    /// Tag a single text.
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, TaggerError>;

    /// Tag several texts at once. Results are returned in input order.
    fn tag_batch(&self, texts: &[&str]) -> Vec<Result<Vec<TaggedToken>, TaggerError>> {
        texts.iter().map(|text| self.tag(text)).collect()
    }

    /// Preferred number of texts per [`Tagger::tag_batch`] call.
    fn batch_size(&self) -> usize {
        1
    }

    /// Model name and version, for report metadata.
    fn name(&self) -> &str;
}

impl<T: Tagger + ?Sized> Tagger for Box<T> {
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, TaggerError> {
        (**self).tag(text)
    }

    fn tag_batch(&self, texts: &[&str]) -> Vec<Result<Vec<TaggedToken>, TaggerError>> {
        (**self).tag_batch(texts)
    }

    fn batch_size(&self) -> usize {
        (**self).batch_size()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

//! Error types for corpus annotation and aggregation.
//!
//! Query-level failures are typed so the presentation layer can decide how
//! to render them; tagger failures are per-document and never abort a run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Library result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of the tagger adapter on a single document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaggerError {
    /// The document carries no text to tag.
    #[error("document has no text")]
    MissingText,

    /// The adapter could not process the text.
    #[error("tagger failed: {reason}")]
    Failed {
        /// Adapter-provided description.
        reason: String,
    },
}

/// Library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Tagging failed for one document.
    #[error("tagger failed on document {index}: {source}")]
    Tagger {
        /// Position of the document in the input corpus.
        index: usize,
        /// Underlying adapter error.
        #[source]
        source: TaggerError,
    },

    /// A group filter selected no documents or no tokens.
    #[error("no tokens found for group '{group}'")]
    EmptyGroup {
        /// Human-readable description of the filter.
        group: String,
    },

    /// An annotated record violated its length invariant.
    #[error("invalid annotated record: {0}")]
    InvalidRecord(String),

    /// Annotation was cancelled before completion.
    #[error("annotation cancelled after {processed} documents")]
    Cancelled {
        /// Documents processed before the cancellation was observed.
        processed: usize,
    },

    /// A corpus line could not be decoded.
    #[error("corpus error at line {line}: {message}")]
    Corpus {
        /// 1-indexed line number, 0 when the row position is unknown.
        line: usize,
        /// Decoder message.
        message: String,
    },

    /// IO error with path context.
    #[error("IO error at {path:?}: {source}")]
    Io {
        /// The underlying IO error.
        source: std::io::Error,
        /// File path where the error occurred.
        path: PathBuf,
    },
}

impl Error {
    /// Build an [`Error::EmptyGroup`] from any displayable filter.
    pub fn empty_group(group: impl fmt::Display) -> Self {
        Error::EmptyGroup {
            group: group.to_string(),
        }
    }
}

/// Ratio whose denominator may be floor-clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioKind {
    NounVerb,
    AdjectiveNoun,
    LexicalDensity,
    SyntacticComplexity,
}

impl fmt::Display for RatioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioKind::NounVerb => write!(f, "noun/verb ratio"),
            RatioKind::AdjectiveNoun => write!(f, "adjective/noun ratio"),
            RatioKind::LexicalDensity => write!(f, "lexical density"),
            RatioKind::SyntacticComplexity => write!(f, "syntactic complexity"),
        }
    }
}

/// Non-fatal: a ratio's denominator was zero and was clamped to one.
///
/// The ratio it refers to is uninformative and should not be read as a
/// measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegenerateRatioWarning {
    pub ratio: RatioKind,
}

impl fmt::Display for DegenerateRatioWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} has a zero denominator (clamped to 1)", self.ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_group_message() {
        let err = Error::empty_group("genre = rock");
        assert_eq!(err.to_string(), "no tokens found for group 'genre = rock'");
    }

    #[test]
    fn test_tagger_error_source() {
        let err = Error::Tagger {
            index: 4,
            source: TaggerError::MissingText,
        };
        assert!(err.to_string().contains("document 4"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_degenerate_warning_display() {
        let warning = DegenerateRatioWarning {
            ratio: RatioKind::NounVerb,
        };
        assert!(warning.to_string().starts_with("noun/verb ratio"));
    }
}

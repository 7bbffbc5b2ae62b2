//! Aggregation over annotated corpora.
//!
//! `aggregator` holds the pure query functions, `engine` memoizes them per
//! parameter tuple, `temporal` buckets documents by release year and
//! `profile` describes the raw document set.

pub mod aggregator;
pub mod engine;
pub mod frequency;
pub mod profile;
pub mod temporal;

pub use aggregator::{
    comparative_patterns, derived_metrics, fine_tags_by_explicit, pos_distribution,
    pronoun_analysis, BucketCounts, BucketRules, ComparisonReport, ExplicitReport,
    ExplicitTagCount, GroupPronouns, MetricsReport, Person, PersonCounts, PronounLexicon,
    PronounReport, TagDifference, TagScheme,
};
pub use engine::{AggregationEngine, AnalysisSettings};
pub use frequency::{FrequencyTable, RankedEntry};
pub use profile::{emotion_distribution, popularity_by_genre, CorpusProfile, GenrePopularity};
pub use temporal::{BucketPopularity, BucketSentiment, BucketWords, TemporalIndex};

//! LyricMorph - morphological statistics for song-lyric corpora.
//!
//! The pipeline runs in three stages:
//!
//! 1. [`corpus`] loads [`models::Document`]s from JSON Lines or a JSON array.
//! 2. [`annotator::Annotator`] tags every document through a
//!    [`tagger::Tagger`] and produces an immutable
//!    [`models::AnnotatedCorpus`].
//! 3. [`analysis`] answers grouped queries over that corpus: POS
//!    distributions, derived ratios, pronoun usage, genre contrasts and
//!    per-decade trends, memoized by [`analysis::AggregationEngine`] and
//!    [`analysis::TemporalIndex`].
//!
//! [`report`] renders the results; [`cli`] and [`config`] back the
//! `lyricmorph` binary.

pub mod analysis;
pub mod annotator;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod models;
pub mod report;
pub mod tagger;

pub use error::{Error, Result};

//! Data models for the lyric corpus.
//!
//! This module contains the input documents, the annotated records produced
//! from them, and the grouping keys used by every aggregation.

use crate::error::{Error, Result};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One corpus entry, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Lyrics. Missing text is kept so the annotator can skip it explicitly.
    #[serde(default)]
    pub text: Option<String>,
    /// Genre label (e.g. "pop", "hip hop").
    #[serde(alias = "Genre")]
    pub genre: String,
    /// Release year.
    #[serde(alias = "Release Date", alias = "year")]
    pub release_year: i32,
    /// Sentiment/emotion label.
    pub emotion: String,
    /// Whether the track is flagged explicit.
    #[serde(
        default,
        alias = "Explicit",
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub explicit: Option<bool>,
    /// Popularity score.
    #[serde(default, alias = "Popularity", skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
}

impl Document {
    /// Creates a document with the required fields only.
    pub fn new(
        text: impl Into<String>,
        genre: impl Into<String>,
        release_year: i32,
        emotion: impl Into<String>,
    ) -> Self {
        Self {
            text: Some(text.into()),
            genre: genre.into(),
            release_year,
            emotion: emotion.into(),
            explicit: None,
            popularity: None,
        }
    }

    /// Sets the explicit flag.
    pub fn with_explicit(mut self, explicit: bool) -> Self {
        self.explicit = Some(explicit);
        self
    }

    /// Sets the popularity score.
    pub fn with_popularity(mut self, popularity: f64) -> Self {
        self.popularity = Some(popularity);
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Accepts `true`/`false`, `0`/`1` and `"Yes"`/`"No"` (the cleaned corpus
/// uses all three).
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr: Option<FlagRepr> = Option::deserialize(deserializer)?;
    match repr {
        None => Ok(None),
        Some(FlagRepr::Bool(b)) => Ok(Some(b)),
        Some(FlagRepr::Int(0)) => Ok(Some(false)),
        Some(FlagRepr::Int(1)) => Ok(Some(true)),
        Some(FlagRepr::Int(other)) => Err(de::Error::custom(format!(
            "invalid explicit flag: {}",
            other
        ))),
        Some(FlagRepr::Text(s)) => match s.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "yes" | "true" | "1" => Ok(Some(true)),
            "no" | "false" | "0" => Ok(Some(false)),
            other => Err(de::Error::custom(format!(
                "invalid explicit flag: {}",
                other
            ))),
        },
    }
}

/// A labelled, inclusive range of release years.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeBucket {
    pub label: String,
    /// First year (inclusive).
    pub start: i32,
    /// Last year (inclusive).
    pub end: i32,
}

impl TimeBucket {
    pub fn new(label: impl Into<String>, start: i32, end: i32) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }

    /// The four decade buckets covering 1990-2024.
    pub fn decades() -> Vec<TimeBucket> {
        vec![
            TimeBucket::new("1990s", 1990, 1999),
            TimeBucket::new("2000s", 2000, 2009),
            TimeBucket::new("2010s", 2010, 2019),
            TimeBucket::new("2020s", 2020, 2024),
        ]
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }

    pub fn overlaps(&self, other: &TimeBucket) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Find the bucket a year falls into, if any.
pub fn bucket_for(buckets: &[TimeBucket], year: i32) -> Option<&TimeBucket> {
    buckets.iter().find(|b| b.contains(year))
}

/// Grouping key applied to records before aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum GroupFilter {
    All,
    Genre(String),
    Period(TimeBucket),
}

impl GroupFilter {
    pub fn genre(genre: impl Into<String>) -> Self {
        GroupFilter::Genre(genre.into())
    }

    /// Whether a document with this genre and year belongs to the group.
    pub fn matches(&self, genre: &str, year: i32) -> bool {
        match self {
            GroupFilter::All => true,
            GroupFilter::Genre(g) => g == genre,
            GroupFilter::Period(bucket) => bucket.contains(year),
        }
    }

    /// Short label used in report headings.
    pub fn label(&self) -> String {
        match self {
            GroupFilter::All => "all".to_string(),
            GroupFilter::Genre(g) => g.clone(),
            GroupFilter::Period(bucket) => bucket.label.clone(),
        }
    }
}

impl From<Option<String>> for GroupFilter {
    fn from(genre: Option<String>) -> Self {
        genre.map(GroupFilter::Genre).unwrap_or(GroupFilter::All)
    }
}

impl fmt::Display for GroupFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupFilter::All => write!(f, "all genres"),
            GroupFilter::Genre(g) => write!(f, "genre = {}", g),
            GroupFilter::Period(bucket) => {
                write!(f, "period = {} ({}-{})", bucket.label, bucket.start, bucket.end)
            }
        }
    }
}

/// Tagging output for one document.
///
/// Punctuation and whitespace tokens are already removed, so
/// `coarse_tags`, `fine_tags` and `token_count` always agree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedRecord {
    doc_index: usize,
    genre: String,
    year: i32,
    explicit: Option<bool>,
    coarse_tags: Vec<String>,
    fine_tags: Vec<String>,
    pronouns: Vec<String>,
    token_count: usize,
}

impl AnnotatedRecord {
    /// Build a record for `document`, checking the tag length invariant.
    pub fn for_document(
        doc_index: usize,
        document: &Document,
        coarse_tags: Vec<String>,
        fine_tags: Vec<String>,
        pronouns: Vec<String>,
    ) -> Result<Self> {
        if coarse_tags.len() != fine_tags.len() {
            return Err(Error::InvalidRecord(format!(
                "document {}: {} coarse tags but {} fine tags",
                doc_index,
                coarse_tags.len(),
                fine_tags.len()
            )));
        }
        if pronouns.len() > coarse_tags.len() {
            return Err(Error::InvalidRecord(format!(
                "document {}: {} pronouns exceed {} tokens",
                doc_index,
                pronouns.len(),
                coarse_tags.len()
            )));
        }

        Ok(Self {
            doc_index,
            genre: document.genre.clone(),
            year: document.release_year,
            explicit: document.explicit,
            token_count: coarse_tags.len(),
            coarse_tags,
            fine_tags,
            pronouns,
        })
    }

    pub fn doc_index(&self) -> usize {
        self.doc_index
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn explicit(&self) -> Option<bool> {
        self.explicit
    }

    pub fn coarse_tags(&self) -> &[String] {
        &self.coarse_tags
    }

    pub fn fine_tags(&self) -> &[String] {
        &self.fine_tags
    }

    pub fn pronouns(&self) -> &[String] {
        &self.pronouns
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn matches(&self, filter: &GroupFilter) -> bool {
        filter.matches(&self.genre, self.year)
    }
}

/// A document the annotator could not tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub index: usize,
    pub reason: String,
}

static NEXT_CORPUS_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an [`AnnotatedCorpus`], used as cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CorpusId(u64);

impl CorpusId {
    fn next() -> Self {
        CorpusId(NEXT_CORPUS_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CorpusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "corpus#{}", self.0)
    }
}

/// The annotated record set plus the documents backing it.
///
/// Built once and never mutated; every query reads from a shared reference.
#[derive(Debug)]
pub struct AnnotatedCorpus {
    id: CorpusId,
    documents: Arc<[Document]>,
    records: Vec<AnnotatedRecord>,
    skipped: Vec<SkippedDocument>,
}

impl AnnotatedCorpus {
    pub fn new(
        documents: Arc<[Document]>,
        records: Vec<AnnotatedRecord>,
        skipped: Vec<SkippedDocument>,
    ) -> Self {
        Self {
            id: CorpusId::next(),
            documents,
            records,
            skipped,
        }
    }

    pub fn id(&self) -> CorpusId {
        self.id
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn records(&self) -> &[AnnotatedRecord] {
        &self.records
    }

    pub fn skipped(&self) -> &[SkippedDocument] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records selected by `filter`, in corpus order.
    pub fn matching<'a>(
        &'a self,
        filter: &'a GroupFilter,
    ) -> impl Iterator<Item = &'a AnnotatedRecord> + 'a {
        self.records.iter().filter(move |r| r.matches(filter))
    }

    /// Token count over the records selected by `filter`.
    pub fn token_count(&self, filter: &GroupFilter) -> usize {
        self.matching(filter).map(|r| r.token_count()).sum()
    }

    /// Distinct genres in first-seen order.
    pub fn genres(&self) -> Vec<String> {
        let mut genres: Vec<String> = Vec::new();
        for record in &self.records {
            if !genres.iter().any(|g| g == record.genre()) {
                genres.push(record.genre().to_string());
            }
        }
        genres
    }
}

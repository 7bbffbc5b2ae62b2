//! Release-year buckets and per-bucket word and sentiment statistics.

use crate::analysis::frequency::{FrequencyTable, RankedEntry};
use crate::models::{bucket_for, AnnotatedCorpus, CorpusId, Document, TimeBucket};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Most frequent words of one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketWords {
    pub bucket: TimeBucket,
    pub documents: usize,
    pub total_words: usize,
    pub words: Vec<RankedEntry>,
}

/// Emotion distribution of one bucket; percentages are of the bucket's
/// documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSentiment {
    pub bucket: TimeBucket,
    pub documents: usize,
    pub emotions: Vec<RankedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketPopularity {
    pub bucket: TimeBucket,
    pub documents: usize,
    /// Documents carrying a popularity score.
    pub rated: usize,
    pub mean: Option<f64>,
}

/// Full word counts of one bucket, kept so any `top_n` can be served.
#[derive(Debug)]
struct BucketTable {
    bucket: TimeBucket,
    documents: usize,
    table: FrequencyTable,
}

/// Cached value together with the corpus it was computed from.
#[derive(Debug)]
struct Memo<T> {
    corpus: CorpusId,
    value: Arc<T>,
}

/// Splits lyrics into lower-cased words.
///
/// Tokens are whitespace-separated, stripped of surrounding non-alphanumeric
/// characters and kept only when what remains is entirely alphanumeric.
pub fn tokenize_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().filter_map(|raw| {
        let word = raw
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if !word.is_empty() && word.chars().all(char::is_alphanumeric) {
            Some(word)
        } else {
            None
        }
    })
}

/// Partitions documents by release year and memoizes bucket statistics per
/// corpus.
#[derive(Debug)]
pub struct TemporalIndex {
    buckets: Vec<TimeBucket>,
    words: Mutex<Option<Memo<Vec<BucketTable>>>>,
    sentiment: Mutex<Option<Memo<Vec<BucketSentiment>>>>,
    tokenization_passes: AtomicUsize,
    sentiment_passes: AtomicUsize,
}

impl Default for TemporalIndex {
    fn default() -> Self {
        Self::new(TimeBucket::decades())
    }
}

impl TemporalIndex {
    pub fn new(buckets: Vec<TimeBucket>) -> Self {
        Self {
            buckets,
            words: Mutex::new(None),
            sentiment: Mutex::new(None),
            tokenization_passes: AtomicUsize::new(0),
            sentiment_passes: AtomicUsize::new(0),
        }
    }

    pub fn buckets(&self) -> &[TimeBucket] {
        &self.buckets
    }

    pub fn bucket_for(&self, year: i32) -> Option<&TimeBucket> {
        bucket_for(&self.buckets, year)
    }

    /// Documents of each bucket, in bucket order. Years outside every
    /// bucket are dropped.
    pub fn partition<'a>(
        &self,
        documents: &'a [Document],
    ) -> Vec<(&TimeBucket, Vec<&'a Document>)> {
        let mut parts: Vec<(&TimeBucket, Vec<&'a Document>)> =
            self.buckets.iter().map(|b| (b, Vec::new())).collect();
        for doc in documents {
            if let Some(part) = parts.iter_mut().find(|(b, _)| b.contains(doc.release_year)) {
                part.1.push(doc);
            }
        }
        parts
    }

    /// How many times document text has been tokenized.
    pub fn tokenization_passes(&self) -> usize {
        self.tokenization_passes.load(Ordering::Relaxed)
    }

    /// How many times sentiment tables have been built.
    pub fn sentiment_passes(&self) -> usize {
        self.sentiment_passes.load(Ordering::Relaxed)
    }

    /// The `top_n` words of every non-empty bucket.
    pub fn top_words_by_bucket(
        &self,
        corpus: &AnnotatedCorpus,
        top_n: usize,
    ) -> Vec<BucketWords> {
        let tables = self.word_tables(corpus);
        tables
            .iter()
            .map(|entry| BucketWords {
                bucket: entry.bucket.clone(),
                documents: entry.documents,
                total_words: entry.table.total(),
                words: entry.table.top(top_n),
            })
            .collect()
    }

    /// Emotion distribution of every non-empty bucket.
    pub fn sentiment_by_bucket(&self, corpus: &AnnotatedCorpus) -> Vec<BucketSentiment> {
        let mut memo = self
            .sentiment
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(hit) = memo.as_ref().filter(|m| m.corpus == corpus.id()) {
            debug!(corpus = %corpus.id(), "Sentiment cache hit");
            return hit.value.as_ref().clone();
        }

        self.sentiment_passes.fetch_add(1, Ordering::Relaxed);
        let value: Vec<BucketSentiment> = self
            .partition(corpus.documents())
            .into_iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(bucket, docs)| {
                let table = FrequencyTable::from_labels(docs.iter().map(|d| d.emotion.as_str()));
                BucketSentiment {
                    bucket: bucket.clone(),
                    documents: docs.len(),
                    emotions: table.ranked(),
                }
            })
            .collect();

        let result = value.clone();
        *memo = Some(Memo {
            corpus: corpus.id(),
            value: Arc::new(value),
        });
        result
    }

    /// Mean popularity of every non-empty bucket.
    pub fn popularity_by_bucket(&self, corpus: &AnnotatedCorpus) -> Vec<BucketPopularity> {
        self.partition(corpus.documents())
            .into_iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(bucket, docs)| {
                let scores: Vec<f64> = docs.iter().filter_map(|d| d.popularity).collect();
                let mean = if scores.is_empty() {
                    None
                } else {
                    Some(scores.iter().sum::<f64>() / scores.len() as f64)
                };
                BucketPopularity {
                    bucket: bucket.clone(),
                    documents: docs.len(),
                    rated: scores.len(),
                    mean,
                }
            })
            .collect()
    }

    fn word_tables(&self, corpus: &AnnotatedCorpus) -> Arc<Vec<BucketTable>> {
        let mut memo = self
            .words
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(hit) = memo.as_ref().filter(|m| m.corpus == corpus.id()) {
            debug!(corpus = %corpus.id(), "Word frequency cache hit");
            return Arc::clone(&hit.value);
        }

        self.tokenization_passes.fetch_add(1, Ordering::Relaxed);
        info!(corpus = %corpus.id(), "Computing word frequencies per bucket");

        let tables: Vec<BucketTable> = self
            .partition(corpus.documents())
            .into_iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(bucket, docs)| {
                let mut table = FrequencyTable::new();
                for text in docs.iter().filter_map(|d| d.text.as_deref()) {
                    for word in tokenize_words(text) {
                        table.add(&word, 1);
                    }
                }
                BucketTable {
                    bucket: bucket.clone(),
                    documents: docs.len(),
                    table,
                }
            })
            .collect();

        let value = Arc::new(tables);
        *memo = Some(Memo {
            corpus: corpus.id(),
            value: Arc::clone(&value),
        });
        value
    }
}

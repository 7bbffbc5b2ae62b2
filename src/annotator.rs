//! Corpus annotation loop.
//!
//! Runs the tagger over every document in input order and produces one
//! [`AnnotatedRecord`] per document. A document the tagger cannot handle is
//! logged and skipped; it never aborts the corpus.

use crate::error::{Error, Result, TaggerError};
use crate::models::{AnnotatedCorpus, AnnotatedRecord, Document, SkippedDocument};
use crate::tagger::{TaggedToken, Tagger};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Characters of each document handed to the tagger.
pub const DEFAULT_MAX_CHARS: usize = 512;

/// Documents between two progress log events.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 500;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})";

/// Configuration for the annotator.
#[derive(Debug, Clone)]
pub struct AnnotatorConfig {
    /// Texts longer than this are tagged on their prefix only.
    pub max_chars: usize,
    /// Emit a progress event every N documents (0 disables).
    pub progress_interval: usize,
    /// Draw a terminal progress bar.
    pub show_progress: bool,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            show_progress: false,
        }
    }
}

impl From<&crate::config::AnnotatorSettings> for AnnotatorConfig {
    fn from(settings: &crate::config::AnnotatorSettings) -> Self {
        Self {
            max_chars: settings.max_chars,
            progress_interval: settings.progress_interval,
            show_progress: settings.show_progress,
        }
    }
}

/// Longest prefix of `text` with at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Build the record for one document from raw tagger output.
pub fn record_from_tokens(
    index: usize,
    document: &Document,
    tokens: &[TaggedToken],
) -> Result<AnnotatedRecord> {
    let kept: Vec<&TaggedToken> = tokens.iter().filter(|t| !t.is_filtered()).collect();

    let coarse_tags = kept.iter().map(|t| t.coarse.clone()).collect();
    let fine_tags = kept.iter().map(|t| t.fine.clone()).collect();
    let pronouns = kept
        .iter()
        .filter(|t| t.is_pronoun())
        .map(|t| t.surface.to_lowercase())
        .collect();

    AnnotatedRecord::for_document(index, document, coarse_tags, fine_tags, pronouns)
}

/// Runs a [`Tagger`] over a document set.
pub struct Annotator<T: Tagger> {
    tagger: T,
    config: AnnotatorConfig,
}

impl<T: Tagger> Annotator<T> {
    pub fn new(tagger: T, config: AnnotatorConfig) -> Self {
        info!(
            "Initializing annotator with tagger {} (max {} chars per document)",
            tagger.name(),
            config.max_chars
        );
        Self { tagger, config }
    }

    pub fn tagger(&self) -> &T {
        &self.tagger
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Annotate every document. Failing documents are skipped.
    pub fn annotate(&self, documents: impl Into<Arc<[Document]>>) -> AnnotatedCorpus {
        let documents = documents.into();
        let mut run = AnnotationRun::start(documents.len(), &self.config);

        for start in (0..documents.len()).step_by(self.batch_size()) {
            self.tag_batch(&documents, start, &mut run);
        }

        run.finish(documents)
    }

    /// Like [`Annotator::annotate`], but stops between batches once
    /// `cancel` is set.
    pub fn annotate_cancellable(
        &self,
        documents: impl Into<Arc<[Document]>>,
        cancel: &AtomicBool,
    ) -> Result<AnnotatedCorpus> {
        let documents = documents.into();
        let mut run = AnnotationRun::start(documents.len(), &self.config);

        for start in (0..documents.len()).step_by(self.batch_size()) {
            if cancel.load(Ordering::SeqCst) {
                warn!(processed = run.processed, "Annotation cancelled");
                run.abandon();
                return Err(Error::Cancelled {
                    processed: run.processed,
                });
            }
            self.tag_batch(&documents, start, &mut run);
        }

        Ok(run.finish(documents))
    }

    fn batch_size(&self) -> usize {
        self.tagger.batch_size().max(1)
    }

    fn tag_batch(&self, documents: &[Document], start: usize, run: &mut AnnotationRun) {
        let end = (start + self.batch_size()).min(documents.len());
        let batch = &documents[start..end];

        // Documents without text never reach the tagger.
        let texts: Vec<&str> = batch
            .iter()
            .filter_map(|d| d.text.as_deref())
            .map(|text| truncate_chars(text, self.config.max_chars))
            .collect();

        debug!(start, end, "Tagging batch of {} texts", texts.len());
        let mut results = self.tagger.tag_batch(&texts).into_iter();

        for (offset, document) in batch.iter().enumerate() {
            let index = start + offset;
            let outcome = match document.text {
                None => Err(TaggerError::MissingText),
                Some(_) => results.next().unwrap_or_else(|| {
                    Err(TaggerError::Failed {
                        reason: "tagger returned fewer results than texts".to_string(),
                    })
                }),
            };

            let record = outcome
                .map_err(|source| Error::Tagger { index, source })
                .and_then(|tokens| record_from_tokens(index, document, &tokens));

            match record {
                Ok(record) => run.records.push(record),
                Err(e) => {
                    warn!(index, error = %e, "Skipping document");
                    run.skipped.push(SkippedDocument {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
            run.advance();
        }
    }
}

/// Mutable state of one annotation pass.
struct AnnotationRun {
    total: usize,
    processed: usize,
    interval: usize,
    records: Vec<AnnotatedRecord>,
    skipped: Vec<SkippedDocument>,
    progress_bar: Option<ProgressBar>,
}

impl AnnotationRun {
    fn start(total: usize, config: &AnnotatorConfig) -> Self {
        info!("Annotating {} documents", total);

        let progress_bar = if config.show_progress {
            let pb = ProgressBar::new(total as u64);
            let style = ProgressStyle::default_bar()
                .template(PROGRESS_TEMPLATE)
                .map(|s| s.progress_chars("#>-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            pb.set_style(style);
            Some(pb)
        } else {
            None
        };

        Self {
            total,
            processed: 0,
            interval: config.progress_interval,
            records: Vec::with_capacity(total),
            skipped: Vec::new(),
            progress_bar,
        }
    }

    fn advance(&mut self) {
        self.processed += 1;
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
        }
        if self.interval > 0 && self.processed % self.interval == 0 {
            info!(
                processed = self.processed,
                total = self.total,
                "Annotated {}/{} documents",
                self.processed,
                self.total
            );
        }
    }

    fn abandon(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.abandon();
        }
    }

    fn finish(self, documents: Arc<[Document]>) -> AnnotatedCorpus {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }

        if self.skipped.is_empty() {
            info!("Annotation complete: {} records", self.records.len());
        } else {
            warn!(
                "Annotation complete: {} records, {} documents skipped",
                self.records.len(),
                self.skipped.len()
            );
        }

        AnnotatedCorpus::new(documents, self.records, self.skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::{tags, LexiconTagger};
    use std::sync::Mutex;

    /// Records every text it receives and tags each word as a noun, except
    /// "you"/"I" which become pronouns.
    struct RecordingTagger {
        seen: Mutex<Vec<String>>,
        batch: usize,
        cancel_after: Option<(usize, Arc<AtomicBool>)>,
    }

    impl RecordingTagger {
        fn new(batch: usize) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                batch,
                cancel_after: None,
            }
        }
    }

    impl Tagger for RecordingTagger {
        fn tag(&self, text: &str) -> std::result::Result<Vec<TaggedToken>, TaggerError> {
            let mut seen = self.seen.lock().unwrap();
            seen.push(text.to_string());
            if let Some((limit, ref flag)) = self.cancel_after {
                if seen.len() >= limit {
                    flag.store(true, Ordering::SeqCst);
                }
            }
            if text == "explode" {
                return Err(TaggerError::Failed {
                    reason: "bad input".to_string(),
                });
            }
            Ok(text
                .split_whitespace()
                .map(|w| match w {
                    "I" | "you" => TaggedToken::new(w, tags::PRON, "PRP"),
                    "," => TaggedToken::new(w, tags::PUNCT, ","),
                    _ => TaggedToken::new(w, tags::NOUN, "NN"),
                })
                .collect())
        }

        fn batch_size(&self) -> usize {
            self.batch
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn docs(texts: &[&str]) -> Vec<Document> {
        texts
            .iter()
            .map(|t| Document::new(*t, "pop", 2005, "joy"))
            .collect()
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn test_filters_punctuation_and_extracts_pronouns() {
        let annotator = Annotator::new(RecordingTagger::new(1), AnnotatorConfig::default());
        let corpus = annotator.annotate(docs(&["I miss you , baby"]));

        let record = &corpus.records()[0];
        assert_eq!(record.coarse_tags(), ["PRON", "NOUN", "PRON", "NOUN"]);
        assert_eq!(record.fine_tags().len(), 4);
        assert_eq!(record.token_count(), 4);
        assert_eq!(record.pronouns(), ["i", "you"]);
    }

    #[test]
    fn test_truncates_before_tagging() {
        let config = AnnotatorConfig {
            max_chars: 5,
            ..Default::default()
        };
        let annotator = Annotator::new(RecordingTagger::new(1), config);
        let corpus = annotator.annotate(docs(&["abcdefghij"]));

        assert_eq!(annotator.tagger().seen.lock().unwrap().as_slice(), ["abcde"]);
        assert_eq!(corpus.records()[0].token_count(), 1);
    }

    #[test]
    fn test_skips_failures_and_missing_text() {
        let mut input = docs(&["one", "explode", "three"]);
        input.push(Document {
            text: None,
            ..Document::new("", "pop", 2001, "sadness")
        });

        let annotator = Annotator::new(RecordingTagger::new(2), AnnotatorConfig::default());
        let corpus = annotator.annotate(input);

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.documents().len(), 4);
        let skipped: Vec<usize> = corpus.skipped().iter().map(|s| s.index).collect();
        assert_eq!(skipped, vec![1, 3]);
        assert!(corpus.skipped()[1].reason.contains("no text"));
        // The text-less document never reaches the tagger.
        assert_eq!(annotator.tagger().seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_batches_preserve_order() {
        let annotator = Annotator::new(RecordingTagger::new(3), AnnotatorConfig::default());
        let corpus = annotator.annotate(docs(&["a", "b b", "c c c", "d d d d", "e"]));

        let counts: Vec<usize> = corpus.records().iter().map(|r| r.token_count()).collect();
        assert_eq!(counts, vec![1, 2, 3, 4, 1]);
        let indices: Vec<usize> = corpus.records().iter().map(|r| r.doc_index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_annotation_is_deterministic() {
        let annotator = Annotator::new(LexiconTagger::new(), AnnotatorConfig::default());
        let input = docs(&["I got my mind on my money", "You know I love you, baby"]);

        let first = annotator.annotate(input.clone());
        let second = annotator.annotate(input);

        assert_eq!(first.records(), second.records());
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_cancel_before_start() {
        let annotator = Annotator::new(RecordingTagger::new(1), AnnotatorConfig::default());
        let cancel = AtomicBool::new(true);

        let result = annotator.annotate_cancellable(docs(&["a", "b"]), &cancel);
        assert!(matches!(result, Err(Error::Cancelled { processed: 0 })));
    }

    #[test]
    fn test_cancel_mid_run() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut tagger = RecordingTagger::new(1);
        tagger.cancel_after = Some((2, flag.clone()));

        let annotator = Annotator::new(tagger, AnnotatorConfig::default());
        let result = annotator.annotate_cancellable(docs(&["a", "b", "c", "d"]), &flag);

        assert!(matches!(result, Err(Error::Cancelled { processed: 2 })));
    }

    #[test]
    fn test_uncancelled_run_completes() {
        let annotator = Annotator::new(RecordingTagger::new(1), AnnotatorConfig::default());
        let cancel = AtomicBool::new(false);

        let corpus = annotator
            .annotate_cancellable(docs(&["a", "b"]), &cancel)
            .unwrap();
        assert_eq!(corpus.len(), 2);
    }
}

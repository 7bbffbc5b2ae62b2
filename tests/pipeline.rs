//! End-to-end runs: corpus file to rendered report.

use lyricmorph::analysis::{
    AggregationEngine, AnalysisSettings, CorpusProfile, TagScheme, TemporalIndex,
};
use lyricmorph::annotator::{Annotator, AnnotatorConfig};
use lyricmorph::corpus::{load_corpus, load_corpus_async};
use lyricmorph::error::Error;
use lyricmorph::models::{GroupFilter, TimeBucket};
use lyricmorph::report::{
    generate_json_report, generate_markdown_report, AnalysisReport, ReportMetadata,
    ReportRequest, Section,
};
use lyricmorph::tagger::{LexiconTagger, Tagger};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

const CORPUS: &str = r#"{"text":"I love you","genre":"pop","release_year":1995,"emotion":"joy","explicit":0,"popularity":55}
{"text":"Money and cars, cars and money","genre":"hip hop","release_year":2005,"emotion":"anger","explicit":"Yes","popularity":72}
{"text":"You hold me, I hold you","genre":"pop","release_year":2015,"emotion":"love"}
{"text":null,"genre":"pop","release_year":2021,"emotion":"sadness"}
"#;

fn corpus_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CORPUS.as_bytes()).unwrap();
    file
}

fn annotator() -> Annotator<LexiconTagger> {
    Annotator::new(
        LexiconTagger::new(),
        AnnotatorConfig {
            show_progress: false,
            ..AnnotatorConfig::default()
        },
    )
}

#[tokio::test]
async fn test_corpus_to_report() {
    let file = corpus_file();
    let documents = load_corpus_async(file.path()).await.unwrap();
    assert_eq!(documents.len(), 4);

    let corpus = annotator().annotate(documents);
    assert_eq!(corpus.len(), 3);
    assert_eq!(corpus.skipped().len(), 1);
    assert_eq!(corpus.skipped()[0].index, 3);

    let engine = AggregationEngine::new(Arc::new(corpus), AnalysisSettings::default());
    let pop = GroupFilter::genre("pop");
    let hip_hop = GroupFilter::genre("hip hop");

    let pronouns = engine.pronoun_analysis(&pop, &hip_hop).unwrap();
    assert_eq!(pronouns.group_a.persons.first, 3);
    assert_eq!(pronouns.group_a.persons.second, 3);
    assert_eq!(pronouns.group_b.total, 0);

    let table = engine.pos_distribution(&pop).unwrap();
    assert_eq!(table.total(), engine.corpus().token_count(&pop));

    assert!(matches!(
        engine.pos_distribution(&GroupFilter::genre("rock")),
        Err(Error::EmptyGroup { .. })
    ));

    let metrics = engine.derived_metrics(&hip_hop, TagScheme::Universal).unwrap();
    assert!(metrics.counts.noun >= 2);

    let index = TemporalIndex::default();
    let request = ReportRequest {
        sections: Section::ALL.to_vec(),
        filter: GroupFilter::All,
        group_a: hip_hop,
        group_b: pop,
        top_words: 5,
        penn: false,
    };
    let metadata = ReportMetadata {
        corpus: file.path().display().to_string(),
        analysis_date: chrono::Utc::now(),
        tagger: LexiconTagger::new().name().to_string(),
        documents: 4,
        annotated: 3,
        skipped: 1,
        tokens: engine.corpus().token_count(&GroupFilter::All),
        duration_seconds: 0.0,
    };
    let report = AnalysisReport::build(&engine, &index, &request, metadata);

    let markdown = generate_markdown_report(&report);
    assert!(markdown.contains("## Skipped Documents"));
    assert!(markdown.contains("## Pronoun Usage"));
    assert!(markdown.contains("| money |"));

    let json = generate_json_report(&report).unwrap();
    assert!(json.contains("\"favoring_a\""));

    // The 2020s bucket holds the text-less document only.
    let words = index.top_words_by_bucket(engine.corpus(), 5);
    let last = words.last().unwrap();
    assert_eq!(last.bucket.label, "2020s");
    assert!(last.words.is_empty());
    assert_eq!(index.tokenization_passes(), 1);
}

#[tokio::test]
async fn test_cancelled_annotation() {
    let file = corpus_file();
    let documents = load_corpus_async(file.path()).await.unwrap();

    let cancel = Arc::new(AtomicBool::new(true));
    let annotator = annotator();
    let flag = Arc::clone(&cancel);
    let result =
        tokio::task::spawn_blocking(move || annotator.annotate_cancellable(documents, &flag))
            .await
            .unwrap();

    assert!(matches!(result, Err(Error::Cancelled { processed: 0 })));
}

#[test]
fn test_fixture_corpus() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/songs.jsonl");
    let documents = load_corpus(&path).unwrap();

    let profile = CorpusProfile::from_documents(&documents, &TimeBucket::decades());
    assert_eq!(profile.documents, 12);
    assert_eq!(profile.missing_text, 1);
    assert_eq!(profile.missing_explicit, 2);
    assert_eq!(profile.missing_popularity, 2);
    assert_eq!(profile.unbucketed, 1);
    assert_eq!(profile.year_range, Some((1988, 2023)));

    let corpus = annotator().annotate(documents);
    assert_eq!(corpus.len(), 11);
    assert_eq!(corpus.genres(), vec!["pop", "hip hop", "rock"]);

    let engine = AggregationEngine::new(Arc::new(corpus), AnalysisSettings::default());
    let report = engine.fine_tags_by_explicit().unwrap();
    assert_eq!(report.explicit_records, 5);
    assert_eq!(report.clean_records, 5);
    assert_eq!(report.rows.len(), 5);
}

//! LyricMorph - morphological statistics for song-lyric corpora
//!
//! A CLI tool that tags a lyric corpus with part-of-speech categories and
//! writes comparative statistics as a Markdown or JSON report.
//!
//! Exit codes:
//!   0   - Success
//!   1   - Runtime error (corpus, config, IO, etc.)
//!   130 - Annotation cancelled with Ctrl-C

use anyhow::{Context, Result};
use chrono::Utc;
use lyricmorph::analysis::{
    emotion_distribution, AggregationEngine, CorpusProfile, TemporalIndex,
};
use lyricmorph::annotator::{Annotator, AnnotatorConfig};
use lyricmorph::cli::{Args, OutputFormat};
use lyricmorph::config::{Config, CONFIG_FILE};
use lyricmorph::corpus;
use lyricmorph::models::{AnnotatedCorpus, Document, GroupFilter};
use lyricmorph::report::{self, AnalysisReport, ReportMetadata, ReportRequest};
use lyricmorph::tagger::{LexiconTagger, Tagger};
use lyricmorph::Error;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit code when annotation is interrupted.
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration; `general.verbose` also drives the log level
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(&args, &config);

    info!("LyricMorph v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    match run_analysis(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .lyricmorph.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize groups, limits, pronoun lists and time buckets.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete analysis workflow. Returns the process exit code.
async fn run_analysis(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    config.validate().context("Invalid configuration")?;

    // Step 1: Load the corpus
    let corpus_path = args.corpus.clone().context("--corpus is required")?;
    println!("📥 Loading corpus: {}", corpus_path.display());
    let documents = corpus::load_corpus_async(&corpus_path).await?;
    println!("   {} documents loaded", documents.len());

    let index = TemporalIndex::new(config.temporal.buckets.clone());

    // Handle --dry-run: profile the corpus and exit
    if args.dry_run {
        return handle_dry_run(&documents, &index);
    }

    // Step 2: Annotate
    let tagger = LexiconTagger::new();
    let tagger_name = tagger.name().to_string();
    println!("\n🏷️  Tagging with {}...", tagger_name);
    println!("   Max chars per lyric: {}", config.annotator.max_chars);

    let annotated =
        match annotate_with_cancel(tagger, AnnotatorConfig::from(&config.annotator), documents)
            .await?
        {
            Ok(annotated) => annotated,
            Err(Error::Cancelled { processed }) => {
                eprintln!(
                    "\n⛔ Annotation cancelled after {} documents. No report written.",
                    processed
                );
                return Ok(EXIT_CANCELLED);
            }
            Err(e) => return Err(e.into()),
        };

    let documents_total = annotated.documents().len();
    let annotated_total = annotated.len();
    let skipped_total = annotated.skipped().len();
    let tokens = annotated.token_count(&GroupFilter::All);
    let genres = annotated.genres();

    // Step 3: Aggregate
    println!("\n🔬 Computing statistics...");
    let engine = AggregationEngine::new(Arc::new(annotated), config.analysis_settings());

    let request = ReportRequest {
        sections: args.effective_sections(),
        filter: GroupFilter::from(args.genre.clone()),
        group_a: GroupFilter::genre(&config.analysis.group_a),
        group_b: GroupFilter::genre(&config.analysis.group_b),
        top_words: config.analysis.top_words,
        penn: args.penn,
    };
    for group in [&config.analysis.group_a, &config.analysis.group_b] {
        if !genres.contains(group) {
            warn!("Genre '{}' does not occur in the corpus", group);
        }
    }

    let metadata = ReportMetadata {
        corpus: corpus_path.display().to_string(),
        analysis_date: Utc::now(),
        tagger: tagger_name,
        documents: documents_total,
        annotated: annotated_total,
        skipped: skipped_total,
        tokens,
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };

    let analysis = AnalysisReport::build(&engine, &index, &request, metadata);

    // Step 4: Render and save
    println!("\n📝 Generating report...");
    let format = args
        .format
        .or_else(|| OutputFormat::from_name(&config.general.format))
        .unwrap_or_default();
    let output = match format {
        OutputFormat::Json => report::generate_json_report(&analysis)?,
        OutputFormat::Markdown => report::generate_markdown_report(&analysis),
    };
    let output_path = PathBuf::from(&config.general.output);
    report::write_report(&output, &output_path)?;

    // Print summary
    println!("\n📊 Analysis Summary:");
    println!(
        "   Documents: {} | Annotated: {} | Skipped: {}",
        documents_total, annotated_total, skipped_total
    );
    println!("   Tokens: {}", tokens);
    println!(
        "   Sections: {}",
        analysis
            .sections()
            .iter()
            .map(|s| s.title())
            .collect::<Vec<_>>()
            .join(", ")
    );
    if let Some(top) = analysis
        .pos
        .as_ref()
        .and_then(|p| p.ready())
        .and_then(|p| p.entries.first())
    {
        println!("   Most frequent tag: {} ({:.1}%)", top.label, top.percentage);
    }
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    println!(
        "\n✅ Analysis complete! Report saved to: {}",
        output_path.display()
    );

    Ok(0)
}

/// Run annotation on the blocking pool; Ctrl-C stops it between batches.
async fn annotate_with_cancel(
    tagger: LexiconTagger,
    config: AnnotatorConfig,
    documents: Vec<Document>,
) -> Result<lyricmorph::Result<AnnotatedCorpus>> {
    let cancel = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&cancel);
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current batch");
            flag.store(true, Ordering::SeqCst);
        }
    });

    let annotator = Annotator::new(tagger, config);
    let result =
        tokio::task::spawn_blocking(move || annotator.annotate_cancellable(documents, &cancel))
            .await
            .context("Annotation task failed");

    watcher.abort();
    result
}

/// Handle --dry-run: profile the corpus without tagging it.
fn handle_dry_run(documents: &[Document], index: &TemporalIndex) -> Result<i32> {
    println!("\n🔍 Dry run: profiling corpus (no tagging)...\n");

    let profile = CorpusProfile::from_documents(documents, index.buckets());

    if let Some((first, last)) = profile.year_range {
        println!("   Release years: {}-{}", first, last);
    }
    println!(
        "   Missing text: {} | Missing popularity: {} | Missing explicit flag: {}",
        profile.missing_text, profile.missing_popularity, profile.missing_explicit
    );

    println!("\n   Genres:");
    for entry in profile.genres.ranked() {
        let emotions = emotion_distribution(documents, Some(&entry.label));
        let top = emotions
            .top(3)
            .iter()
            .map(|e| format!("{} {:.0}%", e.label, e.percentage))
            .collect::<Vec<_>>()
            .join(", ");
        println!("     🎵 {} ({} documents; {})", entry.label, entry.count, top);
    }

    println!("\n   Periods:");
    for (label, count) in profile.buckets.iter() {
        println!("     📅 {} ({} documents)", label, count);
    }
    if profile.unbucketed > 0 {
        println!("     ({} documents outside every period)", profile.unbucketed);
    }

    println!("\n✅ Dry run complete. No documents were tagged.");
    Ok(0)
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}. Using defaults.", CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}

//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::report::Section;
use clap::Parser;
use std::path::PathBuf;

/// LyricMorph - morphological statistics for song-lyric corpora
///
/// Tags every lyric with part-of-speech categories and reports POS
/// distributions, derived ratios, pronoun usage, genre contrasts and
/// per-decade trends as Markdown or JSON.
///
/// Examples:
///   lyricmorph --corpus songs.jsonl
///   lyricmorph --corpus songs.jsonl --group-a rock --group-b country
///   lyricmorph --corpus songs.json --format json --sections pos,metrics
///   lyricmorph --corpus songs.jsonl --dry-run
///   lyricmorph --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Corpus file to analyze
    ///
    /// JSON Lines (one document per line) or a JSON array of documents
    /// with text, genre, release_year and emotion fields.
    #[arg(
        long,
        value_name = "FILE",
        env = "LYRICMORPH_CORPUS",
        required_unless_present = "init_config"
    )]
    pub corpus: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .lyricmorph.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// Default: from config or lyricmorph_report.md
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Report sections to compute (comma-separated)
    ///
    /// Example: --sections pos,metrics,pronouns. Default: all sections.
    #[arg(long, value_name = "SECTIONS", value_delimiter = ',')]
    pub sections: Option<Vec<Section>>,

    /// Restrict the distribution and metrics sections to one genre
    #[arg(short, long, value_name = "GENRE")]
    pub genre: Option<String>,

    /// First genre of pairwise comparisons
    #[arg(long, value_name = "GENRE")]
    pub group_a: Option<String>,

    /// Second genre of pairwise comparisons
    #[arg(long, value_name = "GENRE")]
    pub group_b: Option<String>,

    /// Characters of each lyric passed to the tagger
    #[arg(long, value_name = "CHARS")]
    pub max_chars: Option<usize>,

    /// Words listed per time bucket
    #[arg(long, value_name = "COUNT")]
    pub top_words: Option<usize>,

    /// Also compute derived metrics over Penn Treebank fine tags
    #[arg(long)]
    pub penn: bool,

    /// Disable the annotation progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Dry run: load and profile the corpus without tagging it
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .lyricmorph.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
        }
    }

    /// Parse the config file spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "markdown" => Some(OutputFormat::Markdown),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        match self.corpus {
            None => return Err("--corpus is required".to_string()),
            Some(ref path) if !path.is_file() => {
                return Err(format!("Corpus file does not exist: {}", path.display()));
            }
            Some(_) => {}
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.max_chars == Some(0) {
            return Err("Max chars must be at least 1".to_string());
        }

        if self.top_words == Some(0) {
            return Err("Top words must be at least 1".to_string());
        }

        if let Some(ref sections) = self.sections {
            if sections.is_empty() {
                return Err("At least one section must be selected".to_string());
            }
        }

        if let (Some(a), Some(b)) = (&self.group_a, &self.group_b) {
            if a == b {
                return Err(format!("--group-a and --group-b are both '{}'", a));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `general.verbose` config value; `--quiet`
    /// overrides it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Sections to compute, every section when none were named.
    pub fn effective_sections(&self) -> Vec<Section> {
        self.sections.clone().unwrap_or_else(|| Section::ALL.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn make_args(corpus: PathBuf) -> Args {
        Args {
            corpus: Some(corpus),
            config: None,
            output: None,
            format: None,
            sections: None,
            genre: None,
            group_a: None,
            group_b: None,
            max_chars: None,
            top_words: None,
            penn: false,
            no_progress: false,
            dry_run: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    fn corpus_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"text":"hi","genre":"pop","release_year":2000,"emotion":"joy"}}"#
        )
        .unwrap();
        file
    }

    #[test]
    fn test_validation_ok() {
        let file = corpus_file();
        assert!(make_args(file.path().to_path_buf()).validate().is_ok());
    }

    #[test]
    fn test_validation_missing_corpus() {
        let args = make_args(PathBuf::from("/nonexistent/songs.jsonl"));
        assert!(args.validate().is_err());

        let mut args = make_args(PathBuf::new());
        args.corpus = None;
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let file = corpus_file();
        let mut args = make_args(file.path().to_path_buf());
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_limits_and_groups() {
        let file = corpus_file();
        let mut args = make_args(file.path().to_path_buf());
        args.max_chars = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args(file.path().to_path_buf());
        args.group_a = Some("pop".to_string());
        args.group_b = Some("pop".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args(PathBuf::from("songs.jsonl"));
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_config_verbose_raises_log_level() {
        let mut args = make_args(PathBuf::from("songs.jsonl"));
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        let mut config: crate::config::Config =
            toml::from_str("[general]\nverbose = true\n").unwrap();
        config.merge_with_args(&args);
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_sections() {
        let args = Args::try_parse_from([
            "lyricmorph",
            "--corpus",
            "songs.jsonl",
            "--sections",
            "pos,words",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(args.effective_sections(), vec![Section::Pos, Section::Words]);
        assert_eq!(args.format, Some(OutputFormat::Json));

        let args = Args::try_parse_from(["lyricmorph", "--corpus", "songs.jsonl"]).unwrap();
        assert_eq!(args.effective_sections().len(), Section::ALL.len());
    }

    #[test]
    fn test_output_format_names() {
        assert_eq!(OutputFormat::from_name("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_name("html"), None);
        assert_eq!(OutputFormat::Markdown.as_str(), "markdown");
    }
}

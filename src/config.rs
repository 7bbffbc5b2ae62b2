//! Configuration file handling.
//!
//! This module handles loading, merging and validating configuration from
//! `.lyricmorph.toml` files.

use crate::analysis::{AnalysisSettings, PronounLexicon};
use crate::models::TimeBucket;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".lyricmorph.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Annotation settings.
    #[serde(default)]
    pub annotator: AnnotatorSettings,

    /// Aggregation settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Pronoun person lists.
    #[serde(default)]
    pub pronouns: PronounLexicon,

    /// Time buckets.
    #[serde(default)]
    pub temporal: TemporalConfig,
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Report format: "markdown" or "json".
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
            format: default_format(),
        }
    }
}

fn default_output() -> String {
    "lyricmorph_report.md".to_string()
}

fn default_format() -> String {
    "markdown".to_string()
}

/// Annotator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatorSettings {
    /// Characters of lyrics passed to the tagger.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Documents between progress log lines (0 disables them).
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Draw a progress bar while annotating.
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for AnnotatorSettings {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            progress_interval: default_progress_interval(),
            show_progress: true,
        }
    }
}

fn default_max_chars() -> usize {
    crate::annotator::DEFAULT_MAX_CHARS
}

fn default_progress_interval() -> usize {
    crate::annotator::DEFAULT_PROGRESS_INTERVAL
}

fn default_true() -> bool {
    true
}

/// Aggregation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// First genre of pairwise comparisons.
    #[serde(default = "default_group_a")]
    pub group_a: String,

    /// Second genre of pairwise comparisons.
    #[serde(default = "default_group_b")]
    pub group_b: String,

    /// Pronouns listed per group.
    #[serde(default = "default_top_pronouns")]
    pub top_pronouns: usize,

    /// Words listed per time bucket.
    #[serde(default = "default_top_words")]
    pub top_words: usize,

    /// Distinctive tags listed per side.
    #[serde(default = "default_distinctive_tags")]
    pub distinctive_tags: usize,

    /// Fine tags compared between explicit and clean tracks.
    #[serde(default = "default_explicit_top_tags")]
    pub explicit_top_tags: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            group_a: default_group_a(),
            group_b: default_group_b(),
            top_pronouns: default_top_pronouns(),
            top_words: default_top_words(),
            distinctive_tags: default_distinctive_tags(),
            explicit_top_tags: default_explicit_top_tags(),
        }
    }
}

fn default_group_a() -> String {
    "hip hop".to_string()
}

fn default_group_b() -> String {
    "pop".to_string()
}

fn default_top_pronouns() -> usize {
    10
}

fn default_top_words() -> usize {
    10
}

fn default_distinctive_tags() -> usize {
    5
}

fn default_explicit_top_tags() -> usize {
    5
}

/// Time bucket settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalConfig {
    /// Inclusive year ranges; must not overlap.
    #[serde(default = "TimeBucket::decades")]
    pub buckets: Vec<TimeBucket>,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            buckets: TimeBucket::decades(),
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.general.format = format.as_str().to_string();
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(max_chars) = args.max_chars {
            self.annotator.max_chars = max_chars;
        }
        if args.no_progress || args.quiet {
            self.annotator.show_progress = false;
        }

        if let Some(ref group_a) = args.group_a {
            self.analysis.group_a = group_a.clone();
        }
        if let Some(ref group_b) = args.group_b {
            self.analysis.group_b = group_b.clone();
        }
        if let Some(top_words) = args.top_words {
            self.analysis.top_words = top_words;
        }
    }

    /// Reject settings no query can run with.
    pub fn validate(&self) -> Result<()> {
        if self.annotator.max_chars == 0 {
            bail!("annotator.max_chars must be at least 1");
        }

        let limits = [
            ("analysis.top_pronouns", self.analysis.top_pronouns),
            ("analysis.top_words", self.analysis.top_words),
            ("analysis.distinctive_tags", self.analysis.distinctive_tags),
            ("analysis.explicit_top_tags", self.analysis.explicit_top_tags),
        ];
        for (name, value) in limits {
            if value == 0 {
                bail!("{} must be at least 1", name);
            }
        }

        if !matches!(self.general.format.as_str(), "markdown" | "json") {
            bail!(
                "general.format must be \"markdown\" or \"json\", got \"{}\"",
                self.general.format
            );
        }

        let buckets = &self.temporal.buckets;
        if buckets.is_empty() {
            bail!("temporal.buckets must contain at least one bucket");
        }
        for (i, bucket) in buckets.iter().enumerate() {
            if bucket.start > bucket.end {
                bail!(
                    "time bucket '{}' starts after it ends ({} > {})",
                    bucket.label,
                    bucket.start,
                    bucket.end
                );
            }
            if let Some(other) = buckets[..i].iter().find(|b| b.overlaps(bucket)) {
                bail!(
                    "time buckets '{}' and '{}' overlap",
                    other.label,
                    bucket.label
                );
            }
        }

        Ok(())
    }

    /// Engine settings derived from `[analysis]` and `[pronouns]`.
    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            top_pronouns: self.analysis.top_pronouns,
            distinctive_tags: self.analysis.distinctive_tags,
            explicit_top_tags: self.analysis.explicit_top_tags,
            lexicon: self.pronouns.clone(),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

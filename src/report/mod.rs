//! Report assembly and rendering.
//!
//! An [`AnalysisReport`] collects the outputs of every selected section.
//! Query failures (an empty group, a corpus without explicit flags) are
//! kept as section notes instead of aborting the report.

pub mod generator;

pub use generator::{generate_json_report, generate_markdown_report, write_report};

use crate::analysis::{
    AggregationEngine, BucketPopularity, BucketSentiment, BucketWords, ComparisonReport,
    CorpusProfile, ExplicitReport, GenrePopularity, MetricsReport, PronounReport, RankedEntry,
    TagScheme, TemporalIndex,
};
use crate::error::Result;
use crate::models::{GroupFilter, SkippedDocument};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Report sections selectable with `--sections`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Coarse POS distribution
    Pos,
    /// Noun/verb ratio, lexical density and friends
    Metrics,
    /// Pronoun usage of the two compared groups
    Pronouns,
    /// Tags that distinguish the two compared groups
    Patterns,
    /// Fine tags in explicit vs clean tracks
    Explicit,
    /// Top words per time bucket
    Words,
    /// Emotion distribution per time bucket
    Sentiment,
    /// Mean popularity per bucket and genre
    Popularity,
    /// Descriptive corpus counts
    Profile,
}

impl Section {
    pub const ALL: [Section; 9] = [
        Section::Profile,
        Section::Pos,
        Section::Metrics,
        Section::Pronouns,
        Section::Patterns,
        Section::Explicit,
        Section::Words,
        Section::Sentiment,
        Section::Popularity,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Pos => "POS Distribution",
            Section::Metrics => "Derived Metrics",
            Section::Pronouns => "Pronoun Usage",
            Section::Patterns => "Distinctive Patterns",
            Section::Explicit => "Explicit Content",
            Section::Words => "Top Words by Period",
            Section::Sentiment => "Sentiment by Period",
            Section::Popularity => "Popularity",
            Section::Profile => "Corpus Profile",
        }
    }

    /// Markdown heading anchor.
    pub fn anchor(&self) -> String {
        self.title().to_lowercase().replace(' ', "-")
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// A section result, or the reason it could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum SectionOutcome<T> {
    Ready(T),
    Unavailable(String),
}

impl<T> SectionOutcome<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            SectionOutcome::Ready(value) => Some(value),
            SectionOutcome::Unavailable(_) => None,
        }
    }
}

impl<T> From<Result<T>> for SectionOutcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => SectionOutcome::Ready(value),
            Err(e) => {
                warn!("Section unavailable: {}", e);
                SectionOutcome::Unavailable(e.to_string())
            }
        }
    }
}

/// Report metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    pub corpus: String,
    pub analysis_date: DateTime<Utc>,
    pub tagger: String,
    pub documents: usize,
    pub annotated: usize,
    pub skipped: usize,
    pub tokens: usize,
    pub duration_seconds: f64,
}

/// Ranked coarse-tag distribution of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PosSection {
    pub group: String,
    pub total: usize,
    pub entries: Vec<RankedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularitySection {
    pub by_bucket: Vec<BucketPopularity>,
    pub by_genre: Vec<GenrePopularity>,
}

/// What to put in a report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub sections: Vec<Section>,
    /// Filter of the distribution and metrics sections.
    pub filter: GroupFilter,
    pub group_a: GroupFilter,
    pub group_b: GroupFilter,
    pub top_words: usize,
    /// Add Penn Treebank metrics next to the universal ones.
    pub penn: bool,
}

impl ReportRequest {
    pub fn wants(&self, section: Section) -> bool {
        self.sections.contains(&section)
    }
}

/// The complete analysis report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<CorpusProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<SectionOutcome<PosSection>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<SectionOutcome<MetricsReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronouns: Option<SectionOutcome<PronounReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<ComparisonReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explicit: Option<SectionOutcome<ExplicitReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<BucketWords>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Vec<BucketSentiment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<PopularitySection>,
    pub skipped: Vec<SkippedDocument>,
}

impl AnalysisReport {
    /// Run every requested query and collect the results.
    pub fn build(
        engine: &AggregationEngine,
        index: &TemporalIndex,
        request: &ReportRequest,
        metadata: ReportMetadata,
    ) -> Self {
        let corpus = engine.corpus();

        let profile = request
            .wants(Section::Profile)
            .then(|| CorpusProfile::from_documents(corpus.documents(), index.buckets()));

        let pos: Option<SectionOutcome<PosSection>> = request.wants(Section::Pos).then(|| {
            engine
                .pos_distribution(&request.filter)
                .map(|table| PosSection {
                    group: request.filter.to_string(),
                    total: table.total(),
                    entries: table.ranked(),
                })
                .into()
        });

        let mut metrics: Vec<SectionOutcome<MetricsReport>> = Vec::new();
        if request.wants(Section::Metrics) {
            metrics.push(
                engine
                    .derived_metrics(&request.filter, TagScheme::Universal)
                    .map(|r| r.as_ref().clone())
                    .into(),
            );
            if request.penn {
                metrics.push(
                    engine
                        .derived_metrics(&request.filter, TagScheme::PennTreebank)
                        .map(|r| r.as_ref().clone())
                        .into(),
                );
            }
        }

        let pronouns: Option<SectionOutcome<PronounReport>> =
            request.wants(Section::Pronouns).then(|| {
                engine
                    .pronoun_analysis(&request.group_a, &request.group_b)
                    .map(|r| r.as_ref().clone())
                    .into()
            });

        let patterns = request.wants(Section::Patterns).then(|| {
            engine
                .comparative_patterns(&request.group_a, &request.group_b)
                .as_ref()
                .clone()
        });

        let explicit: Option<SectionOutcome<ExplicitReport>> =
            request.wants(Section::Explicit).then(|| {
                engine
                    .fine_tags_by_explicit()
                    .map(|r| r.as_ref().clone())
                    .into()
            });

        let words = request
            .wants(Section::Words)
            .then(|| index.top_words_by_bucket(corpus, request.top_words));

        let sentiment = request
            .wants(Section::Sentiment)
            .then(|| index.sentiment_by_bucket(corpus));

        let popularity = request.wants(Section::Popularity).then(|| PopularitySection {
            by_bucket: index.popularity_by_bucket(corpus),
            by_genre: crate::analysis::popularity_by_genre(corpus.documents()),
        });

        debug!(computations = engine.computations(), "Report assembled");

        AnalysisReport {
            metadata,
            profile,
            pos,
            metrics,
            pronouns,
            patterns,
            explicit,
            words,
            sentiment,
            popularity,
            skipped: corpus.skipped().to_vec(),
        }
    }

    /// Sections present in this report, in rendering order.
    pub fn sections(&self) -> Vec<Section> {
        let present = [
            (Section::Profile, self.profile.is_some()),
            (Section::Pos, self.pos.is_some()),
            (Section::Metrics, !self.metrics.is_empty()),
            (Section::Pronouns, self.pronouns.is_some()),
            (Section::Patterns, self.patterns.is_some()),
            (Section::Explicit, self.explicit.is_some()),
            (Section::Words, self.words.is_some()),
            (Section::Sentiment, self.sentiment.is_some()),
            (Section::Popularity, self.popularity.is_some()),
        ];
        present
            .into_iter()
            .filter(|(_, present)| *present)
            .map(|(section, _)| section)
            .collect()
    }
}

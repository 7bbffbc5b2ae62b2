//! Markdown and JSON report generation.
//!
//! This module renders an [`AnalysisReport`] as Markdown tables or as
//! pretty-printed JSON.

use super::{
    AnalysisReport, PopularitySection, PosSection, ReportMetadata, Section, SectionOutcome,
};
use crate::analysis::{
    BucketSentiment, BucketWords, ComparisonReport, CorpusProfile, ExplicitReport,
    GroupPronouns, MetricsReport, Person, PronounReport, RankedEntry,
};
use crate::models::SkippedDocument;
use anyhow::{Context, Result};
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &AnalysisReport) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# LyricMorph Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(report));

    for section in report.sections() {
        output.push_str(&format!("## {}\n\n", section.title()));
        let body = match section {
            Section::Profile => report.profile.as_ref().map(generate_profile_section),
            Section::Pos => report
                .pos
                .as_ref()
                .map(|outcome| render_outcome(outcome, generate_pos_section)),
            Section::Metrics => Some(
                report
                    .metrics
                    .iter()
                    .map(|outcome| render_outcome(outcome, generate_metrics_block))
                    .collect::<String>(),
            ),
            Section::Pronouns => report
                .pronouns
                .as_ref()
                .map(|outcome| render_outcome(outcome, generate_pronoun_section)),
            Section::Patterns => report.patterns.as_ref().map(generate_patterns_section),
            Section::Explicit => report
                .explicit
                .as_ref()
                .map(|outcome| render_outcome(outcome, generate_explicit_section)),
            Section::Words => report.words.as_deref().map(generate_words_section),
            Section::Sentiment => report.sentiment.as_deref().map(generate_sentiment_section),
            Section::Popularity => report.popularity.as_ref().map(generate_popularity_section),
        };
        output.push_str(&body.unwrap_or_default());
    }

    output.push_str(&generate_skipped_section(&report.skipped));
    output.push_str(&generate_footer());

    output
}

/// Render a section body, or a note when it could not be computed.
fn render_outcome<T>(outcome: &SectionOutcome<T>, render: fn(&T) -> String) -> String {
    match outcome {
        SectionOutcome::Ready(value) => render(value),
        SectionOutcome::Unavailable(reason) => format!("> Not available: {}\n\n", reason),
    }
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Corpus:** `{}`\n", metadata.corpus));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Tagger:** `{}`\n", metadata.tagger));
    section.push_str(&format!("- **Documents:** {}\n", metadata.documents));
    section.push_str(&format!("- **Annotated:** {}\n", metadata.annotated));
    if metadata.skipped > 0 {
        section.push_str(&format!("- **Skipped:** {}\n", metadata.skipped));
    }
    section.push_str(&format!("- **Tokens:** {}\n", metadata.tokens));
    section.push_str(&format!(
        "- **Analysis Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(report: &AnalysisReport) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    for section in report.sections() {
        toc.push_str(&format!("- [{}](#{})\n", section.title(), section.anchor()));
    }
    if !report.skipped.is_empty() {
        toc.push_str("- [Skipped Documents](#skipped-documents)\n");
    }
    toc.push('\n');

    toc
}

fn ranked_table(header: &str, entries: &[RankedEntry]) -> String {
    let mut table = String::new();

    table.push_str(&format!("| {} | Count | Share |\n", header));
    table.push_str("|:---|---:|---:|\n");
    for entry in entries {
        table.push_str(&format!(
            "| {} | {} | {:.2}% |\n",
            entry.label, entry.count, entry.percentage
        ));
    }
    table.push('\n');

    table
}

fn generate_profile_section(profile: &CorpusProfile) -> String {
    let mut section = String::new();

    section.push_str(
        "| Documents | Missing Text | Missing Popularity | Missing Explicit | Outside Periods |\n",
    );
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        profile.documents,
        profile.missing_text,
        profile.missing_popularity,
        profile.missing_explicit,
        profile.unbucketed
    ));

    if let Some((first, last)) = profile.year_range {
        section.push_str(&format!("Release years: {}-{}\n\n", first, last));
    }
    if let Some(share) = profile.explicit_share() {
        section.push_str(&format!("Explicit tracks: {:.1}%\n\n", share));
    }

    section.push_str("### Genres\n\n");
    section.push_str(&ranked_table("Genre", &profile.genres.ranked()));
    section.push_str("### Emotions\n\n");
    section.push_str(&ranked_table("Emotion", &profile.emotions.ranked()));

    section.push_str("### Periods\n\n");
    section.push_str("| Period | Documents |\n");
    section.push_str("|:---|---:|\n");
    for (label, count) in profile.buckets.iter() {
        section.push_str(&format!("| {} | {} |\n", label, count));
    }
    section.push('\n');

    section
}

fn generate_pos_section(pos: &PosSection) -> String {
    let mut section = String::new();

    section.push_str(&format!("*{} ({} tokens)*\n\n", pos.group, pos.total));
    section.push_str(&ranked_table("Tag", &pos.entries));

    section
}

fn generate_metrics_block(metrics: &MetricsReport) -> String {
    let mut block = String::new();

    block.push_str(&format!(
        "### {} tags: {} ({} tokens)\n\n",
        metrics.scheme, metrics.group, metrics.total_tokens
    ));

    block.push_str("| Bucket | Count | Share |\n");
    block.push_str("|:---|---:|---:|\n");
    let counts = &metrics.counts;
    for (name, count) in [
        ("Nouns", counts.noun),
        ("Verbs", counts.verb),
        ("Adjectives", counts.adjective),
        ("Adverbs", counts.adverb),
        ("Pronouns", counts.pronoun),
        ("Determiners", counts.determiner),
    ] {
        block.push_str(&format!(
            "| {} | {} | {:.2}% |\n",
            name,
            count,
            metrics.share(count)
        ));
    }
    block.push('\n');

    block.push_str("| Metric | Value |\n");
    block.push_str("|:---|---:|\n");
    block.push_str(&format!("| Noun/verb ratio | {:.2} |\n", metrics.noun_verb_ratio));
    block.push_str(&format!(
        "| Adjective/noun ratio | {:.2} |\n",
        metrics.adjective_noun_ratio
    ));
    block.push_str(&format!(
        "| Lexical density | {:.2}% |\n",
        metrics.lexical_density
    ));
    block.push_str(&format!(
        "| Syntactic complexity | {:.2}% |\n",
        metrics.syntactic_complexity
    ));
    block.push('\n');

    for warning in &metrics.warnings {
        block.push_str(&format!("> Warning: {}\n", warning));
    }
    if !metrics.warnings.is_empty() {
        block.push('\n');
    }

    block
}

fn generate_group_pronouns(group: &GroupPronouns) -> String {
    let mut block = String::new();

    block.push_str(&format!(
        "### {} ({} documents, {} pronouns)\n\n",
        group.group, group.documents, group.total
    ));
    if group.top.is_empty() {
        block.push_str("No pronouns found.\n\n");
    } else {
        block.push_str(&ranked_table("Pronoun", &group.top));
    }

    block.push_str("| Person | Count |\n");
    block.push_str("|:---|---:|\n");
    for person in [Person::First, Person::Second, Person::Third] {
        block.push_str(&format!("| {} | {} |\n", person, group.persons.get(person)));
    }
    block.push('\n');

    block
}

fn generate_pronoun_section(report: &PronounReport) -> String {
    let mut section = generate_group_pronouns(&report.group_a);
    section.push_str(&generate_group_pronouns(&report.group_b));
    section
}

fn generate_patterns_section(report: &ComparisonReport) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "*{} ({} tokens) vs {} ({} tokens)*\n\n",
        report.group_a, report.tokens_a, report.group_b, report.tokens_b
    ));

    for (title, rows) in [
        (format!("More common in {}", report.group_a), &report.favoring_a),
        (format!("More common in {}", report.group_b), &report.favoring_b),
    ] {
        section.push_str(&format!("### {}\n\n", title));
        section.push_str(&format!(
            "| Tag | {} | {} | Difference |\n",
            report.group_a, report.group_b
        ));
        section.push_str("|:---|---:|---:|---:|\n");
        for row in rows {
            section.push_str(&format!(
                "| {} | {:.2}% | {:.2}% | {:+.2} |\n",
                row.tag, row.pct_a, row.pct_b, row.difference
            ));
        }
        section.push('\n');
    }

    section
}

fn generate_explicit_section(report: &ExplicitReport) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "*{} explicit and {} clean tracks*\n\n",
        report.explicit_records, report.clean_records
    ));
    section.push_str("| Fine Tag | Explicit | Clean |\n");
    section.push_str("|:---|---:|---:|\n");
    for row in &report.rows {
        section.push_str(&format!("| {} | {} | {} |\n", row.tag, row.explicit, row.clean));
    }
    section.push('\n');

    section
}

fn generate_words_section(buckets: &[BucketWords]) -> String {
    let mut section = String::new();

    if buckets.is_empty() {
        section.push_str("No documents fall into any period.\n\n");
    }
    for bucket in buckets {
        section.push_str(&format!(
            "### {} ({} documents, {} words)\n\n",
            bucket.bucket, bucket.documents, bucket.total_words
        ));
        section.push_str(&ranked_table("Word", &bucket.words));
    }

    section
}

fn generate_sentiment_section(buckets: &[BucketSentiment]) -> String {
    let mut section = String::new();

    if buckets.is_empty() {
        section.push_str("No documents fall into any period.\n\n");
    }
    for bucket in buckets {
        section.push_str(&format!(
            "### {} ({} documents)\n\n",
            bucket.bucket, bucket.documents
        ));
        section.push_str(&ranked_table("Emotion", &bucket.emotions));
    }

    section
}

fn generate_popularity_section(popularity: &PopularitySection) -> String {
    let mut section = String::new();

    section.push_str("### By Period\n\n");
    section.push_str("| Period | Documents | Rated | Mean |\n");
    section.push_str("|:---|---:|---:|---:|\n");
    for row in &popularity.by_bucket {
        let mean = row
            .mean
            .map(|m| format!("{:.1}", m))
            .unwrap_or_else(|| "-".to_string());
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            row.bucket, row.documents, row.rated, mean
        ));
    }
    section.push('\n');

    section.push_str("### By Genre\n\n");
    section.push_str("| Genre | Rated | Mean |\n");
    section.push_str("|:---|---:|---:|\n");
    for row in &popularity.by_genre {
        section.push_str(&format!("| {} | {} | {:.1} |\n", row.genre, row.rated, row.mean));
    }
    section.push('\n');

    section
}

fn generate_skipped_section(skipped: &[SkippedDocument]) -> String {
    if skipped.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Skipped Documents\n\n");
    section.push_str("| Document | Reason |\n");
    section.push_str("|:---:|:---|\n");
    for doc in skipped {
        section.push_str(&format!("| {} | {} |\n", doc.index, doc.reason));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by LyricMorph*\n");

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

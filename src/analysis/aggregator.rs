//! Morphological aggregation over an annotated corpus.
//!
//! Every function here is a pure read of an [`AnnotatedCorpus`]: grouped
//! POS distributions, derived ratios, pronoun usage and cross-group
//! differences.

use crate::analysis::frequency::{FrequencyTable, RankedEntry};
use crate::error::{DegenerateRatioWarning, Error, RatioKind, Result};
use crate::models::{AnnotatedCorpus, AnnotatedRecord, GroupFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// Which tag sequence of a record a query reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagLayer {
    Coarse,
    Fine,
}

impl TagLayer {
    fn tags(self, record: &AnnotatedRecord) -> &[String] {
        match self {
            TagLayer::Coarse => record.coarse_tags(),
            TagLayer::Fine => record.fine_tags(),
        }
    }
}

/// How a tag is matched against a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    Prefix(&'static str),
    Exact(&'static str),
}

impl MatchRule {
    pub fn matches(&self, tag: &str) -> bool {
        match self {
            MatchRule::Prefix(prefix) => tag.starts_with(prefix),
            MatchRule::Exact(exact) => tag == *exact,
        }
    }
}

/// Tag-to-bucket rules for one tag inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketRules {
    pub scheme: TagScheme,
    pub layer: TagLayer,
    pub noun: &'static [MatchRule],
    pub verb: &'static [MatchRule],
    pub adjective: &'static [MatchRule],
    pub adverb: &'static [MatchRule],
    pub pronoun: &'static [MatchRule],
    pub determiner: &'static [MatchRule],
}

impl BucketRules {
    /// Prefix NOUN, VERB, ADJ, ADV and exact PRON, DET over coarse tags.
    pub fn universal() -> &'static BucketRules {
        &UNIVERSAL_RULES
    }

    /// NN*, VB*, JJ*, RB*, personal/wh pronouns and determiners over fine tags.
    pub fn penn_treebank() -> &'static BucketRules {
        &PENN_RULES
    }
}

static UNIVERSAL_RULES: BucketRules = BucketRules {
    scheme: TagScheme::Universal,
    layer: TagLayer::Coarse,
    noun: &[MatchRule::Prefix("NOUN")],
    verb: &[MatchRule::Prefix("VERB")],
    adjective: &[MatchRule::Prefix("ADJ")],
    adverb: &[MatchRule::Prefix("ADV")],
    pronoun: &[MatchRule::Exact("PRON")],
    determiner: &[MatchRule::Exact("DET")],
};

static PENN_RULES: BucketRules = BucketRules {
    scheme: TagScheme::PennTreebank,
    layer: TagLayer::Fine,
    noun: &[MatchRule::Prefix("NN")],
    verb: &[MatchRule::Prefix("VB")],
    adjective: &[MatchRule::Prefix("JJ")],
    adverb: &[MatchRule::Prefix("RB")],
    pronoun: &[
        MatchRule::Exact("PRP"),
        MatchRule::Exact("PRP$"),
        MatchRule::Exact("WP"),
        MatchRule::Exact("WP$"),
    ],
    determiner: &[
        MatchRule::Exact("DT"),
        MatchRule::Exact("PDT"),
        MatchRule::Exact("WDT"),
    ],
};

/// Tag inventory used to bucket tags for derived metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagScheme {
    /// Universal coarse tags (NOUN, VERB, ...).
    #[default]
    Universal,
    /// Penn Treebank fine tags (NN*, VB*, ...).
    PennTreebank,
}

impl TagScheme {
    pub fn rules(self) -> &'static BucketRules {
        match self {
            TagScheme::Universal => BucketRules::universal(),
            TagScheme::PennTreebank => BucketRules::penn_treebank(),
        }
    }
}

impl fmt::Display for TagScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagScheme::Universal => write!(f, "universal"),
            TagScheme::PennTreebank => write!(f, "penn-treebank"),
        }
    }
}

/// Token counts of the six semantic buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub noun: usize,
    pub verb: usize,
    pub adjective: usize,
    pub adverb: usize,
    pub pronoun: usize,
    pub determiner: usize,
}

impl BucketCounts {
    /// Tokens that fell into any bucket.
    pub fn classified(&self) -> usize {
        self.noun + self.verb + self.adjective + self.adverb + self.pronoun + self.determiner
    }

    /// Nouns, verbs, adjectives and adverbs.
    pub fn open_class(&self) -> usize {
        self.noun + self.verb + self.adjective + self.adverb
    }

    fn classify(&mut self, rules: &BucketRules, tag: &str) {
        let hit = |set: &[MatchRule]| set.iter().any(|rule| rule.matches(tag));
        // First matching bucket wins so buckets never double count.
        if hit(rules.noun) {
            self.noun += 1;
        } else if hit(rules.verb) {
            self.verb += 1;
        } else if hit(rules.adjective) {
            self.adjective += 1;
        } else if hit(rules.adverb) {
            self.adverb += 1;
        } else if hit(rules.pronoun) {
            self.pronoun += 1;
        } else if hit(rules.determiner) {
            self.determiner += 1;
        }
    }
}

/// Derived morphological metrics for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub group: String,
    pub scheme: TagScheme,
    pub total_tokens: usize,
    pub counts: BucketCounts,
    pub noun_verb_ratio: f64,
    pub adjective_noun_ratio: f64,
    /// Open-class tokens over all tokens, in percent.
    pub lexical_density: f64,
    /// Verbs over all tokens, in percent.
    pub syntactic_complexity: f64,
    /// Ratios whose denominator was clamped.
    pub warnings: Vec<DegenerateRatioWarning>,
}

impl MetricsReport {
    /// Share of all tokens for a bucket count, in percent.
    pub fn share(&self, count: usize) -> f64 {
        count as f64 / self.total_tokens.max(1) as f64 * 100.0
    }

    pub fn is_degenerate(&self) -> bool {
        !self.warnings.is_empty()
    }
}

fn guarded_ratio(
    numerator: usize,
    denominator: usize,
    kind: RatioKind,
    warnings: &mut Vec<DegenerateRatioWarning>,
) -> f64 {
    if denominator == 0 {
        warnings.push(DegenerateRatioWarning { ratio: kind });
    }
    numerator as f64 / denominator.max(1) as f64
}

/// Grammatical person of a pronoun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Person {
    First,
    Second,
    Third,
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Person::First => write!(f, "1st person"),
            Person::Second => write!(f, "2nd person"),
            Person::Third => write!(f, "3rd person"),
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

fn default_first_person() -> Vec<String> {
    words(&["i", "me", "my", "mine", "we", "us", "our", "ours"])
}

fn default_second_person() -> Vec<String> {
    words(&["you", "your", "yours"])
}

fn default_third_person() -> Vec<String> {
    words(&[
        "he", "him", "his", "she", "her", "hers", "it", "its", "they", "them", "their", "theirs",
    ])
}

/// Closed word lists mapping pronoun forms to grammatical person.
///
/// The defaults are English; other languages supply their own lists
/// through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PronounLexicon {
    #[serde(default = "default_first_person")]
    pub first: Vec<String>,
    #[serde(default = "default_second_person")]
    pub second: Vec<String>,
    #[serde(default = "default_third_person")]
    pub third: Vec<String>,
}

impl Default for PronounLexicon {
    fn default() -> Self {
        Self::english()
    }
}

impl PronounLexicon {
    pub fn english() -> Self {
        Self {
            first: default_first_person(),
            second: default_second_person(),
            third: default_third_person(),
        }
    }

    /// Person of a lower-cased pronoun, if it is listed.
    pub fn classify(&self, pronoun: &str) -> Option<Person> {
        if self.first.iter().any(|w| w == pronoun) {
            Some(Person::First)
        } else if self.second.iter().any(|w| w == pronoun) {
            Some(Person::Second)
        } else if self.third.iter().any(|w| w == pronoun) {
            Some(Person::Third)
        } else {
            None
        }
    }
}

/// Pronoun counts per grammatical person.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PersonCounts {
    pub first: usize,
    pub second: usize,
    pub third: usize,
}

impl PersonCounts {
    pub fn get(&self, person: Person) -> usize {
        match person {
            Person::First => self.first,
            Person::Second => self.second,
            Person::Third => self.third,
        }
    }

    fn add(&mut self, person: Person, count: usize) {
        match person {
            Person::First => self.first += count,
            Person::Second => self.second += count,
            Person::Third => self.third += count,
        }
    }
}

/// Pronoun usage of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupPronouns {
    pub group: String,
    pub documents: usize,
    /// Pronoun tokens in the group.
    pub total: usize,
    /// Most frequent pronouns, ties in first-seen order.
    pub top: Vec<RankedEntry>,
    pub persons: PersonCounts,
}

/// Side-by-side pronoun usage of two groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PronounReport {
    pub group_a: GroupPronouns,
    pub group_b: GroupPronouns,
}

/// Percentage-point difference of one tag between two groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagDifference {
    pub tag: String,
    pub pct_a: f64,
    pub pct_b: f64,
    /// `pct_a - pct_b`.
    pub difference: f64,
}

/// Tags that distinguish two groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub group_a: String,
    pub group_b: String,
    pub tokens_a: usize,
    pub tokens_b: usize,
    /// Every tag seen in either group, first-seen order (group A first).
    pub differences: Vec<TagDifference>,
    /// Largest positive differences first.
    pub favoring_a: Vec<TagDifference>,
    /// Largest negative differences first.
    pub favoring_b: Vec<TagDifference>,
}

impl ComparisonReport {
    pub fn difference(&self, tag: &str) -> Option<f64> {
        self.differences
            .iter()
            .find(|d| d.tag == tag)
            .map(|d| d.difference)
    }
}

/// Fine-tag counts split by the explicit flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplicitTagCount {
    pub tag: String,
    pub explicit: usize,
    pub clean: usize,
}

/// Most frequent fine tags, explicit vs clean tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplicitReport {
    pub explicit_records: usize,
    pub clean_records: usize,
    pub rows: Vec<ExplicitTagCount>,
}

fn tag_table<'a>(
    corpus: &'a AnnotatedCorpus,
    filter: &'a GroupFilter,
    layer: TagLayer,
) -> FrequencyTable {
    FrequencyTable::from_labels(corpus.matching(filter).flat_map(|r| layer.tags(r)))
}

/// Coarse-tag distribution of the records selected by `filter`.
///
/// Fails with [`Error::EmptyGroup`] when the group has no tokens.
pub fn pos_distribution(corpus: &AnnotatedCorpus, filter: &GroupFilter) -> Result<FrequencyTable> {
    let table = tag_table(corpus, filter, TagLayer::Coarse);

    if table.total() == 0 {
        return Err(Error::empty_group(filter));
    }

    debug!(
        group = %filter,
        tokens = table.total(),
        "POS distribution over {} categories",
        table.len()
    );
    Ok(table)
}

/// Bucket counts and derived ratios for the records selected by `filter`.
///
/// Zero denominators are clamped to one and reported as
/// [`DegenerateRatioWarning`]s instead of failing.
pub fn derived_metrics(
    corpus: &AnnotatedCorpus,
    filter: &GroupFilter,
    rules: &BucketRules,
) -> Result<MetricsReport> {
    let mut records = 0;
    let mut total = 0;
    let mut counts = BucketCounts::default();

    for record in corpus.matching(filter) {
        records += 1;
        for tag in rules.layer.tags(record) {
            total += 1;
            counts.classify(rules, tag);
        }
    }

    if records == 0 {
        return Err(Error::empty_group(filter));
    }

    let mut warnings = Vec::new();
    let noun_verb_ratio =
        guarded_ratio(counts.noun, counts.verb, RatioKind::NounVerb, &mut warnings);
    let adjective_noun_ratio = guarded_ratio(
        counts.adjective,
        counts.noun,
        RatioKind::AdjectiveNoun,
        &mut warnings,
    );
    let lexical_density =
        guarded_ratio(counts.open_class(), total, RatioKind::LexicalDensity, &mut warnings) * 100.0;
    let syntactic_complexity =
        guarded_ratio(counts.verb, total, RatioKind::SyntacticComplexity, &mut warnings) * 100.0;

    for warning in &warnings {
        warn!(group = %filter, "Degenerate ratio: {}", warning);
    }

    Ok(MetricsReport {
        group: filter.label(),
        scheme: rules.scheme,
        total_tokens: total,
        counts,
        noun_verb_ratio,
        adjective_noun_ratio,
        lexical_density,
        syntactic_complexity,
        warnings,
    })
}

fn group_pronouns(
    corpus: &AnnotatedCorpus,
    filter: &GroupFilter,
    top_n: usize,
    lexicon: &PronounLexicon,
) -> Result<GroupPronouns> {
    let mut documents = 0;
    let mut table = FrequencyTable::new();
    for record in corpus.matching(filter) {
        documents += 1;
        for pronoun in record.pronouns() {
            table.add(pronoun, 1);
        }
    }

    if documents == 0 {
        return Err(Error::empty_group(filter));
    }

    let mut persons = PersonCounts::default();
    for (pronoun, count) in table.iter() {
        if let Some(person) = lexicon.classify(pronoun) {
            persons.add(person, count);
        }
    }

    Ok(GroupPronouns {
        group: filter.label(),
        documents,
        total: table.total(),
        top: table.top(top_n),
        persons,
    })
}

/// Top pronouns and per-person totals for two groups.
pub fn pronoun_analysis(
    corpus: &AnnotatedCorpus,
    group_a: &GroupFilter,
    group_b: &GroupFilter,
    top_n: usize,
    lexicon: &PronounLexicon,
) -> Result<PronounReport> {
    Ok(PronounReport {
        group_a: group_pronouns(corpus, group_a, top_n, lexicon)?,
        group_b: group_pronouns(corpus, group_b, top_n, lexicon)?,
    })
}

/// Per-tag percentage-point differences between two groups.
///
/// A group without tokens contributes 0% for every tag.
pub fn comparative_patterns(
    corpus: &AnnotatedCorpus,
    group_a: &GroupFilter,
    group_b: &GroupFilter,
    top_k: usize,
) -> ComparisonReport {
    let table_a = tag_table(corpus, group_a, TagLayer::Coarse);
    let table_b = tag_table(corpus, group_b, TagLayer::Coarse);

    let mut seen = HashSet::new();
    let differences: Vec<TagDifference> = table_a
        .labels()
        .chain(table_b.labels())
        .filter(|tag| seen.insert(*tag))
        .map(|tag| {
            let pct_a = table_a.percentage(tag);
            let pct_b = table_b.percentage(tag);
            TagDifference {
                tag: tag.to_string(),
                pct_a,
                pct_b,
                difference: pct_a - pct_b,
            }
        })
        .collect();

    let mut favoring_a = differences.clone();
    favoring_a.sort_by(|x, y| y.difference.total_cmp(&x.difference));
    favoring_a.truncate(top_k);

    let mut favoring_b = differences.clone();
    favoring_b.sort_by(|x, y| x.difference.total_cmp(&y.difference));
    favoring_b.truncate(top_k);

    ComparisonReport {
        group_a: group_a.label(),
        group_b: group_b.label(),
        tokens_a: table_a.total(),
        tokens_b: table_b.total(),
        differences,
        favoring_a,
        favoring_b,
    }
}

/// The `top_n` most frequent fine tags over records with a known explicit
/// flag, with their counts in explicit and clean records.
pub fn fine_tags_by_explicit(corpus: &AnnotatedCorpus, top_n: usize) -> Result<ExplicitReport> {
    let mut overall = FrequencyTable::new();
    let mut explicit = FrequencyTable::new();
    let mut clean = FrequencyTable::new();
    let mut explicit_records = 0;
    let mut clean_records = 0;

    for record in corpus.records() {
        let target = match record.explicit() {
            Some(true) => {
                explicit_records += 1;
                &mut explicit
            }
            Some(false) => {
                clean_records += 1;
                &mut clean
            }
            None => continue,
        };
        for tag in record.fine_tags() {
            target.add(tag, 1);
            overall.add(tag, 1);
        }
    }

    if overall.total() == 0 {
        return Err(Error::empty_group("records with a known explicit flag"));
    }

    let rows = overall
        .top(top_n)
        .into_iter()
        .map(|entry| ExplicitTagCount {
            explicit: explicit.get(&entry.label),
            clean: clean.get(&entry.label),
            tag: entry.label,
        })
        .collect();

    Ok(ExplicitReport {
        explicit_records,
        clean_records,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnnotatedRecord, Document, TimeBucket};
    use std::sync::Arc;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn corpus_of(entries: &[(&str, i32, Option<bool>, &[&str], &[&str])]) -> AnnotatedCorpus {
        let mut documents = Vec::new();
        let mut records = Vec::new();
        for (i, (genre, year, explicit, tags, pronouns)) in entries.iter().enumerate() {
            let mut doc = Document::new("", *genre, *year, "joy");
            doc.explicit = *explicit;
            let fine = tags.iter().map(|t| format!("{}-fine", t)).collect();
            records.push(
                AnnotatedRecord::for_document(i, &doc, strings(tags), fine, strings(pronouns))
                    .unwrap(),
            );
            documents.push(doc);
        }
        AnnotatedCorpus::new(Arc::from(documents), records, vec![])
    }

    /// The three-document corpus: two pop songs and one hip hop song.
    fn scenario() -> AnnotatedCorpus {
        corpus_of(&[
            ("pop", 1995, None, &["NOUN", "VERB", "PRON"], &["i"]),
            ("hip hop", 2005, None, &["NOUN", "NOUN", "VERB"], &[]),
            ("pop", 2015, None, &["PRON", "VERB"], &["you"]),
        ])
    }

    #[test]
    fn test_pos_distribution_for_pop() {
        let corpus = scenario();
        let table = pos_distribution(&corpus, &GroupFilter::genre("pop")).unwrap();

        assert_eq!(table.get("NOUN"), 1);
        assert_eq!(table.get("VERB"), 2);
        assert_eq!(table.get("PRON"), 2);
        assert_eq!(table.total(), corpus.token_count(&GroupFilter::genre("pop")));
    }

    #[test]
    fn test_pos_distribution_all_and_period() {
        let corpus = scenario();
        let all = pos_distribution(&corpus, &GroupFilter::All).unwrap();
        assert_eq!(all.total(), 8);
        assert_eq!(all.ranked()[0].label, "NOUN");

        let nineties = GroupFilter::Period(TimeBucket::new("1990s", 1990, 1999));
        let table = pos_distribution(&corpus, &nineties).unwrap();
        assert_eq!(table.total(), 3);
    }

    #[test]
    fn test_empty_group_is_an_error() {
        let corpus = scenario();
        let result = pos_distribution(&corpus, &GroupFilter::genre("rock"));
        assert!(matches!(result, Err(Error::EmptyGroup { .. })));

        let rock = GroupFilter::genre("rock");
        let result = derived_metrics(&corpus, &rock, BucketRules::universal());
        assert!(matches!(result, Err(Error::EmptyGroup { .. })));
    }

    #[test]
    fn test_pronoun_persons_for_pop() {
        let corpus = scenario();
        let report = pronoun_analysis(
            &corpus,
            &GroupFilter::genre("pop"),
            &GroupFilter::genre("hip hop"),
            10,
            &PronounLexicon::english(),
        )
        .unwrap();

        assert_eq!(report.group_a.persons.first, 1);
        assert_eq!(report.group_a.persons.second, 1);
        assert_eq!(report.group_a.persons.third, 0);
        assert_eq!(report.group_a.total, 2);
        assert_eq!(report.group_a.documents, 2);
        assert_eq!(report.group_b.total, 0);
        assert!(report.group_b.top.is_empty());
    }

    #[test]
    fn test_pronoun_ranking_ties_and_limit() {
        let corpus = corpus_of(&[
            ("pop", 2000, None, &["PRON"; 6], &["you", "me", "you", "me", "it", "they"]),
        ]);
        let report = pronoun_analysis(
            &corpus,
            &GroupFilter::All,
            &GroupFilter::genre("pop"),
            3,
            &PronounLexicon::english(),
        )
        .unwrap();

        let labels: Vec<&str> = report.group_a.top.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["you", "me", "it"]);
        assert!((report.group_a.top[0].percentage - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(report.group_a.persons.third, 2);
    }

    #[test]
    fn test_pronoun_empty_group_errors() {
        let corpus = scenario();
        let result = pronoun_analysis(
            &corpus,
            &GroupFilter::genre("pop"),
            &GroupFilter::genre("rock"),
            10,
            &PronounLexicon::english(),
        );
        assert!(matches!(result, Err(Error::EmptyGroup { .. })));
    }

    #[test]
    fn test_custom_lexicon() {
        let lexicon = PronounLexicon {
            first: strings(&["yo"]),
            second: strings(&["tú"]),
            third: strings(&["él"]),
        };
        assert_eq!(lexicon.classify("yo"), Some(Person::First));
        assert_eq!(lexicon.classify("i"), None);
    }

    #[test]
    fn test_derived_metrics() {
        let corpus = corpus_of(&[(
            "pop",
            2000,
            None,
            &["NOUN", "NOUN", "VERB", "ADJ", "ADV", "PRON", "DET", "ADP", "PROPN", "AUX"],
            &[],
        )]);
        let report = derived_metrics(&corpus, &GroupFilter::All, BucketRules::universal()).unwrap();

        assert_eq!(report.total_tokens, 10);
        assert_eq!(report.counts.noun, 2);
        assert_eq!(report.counts.verb, 1);
        assert_eq!(report.counts.adjective, 1);
        assert_eq!(report.counts.adverb, 1);
        assert_eq!(report.counts.pronoun, 1);
        assert_eq!(report.counts.determiner, 1);
        assert!(report.counts.classified() < report.total_tokens);
        assert!((report.noun_verb_ratio - 2.0).abs() < 1e-9);
        assert!((report.adjective_noun_ratio - 0.5).abs() < 1e-9);
        assert!((report.lexical_density - 50.0).abs() < 1e-9);
        assert!((report.syntactic_complexity - 10.0).abs() < 1e-9);
        assert!(!report.is_degenerate());
    }

    #[test]
    fn test_derived_metrics_degenerate() {
        let corpus = corpus_of(&[("pop", 2000, None, &["NOUN", "NOUN", "NOUN"], &[])]);
        let report = derived_metrics(&corpus, &GroupFilter::All, BucketRules::universal()).unwrap();

        assert!((report.noun_verb_ratio - 3.0).abs() < 1e-9);
        assert_eq!(
            report.warnings,
            vec![DegenerateRatioWarning {
                ratio: RatioKind::NounVerb
            }]
        );

        let empty = corpus_of(&[("pop", 2000, None, &[], &[])]);
        let report = derived_metrics(&empty, &GroupFilter::All, BucketRules::universal()).unwrap();
        assert_eq!(report.total_tokens, 0);
        assert_eq!(report.warnings.len(), 4);
    }

    #[test]
    fn test_penn_treebank_scheme() {
        let mut documents = Vec::new();
        let doc = Document::new("", "pop", 2000, "joy");
        let record = AnnotatedRecord::for_document(
            0,
            &doc,
            strings(&["PRON", "VERB", "DET", "NOUN", "PROPN"]),
            strings(&["PRP", "VBP", "DT", "NNS", "NNP"]),
            strings(&["i"]),
        )
        .unwrap();
        documents.push(doc);
        let corpus = AnnotatedCorpus::new(Arc::from(documents), vec![record], vec![]);

        let report =
            derived_metrics(&corpus, &GroupFilter::All, BucketRules::penn_treebank()).unwrap();
        assert_eq!(report.counts.noun, 2);
        assert_eq!(report.counts.verb, 1);
        assert_eq!(report.counts.pronoun, 1);
        assert_eq!(report.counts.determiner, 1);
    }

    #[test]
    fn test_comparative_patterns() {
        let corpus = scenario();
        let report = comparative_patterns(
            &corpus,
            &GroupFilter::genre("hip hop"),
            &GroupFilter::genre("pop"),
            5,
        );

        // hip hop: NOUN 66.7%, VERB 33.3%; pop: NOUN 20%, VERB 40%, PRON 40%
        let tags: Vec<&str> = report.differences.iter().map(|d| d.tag.as_str()).collect();
        assert_eq!(tags, vec!["NOUN", "VERB", "PRON"]);
        assert!((report.difference("NOUN").unwrap() - (200.0 / 3.0 - 20.0)).abs() < 1e-9);
        assert_eq!(report.favoring_a[0].tag, "NOUN");
        assert_eq!(report.favoring_b[0].tag, "PRON");
        assert_eq!(report.tokens_a, 3);
        assert_eq!(report.tokens_b, 5);
    }

    #[test]
    fn test_comparative_patterns_antisymmetric() {
        let corpus = scenario();
        let pop = GroupFilter::genre("pop");
        let hip_hop = GroupFilter::genre("hip hop");
        let forward = comparative_patterns(&corpus, &pop, &hip_hop, 5);
        let backward = comparative_patterns(&corpus, &hip_hop, &pop, 5);

        for diff in &forward.differences {
            assert_eq!(backward.difference(&diff.tag), Some(-diff.difference));
        }
    }

    #[test]
    fn test_comparative_patterns_empty_group() {
        let corpus = scenario();
        let report = comparative_patterns(
            &corpus,
            &GroupFilter::genre("pop"),
            &GroupFilter::genre("rock"),
            2,
        );
        assert_eq!(report.tokens_b, 0);
        assert!(report.differences.iter().all(|d| d.pct_b == 0.0));
        assert_eq!(report.favoring_a.len(), 2);
    }

    #[test]
    fn test_fine_tags_by_explicit() {
        let corpus = corpus_of(&[
            ("pop", 2000, Some(true), &["NOUN", "VERB", "NOUN"], &[]),
            ("pop", 2000, Some(false), &["NOUN", "PRON"], &[]),
            ("pop", 2000, None, &["ADJ", "ADJ", "ADJ", "ADJ"], &[]),
        ]);
        let report = fine_tags_by_explicit(&corpus, 2).unwrap();

        assert_eq!(report.explicit_records, 1);
        assert_eq!(report.clean_records, 1);
        assert_eq!(
            report.rows[0],
            ExplicitTagCount {
                tag: "NOUN-fine".to_string(),
                explicit: 2,
                clean: 1
            }
        );
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[1].tag, "VERB-fine");

        let unknown = corpus_of(&[("pop", 2000, None, &["NOUN"], &[])]);
        assert!(fine_tags_by_explicit(&unknown, 2).is_err());
    }
}

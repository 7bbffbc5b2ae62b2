//! Memoizing front-end over the aggregation functions.

use crate::analysis::aggregator::{
    self, ComparisonReport, ExplicitReport, MetricsReport, PronounLexicon, PronounReport,
    TagScheme,
};
use crate::analysis::frequency::FrequencyTable;
use crate::error::Result;
use crate::models::{AnnotatedCorpus, GroupFilter};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Limits and word lists applied by the engine's queries.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub top_pronouns: usize,
    pub distinctive_tags: usize,
    pub explicit_top_tags: usize,
    pub lexicon: PronounLexicon,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            top_pronouns: 10,
            distinctive_tags: 5,
            explicit_top_tags: 5,
            lexicon: PronounLexicon::english(),
        }
    }
}

/// Parameter tuple identifying a cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum QueryKey {
    Distribution(GroupFilter),
    Metrics(GroupFilter, TagScheme),
    Pronouns(GroupFilter, GroupFilter),
    Patterns(GroupFilter, GroupFilter),
    Explicit,
}

#[derive(Debug, Clone)]
enum CachedAggregate {
    Distribution(Arc<FrequencyTable>),
    Metrics(Arc<MetricsReport>),
    Pronouns(Arc<PronounReport>),
    Patterns(Arc<ComparisonReport>),
    Explicit(Arc<ExplicitReport>),
}

trait Cacheable: Sized {
    fn into_entry(value: Arc<Self>) -> CachedAggregate;
    fn from_entry(entry: &CachedAggregate) -> Option<Arc<Self>>;
}

impl Cacheable for FrequencyTable {
    fn into_entry(value: Arc<Self>) -> CachedAggregate {
        CachedAggregate::Distribution(value)
    }

    fn from_entry(entry: &CachedAggregate) -> Option<Arc<Self>> {
        match entry {
            CachedAggregate::Distribution(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }
}

impl Cacheable for MetricsReport {
    fn into_entry(value: Arc<Self>) -> CachedAggregate {
        CachedAggregate::Metrics(value)
    }

    fn from_entry(entry: &CachedAggregate) -> Option<Arc<Self>> {
        match entry {
            CachedAggregate::Metrics(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }
}

impl Cacheable for PronounReport {
    fn into_entry(value: Arc<Self>) -> CachedAggregate {
        CachedAggregate::Pronouns(value)
    }

    fn from_entry(entry: &CachedAggregate) -> Option<Arc<Self>> {
        match entry {
            CachedAggregate::Pronouns(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }
}

impl Cacheable for ComparisonReport {
    fn into_entry(value: Arc<Self>) -> CachedAggregate {
        CachedAggregate::Patterns(value)
    }

    fn from_entry(entry: &CachedAggregate) -> Option<Arc<Self>> {
        match entry {
            CachedAggregate::Patterns(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }
}

impl Cacheable for ExplicitReport {
    fn into_entry(value: Arc<Self>) -> CachedAggregate {
        CachedAggregate::Explicit(value)
    }

    fn from_entry(entry: &CachedAggregate) -> Option<Arc<Self>> {
        match entry {
            CachedAggregate::Explicit(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }
}

/// Answers aggregation queries over one shared corpus, computing each
/// distinct parameter tuple at most once.
///
/// Results are cached whole; failed queries are not cached. The lock is
/// held while computing so concurrent callers never duplicate work.
pub struct AggregationEngine {
    corpus: Arc<AnnotatedCorpus>,
    settings: AnalysisSettings,
    cache: Mutex<HashMap<QueryKey, CachedAggregate>>,
    computations: AtomicUsize,
}

impl AggregationEngine {
    pub fn new(corpus: Arc<AnnotatedCorpus>, settings: AnalysisSettings) -> Self {
        Self {
            corpus,
            settings,
            cache: Mutex::new(HashMap::new()),
            computations: AtomicUsize::new(0),
        }
    }

    pub fn corpus(&self) -> &Arc<AnnotatedCorpus> {
        &self.corpus
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Number of times a query was actually computed.
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }

    /// Drop every cached result.
    pub fn clear(&self) {
        self.lock_cache().clear();
    }

    pub fn pos_distribution(&self, filter: &GroupFilter) -> Result<Arc<FrequencyTable>> {
        self.cached(QueryKey::Distribution(filter.clone()), |corpus| {
            aggregator::pos_distribution(corpus, filter)
        })
    }

    pub fn derived_metrics(
        &self,
        filter: &GroupFilter,
        scheme: TagScheme,
    ) -> Result<Arc<MetricsReport>> {
        self.cached(QueryKey::Metrics(filter.clone(), scheme), |corpus| {
            aggregator::derived_metrics(corpus, filter, scheme.rules())
        })
    }

    pub fn pronoun_analysis(
        &self,
        group_a: &GroupFilter,
        group_b: &GroupFilter,
    ) -> Result<Arc<PronounReport>> {
        let key = QueryKey::Pronouns(group_a.clone(), group_b.clone());
        self.cached(key, |corpus| {
            aggregator::pronoun_analysis(
                corpus,
                group_a,
                group_b,
                self.settings.top_pronouns,
                &self.settings.lexicon,
            )
        })
    }

    pub fn comparative_patterns(
        &self,
        group_a: &GroupFilter,
        group_b: &GroupFilter,
    ) -> Arc<ComparisonReport> {
        let key = QueryKey::Patterns(group_a.clone(), group_b.clone());
        self.cached(key, |corpus| {
            Ok::<_, Infallible>(aggregator::comparative_patterns(
                corpus,
                group_a,
                group_b,
                self.settings.distinctive_tags,
            ))
        })
        .unwrap_or_else(|never| match never {})
    }

    pub fn fine_tags_by_explicit(&self) -> Result<Arc<ExplicitReport>> {
        self.cached(QueryKey::Explicit, |corpus| {
            aggregator::fine_tags_by_explicit(corpus, self.settings.explicit_top_tags)
        })
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<QueryKey, CachedAggregate>> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn cached<T, E, F>(&self, key: QueryKey, compute: F) -> std::result::Result<Arc<T>, E>
    where
        T: Cacheable,
        F: FnOnce(&AnnotatedCorpus) -> std::result::Result<T, E>,
    {
        let mut cache = self.lock_cache();
        if let Some(hit) = cache.get(&key).and_then(T::from_entry) {
            debug!(?key, "Aggregation cache hit");
            return Ok(hit);
        }

        self.computations.fetch_add(1, Ordering::Relaxed);
        let value = Arc::new(compute(&self.corpus)?);
        cache.insert(key, T::into_entry(Arc::clone(&value)));
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::{AnnotatedRecord, Document};
    use std::thread;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn engine() -> AggregationEngine {
        let docs = vec![
            Document::new("", "pop", 1995, "joy"),
            Document::new("", "hip hop", 2005, "anger"),
        ];
        let records = vec![
            AnnotatedRecord::for_document(
                0,
                &docs[0],
                strings(&["NOUN", "VERB", "PRON"]),
                strings(&["NN", "VBP", "PRP"]),
                strings(&["i"]),
            )
            .unwrap(),
            AnnotatedRecord::for_document(
                1,
                &docs[1],
                strings(&["NOUN", "NOUN", "VERB"]),
                strings(&["NN", "NNS", "VBD"]),
                vec![],
            )
            .unwrap(),
        ];
        let corpus = AnnotatedCorpus::new(Arc::from(docs), records, vec![]);
        AggregationEngine::new(Arc::new(corpus), AnalysisSettings::default())
    }

    #[test]
    fn test_repeated_query_computes_once() {
        let engine = engine();
        let pop = GroupFilter::genre("pop");

        let first = engine.pos_distribution(&pop).unwrap();
        let second = engine.pos_distribution(&pop).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.computations(), 1);
    }

    #[test]
    fn test_distinct_parameters_are_distinct_entries() {
        let engine = engine();
        let pop = GroupFilter::genre("pop");

        engine.pos_distribution(&pop).unwrap();
        engine.pos_distribution(&GroupFilter::All).unwrap();
        engine.derived_metrics(&pop, TagScheme::Universal).unwrap();
        engine.derived_metrics(&pop, TagScheme::PennTreebank).unwrap();
        engine.derived_metrics(&pop, TagScheme::Universal).unwrap();

        assert_eq!(engine.computations(), 4);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let engine = engine();
        let rock = GroupFilter::genre("rock");

        assert!(matches!(
            engine.pos_distribution(&rock),
            Err(Error::EmptyGroup { .. })
        ));
        assert!(engine.pos_distribution(&rock).is_err());
        assert_eq!(engine.computations(), 2);
    }

    #[test]
    fn test_patterns_and_clear() {
        let engine = engine();
        let pop = GroupFilter::genre("pop");
        let hip_hop = GroupFilter::genre("hip hop");

        let report = engine.comparative_patterns(&hip_hop, &pop);
        assert_eq!(report.favoring_a[0].tag, "NOUN");
        engine.comparative_patterns(&hip_hop, &pop);
        assert_eq!(engine.computations(), 1);

        engine.clear();
        engine.comparative_patterns(&hip_hop, &pop);
        assert_eq!(engine.computations(), 2);
    }

    #[test]
    fn test_concurrent_callers_share_one_computation() {
        let engine = Arc::new(engine());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    engine
                        .pronoun_analysis(
                            &GroupFilter::genre("pop"),
                            &GroupFilter::genre("hip hop"),
                        )
                        .map(|report| report.group_a.total)
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 1);
        }
        assert_eq!(engine.computations(), 1);
    }
}

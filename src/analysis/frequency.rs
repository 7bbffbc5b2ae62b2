//! Insertion-ordered frequency tables.

use serde::Serialize;
use std::collections::HashMap;

/// A label with its count and share of the table total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub label: String,
    pub count: usize,
    /// Percentage of the table total (0-100).
    pub percentage: f64,
}

/// Mapping from a label to a count.
///
/// Labels keep the order in which they were first seen, which is what
/// breaks ties when ranking: `ranked()` is a stable sort on count
/// descending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrequencyTable {
    entries: Vec<(String, usize)>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    total: usize,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every label of an iterator.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for label in labels {
            table.add(label.as_ref(), 1);
        }
        table
    }

    /// Add `count` occurrences of `label`.
    pub fn add(&mut self, label: &str, count: usize) {
        match self.index.get(label) {
            Some(&slot) => self.entries[slot].1 += count,
            None => {
                self.index.insert(label.to_string(), self.entries.len());
                self.entries.push((label.to_string(), count));
            }
        }
        self.total += count;
    }

    pub fn get(&self, label: &str) -> usize {
        self.index
            .get(label)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(label, count)| (label.as_str(), *count))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    /// Share of the total for `count`, in percent. Zero when the table is
    /// empty.
    pub fn percentage_of(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }

    pub fn percentage(&self, label: &str) -> f64 {
        self.percentage_of(self.get(label))
    }

    /// All entries, most frequent first.
    pub fn ranked(&self) -> Vec<RankedEntry> {
        let mut sorted: Vec<&(String, usize)> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
            .into_iter()
            .map(|(label, count)| RankedEntry {
                label: label.clone(),
                count: *count,
                percentage: self.percentage_of(*count),
            })
            .collect()
    }

    /// The `n` most frequent entries.
    pub fn top(&self, n: usize) -> Vec<RankedEntry> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_total() {
        let table = FrequencyTable::from_labels(["NOUN", "VERB", "NOUN", "PRON"]);
        assert_eq!(table.get("NOUN"), 2);
        assert_eq!(table.get("ADJ"), 0);
        assert_eq!(table.total(), 4);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_ranking_ties_keep_first_seen_order() {
        let table = FrequencyTable::from_labels(["b", "a", "c", "a", "b", "d"]);
        let labels: Vec<String> = table.ranked().into_iter().map(|e| e.label).collect();
        assert_eq!(labels, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let table = FrequencyTable::from_labels(["x", "y", "y", "z", "z", "z"]);
        let sum: f64 = table.ranked().iter().map(|e| e.percentage).sum();
        assert!((sum - 100.0).abs() < 0.01);
        assert!((table.percentage("z") - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_table_percentages() {
        let table = FrequencyTable::new();
        assert!(table.is_empty());
        assert_eq!(table.percentage("anything"), 0.0);
        assert!(table.ranked().is_empty());
    }

    #[test]
    fn test_top() {
        let table = FrequencyTable::from_labels(["a", "b", "b", "c", "c", "c"]);
        let top: Vec<String> = table.top(2).into_iter().map(|e| e.label).collect();
        assert_eq!(top, vec!["c", "b"]);
        assert_eq!(table.top(10).len(), 3);
    }
}

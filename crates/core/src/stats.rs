//! Cohort summary statistics.
//!
//! Zero-row cohorts are a first-class case: numeric summaries of an empty sample are `None`, and
//! frequency tables of an empty sample are empty.

use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// Descriptive statistics of a numeric sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n − 1). Absent for a single observation.
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub total: f64,
}

/// Summarises `values`, ignoring NaN observations. Returns `None` when nothing remains.
pub fn summarize(values: &[f64]) -> Option<NumericSummary> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let total: f64 = sorted.iter().sum();
    let mean = total / count as f64;
    let median = if count % 2 == 1 {
        sorted[count / 2]
    } else {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    };
    let std_dev = (count >= 2).then(|| {
        let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count as f64 - 1.0);
        var.sqrt()
    });

    Some(NumericSummary {
        count,
        mean,
        median,
        std_dev,
        min: sorted[0],
        max: sorted[count - 1],
        total,
    })
}

/// Value counts in first-encounter order.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable<T> {
    entries: Vec<(T, usize)>,
}

impl<T: Eq + Hash + Clone> FrequencyTable<T> {
    pub fn from_values<I: IntoIterator<Item = T>>(values: I) -> Self {
        let mut index: HashMap<T, usize> = HashMap::new();
        let mut entries: Vec<(T, usize)> = Vec::new();
        for value in values {
            match index.get(&value) {
                Some(&slot) => entries[slot].1 += 1,
                None => {
                    index.insert(value.clone(), entries.len());
                    entries.push((value, 1));
                }
            }
        }
        Self { entries }
    }

    /// Entries in the order each value was first seen.
    pub fn entries(&self) -> &[(T, usize)] {
        &self.entries
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_of(&self, value: &T) -> usize {
        self.entries
            .iter()
            .find(|(v, _)| v == value)
            .map_or(0, |(_, count)| *count)
    }

    /// The `k` most frequent values, ties broken by first-encounter order.
    pub fn top_k(&self, k: usize) -> Vec<(T, usize)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(k);
        ranked
    }

    /// All values sorted by count, each with its share of the total in percent (2 dp).
    pub fn shares(&self) -> Vec<Share<T>> {
        let total = self.total();
        self.top_k(self.entries.len())
            .into_iter()
            .map(|(value, count)| Share {
                value,
                count,
                percentage: percentage(count, total),
            })
            .collect()
    }
}

/// A value's count and percentage of the whole sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share<T> {
    pub value: T,
    pub count: usize,
    pub percentage: f64,
}

/// `part / whole` in percent rounded to two decimals; `0.0` for an empty whole.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_to(part as f64 * 100.0 / whole as f64, 2)
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_summarize_empty_is_none() {
        assert_eq!(summarize(&[]), None);
        assert_eq!(summarize(&[f64::NAN]), None);
    }

    #[test]
    fn test_summarize_single_value_has_no_std_dev() {
        let summary = summarize(&[42.0]).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.mean, 42.0);
        assert_eq!(summary.median, 42.0);
        assert_eq!(summary.std_dev, None);
        assert_eq!(summary.min, 42.0);
        assert_eq!(summary.max, 42.0);
    }

    #[test]
    fn test_summarize_uses_sample_std_dev() {
        let summary = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_relative_eq!(summary.mean, 5.0);
        assert_relative_eq!(summary.median, 4.5);
        // population sd is 2.0; sample sd is sqrt(32 / 7)
        assert_relative_eq!(summary.std_dev.unwrap(), (32.0f64 / 7.0).sqrt());
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 9.0);
        assert_eq!(summary.total, 40.0);
    }

    #[test]
    fn test_summarize_odd_median_on_unsorted_input() {
        let summary = summarize(&[9.0, 1.0, 5.0]).unwrap();
        assert_eq!(summary.median, 5.0);
    }

    #[test]
    fn test_frequency_table_keeps_first_seen_order() {
        let table = FrequencyTable::from_values(["MA", "NY", "MA", "CA", "NY", "MA"]);
        assert_eq!(table.entries(), &[("MA", 3), ("NY", 2), ("CA", 1)]);
        assert_eq!(table.total(), 6);
        assert_eq!(table.count_of(&"CA"), 1);
        assert_eq!(table.count_of(&"TX"), 0);
    }

    #[test]
    fn test_top_k_breaks_ties_by_first_seen() {
        let table = FrequencyTable::from_values(["b", "a", "c", "a", "b", "d"]);
        assert_eq!(table.top_k(3), vec![("b", 2), ("a", 2), ("c", 1)]);
    }

    #[test]
    fn test_top_k_larger_than_table() {
        let table = FrequencyTable::from_values(["x"]);
        assert_eq!(table.top_k(5), vec![("x", 1)]);
    }

    #[test]
    fn test_empty_frequency_table() {
        let table: FrequencyTable<String> = FrequencyTable::from_values(Vec::new());
        assert!(table.is_empty());
        assert!(table.top_k(5).is_empty());
        assert!(table.shares().is_empty());
    }

    #[test]
    fn test_shares() {
        let table = FrequencyTable::from_values(["F", "M", "F"]);
        let shares = table.shares();
        assert_eq!(shares[0].value, "F");
        assert_eq!(shares[0].percentage, 66.67);
        assert_eq!(shares[1].percentage, 33.33);
    }

    #[test]
    fn test_percentage_of_empty_whole() {
        assert_eq!(percentage(3, 0), 0.0);
    }
}

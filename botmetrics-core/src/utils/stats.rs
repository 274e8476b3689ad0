// Order statistics and frequency ranking shared by the statistics and
// reporting services. All functions return 0 / empty on empty input.

use std::collections::HashMap;

use botmetrics_common::models::FrequencyCount;

/// Sort ascending using IEEE total order.
pub fn sorted(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.into_iter().collect();
    v.sort_by(|a, b| a.total_cmp(b));
    v
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Middle value for odd `n`, mean of the two central values for even `n`.
/// `sorted` must be ascending.
pub fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Nearest rank on a 0-indexed ascending array: `sorted[round(p * (n - 1))]`.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// `numerator / denominator`, or 0 when the denominator is 0.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Distinct values by descending count; ties keep first-seen order.
pub fn rank_by_frequency<I, S>(items: I) -> Vec<FrequencyCount>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut ranked: Vec<FrequencyCount> = Vec::new();
    for item in items {
        let key = item.as_ref();
        match index.get(key) {
            Some(&i) => ranked[i].count += 1,
            None => {
                index.insert(key.to_string(), ranked.len());
                ranked.push(FrequencyCount { value: key.to_string(), count: 1 });
            }
        }
    }
    // sort_by is stable, so equal counts stay in first-occurrence order.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_sample_percentiles() {
        let v = sorted([3.0, 1.0, 5.0, 2.0, 4.0]);
        assert_eq!(mean(&v), 3.0);
        assert_eq!(median(&v), 3.0);
        assert_eq!(percentile(&v, 0.95), 5.0);
        assert_eq!(percentile(&v, 0.99), 5.0);
        assert_eq!(percentile(&v, 0.5), 3.0);
    }

    #[test]
    fn single_sample_everything_equal() {
        let v = [0.42];
        assert_eq!(median(&v), 0.42);
        assert_eq!(percentile(&v, 0.95), 0.42);
        assert_eq!(percentile(&v, 0.99), 0.42);
    }

    #[test]
    fn even_median_averages() {
        assert_eq!(median(&[5.0, 10.0]), 7.5);
        assert_eq!(median(&[5.0, 10.0, 15.0]), 10.0);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(median(&[]), 0.0);
        assert_eq!(percentile(&[], 0.99), 0.0);
        assert_eq!(ratio(3.0, 0.0), 0.0);
    }

    #[test]
    fn frequency_ties_keep_first_occurrence() {
        let ranked = rank_by_frequency(["timeout", "rate limit", "bad gateway", "rate limit", "timeout", "oom"]);
        let order: Vec<_> = ranked.iter().map(|f| (f.value.as_str(), f.count)).collect();
        assert_eq!(
            order,
            vec![("timeout", 2), ("rate limit", 2), ("bad gateway", 1), ("oom", 1)]
        );
    }
}

//! Bucketed reduction
//!
//! Generic building blocks for the metric catalog: keyed sums and counts
//! over ordered maps, nearest-rank percentiles, guarded ratios, fixed
//! rounding, and full-range enumeration for hour-of-day / day-of-week
//! series. `BTreeMap` keeps every series deterministically ordered.

use std::collections::BTreeMap;

/// Single-decimal rounding, used by hour and percentage series.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Two-decimal rounding, used by daily and heatmap series.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn sum_by<T, K, I, KF, VF>(items: I, mut key: KF, mut value: VF) -> BTreeMap<K, f64>
where
    K: Ord,
    I: IntoIterator<Item = T>,
    KF: FnMut(&T) -> K,
    VF: FnMut(&T) -> f64,
{
    let mut out = BTreeMap::new();
    for item in items {
        *out.entry(key(&item)).or_insert(0.0) += value(&item);
    }
    out
}

pub fn count_by<T, K, I, KF>(items: I, mut key: KF) -> BTreeMap<K, u64>
where
    K: Ord,
    I: IntoIterator<Item = T>,
    KF: FnMut(&T) -> K,
{
    let mut out = BTreeMap::new();
    for item in items {
        *out.entry(key(&item)).or_insert(0u64) += 1;
    }
    out
}

pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let mut sum = 0.0;
    let mut n = 0u64;
    for v in values {
        sum += v;
        n += 1;
    }
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Nearest-rank percentile over a copy of `values`. Empty input yields 0.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Percentage of one count over another, denominator floored to 1 so a
/// true 0-over-0 reports 0 rather than a division fault.
pub fn pct_of_counts(numerator: u64, denominator: u64) -> f64 {
    numerator as f64 / denominator.max(1) as f64 * 100.0
}

/// Percentage over a fractional denominator (hours). A non-positive
/// denominator reports 0; flooring fractional hours to 1 would skew
/// small populations instead of guarding them.
pub fn pct_of(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

/// Top `n` map entries by descending value; ties break on ascending key
/// so output order is reproducible run to run.
pub fn top_n<K, V>(map: &BTreeMap<K, V>, n: usize) -> Vec<(K, V)>
where
    K: Ord + Clone,
    V: PartialOrd + Copy,
{
    let mut entries: Vec<(K, V)> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    entries.truncate(n);
    entries
}

/// Fully enumerated 24-bucket hour series; absent hours report the default.
pub fn hour_series<V: Copy + Default>(map: &BTreeMap<u32, V>) -> Vec<(u32, V)> {
    (0..24).map(|h| (h, map.get(&h).copied().unwrap_or_default())).collect()
}

/// Fully enumerated Mon..Sun series; absent days report the default.
pub fn weekday_series<V: Copy + Default>(map: &BTreeMap<usize, V>) -> Vec<(usize, V)> {
    (0..7).map(|d| (d, map.get(&d).copied().unwrap_or_default())).collect()
}

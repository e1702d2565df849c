//! Small descriptive statistics used by the analytics reports.
//!
//! All functions return 0.0 for empty input.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median; the two middle values are averaged for an even count.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - avg;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Nearest-rank quantile: the value at index `floor(n * coverage - ε)` of the
/// ascending sort, clamped to the valid index range.
pub fn cover_value(values: &[f64], coverage: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let last = sorted.len() - 1;
    let rank = (sorted.len() as f64 * coverage - f64::MIN_POSITIVE).floor();
    let index = if rank <= 0.0 {
        0
    } else {
        (rank as usize).min(last)
    };
    sorted[index]
}

/// Mean of the non-zero members, 0.0 if all are zero.
pub(crate) fn mean_non_zero(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| **v != 0.0)
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Minimum of the non-zero members, 0.0 if all are zero.
pub(crate) fn min_non_zero(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| *v != 0.0)
        .reduce(f64::min)
        .unwrap_or(0.0)
}

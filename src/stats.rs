//! Coverage and event arithmetic for alternative-splicing comparisons.
//!
//! Pure helpers over per-transcript read counts: event filtering,
//! contingency-table preparation, effect sizes, positional percentiles and
//! profile smoothing. Statistical hypothesis tests themselves (chi²/Fisher)
//! are delegated to external statistical code and not implemented here.

use serde::{Deserialize, Serialize};

/// An alternative-splicing event: transcript indices supporting the primary
/// path and the alternative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpliceEvent {
    pub primary: Vec<usize>,
    pub alternative: Vec<usize>,
}

/// Check whether an event has enough read support to be worth testing.
///
/// `coverage` holds read counts per transcript. The event passes when the
/// total coverage over both paths reaches `min_total` and the weaker path
/// holds at least `min_alt_fraction` of it.
pub fn filter_event(
    coverage: &[u64],
    event: &SpliceEvent,
    min_total: u64,
    min_alt_fraction: f64,
) -> bool {
    let pri_cov: u64 = event.primary.iter().map(|&i| coverage[i]).sum();
    let alt_cov: u64 = event.alternative.iter().map(|&i| coverage[i]).sum();
    let tot_cov = pri_cov + alt_cov;

    if tot_cov < min_total {
        return false;
    }

    let frac = pri_cov.min(alt_cov) as f64 / tot_cov as f64;
    frac >= min_alt_fraction
}

/// Prepare the read-count and transcript-id contingency tables for two
/// events.
///
/// Cell `[n][m]` covers the transcripts supporting path `m` of `event_a`
/// and path `n` of `event_b` (0 = primary, 1 = alternative); ids are listed
/// by descending coverage.
pub fn prepare_contingency_table(
    event_a: &SpliceEvent,
    event_b: &SpliceEvent,
    coverage: &[u64],
) -> ([[u64; 2]; 2], [[Vec<usize>; 2]; 2]) {
    let mut con_tab = [[0u64; 2]; 2];
    let mut id_tab: [[Vec<usize>; 2]; 2] = Default::default();

    let paths_a = [&event_a.primary, &event_a.alternative];
    let paths_b = [&event_b.primary, &event_b.alternative];

    for (m, a) in paths_a.iter().enumerate() {
        for (n, b) in paths_b.iter().enumerate() {
            let mut ids: Vec<usize> = a.iter().filter(|i| b.contains(i)).copied().collect();
            ids.sort_unstable();
            ids.dedup();
            ids.sort_by_key(|&i| (std::cmp::Reverse(coverage[i]), i));
            con_tab[n][m] = ids.iter().map(|&i| coverage[i]).sum();
            id_tab[n][m] = ids;
        }
    }
    (con_tab, id_tab)
}

/// Log2 odds ratio of a 2x2 contingency table, with zero cells replaced by
/// 1e-9 to keep the ratio finite.
pub fn corrected_log2_odds(con_tab: &[[u64; 2]; 2]) -> f64 {
    let cell = |n: usize, m: usize| {
        if con_tab[n][m] == 0 {
            1e-9
        } else {
            con_tab[n][m] as f64
        }
    };
    (cell(0, 0) * cell(1, 1)).log2() - (cell(0, 1) * cell(1, 0)).log2()
}

/// Delta conditional PSI of a coordinated event, in both directions:
/// `(PSI(B | altA) - PSI(B), PSI(A | altB) - PSI(A))`.
pub fn dc_psi(con_tab: &[[u64; 2]; 2]) -> (f64, f64) {
    let c = |n: usize, m: usize| con_tab[n][m] as f64;
    let total = c(0, 0) + c(0, 1) + c(1, 0) + c(1, 1);
    let dc_psi_ab = c(1, 1) / (c(0, 1) + c(1, 1)) - (c(1, 0) + c(1, 1)) / total;
    let dc_psi_ba = c(1, 1) / (c(1, 0) + c(1, 1)) - (c(0, 1) + c(1, 1)) / total;
    (dc_psi_ab, dc_psi_ba)
}

/// Error from [`coverage_quantiles`] when a requested percentile cannot be
/// reached.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileError {
    pub percentile: f64,
}

impl std::fmt::Display for QuantileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot find {} percentile of positions", self.percentile)
    }
}

impl std::error::Error for QuantileError {}

/// Weighted positional percentiles.
///
/// `pos` holds (position, coverage) pairs; `percentiles` must be ascending
/// and within [0, 1]. Returns the position at which the cumulative coverage
/// reaches each percentile of the total.
pub fn coverage_quantiles(
    pos: &[(u32, u64)],
    percentiles: &[f64],
) -> Result<Vec<u32>, QuantileError> {
    if percentiles.is_empty() {
        return Ok(Vec::new());
    }
    let total: u64 = pos.iter().map(|&(_, cov)| cov).sum();

    let mut sorted: Vec<(u32, u64)> = pos.to_vec();
    sorted.sort_by_key(|&(p, _)| p);

    let mut result = Vec::with_capacity(percentiles.len());
    let mut n: u64 = 0;
    for (p, cov) in sorted {
        n += cov;
        while n as f64 >= total as f64 * percentiles[result.len()] {
            result.push(p);
            if result.len() == percentiles.len() {
                return Ok(result);
            }
        }
    }
    Err(QuantileError {
        percentile: percentiles[result.len()],
    })
}

/// Smooth a coverage profile with a normalized Hann window.
///
/// The input is mirror-padded on both ends so the output has the same
/// length. Inputs shorter than the window are returned unchanged.
pub fn smooth(x: &[f64], window_len: usize) -> Vec<f64> {
    if window_len < 3 || x.len() < window_len {
        return x.to_vec();
    }

    // padding with mirrored ends
    let mut s: Vec<f64> = Vec::with_capacity(x.len() + 2 * (window_len - 1));
    for k in (1..window_len).rev() {
        s.push(x[k]);
    }
    s.extend_from_slice(x);
    for k in ((x.len() - window_len)..(x.len() - 1)).rev() {
        s.push(x[k]);
    }

    let mut w: Vec<f64> = (0..window_len)
        .map(|k| {
            0.5 - 0.5 * (2.0 * std::f64::consts::PI * k as f64 / (window_len - 1) as f64).cos()
        })
        .collect();
    let w_sum: f64 = w.iter().sum();
    for v in &mut w {
        *v /= w_sum;
    }

    // the window is symmetric, so convolution equals correlation
    let valid = s.len() - window_len + 1;
    let y: Vec<f64> = (0..valid)
        .map(|i| w.iter().zip(&s[i..i + window_len]).map(|(a, b)| a * b).sum())
        .collect();

    let start = window_len / 2 - (window_len + 1) % 2;
    let end = y.len() - window_len / 2;
    y[start..end].to_vec()
}

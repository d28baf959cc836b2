//! Nearest-rank percentile estimation.
//!
//! The histogram engines report percentiles as actual observed (or bucket
//! anchor) values at a rounded rank, never interpolated between two ranks.
//! Downstream reports depend on these exact values, so the rounding here
//! must not change: `index = round(p * n)` (half away from zero), clamped
//! to `[0, n - 1]`.

/// Index of the nearest-rank percentile `p` in a sorted slice of length `n`.
///
/// # Panics
///
/// Panics if `n` is zero.
#[inline]
pub fn nearest_rank_index(p: f64, n: usize) -> usize {
    assert!(n > 0, "Cannot compute rank of empty slice");
    let i = (p * n as f64).round();
    if i < 0.0 {
        0
    } else {
        (i as usize).min(n - 1)
    }
}

/// Nearest-rank percentile of ascending `sorted` data.
///
/// # Panics
///
/// Panics if `sorted` is empty.
#[inline]
pub fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    sorted[nearest_rank_index(p, sorted.len())]
}

/// Nearest-rank percentiles for each entry of `ps`.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn nearest_ranks<const N: usize>(sorted: &[f64], ps: &[f64; N]) -> [f64; N] {
    let mut out = [0.0; N];
    for (slot, &p) in out.iter_mut().zip(ps) {
        *slot = nearest_rank(sorted, p);
    }
    out
}

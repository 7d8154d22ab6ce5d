//! Weighted random selection.
//!
//! Roulette-wheel sampling over non-negative weights. Negative and
//! non-finite weights count as zero. When every weight is zero the draw
//! degrades to a uniform pick, which is logged but not an error.

use tracing::warn;

use crate::error::{MatchingError, Result};
use crate::random::RandomSource;

/// Picks an index in proportion to its weight.
///
/// # Errors
/// [`MatchingError::InvalidArgument`] if `weights` is empty.
pub fn select_weighted_index(weights: &[f64], rng: &dyn RandomSource) -> Result<usize> {
    match weights.len() {
        0 => {
            return Err(MatchingError::InvalidArgument(
                "cannot select from an empty candidate list".into(),
            ))
        }
        1 => return Ok(0),
        _ => {}
    }

    let usable = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
    let total: f64 = weights.iter().copied().map(usable).sum();
    if total <= 0.0 || !total.is_finite() {
        warn!(
            candidates = weights.len(),
            "All candidate weights are zero, falling back to uniform selection"
        );
        return Ok(rng.next_index(weights.len()));
    }

    let r = rng.next_f64() * total;
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += usable(w);
        if cumulative > r {
            return Ok(i);
        }
    }
    // Rounding can leave r at the very top of the wheel.
    Ok(weights.len() - 1)
}

/// Picks a candidate in proportion to its weight.
///
/// # Errors
/// [`MatchingError::InvalidArgument`] if `candidates` is empty or the
/// lengths differ.
pub fn select_random_weighted<'c, T>(
    candidates: &'c [T],
    weights: &[f64],
    rng: &dyn RandomSource,
) -> Result<&'c T> {
    if candidates.len() != weights.len() {
        return Err(MatchingError::InvalidArgument(format!(
            "{} candidates but {} weights",
            candidates.len(),
            weights.len()
        )));
    }
    let index = select_weighted_index(weights, rng)?;
    Ok(&candidates[index])
}

//! Pair selection for the next head-to-head.
//!
//! The selector balances exposure against closeness:
//!
//! 1. With probability `explore_probability` it returns a uniformly random
//!    distinct pair (explore).
//! 2. Otherwise it picks a random anchor and looks for a partner whose
//!    rating lies strictly inside `anchor ± tolerance` (close match).
//! 3. If the window is empty it falls back to a random pair. This is the
//!    normal outcome in small or sparse pools.
//!
//! All randomness goes through [`RandomSource`] so tests can script the
//! exact branch taken.

use std::fmt;

use rand::Rng;
use rand::rngs::ThreadRng;
use serde::Serialize;
use utoipa::ToSchema;

use super::RatedEntry;
use crate::error::EngineError;

/// Source of the selector's random decisions.
pub trait RandomSource {
    /// Returns a value uniformly distributed in `[0, 1)`.
    fn chance(&mut self) -> f64;

    /// Returns an index uniformly distributed in `0..len`. `len` is never 0.
    fn index(&mut self, len: usize) -> usize;
}

/// Adapter exposing any [`rand::Rng`] as a [`RandomSource`].
pub struct RngSource<R>(R);

impl<R> RngSource<R> {
    /// Wraps a random number generator.
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngSource<ThreadRng> {
    /// Uses the thread-local generator.
    #[must_use]
    pub fn thread() -> Self {
        Self(rand::rng())
    }
}

impl<R> fmt::Debug for RngSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RngSource").finish_non_exhaustive()
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn chance(&mut self) -> f64 {
        self.0.random::<f64>()
    }

    fn index(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }
}

/// Which branch produced a pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Unconstrained random pair chosen on purpose.
    Explore,
    /// Partner found inside the tolerance window.
    Close,
    /// No partner in the window; random pair instead.
    Fallback,
}

/// Two distinct entries to present next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matchup {
    /// First entry (the anchor, for close matches).
    pub first: RatedEntry,
    /// Second entry.
    pub second: RatedEntry,
    /// Branch that produced the pair.
    pub kind: MatchKind,
}

/// Stateless pair selector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matchmaker {
    /// Probability of skipping the close-match search.
    pub explore_probability: f64,
    /// Half-width of the close-match window, exclusive.
    pub tolerance: i32,
}

impl Default for Matchmaker {
    fn default() -> Self {
        Self {
            explore_probability: 0.1,
            tolerance: 20,
        }
    }
}

impl Matchmaker {
    /// Selects two distinct entries from `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InsufficientEntries`] when the pool holds
    /// fewer than two entries.
    pub fn select_pair<R: RandomSource + ?Sized>(
        &self,
        pool: &[RatedEntry],
        rng: &mut R,
    ) -> Result<Matchup, EngineError> {
        if pool.len() < 2 {
            return Err(EngineError::InsufficientEntries(pool.len()));
        }

        if rng.chance() < self.explore_probability {
            return random_pair(pool, rng, MatchKind::Explore);
        }

        let anchor_idx = rng.index(pool.len());
        let anchor = entry_at(pool, anchor_idx)?;
        let tolerance = i64::from(self.tolerance);

        let candidates: Vec<usize> = pool
            .iter()
            .enumerate()
            .filter(|(i, e)| {
                *i != anchor_idx
                    && (i64::from(e.rating) - i64::from(anchor.rating)).abs() < tolerance
            })
            .map(|(i, _)| i)
            .collect();

        if candidates.is_empty() {
            tracing::debug!(
                anchor = %anchor.id,
                rating = anchor.rating,
                "no close match, falling back to random pair"
            );
            return random_pair(pool, rng, MatchKind::Fallback);
        }

        let pick = rng.index(candidates.len());
        let partner_idx = candidates
            .get(pick)
            .copied()
            .ok_or_else(|| EngineError::Internal(format!("random index {pick} out of range")))?;

        Ok(Matchup {
            first: anchor.clone(),
            second: entry_at(pool, partner_idx)?.clone(),
            kind: MatchKind::Close,
        })
    }
}

fn entry_at(pool: &[RatedEntry], idx: usize) -> Result<&RatedEntry, EngineError> {
    pool.get(idx)
        .ok_or_else(|| EngineError::Internal(format!("random index {idx} out of range")))
}

/// Draws two distinct indices uniformly.
fn random_pair<R: RandomSource + ?Sized>(
    pool: &[RatedEntry],
    rng: &mut R,
    kind: MatchKind,
) -> Result<Matchup, EngineError> {
    let first = rng.index(pool.len());
    let mut second = rng.index(pool.len() - 1);
    if second >= first {
        second += 1;
    }

    Ok(Matchup {
        first: entry_at(pool, first)?.clone(),
        second: entry_at(pool, second)?.clone(),
        kind,
    })
}

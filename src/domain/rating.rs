//! Elo rating engine.
//!
//! Pure computation: no storage, no clock, no randomness. The vote
//! coordinator feeds it freshly locked ledger rows and writes back what it
//! returns.
//!
//! The K-factor is chosen from the *winner's* pre-vote state only and is
//! applied to both sides:
//!
//! | Winner state                         | K  |
//! |--------------------------------------|----|
//! | `wins + losses <= 4`                 | 32 |
//! | otherwise, `rating >= 1600`          | 10 |
//! | otherwise                            | 16 |

use serde::Serialize;

use super::LedgerRow;

/// Elo scale: a 400 point gap means 10:1 expected odds.
const ELO_SCALE: f64 = 400.0;

/// Expected score of a player rated `rating` against `opponent`.
#[must_use]
pub fn expected_score(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - rating) / ELO_SCALE))
}

/// Rounds half-up, so `-16.5` becomes `-16` and `16.5` becomes `17`.
fn round_half_up(value: f64) -> i32 {
    #[allow(clippy::cast_possible_truncation)]
    let rounded = (value + 0.5).floor() as i32;
    rounded
}

/// K-factor policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EloPolicy {
    /// Winners with at most this many games get `provisional_k`.
    pub provisional_games: u32,
    /// K for winners still in their provisional period.
    pub provisional_k: i32,
    /// Winners rated at or above this get `high_rating_k`.
    pub high_rating_threshold: i32,
    /// K for established high-rated winners.
    pub high_rating_k: i32,
    /// K for everyone else.
    pub default_k: i32,
}

impl Default for EloPolicy {
    fn default() -> Self {
        Self {
            provisional_games: 4,
            provisional_k: 32,
            high_rating_threshold: 1600,
            high_rating_k: 10,
            default_k: 16,
        }
    }
}

/// New ratings for both sides of a decided vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RatingUpdate {
    /// Winner's rating after the vote.
    pub winner: i32,
    /// Loser's rating after the vote.
    pub loser: i32,
    /// K-factor that was applied to both sides.
    pub k_factor: i32,
}

impl EloPolicy {
    /// Selects K from the winner's pre-vote rating and games played.
    #[must_use]
    pub const fn k_factor(&self, winner_rating: i32, winner_games: u32) -> i32 {
        if winner_games <= self.provisional_games {
            self.provisional_k
        } else if winner_rating >= self.high_rating_threshold {
            self.high_rating_k
        } else {
            self.default_k
        }
    }

    /// Computes both post-vote ratings.
    #[must_use]
    pub fn update(&self, winner_rating: i32, loser_rating: i32, winner_games: u32) -> RatingUpdate {
        let k = self.k_factor(winner_rating, winner_games);
        let kf = f64::from(k);
        let (w, l) = (f64::from(winner_rating), f64::from(loser_rating));

        let winner_delta = round_half_up(kf * (1.0 - expected_score(w, l)));
        let loser_delta = round_half_up(kf * (0.0 - expected_score(l, w)));

        RatingUpdate {
            winner: winner_rating.saturating_add(winner_delta),
            loser: loser_rating.saturating_add(loser_delta),
            k_factor: k,
        }
    }

    /// Applies a decided vote to the two ledger rows, returning the rows as
    /// they must be written back.
    #[must_use]
    pub fn apply(&self, winner: &LedgerRow, loser: &LedgerRow) -> (LedgerRow, LedgerRow, i32) {
        let update = self.update(winner.rating, loser.rating, winner.games_played());

        let mut new_winner = winner.clone();
        new_winner.rating = update.winner;
        new_winner.wins = new_winner.wins.saturating_add(1);

        let mut new_loser = loser.clone();
        new_loser.rating = update.loser;
        new_loser.losses = new_loser.losses.saturating_add(1);

        (new_winner, new_loser, update.k_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntryId, Season};

    fn row(id: &str, wins: u32, losses: u32, rating: i32) -> LedgerRow {
        LedgerRow {
            entry_id: EntryId::new(id),
            season: Season::FIRST,
            wins,
            losses,
            rating,
        }
    }

    #[test]
    fn expected_scores_are_complementary() {
        for (a, b) in [(1500.0, 1500.0), (1200.0, 1800.0), (2400.0, 900.0), (-50.0, 10.0)] {
            let sum = expected_score(a, b) + expected_score(b, a);
            assert!((sum - 1.0).abs() < 1e-12, "{a} vs {b} summed to {sum}");
        }
    }

    #[test]
    fn equal_ratings_favor_the_outcome() {
        let update = EloPolicy::default().update(1700, 1700, 20);
        assert!(update.winner > 1700);
        assert!(update.loser < 1700);
    }

    #[test]
    fn provisional_winner_uses_k32_regardless_of_rating() {
        let policy = EloPolicy::default();
        assert_eq!(policy.k_factor(1500, 3), 32);
        assert_eq!(policy.k_factor(2200, 3), 32);
        assert_eq!(policy.k_factor(1650, 4), 32);
    }

    #[test]
    fn established_high_rated_winner_uses_k10() {
        assert_eq!(EloPolicy::default().k_factor(1650, 10), 10);
        assert_eq!(EloPolicy::default().k_factor(1600, 5), 10);
    }

    #[test]
    fn established_winner_defaults_to_k16() {
        assert_eq!(EloPolicy::default().k_factor(1500, 10), 16);
        assert_eq!(EloPolicy::default().k_factor(1599, 5), 16);
    }

    #[test]
    fn first_vote_between_fresh_entries() {
        let update = EloPolicy::default().update(1500, 1500, 0);
        assert_eq!(
            update,
            RatingUpdate {
                winner: 1516,
                loser: 1484,
                k_factor: 32,
            }
        );
    }

    #[test]
    fn upset_moves_more_than_expected_win() {
        let policy = EloPolicy::default();
        let upset = policy.update(1400, 1600, 10);
        let expected = policy.update(1600, 1400, 10);
        assert!(upset.winner - 1400 > expected.winner - 1600);
    }

    #[test]
    fn ratings_are_not_clamped_at_zero() {
        let update = EloPolicy::default().update(5, 5, 0);
        assert_eq!(update.loser, -11);
    }

    #[test]
    fn apply_increments_exactly_one_counter_per_side() {
        let winner = row("w", 6, 4, 1610);
        let loser = row("l", 2, 2, 1590);
        let (w, l, k) = EloPolicy::default().apply(&winner, &loser);
        assert_eq!(k, 10);
        assert_eq!((w.wins, w.losses), (7, 4));
        assert_eq!((l.wins, l.losses), (2, 3));
        assert!(w.rating > winner.rating);
        assert!(l.rating < loser.rating);
    }
}

//! Domain layer: entries, seasons, the rating engine and the pair selector.
//!
//! Nothing in here touches storage. The rating engine and the matchmaker
//! are pure and synchronous; the service layer feeds them rows read from a
//! [`crate::persistence::LedgerStore`].

pub mod aggregate;
pub mod entry;
pub mod entry_id;
pub mod matchmaking;
pub mod rating;
pub mod rollover;
pub mod vote;

pub use aggregate::{AuthorAggregate, PoolStats, SeasonSummary};
pub use entry::{BASELINE_RATING, InsertReport, LedgerRow, NewEntry, RatedEntry};
pub use entry_id::{EntryId, Season};
pub use matchmaking::{MatchKind, Matchmaker, Matchup, RandomSource, RngSource};
pub use rating::{EloPolicy, RatingUpdate};
pub use rollover::RolloverPolicy;
pub use vote::{StoredVoteAudit, VoteAudit, VoteOutcome, VoteSide};

//! Entry listing and pairing DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{AuthorAggregate, MatchKind, Matchup, RatedEntry, Season};

/// Response body for `GET /pair`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PairResponse {
    /// First entry to present.
    pub entry_a: RatedEntry,
    /// Second entry to present.
    pub entry_b: RatedEntry,
    /// Which selection branch produced the pair.
    pub kind: MatchKind,
}

impl From<Matchup> for PairResponse {
    fn from(matchup: Matchup) -> Self {
        Self {
            entry_a: matchup.first,
            entry_b: matchup.second,
            kind: matchup.kind,
        }
    }
}

/// Response body for `GET /leaderboard` and `GET /entries`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EntryListResponse {
    /// Season the list belongs to.
    pub season: Season,
    /// Entries by rating descending, then id ascending.
    pub entries: Vec<RatedEntry>,
}

/// Response body for `GET /authors`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorListResponse {
    /// Season the aggregates belong to.
    pub season: Season,
    /// Authors by win ratio descending, then name ascending.
    pub authors: Vec<AuthorAggregate>,
}

//! Type-safe entry and season identifiers.
//!
//! [`EntryId`] wraps the identifier assigned by the content source (chat
//! message snowflakes, in practice) so that entry ids cannot be confused
//! with author names or content strings. [`Season`] wraps the epoch number.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stable identifier of a rateable entry.
///
/// Assigned once by the ingestion source and never reused. Ordering is
/// lexicographic on the underlying string, which is the tie-break order
/// used by the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Creates an `EntryId` from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<EntryId> for String {
    fn from(id: EntryId) -> Self {
        id.0
    }
}

/// A competitive epoch. Seasons only move forward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct Season(i32);

impl Season {
    /// The first season a fresh store starts in.
    pub const FIRST: Self = Self(1);

    /// Creates a `Season` from its number.
    #[must_use]
    pub const fn new(number: i32) -> Self {
        Self(number)
    }

    /// Returns the season number.
    #[must_use]
    pub const fn number(self) -> i32 {
        self.0
    }

    /// Returns the season before this one, or `None` for the first season.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        if self.0 > Self::FIRST.0 {
            Some(Self(self.0 - 1))
        } else {
            None
        }
    }
}

impl Default for Season {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn entry_ids_order_lexicographically() {
        let a = EntryId::new("100");
        let b = EntryId::new("99");
        assert!(a < b);
    }

    #[test]
    fn entry_id_serializes_as_plain_string() {
        let id = EntryId::new("6123456789");
        let Ok(json) = serde_json::to_string(&id) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "\"6123456789\"");
    }

    #[test]
    fn first_season_has_no_predecessor() {
        assert_eq!(Season::FIRST.previous(), None);
        assert_eq!(Season::new(3).previous(), Some(Season::new(2)));
    }

    #[test]
    fn season_display_is_bare_number() {
        assert_eq!(Season::new(2).to_string(), "2");
    }
}

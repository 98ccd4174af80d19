//! Vote request DTO.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::EntryId;

/// Request body for `POST /votes`.
///
/// Only identities travel in; ratings are always re-read by the server.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct VoteRequest {
    /// Entry the voter preferred.
    pub winner_id: EntryId,
    /// Entry the voter passed over.
    pub loser_id: EntryId,
}

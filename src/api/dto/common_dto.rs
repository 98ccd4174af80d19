//! Shared DTO types used across multiple endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::EngineError;

/// Largest `limit` a list endpoint honours.
pub const MAX_LIMIT: u32 = 1000;

/// Optional `?limit=` query parameter for list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitParams {
    /// Maximum number of items to return (1..=1000). Omit for all.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl LimitParams {
    /// Validates the limit and clamps it to [`MAX_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] for `limit=0`.
    pub fn resolved(self) -> Result<Option<u32>, EngineError> {
        match self.limit {
            Some(0) => Err(EngineError::InvalidRequest(
                "limit must be positive".to_string(),
            )),
            Some(limit) => Ok(Some(limit.min(MAX_LIMIT))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limit_is_rejected() {
        let params = LimitParams { limit: Some(0) };
        assert!(matches!(
            params.resolved(),
            Err(EngineError::InvalidRequest(_))
        ));
    }

    #[test]
    fn large_limit_is_clamped() {
        let params = LimitParams {
            limit: Some(50_000),
        };
        assert_eq!(params.resolved().ok(), Some(Some(MAX_LIMIT)));
        assert_eq!(LimitParams::default().resolved().ok(), Some(None));
    }
}

use thiserror::Error;

/// Failure modes of the favorites core.
///
/// `Unauthorized` and `Validation` are rejected before any write attempt.
/// `CapacityExceeded` is checked client-side as a UX hint and server-side
/// authoritatively; the server-side check always wins.
#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("not authenticated as the requested scout")]
    Unauthorized,

    #[error("invalid identifier: {0}")]
    Validation(String),

    #[error("exclusive cap of {cap} reached for this tournament")]
    CapacityExceeded { cap: usize },

    #[error("no favorite record for player {player_id}")]
    NotFound { player_id: i64 },

    /// A reorder batch applied some but not all of its updates. Reported
    /// distinctly from total failure so the caller can prompt a refresh
    /// instead of trusting a possibly-inconsistent order.
    #[error("reorder batch partially applied: {applied} of {total} updates")]
    ReorderPartial { applied: usize, total: usize },

    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl From<anyhow::Error> for FavoritesError {
    fn from(err: anyhow::Error) -> Self {
        FavoritesError::Persistence(format!("{err:#}"))
    }
}

pub fn validate_id(name: &str, value: i64) -> Result<(), FavoritesError> {
    if value <= 0 {
        return Err(FavoritesError::Validation(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(())
}

use axum::http::HeaderMap;

use crate::database::{self, DbConn};
use crate::errors::FavoritesError;

/// Authenticated scout identity. The reconciliation layer trusts this as
/// the write scope for all favorite operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoutIdentity {
    pub scout_id: i64,
}

impl ScoutIdentity {
    pub fn new(scout_id: i64) -> Self {
        Self { scout_id }
    }

    /// A caller may only write favorites owned by their own scout id.
    pub fn authorize(&self, scout_id: i64) -> Result<(), FavoritesError> {
        if self.scout_id != scout_id {
            return Err(FavoritesError::Unauthorized);
        }
        Ok(())
    }
}

/// Resolves `Authorization: Bearer <token>` against the scouts table.
pub fn resolve_identity(
    conn: &mut DbConn,
    headers: &HeaderMap,
) -> Result<ScoutIdentity, FavoritesError> {
    let token = bearer_token(headers).ok_or(FavoritesError::Unauthorized)?;

    let scout = database::scouts::find_by_token(conn, token)
        .map_err(FavoritesError::from)?
        .ok_or(FavoritesError::Unauthorized)?;

    Ok(ScoutIdentity::new(scout.id))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }

    #[test]
    fn test_missing_or_malformed_header_yields_none() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "Basic abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        let mut empty = HeaderMap::new();
        empty.insert("Authorization", "Bearer ".parse().unwrap());
        assert_eq!(bearer_token(&empty), None);
    }

    #[test]
    fn test_authorize_rejects_other_scout() {
        let identity = ScoutIdentity::new(7);
        assert!(identity.authorize(7).is_ok());
        assert!(matches!(
            identity.authorize(8),
            Err(FavoritesError::Unauthorized)
        ));
    }
}

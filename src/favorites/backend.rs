use std::future::Future;

use crate::database::OrderUpdate;
use crate::errors::FavoritesError;

use super::state::FavoriteEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleFavoriteRequest {
    pub scout_id: i64,
    pub player_id: i64,
    pub tournament_id: i64,
    /// True to favorite, false to remove the record entirely.
    pub favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleExclusiveRequest {
    pub scout_id: i64,
    pub player_id: i64,
    pub tournament_id: i64,
    pub exclusive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderRequest {
    pub scout_id: i64,
    pub tournament_id: i64,
    pub updates: Vec<OrderUpdate>,
}

/// Persistence seam between the optimistic store and the authoritative
/// reconciliation layer. Production wiring uses the reconciliation service
/// directly; tests script a mock.
pub trait FavoritesBackend: Send + Sync + 'static {
    fn toggle_favorite(
        &self,
        request: ToggleFavoriteRequest,
    ) -> impl Future<Output = Result<(), FavoritesError>> + Send;

    fn toggle_exclusive(
        &self,
        request: ToggleExclusiveRequest,
    ) -> impl Future<Output = Result<(), FavoritesError>> + Send;

    fn reorder(
        &self,
        request: ReorderRequest,
    ) -> impl Future<Output = Result<(), FavoritesError>> + Send;

    /// Authoritative snapshot of the scout's favorites, used to hydrate the
    /// store and to resynchronize after ambiguous failures.
    fn fetch(
        &self,
        scout_id: i64,
        tournament_id: i64,
    ) -> impl Future<Output = Result<Vec<FavoriteEntry>, FavoritesError>> + Send;
}

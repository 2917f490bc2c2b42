use std::sync::Arc;

use crate::auth::ScoutIdentity;
use crate::cache::{self, CacheInvalidator};
use crate::config::AppConfig;
use crate::database::{self, DbConn, DbPool, FavoriteWithPlayer, OrderUpdate, favorites};
use crate::errors::{FavoritesError, validate_id};
use crate::favorites::{
    FavoriteEntry, FavoritesBackend, ReorderRequest, ToggleExclusiveRequest, ToggleFavoriteRequest,
};

/// Authoritative server-side persistence for favorite/exclusive state.
/// The client's optimistic view must converge to what this layer commits.
pub struct ReconciliationService {
    pool: DbPool,
    cache: Arc<dyn CacheInvalidator>,
    max_exclusives: usize,
}

impl ReconciliationService {
    pub fn new(pool: DbPool, cache: Arc<dyn CacheInvalidator>, config: &AppConfig) -> Self {
        Self {
            pool,
            cache,
            max_exclusives: config.favorites.max_exclusives,
        }
    }

    /// Favorite-on inserts idempotently at the end of the list; favorite-off
    /// deletes by composite key, clearing any exclusive flag with the row.
    /// Deleting a missing row is a no-op. Deleting while exclusive is
    /// accepted as a combined operation.
    pub fn toggle_favorite(
        &self,
        identity: ScoutIdentity,
        request: &ToggleFavoriteRequest,
    ) -> Result<(), FavoritesError> {
        identity.authorize(request.scout_id)?;
        validate_key(request.scout_id, request.player_id, request.tournament_id)?;

        let mut conn = self.connection()?;
        if request.favorite {
            let order =
                favorites::next_display_order(&mut conn, request.scout_id, request.tournament_id)?;
            favorites::insert_favorite(
                &mut conn,
                request.scout_id,
                request.player_id,
                request.tournament_id,
                false,
                order,
                None,
            )?;
        } else {
            favorites::delete_favorite(
                &mut conn,
                request.scout_id,
                request.player_id,
                request.tournament_id,
            )?;
        }

        self.notify_write(request.tournament_id, request.player_id);
        Ok(())
    }

    /// Re-validates the exclusive cap server-side; the client's check is a
    /// UX hint only. Enabling with no favorite row creates one with both
    /// flags set. Disabling flips only the flag and leaves the row intact.
    pub fn toggle_exclusive(
        &self,
        identity: ScoutIdentity,
        request: &ToggleExclusiveRequest,
    ) -> Result<(), FavoritesError> {
        identity.authorize(request.scout_id)?;
        validate_key(request.scout_id, request.player_id, request.tournament_id)?;

        let mut conn = self.connection()?;
        if request.exclusive {
            self.enable_exclusive(&mut conn, request)?;
        } else {
            let updated = favorites::set_exclusive(
                &mut conn,
                request.scout_id,
                request.player_id,
                request.tournament_id,
                false,
                None,
            )?;
            if !updated {
                return Err(FavoritesError::NotFound {
                    player_id: request.player_id,
                });
            }
        }

        self.notify_write(request.tournament_id, request.player_id);
        Ok(())
    }

    fn enable_exclusive(
        &self,
        conn: &mut DbConn,
        request: &ToggleExclusiveRequest,
    ) -> Result<(), FavoritesError> {
        let existing = favorites::find_by_key(
            conn,
            request.scout_id,
            request.player_id,
            request.tournament_id,
        )?;
        if existing.as_ref().is_some_and(|f| f.is_exclusive) {
            return Ok(());
        }

        let count =
            favorites::count_exclusives(conn, request.scout_id, request.tournament_id)?;
        if count as usize >= self.max_exclusives {
            return Err(FavoritesError::CapacityExceeded {
                cap: self.max_exclusives,
            });
        }

        match existing {
            Some(_) => {
                favorites::set_exclusive(
                    conn,
                    request.scout_id,
                    request.player_id,
                    request.tournament_id,
                    true,
                    Some(count),
                )?;
            }
            None => {
                let order = favorites::next_display_order(
                    conn,
                    request.scout_id,
                    request.tournament_id,
                )?;
                favorites::insert_favorite(
                    conn,
                    request.scout_id,
                    request.player_id,
                    request.tournament_id,
                    true,
                    order,
                    Some(count),
                )?;
            }
        }
        Ok(())
    }

    /// Applies each update as an independent write scoped to rows the scout
    /// owns; rows outside that scope are silently excluded by the predicate.
    /// There is no transaction: partial failure is reported distinctly from
    /// total failure and the caller retries the whole batch.
    pub fn reorder_favorites(
        &self,
        identity: ScoutIdentity,
        scout_id: i64,
        tournament_id: i64,
        updates: &[OrderUpdate],
    ) -> Result<usize, FavoritesError> {
        identity.authorize(scout_id)?;
        validate_id("scout_id", scout_id)?;
        validate_id("tournament_id", tournament_id)?;
        for update in updates {
            validate_id("player_id", update.player_id)?;
        }

        let mut conn = self.connection()?;
        let mut applied = 0;
        let mut first_error = None;

        for update in updates {
            match favorites::apply_order_update(&mut conn, scout_id, tournament_id, update) {
                Ok(_) => applied += 1,
                Err(err) => {
                    log::warn!("Order update for player {} failed: {err:#}", update.player_id);
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        // Even a partially applied batch changed server state, so cached
        // views must be dropped before the caller is told to refresh.
        if applied > 0 {
            self.cache.revalidate(&cache::favorites_path(tournament_id));
        }

        reorder_outcome(applied, updates.len(), first_error)
    }

    /// Authoritative snapshot of a scout's favorites for the tournament.
    pub fn fetch_state(
        &self,
        identity: ScoutIdentity,
        scout_id: i64,
        tournament_id: i64,
    ) -> Result<Vec<FavoriteEntry>, FavoritesError> {
        identity.authorize(scout_id)?;
        validate_id("scout_id", scout_id)?;
        validate_id("tournament_id", tournament_id)?;

        let mut conn = self.connection()?;
        let rows = favorites::list_for_scope(&mut conn, scout_id, tournament_id)?;
        Ok(rows.into_iter().map(entry_from_row).collect())
    }

    /// Favorites joined with player display metadata, for the read path.
    pub fn list_favorites(
        &self,
        identity: ScoutIdentity,
        tournament_id: i64,
    ) -> Result<Vec<FavoriteWithPlayer>, FavoritesError> {
        validate_id("tournament_id", tournament_id)?;

        let mut conn = self.connection()?;
        favorites::list_with_players(&mut conn, identity.scout_id, tournament_id)
            .map_err(FavoritesError::from)
    }

    pub fn max_exclusives(&self) -> usize {
        self.max_exclusives
    }

    fn connection(&self) -> Result<DbConn, FavoritesError> {
        database::get_connection(&self.pool).map_err(FavoritesError::from)
    }

    fn notify_write(&self, tournament_id: i64, player_id: i64) {
        self.cache.revalidate(&cache::favorites_path(tournament_id));
        self.cache.revalidate(&cache::player_path(player_id));
    }
}

/// A batch with no failures reports how many writes ran. A batch where some
/// writes landed and some did not must be distinguishable from one where
/// nothing landed, so the caller refreshes instead of retrying blindly.
fn reorder_outcome(
    applied: usize,
    total: usize,
    first_error: Option<anyhow::Error>,
) -> Result<usize, FavoritesError> {
    match first_error {
        None => Ok(applied),
        Some(_) if applied > 0 => Err(FavoritesError::ReorderPartial { applied, total }),
        Some(err) => Err(err.into()),
    }
}

fn validate_key(scout_id: i64, player_id: i64, tournament_id: i64) -> Result<(), FavoritesError> {
    validate_id("scout_id", scout_id)?;
    validate_id("player_id", player_id)?;
    validate_id("tournament_id", tournament_id)
}

fn entry_from_row(favorite: crate::database::Favorite) -> FavoriteEntry {
    FavoriteEntry {
        player_id: favorite.player_id,
        is_exclusive: favorite.is_exclusive,
        display_order: favorite.display_order,
        favorite_display_order: favorite.favorite_display_order,
    }
}

/// In-process wiring for the favorites store. The request's scout id is the
/// authenticated identity here; remote callers go through the HTTP layer,
/// which resolves identity from the bearer token instead.
impl FavoritesBackend for Arc<ReconciliationService> {
    async fn toggle_favorite(&self, request: ToggleFavoriteRequest) -> Result<(), FavoritesError> {
        let identity = ScoutIdentity::new(request.scout_id);
        ReconciliationService::toggle_favorite(self, identity, &request)
    }

    async fn toggle_exclusive(
        &self,
        request: ToggleExclusiveRequest,
    ) -> Result<(), FavoritesError> {
        let identity = ScoutIdentity::new(request.scout_id);
        ReconciliationService::toggle_exclusive(self, identity, &request)
    }

    async fn reorder(&self, request: ReorderRequest) -> Result<(), FavoritesError> {
        let identity = ScoutIdentity::new(request.scout_id);
        ReconciliationService::reorder_favorites(
            self,
            identity,
            request.scout_id,
            request.tournament_id,
            &request.updates,
        )
        .map(|_| ())
    }

    async fn fetch(
        &self,
        scout_id: i64,
        tournament_id: i64,
    ) -> Result<Vec<FavoriteEntry>, FavoritesError> {
        let identity = ScoutIdentity::new(scout_id);
        self.fetch_state(identity, scout_id, tournament_id)
    }
}

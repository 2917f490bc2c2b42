use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use crate::api::models::{
    FavoriteItem, FavoritesResponse, ReorderBody, ReorderResponse, ToggleExclusiveBody,
    ToggleFavoriteBody,
};
use crate::auth::{self, ScoutIdentity};
use crate::database::{FavoriteWithPlayer, OrderUpdate};
use crate::favorites::{ToggleExclusiveRequest, ToggleFavoriteRequest};

use super::{AppState, FavoritesQuery, error_response};

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<ScoutIdentity, axum::response::Response> {
    let mut conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(err) => {
            return Err(error_response(crate::errors::FavoritesError::Persistence(
                format!("connection pool exhausted: {err}"),
            )));
        }
    };

    auth::resolve_identity(&mut conn, headers).map_err(error_response)
}

pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FavoritesQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let identity = match authenticate(&state, &headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let rows = match state
        .reconciliation
        .list_favorites(identity, query.tournament_id)
    {
        Ok(rows) => rows,
        Err(err) => return error_response(err),
    };

    let exclusive_count = rows.iter().filter(|r| r.favorite.is_exclusive).count();
    let items: Vec<FavoriteItem> = rows.into_iter().map(favorite_item).collect();

    Json(FavoritesResponse {
        items,
        exclusive_count,
        max_exclusives: state.reconciliation.max_exclusives(),
    })
    .into_response()
}

pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ToggleFavoriteBody>,
) -> impl IntoResponse {
    let identity = match authenticate(&state, &headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let request = ToggleFavoriteRequest {
        scout_id: body.scout_id,
        player_id: body.player_id,
        tournament_id: body.tournament_id,
        favorite: body.favorite,
    };

    match state.reconciliation.toggle_favorite(identity, &request) {
        Ok(()) => axum::http::StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn toggle_exclusive(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ToggleExclusiveBody>,
) -> impl IntoResponse {
    let identity = match authenticate(&state, &headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let request = ToggleExclusiveRequest {
        scout_id: body.scout_id,
        player_id: body.player_id,
        tournament_id: body.tournament_id,
        exclusive: body.exclusive,
    };

    match state.reconciliation.toggle_exclusive(identity, &request) {
        Ok(()) => axum::http::StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn reorder_favorites(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ReorderBody>,
) -> impl IntoResponse {
    let identity = match authenticate(&state, &headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let updates: Vec<OrderUpdate> = body
        .updates
        .into_iter()
        .map(|u| OrderUpdate {
            player_id: u.player_id,
            display_order: u.display_order,
            favorite_display_order: u.favorite_display_order,
        })
        .collect();

    match state.reconciliation.reorder_favorites(
        identity,
        body.scout_id,
        body.tournament_id,
        &updates,
    ) {
        Ok(applied) => Json(ReorderResponse { applied }).into_response(),
        Err(err) => error_response(err),
    }
}

fn favorite_item(row: FavoriteWithPlayer) -> FavoriteItem {
    FavoriteItem {
        player_id: row.favorite.player_id,
        player_name: row.player_name,
        position: row.position,
        jersey_number: row.jersey_number,
        team_name: row.team_name,
        photo_url: row.photo_url,
        is_exclusive: row.favorite.is_exclusive,
        display_order: row.favorite.display_order,
        favorite_display_order: row.favorite.favorite_display_order,
    }
}

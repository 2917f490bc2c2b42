use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use crate::api::models::PlayerResponse;
use crate::database;

use super::AppState;

pub async fn get_player_detail(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i64>,
) -> impl IntoResponse {
    let mut conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };

    let player = match database::players::find_by_id(&mut conn, player_id) {
        Ok(player) => player,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("Query Error: {}", e))
                .into_response();
        }
    };

    match player {
        Some(p) => Json(PlayerResponse {
            player_id: p.id,
            name: p.name,
            position: p.position,
            jersey_number: p.jersey_number,
            team_name: p.team_name,
            photo_url: p.photo_url,
        })
        .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

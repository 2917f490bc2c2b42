use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::api::handlers::{
    AppState,
    favorites::{list_favorites, reorder_favorites, toggle_exclusive, toggle_favorite},
    players::get_player_detail,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/favorites", get(list_favorites))
        .route("/api/favorites/toggle", post(toggle_favorite))
        .route("/api/favorites/exclusive", post(toggle_exclusive))
        .route("/api/favorites/reorder", post(reorder_favorites))
        .route("/api/player/:id", get(get_player_detail))
        .with_state(state)
}

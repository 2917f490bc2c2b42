use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use crate::api::models::ErrorBody;
use crate::database::DbPool;
use crate::errors::FavoritesError;
use crate::services::reconciliation::ReconciliationService;

pub mod favorites;
pub mod players;

pub struct AppState {
    pub pool: DbPool,
    pub reconciliation: Arc<ReconciliationService>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesQuery {
    pub tournament_id: i64,
}

/// Maps the error taxonomy to HTTP statuses. `ReorderPartial` gets its own
/// kind so the UI can prompt a refresh instead of retrying blindly.
pub fn error_response(err: FavoritesError) -> Response {
    let (status, kind) = match &err {
        FavoritesError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
        FavoritesError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
        FavoritesError::CapacityExceeded { .. } => (StatusCode::CONFLICT, "capacityExceeded"),
        FavoritesError::NotFound { .. } => (StatusCode::NOT_FOUND, "notFound"),
        FavoritesError::ReorderPartial { .. } => (StatusCode::CONFLICT, "reorderPartial"),
        FavoritesError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "persistence"),
    };

    (
        status,
        Json(ErrorBody {
            kind,
            message: err.to_string(),
        }),
    )
        .into_response()
}

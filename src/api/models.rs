use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFavoriteBody {
    pub scout_id: i64,
    pub player_id: i64,
    pub tournament_id: i64,
    pub favorite: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleExclusiveBody {
    pub scout_id: i64,
    pub player_id: i64,
    pub tournament_id: i64,
    pub exclusive: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdateBody {
    pub player_id: i64,
    pub display_order: Option<i64>,
    pub favorite_display_order: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderBody {
    pub scout_id: i64,
    pub tournament_id: i64,
    pub updates: Vec<OrderUpdateBody>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteItem {
    pub player_id: i64,
    pub player_name: String,
    pub position: Option<String>,
    pub jersey_number: Option<i64>,
    pub team_name: Option<String>,
    pub photo_url: Option<String>,
    pub is_exclusive: bool,
    pub display_order: i64,
    pub favorite_display_order: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesResponse {
    pub items: Vec<FavoriteItem>,
    pub exclusive_count: usize,
    pub max_exclusives: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderResponse {
    pub applied: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub player_id: i64,
    pub name: String,
    pub position: Option<String>,
    pub jersey_number: Option<i64>,
    pub team_name: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

use chrono::NaiveDateTime;

/// One scout's relationship to one player within one tournament. Row
/// existence means "favorited"; `is_exclusive` promotes the favorite to the
/// scout's top-3 shortlist. The two order fields are independent sequences
/// sharing this record.
#[derive(Debug, Clone)]
pub struct Favorite {
    pub id: i64,
    pub scout_id: i64,
    pub player_id: i64,
    pub tournament_id: i64,
    pub is_favorite: bool,
    pub is_exclusive: bool,
    pub display_order: i64,
    pub favorite_display_order: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct PlayerProfile {
    pub id: i64,
    pub name: String,
    pub position: Option<String>,
    pub jersey_number: Option<i64>,
    pub team_name: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct Scout {
    pub id: i64,
    pub name: String,
}

// DTO for the joined favorites read path
#[derive(Debug, Clone)]
pub struct FavoriteWithPlayer {
    pub favorite: Favorite,
    pub player_name: String,
    pub position: Option<String>,
    pub jersey_number: Option<i64>,
    pub team_name: Option<String>,
    pub photo_url: Option<String>,
}

/// One entry of a reorder batch. `None` fields are left untouched so a
/// regular-list reorder never disturbs the exclusive ordering and vice
/// versa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderUpdate {
    pub player_id: i64,
    pub display_order: Option<i64>,
    pub favorite_display_order: Option<i64>,
}

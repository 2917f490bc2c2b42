#[derive(Debug, Clone)]
pub struct FavoriteSettings {
    /// Hard cap on exclusive players per scout per tournament.
    pub max_exclusives: usize,
}

impl Default for FavoriteSettings {
    fn default() -> Self {
        Self { max_exclusives: 3 }
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub default_database_path: &'static str,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            default_database_path: "scoutdesk.db",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub favorites: FavoriteSettings,
    pub server: ServerSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

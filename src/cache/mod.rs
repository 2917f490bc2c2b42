/// Hook the reconciliation layer calls after every successful write so the
/// hosting framework can drop cached views of the affected pages.
pub trait CacheInvalidator: Send + Sync {
    fn revalidate(&self, path: &str);
}

/// Production hook: records the invalidation in the log. The actual cache
/// lives in the hosting framework, outside this process.
pub struct LogInvalidator;

impl CacheInvalidator for LogInvalidator {
    fn revalidate(&self, path: &str) {
        log::debug!("Revalidating cached path: {path}");
    }
}

pub fn favorites_path(tournament_id: i64) -> String {
    format!("/tournaments/{tournament_id}/favorites")
}

pub fn player_path(player_id: i64) -> String {
    format!("/players/{player_id}")
}

pub mod backend;
pub mod state;
pub mod store;

pub use backend::{FavoritesBackend, ReorderRequest, ToggleExclusiveRequest, ToggleFavoriteRequest};
pub use state::{FavoriteEntry, FavoritesState};
pub use store::{CommitHandle, FavoritesStore};

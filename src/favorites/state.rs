use crate::database::OrderUpdate;
use crate::errors::FavoritesError;

/// One favorite as the client sees it. Row existence means "favorited", so
/// there is no separate flag for it here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteEntry {
    pub player_id: i64,
    pub is_exclusive: bool,
    pub display_order: i64,
    pub favorite_display_order: Option<i64>,
}

/// In-memory favorites aggregate for one (scout, tournament) pair. Pure
/// state transitions only; persistence and locking live in the store.
#[derive(Debug, Clone, Default)]
pub struct FavoritesState {
    entries: Vec<FavoriteEntry>,
}

impl FavoritesState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<FavoriteEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, player_id: i64) -> Option<&FavoriteEntry> {
        self.entries.iter().find(|e| e.player_id == player_id)
    }

    pub fn contains(&self, player_id: i64) -> bool {
        self.get(player_id).is_some()
    }

    pub fn is_exclusive(&self, player_id: i64) -> bool {
        self.get(player_id).is_some_and(|e| e.is_exclusive)
    }

    pub fn exclusive_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_exclusive).count()
    }

    pub fn can_add_exclusive(&self, cap: usize) -> bool {
        self.exclusive_count() < cap
    }

    /// Appends a regular favorite at the end of the list.
    pub fn add_favorite(&mut self, player_id: i64) {
        let display_order = self.next_display_order();
        self.entries.push(FavoriteEntry {
            player_id,
            is_exclusive: false,
            display_order,
            favorite_display_order: None,
        });
    }

    /// Removes the entry entirely, exclusive flag included.
    pub fn remove_favorite(&mut self, player_id: i64) -> Option<FavoriteEntry> {
        let idx = self.entries.iter().position(|e| e.player_id == player_id)?;
        Some(self.entries.remove(idx))
    }

    /// Flips the exclusive flag. Enabling for a player that is not yet
    /// favorited inserts the entry with both flags set; enabling appends at
    /// the end of the exclusive ordering.
    pub fn set_exclusive(&mut self, player_id: i64, exclusive: bool) {
        let slot = if exclusive {
            Some(self.next_favorite_display_order())
        } else {
            None
        };

        match self.entries.iter_mut().find(|e| e.player_id == player_id) {
            Some(entry) => {
                entry.is_exclusive = exclusive;
                entry.favorite_display_order = slot;
            }
            None if exclusive => {
                let display_order = self.next_display_order();
                self.entries.push(FavoriteEntry {
                    player_id,
                    is_exclusive: true,
                    display_order,
                    favorite_display_order: slot,
                });
            }
            None => {}
        }
    }

    /// Favorites ordered by `display_order`. Stable sort, so ties fall back
    /// to insertion order instead of crashing or reshuffling.
    pub fn favorites_ordered(&self) -> Vec<&FavoriteEntry> {
        let mut ordered: Vec<&FavoriteEntry> = self.entries.iter().collect();
        ordered.sort_by_key(|e| e.display_order);
        ordered
    }

    /// Exclusive players ordered by `favorite_display_order`.
    pub fn exclusives_ordered(&self) -> Vec<&FavoriteEntry> {
        let mut ordered: Vec<&FavoriteEntry> = self
            .entries
            .iter()
            .filter(|e| e.is_exclusive)
            .collect();
        ordered.sort_by_key(|e| e.favorite_display_order);
        ordered
    }

    /// Computes the order updates a full reorder implies, covering only the
    /// records whose assignment actually changes. `regular` drives
    /// `display_order`, `exclusives` drives `favorite_display_order`; the
    /// two sequences are independent.
    pub fn plan_reorder(
        &self,
        regular: &[i64],
        exclusives: &[i64],
    ) -> Result<Vec<OrderUpdate>, FavoritesError> {
        for &player_id in regular.iter().chain(exclusives) {
            if !self.contains(player_id) {
                return Err(FavoritesError::Validation(format!(
                    "player {player_id} is not a favorite in this tournament"
                )));
            }
        }

        let mut updates: Vec<OrderUpdate> = Vec::new();

        for (position, &player_id) in regular.iter().enumerate() {
            let Some(entry) = self.get(player_id) else {
                continue;
            };
            if entry.display_order != position as i64 {
                updates.push(OrderUpdate {
                    player_id,
                    display_order: Some(position as i64),
                    favorite_display_order: None,
                });
            }
        }

        for (position, &player_id) in exclusives.iter().enumerate() {
            let Some(entry) = self.get(player_id) else {
                continue;
            };
            if entry.favorite_display_order != Some(position as i64) {
                match updates.iter_mut().find(|u| u.player_id == player_id) {
                    Some(update) => update.favorite_display_order = Some(position as i64),
                    None => updates.push(OrderUpdate {
                        player_id,
                        display_order: None,
                        favorite_display_order: Some(position as i64),
                    }),
                }
            }
        }

        Ok(updates)
    }

    /// Applies a planned reorder to local state.
    pub fn apply_reorder(&mut self, updates: &[OrderUpdate]) {
        for update in updates {
            if let Some(entry) = self
                .entries
                .iter_mut()
                .find(|e| e.player_id == update.player_id)
            {
                if let Some(order) = update.display_order {
                    entry.display_order = order;
                }
                if let Some(order) = update.favorite_display_order {
                    entry.favorite_display_order = Some(order);
                }
            }
        }
    }

    /// Pre-mutation snapshot of one entry, for rollback.
    pub fn snapshot(&self, player_id: i64) -> Option<FavoriteEntry> {
        self.get(player_id).cloned()
    }

    /// Restores one entry to a snapshot: `Some` re-inserts or overwrites,
    /// `None` removes whatever the optimistic mutation added.
    pub fn restore(&mut self, player_id: i64, snapshot: Option<FavoriteEntry>) {
        match snapshot {
            Some(entry) => {
                match self
                    .entries
                    .iter_mut()
                    .find(|e| e.player_id == player_id)
                {
                    Some(existing) => *existing = entry,
                    None => self.entries.push(entry),
                }
            }
            None => {
                self.entries.retain(|e| e.player_id != player_id);
            }
        }
    }

    /// Replaces local state wholesale with an authoritative server snapshot.
    pub fn replace_all(&mut self, entries: Vec<FavoriteEntry>) {
        self.entries = entries;
    }

    fn next_display_order(&self) -> i64 {
        self.entries
            .iter()
            .map(|e| e.display_order)
            .max()
            .map_or(0, |max| max + 1)
    }

    fn next_favorite_display_order(&self) -> i64 {
        self.entries
            .iter()
            .filter_map(|e| e.favorite_display_order)
            .max()
            .map_or(0, |max| max + 1)
    }
}

use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::errors::FavoritesError;

use super::backend::{
    FavoritesBackend, ReorderRequest, ToggleExclusiveRequest, ToggleFavoriteRequest,
};
use super::state::{FavoriteEntry, FavoritesState};

/// Outcome channel for one persistence commit. The caller may drop the
/// handle (navigating away discards the UI-facing continuation); the commit
/// itself runs in a spawned task and always completes.
pub struct CommitHandle {
    rx: oneshot::Receiver<Result<(), FavoritesError>>,
}

impl std::fmt::Debug for CommitHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CommitHandle")
    }
}

impl CommitHandle {
    fn pending() -> (oneshot::Sender<Result<(), FavoritesError>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    fn resolved(result: Result<(), FavoritesError>) -> Self {
        let (tx, handle) = Self::pending();
        let _ = tx.send(result);
        handle
    }

    pub async fn wait(self) -> Result<(), FavoritesError> {
        self.rx.await.unwrap_or_else(|_| {
            Err(FavoritesError::Persistence(
                "commit task dropped before reporting".to_string(),
            ))
        })
    }
}

enum CommitOp {
    Favorite(ToggleFavoriteRequest),
    Exclusive(ToggleExclusiveRequest),
    Reorder(ReorderRequest),
}

enum RollbackPlan {
    /// Revert one entry to its pre-mutation snapshot.
    RestoreEntry {
        player_id: i64,
        snapshot: Option<FavoriteEntry>,
    },
    /// A failed reorder batch may have partially applied server-side, so
    /// optimistic order cannot be trusted; refetch authoritative state.
    Resync,
}

struct StoreInner<B> {
    scout_id: i64,
    tournament_id: i64,
    max_exclusives: usize,
    backend: B,
    state: Mutex<FavoritesState>,
    /// Tail of the commit queue. Each commit awaits the previous one, so
    /// writes run strictly in submission order and two writes for the same
    /// (scout, player, tournament) key can never overlap.
    chain: Mutex<Option<oneshot::Receiver<()>>>,
}

/// Client-side favorites aggregate for one (scout, tournament) pair.
///
/// Mutations apply to local state synchronously; persistence runs as a
/// detached, queued commit whose failure rolls local state back and whose
/// result surfaces through a [`CommitHandle`].
pub struct FavoritesStore<B: FavoritesBackend> {
    inner: Arc<StoreInner<B>>,
}

impl<B: FavoritesBackend> Clone for FavoritesStore<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: FavoritesBackend> FavoritesStore<B> {
    pub fn new(scout_id: i64, tournament_id: i64, max_exclusives: usize, backend: B) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                scout_id,
                tournament_id,
                max_exclusives,
                backend,
                state: Mutex::new(FavoritesState::new()),
                chain: Mutex::new(None),
            }),
        }
    }

    /// Builds a store hydrated from the authoritative server snapshot.
    pub async fn hydrate(
        scout_id: i64,
        tournament_id: i64,
        max_exclusives: usize,
        backend: B,
    ) -> Result<Self, FavoritesError> {
        let store = Self::new(scout_id, tournament_id, max_exclusives, backend);
        store.resync().await?;
        Ok(store)
    }

    /// Adds the player as a regular favorite at the end of the list, or
    /// removes the record entirely (exclusive flag included) if present.
    pub fn toggle_favorite(&self, player_id: i64) -> CommitHandle {
        let (request, snapshot) = {
            let mut state = self.inner.state.lock().unwrap();
            let snapshot = state.snapshot(player_id);
            let favorite = if state.contains(player_id) {
                state.remove_favorite(player_id);
                false
            } else {
                state.add_favorite(player_id);
                true
            };
            (
                ToggleFavoriteRequest {
                    scout_id: self.inner.scout_id,
                    player_id,
                    tournament_id: self.inner.tournament_id,
                    favorite,
                },
                snapshot,
            )
        };

        self.spawn_commit(
            CommitOp::Favorite(request),
            RollbackPlan::RestoreEntry { player_id, snapshot },
        )
    }

    /// Flips the exclusive flag. Enabling past the cap is rejected locally
    /// and no request is sent; the server re-validates the cap regardless.
    pub fn toggle_exclusive(&self, player_id: i64) -> Result<CommitHandle, FavoritesError> {
        let (request, snapshot) = {
            let mut state = self.inner.state.lock().unwrap();
            let enabling = !state.is_exclusive(player_id);
            if enabling && !state.can_add_exclusive(self.inner.max_exclusives) {
                return Err(FavoritesError::CapacityExceeded {
                    cap: self.inner.max_exclusives,
                });
            }
            let snapshot = state.snapshot(player_id);
            state.set_exclusive(player_id, enabling);
            (
                ToggleExclusiveRequest {
                    scout_id: self.inner.scout_id,
                    player_id,
                    tournament_id: self.inner.tournament_id,
                    exclusive: enabling,
                },
                snapshot,
            )
        };

        Ok(self.spawn_commit(
            CommitOp::Exclusive(request),
            RollbackPlan::RestoreEntry { player_id, snapshot },
        ))
    }

    /// Applies a full reorder of the two sub-lists and persists only the
    /// changed records as one batch.
    pub fn reorder_favorites(
        &self,
        regular: &[i64],
        exclusives: &[i64],
    ) -> Result<CommitHandle, FavoritesError> {
        let request = {
            let mut state = self.inner.state.lock().unwrap();
            let updates = state.plan_reorder(regular, exclusives)?;
            if updates.is_empty() {
                return Ok(CommitHandle::resolved(Ok(())));
            }
            state.apply_reorder(&updates);
            ReorderRequest {
                scout_id: self.inner.scout_id,
                tournament_id: self.inner.tournament_id,
                updates,
            }
        };

        Ok(self.spawn_commit(CommitOp::Reorder(request), RollbackPlan::Resync))
    }

    pub fn can_add_exclusive(&self) -> bool {
        self.inner
            .state
            .lock()
            .unwrap()
            .can_add_exclusive(self.inner.max_exclusives)
    }

    pub fn is_favorite(&self, player_id: i64) -> bool {
        self.inner.state.lock().unwrap().contains(player_id)
    }

    pub fn is_exclusive(&self, player_id: i64) -> bool {
        self.inner.state.lock().unwrap().is_exclusive(player_id)
    }

    pub fn exclusive_count(&self) -> usize {
        self.inner.state.lock().unwrap().exclusive_count()
    }

    /// Favorite players ordered by `display_order`. Recomputed from the
    /// source-of-truth set on every call, never cached separately.
    pub fn favorites_ordered(&self) -> Vec<FavoriteEntry> {
        let state = self.inner.state.lock().unwrap();
        state.favorites_ordered().into_iter().cloned().collect()
    }

    /// Exclusive players ordered by `favorite_display_order`.
    pub fn exclusives_ordered(&self) -> Vec<FavoriteEntry> {
        let state = self.inner.state.lock().unwrap();
        state.exclusives_ordered().into_iter().cloned().collect()
    }

    /// Replaces local state with the authoritative server snapshot.
    pub async fn resync(&self) -> Result<(), FavoritesError> {
        let entries = self
            .inner
            .backend
            .fetch(self.inner.scout_id, self.inner.tournament_id)
            .await?;
        self.inner.state.lock().unwrap().replace_all(entries);
        Ok(())
    }

    fn spawn_commit(&self, op: CommitOp, rollback: RollbackPlan) -> CommitHandle {
        let (result_tx, handle) = CommitHandle::pending();
        let (done_tx, done_rx) = oneshot::channel();

        // Queue position is claimed synchronously, before the task runs.
        let previous = self.inner.chain.lock().unwrap().replace(done_rx);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            if let Some(previous) = previous {
                // A dropped sender means the previous commit already ended.
                let _ = previous.await;
            }

            let result = match op {
                CommitOp::Favorite(request) => inner.backend.toggle_favorite(request).await,
                CommitOp::Exclusive(request) => inner.backend.toggle_exclusive(request).await,
                CommitOp::Reorder(request) => inner.backend.reorder(request).await,
            };

            if result.is_err() {
                apply_rollback(&inner, rollback).await;
            }

            let _ = done_tx.send(());
            let _ = result_tx.send(result);
        });

        handle
    }
}

async fn apply_rollback<B: FavoritesBackend>(inner: &StoreInner<B>, rollback: RollbackPlan) {
    match rollback {
        RollbackPlan::RestoreEntry { player_id, snapshot } => {
            inner.state.lock().unwrap().restore(player_id, snapshot);
        }
        RollbackPlan::Resync => {
            match inner.backend.fetch(inner.scout_id, inner.tournament_id).await {
                Ok(entries) => inner.state.lock().unwrap().replace_all(entries),
                Err(err) => {
                    log::warn!("Resync after failed reorder batch also failed: {err}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct MockBackend {
        fail_count: AtomicUsize,
        favorite_requests: Mutex<Vec<ToggleFavoriteRequest>>,
        exclusive_requests: Mutex<Vec<ToggleExclusiveRequest>>,
        reorder_requests: Mutex<Vec<ReorderRequest>>,
        fetch_entries: Mutex<Vec<FavoriteEntry>>,
    }

    impl MockBackend {
        fn fail_next(&self, count: usize) {
            self.fail_count.store(count, Ordering::SeqCst);
        }

        fn take_failure(&self) -> Result<(), FavoritesError> {
            if self
                .fail_count
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(FavoritesError::Persistence("injected failure".to_string()));
            }
            Ok(())
        }
    }

    impl FavoritesBackend for Arc<MockBackend> {
        async fn toggle_favorite(
            &self,
            request: ToggleFavoriteRequest,
        ) -> Result<(), FavoritesError> {
            self.take_failure()?;
            self.favorite_requests.lock().unwrap().push(request);
            Ok(())
        }

        async fn toggle_exclusive(
            &self,
            request: ToggleExclusiveRequest,
        ) -> Result<(), FavoritesError> {
            self.take_failure()?;
            self.exclusive_requests.lock().unwrap().push(request);
            Ok(())
        }

        async fn reorder(&self, request: ReorderRequest) -> Result<(), FavoritesError> {
            self.take_failure()?;
            self.reorder_requests.lock().unwrap().push(request);
            Ok(())
        }

        async fn fetch(
            &self,
            _scout_id: i64,
            _tournament_id: i64,
        ) -> Result<Vec<FavoriteEntry>, FavoritesError> {
            Ok(self.fetch_entries.lock().unwrap().clone())
        }
    }

    fn test_store() -> (FavoritesStore<Arc<MockBackend>>, Arc<MockBackend>) {
        let backend = Arc::new(MockBackend::default());
        let store = FavoritesStore::new(7, 42, 3, Arc::clone(&backend));
        (store, backend)
    }

    #[tokio::test]
    async fn test_toggle_favorite_commits_and_keeps_optimistic_state() {
        let (store, backend) = test_store();

        let handle = store.toggle_favorite(1);
        assert!(store.is_favorite(1));

        handle.wait().await.unwrap();
        let requests = backend.favorite_requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].favorite);
        assert_eq!(requests[0].scout_id, 7);
        assert_eq!(requests[0].tournament_id, 42);
    }

    #[tokio::test]
    async fn test_failed_toggle_rolls_back_to_snapshot() {
        let (store, backend) = test_store();

        backend.fail_next(1);
        let handle = store.toggle_favorite(1);
        assert!(store.is_favorite(1));

        assert!(handle.wait().await.is_err());
        assert!(!store.is_favorite(1));
    }

    #[tokio::test]
    async fn test_failed_removal_restores_entry_with_its_order() {
        let (store, backend) = test_store();
        store.toggle_favorite(1).wait().await.unwrap();
        store.toggle_favorite(2).wait().await.unwrap();

        backend.fail_next(1);
        let handle = store.toggle_favorite(2);
        assert!(!store.is_favorite(2));

        assert!(handle.wait().await.is_err());
        let entry = store
            .favorites_ordered()
            .into_iter()
            .find(|e| e.player_id == 2)
            .unwrap();
        assert_eq!(entry.display_order, 1);
    }

    #[tokio::test]
    async fn test_round_trip_leaves_no_record() {
        let (store, backend) = test_store();

        store.toggle_favorite(1).wait().await.unwrap();
        store.toggle_favorite(1).wait().await.unwrap();

        assert!(!store.is_favorite(1));
        let requests = backend.favorite_requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].favorite);
        assert!(!requests[1].favorite);
    }

    #[tokio::test]
    async fn test_rapid_toggles_serialize_in_submission_order() {
        let (store, backend) = test_store();

        let first = store.toggle_favorite(1);
        let second = store.toggle_favorite(1);

        first.wait().await.unwrap();
        second.wait().await.unwrap();

        assert!(!store.is_favorite(1));
        let requests = backend.favorite_requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].favorite);
        assert!(!requests[1].favorite);
    }

    #[tokio::test]
    async fn test_fourth_exclusive_rejected_locally_without_request() {
        let (store, backend) = test_store();

        for id in 1..=4 {
            store.toggle_favorite(id).wait().await.unwrap();
        }
        for id in 1..=3 {
            store.toggle_exclusive(id).unwrap().wait().await.unwrap();
        }

        let err = store.toggle_exclusive(4).unwrap_err();
        assert!(matches!(err, FavoritesError::CapacityExceeded { cap: 3 }));
        assert_eq!(store.exclusives_ordered().len(), 3);
        assert_eq!(backend.exclusive_requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_untoggling_an_exclusive_is_always_allowed_at_cap() {
        let (store, _) = test_store();

        for id in 1..=3 {
            store.toggle_favorite(id).wait().await.unwrap();
            store.toggle_exclusive(id).unwrap().wait().await.unwrap();
        }

        assert!(!store.can_add_exclusive());
        store.toggle_exclusive(2).unwrap().wait().await.unwrap();
        assert!(store.can_add_exclusive());
        assert!(!store.is_exclusive(2));
        // The favorite record itself survives.
        assert!(store.is_favorite(2));
    }

    #[tokio::test]
    async fn test_reorder_sends_only_changed_records() {
        let (store, backend) = test_store();
        for id in [1, 2, 3] {
            store.toggle_favorite(id).wait().await.unwrap();
        }

        store
            .reorder_favorites(&[1, 3, 2], &[])
            .unwrap()
            .wait()
            .await
            .unwrap();

        let requests = backend.reorder_requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].updates.len(), 2);
        assert!(requests[0].updates.iter().all(|u| u.player_id != 1));
    }

    #[tokio::test]
    async fn test_noop_reorder_resolves_without_request() {
        let (store, backend) = test_store();
        for id in [1, 2] {
            store.toggle_favorite(id).wait().await.unwrap();
        }

        store
            .reorder_favorites(&[1, 2], &[])
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert!(backend.reorder_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_reorder_resyncs_from_authoritative_state() {
        let (store, backend) = test_store();
        for id in [1, 2, 3] {
            store.toggle_favorite(id).wait().await.unwrap();
        }

        // The server's view after the ambiguous failure.
        *backend.fetch_entries.lock().unwrap() = vec![
            FavoriteEntry {
                player_id: 1,
                is_exclusive: false,
                display_order: 0,
                favorite_display_order: None,
            },
            FavoriteEntry {
                player_id: 3,
                is_exclusive: false,
                display_order: 1,
                favorite_display_order: None,
            },
            FavoriteEntry {
                player_id: 2,
                is_exclusive: false,
                display_order: 2,
                favorite_display_order: None,
            },
        ];

        backend.fail_next(1);
        let handle = store.reorder_favorites(&[3, 2, 1], &[]).unwrap();
        assert!(handle.wait().await.is_err());

        let ordered: Vec<i64> = store
            .favorites_ordered()
            .into_iter()
            .map(|e| e.player_id)
            .collect();
        assert_eq!(ordered, vec![1, 3, 2]);
    }

    #[tokio::test]
    async fn test_hydrate_loads_server_snapshot() {
        let backend = Arc::new(MockBackend::default());
        *backend.fetch_entries.lock().unwrap() = vec![FavoriteEntry {
            player_id: 5,
            is_exclusive: true,
            display_order: 0,
            favorite_display_order: Some(0),
        }];

        let store = FavoritesStore::hydrate(7, 42, 3, Arc::clone(&backend))
            .await
            .unwrap();

        assert!(store.is_exclusive(5));
        assert_eq!(store.exclusive_count(), 1);
    }
}

//! In-memory snapshot store. Behaves like the file store (clone-in,
//! clone-out, always returns the latest persisted state) without touching
//! the filesystem; used by tests.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::Mutex;

use crate::dao::snapshot_store::SnapshotStore;
use crate::dao::storage::StorageResult;
use crate::state::game::GamesSnapshot;

/// Process-local implementation of [`SnapshotStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Arc<Mutex<GamesSnapshot>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<GamesSnapshot>> {
        let slot = self.snapshot.clone();
        Box::pin(async move { Ok(slot.lock().await.clone()) })
    }

    fn persist(&self, snapshot: GamesSnapshot) -> BoxFuture<'static, StorageResult<()>> {
        let slot = self.snapshot.clone();
        Box::pin(async move {
            *slot.lock().await = snapshot;
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

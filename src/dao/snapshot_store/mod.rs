/// Flat-file JSON backend used in production.
pub mod file;
/// In-memory backend used by tests.
pub mod memory;

use futures::future::BoxFuture;

use crate::dao::storage::StorageResult;
use crate::state::game::GamesSnapshot;

/// Abstraction over the durable home of the authoritative games snapshot.
///
/// `persist` must complete durably before returning so that a mutating call
/// never returns with the write still in flight, and `load` must always
/// return the latest persisted state so that deferred work (timer callbacks)
/// observes mutations made since it was scheduled.
pub trait SnapshotStore: Send + Sync {
    /// Reload the latest durable snapshot; empty when nothing was persisted yet.
    fn load(&self) -> BoxFuture<'static, StorageResult<GamesSnapshot>>;
    /// Atomically replace the durable snapshot.
    fn persist(&self, snapshot: GamesSnapshot) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap probe used by the health route.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

//! Persistence layer: snapshot store backends and their failure type.

/// Snapshot persistence backends and their shared trait.
pub mod snapshot_store;
/// Storage abstraction layer for persistence failures.
pub mod storage;

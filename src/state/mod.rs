//! Shared application state: the snapshot store handle, the timer hub, and
//! the critical-section gate serializing every load/mutate/persist sequence.

pub mod game;
pub mod state_machine;
pub mod timers;
pub mod transitions;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::dao::snapshot_store::SnapshotStore;
use crate::state::timers::TimerHub;

/// Cheaply clonable handle to the central application state.
pub type SharedState = Arc<AppState>;

/// Central application state shared by routes, services, and timer tasks.
pub struct AppState {
    config: AppConfig,
    store: Arc<dyn SnapshotStore>,
    timers: TimerHub,
    transition_gate: Mutex<()>,
}

impl AppState {
    /// Construct the shared state around a snapshot store.
    pub fn new(config: AppConfig, store: Arc<dyn SnapshotStore>) -> SharedState {
        Arc::new(Self {
            config,
            store,
            timers: TimerHub::new(),
            transition_gate: Mutex::new(()),
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Handle to the authoritative snapshot store.
    pub fn store(&self) -> &dyn SnapshotStore {
        self.store.as_ref()
    }

    /// Registry of pending deferred transitions.
    pub fn timers(&self) -> &TimerHub {
        &self.timers
    }

    /// Gate held across every load/mutate/persist sequence so that request
    /// handlers and timer callbacks never interleave a mutation.
    pub fn gate(&self) -> &Mutex<()> {
        &self.transition_gate
    }
}

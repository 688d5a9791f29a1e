//! Shared application state passed to every handler.

pub mod phase;
pub mod rooms;

use std::sync::Arc;

use crate::{config::AppConfig, dao::store::EventStore, state::rooms::RoomRegistry};

/// Cheaply clonable handle on the application state.
pub type SharedState = Arc<AppState>;

/// Central application state holding the store handle, the broadcast room
/// registry, and the runtime configuration. Constructed once at process
/// start and passed by reference to handlers.
pub struct AppState {
    store: Arc<dyn EventStore>,
    rooms: RoomRegistry,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be
    /// cloned cheaply.
    pub fn new(store: Arc<dyn EventStore>, config: AppConfig) -> SharedState {
        Arc::new(Self {
            store,
            rooms: RoomRegistry::new(),
            config,
        })
    }

    /// Handle to the store backend.
    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    /// Registry of live per-event broadcast rooms.
    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

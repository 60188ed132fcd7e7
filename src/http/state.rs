//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::services::{BookingService, BuildingService, RoomService};

/// Shared application state passed to all handlers.
///
/// The store handle is injected once, here; the managers each hold their
/// own reference to it.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance, kept for health checks and shutdown.
    pub repository: Arc<dyn FullRepository>,
    pub bookings: Arc<BookingService>,
    pub buildings: Arc<BuildingService>,
    pub rooms: Arc<RoomService>,
}

impl AppState {
    /// Create the application state around a repository.
    ///
    /// `serializable_writes` routes booking create/update through the
    /// store's guarded write path.
    pub fn new(repository: Arc<dyn FullRepository>, serializable_writes: bool) -> Self {
        Self {
            bookings: Arc::new(
                BookingService::new(repository.clone())
                    .with_serializable_writes(serializable_writes),
            ),
            buildings: Arc::new(BuildingService::new(repository.clone())),
            rooms: Arc::new(RoomService::new(repository.clone())),
            repository,
        }
    }
}

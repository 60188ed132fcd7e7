//! Data store module for the booking service.
//!
//! Persistence is abstracted via the Repository pattern so storage
//! backends can be swapped without touching the managers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  API Surface (axum handlers, http feature)              │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Managers (services/) - Booking / Building / Room       │
//! │  - Availability check before booking writes             │
//! │  - Input validation, allow-listed updates               │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴───────────────┐
//!     │                               │
//! ┌───▼──────────────┐   ┌────────────▼────────────┐
//! │ Postgres (Diesel)│   │ Local (in-memory)       │
//! └──────────────────┘   └─────────────────────────┘
//! ```
//!
//! # Lifecycle
//!
//! There is no process-global store handle. The factory opens the store
//! (`RepositoryFactory::from_env()` / `from_config_file()`), the resulting
//! `Arc<dyn FullRepository>` is passed into each manager, and
//! `StoreLifecycle::close()` runs on shutdown.

// Feature guard: at least one backend must be compiled in.
#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::{BookingSettings, RepositoryConfig};
#[cfg(feature = "local-repo")]
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::{PostgresConfig, PostgresRepository};
pub use repository::{
    BookingRepository, BuildingRepository, FullRepository, GuardedWrite, RepositoryError,
    RepositoryResult, RoomRepository, StoreLifecycle,
};

#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone, Default)]
pub struct PostgresConfig {
    _private: (),
}

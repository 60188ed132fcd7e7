//! Repository traits abstracting the data store.
//!
//! These traits define every query and mutation the service layer needs,
//! allowing different storage backends (Postgres via Diesel, in-memory)
//! to be swapped via dependency injection. Read operations return the
//! expanded models (`BuildingDetail`, `RoomDetail`, `BookingDetail`) so
//! related rows travel with their parent; writes only ever take the flat
//! entity structs.
//!
//! # Thread Safety
//! Implementations must be `Send + Sync` to be shared across request
//! handlers behind an `Arc`.

mod error;

pub use error::{RepositoryError, RepositoryResult};

use async_trait::async_trait;

use crate::models::{
    Booking, BookingDetail, Building, BuildingDetail, ConflictReason, Room, RoomDetail,
    RoomStatus, TimeSlot,
};

/// Outcome of a guarded (check-and-write-in-one-critical-section) booking
/// mutation.
#[derive(Debug, Clone)]
pub enum GuardedWrite {
    /// The availability rule passed and the row was written.
    Written(Booking),
    /// The rule failed; nothing was written.
    Rejected(ConflictReason),
}

/// Store lifecycle: explicit init happens in the factory, explicit
/// teardown here. No global store handle exists anywhere in this crate.
#[async_trait]
pub trait StoreLifecycle: Send + Sync {
    /// Check if the store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the store answered
    /// - `Ok(false)` if it is unhealthy without raising an error
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Release connections and flush state before shutdown.
    async fn close(&self) -> RepositoryResult<()>;
}

/// CRUD over buildings.
#[async_trait]
pub trait BuildingRepository: Send + Sync {
    /// List all buildings with their rooms and bookings included.
    async fn list_buildings(&self) -> RepositoryResult<Vec<BuildingDetail>>;

    /// Fetch one building with rooms and bookings included.
    ///
    /// # Returns
    /// `Err(RepositoryError::NotFound)` if the id does not exist.
    async fn get_building(&self, building_id: &str) -> RepositoryResult<BuildingDetail>;

    async fn insert_building(&self, building: Building) -> RepositoryResult<Building>;

    /// Replace the mutable fields of an existing building.
    ///
    /// # Returns
    /// `Err(RepositoryError::NotFound)` if the id does not exist.
    async fn update_building(&self, building: Building) -> RepositoryResult<Building>;

    /// Delete a building. Dependent rooms and bookings go with it
    /// (referential policy of the store, `ON DELETE CASCADE` on Postgres).
    async fn delete_building(&self, building_id: &str) -> RepositoryResult<()>;
}

/// CRUD over rooms, plus the lookups the availability rule needs.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// List all rooms with their building included.
    async fn list_rooms(&self) -> RepositoryResult<Vec<RoomDetail>>;

    /// Fetch one room with its building included.
    async fn get_room(&self, room_id: &str) -> RepositoryResult<RoomDetail>;

    async fn insert_room(&self, room: Room) -> RepositoryResult<Room>;

    async fn update_room(&self, room: Room) -> RepositoryResult<Room>;

    /// Set only the status of a room, leaving every other field untouched.
    async fn update_room_status(
        &self,
        room_id: &str,
        status: RoomStatus,
    ) -> RepositoryResult<Room>;

    async fn delete_room(&self, room_id: &str) -> RepositoryResult<()>;

    /// Resolve the room a building's bookings are checked against.
    ///
    /// Bookings key on the building, so "the" room is the first match by
    /// `room_id` ordering — a deterministic rendition of the
    /// one-room-per-building simplification. Extending to per-room booking
    /// keys means replacing this lookup with a room-id parameter.
    async fn first_room_in_building(&self, building_id: &str) -> RepositoryResult<Option<Room>>;
}

/// CRUD over bookings, plus the conflict query and guarded writes.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// List all bookings with their building included.
    async fn list_bookings(&self) -> RepositoryResult<Vec<BookingDetail>>;

    /// Fetch one booking with its building included.
    async fn get_booking(&self, booking_id: &str) -> RepositoryResult<BookingDetail>;

    async fn insert_booking(&self, booking: Booking) -> RepositoryResult<Booking>;

    async fn update_booking(&self, booking: Booking) -> RepositoryResult<Booking>;

    async fn delete_booking(&self, booking_id: &str) -> RepositoryResult<()>;

    /// Find any booking for `building_id` whose interval overlaps `slot`
    /// under the closed-interval test, skipping `exclude` when given.
    ///
    /// # Returns
    /// `Ok(Some(_))` with an arbitrary conflicting booking, `Ok(None)` if
    /// the slot is free.
    async fn find_conflicting_booking(
        &self,
        building_id: &str,
        slot: TimeSlot,
        exclude: Option<&str>,
    ) -> RepositoryResult<Option<Booking>>;

    /// Re-run the availability rule and insert in one store-level critical
    /// section (serializable transaction on Postgres, the writer lock in
    /// memory). Closes the check-then-write race of the default path.
    async fn insert_booking_guarded(&self, booking: Booking) -> RepositoryResult<GuardedWrite>;

    /// Guarded counterpart of [`update_booking`](Self::update_booking):
    /// the rule excludes the booking's own id.
    ///
    /// # Returns
    /// `Err(RepositoryError::NotFound)` if the row vanished.
    async fn update_booking_guarded(&self, booking: Booking) -> RepositoryResult<GuardedWrite>;
}

/// Convenience super-trait combining every repository capability.
///
/// The factory hands out `Arc<dyn FullRepository>`, which each manager
/// receives at construction.
pub trait FullRepository:
    StoreLifecycle + BuildingRepository + RoomRepository + BookingRepository
{
}

impl<T> FullRepository for T where
    T: StoreLifecycle + BuildingRepository + RoomRepository + BookingRepository
{
}

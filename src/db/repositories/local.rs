//! In-memory local repository implementation.
//!
//! Stores all rows in `HashMap`s behind a single `RwLock`, providing fast,
//! deterministic, isolated execution for unit tests and local development.
//! Referential behavior mirrors the Postgres schema: inserts check foreign
//! keys, deleting a building cascades to its rooms and bookings.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::db::repository::{
    BookingRepository, BuildingRepository, GuardedWrite, RepositoryError, RepositoryResult,
    RoomRepository, StoreLifecycle,
};
use crate::models::{
    room_eligibility, Booking, BookingDetail, Building, BuildingDetail, Room, RoomDetail,
    RoomStatus, TimeSlot,
};

/// In-memory repository.
///
/// Every trait method takes the lock independently, so the default
/// check-then-write booking path is exactly as racy as it is against a
/// real store; the guarded variants hold the writer lock across the whole
/// rule-plus-write sequence.
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

#[derive(Default)]
struct LocalData {
    buildings: HashMap<String, Building>,
    rooms: HashMap<String, Room>,
    bookings: HashMap<String, Booking>,
    unhealthy: bool,
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the health flag to simulate a lost connection in tests.
    pub fn set_healthy(&self, healthy: bool) {
        self.write().unhealthy = !healthy;
    }

    /// Drop all rows.
    pub fn clear(&self) {
        let mut data = self.write();
        data.buildings.clear();
        data.rooms.clear();
        data.bookings.clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, LocalData> {
        self.data.read().unwrap()
    }

    fn write(&self) -> RwLockWriteGuard<'_, LocalData> {
        self.data.write().unwrap()
    }
}

impl LocalData {
    fn building_detail(&self, building: &Building) -> BuildingDetail {
        let mut rooms: Vec<Room> = self
            .rooms
            .values()
            .filter(|r| r.building_id == building.building_id)
            .cloned()
            .collect();
        rooms.sort_by(|a, b| a.room_id.cmp(&b.room_id));

        let mut bookings: Vec<Booking> = self
            .bookings
            .values()
            .filter(|b| b.building_id == building.building_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| a.booking_id.cmp(&b.booking_id));

        BuildingDetail { building: building.clone(), rooms, bookings }
    }

    fn require_building(&self, building_id: &str) -> RepositoryResult<&Building> {
        self.buildings.get(building_id).ok_or_else(|| {
            RepositoryError::QueryError(format!(
                "foreign key violation: building '{}' does not exist",
                building_id
            ))
        })
    }

    fn first_room(&self, building_id: &str) -> Option<Room> {
        self.rooms
            .values()
            .filter(|r| r.building_id == building_id)
            .min_by(|a, b| a.room_id.cmp(&b.room_id))
            .cloned()
    }

    fn conflicting_booking(
        &self,
        building_id: &str,
        slot: TimeSlot,
        exclude: Option<&str>,
    ) -> Option<Booking> {
        let mut hits: Vec<&Booking> = self
            .bookings
            .values()
            .filter(|b| b.building_id == building_id)
            .filter(|b| exclude != Some(b.booking_id.as_str()))
            .filter(|b| b.slot().overlaps(&slot))
            .collect();
        hits.sort_by(|a, b| a.booking_id.cmp(&b.booking_id));
        hits.first().map(|b| (*b).clone())
    }

    /// The full availability rule, evaluated under whatever lock the
    /// caller already holds.
    fn availability_rule(
        &self,
        building_id: &str,
        slot: TimeSlot,
        exclude: Option<&str>,
    ) -> Option<crate::models::ConflictReason> {
        let room = self.first_room(building_id);
        if let Err(reason) = room_eligibility(room.as_ref()) {
            return Some(reason);
        }
        if self.conflicting_booking(building_id, slot, exclude).is_some() {
            return Some(crate::models::ConflictReason::SlotTaken);
        }
        None
    }
}

#[async_trait]
impl StoreLifecycle for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(!self.read().unhealthy)
    }

    async fn close(&self) -> RepositoryResult<()> {
        log::debug!("local repository closed");
        Ok(())
    }
}

#[async_trait]
impl BuildingRepository for LocalRepository {
    async fn list_buildings(&self) -> RepositoryResult<Vec<BuildingDetail>> {
        let data = self.read();
        let mut buildings: Vec<&Building> = data.buildings.values().collect();
        buildings.sort_by(|a, b| a.building_id.cmp(&b.building_id));
        Ok(buildings.into_iter().map(|b| data.building_detail(b)).collect())
    }

    async fn get_building(&self, building_id: &str) -> RepositoryResult<BuildingDetail> {
        let data = self.read();
        let building = data
            .buildings
            .get(building_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Building '{}'", building_id)))?;
        Ok(data.building_detail(building))
    }

    async fn insert_building(&self, building: Building) -> RepositoryResult<Building> {
        let mut data = self.write();
        if data.buildings.contains_key(&building.building_id) {
            return Err(RepositoryError::QueryError(format!(
                "duplicate key: building '{}'",
                building.building_id
            )));
        }
        data.buildings.insert(building.building_id.clone(), building.clone());
        Ok(building)
    }

    async fn update_building(&self, building: Building) -> RepositoryResult<Building> {
        let mut data = self.write();
        let slot = data
            .buildings
            .get_mut(&building.building_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Building '{}'", building.building_id)))?;
        *slot = building.clone();
        Ok(building)
    }

    async fn delete_building(&self, building_id: &str) -> RepositoryResult<()> {
        let mut data = self.write();
        if data.buildings.remove(building_id).is_none() {
            return Err(RepositoryError::NotFound(format!("Building '{}'", building_id)));
        }
        // Cascade, as the Postgres schema does.
        data.rooms.retain(|_, r| r.building_id != building_id);
        data.bookings.retain(|_, b| b.building_id != building_id);
        Ok(())
    }
}

#[async_trait]
impl RoomRepository for LocalRepository {
    async fn list_rooms(&self) -> RepositoryResult<Vec<RoomDetail>> {
        let data = self.read();
        let mut rooms: Vec<&Room> = data.rooms.values().collect();
        rooms.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        rooms
            .into_iter()
            .map(|room| {
                let building = data.require_building(&room.building_id)?.clone();
                Ok(RoomDetail { room: room.clone(), building })
            })
            .collect()
    }

    async fn get_room(&self, room_id: &str) -> RepositoryResult<RoomDetail> {
        let data = self.read();
        let room = data
            .rooms
            .get(room_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Room '{}'", room_id)))?;
        let building = data.require_building(&room.building_id)?.clone();
        Ok(RoomDetail { room: room.clone(), building })
    }

    async fn insert_room(&self, room: Room) -> RepositoryResult<Room> {
        let mut data = self.write();
        data.require_building(&room.building_id)?;
        if data.rooms.contains_key(&room.room_id) {
            return Err(RepositoryError::QueryError(format!(
                "duplicate key: room '{}'",
                room.room_id
            )));
        }
        data.rooms.insert(room.room_id.clone(), room.clone());
        Ok(room)
    }

    async fn update_room(&self, room: Room) -> RepositoryResult<Room> {
        let mut data = self.write();
        data.require_building(&room.building_id)?;
        let slot = data
            .rooms
            .get_mut(&room.room_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Room '{}'", room.room_id)))?;
        *slot = room.clone();
        Ok(room)
    }

    async fn update_room_status(
        &self,
        room_id: &str,
        status: RoomStatus,
    ) -> RepositoryResult<Room> {
        let mut data = self.write();
        let room = data
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Room '{}'", room_id)))?;
        room.room_status = status;
        Ok(room.clone())
    }

    async fn delete_room(&self, room_id: &str) -> RepositoryResult<()> {
        let mut data = self.write();
        if data.rooms.remove(room_id).is_none() {
            return Err(RepositoryError::NotFound(format!("Room '{}'", room_id)));
        }
        Ok(())
    }

    async fn first_room_in_building(&self, building_id: &str) -> RepositoryResult<Option<Room>> {
        Ok(self.read().first_room(building_id))
    }
}

#[async_trait]
impl BookingRepository for LocalRepository {
    async fn list_bookings(&self) -> RepositoryResult<Vec<BookingDetail>> {
        let data = self.read();
        let mut bookings: Vec<&Booking> = data.bookings.values().collect();
        bookings.sort_by(|a, b| a.booking_id.cmp(&b.booking_id));
        bookings
            .into_iter()
            .map(|booking| {
                let building = data.require_building(&booking.building_id)?.clone();
                Ok(BookingDetail { booking: booking.clone(), building })
            })
            .collect()
    }

    async fn get_booking(&self, booking_id: &str) -> RepositoryResult<BookingDetail> {
        let data = self.read();
        let booking = data
            .bookings
            .get(booking_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Booking '{}'", booking_id)))?;
        let building = data.require_building(&booking.building_id)?.clone();
        Ok(BookingDetail { booking: booking.clone(), building })
    }

    async fn insert_booking(&self, booking: Booking) -> RepositoryResult<Booking> {
        let mut data = self.write();
        data.require_building(&booking.building_id)?;
        if data.bookings.contains_key(&booking.booking_id) {
            return Err(RepositoryError::QueryError(format!(
                "duplicate key: booking '{}'",
                booking.booking_id
            )));
        }
        data.bookings.insert(booking.booking_id.clone(), booking.clone());
        Ok(booking)
    }

    async fn update_booking(&self, booking: Booking) -> RepositoryResult<Booking> {
        let mut data = self.write();
        data.require_building(&booking.building_id)?;
        let slot = data
            .bookings
            .get_mut(&booking.booking_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Booking '{}'", booking.booking_id)))?;
        *slot = booking.clone();
        Ok(booking)
    }

    async fn delete_booking(&self, booking_id: &str) -> RepositoryResult<()> {
        let mut data = self.write();
        if data.bookings.remove(booking_id).is_none() {
            return Err(RepositoryError::NotFound(format!("Booking '{}'", booking_id)));
        }
        Ok(())
    }

    async fn find_conflicting_booking(
        &self,
        building_id: &str,
        slot: TimeSlot,
        exclude: Option<&str>,
    ) -> RepositoryResult<Option<Booking>> {
        Ok(self.read().conflicting_booking(building_id, slot, exclude))
    }

    async fn insert_booking_guarded(&self, booking: Booking) -> RepositoryResult<GuardedWrite> {
        let mut data = self.write();
        if let Some(reason) = data.availability_rule(&booking.building_id, booking.slot(), None) {
            return Ok(GuardedWrite::Rejected(reason));
        }
        data.bookings.insert(booking.booking_id.clone(), booking.clone());
        Ok(GuardedWrite::Written(booking))
    }

    async fn update_booking_guarded(&self, booking: Booking) -> RepositoryResult<GuardedWrite> {
        let mut data = self.write();
        if !data.bookings.contains_key(&booking.booking_id) {
            return Err(RepositoryError::NotFound(format!(
                "Booking '{}'",
                booking.booking_id
            )));
        }
        if let Some(reason) = data.availability_rule(
            &booking.building_id,
            booking.slot(),
            Some(booking.booking_id.as_str()),
        ) {
            return Ok(GuardedWrite::Rejected(reason));
        }
        data.bookings.insert(booking.booking_id.clone(), booking.clone());
        Ok(GuardedWrite::Written(booking))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingType, ConflictReason, RepeatDay, RepeatInterval};
    use chrono::{TimeZone, Utc};

    fn building(id: &str) -> Building {
        Building { building_id: id.into(), floor: 1 }
    }

    fn room(id: &str, building_id: &str, status: RoomStatus) -> Room {
        Room { room_id: id.into(), building_id: building_id.into(), room_status: status }
    }

    fn booking(id: &str, building_id: &str, start_h: u32, end_h: u32) -> Booking {
        Booking {
            booking_id: id.into(),
            building_id: building_id.into(),
            name: "standup".into(),
            description: None,
            start_time: Utc.with_ymd_and_hms(2025, 6, 2, start_h, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 6, 2, end_h, 0, 0).unwrap(),
            created_by: "alice".into(),
            modified_by: "alice".into(),
            booking_type: BookingType::Once,
            repeat_interval: RepeatInterval::None,
            repeat_day: RepeatDay::Monday,
            last_update: Utc::now(),
        }
    }

    #[tokio::test]
    async fn building_delete_cascades() {
        let repo = LocalRepository::new();
        repo.insert_building(building("b1")).await.unwrap();
        repo.insert_room(room("r1", "b1", RoomStatus::Available)).await.unwrap();
        repo.insert_booking(booking("k1", "b1", 10, 11)).await.unwrap();

        repo.delete_building("b1").await.unwrap();

        assert!(repo.list_rooms().await.unwrap().is_empty());
        assert!(repo.list_bookings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_room_requires_building() {
        let repo = LocalRepository::new();
        let err = repo
            .insert_room(room("r1", "missing", RoomStatus::Available))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::QueryError(_)));
    }

    #[tokio::test]
    async fn first_room_orders_by_id() {
        let repo = LocalRepository::new();
        repo.insert_building(building("b1")).await.unwrap();
        repo.insert_room(room("r2", "b1", RoomStatus::Available)).await.unwrap();
        repo.insert_room(room("r1", "b1", RoomStatus::Maintenance)).await.unwrap();

        let first = repo.first_room_in_building("b1").await.unwrap().unwrap();
        assert_eq!(first.room_id, "r1");
    }

    #[tokio::test]
    async fn conflict_query_honors_exclusion() {
        let repo = LocalRepository::new();
        repo.insert_building(building("b1")).await.unwrap();
        repo.insert_booking(booking("k1", "b1", 10, 11)).await.unwrap();

        let slot = booking("x", "b1", 10, 11).slot();
        assert!(repo
            .find_conflicting_booking("b1", slot, None)
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .find_conflicting_booking("b1", slot, Some("k1"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn guarded_insert_rejects_overlap_and_missing_room() {
        let repo = LocalRepository::new();
        repo.insert_building(building("b1")).await.unwrap();

        match repo.insert_booking_guarded(booking("k1", "b1", 10, 11)).await.unwrap() {
            GuardedWrite::Rejected(ConflictReason::RoomNotFound) => {}
            other => panic!("expected RoomNotFound, got {:?}", other),
        }

        repo.insert_room(room("r1", "b1", RoomStatus::Available)).await.unwrap();
        assert!(matches!(
            repo.insert_booking_guarded(booking("k1", "b1", 10, 11)).await.unwrap(),
            GuardedWrite::Written(_)
        ));
        assert!(matches!(
            repo.insert_booking_guarded(booking("k2", "b1", 10, 11)).await.unwrap(),
            GuardedWrite::Rejected(ConflictReason::SlotTaken)
        ));
    }

    #[tokio::test]
    async fn health_flag_is_reported() {
        let repo = LocalRepository::new();
        assert!(repo.health_check().await.unwrap());
        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
    }
}

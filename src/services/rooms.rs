//! Room manager: CRUD plus the isolated status-update operation.
//!
//! Status strings are validated against [`RoomStatus`] here so a bad value
//! surfaces as a client-input error, never as a store failure.

use log::info;
use std::sync::Arc;

use super::{id_or_generated, parse_field, ServiceResult};
use crate::db::repository::{FullRepository, RoomRepository};
use crate::models::{NewRoom, Room, RoomDetail, RoomStatus, RoomUpdate};

pub struct RoomService {
    repo: Arc<dyn FullRepository>,
}

impl RoomService {
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> ServiceResult<Vec<RoomDetail>> {
        Ok(self.repo.list_rooms().await?)
    }

    pub async fn get(&self, room_id: &str) -> ServiceResult<RoomDetail> {
        Ok(self.repo.get_room(room_id).await?)
    }

    pub async fn create(&self, new: NewRoom) -> ServiceResult<Room> {
        let room = Room {
            room_id: id_or_generated(new.room_id),
            building_id: new.building_id,
            room_status: parse_field::<RoomStatus>(&new.room_status)?,
        };
        let created = self.repo.insert_room(room).await?;
        info!("created room '{}' in building '{}'", created.room_id, created.building_id);
        Ok(created)
    }

    /// Merge the allow-listed fields into an existing room. The identifier
    /// is immutable.
    pub async fn update(&self, room_id: &str, update: RoomUpdate) -> ServiceResult<Room> {
        let existing = self.repo.get_room(room_id).await?.room;
        let room = Room {
            room_id: existing.room_id,
            building_id: update.building_id.unwrap_or(existing.building_id),
            room_status: match update.room_status {
                Some(ref s) => parse_field::<RoomStatus>(s)?,
                None => existing.room_status,
            },
        };
        Ok(self.repo.update_room(room).await?)
    }

    /// Set only the status, independent of every other room field.
    pub async fn update_status(&self, room_id: &str, status: &str) -> ServiceResult<Room> {
        let status = parse_field::<RoomStatus>(status)?;
        let room = self.repo.update_room_status(room_id, status).await?;
        info!("room '{}' status set to {}", room.room_id, room.room_status);
        Ok(room)
    }

    pub async fn delete(&self, room_id: &str) -> ServiceResult<()> {
        self.repo.delete_room(room_id).await?;
        info!("deleted room '{}'", room_id);
        Ok(())
    }
}

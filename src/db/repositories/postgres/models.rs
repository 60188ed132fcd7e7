//! Diesel row types and conversions to the domain model.
//!
//! Enum-valued columns are stored as their SCREAMING_SNAKE_CASE text; a
//! value that no longer parses indicates corrupted data and surfaces as an
//! internal error rather than a client-facing one.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::str::FromStr;

use super::schema::{bookings, buildings, rooms};
use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::models::{Booking, BookingType, Building, RepeatDay, RepeatInterval, Room, RoomStatus};

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = buildings)]
pub struct BuildingRow {
    pub building_id: String,
    pub floor: i32,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = rooms)]
pub struct RoomRow {
    pub room_id: String,
    pub building_id: String,
    pub room_status: String,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = bookings)]
pub struct BookingRow {
    pub booking_id: String,
    pub building_id: String,
    pub name: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_by: String,
    pub modified_by: String,
    pub booking_type: String,
    pub repeat_interval: String,
    pub repeat_day: String,
    pub last_update: DateTime<Utc>,
}

fn parse_column<T: FromStr<Err = String>>(column: &str, value: &str) -> RepositoryResult<T> {
    value.parse().map_err(|e| {
        RepositoryError::InternalError(format!("corrupt {} column: {}", column, e))
    })
}

impl From<Building> for BuildingRow {
    fn from(b: Building) -> Self {
        Self { building_id: b.building_id, floor: b.floor }
    }
}

impl From<BuildingRow> for Building {
    fn from(row: BuildingRow) -> Self {
        Self { building_id: row.building_id, floor: row.floor }
    }
}

impl From<Room> for RoomRow {
    fn from(r: Room) -> Self {
        Self {
            room_id: r.room_id,
            building_id: r.building_id,
            room_status: r.room_status.as_str().to_string(),
        }
    }
}

impl TryFrom<RoomRow> for Room {
    type Error = RepositoryError;

    fn try_from(row: RoomRow) -> RepositoryResult<Self> {
        Ok(Self {
            room_status: parse_column::<RoomStatus>("room_status", &row.room_status)?,
            room_id: row.room_id,
            building_id: row.building_id,
        })
    }
}

impl From<Booking> for BookingRow {
    fn from(b: Booking) -> Self {
        Self {
            booking_id: b.booking_id,
            building_id: b.building_id,
            name: b.name,
            description: b.description,
            start_time: b.start_time,
            end_time: b.end_time,
            created_by: b.created_by,
            modified_by: b.modified_by,
            booking_type: b.booking_type.as_str().to_string(),
            repeat_interval: b.repeat_interval.as_str().to_string(),
            repeat_day: b.repeat_day.as_str().to_string(),
            last_update: b.last_update,
        }
    }
}

impl TryFrom<BookingRow> for Booking {
    type Error = RepositoryError;

    fn try_from(row: BookingRow) -> RepositoryResult<Self> {
        Ok(Self {
            booking_type: parse_column::<BookingType>("booking_type", &row.booking_type)?,
            repeat_interval: parse_column::<RepeatInterval>(
                "repeat_interval",
                &row.repeat_interval,
            )?,
            repeat_day: parse_column::<RepeatDay>("repeat_day", &row.repeat_day)?,
            booking_id: row.booking_id,
            building_id: row.building_id,
            name: row.name,
            description: row.description,
            start_time: row.start_time,
            end_time: row.end_time,
            created_by: row.created_by,
            modified_by: row.modified_by,
            last_update: row.last_update,
        })
    }
}

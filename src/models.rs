//! Core domain model for the room-booking service.
//!
//! Three related entities (Building, Room, Booking) plus the pure pieces of
//! the availability rule: the closed-interval overlap test, room booking
//! eligibility, and the conflict vocabulary. Keeping these here lets both
//! the service-layer checker and the store-level guarded writes share one
//! source of truth for the booking rule.
//!
//! Enum-valued fields cross the API boundary as SCREAMING_SNAKE_CASE
//! strings (`"AVAILABLE"`, `"EVERY_WEEK"`, ...); parsing happens in the
//! service layer so that a bad value surfaces as a client-input error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==================== Enumerations ====================

/// Operational status of a room.
///
/// A room accepts new bookings only while `Available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Available,
    Unavailable,
    Maintenance,
}

impl RoomStatus {
    /// Whether a room in this status may receive new bookings.
    pub fn is_bookable(self) -> bool {
        matches!(self, RoomStatus::Available)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoomStatus::Available => "AVAILABLE",
            RoomStatus::Unavailable => "UNAVAILABLE",
            RoomStatus::Maintenance => "MAINTENANCE",
        }
    }
}

impl FromStr for RoomStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(RoomStatus::Available),
            "UNAVAILABLE" => Ok(RoomStatus::Unavailable),
            "MAINTENANCE" => Ok(RoomStatus::Maintenance),
            other => Err(format!(
                "invalid roomStatus '{}' (expected AVAILABLE, UNAVAILABLE or MAINTENANCE)",
                other
            )),
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recurrence classification of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingType {
    Daily,
    Weekly,
    Monthly,
    Once,
}

impl BookingType {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingType::Daily => "DAILY",
            BookingType::Weekly => "WEEKLY",
            BookingType::Monthly => "MONTHLY",
            BookingType::Once => "ONCE",
        }
    }
}

impl FromStr for BookingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DAILY" => Ok(BookingType::Daily),
            "WEEKLY" => Ok(BookingType::Weekly),
            "MONTHLY" => Ok(BookingType::Monthly),
            "ONCE" => Ok(BookingType::Once),
            other => Err(format!(
                "invalid type '{}' (expected DAILY, WEEKLY, MONTHLY or ONCE)",
                other
            )),
        }
    }
}

impl fmt::Display for BookingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repeat cadence of a recurring booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepeatInterval {
    EveryDay,
    EveryWeek,
    EveryMonth,
    None,
}

impl RepeatInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            RepeatInterval::EveryDay => "EVERY_DAY",
            RepeatInterval::EveryWeek => "EVERY_WEEK",
            RepeatInterval::EveryMonth => "EVERY_MONTH",
            RepeatInterval::None => "NONE",
        }
    }
}

impl FromStr for RepeatInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EVERY_DAY" => Ok(RepeatInterval::EveryDay),
            "EVERY_WEEK" => Ok(RepeatInterval::EveryWeek),
            "EVERY_MONTH" => Ok(RepeatInterval::EveryMonth),
            "NONE" => Ok(RepeatInterval::None),
            other => Err(format!(
                "invalid repeatType '{}' (expected EVERY_DAY, EVERY_WEEK, EVERY_MONTH or NONE)",
                other
            )),
        }
    }
}

impl fmt::Display for RepeatInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weekday a repeating booking falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepeatDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl RepeatDay {
    pub fn as_str(self) -> &'static str {
        match self {
            RepeatDay::Monday => "MONDAY",
            RepeatDay::Tuesday => "TUESDAY",
            RepeatDay::Wednesday => "WEDNESDAY",
            RepeatDay::Thursday => "THURSDAY",
            RepeatDay::Friday => "FRIDAY",
            RepeatDay::Saturday => "SATURDAY",
            RepeatDay::Sunday => "SUNDAY",
        }
    }
}

impl FromStr for RepeatDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MONDAY" => Ok(RepeatDay::Monday),
            "TUESDAY" => Ok(RepeatDay::Tuesday),
            "WEDNESDAY" => Ok(RepeatDay::Wednesday),
            "THURSDAY" => Ok(RepeatDay::Thursday),
            "FRIDAY" => Ok(RepeatDay::Friday),
            "SATURDAY" => Ok(RepeatDay::Saturday),
            "SUNDAY" => Ok(RepeatDay::Sunday),
            other => Err(format!("invalid repeatDay '{}' (expected a weekday name)", other)),
        }
    }
}

impl fmt::Display for RepeatDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==================== Time intervals ====================

/// A requested or stored booking interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The end must fall strictly after the start.
    pub fn is_well_formed(&self) -> bool {
        self.end > self.start
    }

    /// Closed-interval overlap test: boundary-touching slots conflict.
    ///
    /// A booking ending at 11:00 and a request starting at 11:00 overlap
    /// under this policy.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

// ==================== Availability vocabulary ====================

/// Why a booking request was turned down.
///
/// `Display` renders the exact messages the API returns with a 409.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// The building has no room to book.
    RoomNotFound,
    /// The resolved room is UNAVAILABLE or under MAINTENANCE.
    RoomOutOfService,
    /// Another booking overlaps the requested interval.
    SlotTaken,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConflictReason::RoomNotFound => "Room not found",
            ConflictReason::RoomOutOfService => {
                "Room is currently unavailable or under maintenance"
            }
            ConflictReason::SlotTaken => "Room is already booked for this time period",
        };
        f.write_str(msg)
    }
}

/// Outcome of an availability check: `{available, reason}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityCheck {
    pub available: bool,
    pub reason: Option<ConflictReason>,
}

impl AvailabilityCheck {
    pub fn available() -> Self {
        Self { available: true, reason: None }
    }

    pub fn unavailable(reason: ConflictReason) -> Self {
        Self { available: false, reason: Some(reason) }
    }
}

/// Room half of the availability rule: resolve the "first room" lookup
/// result into either a bookable room or a conflict.
///
/// Shared by the read-path checker and the guarded store writes.
pub fn room_eligibility(room: Option<&Room>) -> Result<&Room, ConflictReason> {
    match room {
        None => Err(ConflictReason::RoomNotFound),
        Some(room) if !room.room_status.is_bookable() => Err(ConflictReason::RoomOutOfService),
        Some(room) => Ok(room),
    }
}

// ==================== Entities ====================

/// A building owning rooms and bookings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub building_id: String,
    pub floor: i32,
}

/// A room inside a building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_id: String,
    pub building_id: String,
    pub room_status: RoomStatus,
}

/// A reservation of a building's room for a time interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub booking_id: String,
    pub building_id: String,
    pub name: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_by: String,
    pub modified_by: String,
    #[serde(rename = "type")]
    pub booking_type: BookingType,
    #[serde(rename = "repeatType")]
    pub repeat_interval: RepeatInterval,
    pub repeat_day: RepeatDay,
    /// System-set on every create and update.
    pub last_update: DateTime<Utc>,
}

impl Booking {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.start_time, self.end_time)
    }
}

// ==================== Expanded read models ====================

/// A building with its rooms and bookings included, for read operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingDetail {
    #[serde(flatten)]
    pub building: Building,
    pub rooms: Vec<Room>,
    pub bookings: Vec<Booking>,
}

/// A room with its building included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDetail {
    #[serde(flatten)]
    pub room: Room,
    pub building: Building,
}

/// A booking with its building included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: Booking,
    pub building: Building,
}

// ==================== Write payloads ====================
//
// Enum-valued fields arrive as raw strings and are validated by the
// service layer. Identifiers are optional on create (the store assigns a
// UUID when absent) and never updatable.

/// Payload for creating a building.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBuilding {
    #[serde(default)]
    pub building_id: Option<String>,
    pub floor: i32,
}

/// Allow-listed updatable fields of a building.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingUpdate {
    #[serde(default)]
    pub floor: Option<i32>,
}

/// Payload for creating a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    #[serde(default)]
    pub room_id: Option<String>,
    pub building_id: String,
    pub room_status: String,
}

/// Allow-listed updatable fields of a room.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUpdate {
    #[serde(default)]
    pub building_id: Option<String>,
    #[serde(default)]
    pub room_status: Option<String>,
}

/// Payload for creating a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    #[serde(default)]
    pub booking_id: Option<String>,
    pub building_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_by: String,
    /// Defaults to `created_by` when absent.
    #[serde(default)]
    pub modified_by: Option<String>,
    #[serde(rename = "type")]
    pub booking_type: String,
    #[serde(rename = "repeatType")]
    pub repeat_interval: String,
    pub repeat_day: String,
}

/// Allow-listed updatable fields of a booking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingUpdate {
    #[serde(default)]
    pub building_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_by: Option<String>,
    #[serde(default, rename = "type")]
    pub booking_type: Option<String>,
    #[serde(default, rename = "repeatType")]
    pub repeat_interval: Option<String>,
    #[serde(default)]
    pub repeat_day: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
    }

    #[test]
    fn overlap_is_closed_interval() {
        let a = TimeSlot::new(at(10, 0), at(11, 0));
        let b = TimeSlot::new(at(11, 0), at(12, 0));
        // Touching endpoints count as a conflict under the closed-interval policy.
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn disjoint_slots_do_not_overlap() {
        let a = TimeSlot::new(at(10, 0), at(11, 0));
        let b = TimeSlot::new(at(11, 1), at(12, 0));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn contained_slot_overlaps() {
        let outer = TimeSlot::new(at(9, 0), at(17, 0));
        let inner = TimeSlot::new(at(12, 0), at(13, 0));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn well_formed_requires_end_after_start() {
        assert!(TimeSlot::new(at(10, 0), at(11, 0)).is_well_formed());
        assert!(!TimeSlot::new(at(11, 0), at(11, 0)).is_well_formed());
        assert!(!TimeSlot::new(at(12, 0), at(11, 0)).is_well_formed());
    }

    #[test]
    fn room_status_parses_and_rejects() {
        assert_eq!("AVAILABLE".parse::<RoomStatus>().unwrap(), RoomStatus::Available);
        assert_eq!("MAINTENANCE".parse::<RoomStatus>().unwrap(), RoomStatus::Maintenance);
        assert!("BROKEN".parse::<RoomStatus>().is_err());
        assert!("available".parse::<RoomStatus>().is_err());
    }

    #[test]
    fn eligibility_reports_missing_and_out_of_service_rooms() {
        assert_eq!(room_eligibility(None).unwrap_err(), ConflictReason::RoomNotFound);

        let room = Room {
            room_id: "r1".into(),
            building_id: "b1".into(),
            room_status: RoomStatus::Maintenance,
        };
        assert_eq!(
            room_eligibility(Some(&room)).unwrap_err(),
            ConflictReason::RoomOutOfService
        );

        let open = Room { room_status: RoomStatus::Available, ..room };
        assert!(room_eligibility(Some(&open)).is_ok());
    }

    #[test]
    fn booking_serializes_with_wire_field_names() {
        let booking = Booking {
            booking_id: "k1".into(),
            building_id: "hq".into(),
            name: "standup".into(),
            description: None,
            start_time: at(10, 0),
            end_time: at(11, 0),
            created_by: "alice".into(),
            modified_by: "alice".into(),
            booking_type: BookingType::Weekly,
            repeat_interval: RepeatInterval::EveryWeek,
            repeat_day: RepeatDay::Monday,
            last_update: at(9, 0),
        };

        let value = serde_json::to_value(&booking).unwrap();
        assert_eq!(value["bookingId"], "k1");
        assert_eq!(value["buildingId"], "hq");
        assert_eq!(value["type"], "WEEKLY");
        assert_eq!(value["repeatType"], "EVERY_WEEK");
        assert_eq!(value["repeatDay"], "MONDAY");
        assert!(value.get("lastUpdate").is_some());

        let start: DateTime<Utc> = value["startTime"].as_str().unwrap().parse().unwrap();
        assert_eq!(start, at(10, 0));
    }

    #[test]
    fn conflict_reasons_render_api_messages() {
        assert_eq!(ConflictReason::RoomNotFound.to_string(), "Room not found");
        assert_eq!(
            ConflictReason::RoomOutOfService.to_string(),
            "Room is currently unavailable or under maintenance"
        );
        assert_eq!(
            ConflictReason::SlotTaken.to_string(),
            "Room is already booked for this time period"
        );
    }
}

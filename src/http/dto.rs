//! Data Transfer Objects for the HTTP API.
//!
//! The core models already derive Serialize/Deserialize with the wire
//! field names (camelCase, enum strings), so request and response bodies
//! reuse them directly; only the handful of endpoint-specific shapes live
//! here.

use serde::{Deserialize, Serialize};

pub use crate::models::{
    Booking, BookingDetail, BookingUpdate, Building, BuildingDetail, BuildingUpdate, NewBooking,
    NewBuilding, NewRoom, Room, RoomDetail, RoomUpdate,
};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Data store connection status
    pub database: String,
}

/// Request body for the isolated room status update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatusUpdate {
    pub room_status: String,
}

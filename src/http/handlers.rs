//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! manager layer for business logic.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    Booking, BookingDetail, BookingUpdate, Building, BuildingDetail, BuildingUpdate,
    HealthResponse, NewBooking, NewBuilding, NewRoom, Room, RoomDetail, RoomStatusUpdate,
    RoomUpdate,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::repository::StoreLifecycle;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Verify the service is running and the data store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let database = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse { status: "ok".to_string(), database }))
}

// =============================================================================
// Bookings
// =============================================================================

/// GET /api/bookings
pub async fn list_bookings(State(state): State<AppState>) -> HandlerResult<Vec<BookingDetail>> {
    Ok(Json(state.bookings.list().await?))
}

/// GET /api/bookings/{id}
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<BookingDetail> {
    Ok(Json(state.bookings.get(&id).await?))
}

/// POST /api/bookings
///
/// 201 on success, 409 with the checker's reason when the room is not
/// available.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(new): Json<NewBooking>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = state.bookings.create(new).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// PUT /api/bookings/{id}
pub async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<BookingUpdate>,
) -> HandlerResult<Booking> {
    Ok(Json(state.bookings.update(&id, update).await?))
}

/// DELETE /api/bookings/{id}
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.bookings.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Buildings
// =============================================================================

/// GET /api/buildings
pub async fn list_buildings(State(state): State<AppState>) -> HandlerResult<Vec<BuildingDetail>> {
    Ok(Json(state.buildings.list().await?))
}

/// GET /api/buildings/{id}
pub async fn get_building(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<BuildingDetail> {
    Ok(Json(state.buildings.get(&id).await?))
}

/// POST /api/buildings
pub async fn create_building(
    State(state): State<AppState>,
    Json(new): Json<NewBuilding>,
) -> Result<(StatusCode, Json<Building>), AppError> {
    let building = state.buildings.create(new).await?;
    Ok((StatusCode::CREATED, Json(building)))
}

/// PUT /api/buildings/{id}
pub async fn update_building(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<BuildingUpdate>,
) -> HandlerResult<Building> {
    Ok(Json(state.buildings.update(&id, update).await?))
}

/// DELETE /api/buildings/{id}
pub async fn delete_building(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.buildings.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Rooms
// =============================================================================

/// GET /api/rooms
pub async fn list_rooms(State(state): State<AppState>) -> HandlerResult<Vec<RoomDetail>> {
    Ok(Json(state.rooms.list().await?))
}

/// GET /api/rooms/{id}
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<RoomDetail> {
    Ok(Json(state.rooms.get(&id).await?))
}

/// POST /api/rooms
///
/// 400 when `roomStatus` is not one of the defined values.
pub async fn create_room(
    State(state): State<AppState>,
    Json(new): Json<NewRoom>,
) -> Result<(StatusCode, Json<Room>), AppError> {
    let room = state.rooms.create(new).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// PUT /api/rooms/{id}
pub async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<RoomUpdate>,
) -> HandlerResult<Room> {
    Ok(Json(state.rooms.update(&id, update).await?))
}

/// PATCH /api/rooms/{id}/status
///
/// Update only the room status, independent of other room fields.
pub async fn update_room_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<RoomStatusUpdate>,
) -> HandlerResult<Room> {
    Ok(Json(state.rooms.update_status(&id, &update.room_status).await?))
}

/// DELETE /api/rooms/{id}
pub async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.rooms.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Business-logic layer: the three entity managers and the availability
//! checker they share.
//!
//! Each manager is constructed with an explicit store handle
//! (`Arc<dyn FullRepository>`) and exposes the operations the API surface
//! calls. Failures are typed: the boundary layer maps each
//! [`ServiceError`] kind to its own externally visible status instead of
//! collapsing everything into one generic code.

pub mod availability;
pub mod bookings;
pub mod buildings;
pub mod rooms;

pub use availability::check_availability;
pub use bookings::BookingService;
pub use buildings::BuildingService;
pub use rooms::RoomService;

use crate::db::repository::RepositoryError;
use crate::models::ConflictReason;

/// Result type for manager operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error taxonomy of the core.
///
/// - `NotFound`: requested entity id does not exist (404 equivalent)
/// - `Conflict`: a booking failed the availability check (409); carries
///   the human-readable reason
/// - `Validation`: malformed client input, e.g. an unknown room status
///   (400)
/// - `Store`: any unanticipated persistence failure, opaque to the
///   caller (500)
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(ConflictReason),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        // Store-level not-found and validation keep their kind; everything
        // else is an opaque store failure.
        match err {
            RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
            RepositoryError::ValidationError(msg) => ServiceError::Validation(msg),
            other => ServiceError::Store(other),
        }
    }
}

/// Parse a SCREAMING_SNAKE_CASE enum field, mapping failures to a
/// client-input error.
pub(crate) fn parse_field<T>(value: &str) -> ServiceResult<T>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(ServiceError::Validation)
}

/// Generate a store identifier when the caller did not supply one.
pub(crate) fn id_or_generated(id: Option<String>) -> String {
    id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

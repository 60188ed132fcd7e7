//! Booking manager: orchestrates create/update through the availability
//! checker before persisting.

use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use super::availability::check_availability;
use super::{id_or_generated, parse_field, ServiceError, ServiceResult};
use crate::db::repository::{BookingRepository, FullRepository, GuardedWrite};
use crate::models::{
    AvailabilityCheck, Booking, BookingDetail, BookingUpdate, NewBooking, TimeSlot,
};

/// Manager for booking CRUD and the booking lifecycle rules.
///
/// With `serializable_writes` off (the default) the availability check and
/// the subsequent write are separate store operations; two concurrent
/// create calls for overlapping intervals can both pass the check before
/// either writes. Turning it on routes create/update through the store's
/// guarded write path, which re-runs the check inside one critical
/// section.
pub struct BookingService {
    repo: Arc<dyn FullRepository>,
    serializable_writes: bool,
}

impl BookingService {
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self { repo, serializable_writes: false }
    }

    /// Opt into check-and-write in one store-level critical section.
    pub fn with_serializable_writes(mut self, enabled: bool) -> Self {
        self.serializable_writes = enabled;
        self
    }

    /// Expose the checker directly: `{available, reason}` for a building
    /// and interval, optionally excluding one booking.
    pub async fn check_availability(
        &self,
        building_id: &str,
        slot: TimeSlot,
        exclude_booking_id: Option<&str>,
    ) -> ServiceResult<AvailabilityCheck> {
        Ok(check_availability(self.repo.as_ref(), building_id, slot, exclude_booking_id).await?)
    }

    /// List all bookings with their building expanded. Full-table
    /// semantics: no filtering, no pagination.
    pub async fn list(&self) -> ServiceResult<Vec<BookingDetail>> {
        Ok(self.repo.list_bookings().await?)
    }

    /// Fetch one booking with its building expanded.
    pub async fn get(&self, booking_id: &str) -> ServiceResult<BookingDetail> {
        Ok(self.repo.get_booking(booking_id).await?)
    }

    /// Create a booking if the availability check passes.
    pub async fn create(&self, new: NewBooking) -> ServiceResult<Booking> {
        let slot = TimeSlot::new(new.start_time, new.end_time);
        validate_slot(&slot)?;

        let created_by = new.created_by.clone();
        let booking = Booking {
            booking_id: id_or_generated(new.booking_id),
            building_id: new.building_id,
            name: new.name,
            description: new.description,
            start_time: new.start_time,
            end_time: new.end_time,
            modified_by: new.modified_by.unwrap_or_else(|| created_by.clone()),
            created_by,
            booking_type: parse_field(&new.booking_type)?,
            repeat_interval: parse_field(&new.repeat_interval)?,
            repeat_day: parse_field(&new.repeat_day)?,
            last_update: Utc::now(),
        };

        if self.serializable_writes {
            return self.finish_guarded(self.repo.insert_booking_guarded(booking).await?);
        }

        self.ensure_available(&booking.building_id, slot, None).await?;
        let created = self.repo.insert_booking(booking).await?;
        info!("created booking '{}' in building '{}'", created.booking_id, created.building_id);
        Ok(created)
    }

    /// Update a booking if the availability check (excluding itself)
    /// passes. Only the allow-listed fields of [`BookingUpdate`] are
    /// merged; the identifier and creation audit field never change.
    pub async fn update(&self, booking_id: &str, update: BookingUpdate) -> ServiceResult<Booking> {
        let existing = self.repo.get_booking(booking_id).await?.booking;

        let booking = Booking {
            booking_id: existing.booking_id,
            building_id: update.building_id.unwrap_or(existing.building_id),
            name: update.name.unwrap_or(existing.name),
            description: update.description.or(existing.description),
            start_time: update.start_time.unwrap_or(existing.start_time),
            end_time: update.end_time.unwrap_or(existing.end_time),
            created_by: existing.created_by,
            modified_by: update.modified_by.unwrap_or(existing.modified_by),
            booking_type: match update.booking_type {
                Some(ref s) => parse_field(s)?,
                None => existing.booking_type,
            },
            repeat_interval: match update.repeat_interval {
                Some(ref s) => parse_field(s)?,
                None => existing.repeat_interval,
            },
            repeat_day: match update.repeat_day {
                Some(ref s) => parse_field(s)?,
                None => existing.repeat_day,
            },
            last_update: Utc::now(),
        };

        let slot = booking.slot();
        validate_slot(&slot)?;

        if self.serializable_writes {
            return self.finish_guarded(self.repo.update_booking_guarded(booking).await?);
        }

        self.ensure_available(&booking.building_id, slot, Some(booking_id)).await?;
        let updated = self.repo.update_booking(booking).await?;
        info!("updated booking '{}'", updated.booking_id);
        Ok(updated)
    }

    /// Delete a booking by id, unconditionally.
    pub async fn delete(&self, booking_id: &str) -> ServiceResult<()> {
        self.repo.delete_booking(booking_id).await?;
        info!("deleted booking '{}'", booking_id);
        Ok(())
    }

    async fn ensure_available(
        &self,
        building_id: &str,
        slot: TimeSlot,
        exclude: Option<&str>,
    ) -> ServiceResult<()> {
        let check = check_availability(self.repo.as_ref(), building_id, slot, exclude).await?;
        match check.reason {
            None => Ok(()),
            Some(reason) => {
                warn!("booking rejected for building '{}': {}", building_id, reason);
                Err(ServiceError::Conflict(reason))
            }
        }
    }

    fn finish_guarded(&self, outcome: GuardedWrite) -> ServiceResult<Booking> {
        match outcome {
            GuardedWrite::Written(booking) => {
                info!("wrote booking '{}' (guarded)", booking.booking_id);
                Ok(booking)
            }
            GuardedWrite::Rejected(reason) => {
                warn!("guarded booking write rejected: {}", reason);
                Err(ServiceError::Conflict(reason))
            }
        }
    }
}

fn validate_slot(slot: &TimeSlot) -> ServiceResult<()> {
    if !slot.is_well_formed() {
        return Err(ServiceError::Validation(
            "endTime must be strictly after startTime".to_string(),
        ));
    }
    Ok(())
}

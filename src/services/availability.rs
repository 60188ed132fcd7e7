//! The availability checker.
//!
//! Decides whether a building's room can be booked for a requested
//! interval. Pure read-only query composition: no side effects, and store
//! failures propagate untouched.
//!
//! Bookings key on the building; the checker resolves "the" room through
//! [`RoomRepository::first_room_in_building`], the deterministic rendition
//! of the one-room-per-building simplification (see that method's docs for
//! the extension seam).
//!
//! Note that in the default booking path the check and the subsequent
//! write are separate store operations, so two concurrent requests can
//! both pass before either writes. The guarded write path on
//! [`BookingRepository`](crate::db::repository::BookingRepository) exists
//! to close that gap.

use crate::db::repository::{BookingRepository, FullRepository, RepositoryResult, RoomRepository};
use crate::models::{room_eligibility, AvailabilityCheck, ConflictReason, TimeSlot};

/// Check whether `building_id`'s room is free for `slot`.
///
/// `exclude_booking_id` omits one booking from the conflict search, used
/// when re-validating an update against itself.
///
/// The conflict search uses the closed-interval test (an existing booking
/// touching the requested boundary counts as a conflict).
pub async fn check_availability(
    repo: &dyn FullRepository,
    building_id: &str,
    slot: TimeSlot,
    exclude_booking_id: Option<&str>,
) -> RepositoryResult<AvailabilityCheck> {
    let room = repo.first_room_in_building(building_id).await?;
    if let Err(reason) = room_eligibility(room.as_ref()) {
        return Ok(AvailabilityCheck::unavailable(reason));
    }

    let conflict = repo
        .find_conflicting_booking(building_id, slot, exclude_booking_id)
        .await?;

    Ok(match conflict {
        Some(_) => AvailabilityCheck::unavailable(ConflictReason::SlotTaken),
        None => AvailabilityCheck::available(),
    })
}

#[cfg(all(test, feature = "local-repo"))]
mod tests {
    use super::*;
    use crate::db::repository::{BookingRepository, BuildingRepository, RoomRepository};
    use crate::db::LocalRepository;
    use crate::models::{
        Booking, BookingType, Building, RepeatDay, RepeatInterval, Room, RoomStatus,
    };
    use chrono::{DateTime, TimeZone, Utc};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
    }

    async fn seed(repo: &LocalRepository, status: RoomStatus) {
        repo.insert_building(Building { building_id: "hq".into(), floor: 3 })
            .await
            .unwrap();
        repo.insert_room(Room {
            room_id: "hq-room".into(),
            building_id: "hq".into(),
            room_status: status,
        })
        .await
        .unwrap();
    }

    async fn seed_booking(repo: &LocalRepository, id: &str, start: DateTime<Utc>, end: DateTime<Utc>) {
        repo.insert_booking(Booking {
            booking_id: id.into(),
            building_id: "hq".into(),
            name: "weekly sync".into(),
            description: None,
            start_time: start,
            end_time: end,
            created_by: "alice".into(),
            modified_by: "alice".into(),
            booking_type: BookingType::Weekly,
            repeat_interval: RepeatInterval::EveryWeek,
            repeat_day: RepeatDay::Monday,
            last_update: Utc::now(),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn missing_room_reports_room_not_found() {
        let repo = LocalRepository::new();
        repo.insert_building(Building { building_id: "hq".into(), floor: 3 })
            .await
            .unwrap();

        let check = check_availability(&repo, "hq", TimeSlot::new(at(10, 0), at(11, 0)), None)
            .await
            .unwrap();
        assert!(!check.available);
        assert_eq!(check.reason, Some(ConflictReason::RoomNotFound));
    }

    #[tokio::test]
    async fn out_of_service_room_is_unavailable_for_any_interval() {
        for status in [RoomStatus::Unavailable, RoomStatus::Maintenance] {
            let repo = LocalRepository::new();
            seed(&repo, status).await;

            let check =
                check_availability(&repo, "hq", TimeSlot::new(at(10, 0), at(11, 0)), None)
                    .await
                    .unwrap();
            assert!(!check.available);
            assert_eq!(check.reason, Some(ConflictReason::RoomOutOfService));
        }
    }

    #[tokio::test]
    async fn free_slot_is_available() {
        let repo = LocalRepository::new();
        seed(&repo, RoomStatus::Available).await;

        let check = check_availability(&repo, "hq", TimeSlot::new(at(10, 0), at(11, 0)), None)
            .await
            .unwrap();
        assert!(check.available);
        assert_eq!(check.reason, None);
    }

    #[tokio::test]
    async fn boundary_touching_slot_conflicts() {
        let repo = LocalRepository::new();
        seed(&repo, RoomStatus::Available).await;
        seed_booking(&repo, "k1", at(10, 0), at(11, 0)).await;

        // Closed-interval policy: starting exactly when k1 ends conflicts.
        let check = check_availability(&repo, "hq", TimeSlot::new(at(11, 0), at(12, 0)), None)
            .await
            .unwrap();
        assert!(!check.available);
        assert_eq!(check.reason, Some(ConflictReason::SlotTaken));
    }

    #[tokio::test]
    async fn excluded_booking_does_not_conflict_with_itself() {
        let repo = LocalRepository::new();
        seed(&repo, RoomStatus::Available).await;
        seed_booking(&repo, "k1", at(10, 0), at(11, 0)).await;

        let slot = TimeSlot::new(at(10, 30), at(11, 30));
        let unexcluded = check_availability(&repo, "hq", slot, None).await.unwrap();
        assert!(!unexcluded.available);

        let excluded = check_availability(&repo, "hq", slot, Some("k1")).await.unwrap();
        assert!(excluded.available);
    }
}

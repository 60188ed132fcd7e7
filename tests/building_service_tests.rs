//! Building manager tests: CRUD and relation expansion on reads.

use chrono::{DateTime, TimeZone, Utc};

use roombook::db::RepositoryFactory;
use roombook::models::{BuildingUpdate, NewBooking, NewBuilding, NewRoom};
use roombook::services::{BookingService, BuildingService, RoomService, ServiceError};

fn at(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, h, 0, 0).unwrap()
}

#[tokio::test]
async fn create_update_round_trip() {
    let repo = RepositoryFactory::create_local();
    let service = BuildingService::new(repo);

    let created = service
        .create(NewBuilding { building_id: Some("hq".into()), floor: 3 })
        .await
        .unwrap();
    assert_eq!(created.building_id, "hq");
    assert_eq!(created.floor, 3);

    let updated = service
        .update("hq", BuildingUpdate { floor: Some(5) })
        .await
        .unwrap();
    assert_eq!(updated.floor, 5);
    assert_eq!(updated.building_id, "hq");

    // An empty update changes nothing.
    let unchanged = service.update("hq", BuildingUpdate::default()).await.unwrap();
    assert_eq!(unchanged.floor, 5);
}

#[tokio::test]
async fn get_expands_rooms_and_bookings() {
    let repo = RepositoryFactory::create_local();
    let buildings = BuildingService::new(repo.clone());
    let rooms = RoomService::new(repo.clone());
    let bookings = BookingService::new(repo);

    buildings
        .create(NewBuilding { building_id: Some("hq".into()), floor: 3 })
        .await
        .unwrap();
    rooms
        .create(NewRoom {
            room_id: Some("hq-1".into()),
            building_id: "hq".into(),
            room_status: "AVAILABLE".into(),
        })
        .await
        .unwrap();
    bookings
        .create(NewBooking {
            booking_id: Some("k1".into()),
            building_id: "hq".into(),
            name: "kickoff".into(),
            description: None,
            start_time: at(10),
            end_time: at(11),
            created_by: "alice".into(),
            modified_by: None,
            booking_type: "ONCE".into(),
            repeat_interval: "NONE".into(),
            repeat_day: "MONDAY".into(),
        })
        .await
        .unwrap();

    let detail = buildings.get("hq").await.unwrap();
    assert_eq!(detail.building.building_id, "hq");
    assert_eq!(detail.rooms.len(), 1);
    assert_eq!(detail.rooms[0].room_id, "hq-1");
    assert_eq!(detail.bookings.len(), 1);
    assert_eq!(detail.bookings[0].booking_id, "k1");
}

#[tokio::test]
async fn missing_ids_are_not_found() {
    let service = BuildingService::new(RepositoryFactory::create_local());

    match service.get("ghost").await.unwrap_err() {
        ServiceError::NotFound(_) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
    match service.delete("ghost").await.unwrap_err() {
        ServiceError::NotFound(_) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
    match service.update("ghost", BuildingUpdate { floor: Some(1) }).await.unwrap_err() {
        ServiceError::NotFound(_) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn list_returns_every_building() {
    let service = BuildingService::new(RepositoryFactory::create_local());
    service
        .create(NewBuilding { building_id: Some("a".into()), floor: 1 })
        .await
        .unwrap();
    service
        .create(NewBuilding { building_id: Some("b".into()), floor: 2 })
        .await
        .unwrap();

    let all = service.list().await.unwrap();
    assert_eq!(all.len(), 2);
}

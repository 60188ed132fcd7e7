//! Room manager tests: CRUD, status validation, and the isolated
//! status-update operation.

use std::sync::Arc;

use roombook::db::{FullRepository, RepositoryFactory};
use roombook::models::{NewBuilding, NewRoom, RoomStatus, RoomUpdate};
use roombook::services::{BuildingService, RoomService, ServiceError};

async fn repo_with_building(building_id: &str) -> Arc<dyn FullRepository> {
    let repo = RepositoryFactory::create_local();
    BuildingService::new(repo.clone())
        .create(NewBuilding { building_id: Some(building_id.into()), floor: 2 })
        .await
        .unwrap();
    repo
}

fn new_room(room_id: &str, building_id: &str, status: &str) -> NewRoom {
    NewRoom {
        room_id: Some(room_id.into()),
        building_id: building_id.into(),
        room_status: status.into(),
    }
}

#[tokio::test]
async fn create_and_get_round_trip() {
    let service = RoomService::new(repo_with_building("hq").await);

    let created = service.create(new_room("hq-1", "hq", "AVAILABLE")).await.unwrap();
    assert_eq!(created.room_id, "hq-1");
    assert_eq!(created.room_status, RoomStatus::Available);

    let fetched = service.get("hq-1").await.unwrap();
    assert_eq!(fetched.room, created);
    // Reads expand the related building.
    assert_eq!(fetched.building.building_id, "hq");
    assert_eq!(fetched.building.floor, 2);
}

#[tokio::test]
async fn undefined_status_is_a_validation_error() {
    let service = RoomService::new(repo_with_building("hq").await);

    match service.create(new_room("hq-1", "hq", "BROKEN")).await.unwrap_err() {
        ServiceError::Validation(msg) => assert!(msg.contains("BROKEN")),
        other => panic!("expected Validation, got {other:?}"),
    }

    // Same rule on update.
    service.create(new_room("hq-1", "hq", "AVAILABLE")).await.unwrap();
    match service
        .update("hq-1", RoomUpdate { room_status: Some("BROKEN".into()), ..Default::default() })
        .await
        .unwrap_err()
    {
        ServiceError::Validation(_) => {}
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn status_update_leaves_other_fields_untouched() {
    let service = RoomService::new(repo_with_building("hq").await);
    service.create(new_room("hq-1", "hq", "AVAILABLE")).await.unwrap();

    let updated = service.update_status("hq-1", "MAINTENANCE").await.unwrap();

    assert_eq!(updated.room_status, RoomStatus::Maintenance);
    assert_eq!(updated.room_id, "hq-1");
    assert_eq!(updated.building_id, "hq");
}

#[tokio::test]
async fn status_update_rejects_undefined_values() {
    let service = RoomService::new(repo_with_building("hq").await);
    service.create(new_room("hq-1", "hq", "AVAILABLE")).await.unwrap();

    match service.update_status("hq-1", "BROKEN").await.unwrap_err() {
        ServiceError::Validation(_) => {}
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn generated_ids_are_assigned_when_absent() {
    let service = RoomService::new(repo_with_building("hq").await);
    let created = service
        .create(NewRoom {
            room_id: None,
            building_id: "hq".into(),
            room_status: "AVAILABLE".into(),
        })
        .await
        .unwrap();
    assert!(!created.room_id.is_empty());
    assert!(service.get(&created.room_id).await.is_ok());
}

#[tokio::test]
async fn delete_and_missing_ids() {
    let service = RoomService::new(repo_with_building("hq").await);
    service.create(new_room("hq-1", "hq", "AVAILABLE")).await.unwrap();

    service.delete("hq-1").await.unwrap();

    match service.get("hq-1").await.unwrap_err() {
        ServiceError::NotFound(_) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
    match service.delete("hq-1").await.unwrap_err() {
        ServiceError::NotFound(_) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
    match service.update_status("hq-1", "AVAILABLE").await.unwrap_err() {
        ServiceError::NotFound(_) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn list_expands_buildings() {
    let service = RoomService::new(repo_with_building("hq").await);
    service.create(new_room("hq-1", "hq", "AVAILABLE")).await.unwrap();
    service.create(new_room("hq-2", "hq", "UNAVAILABLE")).await.unwrap();

    let rooms = service.list().await.unwrap();
    assert_eq!(rooms.len(), 2);
    assert!(rooms.iter().all(|r| r.building.building_id == "hq"));
}

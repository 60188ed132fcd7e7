//! Building manager: plain CRUD, reads expanded with rooms and bookings.

use log::info;
use std::sync::Arc;

use super::{id_or_generated, ServiceResult};
use crate::db::repository::{BuildingRepository, FullRepository};
use crate::models::{Building, BuildingDetail, BuildingUpdate, NewBuilding};

pub struct BuildingService {
    repo: Arc<dyn FullRepository>,
}

impl BuildingService {
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> ServiceResult<Vec<BuildingDetail>> {
        Ok(self.repo.list_buildings().await?)
    }

    pub async fn get(&self, building_id: &str) -> ServiceResult<BuildingDetail> {
        Ok(self.repo.get_building(building_id).await?)
    }

    pub async fn create(&self, new: NewBuilding) -> ServiceResult<Building> {
        let building = Building {
            building_id: id_or_generated(new.building_id),
            floor: new.floor,
        };
        let created = self.repo.insert_building(building).await?;
        info!("created building '{}'", created.building_id);
        Ok(created)
    }

    /// Merge the allow-listed fields into an existing building. The
    /// identifier is immutable.
    pub async fn update(&self, building_id: &str, update: BuildingUpdate) -> ServiceResult<Building> {
        let existing = self.repo.get_building(building_id).await?.building;
        let building = Building {
            building_id: existing.building_id,
            floor: update.floor.unwrap_or(existing.floor),
        };
        Ok(self.repo.update_building(building).await?)
    }

    pub async fn delete(&self, building_id: &str) -> ServiceResult<()> {
        self.repo.delete_building(building_id).await?;
        info!("deleted building '{}'", building_id);
        Ok(())
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use stratus_application::SpaceRepository;
use stratus_core::{AppError, AppResult};
use stratus_domain::{Organization, OrganizationGuid, Space, SpaceGuid};
use tokio::sync::RwLock;

/// In-memory organization and space catalog.
#[derive(Debug, Default)]
pub struct InMemorySpaceRepository {
    organizations: RwLock<HashMap<OrganizationGuid, Organization>>,
    spaces: RwLock<HashMap<SpaceGuid, Space>>,
}

impl InMemorySpaceRepository {
    /// Creates an empty in-memory catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            organizations: RwLock::new(HashMap::new()),
            spaces: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SpaceRepository for InMemorySpaceRepository {
    async fn save_organization(&self, organization: Organization) -> AppResult<()> {
        let mut organizations = self.organizations.write().await;

        if organizations.contains_key(&organization.guid()) {
            return Err(AppError::Conflict(format!(
                "organization '{}' already exists",
                organization.guid()
            )));
        }

        organizations.insert(organization.guid(), organization);
        Ok(())
    }

    async fn save_space(&self, space: Space) -> AppResult<()> {
        if !self
            .organizations
            .read()
            .await
            .contains_key(&space.organization_guid())
        {
            return Err(AppError::NotFound(format!(
                "organization '{}' does not exist",
                space.organization_guid()
            )));
        }

        let mut spaces = self.spaces.write().await;
        if spaces.contains_key(&space.guid()) {
            return Err(AppError::Conflict(format!(
                "space '{}' already exists",
                space.guid()
            )));
        }

        spaces.insert(space.guid(), space);
        Ok(())
    }

    async fn find_space(&self, guid: SpaceGuid) -> AppResult<Option<Space>> {
        Ok(self.spaces.read().await.get(&guid).cloned())
    }

    async fn delete_space(&self, guid: SpaceGuid) -> AppResult<()> {
        self.spaces
            .write()
            .await
            .remove(&guid)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("space '{guid}' does not exist")))
    }
}

use async_trait::async_trait;
use stratus_core::AppResult;
use stratus_domain::{Organization, Space, SpaceGuid};

/// Repository port for organization and space persistence.
#[async_trait]
pub trait SpaceRepository: Send + Sync {
    /// Saves a new organization.
    async fn save_organization(&self, organization: Organization) -> AppResult<()>;

    /// Saves a new space. The owning organization must already exist.
    async fn save_space(&self, space: Space) -> AppResult<()>;

    /// Looks up a space by guid.
    async fn find_space(&self, guid: SpaceGuid) -> AppResult<Option<Space>>;

    /// Destroys a space. Audit events keep their denormalized guids.
    async fn delete_space(&self, guid: SpaceGuid) -> AppResult<()>;
}

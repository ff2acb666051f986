//! Organization and space scoping entities.

use serde::{Deserialize, Serialize};
use stratus_core::{AppResult, NonEmptyString};

use crate::{OrganizationGuid, SpaceGuid};

/// Top-level tenant in the platform hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    guid: OrganizationGuid,
    name: NonEmptyString,
}

impl Organization {
    /// Creates an organization with a validated name.
    pub fn new(guid: OrganizationGuid, name: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            guid,
            name: NonEmptyString::new(name)?,
        })
    }

    /// Returns the organization guid.
    #[must_use]
    pub fn guid(&self) -> OrganizationGuid {
        self.guid
    }

    /// Returns the organization name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// Space nested inside an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    guid: SpaceGuid,
    name: NonEmptyString,
    organization_guid: OrganizationGuid,
}

impl Space {
    /// Creates a space with a validated name.
    pub fn new(
        guid: SpaceGuid,
        name: impl Into<String>,
        organization_guid: OrganizationGuid,
    ) -> AppResult<Self> {
        Ok(Self {
            guid,
            name: NonEmptyString::new(name)?,
            organization_guid,
        })
    }

    /// Returns the space guid.
    #[must_use]
    pub fn guid(&self) -> SpaceGuid {
        self.guid
    }

    /// Returns the space name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the guid of the owning organization.
    #[must_use]
    pub fn organization_guid(&self) -> OrganizationGuid {
        self.organization_guid
    }
}

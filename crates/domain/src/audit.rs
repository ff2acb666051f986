use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stratus_core::AppError;

/// Space-level permission roles that can be granted to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceRole {
    /// Manages space membership and settings.
    Manager,
    /// Pushes and manages applications in the space.
    Developer,
    /// Reads space state without mutating it.
    Auditor,
}

impl SpaceRole {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Developer => "developer",
            Self::Auditor => "auditor",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[SpaceRole] = &[SpaceRole::Manager, SpaceRole::Developer, SpaceRole::Auditor];

        ALL
    }
}

impl FromStr for SpaceRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown space role value '{value}'")))
    }
}

/// Kind tag stored in `actor_type` and `actee_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSubjectKind {
    /// A platform user.
    User,
    /// A space.
    Space,
}

impl AuditSubjectKind {
    /// Returns a stable storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Space => "space",
        }
    }
}

impl FromStr for AuditSubjectKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "space" => Ok(Self::Space),
            _ => Err(AppError::Validation(format!(
                "unknown audit subject kind '{value}'"
            ))),
        }
    }
}

/// Stable audit event types recorded for space actions.
///
/// The storage value is dot-namespaced so consumers can filter a stream by
/// prefix, for example every `audit.space.` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditEventType {
    /// A space was created.
    SpaceCreate,
    /// A space was updated.
    SpaceUpdate,
    /// Deletion of a space was requested.
    SpaceDeleteRequest,
    /// A role in a space was granted to a user.
    SpaceRoleAdd(SpaceRole),
    /// A role in a space was revoked from a user.
    SpaceRoleRemove(SpaceRole),
}

impl AuditEventType {
    /// Namespace shared by every space event type.
    pub const SPACE_PREFIX: &'static str = "audit.space.";

    /// Returns a stable storage value for this event type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpaceCreate => "audit.space.create",
            Self::SpaceUpdate => "audit.space.update",
            Self::SpaceDeleteRequest => "audit.space.delete-request",
            Self::SpaceRoleAdd(SpaceRole::Manager) => "audit.space.manager.add",
            Self::SpaceRoleAdd(SpaceRole::Developer) => "audit.space.developer.add",
            Self::SpaceRoleAdd(SpaceRole::Auditor) => "audit.space.auditor.add",
            Self::SpaceRoleRemove(SpaceRole::Manager) => "audit.space.manager.remove",
            Self::SpaceRoleRemove(SpaceRole::Developer) => "audit.space.developer.remove",
            Self::SpaceRoleRemove(SpaceRole::Auditor) => "audit.space.auditor.remove",
        }
    }
}

impl Display for AuditEventType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for AuditEventType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let unknown =
            || AppError::Validation(format!("unknown audit event type '{value}'"));

        let action = value
            .strip_prefix(Self::SPACE_PREFIX)
            .ok_or_else(unknown)?;

        match action {
            "create" => return Ok(Self::SpaceCreate),
            "update" => return Ok(Self::SpaceUpdate),
            "delete-request" => return Ok(Self::SpaceDeleteRequest),
            _ => {}
        }

        let (role, verb) = action.split_once('.').ok_or_else(unknown)?;
        let role = SpaceRole::from_str(role).map_err(|_| unknown())?;
        match verb {
            "add" => Ok(Self::SpaceRoleAdd(role)),
            "remove" => Ok(Self::SpaceRoleRemove(role)),
            _ => Err(unknown()),
        }
    }
}

impl Serialize for AuditEventType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AuditEventType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::from_str(value.as_str()).map_err(serde::de::Error::custom)
    }
}

//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod identity;
mod space;
mod user;

pub use audit::{AuditEventType, AuditSubjectKind, SpaceRole};
pub use identity::{EventGuid, OrganizationGuid, SpaceGuid, UserGuid};
pub use space::{Organization, Space};
pub use user::User;

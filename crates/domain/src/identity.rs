//! Typed guids for every persisted entity.
//!
//! Relationships between entities are expressed with these identifiers rather
//! than with loaded references, so a foreign key always names its target kind.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stratus_core::AppError;
use uuid::Uuid;

macro_rules! guid_type {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
            #[must_use]
            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Returns the underlying UUID value.
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
                    AppError::Validation(format!("invalid {} '{value}': {error}", $label))
                })
            }
        }
    };
}

guid_type!(
    /// Unique identifier for an organization.
    OrganizationGuid,
    "organization guid"
);

guid_type!(
    /// Unique identifier for a space.
    SpaceGuid,
    "space guid"
);

guid_type!(
    /// Unique identifier for a user.
    UserGuid,
    "user guid"
);

guid_type!(
    /// Unique identifier for a persisted audit event.
    EventGuid,
    "event guid"
);

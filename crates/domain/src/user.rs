use serde::{Deserialize, Serialize};

use crate::UserGuid;

/// Platform user acting on, or being assigned to, a space.
///
/// Display names are not part of the identity; callers pass the caller's
/// email alongside when recording audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    guid: UserGuid,
}

impl User {
    /// Creates a user reference from its guid.
    #[must_use]
    pub fn new(guid: UserGuid) -> Self {
        Self { guid }
    }

    /// Returns the user guid.
    #[must_use]
    pub fn guid(&self) -> UserGuid {
        self.guid
    }
}

use std::sync::Arc;

use stratus_core::{AppError, AppResult};
use stratus_domain::EventGuid;

use crate::{AuditEvent, AuditEventQuery, AuditEventRepository};

/// Read-side access to recorded audit events.
#[derive(Clone)]
pub struct AuditEventQueryService {
    repository: Arc<dyn AuditEventRepository>,
}

impl AuditEventQueryService {
    /// Creates a service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuditEventRepository>) -> Self {
        Self { repository }
    }

    /// Reloads a single event.
    pub async fn find_event(&self, guid: EventGuid) -> AppResult<Option<AuditEvent>> {
        self.repository.find_event(guid).await
    }

    /// Lists events matching every filter set on `query`.
    pub async fn list_events(&self, query: AuditEventQuery) -> AppResult<Vec<AuditEvent>> {
        if query
            .type_prefix
            .as_deref()
            .is_some_and(|prefix| prefix.trim().is_empty())
        {
            return Err(AppError::Validation(
                "event type prefix must not be empty".to_owned(),
            ));
        }

        self.repository.list_events(query).await
    }
}

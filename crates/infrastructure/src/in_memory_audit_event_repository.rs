use std::sync::Arc;

use async_trait::async_trait;
use stratus_application::{
    AuditEvent, AuditEventQuery, AuditEventRepository, NewAuditEvent, SpaceRepository,
};
use stratus_core::{AppError, AppResult};
use stratus_domain::EventGuid;
use tokio::sync::RwLock;
use tracing::debug;

use crate::InMemorySpaceRepository;

#[derive(Debug, Clone)]
struct StoredEvent {
    guid: EventGuid,
    event: NewAuditEvent,
}

/// In-memory append-only audit event store.
///
/// Space relations are resolved against the shared space catalog on every
/// read, so events linked to a destroyed space come back without a space.
/// Appending an event linked to a space the catalog does not hold fails.
#[derive(Debug)]
pub struct InMemoryAuditEventRepository {
    spaces: Arc<InMemorySpaceRepository>,
    events: RwLock<Vec<StoredEvent>>,
}

impl InMemoryAuditEventRepository {
    /// Creates an empty store resolving relations against `spaces`.
    #[must_use]
    pub fn new(spaces: Arc<InMemorySpaceRepository>) -> Self {
        Self {
            spaces,
            events: RwLock::new(Vec::new()),
        }
    }

    async fn resolve(&self, stored: StoredEvent) -> AppResult<AuditEvent> {
        let space = match stored.event.space_link {
            Some(space_guid) => self.spaces.find_space(space_guid).await?,
            None => None,
        };
        let event = stored.event;

        Ok(AuditEvent {
            guid: stored.guid,
            event_type: event.event_type,
            actee: event.actee,
            actor: event.actor,
            space,
            space_guid: event.space_guid,
            organization_guid: event.organization_guid,
            metadata: event.metadata,
            timestamp: event.timestamp,
        })
    }
}

#[async_trait]
impl AuditEventRepository for InMemoryAuditEventRepository {
    async fn append_event(&self, event: NewAuditEvent) -> AppResult<AuditEvent> {
        if let Some(space_guid) = event.space_link
            && self.spaces.find_space(space_guid).await?.is_none()
        {
            return Err(AppError::Persistence(format!(
                "failed to append audit event: space '{space_guid}' does not exist"
            )));
        }

        let stored = StoredEvent {
            guid: EventGuid::new(),
            event,
        };
        self.events.write().await.push(stored.clone());

        debug!(
            event_guid = %stored.guid,
            event_type = %stored.event.event_type,
            actee = %stored.event.actee.guid,
            "appended audit event"
        );

        self.resolve(stored).await
    }

    async fn find_event(&self, guid: EventGuid) -> AppResult<Option<AuditEvent>> {
        let stored = self
            .events
            .read()
            .await
            .iter()
            .find(|stored| stored.guid == guid)
            .cloned();

        match stored {
            Some(stored) => self.resolve(stored).await.map(Some),
            None => Ok(None),
        }
    }

    async fn list_events(&self, query: AuditEventQuery) -> AppResult<Vec<AuditEvent>> {
        let mut matching: Vec<StoredEvent> = self
            .events
            .read()
            .await
            .iter()
            .filter(|stored| matches_query(&stored.event, &query))
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps.
        matching.sort_by_key(|stored| stored.event.timestamp);

        let mut events = Vec::new();
        for stored in matching
            .into_iter()
            .skip(query.bounded_offset())
            .take(query.bounded_limit())
        {
            events.push(self.resolve(stored).await?);
        }

        Ok(events)
    }
}

fn matches_query(event: &NewAuditEvent, query: &AuditEventQuery) -> bool {
    query
        .type_prefix
        .as_deref()
        .is_none_or(|prefix| event.event_type.as_str().starts_with(prefix))
        && query.actee.is_none_or(|actee| event.actee.guid == actee)
        && query.actor.is_none_or(|actor| event.actor.guid == actor)
        && query
            .space_guid
            .is_none_or(|space_guid| event.space_guid == Some(space_guid))
        && query
            .organization_guid
            .is_none_or(|organization_guid| event.organization_guid == Some(organization_guid))
}

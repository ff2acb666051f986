use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use stratus_core::AppResult;
use stratus_domain::{
    AuditEventType, AuditSubjectKind, EventGuid, OrganizationGuid, Space, SpaceGuid,
};
use uuid::Uuid;

/// Entity performing an audited action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditActor {
    /// Guid of the acting entity.
    pub guid: Uuid,
    /// Kind tag stored as `actor_type`.
    pub kind: AuditSubjectKind,
    /// Display name; absent when the caller's email is unknown.
    pub name: Option<String>,
}

/// Entity an audited action was performed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditActee {
    /// Guid of the target entity.
    pub guid: Uuid,
    /// Kind tag stored as `actee_type`.
    pub kind: AuditSubjectKind,
    /// Display name captured at recording time.
    pub name: String,
}

/// Write model for one audit event.
///
/// `space_link` is the ownership relation; `space_guid` and
/// `organization_guid` are plain denormalized columns that survive the
/// space being destroyed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEvent {
    /// Canonical event type.
    pub event_type: AuditEventType,
    /// Target of the action.
    pub actee: AuditActee,
    /// Performer of the action.
    pub actor: AuditActor,
    /// Space the event belongs to, when the relation is recorded.
    pub space_link: Option<SpaceGuid>,
    /// Denormalized space guid.
    pub space_guid: Option<SpaceGuid>,
    /// Denormalized organization guid.
    pub organization_guid: Option<OrganizationGuid>,
    /// Request parameters relevant to the action.
    pub metadata: Map<String, Value>,
    /// Instant the action was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Persisted audit event as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    /// Store-assigned event guid.
    pub guid: EventGuid,
    /// Canonical event type.
    pub event_type: AuditEventType,
    /// Target of the action.
    pub actee: AuditActee,
    /// Performer of the action.
    pub actor: AuditActor,
    /// Linked space, resolved at read time; `None` once the space is gone.
    pub space: Option<Space>,
    /// Denormalized space guid.
    pub space_guid: Option<SpaceGuid>,
    /// Denormalized organization guid.
    pub organization_guid: Option<OrganizationGuid>,
    /// Request parameters relevant to the action.
    pub metadata: Map<String, Value>,
    /// Instant the action was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Filters for audit event listing. Set filters are combined with AND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEventQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Event type prefix, such as `audit.space.`.
    pub type_prefix: Option<String>,
    /// Exact actee guid.
    pub actee: Option<Uuid>,
    /// Exact actor guid.
    pub actor: Option<Uuid>,
    /// Exact denormalized space guid.
    pub space_guid: Option<SpaceGuid>,
    /// Exact denormalized organization guid.
    pub organization_guid: Option<OrganizationGuid>,
}

impl AuditEventQuery {
    /// Largest page a store returns.
    pub const MAX_LIMIT: usize = 200;
    /// Largest offset a store honors.
    pub const MAX_OFFSET: usize = 5_000;

    /// Returns the limit clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn bounded_limit(&self) -> usize {
        self.limit.clamp(1, Self::MAX_LIMIT)
    }

    /// Returns the offset capped at `MAX_OFFSET`.
    #[must_use]
    pub fn bounded_offset(&self) -> usize {
        self.offset.min(Self::MAX_OFFSET)
    }
}

impl Default for AuditEventQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            type_prefix: None,
            actee: None,
            actor: None,
            space_guid: None,
            organization_guid: None,
        }
    }
}

/// Port for the append-only audit event store.
#[async_trait]
pub trait AuditEventRepository: Send + Sync {
    /// Persists one audit event and returns the stored record.
    ///
    /// Fails with `AppError::Persistence` when `space_link` names a space that
    /// does not exist. Events without a link are always accepted.
    async fn append_event(&self, event: NewAuditEvent) -> AppResult<AuditEvent>;

    /// Reloads one audit event by guid.
    async fn find_event(&self, guid: EventGuid) -> AppResult<Option<AuditEvent>>;

    /// Lists audit events ordered by timestamp, then insertion order.
    async fn list_events(&self, query: AuditEventQuery) -> AppResult<Vec<AuditEvent>>;
}

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgExecutor, PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use stratus_application::{
    AuditActee, AuditActor, AuditEvent, AuditEventQuery, AuditEventRepository, NewAuditEvent,
};
use stratus_core::{AppError, AppResult};
use stratus_domain::{
    AuditEventType, AuditSubjectKind, EventGuid, OrganizationGuid, Space, SpaceGuid,
};

/// PostgreSQL-backed append-only audit event store.
#[derive(Clone)]
pub struct PostgresAuditEventRepository {
    pool: PgPool,
}

impl PostgresAuditEventRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends an event inside the caller's transaction.
    ///
    /// The event becomes visible when, and only if, the caller commits.
    pub async fn append_event_in_transaction(
        &self,
        transaction: &mut Transaction<'_, Postgres>,
        event: NewAuditEvent,
    ) -> AppResult<AuditEvent> {
        insert_event(&mut **transaction, &event).await
    }
}

// Projection shared by every read. `event_row` is either the `events` table
// or the row returned by an insert.
const EVENT_PROJECTION: &str = r#"
    SELECT
        event_row.guid,
        event_row.event_type,
        event_row.actee,
        event_row.actee_type,
        event_row.actee_name,
        event_row.actor,
        event_row.actor_type,
        event_row.actor_name,
        event_row.space_guid,
        event_row.organization_guid,
        event_row.metadata,
        event_row.recorded_at,
        spaces.guid AS linked_space_guid,
        spaces.name AS linked_space_name,
        spaces.organization_guid AS linked_space_organization_guid
"#;

#[derive(Debug, FromRow)]
struct EventRow {
    guid: Uuid,
    event_type: String,
    actee: Uuid,
    actee_type: String,
    actee_name: String,
    actor: Uuid,
    actor_type: String,
    actor_name: Option<String>,
    space_guid: Option<Uuid>,
    organization_guid: Option<Uuid>,
    metadata: Value,
    recorded_at: DateTime<Utc>,
    linked_space_guid: Option<Uuid>,
    linked_space_name: Option<String>,
    linked_space_organization_guid: Option<Uuid>,
}

impl EventRow {
    fn into_event(self) -> AppResult<AuditEvent> {
        let Value::Object(metadata) = self.metadata else {
            return Err(AppError::Persistence(format!(
                "audit event '{}' has non-object metadata",
                self.guid
            )));
        };

        let space = match (
            self.linked_space_guid,
            self.linked_space_name,
            self.linked_space_organization_guid,
        ) {
            (Some(guid), Some(name), Some(organization_guid)) => Some(Space::new(
                SpaceGuid::from_uuid(guid),
                name,
                OrganizationGuid::from_uuid(organization_guid),
            )?),
            _ => None,
        };

        Ok(AuditEvent {
            guid: EventGuid::from_uuid(self.guid),
            event_type: AuditEventType::from_str(self.event_type.as_str())?,
            actee: AuditActee {
                guid: self.actee,
                kind: AuditSubjectKind::from_str(self.actee_type.as_str())?,
                name: self.actee_name,
            },
            actor: AuditActor {
                guid: self.actor,
                kind: AuditSubjectKind::from_str(self.actor_type.as_str())?,
                name: self.actor_name,
            },
            space,
            space_guid: self.space_guid.map(SpaceGuid::from_uuid),
            organization_guid: self.organization_guid.map(OrganizationGuid::from_uuid),
            metadata,
            timestamp: self.recorded_at,
        })
    }
}

async fn insert_event<'e, E>(executor: E, event: &NewAuditEvent) -> AppResult<AuditEvent>
where
    E: PgExecutor<'e>,
{
    let statement = format!(
        r#"
        WITH event_row AS (
            INSERT INTO events (
                event_type,
                actee,
                actee_type,
                actee_name,
                actor,
                actor_type,
                actor_name,
                space_id,
                space_guid,
                organization_guid,
                metadata,
                recorded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
        )
        {EVENT_PROJECTION}
        FROM event_row
        LEFT JOIN spaces ON spaces.guid = event_row.space_id
        "#
    );

    let row = sqlx::query_as::<_, EventRow>(statement.as_str())
        .bind(event.event_type.as_str())
        .bind(event.actee.guid)
        .bind(event.actee.kind.as_str())
        .bind(event.actee.name.as_str())
        .bind(event.actor.guid)
        .bind(event.actor.kind.as_str())
        .bind(event.actor.name.as_deref())
        .bind(event.space_link.map(|guid| guid.as_uuid()))
        .bind(event.space_guid.map(|guid| guid.as_uuid()))
        .bind(event.organization_guid.map(|guid| guid.as_uuid()))
        .bind(Value::Object(event.metadata.clone()))
        .bind(event.timestamp)
        .fetch_one(executor)
        .await
        .map_err(|error| {
            AppError::Persistence(format!(
                "failed to append audit event '{}': {error}",
                event.event_type
            ))
        })?;

    let event = row.into_event()?;
    debug!(
        event_guid = %event.guid,
        event_type = %event.event_type,
        actee = %event.actee.guid,
        "appended audit event"
    );

    Ok(event)
}

#[async_trait]
impl AuditEventRepository for PostgresAuditEventRepository {
    async fn append_event(&self, event: NewAuditEvent) -> AppResult<AuditEvent> {
        insert_event(&self.pool, &event).await
    }

    async fn find_event(&self, guid: EventGuid) -> AppResult<Option<AuditEvent>> {
        let statement = format!(
            r#"
            {EVENT_PROJECTION}
            FROM events AS event_row
            LEFT JOIN spaces ON spaces.guid = event_row.space_id
            WHERE event_row.guid = $1
            "#
        );

        sqlx::query_as::<_, EventRow>(statement.as_str())
            .bind(guid.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| {
                AppError::Persistence(format!("failed to find audit event '{guid}': {error}"))
            })?
            .map(EventRow::into_event)
            .transpose()
    }

    async fn list_events(&self, query: AuditEventQuery) -> AppResult<Vec<AuditEvent>> {
        let capped_limit = query.bounded_limit() as i64;
        let capped_offset = query.bounded_offset() as i64;
        let statement = format!(
            r#"
            {EVENT_PROJECTION}
            FROM events AS event_row
            LEFT JOIN spaces ON spaces.guid = event_row.space_id
            WHERE ($1::TEXT IS NULL OR starts_with(event_row.event_type, $1))
                AND ($2::UUID IS NULL OR event_row.actee = $2)
                AND ($3::UUID IS NULL OR event_row.actor = $3)
                AND ($4::UUID IS NULL OR event_row.space_guid = $4)
                AND ($5::UUID IS NULL OR event_row.organization_guid = $5)
            ORDER BY event_row.recorded_at ASC, event_row.id ASC
            LIMIT $6
            OFFSET $7
            "#
        );

        let rows = sqlx::query_as::<_, EventRow>(statement.as_str())
            .bind(query.type_prefix)
            .bind(query.actee)
            .bind(query.actor)
            .bind(query.space_guid.map(|guid| guid.as_uuid()))
            .bind(query.organization_guid.map(|guid| guid.as_uuid()))
            .bind(capped_limit)
            .bind(capped_offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Persistence(format!("failed to list audit events: {error}"))
            })?;

        rows.into_iter().map(EventRow::into_event).collect()
    }
}

use std::sync::Arc;

use serde_json::{Map, Value};
use stratus_core::{AppResult, Clock};
use stratus_domain::{AuditEventType, AuditSubjectKind, Space, SpaceRole, User};

use crate::{AuditActee, AuditActor, AuditEvent, AuditEventRepository, NewAuditEvent};

/// Records audit events for space lifecycle and space role changes.
///
/// Every `record_*` operation performs exactly one write through the
/// repository and returns the stored event. Store failures are returned
/// unchanged.
///
/// The matching `*_event` builders return the same event without writing it,
/// for callers that append inside their own transaction.
#[derive(Clone)]
pub struct SpaceEventRecorder {
    repository: Arc<dyn AuditEventRepository>,
    clock: Arc<dyn Clock>,
}

impl SpaceEventRecorder {
    /// Creates a recorder writing through `repository` and stamping events
    /// with `clock`.
    #[must_use]
    pub fn new(repository: Arc<dyn AuditEventRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Records `audit.space.create` for a newly created space.
    pub async fn record_space_create(
        &self,
        space: &Space,
        actor: &User,
        actor_name: Option<&str>,
        request_attrs: Map<String, Value>,
    ) -> AppResult<AuditEvent> {
        self.repository
            .append_event(self.space_create_event(space, actor, actor_name, request_attrs))
            .await
    }

    /// Records `audit.space.update` for a space whose attributes changed.
    pub async fn record_space_update(
        &self,
        space: &Space,
        actor: &User,
        actor_name: Option<&str>,
        request_attrs: Map<String, Value>,
    ) -> AppResult<AuditEvent> {
        self.repository
            .append_event(self.space_update_event(space, actor, actor_name, request_attrs))
            .await
    }

    /// Records `audit.space.delete-request`.
    pub async fn record_space_delete_request(
        &self,
        space: &Space,
        actor: &User,
        actor_name: Option<&str>,
        recursive: bool,
    ) -> AppResult<AuditEvent> {
        self.repository
            .append_event(self.space_delete_request_event(space, actor, actor_name, recursive))
            .await
    }

    /// Records `audit.space.<role>.add` for a role granted to `assignee`.
    pub async fn record_space_role_add(
        &self,
        space: &Space,
        assignee: &User,
        role: SpaceRole,
        actor: &User,
        actor_name: Option<&str>,
    ) -> AppResult<AuditEvent> {
        self.record_role_event(
            AuditEventType::SpaceRoleAdd(role),
            space,
            assignee,
            actor,
            actor_name,
        )
        .await
    }

    /// Records `audit.space.<role>.remove` for a role revoked from `assignee`.
    pub async fn record_space_role_remove(
        &self,
        space: &Space,
        assignee: &User,
        role: SpaceRole,
        actor: &User,
        actor_name: Option<&str>,
    ) -> AppResult<AuditEvent> {
        self.record_role_event(
            AuditEventType::SpaceRoleRemove(role),
            space,
            assignee,
            actor,
            actor_name,
        )
        .await
    }

    /// Builds the `audit.space.create` event without writing it.
    #[must_use]
    pub fn space_create_event(
        &self,
        space: &Space,
        actor: &User,
        actor_name: Option<&str>,
        request_attrs: Map<String, Value>,
    ) -> NewAuditEvent {
        self.space_event(
            AuditEventType::SpaceCreate,
            space,
            actor,
            actor_name,
            request_attrs,
        )
    }

    /// Builds the `audit.space.update` event without writing it.
    #[must_use]
    pub fn space_update_event(
        &self,
        space: &Space,
        actor: &User,
        actor_name: Option<&str>,
        request_attrs: Map<String, Value>,
    ) -> NewAuditEvent {
        self.space_event(
            AuditEventType::SpaceUpdate,
            space,
            actor,
            actor_name,
            request_attrs,
        )
    }

    /// Builds the `audit.space.delete-request` event without writing it.
    ///
    /// The space may already be destroyed, so the relation is left unset and
    /// the space and organization guids are copied from the in-memory value.
    #[must_use]
    pub fn space_delete_request_event(
        &self,
        space: &Space,
        actor: &User,
        actor_name: Option<&str>,
        recursive: bool,
    ) -> NewAuditEvent {
        let mut request = Map::new();
        request.insert("recursive".to_owned(), Value::Bool(recursive));

        NewAuditEvent {
            event_type: AuditEventType::SpaceDeleteRequest,
            actee: space_actee(space),
            actor: user_actor(actor, actor_name),
            space_link: None,
            space_guid: Some(space.guid()),
            organization_guid: Some(space.organization_guid()),
            metadata: request_metadata(request),
            timestamp: self.clock.now(),
        }
    }

    /// Builds the `audit.space.<role>.add` event without writing it.
    #[must_use]
    pub fn space_role_add_event(
        &self,
        space: &Space,
        assignee: &User,
        role: SpaceRole,
        actor: &User,
        actor_name: Option<&str>,
    ) -> NewAuditEvent {
        self.role_event(
            AuditEventType::SpaceRoleAdd(role),
            space,
            assignee,
            actor,
            actor_name,
        )
    }

    /// Builds the `audit.space.<role>.remove` event without writing it.
    #[must_use]
    pub fn space_role_remove_event(
        &self,
        space: &Space,
        assignee: &User,
        role: SpaceRole,
        actor: &User,
        actor_name: Option<&str>,
    ) -> NewAuditEvent {
        self.role_event(
            AuditEventType::SpaceRoleRemove(role),
            space,
            assignee,
            actor,
            actor_name,
        )
    }

    async fn record_role_event(
        &self,
        event_type: AuditEventType,
        space: &Space,
        assignee: &User,
        actor: &User,
        actor_name: Option<&str>,
    ) -> AppResult<AuditEvent> {
        self.repository
            .append_event(self.role_event(event_type, space, assignee, actor, actor_name))
            .await
    }

    fn space_event(
        &self,
        event_type: AuditEventType,
        space: &Space,
        actor: &User,
        actor_name: Option<&str>,
        request_attrs: Map<String, Value>,
    ) -> NewAuditEvent {
        NewAuditEvent {
            event_type,
            actee: space_actee(space),
            actor: user_actor(actor, actor_name),
            space_link: Some(space.guid()),
            space_guid: Some(space.guid()),
            organization_guid: Some(space.organization_guid()),
            metadata: request_metadata(request_attrs),
            timestamp: self.clock.now(),
        }
    }

    // Role events never resolve the assignee's display name.
    fn role_event(
        &self,
        event_type: AuditEventType,
        space: &Space,
        assignee: &User,
        actor: &User,
        actor_name: Option<&str>,
    ) -> NewAuditEvent {
        NewAuditEvent {
            event_type,
            actee: AuditActee {
                guid: assignee.guid().as_uuid(),
                kind: AuditSubjectKind::User,
                name: String::new(),
            },
            actor: user_actor(actor, actor_name),
            space_link: Some(space.guid()),
            space_guid: Some(space.guid()),
            organization_guid: Some(space.organization_guid()),
            metadata: Map::new(),
            timestamp: self.clock.now(),
        }
    }
}

fn space_actee(space: &Space) -> AuditActee {
    AuditActee {
        guid: space.guid().as_uuid(),
        kind: AuditSubjectKind::Space,
        name: space.name().to_owned(),
    }
}

fn user_actor(actor: &User, actor_name: Option<&str>) -> AuditActor {
    AuditActor {
        guid: actor.guid().as_uuid(),
        kind: AuditSubjectKind::User,
        name: actor_name.map(str::to_owned),
    }
}

fn request_metadata(request: Map<String, Value>) -> Map<String, Value> {
    let mut metadata = Map::new();
    metadata.insert("request".to_owned(), Value::Object(request));
    metadata
}

#[cfg(test)]
mod tests;

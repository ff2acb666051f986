use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;

use stratus_core::{AppError, AppResult, FixedClock};
use stratus_domain::{
    AuditEventType, AuditSubjectKind, EventGuid, OrganizationGuid, Space, SpaceGuid, SpaceRole,
    User, UserGuid,
};

use crate::{AuditEvent, AuditEventQuery, AuditEventRepository, NewAuditEvent};

use super::SpaceEventRecorder;

#[derive(Default)]
struct FakeAuditEventRepository {
    spaces: Mutex<HashMap<SpaceGuid, Space>>,
    events: Mutex<Vec<(EventGuid, NewAuditEvent)>>,
}

impl FakeAuditEventRepository {
    async fn insert_space(&self, space: Space) {
        self.spaces.lock().await.insert(space.guid(), space);
    }

    async fn destroy_space(&self, guid: SpaceGuid) {
        self.spaces.lock().await.remove(&guid);
    }

    async fn resolve(&self, guid: EventGuid, event: NewAuditEvent) -> AuditEvent {
        let space = match event.space_link {
            Some(space_guid) => self.spaces.lock().await.get(&space_guid).cloned(),
            None => None,
        };

        AuditEvent {
            guid,
            event_type: event.event_type,
            actee: event.actee,
            actor: event.actor,
            space,
            space_guid: event.space_guid,
            organization_guid: event.organization_guid,
            metadata: event.metadata,
            timestamp: event.timestamp,
        }
    }

    async fn event_count(&self) -> usize {
        self.events.lock().await.len()
    }
}

#[async_trait]
impl AuditEventRepository for FakeAuditEventRepository {
    async fn append_event(&self, event: NewAuditEvent) -> AppResult<AuditEvent> {
        let guid = EventGuid::new();
        self.events.lock().await.push((guid, event.clone()));
        Ok(self.resolve(guid, event).await)
    }

    async fn find_event(&self, guid: EventGuid) -> AppResult<Option<AuditEvent>> {
        let stored = self
            .events
            .lock()
            .await
            .iter()
            .find(|(stored_guid, _)| *stored_guid == guid)
            .map(|(_, event)| event.clone());

        match stored {
            Some(event) => Ok(Some(self.resolve(guid, event).await)),
            None => Ok(None),
        }
    }

    async fn list_events(&self, _query: AuditEventQuery) -> AppResult<Vec<AuditEvent>> {
        Ok(Vec::new())
    }
}

struct FailingAuditEventRepository;

#[async_trait]
impl AuditEventRepository for FailingAuditEventRepository {
    async fn append_event(&self, _event: NewAuditEvent) -> AppResult<AuditEvent> {
        Err(AppError::Persistence("connection refused".to_owned()))
    }

    async fn find_event(&self, _guid: EventGuid) -> AppResult<Option<AuditEvent>> {
        Ok(None)
    }

    async fn list_events(&self, _query: AuditEventQuery) -> AppResult<Vec<AuditEvent>> {
        Ok(Vec::new())
    }
}

fn recorded_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 5, 4, 10, 30, 0)
        .single()
        .unwrap_or_default()
}

fn new_space(name: &str) -> Space {
    match Space::new(SpaceGuid::new(), name, OrganizationGuid::new()) {
        Ok(space) => space,
        Err(error) => panic!("failed to build space fixture: {error}"),
    }
}

fn request_attrs() -> Map<String, Value> {
    let mut attrs = Map::new();
    attrs.insert("name".to_owned(), json!("new-space"));
    attrs
}

async fn recorder_with_space(
    space: &Space,
) -> (SpaceEventRecorder, Arc<FakeAuditEventRepository>) {
    let repository = Arc::new(FakeAuditEventRepository::default());
    repository.insert_space(space.clone()).await;
    let recorder = SpaceEventRecorder::new(
        repository.clone(),
        Arc::new(FixedClock::new(recorded_at())),
    );

    (recorder, repository)
}

async fn reload(
    repository: &FakeAuditEventRepository,
    event: AppResult<AuditEvent>,
) -> AuditEvent {
    let event = match event {
        Ok(event) => event,
        Err(error) => panic!("failed to record event: {error}"),
    };

    match repository.find_event(event.guid).await {
        Ok(Some(reloaded)) => {
            assert_eq!(reloaded, event);
            reloaded
        }
        Ok(None) => panic!("recorded event {} was not stored", event.guid),
        Err(error) => panic!("failed to reload event: {error}"),
    }
}

#[tokio::test]
async fn record_space_create_captures_space_and_request() {
    let space = new_space("new-space");
    let user = User::new(UserGuid::new());
    let (recorder, repository) = recorder_with_space(&space).await;

    let event = reload(
        &repository,
        recorder
            .record_space_create(&space, &user, Some("email address"), request_attrs())
            .await,
    )
    .await;

    assert_eq!(event.space.as_ref(), Some(&space));
    assert_eq!(event.event_type, AuditEventType::SpaceCreate);
    assert_eq!(event.event_type.as_str(), "audit.space.create");
    assert_eq!(event.actee.guid, space.guid().as_uuid());
    assert_eq!(event.actee.kind, AuditSubjectKind::Space);
    assert_eq!(event.actee.name, "new-space");
    assert_eq!(event.actor.guid, user.guid().as_uuid());
    assert_eq!(event.actor.kind, AuditSubjectKind::User);
    assert_eq!(event.actor.name.as_deref(), Some("email address"));
    assert_eq!(
        Value::Object(event.metadata),
        json!({ "request": { "name": "new-space" } })
    );
    assert_eq!(event.timestamp, recorded_at());
}

#[tokio::test]
async fn record_space_create_leaves_unknown_actor_name_absent() {
    let space = new_space("new-space");
    let user = User::new(UserGuid::new());
    let (recorder, repository) = recorder_with_space(&space).await;

    let event = reload(
        &repository,
        recorder
            .record_space_create(&space, &user, None, request_attrs())
            .await,
    )
    .await;

    assert_eq!(event.actor.name, None);
}

#[tokio::test]
async fn record_space_update_uses_update_type() {
    let space = new_space("renamed-space");
    let user = User::new(UserGuid::new());
    let (recorder, repository) = recorder_with_space(&space).await;

    let event = reload(
        &repository,
        recorder
            .record_space_update(&space, &user, Some("email address"), request_attrs())
            .await,
    )
    .await;

    assert_eq!(event.space.as_ref(), Some(&space));
    assert_eq!(event.event_type.as_str(), "audit.space.update");
    assert_eq!(event.actee.guid, space.guid().as_uuid());
    assert_eq!(event.actee.kind, AuditSubjectKind::Space);
    assert_eq!(event.actee.name, "renamed-space");
    assert_eq!(event.actor.name.as_deref(), Some("email address"));
    assert_eq!(
        Value::Object(event.metadata),
        json!({ "request": { "name": "new-space" } })
    );
}

#[tokio::test]
async fn record_space_delete_request_survives_destroyed_space() {
    let space = new_space("doomed-space");
    let user = User::new(UserGuid::new());
    let (recorder, repository) = recorder_with_space(&space).await;
    repository.destroy_space(space.guid()).await;

    let event = reload(
        &repository,
        recorder
            .record_space_delete_request(&space, &user, Some("email address"), true)
            .await,
    )
    .await;

    assert_eq!(event.space, None);
    assert_eq!(event.event_type.as_str(), "audit.space.delete-request");
    assert_eq!(event.actee.guid, space.guid().as_uuid());
    assert_eq!(event.actee.kind, AuditSubjectKind::Space);
    assert_eq!(event.actee.name, "doomed-space");
    assert_eq!(event.actor.guid, user.guid().as_uuid());
    assert_eq!(event.actor.kind, AuditSubjectKind::User);
    assert_eq!(event.actor.name.as_deref(), Some("email address"));
    assert_eq!(event.space_guid, Some(space.guid()));
    assert_eq!(event.organization_guid, Some(space.organization_guid()));
    assert_eq!(
        Value::Object(event.metadata),
        json!({ "request": { "recursive": true } })
    );
}

#[tokio::test]
async fn record_space_delete_request_never_links_the_space() {
    let space = new_space("still-here");
    let user = User::new(UserGuid::new());
    let (recorder, repository) = recorder_with_space(&space).await;

    let event = reload(
        &repository,
        recorder
            .record_space_delete_request(&space, &user, None, false)
            .await,
    )
    .await;

    assert_eq!(event.space, None);
    assert_eq!(
        Value::Object(event.metadata),
        json!({ "request": { "recursive": false } })
    );
}

#[tokio::test]
async fn record_space_role_add_records_each_role() {
    let space = new_space("new-space");
    let assigner = User::new(UserGuid::new());
    let assignee = User::new(UserGuid::new());
    let (recorder, repository) = recorder_with_space(&space).await;

    for role in SpaceRole::all() {
        let event = reload(
            &repository,
            recorder
                .record_space_role_add(&space, &assignee, *role, &assigner, Some("foo@bar.com"))
                .await,
        )
        .await;

        assert_eq!(event.space.as_ref(), Some(&space));
        assert_eq!(
            event.event_type.as_str(),
            format!("audit.space.{}.add", role.as_str())
        );
        assert_eq!(event.actee.guid, assignee.guid().as_uuid());
        assert_eq!(event.actee.kind, AuditSubjectKind::User);
        assert_eq!(event.actee.name, "");
        assert_eq!(event.actor.guid, assigner.guid().as_uuid());
        assert_eq!(event.actor.kind, AuditSubjectKind::User);
        assert_eq!(event.actor.name.as_deref(), Some("foo@bar.com"));
        assert!(event.metadata.is_empty());
    }

    assert_eq!(repository.event_count().await, SpaceRole::all().len());
}

#[tokio::test]
async fn record_space_role_remove_records_each_role() {
    let space = new_space("new-space");
    let assigner = User::new(UserGuid::new());
    let assignee = User::new(UserGuid::new());
    let (recorder, repository) = recorder_with_space(&space).await;

    for role in SpaceRole::all() {
        let event = reload(
            &repository,
            recorder
                .record_space_role_remove(&space, &assignee, *role, &assigner, Some("foo@bar.com"))
                .await,
        )
        .await;

        assert_eq!(event.space.as_ref(), Some(&space));
        assert_eq!(
            event.event_type.as_str(),
            format!("audit.space.{}.remove", role.as_str())
        );
        assert_eq!(event.actee.guid, assignee.guid().as_uuid());
        assert_eq!(event.actee.kind, AuditSubjectKind::User);
        assert_eq!(event.actee.name, "");
        assert_eq!(event.actor.guid, assigner.guid().as_uuid());
        assert_eq!(event.actor.name.as_deref(), Some("foo@bar.com"));
    }
}

#[tokio::test]
async fn store_failures_propagate_unchanged() {
    let space = new_space("new-space");
    let user = User::new(UserGuid::new());
    let recorder = SpaceEventRecorder::new(
        Arc::new(FailingAuditEventRepository),
        Arc::new(FixedClock::new(recorded_at())),
    );

    let result = recorder
        .record_space_create(&space, &user, Some("email address"), request_attrs())
        .await;

    assert!(matches!(
        result,
        Err(AppError::Persistence(message)) if message == "connection refused"
    ));
}

#[tokio::test]
async fn event_builders_match_what_recording_writes() {
    let space = new_space("new-space");
    let assigner = User::new(UserGuid::new());
    let assignee = User::new(UserGuid::new());
    let (recorder, repository) = recorder_with_space(&space).await;

    let built = vec![
        recorder.space_create_event(&space, &assigner, Some("email address"), request_attrs()),
        recorder.space_update_event(&space, &assigner, None, request_attrs()),
        recorder.space_delete_request_event(&space, &assigner, Some("email address"), true),
        recorder.space_role_add_event(&space, &assignee, SpaceRole::Manager, &assigner, None),
        recorder.space_role_remove_event(
            &space,
            &assignee,
            SpaceRole::Auditor,
            &assigner,
            Some("foo@bar.com"),
        ),
    ];

    let results = vec![
        recorder
            .record_space_create(&space, &assigner, Some("email address"), request_attrs())
            .await,
        recorder
            .record_space_update(&space, &assigner, None, request_attrs())
            .await,
        recorder
            .record_space_delete_request(&space, &assigner, Some("email address"), true)
            .await,
        recorder
            .record_space_role_add(&space, &assignee, SpaceRole::Manager, &assigner, None)
            .await,
        recorder
            .record_space_role_remove(
                &space,
                &assignee,
                SpaceRole::Auditor,
                &assigner,
                Some("foo@bar.com"),
            )
            .await,
    ];
    assert!(results.iter().all(Result::is_ok));

    let stored: Vec<NewAuditEvent> = repository
        .events
        .lock()
        .await
        .iter()
        .map(|(_, event)| event.clone())
        .collect();
    assert_eq!(stored, built);

    assert_eq!(built[2].space_link, None);
    assert_eq!(built[3].actee.name, "");
    assert!(built[4].metadata.is_empty());
}

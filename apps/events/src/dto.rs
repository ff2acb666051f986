use serde::Serialize;
use serde_json::{Map, Value};
use stratus_application::AuditEvent;

/// JSON line representation of one stored audit event.
#[derive(Debug, Serialize)]
pub struct AuditEventResponse {
    pub guid: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub actee: String,
    pub actee_type: String,
    pub actee_name: String,
    pub actor: String,
    pub actor_type: String,
    pub actor_name: Option<String>,
    pub space_guid: Option<String>,
    pub organization_guid: Option<String>,
    pub space_exists: bool,
    pub metadata: Map<String, Value>,
    pub timestamp: String,
}

impl From<AuditEvent> for AuditEventResponse {
    fn from(event: AuditEvent) -> Self {
        Self {
            guid: event.guid.to_string(),
            event_type: event.event_type.as_str().to_owned(),
            actee: event.actee.guid.to_string(),
            actee_type: event.actee.kind.as_str().to_owned(),
            actee_name: event.actee.name,
            actor: event.actor.guid.to_string(),
            actor_type: event.actor.kind.as_str().to_owned(),
            actor_name: event.actor.name,
            space_guid: event.space_guid.map(|guid| guid.to_string()),
            organization_guid: event.organization_guid.map(|guid| guid.to_string()),
            space_exists: event.space.is_some(),
            metadata: event.metadata,
            timestamp: event
                .timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
        }
    }
}

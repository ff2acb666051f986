//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_event_ports;
mod audit_event_query_service;
mod space_event_recorder;
mod space_ports;

pub use audit_event_ports::{
    AuditActee, AuditActor, AuditEvent, AuditEventQuery, AuditEventRepository, NewAuditEvent,
};
pub use audit_event_query_service::AuditEventQueryService;
pub use space_event_recorder::SpaceEventRecorder;
pub use space_ports::SpaceRepository;

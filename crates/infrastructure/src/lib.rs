//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_audit_event_repository;
mod in_memory_space_repository;
mod postgres_audit_event_repository;
mod postgres_space_repository;

pub use in_memory_audit_event_repository::InMemoryAuditEventRepository;
pub use in_memory_space_repository::InMemorySpaceRepository;
pub use postgres_audit_event_repository::PostgresAuditEventRepository;
pub use postgres_space_repository::PostgresSpaceRepository;

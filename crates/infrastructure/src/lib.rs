//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_audit_repository;
mod in_memory_notification_repository;
mod in_memory_store;
mod seed;

pub use in_memory_audit_repository::{InMemoryAuditRepository, RecordedAuditEvent};
pub use in_memory_notification_repository::InMemoryNotificationRepository;
pub use in_memory_store::InMemoryStore;
pub use seed::StoreSeed;

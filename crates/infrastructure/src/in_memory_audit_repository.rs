use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;

use warden_application::{AuditEvent, AuditRepository};
use warden_core::AppResult;

/// Audit event with the time it was appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAuditEvent {
    /// Event payload.
    pub event: AuditEvent,
    /// Append timestamp.
    pub recorded_at: DateTime<Utc>,
}

/// Append-only audit repository kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryAuditRepository {
    events: RwLock<Vec<RecordedAuditEvent>>,
}

impl InMemoryAuditRepository {
    /// Creates an empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all events in append order.
    pub async fn events(&self) -> Vec<RecordedAuditEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        info!(
            actor = %event.actor,
            action = event.action.as_str(),
            resource_type = %event.resource_type,
            resource_id = %event.resource_id,
            "audit event"
        );

        self.events.write().await.push(RecordedAuditEvent {
            event,
            recorded_at: Utc::now(),
        });
        Ok(())
    }
}

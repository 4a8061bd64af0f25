use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use warden_application::{
    NewNotification, NotificationPage, NotificationQuery, NotificationRepository,
};
use warden_core::{AppError, AppResult, NotificationId, UserId};
use warden_domain::Notification;

/// Notification store kept in process memory, in creation order.
#[derive(Debug, Default)]
pub struct InMemoryNotificationRepository {
    notifications: RwLock<Vec<Notification>>,
}

impl InMemoryNotificationRepository {
    /// Creates an empty notification store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn create_notifications(
        &self,
        notifications: Vec<NewNotification>,
    ) -> AppResult<Vec<Notification>> {
        let now = Utc::now();
        let created: Vec<Notification> = notifications
            .into_iter()
            .map(|notification| Notification {
                id: NotificationId::generate(),
                recipient_id: notification.recipient_id,
                actor_id: notification.actor_id,
                kind: notification.kind,
                entity_type: notification.entity_type,
                entity_id: notification.entity_id,
                team_id: notification.team_id,
                message: notification.message,
                is_read: false,
                created_at: now,
                updated_at: now,
            })
            .collect();

        for notification in &created {
            debug!(
                recipient = %notification.recipient_id,
                kind = notification.kind.as_str(),
                "notification stored"
            );
        }

        self.notifications.write().await.extend(created.clone());
        Ok(created)
    }

    async fn list_notifications(
        &self,
        recipient_id: &UserId,
        query: NotificationQuery,
    ) -> AppResult<NotificationPage> {
        let notifications = self.notifications.read().await;
        let received: Vec<&Notification> = notifications
            .iter()
            .rev()
            .filter(|notification| &notification.recipient_id == recipient_id)
            .collect();

        let unread_count = received
            .iter()
            .filter(|notification| !notification.is_read)
            .count();
        let matching: Vec<&Notification> = received
            .into_iter()
            .filter(|notification| !query.unread_only || !notification.is_read)
            .collect();

        Ok(NotificationPage {
            total: matching.len(),
            unread_count,
            notifications: matching
                .into_iter()
                .skip(query.offset)
                .take(query.limit.unwrap_or(usize::MAX))
                .cloned()
                .collect(),
        })
    }

    async fn mark_read(
        &self,
        notification_id: &NotificationId,
        recipient_id: &UserId,
    ) -> AppResult<Notification> {
        let mut notifications = self.notifications.write().await;
        let notification = notifications
            .iter_mut()
            .find(|notification| {
                &notification.id == notification_id && &notification.recipient_id == recipient_id
            })
            .ok_or_else(|| {
                AppError::NotFound(format!("notification '{notification_id}' does not exist"))
            })?;

        notification.mark_read(Utc::now());
        Ok(notification.clone())
    }

    async fn mark_all_read(&self, recipient_id: &UserId) -> AppResult<usize> {
        let now = Utc::now();
        let changed = self
            .notifications
            .write()
            .await
            .iter_mut()
            .filter(|notification| &notification.recipient_id == recipient_id)
            .map(|notification| notification.mark_read(now))
            .filter(|changed| *changed)
            .count();

        Ok(changed)
    }
}

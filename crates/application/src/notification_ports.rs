use async_trait::async_trait;
use warden_core::{AppResult, NotificationId, TeamId, UserId};
use warden_domain::{Notification, NotificationKind};

/// Notification to be stored for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    /// User the notification is addressed to.
    pub recipient_id: UserId,
    /// User whose action triggered it.
    pub actor_id: Option<UserId>,
    /// Reported event.
    pub kind: NotificationKind,
    /// Label of the affected entity type.
    pub entity_type: Option<String>,
    /// Identifier of the affected entity.
    pub entity_id: Option<String>,
    /// Team the event happened in.
    pub team_id: Option<TeamId>,
    /// Human-readable message.
    pub message: Option<String>,
}

/// Paging and filtering options for a recipient's notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationQuery {
    /// Maximum number of notifications returned; `None` returns all.
    pub limit: Option<usize>,
    /// Number of matching notifications skipped.
    pub offset: usize,
    /// Only unread notifications match.
    pub unread_only: bool,
}

/// One page of a recipient's notifications, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationPage {
    /// Notifications on this page.
    pub notifications: Vec<Notification>,
    /// Matching notifications across all pages.
    pub total: usize,
    /// Unread notifications of the recipient, regardless of filters.
    pub unread_count: usize,
}

/// Repository port for in-app notifications.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Stores one notification per entry, in order.
    async fn create_notifications(
        &self,
        notifications: Vec<NewNotification>,
    ) -> AppResult<Vec<Notification>>;

    /// Lists a recipient's notifications.
    async fn list_notifications(
        &self,
        recipient_id: &UserId,
        query: NotificationQuery,
    ) -> AppResult<NotificationPage>;

    /// Marks one of the recipient's notifications as read.
    ///
    /// Fails with `NotFound` when the notification belongs to someone else.
    async fn mark_read(
        &self,
        notification_id: &NotificationId,
        recipient_id: &UserId,
    ) -> AppResult<Notification>;

    /// Marks every notification of the recipient as read; returns how many changed.
    async fn mark_all_read(&self, recipient_id: &UserId) -> AppResult<usize>;
}

use std::sync::Arc;

use tracing::warn;
use warden_core::{AppError, AppResult, NotificationId, TeamId, UserId, UserIdentity};
use warden_domain::{Notification, NotificationKind};

use crate::{
    NewNotification, NotificationPage, NotificationQuery, NotificationRepository, TeamRepository,
};

#[cfg(test)]
mod tests;

/// Event announced to every member of a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamNotice {
    /// Team whose members are notified.
    pub team_id: TeamId,
    /// User whose action triggered the notice; never notified.
    pub actor_id: UserId,
    /// Reported event.
    pub kind: NotificationKind,
    /// Label of the affected entity type.
    pub entity_type: String,
    /// Identifier of the affected entity.
    pub entity_id: String,
    /// Human-readable message.
    pub message: String,
}

/// Application service for in-app notifications and their read state.
#[derive(Clone)]
pub struct NotificationService {
    teams: Arc<dyn TeamRepository>,
    notifications: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    /// Creates a new notification service.
    #[must_use]
    pub fn new(
        teams: Arc<dyn TeamRepository>,
        notifications: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self {
            teams,
            notifications,
        }
    }

    /// Stores one notification.
    pub async fn notify(&self, notification: NewNotification) -> AppResult<Notification> {
        let mut created = self
            .notifications
            .create_notifications(vec![notification])
            .await?;

        created.pop().ok_or_else(|| {
            AppError::Internal("notification store returned nothing".to_owned())
        })
    }

    /// Notifies every team member except the actor.
    pub async fn notify_team_members(&self, notice: TeamNotice) -> AppResult<Vec<Notification>> {
        let recipients: Vec<NewNotification> = self
            .teams
            .list_members(&notice.team_id)
            .await?
            .into_iter()
            .filter(|member| member.user_id != notice.actor_id)
            .map(|member| NewNotification {
                recipient_id: member.user_id,
                actor_id: Some(notice.actor_id.clone()),
                kind: notice.kind,
                entity_type: Some(notice.entity_type.clone()),
                entity_id: Some(notice.entity_id.clone()),
                team_id: Some(notice.team_id.clone()),
                message: Some(notice.message.clone()),
            })
            .collect();

        if recipients.is_empty() {
            return Ok(Vec::new());
        }

        self.notifications.create_notifications(recipients).await
    }

    /// Announces a team event after the mutation it reports has committed.
    ///
    /// Failures are logged and never undo the mutation.
    pub async fn announce(&self, notice: TeamNotice) {
        let team_id = notice.team_id.clone();
        let kind = notice.kind;
        if let Err(error) = self.notify_team_members(notice).await {
            warn!(%team_id, kind = kind.as_str(), %error, "team notification failed");
        }
    }

    /// Delivers one notification after the mutation it reports has committed.
    pub async fn deliver(&self, notification: NewNotification) {
        let recipient_id = notification.recipient_id.clone();
        let kind = notification.kind;
        if let Err(error) = self.notify(notification).await {
            warn!(%recipient_id, kind = kind.as_str(), %error, "notification failed");
        }
    }

    /// Lists the caller's notifications, newest first.
    pub async fn user_notifications(
        &self,
        actor: &UserIdentity,
        query: NotificationQuery,
    ) -> AppResult<NotificationPage> {
        self.notifications
            .list_notifications(actor.user_id(), query)
            .await
    }

    /// Marks one of the caller's notifications as read.
    pub async fn mark_as_read(
        &self,
        actor: &UserIdentity,
        notification_id: &NotificationId,
    ) -> AppResult<Notification> {
        self.notifications
            .mark_read(notification_id, actor.user_id())
            .await
    }

    /// Marks all of the caller's notifications as read.
    pub async fn mark_all_as_read(&self, actor: &UserIdentity) -> AppResult<usize> {
        self.notifications.mark_all_read(actor.user_id()).await
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::{NotificationId, TeamId, UserId};

/// Event a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// A product was created in one of the recipient's teams.
    ProductCreated,
    /// A product was updated.
    ProductUpdated,
    /// A product was deleted.
    ProductDeleted,
    /// The recipient was invited to a team.
    UserInvited,
    /// Someone joined one of the recipient's teams.
    UserJoined,
    /// The recipient's plan changed.
    PlanChanged,
}

impl NotificationKind {
    /// Returns the stable storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProductCreated => "PRODUCT_CREATED",
            Self::ProductUpdated => "PRODUCT_UPDATED",
            Self::ProductDeleted => "PRODUCT_DELETED",
            Self::UserInvited => "USER_INVITED",
            Self::UserJoined => "USER_JOINED",
            Self::PlanChanged => "PLAN_CHANGED",
        }
    }
}

/// In-app notification addressed to one user.
///
/// Read state belongs to the recipient; nobody else can change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Stable notification identifier.
    pub id: NotificationId,
    /// User the notification is addressed to.
    pub recipient_id: UserId,
    /// User whose action triggered it, if any.
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
    /// Whether the recipient has read it.
    pub is_read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    /// Marks the notification as read; returns whether it changed.
    pub fn mark_read(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_read {
            return false;
        }

        self.is_read = true;
        self.updated_at = now;
        true
    }
}

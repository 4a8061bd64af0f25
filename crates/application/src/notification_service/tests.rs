use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use warden_core::{
    AppError, AppResult, InvitationId, NonEmptyString, NotificationId, TeamId, UserId,
    UserIdentity,
};
use warden_domain::{
    AssignableTeamRole, EmailAddress, InvitationStatus, Notification, NotificationKind, Team,
    TeamInvitation, TeamMember, TeamRole,
};

use crate::{
    NewNotification, NotificationPage, NotificationQuery, NotificationRepository, TeamRepository,
};

use super::{NotificationService, TeamNotice};

struct FakeTeamRepository {
    members: Vec<TeamMember>,
}

fn unsupported<T>() -> AppResult<T> {
    Err(AppError::Internal("not supported by fake".to_owned()))
}

#[async_trait]
impl TeamRepository for FakeTeamRepository {
    async fn create_team(&self, _name: NonEmptyString, _owner_id: &UserId) -> AppResult<Team> {
        unsupported()
    }

    async fn find_team(&self, _team_id: &TeamId) -> AppResult<Option<Team>> {
        unsupported()
    }

    async fn list_teams(&self) -> AppResult<Vec<Team>> {
        unsupported()
    }

    async fn list_teams_for_user(&self, _user_id: &UserId) -> AppResult<Vec<Team>> {
        unsupported()
    }

    async fn find_member(
        &self,
        team_id: &TeamId,
        user_id: &UserId,
    ) -> AppResult<Option<TeamMember>> {
        Ok(self
            .members
            .iter()
            .find(|member| &member.team_id == team_id && &member.user_id == user_id)
            .cloned())
    }

    async fn list_members(&self, team_id: &TeamId) -> AppResult<Vec<TeamMember>> {
        Ok(self
            .members
            .iter()
            .filter(|member| &member.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn update_member_role(
        &self,
        _team_id: &TeamId,
        _user_id: &UserId,
        _role: AssignableTeamRole,
    ) -> AppResult<TeamMember> {
        unsupported()
    }

    async fn remove_member(&self, _team_id: &TeamId, _user_id: &UserId) -> AppResult<()> {
        unsupported()
    }

    async fn create_invitation(
        &self,
        _team_id: &TeamId,
        _email: EmailAddress,
        _role: AssignableTeamRole,
    ) -> AppResult<TeamInvitation> {
        unsupported()
    }

    async fn find_invitation(
        &self,
        _invitation_id: &InvitationId,
    ) -> AppResult<Option<TeamInvitation>> {
        unsupported()
    }

    async fn list_invitations(
        &self,
        _team_id: &TeamId,
        _status: Option<InvitationStatus>,
    ) -> AppResult<Vec<TeamInvitation>> {
        unsupported()
    }

    async fn accept_invitation(
        &self,
        _invitation_id: &InvitationId,
        _user_id: &UserId,
    ) -> AppResult<TeamMember> {
        unsupported()
    }

    async fn decline_invitation(
        &self,
        _invitation_id: &InvitationId,
    ) -> AppResult<TeamInvitation> {
        unsupported()
    }
}

#[derive(Default)]
struct FakeNotificationRepository {
    unavailable: bool,
    notifications: Mutex<Vec<Notification>>,
}

#[async_trait]
impl NotificationRepository for FakeNotificationRepository {
    async fn create_notifications(
        &self,
        notifications: Vec<NewNotification>,
    ) -> AppResult<Vec<Notification>> {
        if self.unavailable {
            return Err(AppError::Internal("notification store unavailable".to_owned()));
        }

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
        self.notifications.lock().await.extend(created.clone());
        Ok(created)
    }

    async fn list_notifications(
        &self,
        recipient_id: &UserId,
        _query: NotificationQuery,
    ) -> AppResult<NotificationPage> {
        let notifications: Vec<Notification> = self
            .notifications
            .lock()
            .await
            .iter()
            .filter(|notification| &notification.recipient_id == recipient_id)
            .cloned()
            .collect();

        Ok(NotificationPage {
            total: notifications.len(),
            unread_count: notifications.iter().filter(|item| !item.is_read).count(),
            notifications,
        })
    }

    async fn mark_read(
        &self,
        _notification_id: &NotificationId,
        _recipient_id: &UserId,
    ) -> AppResult<Notification> {
        unsupported()
    }

    async fn mark_all_read(&self, _recipient_id: &UserId) -> AppResult<usize> {
        unsupported()
    }
}

fn user_id(value: &str) -> UserId {
    UserId::new(value).unwrap_or_else(|_| unreachable!())
}

fn team_id() -> TeamId {
    TeamId::new("team-1").unwrap_or_else(|_| unreachable!())
}

fn member(user: &str, role: TeamRole) -> TeamMember {
    TeamMember {
        team_id: team_id(),
        user_id: user_id(user),
        role,
        joined_at: Utc::now(),
    }
}

fn service(
    members: Vec<TeamMember>,
    notifications: Arc<FakeNotificationRepository>,
) -> NotificationService {
    NotificationService::new(Arc::new(FakeTeamRepository { members }), notifications)
}

fn notice(actor: &str) -> TeamNotice {
    TeamNotice {
        team_id: team_id(),
        actor_id: user_id(actor),
        kind: NotificationKind::ProductCreated,
        entity_type: "product".to_owned(),
        entity_id: "p-1".to_owned(),
        message: "new product".to_owned(),
    }
}

#[tokio::test]
async fn team_notice_reaches_every_member_but_the_actor() {
    let notifications = Arc::new(FakeNotificationRepository::default());
    let service = service(
        vec![
            member("1", TeamRole::Owner),
            member("2", TeamRole::Admin),
            member("3", TeamRole::Member),
        ],
        notifications.clone(),
    );

    let created = service
        .notify_team_members(notice("2"))
        .await
        .unwrap_or_default();

    let recipients: Vec<&str> = created
        .iter()
        .map(|notification| notification.recipient_id.as_str())
        .collect();
    assert_eq!(recipients, vec!["1", "3"]);
    assert!(created.iter().all(|notification| {
        notification.actor_id == Some(user_id("2")) && !notification.is_read
    }));
}

#[tokio::test]
async fn actor_alone_in_team_creates_nothing() {
    let notifications = Arc::new(FakeNotificationRepository::default());
    let service = service(vec![member("1", TeamRole::Owner)], notifications.clone());

    let created = service.notify_team_members(notice("1")).await;
    assert_eq!(created.map(|items| items.len()).ok(), Some(0));
    assert!(notifications.notifications.lock().await.is_empty());
}

#[tokio::test]
async fn announcing_tolerates_store_failures() {
    let notifications = Arc::new(FakeNotificationRepository {
        unavailable: true,
        ..FakeNotificationRepository::default()
    });
    let service = service(
        vec![member("1", TeamRole::Owner), member("3", TeamRole::Member)],
        notifications.clone(),
    );

    assert!(service.notify_team_members(notice("1")).await.is_err());
    service.announce(notice("1")).await;

    let page = service
        .user_notifications(
            &UserIdentity::new(user_id("3"), "Member", None, None),
            NotificationQuery::default(),
        )
        .await
        .unwrap_or_default();
    assert_eq!(page.total, 0);
}

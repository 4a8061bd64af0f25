mod common;

use warden_application::{NotificationQuery, ProductInput};
use warden_core::{AppError, ProductId};
use warden_domain::{AssignableTeamRole, AuditAction, NotificationKind, ProductStatus, TeamRole};

use common::{Harness, actor, harness, invitation_id, plan_id, team_id, user_id};

async fn with_admin_in_team_one() -> Harness {
    let harness = harness();
    let joined = harness
        .teams
        .accept_invitation(&actor("2", None), &invitation_id("1"))
        .await;
    assert_eq!(joined.map(|member| member.role).ok(), Some(TeamRole::Admin));
    harness
}

#[tokio::test]
async fn members_cannot_change_roles() {
    let harness = with_admin_in_team_one().await;

    let result = harness
        .teams
        .change_member_role(
            &actor("3", Some("1")),
            &team_id("1"),
            &user_id("2"),
            AssignableTeamRole::Member,
        )
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(
        harness
            .teams
            .user_role_in_team(&user_id("2"), &team_id("1"))
            .await,
        Some(TeamRole::Admin)
    );
}

#[tokio::test]
async fn admin_replaces_a_member_role_directly() {
    let harness = with_admin_in_team_one().await;

    let promoted = harness
        .teams
        .change_member_role(
            &actor("2", Some("1")),
            &team_id("1"),
            &user_id("3"),
            AssignableTeamRole::Admin,
        )
        .await;
    assert_eq!(promoted.map(|member| member.role).ok(), Some(TeamRole::Admin));
    assert_eq!(
        harness
            .teams
            .user_role_in_team(&user_id("3"), &team_id("1"))
            .await,
        Some(TeamRole::Admin)
    );

    let last_action = harness
        .audit
        .events()
        .await
        .last()
        .map(|recorded| recorded.event.action);
    assert_eq!(last_action, Some(AuditAction::TeamMemberRoleChanged));
}

#[tokio::test]
async fn owner_role_cannot_be_changed() {
    let harness = with_admin_in_team_one().await;

    let result = harness
        .teams
        .change_member_role(
            &actor("2", Some("1")),
            &team_id("1"),
            &user_id("1"),
            AssignableTeamRole::Member,
        )
        .await;
    assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    assert_eq!(
        harness
            .teams
            .user_role_in_team(&user_id("1"), &team_id("1"))
            .await,
        Some(TeamRole::Owner)
    );
}

#[tokio::test]
async fn changing_a_non_member_is_not_found() {
    let harness = harness();

    let result = harness
        .teams
        .change_member_role(
            &actor("1", Some("1")),
            &team_id("1"),
            &user_id("4"),
            AssignableTeamRole::Admin,
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn product_changes_notify_other_team_members() {
    let harness = harness();
    let owner = actor("1", Some("1"));

    let updated = harness
        .products
        .update_product(
            &owner,
            &ProductId::new("1").unwrap_or_else(|_| unreachable!()),
            ProductInput {
                name: "Renomeado".to_owned(),
                description: String::new(),
                status: ProductStatus::Inactive,
            },
        )
        .await;
    assert!(updated.is_ok());

    let member_inbox = harness
        .notifications
        .user_notifications(&actor("3", None), NotificationQuery::default())
        .await
        .unwrap_or_default();
    assert_eq!(member_inbox.total, 1);
    assert_eq!(member_inbox.unread_count, 1);
    assert_eq!(
        member_inbox.notifications[0].kind,
        NotificationKind::ProductUpdated
    );
    assert_eq!(member_inbox.notifications[0].actor_id, Some(user_id("1")));

    let actor_inbox = harness
        .notifications
        .user_notifications(&owner, NotificationQuery::default())
        .await
        .unwrap_or_default();
    assert_eq!(actor_inbox.total, 0);

    let outsider_inbox = harness
        .notifications
        .user_notifications(&actor("2", None), NotificationQuery::default())
        .await
        .unwrap_or_default();
    assert_eq!(outsider_inbox.total, 0);
}

#[tokio::test]
async fn joining_notifies_the_team_and_invites_reach_registered_users() {
    let harness = harness();

    let invited = harness
        .teams
        .invite_member(
            &actor("1", Some("1")),
            &team_id("1"),
            "ana@email.com",
            AssignableTeamRole::Member,
        )
        .await;
    assert!(invited.is_ok());

    let invitee_inbox = harness
        .notifications
        .user_notifications(&actor("4", None), NotificationQuery::default())
        .await
        .unwrap_or_default();
    let kinds: Vec<NotificationKind> = invitee_inbox
        .notifications
        .iter()
        .map(|notification| notification.kind)
        .collect();
    assert_eq!(kinds, vec![NotificationKind::UserInvited]);

    let joined = harness
        .teams
        .accept_invitation(&actor("2", None), &invitation_id("1"))
        .await;
    assert!(joined.is_ok());

    for member in ["1", "3"] {
        let inbox = harness
            .notifications
            .user_notifications(&actor(member, None), NotificationQuery::default())
            .await
            .unwrap_or_default();
        assert_eq!(
            inbox.notifications.first().map(|notification| notification.kind),
            Some(NotificationKind::UserJoined)
        );
    }
}

#[tokio::test]
async fn read_state_is_tracked_per_recipient() {
    let harness = harness();
    let admin = actor("1", None);

    for plan in ["2", "3"] {
        let assigned = harness
            .plans
            .assign_user_plan(&admin, &user_id("3"), &plan_id(plan))
            .await;
        assert!(assigned.is_ok());
    }

    let recipient = actor("3", None);
    let inbox = harness
        .notifications
        .user_notifications(&recipient, NotificationQuery::default())
        .await
        .unwrap_or_default();
    assert_eq!(inbox.unread_count, 2);
    assert!(
        inbox
            .notifications
            .iter()
            .all(|notification| notification.kind == NotificationKind::PlanChanged)
    );

    let newest = inbox.notifications[0].id.clone();
    let foreign = harness.notifications.mark_as_read(&admin, &newest).await;
    assert!(matches!(foreign, Err(AppError::NotFound(_))));

    let read = harness.notifications.mark_as_read(&recipient, &newest).await;
    assert!(read.is_ok());
    assert_eq!(
        harness
            .notifications
            .mark_all_as_read(&recipient)
            .await
            .ok(),
        Some(1)
    );

    let unread_only = harness
        .notifications
        .user_notifications(
            &recipient,
            NotificationQuery {
                unread_only: true,
                ..NotificationQuery::default()
            },
        )
        .await
        .unwrap_or_default();
    assert_eq!(unread_only.total, 0);
    assert_eq!(unread_only.unread_count, 0);
}

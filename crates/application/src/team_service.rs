use std::sync::Arc;

use tracing::warn;
use warden_core::{AppError, AppResult, InvitationId, NonEmptyString, TeamId, UserId, UserIdentity};
use warden_domain::{
    AssignableTeamRole, AuditAction, EmailAddress, InvitationStatus, NotificationKind, Team,
    TeamAccess, TeamInvitation, TeamMember, TeamRole, User,
};

use crate::{
    AuditEvent, AuditRepository, NewNotification, NotificationService, TeamNotice,
    TeamRepository, UserRepository,
};

/// Application service for team membership, invitations and team-scoped gates.
#[derive(Clone)]
pub struct TeamService {
    users: Arc<dyn UserRepository>,
    teams: Arc<dyn TeamRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    notification_service: NotificationService,
}

impl TeamService {
    /// Creates a new team service from required dependencies.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        teams: Arc<dyn TeamRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            users,
            teams,
            audit_repository,
            notification_service,
        }
    }

    /// Returns the user's role in the team, or `None` for non-members.
    ///
    /// Storage failures are logged and treated as non-membership.
    pub async fn user_role_in_team(&self, user_id: &UserId, team_id: &TeamId) -> Option<TeamRole> {
        match self.teams.find_member(team_id, user_id).await {
            Ok(member) => member.map(|member| member.role),
            Err(error) => {
                warn!(%user_id, %team_id, %error, "team role resolution failed; treating as outsider");
                None
            }
        }
    }

    /// Resolves the team-scoped capability gates for the user.
    pub async fn team_access(&self, user_id: &UserId, team_id: &TeamId) -> TeamAccess {
        TeamAccess::from(self.user_role_in_team(user_id, team_id).await)
    }

    /// Creates a team owned by the caller.
    pub async fn create_team(&self, actor: &UserIdentity, name: &str) -> AppResult<Team> {
        let name = NonEmptyString::new(name.trim())?;
        self.require_user(actor.user_id()).await?;

        let team = self.teams.create_team(name, actor.user_id()).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.user_id().clone(),
                team_id: Some(team.id.clone()),
                action: AuditAction::TeamCreated,
                resource_type: "team".to_owned(),
                resource_id: team.id.to_string(),
                detail: Some(format!("created team '{}'", team.name)),
            })
            .await?;

        Ok(team)
    }

    /// Lists the teams the caller belongs to.
    pub async fn list_user_teams(&self, actor: &UserIdentity) -> AppResult<Vec<Team>> {
        self.teams.list_teams_for_user(actor.user_id()).await
    }

    /// Lists team members; the caller must be a member.
    pub async fn list_members(
        &self,
        actor: &UserIdentity,
        team_id: &TeamId,
    ) -> AppResult<Vec<TeamMember>> {
        self.require_membership(actor, team_id).await?;
        self.teams.list_members(team_id).await
    }

    /// Lists pending invitations; the caller must be a member.
    pub async fn list_pending_invitations(
        &self,
        actor: &UserIdentity,
        team_id: &TeamId,
    ) -> AppResult<Vec<TeamInvitation>> {
        self.require_membership(actor, team_id).await?;
        self.teams
            .list_invitations(team_id, Some(InvitationStatus::Pending))
            .await
    }

    /// Invites an email address to the team.
    pub async fn invite_member(
        &self,
        actor: &UserIdentity,
        team_id: &TeamId,
        email: &str,
        role: AssignableTeamRole,
    ) -> AppResult<TeamInvitation> {
        let access = self.require_membership(actor, team_id).await?;
        if !access.can_invite_members() {
            return Err(AppError::Forbidden(format!(
                "user '{}' may not invite members to team '{team_id}'",
                actor.user_id()
            )));
        }

        let email = EmailAddress::new(email)?;
        let invitee = self.users.find_user_by_email(&email).await?;
        if let Some(existing) = &invitee
            && self.teams.find_member(team_id, &existing.id).await?.is_some()
        {
            return Err(AppError::Conflict(format!(
                "'{email}' is already a member of team '{team_id}'"
            )));
        }

        let invitation = self.teams.create_invitation(team_id, email, role).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.user_id().clone(),
                team_id: Some(team_id.clone()),
                action: AuditAction::TeamMemberInvited,
                resource_type: "team_invitation".to_owned(),
                resource_id: invitation.id().to_string(),
                detail: Some(format!(
                    "invited '{}' as {}",
                    invitation.email(),
                    TeamRole::from(invitation.role())
                )),
            })
            .await?;

        if let Some(invitee) = invitee {
            self.notification_service
                .deliver(NewNotification {
                    recipient_id: invitee.id,
                    actor_id: Some(actor.user_id().clone()),
                    kind: NotificationKind::UserInvited,
                    entity_type: Some("team_invitation".to_owned()),
                    entity_id: Some(invitation.id().to_string()),
                    team_id: Some(team_id.clone()),
                    message: Some(format!(
                        "you were invited to join team '{team_id}' as {}",
                        TeamRole::from(invitation.role())
                    )),
                })
                .await;
        }

        Ok(invitation)
    }

    /// Accepts an invitation addressed to the caller.
    pub async fn accept_invitation(
        &self,
        actor: &UserIdentity,
        invitation_id: &InvitationId,
    ) -> AppResult<TeamMember> {
        let invitation = self.invitation_for_actor(actor, invitation_id).await?;
        let member = self
            .teams
            .accept_invitation(invitation.id(), actor.user_id())
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.user_id().clone(),
                team_id: Some(member.team_id.clone()),
                action: AuditAction::TeamInvitationAccepted,
                resource_type: "team_invitation".to_owned(),
                resource_id: invitation_id.to_string(),
                detail: Some(format!("joined as {}", member.role)),
            })
            .await?;

        self.notification_service
            .announce(TeamNotice {
                team_id: member.team_id.clone(),
                actor_id: actor.user_id().clone(),
                kind: NotificationKind::UserJoined,
                entity_type: "user".to_owned(),
                entity_id: actor.user_id().to_string(),
                message: format!("{} joined the team as {}", actor.display_name(), member.role),
            })
            .await;

        Ok(member)
    }

    /// Declines an invitation addressed to the caller.
    pub async fn decline_invitation(
        &self,
        actor: &UserIdentity,
        invitation_id: &InvitationId,
    ) -> AppResult<TeamInvitation> {
        let invitation = self.invitation_for_actor(actor, invitation_id).await?;
        let declined = self.teams.decline_invitation(invitation.id()).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.user_id().clone(),
                team_id: Some(declined.team_id().clone()),
                action: AuditAction::TeamInvitationDeclined,
                resource_type: "team_invitation".to_owned(),
                resource_id: invitation_id.to_string(),
                detail: None,
            })
            .await?;

        Ok(declined)
    }

    /// Replaces another member's role.
    pub async fn change_member_role(
        &self,
        actor: &UserIdentity,
        team_id: &TeamId,
        user_id: &UserId,
        role: AssignableTeamRole,
    ) -> AppResult<TeamMember> {
        let access = self.require_membership(actor, team_id).await?;
        if !access.can_manage_members() {
            return Err(AppError::Forbidden(format!(
                "user '{}' may not manage members of team '{team_id}'",
                actor.user_id()
            )));
        }

        let target = self.require_member(team_id, user_id).await?;
        if target.role == TeamRole::Owner {
            return Err(AppError::InvalidTransition(format!(
                "the owner of team '{team_id}' cannot change role"
            )));
        }

        let member = self.teams.update_member_role(team_id, user_id, role).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.user_id().clone(),
                team_id: Some(team_id.clone()),
                action: AuditAction::TeamMemberRoleChanged,
                resource_type: "team_member".to_owned(),
                resource_id: format!("{team_id}:{user_id}"),
                detail: Some(format!("{} -> {}", target.role, member.role)),
            })
            .await?;

        Ok(member)
    }

    /// Removes a member from the team; the owner can never be removed.
    pub async fn remove_member(
        &self,
        actor: &UserIdentity,
        team_id: &TeamId,
        user_id: &UserId,
    ) -> AppResult<()> {
        let access = self.require_membership(actor, team_id).await?;
        if !access.can_remove_members() {
            return Err(AppError::Forbidden(format!(
                "user '{}' may not remove members of team '{team_id}'",
                actor.user_id()
            )));
        }

        let target = self.require_member(team_id, user_id).await?;
        if target.role == TeamRole::Owner {
            return Err(AppError::InvalidTransition(format!(
                "the owner of team '{team_id}' cannot be removed"
            )));
        }

        self.teams.remove_member(team_id, user_id).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.user_id().clone(),
                team_id: Some(team_id.clone()),
                action: AuditAction::TeamMemberRemoved,
                resource_type: "team_member".to_owned(),
                resource_id: format!("{team_id}:{user_id}"),
                detail: None,
            })
            .await
    }

    async fn require_user(&self, user_id: &UserId) -> AppResult<User> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    async fn require_member(&self, team_id: &TeamId, user_id: &UserId) -> AppResult<TeamMember> {
        self.teams.find_member(team_id, user_id).await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "user '{user_id}' is not a member of team '{team_id}'"
            ))
        })
    }

    async fn require_membership(
        &self,
        actor: &UserIdentity,
        team_id: &TeamId,
    ) -> AppResult<TeamAccess> {
        let role = self
            .teams
            .find_member(team_id, actor.user_id())
            .await?
            .map(|member| member.role);

        match role {
            Some(role) => Ok(TeamAccess::member(role)),
            None => Err(AppError::Forbidden(format!(
                "user '{}' is not a member of team '{team_id}'",
                actor.user_id()
            ))),
        }
    }

    async fn invitation_for_actor(
        &self,
        actor: &UserIdentity,
        invitation_id: &InvitationId,
    ) -> AppResult<TeamInvitation> {
        let invitation = self
            .teams
            .find_invitation(invitation_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("invitation '{invitation_id}' does not exist"))
            })?;

        let user = self.require_user(actor.user_id()).await?;
        if &user.email != invitation.email() {
            return Err(AppError::Forbidden(format!(
                "invitation '{invitation_id}' is addressed to another email"
            )));
        }

        Ok(invitation)
    }
}

use async_trait::async_trait;
use warden_core::{AppResult, InvitationId, NonEmptyString, PlanId, RoleId, TeamId, UserId};
use warden_domain::{
    AssignableTeamRole, EmailAddress, InvitationStatus, Team, TeamInvitation, TeamMember, User,
};

/// Input payload for persisting a new user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserInput {
    /// Display name.
    pub display_name: NonEmptyString,
    /// Unique email address.
    pub email: EmailAddress,
    /// Opaque credential reference.
    pub credential_ref: Option<String>,
    /// Initial global role.
    pub role_id: RoleId,
    /// Initial plan.
    pub plan_id: PlanId,
}

/// Repository port for user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by identifier.
    async fn find_user(&self, user_id: &UserId) -> AppResult<Option<User>>;

    /// Finds a user by normalized email.
    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>>;

    /// Lists all users.
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Persists a new user, rejecting a taken email with a conflict.
    async fn create_user(&self, input: NewUserInput) -> AppResult<User>;

    /// Replaces the user's global role; the role must exist.
    async fn assign_role(&self, user_id: &UserId, role_id: &RoleId) -> AppResult<User>;

    /// Replaces the user's plan; the plan must exist.
    async fn assign_plan(&self, user_id: &UserId, plan_id: &PlanId) -> AppResult<User>;
}

/// Repository port for teams, memberships and invitations.
///
/// Implementations enforce the membership invariants unconditionally: every
/// team keeps exactly one OWNER, the OWNER is never removed or demoted, and
/// invitation acceptance creates the membership and closes the invitation as
/// one unit.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Creates a team with `owner_id` as its only member and OWNER.
    async fn create_team(&self, name: NonEmptyString, owner_id: &UserId) -> AppResult<Team>;

    /// Finds a team by identifier.
    async fn find_team(&self, team_id: &TeamId) -> AppResult<Option<Team>>;

    /// Lists all teams.
    async fn list_teams(&self) -> AppResult<Vec<Team>>;

    /// Lists teams where the user is a member.
    async fn list_teams_for_user(&self, user_id: &UserId) -> AppResult<Vec<Team>>;

    /// Finds one membership.
    async fn find_member(&self, team_id: &TeamId, user_id: &UserId)
    -> AppResult<Option<TeamMember>>;

    /// Lists members of a team.
    async fn list_members(&self, team_id: &TeamId) -> AppResult<Vec<TeamMember>>;

    /// Replaces a non-owner member's role.
    async fn update_member_role(
        &self,
        team_id: &TeamId,
        user_id: &UserId,
        role: AssignableTeamRole,
    ) -> AppResult<TeamMember>;

    /// Removes a non-owner member.
    async fn remove_member(&self, team_id: &TeamId, user_id: &UserId) -> AppResult<()>;

    /// Creates a pending invitation.
    async fn create_invitation(
        &self,
        team_id: &TeamId,
        email: EmailAddress,
        role: AssignableTeamRole,
    ) -> AppResult<TeamInvitation>;

    /// Finds an invitation by identifier.
    async fn find_invitation(
        &self,
        invitation_id: &InvitationId,
    ) -> AppResult<Option<TeamInvitation>>;

    /// Lists team invitations, optionally filtered by status.
    async fn list_invitations(
        &self,
        team_id: &TeamId,
        status: Option<InvitationStatus>,
    ) -> AppResult<Vec<TeamInvitation>>;

    /// Accepts a pending invitation on behalf of `user_id`.
    async fn accept_invitation(
        &self,
        invitation_id: &InvitationId,
        user_id: &UserId,
    ) -> AppResult<TeamMember>;

    /// Declines a pending invitation.
    async fn decline_invitation(&self, invitation_id: &InvitationId)
    -> AppResult<TeamInvitation>;
}

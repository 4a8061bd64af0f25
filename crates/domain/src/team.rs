//! Teams, memberships, invitations and the team-scoped capability gates.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, InvitationId, NonEmptyString, TeamId, UserId};

use crate::EmailAddress;

/// Role held by a member inside one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamRole {
    /// Single owner of the team.
    Owner,
    /// Team administrator.
    Admin,
    /// Regular member.
    Member,
}

impl TeamRole {
    /// Returns the stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Admin => "ADMIN",
            Self::Member => "MEMBER",
        }
    }

    /// Admins and the owner may invite members.
    #[must_use]
    pub fn can_invite_members(self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Admins and the owner may change another member's role.
    #[must_use]
    pub fn can_manage_members(self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Only the owner may remove members.
    #[must_use]
    pub fn can_remove_members(self) -> bool {
        matches!(self, Self::Owner)
    }
}

impl FromStr for TeamRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "OWNER" => Ok(Self::Owner),
            "ADMIN" => Ok(Self::Admin),
            "MEMBER" => Ok(Self::Member),
            _ => Err(AppError::Validation(format!(
                "unknown team role value '{value}'"
            ))),
        }
    }
}

impl Display for TeamRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Team role that can be granted through invitations or role changes.
///
/// Ownership is never granted this way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignableTeamRole {
    /// Team administrator.
    Admin,
    /// Regular member.
    Member,
}

impl From<AssignableTeamRole> for TeamRole {
    fn from(value: AssignableTeamRole) -> Self {
        match value {
            AssignableTeamRole::Admin => Self::Admin,
            AssignableTeamRole::Member => Self::Member,
        }
    }
}

impl TryFrom<TeamRole> for AssignableTeamRole {
    type Error = AppError;

    fn try_from(value: TeamRole) -> AppResult<Self> {
        match value {
            TeamRole::Admin => Ok(Self::Admin),
            TeamRole::Member => Ok(Self::Member),
            TeamRole::Owner => Err(AppError::Validation(
                "the OWNER role cannot be assigned".to_owned(),
            )),
        }
    }
}

impl FromStr for AssignableTeamRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::try_from(TeamRole::from_str(value)?)
    }
}

/// Tenant grouping users that share business data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Stable team identifier.
    pub id: TeamId,
    /// Display name.
    pub name: NonEmptyString,
    /// The single owner, always also a member with role OWNER.
    pub owner_id: UserId,
    /// Creation timestamp.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Membership of one user in one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Team joined.
    pub team_id: TeamId,
    /// Member user.
    pub user_id: UserId,
    /// Role inside the team.
    pub role: TeamRole,
    /// Join timestamp.
    #[serde(default = "Utc::now")]
    pub joined_at: DateTime<Utc>,
}

/// Resolved position of a user relative to one team.
///
/// Capability gates are derived from the role on every call; a non-member has
/// no role and every gate is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamAccess {
    role: Option<TeamRole>,
}

impl TeamAccess {
    /// Access for a member with the given role.
    #[must_use]
    pub fn member(role: TeamRole) -> Self {
        Self { role: Some(role) }
    }

    /// Access for a user outside the team.
    #[must_use]
    pub fn outsider() -> Self {
        Self { role: None }
    }

    /// Returns the user's role in the team, `None` outside the tenant boundary.
    #[must_use]
    pub fn role(&self) -> Option<TeamRole> {
        self.role
    }

    /// Returns whether the user belongs to the team.
    #[must_use]
    pub fn is_member(&self) -> bool {
        self.role.is_some()
    }

    /// Returns whether the user may invite members.
    #[must_use]
    pub fn can_invite_members(&self) -> bool {
        self.role.is_some_and(TeamRole::can_invite_members)
    }

    /// Returns whether the user may change other members' roles.
    #[must_use]
    pub fn can_manage_members(&self) -> bool {
        self.role.is_some_and(TeamRole::can_manage_members)
    }

    /// Returns whether the user may remove members.
    #[must_use]
    pub fn can_remove_members(&self) -> bool {
        self.role.is_some_and(TeamRole::can_remove_members)
    }
}

impl From<Option<TeamRole>> for TeamAccess {
    fn from(role: Option<TeamRole>) -> Self {
        Self { role }
    }
}

/// Lifecycle state of a team invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationStatus {
    /// Awaiting a decision.
    Pending,
    /// Accepted; terminal.
    Accepted,
    /// Declined; terminal.
    Declined,
}

impl InvitationStatus {
    /// Returns the stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Declined => "DECLINED",
        }
    }

    /// Returns whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Invitation for an email address to join a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInvitation {
    id: InvitationId,
    team_id: TeamId,
    email: EmailAddress,
    role: AssignableTeamRole,
    status: InvitationStatus,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

impl TeamInvitation {
    /// Creates a pending invitation.
    #[must_use]
    pub fn new(
        id: InvitationId,
        team_id: TeamId,
        email: EmailAddress,
        role: AssignableTeamRole,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            team_id,
            email,
            role,
            status: InvitationStatus::Pending,
            created_at,
        }
    }

    /// Returns the invitation identifier.
    #[must_use]
    pub fn id(&self) -> &InvitationId {
        &self.id
    }

    /// Returns the inviting team.
    #[must_use]
    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    /// Returns the invitee email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the role granted on acceptance.
    #[must_use]
    pub fn role(&self) -> AssignableTeamRole {
        self.role
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> InvitationStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Moves a pending invitation to ACCEPTED.
    pub fn accept(&mut self) -> AppResult<()> {
        self.transition(InvitationStatus::Accepted)
    }

    /// Moves a pending invitation to DECLINED.
    pub fn decline(&mut self) -> AppResult<()> {
        self.transition(InvitationStatus::Declined)
    }

    fn transition(&mut self, next: InvitationStatus) -> AppResult<()> {
        if self.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "invitation '{}' is already {} and cannot become {}",
                self.id,
                self.status.as_str(),
                next.as_str()
            )));
        }

        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;
    use warden_core::{AppError, InvitationId, TeamId};

    use crate::EmailAddress;

    use super::{
        AssignableTeamRole, InvitationStatus, TeamAccess, TeamInvitation, TeamRole,
    };

    fn pending_invitation() -> TeamInvitation {
        TeamInvitation::new(
            InvitationId::new("inv-1").unwrap_or_else(|_| unreachable!()),
            TeamId::new("1").unwrap_or_else(|_| unreachable!()),
            EmailAddress::new("new@example.com").unwrap_or_else(|_| unreachable!()),
            AssignableTeamRole::Member,
            Utc::now(),
        )
    }

    #[test]
    fn gates_follow_team_role() {
        let owner = TeamAccess::member(TeamRole::Owner);
        let admin = TeamAccess::member(TeamRole::Admin);
        let member = TeamAccess::member(TeamRole::Member);

        assert!(owner.can_invite_members() && owner.can_manage_members());
        assert!(owner.can_remove_members());
        assert!(admin.can_invite_members() && admin.can_manage_members());
        assert!(!admin.can_remove_members());
        assert!(!member.can_invite_members());
        assert!(!member.can_manage_members());
        assert!(!member.can_remove_members());
    }

    #[test]
    fn outsiders_have_no_gates() {
        let access = TeamAccess::outsider();

        assert_eq!(access.role(), None);
        assert!(!access.is_member());
        assert!(!access.can_invite_members());
        assert!(!access.can_remove_members());
    }

    #[test]
    fn accepted_invitation_is_terminal() {
        let mut invitation = pending_invitation();
        assert!(invitation.accept().is_ok());
        assert_eq!(invitation.status(), InvitationStatus::Accepted);

        assert!(matches!(
            invitation.accept(),
            Err(AppError::InvalidTransition(_))
        ));
        assert!(matches!(
            invitation.decline(),
            Err(AppError::InvalidTransition(_))
        ));
        assert_eq!(invitation.status(), InvitationStatus::Accepted);
    }

    #[test]
    fn declined_invitation_is_terminal() {
        let mut invitation = pending_invitation();
        assert!(invitation.decline().is_ok());

        assert!(matches!(
            invitation.accept(),
            Err(AppError::InvalidTransition(_))
        ));
        assert_eq!(invitation.status(), InvitationStatus::Declined);
    }

    #[test]
    fn owner_is_not_assignable() {
        assert!(AssignableTeamRole::from_str("OWNER").is_err());
        assert_eq!(
            AssignableTeamRole::from_str("ADMIN").ok(),
            Some(AssignableTeamRole::Admin)
        );
        assert_eq!(TeamRole::from(AssignableTeamRole::Member), TeamRole::Member);
    }
}

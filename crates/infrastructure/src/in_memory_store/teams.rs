use async_trait::async_trait;
use chrono::Utc;
use warden_application::TeamRepository;
use warden_core::{AppError, AppResult, InvitationId, NonEmptyString, TeamId, UserId};
use warden_domain::{
    AssignableTeamRole, EmailAddress, InvitationStatus, Team, TeamInvitation, TeamMember, TeamRole,
};

use super::{InMemoryStore, StoreState};

impl StoreState {
    fn require_team(&self, team_id: &TeamId) -> AppResult<&Team> {
        self.teams
            .get(team_id)
            .ok_or_else(|| AppError::NotFound(format!("team '{team_id}' does not exist")))
    }

    fn require_non_owner_member(
        &mut self,
        team_id: &TeamId,
        user_id: &UserId,
    ) -> AppResult<&mut TeamMember> {
        let member = self
            .members
            .get_mut(&(team_id.clone(), user_id.clone()))
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "user '{user_id}' is not a member of team '{team_id}'"
                ))
            })?;

        if member.role == TeamRole::Owner {
            return Err(AppError::InvalidTransition(format!(
                "the owner of team '{team_id}' cannot be changed or removed"
            )));
        }

        Ok(member)
    }

    fn is_member_by_email(&self, team_id: &TeamId, email: &EmailAddress) -> bool {
        self.users
            .values()
            .filter(|user| &user.email == email)
            .any(|user| {
                self.members
                    .contains_key(&(team_id.clone(), user.id.clone()))
            })
    }
}

#[async_trait]
impl TeamRepository for InMemoryStore {
    async fn create_team(&self, name: NonEmptyString, owner_id: &UserId) -> AppResult<Team> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(owner_id) {
            return Err(AppError::NotFound(format!("user '{owner_id}' does not exist")));
        }

        let now = Utc::now();
        let team = Team {
            id: TeamId::generate(),
            name,
            owner_id: owner_id.clone(),
            created_at: now,
        };
        state.members.insert(
            (team.id.clone(), owner_id.clone()),
            TeamMember {
                team_id: team.id.clone(),
                user_id: owner_id.clone(),
                role: TeamRole::Owner,
                joined_at: now,
            },
        );
        state.teams.insert(team.id.clone(), team.clone());

        Ok(team)
    }

    async fn find_team(&self, team_id: &TeamId) -> AppResult<Option<Team>> {
        Ok(self.state.read().await.teams.get(team_id).cloned())
    }

    async fn list_teams(&self) -> AppResult<Vec<Team>> {
        Ok(self.state.read().await.teams.values().cloned().collect())
    }

    async fn list_teams_for_user(&self, user_id: &UserId) -> AppResult<Vec<Team>> {
        let state = self.state.read().await;
        Ok(state
            .members
            .values()
            .filter(|member| &member.user_id == user_id)
            .filter_map(|member| state.teams.get(&member.team_id).cloned())
            .collect())
    }

    async fn find_member(
        &self,
        team_id: &TeamId,
        user_id: &UserId,
    ) -> AppResult<Option<TeamMember>> {
        Ok(self
            .state
            .read()
            .await
            .members
            .get(&(team_id.clone(), user_id.clone()))
            .cloned())
    }

    async fn list_members(&self, team_id: &TeamId) -> AppResult<Vec<TeamMember>> {
        let state = self.state.read().await;
        state.require_team(team_id)?;

        let mut members: Vec<TeamMember> = state
            .members
            .values()
            .filter(|member| &member.team_id == team_id)
            .cloned()
            .collect();
        members.sort_by(|left, right| left.joined_at.cmp(&right.joined_at));

        Ok(members)
    }

    async fn update_member_role(
        &self,
        team_id: &TeamId,
        user_id: &UserId,
        role: AssignableTeamRole,
    ) -> AppResult<TeamMember> {
        let mut state = self.state.write().await;
        let member = state.require_non_owner_member(team_id, user_id)?;
        member.role = TeamRole::from(role);

        Ok(member.clone())
    }

    async fn remove_member(&self, team_id: &TeamId, user_id: &UserId) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_non_owner_member(team_id, user_id)?;
        state.members.remove(&(team_id.clone(), user_id.clone()));

        Ok(())
    }

    async fn create_invitation(
        &self,
        team_id: &TeamId,
        email: EmailAddress,
        role: AssignableTeamRole,
    ) -> AppResult<TeamInvitation> {
        let mut state = self.state.write().await;
        state.require_team(team_id)?;

        if state.is_member_by_email(team_id, &email) {
            return Err(AppError::Conflict(format!(
                "'{email}' is already a member of team '{team_id}'"
            )));
        }

        let already_invited = state.invitations.values().any(|invitation| {
            invitation.team_id() == team_id
                && invitation.email() == &email
                && invitation.status() == InvitationStatus::Pending
        });
        if already_invited {
            return Err(AppError::Conflict(format!(
                "'{email}' already has a pending invitation to team '{team_id}'"
            )));
        }

        let invitation = TeamInvitation::new(
            InvitationId::generate(),
            team_id.clone(),
            email,
            role,
            Utc::now(),
        );
        state
            .invitations
            .insert(invitation.id().clone(), invitation.clone());

        Ok(invitation)
    }

    async fn find_invitation(
        &self,
        invitation_id: &InvitationId,
    ) -> AppResult<Option<TeamInvitation>> {
        Ok(self
            .state
            .read()
            .await
            .invitations
            .get(invitation_id)
            .cloned())
    }

    async fn list_invitations(
        &self,
        team_id: &TeamId,
        status: Option<InvitationStatus>,
    ) -> AppResult<Vec<TeamInvitation>> {
        let state = self.state.read().await;
        state.require_team(team_id)?;

        let mut invitations: Vec<TeamInvitation> = state
            .invitations
            .values()
            .filter(|invitation| invitation.team_id() == team_id)
            .filter(|invitation| status.is_none_or(|status| invitation.status() == status))
            .cloned()
            .collect();
        invitations.sort_by(|left, right| left.created_at().cmp(&right.created_at()));

        Ok(invitations)
    }

    async fn accept_invitation(
        &self,
        invitation_id: &InvitationId,
        user_id: &UserId,
    ) -> AppResult<TeamMember> {
        let mut state = self.state.write().await;
        let mut invitation = state
            .invitations
            .get(invitation_id)
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!("invitation '{invitation_id}' does not exist"))
            })?;
        invitation.accept()?;

        let user = state
            .users
            .get(user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        if &user.email != invitation.email() {
            return Err(AppError::Forbidden(format!(
                "invitation '{invitation_id}' is addressed to another email"
            )));
        }

        let key = (invitation.team_id().clone(), user_id.clone());
        if state.members.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "user '{user_id}' is already a member of team '{}'",
                invitation.team_id()
            )));
        }

        let member = TeamMember {
            team_id: invitation.team_id().clone(),
            user_id: user_id.clone(),
            role: TeamRole::from(invitation.role()),
            joined_at: Utc::now(),
        };
        state.members.insert(key, member.clone());
        state.invitations.insert(invitation_id.clone(), invitation);

        Ok(member)
    }

    async fn decline_invitation(
        &self,
        invitation_id: &InvitationId,
    ) -> AppResult<TeamInvitation> {
        let mut state = self.state.write().await;
        let invitation = state.invitations.get_mut(invitation_id).ok_or_else(|| {
            AppError::NotFound(format!("invitation '{invitation_id}' does not exist"))
        })?;
        invitation.decline()?;

        Ok(invitation.clone())
    }
}

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use warden_core::{AppError, AppResult, NonEmptyString, PermissionId, RoleId, UserId, UserIdentity};
use warden_domain::{Action, AuditAction, Permission, Role, Subject, User};

use crate::{
    AccessControlRepository, AuditEvent, AuditRepository, AuthorizationService, CreateRoleInput,
    UpdateRoleInput, UserRepository,
};


/// User projection joined with its role for administrative listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleView {
    /// User record.
    pub user: User,
    /// Role name, absent when the role reference dangles.
    pub role_name: Option<String>,
    /// Role color, absent when the role reference dangles.
    pub role_color: Option<String>,
}

/// Application service for role and permission administration.
#[derive(Clone)]
pub struct RoleAdminService {
    authorization_service: AuthorizationService,
    access: Arc<dyn AccessControlRepository>,
    users: Arc<dyn UserRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RoleAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        access: Arc<dyn AccessControlRepository>,
        users: Arc<dyn UserRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            access,
            users,
            audit_repository,
        }
    }

    /// Returns the permission catalog.
    pub async fn list_permissions(&self, actor: &UserIdentity) -> AppResult<Vec<Permission>> {
        self.authorization_service
            .require_permission(actor, Action::Read, Subject::Role)
            .await?;

        self.access.list_permissions().await
    }

    /// Returns all roles.
    pub async fn list_roles(&self, actor: &UserIdentity) -> AppResult<Vec<Role>> {
        self.authorization_service
            .require_permission(actor, Action::Read, Subject::Role)
            .await?;

        self.access.list_roles().await
    }

    /// Creates a role and emits an audit event.
    pub async fn create_role(&self, actor: &UserIdentity, input: CreateRoleInput) -> AppResult<Role> {
        self.authorization_service
            .require_permission(actor, Action::Create, Subject::Role)
            .await?;

        let input = CreateRoleInput {
            name: NonEmptyString::new(input.name.as_str().trim())?,
            ..input
        };
        self.ensure_known_permissions(&input.permission_ids).await?;

        let role = self.access.create_role(input).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.user_id().clone(),
                team_id: None,
                action: AuditAction::RoleCreated,
                resource_type: "rbac_role".to_owned(),
                resource_id: role.id.to_string(),
                detail: Some(format!("created role '{}'", role.name)),
            })
            .await?;

        Ok(role)
    }

    /// Applies a partial role update and emits an audit event.
    pub async fn update_role(
        &self,
        actor: &UserIdentity,
        role_id: &RoleId,
        input: UpdateRoleInput,
    ) -> AppResult<Role> {
        self.authorization_service
            .require_permission(actor, Action::Update, Subject::Role)
            .await?;

        let input = UpdateRoleInput {
            name: input
                .name
                .map(|name| NonEmptyString::new(name.as_str().trim()))
                .transpose()?,
            ..input
        };
        if let Some(permission_ids) = &input.permission_ids {
            self.ensure_known_permissions(permission_ids).await?;
        }

        let role = self.access.update_role(role_id, input).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.user_id().clone(),
                team_id: None,
                action: AuditAction::RoleUpdated,
                resource_type: "rbac_role".to_owned(),
                resource_id: role.id.to_string(),
                detail: Some(format!(
                    "role '{}' now grants {} permission(s)",
                    role.name,
                    role.permission_ids.len()
                )),
            })
            .await?;

        Ok(role)
    }

    /// Deletes an unreferenced role and emits an audit event.
    pub async fn delete_role(&self, actor: &UserIdentity, role_id: &RoleId) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, Action::Delete, Subject::Role)
            .await?;

        self.access.delete_role(role_id).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.user_id().clone(),
                team_id: None,
                action: AuditAction::RoleDeleted,
                resource_type: "rbac_role".to_owned(),
                resource_id: role_id.to_string(),
                detail: None,
            })
            .await
    }

    /// Returns every user with its resolved role name and color.
    pub async fn list_users_with_roles(&self, actor: &UserIdentity) -> AppResult<Vec<UserRoleView>> {
        self.authorization_service
            .require_permission(actor, Action::Read, Subject::Role)
            .await?;

        let roles: HashMap<RoleId, Role> = self
            .access
            .list_roles()
            .await?
            .into_iter()
            .map(|role| (role.id.clone(), role))
            .collect();

        let mut users = self.users.list_users().await?;
        users.sort_by(|left, right| left.id.cmp(&right.id));

        Ok(users
            .into_iter()
            .map(|user| {
                let role = roles.get(&user.role_id);
                UserRoleView {
                    role_name: role.map(|role| role.name.to_string()),
                    role_color: role.map(|role| role.color.clone()),
                    user,
                }
            })
            .collect())
    }

    /// Assigns an existing role to a user and emits an audit event.
    pub async fn assign_user_role(
        &self,
        actor: &UserIdentity,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> AppResult<User> {
        self.authorization_service
            .require_permission(actor, Action::Update, Subject::User)
            .await?;

        let user = self.users.assign_role(user_id, role_id).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.user_id().clone(),
                team_id: None,
                action: AuditAction::UserRoleAssigned,
                resource_type: "rbac_user_role".to_owned(),
                resource_id: format!("{user_id}:{role_id}"),
                detail: Some(format!("assigned role '{role_id}' to '{user_id}'")),
            })
            .await?;

        Ok(user)
    }

    async fn ensure_known_permissions(&self, permission_ids: &BTreeSet<PermissionId>) -> AppResult<()> {
        let known: BTreeSet<PermissionId> = self
            .access
            .list_permissions()
            .await?
            .into_iter()
            .map(|permission| permission.id)
            .collect();

        match permission_ids.difference(&known).next() {
            Some(unknown) => Err(AppError::Validation(format!(
                "permission '{unknown}' does not exist"
            ))),
            None => Ok(()),
        }
    }
}

use std::collections::BTreeSet;

use async_trait::async_trait;
use warden_application::{AccessControlRepository, CreateRoleInput, UpdateRoleInput};
use warden_core::{AppError, AppResult, PermissionId, RoleId};
use warden_domain::{Permission, Role};

use super::{InMemoryStore, StoreState};

impl StoreState {
    fn ensure_permissions_exist(&self, permission_ids: &BTreeSet<PermissionId>) -> AppResult<()> {
        match permission_ids
            .iter()
            .find(|permission_id| !self.permissions.contains_key(*permission_id))
        {
            Some(unknown) => Err(AppError::Validation(format!(
                "permission '{unknown}' does not exist"
            ))),
            None => Ok(()),
        }
    }

    fn ensure_role_name_free(&self, name: &str, except: Option<&RoleId>) -> AppResult<()> {
        let taken = self
            .roles
            .values()
            .any(|role| Some(&role.id) != except && role.has_name(name));

        if taken {
            return Err(AppError::Conflict(format!(
                "a role named '{}' already exists",
                name.trim()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl AccessControlRepository for InMemoryStore {
    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        Ok(self.state.read().await.permissions.values().cloned().collect())
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        let mut roles: Vec<Role> = state.roles.values().cloned().collect();
        roles.sort_by(|left, right| left.name.as_str().cmp(right.name.as_str()));
        Ok(roles)
    }

    async fn find_role(&self, role_id: &RoleId) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(role_id).cloned())
    }

    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        let mut state = self.state.write().await;
        state.ensure_role_name_free(input.name.as_str(), None)?;
        state.ensure_permissions_exist(&input.permission_ids)?;

        let role = Role {
            id: RoleId::generate(),
            name: input.name,
            description: input.description,
            color: input.color,
            permission_ids: input.permission_ids,
        };
        state.roles.insert(role.id.clone(), role.clone());

        Ok(role)
    }

    async fn update_role(&self, role_id: &RoleId, input: UpdateRoleInput) -> AppResult<Role> {
        let mut state = self.state.write().await;
        if !state.roles.contains_key(role_id) {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }
        if let Some(name) = &input.name {
            state.ensure_role_name_free(name.as_str(), Some(role_id))?;
        }
        if let Some(permission_ids) = &input.permission_ids {
            state.ensure_permissions_exist(permission_ids)?;
        }

        let role = state
            .roles
            .get_mut(role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;
        if let Some(name) = input.name {
            role.name = name;
        }
        if let Some(description) = input.description {
            role.description = description;
        }
        if let Some(color) = input.color {
            role.color = color;
        }
        if let Some(permission_ids) = input.permission_ids {
            role.permission_ids = permission_ids;
        }

        Ok(role.clone())
    }

    async fn delete_role(&self, role_id: &RoleId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.roles.contains_key(role_id) {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        let assigned_users = state
            .users
            .values()
            .filter(|user| &user.role_id == role_id)
            .count();
        if assigned_users > 0 {
            return Err(AppError::Conflict(format!(
                "role '{role_id}' is assigned to {assigned_users} user(s) and cannot be deleted"
            )));
        }

        state.roles.remove(role_id);
        Ok(())
    }
}

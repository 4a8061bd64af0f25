use std::collections::BTreeSet;

use async_trait::async_trait;
use warden_core::{AppResult, NonEmptyString, PermissionId, RoleId};
use warden_domain::{Permission, Role};

/// Input payload for creating roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role name.
    pub name: NonEmptyString,
    /// Administrative description.
    pub description: String,
    /// Presentation color.
    pub color: String,
    /// Granted permissions; every id must exist.
    pub permission_ids: BTreeSet<PermissionId>,
}

/// Partial update for an existing role; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// New unique name.
    pub name: Option<NonEmptyString>,
    /// New description.
    pub description: Option<String>,
    /// New presentation color.
    pub color: Option<String>,
    /// Replacement permission set.
    pub permission_ids: Option<BTreeSet<PermissionId>>,
}

/// Repository port for permission and role reference data.
#[async_trait]
pub trait AccessControlRepository: Send + Sync {
    /// Lists the permission catalog.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    /// Lists all roles.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Finds a role by identifier.
    async fn find_role(&self, role_id: &RoleId) -> AppResult<Option<Role>>;

    /// Creates a role; duplicate names (ignoring case) are a conflict.
    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role>;

    /// Updates a role; renaming onto another role's name is a conflict.
    async fn update_role(&self, role_id: &RoleId, input: UpdateRoleInput) -> AppResult<Role>;

    /// Deletes a role; fails with a conflict while any user references it.
    async fn delete_role(&self, role_id: &RoleId) -> AppResult<()>;
}

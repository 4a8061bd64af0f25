use std::sync::Arc;

use tracing::{debug, warn};
use warden_core::{AppError, AppResult, UserId, UserIdentity};
use warden_domain::{Action, PermissionSet, Subject};

use crate::{AccessControlRepository, UserRepository};


/// Application service answering RBAC capability queries.
#[derive(Clone)]
pub struct AuthorizationService {
    users: Arc<dyn UserRepository>,
    access: Arc<dyn AccessControlRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from repository implementations.
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, access: Arc<dyn AccessControlRepository>) -> Self {
        Self { users, access }
    }

    /// Resolves the permissions granted through the user's role.
    ///
    /// Fails with `NotFound` when the user or its role is missing.
    pub async fn resolve_effective_permissions(&self, user_id: &UserId) -> AppResult<PermissionSet> {
        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        let role = self.access.find_role(&user.role_id).await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "role '{}' referenced by user '{user_id}' does not exist",
                user.role_id
            ))
        })?;

        let catalog = self.access.list_permissions().await?;
        Ok(PermissionSet::for_role(&role, catalog))
    }

    /// Returns the effective permissions, or the empty set when resolution fails.
    pub async fn effective_permissions(&self, user_id: &UserId) -> PermissionSet {
        match self.resolve_effective_permissions(user_id).await {
            Ok(permissions) => permissions,
            Err(error) => {
                warn!(%user_id, %error, "permission resolution failed; denying all");
                PermissionSet::empty()
            }
        }
    }

    /// Returns whether the user may perform the action on the subject.
    pub async fn user_can(&self, user_id: &UserId, action: &Action, subject: &Subject) -> bool {
        let allowed = self
            .effective_permissions(user_id)
            .await
            .allows(action, subject);

        debug!(
            %user_id,
            action = action.as_str(),
            subject = subject.as_str(),
            allowed,
            "evaluated capability"
        );

        allowed
    }

    /// Ensures the caller may perform the action on the subject.
    pub async fn require_permission(
        &self,
        actor: &UserIdentity,
        action: Action,
        subject: Subject,
    ) -> AppResult<()> {
        if self.user_can(actor.user_id(), &action, &subject).await {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{}' may not {} {}",
            actor.user_id(),
            action.as_str(),
            subject.as_str()
        )))
    }
}

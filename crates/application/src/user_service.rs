//! User registration and lookup.

use std::sync::Arc;

use tracing::info;
use warden_core::{AppError, AppResult, NonEmptyString, PlanId, RoleId, UserId};
use warden_domain::{AuditAction, EmailAddress, User};

use crate::{AuditEvent, AuditRepository, NewUserInput, PlanRepository, UserRepository};

/// Role and plan given to self-registered users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDefaults {
    /// Global role of new users.
    pub role_id: RoleId,
    /// Plan of new users that did not choose one.
    pub plan_id: PlanId,
}

/// Registration request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterParams {
    /// Display name.
    pub display_name: String,
    /// Email address, unique ignoring case.
    pub email: String,
    /// Opaque reference to credentials verified elsewhere.
    pub credential_ref: Option<String>,
    /// Plan chosen at sign-up.
    pub plan_id: Option<PlanId>,
}

/// Application service for user lifecycle operations.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    plans: Arc<dyn PlanRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    defaults: RegistrationDefaults,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        plans: Arc<dyn PlanRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        defaults: RegistrationDefaults,
    ) -> Self {
        Self {
            users,
            plans,
            audit_repository,
            defaults,
        }
    }

    /// Registers a new user with the default role.
    pub async fn register_user(&self, params: RegisterParams) -> AppResult<User> {
        let display_name = NonEmptyString::new(params.display_name.trim())?;
        let email = EmailAddress::new(params.email)?;

        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "an account already exists for '{email}'"
            )));
        }

        let plan_id = params
            .plan_id
            .unwrap_or_else(|| self.defaults.plan_id.clone());
        if self.plans.find_plan(&plan_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "plan '{plan_id}' does not exist"
            )));
        }

        let user = self
            .users
            .create_user(NewUserInput {
                display_name,
                email,
                credential_ref: params.credential_ref,
                role_id: self.defaults.role_id.clone(),
                plan_id,
            })
            .await?;

        info!(user_id = %user.id, plan_id = %user.plan_id, "registered user");

        self.audit_repository
            .append_event(AuditEvent {
                actor: user.id.clone(),
                team_id: None,
                action: AuditAction::UserRegistered,
                resource_type: "user".to_owned(),
                resource_id: user.id.to_string(),
                detail: Some(format!("registered '{}'", user.email)),
            })
            .await?;

        Ok(user)
    }

    /// Finds a user by identifier.
    pub async fn find_user(&self, user_id: &UserId) -> AppResult<Option<User>> {
        self.users.find_user(user_id).await
    }
}

use async_trait::async_trait;
use chrono::Utc;
use warden_application::{NewUserInput, UserRepository};
use warden_core::{AppError, AppResult, PlanId, RoleId, UserId};
use warden_domain::{EmailAddress, User};

use super::InMemoryStore;

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_user(&self, user_id: &UserId) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn create_user(&self, input: NewUserInput) -> AppResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|user| user.email == input.email) {
            return Err(AppError::Conflict(format!(
                "an account already exists for '{}'",
                input.email
            )));
        }
        if !state.roles.contains_key(&input.role_id) {
            return Err(AppError::Validation(format!(
                "role '{}' does not exist",
                input.role_id
            )));
        }
        if !state.plans.contains_key(&input.plan_id) {
            return Err(AppError::Validation(format!(
                "plan '{}' does not exist",
                input.plan_id
            )));
        }

        let user = User {
            id: UserId::generate(),
            display_name: input.display_name,
            email: input.email,
            credential_ref: input.credential_ref,
            role_id: input.role_id,
            plan_id: input.plan_id,
            created_at: Utc::now(),
        };
        state.users.insert(user.id.clone(), user.clone());

        Ok(user)
    }

    async fn assign_role(&self, user_id: &UserId, role_id: &RoleId) -> AppResult<User> {
        let mut state = self.state.write().await;
        if !state.roles.contains_key(role_id) {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        let user = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        user.role_id = role_id.clone();

        Ok(user.clone())
    }

    async fn assign_plan(&self, user_id: &UserId, plan_id: &PlanId) -> AppResult<User> {
        let mut state = self.state.write().await;
        if !state.plans.contains_key(plan_id) {
            return Err(AppError::NotFound(format!("plan '{plan_id}' does not exist")));
        }

        let user = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        user.plan_id = plan_id.clone();

        Ok(user.clone())
    }
}

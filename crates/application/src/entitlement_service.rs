use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::warn;
use warden_core::{AppError, AppResult, PlanId, UserId};
use warden_domain::{LimitValue, Plan};

use crate::{PlanRepository, UserRepository};

#[cfg(test)]
mod tests;

/// Read-only view of the plan backing a user's entitlements.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSnapshot {
    /// Plan identifier.
    pub id: PlanId,
    /// Display name.
    pub name: String,
    /// Price per period.
    pub price: f64,
    /// Period descriptor.
    pub price_description: String,
}

impl From<&Plan> for PlanSnapshot {
    fn from(plan: &Plan) -> Self {
        Self {
            id: plan.id.clone(),
            name: plan.name.as_str().to_owned(),
            price: plan.price,
            price_description: plan.price_description.as_str().to_owned(),
        }
    }
}

/// Feature flags and limits resolved for one user.
///
/// Anything not configured on the plan is off: unknown features are disabled
/// and unknown limits are zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entitlements {
    plan: Option<PlanSnapshot>,
    features: BTreeSet<String>,
    limits: BTreeMap<String, LimitValue>,
}

impl Entitlements {
    /// Entitlements of a user whose plan cannot be resolved.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns whether the feature is enabled.
    #[must_use]
    pub fn can(&self, feature_key: &str) -> bool {
        self.features.contains(feature_key)
    }

    /// Returns the configured limit, or zero when the plan has none.
    #[must_use]
    pub fn get_limit(&self, limit_key: &str) -> LimitValue {
        self.limits
            .get(limit_key)
            .copied()
            .unwrap_or(LimitValue::FAIL_CLOSED)
    }

    /// Returns whether one more unit fits under the limit.
    #[must_use]
    pub fn permits_usage(&self, limit_key: &str, current_usage: u64) -> bool {
        self.get_limit(limit_key).permits(current_usage)
    }

    /// Returns the resolved plan.
    #[must_use]
    pub fn current_plan(&self) -> Option<&PlanSnapshot> {
        self.plan.as_ref()
    }
}

/// Application service resolving plan-based entitlements.
#[derive(Clone)]
pub struct EntitlementService {
    users: Arc<dyn UserRepository>,
    plans: Arc<dyn PlanRepository>,
}

impl EntitlementService {
    /// Creates a new entitlement service from repository implementations.
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, plans: Arc<dyn PlanRepository>) -> Self {
        Self { users, plans }
    }

    /// Resolves the user's plan, features and limits.
    ///
    /// Fails with `NotFound` when the user or its plan is missing.
    pub async fn resolve_entitlements(&self, user_id: &UserId) -> AppResult<Entitlements> {
        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        let plan = self.plans.find_plan(&user.plan_id).await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "plan '{}' referenced by user '{user_id}' does not exist",
                user.plan_id
            ))
        })?;

        let features = self
            .plans
            .list_plan_features(&plan.id)
            .await?
            .into_iter()
            .map(|feature| String::from(feature.key))
            .collect();

        let limits = self
            .plans
            .list_plan_limits(&plan.id)
            .await?
            .into_iter()
            .map(|entry| (String::from(entry.limit.key), entry.value))
            .collect();

        Ok(Entitlements {
            plan: Some(PlanSnapshot::from(&plan)),
            features,
            limits,
        })
    }

    /// Returns the user's entitlements, or none when resolution fails.
    pub async fn entitlements_for(&self, user_id: &UserId) -> Entitlements {
        match self.resolve_entitlements(user_id).await {
            Ok(entitlements) => entitlements,
            Err(error) => {
                warn!(%user_id, %error, "entitlement resolution failed; granting nothing");
                Entitlements::none()
            }
        }
    }

    /// Returns whether the user's plan enables the feature.
    pub async fn can(&self, user_id: &UserId, feature_key: &str) -> bool {
        self.entitlements_for(user_id).await.can(feature_key)
    }

    /// Returns the user's limit for the key.
    pub async fn get_limit(&self, user_id: &UserId, limit_key: &str) -> LimitValue {
        self.entitlements_for(user_id).await.get_limit(limit_key)
    }

    /// Returns the user's plan snapshot.
    pub async fn current_plan(&self, user_id: &UserId) -> Option<PlanSnapshot> {
        self.entitlements_for(user_id).await.plan
    }

    /// Ensures one more unit fits under the user's limit.
    ///
    /// This only checks `current_usage`; usage that can change concurrently
    /// must be re-checked where it is written, as product creation does.
    pub async fn require_capacity(
        &self,
        user_id: &UserId,
        limit_key: &str,
        current_usage: u64,
    ) -> AppResult<()> {
        let limit = self.get_limit(user_id, limit_key).await;
        if limit.permits(current_usage) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "plan limit '{limit_key}' reached ({current_usage} of {limit})"
        )))
    }
}

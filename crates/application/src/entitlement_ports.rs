use std::collections::BTreeSet;

use async_trait::async_trait;
use warden_core::{AppResult, FeatureId, LimitId, NonEmptyString, PlanId};
use warden_domain::{Feature, Limit, LimitValue, Plan};

/// Input payload for creating or updating plans.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInput {
    /// Display name.
    pub name: NonEmptyString,
    /// Price per period.
    pub price: f64,
    /// Period descriptor.
    pub price_description: NonEmptyString,
    /// Optional description.
    pub description: Option<String>,
}

/// One configured limit inside a bulk replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanLimitInput {
    /// Limit being configured.
    pub limit_id: LimitId,
    /// Configured maximum.
    pub value: LimitValue,
}

/// Limit definition joined with the value configured for one plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanLimitEntry {
    /// Limit definition.
    pub limit: Limit,
    /// Configured maximum.
    pub value: LimitValue,
}

/// Repository port for plans and their entitlement associations.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Lists all plans.
    async fn list_plans(&self) -> AppResult<Vec<Plan>>;

    /// Finds a plan by identifier.
    async fn find_plan(&self, plan_id: &PlanId) -> AppResult<Option<Plan>>;

    /// Creates a plan without associations.
    async fn create_plan(&self, input: PlanInput) -> AppResult<Plan>;

    /// Replaces a plan's descriptive fields.
    async fn update_plan(&self, plan_id: &PlanId, input: PlanInput) -> AppResult<Plan>;

    /// Deletes a plan and its associations; fails while users reference it.
    async fn delete_plan(&self, plan_id: &PlanId) -> AppResult<()>;

    /// Lists the feature catalog.
    async fn list_features(&self) -> AppResult<Vec<Feature>>;

    /// Lists the limit catalog.
    async fn list_limits(&self) -> AppResult<Vec<Limit>>;

    /// Lists features enabled for a plan.
    async fn list_plan_features(&self, plan_id: &PlanId) -> AppResult<Vec<Feature>>;

    /// Lists limits configured for a plan.
    async fn list_plan_limits(&self, plan_id: &PlanId) -> AppResult<Vec<PlanLimitEntry>>;

    /// Replaces the plan's whole feature set.
    async fn replace_plan_features(
        &self,
        plan_id: &PlanId,
        feature_ids: BTreeSet<FeatureId>,
    ) -> AppResult<Vec<Feature>>;

    /// Replaces the plan's whole limit set.
    async fn replace_plan_limits(
        &self,
        plan_id: &PlanId,
        limits: Vec<PlanLimitInput>,
    ) -> AppResult<Vec<PlanLimitEntry>>;
}

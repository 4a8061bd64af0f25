use std::collections::BTreeSet;

use async_trait::async_trait;
use warden_application::{PlanInput, PlanLimitEntry, PlanLimitInput, PlanRepository};
use warden_core::{AppError, AppResult, FeatureId, PlanId};
use warden_domain::{Feature, Limit, Plan};

use super::{InMemoryStore, StoreState};

impl StoreState {
    fn require_plan(&self, plan_id: &PlanId) -> AppResult<&Plan> {
        self.plans
            .get(plan_id)
            .ok_or_else(|| AppError::NotFound(format!("plan '{plan_id}' does not exist")))
    }

    fn features_of(&self, plan_id: &PlanId) -> Vec<Feature> {
        let mut features: Vec<Feature> = self
            .plan_features
            .iter()
            .filter(|(owner, _)| owner == plan_id)
            .filter_map(|(_, feature_id)| self.features.get(feature_id).cloned())
            .collect();
        features.sort_by(|left, right| left.key.as_str().cmp(right.key.as_str()));
        features
    }

    fn limits_of(&self, plan_id: &PlanId) -> Vec<PlanLimitEntry> {
        let mut entries: Vec<PlanLimitEntry> = self
            .plan_limits
            .iter()
            .filter(|((owner, _), _)| owner == plan_id)
            .filter_map(|((_, limit_id), value)| {
                self.limits.get(limit_id).map(|limit| PlanLimitEntry {
                    limit: limit.clone(),
                    value: *value,
                })
            })
            .collect();
        entries.sort_by(|left, right| left.limit.key.as_str().cmp(right.limit.key.as_str()));
        entries
    }
}

#[async_trait]
impl PlanRepository for InMemoryStore {
    async fn list_plans(&self) -> AppResult<Vec<Plan>> {
        let state = self.state.read().await;
        let mut plans: Vec<Plan> = state.plans.values().cloned().collect();
        plans.sort_by(|left, right| left.price.total_cmp(&right.price));
        Ok(plans)
    }

    async fn find_plan(&self, plan_id: &PlanId) -> AppResult<Option<Plan>> {
        Ok(self.state.read().await.plans.get(plan_id).cloned())
    }

    async fn create_plan(&self, input: PlanInput) -> AppResult<Plan> {
        let plan = Plan {
            id: PlanId::generate(),
            name: input.name,
            price: input.price,
            price_description: input.price_description,
            description: input.description,
        };
        self.state
            .write()
            .await
            .plans
            .insert(plan.id.clone(), plan.clone());

        Ok(plan)
    }

    async fn update_plan(&self, plan_id: &PlanId, input: PlanInput) -> AppResult<Plan> {
        let mut state = self.state.write().await;
        let plan = state
            .plans
            .get_mut(plan_id)
            .ok_or_else(|| AppError::NotFound(format!("plan '{plan_id}' does not exist")))?;
        plan.name = input.name;
        plan.price = input.price;
        plan.price_description = input.price_description;
        plan.description = input.description;

        Ok(plan.clone())
    }

    async fn delete_plan(&self, plan_id: &PlanId) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_plan(plan_id)?;

        let subscribed_users = state
            .users
            .values()
            .filter(|user| &user.plan_id == plan_id)
            .count();
        if subscribed_users > 0 {
            return Err(AppError::Conflict(format!(
                "plan '{plan_id}' is used by {subscribed_users} user(s) and cannot be deleted"
            )));
        }

        state.plans.remove(plan_id);
        state.plan_features.retain(|(owner, _)| owner != plan_id);
        state.plan_limits.retain(|(owner, _), _| owner != plan_id);

        Ok(())
    }

    async fn list_features(&self) -> AppResult<Vec<Feature>> {
        Ok(self.state.read().await.features.values().cloned().collect())
    }

    async fn list_limits(&self) -> AppResult<Vec<Limit>> {
        Ok(self.state.read().await.limits.values().cloned().collect())
    }

    async fn list_plan_features(&self, plan_id: &PlanId) -> AppResult<Vec<Feature>> {
        Ok(self.state.read().await.features_of(plan_id))
    }

    async fn list_plan_limits(&self, plan_id: &PlanId) -> AppResult<Vec<PlanLimitEntry>> {
        Ok(self.state.read().await.limits_of(plan_id))
    }

    async fn replace_plan_features(
        &self,
        plan_id: &PlanId,
        feature_ids: BTreeSet<FeatureId>,
    ) -> AppResult<Vec<Feature>> {
        let mut state = self.state.write().await;
        state.require_plan(plan_id)?;
        if let Some(unknown) = feature_ids
            .iter()
            .find(|feature_id| !state.features.contains_key(*feature_id))
        {
            return Err(AppError::Validation(format!(
                "feature '{unknown}' does not exist"
            )));
        }

        state.plan_features.retain(|(owner, _)| owner != plan_id);
        state.plan_features.extend(
            feature_ids
                .into_iter()
                .map(|feature_id| (plan_id.clone(), feature_id)),
        );

        Ok(state.features_of(plan_id))
    }

    async fn replace_plan_limits(
        &self,
        plan_id: &PlanId,
        limits: Vec<PlanLimitInput>,
    ) -> AppResult<Vec<PlanLimitEntry>> {
        let mut state = self.state.write().await;
        state.require_plan(plan_id)?;

        let mut seen = BTreeSet::new();
        for limit in &limits {
            if !state.limits.contains_key(&limit.limit_id) {
                return Err(AppError::Validation(format!(
                    "limit '{}' does not exist",
                    limit.limit_id
                )));
            }
            if !seen.insert(&limit.limit_id) {
                return Err(AppError::Validation(format!(
                    "limit '{}' is configured more than once",
                    limit.limit_id
                )));
            }
        }

        state.plan_limits.retain(|(owner, _), _| owner != plan_id);
        for limit in limits {
            state
                .plan_limits
                .insert((plan_id.clone(), limit.limit_id), limit.value);
        }

        Ok(state.limits_of(plan_id))
    }
}

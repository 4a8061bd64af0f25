use std::collections::BTreeSet;
use std::sync::Arc;

use warden_core::{AppError, AppResult, FeatureId, PlanId, UserId, UserIdentity};
use warden_domain::{
    Action, AuditAction, Feature, Limit, NotificationKind, Plan, Subject, User, validate_price,
};

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, NewNotification, NotificationService,
    PlanInput, PlanLimitEntry, PlanLimitInput, PlanRepository, UserRepository,
};

/// Application service for plan, feature and limit administration.
#[derive(Clone)]
pub struct PlanAdminService {
    authorization_service: AuthorizationService,
    plans: Arc<dyn PlanRepository>,
    users: Arc<dyn UserRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    notification_service: NotificationService,
}

impl PlanAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        plans: Arc<dyn PlanRepository>,
        users: Arc<dyn UserRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            authorization_service,
            plans,
            users,
            audit_repository,
            notification_service,
        }
    }

    /// Returns all plans.
    pub async fn list_plans(&self, actor: &UserIdentity) -> AppResult<Vec<Plan>> {
        self.authorization_service
            .require_permission(actor, Action::Read, Subject::Plan)
            .await?;

        self.plans.list_plans().await
    }

    /// Creates a plan and emits an audit event.
    pub async fn create_plan(&self, actor: &UserIdentity, input: PlanInput) -> AppResult<Plan> {
        self.authorization_service
            .require_permission(actor, Action::Create, Subject::Plan)
            .await?;
        validate_price(input.price)?;

        let plan = self.plans.create_plan(input).await?;
        self.audit(
            actor,
            AuditAction::PlanCreated,
            &plan.id,
            Some(format!("created plan '{}'", plan.name)),
        )
        .await?;

        Ok(plan)
    }

    /// Replaces a plan's descriptive fields and emits an audit event.
    pub async fn update_plan(
        &self,
        actor: &UserIdentity,
        plan_id: &PlanId,
        input: PlanInput,
    ) -> AppResult<Plan> {
        self.authorization_service
            .require_permission(actor, Action::Update, Subject::Plan)
            .await?;
        validate_price(input.price)?;

        let plan = self.plans.update_plan(plan_id, input).await?;
        self.audit(
            actor,
            AuditAction::PlanUpdated,
            &plan.id,
            Some(format!("updated plan '{}'", plan.name)),
        )
        .await?;

        Ok(plan)
    }

    /// Deletes an unreferenced plan and emits an audit event.
    pub async fn delete_plan(&self, actor: &UserIdentity, plan_id: &PlanId) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, Action::Delete, Subject::Plan)
            .await?;

        self.plans.delete_plan(plan_id).await?;
        self.audit(actor, AuditAction::PlanDeleted, plan_id, None).await
    }

    /// Returns the feature catalog.
    pub async fn list_features(&self, actor: &UserIdentity) -> AppResult<Vec<Feature>> {
        self.authorization_service
            .require_permission(actor, Action::Read, Subject::Plan)
            .await?;

        self.plans.list_features().await
    }

    /// Returns the limit catalog.
    pub async fn list_limits(&self, actor: &UserIdentity) -> AppResult<Vec<Limit>> {
        self.authorization_service
            .require_permission(actor, Action::Read, Subject::Plan)
            .await?;

        self.plans.list_limits().await
    }

    /// Returns the features enabled for a plan.
    pub async fn plan_features(
        &self,
        actor: &UserIdentity,
        plan_id: &PlanId,
    ) -> AppResult<Vec<Feature>> {
        self.authorization_service
            .require_permission(actor, Action::Read, Subject::Plan)
            .await?;
        self.require_plan(plan_id).await?;

        self.plans.list_plan_features(plan_id).await
    }

    /// Returns the limits configured for a plan.
    pub async fn plan_limits(
        &self,
        actor: &UserIdentity,
        plan_id: &PlanId,
    ) -> AppResult<Vec<PlanLimitEntry>> {
        self.authorization_service
            .require_permission(actor, Action::Read, Subject::Plan)
            .await?;
        self.require_plan(plan_id).await?;

        self.plans.list_plan_limits(plan_id).await
    }

    /// Replaces the plan's whole feature set.
    pub async fn replace_plan_features(
        &self,
        actor: &UserIdentity,
        plan_id: &PlanId,
        feature_ids: Vec<FeatureId>,
    ) -> AppResult<Vec<Feature>> {
        self.authorization_service
            .require_permission(actor, Action::Update, Subject::Plan)
            .await?;

        let requested = feature_ids.len();
        let feature_ids: BTreeSet<FeatureId> = feature_ids.into_iter().collect();
        if feature_ids.len() != requested {
            return Err(AppError::Validation(
                "feature ids must not contain duplicates".to_owned(),
            ));
        }

        let features = self
            .plans
            .replace_plan_features(plan_id, feature_ids)
            .await?;
        self.audit(
            actor,
            AuditAction::PlanFeaturesReplaced,
            plan_id,
            Some(format!("{} feature(s) enabled", features.len())),
        )
        .await?;

        Ok(features)
    }

    /// Replaces the plan's whole limit set.
    pub async fn replace_plan_limits(
        &self,
        actor: &UserIdentity,
        plan_id: &PlanId,
        limits: Vec<PlanLimitInput>,
    ) -> AppResult<Vec<PlanLimitEntry>> {
        self.authorization_service
            .require_permission(actor, Action::Update, Subject::Plan)
            .await?;

        let mut seen = BTreeSet::new();
        if let Some(duplicate) = limits.iter().find(|limit| !seen.insert(&limit.limit_id)) {
            return Err(AppError::Validation(format!(
                "limit '{}' is configured more than once",
                duplicate.limit_id
            )));
        }

        let entries = self.plans.replace_plan_limits(plan_id, limits).await?;
        self.audit(
            actor,
            AuditAction::PlanLimitsReplaced,
            plan_id,
            Some(format!("{} limit(s) configured", entries.len())),
        )
        .await?;

        Ok(entries)
    }

    /// Moves a user onto an existing plan and emits an audit event.
    pub async fn assign_user_plan(
        &self,
        actor: &UserIdentity,
        user_id: &UserId,
        plan_id: &PlanId,
    ) -> AppResult<User> {
        self.authorization_service
            .require_permission(actor, Action::Update, Subject::User)
            .await?;

        let user = self.users.assign_plan(user_id, plan_id).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.user_id().clone(),
                team_id: None,
                action: AuditAction::UserPlanAssigned,
                resource_type: "user_plan".to_owned(),
                resource_id: format!("{user_id}:{plan_id}"),
                detail: Some(format!("assigned plan '{plan_id}' to '{user_id}'")),
            })
            .await?;

        self.notification_service
            .deliver(NewNotification {
                recipient_id: user.id.clone(),
                actor_id: Some(actor.user_id().clone()),
                kind: NotificationKind::PlanChanged,
                entity_type: Some("plan".to_owned()),
                entity_id: Some(plan_id.to_string()),
                team_id: None,
                message: Some(format!("your plan changed to '{plan_id}'")),
            })
            .await;

        Ok(user)
    }

    async fn require_plan(&self, plan_id: &PlanId) -> AppResult<Plan> {
        self.plans
            .find_plan(plan_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("plan '{plan_id}' does not exist")))
    }

    async fn audit(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        plan_id: &PlanId,
        detail: Option<String>,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.user_id().clone(),
                team_id: None,
                action,
                resource_type: "plan".to_owned(),
                resource_id: plan_id.to_string(),
                detail,
            })
            .await
    }
}

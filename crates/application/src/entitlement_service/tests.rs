use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use warden_core::{
    AppError, AppResult, FeatureId, LimitId, NonEmptyString, PlanId, RoleId, UserId,
};
use warden_domain::{EmailAddress, Feature, Limit, LimitValue, Plan, User};

use crate::{
    NewUserInput, PlanInput, PlanLimitEntry, PlanLimitInput, PlanRepository, UserRepository,
};

use super::EntitlementService;

struct FakeUserRepository {
    users: HashMap<UserId, User>,
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn find_user(&self, user_id: &UserId) -> AppResult<Option<User>> {
        Ok(self.users.get(user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>> {
        Ok(self
            .users
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.users.values().cloned().collect())
    }

    async fn create_user(&self, _input: NewUserInput) -> AppResult<User> {
        Err(AppError::Internal("read-only fake".to_owned()))
    }

    async fn assign_role(&self, _user_id: &UserId, _role_id: &RoleId) -> AppResult<User> {
        Err(AppError::Internal("read-only fake".to_owned()))
    }

    async fn assign_plan(&self, _user_id: &UserId, _plan_id: &PlanId) -> AppResult<User> {
        Err(AppError::Internal("read-only fake".to_owned()))
    }
}

#[derive(Default)]
struct FakePlanRepository {
    plans: Vec<Plan>,
    features: HashMap<PlanId, Vec<Feature>>,
    limits: HashMap<PlanId, Vec<PlanLimitEntry>>,
    unavailable: bool,
}

#[async_trait]
impl PlanRepository for FakePlanRepository {
    async fn list_plans(&self) -> AppResult<Vec<Plan>> {
        Ok(self.plans.clone())
    }

    async fn find_plan(&self, plan_id: &PlanId) -> AppResult<Option<Plan>> {
        if self.unavailable {
            return Err(AppError::Internal("plan storage unavailable".to_owned()));
        }
        Ok(self.plans.iter().find(|plan| &plan.id == plan_id).cloned())
    }

    async fn create_plan(&self, _input: PlanInput) -> AppResult<Plan> {
        Err(AppError::Internal("read-only fake".to_owned()))
    }

    async fn update_plan(&self, _plan_id: &PlanId, _input: PlanInput) -> AppResult<Plan> {
        Err(AppError::Internal("read-only fake".to_owned()))
    }

    async fn delete_plan(&self, _plan_id: &PlanId) -> AppResult<()> {
        Err(AppError::Internal("read-only fake".to_owned()))
    }

    async fn list_features(&self) -> AppResult<Vec<Feature>> {
        Ok(self.features.values().flatten().cloned().collect())
    }

    async fn list_limits(&self) -> AppResult<Vec<Limit>> {
        Ok(self
            .limits
            .values()
            .flatten()
            .map(|entry| entry.limit.clone())
            .collect())
    }

    async fn list_plan_features(&self, plan_id: &PlanId) -> AppResult<Vec<Feature>> {
        Ok(self.features.get(plan_id).cloned().unwrap_or_default())
    }

    async fn list_plan_limits(&self, plan_id: &PlanId) -> AppResult<Vec<PlanLimitEntry>> {
        Ok(self.limits.get(plan_id).cloned().unwrap_or_default())
    }

    async fn replace_plan_features(
        &self,
        _plan_id: &PlanId,
        _feature_ids: BTreeSet<FeatureId>,
    ) -> AppResult<Vec<Feature>> {
        Err(AppError::Internal("read-only fake".to_owned()))
    }

    async fn replace_plan_limits(
        &self,
        _plan_id: &PlanId,
        _limits: Vec<PlanLimitInput>,
    ) -> AppResult<Vec<PlanLimitEntry>> {
        Err(AppError::Internal("read-only fake".to_owned()))
    }
}

fn text(value: &str) -> NonEmptyString {
    NonEmptyString::new(value).unwrap_or_else(|_| unreachable!())
}

fn plan_id(value: &str) -> PlanId {
    PlanId::new(value).unwrap_or_else(|_| unreachable!())
}

fn user_id(value: &str) -> UserId {
    UserId::new(value).unwrap_or_else(|_| unreachable!())
}

fn plan(id: &str, name: &str, price: f64) -> Plan {
    Plan {
        id: plan_id(id),
        name: text(name),
        price,
        price_description: text("month"),
        description: None,
    }
}

fn feature(id: &str, key: &str) -> Feature {
    Feature {
        id: FeatureId::new(id).unwrap_or_else(|_| unreachable!()),
        key: text(key),
        name: key.to_owned(),
        description: String::new(),
    }
}

fn limit_entry(id: &str, key: &str, value: LimitValue) -> PlanLimitEntry {
    PlanLimitEntry {
        limit: Limit {
            id: LimitId::new(id).unwrap_or_else(|_| unreachable!()),
            key: text(key),
            name: key.to_owned(),
            description: String::new(),
        },
        value,
    }
}

fn user(id: &str, plan: &str) -> User {
    User {
        id: user_id(id),
        display_name: text(&format!("User {id}")),
        email: EmailAddress::new(format!("user{id}@example.com"))
            .unwrap_or_else(|_| unreachable!()),
        credential_ref: None,
        role_id: RoleId::new("2").unwrap_or_else(|_| unreachable!()),
        plan_id: plan_id(plan),
        created_at: Utc::now(),
    }
}

fn service(unavailable: bool) -> EntitlementService {
    let users = [user("1", "free"), user("2", "pro"), user("3", "retired")];
    let users = FakeUserRepository {
        users: users
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect(),
    };

    let plans = FakePlanRepository {
        plans: vec![plan("free", "Free", 0.0), plan("pro", "Pro", 19.0)],
        features: HashMap::from([(plan_id("pro"), vec![feature("f1", "export-csv")])]),
        limits: HashMap::from([
            (
                plan_id("free"),
                vec![limit_entry("5", "max-products", LimitValue::Limited(5))],
            ),
            (
                plan_id("pro"),
                vec![limit_entry("5", "max-products", LimitValue::Unlimited)],
            ),
        ]),
        unavailable,
    };

    EntitlementService::new(Arc::new(users), Arc::new(plans))
}

#[tokio::test]
async fn features_follow_the_plan() {
    let service = service(false);

    assert!(service.can(&user_id("2"), "export-csv").await);
    assert!(!service.can(&user_id("1"), "export-csv").await);
    assert!(!service.can(&user_id("2"), "unknown-feature").await);
}

#[tokio::test]
async fn limits_resolve_with_fail_closed_default() {
    let service = service(false);

    assert_eq!(
        service.get_limit(&user_id("1"), "max-products").await,
        LimitValue::Limited(5)
    );
    assert_eq!(
        service.get_limit(&user_id("2"), "max-products").await,
        LimitValue::Unlimited
    );
    assert_eq!(
        service.get_limit(&user_id("1"), "max-teams").await,
        LimitValue::FAIL_CLOSED
    );
}

#[tokio::test]
async fn current_plan_reports_snapshot() {
    let service = service(false);

    let snapshot = service.current_plan(&user_id("1")).await;
    assert_eq!(snapshot.map(|plan| plan.name), Some("Free".to_owned()));
}

#[tokio::test]
async fn dangling_plan_grants_nothing() {
    let service = service(false);

    let resolved = service.resolve_entitlements(&user_id("3")).await;
    assert!(matches!(resolved, Err(AppError::NotFound(_))));
    assert_eq!(service.current_plan(&user_id("3")).await, None);
    assert_eq!(
        service.get_limit(&user_id("3"), "max-products").await,
        LimitValue::FAIL_CLOSED
    );
}

#[tokio::test]
async fn storage_failure_grants_nothing() {
    let service = service(true);

    assert!(!service.can(&user_id("2"), "export-csv").await);
    assert_eq!(
        service.get_limit(&user_id("2"), "max-products").await,
        LimitValue::FAIL_CLOSED
    );
}

#[tokio::test]
async fn capacity_is_checked_against_current_usage() {
    let service = service(false);

    assert!(
        service
            .require_capacity(&user_id("1"), "max-products", 4)
            .await
            .is_ok()
    );
    assert!(matches!(
        service
            .require_capacity(&user_id("1"), "max-products", 5)
            .await,
        Err(AppError::Forbidden(_))
    ));
    assert!(
        service
            .require_capacity(&user_id("2"), "max-products", 10_000)
            .await
            .is_ok()
    );
}

mod common;

use warden_application::PlanInput;
use warden_core::{AppError, FeatureId, NonEmptyString};

use common::{actor, harness, plan_id};

fn plan_input(name: &str, price: f64) -> PlanInput {
    PlanInput {
        name: NonEmptyString::new(name).unwrap_or_else(|_| unreachable!()),
        price,
        price_description: NonEmptyString::new("por mês").unwrap_or_else(|_| unreachable!()),
        description: None,
    }
}

fn feature_id(value: &str) -> FeatureId {
    FeatureId::new(value).unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn plans_reject_negative_and_non_finite_prices() {
    let harness = harness();
    let admin = actor("1", None);

    for price in [-0.01, f64::NAN, f64::INFINITY] {
        let created = harness
            .plans
            .create_plan(&admin, plan_input("Broken", price))
            .await;
        assert!(matches!(created, Err(AppError::Validation(_))));
    }

    let updated = harness
        .plans
        .update_plan(&admin, &plan_id("2"), plan_input("Pro", -49.9))
        .await;
    assert!(matches!(updated, Err(AppError::Validation(_))));

    let plans = harness.plans.list_plans(&admin).await.unwrap_or_default();
    assert_eq!(plans.len(), 3);
    assert!(
        plans
            .iter()
            .any(|plan| plan.id == plan_id("2") && (plan.price - 49.9).abs() < f64::EPSILON)
    );
}

#[tokio::test]
async fn duplicate_feature_ids_are_rejected_without_changes() {
    let harness = harness();
    let admin = actor("1", None);

    let result = harness
        .plans
        .replace_plan_features(
            &admin,
            &plan_id("1"),
            vec![feature_id("1"), feature_id("2"), feature_id("1")],
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let free_features = harness
        .plans
        .plan_features(&admin, &plan_id("1"))
        .await
        .unwrap_or_default();
    assert!(free_features.is_empty());
    assert!(harness.audit.events().await.is_empty());
}

#[tokio::test]
async fn deleting_plans_requires_delete_permission() {
    let harness = harness();
    let admin = actor("1", None);
    let auditor = actor("4", None);

    let created = harness
        .plans
        .create_plan(&admin, plan_input("Temporário", 9.9))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(harness.plans.list_plans(&auditor).await.is_ok());
    let denied = harness.plans.delete_plan(&auditor, &created.id).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let in_use = harness.plans.delete_plan(&admin, &plan_id("1")).await;
    assert!(matches!(in_use, Err(AppError::Conflict(_))));

    let deleted = harness.plans.delete_plan(&admin, &created.id).await;
    assert!(deleted.is_ok());
    assert_eq!(
        harness
            .plans
            .list_plans(&admin)
            .await
            .unwrap_or_default()
            .len(),
        3
    );
}

use std::sync::Arc;

use tracing::info;
use warden_application::{
    AccessControlRepository, AuthorizationService, DashboardService, EntitlementService,
    NotificationService, PlanRepository, ProductService, RegistrationDefaults, TeamService,
    UserService,
};
use warden_core::{AppError, AppResult};
use warden_infrastructure::{
    InMemoryAuditRepository, InMemoryNotificationRepository, InMemoryStore, StoreSeed,
};

use crate::cli_config::CliConfig;

/// Services wired over one in-memory store.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub entitlement_service: EntitlementService,
    pub team_service: TeamService,
    pub product_service: ProductService,
    pub user_service: UserService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn build(config: &CliConfig) -> AppResult<Self> {
        let seed = match &config.seed_path {
            Some(path) => {
                info!(path = %path.display(), "loading seed file");
                StoreSeed::from_path(path)?
            }
            None => StoreSeed::demo()?,
        };

        let store = Arc::new(InMemoryStore::from_seed(seed)?);
        if store.find_role(&config.default_role_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "WARDEN_DEFAULT_ROLE_ID '{}' does not exist in the seed",
                config.default_role_id
            )));
        }
        if store.find_plan(&config.default_plan_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "WARDEN_DEFAULT_PLAN_ID '{}' does not exist in the seed",
                config.default_plan_id
            )));
        }

        let audit_repository = Arc::new(InMemoryAuditRepository::new());
        let authorization_service = AuthorizationService::new(store.clone(), store.clone());
        let entitlement_service = EntitlementService::new(store.clone(), store.clone());
        let notification_service = NotificationService::new(
            store.clone(),
            Arc::new(InMemoryNotificationRepository::new()),
        );

        Ok(Self {
            team_service: TeamService::new(
                store.clone(),
                store.clone(),
                audit_repository.clone(),
                notification_service.clone(),
            ),
            product_service: ProductService::new(
                authorization_service.clone(),
                entitlement_service.clone(),
                store.clone(),
                store.clone(),
                audit_repository.clone(),
                notification_service,
            ),
            user_service: UserService::new(
                store.clone(),
                store.clone(),
                audit_repository,
                RegistrationDefaults {
                    role_id: config.default_role_id.clone(),
                    plan_id: config.default_plan_id.clone(),
                },
            ),
            dashboard_service: DashboardService::new(
                authorization_service.clone(),
                store.clone(),
                store.clone(),
                store,
            ),
            authorization_service,
            entitlement_service,
        })
    }
}

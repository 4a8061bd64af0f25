#![allow(dead_code)]

use std::sync::Arc;

use warden_application::{
    AuthorizationService, DashboardService, EntitlementService, NotificationService,
    PlanAdminService, ProductInput, ProductService, RegistrationDefaults, RoleAdminService,
    TeamService, UserService,
};
use warden_core::{InvitationId, PlanId, RoleId, TeamId, UserId, UserIdentity};
use warden_domain::ProductStatus;
use warden_infrastructure::{
    InMemoryAuditRepository, InMemoryNotificationRepository, InMemoryStore, StoreSeed,
};

pub struct Harness {
    pub audit: Arc<InMemoryAuditRepository>,
    pub authorization: AuthorizationService,
    pub entitlements: EntitlementService,
    pub notifications: NotificationService,
    pub teams: TeamService,
    pub roles: RoleAdminService,
    pub plans: PlanAdminService,
    pub products: ProductService,
    pub users: UserService,
    pub dashboard: DashboardService,
}

pub fn harness() -> Harness {
    let seed = StoreSeed::demo().unwrap_or_else(|_| unreachable!());
    let store = Arc::new(InMemoryStore::from_seed(seed).unwrap_or_else(|_| unreachable!()));
    let audit = Arc::new(InMemoryAuditRepository::new());

    let authorization = AuthorizationService::new(store.clone(), store.clone());
    let entitlements = EntitlementService::new(store.clone(), store.clone());
    let notifications =
        NotificationService::new(store.clone(), Arc::new(InMemoryNotificationRepository::new()));

    Harness {
        teams: TeamService::new(
            store.clone(),
            store.clone(),
            audit.clone(),
            notifications.clone(),
        ),
        roles: RoleAdminService::new(
            authorization.clone(),
            store.clone(),
            store.clone(),
            audit.clone(),
        ),
        plans: PlanAdminService::new(
            authorization.clone(),
            store.clone(),
            store.clone(),
            audit.clone(),
            notifications.clone(),
        ),
        products: ProductService::new(
            authorization.clone(),
            entitlements.clone(),
            store.clone(),
            store.clone(),
            audit.clone(),
            notifications.clone(),
        ),
        users: UserService::new(
            store.clone(),
            store.clone(),
            audit.clone(),
            RegistrationDefaults {
                role_id: RoleId::new("2").unwrap_or_else(|_| unreachable!()),
                plan_id: PlanId::new("1").unwrap_or_else(|_| unreachable!()),
            },
        ),
        dashboard: DashboardService::new(
            authorization.clone(),
            store.clone(),
            store.clone(),
            store,
        ),
        audit,
        authorization,
        entitlements,
        notifications,
    }
}

pub fn user_id(value: &str) -> UserId {
    UserId::new(value).unwrap_or_else(|_| unreachable!())
}

pub fn team_id(value: &str) -> TeamId {
    TeamId::new(value).unwrap_or_else(|_| unreachable!())
}

pub fn plan_id(value: &str) -> PlanId {
    PlanId::new(value).unwrap_or_else(|_| unreachable!())
}

pub fn invitation_id(value: &str) -> InvitationId {
    InvitationId::new(value).unwrap_or_else(|_| unreachable!())
}

pub fn actor(user: &str, team: Option<&str>) -> UserIdentity {
    UserIdentity::new(user_id(user), format!("User {user}"), None, team.map(team_id))
}

pub fn product(name: &str) -> ProductInput {
    ProductInput {
        name: name.to_owned(),
        description: String::new(),
        status: ProductStatus::Active,
    }
}

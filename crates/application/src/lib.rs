//! Application services and ports.

#![forbid(unsafe_code)]

mod access_ports;
mod audit_ports;
mod authorization_service;
mod dashboard_service;
mod entitlement_ports;
mod entitlement_service;
mod identity_ports;
mod notification_ports;
mod notification_service;
mod plan_admin_service;
mod product_ports;
mod product_service;
mod role_admin_service;
mod team_service;
mod user_service;

pub use access_ports::{AccessControlRepository, CreateRoleInput, UpdateRoleInput};
pub use audit_ports::{AuditEvent, AuditRepository};
pub use authorization_service::AuthorizationService;
pub use dashboard_service::{
    DashboardOverview, DashboardService, PlanDistributionEntry, RevenueStats, WeeklyTeamsEntry,
};
pub use entitlement_ports::{PlanInput, PlanLimitEntry, PlanLimitInput, PlanRepository};
pub use entitlement_service::{EntitlementService, Entitlements, PlanSnapshot};
pub use identity_ports::{NewUserInput, TeamRepository, UserRepository};
pub use notification_ports::{
    NewNotification, NotificationPage, NotificationQuery, NotificationRepository,
};
pub use notification_service::{NotificationService, TeamNotice};
pub use plan_admin_service::PlanAdminService;
pub use product_ports::ProductRepository;
pub use product_service::{ProductInput, ProductService};
pub use role_admin_service::{RoleAdminService, UserRoleView};
pub use team_service::TeamService;
pub use user_service::{RegisterParams, RegistrationDefaults, UserService};

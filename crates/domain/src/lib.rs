//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod audit;
mod identity;
mod notification;
mod plan;
mod product;
mod team;
mod tenancy;

pub use access::{Action, Permission, PermissionSet, Role, Subject};
pub use audit::AuditAction;
pub use identity::{EmailAddress, User};
pub use notification::{Notification, NotificationKind};
pub use plan::{
    Feature, Limit, LimitValue, Plan, PlanFeature, PlanLimit, UNLIMITED_SENTINEL, validate_price,
};
pub use product::{MAX_PRODUCTS_LIMIT_KEY, Product, ProductStatus, validate_product_fields};
pub use team::{
    AssignableTeamRole, InvitationStatus, Team, TeamAccess, TeamInvitation, TeamMember, TeamRole,
};
pub use tenancy::{TeamOwned, scope_to_team};

use std::collections::{BTreeMap, BTreeSet};

use tokio::sync::RwLock;
use warden_core::{
    FeatureId, InvitationId, LimitId, PermissionId, PlanId, ProductId, RoleId, TeamId, UserId,
};
use warden_domain::{
    Feature, Limit, LimitValue, Permission, Plan, Product, Role, Team, TeamInvitation, TeamMember,
    User,
};

mod access;
mod identity;
mod plans;
mod products;
mod teams;


/// Single-writer in-memory store implementing every repository port.
///
/// All state lives behind one lock, so each mutation observes and updates a
/// consistent snapshot: reference checks and the writes they guard happen
/// under the same write guard.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) permissions: BTreeMap<PermissionId, Permission>,
    pub(crate) roles: BTreeMap<RoleId, Role>,
    pub(crate) users: BTreeMap<UserId, User>,
    pub(crate) plans: BTreeMap<PlanId, Plan>,
    pub(crate) features: BTreeMap<FeatureId, Feature>,
    pub(crate) limits: BTreeMap<LimitId, Limit>,
    pub(crate) plan_features: BTreeSet<(PlanId, FeatureId)>,
    pub(crate) plan_limits: BTreeMap<(PlanId, LimitId), LimitValue>,
    pub(crate) teams: BTreeMap<TeamId, Team>,
    pub(crate) members: BTreeMap<(TeamId, UserId), TeamMember>,
    pub(crate) invitations: BTreeMap<InvitationId, TeamInvitation>,
    pub(crate) products: BTreeMap<ProductId, Product>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_state(state: StoreState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

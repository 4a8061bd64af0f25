//! Store seeding from JSON documents.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use warden_core::{AppError, AppResult, TeamId};
use warden_domain::{
    Feature, Limit, Permission, Plan, PlanFeature, PlanLimit, Product, Role, Team, TeamInvitation,
    TeamMember, TeamRole, User, validate_price,
};

use crate::in_memory_store::{InMemoryStore, StoreState};

const DEMO_SEED: &str = include_str!("seed/demo.json");

/// Complete store contents in their serialized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSeed {
    /// Permission catalog.
    pub permissions: Vec<Permission>,
    /// Global roles.
    pub roles: Vec<Role>,
    /// Registered users.
    pub users: Vec<User>,
    /// Subscription plans.
    pub plans: Vec<Plan>,
    /// Feature catalog.
    pub features: Vec<Feature>,
    /// Limit catalog.
    pub limits: Vec<Limit>,
    /// Features enabled per plan.
    pub plan_features: Vec<PlanFeature>,
    /// Limit values per plan.
    pub plan_limits: Vec<PlanLimit>,
    /// Teams.
    pub teams: Vec<Team>,
    /// Team memberships.
    pub members: Vec<TeamMember>,
    /// Team invitations.
    pub invitations: Vec<TeamInvitation>,
    /// Team-owned products.
    pub products: Vec<Product>,
}

impl StoreSeed {
    /// Parses a seed document.
    pub fn from_json(document: &str) -> AppResult<Self> {
        serde_json::from_str(document)
            .map_err(|error| AppError::Validation(format!("invalid seed document: {error}")))
    }

    /// Reads and parses a seed file.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let document = std::fs::read_to_string(path).map_err(|error| {
            AppError::Internal(format!(
                "failed to read seed file '{}': {error}",
                path.display()
            ))
        })?;

        Self::from_json(&document)
    }

    /// Returns the bundled demo dataset.
    pub fn demo() -> AppResult<Self> {
        Self::from_json(DEMO_SEED)
    }

    /// Checks uniqueness and referential integrity across all collections.
    pub fn validate(&self) -> AppResult<()> {
        ensure_unique("permission", self.permissions.iter().map(|item| item.id.as_str()))?;
        ensure_unique("role", self.roles.iter().map(|item| item.id.as_str()))?;
        ensure_unique("user", self.users.iter().map(|item| item.id.as_str()))?;
        ensure_unique("plan", self.plans.iter().map(|item| item.id.as_str()))?;
        ensure_unique("feature", self.features.iter().map(|item| item.id.as_str()))?;
        ensure_unique("limit", self.limits.iter().map(|item| item.id.as_str()))?;
        ensure_unique("team", self.teams.iter().map(|item| item.id.as_str()))?;
        ensure_unique(
            "invitation",
            self.invitations.iter().map(|item| item.id().as_str()),
        )?;
        ensure_unique("product", self.products.iter().map(|item| item.id.as_str()))?;

        ensure_unique(
            "role name",
            self.roles
                .iter()
                .map(|role| role.name.as_str().trim().to_lowercase()),
        )?;
        ensure_unique("user email", self.users.iter().map(|user| user.email.as_str()))?;
        ensure_unique("feature key", self.features.iter().map(|item| item.key.as_str()))?;
        ensure_unique("limit key", self.limits.iter().map(|item| item.key.as_str()))?;

        self.validate_access()?;
        self.validate_plans()?;
        self.validate_teams()
    }

    fn validate_access(&self) -> AppResult<()> {
        let permission_ids: HashSet<_> = self.permissions.iter().map(|item| &item.id).collect();
        for role in &self.roles {
            if let Some(unknown) = role
                .permission_ids
                .iter()
                .find(|permission_id| !permission_ids.contains(permission_id))
            {
                return Err(dangling("role", role.id.as_str(), "permission", unknown.as_str()));
            }
        }

        let role_ids: HashSet<_> = self.roles.iter().map(|item| &item.id).collect();
        let plan_ids: HashSet<_> = self.plans.iter().map(|item| &item.id).collect();
        for user in &self.users {
            if !role_ids.contains(&user.role_id) {
                return Err(dangling("user", user.id.as_str(), "role", user.role_id.as_str()));
            }
            if !plan_ids.contains(&user.plan_id) {
                return Err(dangling("user", user.id.as_str(), "plan", user.plan_id.as_str()));
            }
        }

        Ok(())
    }

    fn validate_plans(&self) -> AppResult<()> {
        let plan_ids: HashSet<_> = self.plans.iter().map(|item| &item.id).collect();
        let feature_ids: HashSet<_> = self.features.iter().map(|item| &item.id).collect();
        let limit_ids: HashSet<_> = self.limits.iter().map(|item| &item.id).collect();

        for plan in &self.plans {
            validate_price(plan.price)?;
        }

        for association in &self.plan_features {
            if !plan_ids.contains(&association.plan_id) {
                return Err(dangling(
                    "plan feature",
                    association.feature_id.as_str(),
                    "plan",
                    association.plan_id.as_str(),
                ));
            }
            if !feature_ids.contains(&association.feature_id) {
                return Err(dangling(
                    "plan feature",
                    association.plan_id.as_str(),
                    "feature",
                    association.feature_id.as_str(),
                ));
            }
        }

        let mut configured = BTreeSet::new();
        for association in &self.plan_limits {
            if !plan_ids.contains(&association.plan_id) {
                return Err(dangling(
                    "plan limit",
                    association.limit_id.as_str(),
                    "plan",
                    association.plan_id.as_str(),
                ));
            }
            if !limit_ids.contains(&association.limit_id) {
                return Err(dangling(
                    "plan limit",
                    association.plan_id.as_str(),
                    "limit",
                    association.limit_id.as_str(),
                ));
            }
            if !configured.insert((&association.plan_id, &association.limit_id)) {
                return Err(AppError::Validation(format!(
                    "limit '{}' is configured twice for plan '{}'",
                    association.limit_id, association.plan_id
                )));
            }
        }

        Ok(())
    }

    fn validate_teams(&self) -> AppResult<()> {
        let user_ids: HashSet<_> = self.users.iter().map(|item| &item.id).collect();
        let team_ids: HashSet<_> = self.teams.iter().map(|item| &item.id).collect();

        let mut memberships = BTreeSet::new();
        let mut owners: BTreeMap<&TeamId, Vec<&TeamMember>> = BTreeMap::new();
        for member in &self.members {
            if !team_ids.contains(&member.team_id) {
                return Err(dangling(
                    "member",
                    member.user_id.as_str(),
                    "team",
                    member.team_id.as_str(),
                ));
            }
            if !user_ids.contains(&member.user_id) {
                return Err(dangling(
                    "member",
                    member.team_id.as_str(),
                    "user",
                    member.user_id.as_str(),
                ));
            }
            if !memberships.insert((&member.team_id, &member.user_id)) {
                return Err(AppError::Validation(format!(
                    "user '{}' is listed twice in team '{}'",
                    member.user_id, member.team_id
                )));
            }
            if member.role == TeamRole::Owner {
                owners.entry(&member.team_id).or_default().push(member);
            }
        }

        for team in &self.teams {
            if !user_ids.contains(&team.owner_id) {
                return Err(dangling("team", team.id.as_str(), "owner", team.owner_id.as_str()));
            }

            match owners.get(&team.id).map(Vec::as_slice) {
                Some([owner]) if owner.user_id == team.owner_id => {}
                _ => {
                    return Err(AppError::Validation(format!(
                        "team '{}' must have exactly one OWNER member, user '{}'",
                        team.id, team.owner_id
                    )));
                }
            }
        }

        for invitation in &self.invitations {
            if !team_ids.contains(invitation.team_id()) {
                return Err(dangling(
                    "invitation",
                    invitation.id().as_str(),
                    "team",
                    invitation.team_id().as_str(),
                ));
            }
        }

        for product in &self.products {
            if !team_ids.contains(&product.team_id) {
                return Err(dangling(
                    "product",
                    product.id.as_str(),
                    "team",
                    product.team_id.as_str(),
                ));
            }
        }

        Ok(())
    }
}

impl InMemoryStore {
    /// Builds a store from a validated seed.
    pub fn from_seed(seed: StoreSeed) -> AppResult<Self> {
        seed.validate()?;

        info!(
            users = seed.users.len(),
            roles = seed.roles.len(),
            plans = seed.plans.len(),
            teams = seed.teams.len(),
            "loaded store seed"
        );

        let state = StoreState {
            permissions: seed
                .permissions
                .into_iter()
                .map(|item| (item.id.clone(), item))
                .collect(),
            roles: seed
                .roles
                .into_iter()
                .map(|item| (item.id.clone(), item))
                .collect(),
            users: seed
                .users
                .into_iter()
                .map(|item| (item.id.clone(), item))
                .collect(),
            plans: seed
                .plans
                .into_iter()
                .map(|item| (item.id.clone(), item))
                .collect(),
            features: seed
                .features
                .into_iter()
                .map(|item| (item.id.clone(), item))
                .collect(),
            limits: seed
                .limits
                .into_iter()
                .map(|item| (item.id.clone(), item))
                .collect(),
            plan_features: seed
                .plan_features
                .into_iter()
                .map(|item| (item.plan_id, item.feature_id))
                .collect(),
            plan_limits: seed
                .plan_limits
                .into_iter()
                .map(|item| ((item.plan_id, item.limit_id), item.value))
                .collect(),
            teams: seed
                .teams
                .into_iter()
                .map(|item| (item.id.clone(), item))
                .collect(),
            members: seed
                .members
                .into_iter()
                .map(|item| ((item.team_id.clone(), item.user_id.clone()), item))
                .collect(),
            invitations: seed
                .invitations
                .into_iter()
                .map(|item| (item.id().clone(), item))
                .collect(),
            products: seed
                .products
                .into_iter()
                .map(|item| (item.id.clone(), item))
                .collect(),
        };

        Ok(Self::with_state(state))
    }
}

fn ensure_unique<I, S>(kind: &str, values: I) -> AppResult<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    for value in values {
        let value = value.as_ref().to_owned();
        if !seen.insert(value.clone()) {
            return Err(AppError::Validation(format!(
                "duplicate {kind} '{value}' in seed"
            )));
        }
    }

    Ok(())
}

fn dangling(kind: &str, id: &str, target: &str, target_id: &str) -> AppError {
    AppError::Validation(format!(
        "{kind} '{id}' references unknown {target} '{target_id}'"
    ))
}

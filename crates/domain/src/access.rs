//! Role-based access control: capability tokens, permissions, roles and the
//! effective permission set evaluated for one user.
//!
//! Matching is exact on the canonical string form of both tokens. The only
//! universal grant is a permission with action `manage` on subject `all`.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, NonEmptyString, PermissionId, RoleId};

/// Action half of a capability token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Action {
    /// Create a resource.
    Create,
    /// Read a resource.
    Read,
    /// Update a resource.
    Update,
    /// Delete a resource.
    Delete,
    /// Administrative action; `manage` on `all` is the super-admin grant.
    Manage,
    /// Custom action outside the built-in vocabulary.
    Other(String),
}

impl Action {
    /// Returns the stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Manage => "manage",
            Self::Other(value) => value.as_str(),
        }
    }

    /// Parses a storage or transport value into an action.
    pub fn parse(value: &str) -> AppResult<Self> {
        Self::from_str(value)
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "manage" => Ok(Self::Manage),
            _ if value.trim().is_empty() => Err(AppError::Validation(
                "permission action must not be empty".to_owned(),
            )),
            _ => Ok(Self::Other(value.to_owned())),
        }
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Action {}

impl Hash for Action {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl TryFrom<String> for Action {
    type Error = AppError;

    fn try_from(value: String) -> AppResult<Self> {
        Self::from_str(value.as_str())
    }
}

impl From<Action> for String {
    fn from(value: Action) -> Self {
        match value {
            Action::Other(value) => value,
            known => known.as_str().to_owned(),
        }
    }
}

/// Resource half of a capability token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Subject {
    /// Wildcard subject, only meaningful together with `manage`.
    All,
    /// Team-owned products.
    Product,
    /// Global RBAC roles.
    Role,
    /// User accounts.
    User,
    /// Subscription plans and their entitlements.
    Plan,
    /// Teams and memberships.
    Team,
    /// Administrative dashboard aggregates.
    Dashboard,
    /// Custom resource category.
    Other(String),
}

impl Subject {
    /// Returns the stable storage value for this subject.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Product => "Product",
            Self::Role => "Role",
            Self::User => "User",
            Self::Plan => "Plan",
            Self::Team => "Team",
            Self::Dashboard => "Dashboard",
            Self::Other(value) => value.as_str(),
        }
    }

    /// Parses a storage or transport value into a subject.
    pub fn parse(value: &str) -> AppResult<Self> {
        Self::from_str(value)
    }
}

impl FromStr for Subject {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(Self::All),
            "Product" => Ok(Self::Product),
            "Role" => Ok(Self::Role),
            "User" => Ok(Self::User),
            "Plan" => Ok(Self::Plan),
            "Team" => Ok(Self::Team),
            "Dashboard" => Ok(Self::Dashboard),
            _ if value.trim().is_empty() => Err(AppError::Validation(
                "permission subject must not be empty".to_owned(),
            )),
            _ => Ok(Self::Other(value.to_owned())),
        }
    }
}

impl PartialEq for Subject {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Subject {}

impl Hash for Subject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl TryFrom<String> for Subject {
    type Error = AppError;

    fn try_from(value: String) -> AppResult<Self> {
        Self::from_str(value.as_str())
    }
}

impl From<Subject> for String {
    fn from(value: Subject) -> Self {
        match value {
            Subject::Other(value) => value,
            known => known.as_str().to_owned(),
        }
    }
}

/// Permission reference data: one action on one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Stable permission identifier.
    pub id: PermissionId,
    /// Granted action.
    pub action: Action,
    /// Resource category the action applies to.
    pub subject: Subject,
    /// Human-readable name.
    pub name: String,
    /// Optional description shown to administrators.
    #[serde(default)]
    pub description: Option<String>,
}

impl Permission {
    /// Creates a permission definition.
    #[must_use]
    pub fn new(
        id: PermissionId,
        action: Action,
        subject: Subject,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            action,
            subject,
            name: name.into(),
            description: None,
        }
    }

    /// Returns whether this is the universal `manage`/`all` grant.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.action == Action::Manage && self.subject == Subject::All
    }

    /// Returns whether this permission literally grants the pair.
    #[must_use]
    pub fn grants(&self, action: &Action, subject: &Subject) -> bool {
        &self.action == action && &self.subject == subject
    }
}

/// Global RBAC role: a named set of permission identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Stable role identifier.
    pub id: RoleId,
    /// Unique role name.
    pub name: NonEmptyString,
    /// Administrative description.
    #[serde(default)]
    pub description: String,
    /// Presentation color.
    #[serde(default)]
    pub color: String,
    /// Granted permission identifiers.
    #[serde(default)]
    pub permission_ids: BTreeSet<PermissionId>,
}

impl Role {
    /// Returns whether the role name matches ignoring case and surrounding whitespace.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.name.as_str().trim().to_lowercase() == name.trim().to_lowercase()
    }
}

/// Effective permissions resolved for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    permissions: Vec<Permission>,
}

impl PermissionSet {
    /// Returns the set that grants nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Keeps the catalog entries referenced by the role.
    #[must_use]
    pub fn for_role(role: &Role, catalog: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            permissions: catalog
                .into_iter()
                .filter(|permission| role.permission_ids.contains(&permission.id))
                .collect(),
        }
    }

    /// Returns whether the set authorizes the action on the subject.
    #[must_use]
    pub fn allows(&self, action: &Action, subject: &Subject) -> bool {
        if self.is_super_admin() {
            return true;
        }

        self.permissions
            .iter()
            .any(|permission| permission.grants(action, subject))
    }

    /// Returns whether the set contains the `manage`/`all` grant.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.permissions.iter().any(Permission::is_super_admin)
    }

    /// Returns the resolved permissions.
    #[must_use]
    pub fn permissions(&self) -> &[Permission] {
        self.permissions.as_slice()
    }

    /// Returns the number of resolved permissions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Returns whether nothing was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;
    use warden_core::{NonEmptyString, PermissionId, RoleId};

    use super::{Action, Permission, PermissionSet, Role, Subject};

    fn permission(id: &str, action: Action, subject: Subject) -> Permission {
        Permission::new(
            PermissionId::new(id).unwrap_or_else(|_| unreachable!()),
            action,
            subject,
            id,
        )
    }

    fn role_with(permission_ids: &[&str]) -> Role {
        Role {
            id: RoleId::new("r1").unwrap_or_else(|_| unreachable!()),
            name: NonEmptyString::new("Editor").unwrap_or_else(|_| unreachable!()),
            description: String::new(),
            color: "#3b82f6".to_owned(),
            permission_ids: permission_ids
                .iter()
                .map(|id| PermissionId::new(*id).unwrap_or_else(|_| unreachable!()))
                .collect::<BTreeSet<_>>(),
        }
    }

    fn catalog() -> Vec<Permission> {
        vec![
            permission("1", Action::Read, Subject::Product),
            permission("2", Action::Manage, Subject::Product),
            permission("22", Action::Manage, Subject::All),
        ]
    }

    #[test]
    fn storage_values_roundtrip() {
        assert_eq!(Action::parse("delete").ok(), Some(Action::Delete));
        assert_eq!(Subject::parse("Role").ok(), Some(Subject::Role));
        assert_eq!(
            Subject::parse("Invoice").ok(),
            Some(Subject::Other("Invoice".to_owned()))
        );
        assert!(Action::parse(" ").is_err());
    }

    #[test]
    fn other_variant_matches_builtin_token() {
        assert_eq!(Action::Other("read".to_owned()), Action::Read);
        assert_ne!(Action::Other("Read".to_owned()), Action::Read);
    }

    #[test]
    fn exact_match_without_implication() {
        let set = PermissionSet::for_role(&role_with(&["1"]), catalog());

        assert!(set.allows(&Action::Read, &Subject::Product));
        assert!(!set.allows(&Action::Update, &Subject::Product));
        assert!(!set.allows(&Action::Read, &Subject::Role));
    }

    #[test]
    fn manage_on_one_subject_is_not_a_wildcard() {
        let set = PermissionSet::for_role(&role_with(&["2"]), catalog());

        assert!(set.allows(&Action::Manage, &Subject::Product));
        assert!(!set.allows(&Action::Read, &Subject::Product));
        assert!(!set.is_super_admin());
    }

    #[test]
    fn role_without_permissions_grants_nothing() {
        let set = PermissionSet::for_role(&role_with(&[]), catalog());

        assert!(set.is_empty());
        assert!(!set.allows(&Action::Read, &Subject::Product));
    }

    #[test]
    fn unknown_permission_ids_are_ignored() {
        let set = PermissionSet::for_role(&role_with(&["1", "404"]), catalog());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn role_name_comparison_ignores_case() {
        assert!(role_with(&[]).has_name(" editor "));
    }

    proptest! {
        #[test]
        fn super_admin_allows_every_pair(
            action in "[A-Za-z][A-Za-z_]{0,15}",
            subject in "[A-Za-z][A-Za-z_]{0,15}",
        ) {
            let set = PermissionSet::for_role(&role_with(&["22"]), catalog());
            let action = Action::parse(action.as_str()).unwrap_or_else(|_| unreachable!());
            let subject = Subject::parse(subject.as_str()).unwrap_or_else(|_| unreachable!());

            prop_assert!(set.allows(&action, &subject));
        }

        #[test]
        fn empty_set_denies_every_pair(
            action in "[A-Za-z][A-Za-z_]{0,15}",
            subject in "[A-Za-z][A-Za-z_]{0,15}",
        ) {
            let action = Action::parse(action.as_str()).unwrap_or_else(|_| unreachable!());
            let subject = Subject::parse(subject.as_str()).unwrap_or_else(|_| unreachable!());

            prop_assert!(!PermissionSet::empty().allows(&action, &subject));
        }
    }
}

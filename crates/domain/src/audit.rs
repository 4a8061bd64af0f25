use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by administrative use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a user registers.
    UserRegistered,
    /// Emitted when a user's global role changes.
    UserRoleAssigned,
    /// Emitted when a user's plan changes.
    UserPlanAssigned,
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when a role is updated.
    RoleUpdated,
    /// Emitted when a role is deleted.
    RoleDeleted,
    /// Emitted when a plan is created.
    PlanCreated,
    /// Emitted when a plan is updated.
    PlanUpdated,
    /// Emitted when a plan is deleted.
    PlanDeleted,
    /// Emitted when a plan's feature set is replaced.
    PlanFeaturesReplaced,
    /// Emitted when a plan's limit set is replaced.
    PlanLimitsReplaced,
    /// Emitted when a team is created.
    TeamCreated,
    /// Emitted when an invitation is sent.
    TeamMemberInvited,
    /// Emitted when an invitation is accepted.
    TeamInvitationAccepted,
    /// Emitted when an invitation is declined.
    TeamInvitationDeclined,
    /// Emitted when a member's team role changes.
    TeamMemberRoleChanged,
    /// Emitted when a member leaves a team by removal.
    TeamMemberRemoved,
    /// Emitted when a product is created.
    ProductCreated,
    /// Emitted when a product is updated.
    ProductUpdated,
    /// Emitted when a product is deleted.
    ProductDeleted,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRegistered => "identity.user.registered",
            Self::UserRoleAssigned => "identity.user.role_assigned",
            Self::UserPlanAssigned => "identity.user.plan_assigned",
            Self::RoleCreated => "rbac.role.created",
            Self::RoleUpdated => "rbac.role.updated",
            Self::RoleDeleted => "rbac.role.deleted",
            Self::PlanCreated => "billing.plan.created",
            Self::PlanUpdated => "billing.plan.updated",
            Self::PlanDeleted => "billing.plan.deleted",
            Self::PlanFeaturesReplaced => "billing.plan.features_replaced",
            Self::PlanLimitsReplaced => "billing.plan.limits_replaced",
            Self::TeamCreated => "team.created",
            Self::TeamMemberInvited => "team.member.invited",
            Self::TeamInvitationAccepted => "team.invitation.accepted",
            Self::TeamInvitationDeclined => "team.invitation.declined",
            Self::TeamMemberRoleChanged => "team.member.role_changed",
            Self::TeamMemberRemoved => "team.member.removed",
            Self::ProductCreated => "product.created",
            Self::ProductUpdated => "product.updated",
            Self::ProductDeleted => "product.deleted",
        }
    }
}

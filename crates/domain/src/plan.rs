//! Subscription plans, feature flags and numeric usage limits.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, FeatureId, LimitId, NonEmptyString, PlanId};

/// Raw value used by stored plan limits to mean "no maximum".
pub const UNLIMITED_SENTINEL: i64 = -1;

/// Subscription plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Stable plan identifier.
    pub id: PlanId,
    /// Display name.
    pub name: NonEmptyString,
    /// Price per period.
    pub price: f64,
    /// Period descriptor, for example "per month".
    pub price_description: NonEmptyString,
    /// Optional marketing description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Validates a plan price.
pub fn validate_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation(format!(
            "plan price must be a finite non-negative number, got {price}"
        )));
    }

    Ok(())
}

/// Boolean entitlement reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// Stable feature identifier.
    pub id: FeatureId,
    /// Capability key used by checks, distinct from the identifier.
    pub key: NonEmptyString,
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

/// Numeric entitlement reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    /// Stable limit identifier.
    pub id: LimitId,
    /// Capability key used by checks, distinct from the identifier.
    pub key: NonEmptyString,
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

/// Configured maximum for one limit on one plan.
///
/// Stored data uses `-1` for "unlimited"; that sentinel never leaves the
/// serialization boundary, so quota checks cannot compare against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum LimitValue {
    /// Inclusive maximum count.
    Limited(u64),
    /// No maximum.
    Unlimited,
}

impl LimitValue {
    /// Value used when a plan has no association for a limit.
    pub const FAIL_CLOSED: Self = Self::Limited(0);

    /// Converts the stored integer form.
    pub fn from_raw(value: i64) -> AppResult<Self> {
        if value == UNLIMITED_SENTINEL {
            return Ok(Self::Unlimited);
        }

        u64::try_from(value).map(Self::Limited).map_err(|_| {
            AppError::Validation(format!(
                "limit value must be -1 (unlimited) or a non-negative count, got {value}"
            ))
        })
    }

    /// Returns the stored integer form.
    #[must_use]
    pub fn as_raw(self) -> i64 {
        match self {
            Self::Limited(value) => i64::try_from(value).unwrap_or(i64::MAX),
            Self::Unlimited => UNLIMITED_SENTINEL,
        }
    }

    /// Returns whether no maximum applies.
    #[must_use]
    pub fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// Returns whether one more unit may be consumed given current usage.
    #[must_use]
    pub fn permits(self, current_usage: u64) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Limited(maximum) => current_usage < maximum,
        }
    }

    /// Returns how many more units may be consumed, `None` when unlimited.
    #[must_use]
    pub fn remaining(self, current_usage: u64) -> Option<u64> {
        match self {
            Self::Unlimited => None,
            Self::Limited(maximum) => Some(maximum.saturating_sub(current_usage)),
        }
    }
}

impl TryFrom<i64> for LimitValue {
    type Error = AppError;

    fn try_from(value: i64) -> AppResult<Self> {
        Self::from_raw(value)
    }
}

impl From<LimitValue> for i64 {
    fn from(value: LimitValue) -> Self {
        value.as_raw()
    }
}

impl Display for LimitValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Limited(value) => write!(formatter, "{value}"),
            Self::Unlimited => formatter.write_str("unlimited"),
        }
    }
}

/// Plan-to-feature association; presence enables the feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlanFeature {
    /// Plan holding the feature.
    pub plan_id: PlanId,
    /// Enabled feature.
    pub feature_id: FeatureId,
}

/// Plan-to-limit association with its configured value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimit {
    /// Plan holding the limit.
    pub plan_id: PlanId,
    /// Configured limit.
    pub limit_id: LimitId,
    /// Configured maximum.
    pub value: LimitValue,
}

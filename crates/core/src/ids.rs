use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppError, AppResult};

macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from an existing non-blank value.
            pub fn new(value: impl Into<String>) -> AppResult<Self> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(AppError::Validation(format!(
                        "{} must not be empty",
                        $label
                    )));
                }

                Ok(Self(value))
            }

            /// Creates a random identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Returns the underlying identifier value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = AppError;

            fn try_from(value: String) -> AppResult<Self> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                formatter.write_str(self.0.as_str())
            }
        }
    };
}

string_identifier!(
    /// Unique identifier for a user record.
    UserId,
    "user id"
);
string_identifier!(
    /// Team identifier used as the partition key for team-owned resources.
    TeamId,
    "team id"
);
string_identifier!(
    /// Unique identifier for a global RBAC role.
    RoleId,
    "role id"
);
string_identifier!(
    /// Unique identifier for a permission definition.
    PermissionId,
    "permission id"
);
string_identifier!(
    /// Unique identifier for a subscription plan.
    PlanId,
    "plan id"
);
string_identifier!(
    /// Unique identifier for a feature definition.
    FeatureId,
    "feature id"
);
string_identifier!(
    /// Unique identifier for a limit definition.
    LimitId,
    "limit id"
);
string_identifier!(
    /// Unique identifier for a team invitation.
    InvitationId,
    "invitation id"
);
string_identifier!(
    /// Unique identifier for a product record.
    ProductId,
    "product id"
);
string_identifier!(
    /// Unique identifier for an in-app notification.
    NotificationId,
    "notification id"
);

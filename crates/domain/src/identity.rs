//! User identity records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, NonEmptyString, PlanId, RoleId, UserId};

/// Validated, lowercase-normalized email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one `@`,
    /// local part and domain are non-empty, domain contains at least one `.`.
    /// The stored form is trimmed and lowercased so equality is case-insensitive.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the normalized email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AppError;

    fn try_from(value: String) -> AppResult<Self> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Registered user account.
///
/// Every user carries exactly one global role and one plan. Both are plain
/// references; a dangling reference degrades to "no permissions" or "no
/// entitlements" at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable user identifier.
    pub id: UserId,
    /// Display name.
    pub display_name: NonEmptyString,
    /// Unique email address.
    pub email: EmailAddress,
    /// Opaque reference to the credential held by the authentication layer.
    #[serde(default)]
    pub credential_ref: Option<String>,
    /// Global RBAC role.
    pub role_id: RoleId,
    /// Subscription plan.
    pub plan_id: PlanId,
    /// Registration timestamp.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::EmailAddress;

    #[test]
    fn email_is_normalized_to_lowercase() {
        let email = EmailAddress::new("  Teste@Email.com ").unwrap_or_else(|_| unreachable!());
        assert_eq!(email.as_str(), "teste@email.com");
        assert_eq!(
            Some(email),
            EmailAddress::new("TESTE@EMAIL.COM").ok()
        );
    }

    #[test]
    fn email_structure_is_validated() {
        assert!(EmailAddress::new("").is_err());
        assert!(EmailAddress::new("no-at-sign.com").is_err());
        assert!(EmailAddress::new("a@b@c.com").is_err());
        assert!(EmailAddress::new("@example.com").is_err());
        assert!(EmailAddress::new("user@localhost").is_err());
    }
}

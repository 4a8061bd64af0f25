use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, ProductId, TeamId};

use crate::TeamOwned;

/// Limit key consulted before creating a product.
pub const MAX_PRODUCTS_LIMIT_KEY: &str = "max-products";

/// Publication state of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    /// Visible and in use.
    Active,
    /// Kept but disabled.
    Inactive,
}

/// Team-owned business record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Stable product identifier.
    pub id: ProductId,
    /// Owning team.
    pub team_id: TeamId,
    /// Display name, 2 to 100 characters.
    pub name: String,
    /// Free-form description, at most 500 characters.
    #[serde(default)]
    pub description: String,
    /// Publication state.
    pub status: ProductStatus,
    /// Creation timestamp.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl TeamOwned for Product {
    fn team_id(&self) -> &TeamId {
        &self.team_id
    }
}

/// Validates product name and description lengths.
pub fn validate_product_fields(name: &str, description: &str) -> AppResult<()> {
    let name_length = name.trim().chars().count();
    if !(2..=100).contains(&name_length) {
        return Err(AppError::Validation(
            "product name must be between 2 and 100 characters".to_owned(),
        ));
    }

    if description.chars().count() > 500 {
        return Err(AppError::Validation(
            "product description must not exceed 500 characters".to_owned(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_product_fields;

    #[test]
    fn product_fields_are_bounded() {
        assert!(validate_product_fields("Widget", "").is_ok());
        assert!(validate_product_fields(" W ", "").is_err());
        assert!(validate_product_fields(&"x".repeat(101), "").is_err());
        assert!(validate_product_fields("Widget", &"d".repeat(501)).is_err());
    }
}

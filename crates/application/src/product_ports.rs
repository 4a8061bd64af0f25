use async_trait::async_trait;
use warden_core::{AppResult, ProductId};
use warden_domain::{LimitValue, Product};

/// Repository port for product records.
///
/// The port is deliberately unscoped: services pass every read through
/// `scope_to_team` before results reach a caller.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Lists product records of every team.
    async fn list_products(&self) -> AppResult<Vec<Product>>;

    /// Finds a product record by identifier, regardless of team.
    async fn find_product(&self, product_id: &ProductId) -> AppResult<Option<Product>>;

    /// Inserts a product if its team holds fewer products than `limit`.
    ///
    /// Counting and inserting form one step: concurrent creators never see the
    /// same count. Fails with `Forbidden` once the team is at its limit.
    async fn create_product_within(&self, product: Product, limit: LimitValue)
    -> AppResult<Product>;

    /// Replaces an existing product record.
    async fn update_product(&self, product: Product) -> AppResult<Product>;

    /// Deletes a product record.
    async fn delete_product(&self, product_id: &ProductId) -> AppResult<()>;
}

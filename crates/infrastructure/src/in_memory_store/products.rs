use async_trait::async_trait;
use warden_application::ProductRepository;
use warden_core::{AppError, AppResult, ProductId};
use warden_domain::{LimitValue, Product};

use super::InMemoryStore;

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn list_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.state.read().await.products.values().cloned().collect())
    }

    async fn find_product(&self, product_id: &ProductId) -> AppResult<Option<Product>> {
        Ok(self.state.read().await.products.get(product_id).cloned())
    }

    async fn create_product_within(
        &self,
        product: Product,
        limit: LimitValue,
    ) -> AppResult<Product> {
        let mut state = self.state.write().await;
        if !state.teams.contains_key(&product.team_id) {
            return Err(AppError::NotFound(format!(
                "team '{}' does not exist",
                product.team_id
            )));
        }
        if state.products.contains_key(&product.id) {
            return Err(AppError::Conflict(format!(
                "product '{}' already exists",
                product.id
            )));
        }

        let team_products = state
            .products
            .values()
            .filter(|existing| existing.team_id == product.team_id)
            .count();
        let current_usage = u64::try_from(team_products).unwrap_or(u64::MAX);
        if !limit.permits(current_usage) {
            return Err(AppError::Forbidden(format!(
                "team '{}' reached its product limit ({current_usage} of {limit})",
                product.team_id
            )));
        }

        state.products.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn update_product(&self, product: Product) -> AppResult<Product> {
        let mut state = self.state.write().await;
        let Some(existing) = state.products.get_mut(&product.id) else {
            return Err(AppError::NotFound(format!(
                "product '{}' does not exist",
                product.id
            )));
        };
        if existing.team_id != product.team_id {
            return Err(AppError::Validation(format!(
                "product '{}' cannot move to another team",
                product.id
            )));
        }

        *existing = product.clone();
        Ok(product)
    }

    async fn delete_product(&self, product_id: &ProductId) -> AppResult<()> {
        self.state
            .write()
            .await
            .products
            .remove(product_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("product '{product_id}' does not exist")))
    }
}

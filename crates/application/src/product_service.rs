use std::sync::Arc;

use chrono::Utc;
use warden_core::{AppError, AppResult, ProductId, TeamId, UserIdentity};
use warden_domain::{
    Action, AuditAction, MAX_PRODUCTS_LIMIT_KEY, NotificationKind, Product, ProductStatus,
    Subject, scope_to_team, validate_product_fields,
};

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, EntitlementService, NotificationService,
    ProductRepository, TeamNotice, TeamRepository,
};

/// Input payload for creating or updating products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    /// Product name, 2 to 100 characters.
    pub name: String,
    /// Description, at most 500 characters.
    pub description: String,
    /// Lifecycle status.
    pub status: ProductStatus,
}

/// Application service for products owned by the caller's current team.
#[derive(Clone)]
pub struct ProductService {
    authorization_service: AuthorizationService,
    entitlement_service: EntitlementService,
    teams: Arc<dyn TeamRepository>,
    products: Arc<dyn ProductRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    notification_service: NotificationService,
}

impl ProductService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        entitlement_service: EntitlementService,
        teams: Arc<dyn TeamRepository>,
        products: Arc<dyn ProductRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            authorization_service,
            entitlement_service,
            teams,
            products,
            audit_repository,
            notification_service,
        }
    }

    /// Lists the current team's products.
    ///
    /// Callers without a current team, or outside it, see nothing.
    pub async fn list_products(&self, actor: &UserIdentity) -> AppResult<Vec<Product>> {
        self.authorization_service
            .require_permission(actor, Action::Read, Subject::Product)
            .await?;

        let team_id = self.member_team(actor).await?;
        let mut products = scope_to_team(self.products.list_products().await?, team_id.as_ref());
        products.sort_by(|left, right| left.created_at.cmp(&right.created_at));

        Ok(products)
    }

    /// Returns one product of the current team.
    pub async fn get_product(
        &self,
        actor: &UserIdentity,
        product_id: &ProductId,
    ) -> AppResult<Product> {
        self.authorization_service
            .require_permission(actor, Action::Read, Subject::Product)
            .await?;

        self.scoped_product(actor, product_id).await
    }

    /// Creates a product in the current team within the plan's quota.
    ///
    /// The quota is checked by the repository in the same step as the insert.
    pub async fn create_product(
        &self,
        actor: &UserIdentity,
        input: ProductInput,
    ) -> AppResult<Product> {
        self.authorization_service
            .require_permission(actor, Action::Create, Subject::Product)
            .await?;

        let team_id = self.member_team(actor).await?.ok_or_else(|| {
            AppError::Forbidden(format!(
                "user '{}' has no team to create products in",
                actor.user_id()
            ))
        })?;
        validate_product_fields(&input.name, &input.description)?;

        let limit = self
            .entitlement_service
            .get_limit(actor.user_id(), MAX_PRODUCTS_LIMIT_KEY)
            .await;

        let now = Utc::now();
        let product = Product {
            id: ProductId::generate(),
            team_id,
            name: input.name.trim().to_owned(),
            description: input.description,
            status: input.status,
            created_at: now,
            updated_at: now,
        };
        let product = self.products.create_product_within(product, limit).await?;

        self.audit(
            actor,
            AuditAction::ProductCreated,
            &product,
            Some(format!("created product '{}'", product.name)),
        )
        .await?;
        self.announce(
            actor,
            NotificationKind::ProductCreated,
            &product,
            format!("new product '{}' was created", product.name),
        )
        .await;

        Ok(product)
    }

    /// Updates a product of the current team.
    pub async fn update_product(
        &self,
        actor: &UserIdentity,
        product_id: &ProductId,
        input: ProductInput,
    ) -> AppResult<Product> {
        self.authorization_service
            .require_permission(actor, Action::Update, Subject::Product)
            .await?;
        validate_product_fields(&input.name, &input.description)?;

        let mut product = self.scoped_product(actor, product_id).await?;
        product.name = input.name.trim().to_owned();
        product.description = input.description;
        product.status = input.status;
        product.updated_at = Utc::now();
        let product = self.products.update_product(product).await?;

        self.audit(actor, AuditAction::ProductUpdated, &product, None)
            .await?;
        self.announce(
            actor,
            NotificationKind::ProductUpdated,
            &product,
            format!("product '{}' was updated", product.name),
        )
        .await;

        Ok(product)
    }

    /// Deletes a product of the current team.
    pub async fn delete_product(
        &self,
        actor: &UserIdentity,
        product_id: &ProductId,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, Action::Delete, Subject::Product)
            .await?;

        let product = self.scoped_product(actor, product_id).await?;
        self.products.delete_product(&product.id).await?;

        self.audit(actor, AuditAction::ProductDeleted, &product, None)
            .await?;
        self.announce(
            actor,
            NotificationKind::ProductDeleted,
            &product,
            format!("product '{}' was deleted", product.name),
        )
        .await;

        Ok(())
    }

    async fn member_team(&self, actor: &UserIdentity) -> AppResult<Option<TeamId>> {
        let Some(team_id) = actor.current_team_id() else {
            return Ok(None);
        };

        let member = self.teams.find_member(team_id, actor.user_id()).await?;
        Ok(member.map(|member| member.team_id))
    }

    async fn scoped_product(
        &self,
        actor: &UserIdentity,
        product_id: &ProductId,
    ) -> AppResult<Product> {
        let team_id = self.member_team(actor).await?;
        let candidate = self.products.find_product(product_id).await?;

        scope_to_team(candidate, team_id.as_ref())
            .pop()
            .ok_or_else(|| AppError::NotFound(format!("product '{product_id}' does not exist")))
    }

    async fn audit(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        product: &Product,
        detail: Option<String>,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.user_id().clone(),
                team_id: Some(product.team_id.clone()),
                action,
                resource_type: "product".to_owned(),
                resource_id: product.id.to_string(),
                detail,
            })
            .await
    }

    async fn announce(
        &self,
        actor: &UserIdentity,
        kind: NotificationKind,
        product: &Product,
        message: String,
    ) {
        self.notification_service
            .announce(TeamNotice {
                team_id: product.team_id.clone(),
                actor_id: actor.user_id().clone(),
                kind,
                entity_type: "product".to_owned(),
                entity_id: product.id.to_string(),
                message,
            })
            .await;
    }
}

//! Order orchestration - create, list and status changes.
//!
//! Every use case first resolves the acting user through the validation
//! transport, so the order service never trusts a user ID it has not seen
//! confirmed by the user service.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use uuid::Uuid;

use domain::{
    check_transition, compute_total, validate_items, NewOrderItem, Order, OrderError,
    OrderResult, OrderStatus, UserProfile, UserRole,
};
use messaging::ValidationTransport;

use crate::config::DEFAULT_ENRICHMENT_CONCURRENCY;
use crate::repository::OrderRepository;

/// An order together with a snapshot of its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedOrder {
    pub order: Order,
    pub user: UserProfile,
}

/// Order service trait for dependency injection.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Place a PENDING order for `user_id`
    async fn create_order(
        &self,
        user_id: Uuid,
        items: Vec<NewOrderItem>,
    ) -> OrderResult<EnrichedOrder>;

    /// All orders for ADMIN, own orders otherwise, newest first
    async fn list_orders(
        &self,
        requester_id: Uuid,
        role: UserRole,
    ) -> OrderResult<Vec<EnrichedOrder>>;

    /// Move an order to `status` if the requester's role allows it
    async fn update_order_status(
        &self,
        order_id: Uuid,
        requester_id: Uuid,
        status: OrderStatus,
    ) -> OrderResult<EnrichedOrder>;
}

/// Concrete implementation of OrderService.
pub struct OrderManager {
    repo: Arc<dyn OrderRepository>,
    validation: Arc<dyn ValidationTransport>,
    enrichment_concurrency: usize,
}

impl OrderManager {
    pub fn new(repo: Arc<dyn OrderRepository>, validation: Arc<dyn ValidationTransport>) -> Self {
        Self {
            repo,
            validation,
            enrichment_concurrency: DEFAULT_ENRICHMENT_CONCURRENCY,
        }
    }

    /// Cap on validation calls in flight while enriching an admin listing.
    pub fn with_enrichment_concurrency(mut self, limit: usize) -> Self {
        self.enrichment_concurrency = limit.max(1);
        self
    }

    /// Resolve a user or fail with the validation reason.
    async fn validated_user(&self, user_id: Uuid) -> OrderResult<UserProfile> {
        let response = self.validation.request_validation(user_id).await;
        let reason = response.reason().to_string();

        match response.into_profile() {
            Some(profile) => Ok(profile),
            None => {
                tracing::info!("User {} failed validation: {}", user_id, reason);
                Err(OrderError::validation(reason))
            }
        }
    }

    /// Resolve a user, falling back to a placeholder.
    async fn profile_or_placeholder(&self, user_id: Uuid) -> UserProfile {
        profile_or_placeholder(self.validation.as_ref(), user_id).await
    }

    /// One lookup per distinct owner, bounded by `enrichment_concurrency`.
    async fn owner_profiles(&self, orders: &[Order]) -> HashMap<Uuid, UserProfile> {
        let owners: HashSet<Uuid> = orders.iter().map(|order| order.user_id).collect();
        let validation = self.validation.as_ref();

        stream::iter(owners)
            .map(|user_id| async move {
                (user_id, profile_or_placeholder(validation, user_id).await)
            })
            .buffer_unordered(self.enrichment_concurrency)
            .collect()
            .await
    }
}

async fn profile_or_placeholder(validation: &dyn ValidationTransport, user_id: Uuid) -> UserProfile {
    validation
        .request_validation(user_id)
        .await
        .into_profile()
        .unwrap_or_else(|| {
            tracing::debug!("Owner {} could not be validated, using placeholder", user_id);
            UserProfile::placeholder(user_id)
        })
}

fn newest_first(mut orders: Vec<EnrichedOrder>) -> Vec<EnrichedOrder> {
    orders.sort_by(|a, b| b.order.created_at.cmp(&a.order.created_at));
    orders
}

#[async_trait]
impl OrderService for OrderManager {
    async fn create_order(
        &self,
        user_id: Uuid,
        items: Vec<NewOrderItem>,
    ) -> OrderResult<EnrichedOrder> {
        validate_items(&items)?;
        let total = compute_total(&items)?;
        let user = self.validated_user(user_id).await?;

        let order = self.repo.create(user_id, items, total).await?;

        tracing::info!(
            "Created order {} for user {} (total {})",
            order.id,
            user_id,
            order.total_amount
        );
        Ok(EnrichedOrder { order, user })
    }

    async fn list_orders(
        &self,
        requester_id: Uuid,
        role: UserRole,
    ) -> OrderResult<Vec<EnrichedOrder>> {
        match role {
            UserRole::Admin => {
                let orders = self.repo.find_all().await?;
                let profiles = self.owner_profiles(&orders).await;

                let enriched = orders
                    .into_iter()
                    .map(|order| {
                        let user = profiles
                            .get(&order.user_id)
                            .cloned()
                            .unwrap_or_else(|| UserProfile::placeholder(order.user_id));
                        EnrichedOrder { order, user }
                    })
                    .collect();

                Ok(newest_first(enriched))
            }
            UserRole::User => {
                let user = self.validated_user(requester_id).await?;
                let orders = self.repo.find_by_user_id(requester_id).await?;

                let enriched = orders
                    .into_iter()
                    .map(|order| EnrichedOrder {
                        order,
                        user: user.clone(),
                    })
                    .collect();

                Ok(newest_first(enriched))
            }
        }
    }

    async fn update_order_status(
        &self,
        order_id: Uuid,
        requester_id: Uuid,
        status: OrderStatus,
    ) -> OrderResult<EnrichedOrder> {
        let requester = self.validated_user(requester_id).await?;

        let order = match requester.role {
            UserRole::Admin => self.repo.find_by_id(order_id).await?,
            UserRole::User => {
                self.repo
                    .find_by_id_and_user_id(order_id, requester_id)
                    .await?
            }
        }
        .ok_or(OrderError::OrderNotFound)?;

        check_transition(order.status, status, requester.role).into_result(order.status, status)?;

        let updated = self.repo.update_status(order_id, status).await?;
        tracing::info!(
            "Order {} moved from {} to {} by {}",
            order_id,
            order.status,
            updated.status,
            requester_id
        );

        let user = if updated.is_owned_by(requester_id) {
            requester
        } else {
            self.profile_or_placeholder(updated.user_id).await
        };

        Ok(EnrichedOrder {
            order: updated,
            user,
        })
    }
}

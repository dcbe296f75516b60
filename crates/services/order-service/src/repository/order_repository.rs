//! Order repository backed by PostgreSQL.

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, LoaderTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::entities::order::{self, Entity as OrderEntity};
use super::entities::order_item::{self, Entity as OrderItemEntity};
use domain::{NewOrderItem, Order, OrderError, OrderItem, OrderResult, OrderStatus};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Order repository trait for dependency injection.
///
/// Listing methods return orders newest first, each with its items.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a PENDING order and its lines atomically
    async fn create(
        &self,
        user_id: Uuid,
        items: Vec<NewOrderItem>,
        total_amount: Decimal,
    ) -> OrderResult<Order>;

    /// Orders owned by one user
    async fn find_by_user_id(&self, user_id: Uuid) -> OrderResult<Vec<Order>>;

    /// Every order
    async fn find_all(&self) -> OrderResult<Vec<Order>>;

    /// Order by ID regardless of owner
    async fn find_by_id(&self, order_id: Uuid) -> OrderResult<Option<Order>>;

    /// Order by ID, only if owned by `user_id`
    async fn find_by_id_and_user_id(
        &self,
        order_id: Uuid,
        user_id: Uuid,
    ) -> OrderResult<Option<Order>>;

    /// Overwrite the status. Fails with `OrderNotFound` when absent.
    async fn update_status(&self, order_id: Uuid, status: OrderStatus) -> OrderResult<Order>;
}

/// Concrete implementation of OrderRepository
pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn with_items(&self, model: order::Model) -> OrderResult<Order> {
        let items = model
            .find_related(OrderItemEntity)
            .order_by_asc(order_item::Column::Position)
            .all(&self.db)
            .await
            .map_err(persistence)?;
        to_domain(model, items)
    }

    async fn load_all(&self, models: Vec<order::Model>) -> OrderResult<Vec<Order>> {
        let items = models
            .load_many(OrderItemEntity, &self.db)
            .await
            .map_err(persistence)?;

        models
            .into_iter()
            .zip(items)
            .map(|(model, items)| to_domain(model, items))
            .collect()
    }
}

fn persistence(err: DbErr) -> OrderError {
    tracing::error!("Order store error: {}", err);
    OrderError::persistence(err.to_string())
}

/// Lines come back in the order they were placed, whatever order the query
/// returned them in.
fn to_domain(model: order::Model, mut items: Vec<order_item::Model>) -> OrderResult<Order> {
    let status = OrderStatus::from_str(&model.status).map_err(|_| {
        OrderError::persistence(format!(
            "order {} has unknown status {:?}",
            model.id, model.status
        ))
    })?;
    items.sort_by_key(|item| item.position);

    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        status,
        total_amount: model.total_amount,
        items: items.into_iter().map(OrderItem::from).collect(),
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn create(
        &self,
        user_id: Uuid,
        items: Vec<NewOrderItem>,
        total_amount: Decimal,
    ) -> OrderResult<Order> {
        let now = chrono::Utc::now();
        let txn = self.db.begin().await.map_err(persistence)?;

        let model = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            status: Set(OrderStatus::Pending.to_string()),
            total_amount: Set(total_amount),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(persistence)?;

        let mut stored = Vec::with_capacity(items.len());
        for (position, item) in items.into_iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| OrderError::validation("Order has too many items"))?;
            let line = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(model.id),
                position: Set(position),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                price: Set(item.price),
                created_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(persistence)?;
            stored.push(line);
        }

        txn.commit().await.map_err(persistence)?;
        to_domain(model, stored)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> OrderResult<Vec<Order>> {
        let models = OrderEntity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(persistence)?;

        self.load_all(models).await
    }

    async fn find_all(&self) -> OrderResult<Vec<Order>> {
        let models = OrderEntity::find()
            .order_by_desc(order::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(persistence)?;

        self.load_all(models).await
    }

    async fn find_by_id(&self, order_id: Uuid) -> OrderResult<Option<Order>> {
        let model = OrderEntity::find_by_id(order_id)
            .one(&self.db)
            .await
            .map_err(persistence)?;

        match model {
            Some(model) => Ok(Some(self.with_items(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_id_and_user_id(
        &self,
        order_id: Uuid,
        user_id: Uuid,
    ) -> OrderResult<Option<Order>> {
        let model = OrderEntity::find_by_id(order_id)
            .filter(order::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(persistence)?;

        match model {
            Some(model) => Ok(Some(self.with_items(model).await?)),
            None => Ok(None),
        }
    }

    async fn update_status(&self, order_id: Uuid, status: OrderStatus) -> OrderResult<Order> {
        let model = OrderEntity::find_by_id(order_id)
            .one(&self.db)
            .await
            .map_err(persistence)?
            .ok_or(OrderError::OrderNotFound)?;

        let mut active: order::ActiveModel = model.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(persistence)?;
        self.with_items(model).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn line(order_id: Uuid, position: i32, product: &str) -> order_item::Model {
        order_item::Model {
            id: Uuid::new_v4(),
            order_id,
            position,
            product_id: product.to_string(),
            quantity: 1,
            price: Decimal::ONE,
            created_at: Utc::now(),
        }
    }

    fn header(status: &str) -> order::Model {
        let now = Utc::now();
        order::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status: status.to_string(),
            total_amount: Decimal::new(300, 2),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_items_follow_placement_order() {
        let model = header("PENDING");
        let rows = vec![
            line(model.id, 2, "c"),
            line(model.id, 0, "a"),
            line(model.id, 1, "b"),
        ];

        let order = to_domain(model, rows).unwrap();
        let products: Vec<_> = order.items.iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(products, ["a", "b", "c"]);
    }

    #[test]
    fn test_unknown_stored_status_is_persistence_error() {
        let result = to_domain(header("SHIPPED"), Vec::new());
        assert!(matches!(result, Err(OrderError::Persistence(_))));
    }
}

//! # Order Repository
//!
//! Database operations for orders and order items.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── insert() → Order { order_number: MAX + 1, status: completed }  │
//! │                                                                         │
//! │  2. ADD ITEMS (one per cart line, snapshot of name and prices)         │
//! │     └── insert_item() → OrderItem                                      │
//! │                                                                         │
//! │  3. MANAGE                                                             │
//! │     └── update_status() → new / completed / cancelled / returned /     │
//! │                           replaced                                      │
//! │                                                                         │
//! │  4. (COMPENSATION ONLY) DELETE                                         │
//! │     └── delete() → items and payments cascade                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shopkeep_core::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatus};

const SELECT_ORDER: &str = r#"
    SELECT
        id, order_number,
        total_amount_cents, total_cost_cents, total_profit_cents,
        status, customer_name, payment_status, paid_amount_cents,
        created_at, updated_at
    FROM orders
"#;

const SELECT_ITEM: &str = r#"
    SELECT
        id, order_id, product_id, product_name, quantity,
        unit_price_cents, unit_cost_cents,
        total_price_cents, total_cost_cents, profit_cents,
        custom_price_cents, discount_amount_cents, created_at
    FROM order_items
"#;

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order and assigns the next order number.
    pub async fn insert(&self, order: &NewOrder) -> DbResult<Order> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, total = order.total_amount_cents, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number,
                total_amount_cents, total_cost_cents, total_profit_cents,
                status, customer_name, payment_status, paid_amount_cents,
                created_at, updated_at
            ) VALUES (
                ?1, (SELECT COALESCE(MAX(order_number), 0) + 1 FROM orders),
                ?2, ?3, ?4,
                ?5, ?6, ?7, ?8,
                ?9, ?9
            )
            "#,
        )
        .bind(&id)
        .bind(order.total_amount_cents)
        .bind(order.total_cost_cents)
        .bind(order.total_profit_cents)
        .bind(order.status)
        .bind(&order.customer_name)
        .bind(order.payment_status)
        .bind(order.paid_amount_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let created = self.require(&id).await?;
        info!(id = %created.id, order_number = created.order_number, "Order created");
        Ok(created)
    }

    /// Inserts one order line.
    pub async fn insert_item(&self, order_id: &str, item: &NewOrderItem) -> DbResult<OrderItem> {
        let created = OrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            product_id: Some(item.product_id.clone()),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
            unit_cost_cents: item.unit_cost_cents,
            total_price_cents: item.total_price_cents,
            total_cost_cents: item.total_cost_cents,
            profit_cents: item.profit_cents,
            custom_price_cents: item.custom_price_cents,
            discount_amount_cents: item.discount_amount_cents,
            created_at: Utc::now(),
        };

        debug!(order_id = %order_id, product_id = %item.product_id, "Adding order item");

        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, product_id, product_name, quantity,
                unit_price_cents, unit_cost_cents,
                total_price_cents, total_cost_cents, profit_cents,
                custom_price_cents, discount_amount_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&created.id)
        .bind(&created.order_id)
        .bind(&created.product_id)
        .bind(&created.product_name)
        .bind(created.quantity)
        .bind(created.unit_price_cents)
        .bind(created.unit_cost_cents)
        .bind(created.total_price_cents)
        .bind(created.total_cost_cents)
        .bind(created.profit_cents)
        .bind(created.custom_price_cents)
        .bind(created.discount_amount_cents)
        .bind(created.created_at)
        .execute(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!("{SELECT_ORDER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    pub async fn get_by_number(&self, order_number: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!("{SELECT_ORDER} WHERE order_number = ?1"))
            .bind(order_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Orders newest first, optionally only those with `status`.
    pub async fn list(&self, status: Option<OrderStatus>) -> DbResult<Vec<Order>> {
        let orders = match status {
            Some(status) => {
                sqlx::query_as::<_, Order>(&format!(
                    "{SELECT_ORDER} WHERE status = ?1 ORDER BY created_at DESC, order_number DESC"
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Order>(&format!(
                    "{SELECT_ORDER} ORDER BY created_at DESC, order_number DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        debug!(count = orders.len(), "Listed orders");
        Ok(orders)
    }

    /// Orders created in `[start, end)`.
    pub async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "{SELECT_ORDER} WHERE created_at >= ?1 AND created_at < ?2 ORDER BY created_at"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    pub async fn items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "{SELECT_ITEM} WHERE order_id = ?1 ORDER BY created_at"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Items of every order created in `[start, end)`.
    pub async fn items_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "{SELECT_ITEM} WHERE order_id IN (
                SELECT id FROM orders WHERE created_at >= ?1 AND created_at < ?2
            )"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn update_status(&self, id: &str, status: OrderStatus) -> DbResult<Order> {
        debug!(id = %id, status = %status, "Updating order status");

        let result = sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        self.require(id).await
    }

    /// Removes an order together with its items and payments.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        info!(id = %id, "Order deleted");
        Ok(())
    }

    async fn require(&self, id: &str) -> DbResult<Order> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use shopkeep_core::{PaymentStatus, ProductInput};

    fn new_order(total: i64) -> NewOrder {
        NewOrder {
            total_amount_cents: total,
            total_cost_cents: total / 2,
            total_profit_cents: total - total / 2,
            status: OrderStatus::Completed,
            customer_name: None,
            payment_status: PaymentStatus::Paid,
            paid_amount_cents: total,
        }
    }

    async fn product(db: &Database, code: &str) -> String {
        db.products()
            .insert(&ProductInput {
                name: code.to_string(),
                code: code.to_string(),
                purchase_price_cents: 500,
                selling_price_cents: 1000,
                quantity: 10,
                low_stock_threshold: 5,
                image_url: None,
            })
            .await
            .unwrap()
            .id
    }

    fn item(product_id: &str, name: &str) -> NewOrderItem {
        NewOrderItem {
            product_id: product_id.to_string(),
            product_name: name.to_string(),
            quantity: 2,
            unit_price_cents: 1000,
            unit_cost_cents: 500,
            total_price_cents: 2000,
            total_cost_cents: 1000,
            profit_cents: 1000,
            custom_price_cents: None,
            discount_amount_cents: 0,
        }
    }

    #[tokio::test]
    async fn test_order_numbers_increase() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let orders = db.orders();

        let first = orders.insert(&new_order(1000)).await.unwrap();
        let second = orders.insert(&new_order(2000)).await.unwrap();

        assert_eq!(first.order_number, 1);
        assert_eq!(second.order_number, 2);
        assert_eq!(second.status, OrderStatus::Completed);
        assert_eq!(orders.get_by_number(2).await.unwrap().unwrap().id, second.id);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let orders = db.orders();

        let a = orders.insert(&new_order(1000)).await.unwrap();
        orders.insert(&new_order(2000)).await.unwrap();
        orders.update_status(&a.id, OrderStatus::Cancelled).await.unwrap();

        assert_eq!(orders.list(None).await.unwrap().len(), 2);
        let cancelled = orders.list(Some(OrderStatus::Cancelled)).await.unwrap();
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].id, a.id);
    }

    #[tokio::test]
    async fn test_items_survive_product_deletion() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = product(&db, "OIL-1").await;
        let order = db.orders().insert(&new_order(2000)).await.unwrap();
        db.orders().insert_item(&order.id, &item(&product_id, "OIL-1")).await.unwrap();

        db.products().delete(&product_id).await.unwrap();

        let items = db.orders().items(&order.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, None);
        assert_eq!(items[0].product_name, "OIL-1");
    }

    #[tokio::test]
    async fn test_delete_cascades_items() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = product(&db, "OIL-1").await;
        let order = db.orders().insert(&new_order(2000)).await.unwrap();
        db.orders().insert_item(&order.id, &item(&product_id, "OIL-1")).await.unwrap();

        db.orders().delete(&order.id).await.unwrap();

        assert!(db.orders().get_by_id(&order.id).await.unwrap().is_none());
        assert!(db.orders().items(&order.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_created_between() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = product(&db, "OIL-1").await;
        let order = db.orders().insert(&new_order(2000)).await.unwrap();
        db.orders().insert_item(&order.id, &item(&product_id, "OIL-1")).await.unwrap();

        let start = order.created_at - chrono::Duration::hours(1);
        let end = order.created_at + chrono::Duration::hours(1);
        assert_eq!(db.orders().list_created_between(start, end).await.unwrap().len(), 1);
        assert_eq!(db.orders().items_created_between(start, end).await.unwrap().len(), 1);

        let later = end + chrono::Duration::days(40);
        assert!(db.orders().list_created_between(end, later).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status_missing_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.orders().update_status("nope", OrderStatus::Returned).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}

//! # Store Backend
//!
//! The writes order submission needs, as a trait. [`Database`] is the real
//! implementation; tests plug in in-memory doubles that record calls and
//! inject failures.

use async_trait::async_trait;
use shopkeep_core::{NewOrder, NewOrderItem, NewPayment, Order, OrderItem, PaymentRecord};

use crate::error::DbResult;
use crate::pool::Database;

#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Inserts the order row and returns it with id and order number.
    async fn create_order(&self, order: &NewOrder) -> DbResult<Order>;

    async fn create_order_item(&self, order_id: &str, item: &NewOrderItem) -> DbResult<OrderItem>;

    /// Removes `quantity` units only if that many are on hand.
    async fn decrement_stock(&self, product_id: &str, quantity: i64) -> DbResult<()>;

    /// Puts back units taken by [`decrement_stock`](Self::decrement_stock).
    async fn restore_stock(&self, product_id: &str, quantity: i64) -> DbResult<()>;

    async fn record_payment(&self, order_id: &str, payment: &NewPayment) -> DbResult<PaymentRecord>;

    /// Deletes an order with its items and payments.
    async fn delete_order(&self, order_id: &str) -> DbResult<()>;
}

#[async_trait]
impl StoreBackend for Database {
    async fn create_order(&self, order: &NewOrder) -> DbResult<Order> {
        self.orders().insert(order).await
    }

    async fn create_order_item(&self, order_id: &str, item: &NewOrderItem) -> DbResult<OrderItem> {
        self.orders().insert_item(order_id, item).await
    }

    async fn decrement_stock(&self, product_id: &str, quantity: i64) -> DbResult<()> {
        self.products().decrement_stock(product_id, quantity).await
    }

    async fn restore_stock(&self, product_id: &str, quantity: i64) -> DbResult<()> {
        self.products().adjust_stock(product_id, quantity).await.map(|_| ())
    }

    async fn record_payment(&self, order_id: &str, payment: &NewPayment) -> DbResult<PaymentRecord> {
        self.payments().insert(order_id, payment).await
    }

    async fn delete_order(&self, order_id: &str) -> DbResult<()> {
        self.orders().delete(order_id).await
    }
}

//! # Payment Repository
//!
//! The `payment_history` table: money received against an order, starting
//! with the initial payment recorded at checkout.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use shopkeep_core::{NewPayment, PaymentRecord};

#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    pub async fn insert(&self, order_id: &str, payment: &NewPayment) -> DbResult<PaymentRecord> {
        let record = PaymentRecord {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            payment_amount_cents: payment.payment_amount_cents,
            notes: payment.notes.clone(),
            created_at: Utc::now(),
        };

        debug!(
            order_id = %order_id,
            amount = record.payment_amount_cents,
            "Recording payment"
        );

        sqlx::query(
            r#"
            INSERT INTO payment_history (id, order_id, payment_amount_cents, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&record.id)
        .bind(&record.order_id)
        .bind(record.payment_amount_cents)
        .bind(&record.notes)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    /// Payments for an order, oldest first.
    pub async fn for_order(&self, order_id: &str) -> DbResult<Vec<PaymentRecord>> {
        let payments = sqlx::query_as::<_, PaymentRecord>(
            r#"
            SELECT id, order_id, payment_amount_cents, notes, created_at
            FROM payment_history
            WHERE order_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    pub async fn total_paid(&self, order_id: &str) -> DbResult<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(payment_amount_cents) FROM payment_history WHERE order_id = ?1",
        )
        .bind(order_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::DbError;
    use shopkeep_core::{NewOrder, OrderStatus, PaymentStatus, INITIAL_PAYMENT_NOTE};

    #[tokio::test]
    async fn test_payments_for_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = db
            .orders()
            .insert(&NewOrder {
                total_amount_cents: 20000,
                total_cost_cents: 12000,
                total_profit_cents: 8000,
                status: OrderStatus::Completed,
                customer_name: Some("Ali".to_string()),
                payment_status: PaymentStatus::PartiallyPaid,
                paid_amount_cents: 12000,
            })
            .await
            .unwrap();

        assert_eq!(db.payments().total_paid(&order.id).await.unwrap(), 0);

        db.payments()
            .insert(
                &order.id,
                &NewPayment {
                    payment_amount_cents: 12000,
                    notes: Some(INITIAL_PAYMENT_NOTE.to_string()),
                },
            )
            .await
            .unwrap();

        let payments = db.payments().for_order(&order.id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].notes.as_deref(), Some(INITIAL_PAYMENT_NOTE));
        assert_eq!(db.payments().total_paid(&order.id).await.unwrap(), 12000);
    }

    #[tokio::test]
    async fn test_payment_requires_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .payments()
            .insert(
                "missing",
                &NewPayment {
                    payment_amount_cents: 100,
                    notes: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}

//! # Checkout
//!
//! Writes a validated order draft to a [`StoreBackend`] as a sequence of
//! steps, recording the outcome of each one.
//!
//! ## Submission Saga
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        submit(draft)                                    │
//! │                                                                         │
//! │  draft.prepare() ── Err ──► CheckoutError::Validation (0 writes)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  create_order ──── Err ──► CheckoutError::OrderCreation (0 writes)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  for each line:                                                         │
//! │     create_order_item ─┐                                                │
//! │     decrement_stock ───┤ Err ─┬─ BestEffort: record, continue          │
//! │                        │      └─ Compensate: restore stock taken so    │
//! │                        │         far, delete order, RolledBack         │
//! │       ▼                                                                 │
//! │  record_payment (paid > 0) ─ Err ─ same policy as the line steps       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SubmissionReceipt { order, items, payment, failed_steps }             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shopkeep_core::{Order, OrderDraft, OrderItem, PaymentRecord, ValidationError};
use tracing::{error, info, warn};

use crate::backend::StoreBackend;
use crate::error::{CheckoutError, DbError};

// =============================================================================
// Policy
// =============================================================================

/// What to do when a step after order creation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPolicy {
    /// Keep going, report failed steps on the receipt.
    #[default]
    BestEffort,
    /// Undo everything written so far and fail the submission.
    Compensate,
}

impl fmt::Display for CheckoutPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutPolicy::BestEffort => f.write_str("best_effort"),
            CheckoutPolicy::Compensate => f.write_str("compensate"),
        }
    }
}

impl FromStr for CheckoutPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "best_effort" => Ok(CheckoutPolicy::BestEffort),
            "compensate" => Ok(CheckoutPolicy::Compensate),
            _ => Err(ValidationError::InvalidFormat {
                field: "checkout policy".to_string(),
                reason: "must be best_effort or compensate".to_string(),
            }),
        }
    }
}

// =============================================================================
// Receipt
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SagaStep {
    InsertItem,
    DecrementStock,
    RecordPayment,
}

impl fmt::Display for SagaStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SagaStep::InsertItem => f.write_str("order item insert"),
            SagaStep::DecrementStock => f.write_str("stock update"),
            SagaStep::RecordPayment => f.write_str("payment record"),
        }
    }
}

/// A step that did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedStep {
    pub step: SagaStep,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub error: String,
}

/// Outcome of a submission that created an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payment: Option<PaymentRecord>,
    /// Empty unless the best-effort policy skipped over failures.
    pub failed_steps: Vec<FailedStep>,
}

impl SubmissionReceipt {
    pub fn is_complete(&self) -> bool {
        self.failed_steps.is_empty()
    }
}

// =============================================================================
// Submission
// =============================================================================

/// Stock taken so far, for compensation.
struct Decremented {
    product_id: String,
    quantity: i64,
}

/// Validates `draft` and writes it through `backend`.
///
/// The draft itself is not modified; callers reset it after an `Ok`.
pub async fn submit<B>(
    backend: &B,
    draft: &OrderDraft,
    policy: CheckoutPolicy,
) -> Result<SubmissionReceipt, CheckoutError>
where
    B: StoreBackend + ?Sized,
{
    let plan = draft.prepare()?;

    let order = backend
        .create_order(&plan.order)
        .await
        .map_err(CheckoutError::OrderCreation)?;
    if order.id.is_empty() {
        return Err(CheckoutError::OrderCreation(DbError::Internal(
            "store returned an order without an id".to_string(),
        )));
    }

    let mut receipt = SubmissionReceipt {
        order,
        items: Vec::with_capacity(plan.lines.len()),
        payment: None,
        failed_steps: Vec::new(),
    };
    let mut decremented: Vec<Decremented> = Vec::new();

    for line in &plan.lines {
        let outcome = match backend.create_order_item(&receipt.order.id, line).await {
            Ok(item) => {
                receipt.items.push(item);
                backend
                    .decrement_stock(&line.product_id, line.quantity)
                    .await
                    .map(|()| {
                        decremented.push(Decremented {
                            product_id: line.product_id.clone(),
                            quantity: line.quantity,
                        })
                    })
                    .map_err(|e| (SagaStep::DecrementStock, e))
            }
            Err(e) => Err((SagaStep::InsertItem, e)),
        };

        if let Err((step, err)) = outcome {
            warn!(
                order_id = %receipt.order.id,
                product_id = %line.product_id,
                step = %step,
                error = %err,
                "Checkout step failed"
            );

            if policy == CheckoutPolicy::Compensate {
                return Err(compensate(backend, &receipt.order, &decremented, step, &line.product_name, err).await);
            }

            receipt.failed_steps.push(FailedStep {
                step,
                product_id: Some(line.product_id.clone()),
                product_name: Some(line.product_name.clone()),
                error: err.to_string(),
            });
        }
    }

    if let Some(payment) = &plan.initial_payment {
        match backend.record_payment(&receipt.order.id, payment).await {
            Ok(record) => receipt.payment = Some(record),
            Err(err) => {
                warn!(
                    order_id = %receipt.order.id,
                    amount = payment.payment_amount_cents,
                    error = %err,
                    "Initial payment was not recorded"
                );

                if policy == CheckoutPolicy::Compensate {
                    return Err(compensate(
                        backend,
                        &receipt.order,
                        &decremented,
                        SagaStep::RecordPayment,
                        "initial payment",
                        err,
                    )
                    .await);
                }

                receipt.failed_steps.push(FailedStep {
                    step: SagaStep::RecordPayment,
                    product_id: None,
                    product_name: None,
                    error: err.to_string(),
                });
            }
        }
    }

    info!(
        order_id = %receipt.order.id,
        order_number = receipt.order.order_number,
        items = receipt.items.len(),
        failed_steps = receipt.failed_steps.len(),
        "Order submitted"
    );

    Ok(receipt)
}

/// Restores decremented stock and deletes the order.
async fn compensate<B>(
    backend: &B,
    order: &Order,
    decremented: &[Decremented],
    step: SagaStep,
    product_name: &str,
    cause: DbError,
) -> CheckoutError
where
    B: StoreBackend + ?Sized,
{
    let mut problems = Vec::new();

    for taken in decremented.iter().rev() {
        if let Err(e) = backend.restore_stock(&taken.product_id, taken.quantity).await {
            problems.push(format!("restoring {} x{}: {e}", taken.product_id, taken.quantity));
        }
    }

    if let Err(e) = backend.delete_order(&order.id).await {
        problems.push(format!("deleting order: {e}"));
    }

    if problems.is_empty() {
        info!(order_id = %order.id, "Order rolled back");
        CheckoutError::RolledBack {
            order_number: order.order_number,
            step: step.to_string(),
            product_name: product_name.to_string(),
            source: cause,
        }
    } else {
        error!(order_id = %order.id, problems = ?problems, "Rollback incomplete");
        CheckoutError::CompensationFailed {
            order_number: order.order_number,
            order_id: order.id.clone(),
            reason: format!("{step} failed ({cause}); {}", problems.join("; ")),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbResult;
    use crate::pool::{Database, DbConfig};
    use async_trait::async_trait;
    use chrono::Utc;
    use shopkeep_core::{
        Money, NewOrder, NewOrderItem, NewPayment, OrderStatus, PaymentStatus, Product,
        ProductInput, INITIAL_PAYMENT_NOTE,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;

    // -------------------------------------------------------------------------
    // Recording backend
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<String>>,
        stock: Mutex<HashMap<String, i64>>,
        fail_order: bool,
        fail_item_for: Option<String>,
        fail_payment: bool,
        fail_restore: bool,
    }

    impl RecordingBackend {
        fn with_stock(products: &[&Product]) -> Self {
            let backend = RecordingBackend::default();
            {
                let mut stock = backend.stock.lock().unwrap();
                for p in products {
                    stock.insert(p.id.clone(), p.quantity);
                }
            }
            backend
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn stock_of(&self, id: &str) -> i64 {
            self.stock.lock().unwrap()[id]
        }
    }

    #[async_trait]
    impl StoreBackend for RecordingBackend {
        async fn create_order(&self, order: &NewOrder) -> DbResult<Order> {
            self.record("create_order".to_string());
            if self.fail_order {
                return Err(DbError::QueryFailed("disk I/O error".to_string()));
            }
            let now = Utc::now();
            Ok(Order {
                id: "order-1".to_string(),
                order_number: 7,
                total_amount_cents: order.total_amount_cents,
                total_cost_cents: order.total_cost_cents,
                total_profit_cents: order.total_profit_cents,
                status: order.status,
                customer_name: order.customer_name.clone(),
                payment_status: order.payment_status,
                paid_amount_cents: order.paid_amount_cents,
                created_at: now,
                updated_at: now,
            })
        }

        async fn create_order_item(&self, order_id: &str, item: &NewOrderItem) -> DbResult<OrderItem> {
            self.record(format!("item:{}", item.product_name));
            if self.fail_item_for.as_deref() == Some(item.product_name.as_str()) {
                return Err(DbError::QueryFailed("item rejected".to_string()));
            }
            Ok(OrderItem {
                id: format!("item-{}", item.product_name),
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
            })
        }

        async fn decrement_stock(&self, product_id: &str, quantity: i64) -> DbResult<()> {
            self.record(format!("decrement:{quantity}"));
            let mut stock = self.stock.lock().unwrap();
            let on_hand = stock.entry(product_id.to_string()).or_insert(0);
            if *on_hand < quantity {
                return Err(DbError::InsufficientStock {
                    product_id: product_id.to_string(),
                    requested: quantity,
                });
            }
            *on_hand -= quantity;
            Ok(())
        }

        async fn restore_stock(&self, product_id: &str, quantity: i64) -> DbResult<()> {
            self.record(format!("restore:{quantity}"));
            if self.fail_restore {
                return Err(DbError::QueryFailed("database is locked".to_string()));
            }
            *self.stock.lock().unwrap().entry(product_id.to_string()).or_insert(0) += quantity;
            Ok(())
        }

        async fn record_payment(&self, order_id: &str, payment: &NewPayment) -> DbResult<PaymentRecord> {
            self.record(format!("payment:{}", payment.payment_amount_cents));
            if self.fail_payment {
                return Err(DbError::QueryFailed("payment rejected".to_string()));
            }
            Ok(PaymentRecord {
                id: "payment-1".to_string(),
                order_id: order_id.to_string(),
                payment_amount_cents: payment.payment_amount_cents,
                notes: payment.notes.clone(),
                created_at: Utc::now(),
            })
        }

        async fn delete_order(&self, _order_id: &str) -> DbResult<()> {
            self.record("delete_order".to_string());
            Ok(())
        }
    }

    fn product(name: &str, cost: i64, price: i64, stock: i64) -> Product {
        Product::new(name, name, Money::from_cents(cost), Money::from_cents(price), stock)
    }

    fn draft_with(lines: &[(&Product, i64)]) -> OrderDraft {
        let mut draft = OrderDraft::new();
        for (product, qty) in lines {
            for _ in 0..*qty {
                draft.cart_mut().add_line(product).unwrap();
            }
        }
        draft
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_invalid_drafts_make_no_calls() {
        let oil = product("OIL", 6000, 10000, 5);
        let backend = RecordingBackend::with_stock(&[&oil]);

        let empty = OrderDraft::new();
        let err = submit(&backend, &empty, CheckoutPolicy::BestEffort).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(ValidationError::EmptyCart)));

        let mut negative = draft_with(&[(&oil, 2)]);
        negative.set_order_discount(Money::from_cents(-1));
        assert!(submit(&backend, &negative, CheckoutPolicy::BestEffort).await.is_err());

        let mut too_much = draft_with(&[(&oil, 2)]);
        too_much.set_order_discount(Money::from_cents(20001));
        assert!(submit(&backend, &too_much, CheckoutPolicy::BestEffort).await.is_err());

        let mut nameless = draft_with(&[(&oil, 2)]);
        nameless.set_debt_amount(Money::from_cents(100));
        nameless.set_customer_name("  ");
        assert!(submit(&backend, &nameless, CheckoutPolicy::BestEffort).await.is_err());

        let mut over_debt = draft_with(&[(&oil, 2)]);
        over_debt.set_debt_amount(Money::from_cents(20001));
        over_debt.set_customer_name("Ali");
        assert!(submit(&backend, &over_debt, CheckoutPolicy::Compensate).await.is_err());

        assert!(backend.calls().is_empty());
    }

    // -------------------------------------------------------------------------
    // Happy path
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_sequence_of_writes() {
        let oil = product("OIL", 6000, 10000, 5);
        let tea = product("TEA", 300, 500, 5);
        let backend = RecordingBackend::with_stock(&[&oil, &tea]);
        let draft = draft_with(&[(&oil, 2), (&tea, 1)]);

        let receipt = submit(&backend, &draft, CheckoutPolicy::BestEffort).await.unwrap();

        assert_eq!(
            backend.calls(),
            vec![
                "create_order",
                "item:OIL",
                "decrement:2",
                "item:TEA",
                "decrement:1",
                "payment:20500",
            ]
        );
        assert!(receipt.is_complete());
        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.order.status, OrderStatus::Completed);
        assert_eq!(receipt.order.payment_status, PaymentStatus::Paid);
        assert_eq!(
            receipt.payment.as_ref().and_then(|p| p.notes.as_deref()),
            Some(INITIAL_PAYMENT_NOTE)
        );
        assert_eq!(backend.stock_of(&oil.id), 3);
        assert_eq!(backend.stock_of(&tea.id), 4);
    }

    #[tokio::test]
    async fn test_full_debt_records_no_payment() {
        let oil = product("OIL", 6000, 10000, 5);
        let backend = RecordingBackend::with_stock(&[&oil]);
        let mut draft = draft_with(&[(&oil, 2)]);
        draft.set_debt_amount(Money::from_cents(20000));
        draft.set_customer_name("Ali");

        let receipt = submit(&backend, &draft, CheckoutPolicy::BestEffort).await.unwrap();

        assert_eq!(receipt.order.payment_status, PaymentStatus::Debt);
        assert_eq!(receipt.order.paid_amount_cents, 0);
        assert!(receipt.payment.is_none());
        assert!(!backend.calls().iter().any(|c| c.starts_with("payment")));
    }

    // -------------------------------------------------------------------------
    // Failures
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_order_creation_failure_stops_everything() {
        let oil = product("OIL", 6000, 10000, 5);
        let backend = RecordingBackend {
            fail_order: true,
            ..RecordingBackend::with_stock(&[&oil])
        };
        let draft = draft_with(&[(&oil, 1)]);

        let err = submit(&backend, &draft, CheckoutPolicy::BestEffort).await.unwrap_err();

        assert!(matches!(err, CheckoutError::OrderCreation(_)));
        assert_eq!(backend.calls(), vec!["create_order"]);
        assert_eq!(backend.stock_of(&oil.id), 5);
    }

    #[tokio::test]
    async fn test_best_effort_continues_past_failed_line() {
        let oil = product("OIL", 6000, 10000, 5);
        let tea = product("TEA", 300, 500, 5);
        let backend = RecordingBackend {
            fail_item_for: Some("OIL".to_string()),
            ..RecordingBackend::with_stock(&[&oil, &tea])
        };
        let draft = draft_with(&[(&oil, 2), (&tea, 1)]);

        let receipt = submit(&backend, &draft, CheckoutPolicy::BestEffort).await.unwrap();

        assert!(!receipt.is_complete());
        assert_eq!(receipt.failed_steps.len(), 1);
        assert_eq!(receipt.failed_steps[0].step, SagaStep::InsertItem);
        assert_eq!(receipt.failed_steps[0].product_id.as_deref(), Some(oil.id.as_str()));
        assert_eq!(receipt.items.len(), 1);
        // The failed line's stock is left alone.
        assert_eq!(backend.stock_of(&oil.id), 5);
        assert_eq!(backend.stock_of(&tea.id), 4);
        assert!(receipt.payment.is_some());
    }

    #[tokio::test]
    async fn test_best_effort_reports_stock_shortfall() {
        let oil = product("OIL", 6000, 10000, 5);
        let backend = RecordingBackend::with_stock(&[&oil]);
        // Someone else sold four in the meantime.
        backend.stock.lock().unwrap().insert(oil.id.clone(), 1);
        let draft = draft_with(&[(&oil, 2)]);

        let receipt = submit(&backend, &draft, CheckoutPolicy::BestEffort).await.unwrap();

        assert_eq!(receipt.failed_steps.len(), 1);
        assert_eq!(receipt.failed_steps[0].step, SagaStep::DecrementStock);
        assert_eq!(backend.stock_of(&oil.id), 1);
    }

    #[tokio::test]
    async fn test_compensate_restores_stock_and_deletes_order() {
        let oil = product("OIL", 6000, 10000, 5);
        let tea = product("TEA", 300, 500, 5);
        let backend = RecordingBackend {
            fail_item_for: Some("TEA".to_string()),
            ..RecordingBackend::with_stock(&[&oil, &tea])
        };
        let draft = draft_with(&[(&oil, 2), (&tea, 1)]);

        let err = submit(&backend, &draft, CheckoutPolicy::Compensate).await.unwrap_err();

        match err {
            CheckoutError::RolledBack { order_number, step, product_name, .. } => {
                assert_eq!(order_number, 7);
                assert_eq!(step, "order item insert");
                assert_eq!(product_name, "TEA");
            }
            other => panic!("expected rollback, got {other:?}"),
        }
        assert_eq!(backend.stock_of(&oil.id), 5);
        assert_eq!(backend.calls().last().map(String::as_str), Some("delete_order"));
    }

    #[tokio::test]
    async fn test_compensate_on_payment_failure() {
        let oil = product("OIL", 6000, 10000, 5);
        let backend = RecordingBackend {
            fail_payment: true,
            ..RecordingBackend::with_stock(&[&oil])
        };
        let draft = draft_with(&[(&oil, 3)]);

        let err = submit(&backend, &draft, CheckoutPolicy::Compensate).await.unwrap_err();

        assert!(matches!(err, CheckoutError::RolledBack { .. }));
        assert_eq!(backend.stock_of(&oil.id), 5);
    }

    #[tokio::test]
    async fn test_failed_compensation_needs_reconciliation() {
        let oil = product("OIL", 6000, 10000, 5);
        let backend = RecordingBackend {
            fail_payment: true,
            fail_restore: true,
            ..RecordingBackend::with_stock(&[&oil])
        };
        let draft = draft_with(&[(&oil, 1)]);

        let err = submit(&backend, &draft, CheckoutPolicy::Compensate).await.unwrap_err();

        match err {
            CheckoutError::CompensationFailed { order_id, .. } => assert_eq!(order_id, "order-1"),
            other => panic!("expected compensation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("best-effort".parse::<CheckoutPolicy>().unwrap(), CheckoutPolicy::BestEffort);
        assert_eq!(" Compensate ".parse::<CheckoutPolicy>().unwrap(), CheckoutPolicy::Compensate);
        assert!("retry".parse::<CheckoutPolicy>().is_err());
        assert_eq!(CheckoutPolicy::default(), CheckoutPolicy::BestEffort);
    }

    // -------------------------------------------------------------------------
    // Against SQLite
    // -------------------------------------------------------------------------

    async fn seeded(db: &Database, code: &str, stock: i64) -> Product {
        db.products()
            .insert(&ProductInput {
                name: format!("{code} name"),
                code: code.to_string(),
                purchase_price_cents: 6000,
                selling_price_cents: 10000,
                quantity: stock,
                low_stock_threshold: 5,
                image_url: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_against_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let oil = seeded(&db, "OIL", 5).await;

        let mut draft = draft_with(&[(&oil, 2)]);
        draft.set_debt_amount(Money::from_cents(8000));
        draft.set_customer_name("Ali");

        let receipt = submit(&db, &draft, CheckoutPolicy::BestEffort).await.unwrap();

        assert!(receipt.is_complete());
        assert_eq!(receipt.order.order_number, 1);
        assert_eq!(receipt.order.payment_status, PaymentStatus::PartiallyPaid);
        assert_eq!(receipt.order.paid_amount_cents, 12000);

        let stored = db.products().get_by_id(&oil.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 3);
        assert_eq!(db.orders().items(&receipt.order.id).await.unwrap().len(), 1);
        assert_eq!(db.payments().total_paid(&receipt.order.id).await.unwrap(), 12000);
    }

    #[tokio::test]
    async fn test_compensate_against_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let oil = seeded(&db, "OIL", 5).await;
        let tea = seeded(&db, "TEA", 5).await;
        let draft = draft_with(&[(&oil, 2), (&tea, 3)]);

        // Stock moved underneath the cart snapshot.
        db.products().adjust_stock(&tea.id, -4).await.unwrap();

        let err = submit(&db, &draft, CheckoutPolicy::Compensate).await.unwrap_err();
        assert!(matches!(err, CheckoutError::RolledBack { .. }));

        assert_eq!(db.products().get_by_id(&oil.id).await.unwrap().unwrap().quantity, 5);
        assert_eq!(db.products().get_by_id(&tea.id).await.unwrap().unwrap().quantity, 1);
        assert!(db.orders().list(None).await.unwrap().is_empty());
    }
}

//! # Order Commands
//!
//! Building and submitting an order, then looking orders up afterwards.
//!
//! ## Order Entry
//! ```text
//! shopkeep order new --item OIL-1:2 --item TEA-3@4.50 --discount 5 \
//!                    --debt 80 --customer "Ali"
//!
//!   --item CODE[:QTY][@PRICE]     one cart line; PRICE overrides the
//!                                 selling price for that line
//!        │
//!        ▼
//!   DraftState (cart + discount + debt + customer)
//!        │
//!        ├── --dry-run ──► OrderPreview (totals, payment status, margin)
//!        │
//!        ▼
//!   checkout saga ──► ReceiptDto (order, items, payment, failed steps)
//! ```

use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info};

use crate::commands::product::find_by_code;
use crate::error::ApiError;
use crate::state::{AppConfig, DbState, DraftState};
use shopkeep_core::report::outstanding_balance;
use shopkeep_core::{
    validation, Money, Order, OrderDraft, OrderItem, OrderStatus, PaymentRecord, PaymentStatus,
    ValidationError,
};
use shopkeep_db::{FailedStep, SubmissionReceipt};

// =============================================================================
// Arguments
// =============================================================================

/// One `--item` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub code: String,
    pub quantity: i64,
    pub price: Option<Money>,
}

impl FromStr for ItemSpec {
    type Err = ValidationError;

    /// `CODE`, `CODE:QTY`, `CODE@PRICE` or `CODE:QTY@PRICE`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, price) = match s.split_once('@') {
            Some((head, price)) => (head, Some(price.parse::<Money>()?)),
            None => (s, None),
        };

        let (code, quantity) = match head.split_once(':') {
            Some((code, qty)) => {
                let qty = qty.trim().parse::<i64>().map_err(|_| ValidationError::InvalidFormat {
                    field: "quantity".to_string(),
                    reason: format!("'{qty}' is not a whole number"),
                })?;
                (code, qty)
            }
            None => (head, 1),
        };

        let code = code.trim().to_string();
        validation::validate_product_code(&code)?;
        validation::validate_line_quantity(quantity)?;

        Ok(ItemSpec { code, quantity, price })
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewOrderArgs {
    pub items: Vec<ItemSpec>,
    pub customer: Option<String>,
    pub discount: Option<Money>,
    pub debt: Option<Money>,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinePreview {
    pub code: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub amount_cents: i64,
    /// Markdown against the selling price; negative when marked up.
    pub discount_cents: i64,
    pub marked_down: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPreview {
    pub lines: Vec<LinePreview>,
    pub cart_amount_cents: i64,
    pub order_discount_cents: i64,
    pub total_discount_cents: i64,
    pub final_amount_cents: i64,
    pub final_profit_cents: i64,
    /// Basis points, present only when there is profit to show.
    pub margin_bps: Option<i64>,
    pub debt_cents: i64,
    pub paid_cents: i64,
    pub payment_status: PaymentStatus,
    pub customer_name: Option<String>,
}

impl From<&OrderDraft> for OrderPreview {
    fn from(draft: &OrderDraft) -> Self {
        let totals = draft.totals();
        let terms = draft.payment_terms();
        let customer = draft.customer_name().trim();

        OrderPreview {
            lines: draft
                .cart()
                .lines()
                .map(|line| LinePreview {
                    code: line.product.code.clone(),
                    name: line.product.name.clone(),
                    quantity: line.quantity,
                    unit_price_cents: line.effective_price().cents(),
                    amount_cents: line.amount().cents(),
                    discount_cents: line.discount().cents(),
                    marked_down: line.is_marked_down(),
                })
                .collect(),
            cart_amount_cents: totals.cart.amount.cents(),
            order_discount_cents: totals.order_discount.cents(),
            total_discount_cents: totals.total_discount.cents(),
            final_amount_cents: totals.final_amount.cents(),
            final_profit_cents: totals.final_profit.cents(),
            margin_bps: totals.display_margin_bps(),
            debt_cents: draft.debt_amount().cents(),
            paid_cents: terms.paid_amount.cents(),
            payment_status: terms.status,
            customer_name: (!customer.is_empty()).then(|| customer.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptDto {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payment: Option<PaymentRecord>,
    pub failed_steps: Vec<FailedStep>,
}

impl From<SubmissionReceipt> for ReceiptDto {
    fn from(r: SubmissionReceipt) -> Self {
        ReceiptDto {
            order: r.order,
            items: r.items,
            payment: r.payment,
            failed_steps: r.failed_steps,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payments: Vec<PaymentRecord>,
    pub outstanding_cents: i64,
}

/// What `order new` produced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderOutcome {
    Preview(OrderPreview),
    Submitted(ReceiptDto),
}

// =============================================================================
// Commands
// =============================================================================

/// Loads the arguments into a fresh draft.
///
/// Lines are added through the cart, so each one is checked against the
/// stock the product had when it was looked up.
pub async fn build_draft(db: &DbState, draft: &DraftState, args: &NewOrderArgs) -> Result<(), ApiError> {
    draft.with_draft_mut(OrderDraft::reset);

    for spec in &args.items {
        let product = find_by_code(db, &spec.code).await?;
        debug!(code = %product.code, quantity = spec.quantity, "Adding line");

        draft.with_draft_mut(|d| -> Result<(), ApiError> {
            d.cart_mut().add_line(&product)?;
            if spec.quantity > 1 {
                d.cart_mut().change_quantity(&product.id, spec.quantity - 1)?;
            }
            if let Some(price) = spec.price {
                d.begin_price_edit(&product.id)?;
                d.commit_price_edit(&product.id, price)?;
            }
            Ok(())
        })?;
    }

    draft.with_draft_mut(|d| {
        if let Some(customer) = &args.customer {
            d.set_customer_name(customer.clone());
        }
        if let Some(discount) = args.discount {
            d.set_order_discount(discount);
        }
        if let Some(debt) = args.debt {
            d.set_debt_amount(debt);
        }
    });

    Ok(())
}

pub async fn new_order(
    db: &DbState,
    draft: &DraftState,
    config: &AppConfig,
    args: &NewOrderArgs,
    dry_run: bool,
) -> Result<OrderOutcome, ApiError> {
    build_draft(db, draft, args).await?;

    if dry_run {
        return draft.with_draft(|d| {
            d.validate()?;
            Ok(OrderOutcome::Preview(OrderPreview::from(d)))
        });
    }

    let receipt = draft.submit(db.inner(), config.checkout_policy).await?;
    info!(
        order_number = receipt.order.order_number,
        complete = receipt.is_complete(),
        "new_order command"
    );
    Ok(OrderOutcome::Submitted(receipt.into()))
}

pub async fn list_orders(db: &DbState, status: Option<OrderStatus>) -> Result<Vec<Order>, ApiError> {
    Ok(db.inner().orders().list(status).await?)
}

async fn find_by_number(db: &DbState, number: i64) -> Result<Order, ApiError> {
    db.inner()
        .orders()
        .get_by_number(number)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &format!("#{number}")))
}

pub async fn show_order(db: &DbState, number: i64) -> Result<OrderDetail, ApiError> {
    let order = find_by_number(db, number).await?;
    let items = db.inner().orders().items(&order.id).await?;
    let payments = db.inner().payments().for_order(&order.id).await?;
    let outstanding = outstanding_balance(&order, &payments);

    Ok(OrderDetail {
        outstanding_cents: outstanding.cents(),
        order,
        items,
        payments,
    })
}

pub async fn set_order_status(db: &DbState, number: i64, status: OrderStatus) -> Result<Order, ApiError> {
    let order = find_by_number(db, number).await?;
    let updated = db.inner().orders().update_status(&order.id, status).await?;
    info!(order_number = number, status = %status, "Order status changed");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::product::{add_product, NewProductArgs};
    use crate::error::ErrorCode;
    use shopkeep_db::CheckoutPolicy;

    async fn shop() -> DbState {
        let db = DbState::in_memory().await.unwrap();
        for (code, qty) in [("OIL-1", 5), ("TEA-1", 10)] {
            add_product(
                &db,
                NewProductArgs {
                    name: format!("{code} name"),
                    code: code.to_string(),
                    purchase_price_cents: 6000,
                    selling_price_cents: 10000,
                    quantity: qty,
                    ..NewProductArgs::default()
                },
            )
            .await
            .unwrap();
        }
        db
    }

    fn item(s: &str) -> ItemSpec {
        s.parse().unwrap()
    }

    #[test]
    fn test_item_spec_forms() {
        assert_eq!(
            item("OIL-1"),
            ItemSpec { code: "OIL-1".to_string(), quantity: 1, price: None }
        );
        assert_eq!(item("OIL-1:3").quantity, 3);
        assert_eq!(item("OIL-1@95.5").price, Some(Money::from_cents(9550)));

        let full = item("OIL-1:2@90");
        assert_eq!(full.quantity, 2);
        assert_eq!(full.price, Some(Money::from_cents(9000)));
    }

    #[test]
    fn test_item_spec_rejects_bad_input() {
        assert!("OIL-1:0".parse::<ItemSpec>().is_err());
        assert!("OIL-1:two".parse::<ItemSpec>().is_err());
        assert!("OIL-1@abc".parse::<ItemSpec>().is_err());
        assert!(":2".parse::<ItemSpec>().is_err());
        assert!("OIL-1:2@92233720368547758.07".parse::<ItemSpec>().is_err());
    }

    #[tokio::test]
    async fn test_extreme_negative_discount_is_rejected() {
        let db = shop().await;
        let draft = DraftState::new();
        let args = NewOrderArgs {
            items: vec![item("OIL-1")],
            discount: Some(Money::from_cents(i64::MIN)),
            ..NewOrderArgs::default()
        };

        for dry_run in [true, false] {
            let err = new_order(&db, &draft, &AppConfig::default(), &args, dry_run)
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError);
            assert_eq!(err.message, "Discount cannot be negative");
        }
        assert!(db.inner().orders().list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_preview_writes_nothing() {
        let db = shop().await;
        let draft = DraftState::new();
        let args = NewOrderArgs {
            items: vec![item("OIL-1:2"), item("TEA-1@80")],
            discount: Some(Money::from_cents(1000)),
            ..NewOrderArgs::default()
        };

        let outcome = new_order(&db, &draft, &AppConfig::default(), &args, true).await.unwrap();

        let OrderOutcome::Preview(preview) = outcome else {
            panic!("expected a preview");
        };
        assert_eq!(preview.cart_amount_cents, 28000);
        assert_eq!(preview.final_amount_cents, 27000);
        assert_eq!(preview.total_discount_cents, 3000);
        assert_eq!(preview.payment_status, PaymentStatus::Paid);
        assert!(preview.lines[1].marked_down);
        assert!(db.inner().orders().list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_and_show() {
        let db = shop().await;
        let draft = DraftState::new();
        let args = NewOrderArgs {
            items: vec![item("OIL-1:2")],
            customer: Some(" Ali ".to_string()),
            debt: Some(Money::from_cents(8000)),
            ..NewOrderArgs::default()
        };

        let outcome = new_order(&db, &draft, &AppConfig::default(), &args, false).await.unwrap();
        let OrderOutcome::Submitted(receipt) = outcome else {
            panic!("expected a submission");
        };
        assert_eq!(receipt.order.customer_name.as_deref(), Some("Ali"));
        assert_eq!(receipt.order.payment_status, PaymentStatus::PartiallyPaid);

        let detail = show_order(&db, receipt.order.order_number).await.unwrap();
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.payments.len(), 1);
        assert_eq!(detail.outstanding_cents, 8000);

        let oil = find_by_code(&db, "OIL-1").await.unwrap();
        assert_eq!(oil.quantity, 3);
    }

    #[tokio::test]
    async fn test_quantity_beyond_stock_is_refused() {
        let db = shop().await;
        let draft = DraftState::new();
        let args = NewOrderArgs {
            items: vec![item("OIL-1:6")],
            ..NewOrderArgs::default()
        };

        let err = new_order(&db, &draft, &AppConfig::default(), &args, false).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }

    #[tokio::test]
    async fn test_debt_without_customer() {
        let db = shop().await;
        let draft = DraftState::new();
        let args = NewOrderArgs {
            items: vec![item("TEA-1")],
            debt: Some(Money::from_cents(100)),
            ..NewOrderArgs::default()
        };
        let config = AppConfig {
            checkout_policy: CheckoutPolicy::Compensate,
            ..AppConfig::default()
        };

        let err = new_order(&db, &draft, &config, &args, false).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Customer name is required when the order carries debt");
    }

    #[tokio::test]
    async fn test_status_change_and_filter() {
        let db = shop().await;
        let draft = DraftState::new();
        let args = NewOrderArgs {
            items: vec![item("TEA-1")],
            ..NewOrderArgs::default()
        };
        new_order(&db, &draft, &AppConfig::default(), &args, false).await.unwrap();

        let updated = set_order_status(&db, 1, OrderStatus::Returned).await.unwrap();
        assert_eq!(updated.status, OrderStatus::Returned);
        assert!(list_orders(&db, Some(OrderStatus::Completed)).await.unwrap().is_empty());
        assert_eq!(list_orders(&db, Some(OrderStatus::Returned)).await.unwrap().len(), 1);

        let err = set_order_status(&db, 99, OrderStatus::Cancelled).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}

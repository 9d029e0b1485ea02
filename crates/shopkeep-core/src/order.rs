//! # Order Builder
//!
//! Turns a cart plus checkout terms into the rows a store has to write.
//!
//! ## From Draft to Submission Plan
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Order Builder                                   │
//! │                                                                         │
//! │  OrderDraft                                                             │
//! │  ├── cart ─────────────► CartTotals (amount, cost, profit, line disc.) │
//! │  ├── order_discount ───► final amount = amount − discount               │
//! │  │                       final profit = profit − discount               │
//! │  ├── debt_amount ──────► PaymentTerms (status, paid amount)             │
//! │  └── customer_name                                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  validate()  (first failure wins, nothing is written)                   │
//! │   1. cart not empty                                                     │
//! │   2. discount >= 0                                                      │
//! │   3. discount <= cart amount (cart figures must fit, else too large)    │
//! │   4. debt > 0 needs a customer name                                     │
//! │   5. debt <= final amount                                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  SubmissionPlan { order: NewOrder, lines: [NewOrderItem], payment? }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLine, CartTotals};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{NewOrder, NewOrderItem, NewPayment, OrderStatus, PaymentStatus};
use crate::validation;
use crate::INITIAL_PAYMENT_NOTE;

// =============================================================================
// Order Totals
// =============================================================================

/// Cart subtotals combined with the order-level discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub cart: CartTotals,
    pub order_discount: Money,
    pub final_amount: Money,
    pub final_cost: Money,
    pub final_profit: Money,
    /// Line discounts plus the order discount.
    pub total_discount: Money,
}

impl OrderTotals {
    pub fn compute(cart: CartTotals, order_discount: Money) -> Self {
        OrderTotals {
            cart,
            order_discount,
            final_amount: cart.amount - order_discount,
            final_cost: cart.cost,
            final_profit: cart.profit - order_discount,
            total_discount: cart.line_discount + order_discount,
        }
    }

    /// Like [`OrderTotals::compute`], but `None` when a figure overflows.
    pub fn checked_compute(cart: CartTotals, order_discount: Money) -> Option<Self> {
        Some(OrderTotals {
            cart,
            order_discount,
            final_amount: cart.amount.checked_sub(order_discount)?,
            final_cost: cart.cost,
            final_profit: cart.profit.checked_sub(order_discount)?,
            total_discount: cart.line_discount.checked_add(order_discount)?,
        })
    }

    /// Profit margin in basis points, `None` when the final amount is zero.
    pub fn margin_bps(&self) -> Option<i64> {
        self.final_profit.ratio_bps(self.final_amount)
    }

    /// The margin as the totals panel shows it: only for a positive profit.
    pub fn display_margin_bps(&self) -> Option<i64> {
        if self.final_profit.is_positive() {
            self.margin_bps()
        } else {
            None
        }
    }
}

// =============================================================================
// Payment Terms
// =============================================================================

/// Payment classification derived from the final amount and the debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTerms {
    pub status: PaymentStatus,
    pub paid_amount: Money,
}

impl PaymentTerms {
    /// ## Rules
    /// - debt <= 0 → `paid`, paid amount = final amount
    /// - debt > 0, final − debt <= 0 → `debt`, paid amount = 0
    /// - debt > 0, final − debt > 0 → `partially_paid`
    ///
    /// ## Example
    /// ```rust
    /// use shopkeep_core::money::Money;
    /// use shopkeep_core::order::PaymentTerms;
    /// use shopkeep_core::types::PaymentStatus;
    ///
    /// let terms = PaymentTerms::derive(Money::from_cents(20000), Money::from_cents(8000));
    /// assert_eq!(terms.status, PaymentStatus::PartiallyPaid);
    /// assert_eq!(terms.paid_amount.cents(), 12000);
    /// ```
    pub fn derive(final_amount: Money, debt_amount: Money) -> Self {
        if !debt_amount.is_positive() {
            return PaymentTerms {
                status: PaymentStatus::Paid,
                paid_amount: final_amount,
            };
        }

        let paid_amount = final_amount - debt_amount;
        if paid_amount.is_positive() {
            PaymentTerms {
                status: PaymentStatus::PartiallyPaid,
                paid_amount,
            }
        } else {
            PaymentTerms {
                status: PaymentStatus::Debt,
                paid_amount: paid_amount.clamp_non_negative(),
            }
        }
    }
}

// =============================================================================
// Submission Plan
// =============================================================================

/// Everything a store needs to write for one validated draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPlan {
    pub order: NewOrder,
    /// One item per cart line, in cart order. `product_id` and `quantity`
    /// also drive the stock decrement.
    pub lines: Vec<NewOrderItem>,
    /// Present when the customer paid something at checkout.
    pub initial_payment: Option<NewPayment>,
}

fn order_item(line: &CartLine) -> NewOrderItem {
    let effective = line.effective_price();
    NewOrderItem {
        product_id: line.product.id.clone(),
        product_name: line.product.name.clone(),
        quantity: line.quantity,
        unit_price_cents: line.product.selling_price_cents,
        unit_cost_cents: line.product.purchase_price_cents,
        total_price_cents: line.amount().cents(),
        total_cost_cents: line.cost().cents(),
        profit_cents: line.profit().cents(),
        custom_price_cents: line.custom_price.map(|p| p.cents()),
        discount_amount_cents: (line.product.selling_price() - effective)
            .multiply_quantity(line.quantity)
            .cents(),
    }
}

// =============================================================================
// Order Draft
// =============================================================================

/// An order being composed at the counter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    cart: Cart,
    customer_name: String,
    order_discount: Money,
    debt_amount: Money,
    /// Product id whose price is currently being edited.
    price_editor: Option<String>,
}

impl OrderDraft {
    pub fn new() -> Self {
        OrderDraft::default()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn set_customer_name(&mut self, name: impl Into<String>) {
        self.customer_name = name.into();
    }

    pub fn order_discount(&self) -> Money {
        self.order_discount
    }

    pub fn set_order_discount(&mut self, discount: Money) {
        self.order_discount = discount;
    }

    pub fn debt_amount(&self) -> Money {
        self.debt_amount
    }

    pub fn set_debt_amount(&mut self, debt: Money) {
        self.debt_amount = debt;
    }

    // -------------------------------------------------------------------------
    // Inline price editing
    // -------------------------------------------------------------------------

    /// Opens the price editor on a cart line.
    pub fn begin_price_edit(&mut self, product_id: &str) -> CoreResult<()> {
        if self.cart.line(product_id).is_none() {
            return Err(CoreError::NotInCart(product_id.to_string()));
        }
        self.price_editor = Some(product_id.to_string());
        Ok(())
    }

    pub fn editing_price(&self) -> Option<&str> {
        self.price_editor.as_deref()
    }

    /// Commits an edited price. The editor closes whether or not the price
    /// is accepted.
    pub fn commit_price_edit(&mut self, product_id: &str, price: Money) -> CoreResult<()> {
        self.price_editor = None;
        self.cart.set_custom_price(product_id, price)
    }

    pub fn cancel_price_edit(&mut self) {
        self.price_editor = None;
    }

    // -------------------------------------------------------------------------
    // Totals, validation and submission
    // -------------------------------------------------------------------------

    pub fn totals(&self) -> OrderTotals {
        OrderTotals::compute(self.cart.totals(), self.order_discount)
    }

    pub fn payment_terms(&self) -> PaymentTerms {
        PaymentTerms::derive(self.totals().final_amount, self.debt_amount)
    }

    /// Runs the submission checks in order and reports the first failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }

        if self.order_discount.is_negative() {
            return Err(ValidationError::NegativeDiscount);
        }

        let totals = self
            .cart
            .checked_totals()
            .filter(|cart| cart.amount <= Money::MAX && cart.cost <= Money::MAX)
            .and_then(|cart| OrderTotals::checked_compute(cart, self.order_discount))
            .ok_or_else(|| ValidationError::too_large("order total"))?;

        if self.order_discount > totals.cart.amount {
            return Err(ValidationError::DiscountExceedsCartTotal {
                discount: self.order_discount,
                cart_total: totals.cart.amount,
            });
        }

        if self.debt_amount.is_positive() && self.customer_name.trim().is_empty() {
            return Err(ValidationError::CustomerNameRequired);
        }

        if self.debt_amount > totals.final_amount {
            return Err(ValidationError::DebtExceedsPayable {
                debt: self.debt_amount,
                payable: totals.final_amount,
            });
        }

        Ok(())
    }

    /// Validates the draft and builds the rows to write.
    ///
    /// The order is created as `completed`.
    pub fn prepare(&self) -> Result<SubmissionPlan, ValidationError> {
        self.validate()?;

        let totals = self.totals();
        let terms = PaymentTerms::derive(totals.final_amount, self.debt_amount);
        let customer_name = validation::normalize_customer_name(&self.customer_name)?;

        let order = NewOrder {
            total_amount_cents: totals.final_amount.cents(),
            total_cost_cents: totals.final_cost.cents(),
            total_profit_cents: totals.final_profit.cents(),
            status: OrderStatus::Completed,
            customer_name,
            payment_status: terms.status,
            paid_amount_cents: terms.paid_amount.cents(),
        };

        let initial_payment = terms.paid_amount.is_positive().then(|| NewPayment {
            payment_amount_cents: terms.paid_amount.cents(),
            notes: Some(INITIAL_PAYMENT_NOTE.to_string()),
        });

        Ok(SubmissionPlan {
            order,
            lines: self.cart.lines().map(order_item).collect(),
            initial_payment,
        })
    }

    /// Empties the cart and resets customer, discount and debt.
    pub fn reset(&mut self) {
        *self = OrderDraft::default();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;

    /// cart = [{price 100, qty 2, cost 60}]
    fn two_at_100() -> OrderDraft {
        let product = Product::new(
            "Olive Oil",
            "OIL-1",
            Money::from_major_minor(60, 0),
            Money::from_major_minor(100, 0),
            10,
        );
        let mut draft = OrderDraft::new();
        draft.cart_mut().add_line(&product).unwrap();
        draft.cart_mut().add_line(&product).unwrap();
        draft
    }

    fn money(major: i64) -> Money {
        Money::from_major_minor(major, 0)
    }

    #[test]
    fn test_plain_sale() {
        let draft = two_at_100();
        let totals = draft.totals();

        assert_eq!(totals.final_amount, money(200));
        assert_eq!(totals.final_cost, money(120));
        assert_eq!(totals.final_profit, money(80));

        let plan = draft.prepare().unwrap();
        assert_eq!(plan.order.payment_status, PaymentStatus::Paid);
        assert_eq!(plan.order.paid_amount_cents, money(200).cents());
        assert_eq!(plan.order.status, OrderStatus::Completed);
        assert_eq!(plan.order.customer_name, None);
        assert_eq!(
            plan.initial_payment,
            Some(NewPayment {
                payment_amount_cents: money(200).cents(),
                notes: Some(INITIAL_PAYMENT_NOTE.to_string()),
            })
        );
    }

    #[test]
    fn test_order_discount() {
        let mut draft = two_at_100();
        draft.set_order_discount(money(50));
        let totals = draft.totals();

        assert_eq!(totals.final_amount, money(150));
        assert_eq!(totals.final_profit, money(30));
        assert_eq!(totals.total_discount, money(50));
        assert_eq!(totals.final_cost, money(120));
        assert_eq!(totals.margin_bps(), Some(2000));
    }

    #[test]
    fn test_full_debt() {
        let mut draft = two_at_100();
        draft.set_debt_amount(money(200));
        draft.set_customer_name("Ali");

        let plan = draft.prepare().unwrap();
        assert_eq!(plan.order.paid_amount_cents, 0);
        assert_eq!(plan.order.payment_status, PaymentStatus::Debt);
        assert_eq!(plan.order.customer_name.as_deref(), Some("Ali"));
        assert!(plan.initial_payment.is_none());
    }

    #[test]
    fn test_partial_debt() {
        let mut draft = two_at_100();
        draft.set_debt_amount(money(80));
        draft.set_customer_name("  Ali  ");

        let plan = draft.prepare().unwrap();
        assert_eq!(plan.order.paid_amount_cents, money(120).cents());
        assert_eq!(plan.order.payment_status, PaymentStatus::PartiallyPaid);
        assert_eq!(plan.order.customer_name.as_deref(), Some("Ali"));
    }

    #[test]
    fn test_negative_debt_counts_as_paid() {
        let mut draft = two_at_100();
        draft.set_debt_amount(money(-10));

        let terms = draft.payment_terms();
        assert_eq!(terms.status, PaymentStatus::Paid);
        assert_eq!(terms.paid_amount, money(200));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_cart() {
        let mut draft = OrderDraft::new();
        draft.set_order_discount(money(-1));
        assert_eq!(draft.validate(), Err(ValidationError::EmptyCart));
    }

    #[test]
    fn test_validation_negative_discount() {
        let mut draft = two_at_100();
        draft.set_order_discount(Money::from_cents(-1));
        assert_eq!(draft.prepare(), Err(ValidationError::NegativeDiscount));
    }

    #[test]
    fn test_validation_discount_exceeds_cart() {
        let mut draft = two_at_100();
        draft.set_order_discount(money(201));
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::DiscountExceedsCartTotal { .. })
        ));

        draft.set_order_discount(money(200));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_validation_debt_needs_customer() {
        let mut draft = two_at_100();
        draft.set_debt_amount(money(10));
        draft.set_customer_name("   ");
        assert_eq!(draft.validate(), Err(ValidationError::CustomerNameRequired));
    }

    #[test]
    fn test_validation_order_customer_before_debt_limit() {
        let mut draft = two_at_100();
        draft.set_debt_amount(money(500));
        assert_eq!(draft.validate(), Err(ValidationError::CustomerNameRequired));

        draft.set_customer_name("Ali");
        assert_eq!(
            draft.validate(),
            Err(ValidationError::DebtExceedsPayable {
                debt: money(500),
                payable: money(200),
            })
        );
    }

    #[test]
    fn test_debt_checked_against_discounted_amount() {
        let mut draft = two_at_100();
        draft.set_order_discount(money(50));
        draft.set_debt_amount(money(160));
        draft.set_customer_name("Ali");
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::DebtExceedsPayable { .. })
        ));

        draft.set_debt_amount(money(150));
        let plan = draft.prepare().unwrap();
        assert_eq!(plan.order.payment_status, PaymentStatus::Debt);
        assert_eq!(plan.order.paid_amount_cents, 0);
    }

    #[test]
    fn test_fully_discounted_margin_is_undefined() {
        let mut draft = two_at_100();
        draft.set_order_discount(money(200));
        let totals = draft.totals();

        assert_eq!(totals.final_amount, Money::zero());
        assert_eq!(totals.margin_bps(), None);
        assert_eq!(totals.display_margin_bps(), None);
    }

    #[test]
    fn test_display_margin_hidden_for_loss() {
        let mut draft = two_at_100();
        draft.set_order_discount(money(100));
        let totals = draft.totals();

        assert_eq!(totals.final_profit, money(-20));
        assert_eq!(totals.margin_bps(), Some(-2000));
        assert_eq!(totals.display_margin_bps(), None);
    }

    #[test]
    fn test_custom_price_flows_into_items() {
        let mut draft = two_at_100();
        let id = draft.cart().lines().next().unwrap().product.id.clone();

        draft.begin_price_edit(&id).unwrap();
        assert_eq!(draft.editing_price(), Some(id.as_str()));
        draft.commit_price_edit(&id, money(90)).unwrap();
        assert_eq!(draft.editing_price(), None);

        let totals = draft.totals();
        assert_eq!(totals.final_amount, money(180));
        assert_eq!(totals.total_discount, money(20));

        let plan = draft.prepare().unwrap();
        let item = &plan.lines[0];
        assert_eq!(item.unit_price_cents, money(100).cents());
        assert_eq!(item.total_price_cents, money(180).cents());
        assert_eq!(item.custom_price_cents, Some(money(90).cents()));
        assert_eq!(item.discount_amount_cents, money(20).cents());
        assert_eq!(item.profit_cents, money(60).cents());
    }

    #[test]
    fn test_rejected_price_closes_editor() {
        let mut draft = two_at_100();
        let id = draft.cart().lines().next().unwrap().product.id.clone();

        draft.begin_price_edit(&id).unwrap();
        assert!(draft.commit_price_edit(&id, Money::zero()).is_err());
        assert_eq!(draft.editing_price(), None);
        assert_eq!(draft.cart().line(&id).unwrap().custom_price, None);
    }

    #[test]
    fn test_failed_validation_leaves_draft_untouched() {
        let mut draft = two_at_100();
        draft.set_order_discount(money(-5));
        let before = draft.clone();

        assert!(draft.prepare().is_err());
        assert_eq!(draft, before);
    }

    #[test]
    fn test_reset() {
        let mut draft = two_at_100();
        draft.set_customer_name("Ali");
        draft.set_debt_amount(money(10));
        draft.set_order_discount(money(5));

        draft.reset();
        assert!(draft.cart().is_empty());
        assert_eq!(draft.customer_name(), "");
        assert_eq!(draft.debt_amount(), Money::zero());
        assert_eq!(draft.order_discount(), Money::zero());
    }

    #[test]
    fn test_extreme_negative_discount_is_rejected_as_negative() {
        let mut draft = two_at_100();
        draft.set_order_discount(Money::from_cents(i64::MIN));
        assert_eq!(draft.validate(), Err(ValidationError::NegativeDiscount));

        draft.set_order_discount(Money::from_cents(-9_223_372_036_854_775_807));
        assert_eq!(draft.prepare(), Err(ValidationError::NegativeDiscount));
    }

    #[test]
    fn test_extreme_discount_exceeds_cart() {
        let mut draft = two_at_100();
        draft.set_order_discount(Money::from_cents(i64::MAX));
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::DiscountExceedsCartTotal { .. })
        ));
    }

    #[test]
    fn test_overflowing_line_amount_is_rejected() {
        let gold = Product::new("Gold", "GOLD", Money::zero(), Money::from_cents(i64::MAX / 2), 5);
        let mut draft = OrderDraft::new();
        draft.cart_mut().add_line(&gold).unwrap();
        draft.cart_mut().change_quantity(&gold.id, 2).unwrap();

        assert!(matches!(
            draft.prepare(),
            Err(ValidationError::AmountTooLarge { .. })
        ));
    }

    #[test]
    fn test_largest_custom_price_times_quantity_is_rejected() {
        let mut draft = two_at_100();
        let id = draft.cart().lines().next().unwrap().product.id.clone();
        draft.commit_price_edit(&id, Money::MAX).unwrap();

        // 2 x 999,999,999.99 fits in i64 but is past the recordable limit.
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::AmountTooLarge { .. })
        ));

        draft.cart_mut().change_quantity(&id, -1).unwrap();
        assert_eq!(draft.validate(), Ok(()));
    }

    #[test]
    fn test_overflow_rejected_before_any_later_check() {
        let mut draft = two_at_100();
        let id = draft.cart().lines().next().unwrap().product.id.clone();
        draft.commit_price_edit(&id, Money::MAX).unwrap();
        draft.set_debt_amount(money(10));

        // The customer-name check comes later and is not reached.
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::AmountTooLarge { .. })
        ));
    }
}

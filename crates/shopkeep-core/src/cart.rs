//! # Cart
//!
//! The in-progress list of products an operator is about to sell.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Operations                                 │
//! │                                                                         │
//! │  add_line(product) ──────────► new line qty 1, or qty + 1 if it fits    │
//! │                                                                         │
//! │  change_quantity(id, ±n) ────► qty + n <= 0  → line removed             │
//! │                                qty + n > stock → InsufficientStock      │
//! │                                                                         │
//! │  remove_line(id) ────────────► line removed (no-op if absent)           │
//! │                                                                         │
//! │  set_custom_price(id, p) ────► p <= 0 or p > MAX → rejected             │
//! │                                                                         │
//! │  totals() ───────────────────► CartTotals (amount, cost, profit,        │
//! │                                            line discount)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per product id
//! - `1 <= line.quantity <= line.product.quantity`
//! - `custom_price`, when set, is strictly positive
//!
//! Rejected operations never change the cart.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;

// =============================================================================
// Cart Line
// =============================================================================

/// One product in the cart.
///
/// The product is a snapshot taken when the line was created; stock checks
/// run against that snapshot's quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
    pub custom_price: Option<Money>,
}

impl CartLine {
    fn new(product: &Product) -> Self {
        CartLine {
            product: product.clone(),
            quantity: 1,
            custom_price: None,
        }
    }

    /// Custom price if set, otherwise the catalog selling price.
    #[inline]
    pub fn effective_price(&self) -> Money {
        self.custom_price
            .unwrap_or_else(|| self.product.selling_price())
    }

    pub fn amount(&self) -> Money {
        self.effective_price().multiply_quantity(self.quantity)
    }

    pub fn cost(&self) -> Money {
        self.product.purchase_price().multiply_quantity(self.quantity)
    }

    pub fn profit(&self) -> Money {
        (self.effective_price() - self.product.purchase_price()).multiply_quantity(self.quantity)
    }

    /// (catalog − effective) × quantity when a custom price is set.
    ///
    /// A custom price above the catalog price gives a negative value.
    pub fn discount(&self) -> Money {
        match self.custom_price {
            Some(custom) => (self.product.selling_price() - custom).multiply_quantity(self.quantity),
            None => Money::zero(),
        }
    }

    /// Line figures with overflow reported as `None`.
    fn checked_totals(&self) -> Option<CartTotals> {
        let qty = self.quantity;
        let effective = self.effective_price();
        let purchase = self.product.purchase_price();
        let line_discount = match self.custom_price {
            Some(custom) => self
                .product
                .selling_price()
                .checked_sub(custom)?
                .checked_mul_quantity(qty)?,
            None => Money::zero(),
        };

        Some(CartTotals {
            amount: effective.checked_mul_quantity(qty)?,
            cost: purchase.checked_mul_quantity(qty)?,
            profit: effective.checked_sub(purchase)?.checked_mul_quantity(qty)?,
            line_discount,
        })
    }

    /// Whether the catalog price should be shown struck through next to the
    /// custom price.
    pub fn is_marked_down(&self) -> bool {
        matches!(self.custom_price, Some(custom) if custom < self.product.selling_price())
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Subtotals over every line, before the order-level discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    pub amount: Money,
    pub cost: Money,
    pub profit: Money,
    pub line_discount: Money,
}

impl CartTotals {
    fn checked_add(self, other: CartTotals) -> Option<CartTotals> {
        Some(CartTotals {
            amount: self.amount.checked_add(other.amount)?,
            cost: self.cost.checked_add(other.cost)?,
            profit: self.profit.checked_add(other.profit)?,
            line_discount: self.line_discount.checked_add(other.line_discount)?,
        })
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Cart lines keyed by product id, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: HashMap<String, CartLine>,
    order: Vec<String>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds one unit of `product`.
    ///
    /// ## Example
    /// ```rust
    /// use shopkeep_core::cart::Cart;
    /// use shopkeep_core::money::Money;
    /// use shopkeep_core::types::Product;
    ///
    /// let soap = Product::new("Soap", "SOAP", Money::from_cents(80), Money::from_cents(150), 1);
    /// let mut cart = Cart::new();
    ///
    /// cart.add_line(&soap).unwrap();
    /// assert!(cart.add_line(&soap).is_err()); // only one in stock
    /// assert_eq!(cart.line(&soap.id).unwrap().quantity, 1);
    /// ```
    pub fn add_line(&mut self, product: &Product) -> CoreResult<()> {
        if let Some(line) = self.lines.get_mut(&product.id) {
            let requested = line.quantity + 1;
            if requested > line.product.quantity {
                return Err(CoreError::InsufficientStock {
                    code: line.product.code.clone(),
                    available: line.product.quantity,
                    requested,
                });
            }
            line.quantity = requested;
            return Ok(());
        }

        if product.quantity < 1 {
            return Err(CoreError::InsufficientStock {
                code: product.code.clone(),
                available: product.quantity,
                requested: 1,
            });
        }

        self.lines.insert(product.id.clone(), CartLine::new(product));
        self.order.push(product.id.clone());
        Ok(())
    }

    /// Adjusts a line's quantity by `delta`.
    ///
    /// A result of zero or less removes the line.
    pub fn change_quantity(&mut self, product_id: &str, delta: i64) -> CoreResult<()> {
        let current = self
            .lines
            .get(product_id)
            .map(|line| line.quantity)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;

        let requested = current.saturating_add(delta);
        if requested <= 0 {
            self.remove_line(product_id);
            return Ok(());
        }

        let Some(line) = self.lines.get_mut(product_id) else {
            return Err(CoreError::NotInCart(product_id.to_string()));
        };
        if requested > line.product.quantity {
            return Err(CoreError::InsufficientStock {
                code: line.product.code.clone(),
                available: line.product.quantity,
                requested,
            });
        }

        line.quantity = requested;
        Ok(())
    }

    pub fn remove_line(&mut self, product_id: &str) {
        if self.lines.remove(product_id).is_some() {
            self.order.retain(|id| id != product_id);
        }
    }

    /// Overrides the unit price of a line. `price` must be > 0 and at most
    /// [`Money::MAX`].
    pub fn set_custom_price(&mut self, product_id: &str, price: Money) -> CoreResult<()> {
        if !price.is_positive() {
            return Err(ValidationError::must_be_positive("custom price").into());
        }
        if price > Money::MAX {
            return Err(ValidationError::too_large("custom price").into());
        }

        let line = self
            .lines
            .get_mut(product_id)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;
        line.custom_price = Some(price);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.order.clear();
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.get(product_id)
    }

    /// Lines in the order they were first added.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.order.iter().filter_map(|id| self.lines.get(id))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.values().map(|line| line.quantity).sum()
    }

    /// Totals for display. Amounts past the i64 range saturate; use
    /// [`Cart::checked_totals`] before anything is recorded.
    pub fn totals(&self) -> CartTotals {
        self.lines().fold(CartTotals::default(), |mut acc, line| {
            acc.amount += line.amount();
            acc.cost += line.cost();
            acc.profit += line.profit();
            acc.line_discount += line.discount();
            acc
        })
    }

    /// Totals, or `None` when any figure overflows.
    pub fn checked_totals(&self) -> Option<CartTotals> {
        self.lines()
            .try_fold(CartTotals::default(), |acc, line| acc.checked_add(line.checked_totals()?))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

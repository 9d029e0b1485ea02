//! # Domain Types
//!
//! Core domain types used throughout Shopkeep.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │ PaymentRecord   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  code (business)│   │  order_number   │   │  order_id (FK)  │       │
//! │  │  prices, stock  │   │  totals, status │   │  amount, notes  │       │
//! │  └────────┬────────┘   └────────┬────────┘   └─────────────────┘       │
//! │           │ weak ref            │ 1..*                                  │
//! │           │             ┌───────▼─────────┐   ┌─────────────────┐       │
//! │           └────────────►│   OrderItem     │   │  MonthlyReport  │       │
//! │                         │  product_name   │   │  (month, year)  │       │
//! │                         │  (snapshot)     │   │  top_products   │       │
//! │                         └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for relations
//! - Business ID: (`code`, `order_number`) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation;

/// Low-stock threshold applied to new products when none is given.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

// =============================================================================
// Stock Status
// =============================================================================

/// Restocking classification shown in catalog and report views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    Low,
    OutOfStock,
}

impl StockStatus {
    /// Classifies a stock level against its low-stock threshold.
    ///
    /// ```rust
    /// use shopkeep_core::types::StockStatus;
    ///
    /// assert_eq!(StockStatus::classify(0, 5), StockStatus::OutOfStock);
    /// assert_eq!(StockStatus::classify(5, 5), StockStatus::Low);
    /// assert_eq!(StockStatus::classify(6, 5), StockStatus::InStock);
    /// ```
    pub fn classify(quantity: i64, threshold: i64) -> Self {
        if quantity <= 0 {
            StockStatus::OutOfStock
        } else if quantity <= threshold {
            StockStatus::Low
        } else {
            StockStatus::InStock
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockStatus::InStock => write!(f, "in stock"),
            StockStatus::Low => write!(f, "low"),
            StockStatus::OutOfStock => write!(f, "out of stock"),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the store catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Shop-assigned product code, unique across the catalog.
    pub code: String,

    /// What the shop paid per unit, in cents.
    pub purchase_price_cents: i64,

    /// Catalog selling price per unit, in cents.
    pub selling_price_cents: i64,

    /// Units on hand (never negative).
    pub quantity: i64,

    /// At or below this quantity the product needs restocking.
    pub low_stock_threshold: i64,

    /// Optional product picture (URL or data URI).
    pub image_url: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a product with a fresh id and the default low-stock threshold.
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        purchase_price: Money,
        selling_price: Money,
        quantity: i64,
    ) -> Self {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            code: code.into(),
            purchase_price_cents: purchase_price.cents(),
            selling_price_cents: selling_price.cents(),
            quantity,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }

    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// Catalog profit per unit (selling − purchase).
    #[inline]
    pub fn unit_profit(&self) -> Money {
        self.selling_price() - self.purchase_price()
    }

    pub fn stock_status(&self) -> StockStatus {
        StockStatus::classify(self.quantity, self.low_stock_threshold)
    }

    /// True when the product is at or below its restocking threshold
    /// (out-of-stock products included).
    pub fn needs_restock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }

    /// Checks if `quantity` units can be taken from known stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity <= self.quantity
    }
}

/// Operator-supplied product fields, used for both create and edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub name: String,
    pub code: String,
    pub purchase_price_cents: i64,
    pub selling_price_cents: i64,
    pub quantity: i64,
    pub low_stock_threshold: i64,
    pub image_url: Option<String>,
}

impl ProductInput {
    /// Validates every field and returns a normalized copy (trimmed name
    /// and code, empty image URL collapsed to `None`).
    pub fn validated(&self) -> Result<ProductInput, ValidationError> {
        validation::validate_product_name(&self.name)?;
        validation::validate_product_code(&self.code)?;
        validation::validate_price_cents("purchase price", self.purchase_price_cents)?;
        validation::validate_price_cents("selling price", self.selling_price_cents)?;
        validation::validate_stock_quantity(self.quantity)?;
        validation::validate_low_stock_threshold(self.low_stock_threshold)?;

        Ok(ProductInput {
            name: self.name.trim().to_string(),
            code: self.code.trim().to_string(),
            image_url: self
                .image_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            ..self.clone()
        })
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    Completed,
    Cancelled,
    Returned,
    Replaced,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::New,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Returned,
        OrderStatus::Replaced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Returned => "returned",
            OrderStatus::Replaced => "replaced",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::New
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: "must be one of: new, completed, cancelled, returned, replaced".to_string(),
            })
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// How much of an order the customer settled at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Settled in full.
    Paid,
    /// Nothing paid; the whole amount is owed.
    Debt,
    /// Part paid, part owed.
    PartiallyPaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Debt => "debt",
            PaymentStatus::PartiallyPaid => "partially_paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order
// =============================================================================

/// A persisted sales order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Human-facing sequence number, assigned by the store.
    pub order_number: i64,
    pub total_amount_cents: i64,
    pub total_cost_cents: i64,
    pub total_profit_cents: i64,
    pub status: OrderStatus,
    pub customer_name: Option<String>,
    pub payment_status: PaymentStatus,
    pub paid_amount_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }

    #[inline]
    pub fn total_profit(&self) -> Money {
        Money::from_cents(self.total_profit_cents)
    }

    #[inline]
    pub fn paid_amount(&self) -> Money {
        Money::from_cents(self.paid_amount_cents)
    }

    /// Amount deferred at checkout (total − paid at creation).
    pub fn debt_amount(&self) -> Money {
        (self.total_amount() - self.paid_amount()).clamp_non_negative()
    }
}

/// Order row as produced by the order builder, before the store assigns
/// id, order number and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrder {
    pub total_amount_cents: i64,
    pub total_cost_cents: i64,
    pub total_profit_cents: i64,
    pub status: OrderStatus,
    pub customer_name: Option<String>,
    pub payment_status: PaymentStatus,
    pub paid_amount_cents: i64,
}

// =============================================================================
// Order Item
// =============================================================================

/// A line of a persisted order.
/// Uses snapshot pattern: name and prices are frozen at time of sale, and
/// the row survives deletion of the product (`product_id` becomes `None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: Option<String>,
    pub product_name: String,
    pub quantity: i64,
    /// Catalog price at time of sale.
    pub unit_price_cents: i64,
    pub unit_cost_cents: i64,
    /// Effective price × quantity.
    pub total_price_cents: i64,
    pub total_cost_cents: i64,
    pub profit_cents: i64,
    pub custom_price_cents: Option<i64>,
    /// (catalog − effective) × quantity.
    pub discount_amount_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

/// Order line as produced by the order builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub unit_cost_cents: i64,
    pub total_price_cents: i64,
    pub total_cost_cents: i64,
    pub profit_cents: i64,
    pub custom_price_cents: Option<i64>,
    pub discount_amount_cents: i64,
}

// =============================================================================
// Payment History
// =============================================================================

/// A payment received against an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PaymentRecord {
    pub id: String,
    pub order_id: String,
    pub payment_amount_cents: i64,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.payment_amount_cents)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPayment {
    pub payment_amount_cents: i64,
    pub notes: Option<String>,
}

// =============================================================================
// Monthly Report
// =============================================================================

/// One entry of a report's best-sellers list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopProduct {
    pub name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

/// A saved snapshot of one calendar month's figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyReport {
    pub id: String,
    pub month: u32,
    pub year: i32,
    pub total_sales_cents: i64,
    pub total_cost_cents: i64,
    pub total_profit_cents: i64,
    pub total_orders: i64,
    pub top_products: Vec<TopProduct>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

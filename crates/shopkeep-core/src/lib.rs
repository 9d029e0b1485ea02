//! # shopkeep-core: Pure Business Logic for Shopkeep
//!
//! This crate contains the order-building rules of the store: cart
//! accumulation, custom line pricing, order-level discounts, debt terms and
//! payment-status classification. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopkeep Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    shopkeep-cli (operator shell)                │   │
//! │  │    products, order new, orders, dashboard, report              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shopkeep-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │  order  │ │ report  │  │   │
//! │  │   │ Product │ │  Money  │ │  Cart   │ │  Draft  │ │ Monthly │  │   │
//! │  │   │  Order  │ │         │ │ Totals  │ │ Payment │ │ Summary │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               shopkeep-db (repositories + checkout saga)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, OrderItem, PaymentRecord, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart lines and running totals
//! - [`order`] - Order draft, validation, payment terms, submission plan
//! - [`catalog`] - Product filters, stock status, inventory value
//! - [`report`] - Dashboard statistics and monthly report aggregation
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation
//!
//! ## Example Usage
//!
//! ```rust
//! use shopkeep_core::money::Money;
//! use shopkeep_core::order::OrderDraft;
//! use shopkeep_core::types::{PaymentStatus, Product};
//!
//! let product = Product::new("Olive Oil 1L", "OIL-1", Money::from_cents(6000), Money::from_cents(10000), 5);
//!
//! let mut draft = OrderDraft::new();
//! draft.cart_mut().add_line(&product).unwrap();
//! draft.cart_mut().add_line(&product).unwrap();
//! draft.set_debt_amount(Money::from_cents(8000));
//! draft.set_customer_name("Ali");
//!
//! let plan = draft.prepare().unwrap();
//! assert_eq!(plan.order.total_amount_cents, 20000);
//! assert_eq!(plan.order.payment_status, PaymentStatus::PartiallyPaid);
//! assert_eq!(plan.order.paid_amount_cents, 12000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod order;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{OrderDraft, OrderTotals, PaymentTerms, SubmissionPlan};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of entries kept in a monthly report's top-products list.
pub const TOP_PRODUCTS_LIMIT: usize = 5;

/// Number of orders shown in the dashboard's "recent orders" panel.
pub const RECENT_ORDERS_LIMIT: usize = 5;

/// Note attached to the payment record written when an order is created
/// with a positive paid amount.
pub const INITIAL_PAYMENT_NOTE: &str = "Initial payment at order creation";

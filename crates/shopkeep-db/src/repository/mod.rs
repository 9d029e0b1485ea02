//! # Repository Module
//!
//! One repository per table. Each holds a clone of the pool and exposes
//! async methods returning [`DbResult`](crate::error::DbResult).
//!
//! ```text
//! Database
//! ├── products()  → ProductRepository   products
//! ├── orders()    → OrderRepository     orders, order_items
//! ├── payments()  → PaymentRepository   payment_history
//! └── reports()   → ReportRepository    monthly_reports
//! ```

pub mod order;
pub mod payment;
pub mod product;
pub mod report;

//! # shopkeep-db: Storage for the Shop Keeper
//!
//! SQLite persistence for products, orders, payments and saved monthly
//! reports, plus the order submission saga that writes a draft to storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shop Keeper Data Flow                            │
//! │                                                                         │
//! │  CLI command (order new)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     shopkeep-db                                  │   │
//! │  │                                                                 │   │
//! │  │   checkout::submit ──► StoreBackend (backend.rs)               │   │
//! │  │                             │                                   │   │
//! │  │   ┌───────────────┐    ┌────▼──────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ product order │    │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │ payment report│    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (shopkeep.db in the platform data directory)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopkeep_db::{checkout, CheckoutPolicy, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("shopkeep.db")).await?;
//! let low = db.products().list_low_stock().await?;
//! let receipt = checkout::submit(&db, &draft, CheckoutPolicy::BestEffort).await?;
//! ```

pub mod backend;
pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use backend::StoreBackend;
pub use checkout::{submit, CheckoutPolicy, FailedStep, SagaStep, SubmissionReceipt};
pub use error::{CheckoutError, DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::order::OrderRepository;
pub use repository::payment::PaymentRepository;
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;

//! # State Module
//!
//! Separate state types, each with one job. Commands take only the ones
//! they need.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────────┐  ┌──────────────────┐      │
//! │  │   DbState    │  │     DraftState       │  │    AppConfig     │      │
//! │  │              │  │                      │  │                  │      │
//! │  │  Database    │  │  Arc<Mutex<          │  │  store_name      │      │
//! │  │  (SQLite     │  │    OrderDraft>>      │  │  currency        │      │
//! │  │   pool)      │  │  + in-flight flag    │  │  checkout_policy │      │
//! │  └──────────────┘  └──────────────────────┘  └──────────────────┘      │
//! │                                                                         │
//! │  • DbState: connection pool, thread-safe                               │
//! │  • DraftState: exclusive access via Mutex, one submission at a time    │
//! │  • AppConfig: read-only after startup                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod draft;

pub use config::{default_config_path, AppConfig, ConfigError};
pub use db::DbState;
pub use draft::DraftState;

//! # Commands Module
//!
//! Every operation the CLI exposes, as an async function taking only the
//! state it needs and returning `Result<T, ApiError>` with a serializable
//! `T`. Printing is left to the caller.
//!
//! ```text
//! commands/
//! ├── product.rs    ◄─── catalog list, search, add, edit, stock, delete
//! ├── order.rs      ◄─── order entry, submission, lookup, status
//! ├── dashboard.rs  ◄─── landing figures
//! ├── report.rs     ◄─── monthly summaries and saved snapshots
//! └── config.rs     ◄─── effective configuration
//! ```

pub mod config;
pub mod dashboard;
pub mod order;
pub mod product;
pub mod report;

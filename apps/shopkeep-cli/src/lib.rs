//! # Shopkeep CLI Library
//!
//! Configures logging, opens the store database and dispatches commands.
//!
//! ## Module Organization
//! ```text
//! shopkeep_cli/
//! ├── lib.rs          ◄─── startup & dispatch
//! ├── cli.rs          ◄─── clap definition
//! ├── render.rs       ◄─── plain-text output
//! ├── state/
//! │   ├── config.rs   ◄─── AppConfig (env > TOML > defaults)
//! │   ├── db.rs       ◄─── Database handle
//! │   └── draft.rs    ◄─── order draft + in-flight guard
//! ├── commands/       ◄─── one module per area
//! └── error.rs        ◄─── ApiError for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! 1. Logging ─────── tracing-subscriber, RUST_LOG or
//!                    "info,shopkeep=debug,sqlx=warn"
//! 2. Config ──────── AppConfig::load(--config)
//! 3. Database ────── resolve path, create parent dir, connect, migrate
//! 4. Dispatch ────── command → Result<T, ApiError> → text or JSON
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod render;
pub mod state;

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, OrderAction, OrdersAction, ProductAction, ReportAction};
use commands::product::{NewProductArgs, ProductEdit, ProductFilter};
use error::ApiError;
use shopkeep_db::{Database, DbConfig};
use state::{AppConfig, DbState, DraftState};

/// Initializes the tracing subscriber, logging to stderr.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=shopkeep=trace` - Show trace for shopkeep crates only
/// - Default: INFO, DEBUG for shopkeep crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shopkeep=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Everything a command may need.
pub struct App {
    pub config: AppConfig,
    pub db: DbState,
    pub draft: DraftState,
}

impl App {
    pub async fn open(config: AppConfig) -> anyhow::Result<Self> {
        let db_path = config.resolve_database_path()?;
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating data directory {}", parent.display()))?;
        }
        info!(?db_path, "Database path determined");

        let db = Database::new(DbConfig::new(&db_path))
            .await
            .with_context(|| format!("opening database {}", db_path.display()))?;
        info!("Database connected and migrations applied");

        Ok(App {
            config,
            db: DbState::new(db),
            draft: DraftState::new(),
        })
    }
}

/// Loads configuration, opens the database and runs one command.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    debug!(store = %config.store_name, policy = %config.checkout_policy, "Configuration loaded");

    if let Command::Config = cli.command {
        let view = commands::config::get_config(&config)?;
        return emit(cli.json, &view, || render::config_view(&view));
    }

    let app = App::open(config).await?;
    let result = dispatch(&app, cli.command, cli.json).await;
    app.db.inner().close().await;

    match result {
        Ok(()) => Ok(()),
        Err(err) if cli.json => {
            println!("{}", serde_json::to_string_pretty(&err)?);
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

fn emit<T, F>(json: bool, value: &T, text: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce() -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

async fn dispatch(app: &App, command: Command, json: bool) -> Result<(), ApiError> {
    let App { config, db, draft } = app;
    let out = |r: anyhow::Result<()>| r.map_err(|e| ApiError::internal(e.to_string()));

    match command {
        Command::Products { action } => match action {
            ProductAction::List { available, low, filter } => {
                let which = if low {
                    ProductFilter::LowStock
                } else if available || filter.is_some() {
                    ProductFilter::Available
                } else {
                    ProductFilter::All
                };
                let listing = commands::product::list_products(db, which, filter.as_deref()).await?;
                out(emit(json, &listing, || render::product_listing(config, &listing)))
            }
            ProductAction::Search { query } => {
                let found = commands::product::search_products(db, &query).await?;
                out(emit(json, &found, || render::products(config, &found)))
            }
            ProductAction::Add(fields) => {
                let added = commands::product::add_product(
                    db,
                    NewProductArgs {
                        name: fields.name,
                        code: fields.code,
                        purchase_price_cents: fields.purchase.cents(),
                        selling_price_cents: fields.price.cents(),
                        quantity: fields.quantity,
                        low_stock_threshold: fields.threshold,
                        image_url: fields.image_url,
                    },
                )
                .await?;
                out(emit(json, &added, || render::product(config, &added)))
            }
            ProductAction::Edit { code, fields } => {
                let edited = commands::product::edit_product(
                    db,
                    &code,
                    ProductEdit {
                        name: fields.name,
                        code: fields.new_code,
                        purchase_price_cents: fields.purchase.map(|m| m.cents()),
                        selling_price_cents: fields.price.map(|m| m.cents()),
                        quantity: fields.quantity,
                        low_stock_threshold: fields.threshold,
                        image_url: fields.image_url,
                    },
                )
                .await?;
                out(emit(json, &edited, || render::product(config, &edited)))
            }
            ProductAction::Stock { code, delta } => {
                let product = commands::product::adjust_stock(db, &code, delta).await?;
                out(emit(json, &product, || render::product(config, &product)))
            }
            ProductAction::Delete { code } => {
                let deleted = commands::product::delete_product(db, &code).await?;
                out(emit(json, &deleted, || format!("Deleted {} {}\n", deleted.code, deleted.name)))
            }
        },

        Command::Order { action } => match action {
            OrderAction::New { items, customer, discount, debt, dry_run } => {
                let args = commands::order::NewOrderArgs { items, customer, discount, debt };
                let outcome = commands::order::new_order(db, draft, config, &args, dry_run).await?;
                out(emit(json, &outcome, || render::order_outcome(config, &outcome)))
            }
        },

        Command::Orders { action } => match action {
            OrdersAction::List { status } => {
                let orders = commands::order::list_orders(db, status).await?;
                out(emit(json, &orders, || render::orders(config, &orders)))
            }
            OrdersAction::Show { number } => {
                let detail = commands::order::show_order(db, number).await?;
                out(emit(json, &detail, || render::order_detail(config, &detail)))
            }
            OrdersAction::Status { number, status } => {
                let order = commands::order::set_order_status(db, number, status).await?;
                out(emit(json, &order, || format!("{}\n", render::order_line(config, &order))))
            }
        },

        Command::Dashboard => {
            let stats = commands::dashboard::dashboard(db, config).await?;
            out(emit(json, &stats, || render::dashboard(config, &stats)))
        }

        Command::Report { action } => match action {
            ReportAction::Show(period) => {
                let period = commands::report::resolve_period(period.year, period.month)?;
                let summary = commands::report::monthly_summary(db, config, period).await?;
                out(emit(json, &summary, || render::summary(config, &summary)))
            }
            ReportAction::Save(period) => {
                let period = commands::report::resolve_period(period.year, period.month)?;
                let saved = commands::report::save_report(db, config, period).await?;
                out(emit(json, &saved, || render::reports(config, std::slice::from_ref(&saved))))
            }
            ReportAction::Saved => {
                let saved = commands::report::saved_reports(db).await?;
                out(emit(json, &saved, || render::reports(config, &saved)))
            }
        },

        Command::Config => {
            let view = commands::config::get_config(config)?;
            out(emit(json, &view, || render::config_view(&view)))
        }
    }
}

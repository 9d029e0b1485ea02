//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shopkeep_core::{Money, OrderStatus};

use crate::commands::order::ItemSpec;

#[derive(Debug, Parser)]
#[command(name = "shopkeep")]
#[command(author, version, about = "Store catalog, orders and reports")]
pub struct Cli {
    /// Config file (default: <config dir>/shopkeep.toml)
    #[arg(long, global = true, env = "SHOPKEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the product catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Work with a new order
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Look up submitted orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Sales, stock and recent orders at a glance
    Dashboard,
    /// Monthly reports
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },
    /// Show the effective configuration
    Config,
}

#[derive(Debug, Subcommand)]
pub enum ProductAction {
    /// List products
    List {
        /// Only products with stock (the order screen list)
        #[arg(long, conflicts_with = "low")]
        available: bool,

        /// Only products at or below their low-stock threshold
        #[arg(long)]
        low: bool,

        /// Case-sensitive substring of name or code, in-stock products only
        #[arg(long)]
        filter: Option<String>,
    },
    /// Case-insensitive search over name, code and id
    Search { query: String },
    /// Add a product
    Add(ProductFields),
    /// Change product fields
    Edit {
        /// Code of the product to edit
        code: String,

        #[command(flatten)]
        fields: ProductEditFields,
    },
    /// Step stock up or down, e.g. `stock OIL-1 -2`
    Stock {
        code: String,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Delete a product; past order lines keep its name
    Delete { code: String },
}

#[derive(Debug, Args)]
pub struct ProductFields {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub code: String,

    /// Purchase price, e.g. 60.00
    #[arg(long)]
    pub purchase: Money,

    /// Selling price, e.g. 100.00
    #[arg(long)]
    pub price: Money,

    #[arg(long, default_value_t = 0)]
    pub quantity: i64,

    /// Low-stock threshold (default 5)
    #[arg(long)]
    pub threshold: Option<i64>,

    #[arg(long)]
    pub image_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct ProductEditFields {
    #[arg(long)]
    pub name: Option<String>,

    /// New code
    #[arg(long = "new-code")]
    pub new_code: Option<String>,

    #[arg(long)]
    pub purchase: Option<Money>,

    #[arg(long)]
    pub price: Option<Money>,

    #[arg(long)]
    pub quantity: Option<i64>,

    #[arg(long)]
    pub threshold: Option<i64>,

    #[arg(long)]
    pub image_url: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum OrderAction {
    /// Build an order and submit it
    New {
        /// CODE[:QTY][@PRICE], repeatable
        #[arg(long = "item", required = true)]
        items: Vec<ItemSpec>,

        /// Required when part of the order is on credit
        #[arg(long)]
        customer: Option<String>,

        /// Order-level discount, e.g. 5.00
        #[arg(long, allow_negative_numbers = true)]
        discount: Option<Money>,

        /// Amount left unpaid
        #[arg(long, allow_negative_numbers = true)]
        debt: Option<Money>,

        /// Validate and show totals without submitting
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum OrdersAction {
    /// List orders, newest first
    List {
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Show an order with its items and payments
    Show { number: i64 },
    /// Change an order's status
    Status { number: i64, status: OrderStatus },
}

#[derive(Debug, Subcommand)]
pub enum ReportAction {
    /// Compute a month's figures (default: current month)
    Show(PeriodArgs),
    /// Compute and store a month's figures
    Save(PeriodArgs),
    /// List stored reports
    Saved,
}

#[derive(Debug, Args)]
pub struct PeriodArgs {
    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_order_new() {
        let cli = Cli::try_parse_from([
            "shopkeep", "order", "new", "--item", "OIL-1:2", "--item", "TEA-1@4.50", "--debt", "10",
            "--customer", "Ali", "--json",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Command::Order {
                action: OrderAction::New { items, debt, customer, dry_run, .. },
            } => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[1].price, Some(Money::from_cents(450)));
                assert_eq!(debt, Some(Money::from_cents(1000)));
                assert_eq!(customer.as_deref(), Some("Ali"));
                assert!(!dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_negative_stock_step() {
        let cli = Cli::try_parse_from(["shopkeep", "products", "stock", "OIL-1", "-3"]).unwrap();
        match cli.command {
            Command::Products {
                action: ProductAction::Stock { delta, .. },
            } => assert_eq!(delta, -3),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_bad_item_rejected_at_parse() {
        assert!(Cli::try_parse_from(["shopkeep", "order", "new", "--item", "OIL-1:0"]).is_err());
        assert!(Cli::try_parse_from(["shopkeep", "order", "new"]).is_err());
    }

    #[test]
    fn test_status_parses() {
        let cli = Cli::try_parse_from(["shopkeep", "orders", "status", "3", "Returned"]).unwrap();
        match cli.command {
            Command::Orders {
                action: OrdersAction::Status { number, status },
            } => {
                assert_eq!(number, 3);
                assert_eq!(status, OrderStatus::Returned);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}

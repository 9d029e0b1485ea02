//! # Shopkeep Entry Point
//!
//! ```bash
//! shopkeep products add --name "Olive Oil" --code OIL-1 --purchase 60 --price 100 --quantity 12
//! shopkeep order new --item OIL-1:2 --discount 5 --debt 80 --customer "Ali"
//! shopkeep orders show 1
//! shopkeep report save --year 2024 --month 3
//! ```

use clap::Parser;
use shopkeep_cli::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shopkeep_cli::init_tracing();

    let cli = Cli::parse();
    shopkeep_cli::run(cli).await
}

//! # Seed Data Generator
//!
//! Fills a development database with a grocery catalogue and a few
//! submitted orders.
//!
//! ## Usage
//! ```bash
//! cargo run -p shopkeep-db --bin seed
//! cargo run -p shopkeep-db --bin seed -- --db ./data/shopkeep.db --orders 20
//! ```
//!
//! Product codes are `{CATEGORY}-{INDEX}`; stock varies so that some
//! products land below their low-stock threshold and some are sold out.

use std::env;

use shopkeep_core::{Money, OrderDraft, Product, ProductInput};
use shopkeep_db::{checkout, CheckoutPolicy, Database, DbConfig};

const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "OIL",
        &["Sunflower Oil 1L", "Olive Oil 500ml", "Cotton Oil 5L", "Butter 200g"],
    ),
    (
        "GRN",
        &["Rice 1kg", "Buckwheat 900g", "Flour 2kg", "Pasta 400g", "Oat Flakes 500g"],
    ),
    (
        "BEV",
        &["Black Tea 100 bags", "Green Tea 250g", "Instant Coffee 95g", "Mineral Water 1.5L"],
    ),
    (
        "SNK",
        &["Sugar 1kg", "Chocolate Bar", "Biscuits 300g", "Sunflower Seeds", "Dried Apricots 250g"],
    ),
    (
        "HOM",
        &["Dish Soap", "Laundry Powder 3kg", "Toilet Paper 4 rolls", "Matches 10 pack"],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./shopkeep_dev.db");
    let mut order_count: usize = 10;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--orders" | "-o" => {
                if i + 1 < args.len() {
                    order_count = args[i + 1].parse().unwrap_or(10);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Shopkeep Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./shopkeep_dev.db)");
                println!("  -o, --orders <N>     Number of demo orders (default: 10)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Shopkeep Seed Data Generator");
    println!("===============================");
    println!("Database: {db_path}");
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {existing} products");
        println!("  Skipping seed to avoid duplicate codes.");
        return Ok(());
    }

    let mut products = Vec::new();
    for (category_idx, (category, names)) in CATEGORIES.iter().enumerate() {
        for (idx, name) in names.iter().enumerate() {
            let input = generate_product(category, name, category_idx * 10 + idx);
            match db.products().insert(&input).await {
                Ok(product) => products.push(product),
                Err(e) => eprintln!("Failed to insert {}: {e}", input.code),
            }
        }
    }
    println!("✓ Inserted {} products", products.len());

    let mut submitted = 0;
    for n in 0..order_count {
        let Some(draft) = generate_draft(&products, n) else {
            continue;
        };

        match checkout::submit(&db, &draft, CheckoutPolicy::Compensate).await {
            Ok(receipt) => {
                submitted += 1;
                // Keep local snapshots in step with what the store now holds.
                for item in &receipt.items {
                    if let Some(p) = products.iter_mut().find(|p| Some(&p.id) == item.product_id.as_ref()) {
                        p.quantity -= item.quantity;
                    }
                }
            }
            Err(e) => eprintln!("Order {n} skipped: {e}"),
        }
    }
    println!("✓ Submitted {submitted} orders");

    let low = db.products().list_low_stock().await?;
    println!("  Low stock products: {}", low.len());
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn generate_product(category: &str, name: &str, seed: usize) -> ProductInput {
    // 1.00 .. 30.99
    let purchase = 100 + ((seed * 373) % 3000) as i64;
    // 20-45% markup
    let markup = 20 + (seed % 26) as i64;
    let selling = purchase + purchase * markup / 100;

    ProductInput {
        name: name.to_string(),
        code: format!("{category}-{:03}", seed + 1),
        purchase_price_cents: purchase,
        selling_price_cents: selling,
        quantity: (seed % 7) as i64 * 6,
        low_stock_threshold: 5,
        image_url: None,
    }
}

/// Two or three lines; every fourth order is partly on credit.
fn generate_draft(products: &[Product], n: usize) -> Option<OrderDraft> {
    let sellable: Vec<&Product> = products.iter().filter(|p| p.can_sell(1)).collect();
    if sellable.is_empty() {
        return None;
    }

    let mut draft = OrderDraft::new();
    for offset in 0..(2 + n % 2) {
        let product = sellable[(n * 5 + offset * 3) % sellable.len()];
        let units = 1 + (n + offset) as i64 % 2;
        for _ in 0..units {
            // Lines that run out of snapshot stock are just shorter.
            if draft.cart_mut().add_line(product).is_err() {
                break;
            }
        }
    }

    if n % 4 == 3 {
        let half = Money::from_cents(draft.totals().final_amount.cents() / 2);
        draft.set_customer_name(format!("Customer {}", n + 1));
        draft.set_debt_amount(half);
    }

    Some(draft)
}

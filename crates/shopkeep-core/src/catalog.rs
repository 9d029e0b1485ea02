//! # Catalog Helpers
//!
//! Filtering and stock arithmetic over product lists that have already been
//! loaded from the store.
//!
//! Two different searches exist:
//! - [`browse`] feeds the order screen: in-stock products only, matched by a
//!   case-sensitive substring of name or code.
//! - [`search`] feeds the catalog and dashboard: trimmed, case-insensitive,
//!   and also matches the product id.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Product, StockStatus};

/// Products the order screen may offer for `query`.
///
/// ## Example
/// ```rust
/// use shopkeep_core::catalog::browse;
/// use shopkeep_core::money::Money;
/// use shopkeep_core::types::Product;
///
/// let products = vec![
///     Product::new("Olive Oil", "OIL-1", Money::from_cents(600), Money::from_cents(1000), 4),
///     Product::new("Olive Soap", "SOAP-1", Money::from_cents(80), Money::from_cents(150), 0),
/// ];
///
/// assert_eq!(browse(&products, "Olive").len(), 1); // soap is out of stock
/// assert!(browse(&products, "olive").is_empty()); // case-sensitive
/// ```
pub fn browse<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|p| p.quantity > 0)
        .filter(|p| p.name.contains(query) || p.code.contains(query))
        .collect()
}

/// Trims and lowercases a search query. A blank query means "no search".
pub fn normalize_search(query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        None
    } else {
        Some(query.to_lowercase())
    }
}

/// Case-insensitive match on name, code or id. `needle` must already be
/// lowercased.
pub fn matches_search(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.code.to_lowercase().contains(needle)
        || product.id.to_lowercase().contains(needle)
}

/// Catalog search. A blank query returns every product.
pub fn search<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    match normalize_search(query) {
        Some(needle) => products
            .iter()
            .filter(|p| matches_search(p, &needle))
            .collect(),
        None => products.iter().collect(),
    }
}

/// Products at or below their threshold, lowest stock first.
pub fn low_stock(products: &[Product]) -> Vec<&Product> {
    let mut low: Vec<&Product> = products.iter().filter(|p| p.needs_restock()).collect();
    low.sort_by_key(|p| p.quantity);
    low
}

/// Σ purchase price × quantity.
pub fn inventory_value(products: &[Product]) -> Money {
    products
        .iter()
        .map(|p| p.purchase_price().multiply_quantity(p.quantity))
        .sum()
}

/// New stock level after a manual ±n adjustment.
///
/// ```rust
/// use shopkeep_core::catalog::adjust_stock;
///
/// assert_eq!(adjust_stock(3, -3), Ok(0));
/// assert!(adjust_stock(3, -4).is_err());
/// ```
pub fn adjust_stock(current: i64, delta: i64) -> Result<i64, ValidationError> {
    let next = current
        .checked_add(delta)
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "adjustment overflows".to_string(),
        })?;
    if next < 0 {
        return Err(ValidationError::negative("quantity"));
    }
    Ok(next)
}

/// Product counts per stock status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSummary {
    pub in_stock: usize,
    pub low: usize,
    pub out_of_stock: usize,
}

impl StockSummary {
    pub fn of(products: &[Product]) -> Self {
        products
            .iter()
            .fold(StockSummary::default(), |mut acc, p| {
                match p.stock_status() {
                    StockStatus::InStock => acc.in_stock += 1,
                    StockStatus::Low => acc.low += 1,
                    StockStatus::OutOfStock => acc.out_of_stock += 1,
                }
                acc
            })
    }
}

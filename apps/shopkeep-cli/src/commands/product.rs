//! # Product Commands
//!
//! Catalog listing, search and maintenance.
//!
//! ## Two Kinds of Search
//! ```text
//! products list --available --filter Oil    order screen browse:
//!                                           in stock only, case-sensitive
//!                                           substring of name or code
//!
//! products search oil                       catalog search:
//!                                           trimmed, case-insensitive,
//!                                           name, code or id
//! ```
//!
//! Products are addressed by their code on the command line.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::DbState;
use shopkeep_core::catalog::{self, StockSummary};
use shopkeep_core::validation;
use shopkeep_core::{Product, ProductInput, StockStatus, DEFAULT_LOW_STOCK_THRESHOLD};

/// Product as shown to the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub code: String,
    pub name: String,
    pub purchase_price_cents: i64,
    pub selling_price_cents: i64,
    pub unit_profit_cents: i64,
    pub quantity: i64,
    pub low_stock_threshold: i64,
    pub stock_status: StockStatus,
    pub image_url: Option<String>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            unit_profit_cents: p.unit_profit().cents(),
            stock_status: p.stock_status(),
            id: p.id,
            code: p.code,
            name: p.name,
            purchase_price_cents: p.purchase_price_cents,
            selling_price_cents: p.selling_price_cents,
            quantity: p.quantity,
            low_stock_threshold: p.low_stock_threshold,
            image_url: p.image_url,
        }
    }
}

impl From<&Product> for ProductDto {
    fn from(p: &Product) -> Self {
        ProductDto::from(p.clone())
    }
}

/// Which products `products list` shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductFilter {
    #[default]
    All,
    /// Quantity above zero (the order screen's list)
    Available,
    /// At or below the low-stock threshold
    LowStock,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub products: Vec<ProductDto>,
    pub summary: StockSummary,
}

/// New product fields, prices already in cents.
#[derive(Debug, Clone, Default)]
pub struct NewProductArgs {
    pub name: String,
    pub code: String,
    pub purchase_price_cents: i64,
    pub selling_price_cents: i64,
    pub quantity: i64,
    pub low_stock_threshold: Option<i64>,
    pub image_url: Option<String>,
}

/// Fields to change; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ProductEdit {
    pub name: Option<String>,
    pub code: Option<String>,
    pub purchase_price_cents: Option<i64>,
    pub selling_price_cents: Option<i64>,
    pub quantity: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub image_url: Option<String>,
}

pub async fn find_by_code(db: &DbState, code: &str) -> Result<Product, ApiError> {
    let code = code.trim();
    db.inner()
        .products()
        .get_by_code(code)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", code))
}

pub async fn list_products(
    db: &DbState,
    filter: ProductFilter,
    browse_query: Option<&str>,
) -> Result<ProductListing, ApiError> {
    debug!(?filter, "list_products command");

    let repo = db.inner().products();
    let mut products = match filter {
        ProductFilter::All => repo.list_all().await?,
        ProductFilter::Available => repo.list_in_stock().await?,
        ProductFilter::LowStock => repo.list_low_stock().await?,
    };

    if let Some(query) = browse_query {
        products = catalog::browse(&products, query).into_iter().cloned().collect();
    }

    Ok(ProductListing {
        summary: StockSummary::of(&products),
        products: products.into_iter().map(ProductDto::from).collect(),
    })
}

pub async fn search_products(db: &DbState, query: &str) -> Result<Vec<ProductDto>, ApiError> {
    validation::validate_search_query(query)?;

    let all = db.inner().products().list_all().await?;
    let found: Vec<ProductDto> = catalog::search(&all, query).into_iter().map(ProductDto::from).collect();

    debug!(query = %query, results = found.len(), "search_products command");
    Ok(found)
}

pub async fn add_product(db: &DbState, args: NewProductArgs) -> Result<ProductDto, ApiError> {
    let input = ProductInput {
        name: args.name,
        code: args.code,
        purchase_price_cents: args.purchase_price_cents,
        selling_price_cents: args.selling_price_cents,
        quantity: args.quantity,
        low_stock_threshold: args.low_stock_threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
        image_url: args.image_url,
    }
    .validated()?;

    let product = db.inner().products().insert(&input).await?;
    info!(code = %product.code, "Product added");
    Ok(product.into())
}

pub async fn edit_product(db: &DbState, code: &str, edit: ProductEdit) -> Result<ProductDto, ApiError> {
    let current = find_by_code(db, code).await?;

    let input = ProductInput {
        name: edit.name.unwrap_or(current.name),
        code: edit.code.unwrap_or(current.code),
        purchase_price_cents: edit.purchase_price_cents.unwrap_or(current.purchase_price_cents),
        selling_price_cents: edit.selling_price_cents.unwrap_or(current.selling_price_cents),
        quantity: edit.quantity.unwrap_or(current.quantity),
        low_stock_threshold: edit.low_stock_threshold.unwrap_or(current.low_stock_threshold),
        image_url: edit.image_url.or(current.image_url),
    }
    .validated()?;

    let product = db.inner().products().update(&current.id, &input).await?;
    info!(code = %product.code, "Product updated");
    Ok(product.into())
}

/// Stepper: changes stock by `delta`, never below zero.
pub async fn adjust_stock(db: &DbState, code: &str, delta: i64) -> Result<ProductDto, ApiError> {
    let current = find_by_code(db, code).await?;
    catalog::adjust_stock(current.quantity, delta)?;

    let product = db.inner().products().adjust_stock(&current.id, delta).await?;
    info!(code = %product.code, delta, quantity = product.quantity, "Stock adjusted");
    Ok(product.into())
}

pub async fn delete_product(db: &DbState, code: &str) -> Result<ProductDto, ApiError> {
    let product = find_by_code(db, code).await?;
    db.inner().products().delete(&product.id).await?;
    info!(code = %product.code, "Product deleted");
    Ok(product.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn oil() -> NewProductArgs {
        NewProductArgs {
            name: "  Olive Oil ".to_string(),
            code: "OIL-1".to_string(),
            purchase_price_cents: 6000,
            selling_price_cents: 10000,
            quantity: 3,
            ..NewProductArgs::default()
        }
    }

    #[tokio::test]
    async fn test_add_normalizes_and_defaults_threshold() {
        let db = DbState::in_memory().await.unwrap();
        let added = add_product(&db, oil()).await.unwrap();

        assert_eq!(added.name, "Olive Oil");
        assert_eq!(added.low_stock_threshold, DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(added.unit_profit_cents, 4000);
        assert_eq!(added.stock_status, StockStatus::Low);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = DbState::in_memory().await.unwrap();
        add_product(&db, oil()).await.unwrap();

        let err = add_product(&db, oil()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_database() {
        let db = DbState::in_memory().await.unwrap();
        let err = add_product(
            &db,
            NewProductArgs {
                selling_price_cents: -1,
                ..oil()
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(db.inner().products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_edit_keeps_untouched_fields() {
        let db = DbState::in_memory().await.unwrap();
        add_product(&db, oil()).await.unwrap();

        let edited = edit_product(
            &db,
            "OIL-1",
            ProductEdit {
                selling_price_cents: Some(11000),
                ..ProductEdit::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(edited.selling_price_cents, 11000);
        assert_eq!(edited.purchase_price_cents, 6000);
        assert_eq!(edited.name, "Olive Oil");
    }

    #[tokio::test]
    async fn test_stock_stepper_stops_at_zero() {
        let db = DbState::in_memory().await.unwrap();
        add_product(&db, oil()).await.unwrap();

        assert_eq!(adjust_stock(&db, "OIL-1", 2).await.unwrap().quantity, 5);
        assert_eq!(adjust_stock(&db, "OIL-1", -5).await.unwrap().quantity, 0);

        let err = adjust_stock(&db, "OIL-1", -1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_browse_vs_search() {
        let db = DbState::in_memory().await.unwrap();
        add_product(&db, oil()).await.unwrap();
        add_product(
            &db,
            NewProductArgs {
                name: "Olive Soap".to_string(),
                code: "SOAP-1".to_string(),
                quantity: 0,
                ..oil()
            },
        )
        .await
        .unwrap();

        let browsed = list_products(&db, ProductFilter::Available, Some("Olive")).await.unwrap();
        assert_eq!(browsed.products.len(), 1);
        assert!(list_products(&db, ProductFilter::Available, Some("olive"))
            .await
            .unwrap()
            .products
            .is_empty());

        let found = search_products(&db, "  OLIVE ").await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_listing_summary() {
        let db = DbState::in_memory().await.unwrap();
        add_product(&db, oil()).await.unwrap();
        add_product(
            &db,
            NewProductArgs {
                code: "OIL-2".to_string(),
                quantity: 40,
                ..oil()
            },
        )
        .await
        .unwrap();

        let listing = list_products(&db, ProductFilter::All, None).await.unwrap();
        assert_eq!(listing.summary.in_stock, 1);
        assert_eq!(listing.summary.low, 1);

        let low = list_products(&db, ProductFilter::LowStock, None).await.unwrap();
        assert_eq!(low.products.len(), 1);
        assert_eq!(low.products[0].code, "OIL-1");
    }

    #[tokio::test]
    async fn test_delete_unknown_code() {
        let db = DbState::in_memory().await.unwrap();
        let err = delete_product(&db, "NOPE").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}

//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ Read-then-write (lost update between two checkouts)                │
//! │     SELECT quantity → 5;  UPDATE products SET quantity = 5 - 3         │
//! │                                                                         │
//! │  ✅ Conditional delta (single statement)                               │
//! │     UPDATE products SET quantity = quantity - 3                        │
//! │     WHERE id = ? AND quantity >= 3                                     │
//! │                                                                         │
//! │  0 rows affected → product missing, or not enough stock                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shopkeep_core::{Product, ProductInput};

const SELECT_PRODUCT: &str = r#"
    SELECT
        id, name, code,
        purchase_price_cents, selling_price_cents,
        quantity, low_stock_threshold, image_url,
        created_at, updated_at
    FROM products
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Every product, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "{SELECT_PRODUCT} ORDER BY created_at DESC, name"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Products with at least one unit on hand, by name.
    pub async fn list_in_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "{SELECT_PRODUCT} WHERE quantity > 0 ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Products at or below their threshold, lowest stock first.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "{SELECT_PRODUCT} WHERE quantity <= low_stock_threshold ORDER BY quantity, name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE code = ?1"))
            .bind(code.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a product built from validated input.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - code already exists
    pub async fn insert(&self, input: &ProductInput) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: input.name.clone(),
            code: input.code.clone(),
            purchase_price_cents: input.purchase_price_cents,
            selling_price_cents: input.selling_price_cents,
            quantity: input.quantity,
            low_stock_threshold: input.low_stock_threshold,
            image_url: input.image_url.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(code = %product.code, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, code,
                purchase_price_cents, selling_price_cents,
                quantity, low_stock_threshold, image_url,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.code)
        .bind(product.purchase_price_cents)
        .bind(product.selling_price_cents)
        .bind(product.quantity)
        .bind(product.low_stock_threshold)
        .bind(&product.image_url)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_code(e, &product.code))?;

        info!(id = %product.id, code = %product.code, "Product created");
        Ok(product)
    }

    /// Replaces every editable field of a product.
    pub async fn update(&self, id: &str, input: &ProductInput) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                code = ?3,
                purchase_price_cents = ?4,
                selling_price_cents = ?5,
                quantity = ?6,
                low_stock_threshold = ?7,
                image_url = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.code)
        .bind(input.purchase_price_cents)
        .bind(input.selling_price_cents)
        .bind(input.quantity)
        .bind(input.low_stock_threshold)
        .bind(&input.image_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_code(e, &input.code))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.require(id).await
    }

    /// Applies a manual stock adjustment of `delta` units.
    ///
    /// Refuses (without writing) when the result would be negative.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<Product> {
        debug!(id = %id, delta = delta, "Adjusting stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity + ?2, updated_at = ?3
            WHERE id = ?1 AND quantity + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.refusal(id, delta.saturating_neg()).await);
        }

        self.require(id).await
    }

    /// Takes `quantity` units out of stock, only if that many are on hand.
    pub async fn decrement_stock(&self, id: &str, quantity: i64) -> DbResult<()> {
        debug!(id = %id, quantity = quantity, "Decrementing stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity - ?2, updated_at = ?3
            WHERE id = ?1 AND quantity >= ?2
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.refusal(id, quantity).await);
        }

        Ok(())
    }

    /// Hard delete. Order items keep their snapshot name and lose the link.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(id = %id, "Product deleted");
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn require(&self, id: &str) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Explains why a conditional stock update touched no rows.
    async fn refusal(&self, id: &str, requested: i64) -> DbError {
        match self.get_by_id(id).await {
            Ok(Some(_)) => DbError::InsufficientStock {
                product_id: id.to_string(),
                requested,
            },
            Ok(None) => DbError::not_found("Product", id),
            Err(e) => e,
        }
    }
}

fn duplicate_code(err: sqlx::Error, code: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate("code", code),
        other => other,
    }
}

// =============================================================================
// Tests
// =============================================================================

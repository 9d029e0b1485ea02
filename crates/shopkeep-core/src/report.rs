//! # Reports
//!
//! Aggregation over orders and products that have already been fetched:
//! the dashboard panel, the monthly report and per-order balances.
//!
//! ## Monthly Report Rules
//! ```text
//! orders created in (month, year), UTC
//!   │
//!   ├── status == completed ──► total_sales, total_cost, total_profit,
//!   │                           total_orders
//!   │
//!   └── status != cancelled ──► items grouped by product
//!                                 (deleted products: by snapshot name)
//!                               sorted by quantity desc, first 5
//!                               ──► top_products {name, quantity, revenue}
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Order, OrderItem, OrderStatus, PaymentRecord, Product, TopProduct};
use crate::validation::{validate_month, validate_year};

// =============================================================================
// Report Period
// =============================================================================

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub year: i32,
    pub month: u32,
}

impl ReportPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        validate_year(year)?;
        validate_month(month)?;
        Ok(ReportPeriod { year, month })
    }

    /// The month containing `at`.
    pub fn containing(at: DateTime<Utc>) -> Self {
        ReportPeriod {
            year: at.year(),
            month: at.month(),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at.year() == self.year && at.month() == self.month
    }

    /// Half-open `[start, end)` UTC bounds of the month.
    pub fn bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), ValidationError> {
        let start = first_of_month(self.year, self.month)?;
        let (next_year, next_month) = if self.month == 12 {
            let next_year = self
                .year
                .checked_add(1)
                .ok_or_else(|| invalid_period(self.year, self.month))?;
            (next_year, 1)
        } else {
            (self.year, self.month + 1)
        };
        let end = first_of_month(next_year, next_month)?;
        Ok((start, end))
    }
}

fn first_of_month(year: i32, month: u32) -> Result<DateTime<Utc>, ValidationError> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| invalid_period(year, month))
}

fn invalid_period(year: i32, month: u32) -> ValidationError {
    ValidationError::InvalidFormat {
        field: "period".to_string(),
        reason: format!("{year}-{month:02} is not a valid month"),
    }
}

// =============================================================================
// Monthly Summary
// =============================================================================

/// Figures for one month, computed live or loaded from a saved report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub period: ReportPeriod,
    pub total_sales: Money,
    pub total_cost: Money,
    pub total_profit: Money,
    pub total_orders: i64,
    pub top_products: Vec<TopProduct>,
}

impl MonthlySummary {
    /// Aggregates `orders` and `items` for `period`.
    ///
    /// Inputs may contain rows from other months; they are skipped.
    pub fn compute(
        period: ReportPeriod,
        orders: &[Order],
        items: &[OrderItem],
        top_limit: usize,
    ) -> Self {
        let in_period: HashMap<&str, &Order> = orders
            .iter()
            .filter(|o| period.contains(o.created_at))
            .map(|o| (o.id.as_str(), o))
            .collect();

        let mut summary = MonthlySummary {
            period,
            total_sales: Money::zero(),
            total_cost: Money::zero(),
            total_profit: Money::zero(),
            total_orders: 0,
            top_products: Vec::new(),
        };

        for order in in_period.values().filter(|o| o.status == OrderStatus::Completed) {
            summary.total_sales += order.total_amount();
            summary.total_cost += order.total_cost();
            summary.total_profit += order.total_profit();
            summary.total_orders += 1;
        }

        summary.top_products = top_products(
            items.iter().filter(|item| {
                in_period
                    .get(item.order_id.as_str())
                    .is_some_and(|o| o.status != OrderStatus::Cancelled)
            }),
            top_limit,
        );

        summary
    }
}

/// Groups items by product and returns the `limit` best sellers by
/// quantity. Ties keep the higher revenue first, then the name.
pub fn top_products<'a>(items: impl Iterator<Item = &'a OrderItem>, limit: usize) -> Vec<TopProduct> {
    let mut sales: HashMap<String, TopProduct> = HashMap::new();

    for item in items {
        let key = match &item.product_id {
            Some(id) => format!("id:{id}"),
            None => format!("name:{}", item.product_name),
        };
        let entry = sales.entry(key).or_insert_with(|| TopProduct {
            name: item.product_name.clone(),
            quantity: 0,
            revenue_cents: 0,
        });
        entry.quantity += item.quantity;
        entry.revenue_cents += item.total_price_cents;
    }

    let mut ranked: Vec<TopProduct> = sales.into_values().collect();
    ranked.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then(b.revenue_cents.cmp(&a.revenue_cents))
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(limit);
    ranked
}

// =============================================================================
// Dashboard
// =============================================================================

/// The figures on the landing screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Over completed orders only.
    pub total_sales: Money,
    pub total_profit: Money,
    pub product_count: usize,
    pub low_stock_count: usize,
    pub inventory_value: Money,
    pub recent_orders: Vec<Order>,
    pub low_stock_products: Vec<Product>,
}

impl DashboardStats {
    pub fn compute(orders: &[Order], products: &[Product], limit: usize) -> Self {
        let completed = orders.iter().filter(|o| o.status == OrderStatus::Completed);
        let (total_sales, total_profit) = completed.fold(
            (Money::zero(), Money::zero()),
            |(sales, profit), o| (sales + o.total_amount(), profit + o.total_profit()),
        );

        let mut recent: Vec<&Order> = orders.iter().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let low = catalog::low_stock(products);

        DashboardStats {
            total_sales,
            total_profit,
            product_count: products.len(),
            low_stock_count: low.len(),
            inventory_value: catalog::inventory_value(products),
            recent_orders: recent.into_iter().take(limit).cloned().collect(),
            low_stock_products: low.into_iter().take(limit).cloned().collect(),
        }
    }
}

// =============================================================================
// Balances
// =============================================================================

/// What the customer still owes: total − Σ payments, floored at zero.
pub fn outstanding_balance(order: &Order, payments: &[PaymentRecord]) -> Money {
    let paid: Money = payments
        .iter()
        .filter(|p| p.order_id == order.id)
        .map(PaymentRecord::amount)
        .sum();
    (order.total_amount() - paid).clamp_non_negative()
}

// =============================================================================
// Unit Tests
// =============================================================================

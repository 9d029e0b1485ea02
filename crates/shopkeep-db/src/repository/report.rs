//! # Report Repository
//!
//! Saved monthly snapshots (`monthly_reports`), one row per month.
//!
//! `top_products` is stored as a JSON array of `{name, quantity,
//! revenue_cents}` objects.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shopkeep_core::report::{MonthlySummary, ReportPeriod};
use shopkeep_core::{MonthlyReport, TopProduct};

#[derive(Debug, FromRow)]
struct MonthlyReportRow {
    id: String,
    month: i64,
    year: i64,
    total_sales_cents: i64,
    total_cost_cents: i64,
    total_profit_cents: i64,
    total_orders: i64,
    top_products: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MonthlyReportRow> for MonthlyReport {
    type Error = DbError;

    fn try_from(row: MonthlyReportRow) -> Result<Self, Self::Error> {
        let top_products: Vec<TopProduct> =
            serde_json::from_str(&row.top_products).map_err(|e| DbError::CorruptData {
                column: "monthly_reports.top_products".to_string(),
                reason: e.to_string(),
            })?;
        let month = u32::try_from(row.month).map_err(|e| DbError::CorruptData {
            column: "monthly_reports.month".to_string(),
            reason: e.to_string(),
        })?;
        let year = i32::try_from(row.year).map_err(|e| DbError::CorruptData {
            column: "monthly_reports.year".to_string(),
            reason: e.to_string(),
        })?;

        Ok(MonthlyReport {
            id: row.id,
            month,
            year,
            total_sales_cents: row.total_sales_cents,
            total_cost_cents: row.total_cost_cents,
            total_profit_cents: row.total_profit_cents,
            total_orders: row.total_orders,
            top_products,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_REPORT: &str = r#"
    SELECT
        id, month, year,
        total_sales_cents, total_cost_cents, total_profit_cents,
        total_orders, top_products, created_at, updated_at
    FROM monthly_reports
"#;

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Saves a summary, replacing any report already stored for its month.
    pub async fn upsert(&self, summary: &MonthlySummary) -> DbResult<MonthlyReport> {
        let top_products = serde_json::to_string(&summary.top_products).map_err(|e| {
            DbError::Internal(format!("Failed to encode top products: {e}"))
        })?;
        let now = Utc::now();

        debug!(
            month = summary.period.month,
            year = summary.period.year,
            "Saving monthly report"
        );

        sqlx::query(
            r#"
            INSERT INTO monthly_reports (
                id, month, year,
                total_sales_cents, total_cost_cents, total_profit_cents,
                total_orders, top_products, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            ON CONFLICT (month, year) DO UPDATE SET
                total_sales_cents = excluded.total_sales_cents,
                total_cost_cents = excluded.total_cost_cents,
                total_profit_cents = excluded.total_profit_cents,
                total_orders = excluded.total_orders,
                top_products = excluded.top_products,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(i64::from(summary.period.month))
        .bind(i64::from(summary.period.year))
        .bind(summary.total_sales.cents())
        .bind(summary.total_cost.cents())
        .bind(summary.total_profit.cents())
        .bind(summary.total_orders)
        .bind(top_products)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let saved = self
            .get(summary.period)
            .await?
            .ok_or_else(|| DbError::not_found("MonthlyReport", period_key(summary.period)))?;

        info!(id = %saved.id, month = saved.month, year = saved.year, "Monthly report saved");
        Ok(saved)
    }

    pub async fn get(&self, period: ReportPeriod) -> DbResult<Option<MonthlyReport>> {
        let row = sqlx::query_as::<_, MonthlyReportRow>(&format!(
            "{SELECT_REPORT} WHERE month = ?1 AND year = ?2"
        ))
        .bind(i64::from(period.month))
        .bind(i64::from(period.year))
        .fetch_optional(&self.pool)
        .await?;

        row.map(MonthlyReport::try_from).transpose()
    }

    /// Saved reports, most recent period first.
    pub async fn list(&self) -> DbResult<Vec<MonthlyReport>> {
        let rows = sqlx::query_as::<_, MonthlyReportRow>(&format!(
            "{SELECT_REPORT} ORDER BY year DESC, month DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MonthlyReport::try_from).collect()
    }
}

fn period_key(period: ReportPeriod) -> String {
    format!("{}-{:02}", period.year, period.month)
}

//! # Report Commands
//!
//! Monthly figures computed live from orders, saved as snapshots, and
//! listed back.
//!
//! ```text
//! report show --year 2024 --month 3    compute, print
//! report save --year 2024 --month 3    compute, upsert into monthly_reports
//! report saved                         list snapshots, newest month first
//! ```

use chrono::Utc;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{AppConfig, DbState};
use shopkeep_core::report::{MonthlySummary, ReportPeriod};
use shopkeep_core::MonthlyReport;

/// Period from optional arguments; missing parts default to the current month.
pub fn resolve_period(year: Option<i32>, month: Option<u32>) -> Result<ReportPeriod, ApiError> {
    let now = ReportPeriod::containing(Utc::now());
    Ok(ReportPeriod::new(year.unwrap_or(now.year), month.unwrap_or(now.month))?)
}

pub async fn monthly_summary(
    db: &DbState,
    config: &AppConfig,
    period: ReportPeriod,
) -> Result<MonthlySummary, ApiError> {
    let (start, end) = period.bounds()?;
    let orders = db.inner().orders().list_created_between(start, end).await?;
    let items = db.inner().orders().items_created_between(start, end).await?;

    debug!(
        year = period.year,
        month = period.month,
        orders = orders.len(),
        items = items.len(),
        "monthly_summary command"
    );
    Ok(MonthlySummary::compute(period, &orders, &items, config.top_products_limit))
}

pub async fn save_report(
    db: &DbState,
    config: &AppConfig,
    period: ReportPeriod,
) -> Result<MonthlyReport, ApiError> {
    let summary = monthly_summary(db, config, period).await?;
    let saved = db.inner().reports().upsert(&summary).await?;
    info!(year = saved.year, month = saved.month, "Monthly report saved");
    Ok(saved)
}

pub async fn saved_reports(db: &DbState) -> Result<Vec<MonthlyReport>, ApiError> {
    Ok(db.inner().reports().list().await?)
}

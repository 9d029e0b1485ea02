//! # Dashboard Command
//!
//! Landing figures: sales and profit over completed orders, catalog size,
//! restocking needs and the latest orders.

use tracing::debug;

use crate::error::ApiError;
use crate::state::{AppConfig, DbState};
use shopkeep_core::report::DashboardStats;

pub async fn dashboard(db: &DbState, config: &AppConfig) -> Result<DashboardStats, ApiError> {
    let orders = db.inner().orders().list(None).await?;
    let products = db.inner().products().list_all().await?;

    debug!(orders = orders.len(), products = products.len(), "dashboard command");
    Ok(DashboardStats::compute(&orders, &products, config.recent_orders_limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::order::{new_order, NewOrderArgs};
    use crate::commands::product::{add_product, NewProductArgs};
    use crate::state::DraftState;
    use shopkeep_core::{Money, OrderStatus};

    #[tokio::test]
    async fn test_dashboard_counts_completed_sales_only() {
        let db = DbState::in_memory().await.unwrap();
        let config = AppConfig::default();
        add_product(
            &db,
            NewProductArgs {
                name: "Rice".to_string(),
                code: "RICE-1".to_string(),
                purchase_price_cents: 2000,
                selling_price_cents: 2600,
                quantity: 8,
                ..NewProductArgs::default()
            },
        )
        .await
        .unwrap();

        let draft = DraftState::new();
        for _ in 0..2 {
            let args = NewOrderArgs {
                items: vec!["RICE-1:2".parse().unwrap()],
                ..NewOrderArgs::default()
            };
            new_order(&db, &draft, &config, &args, false).await.unwrap();
        }
        let second = db.inner().orders().get_by_number(2).await.unwrap().unwrap();
        db.inner()
            .orders()
            .update_status(&second.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        let stats = dashboard(&db, &config).await.unwrap();

        assert_eq!(stats.total_sales, Money::from_cents(5200));
        assert_eq!(stats.total_profit, Money::from_cents(1200));
        assert_eq!(stats.product_count, 1);
        // 8 - 4 = 4, at or below the default threshold of 5
        assert_eq!(stats.low_stock_count, 1);
        assert_eq!(stats.recent_orders.len(), 2);
        assert_eq!(stats.inventory_value, Money::from_cents(8000));
    }
}

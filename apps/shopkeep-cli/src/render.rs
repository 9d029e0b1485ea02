//! Plain-text rendering of command results.

use std::fmt::Write;

use shopkeep_core::report::{DashboardStats, MonthlySummary};
use shopkeep_core::{MonthlyReport, Order, StockStatus};

use crate::commands::config::ConfigView;
use crate::commands::order::{OrderDetail, OrderOutcome, OrderPreview, ReceiptDto};
use crate::commands::product::{ProductDto, ProductListing};
use crate::state::AppConfig;

fn stock_label(status: StockStatus) -> &'static str {
    match status {
        StockStatus::InStock => "",
        StockStatus::Low => "LOW",
        StockStatus::OutOfStock => "OUT",
    }
}

fn margin(bps: Option<i64>) -> String {
    match bps {
        Some(bps) => format!("{}.{:02}%", bps / 100, (bps % 100).abs()),
        None => "-".to_string(),
    }
}

pub fn products(config: &AppConfig, products: &[ProductDto]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:<32} {:>12} {:>12} {:>6}",
        "CODE", "NAME", "COST", "PRICE", "QTY"
    );
    for p in products {
        let _ = writeln!(
            out,
            "{:<12} {:<32} {:>12} {:>12} {:>6} {}",
            p.code,
            p.name,
            config.format_currency(p.purchase_price_cents),
            config.format_currency(p.selling_price_cents),
            p.quantity,
            stock_label(p.stock_status),
        );
    }
    out
}

pub fn product_listing(config: &AppConfig, listing: &ProductListing) -> String {
    let mut out = products(config, &listing.products);
    let s = listing.summary;
    let _ = writeln!(
        out,
        "{} products: {} in stock, {} low, {} out",
        listing.products.len(),
        s.in_stock,
        s.low,
        s.out_of_stock
    );
    out
}

pub fn product(config: &AppConfig, p: &ProductDto) -> String {
    format!(
        "{} {} | cost {} | price {} | qty {} (threshold {}) {}\n",
        p.code,
        p.name,
        config.format_currency(p.purchase_price_cents),
        config.format_currency(p.selling_price_cents),
        p.quantity,
        p.low_stock_threshold,
        stock_label(p.stock_status),
    )
}

fn preview(config: &AppConfig, p: &OrderPreview) -> String {
    let mut out = String::new();
    for line in &p.lines {
        let _ = writeln!(
            out,
            "  {:<12} {:<28} {:>4} x {:>10} = {:>12}{}",
            line.code,
            line.name,
            line.quantity,
            config.format_currency(line.unit_price_cents),
            config.format_currency(line.amount_cents),
            if line.marked_down { " *" } else { "" },
        );
    }
    let _ = writeln!(out, "Subtotal:  {}", config.format_currency(p.cart_amount_cents));
    let _ = writeln!(out, "Discount:  {}", config.format_currency(p.order_discount_cents));
    let _ = writeln!(out, "Total:     {}", config.format_currency(p.final_amount_cents));
    let _ = writeln!(
        out,
        "Profit:    {} (margin {})",
        config.format_currency(p.final_profit_cents),
        margin(p.margin_bps)
    );
    let _ = writeln!(
        out,
        "Payment:   {} | paid {} | debt {}",
        p.payment_status,
        config.format_currency(p.paid_cents),
        config.format_currency(p.debt_cents)
    );
    if let Some(customer) = &p.customer_name {
        let _ = writeln!(out, "Customer:  {customer}");
    }
    out
}

fn receipt(config: &AppConfig, r: &ReceiptDto) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Order #{} {} | total {} | paid {} ({})",
        r.order.order_number,
        r.order.status,
        config.format_currency(r.order.total_amount_cents),
        config.format_currency(r.order.paid_amount_cents),
        r.order.payment_status,
    );
    for item in &r.items {
        let _ = writeln!(
            out,
            "  {:<28} {:>4} x {:>10}",
            item.product_name,
            item.quantity,
            config.format_currency(item.unit_price_cents)
        );
    }
    if !r.failed_steps.is_empty() {
        let _ = writeln!(out, "Incomplete, these steps failed:");
        for step in &r.failed_steps {
            let _ = writeln!(
                out,
                "  {} {}: {}",
                step.step,
                step.product_name.as_deref().unwrap_or(""),
                step.error
            );
        }
    }
    out
}

pub fn order_outcome(config: &AppConfig, outcome: &OrderOutcome) -> String {
    match outcome {
        OrderOutcome::Preview(p) => format!("Preview (not submitted)\n{}", preview(config, p)),
        OrderOutcome::Submitted(r) => receipt(config, r),
    }
}

pub fn orders(config: &AppConfig, orders: &[Order]) -> String {
    let mut out = String::new();
    for o in orders {
        let _ = writeln!(out, "{}", order_line(config, o));
    }
    if orders.is_empty() {
        out.push_str("No orders\n");
    }
    out
}

pub fn order_line(config: &AppConfig, o: &Order) -> String {
    format!(
        "#{:<5} {} {:<10} {:>12} {:<15} {}",
        o.order_number,
        o.created_at.format("%Y-%m-%d %H:%M"),
        o.status,
        config.format_currency(o.total_amount_cents),
        o.payment_status,
        o.customer_name.as_deref().unwrap_or(""),
    )
}

pub fn order_detail(config: &AppConfig, d: &OrderDetail) -> String {
    let mut out = order_line(config, &d.order);
    out.push('\n');
    for item in &d.items {
        let _ = writeln!(
            out,
            "  {:<28} {:>4} x {:>10} = {:>12}",
            item.product_name,
            item.quantity,
            config.format_currency(item.unit_price_cents),
            config.format_currency(item.total_price_cents)
        );
    }
    for payment in &d.payments {
        let _ = writeln!(
            out,
            "  paid {} on {} {}",
            config.format_currency(payment.payment_amount_cents),
            payment.created_at.format("%Y-%m-%d"),
            payment.notes.as_deref().unwrap_or("")
        );
    }
    let _ = writeln!(out, "Outstanding: {}", config.format_currency(d.outstanding_cents));
    out
}

pub fn dashboard(config: &AppConfig, stats: &DashboardStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", config.store_name);
    let _ = writeln!(out, "Sales:            {}", config.format_currency(stats.total_sales.cents()));
    let _ = writeln!(out, "Profit:           {}", config.format_currency(stats.total_profit.cents()));
    let _ = writeln!(out, "Products:         {}", stats.product_count);
    let _ = writeln!(out, "Low stock:        {}", stats.low_stock_count);
    let _ = writeln!(
        out,
        "Inventory value:  {}",
        config.format_currency(stats.inventory_value.cents())
    );
    let _ = writeln!(out, "\nRecent orders");
    out.push_str(&orders(config, &stats.recent_orders));
    if !stats.low_stock_products.is_empty() {
        let _ = writeln!(out, "\nRestock");
        for p in &stats.low_stock_products {
            let _ = writeln!(out, "  {:<12} {:<32} {:>6}", p.code, p.name, p.quantity);
        }
    }
    out
}

pub fn summary(config: &AppConfig, s: &MonthlySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}-{:02}", s.period.year, s.period.month);
    let _ = writeln!(out, "Orders:  {}", s.total_orders);
    let _ = writeln!(out, "Sales:   {}", config.format_currency(s.total_sales.cents()));
    let _ = writeln!(out, "Cost:    {}", config.format_currency(s.total_cost.cents()));
    let _ = writeln!(out, "Profit:  {}", config.format_currency(s.total_profit.cents()));
    for (rank, top) in s.top_products.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {:<28} {:>5} sold {:>12}",
            rank + 1,
            top.name,
            top.quantity,
            config.format_currency(top.revenue_cents)
        );
    }
    out
}

pub fn reports(config: &AppConfig, reports: &[MonthlyReport]) -> String {
    let mut out = String::new();
    for r in reports {
        let _ = writeln!(
            out,
            "{}-{:02}  orders {:>5}  sales {:>12}  profit {:>12}",
            r.year,
            r.month,
            r.total_orders,
            config.format_currency(r.total_sales_cents),
            config.format_currency(r.total_profit_cents)
        );
    }
    if reports.is_empty() {
        out.push_str("No saved reports\n");
    }
    out
}

pub fn config_view(view: &ConfigView) -> String {
    let c = &view.config;
    format!(
        "store:     {}\ncurrency:  {} ({})\ndatabase:  {}\ncheckout:  {}\nconfig:    {}\n",
        c.store_name,
        c.currency_code,
        c.currency_symbol,
        view.resolved_database_path,
        c.checkout_policy,
        view.default_config_file.as_deref().unwrap_or("-"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_formatting() {
        assert_eq!(margin(Some(4000)), "40.00%");
        assert_eq!(margin(Some(1234)), "12.34%");
        assert_eq!(margin(None), "-");
    }

    #[test]
    fn test_product_line_marks_low_stock() {
        let dto = ProductDto {
            id: "p1".to_string(),
            code: "OIL-1".to_string(),
            name: "Olive Oil".to_string(),
            purchase_price_cents: 6000,
            selling_price_cents: 10000,
            unit_profit_cents: 4000,
            quantity: 2,
            low_stock_threshold: 5,
            stock_status: StockStatus::Low,
            image_url: None,
        };
        let line = product(&AppConfig::default(), &dto);
        assert!(line.starts_with("OIL-1 Olive Oil | cost $60.00 | price $100.00"));
        assert!(line.trim_end().ends_with("LOW"));
    }
}

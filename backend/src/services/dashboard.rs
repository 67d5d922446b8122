//! Dashboard service: aggregate figures for the back office

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    DashboardSummary, InventoryBreakdown, LowStockItem, PaymentStatus, ReceivableCount,
    ReceivableStatus, RecentSale, TopSellingTool, LOW_STOCK_THRESHOLD, RECEIVER_CATEGORY,
};
use crate::services::{today, ReceivablesService};

const LOW_STOCK_LIMIT: i64 = 5;
const TOP_SELLING_LIMIT: i64 = 5;
const RECENT_SALES_LIMIT: i64 = 10;

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

impl DashboardService {
    /// Create a new DashboardService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Build the dashboard summary
    pub async fn summary(&self) -> AppResult<DashboardSummary> {
        let month_start = first_of_month(today());

        let total_tools = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tools")
            .fetch_one(&self.db)
            .await?;

        let total_staff =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'staff'")
                .fetch_one(&self.db)
                .await?;

        let active_customers =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers WHERE is_activated")
                .fetch_one(&self.db)
                .await?;

        let (total_sales, total_revenue) = sqlx::query_as::<_, (i64, Decimal)>(
            "SELECT COUNT(*), COALESCE(SUM(total_cost), 0) FROM sales",
        )
        .fetch_one(&self.db)
        .await?;

        let mtd_revenue = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(total_cost), 0) FROM sales WHERE date_sold >= $1",
        )
        .bind(month_start)
        .fetch_one(&self.db)
        .await?;

        let inventory_breakdown = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT name, COUNT(*)
            FROM tools
            WHERE category = $1
            GROUP BY name
            ORDER BY name
            "#,
        )
        .bind(RECEIVER_CATEGORY)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|(receiver_type, count)| InventoryBreakdown {
            receiver_type,
            count,
        })
        .collect();

        let low_stock_items = sqlx::query_as::<_, (Uuid, String, String, String, i32)>(
            r#"
            SELECT id, name, code, category, stock
            FROM tools
            WHERE stock <= $1
            ORDER BY stock, name
            LIMIT $2
            "#,
        )
        .bind(LOW_STOCK_THRESHOLD)
        .bind(LOW_STOCK_LIMIT)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|(id, name, code, category, stock)| LowStockItem {
            id,
            name,
            code,
            category,
            stock,
        })
        .collect();

        let top_selling_tools = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT t.name, COUNT(si.id) AS total_sold
            FROM sale_items si
            JOIN tools t ON t.id = si.tool_id
            GROUP BY t.name
            ORDER BY total_sold DESC, t.name
            LIMIT $1
            "#,
        )
        .bind(TOP_SELLING_LIMIT)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|(tool_name, total_sold)| TopSellingTool {
            tool_name,
            total_sold,
        })
        .collect();

        let recent_sales = sqlx::query_as::<_, (String, String, Decimal, PaymentStatus)>(
            r#"
            SELECT invoice_number, name, total_cost, payment_status
            FROM sales
            ORDER BY date_sold DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(RECENT_SALES_LIMIT)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(
            |(invoice_number, customer_name, total_cost, payment_status)| RecentSale {
                invoice_number,
                customer_name,
                total_cost,
                payment_status,
            },
        )
        .collect();

        let mut conn = self.db.acquire().await?;
        ReceivablesService::refresh_statuses(&mut conn, today()).await?;

        let receivables_by_status = sqlx::query_as::<_, (ReceivableStatus, i64)>(
            "SELECT status, COUNT(*) FROM customers GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|(status, count)| ReceivableCount { status, count })
        .collect();

        tracing::debug!(total_tools, total_sales, "Dashboard summary built");

        Ok(DashboardSummary {
            total_tools,
            total_staff,
            active_customers,
            total_sales,
            total_revenue,
            mtd_revenue,
            inventory_breakdown: InventoryBreakdown::or_placeholder(inventory_breakdown),
            low_stock_items,
            top_selling_tools,
            recent_sales,
            receivables_by_status,
        })
    }
}

/// First calendar day of the month containing `date`
fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_start() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 17).unwrap();
        assert_eq!(first_of_month(date), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
    }
}

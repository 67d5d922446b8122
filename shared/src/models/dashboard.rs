//! Dashboard summary payloads

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PaymentStatus, ReceivableStatus};

/// Category whose tools are broken down by model on the dashboard
pub const RECEIVER_CATEGORY: &str = "Receiver";

/// Stock level at or below which a tool is reported as low
pub const LOW_STOCK_THRESHOLD: i32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_tools: i64,
    pub total_staff: i64,
    pub active_customers: i64,
    pub total_sales: i64,
    pub total_revenue: Decimal,
    pub mtd_revenue: Decimal,
    pub inventory_breakdown: Vec<InventoryBreakdown>,
    pub low_stock_items: Vec<LowStockItem>,
    pub top_selling_tools: Vec<TopSellingTool>,
    pub recent_sales: Vec<RecentSale>,
    pub receivables_by_status: Vec<ReceivableCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryBreakdown {
    pub receiver_type: String,
    pub count: i64,
}

impl InventoryBreakdown {
    /// Breakdown rows, with a placeholder when no receivers are stocked
    pub fn or_placeholder(rows: Vec<InventoryBreakdown>) -> Vec<InventoryBreakdown> {
        if rows.is_empty() {
            vec![InventoryBreakdown {
                receiver_type: "No receiver tools".to_string(),
                count: 0,
            }]
        } else {
            rows
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub category: String,
    pub stock: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSellingTool {
    pub tool_name: String,
    pub total_sold: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSale {
    pub invoice_number: String,
    pub customer_name: String,
    pub total_cost: Decimal,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivableCount {
    pub status: ReceivableStatus,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_breakdown_gets_placeholder() {
        let rows = InventoryBreakdown::or_placeholder(Vec::new());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].receiver_type, "No receiver tools");
        assert_eq!(rows[0].count, 0);
    }
}

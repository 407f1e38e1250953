//! # Report Repository
//!
//! Read-only aggregations over completed sales and expenses. Everything
//! here folds cart snapshots in Rust rather than pushing JSON parsing into
//! SQL: the volumes of a single-shop deployment make a table scan per
//! report acceptable.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::expense::ExpenseRepository;
use crate::repository::sale::SaleRepository;
use caja_core::{Expense, Sale};

/// How many products the ranking keeps.
const TOP_PRODUCT_LIMIT: usize = 5;

/// Period profit-and-loss snapshot.
///
/// Carries the raw completed sales and expenses alongside the aggregates
/// so one round trip serves both the figures and the detail lists.
#[derive(Debug, Clone)]
pub struct MonthlySummary {
    /// Sum of completed-sale final amounts.
    pub revenue_cents: i64,
    /// Sum of purchase prices over every sold line item.
    pub cost_of_goods_cents: i64,
    /// `revenue - cost_of_goods`.
    pub gross_profit_cents: i64,
    /// Sum of applied taxes.
    pub tax_total_cents: i64,
    pub expense_total_cents: i64,
    /// `gross_profit - tax_total - expense_total`.
    pub net_profit_cents: i64,
    pub sales_count: i64,
    pub expenses_count: i64,
    /// Completed sales in the period, oldest first.
    pub sales: Vec<Sale>,
    /// Expenses in the period, newest first.
    pub expenses: Vec<Expense>,
    /// Best sellers by units sold, descending.
    pub top_products: Vec<TopProduct>,
}

/// One row of the best-seller ranking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub name: String,
    pub units_sold: i64,
    pub revenue_cents: i64,
}

/// Repository for read-only reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Computes the profit-and-loss summary for a period.
    ///
    /// Only completed sales count; pending sales have no final amount yet
    /// and canceled sales were reversed.
    pub async fn monthly_summary(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<MonthlySummary> {
        let sales = SaleRepository::new(self.pool.clone())
            .list_completed_in_range(start, end)
            .await?;
        let expenses = ExpenseRepository::new(self.pool.clone())
            .list_in_range(start, end)
            .await?;

        let expense_total_cents: i64 = expenses.iter().map(|e| e.amount_cents).sum();

        let mut revenue_cents = 0i64;
        let mut cost_of_goods_cents = 0i64;
        let mut tax_total_cents = 0i64;
        let mut ranking: BTreeMap<String, TopProduct> = BTreeMap::new();

        for sale in &sales {
            revenue_cents += sale.final_amount_cents;
            tax_total_cents += sale.applied_tax_cents;

            for item in &sale.items {
                cost_of_goods_cents += item.cost().cents();

                let entry = ranking
                    .entry(item.name.clone())
                    .or_insert_with(|| TopProduct {
                        name: item.name.clone(),
                        units_sold: 0,
                        revenue_cents: 0,
                    });
                entry.units_sold += item.quantity;
                entry.revenue_cents += item.line_total().cents();
            }
        }

        let mut top_products: Vec<TopProduct> = ranking.into_values().collect();
        top_products.sort_by(|a, b| b.units_sold.cmp(&a.units_sold));
        top_products.truncate(TOP_PRODUCT_LIMIT);

        let gross_profit_cents = revenue_cents - cost_of_goods_cents;
        let net_profit_cents = gross_profit_cents - tax_total_cents - expense_total_cents;

        debug!(
            sales = sales.len(),
            revenue = revenue_cents,
            net = net_profit_cents,
            "Period summary computed"
        );

        Ok(MonthlySummary {
            revenue_cents,
            cost_of_goods_cents,
            gross_profit_cents,
            tax_total_cents,
            expense_total_cents,
            net_profit_cents,
            sales_count: sales.len() as i64,
            expenses_count: expenses.len() as i64,
            sales,
            expenses,
            top_products,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::expense::NewExpense;
    use crate::repository::sale::NewSale;
    use caja_core::{Percent, SaleItem, SaleStatus};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn item(name: &str, quantity: i64, unit_cents: i64, purchase_cents: i64) -> SaleItem {
        SaleItem {
            product_id: None, // ad-hoc items keep the report test free of catalog setup
            name: name.to_string(),
            quantity,
            unit_price_cents: unit_cents,
            purchase_price_cents: purchase_cents,
        }
    }

    async fn complete_sale(db: &Database, items: Vec<SaleItem>, tax: Option<f64>) {
        let total: i64 = items.iter().map(|i| i.line_total().cents()).sum();
        let sale = db
            .sales()
            .create_pending(NewSale {
                items,
                subtotal_cents: total,
                discount: Percent::zero(),
                total_cents: total,
                payment_method: None,
            })
            .await
            .unwrap();

        db.sales()
            .complete(&sale.id, "efectivo", Percent::zero())
            .await
            .unwrap();

        if let Some(pct) = tax {
            db.sales()
                .apply_tax(&sale.id, Percent::from_f64(pct))
                .await
                .unwrap();
        }
    }

    fn wide_range() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc::now() - chrono::Duration::days(1),
            Utc::now() + chrono::Duration::days(1),
        )
    }

    #[tokio::test]
    async fn test_summary_folds_sales_expenses_and_tax() {
        let db = setup().await;

        // Sale 1: 2 × 10000 revenue, 2 × 6000 cost, 10% tax on 20000 = 2000
        complete_sale(&db, vec![item("Yerba", 2, 10000, 6000)], Some(10.0)).await;
        // Sale 2: 1 × 5000 revenue, 1 × 2000 cost, no tax
        complete_sale(&db, vec![item("Azúcar", 1, 5000, 2000)], None).await;

        db.expenses()
            .create(NewExpense {
                account_id: None,
                category_id: None,
                description: "Alquiler".to_string(),
                amount_cents: 3000,
            })
            .await
            .unwrap();

        let (start, end) = wide_range();
        let summary = db.reports().monthly_summary(start, end).await.unwrap();

        assert_eq!(summary.revenue_cents, 25000);
        assert_eq!(summary.cost_of_goods_cents, 14000);
        assert_eq!(summary.gross_profit_cents, 11000);
        assert_eq!(summary.tax_total_cents, 2000);
        assert_eq!(summary.expense_total_cents, 3000);
        assert_eq!(summary.net_profit_cents, 6000);
        assert_eq!(summary.sales_count, 2);
        assert_eq!(summary.expenses_count, 1);

        // The raw rows ride along with the aggregates.
        assert_eq!(summary.sales.len(), 2);
        assert!(summary.sales.iter().all(|s| s.status == SaleStatus::Completed));
        assert_eq!(summary.expenses.len(), 1);
        assert_eq!(summary.expenses[0].description, "Alquiler");
        assert_eq!(summary.expenses[0].amount_cents, 3000);
    }

    #[tokio::test]
    async fn test_top_products_ranked_by_units() {
        let db = setup().await;

        complete_sale(&db, vec![item("Yerba", 3, 10000, 6000)], None).await;
        complete_sale(
            &db,
            vec![item("Yerba", 2, 10000, 6000), item("Azúcar", 4, 5000, 2000)],
            None,
        )
        .await;

        let (start, end) = wide_range();
        let summary = db.reports().monthly_summary(start, end).await.unwrap();

        assert_eq!(summary.top_products.len(), 2);
        assert_eq!(summary.top_products[0].name, "Yerba");
        assert_eq!(summary.top_products[0].units_sold, 5);
        assert_eq!(summary.top_products[0].revenue_cents, 50000);
        assert_eq!(summary.top_products[1].name, "Azúcar");
        assert_eq!(summary.top_products[1].units_sold, 4);
    }

    #[tokio::test]
    async fn test_pending_and_canceled_sales_are_excluded() {
        let db = setup().await;

        // Pending: never completed.
        db.sales()
            .create_pending(NewSale {
                items: vec![item("Yerba", 1, 10000, 6000)],
                subtotal_cents: 10000,
                discount: Percent::zero(),
                total_cents: 10000,
                payment_method: None,
            })
            .await
            .unwrap();

        // Completed then canceled.
        let sale = db
            .sales()
            .create_pending(NewSale {
                items: vec![item("Azúcar", 1, 5000, 2000)],
                subtotal_cents: 5000,
                discount: Percent::zero(),
                total_cents: 5000,
                payment_method: None,
            })
            .await
            .unwrap();
        db.sales()
            .complete(&sale.id, "efectivo", Percent::zero())
            .await
            .unwrap();
        db.sales().cancel(&sale.id, "devolución").await.unwrap();

        let (start, end) = wide_range();
        let summary = db.reports().monthly_summary(start, end).await.unwrap();

        assert_eq!(summary.revenue_cents, 0);
        assert_eq!(summary.sales_count, 0);
        assert!(summary.sales.is_empty());
        assert!(summary.top_products.is_empty());
    }
}

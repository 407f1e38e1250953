//! # Sale Repository
//!
//! The sale lifecycle manager: the only component with multi-step
//! invariants.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE PENDING                                                      │
//! │     └── create_pending(cart) → Sale { status: Pending }                 │
//! │         (cart snapshot stored as JSON, stock untouched)                 │
//! │                                                                         │
//! │  2. COMPLETE                                   ── one transaction ──    │
//! │     └── complete(id, method, discount)                                  │
//! │         ├── conditional stock decrement per real-product line           │
//! │         │   (0 rows affected on any line aborts the whole thing)        │
//! │         └── status → Completed, final_amount stored, date stamped       │
//! │                                                                         │
//! │  3. (OPTIONAL) CANCEL                          ── one transaction ──    │
//! │     └── cancel(id, reason)                                              │
//! │         ├── status → Canceled, reason stored                            │
//! │         ├── unconditional stock restore per real-product line           │
//! │         └── one reversing withdrawal movement for final_amount          │
//! │                                                                         │
//! │  Pending and completed sales may also be hard-deleted (correction       │
//! │  tool - no stock or ledger effect). Canceled is terminal except delete. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why the conditional UPDATE
//! `UPDATE products SET quantity = quantity - ? WHERE id = ? AND
//! quantity >= ?` re-checks the stock condition inside the transaction, so
//! two concurrent completions against the same product cannot both pass a
//! stale read. The affected-row count IS the insufficient-stock check.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use caja_core::{Money, MovementKind, Percent, Sale, SaleItem, SaleStatus};

/// Input for creating a pending sale from a cart snapshot.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub items: Vec<SaleItem>,
    pub subtotal_cents: i64,
    pub discount: Percent,
    pub total_cents: i64,
    pub payment_method: Option<String>,
}

/// Internal row shape; `items` stays serialized until conversion.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    date: DateTime<Utc>,
    items: String,
    subtotal_cents: i64,
    discount_bps: i64,
    total_cents: i64,
    status: SaleStatus,
    payment_method: Option<String>,
    final_discount_bps: i64,
    final_amount_cents: i64,
    applied_tax_cents: i64,
    cancellation_reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<SaleRow> for Sale {
    type Error = DbError;

    fn try_from(row: SaleRow) -> DbResult<Sale> {
        Ok(Sale {
            id: row.id,
            date: row.date,
            items: serde_json::from_str(&row.items)?,
            subtotal_cents: row.subtotal_cents,
            discount_bps: row.discount_bps as u32,
            total_cents: row.total_cents,
            status: row.status,
            payment_method: row.payment_method,
            final_discount_bps: row.final_discount_bps as u32,
            final_amount_cents: row.final_amount_cents,
            applied_tax_cents: row.applied_tax_cents,
            cancellation_reason: row.cancellation_reason,
            created_at: row.created_at,
        })
    }
}

const SALE_COLUMNS: &str = "id, date, items, subtotal_cents, discount_bps, total_cents, \
     status, payment_method, final_discount_bps, final_amount_cents, \
     applied_tax_cents, cancellation_reason, created_at";

/// Repository enforcing the pending → completed → canceled state machine.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Creates a pending sale from a cart snapshot.
    ///
    /// Items are serialized as given; stock is NOT affected. Cart
    /// validation (non-empty, quantity bounds) happens in caja-core
    /// before this is called.
    pub async fn create_pending(&self, new_sale: NewSale) -> DbResult<Sale> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let items_json = serde_json::to_string(&new_sale.items)?;

        debug!(id = %id, items = new_sale.items.len(), "Creating pending sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, date, items, subtotal_cents, discount_bps, total_cents,
                status, payment_method, final_discount_bps, final_amount_cents,
                applied_tax_cents, cancellation_reason, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending', ?7, 0, 0, 0, NULL, ?2)
            "#,
        )
        .bind(&id)
        .bind(now)
        .bind(&items_json)
        .bind(new_sale.subtotal_cents)
        .bind(new_sale.discount.bps() as i64)
        .bind(new_sale.total_cents)
        .bind(&new_sale.payment_method)
        .execute(&self.pool)
        .await?;

        Ok(Sale {
            id,
            date: now,
            items: new_sale.items,
            subtotal_cents: new_sale.subtotal_cents,
            discount_bps: new_sale.discount.bps(),
            total_cents: new_sale.total_cents,
            status: SaleStatus::Pending,
            payment_method: new_sale.payment_method,
            final_discount_bps: 0,
            final_amount_cents: 0,
            applied_tax_cents: 0,
            cancellation_reason: None,
            created_at: now,
        })
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let row: Option<SaleRow> =
            sqlx::query_as(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Sale::try_from).transpose()
    }

    /// Lists pending sales, newest first.
    pub async fn list_pending(&self) -> DbResult<Vec<Sale>> {
        let rows: Vec<SaleRow> = sqlx::query_as(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE status = 'pending' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Sale::try_from).collect()
    }

    /// Lists the sale history (completed and canceled), newest first.
    pub async fn list_history(&self) -> DbResult<Vec<Sale>> {
        let rows: Vec<SaleRow> = sqlx::query_as(&format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE status IN ('completed', 'canceled') ORDER BY date DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Sale::try_from).collect()
    }

    /// Lists completed sales within a date range (for ledger/report folds).
    pub async fn list_completed_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Sale>> {
        let rows: Vec<SaleRow> = sqlx::query_as(&format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE status = 'completed' AND date >= ?1 AND date <= ?2 ORDER BY date"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Sale::try_from).collect()
    }

    /// Completes a pending sale.
    ///
    /// Inside one transaction:
    /// 1. Decrement stock per real-product line, conditionally
    ///    (`quantity >= requested`); any line matching zero rows aborts
    ///    with [`DbError::InsufficientStock`] naming the product, and
    ///    every prior decrement rolls back.
    /// 2. Set status to completed, store the payment method and final
    ///    discount, compute `final_amount = total × (1 − pct/100)`, and
    ///    stamp the sale date to the completion time.
    pub async fn complete(
        &self,
        sale_id: &str,
        payment_method: &str,
        final_discount: Percent,
    ) -> DbResult<Sale> {
        debug!(sale_id = %sale_id, method = %payment_method, "Completing sale");

        let mut tx = self.pool.begin().await?;

        let row: Option<SaleRow> =
            sqlx::query_as(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"))
                .bind(sale_id)
                .fetch_optional(&mut *tx)
                .await?;

        let sale = match row {
            Some(row) => Sale::try_from(row)?,
            None => return Err(DbError::not_found("Sale", sale_id)),
        };

        if sale.status != SaleStatus::Pending {
            return Err(DbError::not_found("Sale (pending)", sale_id));
        }

        let now = Utc::now();

        // Ad-hoc items (product_id = NULL) never touch stock.
        for item in sale.items.iter().filter(|i| i.product_id.is_some()) {
            let product_id = item.product_id.as_deref().unwrap_or_default();

            let result = sqlx::query(
                "UPDATE products SET quantity = quantity - ?2, updated_at = ?3 \
                 WHERE id = ?1 AND quantity >= ?2",
            )
            .bind(product_id)
            .bind(item.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Missing product reads as zero stock.
                let available: i64 =
                    sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
                        .bind(product_id)
                        .fetch_optional(&mut *tx)
                        .await?
                        .unwrap_or(0);

                // Early return drops `tx`: every decrement so far rolls back.
                return Err(DbError::InsufficientStock {
                    name: item.name.clone(),
                    available,
                    requested: item.quantity,
                });
            }
        }

        let final_amount = Money::from_cents(sale.total_cents).apply_discount(final_discount);

        let result = sqlx::query(
            "UPDATE sales SET status = 'completed', payment_method = ?2, \
             final_discount_bps = ?3, final_amount_cents = ?4, date = ?5 \
             WHERE id = ?1 AND status = 'pending'",
        )
        .bind(sale_id)
        .bind(payment_method)
        .bind(final_discount.bps() as i64)
        .bind(final_amount.cents())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale (pending)", sale_id));
        }

        tx.commit().await?;

        info!(sale_id = %sale_id, final_amount = %final_amount, "Sale completed");

        Ok(Sale {
            date: now,
            status: SaleStatus::Completed,
            payment_method: Some(payment_method.to_string()),
            final_discount_bps: final_discount.bps(),
            final_amount_cents: final_amount.cents(),
            ..sale
        })
    }

    /// Cancels a completed sale.
    ///
    /// Inside one transaction, all three or none:
    /// 1. Status → canceled, reason stored.
    /// 2. Stock restored for every real-product line. The increment is
    ///    unconditional - no upper-bound check, intentionally.
    /// 3. Exactly one reversing withdrawal movement for the sale's final
    ///    amount, on the consolidated ledger (account_id NULL).
    ///
    /// Reason validation (non-empty) happens in caja-core before this is
    /// called.
    pub async fn cancel(&self, sale_id: &str, reason: &str) -> DbResult<Sale> {
        debug!(sale_id = %sale_id, "Canceling sale");

        let mut tx = self.pool.begin().await?;

        let row: Option<SaleRow> =
            sqlx::query_as(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"))
                .bind(sale_id)
                .fetch_optional(&mut *tx)
                .await?;

        let sale = match row {
            Some(row) => Sale::try_from(row)?,
            None => return Err(DbError::not_found("Sale", sale_id)),
        };

        if sale.status != SaleStatus::Completed {
            return Err(DbError::not_found("Sale (completed)", sale_id));
        }

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE sales SET status = 'canceled', cancellation_reason = ?2 \
             WHERE id = ?1 AND status = 'completed'",
        )
        .bind(sale_id)
        .bind(reason)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale (completed)", sale_id));
        }

        for item in sale.items.iter().filter(|i| i.product_id.is_some()) {
            sqlx::query(
                "UPDATE products SET quantity = quantity + ?2, updated_at = ?3 WHERE id = ?1",
            )
            .bind(item.product_id.as_deref().unwrap_or_default())
            .bind(item.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "INSERT INTO account_movements (id, account_id, category_id, date, kind, amount_cents, reason) \
             VALUES (?1, NULL, NULL, ?2, ?3, ?4, ?5)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(now)
        .bind(MovementKind::Withdrawal)
        .bind(sale.final_amount_cents)
        .bind(format!("Sale {} canceled: {}", sale_id, reason))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(sale_id = %sale_id, amount = sale.final_amount_cents, "Sale canceled, stock restored");

        Ok(Sale {
            status: SaleStatus::Canceled,
            cancellation_reason: Some(reason.to_string()),
            ..sale
        })
    }

    /// Edits a completed sale's final amount and payment method.
    ///
    /// No stock or ledger side effects.
    pub async fn edit_completed(
        &self,
        sale_id: &str,
        final_amount_cents: i64,
        payment_method: &str,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE sales SET final_amount_cents = ?2, payment_method = ?3 \
             WHERE id = ?1 AND status = 'completed'",
        )
        .bind(sale_id)
        .bind(final_amount_cents)
        .bind(payment_method)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale (completed)", sale_id));
        }

        info!(sale_id = %sale_id, final_amount_cents, "Completed sale edited");
        Ok(())
    }

    /// Applies a tax percentage to a sale.
    ///
    /// Sets `applied_tax = final_amount × pct/100` and nothing else:
    /// status, final amount and stock are untouched. Returns the applied
    /// tax in cents.
    pub async fn apply_tax(&self, sale_id: &str, tax: Percent) -> DbResult<i64> {
        let mut tx = self.pool.begin().await?;

        let final_amount_cents: Option<i64> =
            sqlx::query_scalar("SELECT final_amount_cents FROM sales WHERE id = ?1")
                .bind(sale_id)
                .fetch_optional(&mut *tx)
                .await?;

        let final_amount_cents = match final_amount_cents {
            Some(cents) => cents,
            None => return Err(DbError::not_found("Sale", sale_id)),
        };

        let applied_tax = Money::from_cents(final_amount_cents).percent_of(tax);

        sqlx::query("UPDATE sales SET applied_tax_cents = ?2 WHERE id = ?1")
            .bind(sale_id)
            .bind(applied_tax.cents())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(sale_id = %sale_id, tax_bps = tax.bps(), applied = applied_tax.cents(), "Tax applied");
        Ok(applied_tax.cents())
    }

    /// Hard-deletes a pending sale. Returns the number of rows removed
    /// (0 when no pending sale matched - reported, not an error).
    pub async fn delete_pending(&self, sale_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM sales WHERE id = ?1 AND status = 'pending'")
            .bind(sale_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Hard-deletes a sale from history (completed or canceled).
    ///
    /// Deletion is a correction tool, not a business event: no stock or
    /// ledger effects. Returns the number of rows removed.
    pub async fn delete_history(&self, sale_id: &str) -> DbResult<u64> {
        let result = sqlx::query(
            "DELETE FROM sales WHERE id = ?1 AND status IN ('completed', 'canceled')",
        )
        .bind(sale_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::NewProduct;
    use caja_core::MovementKind;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, name: &str, quantity: i64, purchase_cents: i64) -> String {
        db.products()
            .create(NewProduct {
                code: None,
                name: name.to_string(),
                kind: "general".to_string(),
                brand: None,
                subkind: None,
                quantity,
                purchase_price_cents: purchase_cents,
                sale_prices: vec![],
                low_stock_threshold: 0,
            })
            .await
            .unwrap()
            .id
    }

    fn cart_item(product_id: &str, qty: i64, unit_cents: i64, purchase_cents: i64) -> SaleItem {
        SaleItem {
            product_id: Some(product_id.to_string()),
            name: "Test item".to_string(),
            quantity: qty,
            unit_price_cents: unit_cents,
            purchase_price_cents: purchase_cents,
        }
    }

    async fn create_pending(db: &Database, items: Vec<SaleItem>, total_cents: i64) -> Sale {
        db.sales()
            .create_pending(NewSale {
                subtotal_cents: total_cents,
                discount: Percent::zero(),
                total_cents,
                payment_method: None,
                items,
            })
            .await
            .unwrap()
    }

    async fn stock_of(db: &Database, product_id: &str) -> i64 {
        sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_pending_does_not_touch_stock() {
        let db = setup().await;
        let pid = seed_product(&db, "Yerba", 5, 6000).await;

        let sale = create_pending(&db, vec![cart_item(&pid, 2, 10000, 6000)], 20000).await;

        assert_eq!(sale.status, SaleStatus::Pending);
        assert_eq!(stock_of(&db, &pid).await, 5);
    }

    #[tokio::test]
    async fn test_complete_decrements_stock_and_computes_final_amount() {
        // Spec scenario: stock 5, qty 2 @ $100.00, 10% discount
        let db = setup().await;
        let pid = seed_product(&db, "Yerba", 5, 6000).await;
        let sale = create_pending(&db, vec![cart_item(&pid, 2, 10000, 6000)], 20000).await;

        let completed = db
            .sales()
            .complete(&sale.id, "efectivo", Percent::from_f64(10.0))
            .await
            .unwrap();

        assert_eq!(completed.status, SaleStatus::Completed);
        assert_eq!(completed.final_amount_cents, 18000);
        assert_eq!(stock_of(&db, &pid).await, 3);
    }

    #[tokio::test]
    async fn test_complete_insufficient_stock_rolls_back_everything() {
        // Two-line sale: first line has stock, second does not. The first
        // line's decrement must not survive.
        let db = setup().await;
        let pid_ok = seed_product(&db, "Yerba", 10, 6000).await;
        let pid_short = seed_product(&db, "Azúcar", 1, 2000).await;

        let sale = create_pending(
            &db,
            vec![
                cart_item(&pid_ok, 3, 10000, 6000),
                cart_item(&pid_short, 2, 5000, 2000),
            ],
            40000,
        )
        .await;

        let err = db
            .sales()
            .complete(&sale.id, "efectivo", Percent::zero())
            .await
            .unwrap_err();

        match err {
            DbError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 1);
                assert_eq!(requested, 2);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // Atomicity: all quantities and the sale unchanged.
        assert_eq!(stock_of(&db, &pid_ok).await, 10);
        assert_eq!(stock_of(&db, &pid_short).await, 1);
        let sale = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Pending);
    }

    #[tokio::test]
    async fn test_complete_requires_pending_status() {
        let db = setup().await;
        let pid = seed_product(&db, "Yerba", 5, 6000).await;
        let sale = create_pending(&db, vec![cart_item(&pid, 1, 10000, 6000)], 10000).await;

        db.sales()
            .complete(&sale.id, "efectivo", Percent::zero())
            .await
            .unwrap();

        // Completing twice must fail and leave stock alone.
        let err = db
            .sales()
            .complete(&sale.id, "efectivo", Percent::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(stock_of(&db, &pid).await, 4);
    }

    #[tokio::test]
    async fn test_cancel_restores_stock_and_records_movement() {
        // Spec scenario: complete then cancel("cliente se arrepintió")
        let db = setup().await;
        let pid = seed_product(&db, "Yerba", 5, 6000).await;
        let sale = create_pending(&db, vec![cart_item(&pid, 2, 10000, 6000)], 20000).await;

        db.sales()
            .complete(&sale.id, "efectivo", Percent::from_f64(10.0))
            .await
            .unwrap();

        let canceled = db
            .sales()
            .cancel(&sale.id, "cliente se arrepintió")
            .await
            .unwrap();

        assert_eq!(canceled.status, SaleStatus::Canceled);
        assert_eq!(
            canceled.cancellation_reason.as_deref(),
            Some("cliente se arrepintió")
        );
        assert_eq!(stock_of(&db, &pid).await, 5);

        // Exactly one reversing withdrawal equal to the final amount.
        let movements = db
            .accounts()
            .list_movements(None)
            .await
            .unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].kind, MovementKind::Withdrawal);
        assert_eq!(movements[0].amount_cents, 18000);
    }

    #[tokio::test]
    async fn test_cancel_requires_completed_status() {
        let db = setup().await;
        let pid = seed_product(&db, "Yerba", 5, 6000).await;
        let sale = create_pending(&db, vec![cart_item(&pid, 2, 10000, 6000)], 20000).await;

        let err = db.sales().cancel(&sale.id, "typo").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = db.sales().cancel("missing-id", "typo").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_cancel_restore_is_unconditional() {
        // Stock may exceed its historical level after a restock between
        // completion and cancellation; no cap is applied.
        let db = setup().await;
        let pid = seed_product(&db, "Yerba", 5, 6000).await;
        let sale = create_pending(&db, vec![cart_item(&pid, 2, 10000, 6000)], 20000).await;

        db.sales()
            .complete(&sale.id, "efectivo", Percent::zero())
            .await
            .unwrap();
        db.products().restock(&pid, 10, 6000).await.unwrap();
        db.sales().cancel(&sale.id, "devolución").await.unwrap();

        assert_eq!(stock_of(&db, &pid).await, 15);
    }

    #[tokio::test]
    async fn test_apply_tax_changes_only_applied_tax() {
        // Spec scenario: 21% on final amount $180.00 → $37.80
        let db = setup().await;
        let pid = seed_product(&db, "Yerba", 5, 6000).await;
        let sale = create_pending(&db, vec![cart_item(&pid, 2, 10000, 6000)], 20000).await;

        db.sales()
            .complete(&sale.id, "efectivo", Percent::from_f64(10.0))
            .await
            .unwrap();

        let applied = db
            .sales()
            .apply_tax(&sale.id, Percent::from_f64(21.0))
            .await
            .unwrap();
        assert_eq!(applied, 3780);

        let sale = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(sale.applied_tax_cents, 3780);
        assert_eq!(sale.final_amount_cents, 18000);
        assert_eq!(sale.status, SaleStatus::Completed);
        assert_eq!(stock_of(&db, &pid).await, 3);
    }

    #[tokio::test]
    async fn test_edit_completed_has_no_stock_effect() {
        let db = setup().await;
        let pid = seed_product(&db, "Yerba", 5, 6000).await;
        let sale = create_pending(&db, vec![cart_item(&pid, 2, 10000, 6000)], 20000).await;

        db.sales()
            .complete(&sale.id, "efectivo", Percent::zero())
            .await
            .unwrap();

        db.sales()
            .edit_completed(&sale.id, 19000, "transferencia")
            .await
            .unwrap();

        let sale = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(sale.final_amount_cents, 19000);
        assert_eq!(sale.payment_method.as_deref(), Some("transferencia"));
        assert_eq!(stock_of(&db, &pid).await, 3);
    }

    #[tokio::test]
    async fn test_scoped_deletes() {
        let db = setup().await;
        let pid = seed_product(&db, "Yerba", 5, 6000).await;

        let pending = create_pending(&db, vec![cart_item(&pid, 1, 10000, 6000)], 10000).await;
        let completed = create_pending(&db, vec![cart_item(&pid, 1, 10000, 6000)], 10000).await;
        db.sales()
            .complete(&completed.id, "efectivo", Percent::zero())
            .await
            .unwrap();

        // Wrong-scope deletes match zero rows.
        assert_eq!(db.sales().delete_history(&pending.id).await.unwrap(), 0);
        assert_eq!(db.sales().delete_pending(&completed.id).await.unwrap(), 0);

        assert_eq!(db.sales().delete_pending(&pending.id).await.unwrap(), 1);
        assert_eq!(db.sales().delete_history(&completed.id).await.unwrap(), 1);

        // Deletion is a correction tool: stock stays where completion left it.
        assert_eq!(stock_of(&db, &pid).await, 4);
    }

    #[tokio::test]
    async fn test_ad_hoc_items_never_touch_stock() {
        let db = setup().await;
        let sale = create_pending(
            &db,
            vec![SaleItem {
                product_id: None,
                name: "Flete".to_string(),
                quantity: 1,
                unit_price_cents: 5000,
                purchase_price_cents: 0,
            }],
            5000,
        )
        .await;

        let completed = db
            .sales()
            .complete(&sale.id, "efectivo", Percent::zero())
            .await
            .unwrap();
        assert_eq!(completed.final_amount_cents, 5000);

        db.sales().cancel(&sale.id, "cambio de idea").await.unwrap();
    }
}

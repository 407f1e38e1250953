//! # Account Repository
//!
//! The money ledger: accounts, manual deposits/withdrawals, cash closings
//! and the period summary.
//!
//! ## Ledger Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  accounts            drawer / wallet / bank, each with an opening       │
//! │                      balance                                            │
//! │  account_movements   deposits and withdrawals; account_id NULL means    │
//! │                      the consolidated ledger (sale cancellations land   │
//! │                      there)                                             │
//! │  cash_closings       expected-vs-counted snapshots; each closing        │
//! │                      becomes the baseline for the next                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::sale::SaleRepository;
use caja_core::{Account, AccountKind, AccountMovement, CashClosing, MovementKind, Sale};

/// Input for recording a deposit or withdrawal.
#[derive(Debug, Clone)]
pub struct NewMovement {
    /// `None` targets the consolidated ledger.
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub kind: MovementKind,
    pub amount_cents: i64,
    pub reason: String,
}

/// Income/outcome totals for a period.
///
/// Scoping to one account changes what income means, not just which rows
/// count: sales carry no account reference, so a filtered summary covers
/// only that account's movements and expenses, with `by_payment_method`
/// empty. Only the consolidated summary includes completed-sale income.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    /// Completed-sale income plus deposits (consolidated); deposits only
    /// when scoped to an account.
    pub total_income_cents: i64,
    /// Expenses plus withdrawals.
    pub total_outcome_cents: i64,
    /// `total_income - total_outcome`.
    pub period_result_cents: i64,
    pub by_payment_method: Vec<PaymentMethodBreakdown>,
}

/// Per-payment-method slice of the period's completed sales.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodBreakdown {
    pub payment_method: String,
    pub sales_count: i64,
    /// Sum of final amounts.
    pub total_cents: i64,
    /// Final amounts minus cost of goods minus applied tax.
    pub net_profit_cents: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct MovementRow {
    id: String,
    account_id: Option<String>,
    category_id: Option<String>,
    date: DateTime<Utc>,
    kind: MovementKind,
    amount_cents: i64,
    reason: String,
}

impl From<MovementRow> for AccountMovement {
    fn from(row: MovementRow) -> AccountMovement {
        AccountMovement {
            id: row.id,
            account_id: row.account_id,
            category_id: row.category_id,
            date: row.date,
            kind: row.kind,
            amount_cents: row.amount_cents,
            reason: row.reason,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: String,
    name: String,
    kind: AccountKind,
    initial_balance_cents: i64,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Account {
        Account {
            id: row.id,
            name: row.name,
            kind: row.kind,
            initial_balance_cents: row.initial_balance_cents,
            created_at: row.created_at,
        }
    }
}

const MOVEMENT_COLUMNS: &str = "id, account_id, category_id, date, kind, amount_cents, reason";

/// Repository for accounts, ledger movements and cash closings.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Creates a new AccountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Creates an account. Names are unique.
    pub async fn create(
        &self,
        name: &str,
        kind: AccountKind,
        initial_balance_cents: i64,
    ) -> DbResult<Account> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO accounts (id, name, kind, initial_balance_cents, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&id)
        .bind(name)
        .bind(kind)
        .bind(initial_balance_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(id = %id, name = %name, "Account created");

        Ok(Account {
            id,
            name: name.to_string(),
            kind,
            initial_balance_cents,
            created_at: now,
        })
    }

    /// Lists all accounts, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Account>> {
        let rows: Vec<AccountRow> = sqlx::query_as(
            "SELECT id, name, kind, initial_balance_cents, created_at \
             FROM accounts ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Account::from).collect())
    }

    /// Gets an account by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, name, kind, initial_balance_cents, created_at \
             FROM accounts WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    /// Deletes an account. Its movements, closings and expenses cascade.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", id));
        }

        info!(id = %id, "Account deleted");
        Ok(())
    }

    // =========================================================================
    // Movements
    // =========================================================================

    /// Records a deposit or withdrawal.
    ///
    /// Amount validation (strictly positive) happens in caja-core before
    /// this is called.
    pub async fn add_movement(&self, new_movement: NewMovement) -> DbResult<AccountMovement> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(&format!(
            "INSERT INTO account_movements ({MOVEMENT_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
        ))
        .bind(&id)
        .bind(&new_movement.account_id)
        .bind(&new_movement.category_id)
        .bind(now)
        .bind(new_movement.kind)
        .bind(new_movement.amount_cents)
        .bind(&new_movement.reason)
        .execute(&self.pool)
        .await?;

        debug!(id = %id, kind = ?new_movement.kind, amount = new_movement.amount_cents, "Movement recorded");

        Ok(AccountMovement {
            id,
            account_id: new_movement.account_id,
            category_id: new_movement.category_id,
            date: now,
            kind: new_movement.kind,
            amount_cents: new_movement.amount_cents,
            reason: new_movement.reason,
        })
    }

    /// Lists movements, newest first. `account_id = None` lists every
    /// movement including the consolidated (NULL-account) ones.
    pub async fn list_movements(&self, account_id: Option<&str>) -> DbResult<Vec<AccountMovement>> {
        let rows: Vec<MovementRow> = match account_id {
            Some(account_id) => {
                sqlx::query_as(&format!(
                    "SELECT {MOVEMENT_COLUMNS} FROM account_movements \
                     WHERE account_id = ?1 ORDER BY date DESC"
                ))
                .bind(account_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {MOVEMENT_COLUMNS} FROM account_movements ORDER BY date DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(AccountMovement::from).collect())
    }

    /// Updates a movement's amount, kind, category and reason.
    pub async fn update_movement(&self, id: &str, update: NewMovement) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE account_movements SET account_id = ?2, category_id = ?3, \
             kind = ?4, amount_cents = ?5, reason = ?6 WHERE id = ?1",
        )
        .bind(id)
        .bind(&update.account_id)
        .bind(&update.category_id)
        .bind(update.kind)
        .bind(update.amount_cents)
        .bind(&update.reason)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Movement", id));
        }
        Ok(())
    }

    /// Deletes a movement.
    pub async fn delete_movement(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM account_movements WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Movement", id));
        }
        Ok(())
    }

    // =========================================================================
    // Summary
    // =========================================================================

    /// Computes the income/outcome summary for a period.
    ///
    /// Consolidated (`account_id = None`): income is completed-sale final
    /// amounts plus every deposit; outcome is every expense plus every
    /// withdrawal; the breakdown slices the period's completed sales by
    /// payment method.
    ///
    /// Filtered to one account: only that account's movements and expenses
    /// count, and the sale breakdown is omitted (sales are not tied to an
    /// account).
    pub async fn summary(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        account_id: Option<&str>,
    ) -> DbResult<AccountSummary> {
        let (deposits, withdrawals) = self.movement_totals(start, end, account_id).await?;
        let expense_total = self.expense_total(start, end, account_id).await?;

        let (sale_income, by_payment_method) = match account_id {
            Some(_) => (0, Vec::new()),
            None => {
                let sales = SaleRepository::new(self.pool.clone())
                    .list_completed_in_range(start, end)
                    .await?;
                let income: i64 = sales.iter().map(|s| s.final_amount_cents).sum();
                (income, breakdown_by_method(&sales))
            }
        };

        let total_income_cents = sale_income + deposits;
        let total_outcome_cents = expense_total + withdrawals;

        Ok(AccountSummary {
            total_income_cents,
            total_outcome_cents,
            period_result_cents: total_income_cents - total_outcome_cents,
            by_payment_method,
        })
    }

    async fn movement_totals(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        account_id: Option<&str>,
    ) -> DbResult<(i64, i64)> {
        let sql = match account_id {
            Some(_) => {
                "SELECT \
                 COALESCE(SUM(CASE WHEN kind = 'deposit' THEN amount_cents END), 0), \
                 COALESCE(SUM(CASE WHEN kind = 'withdrawal' THEN amount_cents END), 0) \
                 FROM account_movements WHERE date >= ?1 AND date <= ?2 AND account_id = ?3"
            }
            None => {
                "SELECT \
                 COALESCE(SUM(CASE WHEN kind = 'deposit' THEN amount_cents END), 0), \
                 COALESCE(SUM(CASE WHEN kind = 'withdrawal' THEN amount_cents END), 0) \
                 FROM account_movements WHERE date >= ?1 AND date <= ?2"
            }
        };

        let mut query = sqlx::query_as::<_, (i64, i64)>(sql).bind(start).bind(end);
        if let Some(account_id) = account_id {
            query = query.bind(account_id);
        }
        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn expense_total(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        account_id: Option<&str>,
    ) -> DbResult<i64> {
        let sql = match account_id {
            Some(_) => {
                "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses \
                 WHERE date >= ?1 AND date <= ?2 AND account_id = ?3"
            }
            None => {
                "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses \
                 WHERE date >= ?1 AND date <= ?2"
            }
        };

        let mut query = sqlx::query_scalar::<_, i64>(sql).bind(start).bind(end);
        if let Some(account_id) = account_id {
            query = query.bind(account_id);
        }
        Ok(query.fetch_one(&self.pool).await?)
    }

    // =========================================================================
    // Cash closings
    // =========================================================================

    /// Records a cash closing for an account.
    ///
    /// Expected balance = baseline + deposits − withdrawals − expenses on
    /// the account since the previous closing, plus completed cash
    /// ("efectivo") sales for cash accounts. The baseline is the previous
    /// closing's counted amount, or the account's opening balance for the
    /// first closing. `difference = counted − expected`, stored verbatim.
    pub async fn cash_closing(&self, account_id: &str, counted_cents: i64) -> DbResult<CashClosing> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let account: Option<AccountRow> = sqlx::query_as(
            "SELECT id, name, kind, initial_balance_cents, created_at \
             FROM accounts WHERE id = ?1",
        )
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await?;

        let account = match account {
            Some(row) => Account::from(row),
            None => return Err(DbError::not_found("Account", account_id)),
        };

        let last: Option<(DateTime<Utc>, i64)> = sqlx::query_as(
            "SELECT date, counted_cents FROM cash_closings \
             WHERE account_id = ?1 ORDER BY date DESC LIMIT 1",
        )
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (since, baseline) = match last {
            Some((date, counted)) => (date, counted),
            None => (account.created_at, account.initial_balance_cents),
        };

        let (deposits, withdrawals): (i64, i64) = sqlx::query_as(
            "SELECT \
             COALESCE(SUM(CASE WHEN kind = 'deposit' THEN amount_cents END), 0), \
             COALESCE(SUM(CASE WHEN kind = 'withdrawal' THEN amount_cents END), 0) \
             FROM account_movements WHERE account_id = ?1 AND date > ?2 AND date <= ?3",
        )
        .bind(account_id)
        .bind(since)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let expenses: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses \
             WHERE account_id = ?1 AND date > ?2 AND date <= ?3",
        )
        .bind(account_id)
        .bind(since)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let cash_sales: i64 = if account.kind == AccountKind::Cash {
            sqlx::query_scalar(
                "SELECT COALESCE(SUM(final_amount_cents), 0) FROM sales \
                 WHERE status = 'completed' AND LOWER(payment_method) = 'efectivo' \
                 AND date > ?1 AND date <= ?2",
            )
            .bind(since)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?
        } else {
            0
        };

        let expected_cents = baseline + deposits - withdrawals - expenses + cash_sales;
        let difference_cents = counted_cents - expected_cents;

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO cash_closings (id, account_id, date, expected_cents, counted_cents, difference_cents) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&id)
        .bind(account_id)
        .bind(now)
        .bind(expected_cents)
        .bind(counted_cents)
        .bind(difference_cents)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            account_id = %account_id,
            expected = expected_cents,
            counted = counted_cents,
            difference = difference_cents,
            "Cash closing recorded"
        );

        Ok(CashClosing {
            id,
            account_id: account_id.to_string(),
            date: now,
            expected_cents,
            counted_cents,
            difference_cents,
        })
    }

    /// Lists an account's closings, newest first.
    pub async fn list_closings(&self, account_id: &str) -> DbResult<Vec<CashClosing>> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: String,
            account_id: String,
            date: DateTime<Utc>,
            expected_cents: i64,
            counted_cents: i64,
            difference_cents: i64,
        }

        let rows: Vec<Row> = sqlx::query_as(
            "SELECT id, account_id, date, expected_cents, counted_cents, difference_cents \
             FROM cash_closings WHERE account_id = ?1 ORDER BY date DESC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CashClosing {
                id: r.id,
                account_id: r.account_id,
                date: r.date,
                expected_cents: r.expected_cents,
                counted_cents: r.counted_cents,
                difference_cents: r.difference_cents,
            })
            .collect())
    }
}

/// Slices completed sales by payment method. Sales completed without a
/// recorded method are grouped under "sin especificar".
fn breakdown_by_method(sales: &[Sale]) -> Vec<PaymentMethodBreakdown> {
    let mut groups: BTreeMap<String, PaymentMethodBreakdown> = BTreeMap::new();

    for sale in sales {
        let method = sale
            .payment_method
            .clone()
            .unwrap_or_else(|| "sin especificar".to_string());

        let entry = groups
            .entry(method.clone())
            .or_insert_with(|| PaymentMethodBreakdown {
                payment_method: method,
                sales_count: 0,
                total_cents: 0,
                net_profit_cents: 0,
            });

        entry.sales_count += 1;
        entry.total_cents += sale.final_amount_cents;
        entry.net_profit_cents += sale.net_profit().cents();
    }

    groups.into_values().collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::NewProduct;
    use crate::repository::sale::NewSale;
    use caja_core::Percent;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn deposit(account_id: Option<&str>, amount_cents: i64) -> NewMovement {
        NewMovement {
            account_id: account_id.map(str::to_string),
            category_id: None,
            kind: MovementKind::Deposit,
            amount_cents,
            reason: "aporte".to_string(),
        }
    }

    fn withdrawal(account_id: Option<&str>, amount_cents: i64) -> NewMovement {
        NewMovement {
            account_id: account_id.map(str::to_string),
            category_id: None,
            kind: MovementKind::Withdrawal,
            amount_cents,
            reason: "retiro".to_string(),
        }
    }

    async fn complete_sale(db: &Database, method: &str, unit_cents: i64, purchase_cents: i64) {
        let product = db
            .products()
            .create(NewProduct {
                code: None,
                name: "Yerba".to_string(),
                kind: "almacen".to_string(),
                brand: None,
                subkind: None,
                quantity: 100,
                purchase_price_cents: purchase_cents,
                sale_prices: vec![],
                low_stock_threshold: 0,
            })
            .await
            .unwrap();

        let sale = db
            .sales()
            .create_pending(NewSale {
                items: vec![caja_core::SaleItem {
                    product_id: Some(product.id),
                    name: "Yerba".to_string(),
                    quantity: 1,
                    unit_price_cents: unit_cents,
                    purchase_price_cents: purchase_cents,
                }],
                subtotal_cents: unit_cents,
                discount: Percent::zero(),
                total_cents: unit_cents,
                payment_method: None,
            })
            .await
            .unwrap();

        db.sales()
            .complete(&sale.id, method, Percent::zero())
            .await
            .unwrap();
    }

    fn wide_range() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc::now() - chrono::Duration::days(1),
            Utc::now() + chrono::Duration::days(1),
        )
    }

    #[tokio::test]
    async fn test_duplicate_account_name_rejected() {
        let db = setup().await;
        db.accounts()
            .create("Caja", AccountKind::Cash, 0)
            .await
            .unwrap();

        let err = db
            .accounts()
            .create("Caja", AccountKind::Digital, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_movement_crud() {
        let db = setup().await;
        let account = db
            .accounts()
            .create("Caja", AccountKind::Cash, 0)
            .await
            .unwrap();

        let movement = db
            .accounts()
            .add_movement(deposit(Some(&account.id), 5000))
            .await
            .unwrap();

        db.accounts()
            .update_movement(&movement.id, withdrawal(Some(&account.id), 3000))
            .await
            .unwrap();

        let movements = db.accounts().list_movements(Some(&account.id)).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].kind, MovementKind::Withdrawal);
        assert_eq!(movements[0].amount_cents, 3000);

        db.accounts().delete_movement(&movement.id).await.unwrap();
        let err = db.accounts().delete_movement(&movement.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_account_delete_cascades_to_movements() {
        let db = setup().await;
        let account = db
            .accounts()
            .create("Caja", AccountKind::Cash, 0)
            .await
            .unwrap();
        db.accounts()
            .add_movement(deposit(Some(&account.id), 5000))
            .await
            .unwrap();

        db.accounts().delete(&account.id).await.unwrap();

        let movements = db.accounts().list_movements(None).await.unwrap();
        assert!(movements.is_empty());
    }

    #[tokio::test]
    async fn test_consolidated_summary() {
        let db = setup().await;

        // Income: one cash sale 10000 + one transfer sale 8000 + deposit 2000.
        // Outcome: withdrawal 1500.
        complete_sale(&db, "efectivo", 10000, 6000).await;
        complete_sale(&db, "transferencia", 8000, 5000).await;
        db.accounts().add_movement(deposit(None, 2000)).await.unwrap();
        db.accounts()
            .add_movement(withdrawal(None, 1500))
            .await
            .unwrap();

        let (start, end) = wide_range();
        let summary = db.accounts().summary(start, end, None).await.unwrap();

        assert_eq!(summary.total_income_cents, 20000);
        assert_eq!(summary.total_outcome_cents, 1500);
        assert_eq!(summary.period_result_cents, 18500);

        assert_eq!(summary.by_payment_method.len(), 2);
        let cash = summary
            .by_payment_method
            .iter()
            .find(|b| b.payment_method == "efectivo")
            .unwrap();
        assert_eq!(cash.sales_count, 1);
        assert_eq!(cash.total_cents, 10000);
        assert_eq!(cash.net_profit_cents, 4000); // 10000 − 6000 cost − 0 tax
    }

    #[tokio::test]
    async fn test_filtered_summary_scopes_to_account() {
        let db = setup().await;
        let caja = db
            .accounts()
            .create("Caja", AccountKind::Cash, 0)
            .await
            .unwrap();
        let banco = db
            .accounts()
            .create("Banco", AccountKind::Digital, 0)
            .await
            .unwrap();

        db.accounts()
            .add_movement(deposit(Some(&caja.id), 4000))
            .await
            .unwrap();
        db.accounts()
            .add_movement(deposit(Some(&banco.id), 9000))
            .await
            .unwrap();

        let (start, end) = wide_range();
        let summary = db
            .accounts()
            .summary(start, end, Some(&caja.id))
            .await
            .unwrap();

        assert_eq!(summary.total_income_cents, 4000);
        assert_eq!(summary.total_outcome_cents, 0);
        assert!(summary.by_payment_method.is_empty());
    }

    #[tokio::test]
    async fn test_first_cash_closing_uses_opening_balance() {
        let db = setup().await;
        let account = db
            .accounts()
            .create("Caja", AccountKind::Cash, 10000)
            .await
            .unwrap();

        complete_sale(&db, "efectivo", 5000, 3000).await;
        db.accounts()
            .add_movement(withdrawal(Some(&account.id), 2000))
            .await
            .unwrap();

        // expected = 10000 opening + 5000 cash sale − 2000 withdrawal
        let closing = db.accounts().cash_closing(&account.id, 12500).await.unwrap();
        assert_eq!(closing.expected_cents, 13000);
        assert_eq!(closing.counted_cents, 12500);
        assert_eq!(closing.difference_cents, -500);
    }

    #[tokio::test]
    async fn test_next_closing_baselines_on_counted() {
        let db = setup().await;
        let account = db
            .accounts()
            .create("Caja", AccountKind::Cash, 10000)
            .await
            .unwrap();

        let first = db.accounts().cash_closing(&account.id, 9000).await.unwrap();
        assert_eq!(first.expected_cents, 10000);

        // Second closing starts from the counted 9000, not the expected.
        let second = db.accounts().cash_closing(&account.id, 9000).await.unwrap();
        assert_eq!(second.expected_cents, 9000);
        assert_eq!(second.difference_cents, 0);

        let closings = db.accounts().list_closings(&account.id).await.unwrap();
        assert_eq!(closings.len(), 2);
    }

    #[tokio::test]
    async fn test_digital_account_closing_ignores_cash_sales() {
        let db = setup().await;
        let account = db
            .accounts()
            .create("Banco", AccountKind::Digital, 5000)
            .await
            .unwrap();

        complete_sale(&db, "efectivo", 7000, 3000).await;

        let closing = db.accounts().cash_closing(&account.id, 5000).await.unwrap();
        assert_eq!(closing.expected_cents, 5000);
        assert_eq!(closing.difference_cents, 0);
    }
}

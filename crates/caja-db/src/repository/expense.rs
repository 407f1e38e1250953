//! Expense CRUD. Expenses are plain dated rows; their only coupling to the
//! rest of the system is the account/category references and the period
//! folds in the summary and reports.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use caja_core::Expense;

/// Input for recording or updating an expense.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub description: String,
    pub amount_cents: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct ExpenseRow {
    id: String,
    account_id: Option<String>,
    category_id: Option<String>,
    date: DateTime<Utc>,
    description: String,
    amount_cents: i64,
}

impl From<ExpenseRow> for Expense {
    fn from(row: ExpenseRow) -> Expense {
        Expense {
            id: row.id,
            account_id: row.account_id,
            category_id: row.category_id,
            date: row.date,
            description: row.description,
            amount_cents: row.amount_cents,
        }
    }
}

const EXPENSE_COLUMNS: &str = "id, account_id, category_id, date, description, amount_cents";

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Records an expense, dated now.
    ///
    /// Description and amount validation happen in caja-core before this
    /// is called.
    pub async fn create(&self, new_expense: NewExpense) -> DbResult<Expense> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(&format!(
            "INSERT INTO expenses ({EXPENSE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
        ))
        .bind(&id)
        .bind(&new_expense.account_id)
        .bind(&new_expense.category_id)
        .bind(now)
        .bind(&new_expense.description)
        .bind(new_expense.amount_cents)
        .execute(&self.pool)
        .await?;

        debug!(id = %id, amount = new_expense.amount_cents, "Expense recorded");

        Ok(Expense {
            id,
            account_id: new_expense.account_id,
            category_id: new_expense.category_id,
            date: now,
            description: new_expense.description,
            amount_cents: new_expense.amount_cents,
        })
    }

    /// Gets an expense by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Expense>> {
        let row: Option<ExpenseRow> =
            sqlx::query_as(&format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Expense::from))
    }

    /// Lists all expenses, newest first.
    pub async fn list(&self) -> DbResult<Vec<Expense>> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses ORDER BY date DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Expense::from).collect())
    }

    /// Lists expenses within a date range, newest first.
    pub async fn list_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Expense>> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses \
             WHERE date >= ?1 AND date <= ?2 ORDER BY date DESC"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Expense::from).collect())
    }

    /// Updates an expense's description, amount, account and category.
    /// The original date is kept.
    pub async fn update(&self, id: &str, update: NewExpense) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE expenses SET account_id = ?2, category_id = ?3, \
             description = ?4, amount_cents = ?5 WHERE id = ?1",
        )
        .bind(id)
        .bind(&update.account_id)
        .bind(&update.category_id)
        .bind(&update.description)
        .bind(update.amount_cents)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", id));
        }
        Ok(())
    }

    /// Deletes an expense.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", id));
        }

        info!(id = %id, "Expense deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! User-maintained lookup tables: movement/expense categories and payment
//! methods. Both are flat name lists; deleting a category clears the
//! references on movements and expenses rather than deleting them.

use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use caja_core::{MovementCategory, PaymentMethod};

/// Repository for the category and payment-method tables.
#[derive(Debug, Clone)]
pub struct LookupRepository {
    pool: SqlitePool,
}

impl LookupRepository {
    /// Creates a new LookupRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LookupRepository { pool }
    }

    // =========================================================================
    // Movement categories
    // =========================================================================

    /// Creates a movement/expense category. Names are unique.
    pub async fn create_category(&self, name: &str) -> DbResult<MovementCategory> {
        let id = Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO movement_categories (id, name) VALUES (?1, ?2)")
            .bind(&id)
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(MovementCategory {
            id,
            name: name.to_string(),
        })
    }

    /// Lists categories, alphabetically.
    pub async fn list_categories(&self) -> DbResult<Vec<MovementCategory>> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: String,
            name: String,
        }

        let rows: Vec<Row> =
            sqlx::query_as("SELECT id, name FROM movement_categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|r| MovementCategory {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    /// Deletes a category. Movements and expenses referencing it keep
    /// their rows with the category cleared (ON DELETE SET NULL).
    pub async fn delete_category(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM movement_categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        info!(id = %id, "Category deleted");
        Ok(())
    }

    // =========================================================================
    // Payment methods
    // =========================================================================

    /// Creates a payment method. Names are unique.
    pub async fn create_payment_method(&self, name: &str) -> DbResult<PaymentMethod> {
        let id = Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO payment_methods (id, name) VALUES (?1, ?2)")
            .bind(&id)
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(PaymentMethod {
            id,
            name: name.to_string(),
        })
    }

    /// Lists payment methods, alphabetically.
    pub async fn list_payment_methods(&self) -> DbResult<Vec<PaymentMethod>> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: String,
            name: String,
        }

        let rows: Vec<Row> = sqlx::query_as("SELECT id, name FROM payment_methods ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| PaymentMethod {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    /// Deletes a payment method. Sales keep the method as recorded text;
    /// only the pick list shrinks.
    pub async fn delete_payment_method(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM payment_methods WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payment method", id));
        }

        info!(id = %id, "Payment method deleted");
        Ok(())
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

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_category_round_trip_and_uniqueness() {
        let db = setup().await;

        db.lookups().create_category("Servicios").await.unwrap();
        db.lookups().create_category("Impuestos").await.unwrap();

        let err = db.lookups().create_category("Servicios").await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let names: Vec<String> = db
            .lookups()
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Impuestos", "Servicios"]);
    }

    #[tokio::test]
    async fn test_category_delete_clears_expense_reference() {
        let db = setup().await;
        let category = db.lookups().create_category("Servicios").await.unwrap();

        let expense = db
            .expenses()
            .create(NewExpense {
                account_id: None,
                category_id: Some(category.id.clone()),
                description: "Luz".to_string(),
                amount_cents: 30000,
            })
            .await
            .unwrap();

        db.lookups().delete_category(&category.id).await.unwrap();

        let fetched = db.expenses().get_by_id(&expense.id).await.unwrap().unwrap();
        assert_eq!(fetched.category_id, None);
    }

    #[tokio::test]
    async fn test_payment_methods() {
        let db = setup().await;

        let method = db
            .lookups()
            .create_payment_method("efectivo")
            .await
            .unwrap();
        db.lookups()
            .create_payment_method("transferencia")
            .await
            .unwrap();

        assert_eq!(db.lookups().list_payment_methods().await.unwrap().len(), 2);

        db.lookups().delete_payment_method(&method.id).await.unwrap();
        let err = db
            .lookups()
            .delete_payment_method(&method.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}

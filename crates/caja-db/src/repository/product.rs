//! # Product Repository
//!
//! Catalog CRUD, stock movements outside the sale lifecycle (restocks),
//! and inventory history (stock entries, price increases).
//!
//! ## Stock Ownership
//! ```text
//! quantity is written from exactly three places:
//!   - restock()           +N, records a stock_entries row
//!   - SaleRepository      -N on completion (conditional), +N on cancel
//!   - update()            absolute overwrite (catalog correction)
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use caja_core::{PriceIncrease, Product, SalePrice, StockEntry};

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub code: Option<String>,
    pub name: String,
    pub kind: String,
    pub brand: Option<String>,
    pub subkind: Option<String>,
    pub quantity: i64,
    pub purchase_price_cents: i64,
    pub sale_prices: Vec<SalePrice>,
    pub low_stock_threshold: i64,
}

/// Full-row update for a product (the catalog form submits every field).
#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub code: Option<String>,
    pub name: String,
    pub kind: String,
    pub brand: Option<String>,
    pub subkind: Option<String>,
    pub quantity: i64,
    pub purchase_price_cents: i64,
    pub sale_prices: Vec<SalePrice>,
    pub low_stock_threshold: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    code: Option<String>,
    name: String,
    kind: String,
    brand: Option<String>,
    subkind: Option<String>,
    quantity: i64,
    purchase_price_cents: i64,
    sale_prices: String,
    low_stock_threshold: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Product> {
        Ok(Product {
            id: row.id,
            code: row.code,
            name: row.name,
            kind: row.kind,
            brand: row.brand,
            subkind: row.subkind,
            quantity: row.quantity,
            purchase_price_cents: row.purchase_price_cents,
            sale_prices: serde_json::from_str(&row.sale_prices)?,
            low_stock_threshold: row.low_stock_threshold,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, code, name, kind, brand, subkind, quantity, \
     purchase_price_cents, sale_prices, low_stock_threshold, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a single product.
    pub async fn create(&self, new_product: NewProduct) -> DbResult<Product> {
        let mut tx = self.pool.begin().await?;
        let product = insert_product(&mut tx, new_product).await?;
        tx.commit().await?;

        debug!(id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Creates a batch of products in one all-or-nothing transaction.
    ///
    /// Any failure (duplicate code, constraint violation) rolls back the
    /// entire batch.
    pub async fn create_batch(&self, new_products: Vec<NewProduct>) -> DbResult<Vec<Product>> {
        let count = new_products.len();
        let mut tx = self.pool.begin().await?;

        let mut created = Vec::with_capacity(count);
        for new_product in new_products {
            created.push(insert_product(&mut tx, new_product).await?);
        }

        tx.commit().await?;

        info!(count, "Product batch inserted");
        Ok(created)
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Product::try_from).transpose()
    }

    /// Lists the catalog, optionally filtered by a name/code search term.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => {
                let pattern = format!("%{}%", term);
                sqlx::query_as(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products \
                     WHERE name LIKE ?1 OR code LIKE ?1 ORDER BY name"
                ))
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Lists products at or below their low-stock threshold.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE quantity <= low_stock_threshold ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Updates a product.
    ///
    /// When the purchase price rises, a `price_increases` row is recorded
    /// in the same transaction for later margin analysis.
    pub async fn update(&self, id: &str, update: ProductUpdate) -> DbResult<Product> {
        let now = Utc::now();
        let sale_prices_json = serde_json::to_string(&update.sale_prices)?;

        let mut tx = self.pool.begin().await?;

        let existing: Option<(i64, DateTime<Utc>)> =
            sqlx::query_as("SELECT purchase_price_cents, created_at FROM products WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let (old_price, created_at) = match existing {
            Some(row) => row,
            None => return Err(DbError::not_found("Product", id)),
        };

        sqlx::query(
            "UPDATE products SET code = ?2, name = ?3, kind = ?4, brand = ?5, subkind = ?6, \
             quantity = ?7, purchase_price_cents = ?8, sale_prices = ?9, \
             low_stock_threshold = ?10, updated_at = ?11 WHERE id = ?1",
        )
        .bind(id)
        .bind(&update.code)
        .bind(&update.name)
        .bind(&update.kind)
        .bind(&update.brand)
        .bind(&update.subkind)
        .bind(update.quantity)
        .bind(update.purchase_price_cents)
        .bind(&sale_prices_json)
        .bind(update.low_stock_threshold)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if update.purchase_price_cents > old_price {
            sqlx::query(
                "INSERT INTO price_increases (id, product_id, date, old_price_cents, new_price_cents) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(id)
            .bind(now)
            .bind(old_price)
            .bind(update.purchase_price_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Product {
            id: id.to_string(),
            code: update.code,
            name: update.name,
            kind: update.kind,
            brand: update.brand,
            subkind: update.subkind,
            quantity: update.quantity,
            purchase_price_cents: update.purchase_price_cents,
            sale_prices: update.sale_prices,
            low_stock_threshold: update.low_stock_threshold,
            created_at,
            updated_at: now,
        })
    }

    /// Deletes a product. Stock entries and price increases cascade.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(id = %id, "Product deleted");
        Ok(())
    }

    /// Restocks a product: increments stock and records a stock entry,
    /// both in one transaction.
    pub async fn restock(&self, id: &str, quantity: i64, unit_cost_cents: i64) -> DbResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result =
            sqlx::query("UPDATE products SET quantity = quantity + ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(quantity)
                .bind(now)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        sqlx::query(
            "INSERT INTO stock_entries (id, product_id, date, quantity, unit_cost_cents) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(id)
        .bind(now)
        .bind(quantity)
        .bind(unit_cost_cents)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(id = %id, quantity, "Product restocked");
        Ok(())
    }

    /// Lists restock history for a product, newest first.
    pub async fn list_stock_entries(&self, product_id: &str) -> DbResult<Vec<StockEntry>> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: String,
            product_id: String,
            date: DateTime<Utc>,
            quantity: i64,
            unit_cost_cents: i64,
        }

        let rows: Vec<Row> = sqlx::query_as(
            "SELECT id, product_id, date, quantity, unit_cost_cents \
             FROM stock_entries WHERE product_id = ?1 ORDER BY date DESC",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| StockEntry {
                id: r.id,
                product_id: r.product_id,
                date: r.date,
                quantity: r.quantity,
                unit_cost_cents: r.unit_cost_cents,
            })
            .collect())
    }

    /// Lists recorded purchase-price increases for a product, newest first.
    pub async fn list_price_increases(&self, product_id: &str) -> DbResult<Vec<PriceIncrease>> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: String,
            product_id: String,
            date: DateTime<Utc>,
            old_price_cents: i64,
            new_price_cents: i64,
        }

        let rows: Vec<Row> = sqlx::query_as(
            "SELECT id, product_id, date, old_price_cents, new_price_cents \
             FROM price_increases WHERE product_id = ?1 ORDER BY date DESC",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| PriceIncrease {
                id: r.id,
                product_id: r.product_id,
                date: r.date,
                old_price_cents: r.old_price_cents,
                new_price_cents: r.new_price_cents,
            })
            .collect())
    }
}

/// Shared insert used by both single and batch creation.
async fn insert_product(
    tx: &mut Transaction<'_, Sqlite>,
    new_product: NewProduct,
) -> DbResult<Product> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let sale_prices_json = serde_json::to_string(&new_product.sale_prices)?;

    sqlx::query(
        "INSERT INTO products (id, code, name, kind, brand, subkind, quantity, \
         purchase_price_cents, sale_prices, low_stock_threshold, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
    )
    .bind(&id)
    .bind(&new_product.code)
    .bind(&new_product.name)
    .bind(&new_product.kind)
    .bind(&new_product.brand)
    .bind(&new_product.subkind)
    .bind(new_product.quantity)
    .bind(new_product.purchase_price_cents)
    .bind(&sale_prices_json)
    .bind(new_product.low_stock_threshold)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(Product {
        id,
        code: new_product.code,
        name: new_product.name,
        kind: new_product.kind,
        brand: new_product.brand,
        subkind: new_product.subkind,
        quantity: new_product.quantity,
        purchase_price_cents: new_product.purchase_price_cents,
        sale_prices: new_product.sale_prices,
        low_stock_threshold: new_product.low_stock_threshold,
        created_at: now,
        updated_at: now,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_product(name: &str, code: Option<&str>, quantity: i64) -> NewProduct {
        NewProduct {
            code: code.map(str::to_string),
            name: name.to_string(),
            kind: "almacen".to_string(),
            brand: None,
            subkind: None,
            quantity,
            purchase_price_cents: 1000,
            sale_prices: vec![SalePrice {
                name: "lista".to_string(),
                price_cents: 1500,
            }],
            low_stock_threshold: 2,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let db = setup().await;
        let created = db
            .products()
            .create(new_product("Yerba 1kg", Some("YER-1"), 10))
            .await
            .unwrap();

        let fetched = db.products().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Yerba 1kg");
        assert_eq!(fetched.sale_prices.len(), 1);
        assert_eq!(fetched.sale_prices[0].price_cents, 1500);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = setup().await;
        db.products()
            .create(new_product("A", Some("DUP"), 1))
            .await
            .unwrap();

        let err = db
            .products()
            .create(new_product("B", Some("DUP"), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let db = setup().await;
        db.products()
            .create(new_product("Existing", Some("X-1"), 1))
            .await
            .unwrap();

        // Second entry collides with an existing code; the first must not
        // survive the rollback.
        let err = db
            .products()
            .create_batch(vec![
                new_product("New A", Some("A-1"), 1),
                new_product("New B", Some("X-1"), 1),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let all = db.products().list(None).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_restock_records_entry() {
        let db = setup().await;
        let product = db
            .products()
            .create(new_product("Yerba", None, 5))
            .await
            .unwrap();

        db.products().restock(&product.id, 12, 900).await.unwrap();

        let fetched = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.quantity, 17);

        let entries = db.products().list_stock_entries(&product.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].quantity, 12);
        assert_eq!(entries[0].unit_cost_cents, 900);
    }

    #[tokio::test]
    async fn test_purchase_price_increase_is_recorded() {
        let db = setup().await;
        let product = db
            .products()
            .create(new_product("Yerba", None, 5))
            .await
            .unwrap();

        let update = ProductUpdate {
            code: None,
            name: "Yerba".to_string(),
            kind: "almacen".to_string(),
            brand: None,
            subkind: None,
            quantity: 5,
            purchase_price_cents: 1300, // up from 1000
            sale_prices: vec![],
            low_stock_threshold: 2,
        };
        db.products().update(&product.id, update.clone()).await.unwrap();

        let increases = db
            .products()
            .list_price_increases(&product.id)
            .await
            .unwrap();
        assert_eq!(increases.len(), 1);
        assert_eq!(increases[0].old_price_cents, 1000);
        assert_eq!(increases[0].new_price_cents, 1300);

        // A price drop records nothing.
        let mut drop_update = update;
        drop_update.purchase_price_cents = 800;
        db.products().update(&product.id, drop_update).await.unwrap();
        let increases = db
            .products()
            .list_price_increases(&product.id)
            .await
            .unwrap();
        assert_eq!(increases.len(), 1);
    }

    #[tokio::test]
    async fn test_low_stock_listing() {
        let db = setup().await;
        db.products()
            .create(new_product("Low", None, 2))
            .await
            .unwrap();
        db.products()
            .create(new_product("Fine", None, 50))
            .await
            .unwrap();

        let low = db.products().list_low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Low");
    }

    #[tokio::test]
    async fn test_delete_missing_product() {
        let db = setup().await;
        let err = db.products().delete("nope").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}

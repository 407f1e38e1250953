//! # caja-db: Database Layer for Caja POS
//!
//! All SQLite access for Caja POS lives here: the connection pool, the
//! embedded migrations, and one repository per aggregate.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           caja-db                                       │
//! │                                                                         │
//! │  Database (pool.rs)                                                     │
//! │   ├── products()  → ProductRepository   catalog, restock, batch insert  │
//! │   ├── sales()     → SaleRepository      pending → completed → canceled  │
//! │   ├── accounts()  → AccountRepository   movements, closings, summary    │
//! │   ├── expenses()  → ExpenseRepository   expense CRUD                    │
//! │   ├── reports()   → ReportRepository    read-only aggregations          │
//! │   └── lookups()   → LookupRepository    categories, payment methods     │
//! │                                                                         │
//! │  Transaction rule: any mutation touching more than one row/table is     │
//! │  a single BEGIN..COMMIT; an early return drops the transaction and      │
//! │  SQLite rolls everything back.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::account::{AccountRepository, AccountSummary, NewMovement, PaymentMethodBreakdown};
pub use repository::expense::{ExpenseRepository, NewExpense};
pub use repository::lookup::LookupRepository;
pub use repository::product::{NewProduct, ProductRepository, ProductUpdate};
pub use repository::report::{MonthlySummary, ReportRepository, TopProduct};
pub use repository::sale::{NewSale, SaleRepository};

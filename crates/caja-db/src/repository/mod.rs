//! # Repository Module
//!
//! One repository per aggregate. Each wraps the shared `SqlitePool` and
//! owns the SQL for its tables; cross-aggregate effects (a cancellation
//! writing a ledger movement) stay inside one transaction in the
//! repository that owns the triggering operation.

pub mod account;
pub mod expense;
pub mod lookup;
pub mod product;
pub mod report;
pub mod sale;

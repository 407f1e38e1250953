//! # Domain Types
//!
//! Core domain types used throughout Caja POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │ AccountMovement │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  quantity       │   │  items (JSON)   │   │  kind           │       │
//! │  │  sale_prices    │   │  status         │   │  amount_cents   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Account      │   │   SaleStatus    │   │  MovementKind   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name (unique)  │   │  Pending        │   │  Deposit        │       │
//! │  │  kind           │   │  Completed      │   │  Withdrawal     │       │
//! │  │  initial balance│   │  Canceled       │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Sale line items freeze product data (name, unit price, purchase price)
//! at the moment the cart is turned into a pending sale. The sale history
//! stays correct even when the catalog changes afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
///
/// Lifecycle: `pending --complete--> completed --cancel--> canceled`.
/// Pending and completed sales may also be hard-deleted as a correction
/// tool; deletion never touches stock or the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Cart snapshot awaiting payment-method/discount finalization.
    /// Stock is NOT affected yet.
    Pending,
    /// Finalized sale. Stock has been decremented.
    Completed,
    /// Reverted sale. Stock restored, reversing ledger movement recorded.
    Canceled,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Pending
    }
}

// =============================================================================
// Movement Kind
// =============================================================================

/// Direction of an account movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Money entering the account.
    Deposit,
    /// Money leaving the account (includes sale-cancellation reversals).
    Withdrawal,
}

// =============================================================================
// Account Kind
// =============================================================================

/// The kind of cash account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Physical cash drawer. Only cash accounts take part in closings.
    Cash,
    /// Digital wallet / bank account.
    Digital,
}

// =============================================================================
// Product
// =============================================================================

/// A named sale price for a product.
///
/// Products carry an ordered list of these (e.g. "lista", "mayorista");
/// the order is meaningful and preserved verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalePrice {
    pub name: String,
    pub price_cents: i64,
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Optional business code (barcode or internal code).
    pub code: Option<String>,

    /// Display name.
    pub name: String,

    /// Product type/category label.
    pub kind: String,

    /// Optional brand.
    pub brand: Option<String>,

    /// Optional subtype.
    pub subkind: Option<String>,

    /// Stock on hand. Invariant: >= 0 at rest between transactions.
    pub quantity: i64,

    /// Purchase (cost) price in cents.
    pub purchase_price_cents: i64,

    /// Ordered list of named sale prices.
    pub sale_prices: Vec<SalePrice>,

    /// Stock level at or below which the product is flagged as low.
    pub low_stock_threshold: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the purchase price as Money.
    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }

    /// Whether current stock is at or below the low-stock threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A line item in a sale.
///
/// `product_id` is `None` for ad-hoc items typed in at the register;
/// those never touch stock on completion or cancellation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleItem {
    /// Product reference, or None for ad-hoc items.
    pub product_id: Option<String>,

    /// Name at time of sale (frozen).
    pub name: String,

    /// Quantity sold.
    pub quantity: i64,

    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,

    /// Purchase price in cents at time of sale (frozen; cost-of-goods input).
    pub purchase_price_cents: i64,
}

impl SaleItem {
    /// Line total before discount (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }

    /// Cost of goods for this line (purchase price × quantity).
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.purchase_price_cents).multiply_quantity(self.quantity)
    }
}

/// A sale in any lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    pub id: String,

    /// Business date. Stamped to completion time when the sale completes.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    /// Cart snapshot, serialized as given.
    pub items: Vec<SaleItem>,

    pub subtotal_cents: i64,

    /// Cart-level discount in basis points (1000 = 10%).
    pub discount_bps: u32,

    pub total_cents: i64,

    pub status: SaleStatus,

    /// Payment method name, e.g. "efectivo". Optional until completion.
    pub payment_method: Option<String>,

    /// Discount applied at completion, in basis points.
    pub final_discount_bps: u32,

    /// `total × (1 − final_discount/100)`, set at completion.
    pub final_amount_cents: i64,

    /// Tax applied after the fact; never changes final_amount.
    pub applied_tax_cents: i64,

    /// Required when status is canceled.
    pub cancellation_reason: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Sum of purchase costs over all line items.
    pub fn cost_of_goods(&self) -> Money {
        self.items.iter().map(SaleItem::cost).fold(Money::zero(), |a, b| a + b)
    }

    /// Net profit: final amount minus cost of goods minus applied tax.
    pub fn net_profit(&self) -> Money {
        Money::from_cents(self.final_amount_cents)
            - self.cost_of_goods()
            - Money::from_cents(self.applied_tax_cents)
    }
}

// =============================================================================
// Accounts & Ledger
// =============================================================================

/// A cash account (drawer, wallet, bank).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Account {
    pub id: String,

    /// Unique display name.
    pub name: String,

    pub kind: AccountKind,

    /// Balance the account started with.
    pub initial_balance_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A manual or system-generated deposit/withdrawal against an account.
///
/// `account_id` of None means the consolidated (all-accounts) ledger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AccountMovement {
    pub id: String,

    pub account_id: Option<String>,

    pub category_id: Option<String>,

    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    pub kind: MovementKind,

    pub amount_cents: i64,

    pub reason: String,
}

/// A reconciliation record: expected vs. physically counted cash.
///
/// The signed difference is retained verbatim for audit; no correcting
/// entry is ever derived from it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashClosing {
    pub id: String,

    pub account_id: String,

    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    pub expected_cents: i64,

    pub counted_cents: i64,

    /// counted − expected.
    pub difference_cents: i64,
}

// =============================================================================
// Expenses & Lookup Tables
// =============================================================================

/// A business expense.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Expense {
    pub id: String,

    pub account_id: Option<String>,

    pub category_id: Option<String>,

    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    pub description: String,

    pub amount_cents: i64,
}

/// A user-defined movement/expense category.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MovementCategory {
    pub id: String,
    pub name: String,
}

/// A user-defined payment method ("efectivo", "transferencia", ...).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Inventory History
// =============================================================================

/// One restock event for a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockEntry {
    pub id: String,

    pub product_id: String,

    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    pub quantity: i64,

    pub unit_cost_cents: i64,
}

/// A recorded purchase-price increase for a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceIncrease {
    pub id: String,

    pub product_id: String,

    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    pub old_price_cents: i64,

    pub new_price_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(qty: i64, unit: i64, cost: i64) -> SaleItem {
        SaleItem {
            product_id: Some("p1".to_string()),
            name: "Item".to_string(),
            quantity: qty,
            unit_price_cents: unit,
            purchase_price_cents: cost,
        }
    }

    #[test]
    fn test_sale_status_default() {
        assert_eq!(SaleStatus::default(), SaleStatus::Pending);
    }

    #[test]
    fn test_line_totals() {
        let it = item(3, 299, 150);
        assert_eq!(it.line_total().cents(), 897);
        assert_eq!(it.cost().cents(), 450);
    }

    #[test]
    fn test_sale_net_profit() {
        let sale = Sale {
            id: "s1".to_string(),
            date: Utc::now(),
            items: vec![item(2, 10000, 6000)],
            subtotal_cents: 20000,
            discount_bps: 0,
            total_cents: 20000,
            status: SaleStatus::Completed,
            payment_method: Some("efectivo".to_string()),
            final_discount_bps: 1000,
            final_amount_cents: 18000,
            applied_tax_cents: 0,
            cancellation_reason: None,
            created_at: Utc::now(),
        };

        assert_eq!(sale.cost_of_goods().cents(), 12000);
        assert_eq!(sale.net_profit().cents(), 6000);
    }

    #[test]
    fn test_low_stock_flag() {
        let product = Product {
            id: "p1".to_string(),
            code: None,
            name: "Yerba".to_string(),
            kind: "almacen".to_string(),
            brand: None,
            subkind: None,
            quantity: 3,
            purchase_price_cents: 1000,
            sale_prices: vec![],
            low_stock_threshold: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(product.is_low_stock());
    }
}

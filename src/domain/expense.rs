use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type ExpenseId = Uuid;
pub type ItemId = Uuid;

/// A dated spending event owned by a single user.
///
/// `total_amount` is derived: it always equals the sum of the current item
/// prices as of the last full create/update. It is never set by callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub owner_id: String,
    /// Calendar date with day granularity; this is what summaries bucket on.
    pub date: NaiveDate,
    pub total_amount: Cents,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(owner_id: impl Into<String>, date: NaiveDate, total_amount: Cents) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            date,
            total_amount,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an edit: new date, recomputed total, refreshed `updated_at`.
    /// Identity, owner and `created_at` never change.
    pub fn with_revision(mut self, date: NaiveDate, total_amount: Cents) -> Self {
        self.date = date;
        self.total_amount = total_amount;
        self.updated_at = Utc::now();
        self
    }
}

/// One priced line within an expense.
///
/// `expense_id` is an association, not an ownership pointer: the item set is
/// replaced or removed through operations on the parent expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub id: ItemId,
    pub expense_id: ExpenseId,
    pub name: String,
    pub price: Cents,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExpenseItem {
    pub fn new(expense_id: ExpenseId, name: impl Into<String>, price: Cents) -> Self {
        let name: String = name.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            expense_id,
            name: name.trim().to_string(),
            price,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An expense enriched with its items, the shape read surfaces return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseWithItems {
    pub expense: Expense,
    pub items: Vec<ExpenseItem>,
}

/// Caller-supplied line item for create/update. The price arrives as text;
/// the repository parses it and rejects anything non-numeric before a single
/// record is written.
#[derive(Debug, Clone)]
pub struct ItemDraft {
    pub name: String,
    pub price: String,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
        }
    }
}

/// Partial field set for a standalone item edit; only supplied fields change.
#[derive(Debug, Clone, Default)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub price: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_new_expense_timestamps_match() {
        let expense = Expense::new("alice", date("2024-03-01"), 1500);
        assert_eq!(expense.created_at, expense.updated_at);
        assert_eq!(expense.total_amount, 1500);
    }

    #[test]
    fn test_revision_keeps_identity() {
        let expense = Expense::new("alice", date("2024-03-01"), 1500);
        let id = expense.id;
        let created_at = expense.created_at;

        let revised = expense.with_revision(date("2024-04-02"), 2000);
        assert_eq!(revised.id, id);
        assert_eq!(revised.created_at, created_at);
        assert_eq!(revised.date, date("2024-04-02"));
        assert_eq!(revised.total_amount, 2000);
        assert!(revised.updated_at >= created_at);
    }

    #[test]
    fn test_item_name_is_trimmed() {
        let item = ExpenseItem::new(Uuid::new_v4(), "  coffee  ", 350);
        assert_eq!(item.name, "coffee");
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Expense, ExpenseId, ExpenseItem, ItemId};

use super::MIGRATION_001_INITIAL;

/// Failures surfaced by the record store. Nothing is retried at this layer;
/// retry and backoff policy, if any, belongs to the caller.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(sqlx::Error),

    #[error("atomic commit conflicted with a concurrent writer")]
    CommitConflict,

    #[error("corrupt record: {0}")]
    CorruptRecord(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let message = db_err.message();
            if message.contains("database is locked") || message.contains("database is busy") {
                return StoreError::CommitConflict;
            }
        }
        StoreError::Unavailable(err)
    }
}

/// Storage boundary over the two record sets (`expenses`, `expense_items`).
///
/// Provides atomic multi-record batches, point lookups and indexed queries.
/// No SQL leaks above this layer, and no aggregation happens below it:
/// summary folding is always done in memory by the callers.
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    /// Create a record store over an existing connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self, StoreError> {
        let store = Self::connect(database_url).await?;
        store.migrate().await?;
        Ok(store)
    }

    /// Open a scoped write batch. Every row operation joins one underlying
    /// transaction; `commit` makes them visible as a single unit, and
    /// dropping the batch without committing rolls everything back.
    pub async fn begin_batch(&self) -> Result<Batch, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Batch { tx })
    }

    // ========================
    // Point lookups
    // ========================

    pub async fn get_expense(&self, id: ExpenseId) -> Result<Option<Expense>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, date, total_amount_cents, created_at, updated_at
            FROM expenses
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_expense).transpose()
    }

    pub async fn get_item(&self, id: ItemId) -> Result<Option<ExpenseItem>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, expense_id, name, price_cents, created_at, updated_at
            FROM expense_items
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_item).transpose()
    }

    // ========================
    // Indexed queries
    // ========================

    /// All expenses for an owner, newest date first.
    pub async fn expenses_by_owner(&self, owner_id: &str) -> Result<Vec<Expense>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, date, total_amount_cents, created_at, updated_at
            FROM expenses
            WHERE owner_id = ?
            ORDER BY date DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_expense).collect()
    }

    /// An owner's expenses with `date` in `[from, to]` inclusive, ascending.
    /// Dates are stored as ISO text, so lexicographic range compare is exact.
    pub async fn expenses_in_range(
        &self,
        owner_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Expense>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, date, total_amount_cents, created_at, updated_at
            FROM expenses
            WHERE owner_id = ? AND date >= ? AND date <= ?
            ORDER BY date ASC
            "#,
        )
        .bind(owner_id)
        .bind(from.to_string())
        .bind(to.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_expense).collect()
    }

    pub async fn items_for_expense(
        &self,
        expense_id: ExpenseId,
    ) -> Result<Vec<ExpenseItem>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, expense_id, name, price_cents, created_at, updated_at
            FROM expense_items
            WHERE expense_id = ?
            ORDER BY created_at, id
            "#,
        )
        .bind(expense_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_item).collect()
    }

    // ========================
    // Standalone item writes (not batched)
    // ========================

    pub async fn insert_item(&self, item: &ExpenseItem) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO expense_items (id, expense_id, name, price_cents, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.to_string())
        .bind(item.expense_id.to_string())
        .bind(&item.name)
        .bind(item.price)
        .bind(item.created_at.to_rfc3339())
        .bind(item.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_item(&self, item: &ExpenseItem) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE expense_items
            SET name = ?, price_cents = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&item.name)
        .bind(item.price)
        .bind(item.updated_at.to_rfc3339())
        .bind(item.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_item(&self, id: ItemId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM expense_items WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Scoped write accumulator over the record sets.
pub struct Batch {
    tx: Transaction<'static, Sqlite>,
}

impl Batch {
    pub async fn put_expense(&mut self, expense: &Expense) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO expenses (id, owner_id, date, total_amount_cents, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(expense.id.to_string())
        .bind(&expense.owner_id)
        .bind(expense.date.to_string())
        .bind(expense.total_amount)
        .bind(expense.created_at.to_rfc3339())
        .bind(expense.updated_at.to_rfc3339())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    /// Update an expense's mutable fields. Owner and `created_at` are never
    /// rewritten.
    pub async fn update_expense(&mut self, expense: &Expense) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE expenses
            SET date = ?, total_amount_cents = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(expense.date.to_string())
        .bind(expense.total_amount)
        .bind(expense.updated_at.to_rfc3339())
        .bind(expense.id.to_string())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    /// Deleting an absent row is a no-op, which keeps expense deletion
    /// idempotent at the layer above.
    pub async fn delete_expense(&mut self, id: ExpenseId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    pub async fn put_item(&mut self, item: &ExpenseItem) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO expense_items (id, expense_id, name, price_cents, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.to_string())
        .bind(item.expense_id.to_string())
        .bind(&item.name)
        .bind(item.price)
        .bind(item.created_at.to_rfc3339())
        .bind(item.updated_at.to_rfc3339())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    pub async fn delete_item(&mut self, id: ItemId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM expense_items WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    /// Apply every accumulated operation as one indivisible unit.
    pub async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(StoreError::from)
    }
}

fn row_to_expense(row: &sqlx::sqlite::SqliteRow) -> Result<Expense, StoreError> {
    let id_str: String = row.get("id");
    let date_str: String = row.get("date");
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    Ok(Expense {
        id: parse_uuid(&id_str, "expense id")?,
        owner_id: row.get("owner_id"),
        date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .map_err(|_| StoreError::CorruptRecord(format!("expense date '{}'", date_str)))?,
        total_amount: row.get("total_amount_cents"),
        created_at: parse_timestamp(&created_at_str)?,
        updated_at: parse_timestamp(&updated_at_str)?,
    })
}

fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> Result<ExpenseItem, StoreError> {
    let id_str: String = row.get("id");
    let expense_id_str: String = row.get("expense_id");
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    Ok(ExpenseItem {
        id: parse_uuid(&id_str, "item id")?,
        expense_id: parse_uuid(&expense_id_str, "item expense id")?,
        name: row.get("name"),
        price: row.get("price_cents"),
        created_at: parse_timestamp(&created_at_str)?,
        updated_at: parse_timestamp(&updated_at_str)?,
    })
}

fn parse_uuid(input: &str, what: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(input).map_err(|_| StoreError::CorruptRecord(format!("{} '{}'", what, input)))
}

fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::CorruptRecord(format!("timestamp '{}'", input)))
}

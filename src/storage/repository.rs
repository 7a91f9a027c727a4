use chrono::{NaiveDate, Utc};

use crate::application::AppError;
use crate::domain::{
    Cents, Expense, ExpenseId, ExpenseItem, ExpenseWithItems, ItemDraft, ItemId, ItemUpdate,
    parse_cents,
};

use super::RecordStore;

/// Repository owning the expense/item data model and its invariants.
///
/// Every full-expense write (create, update, delete) goes through one atomic
/// batch, and the denormalized `total_amount` is recomputed from the item
/// list on every such write, so it can never drift through this path.
pub struct LedgerRepository {
    store: RecordStore,
}

impl LedgerRepository {
    /// Build a repository over an explicitly constructed store handle.
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Parse every draft price up front. One bad amount aborts the whole
    /// operation before any record is written.
    fn priced_items(items: &[ItemDraft]) -> Result<Vec<(&str, Cents)>, AppError> {
        items
            .iter()
            .map(|draft| {
                let price = parse_cents(&draft.price)
                    .map_err(|_| AppError::InvalidAmount(draft.price.clone()))?;
                Ok((draft.name.as_str(), price))
            })
            .collect()
    }

    // ========================
    // Expense operations (atomic)
    // ========================

    /// Create an expense and all of its items in a single commit. Returns
    /// the expense record only; callers fetch items separately if needed.
    pub async fn create_expense(
        &self,
        owner_id: &str,
        date: NaiveDate,
        items: &[ItemDraft],
    ) -> Result<Expense, AppError> {
        let priced = Self::priced_items(items)?;
        let total: Cents = priced.iter().map(|(_, price)| *price).sum();

        let expense = Expense::new(owner_id, date, total);

        let mut batch = self.store.begin_batch().await?;
        batch.put_expense(&expense).await?;
        for (name, price) in priced {
            batch.put_item(&ExpenseItem::new(expense.id, name, price)).await?;
        }
        batch.commit().await?;

        Ok(expense)
    }

    /// All of an owner's expenses, newest date first, each enriched with its
    /// items. One item query per expense: fine at single-user volumes; batch
    /// the fetch over expense ids if this ever needs to scale.
    pub async fn get_user_expenses(
        &self,
        owner_id: &str,
    ) -> Result<Vec<ExpenseWithItems>, AppError> {
        let expenses = self.store.expenses_by_owner(owner_id).await?;

        let mut enriched = Vec::with_capacity(expenses.len());
        for expense in expenses {
            let items = self.store.items_for_expense(expense.id).await?;
            enriched.push(ExpenseWithItems { expense, items });
        }
        Ok(enriched)
    }

    pub async fn get_expense_with_items(
        &self,
        id: ExpenseId,
    ) -> Result<ExpenseWithItems, AppError> {
        let expense = self
            .store
            .get_expense(id)
            .await?
            .ok_or(AppError::ExpenseNotFound(id))?;
        let items = self.store.items_for_expense(id).await?;
        Ok(ExpenseWithItems { expense, items })
    }

    /// Replace an expense's date and entire item set in a single commit.
    ///
    /// Full replace rather than a diff: dropping every old item and
    /// reinserting keeps the stored total trivially equal to the item sum,
    /// whatever changed. Old item ids do not survive the edit.
    pub async fn update_expense(
        &self,
        id: ExpenseId,
        date: NaiveDate,
        items: &[ItemDraft],
    ) -> Result<Expense, AppError> {
        let priced = Self::priced_items(items)?;
        let total: Cents = priced.iter().map(|(_, price)| *price).sum();

        let current = self
            .store
            .get_expense(id)
            .await?
            .ok_or(AppError::ExpenseNotFound(id))?;
        let old_items = self.store.items_for_expense(id).await?;

        let updated = current.with_revision(date, total);

        let mut batch = self.store.begin_batch().await?;
        batch.update_expense(&updated).await?;
        for old in &old_items {
            batch.delete_item(old.id).await?;
        }
        for (name, price) in priced {
            batch.put_item(&ExpenseItem::new(id, name, price)).await?;
        }
        batch.commit().await?;

        Ok(updated)
    }

    /// Delete an expense and every one of its items in a single commit.
    /// Deleting an id that no longer exists is treated as success.
    pub async fn delete_expense(&self, id: ExpenseId) -> Result<bool, AppError> {
        let items = self.store.items_for_expense(id).await?;

        let mut batch = self.store.begin_batch().await?;
        for item in &items {
            batch.delete_item(item.id).await?;
        }
        batch.delete_expense(id).await?;
        batch.commit().await?;

        Ok(true)
    }

    /// Ascending date-range query consumed by the summary folds. Reads only
    /// expense records, never items: the denormalized total is the source.
    pub async fn expenses_in_range(
        &self,
        owner_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Expense>, AppError> {
        Ok(self.store.expenses_in_range(owner_id, from, to).await?)
    }

    // ========================
    // Standalone item operations (not atomic with siblings)
    // ========================

    /// Insert a single item outside any batch. Does not touch the parent's
    /// `total_amount`; callers on this path own total consistency.
    pub async fn add_item(
        &self,
        expense_id: ExpenseId,
        name: &str,
        price: &str,
    ) -> Result<ExpenseItem, AppError> {
        let price = parse_cents(price).map_err(|_| AppError::InvalidAmount(price.to_string()))?;
        let item = ExpenseItem::new(expense_id, name, price);
        self.store.insert_item(&item).await?;
        Ok(item)
    }

    /// Partial update of a single item: only supplied fields change. Same
    /// total-consistency caveat as `add_item`.
    pub async fn update_item(
        &self,
        id: ItemId,
        update: ItemUpdate,
    ) -> Result<ExpenseItem, AppError> {
        let mut item = self
            .store
            .get_item(id)
            .await?
            .ok_or(AppError::ItemNotFound(id))?;

        if let Some(name) = update.name {
            item.name = name.trim().to_string();
        }
        if let Some(price) = update.price {
            item.price = parse_cents(&price).map_err(|_| AppError::InvalidAmount(price.clone()))?;
        }
        item.updated_at = Utc::now();

        self.store.update_item(&item).await?;
        Ok(item)
    }

    pub async fn delete_item(&self, id: ItemId) -> Result<bool, AppError> {
        self.store.delete_item(id).await?;
        Ok(true)
    }
}

use chrono::NaiveDate;

use crate::domain::{
    Cents, Expense, ExpenseId, ExpenseItem, ExpenseWithItems, ItemDraft, ItemId, ItemUpdate,
    parse_cents,
};
use crate::storage::{LedgerRepository, RecordStore};

use super::AppError;
use super::aggregation::{AnnualTotal, fold_annual, fold_monthly};

/// Application service providing high-level expense operations.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
///
/// Besides delegation it carries the caller-facing validation layer: at
/// least one item per expense, non-empty trimmed names, strictly positive
/// prices. The repository below only rejects prices that fail to parse.
pub struct ExpenseService {
    repo: LedgerRepository,
}

impl ExpenseService {
    /// Create a new service with the given repository.
    pub fn new(repo: LedgerRepository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let store = RecordStore::init(&db_url).await?;
        Ok(Self::new(LedgerRepository::new(store)))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let store = RecordStore::connect(&db_url).await?;
        Ok(Self::new(LedgerRepository::new(store)))
    }

    fn validate_items(items: &[ItemDraft]) -> Result<(), AppError> {
        if items.is_empty() {
            return Err(AppError::NoItems);
        }
        for draft in items {
            Self::validate_name(&draft.name)?;
            Self::validate_price(&draft.price)?;
        }
        Ok(())
    }

    fn validate_name(name: &str) -> Result<(), AppError> {
        if name.trim().is_empty() {
            return Err(AppError::EmptyItemName);
        }
        Ok(())
    }

    fn validate_price(price: &str) -> Result<(), AppError> {
        let cents =
            parse_cents(price).map_err(|_| AppError::InvalidAmount(price.to_string()))?;
        if cents <= 0 {
            return Err(AppError::InvalidAmount(price.to_string()));
        }
        Ok(())
    }

    // ========================
    // Expense operations
    // ========================

    pub async fn create_expense(
        &self,
        owner_id: &str,
        date: NaiveDate,
        items: &[ItemDraft],
    ) -> Result<Expense, AppError> {
        Self::validate_items(items)?;
        self.repo.create_expense(owner_id, date, items).await
    }

    /// All of an owner's expenses with their items, newest first.
    pub async fn list_expenses(&self, owner_id: &str) -> Result<Vec<ExpenseWithItems>, AppError> {
        self.repo.get_user_expenses(owner_id).await
    }

    pub async fn get_expense(&self, id: ExpenseId) -> Result<ExpenseWithItems, AppError> {
        self.repo.get_expense_with_items(id).await
    }

    pub async fn update_expense(
        &self,
        id: ExpenseId,
        date: NaiveDate,
        items: &[ItemDraft],
    ) -> Result<Expense, AppError> {
        Self::validate_items(items)?;
        self.repo.update_expense(id, date, items).await
    }

    pub async fn delete_expense(&self, id: ExpenseId) -> Result<bool, AppError> {
        self.repo.delete_expense(id).await
    }

    // ========================
    // Standalone item operations
    // ========================

    pub async fn add_item(
        &self,
        expense_id: ExpenseId,
        name: &str,
        price: &str,
    ) -> Result<ExpenseItem, AppError> {
        Self::validate_name(name)?;
        Self::validate_price(price)?;
        self.repo.add_item(expense_id, name, price).await
    }

    pub async fn update_item(
        &self,
        id: ItemId,
        update: ItemUpdate,
    ) -> Result<ExpenseItem, AppError> {
        if let Some(name) = &update.name {
            Self::validate_name(name)?;
        }
        if let Some(price) = &update.price {
            Self::validate_price(price)?;
        }
        self.repo.update_item(id, update).await
    }

    pub async fn delete_item(&self, id: ItemId) -> Result<bool, AppError> {
        self.repo.delete_item(id).await
    }

    // ========================
    // Summaries
    // ========================

    /// Spending per calendar month for one year, January first. Reads only
    /// the denormalized expense totals, which is why keeping those current
    /// on every write is load-bearing for every report built on top.
    pub async fn monthly_summary(
        &self,
        owner_id: &str,
        year: i32,
    ) -> Result<[Cents; 12], AppError> {
        let (from, to) = year_bounds(year)?;
        let expenses = self.repo.expenses_in_range(owner_id, from, to).await?;
        Ok(fold_monthly(&expenses, year))
    }

    /// Spending per calendar year over `[start_year, end_year]` inclusive.
    /// A start year past the end year yields an empty summary, not an error.
    pub async fn annual_summary(
        &self,
        owner_id: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<AnnualTotal>, AppError> {
        if start_year > end_year {
            return Ok(Vec::new());
        }
        let (from, _) = year_bounds(start_year)?;
        let (_, to) = year_bounds(end_year)?;
        let expenses = self.repo.expenses_in_range(owner_id, from, to).await?;
        Ok(fold_annual(&expenses, start_year, end_year))
    }
}

/// Inclusive `[Jan 1, Dec 31]` bounds for a year's date-range query.
fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate), AppError> {
    let from = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| AppError::InvalidDate(format!("year {}", year)))?;
    let to = NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| AppError::InvalidDate(format!("year {}", year)))?;
    Ok((from, to))
}

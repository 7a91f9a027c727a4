use thiserror::Error;

use crate::domain::{ExpenseId, ItemId};
use crate::storage::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Expense not found: {0}")]
    ExpenseNotFound(ExpenseId),

    #[error("Expense item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("An expense needs at least one item")]
    NoItems,

    #[error("Item name cannot be empty")]
    EmptyItemName,

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

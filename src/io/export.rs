use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::ExpenseService;
use crate::domain::ExpenseWithItems;

/// Ledger snapshot for full export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub owner_id: String,
    pub expenses: Vec<ExpenseWithItems>,
}

/// Exporter for converting an owner's expenses to various formats
pub struct Exporter<'a> {
    service: &'a ExpenseService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a ExpenseService) -> Self {
        Self { service }
    }

    /// Export expenses to CSV format, one row per line item.
    pub async fn export_expenses_csv<W: Write>(
        &self,
        writer: W,
        owner_id: &str,
    ) -> Result<usize> {
        let expenses = self.service.list_expenses(owner_id).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record([
            "expense_id",
            "date",
            "total_amount_cents",
            "item_id",
            "item_name",
            "item_price_cents",
        ])?;

        let mut count = 0;
        for entry in &expenses {
            for item in &entry.items {
                csv_writer.write_record(&[
                    entry.expense.id.to_string(),
                    entry.expense.date.to_string(),
                    entry.expense.total_amount.to_string(),
                    item.id.to_string(),
                    item.name.clone(),
                    item.price.to_string(),
                ])?;
                count += 1;
            }
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export an owner's full ledger as a JSON snapshot
    pub async fn export_full_json<W: Write>(
        &self,
        mut writer: W,
        owner_id: &str,
    ) -> Result<LedgerSnapshot> {
        let expenses = self.service.list_expenses(owner_id).await?;

        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            owner_id: owner_id.to_string(),
            expenses,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}

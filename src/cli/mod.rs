use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::ExpenseService;
use crate::domain::{ExpenseId, ItemDraft, ItemId, ItemUpdate, format_cents};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Spesa - Personal Expense Tracker
#[derive(Parser)]
#[command(name = "spesa")]
#[command(about = "A local-first personal expense tracker")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "spesa.db")]
    pub database: String,

    /// Owner identity the commands act on
    #[arg(short, long, global = true, default_value = "default")]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Record a new expense with one or more items
    Add {
        /// Items as name=price pairs (e.g. "coffee=3.50")
        #[arg(required = true)]
        items: Vec<String>,

        /// Expense date (ISO 8601 format: YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List expenses with their items, newest first
    List,

    /// Show a single expense with its items
    Show {
        /// Expense ID
        id: String,
    },

    /// Replace an expense's date and item set
    Edit {
        /// Expense ID
        id: String,

        /// New items as name=price pairs (full replacement)
        #[arg(required = true)]
        items: Vec<String>,

        /// New expense date (YYYY-MM-DD, defaults to the stored one)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete an expense and all of its items
    Delete {
        /// Expense ID
        id: String,
    },

    /// Line item commands (standalone edits; the parent total is NOT
    /// recomputed on this path)
    #[command(subcommand)]
    Item(ItemCommands),

    /// Spending summaries
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export expenses to CSV or JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Add a single item to an existing expense
    Add {
        /// Expense ID the item belongs to
        expense_id: String,

        /// Item name
        name: String,

        /// Item price (e.g. "3.50")
        price: String,
    },

    /// Update a single item (only supplied fields change)
    Update {
        /// Item ID
        id: String,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New price
        #[arg(short, long)]
        price: Option<String>,
    },

    /// Remove a single item
    Rm {
        /// Item ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Monthly spending for one year, January through December
    Monthly {
        /// Calendar year (e.g. 2024)
        year: i32,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Annual spending over a year range
    Annual {
        /// First year of the range (inclusive)
        from: i32,

        /// Last year of the range (inclusive)
        to: i32,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                ExpenseService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Add { items, date } => {
                let service = ExpenseService::connect(&self.database).await?;
                let drafts = parse_item_specs(&items)?;
                let date = match date {
                    Some(date_str) => parse_date(&date_str)?,
                    None => Local::now().date_naive(),
                };

                let expense = service.create_expense(&self.user, date, &drafts).await?;
                println!(
                    "Recorded expense: {} on {} ({} item{}, id {})",
                    format_cents(expense.total_amount),
                    expense.date,
                    drafts.len(),
                    if drafts.len() == 1 { "" } else { "s" },
                    expense.id
                );
            }

            Commands::List => {
                let service = ExpenseService::connect(&self.database).await?;
                run_list_command(&service, &self.user).await?;
            }

            Commands::Show { id } => {
                let service = ExpenseService::connect(&self.database).await?;
                let expense_id = parse_expense_id(&id)?;
                run_show_command(&service, expense_id).await?;
            }

            Commands::Edit { id, items, date } => {
                let service = ExpenseService::connect(&self.database).await?;
                let expense_id = parse_expense_id(&id)?;
                let drafts = parse_item_specs(&items)?;

                let date = match date {
                    Some(date_str) => parse_date(&date_str)?,
                    None => service.get_expense(expense_id).await?.expense.date,
                };

                let expense = service.update_expense(expense_id, date, &drafts).await?;
                println!(
                    "Updated expense {}: {} on {}",
                    expense.id,
                    format_cents(expense.total_amount),
                    expense.date
                );
            }

            Commands::Delete { id } => {
                let service = ExpenseService::connect(&self.database).await?;
                let expense_id = parse_expense_id(&id)?;
                service.delete_expense(expense_id).await?;
                println!("Deleted expense: {}", expense_id);
            }

            Commands::Item(item_cmd) => {
                let service = ExpenseService::connect(&self.database).await?;
                run_item_command(&service, item_cmd).await?;
            }

            Commands::Report(report_cmd) => {
                let service = ExpenseService::connect(&self.database).await?;
                run_report_command(&service, &self.user, report_cmd).await?;
            }

            Commands::Export { output, format } => {
                let service = ExpenseService::connect(&self.database).await?;
                run_export_command(&service, &self.user, output.as_deref(), &format).await?;
            }
        }

        Ok(())
    }
}

async fn run_list_command(service: &ExpenseService, user: &str) -> Result<()> {
    let expenses = service.list_expenses(user).await?;
    if expenses.is_empty() {
        println!("No expenses found.");
        return Ok(());
    }

    println!("{:<36} {:<12} {:>10}  ITEMS", "ID", "DATE", "TOTAL");
    println!("{}", "-".repeat(70));
    for entry in expenses {
        let items = entry
            .items
            .iter()
            .map(|item| format!("{} {}", item.name, format_cents(item.price)))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<36} {:<12} {:>10}  {}",
            entry.expense.id,
            entry.expense.date.to_string(),
            format_cents(entry.expense.total_amount),
            items
        );
    }
    Ok(())
}

async fn run_show_command(service: &ExpenseService, id: ExpenseId) -> Result<()> {
    let entry = service.get_expense(id).await?;
    let expense = &entry.expense;

    println!("Expense: {}", expense.id);
    println!("  Owner:   {}", expense.owner_id);
    println!("  Date:    {}", expense.date);
    println!("  Total:   {}", format_cents(expense.total_amount));
    println!(
        "  Created: {}",
        expense.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "  Updated: {}",
        expense.updated_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!();
    println!("  Items:");
    for item in &entry.items {
        println!(
            "    {:<24} {:>10}  ({})",
            item.name,
            format_cents(item.price),
            item.id
        );
    }
    Ok(())
}

async fn run_item_command(service: &ExpenseService, cmd: ItemCommands) -> Result<()> {
    match cmd {
        ItemCommands::Add {
            expense_id,
            name,
            price,
        } => {
            let expense_id = parse_expense_id(&expense_id)?;
            let item = service.add_item(expense_id, &name, &price).await?;
            println!(
                "Added item: {} {} ({})",
                item.name,
                format_cents(item.price),
                item.id
            );
            eprintln!("Note: the parent expense total is not recomputed by item edits.");
        }

        ItemCommands::Update { id, name, price } => {
            let item_id = parse_item_id(&id)?;
            let item = service
                .update_item(item_id, ItemUpdate { name, price })
                .await?;
            println!("Updated item: {} {}", item.name, format_cents(item.price));
            eprintln!("Note: the parent expense total is not recomputed by item edits.");
        }

        ItemCommands::Rm { id } => {
            let item_id = parse_item_id(&id)?;
            service.delete_item(item_id).await?;
            println!("Removed item: {}", item_id);
            eprintln!("Note: the parent expense total is not recomputed by item edits.");
        }
    }
    Ok(())
}

async fn run_report_command(
    service: &ExpenseService,
    user: &str,
    cmd: ReportCommands,
) -> Result<()> {
    match cmd {
        ReportCommands::Monthly { year, format } => {
            let summary = service.monthly_summary(user, year).await?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
                _ => {
                    println!("Monthly spending for {}", year);
                    println!("{:<6} {:>12}", "MONTH", "TOTAL");
                    println!("{}", "-".repeat(19));
                    for (index, total) in summary.iter().enumerate() {
                        println!("{:<6} {:>12}", MONTH_NAMES[index], format_cents(*total));
                    }
                    println!("{}", "-".repeat(19));
                    println!(
                        "{:<6} {:>12}",
                        "Year",
                        format_cents(summary.iter().sum::<i64>())
                    );
                }
            }
        }

        ReportCommands::Annual { from, to, format } => {
            let summary = service.annual_summary(user, from, to).await?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
                _ => {
                    if summary.is_empty() {
                        println!("No years in range.");
                    } else {
                        println!("{:<6} {:>12}", "YEAR", "TOTAL");
                        println!("{}", "-".repeat(19));
                        for entry in &summary {
                            println!("{:<6} {:>12}", entry.year, format_cents(entry.total));
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &ExpenseService,
    user: &str,
    output: Option<&str>,
    format: &str,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match format {
        "json" => {
            let snapshot = exporter.export_full_json(writer, user).await?;
            if output.is_some() {
                eprintln!("Exported {} expenses", snapshot.expenses.len());
            }
        }
        "csv" => {
            let count = exporter.export_expenses_csv(writer, user).await?;
            if output.is_some() {
                eprintln!("Exported {} item rows", count);
            }
        }
        other => anyhow::bail!("Unknown export format '{}'. Use csv or json", other),
    }
    Ok(())
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", input))
}

fn parse_expense_id(input: &str) -> Result<ExpenseId> {
    Uuid::parse_str(input).context("Invalid expense ID format (expected UUID)")
}

fn parse_item_id(input: &str) -> Result<ItemId> {
    Uuid::parse_str(input).context("Invalid item ID format (expected UUID)")
}

/// Parse "name=price" pairs from the command line.
fn parse_item_specs(specs: &[String]) -> Result<Vec<ItemDraft>> {
    specs
        .iter()
        .map(|spec| {
            let (name, price) = spec
                .rsplit_once('=')
                .with_context(|| format!("Invalid item '{}'. Use name=price", spec))?;
            Ok(ItemDraft::new(name, price))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_specs() {
        let drafts =
            parse_item_specs(&["coffee=3.50".to_string(), "a=b=1.00".to_string()]).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].name, "coffee");
        assert_eq!(drafts[0].price, "3.50");
        // rsplit keeps '=' inside the name
        assert_eq!(drafts[1].name, "a=b");
        assert_eq!(drafts[1].price, "1.00");
    }

    #[test]
    fn test_parse_item_specs_rejects_missing_price() {
        assert!(parse_item_specs(&["coffee".to_string()]).is_err());
    }
}

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::domain::{Cents, Expense};

/// Total spending for one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualTotal {
    pub year: i32,
    pub total: Cents,
}

/// Fold per-expense totals into twelve calendar-month buckets, index 0 being
/// January. Expenses dated outside `year` are ignored.
pub fn fold_monthly(expenses: &[Expense], year: i32) -> [Cents; 12] {
    let mut buckets = [0; 12];
    for expense in expenses {
        if expense.date.year() == year {
            buckets[expense.date.month0() as usize] += expense.total_amount;
        }
    }
    buckets
}

/// Fold per-expense totals into one bucket per calendar year over
/// `[start_year, end_year]` inclusive, in order. A start year past the end
/// year is a degenerate range and yields no buckets.
pub fn fold_annual(expenses: &[Expense], start_year: i32, end_year: i32) -> Vec<AnnualTotal> {
    if start_year > end_year {
        return Vec::new();
    }

    let mut totals: Vec<AnnualTotal> = (start_year..=end_year)
        .map(|year| AnnualTotal { year, total: 0 })
        .collect();

    for expense in expenses {
        let year = expense.date.year();
        if (start_year..=end_year).contains(&year) {
            totals[(year - start_year) as usize].total += expense.total_amount;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn expense_on(date: &str, total: Cents) -> Expense {
        Expense::new(
            "tester",
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            total,
        )
    }

    #[test]
    fn test_fold_monthly_buckets_by_calendar_month() {
        let expenses = vec![
            expense_on("2024-01-15", 10000),
            expense_on("2024-01-20", 5000),
            expense_on("2024-03-01", 3000),
        ];

        let buckets = fold_monthly(&expenses, 2024);
        assert_eq!(buckets[0], 15000);
        assert_eq!(buckets[2], 3000);
        assert_eq!(buckets.iter().sum::<Cents>(), 18000);
    }

    #[test]
    fn test_fold_monthly_skips_other_years() {
        let expenses = vec![
            expense_on("2023-06-01", 9999),
            expense_on("2024-06-01", 100),
        ];

        let buckets = fold_monthly(&expenses, 2024);
        assert_eq!(buckets[5], 100);
    }

    #[test]
    fn test_fold_annual_fills_empty_years() {
        let expenses = vec![
            expense_on("2023-05-01", 20000),
            expense_on("2024-02-10", 7500),
        ];

        let totals = fold_annual(&expenses, 2022, 2024);
        assert_eq!(
            totals,
            vec![
                AnnualTotal { year: 2022, total: 0 },
                AnnualTotal { year: 2023, total: 20000 },
                AnnualTotal { year: 2024, total: 7500 },
            ]
        );
    }

    #[test]
    fn test_fold_annual_degenerate_range() {
        let expenses = vec![expense_on("2024-02-10", 7500)];
        assert!(fold_annual(&expenses, 2025, 2024).is_empty());
    }
}

mod common;

use anyhow::Result;
use common::{date, items, test_service};
use spesa::application::AnnualTotal;

#[tokio::test]
async fn test_monthly_summary_buckets_by_calendar_month() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service
        .create_expense("alice", date("2024-01-15"), &items(&[("a", "100")]))
        .await?;
    service
        .create_expense("alice", date("2024-01-20"), &items(&[("b", "50")]))
        .await?;
    service
        .create_expense("alice", date("2024-03-01"), &items(&[("c", "30")]))
        .await?;

    let summary = service.monthly_summary("alice", 2024).await?;
    assert_eq!(
        summary,
        [15000, 0, 3000, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    );

    Ok(())
}

#[tokio::test]
async fn test_monthly_summary_excludes_other_owners_and_years() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service
        .create_expense("alice", date("2024-06-10"), &items(&[("a", "10")]))
        .await?;
    service
        .create_expense("alice", date("2023-06-10"), &items(&[("b", "99")]))
        .await?;
    service
        .create_expense("bob", date("2024-06-10"), &items(&[("c", "42")]))
        .await?;

    let summary = service.monthly_summary("alice", 2024).await?;
    assert_eq!(summary[5], 1000);
    assert_eq!(summary.iter().sum::<i64>(), 1000);

    Ok(())
}

#[tokio::test]
async fn test_monthly_summary_range_is_inclusive() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service
        .create_expense("alice", date("2024-01-01"), &items(&[("first", "5")]))
        .await?;
    service
        .create_expense("alice", date("2024-12-31"), &items(&[("last", "7")]))
        .await?;

    let summary = service.monthly_summary("alice", 2024).await?;
    assert_eq!(summary[0], 500);
    assert_eq!(summary[11], 700);

    Ok(())
}

#[tokio::test]
async fn test_monthly_summary_with_no_data_is_all_zero() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let summary = service.monthly_summary("alice", 2024).await?;
    assert_eq!(summary, [0; 12]);

    Ok(())
}

#[tokio::test]
async fn test_annual_summary_covers_range_inclusive() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service
        .create_expense("alice", date("2023-04-01"), &items(&[("a", "120")]))
        .await?;
    service
        .create_expense("alice", date("2023-09-15"), &items(&[("b", "80")]))
        .await?;
    service
        .create_expense("alice", date("2024-02-01"), &items(&[("c", "75")]))
        .await?;

    let summary = service.annual_summary("alice", 2022, 2024).await?;
    assert_eq!(
        summary,
        vec![
            AnnualTotal { year: 2022, total: 0 },
            AnnualTotal { year: 2023, total: 20000 },
            AnnualTotal { year: 2024, total: 7500 },
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_annual_summary_degenerate_range_is_empty() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service
        .create_expense("alice", date("2024-02-01"), &items(&[("a", "75")]))
        .await?;

    let summary = service.annual_summary("alice", 2025, 2022).await?;
    assert!(summary.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_summary_reflects_updates_immediately() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let expense = service
        .create_expense("alice", date("2024-01-15"), &items(&[("a", "100")]))
        .await?;

    // No caching: a full update shows up in the next summary call
    service
        .update_expense(expense.id, date("2024-02-15"), &items(&[("a", "60")]))
        .await?;

    let summary = service.monthly_summary("alice", 2024).await?;
    assert_eq!(summary[0], 0);
    assert_eq!(summary[1], 6000);

    Ok(())
}

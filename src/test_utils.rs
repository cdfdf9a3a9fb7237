//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::settings::BudgetSettings,
    core::{budget, category, rules, transaction},
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a top-level test category with `sort_order` 0.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::category::Model> {
    category::create_category(db, name.to_string(), None, 0, false).await
}

/// Creates an active keyword rule.
pub async fn create_test_rule(
    db: &DatabaseConnection,
    category_id: i64,
    pattern: &str,
    priority: i32,
) -> Result<entities::categorization_rule::Model> {
    rules::create_rule(db, category_id, pattern.to_string(), priority).await
}

/// Creates an uncategorized test transaction.
///
/// # Defaults
/// * `user_id`: `"test_user"`
/// * `currency`: `"USD"`
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    description: &str,
    merchant: &str,
    amount: f64,
) -> Result<entities::transaction::Model> {
    transaction::create_transaction(
        db,
        "test_user".to_string(),
        description.to_string(),
        merchant.to_string(),
        amount,
        "USD".to_string(),
    )
    .await
}

/// Creates a test budget for October 2026.
///
/// # Defaults
/// * `user_id`: `"test_user"`
/// * `total_amount`: 2000.0
/// * `currency`: `"USD"`
pub async fn create_test_budget(db: &DatabaseConnection) -> Result<entities::budget::Model> {
    budget::create_budget(
        db,
        "test_user".to_string(),
        "October 2026".to_string(),
        NaiveDate::from_ymd_opt(2026, 10, 1).unwrap_or_default(),
        NaiveDate::from_ymd_opt(2026, 10, 31).unwrap_or_default(),
        2000.0,
        "usd".to_string(),
    )
    .await
}

/// Sets up a database with one category named "Food".
/// Returns (db, category) for common test scenarios.
pub async fn setup_with_category() -> Result<(DatabaseConnection, entities::category::Model)> {
    let db = setup_test_db().await?;
    let category = create_test_category(&db, "Food").await?;
    Ok((db, category))
}

/// Sets up a budget with a single "Food" allocation using the default alert threshold.
/// Returns (db, budget, allocation).
pub async fn setup_with_allocation(
    allocated_amount: f64,
) -> Result<(
    DatabaseConnection,
    entities::budget::Model,
    entities::budget_category::Model,
)> {
    let (db, category) = setup_with_category().await?;
    let budget = create_test_budget(&db).await?;
    let allocation = budget::add_allocation(
        &db,
        &BudgetSettings::default(),
        budget.id,
        category.id,
        allocated_amount,
        None,
    )
    .await?;
    Ok((db, budget, allocation))
}

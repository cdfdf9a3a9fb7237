//! Budget and allocation business logic.
//!
//! A budget owns one allocation per category. The allocation's `spent_amount` is a
//! running total kept up to date by the transaction flow, either with an absolute
//! [`set_spent_amount`] or with the atomic [`adjust_spent_amount`].

use crate::{
    config::settings::BudgetSettings,
    entities::{Budget, BudgetCategory, budget, budget_category},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, SqlErr, prelude::*};
use tracing::{debug, info};

/// Creates a new active budget.
///
/// The name must not be empty, `period_start` must not be after `period_end`, and the
/// total must be finite and non-negative.
pub async fn create_budget(
    db: &DatabaseConnection,
    user_id: String,
    name: String,
    period_start: NaiveDate,
    period_end: NaiveDate,
    total_amount: f64,
    currency: String,
) -> Result<budget::Model> {
    if name.trim().is_empty() {
        return Err(Error::invalid("Budget name cannot be empty"));
    }

    if period_start > period_end {
        return Err(Error::invalid(format!(
            "Budget period starts after it ends ({period_start} > {period_end})"
        )));
    }

    if !total_amount.is_finite() || total_amount < 0.0 {
        return Err(Error::InvalidAmount {
            amount: total_amount,
        });
    }

    let budget = budget::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.trim().to_string()),
        period_start: Set(period_start),
        period_end: Set(period_end),
        total_amount: Set(total_amount),
        currency: Set(currency.trim().to_uppercase()),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = budget.insert(db).await?;
    info!("Created budget {} '{}' for {}", result.id, result.name, result.user_id);
    Ok(result)
}

/// Finds a budget by its unique ID.
pub async fn get_budget_by_id(
    db: &DatabaseConnection,
    budget_id: i64,
) -> Result<Option<budget::Model>> {
    Budget::find_by_id(budget_id).one(db).await.map_err(Into::into)
}

/// Retrieves a user's active budgets, most recent period first.
pub async fn get_active_budgets_for_user(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<budget::Model>> {
    Budget::find()
        .filter(budget::Column::UserId.eq(user_id))
        .filter(budget::Column::IsActive.eq(true))
        .order_by_desc(budget::Column::PeriodStart)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Marks a budget inactive. Its allocations are kept.
pub async fn deactivate_budget(db: &DatabaseConnection, budget_id: i64) -> Result<budget::Model> {
    let budget = get_budget_by_id(db, budget_id)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?;

    let mut active: budget::ActiveModel = budget.into();
    active.is_active = Set(false);
    active.update(db).await.map_err(Into::into)
}

fn validate_allocation(allocated_amount: f64, alert_threshold: f64) -> Result<()> {
    if !allocated_amount.is_finite() || allocated_amount <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: allocated_amount,
        });
    }

    if !(alert_threshold > 0.0 && alert_threshold <= 1.0) {
        return Err(Error::invalid(format!(
            "Alert threshold must be within (0, 1], got {alert_threshold}"
        )));
    }

    Ok(())
}

/// Adds a category allocation to a budget with zero spent.
///
/// `alert_threshold` defaults to `settings.default_alert_threshold`. Each category may
/// appear at most once per budget; the unique index on the pair also rejects a
/// concurrent duplicate that slips past the lookup.
pub async fn add_allocation(
    db: &DatabaseConnection,
    settings: &BudgetSettings,
    budget_id: i64,
    category_id: i64,
    allocated_amount: f64,
    alert_threshold: Option<f64>,
) -> Result<budget_category::Model> {
    let alert_threshold = alert_threshold.unwrap_or(settings.default_alert_threshold);
    validate_allocation(allocated_amount, alert_threshold)?;

    get_budget_by_id(db, budget_id)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?;
    crate::core::category::get_category_by_id(db, category_id)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;

    let duplicate = || {
        Error::invalid(format!(
            "Budget {budget_id} already has an allocation for category {category_id}"
        ))
    };
    if get_allocation(db, budget_id, category_id).await?.is_some() {
        return Err(duplicate());
    }

    let now = chrono::Utc::now();
    let allocation = budget_category::ActiveModel {
        budget_id: Set(budget_id),
        category_id: Set(category_id),
        allocated_amount: Set(allocated_amount),
        spent_amount: Set(0.0),
        alert_threshold: Set(alert_threshold),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    allocation.insert(db).await.map_err(|err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => duplicate(),
        _ => err.into(),
    })
}

/// Changes the allocated amount and alert threshold of an existing allocation.
pub async fn update_allocation_limits(
    db: &DatabaseConnection,
    budget_id: i64,
    category_id: i64,
    allocated_amount: f64,
    alert_threshold: f64,
) -> Result<budget_category::Model> {
    validate_allocation(allocated_amount, alert_threshold)?;
    let allocation = require_allocation(db, budget_id, category_id).await?;

    let mut active: budget_category::ActiveModel = allocation.into();
    active.allocated_amount = Set(allocated_amount);
    active.alert_threshold = Set(alert_threshold);
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Retrieves a budget's allocations in the order they were added.
pub async fn get_allocations<C>(db: &C, budget_id: i64) -> Result<Vec<budget_category::Model>>
where
    C: ConnectionTrait,
{
    BudgetCategory::find()
        .filter(budget_category::Column::BudgetId.eq(budget_id))
        .order_by_asc(budget_category::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds the allocation for a budget/category pair.
pub async fn get_allocation<C>(
    db: &C,
    budget_id: i64,
    category_id: i64,
) -> Result<Option<budget_category::Model>>
where
    C: ConnectionTrait,
{
    BudgetCategory::find()
        .filter(budget_category::Column::BudgetId.eq(budget_id))
        .filter(budget_category::Column::CategoryId.eq(category_id))
        .one(db)
        .await
        .map_err(Into::into)
}

async fn require_allocation<C>(
    db: &C,
    budget_id: i64,
    category_id: i64,
) -> Result<budget_category::Model>
where
    C: ConnectionTrait,
{
    get_allocation(db, budget_id, category_id)
        .await?
        .ok_or(Error::AllocationNotFound {
            budget_id,
            category_id,
        })
}

/// Sets an allocation's spent amount to `amount`.
///
/// This replaces the running total; callers compute it. Two concurrent callers will
/// race (last writer wins), use [`adjust_spent_amount`] when posting individual
/// transactions.
pub async fn set_spent_amount(
    db: &DatabaseConnection,
    budget_id: i64,
    category_id: i64,
    amount: f64,
) -> Result<budget_category::Model> {
    if !amount.is_finite() {
        return Err(Error::InvalidAmount { amount });
    }

    let allocation = require_allocation(db, budget_id, category_id).await?;

    let mut active: budget_category::ActiveModel = allocation.into();
    active.spent_amount = Set(amount);
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(db).await?;
    debug!(
        "Budget {budget_id} category {category_id} spent set to {:.2}",
        updated.spent_amount
    );
    Ok(updated)
}

/// Adds `delta` to an allocation's spent amount in a single UPDATE statement.
///
/// Using `spent_amount = spent_amount + delta` at the database level avoids the lost
/// updates a read-modify-write would suffer. Use a negative delta for refunds.
pub async fn adjust_spent_amount<C>(
    db: &C,
    budget_id: i64,
    category_id: i64,
    delta: f64,
) -> Result<budget_category::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    if !delta.is_finite() {
        return Err(Error::InvalidAmount { amount: delta });
    }

    let result = BudgetCategory::update_many()
        .col_expr(
            budget_category::Column::SpentAmount,
            Expr::col(budget_category::Column::SpentAmount).add(delta),
        )
        .col_expr(
            budget_category::Column::UpdatedAt,
            Expr::value(chrono::Utc::now()),
        )
        .filter(budget_category::Column::BudgetId.eq(budget_id))
        .filter(budget_category::Column::CategoryId.eq(category_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::AllocationNotFound {
            budget_id,
            category_id,
        });
    }

    require_allocation(db, budget_id, category_id).await
}

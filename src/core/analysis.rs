//! Budget spend analysis.
//!
//! This module turns a budget's allocations into summary totals and tiered alerts.
//! Everything except [`get_budget_summary`] is pure and reads `spent_amount` as
//! given; nothing here recomputes spending from transactions or writes to storage.
//!
//! Each allocation with a positive allocated amount is classified by its spend ratio:
//! - `ratio >= 1.0` raises `over_budget`
//! - otherwise `ratio >= alert_threshold` raises `warning`
//! - otherwise `ratio >= critical_threshold` (0.90 by default) raises `critical`
//!
//! The checks run in that order, so an allocation whose own threshold sits below
//! 0.90 reports `warning` rather than `critical` once it crosses that threshold.

use crate::{
    config::settings::BudgetSettings,
    entities::budget_category,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Alert tier derived from an allocation's spend ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// Spend reached the allocation's own alert threshold
    Warning,
    /// Spend reached the fixed critical threshold
    Critical,
    /// Spend reached or exceeded the allocated amount
    OverBudget,
}

impl AlertType {
    /// Stable string form used in API payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::OverBudget => "over_budget",
        }
    }

    /// Rank used by [`sort_by_severity`], higher is more severe.
    #[must_use]
    pub const fn severity(self) -> u8 {
        match self {
            Self::Warning => 1,
            Self::Critical => 2,
            Self::OverBudget => 3,
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One alert for one allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetAlert {
    /// Category the allocation budgets
    pub category_id: i64,
    /// Amount budgeted
    pub allocated_amount: f64,
    /// Amount spent so far
    pub spent_amount: f64,
    /// The allocation's configured alert threshold
    pub threshold: f64,
    /// Alert tier
    pub alert_type: AlertType,
    /// Human-readable description
    pub message: String,
}

/// Totals and alerts for a whole budget. Recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    /// Sum of allocated amounts
    pub total_allocated: f64,
    /// Sum of spent amounts
    pub total_spent: f64,
    /// `total_allocated - total_spent`, negative when overspent
    pub remaining_amount: f64,
    /// `total_spent / total_allocated * 100`, or 0 when nothing is allocated
    pub spending_progress: f64,
    /// Alerts in allocation order
    pub alerts: Vec<BudgetAlert>,
}

/// Calculates spending progress as a percentage of the allocation.
///
/// Returns 0 when nothing is allocated rather than dividing by zero.
#[must_use]
pub fn calculate_progress(spent: f64, allocated: f64) -> f64 {
    if allocated <= 0.0 {
        return 0.0;
    }

    (spent / allocated) * 100.0
}

/// Classifies a single allocation, returning `None` when no alert is due.
///
/// Allocations with `allocated_amount <= 0` never alert.
#[must_use]
pub fn classify(
    allocation: &budget_category::Model,
    critical_threshold: f64,
) -> Option<BudgetAlert> {
    let allocated = allocation.allocated_amount;
    if allocated <= 0.0 {
        return None;
    }

    let spent = allocation.spent_amount;
    let ratio = spent / allocated;
    let percent = ratio * 100.0;

    let (alert_type, message) = if ratio >= 1.0 {
        (
            AlertType::OverBudget,
            format!("Over budget by {:.2}", spent - allocated),
        )
    } else if ratio >= allocation.alert_threshold {
        (
            AlertType::Warning,
            format!("Approaching budget limit: {percent:.1}% used"),
        )
    } else if ratio >= critical_threshold {
        (
            AlertType::Critical,
            format!("Critical: {percent:.1}% used"),
        )
    } else {
        return None;
    };

    Some(BudgetAlert {
        category_id: allocation.category_id,
        allocated_amount: allocated,
        spent_amount: spent,
        threshold: allocation.alert_threshold,
        alert_type,
        message,
    })
}

/// Summarizes a budget from its allocations.
///
/// Every allocation contributes to the totals, including those with nothing
/// allocated. Alerts keep the order of `allocations`; see [`sort_by_severity`] for
/// callers that want the most severe first.
#[must_use]
pub fn summarize(allocations: &[budget_category::Model], settings: &BudgetSettings) -> BudgetSummary {
    let total_allocated: f64 = allocations.iter().map(|a| a.allocated_amount).sum();
    let total_spent: f64 = allocations.iter().map(|a| a.spent_amount).sum();

    let alerts: Vec<BudgetAlert> = allocations
        .iter()
        .filter_map(|a| classify(a, settings.critical_threshold))
        .collect();

    BudgetSummary {
        total_allocated,
        total_spent,
        remaining_amount: total_allocated - total_spent,
        spending_progress: calculate_progress(total_spent, total_allocated),
        alerts,
    }
}

/// Orders alerts most severe first. Alerts of the same tier keep their relative order.
pub fn sort_by_severity(alerts: &mut [BudgetAlert]) {
    alerts.sort_by(|a, b| b.alert_type.severity().cmp(&a.alert_type.severity()));
}

/// Loads a budget's allocations and summarizes them.
///
/// # Errors
/// [`Error::BudgetNotFound`] if `budget_id` does not exist.
pub async fn get_budget_summary(
    db: &DatabaseConnection,
    settings: &BudgetSettings,
    budget_id: i64,
) -> Result<BudgetSummary> {
    crate::core::budget::get_budget_by_id(db, budget_id)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?;

    let allocations = crate::core::budget::get_allocations(db, budget_id).await?;
    let summary = summarize(&allocations, settings);

    debug!(
        "Budget {budget_id}: {:.2} of {:.2} spent ({:.1}%), {} alerts",
        summary.total_spent,
        summary.total_allocated,
        summary.spending_progress,
        summary.alerts.len()
    );
    Ok(summary)
}

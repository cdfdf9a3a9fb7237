//! Categorization rule management.
//!
//! Rules are created, listed, updated and deleted here and nowhere else; the
//! categorization engine only reads them. Changing or deleting a rule does not
//! touch transactions that were already categorized.

use crate::{
    entities::{CategorizationRule, PatternType, categorization_rule},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Select, Set, prelude::*};
use tracing::info;

/// One page of rules from [`list_rules`].
#[derive(Debug, Clone)]
pub struct RulePage {
    /// Rules on this page, in evaluation order
    pub rules: Vec<categorization_rule::Model>,
    /// Zero-based page index
    pub page: u64,
    /// Page size that was requested
    pub per_page: u64,
    /// Total number of rules across all pages
    pub total: u64,
}

/// Fields to change on an existing rule. `None` leaves the field as it is.
#[derive(Debug, Clone, Default)]
pub struct RuleUpdate {
    /// New target category
    pub category_id: Option<i64>,
    /// New keyword
    pub pattern: Option<String>,
    /// New priority
    pub priority: Option<i32>,
    /// Enable or disable the rule
    pub is_active: Option<bool>,
}

/// Rules in evaluation order: priority descending, then creation time, then id.
fn ordered() -> Select<CategorizationRule> {
    CategorizationRule::find()
        .order_by_desc(categorization_rule::Column::Priority)
        .order_by_asc(categorization_rule::Column::CreatedAt)
        .order_by_asc(categorization_rule::Column::Id)
}

fn validate_pattern(pattern: &str) -> Result<String> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid("Rule pattern cannot be empty"));
    }
    Ok(trimmed.to_string())
}

async fn ensure_category_exists(db: &DatabaseConnection, category_id: i64) -> Result<()> {
    crate::core::category::get_category_by_id(db, category_id)
        .await?
        .map(|_| ())
        .ok_or(Error::CategoryNotFound { id: category_id })
}

/// Creates an active keyword rule targeting `category_id`.
///
/// The pattern is trimmed and must not be empty, and the category must exist.
pub async fn create_rule(
    db: &DatabaseConnection,
    category_id: i64,
    pattern: String,
    priority: i32,
) -> Result<categorization_rule::Model> {
    let pattern = validate_pattern(&pattern)?;
    ensure_category_exists(db, category_id).await?;

    let now = chrono::Utc::now();
    let rule = categorization_rule::ActiveModel {
        category_id: Set(category_id),
        pattern: Set(pattern),
        pattern_type: Set(PatternType::Keyword),
        priority: Set(priority),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = rule.insert(db).await?;
    info!(
        "Created rule {} '{}' -> category {} (priority {})",
        result.id, result.pattern, result.category_id, result.priority
    );
    Ok(result)
}

/// Finds a rule by its unique ID.
pub async fn get_rule_by_id(
    db: &DatabaseConnection,
    rule_id: i64,
) -> Result<Option<categorization_rule::Model>> {
    CategorizationRule::find_by_id(rule_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists every rule, active or not, one page at a time.
///
/// `page` is zero-based. An out-of-range page yields an empty `rules` list.
pub async fn list_rules(db: &DatabaseConnection, page: u64, per_page: u64) -> Result<RulePage> {
    if per_page == 0 {
        return Err(Error::invalid("Page size must be greater than zero"));
    }

    let paginator = ordered().paginate(db, per_page);
    let total = paginator.num_items().await?;
    let rules = paginator.fetch_page(page).await?;

    Ok(RulePage {
        rules,
        page,
        per_page,
        total,
    })
}

/// Every rule, active or not, in evaluation order.
pub async fn get_all_rules(db: &DatabaseConnection) -> Result<Vec<categorization_rule::Model>> {
    ordered().all(db).await.map_err(Into::into)
}

/// Active rules in evaluation order, as consumed by the categorization engine.
pub async fn get_active_rules(db: &DatabaseConnection) -> Result<Vec<categorization_rule::Model>> {
    ordered()
        .filter(categorization_rule::Column::IsActive.eq(true))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies `update` to an existing rule.
///
/// The same validation as [`create_rule`] applies to the fields being changed.
pub async fn update_rule(
    db: &DatabaseConnection,
    rule_id: i64,
    update: RuleUpdate,
) -> Result<categorization_rule::Model> {
    let rule = get_rule_by_id(db, rule_id)
        .await?
        .ok_or(Error::RuleNotFound { id: rule_id })?;

    let mut active: categorization_rule::ActiveModel = rule.into();

    if let Some(pattern) = update.pattern {
        active.pattern = Set(validate_pattern(&pattern)?);
    }
    if let Some(category_id) = update.category_id {
        ensure_category_exists(db, category_id).await?;
        active.category_id = Set(category_id);
    }
    if let Some(priority) = update.priority {
        active.priority = Set(priority);
    }
    if let Some(is_active) = update.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Deletes a rule. Transactions it categorized keep their category.
pub async fn delete_rule(db: &DatabaseConnection, rule_id: i64) -> Result<()> {
    let result = CategorizationRule::delete_by_id(rule_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::RuleNotFound { id: rule_id });
    }
    info!("Deleted rule {rule_id}");
    Ok(())
}

//! Transaction categorization engine.
//!
//! A transaction is matched against the active keyword rules in priority order
//! (higher priority first, equal priorities in the order the rules were supplied).
//! The first matching rule decides the category. When no rule matches, the engine
//! looks at already categorized transactions with similar text and adopts their most
//! frequent category at a lower confidence. When nothing is similar either, the result
//! carries no category and source `none`; that is a valid outcome, not an error.
//!
//! The engine never writes. Persisting a result is the caller's job, see
//! [`crate::core::transaction::apply_categorization`].

use crate::{
    config::settings::CategorizationSettings,
    entities::{CategorizationSource, categorization_rule, category, transaction},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::debug;

/// Descriptive fields of the transaction being categorized.
#[derive(Debug, Clone, Copy)]
pub struct CategorizationInput<'a> {
    /// Statement description
    pub description: &'a str,
    /// Merchant name, may be empty
    pub merchant: &'a str,
    /// Transaction amount
    pub amount: f64,
}

impl<'a> CategorizationInput<'a> {
    /// Builds the input from a stored transaction.
    #[must_use]
    pub fn from_transaction(transaction: &'a transaction::Model) -> Self {
        Self {
            description: &transaction.description,
            merchant: &transaction.merchant,
            amount: transaction.amount,
        }
    }

    /// Texts used to search for similar transactions: the merchant, then the
    /// description, skipping empty and repeated (case-insensitive) values.
    #[must_use]
    pub fn similarity_keys(&self) -> Vec<&'a str> {
        let mut keys: Vec<&'a str> = Vec::with_capacity(2);
        for text in [self.merchant.trim(), self.description.trim()] {
            if !text.is_empty() && !keys.iter().any(|key| key.eq_ignore_ascii_case(text)) {
                keys.push(text);
            }
        }
        keys
    }
}

/// Outcome of a single categorization call. Produced fresh each time, never stored as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizationResult {
    /// Assigned category, None when nothing matched
    pub category_id: Option<i64>,
    /// Name of the assigned category
    pub category_name: Option<String>,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    /// How the category was found
    pub source: CategorizationSource,
}

impl CategorizationResult {
    /// Result for a transaction nothing could be matched to.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            category_id: None,
            category_name: None,
            confidence: 0.0,
            source: CategorizationSource::NoMatch,
        }
    }

    fn assigned(category: category::Model, confidence: f64, source: CategorizationSource) -> Self {
        Self {
            category_id: Some(category.id),
            category_name: Some(category.name),
            confidence,
            source,
        }
    }
}

/// Storage collaborator consumed by [`categorize`].
///
/// Rules are process-wide today. Scoping them per owner only needs a different
/// implementation of this trait, not a different engine.
#[allow(async_fn_in_trait)]
pub trait CategorizationStore {
    /// Active rules, ordered by priority descending then creation order.
    async fn list_active_rules(&self) -> Result<Vec<categorization_rule::Model>>;

    /// Looks up a category by id.
    async fn get_category(&self, id: i64) -> Result<Option<category::Model>>;

    /// Categorized transactions whose description or merchant overlaps `text`, either
    /// containing it or contained in it.
    async fn find_similar_transactions(
        &self,
        text: &str,
        limit: u64,
    ) -> Result<Vec<transaction::Model>>;
}

/// [`CategorizationStore`] backed by the application database.
#[derive(Debug, Clone, Copy)]
pub struct DbCategorizationStore<'a> {
    db: &'a DatabaseConnection,
    exclude_transaction_id: Option<i64>,
}

impl<'a> DbCategorizationStore<'a> {
    /// Creates a store reading from `db`.
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self {
            db,
            exclude_transaction_id: None,
        }
    }

    /// Leaves the given transaction out of similarity searches, so a stored
    /// transaction being re-categorized does not vote for its own category.
    #[must_use]
    pub const fn excluding(self, transaction_id: i64) -> Self {
        Self {
            db: self.db,
            exclude_transaction_id: Some(transaction_id),
        }
    }
}

impl CategorizationStore for DbCategorizationStore<'_> {
    async fn list_active_rules(&self) -> Result<Vec<categorization_rule::Model>> {
        crate::core::rules::get_active_rules(self.db).await
    }

    async fn get_category(&self, id: i64) -> Result<Option<category::Model>> {
        crate::core::category::get_category_by_id(self.db, id).await
    }

    async fn find_similar_transactions(
        &self,
        text: &str,
        limit: u64,
    ) -> Result<Vec<transaction::Model>> {
        crate::core::transaction::find_similar_transactions(
            self.db,
            text,
            limit,
            self.exclude_transaction_id,
        )
        .await
    }
}

/// Rejects input that has nothing to match against.
pub fn validate_input(input: &CategorizationInput<'_>) -> Result<()> {
    if input.description.trim().is_empty() && input.merchant.trim().is_empty() {
        return Err(Error::invalid(
            "Transaction description and merchant cannot both be empty",
        ));
    }

    if !input.amount.is_finite() {
        return Err(Error::InvalidAmount {
            amount: input.amount,
        });
    }

    Ok(())
}

/// Active rules in evaluation order.
///
/// The sort is stable, so rules with equal priority keep the order they were supplied in.
#[must_use]
pub fn prioritized_rules(
    rules: &[categorization_rule::Model],
) -> Vec<&categorization_rule::Model> {
    let mut active: Vec<_> = rules.iter().filter(|rule| rule.is_active).collect();
    active.sort_by(|a, b| b.priority.cmp(&a.priority));
    active
}

/// Returns the first active rule, in evaluation order, whose pattern occurs in the
/// description or the merchant (case-insensitive).
#[must_use]
pub fn select_rule<'r>(
    rules: &'r [categorization_rule::Model],
    input: &CategorizationInput<'_>,
) -> Option<&'r categorization_rule::Model> {
    let description = input.description.to_lowercase();
    let merchant = input.merchant.to_lowercase();

    prioritized_rules(rules).into_iter().find(|rule| {
        let pattern = rule.pattern.trim().to_lowercase();
        rule.pattern_type.matches(&pattern, &description)
            || rule.pattern_type.matches(&pattern, &merchant)
    })
}

/// Most frequent category among `similar`, ignoring uncategorized entries.
///
/// Ties go to the category that appears first.
#[must_use]
pub fn dominant_category(similar: &[transaction::Model]) -> Option<i64> {
    let mut counts: Vec<(i64, usize)> = Vec::new();
    for category_id in similar.iter().filter_map(|t| t.category_id) {
        match counts.iter_mut().find(|(id, _)| *id == category_id) {
            Some((_, count)) => *count += 1,
            None => counts.push((category_id, 1)),
        }
    }

    counts
        .into_iter()
        .fold(None, |best: Option<(i64, usize)>, (id, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((id, count)),
        })
        .map(|(id, _)| id)
}

/// Categorizes one transaction.
///
/// # Errors
/// * [`Error::InvalidRequest`] when both description and merchant are empty
/// * [`Error::CategoryNotFound`] when the winning rule (or the dominant similar
///   category) points at a category that no longer exists
pub async fn categorize<S>(
    store: &S,
    settings: &CategorizationSettings,
    input: &CategorizationInput<'_>,
) -> Result<CategorizationResult>
where
    S: CategorizationStore,
{
    validate_input(input)?;

    let rules = store.list_active_rules().await?;
    if let Some(rule) = select_rule(&rules, input) {
        let category = store
            .get_category(rule.category_id)
            .await?
            .ok_or(Error::CategoryNotFound {
                id: rule.category_id,
            })?;
        debug!(
            "Rule {} ('{}', priority {}) matched, category '{}'",
            rule.id, rule.pattern, rule.priority, category.name
        );
        return Ok(CategorizationResult::assigned(
            category,
            settings.rule_confidence,
            CategorizationSource::Rule,
        ));
    }

    let keys = input.similarity_keys();
    let limit = usize::try_from(settings.similarity_limit).unwrap_or(usize::MAX);
    let mut similar: Vec<transaction::Model> = Vec::new();
    for key in &keys {
        if similar.len() >= limit {
            break;
        }
        for found in store
            .find_similar_transactions(key, settings.similarity_limit)
            .await?
        {
            if similar.len() < limit && !similar.iter().any(|t| t.id == found.id) {
                similar.push(found);
            }
        }
    }

    let Some(category_id) = dominant_category(&similar) else {
        debug!("No rule or similar transaction for {keys:?}");
        return Ok(CategorizationResult::none());
    };

    let category = store
        .get_category(category_id)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;
    debug!(
        "Similarity fallback for {keys:?} picked category '{}' from {} similar transactions",
        category.name,
        similar.len()
    );
    Ok(CategorizationResult::assigned(
        category,
        settings.similarity_confidence,
        CategorizationSource::Similarity,
    ))
}

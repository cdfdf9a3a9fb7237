//! Transaction business logic - Recording transactions and storing their categories.
//!
//! Transactions are created uncategorized. The categorization engine decides a
//! category; [`apply_categorization`] is the only function here that writes the
//! category, confidence and source fields, and [`categorize_and_store`] chains the
//! two for callers that want both steps.

use crate::{
    config::settings::CategorizationSettings,
    core::categorization::{
        CategorizationInput, CategorizationResult, DbCategorizationStore, categorize,
    },
    entities::{Transaction, transaction},
    errors::{Error, Result},
};
use sea_orm::{
    Condition, QueryOrder, QuerySelect, Set,
    prelude::*,
    sea_query::{Expr, LikeExpr},
};
use tracing::debug;

/// Records a new, uncategorized transaction.
///
/// At least one of `description` and `merchant` must be non-empty, the amount must be
/// finite and the currency a three-letter code. Text fields are trimmed and the
/// currency upper-cased.
pub async fn create_transaction(
    db: &DatabaseConnection,
    user_id: String,
    description: String,
    merchant: String,
    amount: f64,
    currency: String,
) -> Result<transaction::Model> {
    let description = description.trim().to_string();
    let merchant = merchant.trim().to_string();

    if description.is_empty() && merchant.is_empty() {
        return Err(Error::invalid(
            "Transaction description and merchant cannot both be empty",
        ));
    }

    if !amount.is_finite() {
        return Err(Error::InvalidAmount { amount });
    }

    let currency = currency.trim().to_uppercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::invalid(format!(
            "Currency must be a three-letter code, got '{currency}'"
        )));
    }

    let transaction_model = transaction::ActiveModel {
        user_id: Set(user_id),
        description: Set(description),
        merchant: Set(merchant),
        amount: Set(amount),
        currency: Set(currency),
        category_id: Set(None),
        categorization_confidence: Set(None),
        categorization_source: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    transaction_model.insert(db).await.map_err(Into::into)
}

/// Retrieves a specific transaction by its unique ID.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Option<transaction::Model>> {
    Transaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a user's transactions, newest first.
pub async fn get_transactions_for_user(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Escapes backslash, `%` and `_` so `text` matches literally in a `LIKE` with `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Finds categorized transactions whose text overlaps `text`.
///
/// A stored transaction is similar when its description or merchant contains `text`,
/// or when `text` contains its (non-empty) description or merchant. Both directions
/// compare literally and case-insensitively for ASCII. Results are newest first and at
/// most `limit` long. `exclude_id` leaves one transaction out of the results.
pub async fn find_similar_transactions(
    db: &DatabaseConnection,
    text: &str,
    limit: u64,
    exclude_id: Option<i64>,
) -> Result<Vec<transaction::Model>> {
    let text = text.trim();
    if text.is_empty() || limit == 0 {
        return Ok(Vec::new());
    }

    let pattern = format!("%{}%", escape_like(text));
    let contained_in = |column: &str| {
        Expr::cust_with_values(
            format!("(\"{column}\" <> '' AND instr(lower(?), lower(\"{column}\")) > 0)"),
            [text],
        )
    };

    let mut query = Transaction::find()
        .filter(transaction::Column::CategoryId.is_not_null())
        .filter(
            Condition::any()
                .add(
                    transaction::Column::Description
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
                .add(transaction::Column::Merchant.like(LikeExpr::new(pattern).escape('\\')))
                .add(contained_in("description"))
                .add(contained_in("merchant")),
        );

    if let Some(id) = exclude_id {
        query = query.filter(transaction::Column::Id.ne(id));
    }

    query
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Stores a categorization result on a transaction.
///
/// All three categorization fields are overwritten, including with `None` when the
/// result carries no category.
pub async fn apply_categorization(
    db: &DatabaseConnection,
    transaction_id: i64,
    result: &CategorizationResult,
) -> Result<transaction::Model> {
    let transaction = get_transaction_by_id(db, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;

    let mut active: transaction::ActiveModel = transaction.into();
    active.category_id = Set(result.category_id);
    active.categorization_confidence = Set(Some(result.confidence));
    active.categorization_source = Set(Some(result.source));

    let updated = active.update(db).await?;
    debug!(
        "Transaction {} categorized via {} (category {:?}, confidence {:.2})",
        updated.id,
        result.source.as_str(),
        result.category_id,
        result.confidence
    );
    Ok(updated)
}

/// Categorizes a stored transaction against the current rules and stores the result.
///
/// The transaction itself is excluded from the similarity fallback.
pub async fn categorize_and_store(
    db: &DatabaseConnection,
    settings: &CategorizationSettings,
    transaction_id: i64,
) -> Result<(transaction::Model, CategorizationResult)> {
    let transaction = get_transaction_by_id(db, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;

    let store = DbCategorizationStore::new(db).excluding(transaction_id);
    let result = categorize(
        &store,
        settings,
        &CategorizationInput::from_transaction(&transaction),
    )
    .await?;

    let updated = apply_categorization(db, transaction_id, &result).await?;
    Ok((updated, result))
}

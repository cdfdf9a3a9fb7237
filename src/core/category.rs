//! Category catalog business logic.
//!
//! Categories are referenced by rules and allocations, so they are never deleted:
//! they can be renamed, re-parented or deactivated. Parent links form a tree and
//! any write that would close a cycle is rejected.

use crate::{
    entities::{Category, category},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

/// Retrieves all active categories ordered by `sort_order`, then name.
pub async fn get_all_active_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .filter(category::Column::IsActive.eq(true))
        .order_by_asc(category::Column::SortOrder)
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by its unique ID, active or not.
///
/// Inactive categories stay resolvable so existing rules and allocations keep working.
pub async fn get_category_by_id(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by exact name.
pub async fn get_category_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(category::Column::Name.eq(name))
        .order_by_asc(category::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid("Category name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Creates a new active category.
///
/// `parent_id`, when given, must reference an existing category.
pub async fn create_category(
    db: &DatabaseConnection,
    name: String,
    parent_id: Option<i64>,
    sort_order: i32,
    is_default: bool,
) -> Result<category::Model> {
    let name = validate_name(&name)?;

    if let Some(parent) = parent_id {
        get_category_by_id(db, parent)
            .await?
            .ok_or(Error::CategoryNotFound { id: parent })?;
    }

    let category = category::ActiveModel {
        name: Set(name),
        parent_id: Set(parent_id),
        is_default: Set(is_default),
        is_active: Set(true),
        sort_order: Set(sort_order),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = category.insert(db).await?;
    info!("Created category {} '{}'", result.id, result.name);
    Ok(result)
}

async fn require_category(db: &DatabaseConnection, category_id: i64) -> Result<category::Model> {
    get_category_by_id(db, category_id)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })
}

/// Renames a category.
pub async fn rename_category(
    db: &DatabaseConnection,
    category_id: i64,
    new_name: String,
) -> Result<category::Model> {
    let name = validate_name(&new_name)?;
    let category = require_category(db, category_id).await?;

    let mut active: category::ActiveModel = category.into();
    active.name = Set(name);
    active.update(db).await.map_err(Into::into)
}

/// Hides a category from listings. Rules and allocations referencing it keep working.
pub async fn deactivate_category(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<category::Model> {
    let category = require_category(db, category_id).await?;

    let mut active: category::ActiveModel = category.into();
    active.is_active = Set(false);
    active.update(db).await.map_err(Into::into)
}

/// Returns true if making `new_parent` the parent of `category_id` would create a cycle.
///
/// `parents` maps every known category id to its current parent.
#[must_use]
pub fn would_create_cycle(
    parents: &HashMap<i64, Option<i64>>,
    category_id: i64,
    new_parent: i64,
) -> bool {
    let mut seen = HashSet::new();
    let mut current = Some(new_parent);

    while let Some(id) = current {
        if id == category_id {
            return true;
        }
        // An existing cycle not involving `category_id`; stop walking.
        if !seen.insert(id) {
            return false;
        }
        current = parents.get(&id).copied().flatten();
    }

    false
}

/// Moves a category under `parent_id`, or to the top level when `None`.
///
/// # Errors
/// * [`Error::CategoryNotFound`] if either category does not exist
/// * [`Error::InvalidRequest`] if the move would make the category its own ancestor
pub async fn set_category_parent(
    db: &DatabaseConnection,
    category_id: i64,
    parent_id: Option<i64>,
) -> Result<category::Model> {
    let category = require_category(db, category_id).await?;

    if let Some(parent) = parent_id {
        require_category(db, parent).await?;

        let parents: HashMap<i64, Option<i64>> = Category::find()
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.parent_id))
            .collect();

        if would_create_cycle(&parents, category_id, parent) {
            warn!("Rejected re-parenting category {category_id} under {parent}: cycle");
            return Err(Error::invalid(format!(
                "Category {parent} is a descendant of category {category_id}"
            )));
        }
    }

    let mut active: category::ActiveModel = category.into();
    active.parent_id = Set(parent_id);
    active.update(db).await.map_err(Into::into)
}

/// Returns the chain of categories from the root down to `category_id`.
pub async fn get_category_path(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Vec<category::Model>> {
    let mut path = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(category_id);

    while let Some(id) = current {
        if !seen.insert(id) {
            break;
        }
        let category = require_category(db, id).await?;
        current = category.parent_id;
        path.push(category);
    }

    path.reverse();
    Ok(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_category_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_category(&db, "  ".to_string(), None, 0, false).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidRequest { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_category_with_missing_parent() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_category(&db, "Groceries".to_string(), Some(42), 0, false).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::CategoryNotFound { id: 42 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_active_categories_sorted() -> Result<()> {
        let db = setup_test_db().await?;

        let travel = create_category(&db, "Travel".to_string(), None, 2, false).await?;
        let food = create_category(&db, "Food".to_string(), None, 1, true).await?;
        let bills = create_category(&db, "Bills".to_string(), None, 2, false).await?;
        let hidden = create_test_category(&db, "Hidden").await?;
        deactivate_category(&db, hidden.id).await?;

        let categories = get_all_active_categories(&db).await?;
        assert_eq!(categories, vec![food, bills, travel]);

        // Deactivated categories still resolve by id
        let found = get_category_by_id(&db, hidden.id).await?.unwrap();
        assert!(!found.is_active);

        Ok(())
    }

    #[tokio::test]
    async fn test_rename_category() -> Result<()> {
        let (db, category) = setup_with_category().await?;

        let renamed = rename_category(&db, category.id, " Dining ".to_string()).await?;
        assert_eq!(renamed.name, "Dining");
        assert!(get_category_by_name(&db, "Dining").await?.is_some());

        let missing = rename_category(&db, 999, "x".to_string()).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::CategoryNotFound { id: 999 }
        ));

        Ok(())
    }

    #[test]
    fn test_would_create_cycle() {
        // 1 <- 2 <- 3, and 4 standalone
        let parents = HashMap::from([(1, None), (2, Some(1)), (3, Some(2)), (4, None)]);

        assert!(would_create_cycle(&parents, 1, 3));
        assert!(would_create_cycle(&parents, 2, 2));
        assert!(!would_create_cycle(&parents, 3, 1));
        assert!(!would_create_cycle(&parents, 1, 4));
    }

    #[tokio::test]
    async fn test_set_category_parent_rejects_cycles() -> Result<()> {
        let db = setup_test_db().await?;
        let food = create_test_category(&db, "Food").await?;
        let groceries = create_category(&db, "Groceries".to_string(), Some(food.id), 0, false).await?;
        let produce =
            create_category(&db, "Produce".to_string(), Some(groceries.id), 0, false).await?;

        let result = set_category_parent(&db, food.id, Some(produce.id)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidRequest { message: _ }
        ));

        let result = set_category_parent(&db, food.id, Some(food.id)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidRequest { message: _ }
        ));

        let moved = set_category_parent(&db, produce.id, Some(food.id)).await?;
        assert_eq!(moved.parent_id, Some(food.id));

        let top = set_category_parent(&db, groceries.id, None).await?;
        assert_eq!(top.parent_id, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_category_path() -> Result<()> {
        let db = setup_test_db().await?;
        let food = create_test_category(&db, "Food").await?;
        let groceries = create_category(&db, "Groceries".to_string(), Some(food.id), 0, false).await?;

        let path = get_category_path(&db, groceries.id).await?;
        let names: Vec<&str> = path.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Food", "Groceries"]);

        let missing = get_category_path(&db, 999).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::CategoryNotFound { id: 999 }
        ));

        Ok(())
    }
}

//! Seeding of the category catalog and keyword rules from config.toml
//!
//! Seeding is idempotent: categories are matched by name and rules by
//! (pattern, category), so running it on every startup only inserts what is missing.

use crate::{
    config::settings::AppConfig,
    core::{category, rules},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use tracing::{debug, info};

/// Counts of what a seeding run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Categories inserted by this run
    pub categories_created: usize,
    /// Rules inserted by this run
    pub rules_created: usize,
}

/// Inserts the categories and rules listed in `config` that do not exist yet.
///
/// A category's `parent` must name a category that exists or appears earlier in the
/// list. A rule's `category` must name an existing or seeded category.
pub async fn seed_catalog(db: &DatabaseConnection, config: &AppConfig) -> Result<SeedReport> {
    info!(
        "Starting to seed catalog. Found {} categories and {} rules in configuration.",
        config.categories.len(),
        config.rules.len()
    );
    let mut report = SeedReport::default();

    for seed in &config.categories {
        if category::get_category_by_name(db, seed.name.trim())
            .await?
            .is_some()
        {
            debug!("Category '{}' already exists. Skipping.", seed.name);
            continue;
        }

        let parent_id = match seed.parent.as_deref() {
            Some(parent) => Some(
                category::get_category_by_name(db, parent.trim())
                    .await?
                    .ok_or_else(|| Error::Config {
                        message: format!(
                            "Category '{}' names unknown parent '{parent}'",
                            seed.name
                        ),
                    })?
                    .id,
            ),
            None => None,
        };

        category::create_category(db, seed.name.clone(), parent_id, seed.sort_order, true).await?;
        report.categories_created += 1;
    }

    // Disabled rules count too, so a rule switched off by an operator stays off
    let existing = rules::get_all_rules(db).await?;
    for seed in &config.rules {
        let target = category::get_category_by_name(db, seed.category.trim())
            .await?
            .ok_or_else(|| Error::Config {
                message: format!(
                    "Rule '{}' names unknown category '{}'",
                    seed.pattern, seed.category
                ),
            })?;

        let pattern = seed.pattern.trim();
        let already_seeded = existing.iter().any(|rule| {
            rule.category_id == target.id && rule.pattern.eq_ignore_ascii_case(pattern)
        });
        if already_seeded {
            debug!("Rule '{pattern}' for '{}' already exists. Skipping.", target.name);
            continue;
        }

        rules::create_rule(db, target.id, pattern.to_string(), seed.priority).await?;
        report.rules_created += 1;
    }

    info!(
        "Seeding finished: {} categories and {} rules created.",
        report.categories_created, report.rules_created
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::settings::parse_config;
    use crate::test_utils::setup_test_db;

    const CONFIG: &str = r#"
        [[categories]]
        name = "Food"
        sort_order = 1

        [[categories]]
        name = "Groceries"
        parent = "Food"
        sort_order = 2

        [[rules]]
        pattern = "walmart"
        category = "Groceries"
        priority = 5

        [[rules]]
        pattern = "restaurant"
        category = "Food"
    "#;

    #[tokio::test]
    async fn test_seed_catalog_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(CONFIG)?;

        let first = seed_catalog(&db, &config).await?;
        assert_eq!(
            first,
            SeedReport {
                categories_created: 2,
                rules_created: 2
            }
        );

        let second = seed_catalog(&db, &config).await?;
        assert_eq!(second, SeedReport::default());

        let groceries = category::get_category_by_name(&db, "Groceries")
            .await?
            .unwrap();
        let food = category::get_category_by_name(&db, "Food").await?.unwrap();
        assert_eq!(groceries.parent_id, Some(food.id));
        assert!(groceries.is_default);

        let active = rules::get_active_rules(&db).await?;
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].pattern, "walmart");
        assert_eq!(active[0].category_id, groceries.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_keeps_disabled_rule_disabled() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(CONFIG)?;
        seed_catalog(&db, &config).await?;

        let walmart = rules::get_active_rules(&db)
            .await?
            .into_iter()
            .find(|rule| rule.pattern == "walmart")
            .unwrap();
        rules::update_rule(
            &db,
            walmart.id,
            rules::RuleUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await?;

        let second = seed_catalog(&db, &config).await?;
        assert_eq!(second.rules_created, 0);

        let all = rules::get_all_rules(&db).await?;
        assert_eq!(all.len(), 2);
        let active = rules::get_active_rules(&db).await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].pattern, "restaurant");

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_rule_with_unknown_category() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(
            r#"
            [[rules]]
            pattern = "shell"
            category = "Fuel"
        "#,
        )?;

        let result = seed_catalog(&db, &config).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        Ok(())
    }
}

//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL.

use crate::entities::{
    Budget, BudgetCategory, CategorizationRule, Category, Transaction, budget_category,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema, sea_query::Index};
use tracing::info;

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    info!("Connecting to database at {database_url}");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables from the entity definitions.
///
/// Tables are created in dependency order: categories first, then the records
/// that reference them. A unique index keeps one allocation per budget and category.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        schema.create_table_from_entity(Category),
        schema.create_table_from_entity(CategorizationRule),
        schema.create_table_from_entity(Transaction),
        schema.create_table_from_entity(Budget),
        schema.create_table_from_entity(BudgetCategory),
    ];

    for mut table in tables {
        table.if_not_exists();
        db.execute(builder.build(&table)).await?;
    }

    let allocation_index = Index::create()
        .name("idx_budget_categories_budget_category")
        .table(BudgetCategory)
        .col(budget_category::Column::BudgetId)
        .col(budget_category::Column::CategoryId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&allocation_index)).await?;

    Ok(())
}

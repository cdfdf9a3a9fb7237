//! Category entity - Named spending categories referenced by rules and budget allocations.
//!
//! Categories may form a hierarchy through `parent_id`. The database does not enforce
//! acyclicity; `core::category` rejects cycles when a parent link is written.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Food", "Transport")
    pub name: String,
    /// Parent category for hierarchical grouping, None for top-level categories
    pub parent_id: Option<i64>,
    /// Whether this category ships with the default catalog
    pub is_default: bool,
    /// Inactive categories are hidden from listings but stay resolvable by id
    pub is_active: bool,
    /// Position within listings, lower first
    pub sort_order: i32,
    /// When the category was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category is the target of many rules
    #[sea_orm(has_many = "super::categorization_rule::Entity")]
    Rules,
    /// One category has many budget allocations
    #[sea_orm(has_many = "super::budget_category::Entity")]
    Allocations,
}

impl Related<super::categorization_rule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rules.def()
    }
}

impl Related<super::budget_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Allocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

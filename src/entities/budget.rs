//! Budget entity - One planning period's spending plan for an owner.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the budget
    pub user_id: String,
    /// Display name (e.g., "October 2026")
    pub name: String,
    /// First day of the period, inclusive
    pub period_start: Date,
    /// Last day of the period, inclusive
    pub period_end: Date,
    /// Total amount planned for the period
    pub total_amount: f64,
    /// ISO 4217 currency code
    pub currency: String,
    /// Inactive budgets are kept for history only
    pub is_active: bool,
    /// When the budget was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Budget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One budget has many per-category allocations
    #[sea_orm(has_many = "super::budget_category::Entity")]
    Allocations,
}

impl Related<super::budget_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Allocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

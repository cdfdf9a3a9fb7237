//! Budget category entity - Per-category allocation inside a budget.
//!
//! `spent_amount` is a running total maintained by the transaction flow through
//! `core::budget`. The analysis engine only reads it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget allocation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_categories")]
pub struct Model {
    /// Unique identifier for the allocation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Budget this allocation belongs to
    pub budget_id: i64,
    /// Category being budgeted
    pub category_id: i64,
    /// Amount budgeted for the category
    pub allocated_amount: f64,
    /// Amount spent so far in the period
    pub spent_amount: f64,
    /// Fraction of the allocation at which a warning is raised, in `(0, 1]`
    pub alert_threshold: f64,
    /// When the allocation was created
    pub created_at: DateTimeUtc,
    /// When the allocation was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `BudgetCategory` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each allocation belongs to one budget
    #[sea_orm(
        belongs_to = "super::budget::Entity",
        from = "Column::BudgetId",
        to = "super::budget::Column::Id"
    )]
    Budget,
    /// Each allocation budgets one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

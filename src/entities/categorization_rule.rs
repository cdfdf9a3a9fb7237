//! Categorization rule entity - Keyword-to-category mappings evaluated by priority.
//!
//! Rules are process-wide. Higher `priority` wins; equal priorities fall back to
//! creation order. Only `is_active` rules take part in categorization.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a rule's `pattern` is compared against transaction text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// Case-insensitive substring match against description or merchant
    #[sea_orm(string_value = "keyword")]
    Keyword,
}

impl PatternType {
    /// Returns true when `pattern` matches `text` under this pattern type.
    ///
    /// Both arguments are expected to be lowercased already. An empty pattern never matches.
    #[must_use]
    pub fn matches(self, pattern: &str, text: &str) -> bool {
        match self {
            Self::Keyword => !pattern.is_empty() && text.contains(pattern),
        }
    }
}

/// Categorization rule database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categorization_rules")]
pub struct Model {
    /// Unique identifier for the rule
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Category assigned when the rule matches
    pub category_id: i64,
    /// Keyword searched for in the transaction text
    pub pattern: String,
    /// Matching strategy for `pattern`
    pub pattern_type: PatternType,
    /// Evaluation priority, higher first
    pub priority: i32,
    /// Inactive rules never match
    pub is_active: bool,
    /// When the rule was created
    pub created_at: DateTimeUtc,
    /// When the rule was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `CategorizationRule` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each rule targets one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

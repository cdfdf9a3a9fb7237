//! Transaction entity - Financial transactions awaiting or carrying a category.
//!
//! The categorization fields (`category_id`, `categorization_confidence`,
//! `categorization_source`) are the only ones written by the categorization flow.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Provenance of a transaction's category assignment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum CategorizationSource {
    /// Matched by a categorization rule
    #[sea_orm(string_value = "rule")]
    Rule,
    /// Inferred from similar, already categorized transactions
    #[sea_orm(string_value = "similarity")]
    Similarity,
    /// Nothing matched
    #[sea_orm(string_value = "none")]
    #[serde(rename = "none")]
    NoMatch,
}

impl CategorizationSource {
    /// Stable string form, as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::Similarity => "similarity",
            Self::NoMatch => "none",
        }
    }
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the transaction
    pub user_id: String,
    /// Free-text description from the statement
    pub description: String,
    /// Merchant name, empty when unknown
    pub merchant: String,
    /// Transaction amount (positive for spending)
    pub amount: f64,
    /// ISO 4217 currency code
    pub currency: String,
    /// Assigned category, None until categorized
    pub category_id: Option<i64>,
    /// Confidence of the assignment in `[0, 1]`
    pub categorization_confidence: Option<f64>,
    /// How the category was assigned
    pub categorization_source: Option<CategorizationSource>,
    /// When the transaction was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each categorized transaction belongs to one category
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

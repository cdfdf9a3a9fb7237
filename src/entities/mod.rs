//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod budget;
pub mod budget_category;
pub mod categorization_rule;
pub mod category;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use budget::{Column as BudgetColumn, Entity as Budget, Model as BudgetModel};
pub use budget_category::{
    Column as BudgetCategoryColumn, Entity as BudgetCategory, Model as BudgetCategoryModel,
};
pub use categorization_rule::{
    Column as CategorizationRuleColumn, Entity as CategorizationRule,
    Model as CategorizationRuleModel, PatternType,
};
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use transaction::{
    CategorizationSource, Column as TransactionColumn, Entity as Transaction,
    Model as TransactionModel,
};

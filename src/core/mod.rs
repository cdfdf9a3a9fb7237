//! Core business logic - framework-agnostic categorization, catalog and budget operations.

/// Budget spend analysis: totals and tiered alerts
pub mod analysis;
/// Budgets and per-category allocations
pub mod budget;
/// Transaction categorization engine
pub mod categorization;
/// Category catalog
pub mod category;
/// Categorization rule management
pub mod rules;
/// Transaction records and stored categorization
pub mod transaction;

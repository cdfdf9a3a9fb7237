//! Application settings loaded from config.toml
//!
//! Every section is optional. Missing values fall back to the defaults below so an
//! empty file (or no file at all) yields a working configuration. `DATABASE_URL`
//! from the environment takes precedence over the file.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Default SQLite location used when neither the environment nor the file names one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/finance_tracker.sqlite?mode=rwc";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database connection string
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Categorization engine tuning
    #[serde(default)]
    pub categorization: CategorizationSettings,
    /// Budget analysis tuning
    #[serde(default)]
    pub budget: BudgetSettings,
    /// Categories to seed on startup
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
    /// Keyword rules to seed on startup
    #[serde(default)]
    pub rules: Vec<RuleSeed>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            categorization: CategorizationSettings::default(),
            budget: BudgetSettings::default(),
            categories: Vec::new(),
            rules: Vec::new(),
        }
    }
}

/// Confidence values and search bounds for the categorization engine
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CategorizationSettings {
    /// Confidence reported for a direct rule match
    pub rule_confidence: f64,
    /// Confidence reported for a similarity fallback
    pub similarity_confidence: f64,
    /// Maximum number of similar transactions inspected by the fallback
    pub similarity_limit: u64,
}

impl Default for CategorizationSettings {
    fn default() -> Self {
        Self {
            rule_confidence: 1.0,
            similarity_confidence: 0.7,
            similarity_limit: 20,
        }
    }
}

/// Thresholds used when creating allocations and classifying alerts
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct BudgetSettings {
    /// Alert threshold given to allocations created without one
    pub default_alert_threshold: f64,
    /// Secondary threshold for `critical` alerts, 0.9 unless configured
    pub critical_threshold: f64,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            default_alert_threshold: 0.8,
            critical_threshold: 0.9,
        }
    }
}

/// A category entry in config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct CategorySeed {
    /// Category name, unique within the seed list
    pub name: String,
    /// Name of the parent category, which must appear earlier in the list
    #[serde(default)]
    pub parent: Option<String>,
    /// Listing position
    #[serde(default)]
    pub sort_order: i32,
}

/// A keyword rule entry in config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSeed {
    /// Keyword to look for
    pub pattern: String,
    /// Name of the target category
    pub category: String,
    /// Evaluation priority, higher first
    #[serde(default)]
    pub priority: i32,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

impl AppConfig {
    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let c = &self.categorization;
        for (name, value) in [
            ("rule_confidence", c.rule_confidence),
            ("similarity_confidence", c.similarity_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config {
                    message: format!("categorization.{name} must be within [0, 1], got {value}"),
                });
            }
        }

        let b = &self.budget;
        for (name, value) in [
            ("default_alert_threshold", b.default_alert_threshold),
            ("critical_threshold", b.critical_threshold),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(Error::Config {
                    message: format!("budget.{name} must be within (0, 1], got {value}"),
                });
            }
        }

        Ok(())
    }
}

/// Parses configuration from a TOML string.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML syntax is invalid,
/// or a threshold is out of range.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads the application configuration from `CONFIG_PATH` (default `./config.toml`).
///
/// A missing file is not an error: defaults are used. `DATABASE_URL` overrides the
/// file's `database_url`.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

    let mut config = if Path::new(&path).exists() {
        load_config(&path)?
    } else {
        info!("No configuration file at {path}, using defaults.");
        AppConfig::default()
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database_url = url;
    }

    info!(
        "Configuration loaded: {} categories and {} rules to seed.",
        config.categories.len(),
        config.rules.len()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            database_url = "sqlite::memory:"

            [categorization]
            similarity_confidence = 0.6
            similarity_limit = 5

            [budget]
            default_alert_threshold = 0.75

            [[categories]]
            name = "Food"
            sort_order = 1

            [[categories]]
            name = "Groceries"
            parent = "Food"

            [[rules]]
            pattern = "walmart"
            category = "Groceries"
            priority = 10
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.categorization.rule_confidence, 1.0);
        assert_eq!(config.categorization.similarity_confidence, 0.6);
        assert_eq!(config.categorization.similarity_limit, 5);
        assert_eq!(config.budget.default_alert_threshold, 0.75);
        assert_eq!(config.budget.critical_threshold, 0.9);

        assert_eq!(config.categories.len(), 2);
        assert_eq!(config.categories[1].parent.as_deref(), Some("Food"));
        assert_eq!(config.categories[1].sort_order, 0);

        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0].pattern, "walmart");
        assert_eq!(config.rules[0].priority, 10);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.categorization.similarity_limit, 20);
        assert_eq!(config.budget.default_alert_threshold, 0.8);
        assert!(config.categories.is_empty());
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let result = parse_config("[budget]\ncritical_threshold = 1.5\n");
        assert!(matches!(result, Err(Error::Config { message: _ })));

        let result = parse_config("[categorization]\nsimilarity_confidence = -0.1\n");
        assert!(matches!(result, Err(Error::Config { message: _ })));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = parse_config("[[rules]]\npattern = ");
        assert!(matches!(result, Err(Error::Config { message: _ })));
    }
}

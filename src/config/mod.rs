/// Database configuration and connection management
pub mod database;

/// Seeding of the category catalog and keyword rules from config.toml
pub mod seed;

/// Application settings loaded from config.toml and the environment
pub mod settings;

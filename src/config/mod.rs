/// Database configuration and connection management
pub mod database;

/// Application settings loading from config.toml
pub mod settings;

/// Admin password configuration from environment variables
pub mod access;

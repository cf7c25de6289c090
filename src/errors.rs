//! Unified error type for `FleetDesk`.
//!
//! Every layer (core, storage, bot) returns [`Result`]. Bot commands surface the
//! `Display` form of these errors directly to the operator.

use chrono::NaiveDate;
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Input rejected before reaching the database
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// A monetary amount that is not finite or out of range
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// End date earlier than start date
    #[error("Invalid date range: {end} is before {start}")]
    InvalidDateRange {
        /// Rental start
        start: NaiveDate,
        /// Rental end
        end: NaiveDate,
    },

    /// Row lookup by primary key or natural key failed
    #[error("{entity} '{key}' not found")]
    NotFound {
        /// Table-level name of the entity (e.g. "car")
        entity: &'static str,
        /// Identifier used for the lookup
        key: String,
    },

    /// Delete refused because other rows still reference this one
    #[error("Cannot delete {entity} '{key}': it is still referenced by {dependents}")]
    InUse {
        /// Entity that was going to be deleted
        entity: &'static str,
        /// Its identifier
        key: String,
        /// Description of what references it
        dependents: String,
    },

    /// Car is not in the `available` state
    #[error("Car '{plate}' is not available (current status: {status})")]
    CarUnavailable {
        /// License plate of the car
        plate: String,
        /// Its current status
        status: String,
    },

    /// Command attempted without an open session
    #[error("Access denied: log in with /login first")]
    Unauthorized,

    /// Object storage rejected an upload
    #[error("Storage error: {message}")]
    Storage {
        /// Response body or reason
        message: String,
    },

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// String formatting error
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// PDF rendering error
    #[error("PDF error: {0}")]
    Pdf(#[from] printpdf::Error),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] keyed by a numeric id.
    #[must_use]
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound {
            entity,
            key: id.to_string(),
        }
    }

    /// Shorthand for a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

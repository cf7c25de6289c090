//! Database configuration module for `FleetDesk`.
//!
//! This module handles the connection to the relational store using `SeaORM`. The store is
//! normally the hosted Postgres backend; a local `SQLite` file is the fallback for development.
//! Tables are created from the entity definitions with `IF NOT EXISTS`, so pointing the bot at
//! an already provisioned backend leaves its schema untouched.

use crate::entities::{Car, Customer, MaintenanceLog, Payment, Rental};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};

/// Default local database used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/fleet_desk.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection using the `DATABASE_URL` environment variable.
///
/// Falls back to [`DEFAULT_DATABASE_URL`] if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    tracing::debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables that do not exist yet, parents before children.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Car).await?;
    create_table(db, &schema, Customer).await?;
    create_table(db, &schema, Rental).await?;
    create_table(db, &schema, Payment).await?;
    create_table(db, &schema, MaintenanceLog).await?;

    Ok(())
}

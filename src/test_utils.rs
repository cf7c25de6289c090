//! Shared test utilities for `FleetDesk`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        customer::{self, CustomerInput},
        fleet::{self, CarInput},
        maintenance::{self, NewMaintenanceLog},
        rental::{self, NewRental},
    },
    entities::{self, CarStatus, MaintenanceKind},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for a calendar date. Panics on an invalid date, tests only.
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Car fields with sensible defaults.
///
/// # Defaults
/// * brand / model: "Fiat" / "Cronos"
/// * year: 2023
/// * `daily_rate`: 100.0
/// * status: available
pub fn car_input(plate: &str) -> CarInput {
    CarInput {
        brand: "Fiat".to_string(),
        model: "Cronos".to_string(),
        license_plate: plate.to_string(),
        year: 2023,
        daily_rate: 100.0,
        status: CarStatus::Available,
    }
}

/// Registers a car with the defaults of [`car_input`].
pub async fn create_test_car(db: &DatabaseConnection, plate: &str) -> Result<entities::car::Model> {
    fleet::create_car(db, car_input(plate)).await
}

/// Registers a car with custom model, rate and status.
pub async fn create_custom_car(
    db: &DatabaseConnection,
    plate: &str,
    model: &str,
    daily_rate: f64,
    status: CarStatus,
) -> Result<entities::car::Model> {
    fleet::create_car(
        db,
        CarInput {
            model: model.to_string(),
            daily_rate,
            status,
            ..car_input(plate)
        },
    )
    .await
}

/// Customer fields with sensible defaults and no optional data.
pub fn customer_input(name: &str) -> CustomerInput {
    CustomerInput {
        full_name: name.to_string(),
        document_cpf: "123.456.789-00".to_string(),
        phone: "+55 (11) 98765-4321".to_string(),
        email: None,
        address: None,
    }
}

/// Registers a customer with the defaults of [`customer_input`].
pub async fn create_test_customer(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::customer::Model> {
    customer::create_customer(db, customer_input(name)).await
}

/// Sets up a test database with one customer ("João Silva") and one available car
/// ("ABC-1234", Fiat Cronos at 100.0 per day).
pub async fn setup_with_customer_and_car() -> Result<(
    DatabaseConnection,
    entities::customer::Model,
    entities::car::Model,
)> {
    let db = setup_test_db().await?;
    let customer = create_test_customer(&db, "João Silva").await?;
    let car = create_test_car(&db, "ABC-1234").await?;
    Ok((db, customer, car))
}

/// Opens a three-day rental (2024-01-01 to 2024-01-04) at the car's own rate.
pub async fn create_test_rental(
    db: &DatabaseConnection,
    customer_id: i64,
    car_id: i64,
) -> Result<entities::rental::Model> {
    rental::create_rental(
        db,
        NewRental {
            customer_id,
            car_id,
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 4),
            daily_rate: None,
        },
    )
    .await
}

/// Preventive service dated 2024-01-15.
pub fn maintenance_input(car_id: i64, cost: f64) -> NewMaintenanceLog {
    NewMaintenanceLog {
        car_id,
        date: date(2024, 1, 15),
        description: "Troca de óleo".to_string(),
        kind: MaintenanceKind::Preventive,
        cost,
    }
}

/// Records a service with the defaults of [`maintenance_input`].
pub async fn create_test_maintenance(
    db: &DatabaseConnection,
    car_id: i64,
    cost: f64,
) -> Result<entities::maintenance_log::Model> {
    maintenance::create_log(db, maintenance_input(car_id, cost)).await
}

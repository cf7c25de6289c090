//! Fleet business logic - Handles all car-related operations.
//!
//! Provides functions for registering, listing, filtering, editing and removing cars.
//! All database functions are async and return Result types for error handling.

use crate::{
    entities::{Car, CarStatus, MaintenanceLog, Rental, car, maintenance_log, rental},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};

/// Editable fields of a car, used both for registration and for full edits.
#[derive(Debug, Clone, PartialEq)]
pub struct CarInput {
    /// Manufacturer
    pub brand: String,
    /// Model name
    pub model: String,
    /// License plate
    pub license_plate: String,
    /// Model year
    pub year: i32,
    /// Price per day
    pub daily_rate: f64,
    /// Operational status
    pub status: CarStatus,
}

impl CarInput {
    fn validate(&self) -> Result<()> {
        if self.brand.trim().is_empty() {
            return Err(Error::validation("Car brand cannot be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(Error::validation("Car model cannot be empty"));
        }
        if self.license_plate.trim().is_empty() {
            return Err(Error::validation("License plate cannot be empty"));
        }
        if !self.daily_rate.is_finite() || self.daily_rate < 0.0 {
            return Err(Error::InvalidAmount {
                amount: self.daily_rate,
            });
        }
        Ok(())
    }
}

/// Registers a new car after validating its fields.
///
/// Text fields are trimmed; the plate is stored upper-cased so lookups are stable.
pub async fn create_car(db: &DatabaseConnection, input: CarInput) -> Result<car::Model> {
    input.validate()?;

    let car = car::ActiveModel {
        brand: Set(input.brand.trim().to_string()),
        model: Set(input.model.trim().to_string()),
        license_plate: Set(normalize_plate(&input.license_plate)),
        year: Set(input.year),
        daily_rate: Set(input.daily_rate),
        status: Set(input.status),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = car.insert(db).await?;
    tracing::info!(car_id = result.id, plate = %result.license_plate, "Car registered");
    Ok(result)
}

/// Lists every car, most recently registered first.
pub async fn list_cars(db: &DatabaseConnection) -> Result<Vec<car::Model>> {
    Car::find()
        .order_by_desc(car::Column::CreatedAt)
        .order_by_desc(car::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists cars that can be rented right now, ordered by model name.
pub async fn list_available_cars(db: &DatabaseConnection) -> Result<Vec<car::Model>> {
    Car::find()
        .filter(car::Column::Status.eq(CarStatus::Available))
        .order_by_asc(car::Column::Model)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a car by its primary key.
pub async fn get_car_by_id(db: &DatabaseConnection, car_id: i64) -> Result<Option<car::Model>> {
    Car::find_by_id(car_id).one(db).await.map_err(Into::into)
}

/// Finds a car by license plate, ignoring case and surrounding whitespace.
pub async fn get_car_by_plate(db: &DatabaseConnection, plate: &str) -> Result<Option<car::Model>> {
    Car::find()
        .filter(car::Column::LicensePlate.eq(normalize_plate(plate)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Replaces every editable field of a car.
pub async fn update_car(db: &DatabaseConnection, car_id: i64, input: CarInput) -> Result<car::Model> {
    input.validate()?;

    let existing = Car::find_by_id(car_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("car", car_id))?;

    let mut car: car::ActiveModel = existing.into();
    car.brand = Set(input.brand.trim().to_string());
    car.model = Set(input.model.trim().to_string());
    car.license_plate = Set(normalize_plate(&input.license_plate));
    car.year = Set(input.year);
    car.daily_rate = Set(input.daily_rate);
    car.status = Set(input.status);

    car.update(db).await.map_err(Into::into)
}

/// Writes a car's status directly, with no transition rules.
pub async fn set_car_status<C>(db: &C, car_id: i64, status: CarStatus) -> Result<car::Model>
where
    C: ConnectionTrait,
{
    let existing = Car::find_by_id(car_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("car", car_id))?;

    let mut car: car::ActiveModel = existing.into();
    car.status = Set(status);
    let updated = car.update(db).await?;
    tracing::debug!(car_id, status = ?status, "Car status changed");
    Ok(updated)
}

/// Deletes a car that no rental or maintenance log refers to.
pub async fn delete_car(db: &DatabaseConnection, car_id: i64) -> Result<()> {
    let car = Car::find_by_id(car_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("car", car_id))?;

    let rentals = Rental::find()
        .filter(rental::Column::CarId.eq(car_id))
        .count(db)
        .await?;
    let logs = MaintenanceLog::find()
        .filter(maintenance_log::Column::CarId.eq(car_id))
        .count(db)
        .await?;

    if rentals > 0 || logs > 0 {
        return Err(Error::InUse {
            entity: "car",
            key: car.license_plate,
            dependents: format!("{rentals} rental(s) and {logs} maintenance log(s)"),
        });
    }

    car.delete(db).await?;
    tracing::info!(car_id, "Car deleted");
    Ok(())
}

/// Counts cars currently in the given status.
pub async fn count_cars_with_status(db: &DatabaseConnection, status: CarStatus) -> Result<u64> {
    Car::find()
        .filter(car::Column::Status.eq(status))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Filters cars by a free-text search and an optional status.
///
/// The search matches brand, model or plate, case-insensitively. `None` status means
/// "all statuses".
#[must_use]
pub fn filter_cars(cars: &[car::Model], search: &str, status: Option<CarStatus>) -> Vec<car::Model> {
    let needle = search.trim().to_lowercase();

    cars.iter()
        .filter(|car| {
            let matches_search = needle.is_empty()
                || car.brand.to_lowercase().contains(&needle)
                || car.model.to_lowercase().contains(&needle)
                || car.license_plate.to_lowercase().contains(&needle);
            let matches_status = status.is_none_or(|wanted| car.status == wanted);
            matches_search && matches_status
        })
        .cloned()
        .collect()
}

/// Canonical form of a license plate.
#[must_use]
pub fn normalize_plate(plate: &str) -> String {
    plate.trim().to_uppercase()
}

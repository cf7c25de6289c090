//! Rental business logic - pricing, contract creation, edits, returns and deletion.
//!
//! Creating a rental also flips the car to `rented`; returning it flips the car back to
//! `available`. Both happen inside one database transaction.

use crate::{
    core::fleet,
    entities::{
        Car, CarStatus, Customer, Payment, Rental, RentalStatus, car, customer, payment, rental,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;

/// Data needed to open a rental.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRental {
    /// Renting customer
    pub customer_id: i64,
    /// Car to rent; must be available
    pub car_id: i64,
    /// First day
    pub start_date: NaiveDate,
    /// Return day
    pub end_date: NaiveDate,
    /// Overrides the car's daily rate when set
    pub daily_rate: Option<f64>,
}

/// Editable fields of an existing rental.
#[derive(Debug, Clone, PartialEq)]
pub struct RentalUpdate {
    /// First day
    pub start_date: NaiveDate,
    /// Return day
    pub end_date: NaiveDate,
    /// Contract value, entered by hand
    pub total_amount: f64,
    /// Lifecycle status
    pub status: RentalStatus,
}

/// A rental together with the rows it points at.
#[derive(Debug, Clone, PartialEq)]
pub struct RentalDetails {
    /// The rental itself
    pub rental: rental::Model,
    /// Rented car, if it still exists
    pub car: Option<car::Model>,
    /// Renting customer, if it still exists
    pub customer: Option<customer::Model>,
}

impl RentalDetails {
    /// "Brand Model" of the rented car, or a placeholder
    #[must_use]
    pub fn car_label(&self) -> String {
        self.car
            .as_ref()
            .map_or_else(|| "Veículo".to_string(), |car| format!("{} {}", car.brand, car.model))
    }
}

/// Number of rental days between two dates.
///
/// Dates are whole days, so the ceiling of the difference is the difference itself.
pub fn rental_days(start: NaiveDate, end: NaiveDate) -> Result<i64> {
    if end < start {
        return Err(Error::InvalidDateRange { start, end });
    }
    Ok((end - start).num_days())
}

/// Contract value: `ceil(days) × daily_rate`.
pub fn calculate_total(start: NaiveDate, end: NaiveDate, daily_rate: f64) -> Result<f64> {
    if !daily_rate.is_finite() || daily_rate < 0.0 {
        return Err(Error::InvalidAmount { amount: daily_rate });
    }
    let days = rental_days(start, end)?;
    // Day counts are tiny; no precision is lost
    #[allow(clippy::cast_precision_loss)]
    let total = days as f64 * daily_rate;
    Ok(total)
}

/// Opens a rental and marks the car as rented.
///
/// The customer and car must exist and the car must be `available`. The customer's name
/// and phone are copied onto the rental.
pub async fn create_rental(db: &DatabaseConnection, input: NewRental) -> Result<rental::Model> {
    let txn = db.begin().await?;

    let customer = Customer::find_by_id(input.customer_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("customer", input.customer_id))?;

    let car = Car::find_by_id(input.car_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("car", input.car_id))?;

    if car.status != CarStatus::Available {
        return Err(Error::CarUnavailable {
            plate: car.license_plate,
            status: car.status.label().to_string(),
        });
    }

    let daily_rate = input.daily_rate.unwrap_or(car.daily_rate);
    let total_amount = calculate_total(input.start_date, input.end_date, daily_rate)?;

    let rental = rental::ActiveModel {
        customer_id: Set(customer.id),
        car_id: Set(car.id),
        customer_name: Set(customer.full_name),
        customer_phone: Set(customer.phone),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        total_amount: Set(total_amount),
        paid_amount: Set(0.0),
        status: Set(RentalStatus::Active),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = rental.insert(&txn).await?;
    fleet::set_car_status(&txn, car.id, CarStatus::Rented).await?;

    txn.commit().await?;

    tracing::info!(
        rental_id = result.id,
        car_id = result.car_id,
        total = result.total_amount,
        "Rental created"
    );
    Ok(result)
}

async fn attach_details(
    db: &DatabaseConnection,
    rentals: Vec<rental::Model>,
) -> Result<Vec<RentalDetails>> {
    let car_ids: Vec<i64> = rentals.iter().map(|r| r.car_id).collect();
    let customer_ids: Vec<i64> = rentals.iter().map(|r| r.customer_id).collect();

    let cars: HashMap<i64, car::Model> = Car::find()
        .filter(car::Column::Id.is_in(car_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|car| (car.id, car))
        .collect();
    let customers: HashMap<i64, customer::Model> = Customer::find()
        .filter(customer::Column::Id.is_in(customer_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|customer| (customer.id, customer))
        .collect();

    Ok(rentals
        .into_iter()
        .map(|rental| RentalDetails {
            car: cars.get(&rental.car_id).cloned(),
            customer: customers.get(&rental.customer_id).cloned(),
            rental,
        })
        .collect())
}

/// Lists every rental, newest first, with its car and customer.
pub async fn list_rentals(db: &DatabaseConnection) -> Result<Vec<RentalDetails>> {
    let rentals = Rental::find()
        .order_by_desc(rental::Column::CreatedAt)
        .order_by_desc(rental::Column::Id)
        .all(db)
        .await?;
    attach_details(db, rentals).await
}

/// Lists the most recently created rentals, with their car and customer.
pub async fn list_recent_rentals(db: &DatabaseConnection, limit: u64) -> Result<Vec<RentalDetails>> {
    let rentals = Rental::find()
        .order_by_desc(rental::Column::CreatedAt)
        .order_by_desc(rental::Column::Id)
        .limit(limit)
        .all(db)
        .await?;
    attach_details(db, rentals).await
}

/// Finds a rental by primary key.
pub async fn get_rental_by_id(db: &DatabaseConnection, rental_id: i64) -> Result<Option<rental::Model>> {
    Rental::find_by_id(rental_id).one(db).await.map_err(Into::into)
}

/// Loads one rental with its car and customer.
pub async fn get_rental_details(db: &DatabaseConnection, rental_id: i64) -> Result<RentalDetails> {
    let rental = Rental::find_by_id(rental_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("rental", rental_id))?;

    attach_details(db, vec![rental])
        .await?
        .pop()
        .ok_or_else(|| Error::not_found("rental", rental_id))
}

/// Edits dates, total and status of a rental. The car's status is left alone.
pub async fn update_rental(
    db: &DatabaseConnection,
    rental_id: i64,
    update: RentalUpdate,
) -> Result<rental::Model> {
    rental_days(update.start_date, update.end_date)?;
    if !update.total_amount.is_finite() || update.total_amount < 0.0 {
        return Err(Error::InvalidAmount {
            amount: update.total_amount,
        });
    }

    let existing = Rental::find_by_id(rental_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("rental", rental_id))?;

    let mut rental: rental::ActiveModel = existing.into();
    rental.start_date = Set(update.start_date);
    rental.end_date = Set(update.end_date);
    rental.total_amount = Set(update.total_amount);
    rental.status = Set(update.status);

    rental.update(db).await.map_err(Into::into)
}

/// Closes a rental and makes its car available again.
pub async fn return_rental(db: &DatabaseConnection, rental_id: i64) -> Result<rental::Model> {
    let txn = db.begin().await?;

    let existing = Rental::find_by_id(rental_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("rental", rental_id))?;
    let car_id = existing.car_id;

    let mut rental: rental::ActiveModel = existing.into();
    rental.status = Set(RentalStatus::Completed);
    let updated = rental.update(&txn).await?;

    fleet::set_car_status(&txn, car_id, CarStatus::Available).await?;

    txn.commit().await?;

    tracing::info!(rental_id, car_id, "Rental returned");
    Ok(updated)
}

/// Deletes a rental that has no payments registered.
pub async fn delete_rental(db: &DatabaseConnection, rental_id: i64) -> Result<()> {
    let rental = Rental::find_by_id(rental_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("rental", rental_id))?;

    let payments = Payment::find()
        .filter(payment::Column::RentalId.eq(rental_id))
        .count(db)
        .await?;

    if payments > 0 {
        return Err(Error::InUse {
            entity: "rental",
            key: rental_id.to_string(),
            dependents: format!("{payments} payment(s)"),
        });
    }

    rental.delete(db).await?;
    tracing::info!(rental_id, "Rental deleted");
    Ok(())
}

/// Counts rentals with the given status.
pub async fn count_rentals_with_status(db: &DatabaseConnection, status: RentalStatus) -> Result<u64> {
    Rental::find()
        .filter(rental::Column::Status.eq(status))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Filters rentals by customer name, car brand/model or plate (case-insensitive).
#[must_use]
pub fn search_rentals(details: &[RentalDetails], term: &str) -> Vec<RentalDetails> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return details.to_vec();
    }

    details
        .iter()
        .filter(|d| {
            d.rental.customer_name.to_lowercase().contains(&needle)
                || d.car.as_ref().is_some_and(|car| {
                    car.brand.to_lowercase().contains(&needle)
                        || car.model.to_lowercase().contains(&needle)
                        || car.license_plate.to_lowercase().contains(&needle)
                })
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_calculate_total_three_days() {
        let total = calculate_total(date(2024, 1, 1), date(2024, 1, 4), 100.0).unwrap();
        assert_eq!(total, 300.0);
    }

    #[test]
    fn test_calculate_total_same_day_is_zero() {
        assert_eq!(calculate_total(date(2024, 1, 1), date(2024, 1, 1), 100.0).unwrap(), 0.0);
    }

    #[test]
    fn test_calculate_total_rejects_reversed_dates() {
        let result = calculate_total(date(2024, 1, 4), date(2024, 1, 1), 100.0);
        assert!(matches!(result.unwrap_err(), Error::InvalidDateRange { .. }));
    }

    #[test]
    fn test_calculate_total_rejects_bad_rate() {
        assert!(calculate_total(date(2024, 1, 1), date(2024, 1, 2), -5.0).is_err());
        assert!(calculate_total(date(2024, 1, 1), date(2024, 1, 2), f64::INFINITY).is_err());
    }

    #[test]
    fn test_rental_days_across_month() {
        assert_eq!(rental_days(date(2024, 1, 30), date(2024, 2, 2)).unwrap(), 3);
    }

    #[tokio::test]
    async fn test_create_rental_marks_car_rented() -> Result<()> {
        let (db, customer, car) = setup_with_customer_and_car().await?;

        let rental = create_rental(
            &db,
            NewRental {
                customer_id: customer.id,
                car_id: car.id,
                start_date: date(2024, 1, 1),
                end_date: date(2024, 1, 4),
                daily_rate: None,
            },
        )
        .await?;

        assert_eq!(rental.total_amount, 300.0);
        assert_eq!(rental.paid_amount, 0.0);
        assert_eq!(rental.status, RentalStatus::Active);
        assert_eq!(rental.customer_name, customer.full_name);
        assert_eq!(rental.customer_phone, customer.phone);

        let car = fleet::get_car_by_id(&db, car.id).await?.unwrap();
        assert_eq!(car.status, CarStatus::Rented);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_rental_with_rate_override() -> Result<()> {
        let (db, customer, car) = setup_with_customer_and_car().await?;

        let rental = create_rental(
            &db,
            NewRental {
                customer_id: customer.id,
                car_id: car.id,
                start_date: date(2024, 3, 1),
                end_date: date(2024, 3, 3),
                daily_rate: Some(80.0),
            },
        )
        .await?;
        assert_eq!(rental.total_amount, 160.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rental_requires_available_car() -> Result<()> {
        let (db, customer, car) = setup_with_customer_and_car().await?;
        create_test_rental(&db, customer.id, car.id).await?;

        let second = create_test_rental(&db, customer.id, car.id).await;
        assert!(matches!(second.unwrap_err(), Error::CarUnavailable { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rental_unknown_customer() -> Result<()> {
        let db = setup_test_db().await?;
        let car = create_test_car(&db, "ABC-1234").await?;

        let result = create_test_rental(&db, 999, car.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "customer", .. }
        ));

        // Failed creation leaves the car untouched
        let car = fleet::get_car_by_id(&db, car.id).await?.unwrap();
        assert_eq!(car.status, CarStatus::Available);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_rentals_includes_car_and_customer() -> Result<()> {
        let (db, customer, car) = setup_with_customer_and_car().await?;
        let rental = create_test_rental(&db, customer.id, car.id).await?;

        let details = list_rentals(&db).await?;
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].rental.id, rental.id);
        assert_eq!(details[0].car.as_ref().unwrap().id, car.id);
        assert_eq!(details[0].customer.as_ref().unwrap().id, customer.id);
        assert_eq!(details[0].car_label(), "Fiat Cronos");

        let single = get_rental_details(&db, rental.id).await?;
        assert_eq!(single, details[0]);
        assert!(get_rental_details(&db, 999).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_rental() -> Result<()> {
        let (db, customer, car) = setup_with_customer_and_car().await?;
        let rental = create_test_rental(&db, customer.id, car.id).await?;

        let updated = update_rental(
            &db,
            rental.id,
            RentalUpdate {
                start_date: date(2024, 1, 2),
                end_date: date(2024, 1, 10),
                total_amount: 750.0,
                status: RentalStatus::Completed,
            },
        )
        .await?;
        assert_eq!(updated.total_amount, 750.0);
        assert_eq!(updated.status, RentalStatus::Completed);
        assert_eq!(updated.start_date, date(2024, 1, 2));

        let bad = update_rental(
            &db,
            rental.id,
            RentalUpdate {
                start_date: date(2024, 1, 10),
                end_date: date(2024, 1, 2),
                total_amount: 750.0,
                status: RentalStatus::Active,
            },
        )
        .await;
        assert!(matches!(bad.unwrap_err(), Error::InvalidDateRange { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_return_rental_frees_car() -> Result<()> {
        let (db, customer, car) = setup_with_customer_and_car().await?;
        let rental = create_test_rental(&db, customer.id, car.id).await?;

        let returned = return_rental(&db, rental.id).await?;
        assert_eq!(returned.status, RentalStatus::Completed);

        let car = fleet::get_car_by_id(&db, car.id).await?.unwrap();
        assert_eq!(car.status, CarStatus::Available);
        assert_eq!(count_rentals_with_status(&db, RentalStatus::Active).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_rental_with_payments_is_refused() -> Result<()> {
        let (db, customer, car) = setup_with_customer_and_car().await?;
        let rental = create_test_rental(&db, customer.id, car.id).await?;
        crate::core::billing::register_payment(&db, rental.id, 50.0, "Pix").await?;

        let result = delete_rental(&db, rental.id).await;
        assert!(matches!(result.unwrap_err(), Error::InUse { entity: "rental", .. }));
        assert!(get_rental_by_id(&db, rental.id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_rental_without_payments() -> Result<()> {
        let (db, customer, car) = setup_with_customer_and_car().await?;
        let rental = create_test_rental(&db, customer.id, car.id).await?;

        delete_rental(&db, rental.id).await?;
        assert!(get_rental_by_id(&db, rental.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_search_rentals() -> Result<()> {
        let (db, customer, car) = setup_with_customer_and_car().await?;
        create_test_rental(&db, customer.id, car.id).await?;
        let details = list_rentals(&db).await?;

        assert_eq!(search_rentals(&details, "joão").len(), 1);
        assert_eq!(search_rentals(&details, "cronos").len(), 1);
        assert_eq!(search_rentals(&details, "abc-1234").len(), 1);
        assert_eq!(search_rentals(&details, "").len(), 1);
        assert!(search_rentals(&details, "civic").is_empty());
        Ok(())
    }
}

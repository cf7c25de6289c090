//! Maintenance business logic - service records per car and the monthly spend summary.

use crate::{
    entities::{Car, MaintenanceKind, MaintenanceLog, car, maintenance_log},
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};

/// Data for a new service record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMaintenanceLog {
    /// Serviced car
    pub car_id: i64,
    /// Service day
    pub date: NaiveDate,
    /// What was done
    pub description: String,
    /// Preventive or corrective
    pub kind: MaintenanceKind,
    /// Amount spent
    pub cost: f64,
}

/// Editable fields of a service record. The car cannot be changed.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceUpdate {
    /// Service day
    pub date: NaiveDate,
    /// What was done
    pub description: String,
    /// Preventive or corrective
    pub kind: MaintenanceKind,
    /// Amount spent
    pub cost: f64,
}

/// A service record with its car for display.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceEntry {
    /// The record
    pub log: maintenance_log::Model,
    /// Its car, if it still exists
    pub car: Option<car::Model>,
}

impl MaintenanceEntry {
    /// "Brand Model" of the serviced car, or a placeholder
    #[must_use]
    pub fn car_label(&self) -> String {
        self.car
            .as_ref()
            .map_or_else(|| "Veículo".to_string(), |car| format!("{} {}", car.brand, car.model))
    }
}

/// Figures shown above the maintenance list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaintenanceSummary {
    /// Σ cost of services dated in the selected month
    pub month_cost: f64,
    /// Number of services dated in the selected month
    pub month_services: usize,
    /// Cars whose status is currently `maintenance`
    pub cars_in_maintenance: u64,
}

fn validate(description: &str, cost: f64) -> Result<()> {
    if description.trim().is_empty() {
        return Err(Error::validation("Maintenance description cannot be empty"));
    }
    if !cost.is_finite() || cost < 0.0 {
        return Err(Error::InvalidAmount { amount: cost });
    }
    Ok(())
}

/// Records a service performed on a car.
pub async fn create_log(
    db: &DatabaseConnection,
    input: NewMaintenanceLog,
) -> Result<maintenance_log::Model> {
    validate(&input.description, input.cost)?;

    Car::find_by_id(input.car_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("car", input.car_id))?;

    let log = maintenance_log::ActiveModel {
        car_id: Set(input.car_id),
        date: Set(input.date),
        description: Set(input.description.trim().to_string()),
        kind: Set(input.kind),
        cost: Set(input.cost),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = log.insert(db).await?;
    tracing::info!(log_id = result.id, car_id = result.car_id, "Maintenance recorded");
    Ok(result)
}

/// Every service record, latest service date first, with its car.
pub async fn list_logs(db: &DatabaseConnection) -> Result<Vec<MaintenanceEntry>> {
    let rows = MaintenanceLog::find()
        .order_by_desc(maintenance_log::Column::Date)
        .order_by_desc(maintenance_log::Column::Id)
        .find_also_related(Car)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(log, car)| MaintenanceEntry { log, car })
        .collect())
}

/// The most recently registered service records, with their car.
pub async fn list_recent_logs(db: &DatabaseConnection, limit: u64) -> Result<Vec<MaintenanceEntry>> {
    let rows = MaintenanceLog::find()
        .order_by_desc(maintenance_log::Column::CreatedAt)
        .order_by_desc(maintenance_log::Column::Id)
        .limit(limit)
        .find_also_related(Car)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(log, car)| MaintenanceEntry { log, car })
        .collect())
}

/// Finds a service record by primary key.
pub async fn get_log_by_id(
    db: &DatabaseConnection,
    log_id: i64,
) -> Result<Option<maintenance_log::Model>> {
    MaintenanceLog::find_by_id(log_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Replaces date, description, kind and cost of a service record.
pub async fn update_log(
    db: &DatabaseConnection,
    log_id: i64,
    update: MaintenanceUpdate,
) -> Result<maintenance_log::Model> {
    validate(&update.description, update.cost)?;

    let existing = MaintenanceLog::find_by_id(log_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("maintenance log", log_id))?;

    let mut log: maintenance_log::ActiveModel = existing.into();
    log.date = Set(update.date);
    log.description = Set(update.description.trim().to_string());
    log.kind = Set(update.kind);
    log.cost = Set(update.cost);

    log.update(db).await.map_err(Into::into)
}

/// Removes a service record.
pub async fn delete_log(db: &DatabaseConnection, log_id: i64) -> Result<()> {
    let result = MaintenanceLog::delete_by_id(log_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("maintenance log", log_id));
    }
    tracing::info!(log_id, "Maintenance log deleted");
    Ok(())
}

/// Aggregates spend for one calendar month.
#[must_use]
pub fn summarize(
    logs: &[maintenance_log::Model],
    year: i32,
    month: u32,
    cars_in_maintenance: u64,
) -> MaintenanceSummary {
    let in_month: Vec<&maintenance_log::Model> = logs
        .iter()
        .filter(|log| log.date.year() == year && log.date.month() == month)
        .collect();

    MaintenanceSummary {
        month_cost: in_month.iter().map(|log| log.cost).sum(),
        month_services: in_month.len(),
        cars_in_maintenance,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_log_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let car = create_test_car(&db, "ABC-1234").await?;

        let mut input = maintenance_input(car.id, 100.0);
        input.description = " ".to_string();
        assert!(matches!(
            create_log(&db, input).await.unwrap_err(),
            Error::Validation { .. }
        ));

        let input = maintenance_input(car.id, -1.0);
        assert!(matches!(
            create_log(&db, input).await.unwrap_err(),
            Error::InvalidAmount { .. }
        ));

        let input = maintenance_input(999, 10.0);
        assert!(matches!(
            create_log(&db, input).await.unwrap_err(),
            Error::NotFound { entity: "car", .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_logs_latest_date_first() -> Result<()> {
        let db = setup_test_db().await?;
        let car = create_test_car(&db, "ABC-1234").await?;

        let mut older = maintenance_input(car.id, 100.0);
        older.date = date(2024, 1, 5);
        create_log(&db, older).await?;
        let mut newer = maintenance_input(car.id, 200.0);
        newer.date = date(2024, 2, 5);
        create_log(&db, newer).await?;

        let entries = list_logs(&db).await?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].log.cost, 200.0);
        assert_eq!(entries[1].log.cost, 100.0);
        assert_eq!(entries[0].car_label(), "Fiat Cronos");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_log() -> Result<()> {
        let db = setup_test_db().await?;
        let car = create_test_car(&db, "ABC-1234").await?;
        let log = create_test_maintenance(&db, car.id, 100.0).await?;

        let updated = update_log(
            &db,
            log.id,
            MaintenanceUpdate {
                date: date(2024, 6, 1),
                description: "Troca de pastilhas".to_string(),
                kind: MaintenanceKind::Corrective,
                cost: 350.0,
            },
        )
        .await?;
        assert_eq!(updated.kind, MaintenanceKind::Corrective);
        assert_eq!(updated.cost, 350.0);
        assert_eq!(updated.car_id, car.id);

        delete_log(&db, log.id).await?;
        assert!(get_log_by_id(&db, log.id).await?.is_none());
        assert!(matches!(
            delete_log(&db, log.id).await.unwrap_err(),
            Error::NotFound { .. }
        ));
        Ok(())
    }

    #[test]
    fn test_summarize_month() {
        let now = chrono::Utc::now();
        let make = |id, day: NaiveDate, cost| maintenance_log::Model {
            id,
            car_id: 1,
            date: day,
            description: "Revisão".to_string(),
            kind: MaintenanceKind::Preventive,
            cost,
            created_at: now,
        };
        let logs = vec![
            make(1, date(2024, 5, 2), 500.0),
            make(2, date(2024, 5, 30), 750.0),
            make(3, date(2024, 4, 30), 999.0),
            make(4, date(2023, 5, 10), 999.0),
        ];

        let summary = summarize(&logs, 2024, 5, 2);
        assert_eq!(summary.month_cost, 1250.0);
        assert_eq!(summary.month_services, 2);
        assert_eq!(summary.cars_in_maintenance, 2);

        assert_eq!(summarize(&[], 2024, 5, 0), MaintenanceSummary::default());
    }
}

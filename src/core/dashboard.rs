//! Dashboard figures: headline counters, the seven-day rental chart and the activity feed.

use crate::{
    core::{
        fleet,
        maintenance::{self, MaintenanceEntry},
        rental::{self, RentalDetails},
    },
    entities::{CarStatus, Rental, RentalStatus, rental as rental_entity},
    errors::Result,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use sea_orm::{QuerySelect, prelude::*};

/// Days shown in the rental chart.
pub const CHART_DAYS: usize = 7;
/// Entries of each kind considered for the activity feed.
pub const RECENT_PER_KIND: usize = 3;
/// Entries shown in the activity feed.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 5;

/// Headline counters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardStats {
    /// Rentals with status `active`
    pub active_rentals: u64,
    /// Σ `paid_amount` across all rentals
    pub total_revenue: f64,
    /// Cars with status `available`
    pub available_cars: u64,
    /// Cars with status `maintenance`
    pub cars_in_maintenance: u64,
}

/// Kind of event in the activity feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    /// A rental was opened
    Rental,
    /// A service was recorded
    Maintenance,
}

/// One line of the activity feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityItem {
    /// What happened
    pub kind: ActivityKind,
    /// When it was registered
    pub timestamp: DateTime<Utc>,
    /// Car the event is about
    pub subject: String,
    /// Rest of the sentence
    pub detail: String,
}

impl ActivityItem {
    /// Feed line for a newly opened rental.
    #[must_use]
    pub fn from_rental(details: &RentalDetails) -> Self {
        Self {
            kind: ActivityKind::Rental,
            timestamp: details.rental.created_at,
            subject: details.car_label(),
            detail: format!("alugado para {}", details.rental.customer_name),
        }
    }

    /// Feed line for a recorded service.
    #[must_use]
    pub fn from_maintenance(entry: &MaintenanceEntry) -> Self {
        Self {
            kind: ActivityKind::Maintenance,
            timestamp: entry.log.created_at,
            subject: entry.car_label(),
            detail: format!(
                "{}: {}",
                entry.log.kind.label().to_uppercase(),
                entry.log.description
            ),
        }
    }
}

/// Loads the headline counters.
pub async fn fetch_stats(db: &DatabaseConnection) -> Result<DashboardStats> {
    let active_rentals = rental::count_rentals_with_status(db, RentalStatus::Active).await?;
    let available_cars = fleet::count_cars_with_status(db, CarStatus::Available).await?;
    let cars_in_maintenance = fleet::count_cars_with_status(db, CarStatus::Maintenance).await?;

    let paid: Vec<f64> = Rental::find()
        .select_only()
        .column(rental_entity::Column::PaidAmount)
        .into_tuple()
        .all(db)
        .await?;

    Ok(DashboardStats {
        active_rentals,
        total_revenue: paid.iter().sum(),
        available_cars,
        cars_in_maintenance,
    })
}

/// Counts rentals created on each of the last seven UTC days, oldest first.
///
/// The last bucket is `today`. Timestamps outside the window are ignored.
#[must_use]
pub fn daily_rental_counts(created_at: &[DateTime<Utc>], today: NaiveDate) -> [u32; CHART_DAYS] {
    let mut buckets = [0_u32; CHART_DAYS];
    for timestamp in created_at {
        let days_ago = usize::try_from((today - timestamp.date_naive()).num_days())
            .ok()
            .filter(|days| *days < CHART_DAYS);
        if let Some(days_ago) = days_ago {
            buckets[CHART_DAYS - 1 - days_ago] += 1;
        }
    }
    buckets
}

/// Loads rental creation times for the chart window ending `today`.
pub async fn fetch_daily_rental_counts(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<[u32; CHART_DAYS]> {
    // CHART_DAYS is a small constant
    #[allow(clippy::cast_possible_wrap)]
    let first_day = today - Duration::days(CHART_DAYS as i64 - 1);
    let window_start = first_day.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();

    let created_at: Vec<DateTime<Utc>> = Rental::find()
        .select_only()
        .column(rental_entity::Column::CreatedAt)
        .filter(rental_entity::Column::CreatedAt.gte(window_start))
        .into_tuple()
        .all(db)
        .await?;

    Ok(daily_rental_counts(&created_at, today))
}

/// Short Portuguese weekday name used under the chart bars.
#[must_use]
pub const fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Seg",
        Weekday::Tue => "Ter",
        Weekday::Wed => "Qua",
        Weekday::Thu => "Qui",
        Weekday::Fri => "Sex",
        Weekday::Sat => "Sáb",
        Weekday::Sun => "Dom",
    }
}

/// Pairs each chart bucket with the weekday it covers, oldest first.
#[must_use]
pub fn label_daily_counts(
    counts: &[u32; CHART_DAYS],
    today: NaiveDate,
) -> Vec<(&'static str, u32)> {
    counts
        .iter()
        .enumerate()
        .map(|(index, &count)| {
            // index < CHART_DAYS
            #[allow(clippy::cast_possible_wrap)]
            let day = today - Duration::days((CHART_DAYS - 1 - index) as i64);
            (weekday_label(day.weekday()), count)
        })
        .collect()
}

/// Merges the latest rentals and services into one feed, newest first.
///
/// Only the [`RECENT_PER_KIND`] newest entries of each kind take part.
#[must_use]
pub fn merge_recent_activity(
    mut rentals: Vec<ActivityItem>,
    mut maintenance: Vec<ActivityItem>,
    limit: usize,
) -> Vec<ActivityItem> {
    rentals.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    maintenance.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    rentals.truncate(RECENT_PER_KIND);
    maintenance.truncate(RECENT_PER_KIND);

    let mut merged: Vec<ActivityItem> = rentals.into_iter().chain(maintenance).collect();
    merged.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    merged.truncate(limit);
    merged
}

/// Loads and merges the activity feed.
pub async fn recent_activity(db: &DatabaseConnection, limit: usize) -> Result<Vec<ActivityItem>> {
    let per_kind = RECENT_PER_KIND as u64;
    let rentals = rental::list_recent_rentals(db, per_kind)
        .await?
        .iter()
        .map(ActivityItem::from_rental)
        .collect();
    let services = maintenance::list_recent_logs(db, per_kind)
        .await?
        .iter()
        .map(ActivityItem::from_maintenance)
        .collect();

    Ok(merge_recent_activity(rentals, services, limit))
}

//! Car entity - A vehicle in the rental fleet.
//!
//! The `status` column is written directly by the rental and fleet flows; there is no
//! state machine guarding transitions between `available`, `rented` and `maintenance`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Operational status of a car
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum CarStatus {
    /// Ready to be rented
    #[sea_orm(string_value = "available")]
    Available,
    /// Bound to an active rental
    #[sea_orm(string_value = "rented")]
    Rented,
    /// In the workshop
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
}

impl CarStatus {
    /// Display label used in operator-facing messages
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "Disponível",
            Self::Rented => "Alugado",
            Self::Maintenance => "Manutenção",
        }
    }
}

/// Car database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cars")]
pub struct Model {
    /// Unique identifier for the car
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Manufacturer (e.g., "Fiat")
    pub brand: String,
    /// Model name (e.g., "Cronos")
    pub model: String,
    /// License plate, unique per car
    #[sea_orm(unique)]
    pub license_plate: String,
    /// Model year
    pub year: i32,
    /// Price per rental day
    pub daily_rate: f64,
    /// Current operational status
    pub status: CarStatus,
    /// When the car was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Car and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One car has many rentals
    #[sea_orm(has_many = "super::rental::Entity")]
    Rentals,
    /// One car has many maintenance logs
    #[sea_orm(has_many = "super::maintenance_log::Entity")]
    MaintenanceLogs,
}

impl Related<super::rental::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rentals.def()
    }
}

impl Related<super::maintenance_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenanceLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Maintenance log entity - A dated service record for a car.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category of service performed
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceKind {
    /// Scheduled service
    #[sea_orm(string_value = "preventive")]
    Preventive,
    /// Repair after a failure
    #[sea_orm(string_value = "corrective")]
    Corrective,
}

impl MaintenanceKind {
    /// Display label used in operator-facing messages
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Preventive => "Preventiva",
            Self::Corrective => "Corretiva",
        }
    }
}

/// Maintenance log database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_logs")]
pub struct Model {
    /// Unique identifier for the log entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Serviced car
    pub car_id: i64,
    /// Day the service was performed
    pub date: Date,
    /// What was done
    pub description: String,
    /// Preventive or corrective
    #[sea_orm(column_name = "type")]
    pub kind: MaintenanceKind,
    /// Amount spent
    pub cost: f64,
    /// When the entry was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `MaintenanceLog` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each log entry belongs to one car
    #[sea_orm(
        belongs_to = "super::car::Entity",
        from = "Column::CarId",
        to = "super::car::Column::Id"
    )]
    Car,
}

impl Related<super::car::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Car.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

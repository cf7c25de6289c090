//! Rental entity - A contract binding one customer to one car for a date range.
//!
//! `customer_name` and `customer_phone` are copied from the customer at creation time.
//! `paid_amount` is expected to stay at or below `total_amount`, but nothing enforces it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a rental
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    /// Car is out with the customer
    #[sea_orm(string_value = "active")]
    Active,
    /// Car returned
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl RentalStatus {
    /// Display label used in operator-facing messages
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Ativo",
            Self::Completed => "Concluído",
        }
    }
}

/// Rental database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rentals")]
pub struct Model {
    /// Unique identifier for the rental
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Renting customer
    pub customer_id: i64,
    /// Rented car
    pub car_id: i64,
    /// Customer name at the time of the rental
    pub customer_name: String,
    /// Customer phone at the time of the rental
    pub customer_phone: String,
    /// First day of the rental
    pub start_date: Date,
    /// Return day
    pub end_date: Date,
    /// Contract value
    pub total_amount: f64,
    /// Sum of registered payments
    pub paid_amount: f64,
    /// Lifecycle status
    pub status: RentalStatus,
    /// When the rental was registered
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Remaining debt on this rental (`total_amount - paid_amount`)
    #[must_use]
    pub fn balance_due(&self) -> f64 {
        self.total_amount - self.paid_amount
    }
}

/// Defines relationships between Rental and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each rental belongs to one customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    /// Each rental belongs to one car
    #[sea_orm(
        belongs_to = "super::car::Entity",
        from = "Column::CarId",
        to = "super::car::Column::Id"
    )]
    Car,
    /// One rental has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::car::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Car.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

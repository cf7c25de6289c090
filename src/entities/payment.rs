//! Payment entity - Append-only ledger entry registered against a rental.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Rental this payment settles (partially or fully)
    pub rental_id: i64,
    /// Amount received
    pub amount: f64,
    /// Payment method label (e.g., `"Pix"`, `"Dinheiro"`)
    pub payment_method: String,
    /// When the payment was registered
    pub payment_date: DateTimeUtc,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one rental
    #[sea_orm(
        belongs_to = "super::rental::Entity",
        from = "Column::RentalId",
        to = "super::rental::Column::Id"
    )]
    Rental,
}

impl Related<super::rental::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rental.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

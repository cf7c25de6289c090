//! Customer entity - A person who rents cars.
//!
//! Document images (driver's license and proof of residence) live in object storage;
//! only their public URLs are kept on the row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    /// Unique identifier for the customer
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full legal name
    pub full_name: String,
    /// CPF (Brazilian taxpayer document)
    pub document_cpf: String,
    /// Contact phone, free-form
    pub phone: String,
    /// Optional e-mail
    pub email: Option<String>,
    /// Optional postal address
    pub address: Option<String>,
    /// Public URL of the uploaded driver's license (CNH)
    pub cnh_image_url: Option<String>,
    /// Public URL of the uploaded proof of residence
    pub residence_proof_url: Option<String>,
    /// When the customer was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Customer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One customer has many rentals
    #[sea_orm(has_many = "super::rental::Entity")]
    Rentals,
}

impl Related<super::rental::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rentals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

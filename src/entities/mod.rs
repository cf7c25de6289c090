//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities mirror the external store's tables (`cars`, `customers`, `rentals`,
//! `maintenance_logs`, `payments`). Each entity has a Model struct for data and an
//! Entity struct for operations.

pub mod car;
pub mod customer;
pub mod maintenance_log;
pub mod payment;
pub mod rental;

// Re-export specific types to avoid conflicts
pub use car::{CarStatus, Column as CarColumn, Entity as Car, Model as CarModel};
pub use customer::{Column as CustomerColumn, Entity as Customer, Model as CustomerModel};
pub use maintenance_log::{
    Column as MaintenanceLogColumn, Entity as MaintenanceLog, MaintenanceKind,
    Model as MaintenanceLogModel,
};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use rental::{Column as RentalColumn, Entity as Rental, Model as RentalModel, RentalStatus};

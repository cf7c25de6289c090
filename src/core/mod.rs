/// Admin password check and per-user sessions
pub mod access;
/// Revenue aggregates, pending collections and payments
pub mod billing;
/// Rental contract data and PDF layout
pub mod contract;
/// Customer registration and documents
pub mod customer;
/// Headline counters, rental chart and activity feed
pub mod dashboard;
/// Car registration and status
pub mod fleet;
/// Currency and date formatting
pub mod format;
/// Service records and monthly spend
pub mod maintenance;
/// Rental pricing and lifecycle
pub mod rental;

//! Discord command implementations organized by screen.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Billing commands
pub mod billing;

/// Customer management commands
pub mod customer;

/// Dashboard command
pub mod dashboard;

/// Fleet management commands
pub mod fleet;

/// General utility and login commands
pub mod general;

/// Maintenance commands
pub mod maintenance;

/// Rental commands
pub mod rental;

use crate::{bot::BotData, errors::Error};

// Export commands
pub use billing::*;
pub use customer::*;
pub use dashboard::*;
pub use fleet::*;
pub use general::*;
pub use maintenance::*;
pub use rental::*;

/// Every top-level command registered with Discord.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        ping(),
        help(),
        login(),
        logout(),
        dashboard(),
        fleet(),
        customer(),
        rental(),
        maintenance(),
        billing(),
    ]
}

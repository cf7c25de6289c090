//! Admin password configuration.
//!
//! The panel is protected by one shared password read from `ADMIN_PASSWORD`.

/// Environment variable holding the admin password.
pub const ADMIN_PASSWORD_VAR: &str = "ADMIN_PASSWORD";

/// Reads the admin password, treating an empty value as unset.
#[must_use]
pub fn get_admin_password() -> Option<String> {
    std::env::var(ADMIN_PASSWORD_VAR)
        .ok()
        .filter(|password| !password.is_empty())
}

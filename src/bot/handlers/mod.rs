//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as autocomplete.

/// Autocomplete handlers for plates, customers, rentals, maintenance logs and payment methods
pub mod autocomplete;

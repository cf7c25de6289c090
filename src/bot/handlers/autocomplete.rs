//! Autocomplete handlers for Discord slash command parameters.
//!
//! Cars are picked by license plate. Customers, rentals and maintenance logs are picked
//! from a readable label whose value is the row id.

use crate::{
    bot::BotData,
    core::{
        billing, customer, fleet,
        format::{format_currency, format_date},
        maintenance, rental,
    },
    entities::CarModel,
    errors::Error,
};
use poise::serenity_prelude as serenity;

/// Discord autocomplete limit
const MAX_CHOICES: usize = 25;
/// Discord limit for a choice label
const MAX_LABEL_CHARS: usize = 100;

fn choice(label: &str, id: i64) -> serenity::AutocompleteChoice {
    let label: String = label.chars().take(MAX_LABEL_CHARS).collect();
    serenity::AutocompleteChoice::new(label, id)
}

fn plates_matching(cars: &[CarModel], partial: &str) -> Vec<String> {
    let mut matching: Vec<String> = fleet::filter_cars(cars, partial, None)
        .into_iter()
        .map(|car| car.license_plate)
        .take(MAX_CHOICES)
        .collect();
    matching.sort();
    matching
}

/// Suggests license plates of every car.
pub async fn autocomplete_plate(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    fleet::list_cars(&ctx.data().database)
        .await
        .map(|cars| plates_matching(&cars, partial))
        .unwrap_or_default()
}

/// Suggests license plates of cars that can be rented right now.
pub async fn autocomplete_available_plate(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    fleet::list_available_cars(&ctx.data().database)
        .await
        .map(|cars| plates_matching(&cars, partial))
        .unwrap_or_default()
}

/// Suggests customers by name or CPF.
pub async fn autocomplete_customer(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<serenity::AutocompleteChoice> {
    let Ok(customers) = customer::list_customers(&ctx.data().database).await else {
        return Vec::new();
    };

    customer::filter_customers(&customers, partial)
        .iter()
        .take(MAX_CHOICES)
        .map(|c| choice(&format!("{} ({})", c.full_name, c.document_cpf), c.id))
        .collect()
}

/// Suggests rentals by customer, car or plate, newest first.
pub async fn autocomplete_rental(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<serenity::AutocompleteChoice> {
    let Ok(details) = rental::list_rentals(&ctx.data().database).await else {
        return Vec::new();
    };

    rental::search_rentals(&details, partial)
        .iter()
        .take(MAX_CHOICES)
        .map(|d| {
            let label = format!(
                "#{} {} - {} ({})",
                d.rental.id,
                d.rental.customer_name,
                d.car_label(),
                format_date(d.rental.start_date)
            );
            choice(&label, d.rental.id)
        })
        .collect()
}

/// Suggests rentals that still have an open balance.
pub async fn autocomplete_pending_rental(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<serenity::AutocompleteChoice> {
    let Ok(pending) = billing::pending_rentals(&ctx.data().database).await else {
        return Vec::new();
    };

    let needle = partial.to_lowercase();
    pending
        .iter()
        .filter(|p| {
            p.rental.customer_name.to_lowercase().contains(&needle)
                || p.car_model().to_lowercase().contains(&needle)
        })
        .take(MAX_CHOICES)
        .map(|p| {
            let label = format!(
                "#{} {} - {} (deve {})",
                p.rental.id,
                p.rental.customer_name,
                p.car_model(),
                format_currency(p.balance_due())
            );
            choice(&label, p.rental.id)
        })
        .collect()
}

/// Suggests maintenance records by car or description.
pub async fn autocomplete_maintenance_log(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<serenity::AutocompleteChoice> {
    let Ok(entries) = maintenance::list_logs(&ctx.data().database).await else {
        return Vec::new();
    };

    let needle = partial.to_lowercase();
    entries
        .iter()
        .filter(|e| {
            e.car_label().to_lowercase().contains(&needle)
                || e.log.description.to_lowercase().contains(&needle)
        })
        .take(MAX_CHOICES)
        .map(|e| {
            let label = format!(
                "{} {} - {}",
                format_date(e.log.date),
                e.car_label(),
                e.log.description
            );
            choice(&label, e.log.id)
        })
        .collect()
}

/// Suggests the configured payment methods.
pub async fn autocomplete_payment_method(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let partial_lower = partial.to_lowercase();

    ctx.data()
        .settings
        .billing
        .payment_methods
        .iter()
        .filter(|method| method.to_lowercase().contains(&partial_lower))
        .cloned()
        .collect()
}

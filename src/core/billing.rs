//! Billing business logic - revenue aggregates, pending collections and the payment ledger.
//!
//! Registering a payment raises the rental's `paid_amount` and appends a [`payment`] row
//! in the same database transaction. Overpayment is allowed but logged.

use crate::{
    core::format::format_brl,
    entities::{Car, Payment, Rental, car, payment, rental},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;

/// Revenue aggregates over a set of rentals.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BillingStats {
    /// Σ `total_amount`
    pub expected: f64,
    /// Σ `paid_amount`
    pub received: f64,
    /// `expected - received`
    pub pending: f64,
}

/// A rental with an open balance, with its car for display.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRental {
    /// The rental
    pub rental: rental::Model,
    /// Its car, if it still exists
    pub car: Option<car::Model>,
}

impl PendingRental {
    /// Remaining debt
    #[must_use]
    pub fn balance_due(&self) -> f64 {
        outstanding_balance(&self.rental)
    }

    /// Percentage of the total already paid
    #[must_use]
    pub fn progress(&self) -> f64 {
        payment_progress(self.rental.paid_amount, self.rental.total_amount)
    }

    /// Car model name, or a placeholder
    #[must_use]
    pub fn car_model(&self) -> &str {
        self.car.as_ref().map_or("veículo", |car| car.model.as_str())
    }
}

/// A ledger entry with the context needed to display it.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    /// The payment
    pub payment: payment::Model,
    /// Name on the rental it settles
    pub customer_name: Option<String>,
    /// Model of the rented car
    pub car_model: Option<String>,
}

/// Sums expected and received amounts across rentals.
#[must_use]
pub fn compute_billing_stats(rentals: &[rental::Model]) -> BillingStats {
    let expected: f64 = rentals.iter().map(|r| r.total_amount).sum();
    let received: f64 = rentals.iter().map(|r| r.paid_amount).sum();
    BillingStats {
        expected,
        received,
        pending: expected - received,
    }
}

/// Percentage of `total` covered by `paid`; 0 when there is nothing to pay.
#[must_use]
pub fn payment_progress(paid: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    (paid / total) * 100.0
}

/// Amount still owed on a rental.
#[must_use]
pub fn outstanding_balance(rental: &rental::Model) -> f64 {
    rental.balance_due()
}

/// Loads every rental and aggregates it.
pub async fn fetch_billing_stats(db: &DatabaseConnection) -> Result<BillingStats> {
    let rentals = Rental::find().all(db).await?;
    Ok(compute_billing_stats(&rentals))
}

/// Rentals whose paid amount is still below the total, newest first.
pub async fn pending_rentals(db: &DatabaseConnection) -> Result<Vec<PendingRental>> {
    let rows = Rental::find()
        .order_by_desc(rental::Column::CreatedAt)
        .order_by_desc(rental::Column::Id)
        .find_also_related(Car)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter(|(rental, _)| rental.paid_amount < rental.total_amount)
        .map(|(rental, car)| PendingRental { rental, car })
        .collect())
}

/// Registers a payment against a rental.
///
/// The amount must be a positive, finite number. Returns the new ledger entry.
pub async fn register_payment(
    db: &DatabaseConnection,
    rental_id: i64,
    amount: f64,
    method: &str,
) -> Result<payment::Model> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    if method.trim().is_empty() {
        return Err(Error::validation("Payment method cannot be empty"));
    }

    let txn = db.begin().await?;

    let existing = Rental::find_by_id(rental_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("rental", rental_id))?;

    let new_paid = existing.paid_amount + amount;
    if new_paid > existing.total_amount {
        tracing::warn!(
            rental_id,
            paid = new_paid,
            total = existing.total_amount,
            "Payment exceeds rental total"
        );
    }

    let mut rental: rental::ActiveModel = existing.into();
    rental.paid_amount = Set(new_paid);
    rental.update(&txn).await?;

    let entry = payment::ActiveModel {
        rental_id: Set(rental_id),
        amount: Set(amount),
        payment_method: Set(method.trim().to_string()),
        payment_date: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let result = entry.insert(&txn).await?;

    txn.commit().await?;

    tracing::info!(rental_id, amount, method, "Payment registered");
    Ok(result)
}

/// All payments, newest first, with customer name and car model.
pub async fn payment_history(db: &DatabaseConnection) -> Result<Vec<PaymentRecord>> {
    let rows = Payment::find()
        .order_by_desc(payment::Column::PaymentDate)
        .order_by_desc(payment::Column::Id)
        .find_also_related(Rental)
        .all(db)
        .await?;

    let car_ids: Vec<i64> = rows
        .iter()
        .filter_map(|(_, rental)| rental.as_ref().map(|r| r.car_id))
        .collect();
    let car_models: HashMap<i64, String> = Car::find()
        .filter(car::Column::Id.is_in(car_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|car| (car.id, car.model))
        .collect();

    Ok(rows
        .into_iter()
        .map(|(payment, rental)| PaymentRecord {
            customer_name: rental.as_ref().map(|r| r.customer_name.clone()),
            car_model: rental
                .as_ref()
                .and_then(|r| car_models.get(&r.car_id).cloned()),
            payment,
        })
        .collect())
}

/// Payments registered against one rental, newest first.
pub async fn payments_for_rental(
    db: &DatabaseConnection,
    rental_id: i64,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::RentalId.eq(rental_id))
        .order_by_desc(payment::Column::PaymentDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Friendly collection reminder for a customer with an open balance.
#[must_use]
pub fn collection_message(rental: &rental::Model, car_model: &str) -> String {
    format!(
        "Olá {}! Vimos que você possui um saldo pendente de R$ {} referente ao seu aluguel do {}. \
         Como podemos facilitar o pagamento para você?",
        rental.customer_name,
        format_brl(outstanding_balance(rental)),
        car_model
    )
}

/// WhatsApp deep link that opens a chat with `phone` pre-filled with `message`.
///
/// Every non-digit is dropped from the phone number.
#[must_use]
pub fn whatsapp_link(phone: &str, message: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    format!("https://wa.me/{digits}?text={}", urlencoding::encode(message))
}

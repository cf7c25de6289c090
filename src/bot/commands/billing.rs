//! Billing Discord commands - revenue summary, pending collections, payments and WhatsApp
//! reminders.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{
            billing,
            format::{
                DISCORD_MESSAGE_LIMIT, LIST_TEXT_LIMIT, format_currency, format_date,
                format_progress_bar, format_timestamp, join_within_budget, truncate_chars,
            },
            rental,
        },
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Entries shown by `/billing pending` and `/billing history` before truncating.
    const LIST_LIMIT: usize = 15;

    fn pending_entry(p: &billing::PendingRental) -> String {
        format!(
            "**#{}** {} · {}\n  Pago {} de {} · deve **{}**\n  {}",
            p.rental.id,
            truncate_chars(&p.rental.customer_name, LIST_TEXT_LIMIT),
            truncate_chars(p.car_model(), LIST_TEXT_LIMIT),
            format_currency(p.rental.paid_amount),
            format_currency(p.rental.total_amount),
            format_currency(p.balance_due()),
            format_progress_bar(p.progress(), None)
        )
    }

    fn history_line(record: &billing::PaymentRecord) -> String {
        format!(
            "{} · **{}** · {} · {} ({})",
            format_timestamp(record.payment.payment_date),
            format_currency(record.payment.amount),
            truncate_chars(&record.payment.payment_method, LIST_TEXT_LIMIT),
            truncate_chars(
                record.customer_name.as_deref().unwrap_or("Cliente removido"),
                LIST_TEXT_LIMIT
            ),
            truncate_chars(record.car_model.as_deref().unwrap_or("veículo"), LIST_TEXT_LIMIT)
        )
    }

    /// Manage collections and payments.
    #[poise::command(
        slash_command,
        subcommands(
            "billing_summary",
            "billing_pending",
            "billing_history",
            "billing_pay",
            "billing_remind",
            "billing_details"
        ),
        subcommand_required
    )]
    pub async fn billing(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Shows expected, received and pending revenue.
    #[poise::command(slash_command, rename = "summary")]
    pub async fn billing_summary(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let stats = billing::fetch_billing_stats(&ctx.data().database).await?;
        let progress = billing::payment_progress(stats.received, stats.expected);

        let mut response = String::from("💰 **Resumo Financeiro**\n\n");
        writeln!(&mut response, "📈 Receita esperada: **{}**", format_currency(stats.expected))?;
        writeln!(&mut response, "✅ Recebido: **{}**", format_currency(stats.received))?;
        writeln!(&mut response, "⏳ A receber: **{}**", format_currency(stats.pending))?;
        writeln!(&mut response, "\n{}", format_progress_bar(progress, Some(20)))?;

        ctx.say(response).await?;
        Ok(())
    }

    /// Lists rentals with an open balance.
    #[poise::command(slash_command, rename = "pending")]
    pub async fn billing_pending(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let pending = billing::pending_rentals(&ctx.data().database).await?;

        if pending.is_empty() {
            ctx.say("🎉 Nenhuma cobrança pendente.").await?;
            return Ok(());
        }

        let header = format!("⏳ **Cobranças Pendentes** ({})\n\n", pending.len());
        let lines: Vec<String> = pending.iter().map(pending_entry).collect();
        let response = join_within_budget(&header, &lines, LIST_LIMIT, DISCORD_MESSAGE_LIMIT);

        ctx.say(response).await?;
        Ok(())
    }

    /// Lists registered payments, newest first.
    #[poise::command(slash_command, rename = "history")]
    pub async fn billing_history(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let history = billing::payment_history(&ctx.data().database).await?;

        if history.is_empty() {
            ctx.say("📜 Nenhum pagamento registrado.").await?;
            return Ok(());
        }

        let header = format!("📜 **Histórico de Pagamentos** ({})\n\n", history.len());
        let lines: Vec<String> = history.iter().map(history_line).collect();
        let response = join_within_budget(&header, &lines, LIST_LIMIT, DISCORD_MESSAGE_LIMIT);

        ctx.say(response).await?;
        Ok(())
    }

    /// Registers a payment against a rental.
    #[poise::command(slash_command, rename = "pay")]
    pub async fn billing_pay(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Aluguel com saldo pendente"]
        #[autocomplete = "autocomplete::autocomplete_pending_rental"]
        rental_id: i64,
        #[description = "Valor recebido"] amount: f64,
        #[description = "Forma de pagamento"]
        #[autocomplete = "autocomplete::autocomplete_payment_method"]
        method: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let method = method.unwrap_or_else(|| data.settings.billing.default_method().to_string());

        let payment = billing::register_payment(&data.database, rental_id, amount, &method).await?;
        let details = rental::get_rental_details(&data.database, rental_id).await?;
        let balance = billing::outstanding_balance(&details.rental);

        let mut response = format!(
            "✅ Pagamento de **{}** ({}) registrado para {} · {}.",
            format_currency(payment.amount),
            payment.payment_method,
            details.rental.customer_name,
            details.car_label()
        );
        if balance > 0.0 {
            write!(&mut response, "\n⏳ Saldo restante: {}", format_currency(balance))?;
        } else if balance < 0.0 {
            write!(
                &mut response,
                "\n⚠️ Pago {} acima do total do aluguel.",
                format_currency(-balance)
            )?;
        } else {
            write!(&mut response, "\n🎉 Aluguel quitado!")?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Builds a WhatsApp collection reminder for a rental with an open balance.
    #[poise::command(slash_command, rename = "remind")]
    pub async fn billing_remind(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Aluguel com saldo pendente"]
        #[autocomplete = "autocomplete::autocomplete_pending_rental"]
        rental_id: i64,
    ) -> Result<()> {
        let details = rental::get_rental_details(&ctx.data().database, rental_id).await?;
        let rental = &details.rental;

        if billing::outstanding_balance(rental) <= 0.0 {
            ctx.say(format!("✅ O aluguel #{rental_id} não possui saldo pendente."))
                .await?;
            return Ok(());
        }

        let car_model = details.car.as_ref().map_or("veículo", |car| car.model.as_str());
        let message = billing::collection_message(rental, car_model);
        let link = billing::whatsapp_link(&rental.customer_phone, &message);

        ctx.say(format!(
            "💬 **Lembrete para {}**\n\n> {}\n\n[Abrir no WhatsApp]({})",
            rental.customer_name, message, link
        ))
        .await?;
        Ok(())
    }

    /// Shows a rental's balance and every payment registered against it.
    #[poise::command(slash_command, rename = "details")]
    pub async fn billing_details(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Aluguel"]
        #[autocomplete = "autocomplete::autocomplete_rental"]
        rental_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let details = rental::get_rental_details(db, rental_id).await?;
        let payments = billing::payments_for_rental(db, rental_id).await?;
        let rental = &details.rental;

        let mut header = format!(
            "🧾 **Aluguel #{}** · {} · {}\n{} até {}\n\n",
            rental.id,
            truncate_chars(&rental.customer_name, LIST_TEXT_LIMIT),
            truncate_chars(&details.car_label(), LIST_TEXT_LIMIT),
            format_date(rental.start_date),
            format_date(rental.end_date)
        );
        writeln!(&mut header, "Total: **{}**", format_currency(rental.total_amount))?;
        writeln!(&mut header, "Pago: **{}**", format_currency(rental.paid_amount))?;
        writeln!(
            &mut header,
            "Saldo: **{}**",
            format_currency(billing::outstanding_balance(rental))
        )?;
        writeln!(
            &mut header,
            "{}\n",
            format_progress_bar(
                billing::payment_progress(rental.paid_amount, rental.total_amount),
                None
            )
        )?;

        let response = if payments.is_empty() {
            header + "_Nenhum pagamento registrado._"
        } else {
            let lines: Vec<String> = payments
                .iter()
                .map(|payment| {
                    format!(
                        "• {} · {} · {}",
                        format_timestamp(payment.payment_date),
                        format_currency(payment.amount),
                        truncate_chars(&payment.payment_method, LIST_TEXT_LIMIT)
                    )
                })
                .collect();
            join_within_budget(&header, &lines, lines.len(), DISCORD_MESSAGE_LIMIT)
        };

        ctx.say(response).await?;
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::entities::{RentalStatus, payment, rental as rental_entity};
        use chrono::{NaiveDate, Utc};

        fn pending(id: i64) -> billing::PendingRental {
            billing::PendingRental {
                rental: rental_entity::Model {
                    id,
                    customer_id: 1,
                    car_id: 1,
                    customer_name: "Maria Aparecida dos Santos Oliveira".to_string(),
                    customer_phone: "11987654321".to_string(),
                    start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default(),
                    end_date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap_or_default(),
                    total_amount: 1300.0,
                    paid_amount: 100.0,
                    status: RentalStatus::Active,
                    created_at: Utc::now(),
                },
                car: None,
            }
        }

        #[test]
        fn test_pending_and_history_stay_within_message_limit() {
            let rentals: Vec<billing::PendingRental> = (1..=40).map(pending).collect();
            let lines: Vec<String> = rentals.iter().map(pending_entry).collect();
            let response = join_within_budget("⏳ **Cobranças Pendentes** (40)\n\n", &lines, LIST_LIMIT, DISCORD_MESSAGE_LIMIT);
            assert!(response.chars().count() <= DISCORD_MESSAGE_LIMIT);
            assert!(response.contains("_… e mais "));

            let records: Vec<billing::PaymentRecord> = (1..=40)
                .map(|id| billing::PaymentRecord {
                    payment: payment::Model {
                        id,
                        rental_id: id,
                        amount: 1250.5,
                        payment_method: "Cartão de Crédito".to_string(),
                        payment_date: Utc::now(),
                    },
                    customer_name: Some("Maria Aparecida dos Santos Oliveira".to_string()),
                    car_model: None,
                })
                .collect();
            let lines: Vec<String> = records.iter().map(history_line).collect();
            let response = join_within_budget("📜 **Histórico de Pagamentos** (40)\n\n", &lines, LIST_LIMIT, DISCORD_MESSAGE_LIMIT);
            assert!(response.chars().count() <= DISCORD_MESSAGE_LIMIT);
            assert!(response.ends_with("_… e mais 25_\n"));
        }
    }
}

// Re-export all commands
pub use inner::*;

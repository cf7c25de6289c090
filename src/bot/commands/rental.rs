//! Rental Discord commands - open, list, edit, return and delete rentals, and generate
//! the rental contract PDF.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{
            contract::{self, ContractData},
            fleet,
            format::{
                DISCORD_MESSAGE_LIMIT, LIST_TEXT_LIMIT, format_currency, format_date,
                join_within_budget, parse_date, truncate_chars,
            },
            rental::{self, NewRental, RentalDetails, RentalUpdate},
        },
        entities::RentalStatus,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Entries shown by `/rental list` before truncating.
    const LIST_LIMIT: usize = 20;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum RentalStatusChoice {
        #[name = "Ativo"]
        Active,
        #[name = "Concluído"]
        Completed,
    }

    impl From<RentalStatusChoice> for RentalStatus {
        fn from(choice: RentalStatusChoice) -> Self {
            match choice {
                RentalStatusChoice::Active => Self::Active,
                RentalStatusChoice::Completed => Self::Completed,
            }
        }
    }

    const fn status_emoji(status: RentalStatus) -> &'static str {
        match status {
            RentalStatus::Active => "🟢",
            RentalStatus::Completed => "⚪",
        }
    }

    fn summary_line(details: &RentalDetails) -> String {
        let rental = &details.rental;
        let plate = details
            .car
            .as_ref()
            .map_or("S/P", |car| car.license_plate.as_str());
        format!(
            "{} **#{}** {} · {} `{}` · {} até {} · {} (pago {}) · {}",
            status_emoji(rental.status),
            rental.id,
            truncate_chars(&rental.customer_name, LIST_TEXT_LIMIT),
            truncate_chars(&details.car_label(), LIST_TEXT_LIMIT),
            plate,
            format_date(rental.start_date),
            format_date(rental.end_date),
            format_currency(rental.total_amount),
            format_currency(rental.paid_amount),
            rental.status.label()
        )
    }

    /// Manage rentals.
    #[poise::command(
        slash_command,
        subcommands(
            "rental_new",
            "rental_list",
            "rental_edit",
            "rental_return",
            "rental_delete",
            "rental_contract"
        ),
        subcommand_required
    )]
    pub async fn rental(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Opens a rental for an available car.
    #[poise::command(slash_command, rename = "new")]
    pub async fn rental_new(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Cliente"]
        #[autocomplete = "autocomplete::autocomplete_customer"]
        customer_id: i64,
        #[description = "Placa do veículo disponível"]
        #[autocomplete = "autocomplete::autocomplete_available_plate"]
        plate: String,
        #[description = "Data de retirada (dd/mm/aaaa)"] start_date: String,
        #[description = "Data de devolução (dd/mm/aaaa)"] end_date: String,
        #[description = "Diária (padrão: diária do veículo)"] daily_rate: Option<f64>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let start_date = parse_date(&start_date)?;
        let end_date = parse_date(&end_date)?;

        let Some(car) = fleet::get_car_by_plate(db, &plate).await? else {
            ctx.say(format!("❌ Veículo com placa '{plate}' não encontrado."))
                .await?;
            return Ok(());
        };

        let created = rental::create_rental(
            db,
            NewRental {
                customer_id,
                car_id: car.id,
                start_date,
                end_date,
                daily_rate,
            },
        )
        .await?;

        let days = rental::rental_days(start_date, end_date)?;
        ctx.say(format!(
            "✅ Aluguel **#{}** criado: {} · {} {} · {} dia(s) · total {}.\n\
             Gere o contrato com `/rental contract`.",
            created.id,
            created.customer_name,
            car.brand,
            car.model,
            days,
            format_currency(created.total_amount)
        ))
        .await?;
        Ok(())
    }

    /// Lists rentals, newest first, optionally filtered by customer, car or plate.
    #[poise::command(slash_command, rename = "list")]
    pub async fn rental_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Cliente, veículo ou placa"] search: Option<String>,
    ) -> Result<()> {
        let details = rental::list_rentals(&ctx.data().database).await?;
        let found = rental::search_rentals(&details, search.as_deref().unwrap_or(""));

        if found.is_empty() {
            ctx.say("📋 Nenhum aluguel encontrado.").await?;
            return Ok(());
        }

        let header = format!("📋 **Aluguéis** ({})\n\n", found.len());
        let lines: Vec<String> = found.iter().map(summary_line).collect();
        let response = join_within_budget(&header, &lines, LIST_LIMIT, DISCORD_MESSAGE_LIMIT);

        ctx.say(response).await?;
        Ok(())
    }

    /// Edits dates, total or status of a rental. Only the given fields change.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn rental_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Aluguel"]
        #[autocomplete = "autocomplete::autocomplete_rental"]
        rental_id: i64,
        #[description = "Data de retirada (dd/mm/aaaa)"] start_date: Option<String>,
        #[description = "Data de devolução (dd/mm/aaaa)"] end_date: Option<String>,
        #[description = "Valor total"] total_amount: Option<f64>,
        #[description = "Status"] status: Option<RentalStatusChoice>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(existing) = rental::get_rental_by_id(db, rental_id).await? else {
            ctx.say(format!("❌ Aluguel #{rental_id} não encontrado."))
                .await?;
            return Ok(());
        };

        let update = RentalUpdate {
            start_date: start_date
                .as_deref()
                .map(parse_date)
                .transpose()?
                .unwrap_or(existing.start_date),
            end_date: end_date
                .as_deref()
                .map(parse_date)
                .transpose()?
                .unwrap_or(existing.end_date),
            total_amount: total_amount.unwrap_or(existing.total_amount),
            status: status.map_or(existing.status, Into::into),
        };
        rental::update_rental(db, rental_id, update).await?;

        let details = rental::get_rental_details(db, rental_id).await?;
        ctx.say(format!("✅ Aluguel atualizado.\n{}", summary_line(&details)))
            .await?;
        Ok(())
    }

    /// Marks a rental as returned and frees its car.
    #[poise::command(slash_command, rename = "return")]
    pub async fn rental_return(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Aluguel"]
        #[autocomplete = "autocomplete::autocomplete_rental"]
        rental_id: i64,
    ) -> Result<()> {
        let returned = rental::return_rental(&ctx.data().database, rental_id).await?;

        let mut response = format!(
            "✅ Aluguel **#{}** concluído. Veículo disponível novamente.",
            returned.id
        );
        if returned.balance_due() > 0.0 {
            write!(
                &mut response,
                "\n⚠️ Saldo pendente: {}",
                format_currency(returned.balance_due())
            )?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Deletes a rental with no payments registered.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn rental_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Aluguel"]
        #[autocomplete = "autocomplete::autocomplete_rental"]
        rental_id: i64,
    ) -> Result<()> {
        match rental::delete_rental(&ctx.data().database, rental_id).await {
            Ok(()) => {
                ctx.say(format!("🗑️ Aluguel #{rental_id} excluído.")).await?;
            }
            Err(Error::InUse { dependents, .. }) => {
                ctx.say(format!(
                    "❌ O aluguel #{rental_id} possui pagamentos registrados ({dependents}) e não pode ser excluído."
                ))
                .await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Generates the rental contract PDF.
    ///
    /// The file is sent as an attachment. If Discord rejects it, the contract is saved
    /// to the configured contracts directory instead.
    #[poise::command(slash_command, rename = "contract")]
    pub async fn rental_contract(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Aluguel"]
        #[autocomplete = "autocomplete::autocomplete_rental"]
        rental_id: i64,
    ) -> Result<()> {
        ctx.defer().await?;

        let data = ctx.data();
        let details = rental::get_rental_details(&data.database, rental_id).await?;
        let contract_data = ContractData::from_details(
            &details,
            &data.settings.company,
            &data.settings.contracts.clauses,
            chrono::Utc::now(),
        );
        let file_name = contract_data.file_name();
        let bytes = match contract::render_contract(&contract_data) {
            Ok(bytes) => bytes,
            Err(render_error) => {
                tracing::error!(rental_id, error = %render_error, "Contract could not be rendered");
                ctx.say("❌ Erro ao gerar contrato. Por favor, contate o suporte.")
                    .await?;
                return Ok(());
            }
        };
        tracing::info!(rental_id, %file_name, size = bytes.len(), "Contract rendered");

        let reply = poise::CreateReply::default()
            .content(format!("📄 Contrato gerado: `{file_name}`"))
            .attachment(serenity::CreateAttachment::bytes(bytes.clone(), file_name.clone()));
        let Err(send_error) = ctx.send(reply).await else {
            return Ok(());
        };
        tracing::warn!(rental_id, error = %send_error, "Contract attachment failed, saving to disk");

        match contract::save_contract(&data.settings.contracts.output_dir, &file_name, &bytes).await {
            Ok(path) => {
                ctx.say(format!(
                    "⚠️ O envio do arquivo falhou, mas o contrato foi salvo em `{}`.",
                    path.display()
                ))
                .await?;
            }
            Err(save_error) => {
                tracing::error!(rental_id, error = %save_error, "Contract could not be saved");
                ctx.say("❌ Erro ao gerar contrato. Por favor, contate o suporte.")
                    .await?;
            }
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::entities::{CarStatus, car, rental as rental_entity};
        use chrono::{NaiveDate, Utc};

        fn details(id: i64, customer_name: &str) -> RentalDetails {
            let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default();
            let end = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap_or_default();
            RentalDetails {
                rental: rental_entity::Model {
                    id,
                    customer_id: 1,
                    car_id: 1,
                    customer_name: customer_name.to_string(),
                    customer_phone: "11987654321".to_string(),
                    start_date: start,
                    end_date: end,
                    total_amount: 1300.0,
                    paid_amount: 100.0,
                    status: RentalStatus::Active,
                    created_at: Utc::now(),
                },
                car: Some(car::Model {
                    id: 1,
                    brand: "Volkswagen".to_string(),
                    model: "Gol".to_string(),
                    license_plate: "ABC1D23".to_string(),
                    year: 2022,
                    daily_rate: 100.0,
                    status: CarStatus::Rented,
                    created_at: Utc::now(),
                }),
                customer: None,
            }
        }

        #[test]
        fn test_rental_list_stays_within_message_limit() {
            let found: Vec<RentalDetails> = (1..=LIST_LIMIT as i64 + 5)
                .map(|id| details(id, "Maria Aparecida dos Santos"))
                .collect();
            let lines: Vec<String> = found.iter().map(summary_line).collect();
            let response = join_within_budget(
                &format!("📋 **Aluguéis** ({})\n\n", found.len()),
                &lines,
                LIST_LIMIT,
                DISCORD_MESSAGE_LIMIT,
            );

            assert!(lines.iter().map(|l| l.chars().count() + 1).sum::<usize>() > DISCORD_MESSAGE_LIMIT);
            assert!(response.chars().count() <= DISCORD_MESSAGE_LIMIT);
            assert!(response.contains("_… e mais "));
        }

        #[test]
        fn test_summary_line_shortens_long_names() {
            let line = summary_line(&details(7, &"Maria Aparecida ".repeat(20)));
            assert!(line.contains('…'));
            assert!(line.contains("`ABC1D23`"));
            assert!(line.chars().count() < 200);
        }
    }
}

// Re-export all commands
pub use inner::*;

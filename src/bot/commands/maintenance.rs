//! Maintenance Discord commands - record, list, edit and remove service records, plus the
//! monthly spend summary.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{
            fleet,
            format::{
                DISCORD_MESSAGE_LIMIT, LIST_TEXT_LIMIT, format_currency, format_date,
                join_within_budget, parse_date, truncate_chars,
            },
            maintenance::{self, MaintenanceEntry, MaintenanceUpdate, NewMaintenanceLog},
        },
        entities::{CarStatus, MaintenanceKind},
        errors::{Error, Result},
    };
    use chrono::Datelike;
    use std::fmt::Write;

    /// Entries shown by `/maintenance list` before truncating.
    const LIST_LIMIT: usize = 20;
    /// Longest description echoed back after an add or edit.
    const REPLY_TEXT_LIMIT: usize = 500;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum KindChoice {
        #[name = "Preventiva"]
        Preventive,
        #[name = "Corretiva"]
        Corrective,
    }

    impl From<KindChoice> for MaintenanceKind {
        fn from(choice: KindChoice) -> Self {
            match choice {
                KindChoice::Preventive => Self::Preventive,
                KindChoice::Corrective => Self::Corrective,
            }
        }
    }

    const fn kind_emoji(kind: MaintenanceKind) -> &'static str {
        match kind {
            MaintenanceKind::Preventive => "🛠️",
            MaintenanceKind::Corrective => "🔧",
        }
    }

    fn entry_line(entry: &MaintenanceEntry) -> String {
        let plate = entry
            .car
            .as_ref()
            .map_or("S/P", |car| car.license_plate.as_str());
        format!(
            "{} {} · **{}** `{}` · {} · {} · {}",
            kind_emoji(entry.log.kind),
            format_date(entry.log.date),
            truncate_chars(&entry.car_label(), LIST_TEXT_LIMIT),
            plate,
            entry.log.kind.label(),
            truncate_chars(&entry.log.description, LIST_TEXT_LIMIT),
            format_currency(entry.log.cost)
        )
    }

    /// Manage service records.
    #[poise::command(
        slash_command,
        subcommands(
            "maintenance_list",
            "maintenance_add",
            "maintenance_edit",
            "maintenance_delete",
            "maintenance_summary"
        ),
        subcommand_required
    )]
    pub async fn maintenance(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Lists service records, latest first, optionally for one car.
    #[poise::command(slash_command, rename = "list")]
    pub async fn maintenance_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Placa do veículo"]
        #[autocomplete = "autocomplete::autocomplete_plate"]
        plate: Option<String>,
    ) -> Result<()> {
        let entries = maintenance::list_logs(&ctx.data().database).await?;
        let entries: Vec<&MaintenanceEntry> = match plate.as_deref() {
            Some(plate) => {
                let wanted = fleet::normalize_plate(plate);
                entries
                    .iter()
                    .filter(|e| {
                        e.car
                            .as_ref()
                            .is_some_and(|car| fleet::normalize_plate(&car.license_plate) == wanted)
                    })
                    .collect()
            }
            None => entries.iter().collect(),
        };

        if entries.is_empty() {
            ctx.say("🛠️ Nenhuma manutenção registrada.").await?;
            return Ok(());
        }

        let header = format!("🛠️ **Manutenções** ({})\n\n", entries.len());
        let lines: Vec<String> = entries.iter().map(|entry| entry_line(entry)).collect();
        let response = join_within_budget(&header, &lines, LIST_LIMIT, DISCORD_MESSAGE_LIMIT);

        ctx.say(response).await?;
        Ok(())
    }

    /// Records a service performed on a car.
    #[poise::command(slash_command, rename = "add")]
    pub async fn maintenance_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Placa do veículo"]
        #[autocomplete = "autocomplete::autocomplete_plate"]
        plate: String,
        #[description = "Data do serviço (dd/mm/aaaa)"] date: String,
        #[description = "Descrição do serviço"] description: String,
        #[description = "Tipo"] kind: KindChoice,
        #[description = "Custo"] cost: f64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let date = parse_date(&date)?;

        let Some(car) = fleet::get_car_by_plate(db, &plate).await? else {
            ctx.say(format!("❌ Veículo com placa '{plate}' não encontrado."))
                .await?;
            return Ok(());
        };

        let log = maintenance::create_log(
            db,
            NewMaintenanceLog {
                car_id: car.id,
                date,
                description,
                kind: kind.into(),
                cost,
            },
        )
        .await?;

        let mut response = format!(
            "✅ Manutenção registrada para **{} {}** (`{}`): {} · {}",
            car.brand,
            car.model,
            car.license_plate,
            truncate_chars(&log.description, REPLY_TEXT_LIMIT),
            format_currency(log.cost)
        );
        if car.status != CarStatus::Maintenance {
            write!(
                &mut response,
                "\nℹ️ Use `/fleet status` para marcar o veículo como em manutenção."
            )?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Edits a service record. Only the given fields change.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn maintenance_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Registro de manutenção"]
        #[autocomplete = "autocomplete::autocomplete_maintenance_log"]
        log_id: i64,
        #[description = "Data do serviço (dd/mm/aaaa)"] date: Option<String>,
        #[description = "Descrição do serviço"] description: Option<String>,
        #[description = "Tipo"] kind: Option<KindChoice>,
        #[description = "Custo"] cost: Option<f64>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(existing) = maintenance::get_log_by_id(db, log_id).await? else {
            ctx.say(format!("❌ Registro de manutenção #{log_id} não encontrado."))
                .await?;
            return Ok(());
        };

        let update = MaintenanceUpdate {
            date: date
                .as_deref()
                .map(parse_date)
                .transpose()?
                .unwrap_or(existing.date),
            description: description.unwrap_or(existing.description),
            kind: kind.map_or(existing.kind, Into::into),
            cost: cost.unwrap_or(existing.cost),
        };
        let updated = maintenance::update_log(db, log_id, update).await?;

        ctx.say(format!(
            "✅ Manutenção atualizada: {} · {} · {} · {}",
            format_date(updated.date),
            updated.kind.label(),
            truncate_chars(&updated.description, REPLY_TEXT_LIMIT),
            format_currency(updated.cost)
        ))
        .await?;
        Ok(())
    }

    /// Removes a service record.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn maintenance_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Registro de manutenção"]
        #[autocomplete = "autocomplete::autocomplete_maintenance_log"]
        log_id: i64,
    ) -> Result<()> {
        maintenance::delete_log(&ctx.data().database, log_id).await?;
        ctx.say(format!("🗑️ Registro de manutenção #{log_id} removido."))
            .await?;
        Ok(())
    }

    /// Shows spend for a month and the cars currently in the workshop.
    #[poise::command(slash_command, rename = "summary")]
    pub async fn maintenance_summary(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Mês (1-12, padrão: mês atual)"]
        #[min = 1]
        #[max = 12]
        month: Option<u32>,
        #[description = "Ano (padrão: ano atual)"] year: Option<i32>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let today = chrono::Utc::now().date_naive();
        let month = month.unwrap_or_else(|| today.month());
        let year = year.unwrap_or_else(|| today.year());

        let entries = maintenance::list_logs(db).await?;
        let logs: Vec<_> = entries.into_iter().map(|entry| entry.log).collect();
        let in_workshop = fleet::count_cars_with_status(db, CarStatus::Maintenance).await?;
        let summary = maintenance::summarize(&logs, year, month, in_workshop);

        let mut response = format!("📊 **Manutenção · {month:02}/{year}**\n\n");
        writeln!(
            &mut response,
            "💸 Gasto no mês: **{}**",
            format_currency(summary.month_cost)
        )?;
        writeln!(&mut response, "🧾 Serviços no mês: **{}**", summary.month_services)?;
        writeln!(
            &mut response,
            "🚧 Veículos em manutenção agora: **{}**",
            summary.cars_in_maintenance
        )?;

        ctx.say(response).await?;
        Ok(())
    }

}

// Re-export all commands
pub use inner::*;

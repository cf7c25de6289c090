//! Fleet Discord commands - list, register, edit, change status and remove cars.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{
            fleet::{self, CarInput},
            format::{
                DISCORD_MESSAGE_LIMIT, LIST_TEXT_LIMIT, format_currency, join_within_budget,
                truncate_chars,
            },
        },
        entities::CarStatus,
        errors::{Error, Result},
    };

    /// Entries shown by `/fleet list` before truncating.
    const LIST_LIMIT: usize = 25;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum StatusChoice {
        #[name = "Disponível"]
        Available,
        #[name = "Alugado"]
        Rented,
        #[name = "Manutenção"]
        Maintenance,
    }

    impl From<StatusChoice> for CarStatus {
        fn from(choice: StatusChoice) -> Self {
            match choice {
                StatusChoice::Available => Self::Available,
                StatusChoice::Rented => Self::Rented,
                StatusChoice::Maintenance => Self::Maintenance,
            }
        }
    }

    const fn status_emoji(status: CarStatus) -> &'static str {
        match status {
            CarStatus::Available => "🟢",
            CarStatus::Rented => "🔵",
            CarStatus::Maintenance => "🟠",
        }
    }

    async fn find_car(
        ctx: poise::Context<'_, BotData, Error>,
        plate: &str,
    ) -> Result<Option<crate::entities::car::Model>> {
        let car = fleet::get_car_by_plate(&ctx.data().database, plate).await?;
        if car.is_none() {
            ctx.say(format!("❌ Veículo com placa '{plate}' não encontrado."))
                .await?;
        }
        Ok(car)
    }

    /// Manage the car fleet.
    #[poise::command(
        slash_command,
        subcommands("fleet_list", "fleet_add", "fleet_edit", "fleet_status", "fleet_delete"),
        subcommand_required
    )]
    pub async fn fleet(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Lists cars, optionally filtered by text and status.
    #[poise::command(slash_command, rename = "list")]
    pub async fn fleet_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Marca, modelo ou placa"] search: Option<String>,
        #[description = "Filtrar por status"] status: Option<StatusChoice>,
    ) -> Result<()> {
        let cars = fleet::list_cars(&ctx.data().database).await?;
        let filtered = fleet::filter_cars(&cars, search.as_deref().unwrap_or(""), status.map(Into::into));

        if filtered.is_empty() {
            ctx.say("🚗 Nenhum veículo encontrado.").await?;
            return Ok(());
        }

        let header = format!("🚗 **Frota** ({} veículos)\n\n", filtered.len());
        let lines: Vec<String> = filtered
            .iter()
            .map(|car| {
                format!(
                    "{} **{}** `{}` · {} · {}/dia · {}",
                    status_emoji(car.status),
                    truncate_chars(&format!("{} {}", car.brand, car.model), LIST_TEXT_LIMIT),
                    car.license_plate,
                    car.year,
                    format_currency(car.daily_rate),
                    car.status.label()
                )
            })
            .collect();
        let response = join_within_budget(&header, &lines, LIST_LIMIT, DISCORD_MESSAGE_LIMIT);

        ctx.say(response).await?;
        Ok(())
    }

    /// Registers a new car as available.
    #[poise::command(slash_command, rename = "add")]
    pub async fn fleet_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Marca"] brand: String,
        #[description = "Modelo"] model: String,
        #[description = "Placa"] plate: String,
        #[description = "Ano"] year: i32,
        #[description = "Valor da diária"] daily_rate: f64,
    ) -> Result<()> {
        let db = &ctx.data().database;

        if fleet::get_car_by_plate(db, &plate).await?.is_some() {
            ctx.say(format!("❌ Já existe um veículo com a placa '{plate}'."))
                .await?;
            return Ok(());
        }

        let car = fleet::create_car(
            db,
            CarInput {
                brand,
                model,
                license_plate: plate,
                year,
                daily_rate,
                status: CarStatus::Available,
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Veículo **{} {}** (`{}`) cadastrado a {}/dia.",
            car.brand,
            car.model,
            car.license_plate,
            format_currency(car.daily_rate)
        ))
        .await?;
        Ok(())
    }

    /// Edits a car. Only the given fields change.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn fleet_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Placa do veículo"]
        #[autocomplete = "autocomplete::autocomplete_plate"]
        plate: String,
        #[description = "Nova marca"] brand: Option<String>,
        #[description = "Novo modelo"] model: Option<String>,
        #[description = "Nova placa"] new_plate: Option<String>,
        #[description = "Novo ano"] year: Option<i32>,
        #[description = "Nova diária"] daily_rate: Option<f64>,
        #[description = "Novo status"] status: Option<StatusChoice>,
    ) -> Result<()> {
        let Some(car) = find_car(ctx, &plate).await? else {
            return Ok(());
        };

        let input = CarInput {
            brand: brand.unwrap_or(car.brand),
            model: model.unwrap_or(car.model),
            license_plate: new_plate.unwrap_or(car.license_plate),
            year: year.unwrap_or(car.year),
            daily_rate: daily_rate.unwrap_or(car.daily_rate),
            status: status.map_or(car.status, Into::into),
        };
        let updated = fleet::update_car(&ctx.data().database, car.id, input).await?;

        ctx.say(format!(
            "✅ Veículo **{} {}** (`{}`) atualizado · {}/dia · {}",
            updated.brand,
            updated.model,
            updated.license_plate,
            format_currency(updated.daily_rate),
            updated.status.label()
        ))
        .await?;
        Ok(())
    }

    /// Sets a car's status directly.
    #[poise::command(slash_command, rename = "status")]
    pub async fn fleet_status(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Placa do veículo"]
        #[autocomplete = "autocomplete::autocomplete_plate"]
        plate: String,
        #[description = "Novo status"] status: StatusChoice,
    ) -> Result<()> {
        let Some(car) = find_car(ctx, &plate).await? else {
            return Ok(());
        };

        let updated = fleet::set_car_status(&ctx.data().database, car.id, status.into()).await?;
        ctx.say(format!(
            "{} `{}` agora está **{}**.",
            status_emoji(updated.status),
            updated.license_plate,
            updated.status.label()
        ))
        .await?;
        Ok(())
    }

    /// Removes a car that has no rentals or maintenance history.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn fleet_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Placa do veículo"]
        #[autocomplete = "autocomplete::autocomplete_plate"]
        plate: String,
    ) -> Result<()> {
        let Some(car) = find_car(ctx, &plate).await? else {
            return Ok(());
        };

        fleet::delete_car(&ctx.data().database, car.id).await?;
        ctx.say(format!(
            "🗑️ Veículo **{} {}** (`{}`) removido.",
            car.brand, car.model, car.license_plate
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

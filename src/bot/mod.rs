//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for `FleetDesk`, including all slash
//! commands, autocomplete handlers, the login gate and bot context management.

/// Discord command implementations (fleet, customers, rentals, maintenance, billing, dashboard)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::settings::Settings,
    core::access::AccessGate,
    errors::{Error, Result},
    storage::ObjectStore,
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Environment variable with a guild id for instant command registration during development.
pub const DEV_GUILD_ID_VAR: &str = "DEV_GUILD_ID";

/// Shared data available to all bot commands.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Settings loaded from config.toml
    pub settings: Arc<Settings>,
    /// Bucket for customer documents
    pub storage: Arc<dyn ObjectStore>,
    /// Login sessions
    pub access: AccessGate,
}

impl BotData {
    /// Creates the shared context for all commands.
    #[must_use]
    pub fn new(
        database: DatabaseConnection,
        settings: Arc<Settings>,
        storage: Arc<dyn ObjectStore>,
        admin_password: String,
    ) -> Self {
        Self {
            database,
            settings,
            storage,
            access: AccessGate::new(admin_password),
        }
    }
}

/// Poise context used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {error:?}", ctx.command().qualified_name);
            if let Err(e) = ctx.say(format!("❌ {error}")).await {
                error!("Failed to send error message: {e}");
            }
        }
        poise::FrameworkError::CommandCheckFailed { error: None, ctx, .. } => {
            let reply = poise::CreateReply::default()
                .content("🔒 Acesso restrito. Use `/login` com a senha de administrador.")
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Failed to send access denied message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

async fn check_session(ctx: Context<'_>) -> Result<bool> {
    let command = &ctx.command().qualified_name;
    let allowed = ctx
        .data()
        .access
        .is_authorized(ctx.author().id.get(), command)
        .await;
    if !allowed {
        warn!(user = %ctx.author().name, command, "Command refused without session");
    }
    Ok(allowed)
}

fn dev_guild_id() -> Option<serenity::GuildId> {
    std::env::var(DEV_GUILD_ID_VAR)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(serenity::GuildId::new)
}

/// Builds the poise framework and runs the Discord client until it stops.
#[instrument(skip_all)]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(on_error(error)),
            command_check: Some(|ctx| Box::pin(check_session(ctx))),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                if let Some(guild_id) = dev_guild_id() {
                    poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id)
                        .await?;
                    info!("Registered commands in guild {guild_id}");
                } else {
                    info!("Registering commands globally...");
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                }
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e:?}"))?;
    Ok(())
}

use dotenvy::dotenv;
use fleet_desk::{
    bot::{self, BotData},
    config::{access, database, settings},
    errors::{Error, Result},
    storage,
};
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Settings (config.toml, defaults when missing)
    let settings = Arc::new(
        settings::load_default_settings()
            .inspect_err(|e| error!("Failed to load settings: {e}"))?,
    );
    info!(company = %settings.company.name, "Settings loaded.");

    // 4. Database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Document storage
    let store = storage::store_from_settings(&settings.storage)
        .inspect_err(|e| error!("Failed to configure document storage: {e}"))?;

    // 6. Secrets, loaded directly before use and never stored in settings
    let admin_password = access::get_admin_password().ok_or_else(|| Error::Config {
        message: format!("{} must be set to a non-empty value", access::ADMIN_PASSWORD_VAR),
    })?;
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    // 7. Run the bot
    let data = BotData::new(db, settings, store, admin_password);
    bot::run_bot(token, data).await
}

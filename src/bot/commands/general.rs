//! General Discord commands - ping, help, login and logout.
//! These commands work without an admin session (except logout, which needs one to
//! make sense) and don't touch the database.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = format!(
            "**{} - Ajuda**\n\
        Comandos disponíveis após `/login`.\n\n\
        **Visão geral**\n\
        • `/dashboard` - Indicadores, fluxo de aluguéis e atividade recente.\n\n\
        **Cadastros**\n\
        • `/fleet <list|add|edit|status|delete>` - Frota de veículos.\n\
        • `/customer <list|add|edit|delete|document>` - Clientes e documentos.\n\n\
        **Operação**\n\
        • `/rental <new|list|edit|return|delete|contract>` - Contratos de locação.\n\
        • `/maintenance <list|add|edit|delete|summary>` - Manutenções.\n\
        • `/billing <summary|pending|history|pay|remind|details>` - Financeiro.\n\n\
        **Acesso**\n\
        • `/login <senha>` / `/logout`\n\
        • `/ping` - Verifica se o bot responde.",
            ctx.data().settings.company.name
        );

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Opens an admin session for you.
    #[poise::command(slash_command)]
    pub async fn login(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Senha de administrador"] password: String,
    ) -> Result<()> {
        let user_id = ctx.author().id.get();
        let message = match ctx.data().access.login(user_id, &password).await {
            Ok(()) => "🔓 Acesso liberado. Bem-vindo ao painel!",
            Err(Error::Unauthorized) => "❌ Senha incorreta!",
            Err(e) => return Err(e),
        };

        ctx.send(
            poise::CreateReply::default()
                .content(message)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Closes your admin session.
    #[poise::command(slash_command)]
    pub async fn logout(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.data().access.logout(ctx.author().id.get()).await;
        ctx.send(
            poise::CreateReply::default()
                .content("🔒 Sessão encerrada.")
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

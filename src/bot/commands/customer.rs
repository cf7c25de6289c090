//! Customer Discord commands - register, search, edit, remove customers and upload their
//! documents.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{
            customer::{self, CustomerInput, DocumentKind},
            format::{DISCORD_MESSAGE_LIMIT, LIST_TEXT_LIMIT, join_within_budget, truncate_chars},
        },
        entities::customer::Model as CustomerModel,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Entries shown by `/customer list` before truncating.
    const LIST_LIMIT: usize = 25;
    /// Largest document image accepted, in bytes.
    const MAX_DOCUMENT_BYTES: u32 = 10 * 1024 * 1024;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum DocumentChoice {
        #[name = "CNH"]
        Cnh,
        #[name = "Comprovante de residência"]
        Residence,
    }

    impl From<DocumentChoice> for DocumentKind {
        fn from(choice: DocumentChoice) -> Self {
            match choice {
                DocumentChoice::Cnh => Self::Cnh,
                DocumentChoice::Residence => Self::Residence,
            }
        }
    }

    fn document_mark(url: Option<&str>) -> &'static str {
        if url.is_some() { "✅" } else { "⬜" }
    }

    async fn find_customer(
        ctx: poise::Context<'_, BotData, Error>,
        customer_id: i64,
    ) -> Result<Option<CustomerModel>> {
        let found = customer::get_customer_by_id(&ctx.data().database, customer_id).await?;
        if found.is_none() {
            ctx.say(format!("❌ Cliente #{customer_id} não encontrado."))
                .await?;
        }
        Ok(found)
    }

    /// Manage customers.
    #[poise::command(
        slash_command,
        subcommands(
            "customer_list",
            "customer_info",
            "customer_add",
            "customer_edit",
            "customer_delete",
            "customer_document"
        ),
        subcommand_required
    )]
    pub async fn customer(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Lists customers by name, optionally filtered by name or CPF.
    #[poise::command(slash_command, rename = "list")]
    pub async fn customer_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Nome ou CPF"] search: Option<String>,
    ) -> Result<()> {
        let customers = customer::list_customers(&ctx.data().database).await?;
        let filtered = customer::filter_customers(&customers, search.as_deref().unwrap_or(""));

        if filtered.is_empty() {
            ctx.say("👥 Nenhum cliente encontrado.").await?;
            return Ok(());
        }

        let header = format!("👥 **Clientes** ({})\n\n", filtered.len());
        let lines: Vec<String> = filtered
            .iter()
            .map(|c| {
                format!(
                    "**{}** · CPF {} · {} · CNH {} · Residência {}",
                    truncate_chars(&c.full_name, LIST_TEXT_LIMIT),
                    c.document_cpf,
                    c.phone,
                    document_mark(c.cnh_image_url.as_deref()),
                    document_mark(c.residence_proof_url.as_deref())
                )
            })
            .collect();
        let response = join_within_budget(&header, &lines, LIST_LIMIT, DISCORD_MESSAGE_LIMIT);

        ctx.say(response).await?;
        Ok(())
    }

    /// Shows a customer's full record and document links.
    #[poise::command(slash_command, rename = "info")]
    pub async fn customer_info(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Cliente"]
        #[autocomplete = "autocomplete::autocomplete_customer"]
        customer_id: i64,
    ) -> Result<()> {
        let Some(c) = find_customer(ctx, customer_id).await? else {
            return Ok(());
        };

        let mut response = format!("👤 **{}**\n\n", c.full_name);
        writeln!(&mut response, "🪪 CPF: {}", c.document_cpf)?;
        writeln!(&mut response, "📞 Telefone: {}", c.phone)?;
        writeln!(
            &mut response,
            "✉️ E-mail: {}",
            c.email.as_deref().unwrap_or("Não informado")
        )?;
        writeln!(
            &mut response,
            "🏠 Endereço: {}",
            c.address.as_deref().unwrap_or("Não informado")
        )?;
        writeln!(
            &mut response,
            "🚘 CNH: {}",
            c.cnh_image_url.as_deref().unwrap_or("pendente")
        )?;
        writeln!(
            &mut response,
            "📄 Comprovante de residência: {}",
            c.residence_proof_url.as_deref().unwrap_or("pendente")
        )?;

        ctx.say(response).await?;
        Ok(())
    }

    /// Registers a new customer.
    #[poise::command(slash_command, rename = "add")]
    pub async fn customer_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Nome completo"] full_name: String,
        #[description = "CPF"] cpf: String,
        #[description = "Telefone / WhatsApp"] phone: String,
        #[description = "E-mail"] email: Option<String>,
        #[description = "Endereço"] address: Option<String>,
    ) -> Result<()> {
        let created = customer::create_customer(
            &ctx.data().database,
            CustomerInput {
                full_name,
                document_cpf: cpf,
                phone,
                email,
                address,
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Cliente **{}** cadastrado (#{}). Envie os documentos com `/customer document`.",
            created.full_name, created.id
        ))
        .await?;
        Ok(())
    }

    /// Edits a customer's contact data. Only the given fields change.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn customer_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Cliente"]
        #[autocomplete = "autocomplete::autocomplete_customer"]
        customer_id: i64,
        #[description = "Nome completo"] full_name: Option<String>,
        #[description = "CPF"] cpf: Option<String>,
        #[description = "Telefone / WhatsApp"] phone: Option<String>,
        #[description = "E-mail (vazio para remover)"] email: Option<String>,
        #[description = "Endereço (vazio para remover)"] address: Option<String>,
    ) -> Result<()> {
        let Some(existing) = find_customer(ctx, customer_id).await? else {
            return Ok(());
        };

        let input = CustomerInput {
            full_name: full_name.unwrap_or(existing.full_name),
            document_cpf: cpf.unwrap_or(existing.document_cpf),
            phone: phone.unwrap_or(existing.phone),
            email: email.or(existing.email),
            address: address.or(existing.address),
        };
        let updated = customer::update_customer(&ctx.data().database, customer_id, input).await?;

        ctx.say(format!("✅ Cliente **{}** atualizado.", updated.full_name))
            .await?;
        Ok(())
    }

    /// Removes a customer that has no rentals.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn customer_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Cliente"]
        #[autocomplete = "autocomplete::autocomplete_customer"]
        customer_id: i64,
    ) -> Result<()> {
        match customer::delete_customer(&ctx.data().database, customer_id).await {
            Ok(()) => {
                ctx.say(format!("🗑️ Cliente #{customer_id} removido.")).await?;
            }
            Err(Error::InUse { .. }) => {
                ctx.say(
                    "❌ Erro ao excluir cliente. Verifique se ele possui aluguéis ativos ou registrados.",
                )
                .await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Uploads a CNH or proof of residence image for a customer.
    #[poise::command(slash_command, rename = "document")]
    pub async fn customer_document(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Cliente"]
        #[autocomplete = "autocomplete::autocomplete_customer"]
        customer_id: i64,
        #[description = "Tipo de documento"] kind: DocumentChoice,
        #[description = "Imagem do documento"] file: serenity::Attachment,
    ) -> Result<()> {
        if file.size > MAX_DOCUMENT_BYTES {
            ctx.say("❌ Arquivo muito grande (máximo 10 MB).").await?;
            return Ok(());
        }

        ctx.defer().await?;

        let kind = DocumentKind::from(kind);
        let bytes = file.download().await?;
        let data = ctx.data();
        let updated = customer::attach_document(
            &data.database,
            data.storage.as_ref(),
            customer_id,
            kind,
            &file.filename,
            bytes,
        )
        .await?;

        ctx.say(format!(
            "✅ {} de **{}** enviado.",
            kind.label(),
            updated.full_name
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

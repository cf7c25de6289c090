//! Dashboard Discord command - headline counters, the weekly rental chart and recent activity.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::{
            dashboard::{self, ActivityItem, ActivityKind, DEFAULT_ACTIVITY_LIMIT},
            format::{
                EMBED_FIELD_LIMIT, LIST_TEXT_LIMIT, format_currency, format_relative,
                join_within_budget, truncate_chars,
            },
        },
        errors::{Error, Result},
    };
    use chrono::{DateTime, Utc};
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;
    use tracing::instrument;

    /// Widest bar in the weekly chart, in blocks.
    const CHART_WIDTH: u32 = 12;

    fn render_chart(labelled: &[(&str, u32)]) -> Result<String> {
        let peak = labelled.iter().map(|(_, count)| *count).max().unwrap_or(0).max(1);
        let mut chart = String::from("```\n");
        for (label, count) in labelled {
            let filled = (count * CHART_WIDTH).div_ceil(peak) as usize;
            writeln!(&mut chart, "{label:<3} {:<12} {count}", "█".repeat(filled))?;
        }
        chart.push_str("```");
        Ok(chart)
    }

    fn activity_line(item: &ActivityItem, now: DateTime<Utc>) -> String {
        let icon = match item.kind {
            ActivityKind::Rental => "🚗",
            ActivityKind::Maintenance => "🛠️",
        };
        format!(
            "{icon} **{}** {} · _{}_",
            truncate_chars(&item.subject, LIST_TEXT_LIMIT),
            truncate_chars(&item.detail, LIST_TEXT_LIMIT),
            format_relative(item.timestamp, now)
        )
    }

    /// Shows the fleet overview.
    #[poise::command(slash_command)]
    #[instrument(skip(ctx))]
    pub async fn dashboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let now = Utc::now();
        let today = now.date_naive();

        let stats = dashboard::fetch_stats(db).await?;
        let counts = dashboard::fetch_daily_rental_counts(db, today).await?;
        let activity = dashboard::recent_activity(db, DEFAULT_ACTIVITY_LIMIT).await?;

        let chart = render_chart(&dashboard::label_daily_counts(&counts, today))?;

        let feed = if activity.is_empty() {
            "_Nenhuma atividade recente._".to_string()
        } else {
            let lines: Vec<String> = activity.iter().map(|item| activity_line(item, now)).collect();
            join_within_budget("", &lines, lines.len(), EMBED_FIELD_LIMIT)
        };

        let embed = serenity::CreateEmbed::default()
            .title(format!("📊 {} · Dashboard", data.settings.company.name))
            .color(0x2E_CC71)
            .field("🔑 Aluguéis ativos", stats.active_rentals.to_string(), true)
            .field("💰 Receita total", format_currency(stats.total_revenue), true)
            .field("🟢 Veículos disponíveis", stats.available_cars.to_string(), true)
            .field("🟠 Em manutenção", stats.cars_in_maintenance.to_string(), true)
            .field("📈 Aluguéis nos últimos 7 dias", chart, false)
            .field("🕒 Atividade recente", feed, false)
            .footer(serenity::CreateEmbedFooter::new(
                data.settings.company.system_name.clone(),
            ));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_activity_feed_fits_embed_field() {
            let now = Utc::now();
            let lines: Vec<String> = (0..DEFAULT_ACTIVITY_LIMIT)
                .map(|_| ActivityItem {
                    kind: ActivityKind::Maintenance,
                    timestamp: now,
                    subject: "Volkswagen Gol".to_string(),
                    detail: format!("CORRETIVA: {}", "Revisão geral do motor e câmbio. ".repeat(40)),
                })
                .map(|item| activity_line(&item, now))
                .collect();
            let feed = join_within_budget("", &lines, lines.len(), EMBED_FIELD_LIMIT);

            assert!(feed.chars().count() <= EMBED_FIELD_LIMIT);
            assert_eq!(feed.lines().count(), DEFAULT_ACTIVITY_LIMIT);
            assert!(feed.contains("CORRETIVA: Revisão geral"));
        }
    }
}

// Re-export all commands
pub use inner::*;

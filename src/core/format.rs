//! Display formatting shared by the bot layer and the contract renderer.
//!
//! Amounts are shown the Brazilian way (`R$ 1.234,56`) and dates as `dd/mm/yyyy`.

use crate::errors::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};

/// Formats an amount with a `.` thousands separator and `,` decimal separator.
///
/// `1234.5` becomes `"1.234,50"`.
#[must_use]
pub fn format_brl(amount: f64) -> String {
    // Cents fit comfortably in i64 for any realistic fleet amount
    #[allow(clippy::cast_possible_truncation)]
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let units = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    format!("{sign}{grouped},{fraction:02}")
}

/// Formats an amount as currency: `R$ 1.234,50`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    format!("R$ {}", format_brl(amount))
}

/// Formats a calendar date as `dd/mm/yyyy`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Formats a timestamp as `dd/mm/yyyy HH:MM` (UTC).
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%d/%m/%Y %H:%M").to_string()
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = progress_percent.clamp(0.0, 100.0);

    // Cast safety: clamped_progress ∈ [0, 100], length is small (10-20).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!(
        "[{}{}] {progress_percent:.1}%",
        "█".repeat(filled),
        "░".repeat(empty)
    )
}

/// Parses a date typed by the operator, as `dd/mm/yyyy` or `yyyy-mm-dd`.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .map_err(|_| Error::validation(format!("Invalid date '{input}', use dd/mm/yyyy")))
}

/// Short relative age of a timestamp, as shown in the activity feed (`Há 2h`).
#[must_use]
pub fn format_relative(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    if elapsed.num_minutes() < 1 {
        "Agora".to_string()
    } else if elapsed.num_hours() < 1 {
        format!("Há {}min", elapsed.num_minutes())
    } else if elapsed.num_days() < 1 {
        format!("Há {}h", elapsed.num_hours())
    } else {
        format!("Há {}d", elapsed.num_days())
    }
}

/// Longest message body Discord accepts, in characters.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;
/// Longest embed field value Discord accepts, in characters.
pub const EMBED_FIELD_LIMIT: usize = 1024;
/// Longest free-text column (names, descriptions) shown in a list row.
pub const LIST_TEXT_LIMIT: usize = 60;

/// Shortens `text` to at most `max` characters, ending with `…` when cut.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn omitted_note(count: usize) -> String {
    format!("_… e mais {count}_\n")
}

/// Joins `header` and one line per entry, stopping before `budget` characters.
///
/// At most `max_lines` lines are shown. When entries are left out, an `… e mais N` note
/// is appended, and room for it is kept inside the budget.
#[must_use]
pub fn join_within_budget(header: &str, lines: &[String], max_lines: usize, budget: usize) -> String {
    let note_room = omitted_note(lines.len()).chars().count();
    let mut out = truncate_chars(header, budget.saturating_sub(note_room));
    let mut used = out.chars().count();
    let mut shown = 0;

    for (index, line) in lines.iter().enumerate().take(max_lines) {
        let cost = line.chars().count() + 1;
        let is_last = index + 1 == lines.len();
        let reserve = if is_last { 0 } else { note_room };
        if used + cost + reserve > budget {
            break;
        }
        out.push_str(line);
        out.push('\n');
        used += cost;
        shown += 1;
    }

    if shown < lines.len() {
        out.push_str(&omitted_note(lines.len() - shown));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(0.0), "0,00");
        assert_eq!(format_brl(300.0), "300,00");
        assert_eq!(format_brl(1234.5), "1.234,50");
        assert_eq!(format_brl(1_000_000.0), "1.000.000,00");
        assert_eq!(format_brl(-200.0), "-200,00");
        assert_eq!(format_brl(0.005), "0,01");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(800.0), "R$ 800,00");
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap_or_default();
        assert_eq!(format_date(date), "04/01/2024");
    }

    #[test]
    fn test_parse_date_accepts_both_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 4);
        assert_eq!(parse_date("04/01/2024").ok(), expected);
        assert_eq!(parse_date(" 2024-01-04 ").ok(), expected);
        assert!(matches!(parse_date("31/02/2024"), Err(Error::Validation { .. })));
        assert!(parse_date("amanhã").is_err());
    }

    #[test]
    fn test_format_relative() {
        let now = Utc::now();
        assert_eq!(format_relative(now, now), "Agora");
        assert_eq!(format_relative(now - chrono::Duration::minutes(5), now), "Há 5min");
        assert_eq!(format_relative(now - chrono::Duration::hours(2), now), "Há 2h");
        assert_eq!(format_relative(now - chrono::Duration::days(3), now), "Há 3d");
    }

    #[test]
    fn test_format_progress_bar() {
        assert_eq!(format_progress_bar(50.0, Some(4)), "[██░░] 50.0%");
        assert_eq!(format_progress_bar(150.0, Some(2)), "[██] 150.0%");
        assert_eq!(format_progress_bar(-10.0, Some(2)), "[░░] -10.0%");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("Troca de óleo", 20), "Troca de óleo");
        assert_eq!(truncate_chars("Troca de óleo e filtros", 10), "Troca de …");
        assert_eq!(truncate_chars("Revisão", 7), "Revisão");
        assert_eq!(truncate_chars("Revisão", 6).chars().count(), 6);
    }

    fn rental_rows(count: usize) -> Vec<String> {
        (1..=count)
            .map(|id| {
                format!(
                    "🟢 **#{id}** Maria Aparecida dos Santos · Volkswagen Gol `ABC1D23` · \
                     01/03/2024 até 14/03/2024 · R$ 1.300,00 (pago R$ 100,00) · Ativo"
                )
            })
            .collect()
    }

    #[test]
    fn test_full_rental_page_fits_one_message() {
        let rows = rental_rows(25);
        let message = join_within_budget("📋 **Aluguéis** (25)\n\n", &rows, 20, DISCORD_MESSAGE_LIMIT);

        assert!(message.chars().count() <= DISCORD_MESSAGE_LIMIT);
        assert!(message.starts_with("📋 **Aluguéis** (25)"));
        let shown = message.lines().filter(|line| line.contains("Maria Aparecida")).count();
        assert!(shown > 0 && shown < 20);
        assert!(message.ends_with(&format!("_… e mais {}_\n", 25 - shown)));
    }

    #[test]
    fn test_short_lists_are_joined_whole() {
        let rows = rental_rows(3);
        let message = join_within_budget("Aluguéis\n", &rows, 20, DISCORD_MESSAGE_LIMIT);
        assert_eq!(message.lines().count(), 4);
        assert!(!message.contains("e mais"));

        let capped = join_within_budget("Aluguéis\n", &rows, 2, DISCORD_MESSAGE_LIMIT);
        assert!(capped.ends_with("_… e mais 1_\n"));
    }

    #[test]
    fn test_activity_feed_fits_embed_field() {
        let rows: Vec<String> = (0..12)
            .map(|_| {
                format!(
                    "🛠️ **Fiat Argo** {} · _Há 2h_",
                    truncate_chars(&"Substituição completa do sistema de freios ".repeat(5), LIST_TEXT_LIMIT)
                )
            })
            .collect();
        let field = join_within_budget("", &rows, rows.len(), EMBED_FIELD_LIMIT);

        assert!(field.chars().count() <= EMBED_FIELD_LIMIT);
        assert!(field.contains("e mais"));
    }
}

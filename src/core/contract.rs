//! Rental contract rendering.
//!
//! [`ContractData`] gathers everything printed on the contract from a rental and its
//! related rows; [`render_contract`] lays it out on a single A4 page.

use crate::{
    config::settings::CompanySettings,
    core::{
        format::{format_currency, format_date, format_timestamp},
        rental::RentalDetails,
    },
    errors::Result,
};
use chrono::{DateTime, NaiveDate, Utc};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

const NOT_INFORMED: &str = "Não informado";

const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;
const PT_PER_MM: f32 = 72.0 / 25.4;

// Advance widths (1/1000 em) of Helvetica for ASCII 0x20..=0x7E. The built-in faces
// carry no metrics, so centred runs are measured here. Accented letters share the
// width of their base letter.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// 8-bit RGB channels.
type Shade = (u8, u8, u8);

const BLACK: Shade = (0, 0, 0);
const BRAND_CYAN: Shade = (0, 229, 255);
const TITLE_GRAY: Shade = (100, 100, 100);
const RULE_GRAY: Shade = (200, 200, 200);
const FOOTER_GRAY: Shade = (150, 150, 150);

/// Everything printed on a rental contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractData {
    /// Header title
    pub company_name: String,
    /// Lessor line in the parties section
    pub lessor: String,
    /// Product name in the footer
    pub system_name: String,
    /// Lessee name
    pub customer_name: String,
    /// Lessee CPF
    pub customer_document: String,
    /// Lessee phone
    pub customer_phone: String,
    /// "Brand Model"
    pub vehicle: String,
    /// Model alone, used in the file name
    pub car_model: Option<String>,
    /// License plate
    pub license_plate: String,
    /// First day
    pub start_date: NaiveDate,
    /// Return day
    pub end_date: NaiveDate,
    /// Contract value
    pub total_amount: f64,
    /// Amount already paid
    pub paid_amount: f64,
    /// Main clauses, one bullet each
    pub clauses: Vec<String>,
    /// Generation time printed in the footer
    pub generated_at: DateTime<Utc>,
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

impl ContractData {
    /// Collects contract fields from a rental, falling back to placeholders for
    /// anything missing.
    #[must_use]
    pub fn from_details(
        details: &RentalDetails,
        company: &CompanySettings,
        clauses: &[String],
        generated_at: DateTime<Utc>,
    ) -> Self {
        let rental = &details.rental;
        let customer = details.customer.as_ref();
        let car = details.car.as_ref();

        let customer_name = non_empty(&rental.customer_name)
            .or_else(|| customer.and_then(|c| non_empty(&c.full_name)))
            .unwrap_or("Cliente")
            .to_string();
        let customer_document = customer
            .and_then(|c| non_empty(&c.document_cpf))
            .unwrap_or(NOT_INFORMED)
            .to_string();
        let customer_phone = non_empty(&rental.customer_phone)
            .or_else(|| customer.and_then(|c| non_empty(&c.phone)))
            .unwrap_or(NOT_INFORMED)
            .to_string();

        let vehicle = car.map_or_else(
            || "Veículo".to_string(),
            |car| format!("{} {}", car.brand, car.model).trim().to_string(),
        );

        Self {
            company_name: company.name.clone(),
            lessor: company.legal_name.clone(),
            system_name: company.system_name.clone(),
            customer_name,
            customer_document,
            customer_phone,
            vehicle,
            car_model: car.map(|car| car.model.clone()),
            license_plate: car.map_or_else(|| "S/P".to_string(), |car| car.license_plate.clone()),
            start_date: rental.start_date,
            end_date: rental.end_date,
            total_amount: rental.total_amount,
            paid_amount: rental.paid_amount,
            clauses: clauses.to_vec(),
            generated_at,
        }
    }

    /// Download name for this contract.
    #[must_use]
    pub fn file_name(&self) -> String {
        contract_file_name(Some(&self.customer_name), self.car_model.as_deref())
    }
}

/// Width in millimetres of `text` set in regular Helvetica at `size` points.
#[must_use]
pub fn helvetica_width_mm(text: &str, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| {
            let base = c.nfd().next().unwrap_or(c);
            usize::try_from(u32::from(base))
                .ok()
                .and_then(|code| code.checked_sub(0x20))
                .and_then(|index| HELVETICA_WIDTHS.get(index))
                .map_or(556, |width| u32::from(*width))
        })
        .sum();
    // Sums of glyph widths stay far below f32 precision limits
    #[allow(clippy::cast_precision_loss)]
    let points = units as f32 * size / 1000.0;
    points / PT_PER_MM
}

fn color((r, g, b): Shade) -> Color {
    let channel = |c: u8| f32::from(c) / 255.0;
    Color::Rgb(Rgb::new(channel(r), channel(g), channel(b), None))
}

/// One A4 page measured in millimetres from the top-left corner.
struct Sheet {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Sheet {
    fn text(&self, x: f32, y: f32, text: &str, bold: bool, size: f32, shade: Shade) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.set_fill_color(color(shade));
        self.layer.use_text(text, size, Mm(x), Mm(A4_HEIGHT_MM - y), font);
    }

    fn centered(&self, y: f32, text: &str, size: f32, shade: Shade) {
        let x = (A4_WIDTH_MM - helvetica_width_mm(text, size)) / 2.0;
        self.text(x, y, text, false, size, shade);
    }

    fn line(&self, x1: f32, x2: f32, y: f32, shade: Shade) {
        let y = Mm(A4_HEIGHT_MM - y);
        self.layer.set_outline_color(color(shade));
        self.layer.set_outline_thickness(0.57);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), y), false),
                (Point::new(Mm(x2), y), false),
            ],
            is_closed: false,
        });
    }

    fn section(&self, y: f32, title: &str, lines: &[String]) {
        self.text(20.0, y, title, true, 12.0, BLACK);
        let mut line_y = y;
        for line in lines {
            line_y += 7.0;
            self.text(25.0, line_y, line, false, 12.0, BLACK);
        }
    }
}

/// Renders the contract as a single-page A4 PDF.
pub fn render_contract(data: &ContractData) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Contrato - {}", data.customer_name),
        Mm(A4_WIDTH_MM),
        Mm(A4_HEIGHT_MM),
        "Contrato",
    );
    let sheet = Sheet {
        layer: doc.get_page(page).get_layer(layer),
        regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
    };

    sheet.centered(20.0, &data.company_name, 22.0, BRAND_CYAN);
    sheet.centered(30.0, "CONTRATO DE LOCAÇÃO DE VEÍCULO", 14.0, TITLE_GRAY);
    sheet.line(20.0, A4_WIDTH_MM - 20.0, 35.0, RULE_GRAY);

    sheet.section(
        45.0,
        "1. AS PARTES",
        &[
            format!("LOCADORA: {}", data.lessor),
            format!("LOCATÁRIO: {}", data.customer_name),
            format!("DOCUMENTO: {}", data.customer_document),
            format!("CONTATO: {}", data.customer_phone),
        ],
    );
    sheet.section(
        85.0,
        "2. O VEÍCULO",
        &[
            format!("MODELO/MARCA: {}", data.vehicle),
            format!("PLACA: {}", data.license_plate),
        ],
    );
    sheet.section(
        110.0,
        "3. PRAZO E VALORES",
        &[
            format!("INÍCIO: {}", format_date(data.start_date)),
            format!("TÉRMINO: {}", format_date(data.end_date)),
            format!("VALOR TOTAL: {}", format_currency(data.total_amount)),
            format!("VALOR PAGO: {}", format_currency(data.paid_amount)),
        ],
    );

    sheet.text(20.0, 150.0, "4. CLÁUSULAS PRINCIPAIS", true, 12.0, BLACK);
    let mut clause_y = 157.0;
    for clause in &data.clauses {
        sheet.text(25.0, clause_y, &format!("• {clause}"), false, 10.0, BLACK);
        clause_y += 6.0;
    }

    sheet.line(25.0, 90.0, 240.0, BLACK);
    sheet.text(35.0, 245.0, "Assinatura Locadora", false, 12.0, BLACK);
    sheet.line(120.0, 185.0, 240.0, BLACK);
    sheet.text(130.0, 245.0, "Assinatura Locatário", false, 12.0, BLACK);

    sheet.centered(
        285.0,
        &format!(
            "Gerado em: {} - {}",
            format_timestamp(data.generated_at),
            data.system_name
        ),
        8.0,
        FOOTER_GRAY,
    );

    Ok(doc.save_to_bytes()?)
}

/// Strips combining marks after canonical decomposition (`é` → `e`, `ř` → `r`).
#[must_use]
pub fn strip_accents(text: &str) -> String {
    text.nfd()
        .filter(|c| !('\u{0300}'..='\u{036F}').contains(c))
        .collect()
}

fn file_name_part(value: Option<&str>, fallback: &str) -> String {
    strip_accents(value.and_then(non_empty).unwrap_or(fallback))
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Safe download name: `contrato_<customer>_<car model>.pdf`.
///
/// Accents are stripped, anything else outside `[a-z0-9]` becomes `_`.
#[must_use]
pub fn contract_file_name(customer_name: Option<&str>, car_model: Option<&str>) -> String {
    format!(
        "contrato_{}_{}.pdf",
        file_name_part(customer_name, "Cliente"),
        file_name_part(car_model, "Carro")
    )
}

/// Writes a rendered contract into `dir`, creating it if needed.
pub async fn save_contract(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    tracing::info!(path = %path.display(), "Contract saved to disk");
    Ok(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::settings::ContractSettings;
    use crate::test_utils::*;
    use chrono::TimeZone;

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_contract_file_name() {
        assert_eq!(
            contract_file_name(Some("José Álvares"), Some("Civic")),
            "contrato_jose_alvares_civic.pdf"
        );
        assert_eq!(
            contract_file_name(Some("Ana M. O'Neil"), Some("HB20 1.0")),
            "contrato_ana_m__o_neil_hb20_1_0.pdf"
        );
        assert_eq!(contract_file_name(None, Some(" ")), "contrato_cliente_carro.pdf");
    }

    #[test]
    fn test_contract_file_name_strips_every_combining_mark() {
        assert_eq!(
            contract_file_name(Some("Antonín Dvořák"), Some("Škoda Fabia")),
            "contrato_antonin_dvorak_skoda_fabia.pdf"
        );
        assert_eq!(
            contract_file_name(Some("Zoë Őrsi"), Some("Citroën C3")),
            "contrato_zoe_orsi_citroen_c3.pdf"
        );
    }

    #[test]
    fn test_strip_accents() {
        assert_eq!(strip_accents("Conceição Müller"), "Conceicao Muller");
        assert_eq!(strip_accents("Łódź"), "Łodz");
    }

    #[test]
    fn test_accented_text_measures_like_its_base_letters() {
        assert!(
            (helvetica_width_mm("LOCAÇÃO DE VEÍCULO", 14.0) - helvetica_width_mm("LOCACAO DE VEICULO", 14.0))
                .abs()
                < f32::EPSILON
        );
        // "AB" is 667 + 667 units
        let expected = 1334.0 * 10.0 / 1000.0 / PT_PER_MM;
        assert!((helvetica_width_mm("AB", 10.0) - expected).abs() < 1e-4);
    }

    /// Content-stream form of a WinAnsi text run, as written by the PDF serializer.
    fn shown_text(text: &str) -> String {
        let hex: String = text
            .chars()
            .map(|c| format!("{:02X}", u32::from(c)))
            .collect();
        format!("<{hex}> Tj")
    }

    #[tokio::test]
    async fn test_contract_from_rental() -> Result<()> {
        let (db, customer, car) = setup_with_customer_and_car().await?;
        let rental = create_test_rental(&db, customer.id, car.id).await?;
        let details = crate::core::rental::get_rental_details(&db, rental.id).await?;

        let clauses = ContractSettings::default().clauses;
        let data = ContractData::from_details(
            &details,
            &CompanySettings::default(),
            &clauses,
            generated_at(),
        );
        assert_eq!(data.customer_name, customer.full_name);
        assert_eq!(data.customer_document, customer.document_cpf);
        assert_eq!(data.vehicle, "Fiat Cronos");
        assert_eq!(data.license_plate, car.license_plate);
        assert_eq!(data.clauses.len(), 4);
        assert_eq!(data.file_name(), "contrato_joao_silva_cronos.pdf");

        let bytes = render_contract(&data)?;
        let text = String::from_utf8_lossy(&bytes);
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(text.contains("/Helvetica-Bold"));
        assert!(text.contains(&shown_text("1. AS PARTES")));
        assert!(text.contains(&shown_text("LOCATÁRIO: João Silva")));
        assert!(text.contains(&shown_text("VALOR TOTAL: R$ 300,00")));
        assert!(text.contains(&shown_text(
            "Gerado em: 02/01/2024 15:30 - ORA Cars Management System"
        )));
        Ok(())
    }

    #[test]
    fn test_contract_placeholders_without_relations() {
        let details = RentalDetails {
            rental: crate::entities::rental::Model {
                id: 1,
                customer_id: 1,
                car_id: 1,
                customer_name: String::new(),
                customer_phone: String::new(),
                start_date: date(2024, 1, 1),
                end_date: date(2024, 1, 2),
                total_amount: 100.0,
                paid_amount: 0.0,
                status: crate::entities::RentalStatus::Active,
                created_at: generated_at(),
            },
            car: None,
            customer: None,
        };

        let data = ContractData::from_details(&details, &CompanySettings::default(), &[], generated_at());
        assert_eq!(data.customer_name, "Cliente");
        assert_eq!(data.customer_document, NOT_INFORMED);
        assert_eq!(data.customer_phone, NOT_INFORMED);
        assert_eq!(data.vehicle, "Veículo");
        assert_eq!(data.license_plate, "S/P");
        assert_eq!(data.file_name(), "contrato_cliente_carro.pdf");
    }

    #[tokio::test]
    async fn test_save_contract_writes_file() -> Result<()> {
        let dir = std::env::temp_dir().join(format!(
            "fleet-desk-contracts-{}",
            Utc::now().timestamp_micros()
        ));
        let path = save_contract(&dir, "contrato_a_b.pdf", b"%PDF-1.4").await?;
        assert_eq!(tokio::fs::read(&path).await?, b"%PDF-1.4");
        tokio::fs::remove_dir_all(&dir).await?;
        Ok(())
    }
}

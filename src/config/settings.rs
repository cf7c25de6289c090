//! Application settings loading from config.toml
//!
//! Everything here has a default, so the bot starts without a config file. Secrets
//! (bot token, storage API key, admin password) stay in the environment.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_VAR: &str = "FLEET_DESK_CONFIG";

/// Top-level structure of config.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Branding used in messages and contracts
    pub company: CompanySettings,
    /// Billing options
    pub billing: BillingSettings,
    /// Contract rendering options
    pub contracts: ContractSettings,
    /// Where customer documents are uploaded
    pub storage: StorageSettings,
}

/// Company branding
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompanySettings {
    /// Short name shown in headers (e.g., "ORA CARS")
    pub name: String,
    /// Name of the lessor printed on contracts
    pub legal_name: String,
    /// Product name printed in the contract footer
    pub system_name: String,
}

impl Default for CompanySettings {
    fn default() -> Self {
        Self {
            name: "ORA CARS".to_string(),
            legal_name: "ORA CARS - Gestão de Frotas".to_string(),
            system_name: "ORA Cars Management System".to_string(),
        }
    }
}

/// Billing options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BillingSettings {
    /// Accepted payment methods, first one is the default
    pub payment_methods: Vec<String>,
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            payment_methods: ["Pix", "Dinheiro", "Cartão Débito", "Cartão Crédito", "Transferência"]
                .iter()
                .map(|&method| method.to_string())
                .collect(),
        }
    }
}

impl BillingSettings {
    /// Method used when the operator does not pick one
    #[must_use]
    pub fn default_method(&self) -> &str {
        self.payment_methods.first().map_or("Pix", String::as_str)
    }
}

/// Contract rendering options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContractSettings {
    /// Directory where contracts are written when the attachment upload fails
    pub output_dir: PathBuf,
    /// Main clauses listed in section 4 of the contract
    pub clauses: Vec<String>,
}

impl Default for ContractSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data/contracts"),
            clauses: [
                "O veículo deve ser entregue nas mesmas condições de limpeza e combustível.",
                "Multas de trânsito ocorridas no período são de responsabilidade do locatário.",
                "Em caso de sinistro, a franquia do seguro deverá ser paga pelo locatário.",
                "Atrasos na devolução acarretarão em multas diárias.",
            ]
            .iter()
            .map(|&clause| clause.to_string())
            .collect(),
        }
    }
}

/// Object storage backend for customer documents
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageSettings {
    /// Hosted object storage REST API; the key comes from `STORAGE_API_KEY`
    Http {
        /// Base URL of the hosted project (e.g., `https://xyz.supabase.co`)
        url: String,
        /// Bucket name
        #[serde(default = "default_bucket")]
        bucket: String,
    },
    /// Plain directory, served elsewhere under `public_base_url`
    Local {
        /// Directory the files are written to
        directory: PathBuf,
        /// URL prefix written back onto the customer row
        public_base_url: String,
    },
}

fn default_bucket() -> String {
    "ora-documents".to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self::Local {
            directory: PathBuf::from("data/documents"),
            public_base_url: "file://data/documents".to_string(),
        }
    }
}

/// Loads settings from a TOML file.
///
/// A missing file yields the defaults; an unreadable or malformed one is an error.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        tracing::info!("No config file at {:?}, using default settings", path_ref);
        return Ok(Settings::default());
    }

    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    parse_settings(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config file {path_ref:?}: {e}"),
    })
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> std::result::Result<Settings, toml::de::Error> {
    toml::from_str(contents)
}

/// Loads settings from `FLEET_DESK_CONFIG` or `./config.toml`.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.toml".to_string());
    load_settings(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings.company.name, "ORA CARS");
        assert_eq!(settings.billing.payment_methods.len(), 5);
        assert_eq!(settings.billing.default_method(), "Pix");
        assert_eq!(settings.contracts.clauses.len(), 4);
        assert!(matches!(settings.storage, StorageSettings::Local { .. }));
    }

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            [company]
            name = "FROTA SUL"
            legal_name = "Frota Sul Locadora"
            system_name = "Frota Sul Desk"

            [billing]
            payment_methods = ["Boleto", "Pix"]

            [contracts]
            output_dir = "/tmp/contracts"
            clauses = ["Uma cláusula."]

            [storage]
            backend = "http"
            url = "https://example.supabase.co"
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.company.name, "FROTA SUL");
        assert_eq!(settings.billing.default_method(), "Boleto");
        assert_eq!(settings.contracts.output_dir, PathBuf::from("/tmp/contracts"));
        assert_eq!(settings.contracts.clauses, vec!["Uma cláusula.".to_string()]);
        match settings.storage {
            StorageSettings::Http { url, bucket } => {
                assert_eq!(url, "https://example.supabase.co");
                assert_eq!(bucket, "ora-documents");
            }
            StorageSettings::Local { .. } => panic!("expected http storage"),
        }
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = load_settings("/nonexistent/fleet-desk/config.toml").unwrap();
        assert_eq!(settings.company.legal_name, "ORA CARS - Gestão de Frotas");
    }

    #[test]
    fn test_malformed_settings_are_rejected() {
        assert!(parse_settings("[billing]\npayment_methods = 3").is_err());
    }
}

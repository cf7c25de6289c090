//! Object storage for customer documents.
//!
//! [`HttpObjectStore`] talks to the hosted backend's storage REST API. [`LocalObjectStore`]
//! writes into a plain directory and is used for development and tests.

use crate::{
    config::settings::StorageSettings,
    errors::{Error, Result},
};
use async_trait::async_trait;
use std::{path::PathBuf, sync::Arc};

/// Environment variable holding the storage API key.
pub const STORAGE_API_KEY_VAR: &str = "STORAGE_API_KEY";

/// A bucket that accepts uploads and serves them at a public URL.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` at `path` inside the bucket.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// Public URL for an object previously uploaded at `path`.
    fn public_url(&self, path: &str) -> String;
}

/// Guesses a MIME type from the object path's extension.
#[must_use]
pub fn content_type_for(path: &str) -> String {
    mime_guess::from_path(path).first_or_octet_stream().to_string()
}

/// Hosted storage API client.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    api_key: String,
}

impl HttpObjectStore {
    /// Creates a client for `bucket` under the project at `base_url`.
    #[must_use]
    pub fn new(base_url: &str, bucket: &str, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            api_key,
        }
    }

    fn upload_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let response = self
            .client
            .post(self.upload_url(path))
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%status, %path, "Storage upload rejected");
        Err(Error::Storage {
            message: format!("{status}: {body}"),
        })
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}

/// Directory-backed store.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    /// Creates a store rooted at `root`, served under `public_base_url`.
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> Result<()> {
        if path.split('/').any(|segment| segment == "..") {
            return Err(Error::Storage {
                message: format!("refusing path outside the store: {path}"),
            });
        }

        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }
}

/// Builds the store described by the settings.
///
/// The HTTP backend needs `STORAGE_API_KEY` in the environment.
pub fn store_from_settings(settings: &StorageSettings) -> Result<Arc<dyn ObjectStore>> {
    match settings {
        StorageSettings::Http { url, bucket } => {
            let api_key = std::env::var(STORAGE_API_KEY_VAR).map_err(|e| Error::Config {
                message: format!("{STORAGE_API_KEY_VAR} is required for http storage: {e}"),
            })?;
            Ok(Arc::new(HttpObjectStore::new(url, bucket, api_key)))
        }
        StorageSettings::Local {
            directory,
            public_base_url,
        } => Ok(Arc::new(LocalObjectStore::new(directory.clone(), public_base_url))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("documents/1_cnh_2.JPG"), "image/jpeg");
        assert_eq!(content_type_for("documents/1_cnh_2.png"), "image/png");
        assert_eq!(content_type_for("documents/1_cnh_2.webp"), "image/webp");
        assert_eq!(content_type_for("documents/1_residence_3.pdf"), "application/pdf");
        assert_eq!(content_type_for("documents/1_residence_3.heic"), "image/heic");
        assert_eq!(content_type_for("documents/1_cnh_2"), "application/octet-stream");
    }

    #[test]
    fn test_http_store_urls() {
        let store = HttpObjectStore::new("https://abc.supabase.co/", "ora-documents", "key".to_string());
        assert_eq!(
            store.upload_url("documents/a.png"),
            "https://abc.supabase.co/storage/v1/object/ora-documents/documents/a.png"
        );
        assert_eq!(
            store.public_url("documents/a.png"),
            "https://abc.supabase.co/storage/v1/object/public/ora-documents/documents/a.png"
        );
    }

    #[tokio::test]
    async fn test_local_store_rejects_parent_segments() {
        let store = LocalObjectStore::new(std::env::temp_dir(), "file:///tmp");
        let result = store.upload("../escape.png", vec![0], "image/png").await;
        assert!(matches!(result, Err(Error::Storage { .. })));
    }

    #[test]
    fn test_local_store_from_default_settings() {
        let store = store_from_settings(&StorageSettings::default());
        assert!(store.is_ok_and(|s| s.public_url("x.png") == "file://data/documents/x.png"));
    }
}

//! Open Library client for resolving books by ISBN

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    config::OpenLibraryConfig,
    error::{AppError, AppResult},
};

/// Named entry in an Open Library record, such as an author or a
/// publisher
#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

/// Book record as returned by the Open Library Books API. Every field
/// is required; records missing one are rejected as malformed.
#[derive(Debug, Clone, Deserialize)]
pub struct VolumeRecord {
    pub title: String,
    pub subtitle: String,
    pub publishers: Vec<NamedRef>,
    pub authors: Vec<NamedRef>,
    pub publish_date: String,
    pub number_of_pages: i32,
    pub url: String,
}

/// External source of book records. `Ok(None)` means the provider does
/// not know the ISBN; transport and decoding failures are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookLookup: Send + Sync {
    async fn fetch_by_isbn(&self, isbn: &str) -> AppResult<Option<VolumeRecord>>;
}

#[derive(Clone)]
pub struct OpenLibraryClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenLibraryClient {
    pub fn new(config: &OpenLibraryConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl BookLookup for OpenLibraryClient {
    async fn fetch_by_isbn(&self, isbn: &str) -> AppResult<Option<VolumeRecord>> {
        let key = format!("ISBN:{}", isbn);
        let url = format!(
            "{}?bibkeys={}&format=json&jscmd=data",
            self.base_url, key
        );

        tracing::debug!("Fetching {} from Open Library", key);

        let body: Value = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::OpenLibrary(format!("Open Library request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::OpenLibrary(format!("Open Library returned an error: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::OpenLibrary(format!("Open Library response unreadable: {}", e)))?;

        // An unknown ISBN comes back as an empty object, not an error
        let Some(record) = body.get(&key) else {
            return Ok(None);
        };

        let record: VolumeRecord = serde_json::from_value(record.clone())
            .map_err(|e| AppError::OpenLibrary(format!("Open Library record malformed: {}", e)))?;

        Ok(Some(record))
    }
}

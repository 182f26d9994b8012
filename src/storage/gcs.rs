use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::gcp::TokenProvider;
use crate::jenkins::BuildReference;

use super::{console_log_path, LogDocument, LogStore};

const STORAGE_API_URL: &str = "https://storage.googleapis.com/storage/v1";

pub struct GcsLogStore {
    client: Client,
    tokens: Arc<TokenProvider>,
    bucket: String,
}

impl GcsLogStore {
    pub fn new(tokens: Arc<TokenProvider>, bucket: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Retrieval(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            tokens,
            bucket: bucket.to_string(),
        })
    }
}

#[async_trait]
impl LogStore for GcsLogStore {
    async fn fetch_console_log(&self, reference: &BuildReference) -> Result<LogDocument> {
        let object = console_log_path(reference);
        // Object names must be fully percent-encoded in the JSON API path.
        let url = format!(
            "{STORAGE_API_URL}/b/{}/o/{}?alt=media",
            self.bucket,
            urlencoding::encode(&object)
        );

        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| AppError::Retrieval(e.to_string()))?;

        tracing::info!(bucket = %self.bucket, object = %object, "Downloading console log");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("GCS request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Retrieval(format!(
                "GCS returned {status} for bucket {}, object {object}: {body}",
                self.bucket
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to read log body: {e}")))?;

        let log = LogDocument::new(text);
        tracing::info!(bytes = log.byte_length, "Console log downloaded");
        Ok(log)
    }
}

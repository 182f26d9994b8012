pub mod gcs;

use async_trait::async_trait;

use crate::error::Result;
use crate::jenkins::BuildReference;

/// A build's full console log, loaded into memory for the duration of one
/// pipeline run.
#[derive(Debug, Clone)]
pub struct LogDocument {
    pub text: String,
    pub byte_length: usize,
}

impl LogDocument {
    pub fn new(text: String) -> Self {
        let byte_length = text.len();
        Self { text, byte_length }
    }
}

#[async_trait]
pub trait LogStore: Send + Sync {
    /// Fetch the console log for a build. One attempt, no streaming.
    async fn fetch_console_log(&self, reference: &BuildReference) -> Result<LogDocument>;
}

/// Object path of a build's console log within the logs bucket.
pub fn console_log_path(reference: &BuildReference) -> String {
    format!(
        "ci/{}/{}/{}/{}/console.log",
        reference.directory, reference.job_name, reference.branch, reference.build_number
    )
}

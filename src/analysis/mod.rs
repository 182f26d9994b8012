pub mod extract;
pub mod prompt;
pub mod vertex;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::storage::LogDocument;

const NOT_IDENTIFIED: &str = "Not identified";

/// The model's verdict on a failed build. Any key the model omits falls back
/// to "Not identified"; keys beyond these three are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AnalysisResult {
    #[serde(default = "not_identified")]
    pub root_cause: String,
    #[serde(default = "not_identified")]
    pub team_responsible: String,
    #[serde(default = "not_identified")]
    pub suggested_solution: String,
}

fn not_identified() -> String {
    NOT_IDENTIFIED.to_string()
}

#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Send a prompt to the model and return its raw text reply.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct Analyzer {
    model: Arc<dyn GenerativeModel>,
    max_log_bytes: usize,
}

impl Analyzer {
    pub fn new(model: Arc<dyn GenerativeModel>, max_log_bytes: usize) -> Self {
        Self {
            model,
            max_log_bytes,
        }
    }

    /// Ask the model to classify the failure in a console log.
    pub async fn analyze(&self, log: &LogDocument) -> Result<AnalysisResult> {
        let prompt_text = prompt::failure_analysis_prompt(&log.text, self.max_log_bytes);

        let reply = self.model.generate(&prompt_text).await?;
        tracing::debug!(reply = %reply, "Model reply received");

        let json = extract::extract_json(&reply)?;
        let result: AnalysisResult = serde_json::from_str(json)
            .map_err(|e| AppError::Analysis(format!("Model reply is not valid JSON: {e}")))?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedModel {
        reply: String,
    }

    #[async_trait]
    impl GenerativeModel for CannedModel {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.reply.clone())
        }
    }

    fn analyzer_with_reply(reply: &str) -> Analyzer {
        Analyzer::new(
            Arc::new(CannedModel {
                reply: reply.to_string(),
            }),
            256 * 1024,
        )
    }

    #[tokio::test]
    async fn test_fenced_reply_with_all_keys() {
        let analyzer = analyzer_with_reply(
            "```json\n{\"root_cause\":\"OOM on agent\",\"team_responsible\":\"platform\",\"suggested_solution\":\"Raise the heap limit\"}\n```",
        );
        let result = analyzer
            .analyze(&LogDocument::new("FATAL: out of memory".to_string()))
            .await
            .unwrap();

        assert_eq!(result.root_cause, "OOM on agent");
        assert_eq!(result.team_responsible, "platform");
        assert_eq!(result.suggested_solution, "Raise the heap limit");
    }

    #[tokio::test]
    async fn test_missing_key_defaults() {
        let analyzer = analyzer_with_reply(
            "```json\n{\"root_cause\":\"Flaky test\",\"suggested_solution\":\"Rerun\"}\n```",
        );
        let result = analyzer
            .analyze(&LogDocument::new("tests failed".to_string()))
            .await
            .unwrap();

        assert_eq!(result.team_responsible, "Not identified");
        assert_eq!(result.root_cause, "Flaky test");
    }

    #[tokio::test]
    async fn test_extra_keys_ignored() {
        let analyzer = analyzer_with_reply(
            "{\"root_cause\":\"X\",\"team_responsible\":\"Y\",\"suggested_solution\":\"Z\",\"confidence\":0.9}",
        );
        let result = analyzer
            .analyze(&LogDocument::new("log".to_string()))
            .await
            .unwrap();
        assert_eq!(result.root_cause, "X");
    }

    #[tokio::test]
    async fn test_garbage_reply_fails() {
        let analyzer = analyzer_with_reply("The build failed because of reasons.");
        let err = analyzer
            .analyze(&LogDocument::new("log".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Analysis(_)));
    }
}

use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Jenkins build status URL to triage. May also be given on the
    /// command line, which takes precedence.
    #[serde(default)]
    pub status_url: Option<String>,
    pub slack: SlackConfig,
    #[serde(default)]
    pub gcp: GcpConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Deserialize, Clone)]
pub struct SlackConfig {
    pub token: String,
    pub channel: String,
    /// Timestamp of the message the triage report replies to.
    pub thread_ts: String,
}

// Manual Debug impl to avoid leaking the bot token
impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("token", &"[REDACTED]")
            .field("channel", &self.channel)
            .field("thread_ts", &self.thread_ts)
            .finish()
    }
}

#[derive(Deserialize, Clone, Default)]
pub struct GcpConfig {
    #[serde(default)]
    pub project_id: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Service account key as inline JSON.
    #[serde(default)]
    pub credentials: Option<String>,
    /// Path to a service account key file; used when `credentials` is unset.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
}

// Manual Debug impl to avoid leaking the service account key
impl std::fmt::Debug for GcpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpConfig")
            .field("project_id", &self.project_id)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field(
                "credentials",
                &self.credentials.as_ref().map(|_| "[REDACTED]"),
            )
            .field("credentials_path", &self.credentials_path)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_model")]
    pub name: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    /// Tail-truncation budget for the log text embedded in the prompt.
    #[serde(default = "default_max_log_bytes")]
    pub max_log_bytes: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_log_bytes: default_max_log_bytes(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    /// When disabled, the pipeline only announces the build in the thread;
    /// no log is fetched and no model is called.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}

fn default_region() -> String {
    "europe-west1".to_string()
}

fn default_bucket() -> String {
    "ci-build-logs".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_top_p() -> f32 {
    0.9
}

fn default_top_k() -> u32 {
    40
}

fn default_max_log_bytes() -> usize {
    256 * 1024 // 256 KB
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_enabled() -> bool {
    true
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            // Try default paths
            builder = builder.add_source(config::File::with_name("ci-triage").required(false));
        }

        // Environment variable overrides with CI_TRIAGE_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("CI_TRIAGE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// Pre-flight validation: every required value must be present before the
    /// first network call is made.
    pub fn validate(&self, status_url: Option<&str>) -> Result<()> {
        if status_url
            .or(self.status_url.as_deref())
            .map_or(true, |u| u.is_empty())
        {
            return Err(AppError::Config(
                "status URL is required (argument or status_url setting)".to_string(),
            ));
        }
        if self.slack.token.is_empty() {
            return Err(AppError::Config("slack.token is required".to_string()));
        }
        if self.slack.channel.is_empty() {
            return Err(AppError::Config("slack.channel is required".to_string()));
        }
        if self.slack.thread_ts.is_empty() {
            return Err(AppError::Config("slack.thread_ts is required".to_string()));
        }

        if self.analysis.enabled {
            if self.gcp.project_id.is_empty() {
                return Err(AppError::Config(
                    "gcp.project_id is required when analysis is enabled".to_string(),
                ));
            }
            if self.gcp.credentials.is_none() && self.gcp.credentials_path.is_none() {
                return Err(AppError::Config(
                    "gcp.credentials or gcp.credentials_path is required when analysis is enabled"
                        .to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn slack_token(&self) -> &str {
        &self.slack.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            status_url: None,
            slack: SlackConfig {
                token: "xoxb-test".to_string(),
                channel: "C012345".to_string(),
                thread_ts: "1712345678.000100".to_string(),
            },
            gcp: GcpConfig {
                project_id: "test-project".to_string(),
                credentials: Some("{}".to_string()),
                ..GcpConfig::default()
            },
            model: ModelConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        let config = base_config();
        assert!(config.validate(Some("https://ci.example.com/job/a/job/b/job/c/1")).is_ok());
    }

    #[test]
    fn test_missing_status_url_fails() {
        let config = base_config();
        let err = config.validate(None).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_missing_slack_token_fails() {
        let mut config = base_config();
        config.slack.token.clear();
        assert!(config.validate(Some("https://ci/x")).is_err());
    }

    #[test]
    fn test_gcp_required_only_with_analysis() {
        let mut config = base_config();
        config.gcp.project_id.clear();
        config.gcp.credentials = None;
        assert!(config.validate(Some("https://ci/x")).is_err());

        config.analysis.enabled = false;
        assert!(config.validate(Some("https://ci/x")).is_ok());
    }

    #[test]
    fn test_secrets_redacted_in_debug() {
        let config = base_config();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("xoxb-test"));
        assert!(rendered.contains("[REDACTED]"));
    }
}

use std::sync::Arc;

use crate::analysis::vertex::VertexModel;
use crate::analysis::{Analyzer, GenerativeModel};
use crate::config::AppConfig;
use crate::error::Result;
use crate::gcp::TokenProvider;
use crate::jenkins::BuildReference;
use crate::notify::slack::SlackNotifier;
use crate::notify::{analysis_text, announcement_text, Notifier, ThreadMessage};
use crate::storage::gcs::GcsLogStore;
use crate::storage::LogStore;

const NOTIFY_TIMEOUT_SECS: u64 = 30;

/// One triage run: parse the status URL, announce the build in the thread,
/// fetch its console log, ask the model for a verdict, and report back.
///
/// Execution is strictly forward and fail-fast: the first error ends the run
/// and the remaining stages are skipped. With analysis disabled the run stops
/// after the announcement, and no GCP client is ever constructed.
pub struct Pipeline {
    config: AppConfig,
    store: Option<Arc<dyn LogStore>>,
    analyzer: Option<Analyzer>,
    notifier: Arc<dyn Notifier>,
}

impl Pipeline {
    pub fn new(
        config: AppConfig,
        store: Option<Arc<dyn LogStore>>,
        model: Option<Arc<dyn GenerativeModel>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let analyzer = model.map(|m| Analyzer::new(m, config.model.max_log_bytes));
        Self {
            config,
            store,
            analyzer,
            notifier,
        }
    }

    /// Wire up the real Slack, GCS, and Vertex AI clients.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let notifier: Arc<dyn Notifier> =
            Arc::new(SlackNotifier::new(&config.slack, NOTIFY_TIMEOUT_SECS)?);

        let (store, model) = if config.analysis.enabled {
            let tokens = Arc::new(TokenProvider::new(&config.gcp)?);
            let store: Arc<dyn LogStore> = Arc::new(GcsLogStore::new(
                Arc::clone(&tokens),
                &config.gcp.bucket,
                config.model.timeout_secs,
            )?);
            let model: Arc<dyn GenerativeModel> =
                Arc::new(VertexModel::new(tokens, &config.gcp, &config.model)?);
            (Some(store), Some(model))
        } else {
            (None, None)
        };

        Ok(Self::new(config.clone(), store, model, notifier))
    }

    pub async fn run(&self, status_url: &str) -> Result<()> {
        let reference = BuildReference::parse(status_url)?;
        tracing::info!(
            directory = %reference.directory,
            job = %reference.job_name,
            branch = %reference.branch,
            build = %reference.build_number,
            "Build identified"
        );

        self.post(announcement_text(&reference)).await?;

        if !self.config.analysis.enabled {
            tracing::info!("Analysis disabled; announcement only");
            return Ok(());
        }

        let outcome = self.analyze_and_report(&reference).await;

        if let Err(err) = &outcome {
            // Best-effort failure notice; its own failure must not mask the
            // original error.
            let _ = self
                .post(format!(
                    ":warning: Jenkins AI analysis could not be completed: {err}"
                ))
                .await;
        }

        outcome
    }

    async fn analyze_and_report(&self, reference: &BuildReference) -> Result<()> {
        // `from_config` populates both whenever analysis is enabled.
        let (Some(store), Some(analyzer)) = (&self.store, &self.analyzer) else {
            tracing::warn!("Analysis enabled but no log store or model wired up");
            return Ok(());
        };

        let log = store.fetch_console_log(reference).await?;
        let result = analyzer.analyze(&log).await?;
        tracing::info!(
            root_cause = %result.root_cause,
            team = %result.team_responsible,
            "Analysis complete"
        );

        self.post(analysis_text(&result)).await
    }

    async fn post(&self, text: String) -> Result<()> {
        self.notifier
            .post_to_thread(&ThreadMessage {
                channel: self.config.slack.channel.clone(),
                thread_ts: self.config.slack.thread_ts.clone(),
                text,
            })
            .await
    }
}

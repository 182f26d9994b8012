pub mod slack;

use async_trait::async_trait;

use crate::analysis::AnalysisResult;
use crate::error::Result;
use crate::jenkins::BuildReference;

/// One threaded chat message. Built, dispatched, and dropped; never stored.
#[derive(Debug, Clone)]
pub struct ThreadMessage {
    pub channel: String,
    pub thread_ts: String,
    pub text: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post a message as a threaded reply.
    async fn post_to_thread(&self, message: &ThreadMessage) -> Result<()>;
}

/// The greeting posted right after the build is identified.
pub fn announcement_text(reference: &BuildReference) -> String {
    format!(
        "Hello :wave:! This is the :robot_face: Jenkins AI analysis for \
         <{}|job> `{}/{}`, branch `{}`, build number `{}`:",
        reference.status_url,
        reference.directory,
        reference.job_name,
        reference.branch,
        reference.build_number
    )
}

/// The final report carrying the model's verdict.
pub fn analysis_text(result: &AnalysisResult) -> String {
    format!(
        "\n:robot_face: *Jenkins AI Analysis* :sparkles:\n\n\
         * :mag_right: *Likely Root Cause:* {}\n\n\
         * :handshake: *Team responsible:* {}\n\n\
         * :bulb: *Suggested Solution/Next Steps:* {}\n",
        result.root_cause, result.team_responsible, result.suggested_solution
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_announcement_names_the_build() {
        let reference = BuildReference::parse(
            "https://ci.example.com/job/mas-stack/job/mm-monorepo-build/job/PR-70374/1",
        )
        .unwrap();
        let text = announcement_text(&reference);

        assert!(text.contains("<https://ci.example.com/job/mas-stack/job/mm-monorepo-build/job/PR-70374/1|job>"));
        assert!(text.contains("`mas-stack/mm-monorepo-build`"));
        assert!(text.contains("branch `PR-70374`"));
        assert!(text.contains("build number `1`"));
    }

    #[test]
    fn test_analysis_text_carries_all_fields() {
        let result = AnalysisResult {
            root_cause: "Unit test failures".to_string(),
            team_responsible: "mas-billing".to_string(),
            suggested_solution: "Review unit test reports".to_string(),
        };
        let text = analysis_text(&result);

        assert!(text.contains("*Likely Root Cause:* Unit test failures"));
        assert!(text.contains("*Team responsible:* mas-billing"));
        assert!(text.contains("*Suggested Solution/Next Steps:* Review unit test reports"));
    }
}

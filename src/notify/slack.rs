use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::SlackConfig;
use crate::error::{AppError, Result};

use super::{Notifier, ThreadMessage};

const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

pub struct SlackNotifier {
    client: Client,
    token: String,
}

#[derive(Debug, Serialize)]
struct PostMessagePayload<'a> {
    channel: &'a str,
    text: &'a str,
    thread_ts: &'a str,
}

/// Slack replies 200 even for logical failures; the body's `ok` flag is the
/// real verdict, with `error` naming the reason.
#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackNotifier {
    pub fn new(config: &SlackConfig, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Notification(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn post_to_thread(&self, message: &ThreadMessage) -> Result<()> {
        let payload = PostMessagePayload {
            channel: &message.channel,
            text: &message.text,
            thread_ts: &message.thread_ts,
        };

        let response = self
            .client
            .post(POST_MESSAGE_URL)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Notification(format!("Slack request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Notification(format!("Failed to read Slack response: {e}")))?;

        check_response(status.as_u16(), &body)?;

        tracing::info!(channel = %message.channel, "Message posted to Slack thread");
        Ok(())
    }
}

/// A post succeeded only if the transport status is 2xx AND the body reports
/// `ok: true`.
fn check_response(status: u16, body: &str) -> Result<()> {
    if !(200..300).contains(&status) {
        return Err(AppError::Notification(format!(
            "Slack returned {status}: {body}"
        )));
    }

    let parsed: PostMessageResponse = serde_json::from_str(body)
        .map_err(|e| AppError::Notification(format!("Invalid Slack response body: {e}")))?;

    if !parsed.ok {
        return Err(AppError::Notification(format!(
            "Slack rejected the message: {}",
            parsed.error.unwrap_or_else(|| "unknown error".to_string())
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_and_logical_success() {
        assert!(check_response(200, r#"{"ok":true}"#).is_ok());
    }

    #[test]
    fn test_ok_false_despite_200() {
        let err = check_response(200, r#"{"ok":false,"error":"channel_not_found"}"#).unwrap_err();
        assert!(matches!(err, AppError::Notification(_)));
        assert!(err.to_string().contains("channel_not_found"));
    }

    #[test]
    fn test_transport_failure() {
        let err = check_response(500, "internal error").unwrap_err();
        assert!(matches!(err, AppError::Notification(_)));
    }

    #[test]
    fn test_unparsable_body() {
        assert!(check_response(200, "not json").is_err());
    }
}

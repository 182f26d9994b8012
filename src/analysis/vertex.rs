use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{GcpConfig, ModelConfig};
use crate::error::{AppError, Result};
use crate::gcp::TokenProvider;

use super::GenerativeModel;

/// Gemini via the Vertex AI `generateContent` REST endpoint.
pub struct VertexModel {
    client: Client,
    tokens: Arc<TokenProvider>,
    url: String,
    model_name: String,
    generation_config: GenerationConfig,
}

impl VertexModel {
    pub fn new(tokens: Arc<TokenProvider>, gcp: &GcpConfig, model: &ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(model.timeout_secs))
            .build()
            .map_err(|e| AppError::Analysis(format!("Failed to build HTTP client: {e}")))?;

        let url = format!(
            "https://{region}-aiplatform.googleapis.com/v1/projects/{project}/locations/{region}/publishers/google/models/{model}:generateContent",
            region = gcp.region,
            project = gcp.project_id,
            model = model.name,
        );

        Ok(Self {
            client,
            tokens,
            url,
            model_name: model.name.clone(),
            generation_config: GenerationConfig {
                temperature: model.temperature,
                top_p: model.top_p,
                top_k: model.top_k,
            },
        })
    }
}

#[async_trait]
impl GenerativeModel for VertexModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: self.generation_config.clone(),
        };

        tracing::info!(model = %self.model_name, "Calling Gemini via Vertex AI");

        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| AppError::Analysis(e.to_string()))?;

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Analysis(format!("Vertex AI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Analysis(format!(
                "Vertex AI returned {status}: {body}"
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::Analysis(format!("Invalid Vertex AI response: {e}")))?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::Analysis("Vertex AI response contained no candidate text".to_string())
            })?;

        Ok(text)
    }
}

// --- Request types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

// --- Response types ---

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

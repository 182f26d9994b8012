use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::GcpConfig;
use crate::error::{AppError, Result};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Relevant fields of a service account key file.
#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default)]
    token_uri: Option<String>,
}

#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

/// Exchanges a service account JWT assertion for short-lived access tokens
/// and caches them until shortly before expiry. Shared by the storage and
/// Vertex AI clients.
#[derive(Debug)]
pub struct TokenProvider {
    client: Client,
    key: ServiceAccountKey,
    cached: Arc<RwLock<Option<(String, chrono::DateTime<chrono::Utc>)>>>,
}

impl TokenProvider {
    pub fn new(config: &GcpConfig) -> Result<Self> {
        let key_json = match (&config.credentials, &config.credentials_path) {
            (Some(inline), _) => inline.clone(),
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!(
                    "Failed to read service account key at {}: {e}",
                    path.display()
                ))
            })?,
            (None, None) => {
                return Err(AppError::Config(
                    "No GCP credentials configured".to_string(),
                ))
            }
        };

        let key: ServiceAccountKey = serde_json::from_str(&key_json)
            .map_err(|e| AppError::Config(format!("Invalid service account key: {e}")))?;

        Ok(Self {
            client: Client::new(),
            key,
            cached: Arc::new(RwLock::new(None)),
        })
    }

    /// Get a bearer token for the cloud-platform scope.
    pub async fn access_token(&self) -> Result<String> {
        // Check cache
        {
            let cache = self.cached.read().await;
            if let Some((token, expiry)) = cache.as_ref() {
                if *expiry > chrono::Utc::now() + chrono::Duration::minutes(5) {
                    return Ok(token.clone());
                }
            }
        }

        let assertion = self.signed_assertion()?;
        let token_uri = self.key.token_uri.as_deref().unwrap_or(TOKEN_URL);

        let response = self
            .client
            .post(token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Config(format!("Token exchange request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Config(format!(
                "Token exchange returned {status}: {body}"
            )));
        }

        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            #[serde(default = "default_expires_in")]
            expires_in: i64,
        }

        fn default_expires_in() -> i64 {
            3600
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Config(format!("Invalid token response: {e}")))?;

        let expires_at = chrono::Utc::now() + chrono::Duration::seconds(body.expires_in);

        // Cache the token
        let mut cache = self.cached.write().await;
        *cache = Some((body.access_token.clone(), expires_at));

        Ok(body.access_token)
    }

    fn signed_assertion(&self) -> Result<String> {
        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| AppError::Config(format!("Invalid RSA private key: {e}")))?;

        let now = chrono::Utc::now().timestamp();
        let claims = JwtClaims {
            iss: self.key.client_email.clone(),
            scope: SCOPE.to_string(),
            aud: self
                .key
                .token_uri
                .clone()
                .unwrap_or_else(|| TOKEN_URL.to_string()),
            iat: now - 60, // 60 seconds in the past to account for clock drift
            exp: now + 10 * 60,
        };

        let header = Header::new(Algorithm::RS256);
        encode(&header, &claims, &encoding_key)
            .map_err(|e| AppError::Config(format!("Failed to sign JWT assertion: {e}")))
    }
}

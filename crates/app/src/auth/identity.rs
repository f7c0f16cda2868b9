//! Identity provider client for bearer credential verification.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

/// Configuration for connecting to the identity provider.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Identity provider base address, e.g. `"http://localhost:9099"`.
    pub addr: String,

    /// Service credential presented alongside verification requests.
    pub api_key: String,
}

/// Claims decoded from a verified credential.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifiedClaims {
    pub uid: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub role: Option<String>,
}

/// HTTP client for the identity provider's token verification endpoint.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    config: IdentityConfig,
    http: Client,
}

impl IdentityClient {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: IdentityConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Verify a bearer credential.
    ///
    /// Returns `Ok(None)` when the provider rejects the credential.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or an unexpected response body.
    pub async fn verify(&self, token: &str) -> Result<Option<VerifiedClaims>, IdentityError> {
        let url = format!("{}/v1/tokens/verify", self.config.addr);

        let body = serde_json::json!({ "token": token });

        let response = self
            .http
            .post(&url)
            .header("X-Api-Key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Ok(None),
            status if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();

                return Err(IdentityError::UnexpectedResponse(format!(
                    "verify request failed with status {status}: {text}"
                )));
            }
            _ => {}
        }

        let parsed: VerifyResponse = response.json().await?;

        Ok(parsed.data)
    }
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    data: Option<VerifiedClaims>,
}

/// Errors that can occur when communicating with the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a non-2xx response or unexpected body.
    #[error("unexpected response from identity provider: {0}")]
    UnexpectedResponse(String),
}

//! HTTP calls to the identity toolkit and secure-token APIs.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::error::CallError;
use super::wire::{ErrorEnvelope, RefreshRequest, RefreshResponse};
use crate::config::FirebaseIdentityPluginConfig;

pub struct RestClient {
    http: reqwest::Client,
    identity_toolkit_url: String,
    secure_token_url: String,
    api_key: SecretString,
}

impl RestClient {
    pub fn from_config(cfg: &FirebaseIdentityPluginConfig) -> Result<Self, CallError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| CallError::Unexpected(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            identity_toolkit_url: cfg.identity_toolkit_url.trim_end_matches('/').to_owned(),
            secure_token_url: cfg.secure_token_url.trim_end_matches('/').to_owned(),
            api_key: cfg.api_key.clone(),
        })
    }

    fn endpoint(&self, base: &str, path: &str) -> Result<Url, CallError> {
        let mut url = Url::parse(&format!("{base}/{path}"))
            .map_err(|e| CallError::Unexpected(format!("invalid provider url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());
        Ok(url)
    }

    /// Call an identity toolkit method such as `accounts:signUp`.
    pub async fn toolkit<B, T>(&self, method: &str, body: &B) -> Result<T, CallError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(&self.identity_toolkit_url, method)?;
        debug!(method, "identity toolkit call");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;
        read_response(response).await
    }

    /// Exchange a refresh token for a new ID token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, CallError> {
        let url = self.endpoint(&self.secure_token_url, "token")?;
        debug!("secure token refresh");
        let response = self
            .http
            .post(url)
            .form(&RefreshRequest {
                grant_type: "refresh_token",
                refresh_token,
            })
            .send()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;
        read_response(response).await
    }
}

async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CallError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| CallError::Transport(e.to_string()))?;

    if status.is_success() {
        return serde_json::from_slice(&bytes)
            .map_err(|e| CallError::Unexpected(format!("malformed provider response: {e}")));
    }

    if status.is_client_error()
        && let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(&bytes)
    {
        return Err(CallError::from_provider_message(&envelope.error.message));
    }

    Err(CallError::Unexpected(format!(
        "provider responded with status {status}"
    )))
}

/// Parse the `expiresIn` seconds string returned by the provider.
pub fn parse_expires_in(value: &str) -> Result<Duration, CallError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| CallError::Unexpected(format!("invalid expiresIn '{value}'")))
}

//! Backend API client.
//!
//! The client never consults session state. It asks the identity provider
//! for a credential right before each request, so a token refreshed by the
//! provider is picked up immediately and a signed-out user sends anonymous
//! requests.

use std::sync::Arc;
use std::time::Duration;

use identity_sdk::IdentityProviderClient;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::ApiClientConfig;
use crate::error::ApiClientError;

/// HTTP client that attaches the caller's bearer credential.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    provider: Arc<dyn IdentityProviderClient>,
}

impl ApiClient {
    /// Build a client for `cfg.base_url` backed by `provider`.
    ///
    /// # Errors
    ///
    /// `InvalidUrl` if the base URL does not parse, `Network` if the HTTP
    /// client cannot be built.
    pub fn new(
        cfg: &ApiClientConfig,
        provider: Arc<dyn IdentityProviderClient>,
    ) -> Result<Self, ApiClientError> {
        Url::parse(&cfg.base_url).map_err(|e| ApiClientError::InvalidUrl(e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(ApiClientError::Network)?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            provider,
        })
    }

    #[must_use]
    pub fn provider(&self) -> &Arc<dyn IdentityProviderClient> {
        &self.provider
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiClientError> {
        let path = path.trim_start_matches('/');
        let mut url = Url::parse(&format!("{}/{path}", self.base_url))
            .map_err(|e| ApiClientError::InvalidUrl(e.to_string()))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Start a request with the JSON content type and, when the provider
    /// has a signed-in user, the bearer credential.
    ///
    /// # Errors
    ///
    /// `Credential` if the provider fails to mint a token, `InvalidUrl` if
    /// the path does not form a valid URL.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<RequestBuilder, ApiClientError> {
        let url = self.url(path, query)?;
        let credential = self.provider.get_credential().await?;
        debug!(%method, path, authenticated = credential.is_some(), "api request");

        let builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(match credential {
            Some(credential) => builder.bearer_auth(credential.expose()),
            None => builder,
        })
    }

    /// Send a prepared request and decode its JSON body.
    ///
    /// # Errors
    ///
    /// `Network` on transport failure, `Api` on a non-2xx status, `Decode`
    /// if the body is not the expected JSON.
    pub async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiClientError> {
        let response = builder.send().await.map_err(ApiClientError::Network)?;
        decode(response).await
    }

    /// `GET path?query`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiClientError> {
        let builder = self.request(Method::GET, path, query).await?;
        self.send(builder).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path, &[]).await?.json(body);
        self.send(builder).await
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PUT, path, &[]).await?.json(body);
        self.send(builder).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiClientError> {
        let builder = self.request(Method::DELETE, path, &[]).await?;
        self.send(builder).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiClientError> {
    let status = response.status();
    let body = response.bytes().await.map_err(ApiClientError::Network)?;
    debug!(status = status.as_u16(), bytes = body.len(), "api response");

    if !status.is_success() {
        return Err(ApiClientError::Api {
            status: status.as_u16(),
            message: error_message(status, &body),
        });
    }

    // Some endpoints answer 2xx with an empty body.
    let body: &[u8] = if body.is_empty() { b"null" } else { &body };
    serde_json::from_slice(body).map_err(ApiClientError::Decode)
}

/// The JSON `message` field, else the raw body, else the status reason.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_slice(body)
        && let Some(serde_json::Value::String(message)) = map.get("message")
    {
        return message.clone();
    }

    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim();
    if !raw.is_empty() {
        return raw.to_owned();
    }

    status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_owned(), str::to_owned)
}

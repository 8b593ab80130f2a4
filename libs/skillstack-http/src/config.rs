use serde::Deserialize;

/// Backend API client configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiClientConfig {
    /// Base URL every request path is appended to.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://skill-stack-server.vercel.app".to_owned(),
            timeout_secs: 30,
        }
    }
}

//! Configuration for the Firebase identity plugin.

use secrecy::SecretString;
use serde::Deserialize;

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FirebaseIdentityPluginConfig {
    /// Web API key of the Firebase project.
    pub api_key: SecretString,

    /// Base URL of the identity toolkit API.
    pub identity_toolkit_url: String,

    /// Base URL of the secure-token API.
    pub secure_token_url: String,

    /// Redirect URI sent with federated sign-in assertions.
    pub request_uri: String,

    /// Refresh token of a previous session, restored when the initial state
    /// resolves.
    pub refresh_token: Option<SecretString>,

    /// ID tokens expiring within this many seconds are refreshed first.
    pub refresh_window_secs: u64,

    /// Request timeout for provider calls.
    pub timeout_secs: u64,
}

impl Default for FirebaseIdentityPluginConfig {
    fn default() -> Self {
        Self {
            api_key: SecretString::default(),
            identity_toolkit_url: "https://identitytoolkit.googleapis.com/v1".to_owned(),
            secure_token_url: "https://securetoken.googleapis.com/v1".to_owned(),
            request_uri: "http://localhost".to_owned(),
            refresh_token: None,
            refresh_window_secs: 300,
            timeout_secs: 30,
        }
    }
}

//! Configuration for the static identity plugin.

use secrecy::SecretString;
use serde::Deserialize;

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticIdentityPluginConfig {
    /// Accounts that exist at startup.
    pub accounts: Vec<AccountConfig>,

    /// Email of the account restored as signed in when the initial state
    /// resolves. `None` starts signed out.
    pub initial_session: Option<String>,

    /// Federated ID tokens accepted by federated sign-in.
    pub federated: Vec<FederatedMapping>,

    /// Prefix of minted bearer tokens.
    pub token_prefix: String,

    /// Minimum password length accepted by account creation.
    pub min_password_length: usize,
}

impl Default for StaticIdentityPluginConfig {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            initial_session: None,
            federated: Vec::new(),
            token_prefix: "static".to_owned(),
            min_password_length: 6,
        }
    }
}

/// One seeded account.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountConfig {
    pub id: String,
    pub email: String,
    pub password: SecretString,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub disabled: bool,
}

/// Maps a federated ID token to the account it signs in.
///
/// The account is created on first federated sign-in when missing.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FederatedMapping {
    pub id_token: String,
    pub account: AccountConfig,
}

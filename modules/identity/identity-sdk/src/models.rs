//! Domain models shared by identity provider adapters and their consumers.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// The signed-in principal's public profile as known to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Provider-assigned unique identifier.
    pub id: String,
    /// Display name, if the user set one.
    pub display_name: Option<String>,
    /// Account email.
    pub email: String,
    /// Avatar image URL, if the user set one.
    pub avatar_url: Option<String>,
    /// Whether the provider verified the email address.
    pub email_verified: bool,
}

impl Identity {
    /// Create an identity with only the mandatory fields set.
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            email: email.into(),
            avatar_url: None,
            email_verified: false,
        }
    }

    /// Apply a profile patch; `None` fields keep their current value.
    pub fn apply(&mut self, patch: &IdentityPatch) {
        if let Some(name) = &patch.display_name {
            self.display_name = Some(name.clone());
        }
        if let Some(url) = &patch.avatar_url {
            self.avatar_url = Some(url.clone());
        }
    }
}

/// Current identity as delivered by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdentityState {
    /// Nobody is signed in.
    #[default]
    SignedOut,
    /// A principal is signed in.
    SignedIn(Identity),
}

impl IdentityState {
    /// The signed-in identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::SignedOut => None,
            Self::SignedIn(identity) => Some(identity),
        }
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }
}

impl From<Option<Identity>> for IdentityState {
    fn from(value: Option<Identity>) -> Self {
        value.map_or(Self::SignedOut, Self::SignedIn)
    }
}

/// Display attributes to change on the current identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPatch {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl IdentityPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.avatar_url.is_none()
    }
}

/// Email/password pair submitted to the provider.
///
/// The password is wrapped in `SecretString` so `Debug` redacts it.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Expose the password for the provider request body.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

/// Short-lived signed token proving the holder is the current identity.
///
/// Minted per request and never cached by application code.
#[derive(Debug)]
pub struct BearerCredential {
    token: SecretString,
}

impl BearerCredential {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }

    /// Raw token value for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.token.expose_secret()
    }
}

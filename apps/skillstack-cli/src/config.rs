//! Application configuration.

use std::path::Path;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use firebase_identity_plugin::FirebaseIdentityPluginConfig;
use serde::Deserialize;
use skillstack_http::ApiClientConfig;
use skillstack_session::RoutePolicyConfig;
use static_identity_plugin::StaticIdentityPluginConfig;

/// Prefix of environment overrides, e.g. `SKILLSTACK__API__BASE_URL`.
pub const ENV_PREFIX: &str = "SKILLSTACK__";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub api: ApiClientConfig,
    pub identity: IdentityConfig,
    pub routes: RoutePolicyConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Static,
    Firebase,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    pub provider: ProviderKind,
    pub firebase: FirebaseIdentityPluginConfig,
    #[serde(rename = "static")]
    pub static_accounts: StaticIdentityPluginConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Layer the optional YAML file and `SKILLSTACK__` environment overrides.
    ///
    /// # Errors
    ///
    /// Unreadable file, malformed YAML or unknown keys.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            anyhow::ensure!(path.exists(), "config file {} not found", path.display());
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::extract(&figment)
    }

    fn extract(figment: &Figment) -> anyhow::Result<Self> {
        figment.extract().context("invalid configuration")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn from_yaml(yaml: &str) -> anyhow::Result<AppConfig> {
        AppConfig::extract(&Figment::new().merge(Yaml::string(yaml)))
    }

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = from_yaml("{}").unwrap();

        assert_eq!(cfg.identity.provider, ProviderKind::Static);
        assert_eq!(cfg.api.base_url, "https://skill-stack-server.vercel.app");
        assert_eq!(cfg.routes.login_path, "/login");
        assert_eq!(cfg.logging.level, "info");
        assert!(!cfg.logging.json);
    }

    #[test]
    fn reads_nested_sections() {
        let cfg = from_yaml(
            r#"
api:
  base_url: "http://localhost:5000"
identity:
  provider: firebase
  firebase:
    api_key: "key-1"
  static:
    accounts:
      - id: u1
        email: a@b.com
        password: "Secret#123"
    initial_session: a@b.com
routes:
  protected: ["/admin"]
logging:
  json: true
"#,
        )
        .unwrap();

        assert_eq!(cfg.api.base_url, "http://localhost:5000");
        assert_eq!(cfg.api.timeout_secs, 30);
        assert_eq!(cfg.identity.provider, ProviderKind::Firebase);
        assert_eq!(cfg.identity.firebase.api_key.expose_secret(), "key-1");
        assert_eq!(cfg.identity.static_accounts.accounts.len(), 1);
        assert_eq!(
            cfg.identity.static_accounts.initial_session.as_deref(),
            Some("a@b.com")
        );
        assert_eq!(cfg.routes.protected, vec!["/admin".to_owned()]);
        assert!(cfg.logging.json);
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = from_yaml(
            r#"
identity:
  firebase:
    api_key: "key-secret"
    refresh_token: "refresh-secret"
  static:
    accounts:
      - id: u1
        email: a@b.com
        password: "password-secret"
"#,
        )
        .unwrap();

        let debug = format!("{cfg:?}");
        assert!(debug.contains("a@b.com"));
        for secret in ["key-secret", "refresh-secret", "password-secret"] {
            assert!(!debug.contains(secret), "{secret} leaked");
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(from_yaml("api:\n  base_uri: x\n").is_err());
        assert!(from_yaml("identity:\n  provider: ldap\n").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/skillstack.yaml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}

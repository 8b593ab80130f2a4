//! Static identity provider plugin.
//!
//! Keeps accounts in memory, seeded from configuration. Implements
//! `IdentityProviderClient` so the session layer and the HTTP client can run
//! against it without a hosted identity service. A fault switch simulates
//! provider outages.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;

pub use config::{AccountConfig, FederatedMapping, StaticIdentityPluginConfig};
pub use domain::Service;

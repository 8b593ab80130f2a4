//! Firebase identity provider plugin.
//!
//! Talks to the Firebase identity toolkit REST API (`accounts:*`) and the
//! secure-token endpoint. Keeps the provider-issued ID token and refresh
//! token in memory, refreshes the ID token when it is about to expire, and
//! publishes every identity change through an `IdentityListeners` registry.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;

pub use config::FirebaseIdentityPluginConfig;
pub use domain::Service;

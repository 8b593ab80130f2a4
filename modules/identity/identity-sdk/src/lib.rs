//! Identity SDK
//!
//! This crate provides the public API shared by every identity provider
//! adapter:
//!
//! - [`IdentityProviderClient`] - Adapter trait consumed by the session layer
//! - [`FederatedConsent`] - Interactive consent step for federated sign-in
//! - [`Identity`], [`IdentityState`], [`IdentityPatch`] - Identity models
//! - [`Credentials`], [`BearerCredential`] - Secret-bearing inputs and outputs
//! - [`IdentityListeners`], [`Subscription`] - Identity-change listener registry
//! - [`IdentityError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use identity_sdk::{IdentityProviderClient, IdentityState};
//!
//! let subscription = provider.subscribe(Arc::new(|state: &IdentityState| {
//!     tracing::info!(signed_in = state.is_signed_in(), "identity changed");
//! }));
//!
//! let credential = provider.get_credential().await?;
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod consent;
pub mod error;
pub mod listeners;
pub mod models;

// Re-export main types at crate root
pub use api::IdentityProviderClient;
pub use consent::{FederatedAssertion, FederatedConsent};
pub use error::IdentityError;
pub use listeners::{IdentityListener, IdentityListeners, Subscription};
pub use models::{BearerCredential, Credentials, Identity, IdentityPatch, IdentityState};

//! Authenticated HTTP client for the SkillStack backend API.
//!
//! - [`ApiClient`] - attaches a freshly minted bearer credential per request
//! - [`ApiClientConfig`] - base URL and timeout
//! - [`ApiClientError`] - transport, status, credential and decode failures
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod client;
pub mod config;
pub mod error;

pub use client::ApiClient;
pub use config::ApiClientConfig;
pub use error::ApiClientError;
pub use reqwest::Method;

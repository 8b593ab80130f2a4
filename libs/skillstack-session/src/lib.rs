//! Client session lifecycle.
//!
//! - [`SessionContext`] - shared identity state with a resolution phase
//! - [`RouteGuard`], [`RoutePolicy`] - navigation gating
//! - [`PendingNavigation`] - where to continue after sign-in
//! - [`AuthFlows`] - sign-in, registration and sign-out
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod context;
pub mod flows;
pub mod guard;
pub mod navigation;
pub mod password;
pub mod routes;

pub use context::{SessionContext, SessionState};
pub use flows::{AuthFlows, RegistrationError, RegistrationForm};
pub use guard::{GuardOutcome, RouteGuard};
pub use navigation::PendingNavigation;
pub use password::{PasswordPolicyViolation, validate_password};
pub use routes::{RoutePolicy, RoutePolicyConfig, RoutePolicyError};

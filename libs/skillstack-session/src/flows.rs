//! Sign-in, registration and sign-out flows.
//!
//! Successful sign-in and registration return the path to continue to: the
//! pending navigation target when the route guard recorded one, `/`
//! otherwise.

use std::sync::Arc;

use identity_sdk::{Credentials, IdentityError, IdentityPatch};
use secrecy::{ExposeSecret, SecretString};
use skillstack_courses::{CoursesApi, CoursesError, RegistrationRecord};
use thiserror::Error;
use tracing::{info, warn};

use crate::context::SessionContext;
use crate::navigation::PendingNavigation;
use crate::password::{PasswordPolicyViolation, validate_password};

pub const DEFAULT_REDIRECT: &str = "/";

/// Sign-up form input.
#[derive(Debug)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub photo_url: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    pub accepted_terms: bool,
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Password(#[from] PasswordPolicyViolation),

    #[error("You must accept the terms and conditions.")]
    TermsNotAccepted,

    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The account exists but the backend did not store its profile record.
    #[error("failed to store registration record: {0}")]
    Record(#[source] CoursesError),
}

/// User-facing authentication flows over the shared session.
#[derive(Clone)]
pub struct AuthFlows {
    session: Arc<SessionContext>,
    pending: Arc<PendingNavigation>,
    courses: CoursesApi,
}

impl AuthFlows {
    #[must_use]
    pub fn new(
        session: Arc<SessionContext>,
        pending: Arc<PendingNavigation>,
        courses: CoursesApi,
    ) -> Self {
        Self {
            session,
            pending,
            courses,
        }
    }

    fn continue_to(&self) -> String {
        self.pending
            .take()
            .unwrap_or_else(|| DEFAULT_REDIRECT.to_owned())
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// The provider's error, unchanged. The pending target is kept for a
    /// retry.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<String, IdentityError> {
        let identity = self.session.provider().sign_in(credentials).await?;
        info!(user_id = %identity.id, "signed in");
        Ok(self.continue_to())
    }

    /// Sign in through the federated provider.
    ///
    /// # Errors
    ///
    /// The provider's error, unchanged; `UserCancelled` when the user
    /// dismissed the consent step.
    pub async fn sign_in_with_federated_provider(&self) -> Result<String, IdentityError> {
        let identity = self
            .session
            .provider()
            .sign_in_with_federated_provider()
            .await?;
        info!(user_id = %identity.id, "signed in with federated provider");
        Ok(self.continue_to())
    }

    /// Create an account, set its profile and store the backend record.
    ///
    /// # Errors
    ///
    /// `Password` or `TermsNotAccepted` before anything is sent,
    /// `Identity` if account creation or the profile update fails,
    /// `Record` if the backend rejects the profile record.
    pub async fn register(&self, form: &RegistrationForm) -> Result<String, RegistrationError> {
        validate_password(
            form.password.expose_secret(),
            form.confirm_password.expose_secret(),
            &form.email,
        )?;
        if !form.accepted_terms {
            return Err(RegistrationError::TermsNotAccepted);
        }

        let provider = self.session.provider();
        let credentials = Credentials::new(form.email.trim(), form.password.expose_secret());
        let created = provider.create_account(&credentials).await?;
        provider
            .update_profile(IdentityPatch {
                display_name: Some(form.name.clone()),
                avatar_url: Some(form.photo_url.clone()).filter(|url| !url.is_empty()),
            })
            .await?;

        let record = RegistrationRecord {
            name: form.name.clone(),
            email: created.email.clone(),
            accepted_terms: form.accepted_terms,
            photo_url: form.photo_url.clone(),
        };
        if let Err(e) = self.courses.register_user(&record).await {
            warn!(user_id = %created.id, error = %e, "registration record rejected");
            return Err(RegistrationError::Record(e));
        }

        info!(user_id = %created.id, "registered");
        Ok(self.continue_to())
    }

    /// Sign out and forget any pending navigation target.
    pub async fn sign_out(&self) {
        self.pending.discard();
        self.session.provider().sign_out().await;
        info!("signed out");
    }
}

//! Client implementation for the Firebase identity plugin.
//!
//! Implements `IdentityProviderClient` using the domain service.

use async_trait::async_trait;
use identity_sdk::{
    BearerCredential, Credentials, Identity, IdentityError, IdentityListener, IdentityPatch,
    IdentityProviderClient, Subscription,
};

use super::service::Service;

#[async_trait]
impl IdentityProviderClient for Service {
    async fn create_account(&self, credentials: &Credentials) -> Result<Identity, IdentityError> {
        Service::create_account(self, credentials).await
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, IdentityError> {
        Service::sign_in(self, credentials).await
    }

    async fn sign_in_with_federated_provider(&self) -> Result<Identity, IdentityError> {
        let consent = self.consent().ok_or_else(|| {
            IdentityError::ProviderUnavailable("no federated consent flow configured".to_owned())
        })?;
        let assertion = consent.obtain_consent().await?;
        self.sign_in_federated(&assertion).await
    }

    async fn update_profile(&self, patch: IdentityPatch) -> Result<Identity, IdentityError> {
        Service::update_profile(self, &patch).await
    }

    async fn sign_out(&self) {
        Service::sign_out(self).await;
    }

    async fn get_credential(&self) -> Result<Option<BearerCredential>, IdentityError> {
        Service::get_credential(self).await
    }

    fn subscribe(&self, listener: IdentityListener) -> Subscription {
        self.listeners().subscribe(listener)
    }
}

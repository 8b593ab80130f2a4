#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Firebase plugin against a mocked identity toolkit.

use std::sync::Arc;

use async_trait::async_trait;
use firebase_identity_plugin::{FirebaseIdentityPluginConfig, Service};
use httpmock::prelude::*;
use identity_sdk::{
    Credentials, FederatedAssertion, FederatedConsent, IdentityError, IdentityPatch,
    IdentityProviderClient, IdentityState, Subscription,
};
use parking_lot::Mutex;
use secrecy::SecretString;
use serde_json::json;

const API_KEY: &str = "test-key";

fn config(server: &MockServer) -> FirebaseIdentityPluginConfig {
    FirebaseIdentityPluginConfig {
        api_key: API_KEY.into(),
        identity_toolkit_url: format!("{}/v1", server.base_url()),
        secure_token_url: format!("{}/st", server.base_url()),
        ..FirebaseIdentityPluginConfig::default()
    }
}

type Seen = Arc<Mutex<Vec<IdentityState>>>;

fn record(provider: &dyn IdentityProviderClient) -> (Seen, Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = provider.subscribe(Arc::new(move |state: &IdentityState| {
        sink.lock().push(state.clone());
    }));
    (seen, sub)
}

async fn mock_sign_in(server: &MockServer, expires_in: &str) {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/accounts:signInWithPassword")
                .query_param("key", API_KEY);
            then.status(200).json_body(json!({
                "localId": "uid-1",
                "email": "ann@example.com",
                "idToken": "id-token-1",
                "refreshToken": "refresh-1",
                "expiresIn": expires_in,
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/accounts:lookup");
            then.status(200).json_body(json!({
                "users": [{
                    "localId": "uid-1",
                    "email": "ann@example.com",
                    "displayName": "Ann",
                    "emailVerified": true,
                }]
            }));
        })
        .await;
}

fn provider_error(message: &str) -> serde_json::Value {
    json!({ "error": { "code": 400, "message": message } })
}

#[tokio::test]
async fn sign_in_establishes_session_and_notifies() {
    let server = MockServer::start_async().await;
    mock_sign_in(&server, "3600").await;

    let service = Service::from_config(&config(&server)).unwrap();
    service.resolve_initial_state().await.unwrap();
    let (seen, _sub) = record(&service);

    let identity = service
        .sign_in(&Credentials::new("ann@example.com", "Secret#123"))
        .await
        .unwrap();
    assert_eq!(identity.id, "uid-1");
    assert_eq!(identity.display_name.as_deref(), Some("Ann"));
    assert!(identity.email_verified);

    let credential = service.get_credential().await.unwrap().unwrap();
    assert_eq!(credential.expose(), "id-token-1");

    let seen = seen.lock();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], IdentityState::SignedOut);
    assert_eq!(seen[1].identity().map(|i| i.id.as_str()), Some("uid-1"));
}

#[tokio::test]
async fn wrong_password_maps_to_invalid_credentials() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/accounts:signInWithPassword");
            then.status(400).json_body(provider_error("INVALID_PASSWORD"));
        })
        .await;

    let service = Service::from_config(&config(&server)).unwrap();
    let err = service
        .sign_in(&Credentials::new("ann@example.com", "nope"))
        .await
        .unwrap_err();

    assert_eq!(err, IdentityError::InvalidCredentials);
    assert!(service.get_credential().await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_registration_maps_to_email_in_use() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/accounts:signUp");
            then.status(400).json_body(provider_error("EMAIL_EXISTS"));
        })
        .await;

    let service = Service::from_config(&config(&server)).unwrap();
    let err = service
        .create_account(&Credentials::new("ann@example.com", "Secret#123"))
        .await
        .unwrap_err();

    assert_eq!(err, IdentityError::EmailAlreadyInUse);
}

#[tokio::test]
async fn server_failure_maps_to_provider_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/accounts:signInWithPassword");
            then.status(503).body("upstream down");
        })
        .await;

    let service = Service::from_config(&config(&server)).unwrap();
    let err = service
        .sign_in(&Credentials::new("ann@example.com", "Secret#123"))
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::ProviderUnavailable(_)));
}

#[tokio::test]
async fn expiring_token_is_refreshed_once_under_concurrency() {
    let server = MockServer::start_async().await;
    mock_sign_in(&server, "60").await;
    let refresh = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/st/token")
                .query_param("key", API_KEY)
                .body_includes("grant_type=refresh_token")
                .body_includes("refresh_token=refresh-1");
            then.status(200).json_body(json!({
                "id_token": "id-token-2",
                "refresh_token": "refresh-2",
                "expires_in": "3600",
                "user_id": "uid-1",
            }));
        })
        .await;

    let service = Service::from_config(&config(&server)).unwrap();
    service
        .sign_in(&Credentials::new("ann@example.com", "Secret#123"))
        .await
        .unwrap();

    let (first, second) = tokio::join!(service.get_credential(), service.get_credential());
    assert_eq!(first.unwrap().unwrap().expose(), "id-token-2");
    assert_eq!(second.unwrap().unwrap().expose(), "id-token-2");

    refresh.assert_async().await;
}

#[tokio::test]
async fn revoked_refresh_signs_out() {
    let server = MockServer::start_async().await;
    mock_sign_in(&server, "10").await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/st/token");
            then.status(400).json_body(provider_error("TOKEN_EXPIRED"));
        })
        .await;

    let service = Service::from_config(&config(&server)).unwrap();
    service
        .sign_in(&Credentials::new("ann@example.com", "Secret#123"))
        .await
        .unwrap();
    let (seen, _sub) = record(&service);

    let err = service.get_credential().await.unwrap_err();
    assert_eq!(err, IdentityError::SessionExpired);
    assert_eq!(seen.lock().last(), Some(&IdentityState::SignedOut));

    assert!(service.get_credential().await.unwrap().is_none());
}

#[tokio::test]
async fn initial_state_restores_configured_refresh_token() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/st/token");
            then.status(200).json_body(json!({
                "id_token": "restored-id",
                "refresh_token": "refresh-3",
                "expires_in": "3600",
                "user_id": "uid-1",
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/accounts:lookup");
            then.status(200).json_body(json!({
                "users": [{ "localId": "uid-1", "email": "ann@example.com" }]
            }));
        })
        .await;

    let service = Service::from_config(&FirebaseIdentityPluginConfig {
        refresh_token: Some("stored-refresh".into()),
        ..config(&server)
    })
    .unwrap();
    let (seen, _sub) = record(&service);
    assert!(seen.lock().is_empty());

    service.resolve_initial_state().await.unwrap();

    assert_eq!(
        seen.lock().as_slice()[0].identity().map(|i| i.email.as_str()),
        Some("ann@example.com")
    );
    assert_eq!(
        service.get_credential().await.unwrap().unwrap().expose(),
        "restored-id"
    );
}

#[tokio::test]
async fn failed_restore_still_resolves_signed_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/st/token");
            then.status(400).json_body(provider_error("INVALID_REFRESH_TOKEN"));
        })
        .await;

    let service = Service::from_config(&FirebaseIdentityPluginConfig {
        refresh_token: Some("stale".into()),
        ..config(&server)
    })
    .unwrap();

    assert_eq!(
        service.resolve_initial_state().await.unwrap_err(),
        IdentityError::SessionExpired
    );
    assert_eq!(service.listeners().current(), Some(IdentityState::SignedOut));
}

#[tokio::test]
async fn sign_out_is_idempotent() {
    let server = MockServer::start_async().await;
    mock_sign_in(&server, "3600").await;

    let service = Service::from_config(&config(&server)).unwrap();
    service.resolve_initial_state().await.unwrap();
    service
        .sign_in(&Credentials::new("ann@example.com", "Secret#123"))
        .await
        .unwrap();
    let (seen, _sub) = record(&service);

    service.sign_out().await;
    service.sign_out().await;

    assert_eq!(seen.lock().len(), 2);
    assert_eq!(seen.lock()[1], IdentityState::SignedOut);
    assert!(service.get_credential().await.unwrap().is_none());
}

#[tokio::test]
async fn create_account_signs_up_and_notifies() {
    let server = MockServer::start_async().await;
    let sign_up = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/accounts:signUp")
                .query_param("key", API_KEY)
                .json_body(json!({
                    "email": "ann@example.com",
                    "password": "Secret#123",
                    "returnSecureToken": true,
                }));
            then.status(200).json_body(json!({
                "localId": "uid-9",
                "email": "ann@example.com",
                "idToken": "id-token-9",
                "refreshToken": "refresh-9",
                "expiresIn": "3600",
            }));
        })
        .await;

    let service = Service::from_config(&config(&server)).unwrap();
    service.resolve_initial_state().await.unwrap();
    let (seen, _sub) = record(&service);

    let identity = service
        .create_account(&Credentials::new("  ann@example.com ", "Secret#123"))
        .await
        .unwrap();

    sign_up.assert_async().await;
    assert_eq!(identity.id, "uid-9");
    assert_eq!(identity.email, "ann@example.com");
    assert_eq!(identity.display_name, None);
    assert!(!identity.email_verified);
    assert_eq!(
        seen.lock().last(),
        Some(&IdentityState::SignedIn(identity.clone()))
    );
    assert_eq!(
        service.get_credential().await.unwrap().unwrap().expose(),
        "id-token-9"
    );
}

struct GrantedConsent;

#[async_trait]
impl FederatedConsent for GrantedConsent {
    async fn obtain_consent(&self) -> Result<FederatedAssertion, IdentityError> {
        Ok(FederatedAssertion {
            provider_id: "google.com".to_owned(),
            id_token: SecretString::from("google-id-token".to_owned()),
        })
    }
}

#[tokio::test]
async fn federated_sign_in_posts_assertion_and_maps_profile() {
    let server = MockServer::start_async().await;
    let idp = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/accounts:signInWithIdp")
                .query_param("key", API_KEY)
                .json_body(json!({
                    "postBody": "id_token=google-id-token&providerId=google.com",
                    "requestUri": "https://app.example.com/auth",
                    "returnSecureToken": true,
                    "returnIdpCredential": true,
                }));
            then.status(200).json_body(json!({
                "localId": "uid-g",
                "email": "ann@gmail.com",
                "displayName": "Ann G",
                "photoUrl": "https://img.example.com/ann.png",
                "emailVerified": true,
                "idToken": "id-token-g",
                "refreshToken": "refresh-g",
                "expiresIn": "3600",
            }));
        })
        .await;

    let service = Service::from_config(&FirebaseIdentityPluginConfig {
        request_uri: "https://app.example.com/auth".to_owned(),
        ..config(&server)
    })
    .unwrap()
    .with_consent(Arc::new(GrantedConsent));
    let (seen, _sub) = record(&service);

    let identity = service.sign_in_with_federated_provider().await.unwrap();

    idp.assert_async().await;
    assert_eq!(identity.id, "uid-g");
    assert_eq!(identity.email, "ann@gmail.com");
    assert_eq!(identity.display_name.as_deref(), Some("Ann G"));
    assert_eq!(
        identity.avatar_url.as_deref(),
        Some("https://img.example.com/ann.png")
    );
    assert!(identity.email_verified);
    assert_eq!(
        seen.lock().last(),
        Some(&IdentityState::SignedIn(identity.clone()))
    );
}

#[tokio::test]
async fn federated_sign_in_without_consent_flow_is_unavailable() {
    let server = MockServer::start_async().await;
    let service = Service::from_config(&config(&server)).unwrap();

    assert!(matches!(
        service.sign_in_with_federated_provider().await,
        Err(IdentityError::ProviderUnavailable(_))
    ));
}

#[tokio::test]
async fn update_profile_sends_patch_and_notifies() {
    let server = MockServer::start_async().await;
    mock_sign_in(&server, "3600").await;
    let update = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/accounts:update")
                .query_param("key", API_KEY)
                .json_body(json!({
                    "idToken": "id-token-1",
                    "displayName": "Ann Lee",
                    "returnSecureToken": false,
                }));
            then.status(200)
                .json_body(json!({ "localId": "uid-1", "displayName": "Ann Lee" }));
        })
        .await;

    let service = Service::from_config(&config(&server)).unwrap();
    service
        .sign_in(&Credentials::new("ann@example.com", "Secret#123"))
        .await
        .unwrap();
    let (seen, _sub) = record(&service);

    let identity = service
        .update_profile(IdentityPatch {
            display_name: Some("Ann Lee".to_owned()),
            avatar_url: None,
        })
        .await
        .unwrap();

    update.assert_async().await;
    assert_eq!(identity.id, "uid-1");
    assert_eq!(identity.email, "ann@example.com");
    assert_eq!(identity.display_name.as_deref(), Some("Ann Lee"));
    assert!(identity.email_verified);
    let seen = seen.lock();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1], IdentityState::SignedIn(identity));
}

#[tokio::test]
async fn update_profile_requires_a_session() {
    let server = MockServer::start_async().await;
    let update = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/accounts:update");
            then.status(200).json_body(json!({}));
        })
        .await;

    let service = Service::from_config(&config(&server)).unwrap();
    let err = service
        .update_profile(IdentityPatch {
            display_name: Some("Ann".to_owned()),
            avatar_url: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err, IdentityError::NotSignedIn);
    update.assert_calls_async(0).await;
}

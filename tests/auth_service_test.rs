mod common;

use common::{FakeQuizApi, VALID_TOKEN};
use quiz_session::error::AuthError;
use quiz_session::models::{AccessToken, AuthMode, Credentials};
use quiz_session::services::{AuthService, ResumeOutcome};
use quiz_session::{MemoryTokenStore, TokenStore};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

fn service(store: MemoryTokenStore) -> (AuthService, Arc<FakeQuizApi>, Arc<MemoryTokenStore>) {
    let api = Arc::new(FakeQuizApi::new());
    let store = Arc::new(store);
    (AuthService::new(api.clone(), store.clone()), api, store)
}

#[tokio::test]
async fn test_login_persists_token_only_when_remembered() {
    let (auth, _api, store) = service(MemoryTokenStore::new());

    let identity = assert_ok!(
        auth.authenticate(AuthMode::Login, Credentials::new("a", "b"))
            .await
    );

    assert_eq!(identity.token, AccessToken::new(VALID_TOKEN));
    assert_eq!(identity.user.username.as_deref(), Some("a"));
    assert_eq!(store.load().await.unwrap(), None);

    assert_ok!(auth.remember(&identity).await);
    assert_eq!(
        store.load().await.unwrap(),
        Some(AccessToken::new(VALID_TOKEN))
    );
}

#[tokio::test]
async fn test_register_with_token_does_not_login_again() {
    let (auth, api, _store) = service(MemoryTokenStore::new());
    api.register_returns_token();

    assert_ok!(
        auth.authenticate(AuthMode::Register, Credentials::new("a", "b"))
            .await
    );
    assert_eq!(api.auth_calls(), vec![AuthMode::Register]);
}

#[tokio::test]
async fn test_rejection_carries_remote_message() {
    let (auth, _api, store) = service(MemoryTokenStore::new());

    let err = assert_err!(
        auth.authenticate(AuthMode::Login, Credentials::new("a", "nope"))
            .await
    );

    assert!(matches!(err, AuthError::Rejected { .. }));
    assert_eq!(err.user_message(), "Invalid credentials");
    assert_eq!(store.load().await.unwrap(), None);
}

#[tokio::test]
async fn test_blank_credentials_skip_remote_call() {
    let (auth, api, _store) = service(MemoryTokenStore::new());

    let err = assert_err!(
        auth.authenticate(AuthMode::Register, Credentials::new("  ", "b"))
            .await
    );

    assert!(matches!(err, AuthError::MissingCredentials));
    assert!(api.auth_calls().is_empty());
}

#[tokio::test]
async fn test_resume_outcomes() {
    let (auth, _api, _store) = service(MemoryTokenStore::new());
    assert_eq!(auth.resume(true).await, ResumeOutcome::NoToken);

    let (auth, _api, _store) =
        service(MemoryTokenStore::with_token(AccessToken::new(VALID_TOKEN)));
    match auth.resume(true).await {
        ResumeOutcome::Resumed(identity) => {
            assert_eq!(identity.user.quizzes_completed, 9);
            assert_eq!(identity.token, AccessToken::new(VALID_TOKEN));
        }
        other => panic!("unexpected: {:?}", other),
    }

    let (auth, _api, store) = service(MemoryTokenStore::with_token(AccessToken::new("stale")));
    assert!(matches!(
        auth.resume(true).await,
        ResumeOutcome::Expired { .. }
    ));
    assert_eq!(store.load().await.unwrap(), None);
}

#[tokio::test]
async fn test_resume_with_unreachable_server_keeps_token() {
    let (auth, api, store) = service(MemoryTokenStore::with_token(AccessToken::new(VALID_TOKEN)));
    api.progress_unavailable();

    assert!(matches!(
        auth.resume(true).await,
        ResumeOutcome::Unverified { .. }
    ));
    assert_eq!(
        store.load().await.unwrap(),
        Some(AccessToken::new(VALID_TOKEN))
    );
}

#[tokio::test]
async fn test_resume_without_validation_trusts_token() {
    let (auth, _api, store) = service(MemoryTokenStore::with_token(AccessToken::new("stale")));

    match auth.resume(false).await {
        ResumeOutcome::Resumed(identity) => {
            assert_eq!(identity.token, AccessToken::new("stale"))
        }
        other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(
        store.load().await.unwrap(),
        Some(AccessToken::new("stale"))
    );
}

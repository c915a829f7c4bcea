//! Authorization matrix tests
//!
//! Walk the point-lookup decision table over (caller level, ownership,
//! token presence) and verify both the allow/deny outcome and the redaction
//! applied to allowed responses.

use std::sync::Arc;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use registry_core::{
    obfuscate_secret, token::Claims, Application, Credentials, RegistryError, TokenVerifier,
    TrustLevel,
};
use registry_server::{Applications, MemoryRecordStore, RegistryService};

const TOKEN_KEY: &[u8] = b"authorization-matrix-key";

// =============================================================================
// Fixture: one registry with one app per trust level
// =============================================================================

/// Store layout used by every test:
///
/// - `admin`  — Root,     owned by "operator"
/// - `portal` — Master,   owned by "operator"
/// - `x`      — External, owned by "alice", secret "x-secret"
async fn registry() -> RegistryService {
    let apps = Applications::new(Arc::new(MemoryRecordStore::new()));
    for app in [
        Application::new("admin", "admin-secret")
            .with_level(TrustLevel::Root)
            .with_owner("operator"),
        Application::new("portal", "portal-secret")
            .with_level(TrustLevel::Master)
            .with_owner("operator"),
        Application::new("x", "x-secret")
            .with_level(TrustLevel::External)
            .with_owner("alice"),
    ] {
        apps.save(&app).await.unwrap();
    }
    RegistryService::new(apps, TokenVerifier::new(TOKEN_KEY))
}

fn creds(id: &str) -> Credentials {
    Credentials::new(id, format!("{id}-secret"))
}

fn user_token(subject: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &Claims {
            sub: subject.to_string(),
            exp: chrono::Utc::now().timestamp() + 3600,
        },
        &EncodingKey::from_secret(TOKEN_KEY),
    )
    .unwrap()
}

// =============================================================================
// Self-lookup
// =============================================================================

#[tokio::test]
async fn self_lookup_clears_secret_at_every_level() {
    let service = registry().await;
    for id in ["admin", "portal", "x"] {
        let app = service.get(&creds(id), None, id).await.unwrap();
        assert_eq!(app.id, id);
        // Never the literal stored secret, not even for Root
        assert_eq!(app.secret, "", "self-lookup by {id}");
    }
}

// =============================================================================
// Root visibility
// =============================================================================

#[tokio::test]
async fn root_sees_any_record_with_obfuscated_secret() {
    let service = registry().await;
    let app = service.get(&creds("admin"), None, "x").await.unwrap();
    assert_eq!(app.secret, obfuscate_secret("x-secret"));
    assert_ne!(app.secret, "x-secret");
}

// =============================================================================
// Master visibility
// =============================================================================

#[tokio::test]
async fn master_needs_token_for_non_self_lookup() {
    let service = registry().await;
    assert_eq!(
        service.get(&creds("portal"), None, "x").await.unwrap_err(),
        RegistryError::Unauthorized
    );
}

#[tokio::test]
async fn master_with_matching_subject_sees_obfuscated_record() {
    let service = registry().await;
    let token = user_token("alice");
    let app = service
        .get(&creds("portal"), Some(&token), "x")
        .await
        .unwrap();
    assert_eq!(app.secret, obfuscate_secret("x-secret"));
}

#[tokio::test]
async fn cross_owner_master_lookup_is_unauthorized() {
    let service = registry().await;
    // Valid Master credentials, valid token, wrong subject
    let token = user_token("bob");
    assert_eq!(
        service
            .get(&creds("portal"), Some(&token), "x")
            .await
            .unwrap_err(),
        RegistryError::Unauthorized
    );
}

#[tokio::test]
async fn master_with_invalid_token_is_forbidden() {
    let service = registry().await;
    assert_eq!(
        service
            .get(&creds("portal"), Some("garbage-token"), "x")
            .await
            .unwrap_err(),
        RegistryError::Forbidden
    );
}

// =============================================================================
// External visibility
// =============================================================================

#[tokio::test]
async fn external_caller_never_sees_other_records() {
    let service = registry().await;
    // Even a token naming the target's owner does not help
    let token = user_token("alice");
    for token in [None, Some(token.as_str())] {
        assert_eq!(
            service.get(&creds("x"), token, "admin").await.unwrap_err(),
            RegistryError::Unauthorized
        );
    }
}

// =============================================================================
// Authentication failures dominate
// =============================================================================

#[tokio::test]
async fn wrong_secret_is_forbidden_before_any_policy_check() {
    let service = registry().await;
    let bad = Credentials::new("admin", "not-the-secret");
    assert_eq!(
        service.get(&bad, None, "admin").await.unwrap_err(),
        RegistryError::Forbidden
    );
    assert_eq!(
        service.list(&bad, None).await.unwrap_err(),
        RegistryError::Forbidden
    );
}

#[tokio::test]
async fn lookup_of_missing_record_is_not_found_for_authorized_caller() {
    let service = registry().await;
    assert_eq!(
        service.get(&creds("admin"), None, "ghost").await.unwrap_err(),
        RegistryError::NotFound
    );
}

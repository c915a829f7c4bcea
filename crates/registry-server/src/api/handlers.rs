//! Application registry HTTP handlers
//!
//! Thin boundary over [`RegistryService`]: extract credentials and identity
//! token from headers, delegate, map the outcome. Application credentials
//! ride HTTP Basic auth (`key:secret`); the identity token rides the
//! `X-Identity-Token` header.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    Json,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use registry_core::{Application, Credentials};

use crate::api::error::ApiError;
use crate::service::RegistryService;

/// Header carrying the caller's identity token
pub const IDENTITY_TOKEN_HEADER: &str = "x-identity-token";

/// Application state shared across handlers
pub struct AppState {
    /// The registry service core
    pub service: RegistryService,
}

/// Parse application credentials from the Basic auth header
fn app_credentials(headers: &HeaderMap) -> Result<Credentials, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Forbidden("missing application credentials".into()))?;

    let encoded = value
        .strip_prefix("Basic ")
        .ok_or_else(|| ApiError::Forbidden("expected Basic credentials".into()))?;

    let decoded = STANDARD
        .decode(encoded)
        .map_err(|_| ApiError::Forbidden("malformed credentials".into()))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| ApiError::Forbidden("malformed credentials".into()))?;

    let (key, secret) = decoded
        .split_once(':')
        .ok_or_else(|| ApiError::Forbidden("malformed credentials".into()))?;

    Ok(Credentials::new(key, secret))
}

/// Extract the optional identity token header
fn identity_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(IDENTITY_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Request to register an application
#[derive(Debug, Deserialize)]
pub struct RegisterApplicationRequest {
    pub application: Application,
}

/// Response from application registration
#[derive(Debug, Serialize)]
pub struct RegisterApplicationResponse {
    pub id: String,
    pub message: String,
}

/// Register (or overwrite) an application record
///
/// POST /v1/apps
pub async fn register_application(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<RegisterApplicationRequest>,
) -> Result<Json<RegisterApplicationResponse>, ApiError> {
    if request.application.id.is_empty() {
        return Err(ApiError::BadRequest("application id cannot be empty".into()));
    }

    let creds = app_credentials(&headers)?;
    let token = identity_token(&headers);
    let id = request.application.id.clone();

    state
        .service
        .register(&creds, token.as_deref(), request.application)
        .await?;

    Ok(Json(RegisterApplicationResponse {
        id,
        message: "application registered".into(),
    }))
}

/// Response from application deregistration
#[derive(Debug, Serialize)]
pub struct DeregisterApplicationResponse {
    pub id: String,
    pub message: String,
}

/// Remove an application record
///
/// DELETE /v1/apps/{id}
pub async fn deregister_application(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeregisterApplicationResponse>, ApiError> {
    let creds = app_credentials(&headers)?;
    let token = identity_token(&headers);

    state.service.deregister(&creds, token.as_deref(), &id).await?;

    Ok(Json(DeregisterApplicationResponse {
        id,
        message: "application deregistered".into(),
    }))
}

/// Existence check response
#[derive(Debug, Serialize)]
pub struct CheckIfExistsResponse {
    pub exists: bool,
}

/// Check whether an application id is registered
///
/// GET /v1/apps/{id}/exists
pub async fn check_if_exists(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<CheckIfExistsResponse>, ApiError> {
    let creds = app_credentials(&headers)?;
    let exists = state.service.check_exists(&creds, &id).await?;
    Ok(Json(CheckIfExistsResponse { exists }))
}

/// Listing response
#[derive(Debug, Serialize)]
pub struct ListApplicationsResponse {
    /// Redacted application records visible to the caller
    pub applications: Vec<Application>,
    pub count: usize,
}

/// List applications visible to the caller
///
/// GET /v1/apps
pub async fn list_applications(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ListApplicationsResponse>, ApiError> {
    let creds = app_credentials(&headers)?;
    let token = identity_token(&headers);

    let applications = state.service.list(&creds, token.as_deref()).await?;
    let count = applications.len();
    debug!(count, "listing applications");

    Ok(Json(ListApplicationsResponse { applications, count }))
}

/// Point lookup response
#[derive(Debug, Serialize)]
pub struct GetApplicationResponse {
    pub application: Application,
}

/// Fetch one application record, redacted for the caller
///
/// GET /v1/apps/{id}
pub async fn get_application(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<GetApplicationResponse>, ApiError> {
    let creds = app_credentials(&headers)?;
    let token = identity_token(&headers);

    let application = state.service.get(&creds, token.as_deref(), &id).await?;
    Ok(Json(GetApplicationResponse { application }))
}

/// Request to verify an authentication challenge
#[derive(Debug, Deserialize)]
pub struct VerifyChallengeRequest {
    /// Hex-encoded nonce
    pub nonce: String,
    /// Hex-encoded HMAC-SHA256 of the nonce under the target's secret
    pub challenge: String,
}

/// Challenge verification response
#[derive(Debug, Serialize)]
pub struct VerifyChallengeResponse {
    pub verified: bool,
}

/// Verify a shared-secret authentication challenge
///
/// POST /v1/apps/{id}/challenge
///
/// Deliberately unauthenticated; possession of the secret is the proof.
pub async fn verify_challenge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<VerifyChallengeRequest>,
) -> Result<Json<VerifyChallengeResponse>, ApiError> {
    let verified = state
        .service
        .verify_challenge(&id, &request.nonce, &request.challenge)
        .await?;
    Ok(Json(VerifyChallengeResponse { verified }))
}

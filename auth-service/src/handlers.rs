use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use common_auth::{parse_bearer, AuthContext, Role};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::issuer::IssuerError;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub timestamp: i64,
}

impl AuthResponse {
    fn new(message: &'static str, email: String) -> Self {
        Self {
            message,
            token: None,
            email,
            role: None,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), IssuerError> {
    let session = state
        .issuer
        .register(&request.email, &request.password, request.role.as_deref())
        .await?;

    let body = AuthResponse::new("User registered successfully", session.identity)
        .with_token(session.token)
        .with_role(session.role);
    Ok((StatusCode::CREATED, Json(body)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, IssuerError> {
    let session = state.issuer.login(&request.email, &request.password).await?;

    let body = AuthResponse::new("Login successful", session.identity)
        .with_token(session.token)
        .with_role(session.role);
    Ok(Json(body))
}

pub async fn validate(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<AuthResponse>, IssuerError> {
    let (email, role) = state.issuer.validate(&auth.token, Utc::now()).await?;

    Ok(Json(
        AuthResponse::new("Token is valid", email).with_role(role),
    ))
}

pub async fn refresh(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<AuthResponse>, IssuerError> {
    let session = state.issuer.refresh(&auth.token).await?;

    Ok(Json(
        AuthResponse::new("Token refreshed successfully", session.identity)
            .with_token(session.token),
    ))
}

// Logout differs from the other bearer endpoints: a missing header is a 400,
// not a 401, and nothing is invalidated server-side.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AuthResponse>, IssuerError> {
    let token = bearer_token(&headers).ok_or(IssuerError::MalformedRequest)?;
    let email = state.issuer.logout(&token)?;

    Ok(Json(AuthResponse::new("Logout successful", email)))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| parse_bearer(value).ok())
}

use crate::config::AdminAccount;
use crate::errors::AppError;
use crate::models::{LoginRequest, LoginResponse, User};
use crate::state::AppState;
use crate::validation;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// Issued bearer tokens. They live for the lifetime of the process.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    tokens: RwLock<HashSet<String>>,
}

impl TokenRegistry {
    pub async fn issue(&self) -> String {
        let token = Uuid::new_v4().to_string();
        self.tokens.write().await.insert(token.clone());
        token
    }

    pub async fn is_valid(&self, token: &str) -> bool {
        self.tokens.read().await.contains(token)
    }

    pub async fn revoke(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token)
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Checks the request against the configured account and issues a token.
pub async fn login(
    admin: &AdminAccount,
    tokens: &TokenRegistry,
    request: &LoginRequest,
) -> Result<LoginResponse, AppError> {
    validation::login(request)?;
    let email_matches = request.email.trim().eq_ignore_ascii_case(&admin.email);
    if !email_matches || request.password != admin.password {
        warn!(email = %request.email, "rejected login");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let token = tokens.issue().await;
    info!(email = %admin.email, "login succeeded");
    Ok(LoginResponse {
        token,
        user: User {
            id: "1".to_string(),
            email: admin.email.clone(),
            name: admin.name.clone(),
        },
    })
}

/// Rejects requests without a live bearer token with 401.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(request.headers()).map(str::to_owned) else {
        return Err(AppError::unauthorized("Access token required"));
    };
    if !state.tokens.is_valid(&token).await {
        return Err(AppError::unauthorized("Invalid or expired token"));
    }
    Ok(next.run(request).await)
}

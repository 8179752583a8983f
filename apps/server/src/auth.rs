//! JWT authentication module.
//!
//! Handles session token generation and validation, and the middleware
//! that turns a bearer token into a [`CurrentUser`].
//!
//! ```text
//! POST /api/auth/login ──► verify password ──► JwtManager::issue() ──► token
//!
//! GET /api/... + "Authorization: Bearer <token>"
//!       │
//!       ▼
//! require_auth ──► JwtManager::validate() ──► load user row ──► CurrentUser
//!       │                                       (401 when deleted)
//!       ▼
//! handler ──► user.require(Capability::...) ──► 403 when missing
//! ```
//!
//! The token only proves who the caller is. Role and outlet come from the
//! stored user on every request, so demoting or deleting an account takes
//! effect immediately.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use laundry_core::{Capability, Role, User};

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    pub username: String,

    pub role: Role,

    /// Outlet the user is assigned to, if any
    pub outlet_id: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
#[derive(Clone)]
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        JwtManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Issue a session token for a user.
    pub fn issue(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            outlet_id: user.outlet_id.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Validate and decode a token.
    pub fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(token_data.claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Session Identity
// =============================================================================

/// The authenticated caller, taken from a verified token.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub outlet_id: Option<String>,
}

impl CurrentUser {
    /// Fails with 403 when the role lacks `capability`.
    pub fn require(&self, capability: Capability) -> Result<(), ApiError> {
        self.role.require(capability).map_err(|e| {
            tracing::debug!(user = %self.username, role = %self.role, %capability, "Capability denied");
            ApiError::from(e)
        })
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        CurrentUser {
            id: user.id,
            username: user.username,
            role: user.role,
            outlet_id: user.outlet_id,
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Middleware that verifies the bearer token and stores the caller in the
/// request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let token = extract_bearer_token(header)
        .ok_or_else(|| ApiError::unauthorized("Invalid Authorization format"))?;

    let claims = state.jwt.validate(token).map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        e
    })?;

    let user = state
        .db
        .users()
        .get_by_id(&claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::debug!(user_id = %claims.sub, "Token belongs to a deleted user");
            ApiError::unauthorized("Session is no longer valid")
        })?;

    if user.role != claims.role {
        tracing::debug!(
            user_id = %user.id,
            token_role = %claims.role,
            role = %user.role,
            "Role changed since the token was issued"
        );
    }

    request.extensions_mut().insert(CurrentUser::from(user));

    Ok(next.run(request).await)
}

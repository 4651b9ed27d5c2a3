use axum::{
    extract::{FromRef, FromRequestParts, State},
    http::{request::Parts, StatusCode},
    Json,
};
use std::sync::Arc;

use famshare_api::{crypto, AuthTokenResponse, LoginRequest, SignupRequest, UserResponse};
use famshare_store::Store;

use crate::config::AppConfig;
use crate::error::ApiErr;
use crate::extract::ApiJson;

// ---------------------------------------------------------------------------
// Auth extractor
// ---------------------------------------------------------------------------

/// Authenticated user resolved from `Authorization: Bearer <jwt>`.
///
/// The token must verify and its subject must still exist.
pub struct AuthUser {
    pub user_id: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<Store>: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiErr;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = Arc::<Store>::from_ref(state);
        let config = AppConfig::from_ref(state);

        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ApiErr::unauthorized("missing or invalid Authorization header"))?;

        if config.jwt_secret.is_empty() {
            return Err(ApiErr::unauthorized("authentication is not configured"));
        }
        let user_id = crypto::verify_jwt(token, &config.jwt_secret, now_unix())?;

        let user = store
            .find_user(&user_id)?
            .ok_or_else(|| ApiErr::unauthorized("user no longer exists"))?;
        Ok(AuthUser { user_id: user.id })
    }
}

pub(crate) fn now_unix() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

fn issue_token(config: &AppConfig, user: &UserResponse) -> Result<AuthTokenResponse, ApiErr> {
    Ok(AuthTokenResponse {
        token: crypto::sign_jwt(&user.id, &user.username, &config.jwt_secret, now_unix())?,
        expires_in: crypto::JWT_EXPIRY_SECS,
        user_id: user.id.clone(),
        username: user.username.clone(),
    })
}

fn require_jwt_secret(config: &AppConfig) -> Result<(), ApiErr> {
    if config.jwt_secret.is_empty() {
        return Err(ApiErr::internal("authentication is not configured"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Signup / login
// ---------------------------------------------------------------------------

/// POST /api/auth/signup — create an account and return a token.
pub async fn signup(
    State(store): State<Arc<Store>>,
    State(config): State<AppConfig>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<AuthTokenResponse>), ApiErr> {
    if !config.registration_open {
        return Err(ApiErr::forbidden("registration is currently closed"));
    }
    require_jwt_secret(&config)?;

    let user = store.signup(&req.username, &req.email, &req.password)?;
    Ok((StatusCode::CREATED, Json(issue_token(&config, &user)?)))
}

/// POST /api/auth/login — exchange username + password for a token.
pub async fn login(
    State(store): State<Arc<Store>>,
    State(config): State<AppConfig>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthTokenResponse>, ApiErr> {
    require_jwt_secret(&config)?;
    let user = store.login(&req.username, &req.password)?;
    Ok(Json(issue_token(&config, &user)?))
}

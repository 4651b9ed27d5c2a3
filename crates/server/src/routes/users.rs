use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use famshare_api::{
    ChangePasswordRequest, OkResponse, UpdateEmailRequest, UpdateUsernameRequest, UserResponse,
};
use famshare_store::Store;

use crate::error::ApiErr;
use crate::extract::ApiJson;
use crate::routes::auth::AuthUser;

/// GET /api/users/{id} — the caller's own account.
pub async fn get_user(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiErr> {
    Ok(Json(store.get_user(&user.user_id, &id)?))
}

/// PUT /api/users/{id}/name
pub async fn update_username(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateUsernameRequest>,
) -> Result<Json<UserResponse>, ApiErr> {
    Ok(Json(store.update_username(&user.user_id, &id, &req.username)?))
}

/// PUT /api/users/{id}/email
pub async fn update_email(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateEmailRequest>,
) -> Result<Json<UserResponse>, ApiErr> {
    Ok(Json(store.update_email(&user.user_id, &id, &req.email)?))
}

/// PUT /api/users/{id}/password — requires the current password.
pub async fn change_password(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> Result<Json<OkResponse>, ApiErr> {
    store.change_password(&user.user_id, &id, &req.current_password, &req.new_password)?;
    Ok(Json(OkResponse { ok: true }))
}

/// DELETE /api/users/{id} — delete the caller's account and everything that cascades from it.
pub async fn delete_user(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiErr> {
    Ok(Json(store.delete_user(&user.user_id, &id)?))
}

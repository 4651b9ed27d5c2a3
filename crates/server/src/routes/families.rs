use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use famshare_api::{
    CreateFamilyRequest, FamilyResponse, ListFamiliesResponse, ListMembersResponse, OkResponse,
};
use famshare_store::Store;

use crate::error::ApiErr;
use crate::extract::ApiJson;
use crate::routes::auth::AuthUser;

// ---------------------------------------------------------------------------
// Families
// ---------------------------------------------------------------------------

/// POST /api/families — create a family. The creator becomes its owner.
pub async fn create_family(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateFamilyRequest>,
) -> Result<(StatusCode, Json<FamilyResponse>), ApiErr> {
    let family = store.create_family(&user.user_id, &req.name)?;
    Ok((StatusCode::CREATED, Json(family)))
}

/// GET /api/families — families the caller belongs to, with the caller's role.
pub async fn list_my_families(
    State(store): State<Arc<Store>>,
    user: AuthUser,
) -> Result<Json<ListFamiliesResponse>, ApiErr> {
    let families = store.list_families_for(&user.user_id)?;
    Ok(Json(ListFamiliesResponse { families }))
}

/// GET /api/families/{id}
pub async fn get_family(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<FamilyResponse>, ApiErr> {
    Ok(Json(store.get_family(&user.user_id, &id)?))
}

/// DELETE /api/families/{id} — owner only.
pub async fn delete_family(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiErr> {
    store.delete_family(&user.user_id, &id)?;
    Ok(Json(OkResponse { ok: true }))
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

/// GET /api/families/{id}/users — owners, then admins, then members.
pub async fn list_members(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(family_id): Path<String>,
) -> Result<Json<ListMembersResponse>, ApiErr> {
    let members = store.list_members(&user.user_id, &family_id)?;
    Ok(Json(ListMembersResponse { members }))
}

/// DELETE /api/families/{id}/users/{user_id}
pub async fn remove_member(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path((family_id, target_id)): Path<(String, String)>,
) -> Result<Json<OkResponse>, ApiErr> {
    store.remove_member(&user.user_id, &target_id, &family_id)?;
    Ok(Json(OkResponse { ok: true }))
}

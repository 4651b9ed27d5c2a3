use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use famshare_api::{
    AcceptInvitationResponse, CreateInviteRequest, InvitationResponse, ListInvitationsResponse,
    OkResponse, Role,
};
use famshare_store::Store;

use crate::error::ApiErr;
use crate::extract::ApiJson;
use crate::routes::auth::AuthUser;

/// POST /api/families/{id}/invite — owner invites a registered user by username.
pub async fn invite_member(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(family_id): Path<String>,
    ApiJson(req): ApiJson<CreateInviteRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>), ApiErr> {
    let invite = store.create_invite(&user.user_id, &family_id, &req.invited_username)?;
    Ok((StatusCode::CREATED, Json(invite)))
}

/// GET /api/families/invitations — pending invitations for the caller.
pub async fn list_invitations(
    State(store): State<Arc<Store>>,
    user: AuthUser,
) -> Result<Json<ListInvitationsResponse>, ApiErr> {
    let invitations = store.list_pending_invites(&user.user_id)?;
    Ok(Json(ListInvitationsResponse { invitations }))
}

/// POST /api/families/{id}/invite/{invite_id}/accept
pub async fn accept_invitation(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path((family_id, invite_id)): Path<(String, String)>,
) -> Result<Json<AcceptInvitationResponse>, ApiErr> {
    let invite = store.accept_invite(&user.user_id, &family_id, &invite_id)?;
    Ok(Json(AcceptInvitationResponse {
        family_id: invite.family_id,
        role: Role::Member,
    }))
}

/// POST /api/families/{id}/invite/{invite_id}/decline
pub async fn decline_invitation(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path((family_id, invite_id)): Path<(String, String)>,
) -> Result<Json<OkResponse>, ApiErr> {
    store.decline_invite(&user.user_id, &family_id, &invite_id)?;
    Ok(Json(OkResponse { ok: true }))
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use famshare_api::{
    CreateItemRequest, ItemResponse, ItemTypesResponse, ListItemsResponse, OkResponse,
    UpdateItemRequest,
};
use famshare_store::Store;

use crate::error::ApiErr;
use crate::extract::ApiJson;
use crate::routes::auth::AuthUser;

/// POST /api/items — add an item to one of the caller's families.
pub async fn create_item(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiErr> {
    let item = store.create_item(&user.user_id, &req.family_id, &req.name, &req.item_type)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/items/{id}
pub async fn get_item(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, ApiErr> {
    Ok(Json(store.get_item(&user.user_id, &id)?))
}

/// PUT /api/items/{id}
pub async fn update_item(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateItemRequest>,
) -> Result<Json<ItemResponse>, ApiErr> {
    let item = store.update_item(&user.user_id, &id, &req.name, &req.item_type, req.is_active)?;
    Ok(Json(item))
}

/// DELETE /api/items/{id} — also drops the item's reservations.
pub async fn delete_item(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiErr> {
    store.delete_item(&user.user_id, &id)?;
    Ok(Json(OkResponse { ok: true }))
}

/// GET /api/items/family/{id}
pub async fn list_family_items(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(family_id): Path<String>,
) -> Result<Json<ListItemsResponse>, ApiErr> {
    let items = store.list_items(&user.user_id, &family_id)?;
    Ok(Json(ListItemsResponse { items }))
}

/// GET /api/items/family/{id}/type/{type}
pub async fn list_family_items_by_type(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path((family_id, item_type)): Path<(String, String)>,
) -> Result<Json<ListItemsResponse>, ApiErr> {
    let items = store.list_items_by_type(&user.user_id, &family_id, &item_type)?;
    Ok(Json(ListItemsResponse { items }))
}

/// GET /api/items/family/{id}/type
pub async fn family_item_types(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(family_id): Path<String>,
) -> Result<Json<ItemTypesResponse>, ApiErr> {
    let types = store.item_types(&user.user_id, &family_id)?;
    Ok(Json(ItemTypesResponse { types }))
}

/// GET /api/items/user/type — item types across all of the caller's families.
pub async fn user_item_types(
    State(store): State<Arc<Store>>,
    user: AuthUser,
) -> Result<Json<ItemTypesResponse>, ApiErr> {
    let types = store.item_types_for_user(&user.user_id)?;
    Ok(Json(ItemTypesResponse { types }))
}

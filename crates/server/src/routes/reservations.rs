use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use famshare_api::service::TimeWindow;
use famshare_api::{
    AvailabilityQuery, AvailabilityResponse, CreateReservationRequest, ListReservationsResponse,
    OkResponse, ReservationResponse, UpdateReservationRequest,
};
use famshare_store::Store;

use crate::error::ApiErr;
use crate::extract::{ApiJson, ApiQuery};
use crate::routes::auth::AuthUser;

/// POST /api/reservations — book an item for `[start_time, end_time)`.
pub async fn create_reservation(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), ApiErr> {
    let window = TimeWindow::from_offsets(req.start_time, req.end_time)?;
    let reservation = store.create_reservation(&user.user_id, &req.item_id, window)?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// GET /api/reservations/{id}
pub async fn get_reservation(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ReservationResponse>, ApiErr> {
    Ok(Json(store.get_reservation(&user.user_id, &id)?))
}

/// PUT /api/reservations/{id} — move to another item and/or window.
pub async fn update_reservation(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateReservationRequest>,
) -> Result<Json<ReservationResponse>, ApiErr> {
    let window = TimeWindow::from_offsets(req.start_time, req.end_time)?;
    let reservation = store.update_reservation(&user.user_id, &id, &req.item_id, window)?;
    Ok(Json(reservation))
}

/// DELETE /api/reservations/{id}
pub async fn delete_reservation(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiErr> {
    store.delete_reservation(&user.user_id, &id)?;
    Ok(Json(OkResponse { ok: true }))
}

/// GET /api/reservations/user — the caller's own bookings.
pub async fn list_my_reservations(
    State(store): State<Arc<Store>>,
    user: AuthUser,
) -> Result<Json<ListReservationsResponse>, ApiErr> {
    let reservations = store.list_my_reservations(&user.user_id)?;
    Ok(Json(ListReservationsResponse { reservations }))
}

/// GET /api/reservations/family/{id}
pub async fn list_family_reservations(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(family_id): Path<String>,
) -> Result<Json<ListReservationsResponse>, ApiErr> {
    let reservations = store.list_family_reservations(&user.user_id, &family_id)?;
    Ok(Json(ListReservationsResponse { reservations }))
}

/// GET /api/reservations/family/{id}/type/{type}
pub async fn list_family_reservations_by_type(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path((family_id, item_type)): Path<(String, String)>,
) -> Result<Json<ListReservationsResponse>, ApiErr> {
    let reservations =
        store.list_family_reservations_by_type(&user.user_id, &family_id, &item_type)?;
    Ok(Json(ListReservationsResponse { reservations }))
}

/// GET /api/reservations/item/{id}
pub async fn list_item_reservations(
    State(store): State<Arc<Store>>,
    user: AuthUser,
    Path(item_id): Path<String>,
) -> Result<Json<ListReservationsResponse>, ApiErr> {
    let reservations = store.list_item_reservations(&user.user_id, &item_id)?;
    Ok(Json(ListReservationsResponse { reservations }))
}

/// GET /api/reservations/item/{id}/availability?start=..&end=..
pub async fn check_availability(
    State(store): State<Arc<Store>>,
    _user: AuthUser,
    Path(item_id): Path<String>,
    ApiQuery(q): ApiQuery<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ApiErr> {
    let window = TimeWindow::from_offsets(q.start, q.end)?;
    let available = store.check_availability(&item_id, window)?;
    Ok(Json(AvailabilityResponse { item_id, available }))
}

//! Reservation engine: conflict-free bookings of catalog items.
//!
//! The overlap check and the write that follows it always share one
//! immediate transaction, so two bookings of the same item can never both
//! see a free window.

use famshare_api::db::{reservations, Built};
use famshare_api::service::{self, TimeWindow};
use famshare_api::{ReservationResponse, ServiceError};
use rusqlite::{Connection, Row};

use crate::catalog::find_item;
use crate::membership::{require_member, role_in};
use crate::{new_id, sql, Store};

fn reservation_from_row(row: &Row<'_>) -> rusqlite::Result<ReservationResponse> {
    Ok(ReservationResponse {
        id: row.get(0)?,
        item_id: row.get(1)?,
        item_name: row.get(2)?,
        family_id: row.get(3)?,
        user_id: row.get(4)?,
        start_time: sql::instant_at(row, 5)?,
        end_time: sql::instant_at(row, 6)?,
        created_at: row.get(7)?,
    })
}

fn find_reservation(
    conn: &Connection,
    reservation_id: &str,
) -> Result<Option<ReservationResponse>, ServiceError> {
    sql::query_opt(
        conn,
        reservations::get_by_id(reservation_id),
        "get reservation",
        reservation_from_row,
    )
}

fn list(
    conn: &Connection,
    built: Built,
    context: &str,
) -> Result<Vec<ReservationResponse>, ServiceError> {
    sql::query_all(conn, built, context, reservation_from_row)
}

fn overlaps_existing(
    conn: &Connection,
    item_id: &str,
    window: &TimeWindow,
    except_id: Option<&str>,
) -> Result<bool, ServiceError> {
    let overlapping = reservations::count_overlapping(
        item_id,
        window.start_millis(),
        window.end_millis(),
        except_id,
    );
    let n = sql::count(conn, overlapping, "overlap check")?;
    Ok(n > 0)
}

/// The reservation, if the actor booked it or manages its family.
fn manageable(
    conn: &Connection,
    actor_id: &str,
    reservation_id: &str,
) -> Result<ReservationResponse, ServiceError> {
    let existing = find_reservation(conn, reservation_id)?
        .ok_or_else(|| ServiceError::NotFound("reservation not found".into()))?;
    let role = role_in(conn, &existing.family_id, actor_id)?;
    if !service::can_manage_reservation(actor_id, &existing.user_id, role) {
        return Err(ServiceError::Forbidden(
            "only the booker or a family admin can change this reservation".into(),
        ));
    }
    Ok(existing)
}

impl Store {
    /// Book `item_id` for `window` on behalf of `actor_id`.
    pub fn create_reservation(
        &self,
        actor_id: &str,
        item_id: &str,
        window: TimeWindow,
    ) -> Result<ReservationResponse, ServiceError> {
        let reservation = self.write("create reservation", |tx| {
            let item = find_item(tx, item_id)?
                .ok_or_else(|| ServiceError::NotFound("item not found".into()))?;
            require_member(tx, &item.family_id, actor_id)?;
            if overlaps_existing(tx, item_id, &window, None)? {
                return Err(ServiceError::Conflict(
                    "item is already reserved for this time".into(),
                ));
            }
            let id = new_id();
            sql::execute(
                tx,
                reservations::insert(
                    &id,
                    item_id,
                    &item.family_id,
                    actor_id,
                    window.start_millis(),
                    window.end_millis(),
                ),
                "insert reservation",
            )?;
            find_reservation(tx, &id)?
                .ok_or_else(|| ServiceError::Internal("reservation vanished after insert".into()))
        })?;
        tracing::info!(
            reservation_id = %reservation.id,
            item_id,
            user_id = actor_id,
            start = %reservation.start_time,
            end = %reservation.end_time,
            "reservation created"
        );
        Ok(reservation)
    }

    /// Move a reservation to another item of the same family and/or another
    /// window. The booker stays the same.
    pub fn update_reservation(
        &self,
        actor_id: &str,
        reservation_id: &str,
        new_item_id: &str,
        window: TimeWindow,
    ) -> Result<ReservationResponse, ServiceError> {
        let reservation = self.write("update reservation", |tx| {
            let existing = manageable(tx, actor_id, reservation_id)?;
            let item = find_item(tx, new_item_id)?
                .ok_or_else(|| ServiceError::NotFound("item not found".into()))?;
            if item.family_id != existing.family_id {
                return Err(ServiceError::Forbidden(
                    "item belongs to a different family".into(),
                ));
            }
            if overlaps_existing(tx, new_item_id, &window, Some(reservation_id))? {
                return Err(ServiceError::Conflict(
                    "item is already reserved for this time".into(),
                ));
            }
            sql::execute(
                tx,
                reservations::update(
                    reservation_id,
                    new_item_id,
                    window.start_millis(),
                    window.end_millis(),
                ),
                "update reservation",
            )?;
            find_reservation(tx, reservation_id)?
                .ok_or_else(|| ServiceError::NotFound("reservation not found".into()))
        })?;
        tracing::info!(reservation_id, actor_id, item_id = new_item_id, "reservation updated");
        Ok(reservation)
    }

    pub fn delete_reservation(
        &self,
        actor_id: &str,
        reservation_id: &str,
    ) -> Result<(), ServiceError> {
        self.write("delete reservation", |tx| {
            manageable(tx, actor_id, reservation_id)?;
            sql::execute(tx, reservations::delete(reservation_id), "delete reservation")?;
            Ok(())
        })?;
        tracing::info!(reservation_id, actor_id, "reservation deleted");
        Ok(())
    }

    /// Whether `window` is free on `item_id`. Read-only.
    pub fn check_availability(
        &self,
        item_id: &str,
        window: TimeWindow,
    ) -> Result<bool, ServiceError> {
        self.read(|conn| {
            find_item(conn, item_id)?
                .ok_or_else(|| ServiceError::NotFound("item not found".into()))?;
            Ok(!overlaps_existing(conn, item_id, &window, None)?)
        })
    }

    /// A single reservation, visible to its booker and to family members.
    pub fn get_reservation(
        &self,
        actor_id: &str,
        reservation_id: &str,
    ) -> Result<ReservationResponse, ServiceError> {
        self.read(|conn| {
            let reservation = find_reservation(conn, reservation_id)?
                .ok_or_else(|| ServiceError::NotFound("reservation not found".into()))?;
            if reservation.user_id != actor_id {
                require_member(conn, &reservation.family_id, actor_id)?;
            }
            Ok(reservation)
        })
    }

    pub fn list_family_reservations(
        &self,
        actor_id: &str,
        family_id: &str,
    ) -> Result<Vec<ReservationResponse>, ServiceError> {
        self.read(|conn| {
            require_member(conn, family_id, actor_id)?;
            list(conn, reservations::list_by_family(family_id), "list family reservations")
        })
    }

    /// Reservations of a family on items whose type matches `raw_type` once normalized.
    pub fn list_family_reservations_by_type(
        &self,
        actor_id: &str,
        family_id: &str,
        raw_type: &str,
    ) -> Result<Vec<ReservationResponse>, ServiceError> {
        let item_type = service::normalize_item_type(raw_type);
        self.read(|conn| {
            require_member(conn, family_id, actor_id)?;
            list(
                conn,
                reservations::list_by_family_type(family_id, &item_type),
                "list family reservations by type",
            )
        })
    }

    pub fn list_item_reservations(
        &self,
        actor_id: &str,
        item_id: &str,
    ) -> Result<Vec<ReservationResponse>, ServiceError> {
        self.read(|conn| {
            let item = find_item(conn, item_id)?
                .ok_or_else(|| ServiceError::NotFound("item not found".into()))?;
            require_member(conn, &item.family_id, actor_id)?;
            list(conn, reservations::list_by_item(item_id), "list item reservations")
        })
    }

    /// Everything the user has booked, by start time.
    pub fn list_my_reservations(
        &self,
        user_id: &str,
    ) -> Result<Vec<ReservationResponse>, ServiceError> {
        self.read(|conn| list(conn, reservations::list_by_user(user_id), "list user reservations"))
    }
}

//! Reservation query builders, including the overlap query.

use sea_query::{Alias, Asterisk, Expr, Func, Order, Query, SqliteQueryBuilder};

use super::Built;
use super::tables::{Items, Reservations};

/// Column order shared by every reservation SELECT:
/// id, item_id, item_name, family_id, user_id, start_at, end_at, created_at.
fn reservation_select() -> sea_query::SelectStatement {
    Query::select()
        .column((Reservations::Table, Reservations::Id))
        .column((Reservations::Table, Reservations::ItemId))
        .expr_as(Expr::col((Items::Table, Items::Name)), Alias::new("item_name"))
        .column((Reservations::Table, Reservations::FamilyId))
        .column((Reservations::Table, Reservations::UserId))
        .column((Reservations::Table, Reservations::StartAt))
        .column((Reservations::Table, Reservations::EndAt))
        .column((Reservations::Table, Reservations::CreatedAt))
        .from(Reservations::Table)
        .inner_join(
            Items::Table,
            Expr::col((Items::Table, Items::Id))
                .equals((Reservations::Table, Reservations::ItemId)),
        )
        .to_owned()
}

/// INSERT a reservation. Millisecond instants; the table enforces `start < end`.
pub fn insert(
    id: &str,
    item_id: &str,
    family_id: &str,
    user_id: &str,
    start_ms: i64,
    end_ms: i64,
) -> Built {
    Query::insert()
        .into_table(Reservations::Table)
        .columns([
            Reservations::Id,
            Reservations::ItemId,
            Reservations::FamilyId,
            Reservations::UserId,
            Reservations::StartAt,
            Reservations::EndAt,
        ])
        .values_panic([
            id.into(),
            item_id.into(),
            family_id.into(),
            user_id.into(),
            start_ms.into(),
            end_ms.into(),
        ])
        .build(SqliteQueryBuilder)
}

/// SELECT a single reservation by id.
pub fn get_by_id(id: &str) -> Built {
    reservation_select()
        .and_where(Expr::col((Reservations::Table, Reservations::Id)).eq(id))
        .build(SqliteQueryBuilder)
}

/// Reservations of a family, by start time.
pub fn list_by_family(family_id: &str) -> Built {
    reservation_select()
        .and_where(Expr::col((Reservations::Table, Reservations::FamilyId)).eq(family_id))
        .order_by((Reservations::Table, Reservations::StartAt), Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Reservations of a family on items of one (normalized) type, by start time.
pub fn list_by_family_type(family_id: &str, item_type: &str) -> Built {
    reservation_select()
        .and_where(Expr::col((Reservations::Table, Reservations::FamilyId)).eq(family_id))
        .and_where(Expr::col((Items::Table, Items::ItemType)).eq(item_type))
        .order_by((Reservations::Table, Reservations::StartAt), Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Reservations of one item, by start time.
pub fn list_by_item(item_id: &str) -> Built {
    reservation_select()
        .and_where(Expr::col((Reservations::Table, Reservations::ItemId)).eq(item_id))
        .order_by((Reservations::Table, Reservations::StartAt), Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Reservations booked by one user, by start time.
pub fn list_by_user(user_id: &str) -> Built {
    reservation_select()
        .and_where(Expr::col((Reservations::Table, Reservations::UserId)).eq(user_id))
        .order_by((Reservations::Table, Reservations::StartAt), Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Count reservations of `item_id` overlapping `[start_ms, end_ms)`,
/// optionally ignoring one reservation (the one being moved).
pub fn count_overlapping(
    item_id: &str,
    start_ms: i64,
    end_ms: i64,
    except_id: Option<&str>,
) -> Built {
    let mut q = Query::select()
        .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
        .from(Reservations::Table)
        .and_where(Expr::col(Reservations::ItemId).eq(item_id))
        .and_where(Expr::col(Reservations::StartAt).lt(end_ms))
        .and_where(Expr::col(Reservations::EndAt).gt(start_ms))
        .to_owned();
    if let Some(id) = except_id {
        q.and_where(Expr::col(Reservations::Id).ne(id));
    }
    q.build(SqliteQueryBuilder)
}

/// Move a reservation to another item and/or window.
pub fn update(id: &str, item_id: &str, start_ms: i64, end_ms: i64) -> Built {
    Query::update()
        .table(Reservations::Table)
        .value(Reservations::ItemId, item_id)
        .value(Reservations::StartAt, start_ms)
        .value(Reservations::EndAt, end_ms)
        .and_where(Expr::col(Reservations::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// DELETE a reservation.
pub fn delete(id: &str) -> Built {
    Query::delete()
        .from_table(Reservations::Table)
        .and_where(Expr::col(Reservations::Id).eq(id))
        .build(SqliteQueryBuilder)
}

//! Item (resource catalog) query builders.

use sea_query::{Expr, Order, Query, SqliteQueryBuilder};

use super::Built;
use super::tables::{FamilyMembers, Items};

/// Column order: id, family_id, name, item_type, is_active, created_at.
fn item_columns(q: &mut sea_query::SelectStatement) -> &mut sea_query::SelectStatement {
    q.columns([
        Items::Id,
        Items::FamilyId,
        Items::Name,
        Items::ItemType,
        Items::IsActive,
        Items::CreatedAt,
    ])
}

/// INSERT a new (active) item. `item_type` must already be normalized.
pub fn insert(id: &str, family_id: &str, name: &str, item_type: &str) -> Built {
    Query::insert()
        .into_table(Items::Table)
        .columns([
            Items::Id,
            Items::FamilyId,
            Items::Name,
            Items::ItemType,
            Items::IsActive,
        ])
        .values_panic([
            id.into(),
            family_id.into(),
            name.into(),
            item_type.into(),
            true.into(),
        ])
        .build(SqliteQueryBuilder)
}

/// SELECT a single item by id.
pub fn get_by_id(id: &str) -> Built {
    let mut q = Query::select().to_owned();
    item_columns(&mut q);
    q.from(Items::Table)
        .and_where(Expr::col(Items::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// Items of a family, grouped by type then name.
pub fn list_by_family(family_id: &str) -> Built {
    let mut q = Query::select().to_owned();
    item_columns(&mut q);
    q.from(Items::Table)
        .and_where(Expr::col(Items::FamilyId).eq(family_id))
        .order_by(Items::ItemType, Order::Asc)
        .order_by(Items::Name, Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Items of a family with an exact (normalized) type.
pub fn list_by_family_type(family_id: &str, item_type: &str) -> Built {
    let mut q = Query::select().to_owned();
    item_columns(&mut q);
    q.from(Items::Table)
        .and_where(Expr::col(Items::FamilyId).eq(family_id))
        .and_where(Expr::col(Items::ItemType).eq(item_type))
        .order_by(Items::Name, Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Distinct item types of a family, ascending.
pub fn types_by_family(family_id: &str) -> Built {
    Query::select()
        .distinct()
        .column(Items::ItemType)
        .from(Items::Table)
        .and_where(Expr::col(Items::FamilyId).eq(family_id))
        .order_by(Items::ItemType, Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Distinct item types across every family the user belongs to, ascending.
pub fn types_for_user(user_id: &str) -> Built {
    Query::select()
        .distinct()
        .column(Items::ItemType)
        .from(Items::Table)
        .and_where(
            Expr::col(Items::FamilyId).in_subquery(
                Query::select()
                    .column(FamilyMembers::FamilyId)
                    .from(FamilyMembers::Table)
                    .and_where(Expr::col(FamilyMembers::UserId).eq(user_id))
                    .to_owned(),
            ),
        )
        .order_by(Items::ItemType, Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Update name, type and active flag of an item.
pub fn update(id: &str, name: &str, item_type: &str, is_active: bool) -> Built {
    Query::update()
        .table(Items::Table)
        .value(Items::Name, name)
        .value(Items::ItemType, item_type)
        .value(Items::IsActive, is_active)
        .and_where(Expr::col(Items::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// DELETE an item; its reservations cascade.
pub fn delete(id: &str) -> Built {
    Query::delete()
        .from_table(Items::Table)
        .and_where(Expr::col(Items::Id).eq(id))
        .build(SqliteQueryBuilder)
}

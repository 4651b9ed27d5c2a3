//! Family + membership query builders.

use sea_query::{Expr, Order, Query, SqliteQueryBuilder};

use super::Built;
use super::tables::{Families, FamilyMembers, Users};

// ── Family queries ─────────────────────────────────────────────────────────

/// INSERT a new family.
pub fn insert(id: &str, name: &str) -> Built {
    Query::insert()
        .into_table(Families::Table)
        .columns([Families::Id, Families::Name])
        .values_panic([id.into(), name.into()])
        .build(SqliteQueryBuilder)
}

/// SELECT id, name, created_at of a single family.
pub fn get_by_id(id: &str) -> Built {
    Query::select()
        .columns([Families::Id, Families::Name, Families::CreatedAt])
        .from(Families::Table)
        .and_where(Expr::col(Families::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// Families a user belongs to: id, name, role, in join order.
pub fn list_for_user(user_id: &str) -> Built {
    Query::select()
        .column((Families::Table, Families::Id))
        .column((Families::Table, Families::Name))
        .column((FamilyMembers::Table, FamilyMembers::Role))
        .from(Families::Table)
        .inner_join(
            FamilyMembers::Table,
            Expr::col((FamilyMembers::Table, FamilyMembers::FamilyId))
                .equals((Families::Table, Families::Id)),
        )
        .and_where(Expr::col((FamilyMembers::Table, FamilyMembers::UserId)).eq(user_id))
        .order_by((FamilyMembers::Table, FamilyMembers::JoinedAt), Order::Asc)
        .order_by_expr(Expr::cust("\"family_members\".rowid"), Order::Asc)
        .build(SqliteQueryBuilder)
}

/// DELETE a family; foreign keys cascade everything it owns.
pub fn delete(id: &str) -> Built {
    Query::delete()
        .from_table(Families::Table)
        .and_where(Expr::col(Families::Id).eq(id))
        .build(SqliteQueryBuilder)
}

// ── Member queries ─────────────────────────────────────────────────────────

/// INSERT a membership row.
pub fn member_insert(family_id: &str, user_id: &str, role: &str) -> Built {
    Query::insert()
        .into_table(FamilyMembers::Table)
        .columns([
            FamilyMembers::FamilyId,
            FamilyMembers::UserId,
            FamilyMembers::Role,
        ])
        .values_panic([family_id.into(), user_id.into(), role.into()])
        .build(SqliteQueryBuilder)
}

/// DELETE a membership row.
pub fn member_delete(family_id: &str, user_id: &str) -> Built {
    Query::delete()
        .from_table(FamilyMembers::Table)
        .and_where(Expr::col(FamilyMembers::FamilyId).eq(family_id))
        .and_where(Expr::col(FamilyMembers::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Get a member's role.
pub fn member_role(family_id: &str, user_id: &str) -> Built {
    Query::select()
        .column(FamilyMembers::Role)
        .from(FamilyMembers::Table)
        .and_where(Expr::col(FamilyMembers::FamilyId).eq(family_id))
        .and_where(Expr::col(FamilyMembers::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Members of a family joined with users:
/// user_id, username, email, role, joined_at, in join order.
pub fn member_list(family_id: &str) -> Built {
    Query::select()
        .column((FamilyMembers::Table, FamilyMembers::UserId))
        .column((Users::Table, Users::Username))
        .column((Users::Table, Users::Email))
        .column((FamilyMembers::Table, FamilyMembers::Role))
        .column((FamilyMembers::Table, FamilyMembers::JoinedAt))
        .from(FamilyMembers::Table)
        .inner_join(
            Users::Table,
            Expr::col((Users::Table, Users::Id))
                .equals((FamilyMembers::Table, FamilyMembers::UserId)),
        )
        .and_where(Expr::col((FamilyMembers::Table, FamilyMembers::FamilyId)).eq(family_id))
        .order_by((FamilyMembers::Table, FamilyMembers::JoinedAt), Order::Asc)
        .order_by_expr(Expr::cust("\"family_members\".rowid"), Order::Asc)
        .build(SqliteQueryBuilder)
}

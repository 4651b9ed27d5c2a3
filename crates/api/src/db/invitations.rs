//! Invitation query builders.

use sea_query::{Alias, Asterisk, Expr, Func, Query, SqliteQueryBuilder};

use super::Built;
use super::tables::FamilyInvitations;

/// INSERT a new pending invitation.
pub fn insert(id: &str, family_id: &str, invited_user_id: &str, inviter_user_id: &str) -> Built {
    Query::insert()
        .into_table(FamilyInvitations::Table)
        .columns([
            FamilyInvitations::Id,
            FamilyInvitations::FamilyId,
            FamilyInvitations::InvitedUserId,
            FamilyInvitations::InviterUserId,
        ])
        .values_panic([
            id.into(),
            family_id.into(),
            invited_user_id.into(),
            inviter_user_id.into(),
        ])
        .build(SqliteQueryBuilder)
}

/// Column order shared by the lookups below:
/// id, family_id, invited_user_id, inviter_user_id, accepted, responded,
/// created_at, responded_at.
fn invitation_columns(q: &mut sea_query::SelectStatement) -> &mut sea_query::SelectStatement {
    q.columns([
        FamilyInvitations::Id,
        FamilyInvitations::FamilyId,
        FamilyInvitations::InvitedUserId,
        FamilyInvitations::InviterUserId,
        FamilyInvitations::Accepted,
        FamilyInvitations::Responded,
        FamilyInvitations::CreatedAt,
        FamilyInvitations::RespondedAt,
    ])
}

/// Lookup an invitation by id.
pub fn get_by_id(id: &str) -> Built {
    let mut q = Query::select().to_owned();
    invitation_columns(&mut q);
    q.from(FamilyInvitations::Table)
        .and_where(Expr::col(FamilyInvitations::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// Lookup an invitation by id, scoped to the family and the invited user.
pub fn lookup_for_user(id: &str, family_id: &str, invited_user_id: &str) -> Built {
    let mut q = Query::select().to_owned();
    invitation_columns(&mut q);
    q.from(FamilyInvitations::Table)
        .and_where(Expr::col(FamilyInvitations::Id).eq(id))
        .and_where(Expr::col(FamilyInvitations::FamilyId).eq(family_id))
        .and_where(Expr::col(FamilyInvitations::InvitedUserId).eq(invited_user_id))
        .build(SqliteQueryBuilder)
}

/// Count unresponded invitations for a (family, invited user) pair.
pub fn pending_count(family_id: &str, invited_user_id: &str) -> Built {
    Query::select()
        .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
        .from(FamilyInvitations::Table)
        .and_where(Expr::col(FamilyInvitations::FamilyId).eq(family_id))
        .and_where(Expr::col(FamilyInvitations::InvitedUserId).eq(invited_user_id))
        .and_where(Expr::col(FamilyInvitations::Responded).eq(false))
        .build(SqliteQueryBuilder)
}

/// Record a response. Only touches rows that are still unresponded, so the
/// affected-row count tells the caller whether the transition happened.
pub fn respond(id: &str, accepted: bool, responded_at: &str) -> Built {
    Query::update()
        .table(FamilyInvitations::Table)
        .value(FamilyInvitations::Responded, true)
        .value(FamilyInvitations::Accepted, accepted)
        .value(FamilyInvitations::RespondedAt, responded_at)
        .and_where(Expr::col(FamilyInvitations::Id).eq(id))
        .and_where(Expr::col(FamilyInvitations::Responded).eq(false))
        .build(SqliteQueryBuilder)
}

/// Pending invitations addressed to a user, joined for display:
/// id, family_id, family_name, inviter_username, created_at, oldest first.
pub fn list_pending_for_user(user_id: &str) -> Built {
    // Two joins plus aliases read better as raw SQL
    let sql = concat!(
        "SELECT i.\"id\", i.\"family_id\", f.\"name\" AS \"family_name\", ",
        "u.\"username\" AS \"inviter_username\", i.\"created_at\" ",
        "FROM \"family_invitations\" i ",
        "INNER JOIN \"families\" f ON f.\"id\" = i.\"family_id\" ",
        "INNER JOIN \"users\" u ON u.\"id\" = i.\"inviter_user_id\" ",
        "WHERE i.\"invited_user_id\" = ? AND i.\"responded\" = 0 ",
        "ORDER BY i.\"created_at\" ASC, i.rowid ASC",
    )
    .to_string();
    let values = sea_query::Values(vec![user_id.into()]);
    (sql, values)
}

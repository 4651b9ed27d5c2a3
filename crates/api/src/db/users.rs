//! User / credential query builders.

use sea_query::{Alias, Asterisk, Expr, Func, Query, SqliteQueryBuilder};

use super::Built;
use super::tables::Users;

// ── User lookups ───────────────────────────────────────────────────────────

/// Public columns in order: id, username, email, created_at.
fn public_columns(q: &mut sea_query::SelectStatement) -> &mut sea_query::SelectStatement {
    q.columns([Users::Id, Users::Username, Users::Email, Users::CreatedAt])
}

/// Find user by id (public columns).
pub fn get_by_id(user_id: &str) -> Built {
    let mut q = Query::select().to_owned();
    public_columns(&mut q);
    q.from(Users::Table)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Find user by username (public columns).
pub fn get_by_username(username: &str) -> Built {
    let mut q = Query::select().to_owned();
    public_columns(&mut q);
    q.from(Users::Table)
        .and_where(Expr::col(Users::Username).eq(username))
        .build(SqliteQueryBuilder)
}

/// Credentials by username: id, username, password_hash, password_salt.
pub fn credentials_by_username(username: &str) -> Built {
    Query::select()
        .columns([
            Users::Id,
            Users::Username,
            Users::PasswordHash,
            Users::PasswordSalt,
        ])
        .from(Users::Table)
        .and_where(Expr::col(Users::Username).eq(username))
        .build(SqliteQueryBuilder)
}

/// Credentials by id: id, username, password_hash, password_salt.
pub fn credentials_by_id(user_id: &str) -> Built {
    Query::select()
        .columns([
            Users::Id,
            Users::Username,
            Users::PasswordHash,
            Users::PasswordSalt,
        ])
        .from(Users::Table)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Count users holding `username`, optionally ignoring one user id.
pub fn username_taken(username: &str, except_id: Option<&str>) -> Built {
    let mut q = Query::select()
        .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
        .from(Users::Table)
        .and_where(Expr::col(Users::Username).eq(username))
        .to_owned();
    if let Some(id) = except_id {
        q.and_where(Expr::col(Users::Id).ne(id));
    }
    q.build(SqliteQueryBuilder)
}

/// Count users holding `email`, optionally ignoring one user id.
pub fn email_taken(email: &str, except_id: Option<&str>) -> Built {
    let mut q = Query::select()
        .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
        .from(Users::Table)
        .and_where(Expr::col(Users::Email).eq(email))
        .to_owned();
    if let Some(id) = except_id {
        q.and_where(Expr::col(Users::Id).ne(id));
    }
    q.build(SqliteQueryBuilder)
}

// ── User writes ────────────────────────────────────────────────────────────

/// INSERT a new user.
pub fn insert(
    id: &str,
    username: &str,
    email: &str,
    password_hash: &str,
    password_salt: &str,
) -> Built {
    Query::insert()
        .into_table(Users::Table)
        .columns([
            Users::Id,
            Users::Username,
            Users::Email,
            Users::PasswordHash,
            Users::PasswordSalt,
        ])
        .values_panic([
            id.into(),
            username.into(),
            email.into(),
            password_hash.into(),
            password_salt.into(),
        ])
        .build(SqliteQueryBuilder)
}

/// Update a user's username.
pub fn update_username(id: &str, username: &str) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::Username, username)
        .and_where(Expr::col(Users::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// Update a user's email.
pub fn update_email(id: &str, email: &str) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::Email, email)
        .and_where(Expr::col(Users::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// Replace a user's password hash and salt.
pub fn update_password(id: &str, password_hash: &str, password_salt: &str) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::PasswordHash, password_hash)
        .value(Users::PasswordSalt, password_salt)
        .and_where(Expr::col(Users::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// DELETE a user; foreign keys cascade memberships, invitations and reservations.
pub fn delete(id: &str) -> Built {
    Query::delete()
        .from_table(Users::Table)
        .and_where(Expr::col(Users::Id).eq(id))
        .build(SqliteQueryBuilder)
}

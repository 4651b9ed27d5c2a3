//! Accounts: signup, login, and self-service profile changes.

use famshare_api::db::users;
use famshare_api::{crypto, service, ServiceError, UserResponse};
use rusqlite::{Connection, Row};

use crate::{new_id, sql, Store};

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserResponse> {
    Ok(UserResponse {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
    })
}

struct Credentials {
    id: String,
    hash: String,
    salt: String,
}

fn credentials_from_row(row: &Row<'_>) -> rusqlite::Result<Credentials> {
    Ok(Credentials {
        id: row.get(0)?,
        hash: row.get(2)?,
        salt: row.get(3)?,
    })
}

pub(crate) fn find_by_id(
    conn: &Connection,
    id: &str,
) -> Result<Option<UserResponse>, ServiceError> {
    sql::query_opt(conn, users::get_by_id(id), "get user", user_from_row)
}

fn require_user(conn: &Connection, id: &str) -> Result<UserResponse, ServiceError> {
    find_by_id(conn, id)?.ok_or_else(|| ServiceError::NotFound("user not found".into()))
}

pub(crate) fn find_by_username(
    conn: &Connection,
    username: &str,
) -> Result<Option<UserResponse>, ServiceError> {
    sql::query_opt(
        conn,
        users::get_by_username(username),
        "get user by username",
        user_from_row,
    )
}

fn require_self(actor_id: &str, user_id: &str) -> Result<(), ServiceError> {
    if actor_id != user_id {
        return Err(ServiceError::Forbidden(
            "you can only manage your own account".into(),
        ));
    }
    Ok(())
}

impl Store {
    /// Register a new account. Username and email must both be unused.
    pub fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserResponse, ServiceError> {
        let username = service::validate_username(username)?;
        let email = service::validate_email(email)?;
        service::validate_password(password)?;
        // Hash before taking the lock; PBKDF2 is deliberately slow.
        let (hash, salt) = crypto::hash_password(password)?;

        let user = self.write("signup", |tx| {
            if sql::count(tx, users::username_taken(&username, None), "check username")? > 0 {
                return Err(ServiceError::Conflict("username is taken".into()));
            }
            if sql::count(tx, users::email_taken(&email, None), "check email")? > 0 {
                return Err(ServiceError::Conflict("email is taken".into()));
            }
            let id = new_id();
            sql::execute_unique(
                tx,
                users::insert(&id, &username, &email, &hash, &salt),
                "insert user",
                "username or email is taken",
            )?;
            find_by_id(tx, &id)?
                .ok_or_else(|| ServiceError::Internal("user vanished after insert".into()))
        })?;

        tracing::info!(user_id = %user.id, "account created");
        Ok(user)
    }

    /// Check a username/password pair.
    pub fn login(&self, username: &str, password: &str) -> Result<UserResponse, ServiceError> {
        let username = username.trim();
        let creds = self
            .read(|conn| {
                sql::query_opt(
                    conn,
                    users::credentials_by_username(username),
                    "login lookup",
                    credentials_from_row,
                )
            })?
            .ok_or_else(|| ServiceError::NotFound("username not found".into()))?;

        if !crypto::verify_password(password, &creds.hash, &creds.salt) {
            return Err(ServiceError::Unauthorized("incorrect password".into()));
        }

        self.read(|conn| find_by_id(conn, &creds.id))?
            .ok_or_else(|| ServiceError::NotFound("username not found".into()))
    }

    /// Resolve a user id without any authorization; used by identity resolution.
    pub fn find_user(&self, user_id: &str) -> Result<Option<UserResponse>, ServiceError> {
        self.read(|conn| find_by_id(conn, user_id))
    }

    /// Read one's own account.
    pub fn get_user(&self, actor_id: &str, user_id: &str) -> Result<UserResponse, ServiceError> {
        require_self(actor_id, user_id)?;
        self.read(|conn| require_user(conn, user_id))
    }

    pub fn update_username(
        &self,
        actor_id: &str,
        user_id: &str,
        username: &str,
    ) -> Result<UserResponse, ServiceError> {
        require_self(actor_id, user_id)?;
        let username = service::validate_username(username)?;
        self.write("update username", |tx| {
            require_user(tx, user_id)?;
            let taken = users::username_taken(&username, Some(user_id));
            if sql::count(tx, taken, "check username")? > 0 {
                return Err(ServiceError::Conflict("username is taken".into()));
            }
            sql::execute_unique(
                tx,
                users::update_username(user_id, &username),
                "update username",
                "username is taken",
            )?;
            require_user(tx, user_id)
        })
    }

    pub fn update_email(
        &self,
        actor_id: &str,
        user_id: &str,
        email: &str,
    ) -> Result<UserResponse, ServiceError> {
        require_self(actor_id, user_id)?;
        let email = service::validate_email(email)?;
        self.write("update email", |tx| {
            require_user(tx, user_id)?;
            if sql::count(tx, users::email_taken(&email, Some(user_id)), "check email")? > 0 {
                return Err(ServiceError::Conflict("email is already in use".into()));
            }
            sql::execute_unique(
                tx,
                users::update_email(user_id, &email),
                "update email",
                "email is already in use",
            )?;
            require_user(tx, user_id)
        })
    }

    /// Replace the password after checking the current one.
    pub fn change_password(
        &self,
        actor_id: &str,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        require_self(actor_id, user_id)?;
        service::validate_password(new_password)?;

        let creds = self
            .read(|conn| {
                sql::query_opt(
                    conn,
                    users::credentials_by_id(user_id),
                    "password lookup",
                    credentials_from_row,
                )
            })?
            .ok_or_else(|| ServiceError::NotFound("user not found".into()))?;
        if !crypto::verify_password(current_password, &creds.hash, &creds.salt) {
            return Err(ServiceError::Forbidden("current password is incorrect".into()));
        }

        let (hash, salt) = crypto::hash_password(new_password)?;
        self.write("change password", |tx| {
            sql::execute(tx, users::update_password(user_id, &hash, &salt), "update password")?;
            Ok(())
        })
    }

    /// Delete one's own account. Memberships, invitations and reservations cascade.
    pub fn delete_user(&self, actor_id: &str, user_id: &str) -> Result<UserResponse, ServiceError> {
        require_self(actor_id, user_id)?;
        let user = self.write("delete user", |tx| {
            let user = require_user(tx, user_id)?;
            sql::execute(tx, users::delete(user_id), "delete user")?;
            Ok(user)
        })?;
        tracing::info!(user_id = %user.id, "account deleted");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use famshare_api::db::invitations;
    use famshare_api::service::TimeWindow;
    use famshare_api::{Role, ServiceError};

    use crate::sql;
    use crate::testing::{add_family, add_user, join, test_store};

    #[test]
    fn test_signup_and_login() {
        let store = test_store();
        let user = store.signup(" alice ", "Alice@Example.com", "password1").unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");

        let logged_in = store.login("alice", "password1").unwrap();
        assert_eq!(logged_in.id, user.id);

        assert!(matches!(
            store.login("alice", "password2"),
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            store.login("bob", "password1"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_signup_conflicts() {
        let store = test_store();
        store.signup("alice", "alice@example.com", "password1").unwrap();
        assert_eq!(
            store.signup("alice", "other@example.com", "password1").unwrap_err(),
            ServiceError::Conflict("username is taken".into())
        );
        assert_eq!(
            store.signup("alice2", "ALICE@example.com", "password1").unwrap_err(),
            ServiceError::Conflict("email is taken".into())
        );
        assert!(matches!(
            store.signup("al", "al@example.com", "password1"),
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[test]
    fn test_profile_changes_are_self_only() {
        let store = test_store();
        let alice = add_user(&store, "alice");
        let bob = add_user(&store, "bob");

        assert!(matches!(
            store.get_user(&bob, &alice),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            store.update_username(&alice, &alice, "bob"),
            Err(ServiceError::Conflict(_))
        ));
        let renamed = store.update_username(&alice, &alice, "alicia").unwrap();
        assert_eq!(renamed.username, "alicia");

        assert!(matches!(
            store.update_email(&alice, &alice, "bob@example.com"),
            Err(ServiceError::Conflict(_))
        ));
        let moved = store.update_email(&alice, &alice, "alicia@example.com").unwrap();
        assert_eq!(moved.email, "alicia@example.com");
    }

    #[test]
    fn test_change_password() {
        let store = test_store();
        let user = store.signup("carol", "carol@example.com", "password1").unwrap();
        assert!(matches!(
            store.change_password(&user.id, &user.id, "wrong-pass", "password2"),
            Err(ServiceError::Forbidden(_))
        ));
        store
            .change_password(&user.id, &user.id, "password1", "password2")
            .unwrap();
        assert!(store.login("carol", "password2").is_ok());
        assert!(store.login("carol", "password1").is_err());
    }

    #[test]
    fn test_delete_user() {
        let store = test_store();
        let alice = add_user(&store, "alice");
        let bob = add_user(&store, "bob");
        let carol = add_user(&store, "carol");
        assert!(matches!(store.delete_user(&bob, &alice), Err(ServiceError::Forbidden(_))));

        // bob is a member of alice's family and has booked its tent.
        let smiths = add_family(&store, &alice, "Smiths");
        join(&store, &smiths, &bob, Role::Member);
        let tent = store.create_item(&alice, &smiths, "Tent", "Camping").unwrap();
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let booking = TimeWindow::new(start, start + Duration::hours(2)).unwrap();
        store.create_reservation(&bob, &tent.id, booking).unwrap();

        // One pending invitation sent by bob, one addressed to him.
        let bobs = add_family(&store, &bob, "Bobs");
        store.create_invite(&bob, &bobs, "carol").unwrap();
        let carols = add_family(&store, &carol, "Carols");
        store.create_invite(&carol, &carols, "bob").unwrap();

        store.delete_user(&bob, &bob).unwrap();
        assert_eq!(store.find_user(&bob).unwrap(), None);
        assert!(matches!(store.get_user(&bob, &bob), Err(ServiceError::NotFound(_))));

        let members = store.list_members(&alice, &smiths).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, alice);
        assert!(store.list_item_reservations(&alice, &tent.id).unwrap().is_empty());
        assert!(store.list_pending_invites(&carol).unwrap().is_empty());
        let to_bob = store
            .read(|conn| sql::count(conn, invitations::pending_count(&carols, &bob), "count"))
            .unwrap();
        assert_eq!(to_bob, 0);
        assert!(store.check_availability(&tent.id, booking).unwrap());
    }
}

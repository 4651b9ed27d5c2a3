//! Fixtures shared by the store tests.

use famshare_api::Role;
use famshare_api::db::users;

use crate::{Store, new_id, sql};

/// Fresh database in a temp directory that outlives the test.
pub(crate) fn test_store() -> Store {
    let dir = tempfile::tempdir().unwrap().keep();
    Store::open_path(&dir.join("famshare.db")).unwrap()
}

/// Insert a user directly, skipping password hashing. Returns the user id.
pub(crate) fn add_user(store: &Store, username: &str) -> String {
    let id = new_id();
    let email = format!("{username}@example.com");
    store
        .write("test user", |tx| {
            sql::execute(
                tx,
                users::insert(&id, username, &email, "00", "00"),
                "test user",
            )
        })
        .unwrap();
    id
}

/// Create a family owned by `owner`. Returns the family id.
pub(crate) fn add_family(store: &Store, owner: &str, name: &str) -> String {
    store.create_family(owner, name).unwrap().id
}

/// Put `user_id` into `family_id` with `role`, bypassing invitations.
pub(crate) fn join(store: &Store, family_id: &str, user_id: &str, role: Role) {
    store.add_membership(user_id, family_id, role).unwrap();
}

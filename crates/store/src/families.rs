//! Family lifecycle: create with an owner, read, delete.

use famshare_api::db::families;
use famshare_api::{service, FamilyResponse, Role, ServiceError};
use rusqlite::Connection;

use crate::membership::{insert_member, require_member};
use crate::{new_id, sql, Store};

pub(crate) fn find_family(
    conn: &Connection,
    family_id: &str,
) -> Result<Option<FamilyResponse>, ServiceError> {
    sql::query_opt(conn, families::get_by_id(family_id), "get family", |row| {
        Ok(FamilyResponse {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: row.get(2)?,
        })
    })
}

impl Store {
    /// Create a family; the creator becomes its owner in the same transaction.
    pub fn create_family(
        &self,
        actor_id: &str,
        name: &str,
    ) -> Result<FamilyResponse, ServiceError> {
        let name = service::validate_family_name(name)?;
        let family = self.write("create family", |tx| {
            let id = new_id();
            sql::execute(tx, families::insert(&id, &name), "insert family")?;
            insert_member(tx, &id, actor_id, Role::Owner)?;
            find_family(tx, &id)?
                .ok_or_else(|| ServiceError::Internal("family vanished after insert".into()))
        })?;
        tracing::info!(family_id = %family.id, owner = actor_id, "family created");
        Ok(family)
    }

    pub fn get_family(
        &self,
        actor_id: &str,
        family_id: &str,
    ) -> Result<FamilyResponse, ServiceError> {
        self.read(|conn| {
            let family = find_family(conn, family_id)?
                .ok_or_else(|| ServiceError::NotFound("family not found".into()))?;
            require_member(conn, family_id, actor_id)?;
            Ok(family)
        })
    }

    /// Delete a family and everything it owns. Owner only.
    pub fn delete_family(&self, actor_id: &str, family_id: &str) -> Result<(), ServiceError> {
        self.write("delete family", |tx| {
            find_family(tx, family_id)?
                .ok_or_else(|| ServiceError::NotFound("family not found".into()))?;
            if require_member(tx, family_id, actor_id)? != Role::Owner {
                return Err(ServiceError::Forbidden(
                    "only the owner can delete the family".into(),
                ));
            }
            sql::execute(tx, families::delete(family_id), "delete family")?;
            Ok(())
        })?;
        tracing::info!(family_id, actor_id, "family deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{add_family, add_user, join, test_store};
    use chrono::{TimeZone, Utc};
    use famshare_api::service::TimeWindow;
    use famshare_api::{Role, ServiceError};

    #[test]
    fn test_create_family_makes_creator_owner() {
        let store = test_store();
        let u1 = add_user(&store, "u1");
        let family = store.create_family(&u1, "  The Smiths ").unwrap();
        assert_eq!(family.name, "The Smiths");
        assert_eq!(store.role_of(&u1, &family.id).unwrap(), Some(Role::Owner));
        assert_eq!(store.get_family(&u1, &family.id).unwrap(), family);
    }

    #[test]
    fn test_create_family_rejects_blank_name() {
        let store = test_store();
        let u1 = add_user(&store, "u1");
        assert!(matches!(
            store.create_family(&u1, "   "),
            Err(ServiceError::BadRequest(_))
        ));
        assert!(store.list_families_for(&u1).unwrap().is_empty());
    }

    #[test]
    fn test_get_family_access() {
        let store = test_store();
        let u1 = add_user(&store, "u1");
        let u2 = add_user(&store, "u2");
        let family = add_family(&store, &u1, "Smiths");
        assert!(matches!(
            store.get_family(&u2, &family),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            store.get_family(&u1, "missing"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_family_is_owner_only_and_cascades() {
        let store = test_store();
        let u1 = add_user(&store, "u1");
        let u2 = add_user(&store, "u2");
        let family = add_family(&store, &u1, "Smiths");
        join(&store, &family, &u2, Role::Admin);
        let item = store.create_item(&u1, &family, "Tent", "camping").unwrap();
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap();
        store
            .create_reservation(&u2, &item.id, TimeWindow::new(start, end).unwrap())
            .unwrap();

        assert!(matches!(
            store.delete_family(&u2, &family),
            Err(ServiceError::Forbidden(_))
        ));
        store.delete_family(&u1, &family).unwrap();

        assert!(store.list_families_for(&u2).unwrap().is_empty());
        assert!(store.list_my_reservations(&u2).unwrap().is_empty());
        assert!(matches!(
            store.get_item(&u1, &item.id),
            Err(ServiceError::NotFound(_))
        ));
    }
}

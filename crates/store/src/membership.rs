//! Membership directory: who belongs to which family, and in what role.

use famshare_api::db::families;
use famshare_api::{service, MemberResponse, MyFamilyResponse, Role, ServiceError};
use rusqlite::Connection;

use crate::{sql, Store};

pub(crate) fn role_in(
    conn: &Connection,
    family_id: &str,
    user_id: &str,
) -> Result<Option<Role>, ServiceError> {
    sql::query_opt(
        conn,
        families::member_role(family_id, user_id),
        "get member role",
        |row| sql::role_at(row, 0),
    )
}

/// The caller's role, or `Forbidden` when they are not in the family.
pub(crate) fn require_member(
    conn: &Connection,
    family_id: &str,
    user_id: &str,
) -> Result<Role, ServiceError> {
    role_in(conn, family_id, user_id)?
        .ok_or_else(|| ServiceError::Forbidden("not a member of this family".into()))
}

pub(crate) fn insert_member(
    conn: &Connection,
    family_id: &str,
    user_id: &str,
    role: Role,
) -> Result<(), ServiceError> {
    sql::execute_unique(
        conn,
        families::member_insert(family_id, user_id, role.as_str()),
        "insert member",
        "user is already a member of this family",
    )?;
    Ok(())
}

impl Store {
    pub fn is_member(&self, user_id: &str, family_id: &str) -> Result<bool, ServiceError> {
        Ok(self.role_of(user_id, family_id)?.is_some())
    }

    pub fn role_of(&self, user_id: &str, family_id: &str) -> Result<Option<Role>, ServiceError> {
        self.read(|conn| role_in(conn, family_id, user_id))
    }

    /// Insert a membership row. `Conflict` when the pair already exists.
    pub fn add_membership(
        &self,
        user_id: &str,
        family_id: &str,
        role: Role,
    ) -> Result<(), ServiceError> {
        self.write("add membership", |tx| {
            insert_member(tx, family_id, user_id, role)
        })?;
        tracing::info!(family_id, user_id, role = %role, "member added");
        Ok(())
    }

    /// Remove `target_id` from a family on behalf of `actor_id`.
    ///
    /// The target's reservations are left in place.
    pub fn remove_member(
        &self,
        actor_id: &str,
        target_id: &str,
        family_id: &str,
    ) -> Result<(), ServiceError> {
        self.write("remove member", |tx| {
            let actor_role = require_member(tx, family_id, actor_id)?;
            let target_role = role_in(tx, family_id, target_id)?
                .ok_or_else(|| ServiceError::NotFound("member not found".into()))?;
            service::check_member_removal(actor_role, target_role, actor_id == target_id)?;
            sql::execute(tx, families::member_delete(family_id, target_id), "delete member")?;
            Ok(())
        })?;
        tracing::info!(family_id, actor_id, target_id, "member removed");
        Ok(())
    }

    /// Members of a family, owners first, then admins, then members; each
    /// group in join order.
    pub fn list_members(
        &self,
        actor_id: &str,
        family_id: &str,
    ) -> Result<Vec<MemberResponse>, ServiceError> {
        let mut members = self.read(|conn| {
            require_member(conn, family_id, actor_id)?;
            sql::query_all(conn, families::member_list(family_id), "list members", |row| {
                Ok(MemberResponse {
                    user_id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                    role: sql::role_at(row, 3)?,
                    joined_at: row.get(4)?,
                })
            })
        })?;
        // Stable: ties keep the join order from the query.
        members.sort_by_key(|m| m.role.rank());
        Ok(members)
    }

    /// Families the user belongs to, with the user's role in each.
    pub fn list_families_for(&self, user_id: &str) -> Result<Vec<MyFamilyResponse>, ServiceError> {
        self.read(|conn| {
            sql::query_all(conn, families::list_for_user(user_id), "list families", |row| {
                Ok(MyFamilyResponse {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    role: sql::role_at(row, 2)?,
                })
            })
        })
    }
}

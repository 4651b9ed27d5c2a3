//! Resource catalog: bookable items grouped by family and type.

use famshare_api::db::items;
use famshare_api::{service, ItemResponse, ServiceError};
use rusqlite::{Connection, Row};

use crate::membership::require_member;
use crate::{new_id, sql, Store};

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<ItemResponse> {
    Ok(ItemResponse {
        id: row.get(0)?,
        family_id: row.get(1)?,
        name: row.get(2)?,
        item_type: row.get(3)?,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub(crate) fn find_item(
    conn: &Connection,
    item_id: &str,
) -> Result<Option<ItemResponse>, ServiceError> {
    sql::query_opt(conn, items::get_by_id(item_id), "get item", item_from_row)
}

/// The item, provided it exists and the actor belongs to its family.
fn visible_item(
    conn: &Connection,
    actor_id: &str,
    item_id: &str,
) -> Result<ItemResponse, ServiceError> {
    let item = find_item(conn, item_id)?
        .ok_or_else(|| ServiceError::NotFound("item not found".into()))?;
    require_member(conn, &item.family_id, actor_id)?;
    Ok(item)
}

impl Store {
    /// Add an item to a family. The type is normalized; new items are active.
    pub fn create_item(
        &self,
        actor_id: &str,
        family_id: &str,
        name: &str,
        raw_type: &str,
    ) -> Result<ItemResponse, ServiceError> {
        let name = service::validate_item_name(name)?;
        let item_type = service::normalize_item_type(raw_type);
        let item = self.write("create item", |tx| {
            require_member(tx, family_id, actor_id)?;
            let id = new_id();
            sql::execute(tx, items::insert(&id, family_id, &name, &item_type), "insert item")?;
            find_item(tx, &id)?
                .ok_or_else(|| ServiceError::Internal("item vanished after insert".into()))
        })?;
        tracing::info!(item_id = %item.id, family_id, item_type = %item.item_type, "item created");
        Ok(item)
    }

    pub fn get_item(&self, actor_id: &str, item_id: &str) -> Result<ItemResponse, ServiceError> {
        self.read(|conn| visible_item(conn, actor_id, item_id))
    }

    pub fn update_item(
        &self,
        actor_id: &str,
        item_id: &str,
        name: &str,
        raw_type: &str,
        is_active: bool,
    ) -> Result<ItemResponse, ServiceError> {
        let name = service::validate_item_name(name)?;
        let item_type = service::normalize_item_type(raw_type);
        self.write("update item", |tx| {
            visible_item(tx, actor_id, item_id)?;
            sql::execute(
                tx,
                items::update(item_id, &name, &item_type, is_active),
                "update item",
            )?;
            find_item(tx, item_id)?.ok_or_else(|| ServiceError::NotFound("item not found".into()))
        })
    }

    /// Delete an item together with its reservations.
    pub fn delete_item(&self, actor_id: &str, item_id: &str) -> Result<(), ServiceError> {
        self.write("delete item", |tx| {
            visible_item(tx, actor_id, item_id)?;
            sql::execute(tx, items::delete(item_id), "delete item")?;
            Ok(())
        })?;
        tracing::info!(item_id, actor_id, "item deleted");
        Ok(())
    }

    /// Items of a family, ordered by type then name.
    pub fn list_items(
        &self,
        actor_id: &str,
        family_id: &str,
    ) -> Result<Vec<ItemResponse>, ServiceError> {
        self.read(|conn| {
            require_member(conn, family_id, actor_id)?;
            sql::query_all(conn, items::list_by_family(family_id), "list items", item_from_row)
        })
    }

    /// Items of a family whose type matches `raw_type` once normalized.
    pub fn list_items_by_type(
        &self,
        actor_id: &str,
        family_id: &str,
        raw_type: &str,
    ) -> Result<Vec<ItemResponse>, ServiceError> {
        let item_type = service::normalize_item_type(raw_type);
        self.read(|conn| {
            require_member(conn, family_id, actor_id)?;
            sql::query_all(
                conn,
                items::list_by_family_type(family_id, &item_type),
                "list items by type",
                item_from_row,
            )
        })
    }

    /// Distinct item types in a family, sorted.
    pub fn item_types(&self, actor_id: &str, family_id: &str) -> Result<Vec<String>, ServiceError> {
        self.read(|conn| {
            require_member(conn, family_id, actor_id)?;
            sql::query_all(conn, items::types_by_family(family_id), "list item types", |row| {
                row.get(0)
            })
        })
    }

    /// Distinct item types across every family the user belongs to, sorted.
    pub fn item_types_for_user(&self, user_id: &str) -> Result<Vec<String>, ServiceError> {
        self.read(|conn| {
            sql::query_all(conn, items::types_for_user(user_id), "list user item types", |row| {
                row.get(0)
            })
        })
    }
}

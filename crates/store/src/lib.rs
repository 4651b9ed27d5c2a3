//! SQLite-backed store for famshare.
//!
//! [`Store`] owns the only connection to the database and implements the
//! membership directory, the invitation workflow, the resource catalog and
//! the reservation engine on top of it. Every mutating operation runs inside
//! an immediate transaction while the connection mutex is held, so
//! check-then-act sequences (overlap check + insert, invitation response +
//! membership insert) cannot interleave with another writer.

mod catalog;
mod families;
mod invitations;
mod membership;
mod reservations;
mod sql;
mod users;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use famshare_api::ServiceError;
use famshare_api::db::migrations::{MIGRATIONS, MIGRATIONS_TABLE};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Thread-safe handle to the famshare database. Share it via `Arc<Store>`.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database at `path` and apply pending migrations.
    pub fn open_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir for {}", path.display()))?;
        }
        let conn =
            Connection::open(path).with_context(|| format!("open db {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, ServiceError> {
        self.conn
            .lock()
            .map_err(|_| ServiceError::Internal("database mutex poisoned".into()))
    }

    /// Run `f` against the connection without opening a transaction.
    fn read<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let conn = self.conn()?;
        f(&conn)
    }

    /// Run `f` inside an immediate transaction. Any error rolls back.
    fn write<T>(
        &self,
        context: &str,
        f: impl FnOnce(&Transaction<'_>) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(ServiceError::from_db(context))?;
        let out = f(&tx)?;
        tx.commit().map_err(ServiceError::from_db(context))?;
        Ok(out)
    }
}

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(MIGRATIONS_TABLE)?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .with_context(|| format!("checking migration {name}"))?;

        if !already_applied {
            conn.execute_batch(sql)
                .with_context(|| format!("running migration {name}"))?;
            conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [name])?;
            tracing::info!("applied migration: {name}");
        }
    }

    Ok(())
}

/// Current instant in the format used for `*_at` text columns.
fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::testing::test_store;

    #[test]
    fn test_open_and_schema() {
        let _store = test_store();
    }

    #[test]
    fn test_reopen_skips_applied_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("famshare.db");
        drop(super::Store::open_path(&path).unwrap());
        let store = super::Store::open_path(&path).unwrap();
        let applied: i64 = store
            .read(|conn| {
                conn.query_row("SELECT COUNT(*) FROM _migrations", [], |row| row.get(0))
                    .map_err(famshare_api::ServiceError::from_db("count migrations"))
            })
            .unwrap();
        assert_eq!(applied as usize, famshare_api::db::migrations::MIGRATIONS.len());
    }
}

//! redb-backed token store.
//!
//! One table, `tokens`, keyed by [`Role::storage_key`]. Values are
//! postcard-encoded [`StoredToken`] records. Every access runs in a write
//! transaction: the store is tiny and single-user, and this keeps the table
//! guaranteed to exist before it is read.

use super::{Role, Session, StoreError, StoredToken, TokenStore};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const TOKENS: TableDefinition<&str, &[u8]> = TableDefinition::new("tokens");

fn db_err(err: impl Into<redb::Error>) -> StoreError {
    StoreError::Database(err.into().to_string())
}

/// Persistent token store.
pub struct RedbTokenStore {
    db: Database,
    path: PathBuf,
}

impl std::fmt::Debug for RedbTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbTokenStore")
            .field("path", &self.path)
            .finish()
    }
}

impl RedbTokenStore {
    /// Open or create the store at `path`. Parent directories are created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Database(format!("{}: {}", parent.display(), e)))?;
        }
        let db = Database::create(&path).map_err(db_err)?;
        Ok(Self { db, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the raw record for a role, including its save time.
    pub fn load_record(&self, role: Role) -> Result<Option<StoredToken>, StoreError> {
        let txn = self.db.begin_write().map_err(db_err)?;
        let bytes = {
            let table = txn.open_table(TOKENS).map_err(db_err)?;
            let value = table.get(role.storage_key()).map_err(db_err)?;
            value.map(|guard| guard.value().to_vec())
        };
        txn.commit().map_err(db_err)?;

        match bytes {
            Some(bytes) => Ok(Some(postcard::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl TokenStore for RedbTokenStore {
    fn load(&self, role: Role) -> Result<Option<Session>, StoreError> {
        Ok(self
            .load_record(role)?
            .map(|record| Session::new(role, record.token)))
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let saved_at_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        let record = StoredToken {
            token: session.token.clone(),
            saved_at_unix,
        };
        let bytes = postcard::to_allocvec(&record)?;

        let txn = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = txn.open_table(TOKENS).map_err(db_err)?;
            table
                .insert(session.role.storage_key(), bytes.as_slice())
                .map_err(db_err)?;
        }
        txn.commit().map_err(db_err)?;
        Ok(())
    }

    fn clear(&self, role: Role) -> Result<bool, StoreError> {
        let txn = self.db.begin_write().map_err(db_err)?;
        let existed = {
            let mut table = txn.open_table(TOKENS).map_err(db_err)?;
            let removed = table.remove(role.storage_key()).map_err(db_err)?;
            removed.is_some()
        };
        txn.commit().map_err(db_err)?;
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn save_load_clear_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbTokenStore::open(dir.path().join("tokens.redb")).unwrap();

        assert!(store.load(Role::Admin).unwrap().is_none());

        store.save(&Session::new(Role::Admin, "admin-jwt")).unwrap();
        let loaded = store.load(Role::Admin).unwrap().unwrap();
        assert_eq!(loaded.role, Role::Admin);
        assert_eq!(loaded.token, "admin-jwt");
        assert!(store.load(Role::Influencer).unwrap().is_none());

        assert!(store.clear(Role::Admin).unwrap());
        assert!(store.load(Role::Admin).unwrap().is_none());
    }

    #[test]
    fn tokens_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tokens.redb");
        {
            let store = RedbTokenStore::open(&path).unwrap();
            store
                .save(&Session::new(Role::Influencer, "inf-jwt"))
                .unwrap();
        }

        let store = RedbTokenStore::open(&path).unwrap();
        let record = store.load_record(Role::Influencer).unwrap().unwrap();
        assert_eq!(record.token, "inf-jwt");
        assert!(record.saved_at_unix > 0);
    }

    #[test]
    fn save_replaces_previous_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbTokenStore::open(dir.path().join("t.redb")).unwrap();
        store.save(&Session::new(Role::Admin, "old")).unwrap();
        store.save(&Session::new(Role::Admin, "new")).unwrap();
        assert_eq!(store.load(Role::Admin).unwrap().unwrap().token, "new");
    }
}

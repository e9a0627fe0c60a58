//! Embedded graph store backed by redb.
//!
//! One table per project UUID gives project isolation for free: iteration
//! and deletion never cross table boundaries. A batched write runs inside a
//! single transaction, so it applies fully or not at all.

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition, TableError};

use crate::error::StoreError;
use crate::types::ProjectId;

pub const STORE_FILE: &str = "codegraph.redb";

/// Contract the indexing and query layers depend on.
pub trait GraphStore: Send + Sync {
    fn get(&self, project: ProjectId, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Apply all items in one transaction.
    fn batch_save(&self, project: ProjectId, items: &[(String, Vec<u8>)]) -> Result<(), StoreError>;

    /// Snapshot of every entry under `prefix`, in key order.
    fn iter_prefix(
        &self,
        project: ProjectId,
        prefix: &str,
    ) -> Result<Vec<(String, Vec<u8>)>, StoreError>;

    fn size(&self, project: ProjectId, prefix: &str) -> Result<usize, StoreError>;

    fn exists(&self, project: ProjectId, key: &str) -> Result<bool, StoreError>;

    /// Drop every key of the project.
    fn delete_all(&self, project: ProjectId) -> Result<(), StoreError>;
}

pub struct RedbGraphStore {
    db: Database,
}

impl RedbGraphStore {
    /// Create or open the store under `dir`.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir).map_err(|e| StoreError::Open {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        let file = dir.join(STORE_FILE);
        let db = Database::create(&file).map_err(|e| StoreError::Open {
            path: file,
            reason: e.to_string(),
        })?;
        Ok(Self { db })
    }
}

fn table_name(project: ProjectId) -> String {
    project.to_string()
}

fn txn_err(e: impl std::fmt::Display) -> StoreError {
    StoreError::Transaction {
        reason: e.to_string(),
    }
}

impl GraphStore for RedbGraphStore {
    fn get(&self, project: ProjectId, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let name = table_name(project);
        let def: TableDefinition<&str, &[u8]> = TableDefinition::new(&name);
        let txn = self.db.begin_read().map_err(txn_err)?;
        let table = match txn.open_table(def) {
            Ok(t) => t,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => {
                return Err(StoreError::Table {
                    project: name,
                    reason: e.to_string(),
                });
            }
        };
        let value = table.get(key).map_err(txn_err)?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }

    fn batch_save(&self, project: ProjectId, items: &[(String, Vec<u8>)]) -> Result<(), StoreError> {
        if items.is_empty() {
            return Ok(());
        }
        let name = table_name(project);
        let def: TableDefinition<&str, &[u8]> = TableDefinition::new(&name);
        let txn = self.db.begin_write().map_err(txn_err)?;
        {
            let mut table = txn.open_table(def).map_err(|e| StoreError::Table {
                project: name.clone(),
                reason: e.to_string(),
            })?;
            for (key, value) in items {
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(txn_err)?;
            }
        }
        txn.commit().map_err(txn_err)?;
        Ok(())
    }

    fn iter_prefix(
        &self,
        project: ProjectId,
        prefix: &str,
    ) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let name = table_name(project);
        let def: TableDefinition<&str, &[u8]> = TableDefinition::new(&name);
        let txn = self.db.begin_read().map_err(txn_err)?;
        let table = match txn.open_table(def) {
            Ok(t) => t,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Table {
                    project: name,
                    reason: e.to_string(),
                });
            }
        };
        let mut out = Vec::new();
        for item in table.range(prefix..).map_err(txn_err)? {
            let (key, value) = item.map_err(txn_err)?;
            let key_str = key.value();
            if !key_str.starts_with(prefix) {
                break;
            }
            out.push((key_str.to_string(), value.value().to_vec()));
        }
        Ok(out)
    }

    fn size(&self, project: ProjectId, prefix: &str) -> Result<usize, StoreError> {
        Ok(self.iter_prefix(project, prefix)?.len())
    }

    fn exists(&self, project: ProjectId, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(project, key)?.is_some())
    }

    fn delete_all(&self, project: ProjectId) -> Result<(), StoreError> {
        let name = table_name(project);
        let def: TableDefinition<&str, &[u8]> = TableDefinition::new(&name);
        let txn = self.db.begin_write().map_err(txn_err)?;
        match txn.delete_table(def) {
            Ok(_) => {}
            Err(TableError::TableDoesNotExist(_)) => {}
            Err(e) => {
                return Err(StoreError::Table {
                    project: name,
                    reason: e.to_string(),
                });
            }
        }
        txn.commit().map_err(txn_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn store() -> (TempDir, RedbGraphStore) {
        let dir = TempDir::new().unwrap();
        let store = RedbGraphStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn project(tag: &str) -> ProjectId {
        ProjectId::from_root(&PathBuf::from(format!("/ws/{tag}")))
    }

    #[test]
    fn get_on_fresh_store_is_none() {
        let (_dir, store) = store();
        assert!(store.get(project("a"), "@path:go:/x").unwrap().is_none());
        assert!(!store.exists(project("a"), "@path:go:/x").unwrap());
    }

    #[test]
    fn batch_save_then_get() {
        let (_dir, store) = store();
        let p = project("a");
        store
            .batch_save(
                p,
                &[
                    ("@path:go:/a".to_string(), b"one".to_vec()),
                    ("@sym:go:Run".to_string(), b"two".to_vec()),
                ],
            )
            .unwrap();
        assert_eq!(store.get(p, "@path:go:/a").unwrap().unwrap(), b"one");
        assert_eq!(store.get(p, "@sym:go:Run").unwrap().unwrap(), b"two");
    }

    #[test]
    fn prefix_iteration_respects_families() {
        let (_dir, store) = store();
        let p = project("a");
        store
            .batch_save(
                p,
                &[
                    ("@path:go:/a".to_string(), b"1".to_vec()),
                    ("@path:go:/b".to_string(), b"2".to_vec()),
                    ("@sym:go:Run".to_string(), b"3".to_vec()),
                ],
            )
            .unwrap();
        let paths = store.iter_prefix(p, "@path:").unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(store.size(p, "@sym:").unwrap(), 1);
    }

    #[test]
    fn projects_are_isolated() {
        let (_dir, store) = store();
        let a = project("a");
        let b = project("b");
        store
            .batch_save(a, &[("@path:go:/a".to_string(), b"1".to_vec())])
            .unwrap();
        assert!(store.iter_prefix(b, "@path:").unwrap().is_empty());
        assert!(store.get(b, "@path:go:/a").unwrap().is_none());
    }

    #[test]
    fn delete_all_clears_one_project_only() {
        let (_dir, store) = store();
        let a = project("a");
        let b = project("b");
        store
            .batch_save(a, &[("@path:go:/a".to_string(), b"1".to_vec())])
            .unwrap();
        store
            .batch_save(b, &[("@path:go:/b".to_string(), b"2".to_vec())])
            .unwrap();
        store.delete_all(a).unwrap();
        assert!(store.get(a, "@path:go:/a").unwrap().is_none());
        assert!(store.get(b, "@path:go:/b").unwrap().is_some());
    }

    #[test]
    fn overwrite_is_idempotent() {
        let (_dir, store) = store();
        let p = project("a");
        store
            .batch_save(p, &[("@path:go:/a".to_string(), b"v1".to_vec())])
            .unwrap();
        store
            .batch_save(p, &[("@path:go:/a".to_string(), b"v2".to_vec())])
            .unwrap();
        assert_eq!(store.get(p, "@path:go:/a").unwrap().unwrap(), b"v2");
        assert_eq!(store.size(p, "@path:").unwrap(), 1);
    }
}

//! Workspace metadata repository.
//!
//! Keyed by canonical workspace path. The JSON-file implementation persists
//! atomically (write temp, rename) under the index directory; a SQLite
//! variant can implement the same trait out of tree.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::{IndexError, IndexResult};
use crate::types::ProjectId;

pub const WORKSPACES_FILE: &str = "workspaces.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub path: String,
    pub id: Uuid,
    #[serde(default)]
    pub file_count: usize,
    #[serde(default)]
    pub failed_files: usize,
    /// Epoch milliseconds of the last successful index run; 0 when never
    /// indexed.
    #[serde(default)]
    pub last_indexed_at: i64,
    #[serde(default)]
    pub project_ids: Vec<ProjectId>,
}

impl Workspace {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_string_lossy().to_string(),
            id: Uuid::new_v4(),
            file_count: 0,
            failed_files: 0,
            last_indexed_at: 0,
            project_ids: Vec::new(),
        }
    }
}

pub trait WorkspaceRepository: Send + Sync {
    fn get_by_path(&self, path: &Path) -> IndexResult<Option<Workspace>>;

    fn create(&self, workspace: Workspace) -> IndexResult<()>;

    /// Update the code-graph bookkeeping of one workspace after a run.
    fn update_codegraph_info(
        &self,
        path: &Path,
        file_count: usize,
        failed_files: usize,
        timestamp: i64,
        project_ids: Vec<ProjectId>,
    ) -> IndexResult<()>;
}

/// JSON-file-backed repository.
pub struct JsonWorkspaceRepository {
    file: PathBuf,
    records: Mutex<HashMap<String, Workspace>>,
}

impl JsonWorkspaceRepository {
    pub fn open(dir: &Path) -> IndexResult<Self> {
        std::fs::create_dir_all(dir).map_err(|e| IndexError::FileWrite {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let file = dir.join(WORKSPACES_FILE);
        let records = if file.is_file() {
            let bytes = std::fs::read(&file).map_err(|e| IndexError::FileRead {
                path: file.clone(),
                source: e,
            })?;
            serde_json::from_slice(&bytes).map_err(|e| IndexError::MalformedRecord {
                key: file.to_string_lossy().to_string(),
                reason: e.to_string(),
            })?
        } else {
            HashMap::new()
        };
        Ok(Self {
            file,
            records: Mutex::new(records),
        })
    }

    fn persist(&self, records: &HashMap<String, Workspace>) -> IndexResult<()> {
        let bytes = serde_json::to_vec_pretty(records).map_err(|e| IndexError::MalformedRecord {
            key: self.file.to_string_lossy().to_string(),
            reason: e.to_string(),
        })?;
        let tmp = self.file.with_extension("tmp");
        std::fs::write(&tmp, bytes).map_err(|e| IndexError::FileWrite {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, &self.file).map_err(|e| IndexError::FileWrite {
            path: self.file.clone(),
            source: e,
        })?;
        Ok(())
    }

    fn key_for(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }
}

impl WorkspaceRepository for JsonWorkspaceRepository {
    fn get_by_path(&self, path: &Path) -> IndexResult<Option<Workspace>> {
        let records = self.records.lock().expect("workspace records poisoned");
        Ok(records.get(&Self::key_for(path)).cloned())
    }

    fn create(&self, workspace: Workspace) -> IndexResult<()> {
        let mut records = self.records.lock().expect("workspace records poisoned");
        records.insert(workspace.path.clone(), workspace);
        self.persist(&records)
    }

    fn update_codegraph_info(
        &self,
        path: &Path,
        file_count: usize,
        failed_files: usize,
        timestamp: i64,
        project_ids: Vec<ProjectId>,
    ) -> IndexResult<()> {
        let mut records = self.records.lock().expect("workspace records poisoned");
        let key = Self::key_for(path);
        let record = records
            .get_mut(&key)
            .ok_or_else(|| IndexError::WorkspaceNotFound {
                path: path.to_path_buf(),
            })?;
        record.file_count = file_count;
        record.failed_files = failed_files;
        record.last_indexed_at = timestamp;
        record.project_ids = project_ids;
        self.persist(&records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_and_reload() {
        let dir = TempDir::new().unwrap();
        let ws_path = PathBuf::from("/ws/demo");
        {
            let repo = JsonWorkspaceRepository::open(dir.path()).unwrap();
            repo.create(Workspace::new(&ws_path)).unwrap();
            repo.update_codegraph_info(&ws_path, 12, 1, 1_700_000_000_000, vec![])
                .unwrap();
        }
        let repo = JsonWorkspaceRepository::open(dir.path()).unwrap();
        let ws = repo.get_by_path(&ws_path).unwrap().unwrap();
        assert_eq!(ws.file_count, 12);
        assert_eq!(ws.failed_files, 1);
        assert_eq!(ws.last_indexed_at, 1_700_000_000_000);
    }

    #[test]
    fn update_unknown_workspace_fails() {
        let dir = TempDir::new().unwrap();
        let repo = JsonWorkspaceRepository::open(dir.path()).unwrap();
        let err = repo
            .update_codegraph_info(&PathBuf::from("/nope"), 0, 0, 0, vec![])
            .unwrap_err();
        assert!(matches!(err, IndexError::WorkspaceNotFound { .. }));
    }

    #[test]
    fn unknown_path_is_none() {
        let dir = TempDir::new().unwrap();
        let repo = JsonWorkspaceRepository::open(dir.path()).unwrap();
        assert!(repo.get_by_path(&PathBuf::from("/absent")).unwrap().is_none());
    }
}

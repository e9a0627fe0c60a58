//! Indexer facade: the public operations of the crate.
//!
//! `index_workspace` discovers projects, parses their files on the task
//! pool, persists file tables and the symbol index in batches, and records
//! per-run metrics through the workspace repository.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crossbeam_channel::unbounded;
use serde::Serialize;
use tracing::{info, warn};

use super::analyzer::SymbolIndexer;
use super::task_pool::{CancelToken, TaskPool};
use crate::config::Settings;
use crate::error::{IndexError, IndexResult};
use crate::model::FileElementTable;
use crate::parsing::{FileParser, LanguageRegistry};
use crate::project::{discover_projects, ProjectInfo, SourceWalker};
use crate::query::{Definition, QueryEngine};
use crate::storage::{element_path_key, GraphStore, RedbGraphStore};
use crate::types::ProjectId;
use crate::workspace::{JsonWorkspaceRepository, Workspace, WorkspaceRepository};

/// Per-run outcome of `index_workspace`.
#[derive(Debug, Clone, Serialize)]
pub struct IndexMetrics {
    pub total_files: usize,
    pub total_failed_files: usize,
    pub duration_ms: u64,
}

/// Stored per-workspace bookkeeping surfaced by `get_summary`.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceSummary {
    pub total_files: usize,
    pub total_failed_files: usize,
    pub last_indexed_at: i64,
    pub last_indexed_at_rfc3339: Option<String>,
}

/// Request for `query_definitions`. Lines are 1-based inclusive.
#[derive(Debug, Clone)]
pub struct DefinitionQuery {
    pub workspace: PathBuf,
    pub file_path: PathBuf,
    pub start_line: u32,
    pub end_line: u32,
}

enum ParseOutcome {
    Parsed(Box<FileElementTable>),
    Failed(PathBuf),
}

pub struct CodeGraphIndexer {
    settings: Arc<Settings>,
    registry: Arc<LanguageRegistry>,
    store: Arc<dyn GraphStore>,
    workspaces: Arc<dyn WorkspaceRepository>,
}

impl CodeGraphIndexer {
    /// Open with the default components rooted at `settings.index_path`.
    pub fn open(settings: Arc<Settings>) -> IndexResult<Self> {
        let registry = Arc::new(LanguageRegistry::new(&settings)?);
        let store = Arc::new(RedbGraphStore::open(&settings.index_path)?);
        let workspaces = Arc::new(JsonWorkspaceRepository::open(&settings.index_path)?);
        Ok(Self {
            settings,
            registry,
            store,
            workspaces,
        })
    }

    /// Inject components; used by tests and alternative deployments.
    pub fn with_components(
        settings: Arc<Settings>,
        registry: Arc<LanguageRegistry>,
        store: Arc<dyn GraphStore>,
        workspaces: Arc<dyn WorkspaceRepository>,
    ) -> Self {
        Self {
            settings,
            registry,
            store,
            workspaces,
        }
    }

    pub fn index_workspace(&self, workspace_path: &Path) -> IndexResult<IndexMetrics> {
        let started = Instant::now();
        let root = canonical_workspace(workspace_path)?;

        if self.workspaces.get_by_path(&root)?.is_none() {
            self.workspaces.create(Workspace::new(&root))?;
        }

        let walker = SourceWalker::new(Arc::clone(&self.settings), Arc::clone(&self.registry));
        let files = walker.walk(&root);
        let projects = discover_projects(&root, &files);

        let pool = TaskPool::new(self.settings.indexing.workers);
        let token = CancelToken::new();

        let mut total_files = 0usize;
        let mut total_failed = 0usize;
        let mut project_ids = Vec::new();

        for (project, project_files) in &projects {
            let (files_ok, files_failed) =
                self.index_project(&pool, &token, project.id, &project.root, project_files)?;
            total_files += files_ok;
            total_failed += files_failed;
            project_ids.push(project.id);
            info!(
                project = %project.id,
                root = %project.root.display(),
                files = files_ok,
                failed = files_failed,
                "project indexed"
            );
            if token.is_canceled() {
                break;
            }
        }
        pool.close();

        let timestamp = now_millis();
        self.workspaces.update_codegraph_info(
            &root,
            total_files,
            total_failed,
            timestamp,
            project_ids,
        )?;

        let metrics = IndexMetrics {
            total_files,
            total_failed_files: total_failed,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            workspace = %root.display(),
            files = metrics.total_files,
            failed = metrics.total_failed_files,
            duration_ms = metrics.duration_ms,
            "workspace indexed"
        );
        Ok(metrics)
    }

    /// Parse one project's files concurrently and persist the results in
    /// batches. Returns `(indexed, failed)` counts.
    fn index_project(
        &self,
        pool: &TaskPool,
        token: &CancelToken,
        project_id: ProjectId,
        project_root: &Path,
        files: &[PathBuf],
    ) -> IndexResult<(usize, usize)> {
        let info = Arc::new(ProjectInfo::new(project_root, files));
        let timestamp = now_millis();
        let (tx, rx) = unbounded::<ParseOutcome>();

        for file in files {
            let tx = tx.clone();
            let registry = Arc::clone(&self.registry);
            let info = Arc::clone(&info);
            let file = file.clone();
            pool.submit(token.clone(), move |_ctx| {
                let parser = FileParser::new(registry);
                match parser.parse_path(&file, Some(&info)) {
                    Ok(parsed) => {
                        let _ = tx.send(ParseOutcome::Parsed(Box::new(
                            parsed.into_table(timestamp),
                        )));
                    }
                    Err(e) => {
                        warn!(file = %file.display(), error = %e, "file skipped");
                        let _ = tx.send(ParseOutcome::Failed(file));
                    }
                }
            })
            .map_err(|_| IndexError::Config {
                reason: "task pool closed during submission".to_string(),
            })?;
        }
        drop(tx);

        let batch_size = self.settings.indexing.batch_size.max(1);
        let mut symbols = SymbolIndexer::new(
            self.store.as_ref(),
            project_id,
            files.len(),
            &self.settings.indexing,
        );
        let mut batch: Vec<(String, Vec<u8>)> = Vec::with_capacity(batch_size);
        let mut indexed = 0usize;
        let mut failed = 0usize;

        // The iterator ends once every submitted task has sent or dropped
        // its sender.
        for outcome in rx.iter() {
            match outcome {
                ParseOutcome::Parsed(table) => {
                    let key = element_path_key(&table.language, &table.path);
                    let bytes = table.to_bytes().map_err(|e| IndexError::MalformedRecord {
                        key: key.clone(),
                        reason: e.to_string(),
                    })?;
                    batch.push((key, bytes));
                    symbols.index_table(&table)?;
                    indexed += 1;
                    if batch.len() >= batch_size {
                        self.store.batch_save(project_id, &batch)?;
                        batch.clear();
                        if token.is_canceled() {
                            break;
                        }
                    }
                }
                ParseOutcome::Failed(_) => failed += 1,
            }
        }
        pool.wait();

        self.store.batch_save(project_id, &batch)?;
        symbols.finish()?;
        Ok((indexed, failed))
    }

    /// Drop every persisted table of the workspace's projects.
    pub fn remove_all_indexes(&self, workspace_path: &Path) -> IndexResult<()> {
        let root = canonical_workspace(workspace_path)?;
        let workspace =
            self.workspaces
                .get_by_path(&root)?
                .ok_or_else(|| IndexError::WorkspaceNotFound {
                    path: root.clone(),
                })?;
        for project_id in &workspace.project_ids {
            self.store.delete_all(*project_id)?;
        }
        self.workspaces
            .update_codegraph_info(&root, 0, 0, 0, Vec::new())?;
        info!(workspace = %root.display(), "indexes removed");
        Ok(())
    }

    pub fn get_summary(&self, workspace_path: &Path) -> IndexResult<Option<WorkspaceSummary>> {
        let root = canonical_workspace(workspace_path)?;
        let Some(workspace) = self.workspaces.get_by_path(&root)? else {
            return Ok(None);
        };
        let rendered = (workspace.last_indexed_at > 0)
            .then(|| chrono::DateTime::from_timestamp_millis(workspace.last_indexed_at))
            .flatten()
            .map(|dt| dt.to_rfc3339());
        Ok(Some(WorkspaceSummary {
            total_files: workspace.file_count,
            total_failed_files: workspace.failed_files,
            last_indexed_at: workspace.last_indexed_at,
            last_indexed_at_rfc3339: rendered,
        }))
    }

    pub fn query_definitions(&self, query: &DefinitionQuery) -> IndexResult<Vec<Definition>> {
        let root = canonical_workspace(&query.workspace)?;
        let workspace =
            self.workspaces
                .get_by_path(&root)?
                .ok_or_else(|| IndexError::WorkspaceNotFound {
                    path: root.clone(),
                })?;

        let file = query
            .file_path
            .canonicalize()
            .unwrap_or_else(|_| query.file_path.clone());
        let Some(language) = self.registry.infer_language(&file) else {
            return Ok(Vec::new());
        };

        let engine = QueryEngine::new(self.store.as_ref());
        let file_str = file.to_string_lossy();
        let mut out = Vec::new();
        for project_id in &workspace.project_ids {
            let definitions = engine.definitions(
                *project_id,
                language.key(),
                &file_str,
                query.start_line,
                query.end_line,
            )?;
            for definition in definitions {
                if !out.contains(&definition) {
                    out.push(definition);
                }
            }
        }
        Ok(out)
    }
}

fn canonical_workspace(path: &Path) -> IndexResult<PathBuf> {
    path.canonicalize().map_err(|e| IndexError::InvalidWorkspace {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

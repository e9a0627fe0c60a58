//! Immutable per-project state for one index run.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::types::ProjectId;

/// One indexing unit: a directory tree with a stable UUID.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: ProjectId,
    pub root: PathBuf,
}

impl Project {
    pub fn new(root: PathBuf) -> Self {
        Self {
            id: ProjectId::from_root(&root),
            root,
        }
    }
}

/// File set and directory index of a project, built once after the walk and
/// shared read-only between parse tasks.
#[derive(Debug, Default)]
pub struct ProjectInfo {
    pub root: PathBuf,
    /// Directories relative-import resolution starts from.
    pub source_roots: Vec<PathBuf>,
    pub files: HashSet<PathBuf>,
    pub files_by_dir: HashMap<PathBuf, Vec<PathBuf>>,
}

impl ProjectInfo {
    pub fn new(root: &Path, files: &[PathBuf]) -> Self {
        let mut source_roots = vec![root.to_path_buf()];
        let src = root.join("src");
        if src.is_dir() {
            source_roots.push(src);
        }

        let mut file_set = HashSet::new();
        let mut files_by_dir: HashMap<PathBuf, Vec<PathBuf>> = HashMap::new();
        for file in files {
            file_set.insert(file.clone());
            if let Some(dir) = file.parent() {
                files_by_dir
                    .entry(dir.to_path_buf())
                    .or_default()
                    .push(file.clone());
            }
        }

        Self {
            root: root.to_path_buf(),
            source_roots,
            files: file_set,
            files_by_dir,
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    /// Resolve a relative specifier against a base directory plus every
    /// source root, returning all candidates that exist in the file set.
    pub fn resolve_candidates(&self, base_dir: Option<&Path>, relative: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut push = |candidate: PathBuf| {
            let normalized = normalize(&candidate);
            if self.files.contains(&normalized) {
                let text = normalized.to_string_lossy().to_string();
                if !out.contains(&text) {
                    out.push(text);
                }
            }
        };

        if let Some(dir) = base_dir {
            push(dir.join(relative));
        }
        for root in &self.source_roots {
            push(root.join(relative));
        }
        out
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_ids_are_stable() {
        let a = Project::new(PathBuf::from("/ws/app"));
        let b = Project::new(PathBuf::from("/ws/app"));
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn candidates_only_include_known_files() {
        let files = vec![
            PathBuf::from("/ws/app/util.h"),
            PathBuf::from("/ws/app/src/core.h"),
        ];
        let info = ProjectInfo::new(Path::new("/ws/app"), &files);

        let hits = info.resolve_candidates(Some(Path::new("/ws/app")), "util.h");
        assert_eq!(hits, vec!["/ws/app/util.h".to_string()]);

        assert!(info
            .resolve_candidates(Some(Path::new("/ws/app")), "missing.h")
            .is_empty());
    }

    #[test]
    fn parent_components_are_collapsed() {
        let files = vec![PathBuf::from("/ws/app/util.h")];
        let info = ProjectInfo::new(Path::new("/ws/app"), &files);
        let hits = info.resolve_candidates(Some(Path::new("/ws/app/sub")), "../util.h");
        assert_eq!(hits, vec!["/ws/app/util.h".to_string()]);
    }
}

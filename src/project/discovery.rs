//! Project grouping: files are assigned to the deepest enclosing directory
//! holding a module descriptor; everything else belongs to the workspace
//! root project.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use super::Project;

/// Build files that mark a directory as a project root.
const PROJECT_DESCRIPTORS: [&str; 9] = [
    "go.mod",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "package.json",
    "tsconfig.json",
    "CMakeLists.txt",
    "pyproject.toml",
    "setup.py",
];

/// Group walked files into projects.
pub fn discover_projects(root: &Path, files: &[PathBuf]) -> Vec<(Project, Vec<PathBuf>)> {
    let mut candidate_dirs: BTreeSet<PathBuf> = BTreeSet::new();
    for file in files {
        for ancestor in file.ancestors().skip(1) {
            if !ancestor.starts_with(root) {
                break;
            }
            candidate_dirs.insert(ancestor.to_path_buf());
            if ancestor == root {
                break;
            }
        }
    }

    let mut project_roots: Vec<PathBuf> = candidate_dirs
        .into_iter()
        .filter(|dir| has_descriptor(dir))
        .collect();
    if !project_roots.contains(&root.to_path_buf()) {
        project_roots.push(root.to_path_buf());
    }
    // Deepest roots first so assignment picks the most specific project.
    project_roots.sort_by_key(|p| std::cmp::Reverse(p.components().count()));

    let mut grouped: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for file in files {
        let owner = project_roots
            .iter()
            .find(|candidate| file.starts_with(candidate))
            .cloned()
            .unwrap_or_else(|| root.to_path_buf());
        grouped.entry(owner).or_default().push(file.clone());
    }

    grouped
        .into_iter()
        .map(|(project_root, files)| (Project::new(project_root), files))
        .collect()
}

fn has_descriptor(dir: &Path) -> bool {
    PROJECT_DESCRIPTORS
        .iter()
        .any(|descriptor| dir.join(descriptor).is_file())
}

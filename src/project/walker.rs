//! File system walker for discovering source files to index.
//!
//! Respects gitignore rules and configured ignore patterns, skips hidden
//! files, filters to supported languages, and honors the per-project file
//! cap (`MAX_FILES` wins over configuration).

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Settings;
use crate::parsing::LanguageRegistry;

pub struct SourceWalker {
    settings: Arc<Settings>,
    registry: Arc<LanguageRegistry>,
}

impl SourceWalker {
    pub fn new(settings: Arc<Settings>, registry: Arc<LanguageRegistry>) -> Self {
        Self { settings, registry }
    }

    /// Walk a directory tree and collect files to index, stopping at the
    /// effective file cap.
    pub fn walk(&self, root: &Path) -> Vec<PathBuf> {
        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .require_git(false);

        let mut override_builder = ignore::overrides::OverrideBuilder::new(root);
        for pattern in &self.settings.indexing.ignore_patterns {
            if let Err(e) = override_builder.add(&format!("!{pattern}")) {
                tracing::warn!(pattern = %pattern, error = %e, "invalid ignore pattern");
            }
        }
        if let Ok(overrides) = override_builder.build() {
            builder.overrides(overrides);
        }

        let max_files = self.settings.effective_max_files();
        let mut files = Vec::new();

        for entry in builder.build() {
            if max_files.is_some_and(|cap| files.len() >= cap) {
                break;
            }
            let Ok(entry) = entry else {
                continue;
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.path();
            if path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'))
            {
                continue;
            }
            if self.registry.infer_language(path).is_none() {
                continue;
            }
            files.push(path.to_path_buf());
        }

        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn walker(settings: Settings) -> SourceWalker {
        let settings = Arc::new(settings);
        let registry = Arc::new(LanguageRegistry::new(&settings).unwrap());
        SourceWalker::new(settings, registry)
    }

    #[test]
    fn walk_filters_to_supported_languages() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Main.java"), "class Main {}").unwrap();
        fs::write(dir.path().join("app.go"), "package app").unwrap();
        fs::write(dir.path().join("README.md"), "# hi").unwrap();

        let files = walker(Settings::default()).walk(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|p| p.ends_with("Main.java")));
        assert!(files.iter().any(|p| p.ends_with("app.go")));
    }

    #[test]
    fn ignore_patterns_exclude_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.js"), "x").unwrap();
        fs::write(dir.path().join("index.js"), "x").unwrap();

        let files = walker(Settings::default()).walk(dir.path());
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("index.js"));
        assert!(!files[0].to_string_lossy().contains("node_modules"));
    }

    #[test]
    fn hidden_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".hidden.go"), "package x").unwrap();
        fs::write(dir.path().join("visible.go"), "package x").unwrap();

        let files = walker(Settings::default()).walk(dir.path());
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("visible.go"));
    }

    #[test]
    fn max_files_caps_the_walk() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            fs::write(dir.path().join(format!("f{i}.go")), "package x").unwrap();
        }
        let mut settings = Settings::default();
        settings.indexing.max_files = Some(3);
        let files = walker(settings).walk(dir.path());
        assert_eq!(files.len(), 3);
    }
}

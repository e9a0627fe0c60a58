//! Language registry: grammar + compiled capture query + resolver bundles.
//!
//! Bundles are built once at startup and shared read-only between workers.
//! A registered language whose query fails to compile is a fatal
//! configuration error.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tree_sitter::Query;

use super::{queries, ElementResolver, Language};
use crate::config::Settings;
use crate::error::{IndexError, IndexResult};

/// Everything needed to parse and resolve one language.
pub struct ParseBundle {
    pub language: Language,
    pub ts_language: tree_sitter::Language,
    pub query: Query,
    pub resolver: Arc<dyn ElementResolver>,
}

impl ParseBundle {
    pub fn capture_names(&self) -> &[&str] {
        self.query.capture_names()
    }
}

fn grammar_for(language: Language) -> tree_sitter::Language {
    match language {
        Language::Java => tree_sitter_java::LANGUAGE.into(),
        Language::Go => tree_sitter_go::LANGUAGE.into(),
        Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Language::C => tree_sitter_c::LANGUAGE.into(),
        Language::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        Language::Python => tree_sitter_python::LANGUAGE.into(),
    }
}

fn resolver_for(language: Language) -> Arc<dyn ElementResolver> {
    match language {
        Language::Java => Arc::new(super::java::JavaResolver::new()),
        Language::Go => Arc::new(super::go::GoResolver::new()),
        Language::JavaScript => Arc::new(super::javascript::JavaScriptResolver::new()),
        Language::TypeScript => Arc::new(super::typescript::TypeScriptResolver::new()),
        Language::C | Language::Cpp => Arc::new(super::c::CFamilyResolver::new(language)),
        Language::Python => Arc::new(super::python::PythonResolver::new()),
    }
}

/// Process-wide registry of parse bundles and extension mappings.
pub struct LanguageRegistry {
    bundles: HashMap<Language, Arc<ParseBundle>>,
    extensions: HashMap<String, Language>,
}

impl LanguageRegistry {
    /// Build bundles for every enabled language and the extension map
    /// (built-ins layered with configured overrides).
    pub fn new(settings: &Settings) -> IndexResult<Self> {
        let mut bundles = HashMap::new();
        let mut extensions = HashMap::new();

        for language in Language::ALL {
            if !settings.language_enabled(language.key()) {
                continue;
            }
            let grammar = grammar_for(language);
            let query = Query::new(&grammar, queries::query_source(language)).map_err(|e| {
                IndexError::Config {
                    reason: format!("capture query for {language} failed to compile: {e}"),
                }
            })?;
            bundles.insert(
                language,
                Arc::new(ParseBundle {
                    language,
                    ts_language: grammar,
                    query,
                    resolver: resolver_for(language),
                }),
            );
            for ext in language.extensions() {
                extensions.insert((*ext).to_string(), language);
            }
        }

        for (ext, key) in &settings.extension_overrides {
            let Some(language) = Language::from_key(key) else {
                return Err(IndexError::Config {
                    reason: format!("extension override '{ext}' names unknown language '{key}'"),
                });
            };
            extensions.insert(ext.to_lowercase(), language);
        }

        Ok(Self {
            bundles,
            extensions,
        })
    }

    /// Extension-based detection with configured overrides. `None` means the
    /// caller skips the file.
    pub fn infer_language(&self, path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        let language = *self.extensions.get(&ext)?;
        self.bundles.contains_key(&language).then_some(language)
    }

    pub fn bundle_for(&self, language: Language) -> IndexResult<Arc<ParseBundle>> {
        self.bundles
            .get(&language)
            .cloned()
            .ok_or_else(|| IndexError::MissingBundle {
                language: language.key().to_string(),
            })
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.bundles.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn all_default_queries_compile() {
        let registry = LanguageRegistry::new(&Settings::default()).unwrap();
        for language in Language::ALL {
            assert!(registry.bundle_for(language).is_ok(), "missing {language}");
        }
    }

    #[test]
    fn extension_override_rewires_detection() {
        let mut settings = Settings::default();
        settings
            .extension_overrides
            .insert("h".to_string(), "cpp".to_string());
        let registry = LanguageRegistry::new(&settings).unwrap();
        assert_eq!(
            registry.infer_language(&PathBuf::from("include/util.h")),
            Some(Language::Cpp)
        );
    }

    #[test]
    fn unknown_extension_is_skipped() {
        let registry = LanguageRegistry::new(&Settings::default()).unwrap();
        assert_eq!(registry.infer_language(&PathBuf::from("README.md")), None);
        assert_eq!(registry.infer_language(&PathBuf::from("no_extension")), None);
    }

    #[test]
    fn disabled_language_has_no_bundle() {
        let mut settings = Settings::default();
        settings.languages.insert(
            "python".to_string(),
            crate::config::LanguageConfig { enabled: false },
        );
        let registry = LanguageRegistry::new(&settings).unwrap();
        assert!(registry.bundle_for(Language::Python).is_err());
        assert_eq!(
            registry.infer_language(&PathBuf::from("app.py")),
            None
        );
    }
}

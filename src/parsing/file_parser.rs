//! Per-file parsing: source bytes → `ParsedFile` → persisted table.
//!
//! A pure function of `(source, language, bundle)`: every query match is
//! dispatched to the language resolver, emitted elements are validated, and
//! invalid ones dropped with a debug log. Parse errors in the tree are
//! tolerated; error or missing capture nodes are skipped capture-by-capture.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use tree_sitter::{Parser, QueryCursor, StreamingIterator};

use super::registry::{LanguageRegistry, ParseBundle};
use super::resolver::{kind_for_capture, CaptureRef, MatchCaptures, ResolveCtx};
use super::Language;
use crate::error::{IndexError, IndexResult};
use crate::model::{
    Element, FileElementTable, Import, Package, StoredElement, StoredImport, StoredPackage,
};
use crate::project::ProjectInfo;

/// Model-level result of parsing one source file.
#[derive(Debug, Default)]
pub struct ParsedFile {
    pub path: String,
    pub language: String,
    pub package: Option<Package>,
    pub imports: Vec<Import>,
    pub elements: Vec<Element>,
}

impl ParsedFile {
    /// Flatten into the persisted table form.
    pub fn into_table(self, timestamp: i64) -> FileElementTable {
        FileElementTable {
            path: self.path,
            language: self.language,
            timestamp,
            package: self.package.as_ref().map(StoredPackage::from_package),
            imports: self.imports.iter().map(StoredImport::from_import).collect(),
            elements: self
                .elements
                .iter()
                .filter_map(StoredElement::from_element)
                .collect(),
        }
    }
}

/// Parses single files against registry bundles.
pub struct FileParser {
    registry: Arc<LanguageRegistry>,
}

impl FileParser {
    pub fn new(registry: Arc<LanguageRegistry>) -> Self {
        Self { registry }
    }

    /// Read and parse one file from disk.
    pub fn parse_path(&self, path: &Path, project: Option<&ProjectInfo>) -> IndexResult<ParsedFile> {
        let language = self
            .registry
            .infer_language(path)
            .ok_or_else(|| IndexError::UnsupportedLanguage {
                path: path.to_path_buf(),
            })?;
        let source = std::fs::read(path).map_err(|e| IndexError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.parse_source(&path.to_string_lossy(), &source, language, project)
    }

    /// Parse in-memory source.
    pub fn parse_source(
        &self,
        path: &str,
        source: &[u8],
        language: Language,
        project: Option<&ProjectInfo>,
    ) -> IndexResult<ParsedFile> {
        let bundle = self.registry.bundle_for(language)?;
        parse_with_bundle(&bundle, path, source, language, project)
    }
}

fn parse_with_bundle(
    bundle: &ParseBundle,
    path: &str,
    source: &[u8],
    language: Language,
    project: Option<&ProjectInfo>,
) -> IndexResult<ParsedFile> {
    let mut parser = Parser::new();
    parser
        .set_language(&bundle.ts_language)
        .map_err(|e| IndexError::Config {
            reason: format!("grammar rejected for {language}: {e}"),
        })?;

    let tree = parser.parse(source, None).ok_or_else(|| IndexError::Parse {
        path: path.into(),
    })?;

    let ctx = ResolveCtx {
        source,
        path,
        language,
        project,
    };

    let mut parsed = ParsedFile {
        path: path.to_string(),
        language: language.key().to_string(),
        ..ParsedFile::default()
    };

    let capture_names = bundle.query.capture_names();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&bundle.query, tree.root_node(), source);

    while let Some(m) = matches.next() {
        // Error or missing capture nodes are skipped; the rest of the match
        // still resolves.
        let captures: Vec<CaptureRef> = m
            .captures
            .iter()
            .filter(|c| !c.node.is_error() && !c.node.is_missing())
            .map(|c| CaptureRef {
                index: c.index,
                name: capture_names[c.index as usize],
                node: c.node,
            })
            .collect();
        let match_captures = MatchCaptures { captures };

        let Some(root_capture) = match_captures.root() else {
            continue;
        };
        let Some(kind) = kind_for_capture(root_capture.name) else {
            continue;
        };
        let Some(root) =
            Element::empty(kind, path, root_capture.name, root_capture.index)
        else {
            continue;
        };

        let emitted = match bundle.resolver.resolve(root, &match_captures, &ctx) {
            Ok(elements) => elements,
            Err(e) => {
                debug!(path, %language, error = %e, "resolver dropped a match");
                continue;
            }
        };

        for element in emitted {
            if !element.is_valid() {
                debug!(
                    path,
                    kind = %element.kind(),
                    "dropping invalid element"
                );
                continue;
            }
            match element {
                Element::Package(p) => {
                    if parsed.package.is_none() {
                        parsed.package = Some(p);
                    }
                }
                Element::Import(i) => {
                    let duplicate = parsed.imports.iter().any(|existing| {
                        existing.base.name == i.base.name
                            && existing.source == i.source
                            && existing.alias == i.alias
                    });
                    if !duplicate {
                        parsed.imports.push(i);
                    }
                }
                other => parsed.elements.push(other),
            }
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn parser() -> FileParser {
        FileParser::new(Arc::new(LanguageRegistry::new(&Settings::default()).unwrap()))
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let parser = parser();
        let err = parser
            .parse_path(Path::new("/tmp/notes.txt"), None)
            .unwrap_err();
        assert!(matches!(err, IndexError::UnsupportedLanguage { .. }));
    }

    #[test]
    fn broken_source_still_yields_surviving_elements() {
        let parser = parser();
        let source = b"package demo\n\nfunc ok() {}\n\nfunc broken( {\n";
        let parsed = parser
            .parse_source("/ws/demo.go", source, Language::Go, None)
            .unwrap();
        assert!(parsed.elements.iter().any(|e| e.name() == "ok"));
        assert_eq!(parsed.package.as_ref().map(|p| p.base.name.as_str()), Some("demo"));
    }

    #[test]
    fn elements_follow_match_order() {
        let parser = parser();
        let source = b"package demo\n\nfunc first() {}\nfunc second() {}\n";
        let parsed = parser
            .parse_source("/ws/demo.go", source, Language::Go, None)
            .unwrap();
        let names: Vec<&str> = parsed
            .elements
            .iter()
            .filter(|e| e.kind() == crate::types::ElementKind::Function)
            .map(|e| e.name())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}

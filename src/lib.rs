//! codegraph: cross-file code graph indexing and definition queries for
//! mixed-language repositories.
//!
//! The pipeline walks a workspace, parses each supported source file into a
//! language-neutral element table via tree-sitter capture queries, persists
//! the tables plus a symbol-name index to an embedded store, and answers
//! "which definitions are reachable from these lines" with an import-aware
//! filter.

pub mod config;
pub mod error;
pub mod indexing;
pub mod logging;
pub mod model;
pub mod parsing;
pub mod project;
pub mod query;
pub mod storage;
pub mod types;
pub mod workspace;

pub use config::Settings;
pub use error::{IndexError, IndexResult, ResolveError, StoreError};
pub use indexing::{CodeGraphIndexer, DefinitionQuery, IndexMetrics, WorkspaceSummary};
pub use model::{Element, FileElementTable, SymbolOccurrence};
pub use parsing::{FileParser, Language, LanguageRegistry};
pub use query::Definition;
pub use storage::{GraphStore, RedbGraphStore};
pub use types::{ElementKind, ProjectId, Range, Scope};

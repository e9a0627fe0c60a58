//! Error types for indexing and querying.
//!
//! Per-file failures stay local to the file (logged, counted); per-run
//! failures abort the run; queries return store errors unchanged.

use std::path::PathBuf;
use thiserror::Error;

pub type IndexResult<T> = Result<T, IndexError>;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    #[error("unsupported language for file '{path}'")]
    UnsupportedLanguage { path: PathBuf },

    #[error("no parser bundle registered for language '{language}'")]
    MissingBundle { language: String },

    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parser produced no tree for '{path}'")]
    Parse { path: PathBuf },

    #[error("workspace '{path}' is not indexed")]
    WorkspaceNotFound { path: PathBuf },

    #[error("invalid workspace path '{path}': {reason}")]
    InvalidWorkspace { path: PathBuf, reason: String },

    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("malformed query range {start_line}..{end_line}")]
    InvalidRange { start_line: u32, end_line: u32 },

    #[error("stored record under '{key}' is malformed: {reason}")]
    MalformedRecord { key: String, reason: String },
}

/// Failures of the embedded graph store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to open store at '{path}': {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("store transaction failed: {reason}")]
    Transaction { reason: String },

    #[error("store table for project '{project}' is unavailable: {reason}")]
    Table { project: String, reason: String },
}

/// Resolver-local failure. The file parser drops the affected element with a
/// debug log and continues with the rest of the match stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unsupported element kind '{kind}' for {language}")]
    Unsupported { language: String, kind: String },

    #[error("capture '{capture}' produced no usable text")]
    EmptyCapture { capture: String },

    #[error("import statement resolved to an empty specifier")]
    EmptyImport,
}

//! Workspace reading: file discovery, project grouping, per-project state.

pub mod discovery;
pub mod info;
pub mod walker;

pub use discovery::discover_projects;
pub use info::{Project, ProjectInfo};
pub use walker::SourceWalker;

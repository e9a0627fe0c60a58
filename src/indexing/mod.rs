//! Indexing: task pool, symbol analyzer, and the orchestrating facade.

pub mod analyzer;
pub mod facade;
pub mod task_pool;

pub use analyzer::SymbolIndexer;
pub use facade::{CodeGraphIndexer, DefinitionQuery, IndexMetrics, WorkspaceSummary};
pub use task_pool::{CancelToken, TaskContext, TaskPool};

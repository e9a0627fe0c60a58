//! Graph store: keyed namespaces over an embedded key-value store with
//! per-project isolation.

pub mod keys;
pub mod store;

pub use keys::{element_path_key, symbol_name_key, PATH_KEY_PREFIX, SYMBOL_KEY_PREFIX};
pub use store::{GraphStore, RedbGraphStore};

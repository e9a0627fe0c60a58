//! Symbol indexer: file tables → symbol-occurrence records.
//!
//! Keeps an insertion-ordered LRU of the hottest records and batches writes.
//! Small workspaces merge with the persisted record on cache miss; large
//! ones (above the load threshold) rebuild records purely in memory within
//! the run.

use indexmap::IndexMap;
use tracing::{debug, error};

use crate::config::IndexingConfig;
use crate::error::StoreError;
use crate::model::{FileElementTable, Occurrence, StoredElement, SymbolOccurrence};
use crate::storage::{symbol_name_key, GraphStore};
use crate::types::{ElementKind, ProjectId, PRIMITIVE_SENTINEL};

/// Promote-on-access, evict-front LRU over an insertion-ordered map.
struct OccurrenceCache {
    map: IndexMap<String, SymbolOccurrence>,
    capacity: usize,
}

impl OccurrenceCache {
    fn new(capacity: usize) -> Self {
        Self {
            map: IndexMap::new(),
            capacity: capacity.max(1),
        }
    }

    fn take(&mut self, key: &str) -> Option<SymbolOccurrence> {
        self.map.shift_remove(key)
    }

    fn put(&mut self, key: String, value: SymbolOccurrence) {
        self.map.insert(key, value);
        if self.map.len() > self.capacity {
            self.map.shift_remove_index(0);
        }
    }
}

pub struct SymbolIndexer<'s> {
    store: &'s dyn GraphStore,
    project: ProjectId,
    cache: OccurrenceCache,
    pending: IndexMap<String, SymbolOccurrence>,
    workspace_file_count: usize,
    load_threshold: usize,
    batch_size: usize,
    symbols_written: usize,
}

impl<'s> SymbolIndexer<'s> {
    pub fn new(
        store: &'s dyn GraphStore,
        project: ProjectId,
        workspace_file_count: usize,
        config: &IndexingConfig,
    ) -> Self {
        Self {
            store,
            project,
            cache: OccurrenceCache::new(config.symbol_cache_capacity),
            pending: IndexMap::new(),
            workspace_file_count,
            load_threshold: config.symbol_load_threshold,
            batch_size: config.symbol_batch_size.max(1),
            symbols_written: 0,
        }
    }

    /// Record every definition-kind element of one file table.
    pub fn index_table(&mut self, table: &FileElementTable) -> Result<(), StoreError> {
        for element in &table.elements {
            if !matches!(
                element.kind,
                ElementKind::Class | ElementKind::Interface | ElementKind::Method | ElementKind::Function
            ) {
                continue;
            }
            if element.name.is_empty() || element.name == PRIMITIVE_SENTINEL {
                continue;
            }
            self.add(table, element)?;
        }
        Ok(())
    }

    fn add(&mut self, table: &FileElementTable, element: &StoredElement) -> Result<(), StoreError> {
        let key = symbol_name_key(&table.language, &element.name);

        let mut record = if let Some(cached) = self.cache.take(&key) {
            cached
        } else if let Some(pending) = self.pending.get(&key) {
            pending.clone()
        } else if self.workspace_file_count <= self.load_threshold {
            self.load_existing(&key, &element.name, &table.language)
        } else {
            SymbolOccurrence::new(&element.name, &table.language)
        };

        // `push` prunes the equal (path, range) entry first, so re-indexing
        // the same file never duplicates occurrences.
        record.push(Occurrence {
            path: table.path.clone(),
            range: element.range,
            kind: element.kind,
        });

        self.pending.insert(key.clone(), record.clone());
        self.cache.put(key, record);

        if self.pending.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    fn load_existing(&self, key: &str, name: &str, language: &str) -> SymbolOccurrence {
        match self.store.get(self.project, key) {
            Ok(Some(bytes)) => match SymbolOccurrence::from_bytes(&bytes) {
                Ok(record) => record,
                Err(e) => {
                    error!(key, error = %e, "malformed symbol record, starting fresh");
                    SymbolOccurrence::new(name, language)
                }
            },
            Ok(None) => SymbolOccurrence::new(name, language),
            Err(e) => {
                debug!(key, error = %e, "symbol load failed, starting fresh");
                SymbolOccurrence::new(name, language)
            }
        }
    }

    pub fn flush(&mut self) -> Result<(), StoreError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let mut items = Vec::with_capacity(self.pending.len());
        for (key, record) in self.pending.drain(..) {
            match record.to_bytes() {
                Ok(bytes) => items.push((key, bytes)),
                Err(e) => error!(key = %key, error = %e, "symbol record failed to serialize"),
            }
        }
        self.symbols_written += items.len();
        self.store.batch_save(self.project, &items)
    }

    /// Flush the tail batch and report how many records were written.
    pub fn finish(mut self) -> Result<usize, StoreError> {
        self.flush()?;
        Ok(self.symbols_written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StoredElement;
    use crate::storage::RedbGraphStore;
    use crate::types::Range;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn table_with(path: &str, names: &[(&str, ElementKind, u32)]) -> FileElementTable {
        FileElementTable {
            path: path.to_string(),
            language: "go".to_string(),
            timestamp: 0,
            package: None,
            imports: vec![],
            elements: names
                .iter()
                .map(|(name, kind, row)| StoredElement {
                    name: name.to_string(),
                    kind: *kind,
                    range: Range::new(*row, 0, *row, 10),
                    is_definition: kind.is_definition(),
                    extra: BTreeMap::new(),
                })
                .collect(),
        }
    }

    fn setup() -> (TempDir, RedbGraphStore, ProjectId) {
        let dir = TempDir::new().unwrap();
        let store = RedbGraphStore::open(dir.path()).unwrap();
        let project = ProjectId::from_root(&PathBuf::from("/ws/p"));
        (dir, store, project)
    }

    #[test]
    fn definitions_become_symbol_records() {
        let (_dir, store, project) = setup();
        let mut indexer = SymbolIndexer::new(&store, project, 10, &IndexingConfig::default());
        indexer
            .index_table(&table_with(
                "/ws/p/a.go",
                &[
                    ("Run", ElementKind::Function, 3),
                    ("Server", ElementKind::Class, 10),
                    ("helper", ElementKind::Call, 20),
                ],
            ))
            .unwrap();
        let written = indexer.finish().unwrap();
        assert_eq!(written, 2);

        let bytes = store
            .get(project, &symbol_name_key("go", "Run"))
            .unwrap()
            .unwrap();
        let record = SymbolOccurrence::from_bytes(&bytes).unwrap();
        assert_eq!(record.occurrences.len(), 1);
        assert_eq!(record.occurrences[0].path, "/ws/p/a.go");

        // Calls are not definition sites.
        assert!(store
            .get(project, &symbol_name_key("go", "helper"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn reindex_does_not_duplicate_occurrences() {
        let (_dir, store, project) = setup();
        let table = table_with("/ws/p/a.go", &[("Run", ElementKind::Function, 3)]);

        for _ in 0..2 {
            let mut indexer = SymbolIndexer::new(&store, project, 10, &IndexingConfig::default());
            indexer.index_table(&table).unwrap();
            indexer.finish().unwrap();
        }

        let bytes = store
            .get(project, &symbol_name_key("go", "Run"))
            .unwrap()
            .unwrap();
        let record = SymbolOccurrence::from_bytes(&bytes).unwrap();
        assert_eq!(record.occurrences.len(), 1);
    }

    #[test]
    fn same_name_across_files_merges() {
        let (_dir, store, project) = setup();
        let mut indexer = SymbolIndexer::new(&store, project, 10, &IndexingConfig::default());
        indexer
            .index_table(&table_with("/ws/p/a.go", &[("Run", ElementKind::Function, 3)]))
            .unwrap();
        indexer
            .index_table(&table_with("/ws/p/b.go", &[("Run", ElementKind::Method, 8)]))
            .unwrap();
        indexer.finish().unwrap();

        let bytes = store
            .get(project, &symbol_name_key("go", "Run"))
            .unwrap()
            .unwrap();
        let record = SymbolOccurrence::from_bytes(&bytes).unwrap();
        assert_eq!(record.occurrences.len(), 2);
    }

    #[test]
    fn large_workspaces_skip_the_merge_load() {
        let (_dir, store, project) = setup();

        // Seed a persisted record.
        let mut first = SymbolIndexer::new(&store, project, 10, &IndexingConfig::default());
        first
            .index_table(&table_with("/ws/p/old.go", &[("Run", ElementKind::Function, 1)]))
            .unwrap();
        first.finish().unwrap();

        // Above the threshold the old occurrence is not merged in.
        let mut config = IndexingConfig::default();
        config.symbol_load_threshold = 0;
        let mut second = SymbolIndexer::new(&store, project, 10, &config);
        second
            .index_table(&table_with("/ws/p/new.go", &[("Run", ElementKind::Function, 2)]))
            .unwrap();
        second.finish().unwrap();

        let bytes = store
            .get(project, &symbol_name_key("go", "Run"))
            .unwrap()
            .unwrap();
        let record = SymbolOccurrence::from_bytes(&bytes).unwrap();
        assert_eq!(record.occurrences.len(), 1);
        assert_eq!(record.occurrences[0].path, "/ws/p/new.go");
    }

    #[test]
    fn small_batches_flush_incrementally() {
        let (_dir, store, project) = setup();
        let mut config = IndexingConfig::default();
        config.symbol_batch_size = 1;
        let mut indexer = SymbolIndexer::new(&store, project, 10, &config);
        indexer
            .index_table(&table_with(
                "/ws/p/a.go",
                &[("A", ElementKind::Function, 1), ("B", ElementKind::Function, 2)],
            ))
            .unwrap();
        // Both already flushed by the batch threshold.
        assert!(store
            .get(project, &symbol_name_key("go", "A"))
            .unwrap()
            .is_some());
        assert!(store
            .get(project, &symbol_name_key("go", "B"))
            .unwrap()
            .is_some());
        indexer.finish().unwrap();
    }
}

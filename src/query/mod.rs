//! Definition queries over the persisted graph.
//!
//! Candidates are the call and reference elements of the target file whose
//! range touches the queried lines. Each candidate is joined against the
//! symbol-name index and filtered by the import policy: same file, then same
//! parent directory, then import-path match — the first rule that matches an
//! occurrence wins for that candidate.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{IndexError, IndexResult};
use crate::model::{FileElementTable, SymbolOccurrence};
use crate::storage::{element_path_key, symbol_name_key, GraphStore};
use crate::types::{ElementKind, ProjectId, Range};

/// One definition site answering a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub path: String,
    pub range: Range,
    pub kind: ElementKind,
}

pub struct QueryEngine<'s> {
    store: &'s dyn GraphStore,
}

impl<'s> QueryEngine<'s> {
    pub fn new(store: &'s dyn GraphStore) -> Self {
        Self { store }
    }

    /// Definitions reachable from `file` lines `start_line..=end_line`
    /// (1-based inclusive). An unindexed file yields an empty list, not an
    /// error.
    pub fn definitions(
        &self,
        project: ProjectId,
        language: &str,
        file: &str,
        start_line: u32,
        end_line: u32,
    ) -> IndexResult<Vec<Definition>> {
        if start_line == 0 || end_line < start_line {
            return Err(IndexError::InvalidRange {
                start_line,
                end_line,
            });
        }
        let key = element_path_key(language, file);
        let Some(bytes) = self.store.get(project, &key)? else {
            return Ok(Vec::new());
        };
        let table = FileElementTable::from_bytes(&bytes).map_err(|e| {
            IndexError::MalformedRecord {
                key,
                reason: e.to_string(),
            }
        })?;

        let (start_row, end_row) = (start_line - 1, end_line - 1);
        let mut out: Vec<Definition> = Vec::new();

        for candidate in table.elements.iter().filter(|e| {
            matches!(e.kind, ElementKind::Call | ElementKind::Reference)
                && e.range.intersects_rows(start_row, end_row)
        }) {
            let symbol_key = symbol_name_key(&table.language, &candidate.name);
            let Some(bytes) = self.store.get(project, &symbol_key)? else {
                continue;
            };
            let record = match SymbolOccurrence::from_bytes(&bytes) {
                Ok(record) => record,
                Err(e) => {
                    error!(key = %symbol_key, error = %e, "malformed symbol record");
                    continue;
                }
            };
            if let Some(definition) = filter_by_imports(&table, &record) {
                if !out.contains(&definition) {
                    out.push(definition);
                }
            }
        }

        Ok(out)
    }
}

/// Import-filter policy. Rules are ordered; the first occurrence satisfying
/// the highest-priority rule is the answer for this candidate.
pub fn filter_by_imports(
    table: &FileElementTable,
    record: &SymbolOccurrence,
) -> Option<Definition> {
    // Rule a: definition in the query file itself.
    if let Some(occurrence) = record.occurrences.iter().find(|o| o.path == table.path) {
        return Some(to_definition(&record.name, occurrence));
    }

    // Rule b: definition next to the query file (same package).
    let parent = Path::new(&table.path).parent();
    if let Some(occurrence) = record
        .occurrences
        .iter()
        .find(|o| Path::new(&o.path).parent() == parent)
    {
        return Some(to_definition(&record.name, occurrence));
    }

    // Rule c: an import specifier or name appears in the occurrence path.
    if let Some(occurrence) = record.occurrences.iter().find(|o| {
        table.imports.iter().any(|import| {
            (!import.source.is_empty() && o.path.contains(&import.source))
                || (!import.name.is_empty() && o.path.contains(&import.name))
        })
    }) {
        return Some(to_definition(&record.name, occurrence));
    }

    None
}

fn to_definition(name: &str, occurrence: &crate::model::Occurrence) -> Definition {
    Definition {
        name: name.to_string(),
        path: occurrence.path.clone(),
        range: occurrence.range,
        kind: occurrence.kind,
    }
}

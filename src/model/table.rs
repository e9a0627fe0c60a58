//! Persisted table forms.
//!
//! One [`FileElementTable`] per source file under its `@path:` key, one
//! [`SymbolOccurrence`] per `(language, name)` pair under its `@sym:` key.
//! Both are serde-JSON encoded; round-tripping them must be lossless.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Element, Import, Package};
use crate::types::{ElementKind, Range};

pub const EXTRA_PARAMETERS: &str = "parameters";
pub const EXTRA_RETURN_TYPE: &str = "returnType";
pub const EXTRA_SUPER_CLASSES: &str = "superClasses";
pub const EXTRA_SUPER_INTERFACES: &str = "superInterfaces";

/// Flattened element entry as persisted inside a file table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredElement {
    pub name: String,
    pub kind: ElementKind,
    pub range: Range,
    #[serde(rename = "isDefinition")]
    pub is_definition: bool,
    /// Optional auxiliary fields keyed by
    /// `parameters | returnType | superClasses | superInterfaces`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl StoredElement {
    /// Flatten a model element. Imports and packages are stored in their own
    /// table slots, not as element entries.
    pub fn from_element(element: &Element) -> Option<Self> {
        let kind = element.kind();
        if matches!(kind, ElementKind::Import | ElementKind::Package) {
            return None;
        }

        let mut extra = BTreeMap::new();
        match element {
            Element::Function(f) => {
                push_extra(&mut extra, EXTRA_PARAMETERS, &f.decl.parameters);
                push_extra(&mut extra, EXTRA_RETURN_TYPE, &f.decl.return_types);
            }
            Element::Method(m) => {
                push_extra(&mut extra, EXTRA_PARAMETERS, &m.decl.parameters);
                push_extra(&mut extra, EXTRA_RETURN_TYPE, &m.decl.return_types);
            }
            Element::Class(c) => {
                push_extra(&mut extra, EXTRA_SUPER_CLASSES, &c.super_classes);
                push_extra(&mut extra, EXTRA_SUPER_INTERFACES, &c.super_interfaces);
            }
            Element::Interface(i) => {
                push_extra(&mut extra, EXTRA_SUPER_INTERFACES, &i.super_interfaces);
            }
            Element::Call(c) => {
                push_extra(&mut extra, EXTRA_PARAMETERS, &c.parameters);
            }
            _ => {}
        }

        Some(Self {
            name: element.name().to_string(),
            kind,
            range: element.range(),
            is_definition: kind.is_definition(),
            extra,
        })
    }
}

fn push_extra<T: Serialize>(extra: &mut BTreeMap<String, serde_json::Value>, key: &str, value: &[T]) {
    if value.is_empty() {
        return;
    }
    if let Ok(v) = serde_json::to_value(value) {
        extra.insert(key.to_string(), v);
    }
}

/// Import entry as persisted inside a file table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredImport {
    pub name: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alias: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_paths: Vec<String>,
    pub range: Range,
}

impl StoredImport {
    pub fn from_import(import: &Import) -> Self {
        Self {
            name: import.base.name.clone(),
            source: import.source.clone(),
            alias: import.alias.clone(),
            file_paths: import.file_paths.clone(),
            range: import.base.range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPackage {
    pub name: String,
    pub range: Range,
}

impl StoredPackage {
    pub fn from_package(package: &Package) -> Self {
        Self {
            name: package.base.name.clone(),
            range: package.base.range,
        }
    }
}

/// Everything extracted from one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileElementTable {
    pub path: String,
    pub language: String,
    /// Epoch milliseconds at index time.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<StoredPackage>,
    #[serde(default)]
    pub imports: Vec<StoredImport>,
    #[serde(default)]
    pub elements: Vec<StoredElement>,
}

impl FileElementTable {
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// One definition site of a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub path: String,
    pub range: Range,
    pub kind: ElementKind,
}

/// Every place a `(language, name)` pair is defined within a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolOccurrence {
    pub name: String,
    pub language: String,
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
}

impl SymbolOccurrence {
    pub fn new(name: &str, language: &str) -> Self {
        Self {
            name: name.to_string(),
            language: language.to_string(),
            occurrences: Vec::new(),
        }
    }

    /// Append an occurrence, keeping the list deduplicated on `(path, range)`.
    pub fn push(&mut self, occurrence: Occurrence) {
        self.occurrences
            .retain(|o| !(o.path == occurrence.path && o.range == occurrence.range));
        self.occurrences.push(occurrence);
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

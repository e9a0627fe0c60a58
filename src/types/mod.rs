//! Core value types shared across the indexing pipeline.
//!
//! Everything here is cheap to copy or clone and carries no behavior beyond
//! construction, comparison, and (de)serialization into the persisted wire
//! format.

use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Marks a type position that resolved to a language primitive.
///
/// The symbol indexer skips occurrences of this sentinel, so primitives
/// never pollute the symbol-name index.
pub const PRIMITIVE_SENTINEL: &str = "«primitive»";

/// A rectangle of source text in 0-based row/column coordinates.
///
/// Serialized as a 4-element array `[start_row, start_col, end_row, end_col]`
/// so stored ranges always have exactly four entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "[u32; 4]", from = "[u32; 4]")]
pub struct Range {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl Range {
    pub fn new(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        Self {
            start_row,
            start_col,
            end_row,
            end_col,
        }
    }

    /// True when this range touches any of the 0-based rows in
    /// `start_row..=end_row`.
    pub fn intersects_rows(&self, start_row: u32, end_row: u32) -> bool {
        self.start_row <= end_row && self.end_row >= start_row
    }
}

impl From<Range> for [u32; 4] {
    fn from(r: Range) -> Self {
        [r.start_row, r.start_col, r.end_row, r.end_col]
    }
}

impl From<[u32; 4]> for Range {
    fn from(v: [u32; 4]) -> Self {
        Self {
            start_row: v[0],
            start_col: v[1],
            end_row: v[2],
            end_col: v[3],
        }
    }
}

/// The closed set of element kinds.
///
/// The discriminants are the stable storage tags; they must never be
/// renumbered once data has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ElementKind {
    #[default]
    Undefined = 0,
    Function = 1,
    Method = 2,
    Call = 3,
    Reference = 4,
    Class = 5,
    Interface = 6,
    Variable = 7,
    Import = 8,
    Package = 9,
}

impl ElementKind {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Undefined),
            1 => Some(Self::Function),
            2 => Some(Self::Method),
            3 => Some(Self::Call),
            4 => Some(Self::Reference),
            5 => Some(Self::Class),
            6 => Some(Self::Interface),
            7 => Some(Self::Variable),
            8 => Some(Self::Import),
            9 => Some(Self::Package),
            _ => None,
        }
    }

    /// Definition kinds carry `isDefinition = true` in storage.
    pub fn is_definition(self) -> bool {
        matches!(
            self,
            Self::Class | Self::Interface | Self::Method | Self::Function | Self::Variable
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Function => "function",
            Self::Method => "method",
            Self::Call => "call",
            Self::Reference => "reference",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Variable => "variable",
            Self::Import => "import",
            Self::Package => "package",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ElementKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.tag())
    }
}

impl<'de> Deserialize<'de> for ElementKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = u8::deserialize(deserializer)?;
        Self::from_tag(tag)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown element kind tag {tag}")))
    }
}

/// Visibility tier of an element, from narrowest to widest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Block,
    Function,
    Class,
    #[default]
    File,
    Package,
    Project,
}

/// Stable identifier of one indexing unit (a project root).
///
/// Derived deterministically from the canonical root path so re-indexing the
/// same tree always lands in the same store namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(Uuid);

impl ProjectId {
    pub fn from_root(root: &Path) -> Self {
        Self(Uuid::new_v5(
            &Uuid::NAMESPACE_URL,
            root.to_string_lossy().as_bytes(),
        ))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

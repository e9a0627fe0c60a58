//! The language-neutral element model.
//!
//! Resolvers turn capture matches into values of these types; the file
//! parser collects them; the storage layer flattens them into the persisted
//! table forms in [`table`].

pub mod table;

pub use table::{FileElementTable, Occurrence, StoredElement, StoredImport, StoredPackage, SymbolOccurrence};

use crate::types::{ElementKind, Range, Scope};

/// Fields shared by every element kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseElement {
    pub name: String,
    pub path: String,
    /// Root capture name this element was built from, e.g. `definition.method`.
    pub capture: String,
    pub scope: Scope,
    pub range: Range,
    /// Capture index of the match's root capture, so downstream code can
    /// identify the root element among secondaries.
    pub root_capture_index: u32,
}

/// A function or method parameter. Types are extracted identifier names with
/// generic arguments flattened; primitives collapse to the sentinel.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// A callable signature: shared by functions, methods, and interface members.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Declaration {
    pub modifier: String,
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub return_types: Vec<String>,
}

/// A named member of a class or struct.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Field {
    pub modifier: String,
    pub name: String,
    pub field_type: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Import {
    pub base: BaseElement,
    /// Raw module/file specifier as written in source.
    pub source: String,
    pub alias: String,
    /// Workspace-relative files the specifier resolves to; empty for system
    /// headers and third-party modules.
    pub file_paths: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Package {
    pub base: BaseElement,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Function {
    pub base: BaseElement,
    pub decl: Declaration,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Method {
    pub base: BaseElement,
    pub decl: Declaration,
    /// Qualified name of the enclosing type, empty when none exists.
    pub owner: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Class {
    pub base: BaseElement,
    pub super_classes: Vec<String>,
    pub super_interfaces: Vec<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<Declaration>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interface {
    pub base: BaseElement,
    pub super_interfaces: Vec<String>,
    pub methods: Vec<Declaration>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variable {
    pub base: BaseElement,
    /// Custom type names extracted from the declared type; a single
    /// primitive sentinel entry means "not worth indexing".
    pub variable_type: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Call {
    pub base: BaseElement,
    /// Receiver expression flattened to a dotted identifier path.
    pub owner: String,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reference {
    pub base: BaseElement,
    /// Namespace or receiver, when known.
    pub owner: String,
}

/// Tagged variant over all element kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Import(Import),
    Package(Package),
    Function(Function),
    Method(Method),
    Class(Class),
    Interface(Interface),
    Variable(Variable),
    Call(Call),
    Reference(Reference),
}

impl Element {
    /// Construct a zero-initialized element of `kind` for a capture match.
    pub fn empty(kind: ElementKind, path: &str, capture: &str, root_capture_index: u32) -> Option<Self> {
        let base = BaseElement {
            path: path.to_string(),
            capture: capture.to_string(),
            root_capture_index,
            ..BaseElement::default()
        };
        let element = match kind {
            ElementKind::Import => Self::Import(Import {
                base,
                ..Import::default()
            }),
            ElementKind::Package => Self::Package(Package { base }),
            ElementKind::Function => Self::Function(Function {
                base,
                ..Function::default()
            }),
            ElementKind::Method => Self::Method(Method {
                base,
                ..Method::default()
            }),
            ElementKind::Class => Self::Class(Class {
                base,
                ..Class::default()
            }),
            ElementKind::Interface => Self::Interface(Interface {
                base,
                ..Interface::default()
            }),
            ElementKind::Variable => Self::Variable(Variable {
                base,
                ..Variable::default()
            }),
            ElementKind::Call => Self::Call(Call {
                base,
                ..Call::default()
            }),
            ElementKind::Reference => Self::Reference(Reference {
                base,
                ..Reference::default()
            }),
            ElementKind::Undefined => return None,
        };
        Some(element)
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Import(_) => ElementKind::Import,
            Self::Package(_) => ElementKind::Package,
            Self::Function(_) => ElementKind::Function,
            Self::Method(_) => ElementKind::Method,
            Self::Class(_) => ElementKind::Class,
            Self::Interface(_) => ElementKind::Interface,
            Self::Variable(_) => ElementKind::Variable,
            Self::Call(_) => ElementKind::Call,
            Self::Reference(_) => ElementKind::Reference,
        }
    }

    pub fn base(&self) -> &BaseElement {
        match self {
            Self::Import(e) => &e.base,
            Self::Package(e) => &e.base,
            Self::Function(e) => &e.base,
            Self::Method(e) => &e.base,
            Self::Class(e) => &e.base,
            Self::Interface(e) => &e.base,
            Self::Variable(e) => &e.base,
            Self::Call(e) => &e.base,
            Self::Reference(e) => &e.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut BaseElement {
        match self {
            Self::Import(e) => &mut e.base,
            Self::Package(e) => &mut e.base,
            Self::Function(e) => &mut e.base,
            Self::Method(e) => &mut e.base,
            Self::Class(e) => &mut e.base,
            Self::Interface(e) => &mut e.base,
            Self::Variable(e) => &mut e.base,
            Self::Call(e) => &mut e.base,
            Self::Reference(e) => &mut e.base,
        }
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn range(&self) -> Range {
        self.base().range
    }

    pub fn scope(&self) -> Scope {
        self.base().scope
    }

    /// Elements that fail this check are dropped by the file parser.
    pub fn is_valid(&self) -> bool {
        let base = self.base();
        !base.name.is_empty() && !base.path.is_empty()
    }
}

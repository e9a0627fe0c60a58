//! Multi-language element extraction.
//!
//! The registry hands out one read-only [`ParseBundle`] per language (grammar
//! plus compiled capture query plus resolver); the file parser runs the query
//! over a source file and dispatches every match to the language's resolver,
//! which emits language-neutral elements.

pub mod c;
pub mod file_parser;
pub mod go;
pub mod java;
pub mod javascript;
pub mod language;
pub mod node_ext;
pub mod python;
pub mod queries;
pub mod registry;
pub mod resolver;
pub mod typescript;

pub use file_parser::{FileParser, ParsedFile};
pub use language::Language;
pub use registry::{LanguageRegistry, ParseBundle};
pub use resolver::{CaptureRef, ElementResolver, MatchCaptures, ResolveCtx};

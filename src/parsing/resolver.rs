//! Resolver contract and shared helpers.
//!
//! A resolver turns one capture match into one or more elements. The file
//! parser constructs the zero-initialized root element from the match's root
//! capture; the resolver fills it in and may emit secondary elements
//! (implicit imports, references implied by type usage, destructured
//! variables).

use crate::error::ResolveError;
use crate::model::Element;
use crate::parsing::node_ext::NodeExt;
use crate::parsing::Language;
use crate::project::ProjectInfo;
use crate::types::{ElementKind, PRIMITIVE_SENTINEL};
use tree_sitter::Node;

/// The fixed capture vocabulary. Root names map to element kinds; suffixed
/// names (`.name`, `.source`, `.parameters`, ...) mark sub-captures.
pub mod captures {
    pub const DEF_FUNCTION: &str = "definition.function";
    pub const DEF_METHOD: &str = "definition.method";
    pub const DEF_CLASS: &str = "definition.class";
    pub const DEF_INTERFACE: &str = "definition.interface";
    pub const DEF_VARIABLE: &str = "definition.variable";
    pub const DEF_IMPORT: &str = "definition.import";
    pub const DEF_PACKAGE: &str = "definition.package";
    pub const CALL_FUNCTION: &str = "call.function";
    pub const CALL_METHOD: &str = "call.method";
    pub const REFERENCE: &str = "reference";

    pub const CALL_NAME: &str = "call.name";
    pub const CALL_OWNER: &str = "call.owner";
    pub const CALL_ARGUMENTS: &str = "call.arguments";
}

/// Map a root capture name to its element kind. Unrecognized names return
/// `None` and the match is skipped.
pub fn kind_for_capture(name: &str) -> Option<ElementKind> {
    match name {
        captures::DEF_FUNCTION => Some(ElementKind::Function),
        captures::DEF_METHOD => Some(ElementKind::Method),
        captures::DEF_CLASS => Some(ElementKind::Class),
        captures::DEF_INTERFACE => Some(ElementKind::Interface),
        captures::DEF_VARIABLE => Some(ElementKind::Variable),
        captures::DEF_IMPORT => Some(ElementKind::Import),
        captures::DEF_PACKAGE => Some(ElementKind::Package),
        captures::CALL_FUNCTION | captures::CALL_METHOD => Some(ElementKind::Call),
        captures::REFERENCE => Some(ElementKind::Reference),
        _ => None,
    }
}

/// One capture of a match, with its resolved name.
#[derive(Clone, Copy)]
pub struct CaptureRef<'t> {
    pub index: u32,
    pub name: &'t str,
    pub node: Node<'t>,
}

/// All captures of one query match, in capture order.
pub struct MatchCaptures<'t> {
    pub captures: Vec<CaptureRef<'t>>,
}

impl<'t> MatchCaptures<'t> {
    /// The root capture: the first whose name maps to an element kind.
    pub fn root(&self) -> Option<&CaptureRef<'t>> {
        self.captures
            .iter()
            .find(|c| kind_for_capture(c.name).is_some())
    }

    pub fn find(&self, name: &str) -> Option<&CaptureRef<'t>> {
        self.captures.iter().find(|c| c.name == name)
    }

    pub fn find_node(&self, name: &str) -> Option<Node<'t>> {
        self.find(name).map(|c| c.node)
    }

    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CaptureRef<'t>> + 'a {
        self.captures.iter().filter(move |c| c.name == name)
    }
}

/// Read-only context for one resolve call.
pub struct ResolveCtx<'a> {
    pub source: &'a [u8],
    pub path: &'a str,
    pub language: Language,
    pub project: Option<&'a ProjectInfo>,
}

impl ResolveCtx<'_> {
    pub fn text(&self, node: Node) -> &str {
        node.text(self.source)
    }
}

/// Per-language resolver, polymorphic over the root element kind.
pub trait ElementResolver: Send + Sync {
    fn resolve(
        &self,
        root: Element,
        m: &MatchCaptures,
        ctx: &ResolveCtx,
    ) -> Result<Vec<Element>, ResolveError>;
}

/// Set the root element's range from the root capture and its name from the
/// matching `.name` sub-capture, if present.
pub fn update_root_element(root: &mut Element, m: &MatchCaptures, ctx: &ResolveCtx) {
    let Some(root_capture) = m.root() else {
        return;
    };
    let root_name = root_capture.name;
    {
        let base = root.base_mut();
        base.range = root_capture.node.to_range();
    }
    let name_capture = format!("{root_name}.name");
    let name_ref = m.find(&name_capture).or_else(|| {
        // Call roots share one name capture across both call kinds.
        root_name
            .starts_with("call.")
            .then(|| m.find(captures::CALL_NAME))
            .flatten()
    });
    if let Some(c) = name_ref {
        let cleaned = clean_name(ctx.text(c.node));
        if !cleaned.is_empty() {
            root.base_mut().name = cleaned;
        }
    }
}

/// Trim whitespace and surrounding quote characters. Angle brackets are
/// preserved so system headers keep their `<...>` form.
pub fn clean_name(raw: &str) -> String {
    raw.trim().trim_matches(['"', '\'', '`']).trim().to_string()
}

/// First token of `text` that appears in `keywords`, or empty.
pub fn extract_modifier(text: &str, keywords: &[&str]) -> String {
    for token in text.split(|c: char| c.is_whitespace() || c == '(') {
        if keywords.contains(&token) {
            return token.to_string();
        }
    }
    String::new()
}

/// Recursively collect named type identifiers under `node`, skipping
/// punctuation, generics markers, and primitive keywords.
///
/// Returns the custom types found; when the type position holds only
/// primitives, returns the primitive sentinel alone.
pub fn extract_custom_types(
    node: Node,
    ctx: &ResolveCtx,
    id_kinds: &[&str],
    primitives: &[&str],
) -> Vec<String> {
    let mut out = Vec::new();
    collect_type_identifiers(node, ctx, id_kinds, primitives, &mut out);
    if out.is_empty() {
        vec![PRIMITIVE_SENTINEL.to_string()]
    } else {
        out
    }
}

fn collect_type_identifiers(
    node: Node,
    ctx: &ResolveCtx,
    id_kinds: &[&str],
    primitives: &[&str],
    out: &mut Vec<String>,
) {
    if id_kinds.contains(&node.kind()) {
        let text = ctx.text(node).trim().to_string();
        if !text.is_empty() && !primitives.contains(&text.as_str()) && !out.contains(&text) {
            out.push(text);
        }
        return;
    }
    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i) {
            collect_type_identifiers(child, ctx, id_kinds, primitives, out);
        }
    }
}

/// Walk `parent()` links to the nearest enclosing type-like node and return
/// its declared name.
pub fn find_method_owner(
    node: Node,
    ctx: &ResolveCtx,
    container_kinds: &[&str],
) -> Option<String> {
    let container = node.ancestor_of_kind(container_kinds)?;
    let name_node = container.child_by_field_name("name")?;
    let name = ctx.text(name_node).trim().to_string();
    if name.is_empty() { None } else { Some(name) }
}

/// Split a receiver/owner expression into `(owner_prefix, last_segment)` on
/// the final `.`, e.g. `A.B.C` → `("A.B", "C")`.
pub fn split_owner_chain(qualified: &str) -> (String, String) {
    match qualified.rfind('.') {
        Some(pos) => (
            qualified[..pos].to_string(),
            qualified[pos + 1..].to_string(),
        ),
        None => (String::new(), qualified.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_kind_mapping() {
        assert_eq!(
            kind_for_capture("definition.function"),
            Some(ElementKind::Function)
        );
        assert_eq!(kind_for_capture("call.method"), Some(ElementKind::Call));
        assert_eq!(kind_for_capture("reference"), Some(ElementKind::Reference));
        assert_eq!(kind_for_capture("definition.function.name"), None);
        assert_eq!(kind_for_capture("call.arguments"), None);
    }

    #[test]
    fn clean_name_strips_quotes_not_brackets() {
        assert_eq!(clean_name("  \"fs\"  "), "fs");
        assert_eq!(clean_name("'react'"), "react");
        assert_eq!(clean_name("<stdio.h>"), "<stdio.h>");
        assert_eq!(clean_name("plain"), "plain");
    }

    #[test]
    fn modifier_first_match_wins() {
        let keywords = ["public", "private", "static"];
        assert_eq!(
            extract_modifier("public static int x() {}", &keywords),
            "public"
        );
        assert_eq!(
            extract_modifier("static private int y;", &keywords),
            "static"
        );
        assert_eq!(extract_modifier("final int z;", &keywords), "");
    }

    #[test]
    fn owner_chain_split() {
        assert_eq!(
            split_owner_chain("A.B.C"),
            ("A.B".to_string(), "C".to_string())
        );
        assert_eq!(split_owner_chain("C"), (String::new(), "C".to_string()));
    }
}

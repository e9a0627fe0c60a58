//! TypeScript resolver: wraps the JavaScript resolver and layers type
//! annotations on top.
//!
//! Object-type annotations are split textually on `;` into property → type
//! pairs; nested object types are not recursed into.

use tree_sitter::Node;

use super::javascript::{arrow_parameters, resolve_js_kind};
use super::node_ext::NodeExt;
use super::resolver::{update_root_element, ElementResolver, MatchCaptures, ResolveCtx};
use crate::error::ResolveError;
use crate::model::{BaseElement, Declaration, Element, Reference};
use crate::types::{ElementKind, Scope, PRIMITIVE_SENTINEL};

const TS_PRIMITIVES: [&str; 13] = [
    "string", "number", "boolean", "any", "unknown", "never", "void", "null", "undefined",
    "object", "symbol", "bigint", "true",
];

/// Built-in generic wrappers that carry no symbol of their own.
const TS_BUILTIN_WRAPPERS: [&str; 8] = [
    "Array", "Promise", "Record", "Partial", "Readonly", "Required", "Map", "Set",
];

pub fn is_ts_primitive(name: &str) -> bool {
    TS_PRIMITIVES.contains(&name)
}

/// Identifier tokens of a type expression, primitives collapsed to the
/// sentinel. Unions, arrays, and generic arguments are flattened.
pub fn ts_type_names(text: &str) -> Vec<String> {
    let cleaned = text.trim().trim_start_matches(':').trim();
    let mut out = Vec::new();
    let mut current = String::new();
    for c in cleaned.chars() {
        if c.is_alphanumeric() || c == '_' || c == '$' {
            current.push(c);
        } else {
            flush_type_token(&mut current, &mut out);
        }
    }
    flush_type_token(&mut current, &mut out);
    if out.is_empty() {
        vec![PRIMITIVE_SENTINEL.to_string()]
    } else {
        out
    }
}

fn flush_type_token(current: &mut String, out: &mut Vec<String>) {
    if current.is_empty() {
        return;
    }
    let token = std::mem::take(current);
    if !is_ts_primitive(&token)
        && !TS_BUILTIN_WRAPPERS.contains(&token.as_str())
        && !token.chars().next().is_some_and(|c| c.is_ascii_digit())
        && !out.contains(&token)
    {
        out.push(token);
    }
}

pub struct TypeScriptResolver;

impl TypeScriptResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TypeScriptResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementResolver for TypeScriptResolver {
    fn resolve(
        &self,
        mut root: Element,
        m: &MatchCaptures,
        ctx: &ResolveCtx,
    ) -> Result<Vec<Element>, ResolveError> {
        update_root_element(&mut root, m, ctx);
        match root.kind() {
            ElementKind::Interface => resolve_interface(root, m, ctx),
            ElementKind::Variable => resolve_typed_variable(root, m, ctx),
            _ => resolve_js_kind(root, m, ctx),
        }
    }
}

fn resolve_interface(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Interface(mut interface) = root else {
        return Ok(vec![root]);
    };
    interface.base.scope = Scope::File;
    let mut secondary = Vec::new();

    let Some(root_node) = m.root().map(|c| c.node) else {
        return Ok(vec![Element::Interface(interface)]);
    };

    for i in 0..root_node.named_child_count() {
        let Some(child) = root_node.named_child(i) else {
            continue;
        };
        if child.kind() == "extends_type_clause" {
            for name in ts_type_names(ctx.text(child).trim_start_matches("extends")) {
                if name == PRIMITIVE_SENTINEL {
                    continue;
                }
                interface.super_interfaces.push(name.clone());
                secondary.push(Element::Reference(Reference {
                    base: BaseElement {
                        name,
                        scope: Scope::File,
                        range: child.to_range(),
                        ..interface.base.clone()
                    },
                    owner: String::new(),
                }));
            }
        }
    }

    if let Some(body) = root_node.child_by_field_name("body") {
        for i in 0..body.named_child_count() {
            let Some(member) = body.named_child(i) else {
                continue;
            };
            if member.kind() != "method_signature" {
                continue;
            }
            let name = member
                .child_by_field_name("name")
                .map(|n| ctx.text(n).to_string())
                .unwrap_or_default();
            if name.is_empty() {
                continue;
            }
            interface.methods.push(Declaration {
                modifier: String::new(),
                name,
                parameters: member
                    .child_by_field_name("parameters")
                    .map(|n| super::javascript::parse_parameters(n, ctx))
                    .unwrap_or_default(),
                return_types: member
                    .child_by_field_name("return_type")
                    .map(|n| ts_type_names(ctx.text(n)))
                    .unwrap_or_default(),
            });
        }
    }

    let mut out = vec![Element::Interface(interface)];
    out.append(&mut secondary);
    Ok(out)
}

fn resolve_typed_variable(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let root_node = m.root().map(|c| c.node);
    let mut elements = resolve_js_kind(root, m, ctx)?;
    let Some(declarator) = root_node else {
        return Ok(elements);
    };

    // Arrow functions promoted by the JavaScript pass pick up their typed
    // return annotation here.
    if let Some(value) = declarator.child_by_field_name("value") {
        if value.kind() == "arrow_function" {
            for element in &mut elements {
                if let Element::Function(f) = element {
                    if f.decl.modifier == "arrow" {
                        f.decl.parameters = arrow_parameters(value, ctx);
                        f.decl.return_types = value
                            .child_by_field_name("return_type")
                            .map(|n| ts_type_names(ctx.text(n)))
                            .unwrap_or_default();
                    }
                }
            }
        }
    }

    let Some(annotation) = declarator.child_by_field_name("type") else {
        return Ok(elements);
    };
    let annotation_text = ctx
        .text(annotation)
        .trim()
        .trim_start_matches(':')
        .trim()
        .to_string();
    if annotation_text.is_empty() {
        return Ok(elements);
    }

    let mut references = Vec::new();
    if annotation_text.starts_with('{') {
        // Object type: `{ a: Foo; b: string }` → per-property lookup for
        // destructured names. Nested object types are not handled.
        let properties = parse_object_type_properties(&annotation_text);
        for element in &mut elements {
            if let Element::Variable(v) = element {
                if let Some(property_type) = properties.get(&v.base.name) {
                    v.variable_type = ts_type_names(property_type);
                    push_type_references(&v.variable_type, &v.base, &mut references);
                }
            }
        }
    } else {
        let types = ts_type_names(&annotation_text);
        for element in &mut elements {
            if let Element::Variable(v) = element {
                v.variable_type = types.clone();
                push_type_references(&types, &v.base, &mut references);
            }
        }
    }

    elements.append(&mut references);
    Ok(elements)
}

fn push_type_references(types: &[String], base: &BaseElement, out: &mut Vec<Element>) {
    for t in types.iter().filter(|t| *t != PRIMITIVE_SENTINEL) {
        let exists = out.iter().any(|e| matches!(e, Element::Reference(r) if r.base.name == *t));
        if !exists {
            out.push(Element::Reference(Reference {
                base: BaseElement {
                    name: t.clone(),
                    scope: Scope::File,
                    ..base.clone()
                },
                owner: String::new(),
            }));
        }
    }
}

fn parse_object_type_properties(annotation: &str) -> std::collections::HashMap<String, String> {
    let inner = annotation
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}');
    let mut out = std::collections::HashMap::new();
    for piece in inner.split([';', ',']) {
        let Some((key, value)) = piece.split_once(':') else {
            continue;
        };
        let key = key.trim().trim_end_matches('?').to_string();
        let value = value.trim().to_string();
        if !key.is_empty() && !value.is_empty() {
            out.insert(key, value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_collapse() {
        assert_eq!(ts_type_names("string"), vec![PRIMITIVE_SENTINEL]);
        assert_eq!(ts_type_names("number | null"), vec![PRIMITIVE_SENTINEL]);
    }

    #[test]
    fn custom_types_flatten() {
        assert_eq!(ts_type_names("Widget"), vec!["Widget"]);
        assert_eq!(ts_type_names("Widget[]"), vec!["Widget"]);
        assert_eq!(ts_type_names("Promise<Widget>"), vec!["Widget"]);
        assert_eq!(
            ts_type_names("Map<string, Gadget>"),
            vec!["Gadget"]
        );
    }

    #[test]
    fn object_type_property_split() {
        let props = parse_object_type_properties("{ a: Foo; b?: string }");
        assert_eq!(props.get("a").map(String::as_str), Some("Foo"));
        assert_eq!(props.get("b").map(String::as_str), Some("string"));
    }
}

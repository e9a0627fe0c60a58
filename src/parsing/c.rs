//! C and C++ resolver.
//!
//! Quoted includes resolve against the current file's directory and the
//! project's source roots; angle-bracket includes stay unresolved system
//! headers. C++ member visibility is recovered by scanning backwards through
//! the enclosing member list for the most recent access specifier.

use std::path::Path;

use tree_sitter::Node;

use super::node_ext::NodeExt;
use super::resolver::{
    extract_custom_types, update_root_element, ElementResolver, MatchCaptures, ResolveCtx,
};
use super::Language;
use crate::error::ResolveError;
use crate::model::{BaseElement, Declaration, Element, Parameter, Reference, Variable};
use crate::types::{ElementKind, Scope, PRIMITIVE_SENTINEL};

const PRIMITIVE_TYPES: [&str; 24] = [
    "int", "char", "float", "double", "void", "long", "short", "unsigned", "signed", "bool",
    "size_t", "ssize_t", "ptrdiff_t", "wchar_t", "int8_t", "int16_t", "int32_t", "int64_t",
    "uint8_t", "uint16_t", "uint32_t", "uint64_t", "intptr_t", "uintptr_t",
];

const TYPE_ID_KINDS: [&str; 1] = ["type_identifier"];

const MEMBER_CONTAINERS: [&str; 2] = ["class_specifier", "struct_specifier"];

pub struct CFamilyResolver {
    language: Language,
}

impl CFamilyResolver {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl ElementResolver for CFamilyResolver {
    fn resolve(
        &self,
        mut root: Element,
        m: &MatchCaptures,
        ctx: &ResolveCtx,
    ) -> Result<Vec<Element>, ResolveError> {
        update_root_element(&mut root, m, ctx);
        match root.kind() {
            ElementKind::Import => resolve_include(root, m, ctx),
            ElementKind::Function => resolve_function(root, m, ctx),
            ElementKind::Method => resolve_method(root, m, ctx),
            ElementKind::Class => resolve_type(root, m, ctx),
            ElementKind::Variable => resolve_variable(root, m, ctx),
            ElementKind::Call => resolve_call(root, m, ctx),
            // No package concept in the C family.
            _ => Err(ResolveError::Unsupported {
                language: self.language.key().to_string(),
                kind: root.kind().to_string(),
            }),
        }
    }
}

fn resolve_include(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Import(mut import) = root else {
        return Ok(vec![root]);
    };
    let Some(path_node) = m.find_node("definition.import.source") else {
        return Err(ResolveError::EmptyImport);
    };
    let raw = ctx.text(path_node).trim().to_string();
    if raw.is_empty() {
        return Err(ResolveError::EmptyImport);
    }

    if raw.starts_with('<') {
        // System header: keep the angle brackets, resolve to nothing.
        import.base.name = raw.clone();
        import.base.scope = Scope::File;
        import.source = raw;
        return Ok(vec![Element::Import(import)]);
    }

    let header = raw.trim_matches('"').to_string();
    import.base.name = header.clone();
    import.base.scope = Scope::File;
    import.source = header.clone();
    if let Some(project) = ctx.project {
        let base_dir = Path::new(ctx.path).parent().map(Path::to_path_buf);
        import.file_paths = project.resolve_candidates(base_dir.as_deref(), &header);
    }
    Ok(vec![Element::Import(import)])
}

fn resolve_function(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Function(mut function) = root else {
        return Ok(vec![root]);
    };
    let header = m
        .root()
        .map(|c| ctx.text(c.node))
        .unwrap_or("")
        .split('(')
        .next()
        .unwrap_or("")
        .to_string();
    function.base.scope = if header.split_whitespace().any(|t| t == "static") {
        Scope::File
    } else {
        Scope::Project
    };

    function.decl = Declaration {
        modifier: if function.base.scope == Scope::File {
            "static".to_string()
        } else {
            String::new()
        },
        name: function.base.name.clone(),
        parameters: m
            .find_node("definition.function.parameters")
            .map(|n| parse_parameter_list(n, ctx))
            .unwrap_or_default(),
        return_types: m
            .find_node("definition.function.return_type")
            .map(|n| type_names(n, ctx))
            .unwrap_or_default(),
    };
    Ok(vec![Element::Function(function)])
}

fn resolve_method(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Method(mut method) = root else {
        return Ok(vec![root]);
    };
    let root_node = m.root().map(|c| c.node);

    // Out-of-class definitions carry their owner in the qualified name.
    if let Some((owner, simple)) = method.base.name.rsplit_once("::") {
        method.owner = owner.to_string();
        method.base.name = simple.to_string();
    } else {
        method.owner = root_node
            .and_then(|n| n.ancestor_of_kind(&MEMBER_CONTAINERS))
            .and_then(|c| c.child_by_field_name("name"))
            .map(|n| ctx.text(n).to_string())
            .unwrap_or_default();
    }

    let container_kind = root_node
        .and_then(|n| n.ancestor_of_kind(&MEMBER_CONTAINERS))
        .map(|c| c.kind())
        .unwrap_or("class_specifier");
    let access = root_node.and_then(access_specifier_for).map(|n| {
        let text = ctx.text(n).to_string();
        text.trim_end_matches(':').trim().to_string()
    });

    method.base.scope = match access.as_deref() {
        Some("public") => Scope::Project,
        Some("protected") => Scope::Package,
        Some("private") => Scope::Class,
        // No specifier: struct members are public, class members private.
        _ if container_kind == "struct_specifier" => Scope::Project,
        _ => Scope::Class,
    };

    method.decl = Declaration {
        modifier: access.unwrap_or_default(),
        name: method.base.name.clone(),
        parameters: m
            .find_node("definition.method.parameters")
            .map(|n| parse_parameter_list(n, ctx))
            .unwrap_or_default(),
        return_types: m
            .find_node("definition.method.return_type")
            .map(|n| type_names(n, ctx))
            .unwrap_or_default(),
    };
    Ok(vec![Element::Method(method)])
}

/// Nearest preceding `access_specifier` sibling within the member list.
fn access_specifier_for(node: Node) -> Option<Node> {
    let mut member = node;
    // Climb to the direct child of the field_declaration_list.
    while let Some(parent) = member.parent() {
        if parent.kind() == "field_declaration_list" {
            let mut current = member.prev_sibling();
            while let Some(sibling) = current {
                if sibling.kind() == "access_specifier" {
                    return Some(sibling);
                }
                current = sibling.prev_sibling();
            }
            return None;
        }
        member = parent;
    }
    None
}

fn resolve_type(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Class(mut class) = root else {
        return Ok(vec![root]);
    };
    class.base.scope = Scope::Project;
    let mut secondary = Vec::new();

    if let Some(root_node) = m.root().map(|c| c.node) {
        for i in 0..root_node.named_child_count() {
            let Some(child) = root_node.named_child(i) else {
                continue;
            };
            if child.kind() == "base_class_clause" {
                for base_name in base_class_names(child, ctx) {
                    class.super_classes.push(base_name.clone());
                    secondary.push(Element::Reference(Reference {
                        base: BaseElement {
                            name: base_name,
                            scope: Scope::File,
                            range: child.to_range(),
                            ..class.base.clone()
                        },
                        owner: String::new(),
                    }));
                }
            }
        }
    }

    let mut out = vec![Element::Class(class)];
    out.append(&mut secondary);
    Ok(out)
}

/// Base types of a `: public A, private B` clause, skipping punctuation and
/// access keywords.
fn base_class_names(clause: Node, ctx: &ResolveCtx) -> Vec<String> {
    let mut out = Vec::new();
    collect_base_names(clause, ctx, &mut out);
    out
}

fn collect_base_names(node: Node, ctx: &ResolveCtx, out: &mut Vec<String>) {
    if node.kind() == "type_identifier" || node.kind() == "qualified_identifier" {
        let text = ctx.text(node).trim().to_string();
        if !text.is_empty() && !out.contains(&text) {
            out.push(text);
        }
        return;
    }
    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i) {
            collect_base_names(child, ctx, out);
        }
    }
}

fn resolve_variable(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Variable(template) = root else {
        return Ok(vec![root]);
    };
    let root_node = m.root().map(|c| c.node);

    let is_field = root_node.is_some_and(|n| n.kind() == "field_declaration");
    let name_capture = if is_field {
        "definition.field.name"
    } else {
        "definition.variable.name"
    };
    let type_capture = if is_field {
        "definition.field.type"
    } else {
        "definition.variable.type"
    };

    let name = m
        .find_node(name_capture)
        .map(|n| innermost_declarator_name(n, ctx))
        .unwrap_or_default();
    if name.is_empty() {
        return Ok(vec![]);
    }

    let scope = if is_field {
        Scope::Class
    } else if root_node
        .is_some_and(|n| n.ancestor_of_kind(&["function_definition", "compound_statement"]).is_some())
    {
        Scope::Block
    } else {
        Scope::File
    };

    let variable_type = m
        .find_node(type_capture)
        .map(|n| extract_custom_types(n, ctx, &TYPE_ID_KINDS, &PRIMITIVE_TYPES))
        .unwrap_or_else(|| vec![PRIMITIVE_SENTINEL.to_string()]);

    let mut out = Vec::new();
    out.push(Element::Variable(Variable {
        base: BaseElement {
            name,
            scope,
            ..template.base.clone()
        },
        variable_type: variable_type.clone(),
    }));

    for type_name in variable_type.iter().filter(|t| *t != PRIMITIVE_SENTINEL) {
        out.push(Element::Reference(Reference {
            base: BaseElement {
                name: type_name.clone(),
                scope: Scope::File,
                ..template.base.clone()
            },
            owner: String::new(),
        }));
    }

    // Value expressions that instantiate a user-defined type.
    if let Some(value) = m.find_node("definition.variable.value") {
        if let Some(reference) = instantiation_reference(value, ctx, &template.base) {
            out.push(reference);
        }
    }

    Ok(out)
}

/// `new Foo(...)` and `Outer::Inner{...}` on the right-hand side.
fn instantiation_reference(
    value: Node,
    ctx: &ResolveCtx,
    base: &BaseElement,
) -> Option<Element> {
    let (name_text, owner) = match value.kind() {
        "new_expression" => {
            let type_node = value.child_by_field_name("type")?;
            (ctx.text(type_node).trim().to_string(), String::new())
        }
        "compound_literal_expression" => {
            let type_node = value.child_by_field_name("type")?;
            (ctx.text(type_node).trim().to_string(), String::new())
        }
        _ => return None,
    };
    let (owner, simple) = match name_text.rsplit_once("::") {
        Some((o, s)) => (o.to_string(), s.to_string()),
        None => (owner, name_text),
    };
    if simple.is_empty() || PRIMITIVE_TYPES.contains(&simple.as_str()) {
        return None;
    }
    Some(Element::Reference(Reference {
        base: BaseElement {
            name: simple,
            scope: Scope::File,
            ..base.clone()
        },
        owner,
    }))
}

fn resolve_call(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Call(mut call) = root else {
        return Ok(vec![root]);
    };
    call.owner = m
        .find_node("call.owner")
        .map(|n| ctx.text(n).trim().to_string())
        .unwrap_or_default();
    call.parameters = m
        .find_node("call.arguments")
        .map(|n| {
            (0..n.named_child_count())
                .filter_map(|i| n.named_child(i))
                .map(|arg| Parameter {
                    name: ctx.text(arg).trim().to_string(),
                    types: vec![PRIMITIVE_SENTINEL.to_string()],
                })
                .filter(|p| !p.name.is_empty())
                .collect()
        })
        .unwrap_or_default();
    Ok(vec![Element::Call(call)])
}

/// Innermost identifier of a possibly pointered/parenthesized declarator.
fn innermost_declarator_name(node: Node, ctx: &ResolveCtx) -> String {
    match node.kind() {
        "identifier" | "field_identifier" | "type_identifier" => {
            ctx.text(node).trim().to_string()
        }
        _ => {
            if let Some(inner) = node.child_by_field_name("declarator") {
                return innermost_declarator_name(inner, ctx);
            }
            for i in 0..node.named_child_count() {
                if let Some(child) = node.named_child(i) {
                    let name = innermost_declarator_name(child, ctx);
                    if !name.is_empty() {
                        return name;
                    }
                }
            }
            String::new()
        }
    }
}

/// Parameter parsing shares the cleaning rules used for types: attributes,
/// cv-qualifiers, and aggregate prefixes are stripped before the type is
/// inspected.
fn parse_parameter_list(node: Node, ctx: &ResolveCtx) -> Vec<Parameter> {
    let mut out = Vec::new();
    for i in 0..node.named_child_count() {
        let Some(param) = node.named_child(i) else {
            continue;
        };
        if param.kind() != "parameter_declaration"
            && param.kind() != "optional_parameter_declaration"
            && param.kind() != "variadic_parameter_declaration"
        {
            continue;
        }
        let name = param
            .child_by_field_name("declarator")
            .map(|d| innermost_declarator_name(d, ctx))
            .unwrap_or_default();
        let types = param
            .child_by_field_name("type")
            .map(|n| extract_custom_types(n, ctx, &TYPE_ID_KINDS, &PRIMITIVE_TYPES))
            .unwrap_or_default();
        if name.is_empty() && types.is_empty() {
            continue;
        }
        out.push(Parameter { name, types });
    }
    out
}

/// Return-type names keep primitives literal after cleaning.
fn type_names(node: Node, ctx: &ResolveCtx) -> Vec<String> {
    let custom = extract_custom_types(node, ctx, &TYPE_ID_KINDS, &PRIMITIVE_TYPES);
    if custom.len() == 1 && custom[0] == PRIMITIVE_SENTINEL {
        vec![clean_type_text(ctx.text(node))]
    } else {
        custom
    }
}

fn clean_type_text(text: &str) -> String {
    text.split_whitespace()
        .filter(|tok| {
            !matches!(
                *tok,
                "const" | "volatile" | "mutable" | "__restrict" | "struct" | "enum" | "union"
            ) && !tok.starts_with("[[")
        })
        .collect::<Vec<_>>()
        .join(" ")
        .replace(['*', '&'], "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_cleaning_drops_qualifiers() {
        assert_eq!(clean_type_text("const struct Foo *"), "Foo");
        assert_eq!(clean_type_text("unsigned long"), "unsigned long");
        assert_eq!(clean_type_text("volatile int"), "int");
    }
}

//! Java resolver.
//!
//! Recovers owners, visibility, parameter lists, and the implicit imports
//! and references hidden in supertype lists, variable types, and `new`
//! expressions.

use tree_sitter::Node;

use super::node_ext::NodeExt;
use super::resolver::{
    extract_custom_types, extract_modifier, find_method_owner, split_owner_chain,
    update_root_element, ElementResolver, MatchCaptures, ResolveCtx,
};
use crate::error::ResolveError;
use crate::model::{BaseElement, Declaration, Element, Import, Parameter, Reference, Variable};
use crate::types::{ElementKind, Range, Scope, PRIMITIVE_SENTINEL};

const MODIFIER_KEYWORDS: [&str; 12] = [
    "public",
    "private",
    "protected",
    "static",
    "final",
    "abstract",
    "synchronized",
    "native",
    "default",
    "transient",
    "volatile",
    "strictfp",
];

const PRIMITIVE_TYPES: [&str; 10] = [
    "int", "long", "short", "byte", "float", "double", "boolean", "char", "void", "var",
];

const TYPE_ID_KINDS: [&str; 2] = ["type_identifier", "scoped_type_identifier"];

const OWNER_KINDS: [&str; 3] = [
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
];

pub struct JavaResolver;

impl JavaResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JavaResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Visibility table: explicit modifier wins, then the container decides.
fn scope_for(modifier: &str, container_kind: &str) -> Scope {
    match modifier.split_whitespace().next().unwrap_or("") {
        "private" => Scope::Class,
        "protected" => Scope::Package,
        "public" => Scope::Project,
        _ => {
            if container_kind == "interface_declaration" {
                Scope::Project
            } else {
                Scope::Package
            }
        }
    }
}

impl ElementResolver for JavaResolver {
    fn resolve(
        &self,
        mut root: Element,
        m: &MatchCaptures,
        ctx: &ResolveCtx,
    ) -> Result<Vec<Element>, ResolveError> {
        update_root_element(&mut root, m, ctx);
        match root.kind() {
            ElementKind::Import => resolve_import(root, m, ctx),
            ElementKind::Package => resolve_package(root),
            ElementKind::Method => resolve_method(root, m, ctx),
            ElementKind::Class => resolve_class(root, m, ctx),
            ElementKind::Interface => resolve_interface(root, m, ctx),
            ElementKind::Variable => resolve_variable(root, m, ctx),
            ElementKind::Call => resolve_call(root, m, ctx),
            _ => Err(ResolveError::Unsupported {
                language: ctx.language.key().to_string(),
                kind: root.kind().to_string(),
            }),
        }
    }
}

fn resolve_import(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Import(mut import) = root else {
        return Ok(vec![root]);
    };
    let qualified = m
        .find_node("definition.import.source")
        .map(|n| ctx.text(n).trim().to_string())
        .unwrap_or_default();
    if qualified.is_empty() {
        return Err(ResolveError::EmptyImport);
    }
    import.base.name = qualified.clone();
    import.base.scope = Scope::Package;
    // Source carries the path form so import-based filtering can match the
    // defining file's location on disk.
    import.source = qualified.replace('.', "/");
    Ok(vec![Element::Import(import)])
}

fn resolve_package(mut root: Element) -> Result<Vec<Element>, ResolveError> {
    root.base_mut().scope = Scope::Project;
    Ok(vec![root])
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

    let container = root_node.and_then(|n| n.ancestor_of_kind(&OWNER_KINDS));
    let container_kind = container.map(|c| c.kind()).unwrap_or("class_declaration");
    method.owner = root_node
        .and_then(|n| find_method_owner(n, ctx, &OWNER_KINDS))
        .unwrap_or_default();

    let header = root_node
        .map(|n| ctx.text(n))
        .unwrap_or("")
        .split('(')
        .next()
        .unwrap_or("")
        .to_string();
    let mut modifier = extract_modifier(&header, &MODIFIER_KEYWORDS);
    if modifier.is_empty() {
        // Implicit defaults depend on the container.
        modifier = if container_kind == "interface_declaration" {
            "public abstract".to_string()
        } else {
            "package-private".to_string()
        };
    }
    method.base.scope = scope_for(&modifier, container_kind);

    method.decl = Declaration {
        modifier,
        name: method.base.name.clone(),
        parameters: m
            .find_node("definition.method.parameters")
            .map(|n| parse_formal_parameters(n, ctx))
            .unwrap_or_default(),
        return_types: m
            .find_node("definition.method.return_type")
            .map(|n| type_names(n, ctx))
            .unwrap_or_default(),
    };

    Ok(vec![Element::Method(method)])
}

fn resolve_class(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Class(mut class) = root else {
        return Ok(vec![root]);
    };
    let Some(root_node) = m.root().map(|c| c.node) else {
        return Ok(vec![Element::Class(class)]);
    };

    let header = ctx.text(root_node).split('{').next().unwrap_or("").to_string();
    let modifier = extract_modifier(&header, &MODIFIER_KEYWORDS);
    class.base.scope = scope_for(&modifier, "class_declaration");

    let mut secondary = Vec::new();
    if let Some(superclass) = root_node.child_by_field_name("superclass") {
        for name in collect_supertype_names(superclass, ctx) {
            let parent = supertype_elements(&class.base, &name, superclass, &mut secondary);
            class.super_classes.push(parent);
        }
    }
    if let Some(interfaces) = root_node.child_by_field_name("interfaces") {
        for name in collect_supertype_names(interfaces, ctx) {
            let parent = supertype_elements(&class.base, &name, interfaces, &mut secondary);
            class.super_interfaces.push(parent);
        }
    }

    let mut out = vec![Element::Class(class)];
    out.append(&mut secondary);
    Ok(out)
}

fn resolve_interface(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Interface(mut interface) = root else {
        return Ok(vec![root]);
    };
    let Some(root_node) = m.root().map(|c| c.node) else {
        return Ok(vec![Element::Interface(interface)]);
    };

    let header = ctx.text(root_node).split('{').next().unwrap_or("").to_string();
    let modifier = extract_modifier(&header, &MODIFIER_KEYWORDS);
    interface.base.scope = scope_for(&modifier, "interface_declaration");

    let mut secondary = Vec::new();
    for i in 0..root_node.named_child_count() {
        let Some(child) = root_node.named_child(i) else {
            continue;
        };
        if child.kind() == "extends_interfaces" {
            for name in collect_supertype_names(child, ctx) {
                let parent = supertype_elements(&interface.base, &name, child, &mut secondary);
                interface.super_interfaces.push(parent);
            }
        }
    }

    if let Some(body) = root_node.child_by_field_name("body") {
        for i in 0..body.named_child_count() {
            let Some(member) = body.named_child(i) else {
                continue;
            };
            if member.kind() != "method_declaration" {
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
                modifier: "public abstract".to_string(),
                name,
                parameters: member
                    .child_by_field_name("parameters")
                    .map(|n| parse_formal_parameters(n, ctx))
                    .unwrap_or_default(),
                return_types: member
                    .child_by_field_name("type")
                    .map(|n| type_names(n, ctx))
                    .unwrap_or_default(),
            });
        }
    }

    let mut out = vec![Element::Interface(interface)];
    out.append(&mut secondary);
    Ok(out)
}

fn resolve_variable(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Variable(template) = root else {
        return Ok(vec![root]);
    };
    let Some(root_node) = m.root().map(|c| c.node) else {
        return Ok(vec![]);
    };

    let is_field = root_node.kind() == "field_declaration";
    let scope = if is_field {
        let header = ctx.text(root_node).split('=').next().unwrap_or("").to_string();
        scope_for(&extract_modifier(&header, &MODIFIER_KEYWORDS), "class_declaration")
    } else {
        Scope::Block
    };

    let var_types = m
        .find_node("definition.variable.type")
        .map(|n| extract_custom_types(n, ctx, &TYPE_ID_KINDS, &PRIMITIVE_TYPES))
        .unwrap_or_default();

    let mut out = Vec::new();

    // One declaration can introduce several comma-separated variables; each
    // gets its own element sharing the declaration range.
    let mut cursor = root_node.walk();
    for declarator in root_node.children_by_field_name("declarator", &mut cursor) {
        let Some(name_node) = declarator.child_by_field_name("name") else {
            continue;
        };
        let name = ctx.text(name_node).trim().to_string();
        if name.is_empty() {
            continue;
        }
        out.push(Element::Variable(Variable {
            base: BaseElement {
                name,
                scope,
                ..template.base.clone()
            },
            variable_type: var_types.clone(),
        }));
    }

    for type_name in var_types.iter().filter(|t| *t != PRIMITIVE_SENTINEL) {
        let (owner, parent) = split_owner_chain(type_name);
        out.push(Element::Reference(Reference {
            base: BaseElement {
                name: parent,
                scope: Scope::File,
                ..template.base.clone()
            },
            owner: owner.clone(),
        }));
        out.push(Element::Import(Import {
            base: BaseElement {
                name: type_name.clone(),
                scope: Scope::Package,
                ..template.base.clone()
            },
            source: String::new(),
            alias: String::new(),
            file_paths: Vec::new(),
        }));
    }

    Ok(out)
}

fn resolve_call(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Call(mut call) = root else {
        return Ok(vec![root]);
    };
    let is_constructor = call.base.capture == "call.function";

    let raw_name = m
        .find_node("call.name")
        .map(|n| ctx.text(n).trim().to_string())
        .unwrap_or_default();
    // `new a.b.Foo<Bar>(...)`: drop generics, split the type chain.
    let without_generics = raw_name.split('<').next().unwrap_or("").trim().to_string();
    let (chain_owner, simple_name) = split_owner_chain(&without_generics);

    call.base.name = simple_name.clone();
    call.owner = m
        .find_node("call.owner")
        .map(|n| ctx.text(n).trim().to_string())
        .unwrap_or(chain_owner.clone());
    call.parameters = m
        .find_node("call.arguments")
        .map(|n| positional_arguments(n, ctx))
        .unwrap_or_default();

    let mut out = Vec::new();
    if is_constructor && !simple_name.is_empty() {
        out.push(Element::Reference(Reference {
            base: BaseElement {
                name: simple_name,
                scope: Scope::File,
                ..call.base.clone()
            },
            owner: chain_owner,
        }));
        out.push(Element::Import(Import {
            base: BaseElement {
                name: without_generics,
                scope: Scope::Package,
                ..call.base.clone()
            },
            source: String::new(),
            alias: String::new(),
            file_paths: Vec::new(),
        }));
    }
    out.insert(0, Element::Call(call));
    Ok(out)
}

/// Flatten an `extends`/`implements` clause into qualified type names.
fn collect_supertype_names(node: Node, ctx: &ResolveCtx) -> Vec<String> {
    let mut names = Vec::new();
    collect_supertypes_into(node, ctx, &mut names);
    names
}

fn collect_supertypes_into(node: Node, ctx: &ResolveCtx, out: &mut Vec<String>) {
    if TYPE_ID_KINDS.contains(&node.kind()) {
        let text = ctx.text(node).trim().to_string();
        if !text.is_empty() && !out.contains(&text) {
            out.push(text);
        }
        return;
    }
    // Generic supertypes keep the base name only.
    if node.kind() == "generic_type" {
        if let Some(first) = node.named_child(0) {
            collect_supertypes_into(first, ctx, out);
        }
        return;
    }
    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i) {
            collect_supertypes_into(child, ctx, out);
        }
    }
}

/// For supertype `A.B.C`, emit the implicit import of `A.B` and a reference
/// to `C`, returning the simple parent name.
fn supertype_elements(
    base: &BaseElement,
    qualified: &str,
    clause_node: Node,
    out: &mut Vec<Element>,
) -> String {
    let (owner, parent) = split_owner_chain(qualified);
    let range: Range = clause_node.to_range();
    if !owner.is_empty() {
        out.push(Element::Import(Import {
            base: BaseElement {
                name: owner.clone(),
                scope: Scope::Package,
                range,
                ..base.clone()
            },
            source: String::new(),
            alias: String::new(),
            file_paths: Vec::new(),
        }));
    }
    out.push(Element::Reference(Reference {
        base: BaseElement {
            name: parent.clone(),
            scope: Scope::File,
            range,
            ..base.clone()
        },
        owner,
    }));
    parent
}

fn parse_formal_parameters(node: Node, ctx: &ResolveCtx) -> Vec<Parameter> {
    let mut out = Vec::new();
    for i in 0..node.named_child_count() {
        let Some(param) = node.named_child(i) else {
            continue;
        };
        if param.kind() != "formal_parameter" && param.kind() != "spread_parameter" {
            continue;
        }
        let name = param
            .child_by_field_name("name")
            .map(|n| ctx.text(n).trim().to_string())
            .or_else(|| last_identifier_text(param, ctx))
            .unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        let types = param
            .child_by_field_name("type")
            .map(|n| extract_custom_types(n, ctx, &TYPE_ID_KINDS, &PRIMITIVE_TYPES))
            .unwrap_or_default();
        out.push(Parameter { name, types });
    }
    out
}

fn last_identifier_text(node: Node, ctx: &ResolveCtx) -> Option<String> {
    let mut found = None;
    for i in 0..node.named_child_count() {
        let child = node.named_child(i)?;
        if child.kind() == "identifier" || child.kind() == "variable_declarator" {
            let text = ctx.text(child).trim().to_string();
            if !text.is_empty() {
                found = Some(text);
            }
        }
    }
    found
}

/// Return-type extraction keeps primitive names literal; generic arguments
/// are flattened into separate entries.
fn type_names(node: Node, ctx: &ResolveCtx) -> Vec<String> {
    let custom = extract_custom_types(node, ctx, &TYPE_ID_KINDS, &PRIMITIVE_TYPES);
    if custom.len() == 1 && custom[0] == PRIMITIVE_SENTINEL {
        vec![ctx.text(node).trim().to_string()]
    } else {
        custom
    }
}

/// Call arguments carry positional names only; their types are never
/// inspected.
fn positional_arguments(node: Node, ctx: &ResolveCtx) -> Vec<Parameter> {
    let mut out = Vec::new();
    for i in 0..node.named_child_count() {
        if let Some(arg) = node.named_child(i) {
            let name = ctx.text(arg).trim().to_string();
            if !name.is_empty() {
                out.push(Parameter {
                    name,
                    types: vec![PRIMITIVE_SENTINEL.to_string()],
                });
            }
        }
    }
    out
}

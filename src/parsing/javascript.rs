//! JavaScript resolver.
//!
//! CommonJS `require(...)` calls become imports, destructuring patterns fan
//! out into one variable per bound name, and arrow-function initializers are
//! promoted to function elements. The TypeScript resolver wraps this one and
//! layers type annotations on top.

use tree_sitter::Node;

use super::node_ext::NodeExt;
use super::resolver::{
    clean_name, update_root_element, ElementResolver, MatchCaptures, ResolveCtx,
};
use crate::error::ResolveError;
use crate::model::{
    BaseElement, Declaration, Element, Field, Function, Import, Parameter, Reference, Variable,
};
use crate::types::{ElementKind, Scope, PRIMITIVE_SENTINEL};

const BLOCK_CONTAINERS: [&str; 10] = [
    "statement_block",
    "for_statement",
    "for_in_statement",
    "while_statement",
    "if_statement",
    "try_statement",
    "catch_clause",
    "block",
    "lexical_declaration",
    "variable_declaration",
];

const FUNCTION_CONTAINERS: [&str; 6] = [
    "function_declaration",
    "generator_function_declaration",
    "function_expression",
    "generator_function",
    "arrow_function",
    "method_definition",
];

const CLASS_CONTAINERS: [&str; 3] = ["class_declaration", "class_expression", "class_body"];

const FILE_CONTAINERS: [&str; 3] = ["program", "module", "script"];

/// Parents walked when deriving a variable's scope.
const SCOPE_WALK_LIMIT: usize = 5;

pub struct JavaScriptResolver;

impl JavaScriptResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JavaScriptResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementResolver for JavaScriptResolver {
    fn resolve(
        &self,
        mut root: Element,
        m: &MatchCaptures,
        ctx: &ResolveCtx,
    ) -> Result<Vec<Element>, ResolveError> {
        update_root_element(&mut root, m, ctx);
        resolve_js_kind(root, m, ctx)
    }
}

/// Kind dispatch shared with the TypeScript wrapper.
pub(crate) fn resolve_js_kind(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    match root.kind() {
        ElementKind::Import => resolve_import(root, m, ctx),
        ElementKind::Function => resolve_function(root, m, ctx),
        ElementKind::Method => resolve_method(root, m, ctx),
        ElementKind::Class => resolve_class(root, m, ctx),
        ElementKind::Variable => resolve_variable(root, m, ctx),
        ElementKind::Call => resolve_call(root, m, ctx),
        _ => Err(ResolveError::Unsupported {
            language: ctx.language.key().to_string(),
            kind: root.kind().to_string(),
        }),
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
    let source = m
        .find_node("definition.import.source")
        .map(|n| clean_name(ctx.text(n)))
        .unwrap_or_default();
    if source.is_empty() {
        return Err(ResolveError::EmptyImport);
    }

    // Prefer the default-import binding as the import's name, then the first
    // named binding, then the specifier basename.
    let mut name = String::new();
    let mut alias = String::new();
    if let Some(root_node) = m.root().map(|c| c.node) {
        for i in 0..root_node.named_child_count() {
            let Some(clause) = root_node.named_child(i) else {
                continue;
            };
            if clause.kind() != "import_clause" {
                continue;
            }
            collect_import_bindings(clause, ctx, &mut name, &mut alias);
        }
    }
    if name.is_empty() {
        name = source
            .trim_start_matches("./")
            .trim_start_matches("../")
            .to_string();
    }

    import.base.name = name;
    import.base.scope = Scope::File;
    import.source = source;
    import.alias = alias;
    Ok(vec![Element::Import(import)])
}

fn collect_import_bindings(clause: Node, ctx: &ResolveCtx, name: &mut String, alias: &mut String) {
    for i in 0..clause.named_child_count() {
        let Some(child) = clause.named_child(i) else {
            continue;
        };
        match child.kind() {
            "identifier" => {
                if name.is_empty() {
                    *name = ctx.text(child).to_string();
                }
            }
            "namespace_import" => {
                // `* as ns`
                for j in 0..child.named_child_count() {
                    if let Some(id) = child.named_child(j) {
                        if id.kind() == "identifier" {
                            *alias = ctx.text(id).to_string();
                            if name.is_empty() {
                                *name = alias.clone();
                            }
                        }
                    }
                }
            }
            "named_imports" => {
                if name.is_empty() {
                    for j in 0..child.named_child_count() {
                        if let Some(spec) = child.named_child(j) {
                            if spec.kind() == "import_specifier" {
                                if let Some(n) = spec.child_by_field_name("name") {
                                    *name = ctx.text(n).to_string();
                                    break;
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
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
    function.base.scope = Scope::File;
    function.decl = Declaration {
        modifier: function_modifier(&header),
        name: function.base.name.clone(),
        parameters: m
            .find_node("definition.function.parameters")
            .map(|n| parse_parameters(n, ctx))
            .unwrap_or_default(),
        return_types: Vec::new(),
    };
    Ok(vec![Element::Function(function)])
}

fn function_modifier(header: &str) -> String {
    if header.trim_start().starts_with("async") {
        "async".to_string()
    } else if header.contains("function*") {
        "*".to_string()
    } else {
        String::new()
    }
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

    method.owner = root_node
        .and_then(|n| n.ancestor_of_kind(&["class_declaration", "class_expression"]))
        .and_then(|class| class.child_by_field_name("name"))
        .map(|n| ctx.text(n).to_string())
        .unwrap_or_default();

    let header = root_node
        .map(|n| ctx.text(n))
        .unwrap_or("")
        .split('(')
        .next()
        .unwrap_or("")
        .to_string();
    let mut modifier = method_modifier(&header);

    // `#private()` methods: strip the sigil, record the visibility.
    if let Some(stripped) = method.base.name.strip_prefix('#') {
        method.base.name = stripped.to_string();
        modifier = "private".to_string();
    }
    method.base.scope = Scope::Class;

    method.decl = Declaration {
        modifier,
        name: method.base.name.clone(),
        parameters: m
            .find_node("definition.method.parameters")
            .map(|n| parse_parameters(n, ctx))
            .unwrap_or_default(),
        return_types: Vec::new(),
    };
    Ok(vec![Element::Method(method)])
}

fn method_modifier(header: &str) -> String {
    for keyword in ["static", "async", "get", "set", "*"] {
        if header
            .split_whitespace()
            .any(|tok| tok == keyword || (keyword == "*" && tok.starts_with('*')))
        {
            return keyword.to_string();
        }
    }
    String::new()
}

fn resolve_class(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Class(mut class) = root else {
        return Ok(vec![root]);
    };
    class.base.scope = Scope::File;
    let mut secondary = Vec::new();

    if let Some(root_node) = m.root().map(|c| c.node) {
        // `extends` lives in a class_heritage child.
        for i in 0..root_node.named_child_count() {
            let Some(child) = root_node.named_child(i) else {
                continue;
            };
            if child.kind() == "class_heritage" {
                let text = ctx
                    .text(child)
                    .trim_start_matches("extends")
                    .trim()
                    .to_string();
                if !text.is_empty() {
                    class.super_classes.push(text.clone());
                    secondary.push(Element::Reference(Reference {
                        base: BaseElement {
                            name: text,
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

    if let Some(body) = m.find_node("definition.class.body") {
        for i in 0..body.named_child_count() {
            let Some(member) = body.named_child(i) else {
                continue;
            };
            match member.kind() {
                "method_definition" => {
                    let mut name = member
                        .child_by_field_name("name")
                        .map(|n| ctx.text(n).to_string())
                        .unwrap_or_default();
                    let header = ctx.text(member).split('(').next().unwrap_or("").to_string();
                    let mut modifier = method_modifier(&header);
                    if let Some(stripped) = name.strip_prefix('#') {
                        name = stripped.to_string();
                        modifier = "private".to_string();
                    }
                    if name.is_empty() {
                        continue;
                    }
                    class.methods.push(Declaration {
                        modifier,
                        name,
                        parameters: member
                            .child_by_field_name("parameters")
                            .map(|n| parse_parameters(n, ctx))
                            .unwrap_or_default(),
                        return_types: Vec::new(),
                    });
                }
                "field_definition" | "public_field_definition" => {
                    let mut name = member
                        .child_by_field_name("property")
                        .or_else(|| member.child_by_field_name("name"))
                        .map(|n| ctx.text(n).to_string())
                        .unwrap_or_default();
                    let mut modifier = String::new();
                    if let Some(stripped) = name.strip_prefix('#') {
                        name = stripped.to_string();
                        modifier = "private".to_string();
                    }
                    if name.is_empty() {
                        continue;
                    }
                    class.fields.push(Field {
                        modifier,
                        name,
                        field_type: String::new(),
                    });
                }
                _ => {}
            }
        }
    }

    let mut out = vec![Element::Class(class)];
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

    let value = root_node.child_by_field_name("value");

    // `const x = require("...")` is handled by the call transform; the
    // variable itself is suppressed.
    if value.is_some_and(|v| is_require_call(v, ctx)) {
        return Ok(vec![]);
    }

    let scope = derive_variable_scope(root_node);

    // Arrow initializers declare functions, not variables.
    if let Some(v) = value {
        if v.kind() == "arrow_function" {
            let name = m
                .find_node("definition.variable.name")
                .map(|n| ctx.text(n).to_string())
                .unwrap_or_default();
            if name.is_empty() {
                return Ok(vec![]);
            }
            return Ok(vec![Element::Function(Function {
                base: BaseElement {
                    name: name.clone(),
                    scope,
                    ..template.base.clone()
                },
                decl: Declaration {
                    modifier: "arrow".to_string(),
                    name,
                    parameters: arrow_parameters(v, ctx),
                    return_types: Vec::new(),
                },
            })]);
        }
    }

    let Some(name_node) = m.find_node("definition.variable.name") else {
        return Ok(vec![]);
    };

    let mut names = Vec::new();
    if matches!(name_node.kind(), "array_pattern" | "object_pattern") {
        collect_pattern_identifiers(name_node, ctx, &mut names);
    } else {
        let text = ctx.text(name_node).trim().to_string();
        if !text.is_empty() {
            names.push(text);
        }
    }

    Ok(names
        .into_iter()
        .map(|name| {
            Element::Variable(Variable {
                base: BaseElement {
                    name,
                    scope,
                    ..template.base.clone()
                },
                variable_type: vec![PRIMITIVE_SENTINEL.to_string()],
            })
        })
        .collect())
}

fn resolve_call(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Call(mut call) = root else {
        return Ok(vec![root]);
    };

    // `require("mod")` becomes an import named after its binding.
    if call.base.capture == "call.function" && call.base.name == "require" {
        return require_to_import(call, m, ctx);
    }

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

fn require_to_import(
    call: crate::model::Call,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let source = m
        .find_node("call.arguments")
        .and_then(|args| {
            (0..args.named_child_count())
                .filter_map(|i| args.named_child(i))
                .find(|n| n.kind() == "string")
        })
        .map(|n| clean_name(ctx.text(n)))
        .unwrap_or_default();
    if source.is_empty() {
        return Err(ResolveError::EmptyImport);
    }

    // The binding is the enclosing declarator's name.
    let binding = m
        .root()
        .map(|c| c.node)
        .and_then(|n| n.ancestor_within(&["variable_declarator"], 3))
        .and_then(|decl| decl.child_by_field_name("name"))
        .map(|n| ctx.text(n).trim().to_string())
        .unwrap_or_default();

    let name = if binding.is_empty() {
        source.clone()
    } else {
        binding
    };

    Ok(vec![Element::Import(Import {
        base: BaseElement {
            name,
            scope: Scope::File,
            ..call.base
        },
        source,
        alias: String::new(),
        file_paths: Vec::new(),
    })])
}

fn is_require_call(node: Node, ctx: &ResolveCtx) -> bool {
    node.kind() == "call_expression"
        && node
            .child_by_field_name("function")
            .is_some_and(|f| f.kind() == "identifier" && ctx.text(f) == "require")
}

/// `let`/`const` always bind block-wide; `var` hoists to the enclosing
/// function or file. Other cases walk a bounded parent chain.
fn derive_variable_scope(declarator: Node) -> Scope {
    let declaration = declarator.parent();
    if declaration.is_some_and(|d| d.kind() == "lexical_declaration") {
        return Scope::Block;
    }
    if declaration.is_some_and(|d| d.kind() == "variable_declaration") {
        return if declarator.ancestor_of_kind(&FUNCTION_CONTAINERS).is_some() {
            Scope::Function
        } else {
            Scope::File
        };
    }
    let mut current = declarator.parent();
    let mut depth = 0;
    while let Some(node) = current {
        let kind = node.kind();
        if BLOCK_CONTAINERS.contains(&kind) {
            return Scope::Block;
        }
        if FUNCTION_CONTAINERS.contains(&kind) {
            return Scope::Function;
        }
        if CLASS_CONTAINERS.contains(&kind) {
            return Scope::Class;
        }
        if FILE_CONTAINERS.contains(&kind) {
            return Scope::File;
        }
        depth += 1;
        if depth >= SCOPE_WALK_LIMIT {
            break;
        }
        current = node.parent();
    }
    Scope::File
}

/// Bound names of a destructuring pattern. Pair patterns recurse into their
/// value side; default values recurse into their target only.
pub(crate) fn collect_pattern_identifiers(node: Node, ctx: &ResolveCtx, out: &mut Vec<String>) {
    match node.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            let text = ctx.text(node).trim().to_string();
            if !text.is_empty() && !out.contains(&text) {
                out.push(text);
            }
        }
        "pair_pattern" => {
            if let Some(value) = node.child_by_field_name("value") {
                collect_pattern_identifiers(value, ctx, out);
            }
        }
        "assignment_pattern" | "object_assignment_pattern" => {
            if let Some(left) = node.child_by_field_name("left") {
                collect_pattern_identifiers(left, ctx, out);
            }
        }
        _ => {
            for i in 0..node.named_child_count() {
                if let Some(child) = node.named_child(i) {
                    collect_pattern_identifiers(child, ctx, out);
                }
            }
        }
    }
}

/// Parameter extraction for both plain and typed (TypeScript) forms.
pub(crate) fn parse_parameters(node: Node, ctx: &ResolveCtx) -> Vec<Parameter> {
    let mut out = Vec::new();
    for i in 0..node.named_child_count() {
        let Some(param) = node.named_child(i) else {
            continue;
        };
        match param.kind() {
            "identifier" => out.push(Parameter {
                name: ctx.text(param).to_string(),
                types: Vec::new(),
            }),
            "object_pattern" | "array_pattern" => {
                let mut names = Vec::new();
                collect_pattern_identifiers(param, ctx, &mut names);
                out.extend(names.into_iter().map(|name| Parameter {
                    name,
                    types: Vec::new(),
                }));
            }
            "assignment_pattern" => {
                if let Some(left) = param.child_by_field_name("left") {
                    let mut names = Vec::new();
                    collect_pattern_identifiers(left, ctx, &mut names);
                    out.extend(names.into_iter().map(|name| Parameter {
                        name,
                        types: Vec::new(),
                    }));
                }
            }
            "rest_parameter" | "rest_pattern" => {
                let mut names = Vec::new();
                collect_pattern_identifiers(param, ctx, &mut names);
                out.extend(names.into_iter().map(|name| Parameter {
                    name,
                    types: Vec::new(),
                }));
            }
            // TypeScript typed forms.
            "required_parameter" | "optional_parameter" => {
                let name = param
                    .child_by_field_name("pattern")
                    .map(|n| ctx.text(n).trim().to_string())
                    .unwrap_or_default();
                if name.is_empty() {
                    continue;
                }
                let types = param
                    .child_by_field_name("type")
                    .map(|n| super::typescript::ts_type_names(ctx.text(n)))
                    .unwrap_or_default();
                out.push(Parameter { name, types });
            }
            _ => {}
        }
    }
    out
}

/// Arrow functions take either a bare identifier or a parameter list.
pub(crate) fn arrow_parameters(arrow: Node, ctx: &ResolveCtx) -> Vec<Parameter> {
    if let Some(single) = arrow.child_by_field_name("parameter") {
        let text = ctx.text(single).trim().to_string();
        if text.is_empty() {
            return Vec::new();
        }
        return vec![Parameter {
            name: text,
            types: Vec::new(),
        }];
    }
    arrow
        .child_by_field_name("parameters")
        .map(|n| parse_parameters(n, ctx))
        .unwrap_or_default()
}

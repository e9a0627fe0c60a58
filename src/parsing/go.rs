//! Go resolver.
//!
//! Parameter lists are decomposed textually: Go groups names before a shared
//! type (`a, b int`) and nests parentheses for function-typed parameters, so
//! the parser tracks bracket depth, splits on top-level commas, and decides
//! per segment whether it holds a name, a type, or both.

use tree_sitter::Node;

use super::node_ext::NodeExt;
use super::resolver::{
    split_owner_chain, update_root_element, ElementResolver, MatchCaptures, ResolveCtx,
};
use crate::error::ResolveError;
use crate::model::{BaseElement, Declaration, Element, Field, Parameter, Reference, Variable};
use crate::types::{ElementKind, Scope, PRIMITIVE_SENTINEL};

const GO_BUILTIN_TYPES: [&str; 20] = [
    "bool", "string", "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16",
    "uint32", "uint64", "uintptr", "byte", "rune", "float32", "float64", "complex64",
    "complex128", "error",
];

pub struct GoResolver;

impl GoResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GoResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Exported names are visible project-wide, everything else package-wide.
fn scope_for(name: &str) -> Scope {
    if name.chars().next().is_some_and(|c| c.is_uppercase()) {
        Scope::Project
    } else {
        Scope::Package
    }
}

fn is_builtin(name: &str) -> bool {
    GO_BUILTIN_TYPES.contains(&name)
}

fn is_standard_library(path: &str) -> bool {
    !path.contains('.')
}

impl ElementResolver for GoResolver {
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
            ElementKind::Function => resolve_function(root, m, ctx),
            ElementKind::Method => resolve_method(root, m, ctx),
            ElementKind::Class => resolve_struct(root, m, ctx),
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
    let path = m
        .find_node("definition.import.source")
        .map(|n| ctx.text(n).trim().trim_matches('"').to_string())
        .unwrap_or_default();
    if path.is_empty() {
        return Err(ResolveError::EmptyImport);
    }
    import.alias = m
        .find_node("definition.import.alias")
        .map(|n| ctx.text(n).trim().to_string())
        .unwrap_or_default();
    // The grammar gives no name; default to the last path segment.
    import.base.name = if import.alias.is_empty() || import.alias == "_" || import.alias == "." {
        path.rsplit('/').next().unwrap_or(&path).to_string()
    } else {
        import.alias.clone()
    };
    // Heuristic: a path without dots is the standard library. Vendored
    // imports without dots are misclassified; accepted. Resolution to
    // workspace files is delegated, so file_paths stays empty either way.
    import.base.scope = if is_standard_library(&path) {
        Scope::File
    } else {
        Scope::Package
    };
    import.source = path;
    Ok(vec![Element::Import(import)])
}

fn resolve_package(mut root: Element) -> Result<Vec<Element>, ResolveError> {
    root.base_mut().scope = Scope::Project;
    Ok(vec![root])
}

fn resolve_function(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Function(mut function) = root else {
        return Ok(vec![root]);
    };
    function.base.scope = scope_for(&function.base.name);
    function.decl = Declaration {
        modifier: String::new(),
        name: function.base.name.clone(),
        parameters: m
            .find_node("definition.function.parameters")
            .map(|n| parse_parameters(ctx.text(n)))
            .unwrap_or_default(),
        return_types: m
            .find_node("definition.function.return_type")
            .map(|n| parse_return_types(ctx.text(n)))
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
    method.base.scope = scope_for(&method.base.name);
    method.owner = m
        .find_node("definition.method.owner")
        .map(|n| receiver_type(ctx.text(n)))
        .unwrap_or_default();
    method.decl = Declaration {
        modifier: String::new(),
        name: method.base.name.clone(),
        parameters: m
            .find_node("definition.method.parameters")
            .map(|n| parse_parameters(ctx.text(n)))
            .unwrap_or_default(),
        return_types: m
            .find_node("definition.method.return_type")
            .map(|n| parse_return_types(ctx.text(n)))
            .unwrap_or_default(),
    };
    Ok(vec![Element::Method(method)])
}

fn resolve_struct(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Class(mut class) = root else {
        return Ok(vec![root]);
    };
    class.base.scope = scope_for(&class.base.name);

    if let Some(body) = m.find_node("definition.class.body") {
        if let Some(list) = body.child_by_field_name("body").or_else(|| {
            (0..body.named_child_count())
                .filter_map(|i| body.named_child(i))
                .find(|n| n.kind() == "field_declaration_list")
        }) {
            for i in 0..list.named_child_count() {
                let Some(field) = list.named_child(i) else {
                    continue;
                };
                if field.kind() != "field_declaration" {
                    continue;
                }
                let type_text = field
                    .child_by_field_name("type")
                    .map(|n| ctx.text(n).trim().to_string())
                    .unwrap_or_default();
                let mut cursor = field.walk();
                let mut named_any = false;
                for name_node in field.children_by_field_name("name", &mut cursor) {
                    named_any = true;
                    class.fields.push(Field {
                        modifier: String::new(),
                        name: ctx.text(name_node).trim().to_string(),
                        field_type: type_text.clone(),
                    });
                }
                // Anonymous embedded field: the type is the name.
                if !named_any && !type_text.is_empty() {
                    class.fields.push(Field {
                        modifier: String::new(),
                        name: type_text.trim_start_matches('*').to_string(),
                        field_type: type_text.clone(),
                    });
                }
            }
        }
    }

    Ok(vec![Element::Class(class)])
}

fn resolve_interface(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Interface(mut interface) = root else {
        return Ok(vec![root]);
    };
    interface.base.scope = scope_for(&interface.base.name);

    if let Some(body) = m.find_node("definition.interface.body") {
        for i in 0..body.named_child_count() {
            let Some(member) = body.named_child(i) else {
                continue;
            };
            match member.kind() {
                // Grammar revisions renamed method_spec to method_elem.
                "method_elem" | "method_spec" => {
                    let name = member
                        .child_by_field_name("name")
                        .map(|n| ctx.text(n).trim().to_string())
                        .unwrap_or_default();
                    if name.is_empty() {
                        continue;
                    }
                    interface.methods.push(Declaration {
                        modifier: String::new(),
                        name,
                        parameters: member
                            .child_by_field_name("parameters")
                            .map(|n| parse_parameters(ctx.text(n)))
                            .unwrap_or_default(),
                        return_types: member
                            .child_by_field_name("result")
                            .map(|n| parse_return_types(ctx.text(n)))
                            .unwrap_or_default(),
                    });
                }
                "type_elem" | "interface_type_name" => {
                    let text = ctx.text(member).trim().to_string();
                    if !text.is_empty() {
                        interface.super_interfaces.push(text);
                    }
                }
                _ => {}
            }
        }
    }

    Ok(vec![Element::Interface(interface)])
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

    if root_node.kind() == "short_var_declaration" {
        return resolve_short_var(template, root_node, ctx);
    }

    // var_spec: the query yields one match per declared name.
    let name = template.base.name.clone();
    if name.is_empty() {
        return Ok(vec![]);
    }
    let mut variable = template;
    variable.base.scope = scope_for(&name);
    variable.variable_type = root_node
        .child_by_field_name("type")
        .map(|n| go_type_names(ctx.text(n)))
        .unwrap_or_else(|| vec![PRIMITIVE_SENTINEL.to_string()]);

    let mut out = references_for_types(&variable.variable_type, &variable.base);
    out.insert(0, Element::Variable(variable));
    Ok(out)
}

/// `a, b := f(), g()`: align left-hand identifiers with right-hand
/// expressions and emit one variable per name.
fn resolve_short_var(
    template: Variable,
    root_node: Node,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let mut out = Vec::new();

    let lhs = root_node.child_by_field_name("left");
    let rhs = root_node.child_by_field_name("right");

    let names: Vec<String> = lhs
        .map(|list| {
            (0..list.named_child_count())
                .filter_map(|i| list.named_child(i))
                .filter(|n| n.kind() == "identifier")
                .map(|n| ctx.text(n).trim().to_string())
                .collect()
        })
        .unwrap_or_default();

    let values: Vec<Node> = rhs
        .map(|list| {
            (0..list.named_child_count())
                .filter_map(|i| list.named_child(i))
                .collect()
        })
        .unwrap_or_default();

    for (i, name) in names.iter().enumerate() {
        if name.is_empty() || name == "_" {
            continue;
        }
        let aligned = values.get(i).or_else(|| values.first());
        let mut variable_type = vec![PRIMITIVE_SENTINEL.to_string()];
        if let Some(value) = aligned {
            if value.kind() == "composite_literal" {
                if let Some(type_node) = value.child_by_field_name("type") {
                    let type_text = ctx.text(type_node).trim().to_string();
                    let names = go_type_names(&type_text);
                    if names.first().map(String::as_str) != Some(PRIMITIVE_SENTINEL) {
                        variable_type = names;
                    }
                }
            } else if value.kind() == "selector_expression" {
                // Qualified use, e.g. `pkg.Thing` — a reference, not a type.
                let owner = value
                    .child_by_field_name("operand")
                    .map(|n| ctx.text(n).trim().to_string())
                    .unwrap_or_default();
                let field = value
                    .child_by_field_name("field")
                    .map(|n| ctx.text(n).trim().to_string())
                    .unwrap_or_default();
                if !field.is_empty() {
                    out.push(Element::Reference(Reference {
                        base: BaseElement {
                            name: field,
                            scope: Scope::File,
                            ..template.base.clone()
                        },
                        owner,
                    }));
                }
            }
        }
        out.push(Element::Variable(Variable {
            base: BaseElement {
                name: name.clone(),
                scope: scope_for(name),
                ..template.base.clone()
            },
            variable_type: variable_type.clone(),
        }));
        out.extend(references_for_types(&variable_type, &template.base));
    }

    Ok(out)
}

fn references_for_types(types: &[String], base: &BaseElement) -> Vec<Element> {
    types
        .iter()
        .filter(|t| *t != PRIMITIVE_SENTINEL)
        .map(|t| {
            // Qualified types reference the bare name with the package as
            // owner.
            let (owner, name) = split_owner_chain(t);
            Element::Reference(Reference {
                base: BaseElement {
                    name,
                    scope: Scope::File,
                    ..base.clone()
                },
                owner,
            })
        })
        .collect()
}

fn resolve_call(
    root: Element,
    m: &MatchCaptures,
    ctx: &ResolveCtx,
) -> Result<Vec<Element>, ResolveError> {
    let Element::Call(mut call) = root else {
        return Ok(vec![root]);
    };
    call.base.name = m
        .find_node("call.name")
        .map(|n| ctx.text(n).trim().to_string())
        .unwrap_or_default();
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

/// Strip the receiver's parentheses and pointer sigil: `(s *Server)` → `Server`.
fn receiver_type(text: &str) -> String {
    let inner = strip_outer_parens(text.trim());
    inner
        .split_whitespace()
        .last()
        .unwrap_or("")
        .trim_start_matches('*')
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_string()
}

fn strip_outer_parens(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(stripped) = trimmed.strip_prefix('(') {
        if let Some(inner) = stripped.strip_suffix(')') {
            return inner;
        }
    }
    trimmed
}

/// Split on commas at bracket depth zero.
fn split_top_level(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                segments.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        segments.push(current.trim().to_string());
    }
    segments.retain(|s| !s.is_empty());
    segments
}

/// Decompose a Go parameter list. A segment with several tokens declares
/// `name type`; a lone token is a name when any sibling declared a type
/// (which then also applies leftward), otherwise a bare type.
fn parse_parameters(text: &str) -> Vec<Parameter> {
    let inner = strip_outer_parens(text).to_string();
    let segments = split_top_level(&inner);
    if segments.is_empty() {
        return Vec::new();
    }

    let named_mode = segments
        .iter()
        .any(|s| s.split_whitespace().count() >= 2);

    let mut reversed: Vec<Parameter> = Vec::new();
    let mut carried_type = String::new();
    for segment in segments.iter().rev() {
        let mut tokens = segment.split_whitespace();
        let first = tokens.next().unwrap_or("").to_string();
        let rest: Vec<&str> = tokens.collect();
        if !rest.is_empty() {
            carried_type = rest.join(" ");
            reversed.push(Parameter {
                name: first,
                types: go_type_names(&carried_type),
            });
        } else if named_mode {
            reversed.push(Parameter {
                name: first,
                types: go_type_names(&carried_type),
            });
        } else {
            reversed.push(Parameter {
                name: String::new(),
                types: go_type_names(&first),
            });
        }
    }
    reversed.reverse();
    reversed
}

/// Return types: `(a, b int)` elides repeated types leftward; a bare list
/// `(int, error)` is all types.
fn parse_return_types(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if !trimmed.starts_with('(') {
        return vec![clean_type_text(trimmed)];
    }

    let segments = split_top_level(strip_outer_parens(trimmed));
    let named_mode = segments
        .iter()
        .any(|s| s.split_whitespace().count() >= 2);

    let mut reversed = Vec::new();
    let mut carried_type = String::new();
    for segment in segments.iter().rev() {
        let mut tokens = segment.split_whitespace();
        let first = tokens.next().unwrap_or("").to_string();
        let rest: Vec<&str> = tokens.collect();
        if !rest.is_empty() {
            carried_type = rest.join(" ");
            reversed.push(clean_type_text(&carried_type));
        } else if named_mode {
            reversed.push(clean_type_text(&carried_type));
        } else {
            reversed.push(clean_type_text(&first));
        }
    }
    reversed.reverse();
    reversed
}

fn clean_type_text(text: &str) -> String {
    text.trim()
        .trim_start_matches("...")
        .trim_start_matches('*')
        .to_string()
}

/// Custom type names mentioned in a type expression; primitives collapse to
/// the sentinel.
fn go_type_names(text: &str) -> Vec<String> {
    let cleaned = clean_type_text(text);
    let bare = cleaned
        .trim_start_matches("[]")
        .trim_start_matches('*')
        .trim();
    if bare.is_empty() || is_builtin(bare) || bare.starts_with("func") || bare.starts_with("map[")
        || bare.starts_with("chan ") || bare.starts_with("interface{") || bare.starts_with("struct{")
    {
        return vec![PRIMITIVE_SENTINEL.to_string()];
    }
    vec![bare.to_string()]
}

//! Python resolver.
//!
//! Imports are fully resolved against source roots, with relative imports
//! walking up one directory per leading dot and trying both `pkg/mod.py`
//! and `pkg/mod/__init__.py`. Definitions are pass-through: the named root
//! element is kept as captured.

use std::path::Path;

use tree_sitter::Node;

use super::resolver::{update_root_element, ElementResolver, MatchCaptures, ResolveCtx};
use crate::error::ResolveError;
use crate::model::{Element, Import};
use crate::types::{ElementKind, Scope};

pub struct PythonResolver;

impl PythonResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PythonResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementResolver for PythonResolver {
    fn resolve(
        &self,
        mut root: Element,
        m: &MatchCaptures,
        ctx: &ResolveCtx,
    ) -> Result<Vec<Element>, ResolveError> {
        update_root_element(&mut root, m, ctx);
        match root.kind() {
            ElementKind::Import => resolve_import(root, m, ctx),
            ElementKind::Function | ElementKind::Class => {
                root.base_mut().scope = Scope::File;
                Ok(vec![root])
            }
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
    let Element::Import(template) = root else {
        return Ok(vec![root]);
    };
    let Some(root_node) = m.root().map(|c| c.node) else {
        return Err(ResolveError::EmptyImport);
    };

    let mut out = Vec::new();
    match root_node.kind() {
        "import_statement" => {
            // `import a.b, c as d`: one element per imported module.
            for i in 0..root_node.named_child_count() {
                let Some(child) = root_node.named_child(i) else {
                    continue;
                };
                match child.kind() {
                    "dotted_name" => {
                        let module = ctx.text(child).trim().to_string();
                        push_import(&template, &module, &module, "", ctx, &mut out);
                    }
                    "aliased_import" => {
                        let module = child
                            .child_by_field_name("name")
                            .map(|n| ctx.text(n).trim().to_string())
                            .unwrap_or_default();
                        let alias = child
                            .child_by_field_name("alias")
                            .map(|n| ctx.text(n).trim().to_string())
                            .unwrap_or_default();
                        push_import(&template, &module, &module, &alias, ctx, &mut out);
                    }
                    _ => {}
                }
            }
        }
        "import_from_statement" => {
            let module = root_node
                .child_by_field_name("module_name")
                .map(|n| ctx.text(n).trim().to_string())
                .unwrap_or_default();
            let mut any = false;
            let mut cursor = root_node.walk();
            for name_node in root_node.children_by_field_name("name", &mut cursor) {
                let (name, alias) = imported_binding(name_node, ctx);
                if !name.is_empty() {
                    push_import(&template, &name, &module, &alias, ctx, &mut out);
                    any = true;
                }
            }
            if !any && !module.is_empty() {
                // `from x import *`
                push_import(&template, &module, &module, "", ctx, &mut out);
            }
        }
        _ => {}
    }

    if out.is_empty() {
        return Err(ResolveError::EmptyImport);
    }
    Ok(out)
}

fn imported_binding(node: Node, ctx: &ResolveCtx) -> (String, String) {
    if node.kind() == "aliased_import" {
        let name = node
            .child_by_field_name("name")
            .map(|n| ctx.text(n).trim().to_string())
            .unwrap_or_default();
        let alias = node
            .child_by_field_name("alias")
            .map(|n| ctx.text(n).trim().to_string())
            .unwrap_or_default();
        (name, alias)
    } else {
        (ctx.text(node).trim().to_string(), String::new())
    }
}

fn push_import(
    template: &Import,
    name: &str,
    module: &str,
    alias: &str,
    ctx: &ResolveCtx,
    out: &mut Vec<Element>,
) {
    let mut import = template.clone();
    import.base.name = name.to_string();
    import.base.scope = Scope::File;
    import.source = module.to_string();
    import.alias = alias.to_string();
    import.file_paths = resolve_module_paths(module, ctx);
    out.push(Element::Import(import));
}

/// Interpret a dotted module path against the project layout.
fn resolve_module_paths(module: &str, ctx: &ResolveCtx) -> Vec<String> {
    let Some(project) = ctx.project else {
        return Vec::new();
    };
    if module.is_empty() {
        return Vec::new();
    }

    let dots = module.chars().take_while(|c| *c == '.').count();
    let rest = &module[dots..];
    let rel = rest.replace('.', "/");

    let candidates = |base: Option<&Path>| -> Vec<String> {
        let mut hits = Vec::new();
        if !rel.is_empty() {
            hits.extend(project.resolve_candidates(base, &format!("{rel}.py")));
            hits.extend(project.resolve_candidates(base, &format!("{rel}/__init__.py")));
        } else if let Some(dir) = base {
            hits.extend(project.resolve_candidates(Some(dir), "__init__.py"));
        }
        hits
    };

    if dots > 0 {
        // One leading dot anchors at the current directory; each additional
        // dot walks one directory up.
        let mut base = Path::new(ctx.path).parent().map(Path::to_path_buf);
        for _ in 1..dots {
            base = base.as_deref().and_then(Path::parent).map(Path::to_path_buf);
        }
        let mut hits = candidates(base.as_deref());
        hits.dedup();
        return hits;
    }

    let mut hits: Vec<String> = Vec::new();
    for hit in candidates(None) {
        if !hits.contains(&hit) {
            hits.push(hit);
        }
    }
    hits
}

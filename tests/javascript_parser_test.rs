//! JavaScript extraction: require transform, destructuring fan-out, arrow
//! promotion, class bodies.

use std::sync::Arc;

use codegraph::model::Element;
use codegraph::parsing::{FileParser, Language, LanguageRegistry, ParsedFile};
use codegraph::types::Scope;
use codegraph::Settings;

fn parse(source: &str) -> ParsedFile {
    let registry = Arc::new(LanguageRegistry::new(&Settings::default()).unwrap());
    FileParser::new(registry)
        .parse_source("/ws/app/index.js", source.as_bytes(), Language::JavaScript, None)
        .unwrap()
}

#[test]
fn require_becomes_an_import_and_nothing_else() {
    let parsed = parse("const fs = require(\"fs\");\n");

    let import = parsed
        .imports
        .iter()
        .find(|i| i.source == "fs")
        .expect("require import");
    assert_eq!(import.base.name, "fs");

    // Neither the declarator nor the call survives as its own element.
    assert!(!parsed
        .elements
        .iter()
        .any(|e| matches!(e, Element::Variable(v) if v.base.name == "fs")));
    assert!(!parsed
        .elements
        .iter()
        .any(|e| matches!(e, Element::Call(c) if c.base.name == "require")));
}

#[test]
fn destructuring_emits_one_variable_per_bound_name() {
    let parsed = parse("const { a, b: c, ...rest } = obj;\n");
    let mut names: Vec<&str> = parsed
        .elements
        .iter()
        .filter_map(|e| match e {
            Element::Variable(v) => Some(v.base.name.as_str()),
            _ => None,
        })
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["a", "c", "rest"]);

    for element in &parsed.elements {
        if let Element::Variable(v) = element {
            assert_eq!(v.base.scope, Scope::Block);
        }
    }
}

#[test]
fn array_destructuring_also_fans_out() {
    let parsed = parse("let [first, second] = pair;\n");
    let names: Vec<&str> = parsed
        .elements
        .iter()
        .filter_map(|e| match e {
            Element::Variable(v) => Some(v.base.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn arrow_initializers_become_functions() {
    let parsed = parse("const add = (x, y) => x + y;\n");
    let add = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Function(f) if f.base.name == "add" => Some(f),
            _ => None,
        })
        .expect("arrow function");
    assert_eq!(add.decl.modifier, "arrow");
    let names: Vec<&str> = add.decl.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["x", "y"]);

    // No variable is emitted for the binding.
    assert!(!parsed
        .elements
        .iter()
        .any(|e| matches!(e, Element::Variable(_))));
}

#[test]
fn var_scope_follows_the_enclosing_function() {
    let parsed = parse("function wrap() { var inner = 1; }\nvar top = 2;\n");
    let inner = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Variable(v) if v.base.name == "inner" => Some(v),
            _ => None,
        })
        .expect("inner var");
    assert_eq!(inner.base.scope, Scope::Function);

    let top = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Variable(v) if v.base.name == "top" => Some(v),
            _ => None,
        })
        .expect("top var");
    assert_eq!(top.base.scope, Scope::File);
}

#[test]
fn class_bodies_collect_methods_and_private_markers() {
    let source = r#"class Box {
  #secret() { return 1; }
  get size() { return 2; }
  static of(value) { return new Box(); }
}
"#;
    let parsed = parse(source);
    let class = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Class(c) => Some(c),
            _ => None,
        })
        .expect("class element");
    assert_eq!(class.base.name, "Box");

    let by_name: std::collections::HashMap<&str, &str> = class
        .methods
        .iter()
        .map(|m| (m.name.as_str(), m.modifier.as_str()))
        .collect();
    assert_eq!(by_name["secret"], "private");
    assert_eq!(by_name["size"], "get");
    assert_eq!(by_name["of"], "static");

    // Method elements are emitted too, with the stripped name and owner.
    let secret = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Method(m) if m.base.name == "secret" => Some(m),
            _ => None,
        })
        .expect("private method element");
    assert_eq!(secret.owner, "Box");
    assert_eq!(secret.decl.modifier, "private");
}

#[test]
fn imports_prefer_the_default_binding_name() {
    let parsed = parse("import helper, { other } from \"./util.js\";\n");
    let import = parsed
        .imports
        .iter()
        .find(|i| i.source == "./util.js")
        .expect("esm import");
    assert_eq!(import.base.name, "helper");
}

#[test]
fn member_calls_flatten_the_receiver() {
    let parsed = parse("api.client.fetch(url);\n");
    let call = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Call(c) if c.base.name == "fetch" => Some(c),
            _ => None,
        })
        .expect("member call");
    assert_eq!(call.owner, "api.client");
}

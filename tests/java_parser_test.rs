//! Java extraction: methods with owners, visibility scopes, implicit
//! imports and references from types.

use std::sync::Arc;

use codegraph::model::Element;
use codegraph::parsing::{FileParser, Language, LanguageRegistry, ParsedFile};
use codegraph::types::{ElementKind, Scope};
use codegraph::Settings;

fn parse(source: &str) -> ParsedFile {
    let registry = Arc::new(LanguageRegistry::new(&Settings::default()).unwrap());
    FileParser::new(registry)
        .parse_source("/ws/src/Demo.java", source.as_bytes(), Language::Java, None)
        .unwrap()
}

const SOURCE: &str = r#"package com.acme.api;

import com.acme.common.CommonResult;

public class SmsController extends BaseController {
    private CommonResult cached;

    public CommonResult list(int size) {
        CommonResult data = CommonResult.success(size);
        return data;
    }

    String label() {
        return "sms";
    }
}
"#;

#[test]
fn package_and_import_are_extracted() {
    let parsed = parse(SOURCE);
    assert_eq!(
        parsed.package.as_ref().map(|p| p.base.name.as_str()),
        Some("com.acme.api")
    );
    let import = parsed
        .imports
        .iter()
        .find(|i| i.base.name == "com.acme.common.CommonResult")
        .expect("explicit import");
    assert_eq!(import.source, "com/acme/common/CommonResult");
}

#[test]
fn class_with_superclass_emits_reference() {
    let parsed = parse(SOURCE);
    let class = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Class(c) => Some(c),
            _ => None,
        })
        .expect("class element");
    assert_eq!(class.base.name, "SmsController");
    assert_eq!(class.base.scope, Scope::Project);
    assert_eq!(class.super_classes, vec!["BaseController"]);

    assert!(parsed.elements.iter().any(
        |e| matches!(e, Element::Reference(r) if r.base.name == "BaseController")
    ));
}

#[test]
fn methods_carry_owner_modifier_and_signature() {
    let parsed = parse(SOURCE);
    let list = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Method(m) if m.base.name == "list" => Some(m),
            _ => None,
        })
        .expect("list method");
    assert_eq!(list.owner, "SmsController");
    assert_eq!(list.decl.modifier, "public");
    assert_eq!(list.base.scope, Scope::Project);
    assert_eq!(list.decl.parameters.len(), 1);
    assert_eq!(list.decl.parameters[0].name, "size");
    assert!(list.decl.return_types.contains(&"CommonResult".to_string()));

    // No modifier in a class defaults to package-private.
    let label = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Method(m) if m.base.name == "label" => Some(m),
            _ => None,
        })
        .expect("label method");
    assert_eq!(label.decl.modifier, "package-private");
    assert_eq!(label.base.scope, Scope::Package);
}

#[test]
fn fields_and_locals_become_variables_with_type_references() {
    let parsed = parse(SOURCE);
    let cached = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Variable(v) if v.base.name == "cached" => Some(v),
            _ => None,
        })
        .expect("field variable");
    assert_eq!(cached.base.scope, Scope::Class);
    assert_eq!(cached.variable_type, vec!["CommonResult"]);

    let data = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Variable(v) if v.base.name == "data" => Some(v),
            _ => None,
        })
        .expect("local variable");
    assert_eq!(data.base.scope, Scope::Block);

    // Custom types imply imports usable by the query filter.
    assert!(parsed
        .imports
        .iter()
        .any(|i| i.base.name == "CommonResult"));
}

#[test]
fn method_invocations_become_calls_with_owner() {
    let parsed = parse(SOURCE);
    let call = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Call(c) if c.base.name == "success" => Some(c),
            _ => None,
        })
        .expect("success call");
    assert_eq!(call.owner, "CommonResult");
    assert_eq!(call.parameters.len(), 1);
    assert_eq!(call.parameters[0].name, "size");
}

#[test]
fn constructors_and_new_expressions() {
    let source = r#"package p;

class Factory {
    Factory() {}

    Object build() {
        return new com.acme.Widget(1);
    }
}
"#;
    let parsed = parse(source);
    assert!(parsed.elements.iter().any(
        |e| matches!(e, Element::Method(m) if m.base.name == "Factory" && m.owner == "Factory")
    ));

    let call = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Call(c) if c.base.name == "Widget" => Some(c),
            _ => None,
        })
        .expect("constructor call");
    assert_eq!(call.owner, "com.acme");

    assert!(parsed.elements.iter().any(
        |e| matches!(e, Element::Reference(r) if r.base.name == "Widget" && r.owner == "com.acme")
    ));
}

#[test]
fn every_element_is_valid() {
    let parsed = parse(SOURCE);
    for element in &parsed.elements {
        assert!(!element.name().is_empty(), "{element:?}");
        assert!(!element.base().path.is_empty());
        assert_ne!(element.kind(), ElementKind::Undefined);
    }
}

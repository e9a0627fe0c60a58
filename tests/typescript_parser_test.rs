//! TypeScript extraction: annotations on variables and destructurings,
//! typed arrows, interfaces.

use std::sync::Arc;

use codegraph::model::Element;
use codegraph::parsing::{FileParser, Language, LanguageRegistry, ParsedFile};
use codegraph::types::PRIMITIVE_SENTINEL;
use codegraph::Settings;

fn parse(source: &str) -> ParsedFile {
    let registry = Arc::new(LanguageRegistry::new(&Settings::default()).unwrap());
    FileParser::new(registry)
        .parse_source("/ws/app/main.ts", source.as_bytes(), Language::TypeScript, None)
        .unwrap()
}

#[test]
fn annotated_variables_carry_their_type() {
    let parsed = parse("const w: Widget = make();\n");
    let w = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Variable(v) if v.base.name == "w" => Some(v),
            _ => None,
        })
        .expect("annotated variable");
    assert_eq!(w.variable_type, vec!["Widget"]);

    assert!(parsed.elements.iter().any(
        |e| matches!(e, Element::Reference(r) if r.base.name == "Widget")
    ));
}

#[test]
fn primitive_annotations_collapse_to_the_sentinel() {
    let parsed = parse("const n: number = 1;\n");
    let n = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Variable(v) if v.base.name == "n" => Some(v),
            _ => None,
        })
        .expect("primitive variable");
    assert_eq!(n.variable_type, vec![PRIMITIVE_SENTINEL]);
}

#[test]
fn object_type_annotations_distribute_over_destructuring() {
    let parsed = parse("const { a, b }: { a: Widget; b: string } = pair;\n");

    let a = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Variable(v) if v.base.name == "a" => Some(v),
            _ => None,
        })
        .expect("a");
    assert_eq!(a.variable_type, vec!["Widget"]);

    let b = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Variable(v) if v.base.name == "b" => Some(v),
            _ => None,
        })
        .expect("b");
    assert_eq!(b.variable_type, vec![PRIMITIVE_SENTINEL]);
}

#[test]
fn typed_arrows_extract_parameters_and_return_type() {
    let parsed = parse("const compute = (x: number, label: string): Widget => make();\n");
    let compute = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Function(f) if f.base.name == "compute" => Some(f),
            _ => None,
        })
        .expect("typed arrow");
    assert_eq!(compute.decl.modifier, "arrow");
    let names: Vec<&str> = compute
        .decl
        .parameters
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["x", "label"]);
    assert_eq!(compute.decl.return_types, vec!["Widget"]);
}

#[test]
fn interfaces_collect_method_signatures() {
    let source = r#"interface Shape {
  area(): number;
  scale(factor: number): Shape;
}
"#;
    let parsed = parse(source);
    let shape = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Interface(i) => Some(i),
            _ => None,
        })
        .expect("interface");
    assert_eq!(shape.base.name, "Shape");
    let names: Vec<&str> = shape.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["area", "scale"]);
    assert_eq!(shape.methods[1].return_types, vec!["Shape"]);
}

#[test]
fn classes_parse_with_type_identifier_names() {
    let parsed = parse("class Store { load(): void {} }\n");
    assert!(parsed.elements.iter().any(
        |e| matches!(e, Element::Class(c) if c.base.name == "Store")
    ));
    assert!(parsed.elements.iter().any(
        |e| matches!(e, Element::Method(m) if m.base.name == "load" && m.owner == "Store")
    ));
}

#[test]
fn es_imports_still_work() {
    let parsed = parse("import { Widget } from \"./widget\";\n");
    let import = parsed
        .imports
        .iter()
        .find(|i| i.source == "./widget")
        .expect("import");
    assert_eq!(import.base.name, "Widget");
}

//! C extraction: includes (system vs resolved), typedefs, variables with
//! type references, calls.

use std::path::PathBuf;
use std::sync::Arc;

use codegraph::model::Element;
use codegraph::parsing::{FileParser, Language, LanguageRegistry, ParsedFile};
use codegraph::project::ProjectInfo;
use codegraph::types::{Scope, PRIMITIVE_SENTINEL};
use codegraph::Settings;

fn parser() -> FileParser {
    let registry = Arc::new(LanguageRegistry::new(&Settings::default()).unwrap());
    FileParser::new(registry)
}

fn parse(source: &str) -> ParsedFile {
    parser()
        .parse_source("/ws/lib/main.c", source.as_bytes(), Language::C, None)
        .unwrap()
}

#[test]
fn system_includes_keep_angle_brackets_and_resolve_to_nothing() {
    let parsed = parse("#include <stdio.h>\n");
    let import = parsed.imports.first().expect("system include");
    assert_eq!(import.base.name, "<stdio.h>");
    assert!(import.file_paths.is_empty());
    assert_ne!(import.base.scope, Scope::Project);
}

#[test]
fn quoted_includes_resolve_against_the_project_file_set() {
    let files = vec![
        PathBuf::from("/ws/lib/util.h"),
        PathBuf::from("/ws/lib/main.c"),
    ];
    let info = ProjectInfo::new(std::path::Path::new("/ws/lib"), &files);
    let parsed = parser()
        .parse_source(
            "/ws/lib/main.c",
            b"#include \"util.h\"\n",
            Language::C,
            Some(&info),
        )
        .unwrap();
    let import = parsed.imports.first().expect("quoted include");
    assert_eq!(import.base.name, "util.h");
    assert_eq!(import.file_paths, vec!["/ws/lib/util.h".to_string()]);
}

#[test]
fn unresolvable_quoted_includes_have_no_file_paths() {
    let parsed = parse("#include \"missing.h\"\n");
    let import = parsed.imports.first().expect("include");
    assert!(import.file_paths.is_empty());
}

#[test]
fn typedefs_and_structs_become_classes() {
    let source = r#"typedef struct {
    int x;
} LocalDict;

struct point {
    int x;
    int y;
};
"#;
    let parsed = parse(source);
    assert!(parsed.elements.iter().any(
        |e| matches!(e, Element::Class(c) if c.base.name == "LocalDict")
    ));
    assert!(parsed.elements.iter().any(
        |e| matches!(e, Element::Class(c) if c.base.name == "point")
    ));
}

#[test]
fn custom_typed_locals_emit_references() {
    let source = r#"typedef struct { int x; } LocalDict;

int main(void) {
    LocalDict d;
    int plain = 0;
    return 0;
}
"#;
    let parsed = parse(source);

    let d = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Variable(v) if v.base.name == "d" => Some(v),
            _ => None,
        })
        .expect("local with custom type");
    assert_eq!(d.variable_type, vec!["LocalDict"]);
    assert_eq!(d.base.scope, Scope::Block);

    assert!(parsed.elements.iter().any(
        |e| matches!(e, Element::Reference(r) if r.base.name == "LocalDict")
    ));

    let plain = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Variable(v) if v.base.name == "plain" => Some(v),
            _ => None,
        })
        .expect("primitive local");
    assert_eq!(plain.variable_type, vec![PRIMITIVE_SENTINEL]);
}

#[test]
fn functions_expose_signature_and_static_linkage() {
    let source = r#"static int helper(int a, char *name) {
    return a;
}

int run(int a) {
    return helper(a, "x");
}
"#;
    let parsed = parse(source);

    let helper = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Function(f) if f.base.name == "helper" => Some(f),
            _ => None,
        })
        .expect("helper");
    assert_eq!(helper.base.scope, Scope::File);
    assert_eq!(helper.decl.modifier, "static");
    let names: Vec<&str> = helper.decl.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["a", "name"]);
    assert_eq!(helper.decl.return_types, vec!["int"]);

    let run = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Function(f) if f.base.name == "run" => Some(f),
            _ => None,
        })
        .expect("run");
    assert_eq!(run.base.scope, Scope::Project);

    assert!(parsed.elements.iter().any(
        |e| matches!(e, Element::Call(c) if c.base.name == "helper")
    ));
}

#[test]
fn cpp_methods_recover_access_and_owner() {
    let source = r#"class Widget {
public:
    int size() { return 1; }
private:
    int hidden() { return 2; }
};

struct Pod {
    int plain() { return 3; }
};
"#;
    let registry = Arc::new(LanguageRegistry::new(&Settings::default()).unwrap());
    let parsed = FileParser::new(registry)
        .parse_source("/ws/lib/widget.cpp", source.as_bytes(), Language::Cpp, None)
        .unwrap();

    let size = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Method(m) if m.base.name == "size" => Some(m),
            _ => None,
        })
        .expect("public method");
    assert_eq!(size.owner, "Widget");
    assert_eq!(size.base.scope, Scope::Project);

    let hidden = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Method(m) if m.base.name == "hidden" => Some(m),
            _ => None,
        })
        .expect("private method");
    assert_eq!(hidden.base.scope, Scope::Class);

    // No access specifier in a struct: public by default.
    let plain = parsed
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Method(m) if m.base.name == "plain" => Some(m),
            _ => None,
        })
        .expect("struct method");
    assert_eq!(plain.base.scope, Scope::Project);

    // Base classes decompose into names.
    let derived = FileParser::new(Arc::new(
        LanguageRegistry::new(&Settings::default()).unwrap(),
    ))
    .parse_source(
        "/ws/lib/derived.cpp",
        b"class Derived : public Widget, private Pod { };\n",
        Language::Cpp,
        None,
    )
    .unwrap();
    let class = derived
        .elements
        .iter()
        .find_map(|e| match e {
            Element::Class(c) if c.base.name == "Derived" => Some(c),
            _ => None,
        })
        .expect("derived class");
    assert_eq!(class.super_classes, vec!["Widget", "Pod"]);
}

//! Capture queries, one per language.
//!
//! Capture names are drawn from the fixed vocabulary in
//! [`super::resolver::captures`]. Queries stay deliberately shallow: they pin
//! the root node kind and a handful of named fields, and leave structural
//! recovery (owners, modifiers, destructuring, grouped parameters) to the
//! resolvers, which navigate the tree from the captured nodes.

use super::Language;

pub fn query_source(language: Language) -> &'static str {
    match language {
        Language::Java => JAVA,
        Language::Go => GO,
        Language::JavaScript => JAVASCRIPT,
        Language::TypeScript => TYPESCRIPT,
        Language::C => C,
        Language::Cpp => CPP,
        Language::Python => PYTHON,
    }
}

const JAVA: &str = r#"
(package_declaration (scoped_identifier) @definition.package.name) @definition.package
(package_declaration (identifier) @definition.package.name) @definition.package

(import_declaration (scoped_identifier) @definition.import.source) @definition.import
(import_declaration (identifier) @definition.import.source) @definition.import

(class_declaration name: (identifier) @definition.class.name) @definition.class
(enum_declaration name: (identifier) @definition.class.name) @definition.class
(interface_declaration name: (identifier) @definition.interface.name) @definition.interface

(method_declaration
  type: (_) @definition.method.return_type
  name: (identifier) @definition.method.name
  parameters: (formal_parameters) @definition.method.parameters) @definition.method

(constructor_declaration
  name: (identifier) @definition.method.name
  parameters: (formal_parameters) @definition.method.parameters) @definition.method

(field_declaration type: (_) @definition.variable.type) @definition.variable
(local_variable_declaration type: (_) @definition.variable.type) @definition.variable

(method_invocation
  object: (_)? @call.owner
  name: (identifier) @call.name
  arguments: (argument_list) @call.arguments) @call.method

(object_creation_expression
  type: (_) @call.name
  arguments: (argument_list) @call.arguments) @call.function
"#;

const GO: &str = r#"
(package_clause (package_identifier) @definition.package.name) @definition.package

(import_spec
  name: (_)? @definition.import.alias
  path: (_) @definition.import.source) @definition.import

(function_declaration
  name: (identifier) @definition.function.name
  parameters: (parameter_list) @definition.function.parameters
  result: (_)? @definition.function.return_type) @definition.function

(method_declaration
  receiver: (parameter_list) @definition.method.owner
  name: (field_identifier) @definition.method.name
  parameters: (parameter_list) @definition.method.parameters
  result: (_)? @definition.method.return_type) @definition.method

(type_declaration
  (type_spec
    name: (type_identifier) @definition.class.name
    type: (struct_type) @definition.class.body)) @definition.class

(type_declaration
  (type_spec
    name: (type_identifier) @definition.interface.name
    type: (interface_type) @definition.interface.body)) @definition.interface

(short_var_declaration
  left: (expression_list) @definition.variable.name
  right: (expression_list) @definition.variable.value) @definition.variable

(var_spec name: (identifier) @definition.variable.name) @definition.variable

(call_expression
  function: (identifier) @call.name
  arguments: (argument_list) @call.arguments) @call.function

(call_expression
  function: (selector_expression
    operand: (_) @call.owner
    field: (field_identifier) @call.name)
  arguments: (argument_list) @call.arguments) @call.method
"#;

const JAVASCRIPT: &str = r#"
(import_statement source: (string) @definition.import.source) @definition.import

(function_declaration
  name: (identifier) @definition.function.name
  parameters: (formal_parameters) @definition.function.parameters) @definition.function

(generator_function_declaration
  name: (identifier) @definition.function.name
  parameters: (formal_parameters) @definition.function.parameters) @definition.function

(method_definition
  name: (property_identifier) @definition.method.name
  parameters: (formal_parameters) @definition.method.parameters) @definition.method

(method_definition
  name: (private_property_identifier) @definition.method.name
  parameters: (formal_parameters) @definition.method.parameters) @definition.method

(class_declaration
  name: (identifier) @definition.class.name
  body: (class_body) @definition.class.body) @definition.class

(variable_declarator name: (_) @definition.variable.name) @definition.variable

(call_expression
  function: (identifier) @call.name
  arguments: (arguments) @call.arguments) @call.function

(call_expression
  function: (member_expression
    object: (_) @call.owner
    property: (property_identifier) @call.name)
  arguments: (arguments) @call.arguments) @call.method
"#;

const TYPESCRIPT: &str = r#"
(import_statement source: (string) @definition.import.source) @definition.import

(function_declaration
  name: (identifier) @definition.function.name
  parameters: (formal_parameters) @definition.function.parameters) @definition.function

(generator_function_declaration
  name: (identifier) @definition.function.name
  parameters: (formal_parameters) @definition.function.parameters) @definition.function

(method_definition
  name: (property_identifier) @definition.method.name
  parameters: (formal_parameters) @definition.method.parameters) @definition.method

(class_declaration
  name: (type_identifier) @definition.class.name
  body: (class_body) @definition.class.body) @definition.class

(interface_declaration
  name: (type_identifier) @definition.interface.name) @definition.interface

(variable_declarator name: (_) @definition.variable.name) @definition.variable

(call_expression
  function: (identifier) @call.name
  arguments: (arguments) @call.arguments) @call.function

(call_expression
  function: (member_expression
    object: (_) @call.owner
    property: (property_identifier) @call.name)
  arguments: (arguments) @call.arguments) @call.method
"#;

const C: &str = r#"
(preproc_include path: (_) @definition.import.source) @definition.import

(function_definition
  type: (_) @definition.function.return_type
  declarator: (function_declarator
    declarator: (identifier) @definition.function.name
    parameters: (parameter_list) @definition.function.parameters)) @definition.function

(function_definition
  type: (_) @definition.function.return_type
  declarator: (pointer_declarator
    declarator: (function_declarator
      declarator: (identifier) @definition.function.name
      parameters: (parameter_list) @definition.function.parameters))) @definition.function

(declaration
  type: (_) @definition.variable.type
  declarator: (init_declarator
    declarator: (_) @definition.variable.name
    value: (_) @definition.variable.value)) @definition.variable

(declaration
  type: (_) @definition.variable.type
  declarator: (identifier) @definition.variable.name) @definition.variable

(field_declaration
  type: (_) @definition.field.type
  declarator: (field_identifier) @definition.field.name) @definition.variable

(struct_specifier
  name: (type_identifier) @definition.class.name
  body: (field_declaration_list) @definition.class.body) @definition.class

(enum_specifier
  name: (type_identifier) @definition.class.name
  body: (enumerator_list) @definition.class.body) @definition.class

(type_definition
  type: (_)
  declarator: (type_identifier) @definition.class.name) @definition.class

(call_expression
  function: (identifier) @call.name
  arguments: (argument_list) @call.arguments) @call.function

(call_expression
  function: (field_expression
    argument: (_) @call.owner
    field: (field_identifier) @call.name)
  arguments: (argument_list) @call.arguments) @call.method
"#;

const CPP: &str = r#"
(preproc_include path: (_) @definition.import.source) @definition.import

(function_definition
  type: (_) @definition.function.return_type
  declarator: (function_declarator
    declarator: (identifier) @definition.function.name
    parameters: (parameter_list) @definition.function.parameters)) @definition.function

(function_definition
  type: (_)? @definition.method.return_type
  declarator: (function_declarator
    declarator: (field_identifier) @definition.method.name
    parameters: (parameter_list) @definition.method.parameters)) @definition.method

(function_definition
  type: (_)? @definition.method.return_type
  declarator: (function_declarator
    declarator: (qualified_identifier) @definition.method.name
    parameters: (parameter_list) @definition.method.parameters)) @definition.method

(declaration
  type: (_) @definition.variable.type
  declarator: (init_declarator
    declarator: (_) @definition.variable.name
    value: (_) @definition.variable.value)) @definition.variable

(declaration
  type: (_) @definition.variable.type
  declarator: (identifier) @definition.variable.name) @definition.variable

(field_declaration
  type: (_) @definition.field.type
  declarator: (field_identifier) @definition.field.name) @definition.variable

(class_specifier
  name: (type_identifier) @definition.class.name
  body: (field_declaration_list) @definition.class.body) @definition.class

(struct_specifier
  name: (type_identifier) @definition.class.name
  body: (field_declaration_list) @definition.class.body) @definition.class

(type_definition
  type: (_)
  declarator: (type_identifier) @definition.class.name) @definition.class

(call_expression
  function: (identifier) @call.name
  arguments: (argument_list) @call.arguments) @call.function

(call_expression
  function: (field_expression
    argument: (_) @call.owner
    field: (field_identifier) @call.name)
  arguments: (argument_list) @call.arguments) @call.method
"#;

const PYTHON: &str = r#"
(import_statement) @definition.import
(import_from_statement) @definition.import

(function_definition name: (identifier) @definition.function.name) @definition.function
(class_definition name: (identifier) @definition.class.name) @definition.class
"#;

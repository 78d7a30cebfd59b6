//! Parser tests over in-memory sources.

use escript_ast::{
    CaseKind, Node, NodeKind, SourceLoc, TokenGroups, TokenKind, VarKind,
};
use escript_core::{StringInterner, Value};
use escript_diagnostics::{BufferSink, Reporter};
use escript_lexer::{Lexer, Stream};
use escript_parser::{Parser, State};

fn parser_with(src: &str, interner: StringInterner) -> Parser {
    let lexer = Lexer::new(Stream::memory("test.es", src));
    let reporter = Reporter::new("ec", 4, Box::new(BufferSink::default()));
    Parser::new(lexer, interner, reporter, State::default())
}

fn parse(src: &str) -> (Node, usize) {
    let mut p = parser_with(src, StringInterner::new());
    let program = p.parse(None);
    (program, p.reporter().error_count())
}

/// Directives of the program's single module block.
fn directives(program: &Node) -> &Node {
    program
        .left()
        .and_then(Node::left)
        .and_then(Node::left)
        .expect("program shape")
}

fn parse_directive_nodes(src: &str) -> Vec<Node> {
    let (program, errors) = parse(src);
    assert_eq!(errors, 0, "unexpected errors parsing {src:?}");
    directives(&program).children.clone()
}

fn only_directive(src: &str) -> Node {
    let mut nodes = parse_directive_nodes(src);
    assert_eq!(nodes.len(), 1, "expected one directive for {src:?}");
    nodes.remove(0)
}

/// Clear positions and token provenance so trees built from different
/// source text can be compared structurally.
fn strip(mut node: Node) -> Node {
    node.loc = SourceLoc::default();
    node.token = None;
    node.sub = None;
    node.groups = TokenGroups::NONE;
    node.children = node.children.into_iter().map(strip).collect();
    node
}

#[test]
fn test_empty_program_shape() {
    let (program, errors) = parse("");
    assert_eq!(errors, 0);
    assert!(matches!(program.kind, NodeKind::Program));
    let module = program.left().unwrap();
    assert!(matches!(
        module.kind,
        NodeKind::Module {
            default_module: true
        }
    ));
    assert_eq!(directives(&program).num_children(), 0);
}

#[test]
fn test_simple_assignment_shape() {
    let node = only_directive("x = 1 + 2;");
    assert!(matches!(node.kind, NodeKind::AssignOp));
    let lhs = node.left().unwrap();
    assert!(matches!(lhs.kind, NodeKind::Name { .. }));
    let rhs = node.right().unwrap();
    assert!(matches!(rhs.kind, NodeKind::BinaryOp(TokenKind::Plus)));
    assert_eq!(rhs.left().unwrap().value(), Some(&Value::Number(1.0)));
    assert_eq!(rhs.right().unwrap().value(), Some(&Value::Number(2.0)));
}

#[test]
fn test_compound_assignment_rewrites_to_expanded_form() {
    let cases = [
        ("+=", "+"),
        ("-=", "-"),
        ("*=", "*"),
        ("/=", "/"),
        ("%=", "%"),
        ("&=", "&"),
        ("|=", "|"),
        ("^=", "^"),
        ("<<=", "<<"),
        (">>=", ">>"),
        (">>>=", ">>>"),
        ("&&=", "&&"),
        ("||=", "||"),
        ("^^=", "^^"),
    ];
    for (compound, base) in cases {
        let interner = StringInterner::new();
        let mut a = parser_with(&format!("x {compound} y;"), interner.clone());
        let mut b = parser_with(&format!("x = x {base} y;"), interner);
        let got = strip(a.parse(None));
        let want = strip(b.parse(None));
        assert_eq!(a.reporter().error_count(), 0, "{compound}");
        assert_eq!(got, want, "rewrite of {compound} should match {base}");
    }
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let node = only_directive("x = 1 + 2 * 3;");
    let rhs = node.right().unwrap();
    assert!(matches!(rhs.kind, NodeKind::BinaryOp(TokenKind::Plus)));
    let product = rhs.right().unwrap();
    assert!(matches!(product.kind, NodeKind::BinaryOp(TokenKind::Mul)));
}

#[test]
fn test_subtraction_is_left_associative() {
    // (a - b) - c
    let node = only_directive("x = a - b - c;");
    let rhs = node.right().unwrap();
    assert!(matches!(rhs.kind, NodeKind::BinaryOp(TokenKind::Minus)));
    assert!(matches!(
        rhs.left().unwrap().kind,
        NodeKind::BinaryOp(TokenKind::Minus)
    ));
    assert!(matches!(rhs.right().unwrap().kind, NodeKind::Name { .. }));
}

#[test]
fn test_nested_ternary_is_right_associative() {
    // a ? b : (c ? d : e)
    let node = only_directive("x = a ? b : c ? d : e;");
    let rhs = node.right().unwrap();
    assert!(matches!(rhs.kind, NodeKind::If));
    assert_eq!(rhs.num_children(), 3);
    let else_arm = &rhs.children[2];
    assert!(matches!(else_arm.kind, NodeKind::If));
}

#[test]
fn test_assignment_is_right_associative() {
    // a = (b = c)
    let node = only_directive("a = b = c;");
    assert!(matches!(node.kind, NodeKind::AssignOp));
    assert!(matches!(node.right().unwrap().kind, NodeKind::AssignOp));
}

#[test]
fn test_var_definition_with_type_and_init() {
    let node = only_directive("var total: Number = 0;");
    assert!(matches!(node.kind, NodeKind::VarDefinition(VarKind::Var)));
    let assign = node.left().unwrap();
    assert!(matches!(assign.kind, NodeKind::AssignOp));
    let name = assign.left().unwrap();
    assert!(matches!(name.kind, NodeKind::Name { .. }));
    // The declared type rides on the name node.
    assert!(matches!(
        name.left().unwrap().kind,
        NodeKind::Name { .. }
    ));
}

#[test]
fn test_array_literal_synthesizes_indexed_assignments() {
    let interner = StringInterner::new();
    let mut p = parser_with("x = [10, 20];", interner.clone());
    let program = p.parse(None);
    assert_eq!(p.reporter().error_count(), 0);
    let assign = &directives(&program).children[0];
    let lit = assign.right().unwrap();
    assert!(matches!(lit.kind, NodeKind::ArrayLiteral));

    // Child 0 is the default element type.
    let type_name = lit.left().unwrap();
    assert_eq!(
        type_name.qname.map(|q| q.name),
        Some(interner.intern("Array"))
    );

    // Child 1 holds one indexed assignment per element.
    let exprs = lit.right().unwrap();
    assert_eq!(exprs.num_children(), 2);
    for (i, assign) in exprs.children.iter().enumerate() {
        assert!(matches!(assign.kind, NodeKind::AssignOp));
        let dot = assign.left().unwrap();
        assert!(matches!(dot.left().unwrap().kind, NodeKind::Ref));
        assert_eq!(
            dot.right().unwrap().value(),
            Some(&Value::Number(i as f64))
        );
    }
}

#[test]
fn test_array_literal_type_annotation_overrides_array() {
    let interner = StringInterner::new();
    let mut p = parser_with("x = [1, 2]:ByteArray;", interner.clone());
    let program = p.parse(None);
    assert_eq!(p.reporter().error_count(), 0);
    let lit = directives(&program).children[0].right().unwrap();
    assert!(matches!(lit.kind, NodeKind::ArrayLiteral));
    assert_eq!(
        lit.left().unwrap().qname.map(|q| q.name),
        Some(interner.intern("ByteArray"))
    );
}

#[test]
fn test_object_literal_fields() {
    let node = only_directive("x = {a: 1, b: 2};");
    let lit = node.right().unwrap();
    assert!(matches!(lit.kind, NodeKind::ObjectLiteral));
    // Type name plus two fields.
    assert_eq!(lit.num_children(), 3);
    assert!(matches!(lit.children[1].kind, NodeKind::Field(_)));
}

#[test]
fn test_for_in_uses_iterator_get() {
    let interner = StringInterner::new();
    let mut p = parser_with("for (x in items) { }", interner.clone());
    let program = p.parse(None);
    assert_eq!(p.reporter().error_count(), 0);
    // The loop is hoisted inside its own block.
    let block = &directives(&program).children[0];
    assert!(matches!(block.kind, NodeKind::Block));
    let node = block.left().unwrap();
    assert!(matches!(node.kind, NodeKind::ForIn { each: false }));
    let call = &node.children[1];
    assert!(matches!(call.kind, NodeKind::Call));
    let callee = call.left().unwrap();
    let getter = callee.right().unwrap();
    assert_eq!(getter.qname.map(|q| q.name), Some(interner.intern("get")));
}

#[test]
fn test_for_each_in_uses_iterator_get_values() {
    let interner = StringInterner::new();
    let mut p = parser_with("for each (x in items) { }", interner.clone());
    let program = p.parse(None);
    assert_eq!(p.reporter().error_count(), 0);
    let node = directives(&program).children[0].left().unwrap();
    assert!(matches!(node.kind, NodeKind::ForIn { each: true }));
    let getter = node.children[1].left().unwrap().right().unwrap();
    assert_eq!(
        getter.qname.map(|q| q.name),
        Some(interner.intern("getValues"))
    );
}

#[test]
fn test_classic_for_uses_nop_placeholders() {
    let block = only_directive("for (;;) { }");
    assert!(matches!(block.kind, NodeKind::Block));
    let node = block.left().unwrap();
    assert!(matches!(node.kind, NodeKind::For));
    assert_eq!(node.num_children(), 4);
    for clause in &node.children[0..3] {
        assert!(matches!(clause.kind, NodeKind::Nop));
    }
}

#[test]
fn test_class_without_constructor_gets_default_one() {
    let interner = StringInterner::new();
    let mut p = parser_with("class Shape { var x; }", interner.clone());
    let program = p.parse(None);
    assert_eq!(p.reporter().error_count(), 0);
    let class = &directives(&program).children[0];
    let info = class.class().unwrap();
    assert!(!info.has_constructor);

    let body = class.right().unwrap();
    let ctor = body
        .children
        .iter()
        .find_map(|d| d.function())
        .expect("synthesized constructor");
    assert!(ctor.is_constructor);
    assert!(ctor.is_default_constructor);
}

#[test]
fn test_class_with_constructor_is_not_synthesized() {
    let (program, errors) = parse("class Shape { function Shape() { } }");
    assert_eq!(errors, 0);
    let class = &directives(&program).children[0];
    let info = class.class().unwrap();
    assert!(info.has_constructor);

    let body = class.right().unwrap();
    let ctors: Vec<_> = body
        .children
        .iter()
        .filter_map(|d| d.function())
        .filter(|f| f.is_constructor)
        .collect();
    assert_eq!(ctors.len(), 1);
    assert!(!ctors[0].is_default_constructor);
}

#[test]
fn test_getter_function_definition() {
    let node = only_directive("function get width() { return 1; }");
    let info = node.function().unwrap();
    assert!(info.getter);
    assert!(!info.setter);
}

#[test]
fn test_rest_parameter() {
    let node = only_directive("function join(sep, ...parts) { }");
    assert!(node.function().unwrap().has_rest);
}

#[test]
fn test_required_parameter_after_default_is_an_error() {
    let (_, errors) = parse("function f(a = 1, b) { }");
    assert_eq!(errors, 1);
}

#[test]
fn test_return_outside_function_is_an_error() {
    let (_, errors) = parse("return 1;");
    assert_eq!(errors, 1);
}

#[test]
fn test_error_recovery_preserves_siblings() {
    let src = "var ok1 = 1;\nvar bad = ;\nvar ok2 = 2;\n";
    let (program, errors) = parse(src);
    assert!(errors >= 1);
    let kept: Vec<_> = directives(&program)
        .children
        .iter()
        .filter(|d| matches!(d.kind, NodeKind::VarDefinition(_)))
        .collect();
    assert_eq!(kept.len(), 2, "directives before and after survive");
}

#[test]
fn test_unterminated_string_reports_exactly_one_error() {
    let (_, errors) = parse("x = \"abc");
    assert_eq!(errors, 1);
}

#[test]
fn test_virtual_semicolon_at_line_end() {
    let nodes = parse_directive_nodes("x = 1\ny = 2");
    assert_eq!(nodes.len(), 2);
}

#[test]
fn test_missing_semicolon_on_same_line_is_an_error() {
    let (_, errors) = parse("x = 1 y = 2");
    assert!(errors >= 1);
}

#[test]
fn test_switch_case_labels() {
    let node = only_directive(
        "switch (n) { case 1: a = 1; break; default: a = 2; }",
    );
    assert!(matches!(node.kind, NodeKind::Switch));
    let cases = node.right().unwrap();
    assert_eq!(cases.num_children(), 2);
    assert!(matches!(
        cases.children[0].kind,
        NodeKind::CaseLabel(CaseKind::Case)
    ));
    assert!(matches!(
        cases.children[1].kind,
        NodeKind::CaseLabel(CaseKind::Default)
    ));
}

#[test]
fn test_catch_parameter_binds_catch_arg() {
    let node = only_directive("try { } catch (e) { }");
    assert!(matches!(node.kind, NodeKind::Try { has_finally: false }));
    let catches = node.right().unwrap();
    let clause = catches.left().unwrap();
    let block = clause.left().unwrap();
    let first = block.left().unwrap().left().unwrap();
    assert!(matches!(first.kind, NodeKind::VarDefinition(VarKind::Let)));
    let assign = first.left().unwrap();
    assert!(matches!(
        assign.right().unwrap().kind,
        NodeKind::CatchArg
    ));
}

#[test]
fn test_try_without_catch_or_finally_is_an_error() {
    let (_, errors) = parse("try { }");
    assert!(errors >= 1);
}

#[test]
fn test_new_without_arguments_gets_synthesized_call() {
    let node = only_directive("x = new Shape;");
    let new_node = node.right().unwrap();
    assert!(matches!(new_node.kind, NodeKind::New));
    let call = new_node.left().unwrap();
    assert!(matches!(call.kind, NodeKind::Call));
    let args = call.right().unwrap();
    assert!(matches!(args.kind, NodeKind::Args));
    assert_eq!(args.num_children(), 0);
}

#[test]
fn test_qualified_name_reference() {
    let interner = StringInterner::new();
    let mut p = parser_with("x = internal::count;", interner.clone());
    let program = p.parse(None);
    assert_eq!(p.reporter().error_count(), 0);
    let name = directives(&program).children[0].right().unwrap();
    let qname = name.qname.unwrap();
    assert_eq!(qname.name, interner.intern("count"));
    assert_eq!(qname.space, Some(interner.intern("internal")));
}

#[test]
fn test_attributed_definition_with_namespace() {
    let (program, errors) = parse("class C { private static var count = 0; }");
    assert_eq!(errors, 0);
    let class = &directives(&program).children[0];
    let body = class.right().unwrap();
    let var = body
        .children
        .iter()
        .find(|d| matches!(d.kind, NodeKind::VarDefinition(_)))
        .unwrap();
    assert!(var
        .attributes
        .contains(escript_ast::Attributes::STATIC));
}

#[test]
fn test_private_outside_class_is_an_error() {
    let (_, errors) = parse("private var x;");
    assert_eq!(errors, 1);
}

#[test]
fn test_use_strict_pragma() {
    let node = only_directive("use strict;");
    assert!(matches!(node.kind, NodeKind::Pragmas));
    assert!(matches!(
        node.left().unwrap().kind,
        NodeKind::Pragma(escript_ast::PragmaKind::Mode(escript_ast::Mode::Strict))
    ));
}

#[test]
fn test_module_injects_its_namespace() {
    let interner = StringInterner::new();
    let mut p = parser_with("module acme { var x; }", interner.clone());
    let program = p.parse(None);
    assert_eq!(p.reporter().error_count(), 0);
    let module = &directives(&program).children[0];
    assert!(matches!(
        module.kind,
        NodeKind::Module {
            default_module: false
        }
    ));
    let body = module.left().unwrap().left().unwrap();
    let first = body.left().unwrap();
    assert!(matches!(first.kind, NodeKind::UseNamespace { .. }));
    assert_eq!(first.qname.map(|q| q.name), Some(interner.intern("acme")));
}

#[test]
fn test_error_cap_stops_reporting() {
    // A long run of bad directives must not report unboundedly.
    let src = "@ ;\n".repeat(100);
    let (_, errors) = parse(&src);
    assert!(errors <= escript_parser::MAX_ERRORS);
}

#[test]
fn test_regexp_literal_in_expression() {
    let node = only_directive("x = /ab+c/gi;");
    let value = node.right().unwrap().value().unwrap();
    match value {
        Value::RegExp { pattern, flags } => {
            assert_eq!(pattern, "ab+c");
            assert_eq!(flags, "gi");
        }
        other => panic!("expected a regexp literal, got {other:?}"),
    }
}

#[test]
fn test_qualifier_chain_past_lookahead_is_an_error() {
    let mut p = parser_with("aa bb cc dd var x;", StringInterner::new());
    let _ = p.parse(None);
    assert_eq!(p.reporter().error_count(), 1);
    assert!(p.reporter().diagnostics()[0]
        .message
        .contains("Too many qualifiers"));
}

#[test]
fn test_default_namespace_qualifies_declarations() {
    let interner = StringInterner::new();
    let mut p = parser_with(
        "use default namespace \"http://example.com\"; var a;",
        interner.clone(),
    );
    let program = p.parse(None);
    assert_eq!(p.reporter().error_count(), 0);
    let var = &directives(&program).children[1];
    assert!(matches!(var.kind, NodeKind::VarDefinition(VarKind::Var)));
    let name = var.left().unwrap();
    assert_eq!(
        name.qname.unwrap().space,
        Some(interner.intern("http://example.com"))
    );
}

#[test]
fn test_default_namespace_does_not_reach_into_functions() {
    let interner = StringInterner::new();
    let mut p = parser_with(
        "use default namespace \"ns\"; function f() { var inner; }",
        interner.clone(),
    );
    let program = p.parse(None);
    assert_eq!(p.reporter().error_count(), 0);
    let func = &directives(&program).children[1];
    let body = &func.children[2];
    let inner = body.left().unwrap().left().unwrap();
    assert_eq!(inner.qname.unwrap().space, None);
}

#[test]
fn test_interface_functions_cannot_have_bodies() {
    let mut p = parser_with(
        "interface Shape { function area(): Number { return 0; } }",
        StringInterner::new(),
    );
    let _ = p.parse(None);
    assert_eq!(p.reporter().error_count(), 1);
    assert!(p.reporter().diagnostics()[0]
        .message
        .contains("Interface functions"));
}

#[test]
fn test_interface_accepts_bodyless_functions() {
    let (program, errors) = parse("interface Shape { function area(): Number; }");
    assert_eq!(errors, 0);
    let class = &directives(&program).children[0];
    assert!(class.class().is_some_and(|c| c.is_interface));
}

#[test]
fn test_type_definitions_are_unsupported() {
    let mut p = parser_with("type T = Number;", StringInterner::new());
    let _ = p.parse(None);
    assert_eq!(p.reporter().error_count(), 1);
    assert!(p.reporter().diagnostics()[0]
        .message
        .contains("Unsupported feature"));
}

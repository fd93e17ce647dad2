//! Parser tests

use pretty_assertions::assert_eq;
use wholf::ast::*;
use wholf::*;

fn parse_ok(src: &str) -> Program {
    parse_source(src).unwrap_or_else(|errs| panic!("{src:?} failed to parse: {errs:?}"))
}

fn parse_errs(src: &str) -> Vec<SyntaxError> {
    parse_source(src).expect_err("expected syntax errors")
}

fn single_expr(src: &str) -> Expr {
    let mut program = parse_ok(src);
    match std::mem::take(&mut program.statements).into_iter().next().map(|s| s.kind) {
        Some(StmtKind::Expression(expr)) => expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_multiplication_binds_tighter() {
    let expr = single_expr("1 + 2 * 3;");
    match expr.kind {
        ExprKind::Binary { op: BinaryOp::Add, right, .. } => {
            assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Multiply, .. }));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_power_is_right_associative() {
    let expr = single_expr("2 ^ 3 ^ 2;");
    match expr.kind {
        ExprKind::Binary { op: BinaryOp::Power, left, right } => {
            assert!(matches!(left.kind, ExprKind::Number(NumberLiteral::Integer(2))));
            assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Power, .. }));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_logical_precedence() {
    let expr = single_expr("a || b && c;");
    match expr.kind {
        ExprKind::Logical { op: LogicalOp::Or, right, .. } => {
            assert!(matches!(right.kind, ExprKind::Logical { op: LogicalOp::And, .. }));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_number_classification() {
    assert!(matches!(single_expr("7;").kind, ExprKind::Number(NumberLiteral::Integer(7))));
    assert!(matches!(single_expr("7.0;").kind, ExprKind::Number(NumberLiteral::Float(_))));
    // Too large for i64
    assert!(matches!(
        single_expr("99999999999999999999;").kind,
        ExprKind::Number(NumberLiteral::Float(_))
    ));
}

#[test]
fn test_postfix_chain() {
    let expr = single_expr("a.b[0](1);");
    match expr.kind {
        ExprKind::Call { callee, args } => {
            assert_eq!(args.len(), 1);
            assert!(matches!(callee.kind, ExprKind::Index { .. }));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_assignment_targets() {
    assert!(matches!(
        single_expr("a.b = 1;").kind,
        ExprKind::Assign { target: AssignTarget::Member { .. }, .. }
    ));
    assert!(matches!(
        single_expr("a[0] = 1;").kind,
        ExprKind::Assign { target: AssignTarget::Index { .. }, .. }
    ));
}

#[test]
fn test_invalid_assignment_target_reported_at_equals() {
    let errs = parse_errs("1 + 2 = 3;");
    assert_eq!(errs.len(), 1);
    assert!(errs[0].to_string().contains("invalid assignment target"));
    assert_eq!(errs[0].span(), Span::new(1, 7));
}

#[test]
fn test_lambda_forms() {
    match single_expr("(a, b) => a + b;").kind {
        ExprKind::Lambda(decl) => {
            assert_eq!(decl.params, vec!["a".to_string(), "b".to_string()]);
            assert!(matches!(decl.body[0].kind, StmtKind::Return(Some(_))));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(single_expr("() => { return 1; };").kind, ExprKind::Lambda(_)));
    // Plain grouping is not a lambda
    assert!(matches!(single_expr("(a);").kind, ExprKind::Grouping(_)));
}

#[test]
fn test_object_literal_keys() {
    match single_expr("x = { a: 1, \"b c\": 2, };").kind {
        ExprKind::Assign { value, .. } => match value.kind {
            ExprKind::Object(entries) => {
                let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["a", "b c"]);
            }
            other => panic!("unexpected {other:?}"),
        },
        other => panic!("unexpected {other:?}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Statements
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_statement_kinds() {
    let program = parse_ok(
        r#"
        let a = 1;
        const b = 2;
        function f(x) { return x; }
        class C { constructor() {} function m() {} }
        if (a) {} else {}
        while (false) {}
        for (let i = 0; i < 1; i = i + 1) {}
        foreach (v : [1]) {}
        "#,
    );
    let names: Vec<_> = program.statements.iter().map(|s| s.kind.name()).collect();
    assert_eq!(
        names,
        vec![
            "variable declaration",
            "variable declaration",
            "function declaration",
            "class declaration",
            "if",
            "while",
            "for",
            "foreach",
        ]
    );
}

#[test]
fn test_class_methods_with_and_without_function_keyword() {
    let program = parse_ok("class C { a() {} function b(x) {} }");
    match &program.statements[0].kind {
        StmtKind::Class(decl) => {
            let names: Vec<_> = decl.methods.iter().map(|m| m.name.as_str()).collect();
            assert_eq!(names, vec!["a", "b"]);
            assert_eq!(decl.methods[1].params.len(), 1);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_const_requires_initializer() {
    let errs = parse_errs("const k;");
    assert!(errs[0].to_string().contains("expected `=` after constant name"));
}

#[test]
fn test_statement_positions() {
    let program = parse_ok("let a = 1;\n  print(a);");
    assert_eq!(program.statements[1].span, Span::new(2, 3));
}

// ═══════════════════════════════════════════════════════════════════════
// Errors and Recovery
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_incomplete_expression_errors_at_end_of_input() {
    let errs = parse_errs("1 +");
    assert_eq!(errs.len(), 1);
    match &errs[0] {
        SyntaxError::Parse(err) => assert_eq!(err.token.kind, TokenKind::Eof),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_multiple_errors_reported_together() {
    let errs = parse_errs("let = 1;\nlet ok = 2;\nprint(;\nlet also = 3;\n)");
    assert!(errs.len() >= 3, "got {errs:?}");
    let lines: Vec<_> = errs.iter().map(|e| e.span().line).collect();
    assert_eq!(lines[..3].to_vec(), vec![1, 3, 5]);
}

#[test]
fn test_errors_inside_blocks_recover() {
    let errs = parse_errs("function f() { let = 1; return 2; }\nlet x = ;");
    assert_eq!(errs.len(), 2);
    assert_eq!(errs[0].span().line, 1);
    assert_eq!(errs[1].span().line, 2);
}

#[test]
fn test_lex_errors_become_syntax_errors() {
    let errs = parse_errs("let s = \"abc");
    assert!(matches!(
        errs[0],
        SyntaxError::Lex { error: LexError::UnterminatedString, .. }
    ));
    assert_eq!(errs[0].span().line, 1);
}

#[test]
fn test_partial_trees_are_never_returned() {
    assert!(parse_source("let a = 1; let b = ;").is_err());
}

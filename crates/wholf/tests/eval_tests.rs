//! End-to-end evaluation tests through the public pipeline

use std::sync::Arc;

use pretty_assertions::assert_eq;
use wholf::*;

fn eval(src: &str) -> std::result::Result<Value, Vec<Diagnostic>> {
    execute_with(src, &EvalContext::new().with_host(Arc::new(BufferHost::new())))
}

fn eval_output(src: &str) -> String {
    let host = Arc::new(BufferHost::new());
    let ctx = EvalContext::new().with_host(host.clone());
    execute_with(src, &ctx).unwrap_or_else(|d| panic!("{src:?} failed: {d:?}"));
    host.output()
}

// ═══════════════════════════════════════════════════════════════════════
// Arithmetic and Operators
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_precedence_examples() {
    assert_eq!(eval("1 + 2 * 3").unwrap(), Value::Integer(7));
    assert_eq!(eval("(1 + 2) * 3").unwrap(), Value::Integer(9));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(eval("\"a\" + \"b\"").unwrap(), Value::string("ab"));
    assert_eq!(eval("\"x\" + 1").unwrap(), Value::string("x1"));
}

#[test]
fn test_numeric_promotion() {
    assert_eq!(eval("7 / 2").unwrap(), Value::Float(3.5));
    assert!(matches!(eval("8 / 2").unwrap(), Value::Integer(4)));
    assert!(matches!(eval("2 ^ 0.5").unwrap(), Value::Float(_)));
    assert!(matches!(eval("1 + 1.0").unwrap(), Value::Float(_)));
}

#[test]
fn test_equality_of_self_referencing_containers() {
    let same = eval("let a = []; a[0] = a; let b = []; b[0] = b; a == b;").unwrap();
    assert_eq!(same, Value::Boolean(true));

    let differ = eval("let o = {}; o.me = o; let p = {}; p.me = p; p.x = 1; o != p;").unwrap();
    assert_eq!(differ, Value::Boolean(true));
}

#[test]
fn test_short_circuit_never_invokes_right_side() {
    let out = eval_output(
        r#"
        function sideEffect() { print("side effect"); return true; }
        false && sideEffect();
        "#,
    );
    assert_eq!(out, "");
}

#[test]
fn test_runtime_error_diagnostic() {
    let diagnostics = eval("let x = 10;\nx / 0;").unwrap_err();
    assert_eq!(diagnostics.len(), 1);
    let d = &diagnostics[0];
    assert_eq!(d.kind, DiagnosticKind::Runtime);
    assert_eq!(d.message, "division by zero");
    assert_eq!(d.line, 2);
}

// ═══════════════════════════════════════════════════════════════════════
// Scoping and Functions
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_lexical_scoping() {
    let src = r#"
        let name = "outer";
        function get() { return name; }
        function shadow() { let name = "inner"; return get(); }
        shadow();
    "#;
    assert_eq!(eval(src).unwrap(), Value::string("outer"));
}

#[test]
fn test_unresolved_identifier_is_error() {
    let diagnostics = eval("print(ghost);").unwrap_err();
    assert!(diagnostics[0].message.contains("undefined variable `ghost`"));
}

#[test]
fn test_closures_share_captured_state() {
    let src = r#"
        function makePair() {
            let n = 0;
            return { inc: () => { n = n + 1; return n; }, get: () => n };
        }
        let p = makePair();
        p.inc(); p.inc();
        p.get();
    "#;
    assert_eq!(eval(src).unwrap(), Value::Integer(2));
}

#[test]
fn test_higher_order_functions() {
    let src = r#"
        function map(arr, f) {
            let out = [];
            foreach (x : arr) out[out.length] = f(x);
            return out;
        }
        map([1, 2, 3], (x) => x * 10);
    "#;
    assert_eq!(eval(src).unwrap().to_string(), "[10, 20, 30]");
}

// ═══════════════════════════════════════════════════════════════════════
// Classes
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_class_program() {
    let out = eval_output(
        r#"
        class Account {
            constructor(owner) { this.owner = owner; this.balance = 0; }
            deposit(n) { this.balance = this.balance + n; return this; }
            function describe() { return this.owner + ": " + this.balance; }
        }
        let acct = Account("ada");
        acct.deposit(5).deposit(7);
        print(acct.describe());
        print(typeOf(acct), typeOf(Account), typeOf(acct.deposit));
        "#,
    );
    assert_eq!(out, "ada: 12\nAccount class function\n");
}

#[test]
fn test_instance_identity_equality() {
    let src = "class A {} let a = A(); let b = A(); [a == a, a == b];";
    assert_eq!(eval(src).unwrap().to_string(), "[true, false]");
}

// ═══════════════════════════════════════════════════════════════════════
// Host Services
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_print_joins_arguments() {
    assert_eq!(eval_output("print(1, \"two\", [3], null);"), "1 two [3] null\n");
}

#[test]
fn test_file_round_trip_through_host() {
    let host = Arc::new(BufferHost::new().with_file("in.txt", "hello"));
    let ctx = EvalContext::new().with_host(host.clone());
    execute_with(
        "writeFile(\"out.txt\", readFile(\"in.txt\") + \" world\");",
        &ctx,
    )
    .unwrap();
    assert_eq!(host.file("out.txt").as_deref(), Some("hello world"));
}

#[test]
fn test_host_without_storage_reports_host_io() {
    let ctx = EvalContext::new().with_host(Arc::new(BufferHost::without_storage()));
    let diagnostics = execute_with("readFile(\"x\");", &ctx).unwrap_err();
    assert!(diagnostics[0].message.starts_with("host I/O failure"));
}

#[test]
fn test_missing_file_reports_host_io() {
    let diagnostics = eval("readFile(\"missing.txt\");").unwrap_err();
    assert!(diagnostics[0].message.contains("missing.txt"));
}

// ═══════════════════════════════════════════════════════════════════════
// Properties of the Pipeline
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_execute_twice_is_idempotent() {
    let src = "let xs = [3, 1]; xs[2] = xs[0] + xs[1]; xs;";
    assert_eq!(eval(src), eval(src));
}

#[test]
fn test_all_syntax_errors_reported() {
    let diagnostics = eval("let = 1;\nlet y = ;\n1 +").unwrap_err();
    assert_eq!(diagnostics.len(), 3);
    assert!(diagnostics.iter().all(|d| d.kind == DiagnosticKind::Parse));
}

#[test]
fn test_unterminated_string_is_lex_diagnostic_on_start_line() {
    let diagnostics = eval("let a = 1;\nlet s = \"open\nmore").unwrap_err();
    let lex = diagnostics
        .iter()
        .find(|d| d.kind == DiagnosticKind::Lex)
        .expect("lex diagnostic");
    assert_eq!(lex.line, 2);
    assert_eq!(lex.message, "unterminated string");
}

#[test]
fn test_interpreter_session() {
    let mut interp = Interpreter::with_context(
        EvalContext::new().with_host(Arc::new(BufferHost::new())),
    );
    interp.execute("let total = 0;").unwrap();
    for i in 1..=3 {
        interp.execute(&format!("total = total + {i};")).unwrap();
    }
    assert_eq!(interp.execute("total").unwrap(), Value::Integer(6));
}

#[test]
fn test_deep_expression_nesting_does_not_crash() {
    let depth = 1500;
    let src = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(eval(&src).unwrap(), Value::Integer(1));
}

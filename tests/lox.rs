use pretty_assertions::assert_eq;
use rstest::rstest;

use rox::value::Value;
use rox::Lox;

fn session() -> Lox<Vec<u8>> {
    Lox::new(Vec::new())
}

fn printed(lox: Lox<Vec<u8>>) -> String {
    String::from_utf8(lox.into_output()).expect("program output is utf-8")
}

#[rstest]
#[case("1 + 2 * 3", Value::Number(7.0))]
#[case("\"a\" + \"b\"", Value::String("ab".to_string()))]
#[case("!nil", Value::Bool(true))]
#[case("nil or 0", Value::Number(0.0))]
#[case("(fun (n) { return n * n; })(4)", Value::Number(16.0))]
fn evaluate_single_expression(#[case] source: &str, #[case] expected: Value) {
    let mut lox = session();

    assert_eq!(lox.evaluate(source).ok(), Some(expected));
}

#[test]
fn evaluate_reports_syntax_errors() {
    let mut lox = session();

    let diagnostics = lox.evaluate("1 +").unwrap_err();

    assert!(diagnostics.has_static_errors());
    assert_eq!(
        diagnostics.messages(),
        vec!["[line 1] Error at end: Expected expression."]
    );
}

#[test]
fn evaluate_reports_runtime_errors() {
    let mut lox = session();

    let diagnostics = lox.evaluate("-\"x\"").unwrap_err();

    assert!(diagnostics.has_runtime_errors());
    assert_eq!(diagnostics.messages(), vec!["Operand must be a number.\n[line 1]"]);
}

#[test]
fn session_keeps_globals_between_runs() {
    let mut lox = session();

    assert!(lox.run("var count = 1;").is_empty());
    assert!(lox.run("fun bump() { count = count + 1; return count; }").is_empty());
    assert!(lox.run("bump(); print bump();").is_empty());

    assert_eq!(printed(lox), "3\n");
}

#[test]
fn closures_survive_across_runs() {
    let mut lox = session();

    lox.run("fun make() { var n = 0; return fun () { n = n + 1; return n; }; }");
    lox.run("var next = make();");
    lox.run("print next();");
    lox.run("print next();");

    assert_eq!(printed(lox), "1\n2\n");
}

#[test]
fn repl_prints_bare_expressions() {
    let mut lox = session();

    assert!(lox.run_line("var a = 20;").is_empty());
    assert!(lox.run_line("a + 22").is_empty());
    assert!(lox.run_line("print a;").is_empty());

    assert_eq!(printed(lox), "42\n20\n");
}

#[test]
fn repl_reports_statement_errors_for_invalid_lines() {
    let mut lox = session();

    let diagnostics = lox.run_line("var = ;");

    assert_eq!(
        diagnostics.messages(),
        vec!["[line 1] Error at '=': Expected variable name."]
    );
    assert_eq!(printed(lox), "");
}

#[test]
fn repl_reports_runtime_errors_from_expressions() {
    let mut lox = session();

    let diagnostics = lox.run_line("undefined_name");

    assert_eq!(
        diagnostics.messages(),
        vec!["Undefined variable 'undefined_name'.\n[line 1]"]
    );
}

#[test]
fn runtime_error_does_not_end_the_session() {
    let mut lox = session();

    let diagnostics = lox.run_line("print 1; print nil * 2;");
    assert!(diagnostics.has_runtime_errors());
    assert!(!diagnostics.has_static_errors());

    assert!(lox.run_line("print 2;").is_empty());

    assert_eq!(printed(lox), "1\n2\n");
}

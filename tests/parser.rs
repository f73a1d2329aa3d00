use pretty_assertions::assert_eq;
use rstest::rstest;

use rox::ast_printer::AstPrinter;
use rox::expr::Expr;
use rox::parser::Parser;
use rox::scanner::tokenize;
use rox::stmt::Stmt;
use rox::Diagnostics;

// parse a program and return its statements together with the rendered diagnostics
fn parse(source: &str) -> (Vec<Stmt>, Vec<String>) {
    let mut diagnostics = Diagnostics::new();
    let tokens = tokenize(source, &mut diagnostics);
    let statements = Parser::new(&tokens, &mut diagnostics).parse();

    (statements, diagnostics.messages())
}

fn print_program(source: &str) -> Vec<String> {
    let (statements, errors) = parse(source);
    assert_eq!(errors, Vec::<String>::new());

    statements.iter().map(AstPrinter::print_stmt).collect()
}

fn print_expression(source: &str) -> String {
    let mut diagnostics = Diagnostics::new();
    let tokens = tokenize(source, &mut diagnostics);
    let expr = Parser::new(&tokens, &mut diagnostics)
        .parse_expression()
        .expect("valid expression");

    assert!(diagnostics.is_empty());
    AstPrinter::print(&expr)
}

#[rstest]
#[case("1 + 2 * 3", "(+ 1.0 (* 2.0 3.0))")]
#[case("(1 + 2) * -3", "(* (group (+ 1.0 2.0)) (- 3.0))")]
#[case("1 - 2 - 3", "(- (- 1.0 2.0) 3.0)")]
#[case("!true == false", "(== (! true) false)")]
#[case("1 < 2 != 3 >= 4", "(!= (< 1.0 2.0) (>= 3.0 4.0))")]
#[case("a or b and c", "(or a (and b c))")]
#[case("a = b = 1", "(= a (= b 1.0))")]
#[case("f(1)(2, x)", "(call (call f 1.0) 2.0 x)")]
#[case("\"hi\" + 2.5", "(+ hi 2.5)")]
#[case("fun (a, b) { return a; }", "(fun (a b) (return a))")]
fn expression_precedence(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(print_expression(source), expected);
}

#[test]
fn for_loop_is_desugared_into_while() {
    let printed = print_program("for (var i = 0; i < 3; i = i + 1) print i;");

    assert_eq!(
        printed,
        vec!["(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"]
    );
}

#[test]
fn empty_for_clauses() {
    assert_eq!(
        print_program("for (;;) print 1;"),
        vec!["(while true (print 1.0))"]
    );
    assert_eq!(
        print_program("for (i = 0; i < 1;) print i;"),
        vec!["(block (; (= i 0.0)) (while (< i 1.0) (print i)))"]
    );
}

#[test]
fn declarations_and_statements() {
    let source = "\
        var a;\n\
        var b = 2;\n\
        fun add(x, y) { return x + y; }\n\
        if (a) print 1; else { print 2; }\n\
        while (b) b = nil;\n\
        fun () { return; };\n\
        class Point { init(x) {} }";

    assert_eq!(
        print_program(source),
        vec![
            "(var a)",
            "(var b 2.0)",
            "(fun add (x y) (return (+ x y)))",
            "(if a (print 1.0) (block (print 2.0)))",
            "(while b (; (= b nil)))",
            "(; (fun () (return)))",
            "(class Point (fun init (x)))",
        ]
    );
}

#[test]
fn recovers_and_reports_every_error() {
    let (statements, errors) = parse("var = 1;\nprint 2;\nprint ;");

    assert_eq!(
        errors,
        vec![
            "[line 1] Error at '=': Expected variable name.",
            "[line 3] Error at ';': Expected expression.",
        ]
    );
    assert_eq!(
        statements.iter().map(AstPrinter::print_stmt).collect::<Vec<_>>(),
        vec!["(print 2.0)"]
    );
}

#[test]
fn syntax_errors_are_static() {
    let mut diagnostics = Diagnostics::new();
    let tokens = tokenize("print ;\nvar;", &mut diagnostics);
    Parser::new(&tokens, &mut diagnostics).parse();

    assert_eq!(diagnostics.len(), 2);
    assert!(!diagnostics.has_runtime_errors());

    let lines: Vec<Option<usize>> = diagnostics.into_iter().map(|e| e.line()).collect();
    assert_eq!(lines, vec![Some(1), Some(2)]);
}

#[test]
fn synchronizes_at_statement_keyword() {
    let (statements, errors) = parse("print (1 + ;\nvar x = 2;\nprint x;");

    assert_eq!(errors, vec!["[line 1] Error at ';': Expected expression."]);
    assert_eq!(statements.len(), 2);
}

#[test]
fn error_at_end_of_input() {
    let (_, errors) = parse("print 1");
    assert_eq!(errors, vec!["[line 1] Error at end: Expected ';' after value."]);

    let (_, errors) = parse("{ print 1;");
    assert_eq!(errors, vec!["[line 1] Error at end: Expected '}' after block."]);
}

#[test]
fn invalid_assignment_target_does_not_discard_statement() {
    let (statements, errors) = parse("1 = 2;\nprint 3;");

    assert_eq!(errors, vec!["[line 1] Error at '=': Invalid assignment target."]);
    assert_eq!(statements.len(), 2);
}

#[test]
fn too_many_arguments_is_reported_once() {
    let arguments = vec!["1"; 256].join(", ");
    let (statements, errors) = parse(&format!("f({});", arguments));

    assert_eq!(
        errors,
        vec!["[line 1] Error at '1': Can't have more than 255 arguments."]
    );
    assert_eq!(statements.len(), 1);
}

#[test]
fn too_many_parameters_is_reported_once() {
    let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
    let (_, errors) = parse(&format!("fun f({}) {{}}", params.join(", ")));

    assert_eq!(
        errors,
        vec!["[line 1] Error at 'p255': Can't have more than 255 parameters."]
    );
}

#[test]
fn exactly_255_arguments_is_fine() {
    let arguments = vec!["nil"; 255].join(", ");
    let (_, errors) = parse(&format!("f({});", arguments));

    assert_eq!(errors, Vec::<String>::new());
}

#[test]
fn trailing_tokens_after_expression() {
    let mut diagnostics = Diagnostics::new();
    let tokens = tokenize("1 + 2 3", &mut diagnostics);
    let expr = Parser::new(&tokens, &mut diagnostics).parse_expression();

    assert!(expr.is_none());
    assert_eq!(
        diagnostics.messages(),
        vec!["[line 1] Error at '3': Expected end of expression."]
    );
}

#[test]
fn each_variable_reference_has_its_own_identity() {
    let (statements, _) = parse("a; a;");

    let ids: Vec<_> = statements
        .iter()
        .map(|stmt| match stmt {
            Stmt::Expression(Expr::Variable { id, .. }) => *id,
            other => panic!("unexpected statement {:?}", other),
        })
        .collect();

    assert_ne!(ids[0], ids[1]);
}

#[test]
fn ast_serializes_to_json() {
    let (statements, _) = parse("print 1;");
    let json = serde_json::to_value(&statements).expect("serializable");

    assert_eq!(json[0]["Print"]["Literal"]["Number"], serde_json::json!(1.0));
}

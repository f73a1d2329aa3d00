use pretty_assertions::assert_eq;
use rstest::rstest;

use rox::expr::Expr;
use rox::parser::Parser;
use rox::resolver::{Locals, Resolver};
use rox::scanner::tokenize;
use rox::stmt::Stmt;
use rox::Diagnostics;

fn resolve(source: &str) -> (Vec<Stmt>, Locals, Vec<String>) {
    let mut diagnostics = Diagnostics::new();
    let tokens = tokenize(source, &mut diagnostics);
    let statements = Parser::new(&tokens, &mut diagnostics).parse();
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.messages());

    let locals = Resolver::new(&mut diagnostics).resolve(&statements);

    (statements, locals, diagnostics.messages())
}

fn errors(source: &str) -> Vec<String> {
    resolve(source).2
}

#[rstest]
#[case(
    "{ var a = 1; var a = 2; }",
    "[line 1] Error at 'a': Variable 'a' is already declared in this scope."
)]
#[case(
    "{ var a = a; }",
    "[line 1] Error at 'a': Can't read local variable in its own initializer."
)]
#[case("return 1;", "[line 1] Error at 'return': Can't return from top-level code.")]
#[case(
    "fun f(a, a) {}",
    "[line 1] Error at 'a': Variable 'a' is already declared in this scope."
)]
fn static_errors(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(errors(source), vec![expected]);
}

#[test]
fn shadowing_initializer_cannot_read_outer_binding() {
    assert_eq!(
        errors("{ var a = 1; { var a = a + 1; } }"),
        vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
    );
}

#[test]
fn globals_may_be_redeclared() {
    assert_eq!(errors("var a = 1; var a = 2; var b = b;"), Vec::<String>::new());
}

#[test]
fn shadowing_in_nested_scope_is_fine() {
    assert_eq!(
        errors("{ var a = 1; { var b = a; var a = b + 1; print a; } }"),
        Vec::<String>::new()
    );
}

#[test]
fn return_inside_function_is_fine() {
    assert_eq!(
        errors("fun f() { { return 1; } } var g = fun () { return; };"),
        Vec::<String>::new()
    );
}

#[test]
fn reports_every_error_in_one_pass() {
    let source = "return;\n{ var x = 1; var x = 2; }\nfun f() { var y = y; }";

    assert_eq!(
        errors(source),
        vec![
            "[line 1] Error at 'return': Can't return from top-level code.",
            "[line 2] Error at 'x': Variable 'x' is already declared in this scope.",
            "[line 3] Error at 'y': Can't read local variable in its own initializer.",
        ]
    );
}

#[test]
fn globals_are_left_out_of_the_map() {
    let (_, locals, _) = resolve("var a = 1; print a; a = 2;");

    assert!(locals.is_empty());
}

#[test]
fn hop_counts_follow_lexical_nesting() {
    let (statements, locals, errors) = resolve("{ var a = 1; { { print a; } } }");
    assert!(errors.is_empty());

    // block → block → block → print a
    let Stmt::Block(outer) = &statements[0] else {
        panic!("expected block");
    };
    let Stmt::Block(middle) = &outer[1] else {
        panic!("expected block");
    };
    let Stmt::Block(inner) = &middle[0] else {
        panic!("expected block");
    };
    let Stmt::Print(Expr::Variable { id, .. }) = &inner[0] else {
        panic!("expected print of a variable");
    };

    assert_eq!(locals.get(id), Some(&2));
}

#[test]
fn closure_captures_resolve_through_function_scope() {
    let (statements, locals, _) =
        resolve("fun outer() { var x = 1; fun inner() { x = x + 1; } }");

    let Stmt::Function { function, .. } = &statements[0] else {
        panic!("expected function");
    };
    let Stmt::Function { function: inner, .. } = &function.body[1] else {
        panic!("expected nested function");
    };
    let Stmt::Expression(Expr::Assign { id, value, .. }) = &inner.body[0] else {
        panic!("expected assignment");
    };
    let Expr::Binary { left, .. } = &**value else {
        panic!("expected binary");
    };
    let Expr::Variable { id: read_id, .. } = &**left else {
        panic!("expected variable");
    };

    // inner's frame is one hop from outer's frame
    assert_eq!(locals.get(id), Some(&1));
    assert_eq!(locals.get(read_id), Some(&1));
}

#[test]
fn parameters_resolve_at_depth_zero() {
    let (statements, locals, _) = resolve("fun f(n) { return n; }");

    let Stmt::Function { function, .. } = &statements[0] else {
        panic!("expected function");
    };
    let Stmt::Return {
        value: Some(Expr::Variable { id, .. }),
        ..
    } = &function.body[0]
    else {
        panic!("expected return of a variable");
    };

    assert_eq!(locals.get(id), Some(&0));
}

#[test]
fn class_bodies_are_skipped() {
    assert_eq!(
        errors("class A { m() { return 1; } }"),
        Vec::<String>::new()
    );
}

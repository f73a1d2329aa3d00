use std::rc::Rc;

use serde::Serialize;

use crate::expr::{Expr, FunctionLiteral};
use crate::token::Token;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    Expression(Expr),

    Print(Expr),

    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    // `fun name(params) { body }`: a function literal bound to a name
    Function {
        name: Token,
        function: Rc<FunctionLiteral>,
    },

    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    // `for` loops are desugared into this by the parser
    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    Return {
        keyword: Token,
        value: Option<Expr>,
    },

    // Parsed only; classes have no runtime semantics
    Class {
        name: Token,
        methods: Vec<Stmt>,
    },
}

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use crate::stmt::Stmt;
use crate::token::{LiteralValue, Token};

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

/// Identity of a variable-reference node.  The resolver keys its output by
/// these, so they are unique for the life of the process, not just one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ExprId(usize);

impl ExprId {
    pub fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Parameters and body shared by `fun` declarations, function literals and
/// every callable created from them.
#[derive(Debug, PartialEq, Serialize)]
pub struct FunctionLiteral {
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    // Number, string, true, false or nil
    Literal(LiteralValue),

    // Parenthesized sub-expression
    Grouping(Box<Expr>),

    // `!x`, `-x`
    Unary {
        operator: Token,
        right: Box<Expr>,
    },

    // Arithmetic, comparison and equality operators
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    // Short-circuiting `and` / `or`
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    // Read of a named variable
    Variable {
        id: ExprId,
        name: Token,
    },

    // `name = value`
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    // `callee(arguments)`; `paren` is the closing parenthesis
    Call {
        callee: Box<Expr>,
        paren: Token,
        arguments: Vec<Expr>,
    },

    // Anonymous `fun (params) { body }`
    Function(Rc<FunctionLiteral>),
}

impl Expr {
    pub fn variable(name: Token) -> Self {
        Expr::Variable {
            id: ExprId::fresh(),
            name,
        }
    }

    pub fn assign(name: Token, value: Expr) -> Self {
        Expr::Assign {
            id: ExprId::fresh(),
            name,
            value: Box::new(value),
        }
    }

    /// Best-effort source line, used in log output.
    pub fn line(&self) -> Option<usize> {
        match self {
            Expr::Literal(_) | Expr::Function(_) => None,

            Expr::Grouping(expr) => expr.line(),

            Expr::Unary { operator, .. }
            | Expr::Binary { operator, .. }
            | Expr::Logical { operator, .. } => Some(operator.line),

            Expr::Variable { name, .. } | Expr::Assign { name, .. } => Some(name.line),

            Expr::Call { paren, .. } => Some(paren.line),
        }
    }
}

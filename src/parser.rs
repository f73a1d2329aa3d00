/*!
Recursive‑descent parser for Lox.

Grammar (EBNF, Crafting Interpreters dialect)
----------------------------------------------

```text
program        → declaration* EOF ;
declaration    → classDecl | funDecl | varDecl | statement ;
classDecl      → "class" IDENT "{" function* "}" ;
funDecl        → "fun" function ;
function       → IDENT functionBody ;
functionBody   → "(" parameters? ")" block ;
varDecl        → "var" IDENT ( "=" expression )? ";" ;
statement      → exprStmt | forStmt | ifStmt | printStmt
               | returnStmt | whileStmt | block ;
forStmt        → "for" "(" ( varDecl | exprStmt | ";" )
                 expression? ";" expression? ")" statement ;
whileStmt      → "while" "(" expression ")" statement ;
ifStmt         → "if" "(" expression ")" statement
               ( "else" statement )? ;
returnStmt     → "return" expression? ";" ;
printStmt      → "print" expression ";" ;
exprStmt       → expression ";" ;
block          → "{" declaration* "}" ;
parameters     → IDENT ( "," IDENT )* ;
expression     → assignment ;
assignment     → IDENT "=" assignment | logic_or ;
logic_or       → logic_and ( "or" logic_and )* ;
logic_and      → equality  ( "and" equality )* ;
equality       → comparison ( ( "!=" | "==" ) comparison )* ;
comparison     → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
term           → factor ( ( "-" | "+" ) factor )* ;
factor         → unary ( ( "/" | "*" ) unary )* ;
unary          → ( "!" | "-" ) unary | call ;
call           → primary ( "(" arguments? ")" )* ;
arguments      → expression ( "," expression )* ;
primary        → NUMBER | STRING | "true" | "false" | "nil"
               | IDENT | "(" expression ")" | "fun" functionBody ;
```

`for` has no node of its own: it is rewritten into `while` plus blocks here.

### Error handling

A failing production reports its error to the [`Diagnostics`] collector and
returns [`ParseError`], which unwinds to the nearest `declaration`.  That rule
drops the broken statement, calls [`Parser::synchronize`] and carries on, so a
single pass reports every syntax error.  Some errors ("Invalid assignment
target.", argument limits) are reported without unwinding at all.

### Logging Policy

| Location                     | Level  | Purpose                                   |
|------------------------------|--------|-------------------------------------------|
| `Parser::new`, `parse`       | `info` | Lifecycle milestones.                     |
| `declaration`, `synchronize` | `debug`| High‑level descent and recovery.          |
*/

use std::rc::Rc;

use crate::error::{Diagnostics, LoxError};
use crate::expr::{Expr, FunctionLiteral};
use crate::stmt::Stmt;
use crate::token::{LiteralValue, Token, TokenKind};

use log::{debug, info};

/// Hard limit on arguments and parameters.
pub const MAX_ARITY: usize = 255;

/// Marker for a production that could not match.  The details have already
/// been reported by the time this is returned.
#[derive(Debug)]
pub struct ParseError;

type PResult<T> = std::result::Result<T, ParseError>;

/// Stand-in for a token slice that does not end in `EOF`.
static END: Token = Token {
    kind: TokenKind::EOF,
    lexeme: String::new(),
    literal: None,
    line: 0,
};

/// Top‑level parser over an immutable slice of tokens.
pub struct Parser<'t, 'd> {
    tokens: &'t [Token],
    current: usize,
    diagnostics: &'d mut Diagnostics,
}

impl<'t, 'd> Parser<'t, 'd> {
    pub fn new(tokens: &'t [Token], diagnostics: &'d mut Diagnostics) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        Self {
            tokens,
            current: 0,
            diagnostics,
        }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program.  Statements that failed to parse are left out;
    /// their errors are in the diagnostics collector.
    pub fn parse(&mut self) -> Vec<Stmt> {
        info!("Beginning parse phase");

        let mut statements: Vec<Stmt> = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        info!("Parsed {} top-level statement(s)", statements.len());

        statements
    }

    /// Parse a single expression that must span the whole token stream.
    pub fn parse_expression(&mut self) -> Option<Expr> {
        info!("Parsing a single expression");

        let expr = self.expression().ok()?;

        if !self.is_at_end() {
            self.error(self.peek(), "Expected end of expression.");
            return None;
        }

        Some(expr)
    }

    // ──────────────────────── declaration rules ───────────────────

    fn declaration(&mut self) -> Option<Stmt> {
        debug!("Entering declaration at line {}", self.peek().line);

        let result = if self.matches(TokenKind::CLASS) {
            self.class_declaration()
        } else if self.check(TokenKind::FUN) && self.check_next(TokenKind::IDENTIFIER) {
            self.advance();
            self.function("function")
        } else if self.matches(TokenKind::VAR) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(ParseError) => {
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> PResult<Stmt> {
        let name = self
            .consume(TokenKind::IDENTIFIER, "Expected class name.")?
            .clone();

        self.consume(TokenKind::LEFT_BRACE, "Expected '{' before class body.")?;

        let mut methods: Vec<Stmt> = Vec::new();

        while !self.check(TokenKind::RIGHT_BRACE) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(TokenKind::RIGHT_BRACE, "Expected '}' after class body.")?;

        Ok(Stmt::Class { name, methods })
    }

    /// Named function; `kind` is "function" or "method" for messages.
    fn function(&mut self, kind: &str) -> PResult<Stmt> {
        let name = self
            .consume(TokenKind::IDENTIFIER, &format!("Expected {kind} name."))?
            .clone();

        let function = self.function_body(kind)?;

        Ok(Stmt::Function { name, function })
    }

    /// Parameter list and block, shared by declarations and literals.
    fn function_body(&mut self, kind: &str) -> PResult<Rc<FunctionLiteral>> {
        self.consume(
            TokenKind::LEFT_PAREN,
            &format!("Expected '(' after {kind} name."),
        )?;

        let mut params: Vec<Token> = Vec::new();

        if !self.check(TokenKind::RIGHT_PAREN) {
            loop {
                if params.len() >= MAX_ARITY {
                    self.error(self.peek(), "Can't have more than 255 parameters.");
                }

                params.push(
                    self.consume(TokenKind::IDENTIFIER, "Expected parameter name.")?
                        .clone(),
                );

                if !self.matches(TokenKind::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenKind::RIGHT_PAREN, "Expected ')' after parameters.")?;
        self.consume(
            TokenKind::LEFT_BRACE,
            &format!("Expected '{{' before {kind} body."),
        )?;

        let body = self.block()?;

        Ok(Rc::new(FunctionLiteral { params, body }))
    }

    fn var_declaration(&mut self) -> PResult<Stmt> {
        let name = self
            .consume(TokenKind::IDENTIFIER, "Expected variable name.")?
            .clone();

        let initializer = if self.matches(TokenKind::EQUAL) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenKind::SEMICOLON,
            "Expected ';' after variable declaration.",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> PResult<Stmt> {
        if self.matches(TokenKind::FOR) {
            self.for_statement()
        } else if self.matches(TokenKind::IF) {
            self.if_statement()
        } else if self.matches(TokenKind::WHILE) {
            self.while_statement()
        } else if self.matches(TokenKind::RETURN) {
            self.return_statement()
        } else if self.matches(TokenKind::LEFT_BRACE) {
            Ok(Stmt::Block(self.block()?))
        } else if self.matches(TokenKind::PRINT) {
            self.print_statement()
        } else {
            self.expression_statement()
        }
    }

    /// `for (init; cond; incr) body` becomes
    /// `{ init; while (cond) { body; incr; } }`.
    fn for_statement(&mut self) -> PResult<Stmt> {
        self.consume(TokenKind::LEFT_PAREN, "Expected '(' after 'for'.")?;

        let initializer = if self.matches(TokenKind::SEMICOLON) {
            None
        } else if self.matches(TokenKind::VAR) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(TokenKind::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::SEMICOLON, "Expected ';' after loop condition.")?;

        let increment = if !self.check(TokenKind::RIGHT_PAREN) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::RIGHT_PAREN, "Expected ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        let condition = condition.unwrap_or(Expr::Literal(LiteralValue::True));
        let mut loop_stmt = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            loop_stmt = Stmt::Block(vec![initializer, loop_stmt]);
        }

        Ok(loop_stmt)
    }

    fn if_statement(&mut self) -> PResult<Stmt> {
        self.consume(TokenKind::LEFT_PAREN, "Expected '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RIGHT_PAREN, "Expected ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(TokenKind::ELSE) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> PResult<Stmt> {
        self.consume(TokenKind::LEFT_PAREN, "Expected '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RIGHT_PAREN, "Expected ')' after condition.")?;
        let body = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn return_statement(&mut self) -> PResult<Stmt> {
        let keyword = self.previous().clone();
        let value = if !self.check(TokenKind::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenKind::SEMICOLON, "Expected ';' after return value.")?;

        Ok(Stmt::Return { keyword, value })
    }

    fn print_statement(&mut self) -> PResult<Stmt> {
        let value = self.expression()?;
        self.consume(TokenKind::SEMICOLON, "Expected ';' after value.")?;

        Ok(Stmt::Print(value))
    }

    fn expression_statement(&mut self) -> PResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::SEMICOLON, "Expected ';' after expression.")?;

        Ok(Stmt::Expression(expr))
    }

    /// Statements up to the closing `}`; the `{` is already consumed.
    fn block(&mut self) -> PResult<Vec<Stmt>> {
        let mut statements: Vec<Stmt> = Vec::new();

        while !self.check(TokenKind::RIGHT_BRACE) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(TokenKind::RIGHT_BRACE, "Expected '}' after block.")?;

        Ok(statements)
    }

    // ─────────────────────── expression rules ─────────────────────

    fn expression(&mut self) -> PResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> PResult<Expr> {
        let expr = self.logical_or()?;

        if self.matches(TokenKind::EQUAL) {
            let equals = self.previous();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable { name, .. } => Ok(Expr::assign(name, value)),
                other => {
                    // Reported, but the parser is not confused: no unwinding.
                    self.error(equals, "Invalid assignment target.");
                    Ok(other)
                }
            };
        }

        Ok(expr)
    }

    fn logical_or(&mut self) -> PResult<Expr> {
        let mut expr = self.logical_and()?;

        while self.matches(TokenKind::OR) {
            let operator = self.previous().clone();
            let right = self.logical_and()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn logical_and(&mut self) -> PResult<Expr> {
        let mut expr = self.equality()?;

        while self.matches(TokenKind::AND) {
            let operator = self.previous().clone();
            let right = self.equality()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> PResult<Expr> {
        self.binary(
            Self::comparison,
            &[TokenKind::BANG_EQUAL, TokenKind::EQUAL_EQUAL],
        )
    }

    fn comparison(&mut self) -> PResult<Expr> {
        self.binary(
            Self::term,
            &[
                TokenKind::GREATER,
                TokenKind::GREATER_EQUAL,
                TokenKind::LESS,
                TokenKind::LESS_EQUAL,
            ],
        )
    }

    fn term(&mut self) -> PResult<Expr> {
        self.binary(Self::factor, &[TokenKind::MINUS, TokenKind::PLUS])
    }

    fn factor(&mut self) -> PResult<Expr> {
        self.binary(Self::unary, &[TokenKind::SLASH, TokenKind::STAR])
    }

    /// Left-associative binary level: `operand ( op operand )*`.
    fn binary(
        &mut self,
        operand: fn(&mut Self) -> PResult<Expr>,
        operators: &[TokenKind],
    ) -> PResult<Expr> {
        let mut expr = operand(self)?;

        while self.matches_any(operators) {
            let operator = self.previous().clone();
            let right = operand(self)?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> PResult<Expr> {
        if self.matches_any(&[TokenKind::BANG, TokenKind::MINUS]) {
            let operator = self.previous().clone();
            let right = self.unary()?;

            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }

        self.call()
    }

    fn call(&mut self) -> PResult<Expr> {
        let mut expr = self.primary()?;

        while self.matches(TokenKind::LEFT_PAREN) {
            expr = self.finish_call(expr)?;
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> PResult<Expr> {
        let mut arguments: Vec<Expr> = Vec::new();

        if !self.check(TokenKind::RIGHT_PAREN) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    self.error(self.peek(), "Can't have more than 255 arguments.");
                }

                arguments.push(self.expression()?);

                if !self.matches(TokenKind::COMMA) {
                    break;
                }
            }
        }

        let paren = self
            .consume(TokenKind::RIGHT_PAREN, "Expected ')' after arguments.")?
            .clone();

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> PResult<Expr> {
        if self.matches(TokenKind::FALSE) {
            return Ok(Expr::Literal(LiteralValue::False));
        }
        if self.matches(TokenKind::TRUE) {
            return Ok(Expr::Literal(LiteralValue::True));
        }
        if self.matches(TokenKind::NIL) {
            return Ok(Expr::Literal(LiteralValue::Nil));
        }

        if self.matches_any(&[TokenKind::NUMBER, TokenKind::STRING]) {
            let literal = self.previous().literal.clone();
            return Ok(Expr::Literal(literal.unwrap_or(LiteralValue::Nil)));
        }

        if self.matches(TokenKind::IDENTIFIER) {
            return Ok(Expr::variable(self.previous().clone()));
        }

        if self.matches(TokenKind::LEFT_PAREN) {
            let expr = self.expression()?;
            self.consume(TokenKind::RIGHT_PAREN, "Expected ')' after expression.")?;

            return Ok(Expr::Grouping(Box::new(expr)));
        }

        if self.matches(TokenKind::FUN) {
            return Ok(Expr::Function(self.function_body("function")?));
        }

        Err(self.error(self.peek(), "Expected expression."))
    }

    // ────────────────────── utility helpers ───────────────────────

    /// Report `message` at `token` and hand back the unwinding marker.
    fn error(&mut self, token: &Token, message: &str) -> ParseError {
        self.diagnostics.report(LoxError::parse(token, message));

        ParseError
    }

    #[inline(always)]
    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();

            return true;
        }

        false
    }

    #[inline(always)]
    fn matches_any(&mut self, kinds: &[TokenKind]) -> bool {
        kinds.iter().any(|&kind| self.matches(kind))
    }

    #[inline(always)]
    fn consume(&mut self, kind: TokenKind, message: &str) -> PResult<&'t Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }

        Err(self.error(self.peek(), message))
    }

    #[inline(always)]
    fn check(&self, kind: TokenKind) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().kind == kind
    }

    #[inline(always)]
    fn check_next(&self, kind: TokenKind) -> bool {
        self.tokens
            .get(self.current + 1)
            .is_some_and(|token| token.kind == kind)
    }

    #[inline(always)]
    fn advance(&mut self) -> &'t Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::EOF
    }

    #[inline(always)]
    fn peek(&self) -> &'t Token {
        self.tokens.get(self.current).unwrap_or(&END)
    }

    #[inline(always)]
    fn previous(&self) -> &'t Token {
        self.current
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .unwrap_or(&END)
    }

    /// Discards tokens until it thinks it is at a statement boundary.
    fn synchronize(&mut self) {
        debug!("Synchronizing after parse error at line {}", self.peek().line);

        self.advance(); // skip the token that caused the error

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::SEMICOLON {
                return;
            }

            match self.peek().kind {
                TokenKind::CLASS
                | TokenKind::FUN
                | TokenKind::VAR
                | TokenKind::FOR
                | TokenKind::IF
                | TokenKind::WHILE
                | TokenKind::PRINT
                | TokenKind::RETURN => return,
                _ => {}
            }

            self.advance();
        }
    }
}

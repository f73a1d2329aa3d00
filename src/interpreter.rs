use std::io::{Stdout, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::environment::{self, EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::expr::{Expr, ExprId};
use crate::function::LoxFunction;
use crate::resolver::Locals;
use crate::stmt::Stmt;
use crate::token::{LiteralValue, Token, TokenKind};
use crate::value::Value;

/// How a statement finished.  `return` travels up through enclosing blocks
/// and loops as `Flow::Return` until the call that owns it picks it up; it is
/// never mixed with the error channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
}

/// Tree-walking evaluator.  Program output goes to `out`.
pub struct Interpreter<W: Write = Stdout> {
    globals: EnvRef,
    environment: EnvRef,
    locals: Locals,
    out: W,
}

fn clock(_args: &[Value]) -> std::result::Result<Value, String> {
    let micros = chrono::Utc::now().timestamp_micros();

    Ok(Value::Number(micros as f64 / 1_000_000.0))
}

impl<W: Write> Interpreter<W> {
    /// Creates a new Interpreter and defines the native `clock` function.
    pub fn new(out: W) -> Self {
        info!("Initializing Interpreter");

        let globals = Environment::new().into_ref();

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock",
                arity: 0,
                func: clock,
            },
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: Locals::new(),
            out,
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn globals(&self) -> &EnvRef {
        &self.globals
    }

    /// Merge the resolver's output for a freshly parsed program.
    pub fn resolve(&mut self, locals: Locals) {
        debug!("Recording {} resolved local(s)", locals.len());

        self.locals.extend(locals);
    }

    /// Run a program.  The first runtime error stops it; output already
    /// written stays written.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            self.execute(stmt)?;
        }

        self.out.flush()?;

        info!("Interpretation completed successfully");
        Ok(())
    }

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                debug!("Expression statement at line {:?}", expr.line());
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
                debug!("Printed value: {}", value);
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                match initializer {
                    Some(expr) => {
                        let value = self.evaluate(expr)?;
                        debug!("Defining variable '{}' = {}", name.lexeme, value);
                        self.environment.borrow_mut().define(&name.lexeme, value);
                    }
                    None => {
                        debug!("Declaring uninitialized variable '{}'", name.lexeme);
                        self.environment.borrow_mut().declare(&name.lexeme);
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Function { name, function } => {
                debug!("Defining function '{}'", name.lexeme);
                let function = LoxFunction::new(
                    Some(name.lexeme.clone()),
                    Rc::clone(function),
                    Rc::clone(&self.environment),
                );
                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Function(Rc::new(function)));
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let frame = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, frame.into_ref())
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let flow @ Flow::Return(_) = self.execute(body)? {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Returning value: {}", value);
                Ok(Flow::Return(value))
            }

            Stmt::Class { name, .. } => {
                debug!("Class '{}' has no runtime semantics; skipped", name.lexeme);
                Ok(Flow::Normal)
            }
        }
    }

    /// Run `statements` with `frame` as the active environment.  The previous
    /// environment is put back on every exit path, error or return included.
    pub fn execute_block(&mut self, statements: &[Stmt], frame: EnvRef) -> Result<Flow> {
        let previous = std::mem::replace(&mut self.environment, frame);

        let result = self.execute_all(statements);

        self.environment = previous;
        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> Result<Flow> {
        for stmt in statements {
            if let flow @ Flow::Return(_) = self.execute(stmt)? {
                return Ok(flow);
            }
        }

        Ok(Flow::Normal)
    }

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;

                match operator.kind {
                    TokenKind::MINUS => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
                    },
                    TokenKind::BANG => Ok(Value::Bool(!right.is_truthy())),
                    _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
                }
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;

                binary(operator, left, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                let short_circuit = match operator.kind {
                    TokenKind::OR => left.is_truthy(),
                    _ => !left.is_truthy(),
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        environment::assign_at(&self.environment, distance, name, value.clone())
                    }
                    // Unresolved: walk the chain from the active frame.
                    None => self.environment.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                self.call(&callee, paren, values)
            }

            Expr::Function(function) => Ok(Value::Function(Rc::new(LoxFunction::new(
                None,
                Rc::clone(function),
                Rc::clone(&self.environment),
            )))),
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// Invokes a callable (native or user-defined function).
    fn call(&mut self, callee: &Value, paren: &Token, arguments: Vec<Value>) -> Result<Value> {
        match callee {
            Value::NativeFunction { name, arity, func } => {
                check_arity(*arity, arguments.len(), paren)?;
                debug!("Calling native function '{}'", name);
                func(&arguments).map_err(|message| LoxError::runtime(paren, message))
            }

            Value::Function(function) => {
                check_arity(function.arity(), arguments.len(), paren)?;
                let function = Rc::clone(function);
                function.call(self, arguments)
            }

            _ => {
                debug!("Attempted to call a {}", callee.type_name());
                Err(LoxError::runtime(paren, "Can only call functions."))
            }
        }
    }
}

fn check_arity(expected: usize, got: usize, paren: &Token) -> Result<()> {
    if expected == got {
        return Ok(());
    }

    Err(LoxError::runtime(
        paren,
        format!("Expected {} arguments but got {}.", expected, got),
    ))
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
    }
}

/// Arithmetic, comparison and equality.  Division by zero follows IEEE-754.
fn binary(operator: &Token, left: Value, right: Value) -> Result<Value> {
    match operator.kind {
        TokenKind::PLUS => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            _ => Err(LoxError::runtime(
                operator,
                "Operands must be two numbers or two strings.",
            )),
        },

        TokenKind::MINUS => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Number(a - b))
        }

        TokenKind::STAR => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Number(a * b))
        }

        TokenKind::SLASH => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Number(a / b))
        }

        TokenKind::GREATER => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(a > b))
        }

        TokenKind::GREATER_EQUAL => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(a >= b))
        }

        TokenKind::LESS => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(a < b))
        }

        TokenKind::LESS_EQUAL => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(a <= b))
        }

        TokenKind::EQUAL_EQUAL => Ok(Value::Bool(left == right)),

        TokenKind::BANG_EQUAL => Ok(Value::Bool(left != right)),

        _ => Err(LoxError::runtime(operator, "Invalid binary operator.")),
    }
}

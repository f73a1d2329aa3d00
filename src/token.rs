use log::debug;
use serde::Serialize;
use std::fmt;

/// The different kinds of tokens recognized by the Lox scanner.
///
/// Kinds carry no data; the value of a string or number literal lives in
/// [`Token::literal`].  `IDENTIFIER` is used for user‑defined names and
/// `EOF` marks the end of input.
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// '('
    LEFT_PAREN,

    /// ')'
    RIGHT_PAREN,

    /// '{'
    LEFT_BRACE,

    /// '}'
    RIGHT_BRACE,

    /// ','
    COMMA,

    /// '.'
    DOT,

    /// '-'
    MINUS,

    /// '+'
    PLUS,

    /// ';'
    SEMICOLON,

    /// '/'
    SLASH,

    /// '*'
    STAR,

    /// '!'
    BANG,

    /// '!='
    BANG_EQUAL,

    /// '='
    EQUAL,

    /// '=='
    EQUAL_EQUAL,

    /// '>'
    GREATER,

    /// '>='
    GREATER_EQUAL,

    /// '<'
    LESS,

    /// '<='
    LESS_EQUAL,

    /// A user‑defined identifier
    IDENTIFIER,

    /// A string literal
    STRING,

    /// A numeric literal
    NUMBER,

    AND,
    CLASS,
    ELSE,
    FALSE,
    FUN,
    FOR,
    IF,
    NIL,
    OR,
    PRINT,
    RETURN,
    SUPER,
    THIS,
    TRUE,
    VAR,
    WHILE,

    /// End‑of‑file marker
    EOF,
}

impl TokenKind {
    /// Upper-case name used by the `tokenize` output.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::LEFT_PAREN => "LEFT_PAREN",
            TokenKind::RIGHT_PAREN => "RIGHT_PAREN",
            TokenKind::LEFT_BRACE => "LEFT_BRACE",
            TokenKind::RIGHT_BRACE => "RIGHT_BRACE",
            TokenKind::COMMA => "COMMA",
            TokenKind::DOT => "DOT",
            TokenKind::MINUS => "MINUS",
            TokenKind::PLUS => "PLUS",
            TokenKind::SEMICOLON => "SEMICOLON",
            TokenKind::SLASH => "SLASH",
            TokenKind::STAR => "STAR",
            TokenKind::BANG => "BANG",
            TokenKind::BANG_EQUAL => "BANG_EQUAL",
            TokenKind::EQUAL => "EQUAL",
            TokenKind::EQUAL_EQUAL => "EQUAL_EQUAL",
            TokenKind::GREATER => "GREATER",
            TokenKind::GREATER_EQUAL => "GREATER_EQUAL",
            TokenKind::LESS => "LESS",
            TokenKind::LESS_EQUAL => "LESS_EQUAL",
            TokenKind::IDENTIFIER => "IDENTIFIER",
            TokenKind::STRING => "STRING",
            TokenKind::NUMBER => "NUMBER",
            TokenKind::AND => "AND",
            TokenKind::CLASS => "CLASS",
            TokenKind::ELSE => "ELSE",
            TokenKind::FALSE => "FALSE",
            TokenKind::FUN => "FUN",
            TokenKind::FOR => "FOR",
            TokenKind::IF => "IF",
            TokenKind::NIL => "NIL",
            TokenKind::OR => "OR",
            TokenKind::PRINT => "PRINT",
            TokenKind::RETURN => "RETURN",
            TokenKind::SUPER => "SUPER",
            TokenKind::THIS => "THIS",
            TokenKind::TRUE => "TRUE",
            TokenKind::VAR => "VAR",
            TokenKind::WHILE => "WHILE",
            TokenKind::EOF => "EOF",
        }
    }
}

/// A **literal constant** carried by a token or a `Literal` expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    /// Integral lexemes such as `"3"` are still parsed as `3.0`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

/// A scanned lexeme.  Tokens own their text so the AST built from them can
/// outlive the source buffer (closures defined on one REPL line are called
/// from later ones).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// The category of this token.
    pub kind: TokenKind,

    /// The exact substring from the source that produced this token.
    pub lexeme: String,

    /// Value of a `STRING` or `NUMBER` token.
    pub literal: Option<LiteralValue>,

    /// 1‑based line number in the source.
    pub line: usize,
}

impl Token {
    /// Create a new Token with the given kind, lexeme, and line.
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            literal: None,
            line,
        }
    }

    /// Attach a literal value (strings and numbers).
    pub fn with_literal(mut self, literal: LiteralValue) -> Self {
        self.literal = Some(literal);
        self
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug!(
            "Formatting token: kind={:?}, lexeme={}, line={}",
            self.kind, self.lexeme, self.line
        );

        // 3 → "3.0", 3.14 → "3.14", anything else → "null"
        let literal: String = match &self.literal {
            Some(LiteralValue::Str(s)) => s.clone(),
            Some(LiteralValue::Number(n)) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                let mut buf: itoa::Buffer = itoa::Buffer::new();
                format!("{}.0", buf.format(*n as i64))
            }
            Some(LiteralValue::Number(n)) => n.to_string(),
            _ => "null".to_string(),
        };

        write!(f, "{} {} {}", self.kind.name(), self.lexeme, literal)
    }
}

//! Module `scanner` implements a one‑pass, streaming lexer for the Lox language.
//!
//! It turns a `&str` into a sequence of [`Token`]s, skipping whitespace and
//! comments, and emitting exactly one `EOF` token at the end. It is a
//! `FusedIterator`, so it chains safely with other iterator adapters.
//!
//! # Public API
//!
//! - `Scanner::new(src: &'a str) -> Scanner<'a>`
//!   Create a new lexer over the input text.
//!
//! - `impl Iterator for Scanner<'a>`
//!   Yields `Result<Token, LoxError>`; an `Err` reports a lexing error with
//!   line information and scanning continues with the next character.
//!
//! - `tokenize(src, &mut Diagnostics) -> Vec<Token>`
//!   Collect every token, reporting lexical errors to the collector.
//!
//! # Token Recognition
//!
//! - Single‑character tokens: `(`, `)`, `{`, `}`, `,`, `.`, `-`, `+`, `;`, `*`.
//! - Two‑character operators: `!=`, `==`, `<=`, `>=`.
//! - String literals: `"` … `"`, multi‑line allowed, unterminated is an error.
//! - Numeric literals: integer and optional fractional part.
//! - Identifiers/keywords: alphanumeric/_ sequences, resolved via a perfect‑hash
//!   `KEYWORDS` map.
//!
//! # Example
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! let scanner = Scanner::new("print 123; // example");
//! for result in scanner {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("{}", err),
//!     }
//! }
//! ```

use crate::error::{Diagnostics, LoxError, Result};
use crate::token::{LiteralValue, Token, TokenKind};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "and"    => TokenKind::AND,
    "class"  => TokenKind::CLASS,
    "else"   => TokenKind::ELSE,
    "false"  => TokenKind::FALSE,
    "fun"    => TokenKind::FUN,
    "for"    => TokenKind::FOR,
    "if"     => TokenKind::IF,
    "nil"    => TokenKind::NIL,
    "or"     => TokenKind::OR,
    "print"  => TokenKind::PRINT,
    "return" => TokenKind::RETURN,
    "super"  => TokenKind::SUPER,
    "this"   => TokenKind::THIS,
    "true"   => TokenKind::TRUE,
    "var"    => TokenKind::VAR,
    "while"  => TokenKind::WHILE,
};

/// A single pass **scanner / lexer** over Lox source text.
pub struct Scanner<'a> {
    src: &'a str,
    start: usize,                                      // first byte of the current lexeme
    curr: usize,                                       // one past the last byte examined
    line: usize,                                       // 1‑based line counter
    pending: Option<(TokenKind, Option<LiteralValue>)>, // recognised token waiting to be emitted
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `src`.
    #[inline]
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
        }
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    fn len(&self) -> usize {
        self.src.len()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.len()
    }

    /// Advance one byte and return it.  Callers guard with [`Self::is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.src.as_bytes()[self.curr];
        self.curr += 1;
        b
    }

    /// Current byte, or `0` past EOF.
    #[inline(always)]
    fn peek(&self) -> u8 {
        self.src.as_bytes().get(self.curr).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn peek_next(&self) -> u8 {
        self.src.as_bytes().get(self.curr + 1).copied().unwrap_or(0)
    }

    /// Consume a byte **iff** it matches `expected`.
    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    #[inline(always)]
    fn emit(&mut self, kind: TokenKind) {
        self.pending = Some((kind, None));
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan a *single* lexeme starting at `self.curr`.  Whitespace and
    /// comments leave `pending` empty.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        match b {
            b'(' => self.emit(TokenKind::LEFT_PAREN),
            b')' => self.emit(TokenKind::RIGHT_PAREN),
            b'{' => self.emit(TokenKind::LEFT_BRACE),
            b'}' => self.emit(TokenKind::RIGHT_BRACE),
            b',' => self.emit(TokenKind::COMMA),
            b'.' => self.emit(TokenKind::DOT),
            b'-' => self.emit(TokenKind::MINUS),
            b'+' => self.emit(TokenKind::PLUS),
            b';' => self.emit(TokenKind::SEMICOLON),
            b'*' => self.emit(TokenKind::STAR),

            b'!' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::BANG_EQUAL
                } else {
                    TokenKind::BANG
                };
                self.emit(kind);
            }

            b'=' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::EQUAL_EQUAL
                } else {
                    TokenKind::EQUAL
                };
                self.emit(kind);
            }

            b'<' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::LESS_EQUAL
                } else {
                    TokenKind::LESS
                };
                self.emit(kind);
            }

            b'>' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::GREATER_EQUAL
                } else {
                    TokenKind::GREATER
                };
                self.emit(kind);
            }

            b' ' | b'\r' | b'\t' => {}

            b'\n' => self.line += 1,

            b'/' => {
                if self.match_byte(b'/') {
                    // Skip to the next newline; the newline itself is scanned
                    // normally so the line counter stays right.
                    match memchr(b'\n', &self.src.as_bytes()[self.curr..]) {
                        Some(pos) => self.curr += pos,
                        None => self.curr = self.len(),
                    }
                } else {
                    self.emit(TokenKind::SLASH);
                }
            }

            b'"' => return self.string(),

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                // Step over the whole character so multi-byte input yields one
                // error, not one per byte.
                let c = self.src[self.start..].chars().next().unwrap_or('\u{FFFD}');
                self.curr = self.start + c.len_utf8();

                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", c),
                ));
            }
        }

        Ok(())
    }

    /// Double‑quoted string literal.  On return `self.curr` is past the
    /// closing quote.
    fn string(&mut self) -> Result<()> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        self.advance();

        let value = &self.src[self.start + 1..self.curr - 1];
        self.pending = Some((TokenKind::STRING, Some(LiteralValue::Str(value.to_owned()))));

        Ok(())
    }

    /// Numeric literal (`123`, `3.14`).  A trailing `.` is not consumed.
    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let n: f64 = self.src[self.start..self.curr].parse().unwrap_or(0.0); // digits only
        self.pending = Some((TokenKind::NUMBER, Some(LiteralValue::Number(n))));
    }

    fn identifier(&mut self) {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.advance();
        }

        let text = &self.src[self.start..self.curr];
        let kind = KEYWORDS.get(text).copied().unwrap_or(TokenKind::IDENTIFIER);

        self.emit(kind);
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.curr <= self.len() {
            // Emit exactly one EOF, then stay exhausted.
            if self.curr == self.len() {
                self.curr += 1;
                return Some(Ok(Token::new(TokenKind::EOF, "", self.line)));
            }

            self.start = self.curr;
            self.pending = None;

            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            if let Some((kind, literal)) = self.pending.take() {
                let lexeme = &self.src[self.start..self.curr];
                debug!("Scanned token ({:?}) on line {}", kind, self.line);

                let token = Token::new(kind, lexeme, self.line);
                return Some(Ok(match literal {
                    Some(literal) => token.with_literal(literal),
                    None => token,
                }));
            }
        }

        None
    }
}

impl<'a> FusedIterator for Scanner<'a> {}

/// Scan all of `src`, reporting lexical errors and returning the tokens that
/// did scan (always ending in `EOF`).
pub fn tokenize(src: &str, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let mut tokens = Vec::new();

    for result in Scanner::new(src) {
        match result {
            Ok(token) => tokens.push(token),
            Err(e) => diagnostics.report(e),
        }
    }

    info!("Tokenized {} tokens", tokens.len());

    tokens
}

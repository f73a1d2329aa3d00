#[cfg(test)]
mod scanner_tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use rox::scanner::*;
    use rox::token::*;
    use rox::{Diagnostics, LoxError};

    fn assert_token_sequence(source: &str, expected: &[(TokenKind, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_kind, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.kind, *expected_kind);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenKind::LEFT_PAREN, "("),
                (TokenKind::LEFT_BRACE, "{"),
                (TokenKind::STAR, "*"),
                (TokenKind::DOT, "."),
                (TokenKind::COMMA, ","),
                (TokenKind::PLUS, "+"),
                (TokenKind::STAR, "*"),
                (TokenKind::RIGHT_BRACE, "}"),
                (TokenKind::RIGHT_PAREN, ")"),
                (TokenKind::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_two_char_operators() {
        assert_token_sequence(
            "! != = == < <= > >= /",
            &[
                (TokenKind::BANG, "!"),
                (TokenKind::BANG_EQUAL, "!="),
                (TokenKind::EQUAL, "="),
                (TokenKind::EQUAL_EQUAL, "=="),
                (TokenKind::LESS, "<"),
                (TokenKind::LESS_EQUAL, "<="),
                (TokenKind::GREATER, ">"),
                (TokenKind::GREATER_EQUAL, ">="),
                (TokenKind::SLASH, "/"),
                (TokenKind::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "var fun_1 = fun (x) { return x and nil or true; } _under classy",
            &[
                (TokenKind::VAR, "var"),
                (TokenKind::IDENTIFIER, "fun_1"),
                (TokenKind::EQUAL, "="),
                (TokenKind::FUN, "fun"),
                (TokenKind::LEFT_PAREN, "("),
                (TokenKind::IDENTIFIER, "x"),
                (TokenKind::RIGHT_PAREN, ")"),
                (TokenKind::LEFT_BRACE, "{"),
                (TokenKind::RETURN, "return"),
                (TokenKind::IDENTIFIER, "x"),
                (TokenKind::AND, "and"),
                (TokenKind::NIL, "nil"),
                (TokenKind::OR, "or"),
                (TokenKind::TRUE, "true"),
                (TokenKind::SEMICOLON, ";"),
                (TokenKind::RIGHT_BRACE, "}"),
                (TokenKind::IDENTIFIER, "_under"),
                (TokenKind::IDENTIFIER, "classy"),
                (TokenKind::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_token_sequence(
            "print 1; // the rest is ignored ( { \"\nprint 2;",
            &[
                (TokenKind::PRINT, "print"),
                (TokenKind::NUMBER, "1"),
                (TokenKind::SEMICOLON, ";"),
                (TokenKind::PRINT, "print"),
                (TokenKind::NUMBER, "2"),
                (TokenKind::SEMICOLON, ";"),
                (TokenKind::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_trailing_dot_is_not_part_of_number() {
        assert_token_sequence(
            "123.",
            &[
                (TokenKind::NUMBER, "123"),
                (TokenKind::DOT, "."),
                (TokenKind::EOF, ""),
            ],
        );
    }

    #[rstest]
    #[case("42", "NUMBER 42 42.0")]
    #[case("3.14", "NUMBER 3.14 3.14")]
    #[case("\"hello world\"", "STRING \"hello world\" hello world")]
    #[case("foo", "IDENTIFIER foo null")]
    #[case("while", "WHILE while null")]
    #[case(";", "SEMICOLON ; null")]
    fn test_token_display(#[case] source: &str, #[case] expected: &str) {
        let token = Scanner::new(source)
            .next()
            .expect("one token")
            .expect("scans cleanly");

        assert_eq!(token.to_string(), expected);
    }

    #[test]
    fn test_literal_values() {
        let tokens: Vec<Token> = Scanner::new("12.5 \"text\"").filter_map(Result::ok).collect();

        assert_eq!(tokens[0].literal, Some(LiteralValue::Number(12.5)));
        assert_eq!(tokens[1].literal, Some(LiteralValue::Str("text".to_string())));
        assert_eq!(tokens[2].literal, None);
    }

    #[test]
    fn test_line_numbers() {
        let source = "var a;\n// comment\n\"two\nlines\"\nprint a;";
        let tokens: Vec<Token> = Scanner::new(source).filter_map(Result::ok).collect();

        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();

        // var a ; STRING print a ; EOF
        assert_eq!(lines, vec![1, 1, 1, 4, 5, 5, 5, 5]);
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let results: Vec<_> = Scanner::new(source).collect();

        // COMMA, DOT, error for '$', LEFT_PAREN, error for '#', EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenKind::COMMA, ",");
        assert_token_matches(&results[1], TokenKind::DOT, ".");
        assert_token_matches(&results[3], TokenKind::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenKind::EOF, "");

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            errors,
            vec![
                "[line 1] Error: Unexpected character: $",
                "[line 1] Error: Unexpected character: #",
            ]
        );

        fn assert_token_matches(
            result: &Result<Token, LoxError>,
            expected_kind: TokenKind,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(
                        token.kind, expected_kind,
                        "Expected token kind {:?}, got {:?}",
                        expected_kind, token.kind
                    );
                    assert_eq!(
                        token.lexeme, expected_lexeme,
                        "Expected lexeme '{}', got '{}'",
                        expected_lexeme, token.lexeme
                    );
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn test_multibyte_character_is_one_error() {
        let results: Vec<_> = Scanner::new("é").collect();

        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0].as_ref().map_err(ToString::to_string).err(),
            Some("[line 1] Error: Unexpected character: é".to_string())
        );
    }

    #[test]
    fn test_unterminated_string() {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize("print \"abc\n", &mut diagnostics);

        assert_eq!(
            diagnostics.messages(),
            vec!["[line 2] Error: Unterminated string."]
        );
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::EOF));
        assert!(diagnostics.has_static_errors());
    }

    #[test]
    fn test_exactly_one_eof() {
        let mut scanner = Scanner::new("");

        assert_eq!(
            scanner.next().map(|r| r.map(|t| t.kind).ok()),
            Some(Some(TokenKind::EOF))
        );
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }
}

#[cfg(test)]
mod scanner_tests {
    use pretty_assertions::assert_eq;
    use treelox as lox;

    use lox::error::{Diagnostics, Reporter};
    use lox::scanner::*;
    use lox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_two_char_operators() {
        assert_token_sequence(
            "! != = == < <= > >= /",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::SLASH, "/"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "class Foo < Bar { init() { this.x_1 = super.y; } } orchid",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "Foo"),
                (TokenType::LESS, "<"),
                (TokenType::IDENTIFIER, "Bar"),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::IDENTIFIER, "init"),
                (TokenType::LEFT_PAREN, "("),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::THIS, "this"),
                (TokenType::DOT, "."),
                (TokenType::IDENTIFIER, "x_1"),
                (TokenType::EQUAL, "="),
                (TokenType::SUPER, "super"),
                (TokenType::DOT, "."),
                (TokenType::IDENTIFIER, "y"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::IDENTIFIER, "orchid"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_number_literals() {
        let tokens: Vec<Token> = Scanner::new("12 3.25 7.").filter_map(Result::ok).collect();

        assert_eq!(tokens[0].literal(), Some(Literal::Number(12.0)));
        assert_eq!(tokens[1].literal(), Some(Literal::Number(3.25)));
        // No trailing-dot numbers: `7.` is NUMBER then DOT.
        assert_eq!(tokens[2].lexeme, "7");
        assert_eq!(tokens[3].token_type, TokenType::DOT);
        assert_eq!(tokens[0].to_string(), "NUMBER 12 12.0");
        assert_eq!(tokens[1].to_string(), "NUMBER 3.25 3.25");
    }

    #[test]
    fn test_multiline_string_tracks_lines() {
        let tokens: Vec<Token> = Scanner::new("\"a\nb\" x").filter_map(Result::ok).collect();

        assert_eq!(tokens[0].literal(), Some(Literal::Str("a\nb".to_string())));
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[0].to_string(), "STRING \"a\nb\" a\nb");
    }

    #[test]
    fn test_comments_are_skipped_and_counted() {
        let source = "a // line comment\n/* block\n comment */ b /* */ c";
        let tokens: Vec<Token> = Scanner::new(source).filter_map(Result::ok).collect();

        let lines: Vec<(String, usize)> = tokens
            .iter()
            .map(|t| (t.lexeme.clone(), t.line))
            .collect();

        assert_eq!(
            lines,
            vec![
                ("a".to_string(), 1),
                ("b".to_string(), 3),
                ("c".to_string(), 3),
                ("".to_string(), 3),
            ]
        );
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let scanner = Scanner::new(source);

        // Collect all results (both tokens and errors)
        let results: Vec<_> = scanner.collect();

        // 0: COMMA  1: DOT  2: error '$'  3: LEFT_PAREN  4: error '#'  5: EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 2, "Expected 2 error messages");

        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert_eq!(err.to_string(), "[line 1] Error: Unexpected character.");
        }

        fn assert_token_matches(
            result: &lox::error::Result<Token>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(token.token_type, expected_type);
                    assert_eq!(token.lexeme, expected_lexeme);
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn test_unterminated_string_reports_once() {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new("print \"abc").scan_tokens(&mut diagnostics);

        assert_eq!(
            diagnostics.messages(),
            vec!["[line 1] Error: Unterminated string.".to_string()]
        );
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].token_type, TokenType::EOF);
    }

    #[test]
    fn test_lone_symbol_reports_once_and_keeps_scanning() {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new("@\nvar é = 1;").scan_tokens(&mut diagnostics);

        assert!(diagnostics.had_error());
        assert_eq!(
            diagnostics.messages(),
            vec![
                "[line 1] Error: Unexpected character.".to_string(),
                "[line 2] Error: Unexpected character.".to_string(),
            ]
        );

        let kinds: Vec<&str> = tokens.iter().map(|t| t.token_type.name()).collect();
        assert_eq!(kinds, vec!["VAR", "EQUAL", "NUMBER", "SEMICOLON", "EOF"]);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new("a /* never\nclosed").scan_tokens(&mut diagnostics);

        assert_eq!(
            diagnostics.messages(),
            vec!["[line 2] Error: Unterminated block comment.".to_string()]
        );
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_single_eof_and_monotonic_lines() {
        let sources = [
            "",
            "\n\n\n",
            "var a = \"x\ny\";\n/* c\n*/ print a; $ \"open",
            "fun f(a, b) {\n return a + b;\n}\n// trailing",
        ];

        for source in sources {
            let mut diagnostics = Diagnostics::new();
            let tokens = Scanner::new(source).scan_tokens(&mut diagnostics);

            let eofs = tokens
                .iter()
                .filter(|t| t.token_type == TokenType::EOF)
                .count();
            assert_eq!(eofs, 1, "source {:?}", source);
            assert_eq!(tokens.last().map(|t| t.token_type.name()), Some("EOF"));

            assert!(
                tokens.windows(2).all(|w| w[0].line <= w[1].line),
                "lines must not decrease for {:?}",
                source
            );
        }
    }
}

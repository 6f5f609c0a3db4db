//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: `function` and `let`/`const`/`var` declarations
//! - `statements`: control flow and expression statements
//! - `expressions`: expressions with precedence climbing
//!
//! Parser methods are split across these files using `impl Parser` blocks.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token};
use std::fmt;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Deepest nesting of statements and sub-expressions accepted. Every
/// statement, assignment and unary operand counts one level.
pub const MAX_NESTING_DEPTH: usize = 200;

/// Recursive descent parser for the script subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            depth: 0,
        })
    }

    /// Parse the entire program. Only `function` declarations are allowed at
    /// the top level.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            if self.match_token(&Token::Semicolon(self.current_location())) {
                continue;
            }
            let function = self.parse_function()?;
            if program.function(&function.name).is_some() {
                return Err(ParseError {
                    message: format!("Function '{}' is declared twice", function.name),
                    location: function.location,
                });
            }
            program.functions.push(function);
        }

        Ok(program)
    }

    // ===== Helper methods =====

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    /// Run `parse` one nesting level deeper, failing past [`MAX_NESTING_DEPTH`]
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return self.error(format!("Code is nested more than {} levels deep", MAX_NESTING_DEPTH));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.previous().location()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    pub(crate) fn error<T>(&self, message: impl Into<String>) -> Result<T, ParseError> {
        Err(ParseError {
            message: message.into(),
            location: self.current_location(),
        })
    }

    pub(crate) fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            self.error(format!("{}, found {}", message, self.peek()))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::LParen(self.current_location()),
            &format!("Expected '(' {ctx}"),
        )
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RParen(self.current_location()),
            &format!("Expected ')' {ctx}"),
        )
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::LBrace(self.current_location()),
            &format!("Expected '{{' {ctx}"),
        )
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RBrace(self.current_location()),
            &format!("Expected '}}' {ctx}"),
        )
    }

    /// Semicolons are optional before `}` and at end of file
    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        if self.match_token(&Token::Semicolon(self.current_location())) {
            return Ok(());
        }
        if matches!(self.peek(), Token::RBrace(_) | Token::Eof(_)) {
            return Ok(());
        }
        // Automatic semicolon insertion at a line break
        if self.peek().location().line > self.previous_location().line {
            return Ok(());
        }
        self.error(format!("Expected ';' {}, found {}", ctx, self.peek()))
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            self.error(format!("Expected identifier, found {}", self.peek()))
        }
    }
}

/// Parse a whole program from source
pub fn parse(source: &str) -> Result<Program, ParseError> {
    Parser::new(source)?.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_function() {
        let program = parse("function add(a, b) { return a + b; }").unwrap();

        assert_eq!(program.functions.len(), 1);
        let f = &program.functions[0];
        assert_eq!(f.name, "add");
        assert_eq!(f.params, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(f.body.len(), 1);
        assert!(matches!(f.body[0], AstNode::Return { .. }));
    }

    #[test]
    fn test_top_level_statement_is_rejected() {
        let err = parse("let x = 1;").unwrap_err();
        assert!(err.message.contains("function"));
    }

    #[test]
    fn test_duplicate_function() {
        let err = parse("function f() {} function f() {}").unwrap_err();
        assert!(err.message.contains("declared twice"));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let parens = format!(
            "function f() {{ return {}1{}; }}",
            "(".repeat(10_000),
            ")".repeat(10_000)
        );
        let err = parse(&parens).unwrap_err();
        assert!(err.message.contains("nested"), "{}", err);

        let nots = format!("function f() {{ return {}x; }}", "!".repeat(10_000));
        assert!(parse(&nots).unwrap_err().message.contains("nested"));

        let blocks = format!("function f() {{ {}{} }}", "{".repeat(10_000), "}".repeat(10_000));
        assert!(parse(&blocks).unwrap_err().message.contains("nested"));

        let chain = format!("function f() {{ {}1; }}", "a = ".repeat(10_000));
        assert!(parse(&chain).unwrap_err().message.contains("nested"));
    }

    #[test]
    fn test_ordinary_nesting_is_accepted() {
        let source = format!(
            "function f(x) {{ {} return {}x{}; {} }}",
            "if (x) {".repeat(20),
            "(".repeat(20),
            ")".repeat(20),
            "}".repeat(20)
        );
        assert!(parse(&source).is_ok());
    }

    #[test]
    fn test_missing_semicolon_on_same_line() {
        assert!(parse("function f() { let a = 1 let b = 2; }").is_err());
        assert!(parse("function f() {\n let a = 1\n let b = 2\n}").is_ok());
    }
}

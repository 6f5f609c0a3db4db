//! Declaration parsing: `function` definitions and `let`/`const`/`var`
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// `function name(a, b) { ... }`
    pub(crate) fn parse_function(&mut self) -> Result<FunctionDef, ParseError> {
        let location = self.current_location();
        if !self.match_token(&Token::Function(location)) {
            return self.error(format!(
                "Expected a function declaration at the top level, found {}",
                self.peek()
            ));
        }

        let name = self.expect_identifier()?;
        self.expect_lparen("after function name")?;

        let mut params = Vec::new();
        if !self.check(&Token::RParen(self.current_location())) {
            loop {
                let param_loc = self.current_location();
                let param = self.expect_identifier()?;
                if params.contains(&param) {
                    return Err(ParseError {
                        message: format!("Duplicate parameter '{}'", param),
                        location: param_loc,
                    });
                }
                params.push(param);
                if !self.match_token(&Token::Comma(self.current_location())) {
                    break;
                }
            }
        }
        self.expect_rparen("after parameters")?;

        let body = self.parse_block("to start function body")?;

        Ok(FunctionDef {
            name,
            params,
            body,
            location,
        })
    }

    pub(crate) fn is_declaration_keyword(&self) -> bool {
        matches!(self.peek(), Token::Let(_) | Token::Const(_) | Token::Var(_))
    }

    pub(crate) fn parse_decl_kind(&mut self) -> Result<DeclKind, ParseError> {
        let kind = match self.peek() {
            Token::Let(_) => DeclKind::Let,
            Token::Const(_) => DeclKind::Const,
            Token::Var(_) => DeclKind::Var,
            other => {
                return self.error(format!("Expected 'let', 'const' or 'var', found {}", other));
            }
        };
        self.advance();
        Ok(kind)
    }

    /// `let a = 1, b;` without the trailing semicolon
    pub(crate) fn parse_var_decl(&mut self) -> Result<AstNode, ParseError> {
        let location = self.current_location();
        let kind = self.parse_decl_kind()?;
        self.parse_declarators(kind, location)
    }

    pub(crate) fn parse_declarators(
        &mut self,
        kind: DeclKind,
        location: SourceLocation,
    ) -> Result<AstNode, ParseError> {
        let mut declarators = Vec::new();
        loop {
            let decl_loc = self.current_location();
            let name = self.expect_identifier()?;
            let init = if self.match_token(&Token::Eq(self.current_location())) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            if kind == DeclKind::Const && init.is_none() {
                return Err(ParseError {
                    message: format!("Missing initializer in const declaration of '{}'", name),
                    location: decl_loc,
                });
            }
            declarators.push(Declarator {
                name,
                init,
                location: decl_loc,
            });
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(AstNode::VarDecl {
            kind,
            declarators,
            location,
        })
    }
}

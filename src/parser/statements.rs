//! Statement parsing implementation
//!
//! Handles blocks, declarations, `if`/`else`, `while`, C-style `for`,
//! `for (... of ...)`, `break`, `continue`, `return` and expression statements.
//!
//! Loop and branch bodies are always normalised to a `Vec<AstNode>` so a
//! braceless body (`if (x) return 1;`) looks the same as a braced one.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// `{ stmt* }`
    pub(crate) fn parse_block(&mut self, ctx: &str) -> Result<Vec<AstNode>, ParseError> {
        self.expect_lbrace(ctx)?;
        let mut statements = Vec::new();
        while !self.check(&Token::RBrace(self.current_location())) {
            if self.is_at_end() {
                return self.error("Unexpected end of file, expected '}'");
            }
            if self.match_token(&Token::Semicolon(self.current_location())) {
                continue;
            }
            statements.push(self.parse_statement()?);
        }
        self.expect_rbrace("to close block")?;
        Ok(statements)
    }

    /// A braced block or a single statement
    fn parse_body(&mut self) -> Result<Vec<AstNode>, ParseError> {
        if self.check(&Token::LBrace(self.current_location())) {
            self.parse_block("")
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    pub(crate) fn parse_statement(&mut self) -> Result<AstNode, ParseError> {
        self.nested(Self::parse_statement_at_depth)
    }

    fn parse_statement_at_depth(&mut self) -> Result<AstNode, ParseError> {
        let location = self.current_location();
        match self.peek() {
            Token::LBrace(_) => {
                let body = self.parse_block("")?;
                Ok(AstNode::Block { body, location })
            }
            Token::Let(_) | Token::Const(_) | Token::Var(_) => {
                let decl = self.parse_var_decl()?;
                self.expect_semicolon("after declaration")?;
                Ok(decl)
            }
            Token::If(_) => self.parse_if(),
            Token::While(_) => self.parse_while(),
            Token::For(_) => self.parse_for(),
            Token::Break(_) => {
                self.advance();
                self.expect_semicolon("after 'break'")?;
                Ok(AstNode::Break { location })
            }
            Token::Continue(_) => {
                self.advance();
                self.expect_semicolon("after 'continue'")?;
                Ok(AstNode::Continue { location })
            }
            Token::Return(_) => self.parse_return(),
            Token::Function(_) => self.error("Nested functions are not supported"),
            _ => {
                let expr = self.parse_expression()?;
                self.expect_semicolon("after expression")?;
                Ok(AstNode::ExpressionStatement {
                    expr: Box::new(expr),
                    location,
                })
            }
        }
    }

    fn parse_if(&mut self) -> Result<AstNode, ParseError> {
        let location = self.current_location();
        self.advance(); // 'if'
        self.expect_lparen("after 'if'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_rparen("after if condition")?;

        let then_branch = self.parse_body()?;
        let else_branch = if self.match_token(&Token::Else(self.current_location())) {
            Some(self.parse_body()?)
        } else {
            None
        };

        Ok(AstNode::If {
            condition,
            then_branch,
            else_branch,
            location,
        })
    }

    fn parse_while(&mut self) -> Result<AstNode, ParseError> {
        let location = self.current_location();
        self.advance(); // 'while'
        self.expect_lparen("after 'while'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_rparen("after while condition")?;
        let body = self.parse_body()?;

        Ok(AstNode::While {
            condition,
            body,
            location,
        })
    }

    /// `for (init; cond; inc)` or `for (let x of xs)`
    fn parse_for(&mut self) -> Result<AstNode, ParseError> {
        let location = self.current_location();
        self.advance(); // 'for'
        self.expect_lparen("after 'for'")?;

        // for-of: a declaration keyword, one identifier, then `of`
        if self.is_declaration_keyword()
            && matches!(self.peek_ahead(1), Some(Token::Ident(..)))
            && matches!(self.peek_ahead(2), Some(Token::Ident(word, _)) if word == "of")
        {
            let kind = self.parse_decl_kind()?;
            let name = self.expect_identifier()?;
            self.advance(); // 'of'
            let iterable = Box::new(self.parse_expression()?);
            self.expect_rparen("after for-of iterable")?;
            let body = self.parse_body()?;
            return Ok(AstNode::ForOf {
                kind,
                name,
                iterable,
                body,
                location,
            });
        }

        let init = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else if self.is_declaration_keyword() {
            Some(Box::new(self.parse_var_decl()?))
        } else {
            let expr_loc = self.current_location();
            let expr = self.parse_expression()?;
            Some(Box::new(AstNode::ExpressionStatement {
                expr: Box::new(expr),
                location: expr_loc,
            }))
        };
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            "Expected ';' after for initializer",
        )?;

        let condition = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            "Expected ';' after for condition",
        )?;

        let increment = if self.check(&Token::RParen(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_rparen("after for clauses")?;

        let body = self.parse_body()?;

        Ok(AstNode::For {
            init,
            condition,
            increment,
            body,
            location,
        })
    }

    fn parse_return(&mut self) -> Result<AstNode, ParseError> {
        let location = self.current_location();
        self.advance(); // 'return'

        let ends_here = matches!(
            self.peek(),
            Token::Semicolon(_) | Token::RBrace(_) | Token::Eof(_)
        ) || self.current_location().line > location.line;

        let expr = if ends_here {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_semicolon("after return")?;

        Ok(AstNode::Return { expr, location })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::parse;

    fn body(source: &str) -> Vec<AstNode> {
        parse(source).unwrap().functions.remove(0).body
    }

    #[test]
    fn test_for_loop() {
        let stmts = body("function f(n) { for (let i = 0; i < n; i++) { n--; } }");
        match &stmts[0] {
            AstNode::For {
                init,
                condition,
                increment,
                body,
                ..
            } => {
                assert!(matches!(init.as_deref(), Some(AstNode::VarDecl { .. })));
                assert!(condition.is_some());
                assert!(increment.is_some());
                assert_eq!(body.len(), 1);
            }
            other => panic!("Expected for loop, got {:?}", other),
        }
    }

    #[test]
    fn test_for_of_loop() {
        let stmts = body("function f(xs) { for (const x of xs) total += x; }");
        match &stmts[0] {
            AstNode::ForOf { kind, name, .. } => {
                assert_eq!(*kind, DeclKind::Const);
                assert_eq!(name, "x");
            }
            other => panic!("Expected for-of loop, got {:?}", other),
        }
    }

    #[test]
    fn test_if_else_chain() {
        let stmts = body("function f(x) { if (x > 0) return 1; else if (x < 0) return -1; else return 0; }");
        match &stmts[0] {
            AstNode::If { else_branch, .. } => {
                let inner = else_branch.as_ref().unwrap();
                assert!(matches!(inner[0], AstNode::If { .. }));
            }
            other => panic!("Expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_return() {
        let stmts = body("function f() { return; }");
        assert!(matches!(stmts[0], AstNode::Return { expr: None, .. }));
    }
}

//! Expression parsing implementation
//!
//! Precedence climbing for binary operators and recursive descent for the rest.
//!
//! # Precedence (lowest first)
//!
//! 1. Assignment `= += -= *= /= %=` (right-associative)
//! 2. Ternary `? :`
//! 3. `||`
//! 4. `&&`
//! 5. Equality `=== !== == !=`
//! 6. Relational `< <= > >=`
//! 7. Additive `+ -`
//! 8. Multiplicative `* / %`
//! 9. Unary `! - + ++x --x`
//! 10. Postfix: calls, `[]`, `.`, `x++`, `x--`

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<AstNode, ParseError> {
        self.parse_assignment()
    }

    /// Parse assignment or ternary (right-associative)
    fn parse_assignment(&mut self) -> Result<AstNode, ParseError> {
        self.nested(Self::parse_assignment_at_depth)
    }

    fn parse_assignment_at_depth(&mut self) -> Result<AstNode, ParseError> {
        let expr = self.parse_ternary()?;

        let loc = self.current_location();
        if self.match_token(&Token::Eq(loc)) {
            Self::check_assignable(&expr, true)?;
            let rhs = Box::new(self.parse_assignment()?);
            return Ok(AstNode::Assignment {
                lhs: Box::new(expr),
                rhs,
                location: loc,
            });
        }

        let compound_op = match self.peek() {
            Token::PlusEq(_) => Some(BinOp::Add),
            Token::MinusEq(_) => Some(BinOp::Sub),
            Token::StarEq(_) => Some(BinOp::Mul),
            Token::SlashEq(_) => Some(BinOp::Div),
            Token::PercentEq(_) => Some(BinOp::Mod),
            _ => None,
        };

        if let Some(op) = compound_op {
            self.advance();
            Self::check_assignable(&expr, false)?;
            let rhs = Box::new(self.parse_assignment()?);
            return Ok(AstNode::CompoundAssignment {
                lhs: Box::new(expr),
                op,
                rhs,
                location: loc,
            });
        }

        Ok(expr)
    }

    /// Variables, `a[i]`, `o.x`, and (for plain `=`) `[a, b[i]]` patterns
    fn check_assignable(target: &AstNode, allow_pattern: bool) -> Result<(), ParseError> {
        match target {
            AstNode::Variable(..) | AstNode::Index { .. } | AstNode::MemberAccess { .. } => Ok(()),
            AstNode::ArrayLiteral { elements, .. } if allow_pattern => elements
                .iter()
                .try_for_each(|e| Self::check_assignable(e, false)),
            other => Err(ParseError {
                message: "Invalid assignment target".to_string(),
                location: *other.location(),
            }),
        }
    }

    /// Parse ternary: condition ? true_expr : false_expr
    fn parse_ternary(&mut self) -> Result<AstNode, ParseError> {
        let expr = self.parse_logical_or()?;

        if self.match_token(&Token::Question(self.current_location())) {
            let loc = self.previous_location();
            let true_expr = Box::new(self.parse_assignment()?);
            self.expect_token(
                &Token::Colon(self.current_location()),
                "Expected ':' in ternary expression",
            )?;
            let false_expr = Box::new(self.parse_assignment()?);

            return Ok(AstNode::TernaryOp {
                condition: Box::new(expr),
                true_expr,
                false_expr,
                location: loc,
            });
        }

        Ok(expr)
    }

    fn parse_logical_or(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_logical_and()?;

        while self.match_token(&Token::OrOr(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_logical_and()?);
            left = AstNode::BinaryOp {
                op: BinOp::Or,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_binary(0)?;

        while self.match_token(&Token::AndAnd(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_binary(0)?);
            left = AstNode::BinaryOp {
                op: BinOp::And,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Binding power of the binary operator at the cursor, if any
    fn binary_operator(&self) -> Option<(BinOp, u8)> {
        let op = match self.peek() {
            Token::EqEqEq(_) => (BinOp::StrictEq, 1),
            Token::NotEqEq(_) => (BinOp::StrictNe, 1),
            Token::EqEq(_) => (BinOp::Eq, 1),
            Token::NotEq(_) => (BinOp::Ne, 1),
            Token::Lt(_) => (BinOp::Lt, 2),
            Token::Le(_) => (BinOp::Le, 2),
            Token::Gt(_) => (BinOp::Gt, 2),
            Token::Ge(_) => (BinOp::Ge, 2),
            Token::Plus(_) => (BinOp::Add, 3),
            Token::Minus(_) => (BinOp::Sub, 3),
            Token::Star(_) => (BinOp::Mul, 4),
            Token::Slash(_) => (BinOp::Div, 4),
            Token::Percent(_) => (BinOp::Mod, 4),
            _ => return None,
        };
        Some(op)
    }

    /// Precedence climbing over equality, relational and arithmetic operators
    fn parse_binary(&mut self, min_prec: u8) -> Result<AstNode, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some((op, prec)) = self.binary_operator() {
            if prec < min_prec {
                break;
            }
            let loc = self.current_location();
            self.advance();
            let right = self.parse_binary(prec + 1)?;
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location: loc,
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<AstNode, ParseError> {
        self.nested(Self::parse_unary_at_depth)
    }

    fn parse_unary_at_depth(&mut self) -> Result<AstNode, ParseError> {
        let location = self.current_location();
        let op = match self.peek() {
            Token::Bang(_) => Some(UnOp::Not),
            Token::Minus(_) => Some(UnOp::Neg),
            Token::Plus(_) => Some(UnOp::Plus),
            Token::PlusPlus(_) => Some(UnOp::PreInc),
            Token::MinusMinus(_) => Some(UnOp::PreDec),
            _ => None,
        };

        match op {
            Some(op) => {
                self.advance();
                let operand = self.parse_unary()?;
                if matches!(op, UnOp::PreInc | UnOp::PreDec) {
                    Self::check_assignable(&operand, false)?;
                }
                Ok(AstNode::UnaryOp {
                    op,
                    operand: Box::new(operand),
                    location,
                })
            }
            None => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<AstNode, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let location = self.current_location();
            match self.peek() {
                Token::LParen(_) => {
                    self.advance();
                    let args = self.parse_arguments()?;
                    expr = AstNode::Call {
                        callee: Box::new(expr),
                        args,
                        location,
                    };
                }
                Token::LBracket(_) => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect_token(
                        &Token::RBracket(self.current_location()),
                        "Expected ']' after index",
                    )?;
                    expr = AstNode::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                        location,
                    };
                }
                Token::Dot(_) => {
                    self.advance();
                    let member = self.expect_identifier()?;
                    expr = AstNode::MemberAccess {
                        object: Box::new(expr),
                        member,
                        location,
                    };
                }
                // Postfix ++/-- must stay on the operand's line
                Token::PlusPlus(_) | Token::MinusMinus(_)
                    if location.line == self.previous_location().line =>
                {
                    let op = if matches!(self.peek(), Token::PlusPlus(_)) {
                        UnOp::PostInc
                    } else {
                        UnOp::PostDec
                    };
                    self.advance();
                    Self::check_assignable(&expr, false)?;
                    expr = AstNode::UnaryOp {
                        op,
                        operand: Box::new(expr),
                        location,
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Comma-separated expressions up to and including `)`
    fn parse_arguments(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut args = Vec::new();
        if !self.check(&Token::RParen(self.current_location())) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(&Token::Comma(self.current_location())) {
                    break;
                }
            }
        }
        self.expect_rparen("after arguments")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<AstNode, ParseError> {
        let location = self.current_location();
        let token = self.peek().clone();

        match token {
            Token::Number(n, _) => {
                self.advance();
                Ok(AstNode::NumberLiteral(n, location))
            }
            Token::StringLiteral(s, _) => {
                self.advance();
                Ok(AstNode::StringLiteral(s, location))
            }
            Token::True(_) => {
                self.advance();
                Ok(AstNode::BoolLiteral(true, location))
            }
            Token::False(_) => {
                self.advance();
                Ok(AstNode::BoolLiteral(false, location))
            }
            Token::Null(_) => {
                self.advance();
                Ok(AstNode::Null { location })
            }
            Token::Undefined(_) => {
                self.advance();
                Ok(AstNode::Undefined { location })
            }
            Token::Ident(name, _) => {
                self.advance();
                Ok(AstNode::Variable(name, location))
            }
            Token::LParen(_) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen("after parenthesized expression")?;
                Ok(expr)
            }
            Token::LBracket(_) => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(&Token::RBracket(self.current_location())) {
                    elements.push(self.parse_expression()?);
                    if !self.match_token(&Token::Comma(self.current_location())) {
                        break;
                    }
                }
                self.expect_token(
                    &Token::RBracket(self.current_location()),
                    "Expected ']' to close array literal",
                )?;
                Ok(AstNode::ArrayLiteral { elements, location })
            }
            Token::New(_) => {
                self.advance();
                let class = self.expect_identifier()?;
                let args = if self.match_token(&Token::LParen(self.current_location())) {
                    self.parse_arguments()?
                } else {
                    Vec::new()
                };
                Ok(AstNode::New {
                    class,
                    args,
                    location,
                })
            }
            other => self.error(format!("Expected expression, found {}", other)),
        }
    }
}

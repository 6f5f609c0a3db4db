//! Statement execution implementation
//!
//! This module handles the execution of every statement type except loops:
//!
//! - Variable declarations (`let`, `const`, `var`)
//! - `if`/`else` and nested blocks
//! - `return`, `break` and `continue`
//! - Expression statements
//! - `Checkpoint` statements inserted by the instrumentation pass
//!
//! # Control Flow
//!
//! `break`, `continue` and `return` set [`ControlFlow`] on the interpreter and
//! stop the enclosing statement list; loops and function calls consume the
//! signal.

use crate::interpreter::engine::{CheckpointHook, ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::*;

impl<H: CheckpointHook> Interpreter<'_, H> {
    pub(crate) fn execute_statement(&mut self, stmt: &AstNode) -> Result<(), RuntimeError> {
        self.descend(*stmt.location())?;
        self.execute_node(stmt)?;
        self.ascend();
        Ok(())
    }

    fn execute_node(&mut self, stmt: &AstNode) -> Result<(), RuntimeError> {
        if let AstNode::Checkpoint { location } = stmt {
            let frame = self
                .stack
                .current_frame()
                .ok_or(RuntimeError::NoStackFrame { location: *location })?;
            return self.hook.on_checkpoint(*location, frame);
        }

        self.tick()?;

        match stmt {
            AstNode::VarDecl {
                kind, declarators, ..
            } => self.execute_var_decl(*kind, declarators),

            AstNode::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.evaluate_expr(condition)?.is_truthy() {
                    self.execute_block(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute_block(else_branch)
                } else {
                    Ok(())
                }
            }

            AstNode::While {
                condition, body, ..
            } => self.execute_while(condition, body),

            AstNode::For {
                init,
                condition,
                increment,
                body,
                ..
            } => self.execute_for(init.as_deref(), condition.as_deref(), increment.as_deref(), body),

            AstNode::ForOf {
                kind,
                name,
                iterable,
                body,
                location,
            } => self.execute_for_of(*kind, name, iterable, body, *location),

            AstNode::Block { body, .. } => self.execute_block(body),

            AstNode::Return { expr, .. } => {
                self.return_value = match expr {
                    Some(expr) => Some(self.evaluate_expr(expr)?),
                    None => None,
                };
                self.control_flow = ControlFlow::Return;
                Ok(())
            }

            AstNode::Break { .. } => {
                self.control_flow = ControlFlow::Break;
                Ok(())
            }

            AstNode::Continue { .. } => {
                self.control_flow = ControlFlow::Continue;
                Ok(())
            }

            AstNode::ExpressionStatement { expr, .. } => {
                self.evaluate_expr(expr)?;
                Ok(())
            }

            other => Err(RuntimeError::unsupported(
                "expression used where a statement was expected",
                *other.location(),
            )),
        }
    }

    /// Run `body` in a fresh block scope, stopping at the first control-flow signal
    pub(crate) fn execute_block(&mut self, body: &[AstNode]) -> Result<(), RuntimeError> {
        self.enter_scope();
        for stmt in body {
            if let Err(e) = self.execute_statement(stmt) {
                self.exit_scope();
                return Err(e);
            }
            if self.control_flow != ControlFlow::Normal {
                break;
            }
        }
        self.exit_scope();
        Ok(())
    }

    fn execute_var_decl(&mut self, kind: DeclKind, declarators: &[Declarator]) -> Result<(), RuntimeError> {
        for decl in declarators {
            let value = match &decl.init {
                Some(init) => self.evaluate_expr(init)?,
                None => Value::Undefined,
            };
            self.declare(&decl.name, kind, value, decl.location)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::{Interpreter, Limits};
    use crate::memory::value::Value;
    use crate::parser::parse;

    fn run(source: &str, args: Vec<Value>) -> Value {
        let program = parse(source).unwrap();
        let mut interp = Interpreter::new(&program, (), Limits::default());
        interp.call("f", args).unwrap()
    }

    #[test]
    fn test_if_else() {
        let source = "function f(x) { if (x > 0) { return 'pos'; } else if (x < 0) { return 'neg'; } return 'zero'; }";
        assert_eq!(run(source, vec![Value::Number(3.0)]).to_string(), "pos");
        assert_eq!(run(source, vec![Value::Number(-3.0)]).to_string(), "neg");
        assert_eq!(run(source, vec![Value::Number(0.0)]).to_string(), "zero");
    }

    #[test]
    fn test_block_scope_shadowing() {
        let source = "function f() { let x = 1; { let x = 2; x = 3; } return x; }";
        assert_eq!(run(source, vec![]).as_int(), Some(1));
    }

    #[test]
    fn test_multiple_declarators() {
        let source = "function f() { let a = 1, b = a + 1, c; return c === undefined ? a + b : 0; }";
        assert_eq!(run(source, vec![]).as_int(), Some(3));
    }

    #[test]
    fn test_bare_return_is_undefined() {
        let source = "function f() { return; }";
        assert!(matches!(run(source, vec![]), Value::Undefined));
    }
}

//! Loop statement execution (`while`, `for`, `for … of`).
//!
//! Adds `impl Interpreter` methods for the three loop forms supported by the
//! script subset. `break` and `continue` are propagated via `LoopBodyResult` so
//! the loop driver can react without inspecting `control_flow` directly.
//!
//! `return` inside a loop body is handled by returning `LoopBodyResult::Exit`,
//! which causes the loop to unwind immediately and let the enclosing function
//! call see the signal.
//!
//! Every iteration is charged against the statement budget, so an empty
//! `while (true) {}` still terminates.

use crate::interpreter::engine::{CheckpointHook, ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::{AstNode, DeclKind, SourceLocation};

/// Result returned by [`Interpreter::execute_loop_body`] to signal how the body ended.
pub(crate) enum LoopBodyResult {
    /// Body completed normally or via `continue`: the loop should iterate again.
    Continue,
    /// `break` was encountered: the loop should exit cleanly.
    Break,
    /// `return` was triggered: the loop driver should unwind and leave
    /// `self.control_flow` for the caller.
    Exit,
}

impl<H: CheckpointHook> Interpreter<'_, H> {
    /// Executes all statements in `body` inside a fresh scope.
    pub(crate) fn execute_loop_body(&mut self, body: &[AstNode]) -> Result<LoopBodyResult, RuntimeError> {
        self.tick()?;
        self.execute_block(body)?;
        Ok(match self.control_flow {
            ControlFlow::Normal => LoopBodyResult::Continue,
            ControlFlow::Continue => {
                self.control_flow = ControlFlow::Normal;
                LoopBodyResult::Continue
            }
            ControlFlow::Break => {
                self.control_flow = ControlFlow::Normal;
                LoopBodyResult::Break
            }
            ControlFlow::Return => LoopBodyResult::Exit,
        })
    }

    /// Executes a `while (condition) { body }` loop.
    pub(crate) fn execute_while(&mut self, condition: &AstNode, body: &[AstNode]) -> Result<(), RuntimeError> {
        while self.evaluate_expr(condition)?.is_truthy() {
            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }
        }
        Ok(())
    }

    /// Executes a `for (init; condition; increment) { body }` loop.
    ///
    /// The initializer's bindings live in a scope wrapping the whole loop.
    pub(crate) fn execute_for(
        &mut self,
        init: Option<&AstNode>,
        condition: Option<&AstNode>,
        increment: Option<&AstNode>,
        body: &[AstNode],
    ) -> Result<(), RuntimeError> {
        self.enter_scope();
        let result = self.run_for(init, condition, increment, body);
        self.exit_scope();
        result
    }

    fn run_for(
        &mut self,
        init: Option<&AstNode>,
        condition: Option<&AstNode>,
        increment: Option<&AstNode>,
        body: &[AstNode],
    ) -> Result<(), RuntimeError> {
        if let Some(init) = init {
            self.execute_statement(init)?;
        }

        loop {
            if let Some(cond) = condition {
                if !self.evaluate_expr(cond)?.is_truthy() {
                    break;
                }
            }

            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }

            if let Some(inc) = increment {
                self.evaluate_expr(inc)?;
            }
        }
        Ok(())
    }

    /// Executes `for (kind name of iterable) { body }`.
    ///
    /// Arrays are walked by index against their live length, so pushes made
    /// by the body are visited. Strings yield one-character strings, sets
    /// their members, and maps `[key, value]` pairs.
    pub(crate) fn execute_for_of(
        &mut self,
        kind: DeclKind,
        name: &str,
        iterable: &AstNode,
        body: &[AstNode],
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let iterable = self.evaluate_expr(iterable)?;

        let mut position = 0;
        loop {
            let item = match &iterable {
                Value::Array(items) => items.borrow().get(position).cloned(),
                Value::Str(s) => s.chars().nth(position).map(|c| Value::Str(c.to_string())),
                Value::Set(set) => set.borrow().get_index(position).map(|k| k.to_value()),
                Value::Map(map) => map
                    .borrow()
                    .get_index(position)
                    .map(|(k, v)| Value::array(vec![k.to_value(), v.clone()])),
                other => {
                    return Err(RuntimeError::type_error(
                        format!("{} is not iterable", other.type_name()),
                        location,
                    ))
                }
            };
            let Some(item) = item else { break };
            position += 1;

            self.enter_scope();
            let outcome = self
                .declare(name, kind, item, location)
                .and_then(|_| self.execute_loop_body(body));
            self.exit_scope();

            match outcome? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }
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
    fn test_for_loop_sum() {
        let source = "function f(n) { let total = 0; for (let i = 1; i <= n; i++) { total += i; } return total; }";
        assert_eq!(run(source, vec![Value::Number(10.0)]).as_int(), Some(55));
    }

    #[test]
    fn test_while_with_break_and_continue() {
        let source = r#"
            function f() {
                let i = 0;
                let odd = 0;
                while (true) {
                    i++;
                    if (i > 9) break;
                    if (i % 2 === 0) continue;
                    odd += 1;
                }
                return odd;
            }
        "#;
        assert_eq!(run(source, vec![]).as_int(), Some(5));
    }

    #[test]
    fn test_return_inside_nested_loops() {
        let source = r#"
            function f(nums, target) {
                for (let i = 0; i < nums.length; i++) {
                    for (let j = i + 1; j < nums.length; j++) {
                        if (nums[i] + nums[j] === target) return [i, j];
                    }
                }
                return [];
            }
        "#;
        let result = run(source, vec![Value::from_ints(&[2, 7, 11, 15]), Value::Number(9.0)]);
        assert_eq!(result.to_string(), "0,1");
    }

    #[test]
    fn test_for_of_over_array_and_string() {
        let source = "function f(xs) { let s = 0; for (const x of xs) s += x; return s; }";
        assert_eq!(run(source, vec![Value::from_ints(&[1, 2, 3])]).as_int(), Some(6));

        let source = "function f(s) { let out = ''; for (const c of s) out = c + out; return out; }";
        assert_eq!(run(source, vec![Value::Str("abc".into())]).to_string(), "cba");
    }

    #[test]
    fn test_for_loop_variable_is_scoped() {
        let program = parse("function f() { for (let i = 0; i < 3; i++) {} return i; }").unwrap();
        let mut interp = Interpreter::new(&program, (), Limits::default());
        assert!(interp.call("f", vec![]).is_err());
    }
}

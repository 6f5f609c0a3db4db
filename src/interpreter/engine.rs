// Execution engine for the script sandbox

use crate::interpreter::constants::{
    DEFAULT_MAX_ALLOCATION, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_STATEMENTS, MAX_EVAL_NESTING,
};
use crate::interpreter::errors::RuntimeError;
use crate::memory::stack::{DeclareError, Stack, StackFrame};
use crate::memory::value::Value;
use crate::parser::ast::*;
use rustc_hash::FxHashMap;

/// How the most recent statement ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ControlFlow {
    Normal,
    Break,
    Continue,
    Return,
}

/// Receives the visible variables whenever a `Checkpoint` statement runs.
///
/// The frame is only borrowed for the duration of the call; container values
/// are shared handles, so a hook that keeps state must copy it out.
pub trait CheckpointHook {
    fn on_checkpoint(&mut self, location: SourceLocation, frame: &StackFrame) -> Result<(), RuntimeError>;
}

/// Ignores checkpoints
impl CheckpointHook for () {
    fn on_checkpoint(&mut self, _location: SourceLocation, _frame: &StackFrame) -> Result<(), RuntimeError> {
        Ok(())
    }
}

/// Work budgets for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_statements: usize,
    pub max_call_depth: usize,
    /// Cumulative array elements, map entries and string bytes
    pub max_allocation: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_statements: DEFAULT_MAX_STATEMENTS,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_allocation: DEFAULT_MAX_ALLOCATION,
        }
    }
}

/// Tree-walking interpreter over a parsed [`Program`]
pub struct Interpreter<'p, H> {
    /// Script functions by name
    functions: FxHashMap<&'p str, &'p FunctionDef>,

    /// Call stack
    pub(crate) stack: Stack,

    /// Set by `break`, `continue` and `return`; consumed by the enclosing construct
    pub(crate) control_flow: ControlFlow,

    /// Value of the most recent `return`
    pub(crate) return_value: Option<Value>,

    pub(crate) hook: H,

    limits: Limits,
    statements_executed: usize,
    allocated: usize,

    /// Statement and expression evaluations currently on the Rust stack
    nesting: usize,
}

impl<'p, H: CheckpointHook> Interpreter<'p, H> {
    pub fn new(program: &'p Program, hook: H, limits: Limits) -> Self {
        let functions = program
            .functions
            .iter()
            .map(|f| (f.name.as_str(), f))
            .collect();

        Interpreter {
            functions,
            stack: Stack::new(),
            control_flow: ControlFlow::Normal,
            return_value: None,
            hook,
            limits,
            statements_executed: 0,
            allocated: 0,
            nesting: 0,
        }
    }

    /// Call a top-level script function with already-evaluated arguments
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let location = self
            .functions
            .get(name)
            .map(|f| f.location)
            .unwrap_or_default();
        self.nesting = 0;
        self.call_function(name, args, location)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn statements_executed(&self) -> usize {
        self.statements_executed
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    pub fn into_hook(self) -> H {
        self.hook
    }

    pub(crate) fn call_function(
        &mut self,
        name: &str,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let func: &'p FunctionDef = self.functions.get(name).copied().ok_or_else(|| {
            RuntimeError::UndefinedFunction {
                name: name.to_string(),
                location,
            }
        })?;

        if self.stack.depth() >= self.limits.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.limits.max_call_depth,
                location,
            });
        }

        self.stack.push_frame(name.to_string());

        // Missing arguments are undefined, extra ones are dropped
        let mut args = args.into_iter();
        for param in &func.params {
            let value = args.next().unwrap_or_default();
            self.declare(param, DeclKind::Let, value, func.location)?;
        }

        let saved_return_value = self.return_value.take();
        for stmt in &func.body {
            self.execute_statement(stmt)?;
            if self.control_flow == ControlFlow::Return {
                break;
            }
            if self.control_flow != ControlFlow::Normal {
                return Err(RuntimeError::unsupported(
                    "'break' or 'continue' outside of a loop",
                    *stmt.location(),
                ));
            }
        }
        self.control_flow = ControlFlow::Normal;

        let result = std::mem::replace(&mut self.return_value, saved_return_value).unwrap_or_default();
        self.stack.pop_frame();
        Ok(result)
    }

    /// Count one unit of work against the statement budget
    pub(crate) fn tick(&mut self) -> Result<(), RuntimeError> {
        self.statements_executed += 1;
        if self.statements_executed > self.limits.max_statements {
            return Err(RuntimeError::StatementLimitExceeded {
                limit: self.limits.max_statements,
            });
        }
        Ok(())
    }

    /// Count `units` of new storage against the allocation budget
    pub(crate) fn charge(&mut self, units: usize, location: SourceLocation) -> Result<(), RuntimeError> {
        self.allocated = self.allocated.saturating_add(units);
        if self.allocated > self.limits.max_allocation {
            return Err(RuntimeError::AllocationLimitExceeded {
                limit: self.limits.max_allocation,
                location,
            });
        }
        Ok(())
    }

    /// String form of `value`, charged against the allocation budget and
    /// never built past what the budget has left
    pub(crate) fn stringify(&mut self, value: &Value, location: SourceLocation) -> Result<String, RuntimeError> {
        let remaining = self.limits.max_allocation.saturating_sub(self.allocated);
        let text = value
            .to_string_within(remaining)
            .ok_or(RuntimeError::AllocationLimitExceeded {
                limit: self.limits.max_allocation,
                location,
            })?;
        self.charge(text.len(), location)?;
        Ok(text)
    }

    /// Enter one level of statement or expression evaluation. A failed run
    /// is abandoned, so only successful evaluations need [`Self::ascend`].
    pub(crate) fn descend(&mut self, location: SourceLocation) -> Result<(), RuntimeError> {
        if self.nesting >= MAX_EVAL_NESTING {
            return Err(RuntimeError::NestingTooDeep {
                limit: MAX_EVAL_NESTING,
                location,
            });
        }
        self.nesting += 1;
        Ok(())
    }

    pub(crate) fn ascend(&mut self) {
        self.nesting = self.nesting.saturating_sub(1);
    }

    pub(crate) fn enter_scope(&mut self) {
        if let Some(frame) = self.stack.current_frame_mut() {
            frame.push_scope();
        }
    }

    pub(crate) fn exit_scope(&mut self) {
        if let Some(frame) = self.stack.current_frame_mut() {
            frame.pop_scope();
        }
    }

    pub(crate) fn frame(&self, location: SourceLocation) -> Result<&StackFrame, RuntimeError> {
        self.stack
            .current_frame()
            .ok_or(RuntimeError::NoStackFrame { location })
    }

    pub(crate) fn frame_mut(&mut self, location: SourceLocation) -> Result<&mut StackFrame, RuntimeError> {
        self.stack
            .current_frame_mut()
            .ok_or(RuntimeError::NoStackFrame { location })
    }

    pub(crate) fn declare(
        &mut self,
        name: &str,
        kind: DeclKind,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        self.frame_mut(location)?
            .declare_var(name, kind, value)
            .map_err(|e| match e {
                DeclareError::AlreadyDeclared => RuntimeError::Redeclaration {
                    name: name.to_string(),
                    location,
                },
            })
    }

    pub(crate) fn read_variable(&self, name: &str, location: SourceLocation) -> Result<Value, RuntimeError> {
        if let Some(binding) = self.frame(location)?.get_var(name) {
            return Ok(binding.value.clone());
        }
        Self::global_constant(name).ok_or_else(|| RuntimeError::UndefinedVariable {
            name: name.to_string(),
            location,
        })
    }

    pub(crate) fn write_variable(
        &mut self,
        name: &str,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let binding = self
            .frame_mut(location)?
            .get_var_mut(name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
                location,
            })?;
        if binding.is_const() {
            return Err(RuntimeError::ConstModification {
                var: name.to_string(),
                location,
            });
        }
        binding.value = value;
        Ok(())
    }

    /// Whether `name` is bound in the current frame (and so shadows a built-in)
    pub(crate) fn is_bound(&self, name: &str) -> bool {
        self.stack
            .current_frame()
            .is_some_and(|frame| frame.get_var(name).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn run(source: &str, entry: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let program = parse(source).unwrap();
        let mut interp = Interpreter::new(&program, (), Limits::default());
        interp.call(entry, args)
    }

    #[test]
    fn test_call_returns_value() {
        let result = run("function add(a, b) { return a + b; }", "add", vec![Value::Number(2.0), Value::Number(3.0)]);
        assert_eq!(result.unwrap().as_int(), Some(5));
    }

    #[test]
    fn test_missing_arguments_are_undefined() {
        let result = run("function f(a, b) { return b === undefined; }", "f", vec![Value::Number(1.0)]);
        assert!(result.unwrap().is_truthy());
    }

    #[test]
    fn test_recursion() {
        let source = "function fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }";
        let result = run(source, "fib", vec![Value::Number(10.0)]);
        assert_eq!(result.unwrap().as_int(), Some(55));
    }

    #[test]
    fn test_call_depth_budget() {
        let result = run("function f(n) { return f(n + 1); }", "f", vec![Value::Number(0.0)]);
        assert!(matches!(result, Err(RuntimeError::CallDepthExceeded { limit: 64, .. })));
    }

    #[test]
    fn test_deep_expressions_across_calls_are_stopped() {
        let source = format!("function f(n) {{ return {}f(n + 1); }}", "!".repeat(150));
        let result = run(&source, "f", vec![Value::Number(0.0)]);
        let err = result.unwrap_err();
        assert!(matches!(err, RuntimeError::NestingTooDeep { limit: MAX_EVAL_NESTING, .. }), "{:?}", err);
        assert!(err.is_limit());
    }

    #[test]
    fn test_statement_budget_stops_infinite_loop() {
        let program = parse("function spin() { while (true) {} }").unwrap();
        let limits = Limits {
            max_statements: 500,
            ..Limits::default()
        };
        let mut interp = Interpreter::new(&program, (), limits);
        let err = interp.call("spin", vec![]).unwrap_err();
        assert_eq!(err, RuntimeError::StatementLimitExceeded { limit: 500 });
        assert!(err.is_limit());
    }

    #[test]
    fn test_undefined_function() {
        let result = run("function f() { return g(); }", "f", vec![]);
        assert!(matches!(result, Err(RuntimeError::UndefinedFunction { ref name, .. }) if name == "g"));
    }

    #[test]
    fn test_const_assignment_fails() {
        let result = run("function f() { const x = 1; x = 2; }", "f", vec![]);
        assert!(matches!(result, Err(RuntimeError::ConstModification { ref var, .. }) if var == "x"));
    }
}

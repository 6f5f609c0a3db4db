//! Call stack implementation
//!
//! This module provides the call stack for function execution:
//! - [`Stack`]: The call stack containing frames
//! - [`StackFrame`]: A single function's activation record
//! - [`Binding`]: A variable slot with its declaration kind
//!
//! Each frame keeps a stack of block scopes. Entering a block records the
//! variables it declares and the outer bindings it shadows, so leaving it
//! restores the enclosing view exactly. `insertion_order` keeps declaration
//! order for the visible-variable bag reported at checkpoints.

use super::value::Value;
use crate::parser::ast::DeclKind;
use rustc_hash::FxHashMap;

/// A variable slot
#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    pub kind: DeclKind,
}

impl Binding {
    pub fn is_const(&self) -> bool {
        self.kind == DeclKind::Const
    }
}

#[derive(Debug, Clone, Default)]
struct ScopeData {
    shadowed: Vec<(String, Binding)>,
    declared: Vec<String>,
}

/// Why a declaration was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclareError {
    /// `let`/`const` of a name already declared in the same block
    AlreadyDeclared,
}

/// Stack frame for a function call
#[derive(Debug, Clone)]
pub struct StackFrame {
    pub function_name: String,
    locals: FxHashMap<String, Binding>,
    insertion_order: Vec<String>,
    scope_stack: Vec<ScopeData>,
}

impl StackFrame {
    pub fn new(function_name: String) -> Self {
        StackFrame {
            function_name,
            locals: FxHashMap::default(),
            insertion_order: Vec::new(),
            scope_stack: Vec::new(),
        }
    }

    pub fn push_scope(&mut self) {
        self.scope_stack.push(ScopeData::default());
    }

    pub fn pop_scope(&mut self) {
        if let Some(scope) = self.scope_stack.pop() {
            for name in scope.declared {
                self.locals.remove(&name);
                if let Some(pos) = self.insertion_order.iter().rposition(|x| x == &name) {
                    self.insertion_order.remove(pos);
                }
            }

            for (name, binding) in scope.shadowed {
                self.locals.insert(name, binding);
            }
        }
    }

    /// Declare a variable in the innermost scope
    pub fn declare_var(&mut self, name: &str, kind: DeclKind, value: Value) -> Result<(), DeclareError> {
        let binding = Binding { value, kind };

        match self.scope_stack.last_mut() {
            Some(scope) => {
                if scope.declared.iter().any(|n| n == name) {
                    if kind == DeclKind::Var {
                        self.locals.insert(name.to_string(), binding);
                        return Ok(());
                    }
                    return Err(DeclareError::AlreadyDeclared);
                }
                if let Some(old) = self.locals.insert(name.to_string(), binding) {
                    scope.shadowed.push((name.to_string(), old));
                } else {
                    scope.declared.push(name.to_string());
                    self.insertion_order.push(name.to_string());
                }
            }
            None => {
                // Function scope: parameters and top-level declarations
                if self.locals.contains_key(name) && kind != DeclKind::Var {
                    return Err(DeclareError::AlreadyDeclared);
                }
                if !self.locals.contains_key(name) {
                    self.insertion_order.push(name.to_string());
                }
                self.locals.insert(name.to_string(), binding);
            }
        }
        Ok(())
    }

    pub fn get_var(&self, name: &str) -> Option<&Binding> {
        self.locals.get(name)
    }

    pub fn get_var_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.locals.get_mut(name)
    }

    /// Every visible binding in declaration order
    pub fn visible(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.insertion_order
            .iter()
            .filter_map(|name| self.locals.get(name).map(|b| (name.as_str(), &b.value)))
    }
}

/// The call stack
#[derive(Debug, Clone, Default)]
pub struct Stack {
    frames: Vec<StackFrame>,
}

impl Stack {
    pub fn new() -> Self {
        Stack { frames: Vec::new() }
    }

    pub fn push_frame(&mut self, function_name: String) {
        self.frames.push(StackFrame::new(function_name));
    }

    pub fn pop_frame(&mut self) -> Option<StackFrame> {
        self.frames.pop()
    }

    pub fn current_frame(&self) -> Option<&StackFrame> {
        self.frames.last()
    }

    pub fn current_frame_mut(&mut self) -> Option<&mut StackFrame> {
        self.frames.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(frame: &StackFrame) -> Vec<String> {
        frame.visible().map(|(n, _)| n.to_string()).collect()
    }

    #[test]
    fn test_shadowing_is_restored() {
        let mut frame = StackFrame::new("f".into());
        frame.declare_var("x", DeclKind::Let, Value::Number(1.0)).unwrap();
        frame.push_scope();
        frame.declare_var("x", DeclKind::Let, Value::Number(2.0)).unwrap();
        frame.declare_var("y", DeclKind::Let, Value::Null).unwrap();
        assert_eq!(frame.get_var("x").unwrap().value.as_int(), Some(2));
        assert_eq!(names(&frame), vec!["x", "y"]);
        frame.pop_scope();
        assert_eq!(frame.get_var("x").unwrap().value.as_int(), Some(1));
        assert!(frame.get_var("y").is_none());
        assert_eq!(names(&frame), vec!["x"]);
    }

    #[test]
    fn test_redeclaration_in_same_block() {
        let mut frame = StackFrame::new("f".into());
        frame.push_scope();
        frame.declare_var("a", DeclKind::Let, Value::Null).unwrap();
        assert_eq!(
            frame.declare_var("a", DeclKind::Const, Value::Null),
            Err(DeclareError::AlreadyDeclared)
        );
    }
}

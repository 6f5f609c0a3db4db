//! Expression evaluation implementation
//!
//! This module handles evaluation of all script expression types, including:
//!
//! - Literals (numbers, strings, booleans, `null`, `undefined`, arrays)
//! - Variables and identifiers
//! - Binary operators (arithmetic, comparison, short-circuit logical)
//! - Unary operators (negation, not, pre/post increment/decrement)
//! - Assignment, compound assignment and array destructuring
//! - Indexing and the ternary operator
//!
//! Calls, member access and `new` are dispatched to [`super::builtins`].
//!
//! Arithmetic follows script number semantics: division by zero yields
//! `Infinity` or `NaN` instead of an error.

use crate::interpreter::constants::MAX_ARRAY_LENGTH;
use crate::interpreter::engine::{CheckpointHook, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{ArrayRef, Value};
use crate::parser::ast::*;
use std::cmp::Ordering;

/// A resolved assignment target
pub(crate) enum Place {
    Variable(String),
    Element(ArrayRef, usize),
}

impl<H: CheckpointHook> Interpreter<'_, H> {
    /// Evaluate an expression and return its value
    pub(crate) fn evaluate_expr(&mut self, expr: &AstNode) -> Result<Value, RuntimeError> {
        self.descend(*expr.location())?;
        let value = self.evaluate_node(expr)?;
        self.ascend();
        Ok(value)
    }

    fn evaluate_node(&mut self, expr: &AstNode) -> Result<Value, RuntimeError> {
        match expr {
            AstNode::NumberLiteral(n, _) => Ok(Value::Number(*n)),
            AstNode::StringLiteral(s, _) => Ok(Value::Str(s.clone())),
            AstNode::BoolLiteral(b, _) => Ok(Value::Bool(*b)),
            AstNode::Null { .. } => Ok(Value::Null),
            AstNode::Undefined { .. } => Ok(Value::Undefined),

            AstNode::Variable(name, location) => self.read_variable(name, *location),

            AstNode::ArrayLiteral { elements, location } => {
                self.charge(elements.len(), *location)?;
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.evaluate_expr(element)?);
                }
                Ok(Value::array(items))
            }

            AstNode::Assignment { lhs, rhs, location } => {
                if let AstNode::ArrayLiteral { elements, .. } = lhs.as_ref() {
                    return self.execute_destructuring(elements, rhs, *location);
                }
                let place = self.resolve_place(lhs)?;
                let value = self.evaluate_expr(rhs)?;
                self.write_place(&place, value.clone(), *location)?;
                Ok(value)
            }

            AstNode::CompoundAssignment {
                lhs,
                op,
                rhs,
                location,
            } => {
                let place = self.resolve_place(lhs)?;
                let current = self.read_place(&place, *location)?;
                let rhs_val = self.evaluate_expr(rhs)?;
                let value = self.apply_binary(*op, &current, &rhs_val, *location)?;
                self.write_place(&place, value.clone(), *location)?;
                Ok(value)
            }

            AstNode::BinaryOp {
                op: BinOp::And,
                left,
                right,
                ..
            } => {
                let left = self.evaluate_expr(left)?;
                if left.is_truthy() {
                    self.evaluate_expr(right)
                } else {
                    Ok(left)
                }
            }

            AstNode::BinaryOp {
                op: BinOp::Or,
                left,
                right,
                ..
            } => {
                let left = self.evaluate_expr(left)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.evaluate_expr(right)
                }
            }

            AstNode::BinaryOp {
                op,
                left,
                right,
                location,
            } => {
                let left = self.evaluate_expr(left)?;
                let right = self.evaluate_expr(right)?;
                self.apply_binary(*op, &left, &right, *location)
            }

            AstNode::UnaryOp {
                op,
                operand,
                location,
            } => self.evaluate_unary(*op, operand, *location),

            AstNode::TernaryOp {
                condition,
                true_expr,
                false_expr,
                ..
            } => {
                if self.evaluate_expr(condition)?.is_truthy() {
                    self.evaluate_expr(true_expr)
                } else {
                    self.evaluate_expr(false_expr)
                }
            }

            AstNode::Index {
                object,
                index,
                location,
            } => {
                let object = self.evaluate_expr(object)?;
                let index = self.evaluate_expr(index)?;
                Self::read_index(&object, &index, *location)
            }

            AstNode::MemberAccess {
                object,
                member,
                location,
            } => self.evaluate_member(object, member, *location),

            AstNode::Call {
                callee,
                args,
                location,
            } => self.evaluate_call(callee, args, *location),

            AstNode::New {
                class,
                args,
                location,
            } => self.construct(class, args, *location),

            other => Err(RuntimeError::unsupported(
                "statement used where an expression was expected",
                *other.location(),
            )),
        }
    }

    /// Binary operator with string concatenation charged to the allocation budget
    fn apply_binary(
        &mut self,
        op: BinOp,
        left: &Value,
        right: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let concat = |v: &Value| matches!(v, Value::Str(_) | Value::Array(_) | Value::Map(_) | Value::Set(_));
        if op == BinOp::Add && (concat(left) || concat(right)) {
            let mut text = self.stringify(left, location)?;
            text.push_str(&self.stringify(right, location)?);
            return Ok(Value::Str(text));
        }
        Ok(Self::binary_op(op, left, right))
    }

    /// Apply a non-short-circuit binary operator. String concatenation is
    /// handled by [`Self::apply_binary`].
    fn binary_op(op: BinOp, left: &Value, right: &Value) -> Value {
        match op {
            BinOp::Add => Value::Number(left.to_number() + right.to_number()),
            BinOp::Sub => Value::Number(left.to_number() - right.to_number()),
            BinOp::Mul => Value::Number(left.to_number() * right.to_number()),
            BinOp::Div => Value::Number(left.to_number() / right.to_number()),
            BinOp::Mod => Value::Number(left.to_number() % right.to_number()),
            BinOp::StrictEq => Value::Bool(left.strict_equals(right)),
            BinOp::StrictNe => Value::Bool(!left.strict_equals(right)),
            BinOp::Eq => Value::Bool(left.loose_equals(right)),
            BinOp::Ne => Value::Bool(!left.loose_equals(right)),
            BinOp::Lt => Value::Bool(Self::compare(left, right) == Some(Ordering::Less)),
            BinOp::Le => Value::Bool(matches!(
                Self::compare(left, right),
                Some(Ordering::Less | Ordering::Equal)
            )),
            BinOp::Gt => Value::Bool(Self::compare(left, right) == Some(Ordering::Greater)),
            BinOp::Ge => Value::Bool(matches!(
                Self::compare(left, right),
                Some(Ordering::Greater | Ordering::Equal)
            )),
            BinOp::And => {
                if left.is_truthy() {
                    right.clone()
                } else {
                    left.clone()
                }
            }
            BinOp::Or => {
                if left.is_truthy() {
                    left.clone()
                } else {
                    right.clone()
                }
            }
        }
    }

    /// Strings compare lexicographically, everything else numerically.
    /// `None` when either side is `NaN`.
    #[inline]
    fn compare(left: &Value, right: &Value) -> Option<Ordering> {
        match (left, right) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => left.to_number().partial_cmp(&right.to_number()),
        }
    }

    fn evaluate_unary(&mut self, op: UnOp, operand: &AstNode, location: SourceLocation) -> Result<Value, RuntimeError> {
        match op {
            UnOp::Neg => Ok(Value::Number(-self.evaluate_expr(operand)?.to_number())),
            UnOp::Plus => Ok(Value::Number(self.evaluate_expr(operand)?.to_number())),
            UnOp::Not => Ok(Value::Bool(!self.evaluate_expr(operand)?.is_truthy())),
            UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec => {
                let place = self.resolve_place(operand)?;
                let old = self.read_place(&place, location)?.to_number();
                let new = match op {
                    UnOp::PreInc | UnOp::PostInc => old + 1.0,
                    _ => old - 1.0,
                };
                self.write_place(&place, Value::Number(new), location)?;
                Ok(Value::Number(match op {
                    UnOp::PreInc | UnOp::PreDec => new,
                    _ => old,
                }))
            }
        }
    }

    /// `[a, b] = expr`: the right side is copied before any target is written,
    /// so `[x[i], x[j]] = [x[j], x[i]]` swaps.
    fn execute_destructuring(
        &mut self,
        targets: &[AstNode],
        rhs: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let value = self.evaluate_expr(rhs)?;
        let items: Vec<Value> = match &value {
            Value::Array(items) => items.borrow().clone(),
            Value::Str(s) => s.chars().map(|c| Value::Str(c.to_string())).collect(),
            other => {
                return Err(RuntimeError::type_error(
                    format!("{} is not iterable", other.type_name()),
                    location,
                ))
            }
        };

        for (i, target) in targets.iter().enumerate() {
            let place = self.resolve_place(target)?;
            let item = items.get(i).cloned().unwrap_or_default();
            self.write_place(&place, item, location)?;
        }
        Ok(value)
    }

    /// Evaluate the object and index of an assignment target exactly once
    pub(crate) fn resolve_place(&mut self, target: &AstNode) -> Result<Place, RuntimeError> {
        match target {
            AstNode::Variable(name, _) => Ok(Place::Variable(name.clone())),
            AstNode::Index {
                object,
                index,
                location,
            } => {
                let object = self.evaluate_expr(object)?;
                let index = self.evaluate_expr(index)?;
                match object {
                    Value::Array(items) => {
                        let index = index.as_index().ok_or_else(|| RuntimeError::RangeError {
                            message: format!("Invalid array index {}", index),
                            location: *location,
                        })?;
                        Ok(Place::Element(items, index))
                    }
                    Value::Map(_) => Err(RuntimeError::unsupported(
                        "use map.set(key, value) instead of map[key] = value",
                        *location,
                    )),
                    Value::Str(_) => Err(RuntimeError::type_error(
                        "Cannot assign to a character of a string",
                        *location,
                    )),
                    other => Err(RuntimeError::type_error(
                        format!("Cannot set properties of {}", other.type_name()),
                        *location,
                    )),
                }
            }
            AstNode::MemberAccess {
                member, location, ..
            } => Err(RuntimeError::unsupported(
                format!("assignment to property '{}'", member),
                *location,
            )),
            other => Err(RuntimeError::unsupported(
                "invalid assignment target",
                *other.location(),
            )),
        }
    }

    pub(crate) fn read_place(&self, place: &Place, location: SourceLocation) -> Result<Value, RuntimeError> {
        match place {
            Place::Variable(name) => self.read_variable(name, location),
            Place::Element(items, index) => Ok(items.borrow().get(*index).cloned().unwrap_or_default()),
        }
    }

    /// Writing past the end of an array grows it, filling the gap with `undefined`
    pub(crate) fn write_place(&mut self, place: &Place, value: Value, location: SourceLocation) -> Result<(), RuntimeError> {
        match place {
            Place::Variable(name) => self.write_variable(name, value, location),
            Place::Element(items, index) => {
                let len = items.borrow().len();
                if *index >= len {
                    if *index >= MAX_ARRAY_LENGTH {
                        return Err(RuntimeError::RangeError {
                            message: format!("Array length would exceed {}", MAX_ARRAY_LENGTH),
                            location,
                        });
                    }
                    self.charge(*index + 1 - len, location)?;
                    items.borrow_mut().resize(*index + 1, Value::Undefined);
                }
                items.borrow_mut()[*index] = value;
                Ok(())
            }
        }
    }

    /// `object[index]`; out-of-range reads give `undefined`
    fn read_index(object: &Value, index: &Value, location: SourceLocation) -> Result<Value, RuntimeError> {
        match object {
            Value::Array(items) => Ok(index
                .as_index()
                .and_then(|i| items.borrow().get(i).cloned())
                .unwrap_or_default()),
            Value::Str(s) => Ok(index
                .as_index()
                .and_then(|i| s.chars().nth(i))
                .map_or(Value::Undefined, |c| Value::Str(c.to_string()))),
            Value::Undefined | Value::Null => Err(RuntimeError::type_error(
                format!("Cannot read properties of {} (reading '{}')", object, index),
                location,
            )),
            _ => Ok(Value::Undefined),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::{Interpreter, Limits};
    use crate::interpreter::errors::RuntimeError;
    use crate::memory::value::Value;
    use crate::parser::parse;

    fn eval(body: &str) -> Result<Value, RuntimeError> {
        let source = format!("function f() {{ {} }}", body);
        let program = parse(&source).unwrap();
        let mut interp = Interpreter::new(&program, (), Limits::default());
        interp.call("f", vec![])
    }

    #[test]
    fn test_arithmetic_and_precedence() {
        assert_eq!(eval("return 2 + 3 * 4 - 10 / 5;").unwrap().as_int(), Some(12));
        assert_eq!(eval("return -7 % 3;").unwrap().as_int(), Some(-1));
        assert_eq!(eval("return 1 / 0;").unwrap().to_string(), "Infinity");
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(eval("return 'a' + 1 + 2;").unwrap().to_string(), "a12");
        assert_eq!(eval("return 1 + 2 + 'a';").unwrap().to_string(), "3a");
    }

    #[test]
    fn test_comparisons() {
        assert!(eval("return 'apple' < 'banana';").unwrap().is_truthy());
        assert!(eval("return 2 == '2';").unwrap().is_truthy());
        assert!(!eval("return 2 === '2';").unwrap().is_truthy());
        assert!(!eval("return undefined < 1;").unwrap().is_truthy());
    }

    #[test]
    fn test_short_circuit_returns_operand() {
        assert_eq!(eval("return 0 || 'fallback';").unwrap().to_string(), "fallback");
        assert_eq!(eval("return null && missing();").unwrap().to_string(), "null");
    }

    #[test]
    fn test_increment_forms() {
        assert_eq!(eval("let i = 5; const a = i++; return a * 10 + i;").unwrap().as_int(), Some(56));
        assert_eq!(eval("let i = 5; const a = ++i; return a * 10 + i;").unwrap().as_int(), Some(66));
        assert_eq!(eval("const xs = [1, 2]; xs[1]--; return xs[1];").unwrap().as_int(), Some(1));
    }

    #[test]
    fn test_compound_assignment_evaluates_target_once() {
        let result = eval("const xs = [10, 20, 30]; let i = 0; xs[i++] += 5; return xs[0] * 10 + i;");
        assert_eq!(result.unwrap().as_int(), Some(151));
    }

    #[test]
    fn test_destructuring_swap() {
        let result = eval("const a = [1, 2, 3]; [a[0], a[2]] = [a[2], a[0]]; return a;");
        assert_eq!(result.unwrap().to_string(), "3,2,1");

        let result = eval("let x = 1; let y = 2; [x, y] = [y, x]; return x * 10 + y;");
        assert_eq!(result.unwrap().as_int(), Some(21));
    }

    #[test]
    fn test_arrays_alias() {
        let result = eval("const a = [1]; const b = a; b[0] = 9; return a[0];");
        assert_eq!(result.unwrap().as_int(), Some(9));
    }

    #[test]
    fn test_out_of_range_read_and_growing_write() {
        assert!(matches!(eval("const a = [1]; return a[5];").unwrap(), Value::Undefined));
        assert_eq!(eval("const a = []; a[2] = 1; return a.length;").unwrap().as_int(), Some(3));
    }

    #[test]
    fn test_string_indexing() {
        assert_eq!(eval("const s = 'hello'; return s[1];").unwrap().to_string(), "e");
        assert!(eval("const s = 'hello'; s[0] = 'j';").is_err());
    }

    #[test]
    fn test_reading_from_undefined_fails() {
        let err = eval("let a; return a[0];").unwrap_err();
        assert!(matches!(err, RuntimeError::TypeError { .. }));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_undefined_variable() {
        let err = eval("return nope + 1;").unwrap_err();
        assert_eq!(err.to_string(), "'nope' is not defined at line 1");
    }
}

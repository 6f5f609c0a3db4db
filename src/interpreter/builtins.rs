//! Built-in function implementations
//!
//! This module provides everything a script can reach besides its own
//! functions. Nothing else from the host is visible.
//!
//! # Supported Built-ins
//!
//! - Globals: `Infinity`, `NaN`, `Number.MAX_SAFE_INTEGER`, `Number.MIN_SAFE_INTEGER`
//! - `Math.floor/ceil/round/trunc/abs/max/min/sqrt`
//! - Constructors: `new Map()`, `new Set(iterable?)`, `new Array(length)`
//! - Properties: `array.length`, `string.length`, `map.size`, `set.size`
//! - Array methods: `push pop shift unshift includes indexOf join slice reverse fill`
//! - Map methods: `has get set delete clear`
//! - Set methods: `has add delete clear`
//! - String methods: `toLowerCase toUpperCase charAt charCodeAt includes indexOf slice substring trim`
//!
//! A local binding named `Math` or `Number` shadows the built-in namespace.

use crate::interpreter::constants::MAX_ARRAY_LENGTH;
use crate::interpreter::engine::{CheckpointHook, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{MapKey, Value};
use crate::parser::ast::{AstNode, SourceLocation};
use indexmap::IndexSet;

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl<H: CheckpointHook> Interpreter<'_, H> {
    pub(crate) fn global_constant(name: &str) -> Option<Value> {
        match name {
            "Infinity" => Some(Value::Number(f64::INFINITY)),
            "NaN" => Some(Value::Number(f64::NAN)),
            _ => None,
        }
    }

    /// `object.member` outside of a call
    pub(crate) fn evaluate_member(
        &mut self,
        object: &AstNode,
        member: &str,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if let AstNode::Variable(name, _) = object {
            if name == "Number" && !self.is_bound(name) {
                return match member {
                    "MAX_SAFE_INTEGER" => Ok(Value::Number(MAX_SAFE_INTEGER)),
                    "MIN_SAFE_INTEGER" => Ok(Value::Number(-MAX_SAFE_INTEGER)),
                    "POSITIVE_INFINITY" => Ok(Value::Number(f64::INFINITY)),
                    "NEGATIVE_INFINITY" => Ok(Value::Number(f64::NEG_INFINITY)),
                    _ => Ok(Value::Undefined),
                };
            }
        }

        let object = self.evaluate_expr(object)?;
        match (&object, member) {
            (Value::Array(items), "length") => Ok(Value::Number(items.borrow().len() as f64)),
            (Value::Str(s), "length") => Ok(Value::Number(s.chars().count() as f64)),
            (Value::Map(map), "size") => Ok(Value::Number(map.borrow().len() as f64)),
            (Value::Set(set), "size") => Ok(Value::Number(set.borrow().len() as f64)),
            (Value::Undefined | Value::Null, _) => Err(RuntimeError::type_error(
                format!("Cannot read properties of {} (reading '{}')", object, member),
                location,
            )),
            _ => Ok(Value::Undefined),
        }
    }

    /// Script function call, `Math.*` call or method call
    pub(crate) fn evaluate_call(
        &mut self,
        callee: &AstNode,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match callee {
            AstNode::Variable(name, _) => {
                let args = self.evaluate_args(args)?;
                self.call_function(name, args, location)
            }
            AstNode::MemberAccess { object, member, .. } => {
                if let AstNode::Variable(name, _) = object.as_ref() {
                    if name == "Math" && !self.is_bound(name) {
                        let args = self.evaluate_args(args)?;
                        return Self::call_math(member, &args, location);
                    }
                }
                let receiver = self.evaluate_expr(object)?;
                let args = self.evaluate_args(args)?;
                let before = receiver.footprint();
                let result = self.call_method(&receiver, member, &args, location)?;
                let grown = receiver.footprint().saturating_sub(before);
                let fresh = if result.strict_equals(&receiver) {
                    0
                } else {
                    result.footprint()
                };
                self.charge(grown + fresh, location)?;
                Ok(result)
            }
            other => Err(RuntimeError::unsupported(
                "only named functions and methods can be called",
                *other.location(),
            )),
        }
    }

    fn evaluate_args(&mut self, args: &[AstNode]) -> Result<Vec<Value>, RuntimeError> {
        args.iter().map(|arg| self.evaluate_expr(arg)).collect()
    }

    /// `new Class(args)`
    pub(crate) fn construct(
        &mut self,
        class: &str,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let args = self.evaluate_args(args)?;
        match class {
            "Map" => {
                if !args.is_empty() {
                    return Err(RuntimeError::unsupported("new Map() with initial entries", location));
                }
                Ok(Value::new_map())
            }
            "Set" => {
                let set = Value::new_set();
                if let (Value::Set(members), Some(source)) = (&set, args.first()) {
                    let mut members = members.borrow_mut();
                    match source {
                        Value::Array(items) => {
                            for item in items.borrow().iter() {
                                members.insert(Self::map_key(item, location)?);
                            }
                        }
                        Value::Str(s) => {
                            for c in s.chars() {
                                members.insert(MapKey::Str(c.to_string()));
                            }
                        }
                        Value::Undefined | Value::Null => {}
                        other => {
                            return Err(RuntimeError::type_error(
                                format!("{} is not iterable", other.type_name()),
                                location,
                            ))
                        }
                    }
                }
                self.charge(set.footprint(), location)?;
                Ok(set)
            }
            "Array" => {
                let length = match args.first() {
                    None => 0,
                    Some(n) => n.as_index().filter(|&n| n <= MAX_ARRAY_LENGTH).ok_or_else(|| {
                        RuntimeError::RangeError {
                            message: format!("Invalid array length {}", n),
                            location,
                        }
                    })?,
                };
                self.charge(length, location)?;
                Ok(Value::array(vec![Value::Undefined; length]))
            }
            other => Err(RuntimeError::UndefinedFunction {
                name: other.to_string(),
                location,
            }),
        }
    }

    fn map_key(value: &Value, location: SourceLocation) -> Result<MapKey, RuntimeError> {
        MapKey::from_value(value).ok_or_else(|| {
            RuntimeError::unsupported(format!("{} as a Map or Set key", value.type_name()), location)
        })
    }

    fn call_math(name: &str, args: &[Value], location: SourceLocation) -> Result<Value, RuntimeError> {
        let arg = |i: usize| args.get(i).map_or(f64::NAN, Value::to_number);
        let result = match name {
            "floor" => arg(0).floor(),
            "ceil" => arg(0).ceil(),
            "round" => (arg(0) + 0.5).floor(),
            "trunc" => arg(0).trunc(),
            "abs" => arg(0).abs(),
            "sqrt" => arg(0).sqrt(),
            "max" => args.iter().map(Value::to_number).fold(f64::NEG_INFINITY, |acc, n| {
                if acc.is_nan() || n.is_nan() {
                    f64::NAN
                } else {
                    acc.max(n)
                }
            }),
            "min" => args.iter().map(Value::to_number).fold(f64::INFINITY, |acc, n| {
                if acc.is_nan() || n.is_nan() {
                    f64::NAN
                } else {
                    acc.min(n)
                }
            }),
            other => {
                return Err(RuntimeError::UndefinedFunction {
                    name: format!("Math.{}", other),
                    location,
                })
            }
        };
        Ok(Value::Number(result))
    }

    /// Growth of the receiver and any newly built result are charged by the caller
    fn call_method(
        &mut self,
        receiver: &Value,
        method: &str,
        args: &[Value],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let arg = |i: usize| args.get(i).cloned().unwrap_or_default();
        let not_a_function = || {
            RuntimeError::type_error(
                format!("{}.{} is not a function", receiver.type_name(), method),
                location,
            )
        };

        match receiver {
            Value::Array(items) => match method {
                "push" => {
                    let mut items = items.borrow_mut();
                    items.extend(args.iter().cloned());
                    Ok(Value::Number(items.len() as f64))
                }
                "pop" => Ok(items.borrow_mut().pop().unwrap_or_default()),
                "shift" => {
                    let mut items = items.borrow_mut();
                    Ok(if items.is_empty() {
                        Value::Undefined
                    } else {
                        items.remove(0)
                    })
                }
                "unshift" => {
                    let mut items = items.borrow_mut();
                    for (i, value) in args.iter().enumerate() {
                        items.insert(i, value.clone());
                    }
                    Ok(Value::Number(items.len() as f64))
                }
                "includes" => {
                    let needle = arg(0);
                    // SameValueZero: NaN finds NaN
                    let found = items.borrow().iter().any(|v| {
                        v.strict_equals(&needle)
                            || matches!((v, &needle), (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan())
                    });
                    Ok(Value::Bool(found))
                }
                "indexOf" => {
                    let needle = arg(0);
                    let position = items.borrow().iter().position(|v| v.strict_equals(&needle));
                    Ok(Value::Number(position.map_or(-1.0, |p| p as f64)))
                }
                "join" => {
                    let separator = match arg(0) {
                        Value::Undefined => ",".to_string(),
                        sep => sep.to_string(),
                    };
                    let pieces = items
                        .borrow()
                        .iter()
                        .map(|v| match v {
                            Value::Undefined | Value::Null => Ok(String::new()),
                            other => self.stringify(other, location),
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    self.charge(separator.len().saturating_mul(pieces.len()), location)?;
                    Ok(Value::Str(pieces.join(&separator)))
                }
                "slice" => {
                    let items = items.borrow();
                    let (start, end) = Self::slice_bounds(items.len(), &arg(0), &arg(1));
                    Ok(Value::array(items[start..end].to_vec()))
                }
                "reverse" => {
                    items.borrow_mut().reverse();
                    Ok(receiver.clone())
                }
                "fill" => {
                    let value = arg(0);
                    for slot in items.borrow_mut().iter_mut() {
                        *slot = value.clone();
                    }
                    Ok(receiver.clone())
                }
                _ => Err(not_a_function()),
            },

            Value::Map(map) => match method {
                "has" => Ok(Value::Bool(
                    MapKey::from_value(&arg(0)).is_some_and(|k| map.borrow().contains_key(&k)),
                )),
                "get" => Ok(MapKey::from_value(&arg(0))
                    .and_then(|k| map.borrow().get(&k).cloned())
                    .unwrap_or_default()),
                "set" => {
                    let key = Self::map_key(&arg(0), location)?;
                    map.borrow_mut().insert(key, arg(1));
                    Ok(receiver.clone())
                }
                "delete" => Ok(Value::Bool(
                    MapKey::from_value(&arg(0)).is_some_and(|k| map.borrow_mut().shift_remove(&k).is_some()),
                )),
                "clear" => {
                    map.borrow_mut().clear();
                    Ok(Value::Undefined)
                }
                _ => Err(not_a_function()),
            },

            Value::Set(set) => match method {
                "has" => Ok(Value::Bool(
                    MapKey::from_value(&arg(0)).is_some_and(|k| set.borrow().contains(&k)),
                )),
                "add" => {
                    let key = Self::map_key(&arg(0), location)?;
                    set.borrow_mut().insert(key);
                    Ok(receiver.clone())
                }
                "delete" => Ok(Value::Bool(
                    MapKey::from_value(&arg(0)).is_some_and(|k| set.borrow_mut().shift_remove(&k)),
                )),
                "clear" => {
                    *set.borrow_mut() = IndexSet::new();
                    Ok(Value::Undefined)
                }
                _ => Err(not_a_function()),
            },

            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                match method {
                    "toLowerCase" => Ok(Value::Str(s.to_lowercase())),
                    "toUpperCase" => Ok(Value::Str(s.to_uppercase())),
                    "trim" => Ok(Value::Str(s.trim().to_string())),
                    "charAt" => Ok(Value::Str(
                        arg(0)
                            .as_index()
                            .and_then(|i| chars.get(i))
                            .map(|c| c.to_string())
                            .unwrap_or_default(),
                    )),
                    "charCodeAt" => Ok(Value::Number(
                        arg(0)
                            .as_index()
                            .and_then(|i| chars.get(i))
                            .map_or(f64::NAN, |&c| u32::from(c) as f64),
                    )),
                    "includes" => Ok(Value::Bool(s.contains(arg(0).to_string().as_str()))),
                    "indexOf" => {
                        let needle = arg(0).to_string();
                        let position = s
                            .find(needle.as_str())
                            .map(|byte| s[..byte].chars().count() as f64);
                        Ok(Value::Number(position.unwrap_or(-1.0)))
                    }
                    "slice" => {
                        let (start, end) = Self::slice_bounds(chars.len(), &arg(0), &arg(1));
                        Ok(Value::Str(chars[start..end].iter().collect()))
                    }
                    "substring" => {
                        let clamp = |v: Value, default: usize| match v {
                            Value::Undefined => default,
                            v => {
                                let n = v.to_number();
                                if n.is_nan() || n < 0.0 {
                                    0
                                } else {
                                    (n as usize).min(chars.len())
                                }
                            }
                        };
                        let a = clamp(arg(0), 0);
                        let b = clamp(arg(1), chars.len());
                        let (start, end) = if a <= b { (a, b) } else { (b, a) };
                        Ok(Value::Str(chars[start..end].iter().collect()))
                    }
                    _ => Err(not_a_function()),
                }
            }

            Value::Undefined | Value::Null => Err(RuntimeError::type_error(
                format!("Cannot read properties of {} (reading '{}')", receiver, method),
                location,
            )),

            _ => Err(not_a_function()),
        }
    }

    /// Resolve `slice(start, end)` arguments, counting negatives from the end
    fn slice_bounds(len: usize, start: &Value, end: &Value) -> (usize, usize) {
        let resolve = |v: &Value, default: usize| -> usize {
            match v {
                Value::Undefined => default,
                v => {
                    let n = v.to_number().trunc();
                    if n.is_nan() {
                        0
                    } else if n < 0.0 {
                        len.saturating_sub((-n) as usize)
                    } else {
                        (n as usize).min(len)
                    }
                }
            }
        };
        let start = resolve(start, 0);
        let end = resolve(end, len);
        (start, end.max(start))
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

    fn eval_within(body: &str, max_allocation: usize) -> Result<Value, RuntimeError> {
        let source = format!("function f() {{ {} }}", body);
        let program = parse(&source).unwrap();
        let limits = Limits {
            max_allocation,
            ..Limits::default()
        };
        Interpreter::new(&program, (), limits).call("f", vec![])
    }

    #[test]
    fn test_allocation_budget() {
        let err = eval_within("const keep = []; while (true) { keep.push(new Array(1000)); }", 10_000).unwrap_err();
        assert!(matches!(err, RuntimeError::AllocationLimitExceeded { limit: 10_000, .. }), "{:?}", err);
        assert!(err.is_limit());

        let err = eval_within("let s = 'x'; while (true) { s = s + s; }", 10_000).unwrap_err();
        assert!(matches!(err, RuntimeError::AllocationLimitExceeded { .. }), "{:?}", err);

        let err = eval_within("const a = []; a[50000] = 1; return a;", 10_000).unwrap_err();
        assert!(matches!(err, RuntimeError::AllocationLimitExceeded { .. }), "{:?}", err);

        let err = eval_within("const a = new Array(2000).fill('abcdef'); return a.join('');", 10_000).unwrap_err();
        assert!(matches!(err, RuntimeError::AllocationLimitExceeded { .. }), "{:?}", err);

        assert_eq!(eval_within("const a = [1, 2]; a.push(3); return a.join();", 100).unwrap().to_string(), "1,2,3");
    }

    #[test]
    fn test_math() {
        assert_eq!(eval("return Math.floor(7 / 2);").unwrap().as_int(), Some(3));
        assert_eq!(eval("return Math.ceil(7 / 2);").unwrap().as_int(), Some(4));
        assert_eq!(eval("return Math.max(1, 9, 4);").unwrap().as_int(), Some(9));
        assert_eq!(eval("return Math.min();").unwrap().to_string(), "Infinity");
        assert_eq!(eval("return Math.abs(-3);").unwrap().as_int(), Some(3));
        assert!(eval("return Math.random();").is_err());
    }

    #[test]
    fn test_local_math_shadows_builtin() {
        let err = eval("const Math = 1; return Math.floor(1.5);").unwrap_err();
        assert!(matches!(err, RuntimeError::TypeError { .. }));
    }

    #[test]
    fn test_array_methods() {
        assert_eq!(eval("const a = [1]; a.push(2, 3); return a.length;").unwrap().as_int(), Some(3));
        assert_eq!(eval("const a = [1, 2]; return a.pop() + a.length;").unwrap().as_int(), Some(3));
        assert_eq!(eval("return [1, 2, 3].indexOf(3);").unwrap().as_int(), Some(2));
        assert_eq!(eval("return [1, 2, 3, 4].slice(1, -1).join('-');").unwrap().to_string(), "2-3");
        assert_eq!(eval("return new Array(3).fill(0).join();").unwrap().to_string(), "0,0,0");
    }

    #[test]
    fn test_map_methods() {
        let result = eval(
            "const m = new Map(); m.set(2, 0).set(7, 1); \
             return [m.has(7), m.get(7), m.get(99) === undefined, m.size, m.delete(2), m.size];",
        );
        assert_eq!(result.unwrap().to_string(), "true,1,true,2,true,1");
    }

    #[test]
    fn test_set_methods() {
        let result = eval("const s = new Set([1, 2, 2, 3]); s.add(3); return [s.size, s.has(2), s.has(5)];");
        assert_eq!(result.unwrap().to_string(), "3,true,false");
    }

    #[test]
    fn test_string_methods() {
        assert_eq!(eval("return 'AbC'.toLowerCase();").unwrap().to_string(), "abc");
        assert_eq!(eval("return 'hello'.indexOf('l');").unwrap().as_int(), Some(2));
        assert_eq!(eval("return 'hello'.slice(-3);").unwrap().to_string(), "llo");
        assert_eq!(eval("return 'hello'.substring(3, 1);").unwrap().to_string(), "el");
        assert_eq!(eval("return 'abc'.length;").unwrap().as_int(), Some(3));
    }

    #[test]
    fn test_unknown_method() {
        let err = eval("return [1].sort();").unwrap_err();
        assert_eq!(err.to_string(), "TypeError: array.sort is not a function at line 1");
    }

    #[test]
    fn test_globals() {
        assert!(eval("return -Infinity < Number.MIN_SAFE_INTEGER;").unwrap().is_truthy());
    }
}

//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents all possible runtime
//! values in the script sandbox.
//!
//! # Value Types
//!
//! - [`Value::Undefined`] / [`Value::Null`]
//! - [`Value::Bool`], [`Value::Number`] (`f64`), [`Value::Str`]
//! - [`Value::Array`], [`Value::Map`], [`Value::Set`]: shared, mutable
//!   containers. Cloning a `Value` clones the handle, so two bindings can
//!   alias one array the way script semantics expect.
//!
//! Map and set keys are restricted to primitives (see [`MapKey`]).

use indexmap::{IndexMap, IndexSet};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type MapRef = Rc<RefCell<IndexMap<MapKey, Value>>>;
pub type SetRef = Rc<RefCell<IndexSet<MapKey>>>;

/// Runtime values in the interpreter
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(ArrayRef),
    Map(MapRef),
    Set(SetRef),
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn new_map() -> Self {
        Value::Map(Rc::new(RefCell::new(IndexMap::new())))
    }

    pub fn new_set() -> Self {
        Value::Set(Rc::new(RefCell::new(IndexSet::new())))
    }

    pub fn from_ints(items: &[i64]) -> Self {
        Self::array(items.iter().map(|&n| Value::Number(n as f64)).collect())
    }

    /// Name used in type errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "Map",
            Value::Set(_) => "Set",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Array(_) | Value::Map(_) | Value::Set(_) => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The value as an exact integer, if it is one
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => Some(*n as i64),
            _ => None,
        }
    }

    /// A non-negative integer usable as an array index
    pub fn as_index(&self) -> Option<usize> {
        self.as_int().and_then(|n| usize::try_from(n).ok())
    }

    /// Numeric conversion used by arithmetic and loose comparison
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::Str(s) => {
                let t = s.trim();
                if t.is_empty() {
                    0.0
                } else {
                    t.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            // Goes through the string form; anything long cannot be a number
            Value::Array(_) => self
                .to_string_within(64)
                .map_or(f64::NAN, |text| Value::Str(text).to_number()),
            Value::Map(_) | Value::Set(_) => f64::NAN,
        }
    }

    /// `===`: primitives by value, containers by identity
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            (Value::Set(a), Value::Set(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `==`: `null == undefined`, otherwise numeric coercion between primitives
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Str(s), c) | (c, Value::Str(s)) if c.is_container() => {
                c.to_string_within(s.len()).is_some_and(|text| text == *s)
            }
            (a, b) if a.is_container() && b.is_container() => a.strict_equals(b),
            (a, b) => a.to_number() == b.to_number(),
        }
    }

    fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Map(_) | Value::Set(_))
    }

    /// Structured copy for snapshot data bags. Integral numbers become JSON
    /// integers; maps become objects keyed by the key's string form. A
    /// container that contains itself, or nesting past [`MAX_NESTING`],
    /// becomes `null`.
    pub fn to_json(&self) -> serde_json::Value {
        self.to_json_within(&mut Vec::new())
    }

    fn to_json_within(&self, path: &mut Vec<*const ()>) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(_) => match self.as_int() {
                Some(n) => serde_json::Value::from(n),
                None => self
                    .as_number()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(serde_json::Value::Null, serde_json::Value::Number),
            },
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                let Some(ptr) = enter(path, Rc::as_ptr(items) as *const ()) else {
                    return serde_json::Value::Null;
                };
                let out = items.borrow().iter().map(|v| v.to_json_within(path)).collect();
                leave(path, ptr);
                serde_json::Value::Array(out)
            }
            Value::Map(map) => {
                let Some(ptr) = enter(path, Rc::as_ptr(map) as *const ()) else {
                    return serde_json::Value::Null;
                };
                let out = map
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json_within(path)))
                    .collect();
                leave(path, ptr);
                serde_json::Value::Object(out)
            }
            Value::Set(set) => serde_json::Value::Array(
                set.borrow().iter().map(|k| k.to_value().to_json()).collect(),
            ),
        }
    }

    /// `join`-style string form. Self-references and over-deep nesting
    /// print as empty, matching how arrays stringify cycles.
    fn write_within(&self, f: &mut fmt::Formatter<'_>, path: &mut Vec<*const ()>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => format_number(*n, f),
            Value::Str(s) => write!(f, "{}", s),
            Value::Array(items) => {
                let Some(ptr) = enter(path, Rc::as_ptr(items) as *const ()) else {
                    return Ok(());
                };
                let items = items.borrow();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    match item {
                        Value::Undefined | Value::Null => {}
                        other => other.write_within(f, path)?,
                    }
                }
                leave(path, ptr);
                Ok(())
            }
            Value::Map(_) => write!(f, "[object Map]"),
            Value::Set(_) => write!(f, "[object Set]"),
        }
    }
}

/// `fmt::Write` sink that refuses to grow past a byte limit
struct BoundedWriter {
    out: String,
    limit: usize,
}

impl fmt::Write for BoundedWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.out.len() + s.len() > self.limit {
            return Err(fmt::Error);
        }
        self.out.push_str(s);
        Ok(())
    }
}

impl Value {
    /// String form, or `None` if it would be longer than `limit` bytes.
    /// The string is never built past the limit.
    pub fn to_string_within(&self, limit: usize) -> Option<String> {
        use fmt::Write;
        let mut writer = BoundedWriter {
            out: String::new(),
            limit,
        };
        write!(writer, "{}", self).ok().map(|_| writer.out)
    }

    /// Elements, entries or bytes held directly by this value
    pub fn footprint(&self) -> usize {
        match self {
            Value::Str(s) => s.len(),
            Value::Array(items) => items.borrow().len(),
            Value::Map(map) => map.borrow().len(),
            Value::Set(set) => set.borrow().len(),
            _ => 0,
        }
    }
}

/// Deepest container nesting that is printed or exported
pub const MAX_NESTING: usize = 256;

/// Push `ptr` onto the open-container path unless it is already open or the
/// path is full.
fn enter(path: &mut Vec<*const ()>, ptr: *const ()) -> Option<*const ()> {
    if path.len() >= MAX_NESTING || path.contains(&ptr) {
        return None;
    }
    path.push(ptr);
    Some(ptr)
}

fn leave(path: &mut Vec<*const ()>, ptr: *const ()) {
    debug_assert_eq!(path.last(), Some(&ptr));
    path.pop();
}

fn format_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        write!(f, "NaN")
    } else if n.is_infinite() {
        write!(f, "{}Infinity", if n < 0.0 { "-" } else { "" })
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}

/// String conversion (`String(x)`, concatenation, messages)
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_within(f, &mut Vec::new())
    }
}

/// A hashable primitive usable as a `Map` key or `Set` member.
/// Numbers compare by SameValueZero: `0 === -0` and `NaN` equals itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Undefined,
    Null,
    Bool(bool),
    Number(u64),
    Str(String),
}

impl MapKey {
    pub fn from_value(value: &Value) -> Option<MapKey> {
        match value {
            Value::Undefined => Some(MapKey::Undefined),
            Value::Null => Some(MapKey::Null),
            Value::Bool(b) => Some(MapKey::Bool(*b)),
            Value::Number(n) => {
                let canonical = if *n == 0.0 {
                    0.0
                } else if n.is_nan() {
                    f64::NAN
                } else {
                    *n
                };
                Some(MapKey::Number(canonical.to_bits()))
            }
            Value::Str(s) => Some(MapKey::Str(s.clone())),
            Value::Array(_) | Value::Map(_) | Value::Set(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Undefined => Value::Undefined,
            MapKey::Null => Value::Null,
            MapKey::Bool(b) => Value::Bool(*b),
            MapKey::Number(bits) => Value::Number(f64::from_bits(*bits)),
            MapKey::Str(s) => Value::Str(s.clone()),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::from_ints(&[1, 2, 3]).to_string(), "1,2,3");
    }

    #[test]
    fn test_equality() {
        assert!(Value::Number(1.0).strict_equals(&Value::Number(1.0)));
        assert!(!Value::Number(1.0).strict_equals(&Value::Str("1".into())));
        assert!(Value::Number(1.0).loose_equals(&Value::Str("1".into())));
        assert!(Value::Null.loose_equals(&Value::Undefined));
        assert!(!Value::Null.strict_equals(&Value::Undefined));

        let a = Value::from_ints(&[1]);
        assert!(a.strict_equals(&a.clone()));
        assert!(!a.strict_equals(&Value::from_ints(&[1])));
    }

    #[test]
    fn test_map_key_same_value_zero() {
        assert_eq!(
            MapKey::from_value(&Value::Number(0.0)),
            MapKey::from_value(&Value::Number(-0.0))
        );
        assert_eq!(
            MapKey::from_value(&Value::Number(f64::NAN)),
            MapKey::from_value(&Value::Number(f64::NAN))
        );
        assert!(MapKey::from_value(&Value::new_map()).is_none());
    }

    #[test]
    fn test_self_containing_array() {
        let a = Value::from_ints(&[1, 2]);
        if let Value::Array(items) = &a {
            items.borrow_mut().push(a.clone());
        }
        assert_eq!(a.to_string(), "1,2,");
        assert_eq!(a.to_json(), serde_json::json!([1, 2, null]));
        assert!(a.to_number().is_nan());

        let m = Value::new_map();
        if let Value::Map(map) = &m {
            map.borrow_mut().insert(MapKey::Str("me".into()), m.clone());
        }
        assert_eq!(m.to_json(), serde_json::json!({ "me": null }));
    }

    #[test]
    fn test_deep_nesting_is_cut_off() {
        let mut v = Value::from_ints(&[7]);
        for _ in 0..MAX_NESTING + 10 {
            v = Value::array(vec![v]);
        }
        assert_eq!(v.to_string(), "");
        let mut json = &v.to_json();
        let mut depth = 0;
        while let serde_json::Value::Array(items) = json {
            json = &items[0];
            depth += 1;
        }
        assert_eq!(depth, MAX_NESTING);
        assert_eq!(*json, serde_json::Value::Null);
        assert_eq!(Value::from_ints(&[5]).to_number(), 5.0);
        assert_eq!(Value::array(vec![]).to_number(), 0.0);
    }

    #[test]
    fn test_bounded_string_form() {
        let v = Value::from_ints(&[1, 22, 333]);
        assert_eq!(v.to_string_within(8).as_deref(), Some("1,22,333"));
        assert_eq!(v.to_string_within(7), None);
        assert!(v.loose_equals(&Value::Str("1,22,333".into())));
        assert!(!v.loose_equals(&Value::Str("1,22".into())));
        assert_eq!(v.footprint(), 3);
    }

    #[test]
    fn test_to_json() {
        let v = Value::array(vec![Value::Number(1.0), Value::Number(1.5), Value::Null]);
        assert_eq!(v.to_json(), serde_json::json!([1, 1.5, null]));
    }
}

//! Runtime values
//!
//! Values have deep-copy semantics: `clone` never shares mutable state, so a
//! cloned [`Environment`](super::env::Environment) is a genuinely isolated
//! continuation of the session.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::types::Ty;
use crate::frontend::parser::ast::Block;

/// Key type for map values, restricted to hashable scalars
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Int(i64),
    Str(String),
    Bool(bool),
}

impl MapKey {
    /// Convert a value into a map key, if its type allows it
    pub fn from_value(value: &Value) -> Option<MapKey> {
        match value {
            Value::Int(v) => Some(MapKey::Int(*v)),
            Value::Str(s) => Some(MapKey::Str(s.clone())),
            Value::Bool(b) => Some(MapKey::Bool(*b)),
            _ => None,
        }
    }

    /// Convert the key back into a value
    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Int(v) => Value::Int(*v),
            MapKey::Str(s) => Value::Str(s.clone()),
            MapKey::Bool(b) => Value::Bool(*b),
        }
    }

    /// Runtime type of the key
    pub fn ty(&self) -> Ty {
        match self {
            MapKey::Int(_) => Ty::Int,
            MapKey::Str(_) => Ty::Str,
            MapKey::Bool(_) => Ty::Bool,
        }
    }
}

/// User-defined function value
#[derive(Debug, Clone)]
pub struct FuncValue {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<Block>,
}

impl PartialEq for FuncValue {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.params == other.params
    }
}

/// Runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(IndexMap<MapKey, Value>),
    Range(i64, i64),
    Func(FuncValue),
}

impl Value {
    /// Runtime type of this value.
    ///
    /// Container element types come from the first element; an empty or
    /// heterogeneous container reports `Any` elements.
    pub fn ty(&self) -> Ty {
        match self {
            Value::Nil => Ty::Nil,
            Value::Bool(_) => Ty::Bool,
            Value::Int(_) => Ty::Int,
            Value::Float(_) => Ty::Float,
            Value::Str(_) => Ty::Str,
            Value::List(items) => Ty::List(Box::new(element_ty(items.iter().map(|v| v.ty())))),
            Value::Map(entries) => {
                let key = element_ty(entries.keys().map(|k| k.ty()));
                let value = element_ty(entries.values().map(|v| v.ty()));
                Ty::Map(Box::new(key), Box::new(value))
            }
            Value::Range(..) => Ty::Range,
            Value::Func(_) => Ty::Func,
        }
    }

    /// Rendered type name
    pub fn type_name(&self) -> String {
        self.ty().to_string()
    }

    /// Boolean view, for conditions
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Sequence view shared by iteration and the sequence builtins:
    /// lists yield their elements, ranges their integers, strings their
    /// characters (as one-char strings).
    pub fn seq_items(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items.clone()),
            Value::Range(start, end) => Some((*start..*end).map(Value::Int).collect()),
            Value::Str(s) => Some(s.chars().map(|c| Value::Str(c.to_string())).collect()),
            _ => None,
        }
    }
}

/// Common element type of an iterator of types: all equal yields that type,
/// anything else (including empty) yields `Any`.
fn element_ty(mut tys: impl Iterator<Item = Ty>) -> Ty {
    let Some(first) = tys.next() else {
        return Ty::Any;
    };
    if tys.all(|t| t == first) {
        first
    } else {
        Ty::Any
    }
}

/// Ordering between two values, where comparison is meaningful
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::Int(x), Value::Float(y)) => (*x as f64).partial_cmp(y),
        (Value::Float(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)),
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn fmt_element(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::Str(s) => write!(f, "{:?}", s),
        other => write!(f, "{}", other),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    fmt_element(item, f)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    fmt_element(&key.to_value(), f)?;
                    write!(f, ": ")?;
                    fmt_element(value, f)?;
                }
                write!(f, "}}")
            }
            Value::Range(start, end) => write!(f, "{}..{}", start, end),
            Value::Func(func) => write!(f, "fn {}({})", func.name, func.params.join(", ")),
        }
    }
}

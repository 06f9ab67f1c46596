//! Runtime values.

use std::fmt;

use insp_ir::TyId;

use super::memory::Place;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Void,
    /// `int` and `long`.
    Int(i64),
    Bool(bool),
    Char(char),
    Double(f64),
    /// `None` is the null pointer.
    Pointer(Option<Place>),
    Array(Vec<Value>),
    /// Aggregates, classes and tuple-likes. `ty` is the dynamic type.
    Record { ty: TyId, fields: Vec<Value> },
    /// A closed sum with alternative `index` active.
    Variant { index: u32, payload: Box<Value> },
    /// A box or an optional: the payload and its type, or empty.
    Any(Option<(TyId, Box<Value>)>),
}

impl Value {
    /// Integral view of a scalar.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Char(c) => Some(i64::from(u32::from(*c))),
            _ => None,
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        reason = "integer to double conversion rounds like the source language"
    )]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            other => other.as_i64().map(|n| n as f64),
        }
    }

    /// Contextual conversion to `bool`.
    pub fn truth(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Char(c) => *c != '\0',
            Value::Double(d) => *d != 0.0,
            Value::Pointer(pointer) => pointer.is_some(),
            Value::Any(payload) => payload.is_some(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "void"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Pointer(None) => write!(f, "nullptr"),
            Value::Pointer(Some(place)) => write!(f, "&{place}"),
            Value::Array(elements) | Value::Record {
                fields: elements, ..
            } => {
                write!(f, "{{")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, "}}")
            }
            Value::Variant { payload, .. } => write!(f, "{payload}"),
            Value::Any(Some((_, payload))) => write!(f, "any({payload})"),
            Value::Any(None) => write!(f, "any()"),
        }
    }
}

//! Schema-agnostic scalar values for document fields and sort keys.
//!
//! The engine never interprets document shapes; it only needs a total,
//! deterministic ordering over field values so cursor boundaries and sort
//! specifications behave identically everywhere.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

///
/// Value
///
/// Canonical field value at the engine boundary.
///
/// Mixed-variant comparisons are rank-only and deterministic; callers that
/// sort or filter on a field are expected to keep that field's variant
/// consistent across documents.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Value {
    Blob(#[serde(with = "serde_bytes")] Vec<u8>),
    Bool(bool),
    Float(Float64),
    Int(i64),
    /// Ordered list of values. List order is preserved.
    List(Vec<Self>),
    Null,
    Text(String),
    Uint(u64),
}

impl Value {
    /// Canonical variant rank used for mixed-variant ordering.
    #[must_use]
    pub const fn canonical_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) => 2,
            Self::Uint(_) => 3,
            Self::Float(_) => 4,
            Self::Text(_) => 5,
            Self::Blob(_) => 6,
            Self::List(_) => 7,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Total canonical comparator used by scan ordering and boundary filtering.
///
/// Ordering rules:
/// 1. Canonical variant rank
/// 2. Variant-specific comparison for same-ranked values
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = left.canonical_rank().cmp(&right.canonical_rank());
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right)
}

fn canonical_cmp_same_rank(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Uint(a), Value::Uint(b)) => a.cmp(b),
        (Value::Float(a), Value::Float(b)) => a.cmp(b),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::Blob(a), Value::Blob(b)) => a.cmp(b),
        (Value::List(a), Value::List(b)) => canonical_cmp_list(a, b),
        // Mixed ranks are resolved by the caller before reaching here.
        _ => Ordering::Equal,
    }
}

fn canonical_cmp_list(left: &[Value], right: &[Value]) -> Ordering {
    for (a, b) in left.iter().zip(right.iter()) {
        let ord = canonical_cmp(a, b);
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len())
}

///
/// Float64
///
/// Total-order `f64` wrapper (`f64::total_cmp`) so float fields can
/// participate in sort keys and cursor boundaries.
///

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Float64(f64);

impl Float64 {
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl From<f64> for Float64 {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl PartialEq for Float64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Float64 {}

impl PartialOrd for Float64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Float64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::fmt::Display for Float64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

///
/// FieldValue
///
/// Conversion into a canonical [`Value`], used by the fluent pattern and
/// document builders so call sites can pass plain Rust values.
///

pub trait FieldValue {
    fn to_value(self) -> Value;
}

impl FieldValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

impl FieldValue for &Value {
    fn to_value(self) -> Value {
        self.clone()
    }
}

impl FieldValue for bool {
    fn to_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FieldValue for i64 {
    fn to_value(self) -> Value {
        Value::Int(self)
    }
}

impl FieldValue for i32 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl FieldValue for u64 {
    fn to_value(self) -> Value {
        Value::Uint(self)
    }
}

impl FieldValue for u32 {
    fn to_value(self) -> Value {
        Value::Uint(u64::from(self))
    }
}

impl FieldValue for f64 {
    fn to_value(self) -> Value {
        Value::Float(Float64::new(self))
    }
}

impl FieldValue for &str {
    fn to_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl FieldValue for String {
    fn to_value(self) -> Value {
        Value::Text(self)
    }
}

impl FieldValue for Vec<u8> {
    fn to_value(self) -> Value {
        Value::Blob(self)
    }
}

///
/// TESTS
///

use std::cmp::Ordering;

use rust_decimal::{Decimal, prelude::FromPrimitive};

/// A scalar value carried by query constants and materialized rows.
///
/// This type represents every scalar a query can reference or a row can
/// hold, with a distinction between integers and floats.
///
/// # Type Preservation
///
/// The engine preserves the distinction between integers and floats:
/// - Structural equality of constants is exact (`Integer(1)` and
///   `Float(1.0)` are different nodes)
/// - Semantic comparison via [`Value::compare`] bridges the two through
///   high-precision decimal arithmetic, so `1` and `1.0` order as equal
///
/// # Examples
///
/// ```
/// use trellis::Value;
///
/// let null = Value::Null;
/// let boolean = Value::Boolean(true);
/// let integer = Value::Integer(42);
/// let float = Value::Float(3.14);
/// let string = Value::String("hello".to_string());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Null,

    /// Boolean (true/false)
    Boolean(bool),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Instant in time, as milliseconds since the Unix epoch
    DateTime(i64),
}

impl Value {
    /// Returns a human-readable type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
        }
    }

    /// Get as float. Integers widen; datetimes expose their epoch-millis
    /// instant so they can feed numeric ranges (e.g. gradients).
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::DateTime(ms) => Some(*ms as f64),
            _ => None,
        }
    }

    /// Semantic comparison across representations.
    ///
    /// Integers and floats compare numerically (`1` equals `1.0`), strings
    /// ordinally, datetimes by instant. Mixed kinds are incomparable and
    /// yield `None`, as does `Null` against anything but `Null`.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Float(b)) => cmp_int_float(*a, *b),
            (Value::Float(a), Value::Integer(b)) => cmp_int_float(*b, *a).map(Ordering::reverse),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Equality consistent with [`Value::compare`]: `1` equals `1.0`.
    pub fn eq_value(&self, other: &Value) -> bool {
        matches!(self.compare(other), Some(Ordering::Equal))
    }
}

/// Compare an integer against a float without binary-float artifacts.
fn cmp_int_float(i: i64, f: f64) -> Option<Ordering> {
    if let Some(id) = Decimal::from_i64(i)
        && let Some(fd) = Decimal::from_f64(f)
    {
        return Some(id.cmp(&fd));
    }
    (i as f64).partial_cmp(&f)
}

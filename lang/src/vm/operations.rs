//! Binary and unary operator semantics.
//!
//! Integer-only pairs stay exact; once a float is involved the result is a
//! float. Operations on unsupported type pairings fail rather than coerce.

use super::value::Value;
use super::RuntimeError;

pub fn add(left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => Ok(Value::Integer(l + r)),
        (Value::Integer(l), Value::Float(r)) => Ok(Value::Float(l as f64 + r)),
        (Value::Float(l), Value::Integer(r)) => Ok(Value::Float(l + r as f64)),
        (Value::Float(l), Value::Float(r)) => Ok(Value::Float(l + r)),
        (Value::String(l), Value::String(r)) => Ok(Value::String(l + &r)),
        (l, r) => Err(type_error("+", &l, &r)),
    }
}

pub fn subtract(left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => Ok(Value::Integer(l - r)),
        (Value::Integer(l), Value::Float(r)) => Ok(Value::Float(l as f64 - r)),
        (Value::Float(l), Value::Integer(r)) => Ok(Value::Float(l - r as f64)),
        (Value::Float(l), Value::Float(r)) => Ok(Value::Float(l - r)),
        (l, r) => Err(type_error("-", &l, &r)),
    }
}

pub fn multiply(left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => Ok(Value::Integer(l * r)),
        (Value::Integer(l), Value::Float(r)) => Ok(Value::Float(l as f64 * r)),
        (Value::Float(l), Value::Integer(r)) => Ok(Value::Float(l * r as f64)),
        (Value::Float(l), Value::Float(r)) => Ok(Value::Float(l * r)),
        (l, r) => Err(type_error("*", &l, &r)),
    }
}

/// Integer division truncates toward zero; a zero integer divisor is an
/// error. Float division follows host semantics.
pub fn divide(left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Integer(_), Value::Integer(0)) => Err(RuntimeError::new("division by zero")),
        (Value::Integer(l), Value::Integer(r)) => Ok(Value::Integer(l / r)),
        (Value::Integer(l), Value::Float(r)) => Ok(Value::Float(l as f64 / r)),
        (Value::Float(l), Value::Integer(r)) => Ok(Value::Float(l / r as f64)),
        (Value::Float(l), Value::Float(r)) => Ok(Value::Float(l / r)),
        (l, r) => Err(type_error("/", &l, &r)),
    }
}

pub fn negate(value: Value) -> Result<Value, RuntimeError> {
    match value {
        Value::Integer(v) => Ok(Value::Integer(-v)),
        Value::Float(v) => Ok(Value::Float(-v)),
        v => Err(RuntimeError::new(format!("cannot negate {}", v.type_name()))),
    }
}

/// Value equality. Integers and floats compare numerically across the type
/// boundary; any other cross-type comparison is `false`, never an error.
pub fn equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Integer(l), Value::Float(r)) | (Value::Float(r), Value::Integer(l)) => {
            *l as f64 == *r
        }
        (l, r) => l == r,
    }
}

pub fn greater(left: Value, right: Value) -> Result<Value, RuntimeError> {
    if let (Value::Integer(l), Value::Integer(r)) = (&left, &right) {
        return Ok(Value::Boolean(l > r));
    }
    if let Some((l, r)) = numeric_pair(&left, &right) {
        return Ok(Value::Boolean(l > r));
    }
    if let (Value::String(l), Value::String(r)) = (&left, &right) {
        return Ok(Value::Boolean(l > r));
    }
    Err(type_error(">", &left, &right))
}

pub fn greater_equal(left: Value, right: Value) -> Result<Value, RuntimeError> {
    if let (Value::Integer(l), Value::Integer(r)) = (&left, &right) {
        return Ok(Value::Boolean(l >= r));
    }
    if let Some((l, r)) = numeric_pair(&left, &right) {
        return Ok(Value::Boolean(l >= r));
    }
    if let (Value::String(l), Value::String(r)) = (&left, &right) {
        return Ok(Value::Boolean(l >= r));
    }
    Err(type_error(">=", &left, &right))
}

pub fn less(left: Value, right: Value) -> Result<Value, RuntimeError> {
    if let (Value::Integer(l), Value::Integer(r)) = (&left, &right) {
        return Ok(Value::Boolean(l < r));
    }
    if let Some((l, r)) = numeric_pair(&left, &right) {
        return Ok(Value::Boolean(l < r));
    }
    if let (Value::String(l), Value::String(r)) = (&left, &right) {
        return Ok(Value::Boolean(l < r));
    }
    Err(type_error("<", &left, &right))
}

pub fn less_equal(left: Value, right: Value) -> Result<Value, RuntimeError> {
    if let (Value::Integer(l), Value::Integer(r)) = (&left, &right) {
        return Ok(Value::Boolean(l <= r));
    }
    if let Some((l, r)) = numeric_pair(&left, &right) {
        return Ok(Value::Boolean(l <= r));
    }
    if let (Value::String(l), Value::String(r)) = (&left, &right) {
        return Ok(Value::Boolean(l <= r));
    }
    Err(type_error("<=", &left, &right))
}

fn numeric_pair(left: &Value, right: &Value) -> Option<(f64, f64)> {
    let l = match left {
        Value::Integer(v) => *v as f64,
        Value::Float(v) => *v,
        _ => return None,
    };
    let r = match right {
        Value::Integer(v) => *v as f64,
        Value::Float(v) => *v,
        _ => return None,
    };
    Some((l, r))
}

fn type_error(op: &str, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::new(format!(
        "unsupported operand types for {op}: {} and {}",
        left.type_name(),
        right.type_name()
    ))
}

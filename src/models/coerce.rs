//! Lenient numeric coercion for upstream JSON values.
//!
//! Both sources mix JSON numbers and numeric strings. Anything else (null,
//! bool, arrays, non-numeric text, non-finite values) coerces to `None`.

use serde_json::Value;

pub fn coerce_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Integer coercion. Whole floats (`42.0`, `"42"`) are accepted, fractional
/// values are not.
pub fn coerce_i64(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let n = coerce_f64(value)?;
    (n.fract() == 0.0 && n.abs() < i64::MAX as f64).then_some(n as i64)
}

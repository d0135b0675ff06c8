//! Argument checking with the host's conversion rules.
//!
//! Integers accept integral floats and numeric strings, numbers accept
//! integers and numeric strings, strings accept numbers.

use super::failure::HostError;
use super::value::{LockRef, Value};

/// Positional arguments of one call, named after the function for errors.
pub(crate) struct Args<'a> {
    fname: &'static str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub(crate) fn new(fname: &'static str, values: &'a [Value]) -> Self {
        Self { fname, values }
    }

    /// Argument at 1-based `pos`, `None` past the end of the call.
    pub(crate) fn get(&self, pos: usize) -> Option<&'a Value> {
        pos.checked_sub(1).and_then(|i| self.values.get(i))
    }

    fn is_absent(&self, pos: usize) -> bool {
        self.get(pos).is_none_or(Value::is_nil)
    }

    fn type_error(&self, pos: usize, expected: &str) -> HostError {
        let got = self.get(pos).map_or("no value", Value::type_name);
        HostError::bad_argument(
            pos,
            self.fname,
            format!("{} expected, got {}", expected, got),
        )
    }

    pub(crate) fn check_string(&self, pos: usize) -> Result<String, HostError> {
        match self.get(pos) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Integer(i)) => Ok(i.to_string()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(self.type_error(pos, "string")),
        }
    }

    pub(crate) fn check_number(&self, pos: usize) -> Result<f64, HostError> {
        self.to_number(pos)
            .ok_or_else(|| self.type_error(pos, "number"))
    }

    pub(crate) fn opt_number(&self, pos: usize, default: f64) -> Result<f64, HostError> {
        if self.is_absent(pos) {
            return Ok(default);
        }
        self.check_number(pos)
    }

    pub(crate) fn check_integer(&self, pos: usize) -> Result<i64, HostError> {
        match self.get(pos) {
            Some(Value::Integer(i)) => Ok(*i),
            Some(Value::Number(n)) => float_to_integer(*n).ok_or_else(|| {
                HostError::bad_argument(pos, self.fname, "number has no integer representation")
            }),
            Some(Value::String(s)) => match parse_number(s) {
                Some(Value::Integer(i)) => Ok(i),
                Some(Value::Number(n)) => float_to_integer(n).ok_or_else(|| {
                    HostError::bad_argument(pos, self.fname, "number has no integer representation")
                }),
                _ => Err(self.type_error(pos, "number")),
            },
            _ => Err(self.type_error(pos, "number")),
        }
    }

    /// Lenient numeric conversion: `None` when the value is not a number or a
    /// numeric string.
    pub(crate) fn to_number(&self, pos: usize) -> Option<f64> {
        match self.get(pos)? {
            Value::String(s) => parse_number(s).and_then(|v| v.as_number()),
            other => other.as_number(),
        }
    }

    pub(crate) fn check_lock(&self, pos: usize) -> Result<&'a LockRef, HostError> {
        self.get(pos)
            .and_then(Value::as_lock)
            .ok_or_else(|| self.type_error(pos, "lock"))
    }
}

/// Parse a numeric string into an integer or float value.
fn parse_number(s: &str) -> Option<Value> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::Integer(i));
    }
    s.parse::<f64>().ok().map(Value::Number)
}

fn float_to_integer(n: f64) -> Option<i64> {
    // 2^63 is the first float past i64::MAX.
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < 9_223_372_036_854_775_808.0 {
        Some(n as i64)
    } else {
        None
    }
}

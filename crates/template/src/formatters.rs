//! Value formatters
//!
//! Pure conversions between human and machine representations of numbers,
//! durations, lists and byte quantities. The template helpers in
//! [`crate::functions`] are thin adapters over these.
//!
//! Digit grouping uses an apostrophe as separator:
//!
//! ```
//! use nodeforge_template::formatters::{grouped_integer, to_hex};
//! use nodeforge_core::Value;
//!
//! assert_eq!(grouped_integer(&Value::from("1000000")).unwrap(), "1'000'000");
//! assert_eq!(to_hex("1234abcd").unwrap(), "0x1234'abcd");
//! ```

use nodeforge_core::Value;
use nodeforge_core::sanitize::sanitize;
use thiserror::Error;

/// Digit group separator
pub const GROUP_SEPARATOR: char = '\'';

/// A formatter received input outside its contract
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Input to `groupedInteger` is not made of decimal digits
    #[error("groupedInteger expects decimal digits, got '{input}'")]
    NotDigits {
        /// Sanitized input
        input: String,
    },

    /// Input to `toHex` is not made of hexadecimal digits
    #[error("toHex expects hexadecimal digits, got '{input}'")]
    NotHex {
        /// Sanitized input
        input: String,
    },

    /// Operands of an arithmetic helper have the wrong kinds
    #[error("{op} expects two numbers, got {left} and {right}")]
    TypeMismatch {
        /// Helper name
        op: &'static str,
        /// Kind of the left operand
        left: &'static str,
        /// Kind of the right operand
        right: &'static str,
    },

    /// Duration expression could not be parsed
    #[error("Invalid duration '{input}': {message}")]
    InvalidDuration {
        /// Duration text
        input: String,
        /// Parser message
        message: String,
    },

    /// Percentage is negative or not finite
    #[error("memoryFraction expects a finite, non-negative percentage, got {value}")]
    InvalidPercentage {
        /// Rejected percentage
        value: f64,
    },
}

/// Source of the host's total memory, in bytes
///
/// Queried on every call so results follow the machine the render runs on.
pub trait MemoryProbe: Send + Sync {
    /// Total physical memory in bytes
    fn total_memory(&self) -> u64;
}

/// Reads total memory from the running host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMemory;

impl MemoryProbe for SystemMemory {
    fn total_memory(&self) -> u64 {
        let mut sys = sysinfo::System::new();
        sys.refresh_memory();
        sys.total_memory()
    }
}

/// Reports a fixed amount of memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMemory(pub u64);

impl MemoryProbe for FixedMemory {
    fn total_memory(&self) -> u64 {
        self.0
    }
}

/// Split `digits` into runs of `size` from the right, joined by the separator
fn group_from_right(digits: &str, size: usize) -> String {
    let head = digits.len() % size;
    let mut out = String::with_capacity(digits.len() + digits.len() / size);

    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && index >= head && (index - head) % size == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(ch);
    }
    out
}

/// Regroup a decimal integer in runs of three: `"1000000"` → `"1'000'000"`
///
/// Accepts strings (existing separators are stripped first) and integers.
/// Floats are accepted only when integral.
pub fn grouped_integer(value: &Value) -> Result<String, FormatError> {
    let text = match value {
        Value::String(s) => s.replace(GROUP_SEPARATOR, ""),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
        other => other.to_string(),
    };

    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FormatError::NotDigits {
            input: sanitize(&text),
        });
    }

    Ok(group_from_right(&text, 3))
}

/// Strip separators and an optional `0x` prefix: `"0x12'34"` → `"1234"`
#[must_use]
pub fn to_simple_hex(text: &str) -> String {
    let stripped = text.replace(GROUP_SEPARATOR, "");
    let stripped = stripped.trim();
    stripped
        .strip_prefix("0x")
        .or_else(|| stripped.strip_prefix("0X"))
        .unwrap_or(stripped)
        .to_string()
}

/// Regroup hex digits in runs of four with a `0x` prefix: `"1234abcd"` → `"0x1234'abcd"`
pub fn to_hex(text: &str) -> Result<String, FormatError> {
    let digits = to_simple_hex(text);
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FormatError::NotHex {
            input: sanitize(text),
        });
    }
    Ok(format!("0x{}", group_from_right(&digits, 4)))
}

/// Two-space indented JSON
#[must_use]
pub fn to_json(value: &Value) -> String {
    value.to_pretty_json()
}

/// Split on commas, trimming pieces and dropping empty ones
#[must_use]
pub fn split_csv(text: Option<&str>) -> Vec<String> {
    text.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Numeric sum or string concatenation; any other pairing yields `""`
#[must_use]
pub fn add(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x
            .checked_add(*y)
            .map_or_else(|| Value::Float(as_float(*x) + as_float(*y)), Value::Integer),
        (Value::String(x), Value::String(y)) => Value::String(format!("{x}{y}")),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Value::Float(x + y),
            _ => Value::String(String::new()),
        },
    }
}

/// Numeric difference; non-numeric operands are a type error
pub fn subtract(a: &Value, b: &Value) -> Result<Value, FormatError> {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Ok(x
            .checked_sub(*y)
            .map_or_else(|| Value::Float(as_float(*x) - as_float(*y)), Value::Integer)),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Ok(Value::Float(x - y)),
            _ => Err(FormatError::TypeMismatch {
                op: "subtract",
                left: a.kind(),
                right: b.kind(),
            }),
        },
    }
}

#[allow(clippy::cast_precision_loss)]
const fn as_float(i: i64) -> f64 {
    i as f64
}

/// Parse a duration expression (`"30s"`, `"6h"`, `"1h 30m"`) into whole seconds
pub fn duration_to_seconds(text: &str) -> Result<u64, FormatError> {
    humantime::parse_duration(text.trim())
        .map(|d| d.as_secs())
        .map_err(|e| FormatError::InvalidDuration {
            input: sanitize(text),
            message: e.to_string(),
        })
}

/// `percentage` percent of the host's total memory, in whole bytes
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn memory_fraction(percentage: f64, probe: &dyn MemoryProbe) -> Result<u64, FormatError> {
    if !percentage.is_finite() || percentage < 0.0 {
        return Err(FormatError::InvalidPercentage { value: percentage });
    }
    let total = probe.total_memory() as f64;
    Ok((total * percentage / 100.0).floor() as u64)
}

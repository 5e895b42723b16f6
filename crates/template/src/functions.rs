//! Template helper functions
//!
//! Adapters exposing [`crate::formatters`] to templates. Every helper can be
//! called as a function; the unary ones are registered as filters too:
//!
//! ```jinja2
//! {{ groupedInteger(stake) }}          {# 1'000'000 #}
//! {{ address | toHex }}                {# 0x1234'abcd #}
//! {% for peer in splitCsv(peers) %}{{ peer }}{% endfor %}
//! {{ add(basePort, 1) }}
//! ```
//!
//! Formatter failures become `InvalidOperation` errors, which abort the
//! template evaluation that raised them.

use crate::formatters::{self, FormatError, MemoryProbe};
use minijinja::value::{Value, ValueKind};
use minijinja::{Error, ErrorKind};
use nodeforge_core::Value as ConfigValue;

/// Convert a formatter error into a template error
fn format_error(e: FormatError) -> Error {
    Error::new(ErrorKind::InvalidOperation, e.to_string())
}

/// Convert a template value into the configuration value model
///
/// Undefined and none both map to null. Values without a configuration
/// counterpart (bytes, iterators, objects) are stringified.
pub fn to_config_value(value: &Value) -> ConfigValue {
    match value.kind() {
        ValueKind::Undefined | ValueKind::None => ConfigValue::Null,
        ValueKind::Bool => ConfigValue::Bool(value.is_true()),
        ValueKind::Number => i64::try_from(value.clone()).map_or_else(
            |_| ConfigValue::Float(f64::try_from(value.clone()).unwrap_or(f64::NAN)),
            ConfigValue::Integer,
        ),
        ValueKind::String => ConfigValue::String(value.as_str().unwrap_or_default().to_string()),
        ValueKind::Seq => value.try_iter().map_or(ConfigValue::Null, |items| {
            ConfigValue::Sequence(items.map(|item| to_config_value(&item)).collect())
        }),
        ValueKind::Map => value.try_iter().map_or(ConfigValue::Null, |keys| {
            ConfigValue::Mapping(
                keys.map(|key| {
                    let inner = value.get_item(&key).unwrap_or_default();
                    (key.to_string(), to_config_value(&inner))
                })
                .collect(),
            )
        }),
        _ => ConfigValue::String(value.to_string()),
    }
}

/// Convert back into a template value
#[must_use]
pub fn from_config_value(value: &ConfigValue) -> Value {
    Value::from_serialize(value)
}

/// Text of a scalar argument, the way string coercion would print it
fn text_of(value: &Value) -> String {
    match value.kind() {
        ValueKind::Undefined | ValueKind::None => String::new(),
        _ => value.as_str().map_or_else(|| value.to_string(), ToString::to_string),
    }
}

/// Regroup decimal digits in runs of three
///
/// Usage: `{{ groupedInteger("1000000") }}` → `1'000'000`
///
/// # Errors
///
/// Returns error if the input is not made of decimal digits
pub fn grouped_integer(value: &Value) -> Result<String, Error> {
    formatters::grouped_integer(&to_config_value(value)).map_err(format_error)
}

/// Regroup hex digits in runs of four with a `0x` prefix
///
/// Usage: `{{ toHex("1234abcd") }}` → `0x1234'abcd`
///
/// # Errors
///
/// Returns error if the input is not made of hex digits
pub fn to_hex(value: &Value) -> Result<String, Error> {
    formatters::to_hex(&text_of(value)).map_err(format_error)
}

/// Bare hex digits without separators or `0x`
///
/// Usage: `{{ toSimpleHex("0x12'34") }}` → `1234`
#[must_use]
pub fn to_simple_hex(value: &Value) -> String {
    formatters::to_simple_hex(&text_of(value))
}

/// Two-space indented JSON
///
/// Usage: `{{ network | toJson }}`
#[must_use]
pub fn to_json(value: &Value) -> String {
    formatters::to_json(&to_config_value(value))
}

/// Comma separated text to a list of trimmed, non-empty pieces
///
/// Usage: `{% for peer in splitCsv(" a, b ,,c") %}` iterates `a`, `b`, `c`
#[must_use]
pub fn split_csv(value: &Value) -> Vec<String> {
    match value.kind() {
        ValueKind::Undefined | ValueKind::None => Vec::new(),
        _ => formatters::split_csv(Some(&text_of(value))),
    }
}

/// Sum of two numbers or concatenation of two strings, otherwise `""`
///
/// Usage: `{{ add(basePort, 1) }}`
#[must_use]
pub fn add(a: &Value, b: &Value) -> Value {
    from_config_value(&formatters::add(&to_config_value(a), &to_config_value(b)))
}

/// Difference of two numbers
///
/// Usage: `{{ subtract(maxPeers, 5) }}`
///
/// # Errors
///
/// Returns error unless both operands are numbers
pub fn subtract(a: &Value, b: &Value) -> Result<Value, Error> {
    formatters::subtract(&to_config_value(a), &to_config_value(b))
        .map(|v| from_config_value(&v))
        .map_err(format_error)
}

/// Whole seconds in a duration expression
///
/// Usage: `{{ durationToSeconds("6h") }}` → `21600`
///
/// # Errors
///
/// Returns error if the duration cannot be parsed
pub fn duration_to_seconds(value: &Value) -> Result<u64, Error> {
    formatters::duration_to_seconds(&text_of(value)).map_err(format_error)
}

/// Percentage of total host memory, in bytes
///
/// Usage: `{{ memoryFraction(25) }}`
///
/// # Errors
///
/// Returns error if the percentage is not a finite, non-negative number
pub fn memory_fraction(percentage: &Value, probe: &dyn MemoryProbe) -> Result<u64, Error> {
    let config = to_config_value(percentage);
    let Some(percentage) = config.as_f64() else {
        return Err(format_error(FormatError::TypeMismatch {
            op: "memoryFraction",
            left: config.kind(),
            right: "number",
        }));
    };
    formatters::memory_fraction(percentage, probe).map_err(format_error)
}

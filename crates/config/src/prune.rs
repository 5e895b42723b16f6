//! Removal of empty and invalid values from a configuration tree
//!
//! A mapping key is dropped when its value is `null`, `NaN`, or a mapping
//! that is empty once its own children have been pruned. Sequence elements
//! are dropped under the same rule. Empty sequences are kept.

use nodeforge_core::{Mapping, Value};

/// Prune `value`, returning a cleaned copy
///
/// The input is never modified. A top-level value that prunes away entirely
/// yields an empty mapping.
///
/// # Examples
///
/// ```
/// use nodeforge_config::prune::prune;
/// use nodeforge_core::Value;
///
/// let raw = Value::from(serde_json::json!({"a": null, "b": {"c": null}, "d": 1}));
/// assert_eq!(prune(&raw), Value::from(serde_json::json!({"d": 1})));
/// ```
#[must_use]
pub fn prune(value: &Value) -> Value {
    prune_node(value).unwrap_or_else(Value::mapping)
}

/// Returns `None` when the node must be removed from its parent
fn prune_node(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Float(f) if f.is_nan() => None,
        Value::Mapping(map) => {
            let pruned: Mapping = map
                .iter()
                .filter_map(|(key, inner)| prune_node(inner).map(|v| (key.clone(), v)))
                .collect();
            (!pruned.is_empty()).then_some(Value::Mapping(pruned))
        }
        Value::Sequence(items) => Some(Value::Sequence(
            items.iter().filter_map(prune_node).collect(),
        )),
        scalar => Some(scalar.clone()),
    }
}

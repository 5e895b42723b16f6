//! Layered preset resolution
//!
//! Preset layers are merged in order, later layers overriding earlier ones key
//! by key, and the merged document is pruned before it is handed out:
//!
//! 1. shared defaults
//! 2. network-specific preset
//! 3. assembly-specific preset
//! 4. user customisation
//!
//! Nested mappings merge recursively. A later `null` overrides the inherited
//! value and is then pruned away, which is how a layer unsets a key.

use crate::prune::prune;
use nodeforge_core::{Mapping, Value};
use serde::{Deserialize, Serialize};

/// One named partial configuration document
#[derive(Debug, Clone, PartialEq)]
pub struct PresetLayer {
    /// Layer name, used in logs
    pub name: String,
    /// Layer document; must be a mapping to take part in the merge
    pub document: Value,
}

impl PresetLayer {
    /// Create a layer from a name and a document
    pub fn new(name: impl Into<String>, document: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            document: document.into(),
        }
    }
}

/// How sequences merge when two layers define the same key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SequenceMerge {
    /// The later sequence replaces the earlier one wholesale
    #[default]
    Replace,
    /// Elements at the same index are deep merged; the longer tail is kept
    IndexWise,
}

/// Merges preset layers into a resolved configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct PresetResolver {
    sequences: SequenceMerge,
}

impl PresetResolver {
    /// Create a resolver with the default (replace) sequence policy
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose how colliding sequences are merged
    #[must_use]
    pub const fn with_sequence_merge(mut self, policy: SequenceMerge) -> Self {
        self.sequences = policy;
        self
    }

    /// Merge `layers` in order and prune the result
    ///
    /// Layers whose document is not a mapping are skipped with a warning; the
    /// loader rejects them before they get here.
    pub fn resolve<'a, I>(&self, layers: I) -> Value
    where
        I: IntoIterator<Item = &'a PresetLayer>,
    {
        let mut merged = Mapping::new();

        for layer in layers {
            let Value::Mapping(overlay) = &layer.document else {
                tracing::warn!(
                    layer = %layer.name,
                    kind = layer.document.kind(),
                    "Skipping preset layer that is not a mapping"
                );
                continue;
            };

            tracing::debug!(layer = %layer.name, keys = overlay.len(), "Merging preset layer");
            self.merge_mapping(&mut merged, overlay);
        }

        prune(&Value::Mapping(merged))
    }

    /// Deep merge `overlay` into `base` (overlay wins on conflicts)
    fn merge_mapping(&self, base: &mut Mapping, overlay: &Mapping) {
        for (key, value) in overlay {
            match base.get_mut(key) {
                Some(existing) => self.merge_value(existing, value),
                None => {
                    base.insert(key.clone(), value.clone());
                }
            }
        }
    }

    fn merge_value(&self, base: &mut Value, overlay: &Value) {
        match (base, overlay) {
            (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
                self.merge_mapping(base_map, overlay_map);
            }
            (Value::Sequence(base_items), Value::Sequence(overlay_items))
                if self.sequences == SequenceMerge::IndexWise =>
            {
                for (index, item) in overlay_items.iter().enumerate() {
                    match base_items.get_mut(index) {
                        Some(existing) => self.merge_value(existing, item),
                        None => base_items.push(item.clone()),
                    }
                }
            }
            (base, overlay) => *base = overlay.clone(),
        }
    }
}

/// Resolve layers with the default policy
///
/// # Examples
///
/// ```
/// use nodeforge_config::preset::{PresetLayer, resolve};
/// use nodeforge_core::Value;
/// use serde_json::json;
///
/// let layers = [
///     PresetLayer::new("defaults", Value::from(json!({"x": 1, "y": 2}))),
///     PresetLayer::new("custom", Value::from(json!({"x": 3}))),
/// ];
/// assert_eq!(resolve(&layers), Value::from(json!({"x": 3, "y": 2})));
/// ```
pub fn resolve(layers: &[PresetLayer]) -> Value {
    PresetResolver::new().resolve(layers)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use serde_json::json;

    fn layer(name: &str, json: serde_json::Value) -> PresetLayer {
        PresetLayer::new(name, Value::from(json))
    }

    #[test]
    fn test_later_scalar_wins() {
        let layers = [
            layer("defaults", json!({"x": 1, "y": 2})),
            layer("custom", json!({"x": 3})),
        ];
        assert_eq!(resolve(&layers), Value::from(json!({"x": 3, "y": 2})));
    }

    #[test]
    fn test_nested_mappings_merge_deeply() {
        let layers = [
            layer(
                "defaults",
                json!({"node": {"port": 30303, "rpc": {"enabled": false, "port": 8545}}}),
            ),
            layer("network", json!({"node": {"rpc": {"enabled": true}}})),
        ];
        assert_eq!(
            resolve(&layers),
            Value::from(json!({"node": {"port": 30303, "rpc": {"enabled": true, "port": 8545}}}))
        );
    }

    #[test]
    fn test_kind_mismatch_takes_later_value() {
        let layers = [
            layer("a", json!({"x": {"nested": 1}})),
            layer("b", json!({"x": "flat"})),
            layer("c", json!({"y": 1})),
            layer("d", json!({"y": {"nested": true}})),
        ];
        assert_eq!(
            resolve(&layers),
            Value::from(json!({"x": "flat", "y": {"nested": true}}))
        );
    }

    #[test]
    fn test_null_unsets_inherited_key() {
        let layers = [
            layer("defaults", json!({"metrics": {"port": 9100}, "name": "n"})),
            layer("custom", json!({"metrics": null})),
        ];
        assert_eq!(resolve(&layers), Value::from(json!({"name": "n"})));
    }

    #[test]
    fn test_sequences_replace_by_default() {
        let layers = [
            layer("defaults", json!({"peers": ["a", "b", "c"]})),
            layer("custom", json!({"peers": ["z"]})),
        ];
        assert_eq!(resolve(&layers), Value::from(json!({"peers": ["z"]})));
    }

    #[test]
    fn test_sequences_index_wise() {
        let layers = [
            layer("defaults", json!({"nodes": [{"name": "a", "port": 1}, {"name": "b"}]})),
            layer("custom", json!({"nodes": [{"port": 2}]})),
        ];
        let resolved = PresetResolver::new()
            .with_sequence_merge(SequenceMerge::IndexWise)
            .resolve(&layers);
        assert_eq!(
            resolved,
            Value::from(json!({"nodes": [{"name": "a", "port": 2}, {"name": "b"}]}))
        );
    }

    #[test]
    fn test_index_wise_keeps_longer_overlay_tail() {
        let layers = [
            layer("a", json!({"v": [1]})),
            layer("b", json!({"v": [5, 6, 7]})),
        ];
        let resolved = PresetResolver::new()
            .with_sequence_merge(SequenceMerge::IndexWise)
            .resolve(&layers);
        assert_eq!(resolved, Value::from(json!({"v": [5, 6, 7]})));
    }

    #[test]
    fn test_result_is_pruned() {
        let layers = [layer("only", json!({"a": null, "b": {"c": null}, "d": 1}))];
        assert_eq!(resolve(&layers), Value::from(json!({"d": 1})));
    }

    #[test]
    fn test_new_keys_keep_layer_order() {
        let layers = [
            layer("a", json!({"first": 1})),
            layer("b", json!({"second": 2, "first": 3})),
        ];
        let resolved = resolve(&layers);
        let keys: Vec<_> = resolved.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["first", "second"]);
    }

    #[test]
    fn test_non_mapping_layer_is_skipped() {
        let layers = [
            layer("a", json!({"x": 1})),
            layer("bogus", json!(["not", "a", "mapping"])),
        ];
        assert_eq!(resolve(&layers), Value::from(json!({"x": 1})));
    }

    #[test]
    fn test_no_layers() {
        assert_eq!(resolve(&[]), Value::mapping());
    }

    #[test]
    fn test_inputs_untouched() {
        let layers = [
            layer("a", json!({"x": {"y": 1}})),
            layer("b", json!({"x": {"z": null}})),
        ];
        let before = layers.clone();
        let _ = resolve(&layers);
        assert_eq!(layers, before);
    }

    #[test]
    fn test_sequence_merge_deserializes_camel_case() {
        let policy: SequenceMerge = serde_json::from_str("\"indexWise\"").unwrap();
        assert_eq!(policy, SequenceMerge::IndexWise);
    }
}

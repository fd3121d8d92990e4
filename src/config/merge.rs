//! Deep merge functionality for layered configurations.
//!
//! Implements field-by-field merging where higher layer values override lower layer values.
//! Lists are replaced entirely, not concatenated.

use super::Mapping;
use serde_json::Value;

/// Deep merge two mappings, with `overlay` taking precedence over `base`.
///
/// - Nested mappings are merged recursively: keys in overlay override keys in base
/// - Lists, strings, numbers, booleans, nulls are replaced entirely
/// - Keys only present in `base` are kept unchanged
///
/// Neither input is modified.
///
/// # Example
/// ```
/// use serde_json::json;
/// use conftier::config::{deep_merge, Mapping};
///
/// let base: Mapping = serde_json::from_value(json!({
///     "server": { "port": 8080, "host": "localhost" },
///     "features": ["a", "b"]
/// })).unwrap();
/// let overlay: Mapping = serde_json::from_value(json!({
///     "server": { "port": 9000 },
///     "features": ["c"]
/// })).unwrap();
/// let merged = deep_merge(&base, &overlay);
/// assert_eq!(merged["server"]["host"], "localhost");
/// assert_eq!(merged["server"]["port"], 9000);
/// assert_eq!(merged["features"], json!(["c"]));
/// ```
pub fn deep_merge(base: &Mapping, overlay: &Mapping) -> Mapping {
    let mut result = base.clone();
    for (key, overlay_value) in overlay {
        let merged_value = match (result.get(key), overlay_value) {
            (Some(Value::Object(base_map)), Value::Object(overlay_map)) => {
                Value::Object(deep_merge(base_map, overlay_map))
            }
            _ => overlay_value.clone(),
        };
        result.insert(key.clone(), merged_value);
    }
    result
}

/// Merge multiple mappings in order, with later mappings taking precedence.
///
/// Equivalent to folding `deep_merge` over the list.
pub fn deep_merge_all<'a>(mappings: impl IntoIterator<Item = &'a Mapping>) -> Mapping {
    mappings
        .into_iter()
        .fold(Mapping::new(), |acc, next| deep_merge(&acc, next))
}

/// Merge the three configuration layers: default, then user, then project.
pub fn merge_layers(
    default: &Mapping,
    user: Option<&Mapping>,
    project: Option<&Mapping>,
) -> Mapping {
    let mut result = default.clone();
    if let Some(user) = user {
        result = deep_merge(&result, user);
    }
    if let Some(project) = project {
        result = deep_merge(&result, project);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Mapping {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn test_merge_simple_mappings() {
        let base = map(json!({"a": 1, "b": 2}));
        let overlay = map(json!({"b": 3, "c": 4}));
        let result = deep_merge(&base, &overlay);
        assert_eq!(result, map(json!({"a": 1, "b": 3, "c": 4})));
    }

    #[test]
    fn test_merge_nested_mappings() {
        let base = map(json!({
            "server": {"host": "localhost", "port": 8080},
            "debug": true
        }));
        let overlay = map(json!({
            "server": {"port": 9000}
        }));
        let result = deep_merge(&base, &overlay);
        assert_eq!(
            result,
            map(json!({
                "server": {"host": "localhost", "port": 9000},
                "debug": true
            }))
        );
    }

    #[test]
    fn test_lists_replaced_not_merged() {
        let base = map(json!({"items": [1, 2, 3]}));
        let overlay = map(json!({"items": [4, 5]}));
        let result = deep_merge(&base, &overlay);
        assert_eq!(result, map(json!({"items": [4, 5]})));
    }

    #[test]
    fn test_null_replaces_base() {
        let base = map(json!({"a": 1, "b": {"c": 2}}));
        let overlay = map(json!({"a": null}));
        let result = deep_merge(&base, &overlay);
        assert_eq!(result, map(json!({"a": null, "b": {"c": 2}})));
    }

    #[test]
    fn test_inputs_not_mutated() {
        let base = map(json!({"a": {"b": 1}}));
        let overlay = map(json!({"a": {"c": 2}}));
        let before_base = base.clone();
        let before_overlay = overlay.clone();
        let _ = deep_merge(&base, &overlay);
        assert_eq!(base, before_base);
        assert_eq!(overlay, before_overlay);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let a = map(json!({"x": {"y": 1, "z": [1, 2]}, "w": "keep"}));
        let b = map(json!({"x": {"y": 2}, "v": false}));
        let once = deep_merge(&a, &b);
        let twice = deep_merge(&a, &once);
        assert_eq!(once, twice);
        assert_eq!(deep_merge(&once, &once), once);
    }

    #[test]
    fn test_deep_nested_merge() {
        let base = map(json!({
            "level1": {"level2": {"level3": {"a": 1, "b": 2}}}
        }));
        let overlay = map(json!({
            "level1": {"level2": {"level3": {"b": 3, "c": 4}}}
        }));
        let result = deep_merge(&base, &overlay);
        assert_eq!(
            result,
            map(json!({
                "level1": {"level2": {"level3": {"a": 1, "b": 3, "c": 4}}}
            }))
        );
    }

    #[test]
    fn test_merge_all() {
        let values = [
            map(json!({"a": 1})),
            map(json!({"b": 2})),
            map(json!({"a": 3, "c": 4})),
        ];
        let result = deep_merge_all(&values);
        assert_eq!(result, map(json!({"a": 3, "b": 2, "c": 4})));
    }

    #[test]
    fn test_overlay_replaces_primitive_with_mapping() {
        let base = map(json!({"value": 42}));
        let overlay = map(json!({"value": {"nested": true}}));
        let result = deep_merge(&base, &overlay);
        assert_eq!(result, map(json!({"value": {"nested": true}})));
    }

    #[test]
    fn test_overlay_replaces_mapping_with_primitive() {
        let base = map(json!({"value": {"nested": true}}));
        let overlay = map(json!({"value": 42}));
        let result = deep_merge(&base, &overlay);
        assert_eq!(result, map(json!({"value": 42})));
    }

    #[test]
    fn test_merge_layers_precedence() {
        let default = map(json!({"title": "default", "nested": {"name": "n", "value": 42}}));
        let user = map(json!({"title": "user", "nested": {"name": "u"}}));
        let project = map(json!({"title": "project", "nested": {"value": 999}}));

        let all = merge_layers(&default, Some(&user), Some(&project));
        assert_eq!(
            all,
            map(json!({"title": "project", "nested": {"name": "u", "value": 999}}))
        );

        let no_project = merge_layers(&default, Some(&user), None);
        assert_eq!(no_project["title"], "user");

        let defaults_only = merge_layers(&default, None, None);
        assert_eq!(defaults_only, default);
    }
}

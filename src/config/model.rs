//! Uniform model over the three schema kinds.
//!
//! A [`ConfigModel`] wraps one schema and one concrete value and offers the
//! same read/update/merge operations regardless of the schema kind. Besides
//! the full value it remembers which fields its layer set explicitly, so
//! merging a sparse layer never resets sibling fields to their defaults.

use super::Mapping;
use super::merge::deep_merge;
use super::schema::{Record, Schema, SchemaKind};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Named-field lookup shared by exported records and mappings.
pub trait FieldAccess {
    /// Get the field called `name`, if this value has one.
    fn field(&self, name: &str) -> Option<&Value>;
}

impl FieldAccess for Mapping {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl FieldAccess for Value {
    fn field(&self, name: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(name))
    }
}

/// A configuration value bound to its schema.
#[derive(Debug, Clone)]
pub struct ConfigModel<T> {
    schema: Schema<T>,
    model: T,
    /// Fields set explicitly by this layer (sparse).
    overrides: Mapping,
}

/// Outcome of tentatively assigning one field.
enum FieldCheck {
    Accepted,
    Unknown,
    Invalid(String),
}

impl<T: Record> ConfigModel<T> {
    /// Build a model from `data`, or the schema's defaults when `data` is `None`.
    ///
    /// Never fails: data the schema rejects is logged and replaced by defaults.
    pub fn from_schema(schema: &Schema<T>, data: Option<&Mapping>) -> Self {
        let (model, overrides) = match schema.kind() {
            SchemaKind::RecordStrict => build_strict(schema, data),
            SchemaKind::RecordPlain => build_plain(data),
            SchemaKind::Mapping => build_mapping(schema, data),
        };
        Self {
            schema: schema.clone(),
            model,
            overrides,
        }
    }

    /// The schema kind of this model.
    pub fn kind(&self) -> SchemaKind {
        self.schema.kind()
    }

    /// The schema this model was built from.
    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    /// Get the underlying value.
    pub fn model(&self) -> &T {
        &self.model
    }

    /// Consume the model and return the underlying value.
    pub fn into_model(self) -> T {
        self.model
    }

    /// Fields this layer set explicitly.
    pub fn overrides(&self) -> &Mapping {
        &self.overrides
    }

    /// Export the full value as a mapping. Nested records become nested mappings.
    pub fn to_mapping(&self) -> Mapping {
        export(&self.model)
    }

    /// Get a value by dotted key (`"nested.name"`).
    ///
    /// Returns `None` as soon as a segment is missing.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        let root = self.to_mapping();
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut current = root.field(first)?;
        for segment in segments {
            current = current.field(segment)?;
        }
        Some(current.clone())
    }

    /// Get a value by dotted key and deserialize it into `V`.
    pub fn get<V: DeserializeOwned>(&self, key: &str) -> Option<V> {
        self.get_value(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Apply a patch.
    ///
    /// For records, each known field is overwritten, except that a nested
    /// mapping patch onto a nested record assigns its keys one by one. Unknown
    /// fields are ignored. For mappings the patch is applied one level deep.
    pub fn update(&mut self, patch: &Mapping) {
        match self.kind() {
            SchemaKind::RecordStrict | SchemaKind::RecordPlain => {
                let mut root = self.to_mapping();
                let mut overrides = self.overrides.clone();
                for (key, value) in patch {
                    let Some(existing) = root.get(key) else {
                        debug!(field = %key, "Ignoring unknown field in update");
                        continue;
                    };
                    let existing_is_mapping = existing.is_object();
                    match value {
                        Value::Object(nested) if existing_is_mapping => {
                            for (nested_key, nested_value) in nested {
                                let path = [key.clone(), nested_key.clone()];
                                assign_checked::<T>(
                                    &mut root,
                                    &mut overrides,
                                    &path,
                                    nested_value.clone(),
                                );
                            }
                        }
                        _ => {
                            assign_checked::<T>(
                                &mut root,
                                &mut overrides,
                                &[key.clone()],
                                value.clone(),
                            );
                        }
                    }
                }
                self.commit(root, overrides);
            }
            SchemaKind::Mapping => {
                let mut root = self.to_mapping();
                let mut overrides = self.overrides.clone();
                for (key, value) in patch {
                    root.insert(key.clone(), value.clone());
                    overrides.insert(key.clone(), value.clone());
                }
                self.commit(root, overrides);
            }
        }
    }

    /// Set a single value by dotted key, creating intermediate mappings.
    ///
    /// Returns `false` when the schema does not accept the value.
    pub fn set_value(&mut self, key: &str, value: Value) -> bool {
        let path: Vec<String> = key.split('.').map(str::to_string).collect();
        let mut root = self.to_mapping();
        let mut overrides = self.overrides.clone();

        let accepted = match self.kind() {
            SchemaKind::RecordStrict | SchemaKind::RecordPlain => {
                if !root.contains_key(&path[0]) {
                    debug!(key = %key, "Ignoring unknown field in set");
                    return false;
                }
                assign_checked::<T>(&mut root, &mut overrides, &path, value)
            }
            SchemaKind::Mapping => {
                assign(&mut root, &path, value.clone());
                assign(&mut overrides, &path, value);
                true
            }
        };

        accepted && self.commit(root, overrides)
    }

    /// Merge with another model of the same schema; `other` wins.
    ///
    /// Only the fields `other` set explicitly are laid over this model, so a
    /// sparse layer keeps the values beneath it.
    pub fn merge(&self, other: &Self) -> Self {
        debug_assert_eq!(
            self.kind(),
            other.kind(),
            "merging models built from different schemas"
        );
        let merged = deep_merge(&self.to_mapping(), other.overrides());
        let mut result = Self::from_schema(&self.schema, Some(&merged));
        result.overrides = deep_merge(&self.overrides, &other.overrides);
        result
    }

    /// Rebuild the value from an edited mapping. Validated records keep their
    /// previous value when the edit fails validation.
    fn commit(&mut self, root: Mapping, overrides: Mapping) -> bool {
        let model = match serde_json::from_value::<T>(Value::Object(root)) {
            Ok(model) => model,
            Err(e) => {
                warn!(error = %e, "Config update rejected; keeping previous values");
                return false;
            }
        };

        if let Some(validator) = self.schema.validator() {
            if let Err(e) = validator(&model) {
                warn!(error = %e, "Config update failed validation; keeping previous values");
                return false;
            }
        }

        self.model = model;
        self.overrides = overrides;
        true
    }
}

fn build_strict<T: Record>(schema: &Schema<T>, data: Option<&Mapping>) -> (T, Mapping) {
    let Some(data) = data else {
        return (T::default(), Mapping::new());
    };

    let candidate = deep_merge(&export(&T::default()), data);
    let model = match serde_json::from_value::<T>(Value::Object(candidate)) {
        Ok(model) => model,
        Err(e) => {
            warn!(error = %e, "Failed to build config record; using defaults");
            return (T::default(), Mapping::new());
        }
    };

    if let Some(validator) = schema.validator() {
        if let Err(e) = validator(&model) {
            warn!(error = %e, "Config record failed validation; using defaults");
            return (T::default(), Mapping::new());
        }
    }

    let overrides = restrict(data, &export(&model));
    (model, overrides)
}

fn build_plain<T: Record>(data: Option<&Mapping>) -> (T, Mapping) {
    let Some(data) = data else {
        return (T::default(), Mapping::new());
    };

    let mut root = export(&T::default());
    let mut overrides = Mapping::new();
    let mut path = Vec::new();
    resolve_fields::<T>(&mut root, &mut overrides, &mut path, data);

    match serde_json::from_value::<T>(Value::Object(root)) {
        Ok(model) => (model, overrides),
        Err(e) => {
            warn!(error = %e, "Failed to build config record; using defaults");
            (T::default(), Mapping::new())
        }
    }
}

fn build_mapping<T: Record>(schema: &Schema<T>, data: Option<&Mapping>) -> (T, Mapping) {
    let (source, overrides) = match data {
        Some(data) => (data.clone(), data.clone()),
        None => (schema.template().cloned().unwrap_or_default(), Mapping::new()),
    };

    match serde_json::from_value::<T>(Value::Object(source)) {
        Ok(model) => (model, overrides),
        Err(e) => {
            warn!(error = %e, "Failed to build config mapping; starting empty");
            (T::default(), Mapping::new())
        }
    }
}

/// Depth-first, field-by-field resolution of `data` onto `root`.
fn resolve_fields<T: Record>(
    root: &mut Mapping,
    overrides: &mut Mapping,
    path: &mut Vec<String>,
    data: &Mapping,
) {
    for (key, value) in data {
        path.push(key.clone());
        let descend = matches!(
            (lookup(root, path), value),
            (Some(Value::Object(_)), Value::Object(_))
        );
        match value {
            Value::Object(nested) if descend => {
                resolve_fields::<T>(root, overrides, path, nested);
            }
            _ => {
                assign_checked::<T>(root, overrides, path, value.clone());
            }
        }
        path.pop();
    }
}

/// Assign `value` at `path` if `T` still builds and keeps the field.
/// Accepted assignments are recorded in `overrides`.
fn assign_checked<T: Record>(
    root: &mut Mapping,
    overrides: &mut Mapping,
    path: &[String],
    value: Value,
) -> bool {
    let snapshot = root.clone();
    assign(root, path, value.clone());
    match check_field::<T>(root, path) {
        FieldCheck::Accepted => {
            assign(overrides, path, value);
            true
        }
        FieldCheck::Unknown => {
            debug!(field = %path.join("."), "Skipping unknown config field");
            *root = snapshot;
            false
        }
        FieldCheck::Invalid(reason) => {
            warn!(
                field = %path.join("."),
                error = %reason,
                "Invalid config field; keeping previous value"
            );
            *root = snapshot;
            false
        }
    }
}

fn check_field<T: Record>(root: &Mapping, path: &[String]) -> FieldCheck {
    match serde_json::from_value::<T>(Value::Object(root.clone())) {
        Ok(model) => {
            if lookup(&export(&model), path).is_some() {
                FieldCheck::Accepted
            } else {
                FieldCheck::Unknown
            }
        }
        Err(e) => FieldCheck::Invalid(e.to_string()),
    }
}

/// Export a value as a mapping; non-mapping exports become empty.
fn export<T: Record>(value: &T) -> Mapping {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Mapping::new(),
        Err(e) => {
            warn!(error = %e, "Failed to export config value");
            Mapping::new()
        }
    }
}

fn lookup<'a>(root: &'a Mapping, path: &[String]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = root.field(first)?;
    for segment in rest {
        current = current.field(segment)?;
    }
    Some(current)
}

/// Set `value` at `path`, replacing non-mapping intermediates with mappings.
fn assign(root: &mut Mapping, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = root;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Mapping::new()));
        if !slot.is_object() {
            *slot = Value::Object(Mapping::new());
        }
        let Value::Object(next) = slot else {
            return;
        };
        current = next;
    }
    current.insert(last.clone(), value);
}

/// Keep only the parts of `data` that survive in `shape`.
fn restrict(data: &Mapping, shape: &Mapping) -> Mapping {
    let mut result = Mapping::new();
    for (key, value) in data {
        match (value, shape.get(key)) {
            (Value::Object(nested), Some(Value::Object(nested_shape))) => {
                result.insert(key.clone(), Value::Object(restrict(nested, nested_shape)));
            }
            (_, Some(_)) => {
                result.insert(key.clone(), value.clone());
            }
            (_, None) => {}
        }
    }
    result
}

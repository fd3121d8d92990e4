//! Schema descriptors for configuration values.

use super::Mapping;
use super::files::value_kind;
use crate::error::{ConfigError, ConfigResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// Values that can back a configuration layer.
///
/// `T::default()` is the "no data" construction and must build fresh
/// sub-values on every call.
pub trait Record: Serialize + DeserializeOwned + Default + Clone {}

impl<T> Record for T where T: Serialize + DeserializeOwned + Default + Clone {}

/// Validation hook for [`SchemaKind::RecordStrict`] schemas.
pub type Validator<T> = fn(&T) -> anyhow::Result<()>;

/// The closed set of schema kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    /// Record built through serde in one step, then validated
    RecordStrict,
    /// Record resolved field by field from the data
    RecordPlain,
    /// Free-form key/value mapping
    Mapping,
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaKind::RecordStrict => write!(f, "validated record"),
            SchemaKind::RecordPlain => write!(f, "record"),
            SchemaKind::Mapping => write!(f, "mapping"),
        }
    }
}

enum Shape<T> {
    Strict(Validator<T>),
    Plain,
    Mapping(Mapping),
}

/// Describes how raw layer data becomes a value of type `T`.
///
/// The kind is fixed when the descriptor is built.
pub struct Schema<T> {
    shape: Shape<T>,
}

impl<T> Clone for Schema<T> {
    fn clone(&self) -> Self {
        let shape = match &self.shape {
            Shape::Strict(validator) => Shape::Strict(*validator),
            Shape::Plain => Shape::Plain,
            Shape::Mapping(template) => Shape::Mapping(template.clone()),
        };
        Self { shape }
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Schema");
        debug.field("kind", &self.kind());
        if let Shape::Mapping(template) = &self.shape {
            debug.field("template", template);
        }
        debug.finish()
    }
}

impl<T> Schema<T> {
    /// The schema kind.
    pub fn kind(&self) -> SchemaKind {
        match self.shape {
            Shape::Strict(_) => SchemaKind::RecordStrict,
            Shape::Plain => SchemaKind::RecordPlain,
            Shape::Mapping(_) => SchemaKind::Mapping,
        }
    }

    pub(crate) fn validator(&self) -> Option<Validator<T>> {
        match self.shape {
            Shape::Strict(validator) => Some(validator),
            _ => None,
        }
    }

    pub(crate) fn template(&self) -> Option<&Mapping> {
        match &self.shape {
            Shape::Mapping(template) => Some(template),
            _ => None,
        }
    }
}

impl<T: Record> Schema<T> {
    /// A plain record schema.
    ///
    /// Fails with `UnsupportedSchemaKind` when `T` does not export as a mapping
    /// (for example a bare number or a list).
    pub fn record() -> ConfigResult<Self> {
        check_record_shape::<T>()?;
        Ok(Self { shape: Shape::Plain })
    }

    /// A validated record schema. `validator` runs after every construction.
    pub fn validated(validator: Validator<T>) -> ConfigResult<Self> {
        check_record_shape::<T>()?;
        Ok(Self {
            shape: Shape::Strict(validator),
        })
    }

    /// A free-form mapping schema seeded with `template` (a mapping or null).
    ///
    /// Fails with `UnsupportedSchemaKind` when the template is not a mapping or
    /// when `T` cannot be built from one.
    pub fn mapping(template: Value) -> ConfigResult<Self> {
        let template = match template {
            Value::Object(map) => map,
            Value::Null => Mapping::new(),
            other => {
                return Err(ConfigError::unsupported_schema(&format!(
                    "mapping template is {}",
                    value_kind(&other)
                )));
            }
        };

        if let Err(e) = serde_json::from_value::<T>(Value::Object(template.clone())) {
            return Err(ConfigError::unsupported_schema(&format!(
                "{} cannot hold a mapping: {}",
                std::any::type_name::<T>(),
                e
            )));
        }

        Ok(Self {
            shape: Shape::Mapping(template),
        })
    }
}

impl Schema<Mapping> {
    /// An empty free-form mapping schema.
    pub fn free_form() -> Self {
        Self {
            shape: Shape::Mapping(Mapping::new()),
        }
    }
}

fn check_record_shape<T: Record>() -> ConfigResult<()> {
    match serde_json::to_value(T::default()) {
        Ok(Value::Object(_)) => Ok(()),
        Ok(other) => Err(ConfigError::unsupported_schema(&format!(
            "{} exports as {}, expected a mapping",
            std::any::type_name::<T>(),
            value_kind(&other)
        ))),
        Err(e) => Err(ConfigError::unsupported_schema(&format!(
            "{} cannot be exported: {}",
            std::any::type_name::<T>(),
            e
        ))),
    }
}

//! Layered configuration system.
//!
//! Consolidates configuration from three layers with field-by-field merging:
//! 1. **Default** - Built from the schema with no data
//! 2. **User** - `~/.zeeland/<name>/config.yaml`
//! 3. **Project** - `<project root>/.<name>/config.yaml`
//!
//! Later layers win. Nested mappings merge key by key; scalars and lists are
//! replaced wholesale.
//!
//! ## Schemas
//! A [`Schema`] describes how a layer's data becomes a typed value:
//! - [`Schema::validated`] - a record built through serde, then validated
//! - [`Schema::record`] - a record resolved field by field
//! - [`Schema::mapping`] - a free-form mapping

mod files;
mod manager;
mod merge;
mod model;
mod schema;

pub use files::{read_structured, write_if_absent, write_structured};
pub use manager::{AutoCreate, ConfigLayer, ConfigManager, DEFAULT_VERSION, MissingPolicy};
pub use merge::{deep_merge, deep_merge_all, merge_layers};
pub use model::{ConfigModel, FieldAccess};
pub use schema::{Record, Schema, SchemaKind, Validator};

/// A free-form configuration mapping.
pub type Mapping = serde_json::Map<String, serde_json::Value>;

//! Configuration manager with layer-based merging.
//!
//! Loads the default, user and project layers, merges them in that order and
//! caches every layer until an update invalidates them.

use super::Mapping;
use super::files::{read_structured, write_if_absent, write_structured};
use super::model::ConfigModel;
use super::schema::{Record, Schema, SchemaKind};
use crate::error::{ConfigError, ConfigResult};
use crate::paths::{ConfigPaths, project_config_path_in};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Version recorded when none is given.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Configuration layer, lowest to highest priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigLayer {
    /// Built from the schema with no data
    Default = 0,
    /// `~/.zeeland/<name>/config.yaml`
    User = 1,
    /// `<project root>/.<name>/config.yaml`
    Project = 2,
}

impl fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLayer::Default => write!(f, "default"),
            ConfigLayer::User => write!(f, "user"),
            ConfigLayer::Project => write!(f, "project"),
        }
    }
}

/// Which layer files `load()` creates from defaults when they are missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutoCreate {
    pub user: bool,
    pub project: bool,
}

impl AutoCreate {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn both() -> Self {
        Self {
            user: true,
            project: true,
        }
    }

    pub fn user_only() -> Self {
        Self {
            user: true,
            project: false,
        }
    }

    pub fn project_only() -> Self {
        Self {
            user: false,
            project: true,
        }
    }
}

/// What `load()` does when no layer file exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Fail with `NoConfigurationFound`
    #[default]
    Error,
    /// Return the schema defaults
    UseDefaults,
}

/// Loads, merges and persists layered configuration for one name.
#[derive(Debug)]
pub struct ConfigManager<T> {
    name: String,
    schema: Schema<T>,
    version: String,
    auto_create: AutoCreate,
    missing_policy: MissingPolicy,
    paths: ConfigPaths,

    // Cached layers
    default_config: Option<ConfigModel<T>>,
    user_config: Option<ConfigModel<T>>,
    project_config: Option<ConfigModel<T>>,
    config: Option<ConfigModel<T>>,
}

impl<T: Record> ConfigManager<T> {
    /// Create a manager for `name`, discovering the user and project paths.
    ///
    /// No files are touched until the first load or update.
    pub fn new(name: &str, schema: Schema<T>) -> Self {
        let paths = ConfigPaths::discover(name);
        debug!(
            name = %name,
            user = %paths.user_config.display(),
            project_root = ?paths.project_root,
            "Resolved config paths"
        );
        Self {
            name: name.to_string(),
            schema,
            version: DEFAULT_VERSION.to_string(),
            auto_create: AutoCreate::none(),
            missing_policy: MissingPolicy::Error,
            paths,
            default_config: None,
            user_config: None,
            project_config: None,
            config: None,
        }
    }

    /// Set the informational schema version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set which layer files are created when missing.
    pub fn with_auto_create(mut self, auto_create: AutoCreate) -> Self {
        self.auto_create = auto_create;
        self
    }

    /// Set what happens when no layer file exists.
    pub fn with_missing_policy(mut self, policy: MissingPolicy) -> Self {
        self.missing_policy = policy;
        self
    }

    /// Use explicit file locations instead of the discovered ones.
    pub fn with_paths(mut self, paths: ConfigPaths) -> Self {
        self.paths = paths;
        self.invalidate_all();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn schema_kind(&self) -> SchemaKind {
        self.schema.kind()
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn user_config_path(&self) -> &Path {
        &self.paths.user_config
    }

    pub fn project_config_path(&self) -> Option<&Path> {
        self.paths.project_config.as_deref()
    }

    pub fn project_root(&self) -> Option<&Path> {
        self.paths.project_root.as_deref()
    }

    /// Load and merge all layers: default, then user, then project.
    ///
    /// Cached user and project layers are reused; use [`reload`](Self::reload)
    /// to re-read the files.
    pub fn load(&mut self) -> ConfigResult<&T> {
        let merged = self.build_merged()?;
        Ok(self.config.insert(merged).model())
    }

    /// Drop every cached layer and load again from disk.
    pub fn reload(&mut self) -> ConfigResult<&T> {
        self.invalidate_all();
        self.load()
    }

    /// The effective configuration, loading it on first access.
    pub fn config(&mut self) -> ConfigResult<&T> {
        Ok(self.config_model()?.model())
    }

    /// The merged model, loading it on first access.
    pub fn config_model(&mut self) -> ConfigResult<&ConfigModel<T>> {
        let merged = match self.config.take() {
            Some(merged) => merged,
            None => self.build_merged()?,
        };
        Ok(&*self.config.insert(merged))
    }

    /// The schema defaults. Never reads files.
    pub fn get_default_config(&mut self) -> &T {
        self.default_model().model()
    }

    /// The user layer, or `None` when its file is absent, empty or unreadable.
    pub fn get_user_config(&mut self) -> Option<&T> {
        self.layer(ConfigLayer::User).map(ConfigModel::model)
    }

    /// The project layer, or `None` when its file is absent, empty or unreadable.
    pub fn get_project_config(&mut self) -> Option<&T> {
        self.layer(ConfigLayer::Project).map(ConfigModel::model)
    }

    /// The model for one layer, loading it lazily. Never merges.
    pub fn layer(&mut self, layer: ConfigLayer) -> Option<&ConfigModel<T>> {
        match layer {
            ConfigLayer::Default => Some(self.default_model()),
            ConfigLayer::User => {
                if self.user_config.is_none() {
                    self.user_config = self.read_layer(ConfigLayer::User);
                }
                self.user_config.as_ref()
            }
            ConfigLayer::Project => {
                if self.project_config.is_none() {
                    self.project_config = self.read_layer(ConfigLayer::Project);
                }
                self.project_config.as_ref()
            }
        }
    }

    /// Layers that contribute to the effective configuration.
    pub fn contributing_layers(&mut self) -> Vec<ConfigLayer> {
        let mut layers = vec![ConfigLayer::Default];
        if self.layer(ConfigLayer::User).is_some() {
            layers.push(ConfigLayer::User);
        }
        if self.layer(ConfigLayer::Project).is_some() {
            layers.push(ConfigLayer::Project);
        }
        layers
    }

    /// Apply `patch` to the user layer and write it back.
    ///
    /// Fails with `ParseError` (and leaves the file alone) when the existing
    /// file cannot be parsed.
    pub fn update_user_config(&mut self, patch: &Mapping) -> ConfigResult<()> {
        let path = self.paths.user_config.clone();
        let current = self.user_config.take();
        self.update_layer_file(ConfigLayer::User, &path, current, |model| {
            model.update(patch);
            true
        })?;
        self.invalidate_all();
        Ok(())
    }

    /// Apply `patch` to the project layer and write it back.
    ///
    /// Only fields the project layer sets are written, so fields it leaves
    /// alone keep resolving from the user layer. Fails with `NoProjectRoot`
    /// when no project root was found.
    pub fn update_project_config(&mut self, patch: &Mapping) -> ConfigResult<()> {
        let path = self
            .paths
            .project_config
            .clone()
            .ok_or_else(ConfigError::no_project_root)?;
        let current = self.project_config.take();
        self.update_layer_file(ConfigLayer::Project, &path, current, |model| {
            model.update(patch);
            true
        })?;
        self.invalidate_all();
        Ok(())
    }

    /// Set one dotted key in the user layer and write it back.
    ///
    /// Returns `false` (and writes nothing) when the schema rejects the value.
    pub fn set_user_value(&mut self, key: &str, value: Value) -> ConfigResult<bool> {
        let path = self.paths.user_config.clone();
        let current = self.user_config.take();
        let applied = self.update_layer_file(ConfigLayer::User, &path, current, |model| {
            model.set_value(key, value)
        })?;
        self.invalidate_all();
        Ok(applied)
    }

    /// Set one dotted key in the project layer and write it back.
    pub fn set_project_value(&mut self, key: &str, value: Value) -> ConfigResult<bool> {
        let path = self
            .paths
            .project_config
            .clone()
            .ok_or_else(ConfigError::no_project_root)?;
        let current = self.project_config.take();
        let applied = self.update_layer_file(ConfigLayer::Project, &path, current, |model| {
            model.set_value(key, value)
        })?;
        self.invalidate_all();
        Ok(applied)
    }

    /// Write the default configuration to the user file if it does not exist.
    pub fn create_user_template(&self) -> ConfigResult<PathBuf> {
        let path = self.paths.user_config.clone();
        write_if_absent(&path, &self.default_mapping())?;
        Ok(path)
    }

    /// Write the default configuration to `<root>/.<name>/config.yaml` if it
    /// does not exist.
    ///
    /// `root` defaults to the discovered project root, then the current directory.
    pub fn create_project_template(&self, root: Option<&Path>) -> ConfigResult<PathBuf> {
        let root = match root.or(self.paths.project_root.as_deref()) {
            Some(root) => root.to_path_buf(),
            None => std::env::current_dir().map_err(|e| ConfigError::io(Path::new("."), e))?,
        };
        let path = project_config_path_in(&root, &self.name);
        write_if_absent(&path, &self.default_mapping())?;
        Ok(path)
    }

    fn default_model(&mut self) -> &ConfigModel<T> {
        self.default_config
            .get_or_insert_with(|| ConfigModel::from_schema(&self.schema, None))
    }

    fn default_mapping(&self) -> Mapping {
        ConfigModel::from_schema(&self.schema, None).to_mapping()
    }

    fn build_merged(&mut self) -> ConfigResult<ConfigModel<T>> {
        let default_model = ConfigModel::from_schema(&self.schema, None);

        self.auto_create_missing()?;

        if !self.paths.user_exists()
            && !self.paths.project_exists()
            && self.missing_policy == MissingPolicy::Error
        {
            return Err(ConfigError::no_configuration(
                &self.paths.user_config,
                self.paths.project_config.as_deref(),
            ));
        }

        if self.user_config.is_none() {
            self.user_config = self.read_layer(ConfigLayer::User);
        }
        if self.project_config.is_none() {
            self.project_config = self.read_layer(ConfigLayer::Project);
        }

        let mut merged = default_model.clone();
        if let Some(user) = &self.user_config {
            merged = merged.merge(user);
        }
        if let Some(project) = &self.project_config {
            merged = merged.merge(project);
        }

        self.default_config = Some(default_model);
        debug!(name = %self.name, "Merged configuration layers");
        Ok(merged)
    }

    fn auto_create_missing(&self) -> ConfigResult<()> {
        if self.auto_create.user && !self.paths.user_exists() {
            self.create_user_template()?;
        }
        if self.auto_create.project && !self.paths.project_exists() {
            // An empty project layer so the user layer stays visible
            if let Some(path) = self.paths.project_config.as_deref() {
                write_if_absent(path, &Mapping::new())?;
            }
        }
        Ok(())
    }

    fn layer_path(&self, layer: ConfigLayer) -> Option<&Path> {
        match layer {
            ConfigLayer::Default => None,
            ConfigLayer::User => Some(&self.paths.user_config),
            ConfigLayer::Project => self.paths.project_config.as_deref(),
        }
    }

    /// Read one layer file. Failures are logged and read as "absent".
    fn read_layer(&self, layer: ConfigLayer) -> Option<ConfigModel<T>> {
        let path = self.layer_path(layer)?;
        match read_structured(path) {
            Ok(Some(data)) if !data.is_empty() => {
                debug!(layer = %layer, path = %path.display(), "Loaded config layer");
                Some(ConfigModel::from_schema(&self.schema, Some(&data)))
            }
            Ok(_) => None,
            Err(e) => {
                warn!(layer = %layer, error = %e, "Failed to load config layer; treating it as absent");
                None
            }
        }
    }

    /// Edit one layer and write it back.
    ///
    /// Unlike loading, a file that exists but cannot be parsed is an error
    /// here so it is never overwritten. The user file is written in full; the
    /// project file only keeps the fields it sets.
    fn update_layer_file(
        &self,
        layer: ConfigLayer,
        path: &Path,
        current: Option<ConfigModel<T>>,
        edit: impl FnOnce(&mut ConfigModel<T>) -> bool,
    ) -> ConfigResult<bool> {
        let mut model = match current {
            Some(model) => model,
            None => {
                let data = read_structured(path)?;
                ConfigModel::from_schema(&self.schema, data.as_ref())
            }
        };

        if !edit(&mut model) {
            return Ok(false);
        }

        let content = match layer {
            ConfigLayer::Project => model.overrides().clone(),
            _ => model.to_mapping(),
        };
        write_structured(path, &content)?;
        info!(layer = %layer, path = %path.display(), "Updated config file");
        Ok(true)
    }

    fn invalidate_all(&mut self) {
        self.user_config = None;
        self.project_config = None;
        self.config = None;
    }
}

//! Configuration file locations.
//!
//! - User files live under the home directory: `~/.zeeland/<name>/config.yaml`
//! - Project files live under the project root: `<root>/.<name>/config.yaml`
//!
//! The project root is the nearest ancestor of the starting directory that
//! contains one of [`PROJECT_MARKERS`].

use std::path::{Path, PathBuf};

/// Directory under the home directory that namespaces user config files.
pub const USER_NAMESPACE_DIR: &str = ".zeeland";

/// File name used for every configuration layer.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Files or directories that mark a project root, checked in order.
pub const PROJECT_MARKERS: [&str; 5] = [
    ".git",
    "pyproject.toml",
    "setup.py",
    "package.json",
    "Cargo.toml",
];

/// Get the path to the user-level configuration file for `name`.
///
/// Falls back to the current directory when no home directory is known.
pub fn user_config_path(name: &str) -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    user_config_path_in(&home, name)
}

/// User-level configuration path under an explicit home directory.
pub fn user_config_path_in(home: &Path, name: &str) -> PathBuf {
    home.join(USER_NAMESPACE_DIR).join(name).join(CONFIG_FILE_NAME)
}

/// Find the project root by walking up from `start` (default: the current
/// working directory) until a directory containing a project marker is found.
///
/// Returns `None` when the filesystem root is passed without a match.
pub fn find_project_root(start: Option<&Path>) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok();
    let start = match start {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => cwd?.join(path),
        None => cwd?,
    };

    find_marker_dir(&start, None)
}

/// Nearest ancestor of `start` holding a project marker. The walk stops after
/// `boundary` when one is given.
fn find_marker_dir(start: &Path, boundary: Option<&Path>) -> Option<PathBuf> {
    for dir in start.ancestors() {
        if PROJECT_MARKERS.iter().any(|marker| dir.join(marker).exists()) {
            return Some(dir.to_path_buf());
        }
        if boundary == Some(dir) {
            break;
        }
    }
    None
}

/// Get the path to the project-level configuration file for `name`.
///
/// When `root` is not given the project root is discovered from the current
/// directory. Returns `None` if there is no project root.
pub fn project_config_path(name: &str, root: Option<&Path>) -> Option<PathBuf> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => find_project_root(None)?,
    };
    Some(project_config_path_in(&root, name))
}

/// Project-level configuration path under an explicit root.
pub fn project_config_path_in(root: &Path, name: &str) -> PathBuf {
    root.join(format!(".{}", name)).join(CONFIG_FILE_NAME)
}

/// Resolved file locations for one configuration name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// User-level config file (may not exist yet)
    pub user_config: PathBuf,
    /// Discovered project root, if any
    pub project_root: Option<PathBuf>,
    /// Project-level config file, present only when there is a project root
    pub project_config: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover paths from the home directory and the current directory.
    pub fn discover(name: &str) -> Self {
        let project_root = find_project_root(None);
        Self {
            user_config: user_config_path(name),
            project_config: project_root
                .as_deref()
                .map(|root| project_config_path_in(root, name)),
            project_root,
        }
    }

    /// Create paths with an explicit home directory and project root.
    pub fn with_dirs(name: &str, home: &Path, project_root: Option<PathBuf>) -> Self {
        Self {
            user_config: user_config_path_in(home, name),
            project_config: project_root
                .as_deref()
                .map(|root| project_config_path_in(root, name)),
            project_root,
        }
    }

    /// Whether the user-level file currently exists.
    pub fn user_exists(&self) -> bool {
        self.user_config.exists()
    }

    /// Whether the project-level file currently exists.
    pub fn project_exists(&self) -> bool {
        self.project_config.as_deref().is_some_and(Path::exists)
    }
}

//! Config file discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `~/.config/reprise/config.toml` (user config)
//! 2. `./reprise.toml` (project-local)
//! 3. CLI arguments (handled externally)

use std::path::{Path, PathBuf};

use crate::{ConfigError, RepriseConfig, Result};

/// Default config filename for project-local config.
const PROJECT_CONFIG_FILE: &str = "reprise.toml";

/// Default config filename within the user config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for config directory resolution.
const APP_NAME: &str = "reprise";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "REPRISE_CONFIG_DIR";

/// Tracks where each config layer was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the config file.
    pub path: PathBuf,
    /// Whether the file was found and loaded.
    pub loaded: bool,
}

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: RepriseConfig,
    /// Sources that were checked, in order of precedence (lowest first).
    pub sources: Vec<ConfigSource>,
    /// Warnings generated during loading.
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Get paths of sources that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Load configuration by discovering and merging all config layers.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None)
}

/// Load configuration with explicit control over the user config directory.
///
/// `config_dir` overrides both `REPRISE_CONFIG_DIR` and the platform default.
/// A layer that fails to parse is skipped and reported in `warnings`.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let mut loaded = LoadedConfig {
        config: RepriseConfig::new(),
        sources: Vec::new(),
        warnings: Vec::new(),
    };

    for path in layer_paths(project_dir, config_dir) {
        let layer = path.is_file().then(|| load_config_file(&path));
        let found = match layer {
            Some(Ok(layer)) => {
                loaded.config.merge(layer);
                true
            }
            Some(Err(e)) => {
                loaded
                    .warnings
                    .push(format!("Failed to load {}: {}", path.display(), e));
                false
            }
            None => false,
        };
        loaded.sources.push(ConfigSource {
            path,
            loaded: found,
        });
    }

    check_cookie_security(&loaded.config, &mut loaded.warnings);
    Ok(loaded)
}

/// Candidate config files, lowest precedence first.
fn layer_paths(project_dir: Option<&Path>, config_dir: Option<&Path>) -> Vec<PathBuf> {
    let user = config_dir
        .map(Path::to_path_buf)
        .or_else(xdg_config_dir)
        .map(|dir| dir.join(USER_CONFIG_FILE));
    let project = project_dir
        .unwrap_or_else(|| Path::new("."))
        .join(PROJECT_CONFIG_FILE);
    user.into_iter().chain([project]).collect()
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<RepriseConfig> {
    std::fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })
        .and_then(|contents| RepriseConfig::from_toml(&contents))
}

/// Save configuration to a file, creating missing parent directories.
pub fn save_config(config: &RepriseConfig, path: &Path) -> Result<()> {
    let write_error = |at: &Path| {
        let path = at.display().to_string();
        move |source| ConfigError::WriteFile { path, source }
    };

    let contents = config.to_toml()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error(parent))?;
    }
    std::fs::write(path, contents).map_err(write_error(path))
}

/// Get the user config file path.
pub fn xdg_config_path() -> Option<PathBuf> {
    Some(xdg_config_dir()?.join(USER_CONFIG_FILE))
}

/// Get the user config directory for reprise.
///
/// `REPRISE_CONFIG_DIR` wins when set and non-empty.
pub fn xdg_config_dir() -> Option<PathBuf> {
    std::env::var_os(CONFIG_DIR_ENV)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(dirs::config_dir()?.join(APP_NAME)))
}

/// Warn when session cookies would travel in clear text off the loopback interface.
fn check_cookie_security(config: &RepriseConfig, warnings: &mut Vec<String>) {
    let server = config.server();
    if !server.is_loopback() && !server.secure_cookie {
        warnings.push(format!(
            "[server] binds to {} without secure_cookie. \
             Session cookies will be sent over plain HTTP.",
            server.bind
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server]\nport = 7000\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.server().port, 7000);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config_file(Path::new("/nonexistent/reprise.toml"));
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn test_project_overrides_user() {
        let user_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();
        fs::write(
            user_dir.path().join(USER_CONFIG_FILE),
            "[server]\nport = 7000\n\n[stash]\nexpiration = \"+5 minutes\"\n",
        )
        .unwrap();
        fs::write(
            project_dir.path().join(PROJECT_CONFIG_FILE),
            "[server]\nport = 7001\n",
        )
        .unwrap();

        let loaded =
            load_config_with_options(Some(project_dir.path()), Some(user_dir.path())).unwrap();

        assert_eq!(loaded.config.server().port, 7001);
        assert_eq!(loaded.config.stash().expiration.to_string(), "+5 minutes");
        assert_eq!(loaded.loaded_from().len(), 2);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_broken_layer_becomes_warning() {
        let user_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();
        fs::write(
            project_dir.path().join(PROJECT_CONFIG_FILE),
            "[stash]\nexpiration = \"whenever\"\n",
        )
        .unwrap();

        let loaded =
            load_config_with_options(Some(project_dir.path()), Some(user_dir.path())).unwrap();

        assert!(loaded.loaded_from().is_empty());
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("Failed to load"));
    }

    #[test]
    fn test_public_bind_without_secure_cookie_warns() {
        let user_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();
        fs::write(
            project_dir.path().join(PROJECT_CONFIG_FILE),
            "[server]\nbind = \"0.0.0.0\"\n",
        )
        .unwrap();

        let loaded =
            load_config_with_options(Some(project_dir.path()), Some(user_dir.path())).unwrap();

        assert!(loaded.warnings.iter().any(|w| w.contains("secure_cookie")));
    }

    #[test]
    fn test_missing_layers_are_listed_but_not_loaded() {
        let user_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();

        let loaded =
            load_config_with_options(Some(project_dir.path()), Some(user_dir.path())).unwrap();

        let paths: Vec<_> = loaded.sources.iter().map(|s| s.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                user_dir.path().join(USER_CONFIG_FILE),
                project_dir.path().join(PROJECT_CONFIG_FILE),
            ]
        );
        assert!(loaded.loaded_from().is_empty());
        assert_eq!(loaded.config, RepriseConfig::new());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        save_config(&RepriseConfig::with_defaults(), &path).unwrap();

        let reloaded = load_config_file(&path).unwrap();
        assert_eq!(reloaded, RepriseConfig::with_defaults());
    }
}

pub mod error;
pub mod region;
pub mod settings;

pub use error::*;
pub use region::{DEFAULT_REGION, KNOWN_REGIONS, resolve_region};
pub use settings::Settings;

use std::path::PathBuf;

const CONFIG_PATH_ENV: &str = "STACKFLOW_CONFIG_PATH";
const LOCAL_FILE: &str = "stackflow.yaml";
const LOCAL_DIR: &str = ".stackflow";
const DIR_FILE: &str = "config.yaml";

/// Per-user config directory (`~/.config/stackflow` on Linux)
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("stackflow"))
}

/// Find the settings file.
///
/// Search order:
/// 1. `STACKFLOW_CONFIG_PATH` (must exist when set)
/// 2. `./stackflow.yaml`
/// 3. `./.stackflow/config.yaml`
/// 4. `<config_dir>/stackflow/config.yaml`
///
/// Returns `None` when no file exists; callers fall back to defaults.
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV)
        && !config_path.is_empty()
    {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ConfigFileNotFound(path));
    }

    let current_dir = std::env::current_dir()?;

    let local = current_dir.join(LOCAL_FILE);
    if local.exists() {
        return Ok(Some(local));
    }

    let in_dir = current_dir.join(LOCAL_DIR).join(DIR_FILE);
    if in_dir.exists() {
        return Ok(Some(in_dir));
    }

    if let Ok(config_dir) = get_config_dir() {
        let global = config_dir.join(DIR_FILE);
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use std::path::Path;

    /// Run `f` inside `dir` with no settings file reachable from the environment
    fn in_dir<T>(dir: &Path, f: impl FnOnce() -> T) -> T {
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir).unwrap();
        let result = temp_env::with_vars(
            [
                (CONFIG_PATH_ENV, None::<&str>),
                ("XDG_CONFIG_HOME", Some(dir.join("xdg").to_str().unwrap())),
                ("HOME", Some(dir.to_str().unwrap())),
            ],
            f,
        );
        std::env::set_current_dir(original_dir).unwrap();
        result
    }

    #[test]
    fn test_get_config_dir() {
        let config_dir = get_config_dir().unwrap();
        assert!(config_dir.ends_with("stackflow"));
    }

    #[test]
    #[serial]
    fn test_find_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("stackflow.yaml"), "region: us-west-2\n").unwrap();

        let found = in_dir(temp_dir.path(), || find_config_file().unwrap()).unwrap();
        assert!(found.ends_with("stackflow.yaml"));
    }

    #[test]
    #[serial]
    fn test_current_dir_file_beats_dot_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dot_dir = temp_dir.path().join(".stackflow");
        fs::create_dir(&dot_dir).unwrap();
        fs::write(dot_dir.join("config.yaml"), "").unwrap();

        let found = in_dir(temp_dir.path(), || find_config_file().unwrap()).unwrap();
        assert!(found.ends_with(".stackflow/config.yaml"));

        fs::write(temp_dir.path().join("stackflow.yaml"), "").unwrap();
        let found = in_dir(temp_dir.path(), || find_config_file().unwrap()).unwrap();
        assert!(found.ends_with("stackflow.yaml"));
    }

    #[test]
    #[serial]
    fn test_env_var_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "profile: ops\n").unwrap();

        temp_env::with_var(CONFIG_PATH_ENV, Some(config_path.to_str().unwrap()), || {
            assert_eq!(find_config_file().unwrap(), Some(config_path.clone()));
            let settings = Settings::load().unwrap();
            assert_eq!(settings.profile.as_deref(), Some("ops"));
        });
    }

    #[test]
    #[serial]
    fn test_env_var_missing_file() {
        temp_env::with_var(CONFIG_PATH_ENV, Some("/nonexistent/stackflow.yaml"), || {
            assert!(matches!(
                find_config_file(),
                Err(ConfigError::ConfigFileNotFound(_))
            ));
        });
    }

    #[test]
    #[serial]
    fn test_nothing_found_loads_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        in_dir(temp_dir.path(), || {
            assert_eq!(find_config_file().unwrap(), None);
            assert_eq!(Settings::load().unwrap(), Settings::default());
        });
    }
}

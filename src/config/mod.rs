pub mod init;
mod schema;
mod validation;

pub use schema::{
    CompareConfig, Config, SourceConfig, SourceKind, ThemeSetting, DEFAULT_CACHE_TTL,
    DEFAULT_PAGE_SIZE,
};
pub use validation::validate_config;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/college-compare/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".config").join("college-compare"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.config/college-compare",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Get the default config file path (~/.config/college-compare/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// With `path` set the file must exist. Without it the default location is
/// tried and built-in defaults are used when nothing is there.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let (config_path, explicit) = match path {
        Some(p) => (p, true),
        None => (get_config_path(), false),
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        tracing::debug!(path = %config_path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    parse_config_file(&config_path)
}

fn parse_config_file(config_path: &Path) -> Result<Config> {
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    Ok(config)
}

/// Serialize a config and write it, creating parent directories
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_missing_explicit_path_is_error() {
        let path = env::temp_dir().join("college_compare_test_no_such_config.yaml");
        let _ = fs::remove_file(&path);

        let err = load_config(Some(path)).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_write_then_load() {
        let path = env::temp_dir()
            .join("college_compare_test_cfg")
            .join("config.yaml");
        let _ = fs::remove_file(&path);

        let mut config = Config::default();
        config.page_size = 20;
        config.theme = ThemeSetting::Dark;
        write_config(&path, &config).unwrap();

        let loaded = load_config(Some(path.clone())).unwrap();
        assert_eq!(loaded.page_size, 20);
        assert_eq!(loaded.theme, ThemeSetting::Dark);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_yaml_mentions_path() {
        let path = env::temp_dir().join("college_compare_test_bad_config.yaml");
        fs::write(&path, "source: [unclosed").unwrap();

        let err = load_config(Some(path.clone())).unwrap_err();
        assert!(err.to_string().contains("invalid YAML"));

        let _ = fs::remove_file(&path);
    }
}

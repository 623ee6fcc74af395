use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "emlak.toml",
    "config/emlak.toml",
    "crates/config/emlak.toml",
    "../emlak.toml",
    "../config/emlak.toml",
    "../crates/config/emlak.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://emlak.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use emlak_config::load;
///
/// std::env::remove_var("EMLAK_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(config.database.max_connections > 0);
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("database.url", defaults.database.url.clone())
        .unwrap()
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("EMLAK").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("EMLAK_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via EMLAK_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_apply_without_file_or_env() {
        std::env::remove_var("EMLAK_CONFIG");
        std::env::remove_var("EMLAK__DATABASE__URL");

        let config = load().unwrap();
        assert_eq!(config.database.url, "sqlite://emlak.db");
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    #[serial]
    fn environment_overrides_take_precedence() {
        std::env::remove_var("EMLAK_CONFIG");
        std::env::set_var("EMLAK__DATABASE__URL", "sqlite://override.db");
        std::env::set_var("EMLAK__DATABASE__MAX_CONNECTIONS", "3");

        let config = load().unwrap();
        assert_eq!(config.database.url, "sqlite://override.db");
        assert_eq!(config.database.max_connections, 3);

        std::env::remove_var("EMLAK__DATABASE__URL");
        std::env::remove_var("EMLAK__DATABASE__MAX_CONNECTIONS");
    }

    #[test]
    #[serial]
    fn config_file_is_loaded_when_pointed_at() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emlak.toml");
        std::fs::write(
            &path,
            "[database]\nurl = \"sqlite://from-file.db\"\nmax_connections = 2\n",
        )
        .unwrap();

        std::env::set_var("EMLAK_CONFIG", &path);
        let config = load().unwrap();
        std::env::remove_var("EMLAK_CONFIG");

        assert_eq!(config.database.url, "sqlite://from-file.db");
        assert_eq!(config.database.max_connections, 2);
    }
}

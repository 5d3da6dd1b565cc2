use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "feedline.toml",
    "config/feedline.toml",
    "crates/config/feedline.toml",
    "../feedline.toml",
    "../config/feedline.toml",
    "../crates/config/feedline.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub mailer: MailerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            mailer: MailerConfig::default(),
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
            url: "sqlite://feedline.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Settings for outbound account mail (password resets).
///
/// `reset_url_base` is the prefix the reset token is appended to when a
/// password-reset mail is rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    pub sender: String,
    pub reset_url_base: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            sender: "noreply@feedline.example".to_string(),
            reset_url_base: "https://feedline.example/password_resets".to_string(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use feedline_config::load;
///
/// std::env::remove_var("FEEDLINE_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.database.url.is_empty());
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
        .unwrap()
        .set_default("mailer.sender", defaults.mailer.sender.clone())
        .unwrap()
        .set_default(
            "mailer.reset_url_base",
            defaults.mailer.reset_url_base.clone(),
        )
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("FEEDLINE").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("FEEDLINE_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via FEEDLINE_CONFIG");
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

    debug!(?config, "loaded backend configuration");
    Ok(config)
}

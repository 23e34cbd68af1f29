use std::{env, path::PathBuf, time::Duration};

use directories::BaseDirs;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::core::error::FetchError;
use crate::services::HttpSource;

const CONFIG: &str = include_str!("../.config/config.json5");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: None,
            request_timeout_secs: None,
            user_agent: default_user_agent(),
            log_level: None,
            data_dir: get_data_dir(),
            config_dir: get_config_dir(),
        }
    }
}

fn default_user_agent() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// Load configuration.
    ///
    /// Layers, lowest first: embedded defaults, the user file (the given path,
    /// which must exist, or `~/.datafilter-config.json5` if present), then
    /// `DATAFILTER_*` environment variables.
    pub fn from_path(config_path: Option<&PathBuf>) -> Result<Self, config::ConfigError> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5))
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?;

        let (selected_path, required) = match config_path {
            Some(p) => (expand_tilde(p), true),
            None => (default_home_config_path(), false),
        };
        builder = builder.add_source(
            config::File::from(selected_path)
                .format(config::FileFormat::Json5)
                .required(required),
        );
        builder = builder.add_source(
            config::Environment::with_prefix(PROJECT_NAME.as_str())
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn log_level(&self) -> Option<tracing::Level> {
        self.log_level.as_deref().and_then(|s| s.parse().ok())
    }

    /// HTTP source honoring the configured timeout and user agent
    pub fn http_source(&self) -> Result<HttpSource, FetchError> {
        HttpSource::with_options(self.request_timeout(), Some(&self.user_agent))
    }
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Some(s) = path.to_str() {
        if s.starts_with('~') {
            if let Some(base) = BaseDirs::new() {
                return PathBuf::from(s.replacen('~', base.home_dir().to_str().unwrap_or(""), 1));
            }
        }
    }
    path.clone()
}

fn default_home_config_path() -> PathBuf {
    if let Some(base) = BaseDirs::new() {
        return base.home_dir().join(".datafilter-config.json5");
    }
    PathBuf::from(".datafilter-config.json5")
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else {
        PathBuf::from(".").join(".config")
    }
}

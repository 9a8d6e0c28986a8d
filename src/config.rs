//! Runtime configuration.
//!
//! Values are resolved in three layers, later ones winning:
//! 1. built-in defaults (data under the platform data directory)
//! 2. a TOML file (`$LEITBOX_CONFIG`, or `leitbox.toml` in the data directory)
//! 3. environment variables `PORT`, `LEITBOX_HOST`, `LEITBOX_DB`, `LEITBOX_BACKUP_DIR`

use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::Database;

const CONFIG_FILE_NAME: &str = "leitbox.toml";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: PathBuf,
    pub backup_dir: PathBuf,
}

/// Shape of the TOML file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    database: Option<PathBuf>,
    backup_dir: Option<PathBuf>,
}

impl Config {
    /// Defaults rooted at `data_dir`
    pub fn with_data_dir(data_dir: &Path) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: data_dir.join("db.sqlite3"),
            backup_dir: data_dir.join("backups"),
        }
    }

    /// Resolve configuration from defaults, the config file and the process environment
    pub fn load() -> Result<Self> {
        let vars: HashMap<String, String> = env::vars().collect();
        Self::load_from(&vars)
    }

    /// Resolve configuration against an explicit set of environment variables
    pub fn load_from(vars: &HashMap<String, String>) -> Result<Self> {
        let data_dir = Database::default_data_dir().unwrap_or_else(|_| {
            log::warn!("No platform data directory, storing data under ./data");
            PathBuf::from("data")
        });
        let mut config = Self::with_data_dir(&data_dir);

        let file_path = vars
            .get("LEITBOX_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(CONFIG_FILE_NAME));

        if file_path.exists() {
            config.merge_file(&file_path)?;
            log::info!("Loaded config from {}", file_path.display());
        } else if vars.contains_key("LEITBOX_CONFIG") {
            log::warn!("Config file {} not found, using defaults", file_path.display());
        }

        config.merge_env(vars)?;
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)?;
        let file: FileConfig = toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(database) = file.database {
            self.database = database;
        }
        if let Some(backup_dir) = file.backup_dir {
            self.backup_dir = backup_dir;
        }
        Ok(())
    }

    fn merge_env(&mut self, vars: &HashMap<String, String>) -> Result<()> {
        if let Some(port) = try_parse(vars, "PORT")? {
            self.port = port;
        }
        if let Some(host) = vars.get("LEITBOX_HOST") {
            self.host = host.clone();
        }
        if let Some(db) = vars.get("LEITBOX_DB") {
            self.database = PathBuf::from(db);
        }
        if let Some(dir) = vars.get("LEITBOX_BACKUP_DIR") {
            self.backup_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                key: "host".to_string(),
                message: e.to_string(),
            })
    }
}

fn try_parse<T: FromStr>(vars: &HashMap<String, String>, key: &str) -> Result<Option<T>>
where
    T::Err: Display,
{
    match vars.get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

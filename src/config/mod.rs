//! Configuration management module.
//!
//! This module handles loading, saving, and managing application configuration,
//! including the API location, list paging, search debounce, cache lifetime,
//! logging and theme preferences.

mod error;

pub use error::ConfigError;

use crate::error::AppError;
use crate::query::{DEFAULT_PAGE_SIZE, SEARCH_DEBOUNCE};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

const FILE_NAME: &str = "config.yml";
const DEFAULT_DIRECTORY_PATH: &str = ".config/academy-admin";
const API_URL_ENV: &str = "ACADEMY_ADMIN_API_URL";

/// Oversees management of configuration file.
///
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub page_size: u32,
    pub search_debounce_ms: u64,
    pub cache_keep_secs: u64,
    pub log_level: String,
    pub theme_name: String,
    dir_path: Option<PathBuf>,
}

/// Define specification for configuration file.
///
#[derive(Serialize, Deserialize)]
struct FileSpec {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default = "default_cache_keep_secs")]
    pub cache_keep_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_theme_name")]
    pub theme_name: String,
}

fn default_api_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_search_debounce_ms() -> u64 {
    SEARCH_DEBOUNCE.as_millis() as u64
}

fn default_cache_keep_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_theme_name() -> String {
    "midnight".to_string()
}

impl Config {
    /// Return a new instance with default values.
    ///
    pub fn new() -> Config {
        Config {
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
            cache_keep_secs: default_cache_keep_secs(),
            log_level: default_log_level(),
            theme_name: default_theme_name(),
            dir_path: None,
        }
    }

    /// Load the configuration from the custom directory if provided or the
    /// default one otherwise, writing a file with defaults on first run. The
    /// API URL environment variable overrides the file.
    ///
    pub fn load(&mut self, custom_path: Option<&str>) -> Result<(), AppError> {
        let dir_path = match custom_path {
            Some(path) => Path::new(path).to_path_buf(),
            None => Config::default_path()?,
        };

        if !dir_path.exists() {
            fs::create_dir_all(&dir_path).map_err(|e| ConfigError::CreateDirectoryFailed {
                path: dir_path.clone(),
                source: e,
            })?;
        }

        let file_path = dir_path.join(FILE_NAME);
        self.dir_path = Some(dir_path);

        if file_path.exists() {
            let contents = fs::read_to_string(&file_path).map_err(|e| ConfigError::LoadFailed {
                path: file_path.clone(),
                message: format!("IO error: {}", e),
            })?;
            self.apply_file(&contents)?;
        } else {
            self.save()?;
        }

        if let Ok(url) = env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_owned();
            }
        }

        Ok(())
    }

    /// Write the current configuration to disk.
    ///
    pub fn save(&self) -> Result<(), AppError> {
        let file_path = self.file_path().ok_or(ConfigError::FilePathNotSet)?;
        let data = FileSpec {
            api_base_url: self.api_base_url.clone(),
            page_size: self.page_size,
            search_debounce_ms: self.search_debounce_ms,
            cache_keep_secs: self.cache_keep_secs,
            log_level: self.log_level.clone(),
            theme_name: self.theme_name.clone(),
        };
        let content = serde_yaml::to_string(&data)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        let mut file = fs::File::create(&file_path).map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        write!(file, "{}", content)
            .and_then(|_| file.flush())
            .map_err(|e| ConfigError::SaveFailed {
                path: file_path.clone(),
                source: e,
            })?;
        Ok(())
    }

    /// Directory holding the configuration and session files.
    ///
    pub fn dir_path(&self) -> Option<&Path> {
        self.dir_path.as_deref()
    }

    pub fn file_path(&self) -> Option<PathBuf> {
        self.dir_path.as_ref().map(|dir| dir.join(FILE_NAME))
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.max(1)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn cache_keep_for(&self) -> Duration {
        Duration::from_secs(self.cache_keep_secs)
    }

    /// Parse the configured log level, falling back to `Info`.
    ///
    pub fn log_level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    fn apply_file(&mut self, contents: &str) -> Result<(), ConfigError> {
        let data: FileSpec = serde_yaml::from_str(contents)
            .map_err(|e| ConfigError::DeserializationFailed(e.to_string()))?;
        self.api_base_url = data.api_base_url;
        self.page_size = data.page_size;
        self.search_debounce_ms = data.search_debounce_ms;
        self.cache_keep_secs = data.cache_keep_secs;
        self.log_level = data.log_level;
        self.theme_name = data.theme_name;
        Ok(())
    }

    /// Returns the path buffer for the default configuration directory or an
    /// error if the home directory could not be found.
    ///
    fn default_path() -> Result<PathBuf, ConfigError> {
        match dirs::home_dir() {
            Some(home) => Ok(home.join(DEFAULT_DIRECTORY_PATH)),
            None => Err(ConfigError::HomeDirectoryNotFound),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

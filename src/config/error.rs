//! Errors raised while reading or writing the config and session files.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config directory was never resolved
    #[error("Configuration file path not set")]
    FilePathNotSet,

    /// Sign-in attempted with a blank token
    #[error("Access token is empty")]
    AccessTokenNotSet,

    #[error("Failed to find home directory")]
    HomeDirectoryNotFound,

    #[error("Failed to load {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to save {path}: {source}")]
    SaveFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDirectoryFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize YAML: {0}")]
    SerializationFailed(String),

    #[error("Failed to parse YAML: {0}")]
    DeserializationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        assert!(ConfigError::FilePathNotSet
            .to_string()
            .contains("file path not set"));
        assert!(ConfigError::AccessTokenNotSet
            .to_string()
            .contains("Access token is empty"));
        assert!(ConfigError::DeserializationFailed("bad indent".to_string())
            .to_string()
            .contains("bad indent"));
    }

    #[test]
    fn test_config_error_with_path() {
        let error = ConfigError::SaveFailed {
            path: PathBuf::from("/home/admin/.config/academy-admin/session.yml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let error_str = error.to_string();
        assert!(error_str.contains("session.yml"));
        assert!(error_str.contains("denied"));
    }
}

//! Error handling for the AnchoRNA CLI

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("File exists: {path} (use --force to overwrite)")]
    FileExists { path: PathBuf },

    #[error("Invalid anchor source \"{spec}\": {message}")]
    AnchorSource { spec: String, message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn file_exists(path: PathBuf) -> Self {
        Self::FileExists { path }
    }

    pub fn anchor_source<S: Into<String>>(spec: S, message: S) -> Self {
        Self::AnchorSource {
            spec: spec.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CliError::config("no sequence file");
        assert!(matches!(err, CliError::Config { .. }));
        assert_eq!(err.to_string(), "Configuration error: no sequence file");
    }

    #[test]
    fn test_anchor_source_message() {
        let err = CliError::anchor_source("a.gff|x|y|z", "too many fields");
        assert_eq!(err.to_string(), "Invalid anchor source \"a.gff|x|y|z\": too many fields");
    }
}

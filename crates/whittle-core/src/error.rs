//! Error types for cursor, reducer and front-end operations

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for whittle operations
#[derive(Debug, Error)]
pub enum WhittleError {
    /// A path or field access that contradicts the node shape table
    #[error("Structural error: {message}")]
    Structural { message: String },

    /// Source text could not be parsed
    #[error("Parse error: {message} at line {line}, column {column}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    /// A tree could not be rendered back to text
    #[error("Render error: {message}")]
    Render { message: String },

    /// A finding's target node is missing from its file's tree
    #[error("Finding '{rule_id}' at offset {offset} in '{file}' does not match any node")]
    FindingNotLocated {
        rule_id: String,
        file: PathBuf,
        offset: usize,
    },

    /// A file is not known to the analysis engine
    #[error("Unknown file '{path}'")]
    UnknownFile { path: PathBuf },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Structural,
    Parse,
    Render,
    Construction,
    Config,
    Io,
    Internal,
}

impl WhittleError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            WhittleError::Structural { .. } => ErrorKind::Structural,
            WhittleError::Parse { .. } => ErrorKind::Parse,
            WhittleError::Render { .. } => ErrorKind::Render,
            WhittleError::FindingNotLocated { .. } => ErrorKind::Construction,
            WhittleError::UnknownFile { .. } => ErrorKind::Io,
            WhittleError::ConfigError { .. } => ErrorKind::Config,
            WhittleError::IoError { .. } => ErrorKind::Io,
            WhittleError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Errors a reducer transaction absorbs by rolling back the edit
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Parse | ErrorKind::Render)
    }

    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural {
            message: message.into(),
        }
    }

    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    pub fn render_error(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for WhittleError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_kinds() {
        assert!(WhittleError::render_error("nop in expression").is_recoverable());
        assert!(WhittleError::parse_error("unexpected '}'", 2, 1).is_recoverable());
        assert!(!WhittleError::structural("index after index").is_recoverable());
        assert!(!WhittleError::config_error("bad toml").is_recoverable());
    }

    #[test]
    fn display_includes_position() {
        let err = WhittleError::parse_error("expected ';'", 3, 14);
        assert_eq!(
            err.to_string(),
            "Parse error: expected ';' at line 3, column 14"
        );
    }
}

//! Error types for the DEW toolkit.

use std::path::{Path, PathBuf};

/// Result type alias for DEW operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading definitions, building the knowledge
/// graph, solving problems, or generating datasets.
///
/// All variants are marked `#[non_exhaustive]` at the enum level so new
/// failure kinds can be added without breaking downstream matches.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error, optionally tied to the path being accessed.
    #[error("I/O error{}: {source}", path_suffix(.path))]
    Io {
        /// Path involved in the failed operation, if known
        path: Option<PathBuf>,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed input (expressions, annotation files, option strings)
    #[error("Parse error: {message}")]
    Parse {
        /// What could not be parsed
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// A referenced entity does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of entity (equation, unit, template, ...)
        kind: String,
        /// Identifier that was looked up
        id: String,
    },

    /// Definition or template validation error
    #[error("Validation error: {}{message}", field_prefix(.field))]
    Validation {
        /// Field or aspect that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// Numeric evaluation failed (division by zero, non-finite result)
    #[error("Math error: {message}")]
    Math {
        /// What went wrong during evaluation
        message: String,
    },

    /// An equation could not be solved for the requested variable
    #[error("Cannot solve for {target}: {reason}")]
    Unsolvable {
        /// Variable being solved for
        target: String,
        /// Why solving failed
        reason: String,
    },
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" at {}", p.display()))
        .unwrap_or_default()
}

fn field_prefix(field: &Option<String>) -> String {
    field.as_ref().map(|f| format!("{f}: ")).unwrap_or_default()
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io { path: None, source }
    }
}

impl Error {
    /// Creates an I/O error tied to a path.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: Some(path.as_ref().to_path_buf()),
            source,
        }
    }

    /// Creates a new parse error.
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Error::Parse {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates a new not-found error.
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a new math error.
    pub fn math<S: Into<String>>(message: S) -> Self {
        Error::Math {
            message: message.into(),
        }
    }

    /// Creates a new unsolvable error.
    pub fn unsolvable(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Unsolvable {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Returns whether the error concerns a single problem instance rather
    /// than the inputs as a whole.
    ///
    /// Generation may skip past instance-level errors; everything else
    /// (missing files, broken definitions) aborts.
    pub fn is_instance_level(&self) -> bool {
        matches!(self, Error::Unsolvable { .. } | Error::Math { .. })
    }
}

//! Error types for Kiln
//!
//! All modules use `KilnResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Kiln operations
pub type KilnResult<T> = Result<T, KilnError>;

/// All errors that can occur in Kiln
#[derive(Error, Debug)]
pub enum KilnError {
    // Digest errors
    #[error("Unsupported value type for identity digest: {reason}")]
    UnsupportedValueType { reason: String },

    // Compiler errors
    #[error("Compilation failed for {path}: {reason}")]
    CompileFailed { path: PathBuf, reason: String },

    #[error("Compiler command not found: {0}")]
    CompilerNotFound(String),

    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No compiler registered for extension: .{0}")]
    NoCompilerForExtension(String),

    #[error("Extension already registered: .{0}")]
    ExtensionRegistered(String),

    // Storage errors
    #[error("Failed to create cache directory {path}: {source}")]
    CacheDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write cache entry {path}: {source}")]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Source errors
    #[error("Source is not valid UTF-8: {0}")]
    SourceNotUtf8(PathBuf),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    User(String),
}

impl KilnError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a compile failure for a source path
    pub fn compile_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CompileFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CompilerNotFound(_) => Some("Check [[compilers]].command in your config"),
            Self::NoCompilerForExtension(_) => {
                Some("Add a [[compilers]] entry declaring this extension to config.toml")
            }
            Self::CacheDirCreate { .. } | Self::StorageWrite { .. } => {
                Some("Check that the cache directory is writable, or pass --cache-dir")
            }
            Self::ConfigInvalid { .. } => Some("Run: kiln config show"),
            _ => None,
        }
    }
}

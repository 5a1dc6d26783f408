//! Configuration schema for Kiln
//!
//! Configuration is stored at `~/.config/kiln/config.toml`, optionally
//! overlaid by a project-local `.kiln.toml`.

use crate::compiler::DEFAULT_OUTPUT_EXTENSION;
use crate::digest::DigestScheme;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache storage settings
    pub cache: CacheConfig,

    /// Compilers, one per source language
    pub compilers: Vec<CompilerConfig>,
}

impl Config {
    /// Find a compiler by name
    pub fn compiler(&self, name: &str) -> Option<&CompilerConfig> {
        self.compilers.iter().find(|c| c.name == name)
    }
}

/// Cache storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root directory (default: platform cache dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Address space for cache keys
    pub scheme: DigestScheme,
}

/// External command compiler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Compiler name, part of the identity
    pub name: String,

    /// Compiler version, part of the identity
    pub version: String,

    /// Executable to run; source is piped to stdin, output read from stdout
    pub command: String,

    /// Arguments passed to the command
    pub args: Vec<String>,

    /// Source extensions handled (without the dot)
    pub extensions: Vec<String>,

    /// Extension for cached output
    pub output_extension: String,

    /// First-line pragma that disables caching for a file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass_pragma: Option<String>,

    /// Free-form compiler options, part of the identity
    pub options: toml::Table,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: "0".to_string(),
            command: String::new(),
            args: vec![],
            extensions: vec![],
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
            bypass_pragma: None,
            options: toml::Table::new(),
        }
    }
}

//! Compiler strategy abstraction
//!
//! The cache never transforms source itself. Each language plugs in a
//! [`CompilerStrategy`] that describes its identity (name, version, options)
//! and produces output on a miss.

pub mod command;

pub use command::CommandCompiler;

use crate::error::KilnResult;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

/// Output extension used when a strategy doesn't declare one
pub const DEFAULT_OUTPUT_EXTENSION: &str = "js";

/// Pluggable source-to-output compiler
///
/// Implementations must be deterministic: the same source and identity must
/// always produce the same bytes, since concurrent misses may overwrite each
/// other's cache entries.
#[async_trait]
pub trait CompilerStrategy: Send + Sync {
    /// Everything that affects the output: name, version, options.
    ///
    /// Must be a pure function of the strategy's configuration.
    fn identity(&self) -> Value;

    /// Compile source text read from `source_path`
    async fn compile(&self, source: &str, source_path: &Path) -> KilnResult<Vec<u8>>;

    /// Skip the cache entirely for this source
    fn should_bypass(&self, _source: &str) -> bool {
        false
    }

    /// Extension of the cached artifacts, without the dot
    fn output_extension(&self) -> &str {
        DEFAULT_OUTPUT_EXTENSION
    }

    /// Source file extensions handled by this strategy, without the dot
    ///
    /// Defaults to the identity's `extensions` array, or its single
    /// `extension` string.
    fn source_extensions(&self) -> Vec<String> {
        extensions_from_identity(&self.identity())
    }
}

fn extensions_from_identity(identity: &Value) -> Vec<String> {
    if let Some(list) = identity.get("extensions").and_then(Value::as_array) {
        return list
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }

    identity
        .get("extension")
        .and_then(Value::as_str)
        .map(|ext| vec![ext.to_string()])
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixed(Value);

    #[async_trait]
    impl CompilerStrategy for Fixed {
        fn identity(&self) -> Value {
            self.0.clone()
        }

        async fn compile(&self, source: &str, _source_path: &Path) -> KilnResult<Vec<u8>> {
            Ok(source.as_bytes().to_vec())
        }
    }

    #[test]
    fn defaults() {
        let compiler = Fixed(json!({"name": "fixed"}));
        assert!(!compiler.should_bypass("anything"));
        assert_eq!(compiler.output_extension(), "js");
        assert!(compiler.source_extensions().is_empty());
    }

    #[test]
    fn extensions_list_wins() {
        let compiler = Fixed(json!({"extension": "ts", "extensions": ["coffee", "litcoffee"]}));
        assert_eq!(compiler.source_extensions(), vec!["coffee", "litcoffee"]);
    }

    #[test]
    fn single_extension() {
        let compiler = Fixed(json!({"extension": "ts"}));
        assert_eq!(compiler.source_extensions(), vec!["ts"]);
    }
}

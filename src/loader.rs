//! Extension-based file loading
//!
//! Routes source files to the cache of the compiler that declared their
//! extension. What happens to the compiled bytes afterwards (executing,
//! bundling, writing to disk) is up to the caller.

use crate::cache::{CacheStats, CompileCache};
use crate::compiler::CommandCompiler;
use crate::config::Config;
use crate::error::{KilnError, KilnResult};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

/// Registry of compile caches keyed by source extension
#[derive(Default)]
pub struct Loader {
    handlers: BTreeMap<String, Arc<CompileCache>>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a loader with one command compiler per `[[compilers]]` entry
    pub fn from_config(config: &Config, cache_root: &Path) -> KilnResult<Self> {
        let mut loader = Self::new();
        for entry in &config.compilers {
            let compiler = CommandCompiler::from_config(entry.clone())?;
            let cache = CompileCache::new(Box::new(compiler), cache_root)
                .with_scheme(config.cache.scheme);
            loader.register(Arc::new(cache))?;
        }
        Ok(loader)
    }

    /// Install `cache` for every extension its compiler declares
    ///
    /// An extension can only be claimed once; nothing is registered if any
    /// of the extensions is already taken.
    pub fn register(&mut self, cache: Arc<CompileCache>) -> KilnResult<()> {
        let extensions = cache.compiler().source_extensions();

        if let Some(taken) = extensions.iter().find(|ext| self.handlers.contains_key(*ext)) {
            return Err(KilnError::ExtensionRegistered(taken.clone()));
        }

        for ext in extensions {
            debug!("Registered compiler for .{}", ext);
            self.handlers.insert(ext, Arc::clone(&cache));
        }
        Ok(())
    }

    /// Registered extensions, sorted
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Cache responsible for `path`, by its extension
    pub fn handler_for(&self, path: &Path) -> Option<&Arc<CompileCache>> {
        let ext = path.extension()?.to_str()?;
        self.handlers.get(ext)
    }

    /// Read a source file and return its compiled output
    pub async fn load_file(&self, path: &Path) -> KilnResult<Vec<u8>> {
        let cache = self.require_handler(path)?;
        let source = read_source(path).await?;
        cache.resolve(&source, path).await
    }

    /// Artifact path a source file maps to, `None` if it bypasses the cache
    pub async fn locate(&self, path: &Path) -> KilnResult<Option<PathBuf>> {
        let cache = self.require_handler(path)?;
        let source = read_source(path).await?;
        if cache.should_bypass(&source) {
            return Ok(None);
        }
        cache.artifact_path(&source).await.map(Some)
    }

    /// Combined stats of every registered cache
    pub fn stats(&self) -> CacheStats {
        let mut seen = HashSet::new();
        self.handlers
            .values()
            .filter(|cache| seen.insert(Arc::as_ptr(cache)))
            .map(|cache| cache.stats())
            .sum()
    }

    fn require_handler(&self, path: &Path) -> KilnResult<&Arc<CompileCache>> {
        self.handler_for(path).ok_or_else(|| {
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default();
            KilnError::NoCompilerForExtension(ext)
        })
    }
}

async fn read_source(path: &Path) -> KilnResult<String> {
    let bytes = fs::read(path)
        .await
        .map_err(|e| KilnError::io(format!("reading source {}", path.display()), e))?;
    String::from_utf8(bytes).map_err(|_| KilnError::SourceNotUtf8(path.to_path_buf()))
}

//! Content-addressed artifact store
//!
//! Artifacts are written once to `<root>/<identity>/<content>.<ext>` and
//! never modified or removed afterwards. Each write goes to a temp file that
//! is renamed into place, so a reader sees either no entry or a complete
//! one. Two lookups racing on the same key may both compile and both rename;
//! the compiler is deterministic, so either rename leaves identical bytes.

use crate::cache::stats::{CacheStats, StatsCounter};
use crate::compiler::CompilerStrategy;
use crate::digest::{DigestScheme, IdentityDigest};
use crate::error::{KilnError, KilnResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Compilation cache for a single compiler strategy
pub struct CompileCache {
    compiler: Box<dyn CompilerStrategy>,
    scheme: DigestScheme,
    root: PathBuf,
    /// `<root>/<identity digest>`, resolved on first lookup
    identity_dir: Mutex<Option<PathBuf>>,
    stats: StatsCounter,
}

impl CompileCache {
    /// Create a cache storing artifacts under `root`
    pub fn new(compiler: Box<dyn CompilerStrategy>, root: impl Into<PathBuf>) -> Self {
        Self {
            compiler,
            scheme: DigestScheme::default(),
            root: root.into(),
            identity_dir: Mutex::new(None),
            stats: StatsCounter::default(),
        }
    }

    /// Use a different key derivation scheme
    pub fn with_scheme(mut self, scheme: DigestScheme) -> Self {
        self.scheme = scheme;
        *self.identity_dir.get_mut() = None;
        self
    }

    /// Change the cache root
    ///
    /// Setting the current root again keeps the resolved identity directory.
    pub fn set_root(&mut self, root: impl Into<PathBuf>) {
        let root = root.into();
        if root == self.root {
            return;
        }

        debug!(
            "Cache root changed: {} -> {}",
            self.root.display(),
            root.display()
        );
        self.root = root;
        *self.identity_dir.get_mut() = None;
    }

    /// Current cache root
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scheme(&self) -> DigestScheme {
        self.scheme
    }

    pub fn compiler(&self) -> &dyn CompilerStrategy {
        self.compiler.as_ref()
    }

    /// Digest of the compiler's current identity
    pub fn identity_digest(&self) -> IdentityDigest {
        self.scheme.identity_digest(&self.compiler.identity())
    }

    /// Directory holding this compiler's artifacts, created on first use
    pub async fn identity_dir(&self) -> KilnResult<PathBuf> {
        let mut slot = self.identity_dir.lock().await;
        if let Some(dir) = slot.as_ref() {
            return Ok(dir.clone());
        }

        let dir = self.root.join(self.identity_digest().as_str());
        // create_dir_all succeeds if another process got there first
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| KilnError::CacheDirCreate {
                path: dir.clone(),
                source: e,
            })?;

        debug!("Resolved compiler cache directory: {}", dir.display());
        *slot = Some(dir.clone());
        Ok(dir)
    }

    /// Where the artifact for `source` is (or would be) stored
    pub async fn artifact_path(&self, source: &str) -> KilnResult<PathBuf> {
        let digest = self.scheme.content_digest(source);
        let dir = self.identity_dir().await?;
        Ok(dir.join(format!(
            "{}.{}",
            digest,
            self.compiler.output_extension()
        )))
    }

    /// Whether `source` skips the cache
    pub fn should_bypass(&self, source: &str) -> bool {
        self.compiler.should_bypass(source)
    }

    /// Return compiled output for `source`, from storage when possible
    ///
    /// Compiler errors propagate unchanged and nothing is written. A failed
    /// write is returned as an error after the miss has been counted.
    pub async fn resolve(&self, source: &str, source_path: &Path) -> KilnResult<Vec<u8>> {
        if self.should_bypass(source) {
            debug!("Cache bypassed: {}", source_path.display());
            return self.compiler.compile(source, source_path).await;
        }

        let path = self.artifact_path(source).await?;

        if let Some(cached) = read_entry(&path).await {
            self.stats.record_hit();
            debug!("Cache hit: {} -> {}", source_path.display(), path.display());
            return Ok(cached);
        }

        let output = self.compiler.compile(source, source_path).await?;
        self.stats.record_miss();
        debug!("Cache miss: {} -> {}", source_path.display(), path.display());

        write_entry(&path, &output).await?;

        Ok(output)
    }

    /// Hits and misses since this cache was created
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}

/// Write an entry so the final path only ever holds complete bytes
///
/// Bytes go to a sibling temp file which is then renamed over `path`.
async fn write_entry(path: &Path, bytes: &[u8]) -> KilnResult<()> {
    let tmp = temp_path(path);
    let result = match fs::write(&tmp, bytes).await {
        Ok(()) => fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        // Best effort; a stray temp file is never served as an entry
        let _ = fs::remove_file(&tmp).await;
        return Err(KilnError::StorageWrite {
            path: path.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}

/// `<entry>.tmp.<pid>.<seq>`, unique across processes and concurrent writers
fn temp_path(path: &Path) -> PathBuf {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".tmp.{}.{}", std::process::id(), seq));
    path.with_file_name(name)
}

/// Read a cache entry; any failure counts as absent
async fn read_entry(path: &Path) -> Option<Vec<u8>> {
    match fs::read(path).await {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            warn!("Ignoring unreadable cache entry {}: {}", path.display(), e);
            None
        }
    }
}

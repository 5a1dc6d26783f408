//! Kiln - content-addressed compilation cache
//!
//! Stores the output of source-to-source compilers on disk, keyed by a
//! digest of the compiler's configuration and a digest of the source text.

pub mod cache;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod digest;
pub mod error;
pub mod loader;
pub mod ui;

pub use cache::{CacheStats, CompileCache};
pub use compiler::{CommandCompiler, CompilerStrategy};
pub use digest::{identity_digest_of, ContentDigest, DigestScheme, IdentityDigest};
pub use error::{KilnError, KilnResult};
pub use loader::Loader;

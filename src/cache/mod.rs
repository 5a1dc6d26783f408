//! Persistent compilation cache
//!
//! Compiled output is stored under a two-level, content-addressed layout:
//!
//! ```text
//! <root>/<identity digest>/<content digest>.<ext>
//! ```
//!
//! - The identity digest changes whenever the compiler name, version or
//!   options change, so a reconfigured compiler never sees stale output
//! - The content digest changes with any byte of the source
//! - Entries are immutable once written and are never cleaned up by kiln
//!
//! # Lookup outcomes
//!
//! | Outcome | Storage | Stats |
//! |---------|---------|-------|
//! | Bypass | untouched | unchanged |
//! | Hit | read | `hits += 1` |
//! | Miss | read, compile, write | `misses += 1` |

pub mod stats;
pub mod store;

pub use stats::CacheStats;
pub use store::CompileCache;

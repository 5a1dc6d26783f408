//! Terminal output helpers
//!
//! Uses `cliclack` styling on interactive terminals and falls back to plain,
//! greppable lines when piped or running under CI.

mod context;
mod output;

pub use context::UiContext;
pub use output::{compiler_block, field, outcome, section, title, CompilerSummary, Outcome};

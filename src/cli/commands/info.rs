//! Info command - show cache root, scheme and configured compilers

use crate::cache::CompileCache;
use crate::compiler::{CommandCompiler, CompilerStrategy};
use crate::config::{Config, ConfigManager};
use crate::digest::DigestScheme;
use crate::error::KilnResult;
use crate::ui::{self, CompilerSummary, Outcome, UiContext};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Execute the info command
pub async fn execute(config: &Config, manager: &ConfigManager, cache_root: &Path) -> KilnResult<()> {
    let ctx = UiContext::detect();

    ui::title(&ctx, "kiln");

    ui::section(&ctx, "Cache");
    ui::field(&ctx, "Config", &manager.path().display().to_string());
    ui::field(&ctx, "Root", &cache_root.display().to_string());
    ui::field(&ctx, "Scheme", &scheme_label(config.cache.scheme));

    ui::section(&ctx, "Compilers");
    if config.compilers.is_empty() {
        ui::outcome(
            &ctx,
            Outcome::Skipped,
            "No compilers configured",
            "add a [[compilers]] entry to config.toml",
        );
        return Ok(());
    }

    for entry in &config.compilers {
        let compiler = CommandCompiler::from_config(entry.clone())?;
        let extensions = compiler.source_extensions();
        let cache = CompileCache::new(Box::new(compiler), cache_root).with_scheme(config.cache.scheme);
        let identity = cache.identity_digest();
        let directory = cache_root.join(identity.as_str());

        ui::compiler_block(
            &ctx,
            &CompilerSummary {
                name: &entry.name,
                version: &entry.version,
                extensions: &extensions,
                output_extension: &entry.output_extension,
                identity: identity.as_str(),
                directory: &directory,
                command: &entry.command,
                command_found: command_on_path(&entry.command).await,
            },
        );
    }

    Ok(())
}

fn scheme_label(scheme: DigestScheme) -> String {
    format!("{} ({}-char keys)", scheme, scheme.hex_len())
}

/// Check whether a command resolves on PATH
async fn command_on_path(command: &str) -> bool {
    Command::new("which")
        .arg(command)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::digest::DigestScheme;
use crate::error::{KilnError, KilnResult};
use crate::ui::{self, Outcome, UiContext};
use clap::ValueEnum;
use std::path::PathBuf;

/// Keys accepted by `kiln config set`
const SETTABLE_KEYS: &[&str] = &["cache.root", "cache.scheme"];

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> KilnResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> KilnResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> KilnResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::outcome(
            &ctx,
            Outcome::Skipped,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::outcome(
        &ctx,
        Outcome::Done,
        "Configuration initialized",
        &path.display().to_string(),
    );

    Ok(())
}

async fn set_value(manager: &ConfigManager, key: &str, value: &str) -> KilnResult<()> {
    let ctx = UiContext::detect();

    // Only the file being edited, not the merged view with local overrides
    let mut config = manager.load().await?;
    apply_setting(&mut config, key, value)?;

    manager.save(&config).await?;
    ui::outcome(
        &ctx,
        Outcome::Done,
        &format!("Set {} = {}", key, value),
        &manager.path().display().to_string(),
    );

    Ok(())
}

fn apply_setting(config: &mut Config, key: &str, value: &str) -> KilnResult<()> {
    match key {
        "cache.root" => config.cache.root = Some(PathBuf::from(value)),
        "cache.scheme" => {
            config.cache.scheme = DigestScheme::from_str(value, true).map_err(|_| {
                KilnError::User(format!(
                    "Invalid scheme: {}. Use legacy or escaped",
                    value
                ))
            })?
        }
        _ => {
            return Err(KilnError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                SETTABLE_KEYS.join(", ")
            )))
        }
    }
    Ok(())
}

//! Locate command - print where a source file's output is cached

use crate::cli::args::LocateArgs;
use crate::config::Config;
use crate::error::KilnResult;
use crate::loader::Loader;
use std::path::Path;

/// Execute the locate command
pub async fn execute(args: LocateArgs, config: &Config, cache_root: &Path) -> KilnResult<()> {
    let loader = Loader::from_config(config, cache_root)?;

    match loader.locate(&args.file).await? {
        Some(path) => {
            let state = if path.exists() { "cached" } else { "not cached" };
            println!("{}", path.display());
            eprintln!("({})", state);
        }
        None => eprintln!("{} bypasses the cache", args.file.display()),
    }

    Ok(())
}

//! Compile command - compile source files through the cache

use crate::cli::args::CompileArgs;
use crate::config::Config;
use crate::error::{KilnError, KilnResult};
use crate::loader::Loader;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Execute the compile command
pub async fn execute(args: CompileArgs, config: &Config, cache_root: &Path) -> KilnResult<()> {
    let loader = Loader::from_config(config, cache_root)?;

    let targets: Vec<Option<PathBuf>> = match args.out_dir {
        Some(ref dir) => {
            let targets = plan_outputs(&loader, dir, &args.files)?;
            fs::create_dir_all(dir).await.map_err(|e| {
                KilnError::io(format!("creating output directory {}", dir.display()), e)
            })?;
            targets.into_iter().map(Some).collect()
        }
        None => vec![None; args.files.len()],
    };

    let mut stdout = tokio::io::stdout();
    for (file, target) in args.files.iter().zip(targets) {
        let output = loader.load_file(file).await?;

        match target {
            Some(target) => {
                fs::write(&target, &output)
                    .await
                    .map_err(|e| KilnError::io(format!("writing {}", target.display()), e))?;
                info!("Compiled {} -> {}", file.display(), target.display());
            }
            None => {
                stdout
                    .write_all(&output)
                    .await
                    .map_err(|e| KilnError::io("writing to stdout", e))?;
            }
        }
    }
    stdout
        .flush()
        .await
        .map_err(|e| KilnError::io("flushing stdout", e))?;

    let stats = loader.stats();
    debug!("Cache stats: {}", stats);
    if args.stats {
        eprintln!("{}", stats);
    }

    Ok(())
}

/// Output path for every file, refusing two files that would share one
fn plan_outputs(loader: &Loader, dir: &Path, files: &[PathBuf]) -> KilnResult<Vec<PathBuf>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut targets = Vec::with_capacity(files.len());

    for file in files {
        let target = output_path(loader, dir, file);
        if let Some(previous) = claimed.insert(target.clone(), file) {
            if previous != file.as_path() {
                return Err(KilnError::User(format!(
                    "{} and {} would both be written to {}",
                    previous.display(),
                    file.display(),
                    target.display()
                )));
            }
        }
        targets.push(target);
    }

    Ok(targets)
}

/// `<dir>/<stem>.<output extension>` for a source file
fn output_path(loader: &Loader, dir: &Path, file: &Path) -> PathBuf {
    let stem = file.file_stem().unwrap_or(file.as_os_str());
    let mut target = dir.join(stem);
    if let Some(cache) = loader.handler_for(file) {
        target.set_extension(cache.compiler().output_extension());
    }
    target
}

//! Digest command - compute the keys the cache would use

use crate::cli::args::{DigestArgs, DigestTarget};
use crate::compiler::{CommandCompiler, CompilerStrategy};
use crate::config::Config;
use crate::digest::DigestScheme;
use crate::error::{KilnError, KilnResult};
use serde_json::Value;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Execute the digest command
pub async fn execute(args: DigestArgs, config: &Config) -> KilnResult<()> {
    let scheme = args.scheme.unwrap_or(config.cache.scheme);

    match args.target {
        DigestTarget::Identity { compiler } => {
            for line in identity_lines(config, compiler.as_deref(), scheme)? {
                println!("{}", line);
            }
        }
        DigestTarget::Source { file } => {
            let bytes = fs::read(&file)
                .await
                .map_err(|e| KilnError::io(format!("reading source {}", file.display()), e))?;
            let source = String::from_utf8(bytes).map_err(|_| KilnError::SourceNotUtf8(file))?;
            println!("{}", scheme.content_digest(&source));
        }
        DigestTarget::Json { input, canonical } => {
            let value: Value = serde_json::from_slice(&read_input(&input).await?)?;
            if canonical {
                let mut stdout = tokio::io::stdout();
                stdout
                    .write_all(&scheme.canonical_bytes(&value))
                    .await
                    .map_err(|e| KilnError::io("writing to stdout", e))?;
                stdout
                    .flush()
                    .await
                    .map_err(|e| KilnError::io("flushing stdout", e))?;
            } else {
                println!("{}", scheme.identity_digest(&value));
            }
        }
    }

    Ok(())
}

/// `<digest>  <name>` for every configured compiler, or just `only`
fn identity_lines(
    config: &Config,
    only: Option<&str>,
    scheme: DigestScheme,
) -> KilnResult<Vec<String>> {
    let entries: Vec<_> = match only {
        Some(name) => {
            let entry = config
                .compiler(name)
                .ok_or_else(|| KilnError::User(format!("No compiler named '{}' in config", name)))?;
            vec![entry]
        }
        None => config.compilers.iter().collect(),
    };

    entries
        .into_iter()
        .map(|entry| {
            let compiler = CommandCompiler::from_config(entry.clone())?;
            let digest = scheme.identity_digest(&compiler.identity());
            Ok(format!("{}  {}", digest, compiler.name()))
        })
        .collect()
}

async fn read_input(input: &Path) -> KilnResult<Vec<u8>> {
    let mut buf = Vec::new();
    if input == Path::new("-") {
        tokio::io::stdin()
            .read_to_end(&mut buf)
            .await
            .map_err(|e| KilnError::io("reading stdin", e))?;
    } else {
        buf = fs::read(input)
            .await
            .map_err(|e| KilnError::io(format!("reading {}", input.display()), e))?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        toml::from_str(
            r#"
            [[compilers]]
            name = "upper"
            command = "tr"
            args = ["a-z", "A-Z"]
            extensions = ["up"]

            [[compilers]]
            name = "lower"
            command = "tr"
            args = ["A-Z", "a-z"]
            extensions = ["down"]
            "#,
        )
        .unwrap()
    }

    #[test]
    fn identity_lines_for_all_compilers() {
        let lines = identity_lines(&config(), None, DigestScheme::Legacy).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("  upper"));
        assert!(lines[1].ends_with("  lower"));
        assert_ne!(lines[0][..40], lines[1][..40]);
    }

    #[test]
    fn identity_lines_single_compiler() {
        let lines = identity_lines(&config(), Some("lower"), DigestScheme::Escaped).unwrap();
        assert_eq!(lines.len(), 1);
        let (digest, name) = lines[0].split_once("  ").unwrap();
        assert_eq!(digest.len(), 64);
        assert_eq!(name, "lower");
    }

    #[test]
    fn identity_lines_unknown_compiler() {
        let err = identity_lines(&config(), Some("coffee"), DigestScheme::Legacy).unwrap_err();
        assert!(err.to_string().contains("coffee"));
    }
}

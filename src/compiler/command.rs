//! External command compiler
//!
//! Runs a configured executable per miss: source on stdin, output on stdout.
//! The path of the source file is exported as `KILN_SOURCE_PATH`.

use crate::compiler::CompilerStrategy;
use crate::config::schema::CompilerConfig;
use crate::digest::value;
use crate::error::{KilnError, KilnResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Environment variable carrying the source path to the command
pub const SOURCE_PATH_ENV: &str = "KILN_SOURCE_PATH";

/// Compiler backed by an external command
#[derive(Debug)]
pub struct CommandCompiler {
    config: CompilerConfig,
    identity: Value,
}

impl CommandCompiler {
    /// Build a compiler from its config entry
    ///
    /// Fails if the options can't be represented in the identity.
    pub fn from_config(config: CompilerConfig) -> KilnResult<Self> {
        let options = value::from_toml_table(&config.options)?;
        let identity = json!({
            "name": config.name,
            "version": config.version,
            "command": config.command,
            "args": config.args,
            "extensions": config.extensions,
            "output_extension": config.output_extension,
            "options": options,
        });

        Ok(Self { config, identity })
    }

    /// Compiler name from config
    pub fn name(&self) -> &str {
        &self.config.name
    }

    fn command_line(&self) -> String {
        std::iter::once(self.config.command.as_str())
            .chain(self.config.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl CompilerStrategy for CommandCompiler {
    fn identity(&self) -> Value {
        self.identity.clone()
    }

    async fn compile(&self, source: &str, source_path: &Path) -> KilnResult<Vec<u8>> {
        debug!("Executing: {} < {}", self.command_line(), source_path.display());

        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .env(SOURCE_PATH_ENV, source_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    KilnError::CompilerNotFound(self.config.command.clone())
                }
                _ => KilnError::command_failed(self.command_line(), e),
            })?;

        // Feed stdin from a separate task so a chatty compiler can't block
        // on a full stdout pipe while we're still writing.
        let feeder = child.stdin.take().map(|mut stdin| {
            let bytes = source.as_bytes().to_vec();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&bytes).await {
                    // Compilers may exit without draining stdin
                    debug!("Compiler stdin closed early: {}", e);
                }
            })
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| KilnError::command_failed(self.command_line(), e))?;

        if let Some(feeder) = feeder {
            let _ = feeder.await;
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let status = output
                .status
                .code()
                .map(|c| format!("exit code {}", c))
                .unwrap_or_else(|| "signal".to_string());
            return Err(KilnError::compile_failed(
                source_path,
                format!("{} failed ({}): {}", self.config.command, status, stderr.trim()),
            ));
        }

        Ok(output.stdout)
    }

    fn should_bypass(&self, source: &str) -> bool {
        let Some(pragma) = self.config.bypass_pragma.as_deref() else {
            return false;
        };

        source
            .lines()
            .find(|line| !line.trim().is_empty())
            .is_some_and(|line| line.trim() == pragma)
    }

    fn output_extension(&self) -> &str {
        &self.config.output_extension
    }

    fn source_extensions(&self) -> Vec<String> {
        self.config.extensions.clone()
    }
}

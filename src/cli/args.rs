//! CLI argument definitions using clap derive

use crate::digest::DigestScheme;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Kiln - content-addressed compilation cache
///
/// Compiles source files through configured external compilers and reuses
/// earlier output whenever the source and compiler configuration are
/// unchanged.
#[derive(Parser, Debug)]
#[command(name = "kiln")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Configuration file path
    #[arg(short, long, global = true, env = "KILN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .kiln.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,

    /// Cache root directory (overrides [cache].root)
    #[arg(long, global = true, env = "KILN_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile source files, reusing cached output
    Compile(CompileArgs),

    /// Print the cache entry path for a source file
    Locate(LocateArgs),

    /// Compute cache key digests
    Digest(DigestArgs),

    /// Show cache root, scheme and configured compilers
    Info,

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

/// Arguments for the compile command
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Source files to compile
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Write each output to <DIR>/<stem>.<ext> instead of stdout
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Print cache hit/miss counts to stderr when done
    #[arg(long)]
    pub stats: bool,
}

/// Arguments for the locate command
#[derive(Parser, Debug)]
pub struct LocateArgs {
    /// Source file
    pub file: PathBuf,
}

/// Arguments for the digest command
#[derive(Parser, Debug)]
pub struct DigestArgs {
    /// What to digest
    #[command(subcommand)]
    pub target: DigestTarget,

    /// Key derivation scheme (default: from config)
    #[arg(long, global = true, value_enum)]
    pub scheme: Option<DigestScheme>,
}

/// Digest subcommands
#[derive(Subcommand, Debug)]
pub enum DigestTarget {
    /// Identity digest of configured compilers
    Identity {
        /// Only this compiler
        #[arg(long)]
        compiler: Option<String>,
    },

    /// Content digest of a source file
    Source {
        /// Source file
        file: PathBuf,
    },

    /// Identity digest of an arbitrary JSON document
    Json {
        /// JSON file, or - for stdin
        input: PathBuf,

        /// Print the canonical byte stream instead of the digest
        #[arg(long)]
        canonical: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (cache.root or cache.scheme)
        key: String,
        /// Value to set
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_compile() {
        let cli = Cli::parse_from(["kiln", "compile", "a.coffee", "b.coffee", "--stats"]);
        match cli.command {
            Commands::Compile(args) => {
                assert_eq!(args.files.len(), 2);
                assert!(args.stats);
                assert!(args.out_dir.is_none());
            }
            _ => panic!("expected Compile command"),
        }
    }

    #[test]
    fn cli_compile_requires_files() {
        assert!(Cli::try_parse_from(["kiln", "compile"]).is_err());
    }

    #[test]
    fn cli_parses_digest_json_with_scheme() {
        let cli = Cli::parse_from(["kiln", "digest", "json", "-", "--scheme", "escaped"]);
        match cli.command {
            Commands::Digest(args) => {
                assert_eq!(args.scheme, Some(DigestScheme::Escaped));
                match args.target {
                    DigestTarget::Json { input, canonical } => {
                        assert_eq!(input, PathBuf::from("-"));
                        assert!(!canonical);
                    }
                    _ => panic!("expected Json target"),
                }
            }
            _ => panic!("expected Digest command"),
        }
    }

    #[test]
    fn cli_parses_info() {
        let cli = Cli::parse_from(["kiln", "info"]);
        assert!(matches!(cli.command, Commands::Info));
    }

    #[test]
    fn cli_global_flags() {
        let cli = Cli::parse_from([
            "kiln",
            "--no-local",
            "--cache-dir",
            "/tmp/kiln",
            "--log-format",
            "json",
            "info",
        ]);
        assert!(cli.no_local);
        assert_eq!(cli.cache_dir, Some(PathBuf::from("/tmp/kiln")));
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["kiln", "config", "set", "cache.scheme", "escaped"]);
        match cli.command {
            Commands::Config(ConfigArgs {
                action: Some(ConfigAction::Set { key, value }),
            }) => {
                assert_eq!(key, "cache.scheme");
                assert_eq!(value, "escaped");
            }
            _ => panic!("expected Config Set command"),
        }
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["kiln", "info"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["kiln", "-v", "info"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["kiln", "-vv", "info"]);
        assert_eq!(cli.verbose, 2);
    }
}

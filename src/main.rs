//! cmdset - run argument vectors against a JSON-declared input tree.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cmdset::{Config, InputSet, Stdout};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Recursive command and flag parsing driven by a JSON input tree.
#[derive(Parser, Debug)]
#[command(name = "cmdset", version, about, disable_help_subcommand = true)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Where the input tree declaration comes from.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct ConfigSource {
    /// JSON declaration of the input tree
    #[arg(long)]
    config: Option<String>,

    /// Path to a JSON file declaring the input tree
    #[arg(long, value_name = "PATH")]
    config_file: Option<PathBuf>,
}

impl ConfigSource {
    fn load(&self) -> Result<Config> {
        match (&self.config, &self.config_file) {
            (Some(json), _) => Config::from_json(json).context("failed to parse config JSON"),
            (None, Some(path)) => Config::from_path(path)
                .with_context(|| format!("failed to load config from {}", path.display())),
            (None, None) => anyhow::bail!("no config given"),
        }
    }

    fn build(&self) -> Result<InputSet> {
        self.load()?.build().context("invalid config")
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dispatch arguments to the declared features
    Run {
        #[command(flatten)]
        source: ConfigSource,

        /// Arguments to dispatch
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Print help for the declared inputs
    Help {
        #[command(flatten)]
        source: ConfigSource,

        /// Include long descriptions and nested inputs
        #[arg(long)]
        detailed: bool,

        /// Show help for a single feature
        feature: Option<String>,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Run { source, args } => {
            let mut set = source.build()?;
            let mut console = Stdout::new();
            match set.dispatch(&args, &mut console) {
                Ok(()) => Ok(ExitCode::SUCCESS),
                Err(err) => {
                    tracing::debug!(%err, "dispatch failed");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Help {
            source,
            detailed,
            feature,
        } => {
            let set = source.build()?;
            let mut console = Stdout::new();
            match feature.as_deref() {
                Some(name) => set.output_feature_help(&mut console, Some(name), detailed),
                None if detailed => set.output_all_help(&mut console, true),
                None => set.output_generic_help(&mut console, false),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    const CONFIG: &str =
        r#"{"name":"tool","inputs":[{"name":"go","type":"feature","flags":["go"]}]}"#;

    #[test]
    fn test_run_subcommand_parses_config() {
        let cli = Cli::try_parse_from(["cmdset", "run", "--config", CONFIG, "--"]).unwrap();

        match cli.command {
            Commands::Run { source, args } => {
                assert_eq!(source.config.as_deref(), Some(CONFIG));
                assert!(source.config_file.is_none());
                assert!(args.is_empty());
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_subcommand_parses_args() {
        let cli = Cli::try_parse_from([
            "cmdset", "run", "--config", CONFIG, "--", "go", "-v", "--out=x", "file.txt",
        ])
        .unwrap();

        match cli.command {
            Commands::Run { args, .. } => {
                assert_eq!(args, vec!["go", "-v", "--out=x", "file.txt"]);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_requires_config_source() {
        let result = Cli::try_parse_from(["cmdset", "run", "--", "go"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_sources_conflict() {
        let result = Cli::try_parse_from([
            "cmdset",
            "run",
            "--config",
            CONFIG,
            "--config-file",
            "tree.json",
            "--",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_subcommand() {
        let cli = Cli::try_parse_from([
            "cmdset",
            "help",
            "--config-file",
            "tree.json",
            "--detailed",
            "go",
        ])
        .unwrap();

        match cli.command {
            Commands::Help {
                source,
                detailed,
                feature,
            } => {
                assert_eq!(source.config_file, Some(PathBuf::from("tree.json")));
                assert!(detailed);
                assert_eq!(feature.as_deref(), Some("go"));
            }
            _ => panic!("Expected Help command"),
        }
    }

    #[test]
    fn test_log_level_default_and_override() {
        let cli = Cli::try_parse_from(["cmdset", "help", "--config", CONFIG]).unwrap();
        assert_eq!(cli.log_level, "warn");

        let cli = Cli::try_parse_from([
            "cmdset",
            "help",
            "--config",
            CONFIG,
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn test_source_builds_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let source = ConfigSource {
            config: None,
            config_file: Some(file.path().to_path_buf()),
        };
        let set = source.build().unwrap();
        assert!(set.is_top_level("go"));
        assert!(set.is_top_level("--help"));
    }

    #[test]
    fn test_source_reports_invalid_config() {
        let source = ConfigSource {
            config: Some("{\"default\":\"missing\"}".to_string()),
            config_file: None,
        };
        assert!(source.build().is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        let result = Cli::try_parse_from(["cmdset"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_help() {
        Cli::command().debug_assert();
    }
}

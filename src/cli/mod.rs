//! Command-line interface for forge
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Subcommand dispatch to the command implementations
//! - The hidden `__complete` entry point driving dynamic shell completion

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::api::ForgeClient;
use crate::commands;
use crate::complete::CompletionEngine;
use crate::config::{Config, LogLevel};
use crate::error::Result;

pub mod completion;

/// Work seamlessly with a code-hosting forge from the command line
#[derive(Parser, Debug)]
#[command(
    name = "forge",
    version,
    about = "Work with a code-hosting forge from the command line",
    long_about = "A command-line client for a code-hosting forge with dynamic
shell tab-completion for repositories, labels, and configuration values."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv", global = true)]
    pub very_verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for forge
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate shell completion scripts
    Completion {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Manage configuration for forge
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Manage issues
    Issue {
        #[command(subcommand)]
        command: IssueCommands,
    },

    /// Manage repositories
    Repo {
        #[command(subcommand)]
        command: RepoCommands,
    },

    /// Manage SSH keys
    SshKey {
        #[command(subcommand)]
        command: SshKeyCommands,
    },

    /// Dynamic completion entry point used by the generated shell scripts.
    ///
    /// Receives every word after the program name, with the in-progress
    /// token last, and prints `value<TAB>description` lines. Never fails:
    /// any error degrades to no output so the shell stays quiet.
    #[command(name = "__complete", hide = true)]
    Complete {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print a list of configuration keys and values
    List {
        /// Read per-host settings for this host
        #[arg(long, value_name = "HOST")]
        host: Option<String>,
    },

    /// Update configuration with a value for the given key
    Set {
        /// Write the setting for this host only
        #[arg(long, value_name = "HOST")]
        host: Option<String>,

        /// Configuration key
        key: String,

        /// New value
        value: String,
    },
}

/// Issue subcommands
#[derive(Subcommand, Debug)]
pub enum IssueCommands {
    /// Create a new issue
    Create {
        /// Supply a title
        #[arg(short = 't', long, value_name = "TITLE")]
        title: Option<String>,

        /// Supply a body
        #[arg(short = 'b', long, value_name = "BODY")]
        body: Option<String>,

        /// Add labels by name
        #[arg(short = 'l', long = "label", value_name = "LABEL")]
        labels: Vec<String>,

        /// Select another repository using the OWNER/REPO format
        #[arg(short = 'R', long, value_name = "OWNER/REPO")]
        repo: Option<String>,

        /// Print the URL for creating an issue in the browser
        #[arg(short = 'w', long)]
        web: bool,
    },
}

/// Repository subcommands
#[derive(Subcommand, Debug)]
pub enum RepoCommands {
    /// View a repository
    View {
        /// Repository to view in the OWNER/REPO format
        #[arg(value_name = "OWNER/REPO")]
        repository: Option<String>,

        /// View a specific branch of the repository
        #[arg(short = 'b', long, value_name = "BRANCH")]
        branch: Option<String>,

        /// Print the repository URL for the browser
        #[arg(short = 'w', long)]
        web: bool,
    },
}

/// SSH key subcommands
#[derive(Subcommand, Debug)]
pub enum SshKeyCommands {
    /// Add an SSH key to your account
    Add {
        /// Public key file, or `-` for stdin
        #[arg(value_name = "KEY-FILE")]
        key_file: Option<PathBuf>,

        /// Title for the new key
        #[arg(short = 't', long, value_name = "TITLE")]
        title: Option<String>,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        let args = CliArgs::parse();
        let config = Self::load_config(&args)?;

        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let config_path = args.config_file.as_deref();
        let mut config = Config::load_from_file(config_path)?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {e}");
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        Self::apply_logging_args(&mut config, args);

        Ok(config)
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Dispatch the parsed subcommand.
    pub async fn handle_subcommand(&self) -> Result<()> {
        match &self.args.command {
            Commands::Completion { shell } => completion::generate_completion(shell),
            Commands::Config { command } => self.handle_config_command(command),
            Commands::Issue { command } => self.handle_issue_command(command).await,
            Commands::Repo { command } => self.handle_repo_command(command).await,
            Commands::SshKey { command } => self.handle_ssh_key_command(command).await,
            Commands::Complete { words } => {
                self.run_dynamic_completion(words);
                Ok(())
            }
        }
    }

    fn handle_config_command(&self, command: &ConfigCommands) -> Result<()> {
        match command {
            ConfigCommands::List { host } => {
                commands::config::run_list(&self.config, host.as_deref())
            }
            ConfigCommands::Set { host, key, value } => commands::config::run_set(
                self.args.config_file.as_deref(),
                host.as_deref(),
                key,
                value,
            ),
        }
    }

    async fn handle_issue_command(&self, command: &IssueCommands) -> Result<()> {
        match command {
            IssueCommands::Create {
                title,
                body,
                labels,
                repo,
                web,
            } => {
                let client = ForgeClient::from_config(&self.config)?;
                let opts = commands::issue::IssueCreateOptions {
                    title: title.clone(),
                    body: body.clone(),
                    labels: labels.clone(),
                    repo: repo.clone(),
                    web: *web,
                };
                commands::issue::run_create(&client, opts).await
            }
        }
    }

    async fn handle_repo_command(&self, command: &RepoCommands) -> Result<()> {
        match command {
            RepoCommands::View {
                repository,
                branch,
                web,
            } => {
                let client = ForgeClient::from_config(&self.config)?;
                commands::repo::run_view(&client, repository.as_deref(), branch.as_deref(), *web)
                    .await
            }
        }
    }

    async fn handle_ssh_key_command(&self, command: &SshKeyCommands) -> Result<()> {
        match command {
            SshKeyCommands::Add { key_file, title } => {
                let client = ForgeClient::from_config(&self.config)?;
                commands::ssh_key::run_add(&client, key_file.as_deref(), title.as_deref()).await
            }
        }
    }

    /// Drive the Action engine for one completion request.
    ///
    /// Output is `value<TAB>description` per candidate, the description
    /// omitted when empty. Every failure path is silent: a broken config
    /// or unreachable host must not disturb the user's prompt.
    fn run_dynamic_completion(&self, words: &[String]) {
        let client = match ForgeClient::from_config(&self.config) {
            Ok(client) => client,
            Err(e) => {
                debug!(error = %e, "completion transport unavailable");
                return;
            }
        };

        let engine = CompletionEngine::new(Arc::new(client), self.config.clone());
        for candidate in engine.complete(words) {
            if candidate.description.is_empty() {
                println!("{}", candidate.value);
            } else {
                println!("{}\t{}", candidate.value, candidate.description);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_config_set() {
        let args =
            CliArgs::try_parse_from(vec!["forge", "config", "set", "git_protocol", "ssh"]).unwrap();

        match args.command {
            Commands::Config {
                command: ConfigCommands::Set { host, key, value },
            } => {
                assert!(host.is_none());
                assert_eq!(key, "git_protocol");
                assert_eq!(value, "ssh");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_args_issue_create_repeated_labels() {
        let args = CliArgs::try_parse_from(vec![
            "forge", "issue", "create", "--title", "Crash", "--label", "bug", "--label", "docs",
        ])
        .unwrap();

        match args.command {
            Commands::Issue {
                command: IssueCommands::Create { title, labels, .. },
            } => {
                assert_eq!(title.as_deref(), Some("Crash"));
                assert_eq!(labels, vec!["bug".to_string(), "docs".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_args_ssh_key_kebab_name() {
        let args = CliArgs::try_parse_from(vec!["forge", "ssh-key", "add", "id_rsa.pub"]).unwrap();

        match args.command {
            Commands::SshKey {
                command: SshKeyCommands::Add { key_file, .. },
            } => {
                assert_eq!(key_file, Some(PathBuf::from("id_rsa.pub")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_hidden_complete_collects_raw_words() {
        let args = CliArgs::try_parse_from(vec![
            "forge",
            "__complete",
            "issue",
            "create",
            "--label",
            "",
        ])
        .unwrap();

        match args.command {
            Commands::Complete { words } => {
                assert_eq!(words, vec!["issue", "create", "--label", ""]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_apply_logging_args_precedence() {
        let mut config = Config::default();
        let args = CliArgs::try_parse_from(vec!["forge", "--vv", "config", "list"]).unwrap();
        CliInterface::apply_logging_args(&mut config, &args);
        assert_eq!(config.logging.level, LogLevel::Trace);

        let mut config = Config::default();
        let args = CliArgs::try_parse_from(vec!["forge", "-q", "config", "list"]).unwrap();
        CliInterface::apply_logging_args(&mut config, &args);
        assert_eq!(config.logging.level, LogLevel::Error);
    }
}

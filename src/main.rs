//! forge - command-line client for a code-hosting forge
//!
//! Work with repositories, issues, SSH keys, and configuration from the
//! terminal, with dynamic shell tab-completion powered by a lazy
//! completion-action engine.
//!
//! # Usage
//!
//! ```bash
//! forge repo view octocat/hello-world
//! forge issue create --repo octocat/hello-world --title "Crash on start"
//! forge completion zsh > ~/.zfunc/_forge
//! ```

use tracing::Level;

mod api;
mod cli;
mod commands;
mod complete;
mod config;
mod error;

use cli::CliInterface;
use error::Result;

/// Application entry point
#[tokio::main]
async fn main() {
    // Initialize the application and handle any errors
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// This function orchestrates the application startup:
/// 1. Parse command-line arguments
/// 2. Load configuration
/// 3. Initialize logging
/// 4. Dispatch the subcommand
///
/// # Returns
/// * `Result<()>` - Success or error
async fn run() -> Result<()> {
    // Parse command-line arguments and load configuration
    let cli = CliInterface::new()?;

    // Initialize logging based on verbosity
    initialize_logging(&cli);

    cli.handle_subcommand().await
}

/// Initialize logging system based on verbosity level
///
/// # Arguments
/// * `cli` - CLI interface with verbosity settings
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else {
        cli.config().logging.level.to_tracing_level()
    };

    // Logs go to stderr; `__complete` output on stdout must stay parseable.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    // Configure timestamps
    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}

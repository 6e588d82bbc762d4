//! envship CLI Application
//!
//! Ships pyenv and nodenv to a remote host: clone locally, pack, copy with
//! scp, unpack with ssh.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::Parser;
use envship::cli::{self, CliError, Commands, EXIT_OK, exit_code_for, render_error};
use envship::commands::{execute_install, execute_list};
use envship::config::{FileConfig, InstallSettings};
use envship::tracing::{TracingConfig, init_tracing};
use envship_core::ProcessRunner;

/// Exit code when the runtime or logging cannot be set up
const EXIT_STARTUP: i32 = 1;

fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing infrastructure
    // may be corrupted during a panic, so we use the most reliable output method.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::Cli::parse();

    let tracing_config = TracingConfig {
        format: cli.tracing_format(),
        level: cli.level.into(),
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(EXIT_STARTUP);
    }

    let exit_code = match cli.command {
        // Listing needs no runtime
        Commands::List => {
            print!("{}", execute_list());
            EXIT_OK
        }
        Commands::Install(args) => run_with_tokio(cli.config.as_deref(), args),
    };
    std::process::exit(exit_code);
}

/// Create tokio runtime and run the install
fn run_with_tokio(config: Option<&std::path::Path>, args: cli::InstallArgs) -> i32 {
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {e}");
            return EXIT_STARTUP;
        }
    };

    match rt.block_on(install(config, args)) {
        Ok(()) => EXIT_OK,
        Err(err) => {
            tracing::error!("{}", err.message());
            render_error(&err);
            exit_code_for(&err)
        }
    }
}

async fn install(config: Option<&std::path::Path>, args: cli::InstallArgs) -> Result<(), CliError> {
    let file = match config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = InstallSettings::resolve(args, file)?;
    let summary = execute_install(&settings, &ProcessRunner::new()).await?;

    tracing::debug!(
        installed = summary.installed.len(),
        unknown = summary.unknown.len(),
        "Install run finished"
    );
    Ok(())
}

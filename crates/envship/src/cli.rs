//! Command-line definition, CLI error type and exit codes.

use clap::{Args, Parser, Subcommand};
use miette::{Diagnostic, Report};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

use crate::tracing::{LogLevel, TracingFormat};

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Prerequisite, I/O or remote command failure exit code
pub const EXIT_RUNTIME: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("CLI/configuration error: {message}")]
    #[diagnostic(code(envship::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Install or prerequisite failure (exit code 3)
    #[error("Runtime error: {message}")]
    #[diagnostic(code(envship::cli::runtime))]
    Runtime {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new runtime error
    #[must_use]
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new runtime error with help text
    #[must_use]
    pub fn runtime_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// The message without the category prefix, as written to the log.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Config { message, .. } | Self::Runtime { message, .. } => message,
        }
    }
}

/// Convert `envship_core::Error` to the matching `CliError` category.
///
/// Configuration problems exit with 2; everything that went wrong while
/// talking to git, ssh or the filesystem exits with 3.
impl From<envship_core::Error> for CliError {
    fn from(err: envship_core::Error) -> Self {
        match err {
            // Extract just the message to avoid "Configuration error: Configuration error:"
            envship_core::Error::Configuration { message } => Self::config(message),
            envship_core::Error::MissingPrerequisite { program, help } => match help {
                Some(h) => Self::runtime_with_help(h, format!("`{program}` must be on PATH")),
                None => Self::runtime(format!("{program} is not installed")),
            },
            envship_core::Error::Install { .. } => {
                let cause = err.root_cause().to_string();
                Self::runtime_with_help(
                    format!("{err}: {cause}"),
                    "Nothing is rolled back; re-running the install starts from a fresh cache",
                )
            }
            envship_core::Error::Io {
                ref source,
                ref path,
                ref operation,
            } => {
                let path_str = path
                    .as_ref()
                    .map_or(String::new(), |p| format!(" on {}", p.display()));
                Self::runtime_with_help(
                    format!("I/O {operation} failed{path_str}: {source}"),
                    "Check file permissions and ensure the path exists",
                )
            }
            envship_core::Error::CommandSpawn { .. }
            | envship_core::Error::CommandFailed { .. }
            | envship_core::Error::Archive { .. } => Self::runtime(err.to_string()),
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Runtime { .. } => EXIT_RUNTIME,
    }
}

/// Write the miette report for `err` to standard error.
#[allow(clippy::print_stderr)]
pub fn render_error(err: &CliError) {
    let report = Report::new(err.clone());
    eprintln!("{report:?}");
    // Ensure output is flushed before process exit
    let _ = io::stderr().flush();
}

/// Provision version managers onto a remote host over SSH.
///
/// Each tool is shallow-cloned locally, packed into a tarball, copied over
/// with scp and unpacked with ssh.
#[derive(Parser, Debug)]
#[command(name = "envship")]
#[command(about = "Provision pyenv and nodenv onto a remote host over SSH")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        default_value = "info",
        value_enum
    )]
    pub level: LogLevel,

    /// Log line layout.
    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "plain",
        value_enum
    )]
    pub format: TracingFormat,

    /// Shortcut for `--format json`.
    #[arg(long, global = true, help = "Emit structured JSON logs")]
    pub json: bool,

    /// TOML file with connection defaults.
    #[arg(
        long,
        short = 'c',
        global = true,
        help = "Read defaults from a TOML config file",
        value_name = "FILE"
    )]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Effective log format after applying `--json`.
    #[must_use]
    pub const fn tracing_format(&self) -> TracingFormat {
        if self.json {
            TracingFormat::Json
        } else {
            self.format
        }
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install tools onto the remote host.
    #[command(about = "Install tools onto the remote host")]
    Install(InstallArgs),
    /// List the tools that can be installed.
    #[command(about = "List the tools that can be installed", visible_alias = "ls")]
    List,
}

/// Arguments of `envship install`.
///
/// Connection values left unset here may still come from the environment or
/// the config file; validation happens once all layers are merged.
#[derive(Args, Debug, Clone, Default)]
pub struct InstallArgs {
    /// Tools to install, in order.
    #[arg(required = true, value_name = "TOOL", help = "Tools to install (pyenv, nodenv)")]
    pub tools: Vec<String>,

    // String rather than PathBuf: an empty value must reach validation.
    /// Private key passed to ssh and scp with `-i`.
    #[arg(
        long = "ssh-key",
        visible_alias = "remote-server-ssh-key",
        aliases = ["ssh_key", "remote_server_ssh_key"],
        env = "ENVSHIP_SSH_KEY",
        value_name = "PATH"
    )]
    pub ssh_key: Option<String>,

    /// Login user on the remote host.
    #[arg(
        long = "user",
        visible_alias = "remote-server-user",
        aliases = ["remote_server_user"],
        env = "ENVSHIP_USER"
    )]
    pub user: Option<String>,

    /// Remote host name or address.
    #[arg(
        long = "host",
        visible_alias = "remote-server-host",
        aliases = ["remote_server_host"],
        env = "ENVSHIP_HOST"
    )]
    pub host: Option<String>,

    /// SSH port, when not 22.
    #[arg(long, env = "ENVSHIP_PORT")]
    pub port: Option<u16>,

    /// Git host or mirror the repositories are cloned from.
    #[arg(
        long = "git-base-url",
        aliases = ["git_base_url"],
        env = "ENVSHIP_GIT_BASE_URL",
        value_name = "URL"
    )]
    pub git_base_url: Option<String>,

    /// Local directory holding per-tool caches.
    #[arg(
        long = "cache-dir",
        aliases = ["cache_dir"],
        env = "ENVSHIP_CACHE_DIR",
        value_name = "DIR"
    )]
    pub cache_dir: Option<String>,

    /// Remote destination for pyenv.
    #[arg(long = "pyenv-dist-path", aliases = ["pyenv_dist_path"], value_name = "PATH")]
    pub pyenv_dist_path: Option<String>,

    /// Remote destination for nodenv.
    #[arg(long = "nodenv-dist-path", aliases = ["nodenv_dist_path"], value_name = "PATH")]
    pub nodenv_dist_path: Option<String>,
}

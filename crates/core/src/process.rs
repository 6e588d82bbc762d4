//! External process execution.
//!
//! Every program envship shells out to (git, ssh, scp) goes through the
//! [`CommandRunner`] trait. [`ProcessRunner`] spawns real processes with
//! `tokio::process`, while `MockRunner` (feature `test-utils`) records
//! commands for tests and can be told to fail specific programs.

use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::{Error, Result};

/// A program invocation: the program name and its argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    /// Program to run, resolved through `PATH`.
    pub program: String,
    /// Arguments passed verbatim, without any shell in between.
    pub args: Vec<String>,
    /// Discard standard output instead of passing it through.
    pub quiet: bool,
}

impl ExternalCommand {
    /// Create a command for `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            quiet: false,
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Suppress standard output.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Runs external commands to completion.
///
/// Implementations must only return `Ok(())` when the program exited with
/// status zero.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command and wait for it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommandSpawn`] if the program cannot be started and
    /// [`Error::CommandFailed`] if it exits unsuccessfully.
    async fn run(&self, command: &ExternalCommand) -> Result<()>;
}

/// Production runner backed by `tokio::process`.
///
/// Standard error and (unless the command is quiet) standard output are
/// inherited, so progress from git and scp reaches the operator untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a new process runner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &ExternalCommand) -> Result<()> {
        debug!(%command, "Running external command");

        let stdout = if command.quiet {
            Stdio::null()
        } else {
            Stdio::inherit()
        };

        let status = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| Error::CommandSpawn {
                command: command.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(Error::CommandFailed {
                command: command.to_string(),
                code: status.code(),
            });
        }

        Ok(())
    }
}

/// Test double that records every command instead of running it.
///
/// `git clone` invocations create their destination directory with a
/// `README.md` marker, so the rest of an install can run against the
/// filesystem as if the clone had happened.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MockRunner {
    commands: std::sync::Mutex<Vec<ExternalCommand>>,
    failing: Vec<String>,
    unavailable: Vec<String>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRunner {
    /// Create a runner where every command succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every invocation of `program` exit with status 1.
    #[must_use]
    pub fn failing(mut self, program: impl Into<String>) -> Self {
        self.failing.push(program.into());
        self
    }

    /// Make `program` behave as if it were not installed.
    #[must_use]
    pub fn unavailable(mut self, program: impl Into<String>) -> Self {
        self.unavailable.push(program.into());
        self
    }

    /// Commands seen so far, in call order.
    #[must_use]
    pub fn commands(&self) -> Vec<ExternalCommand> {
        self.commands
            .lock()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }

    /// Programs seen so far, in call order.
    #[must_use]
    pub fn programs(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .map(|command| command.program)
            .collect()
    }

    fn simulate_clone(command: &ExternalCommand) -> Result<()> {
        let Some(dest) = command.args.last() else {
            return Ok(());
        };
        let dest = std::path::PathBuf::from(dest);
        std::fs::create_dir_all(&dest)
            .and_then(|()| std::fs::write(dest.join("README.md"), command.to_string()))
            .map_err(|e| Error::io(e, Some(dest), "simulate clone"))
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command: &ExternalCommand) -> Result<()> {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command.clone());
        }

        if self.unavailable.contains(&command.program) {
            return Err(Error::CommandSpawn {
                command: command.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            });
        }

        if self.failing.contains(&command.program) {
            return Err(Error::CommandFailed {
                command: command.to_string(),
                code: Some(1),
            });
        }

        if command.program == "git" && command.args.first().is_some_and(|a| a == "clone") {
            Self::simulate_clone(command)?;
        }

        Ok(())
    }
}

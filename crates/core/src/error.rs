//! Error types for the envship-core crate

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::installer::InstallStage;

/// Main error type for envship operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {message}")]
    #[diagnostic(code(envship::config::invalid))]
    Configuration {
        /// The error message describing the configuration issue
        message: String,
    },

    /// A required external program is not available
    #[error("Missing prerequisite: {program}")]
    #[diagnostic(code(envship::prerequisite::missing))]
    MissingPrerequisite {
        /// Name of the program that could not be run
        program: String,
        /// Install hint shown to the operator
        #[help]
        help: Option<String>,
    },

    /// The program could not be started at all
    #[error("Failed to start `{command}`: {source}")]
    #[diagnostic(
        code(envship::process::spawn),
        help("Check that the program is installed and on PATH")
    )]
    CommandSpawn {
        /// Rendered command line
        command: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited unsuccessfully
    #[error("Command `{command}` failed with {}", exit_label(*code))]
    #[diagnostic(code(envship::process::failed))]
    CommandFailed {
        /// Rendered command line
        command: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
    },

    /// I/O error with path context
    #[error("I/O error during {operation}: {source}")]
    #[diagnostic(code(envship::io::error))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// The path where the I/O error occurred, if applicable
        path: Option<Box<std::path::Path>>,
        /// Description of the operation that failed
        operation: String,
    },

    /// Archive packaging error
    #[error("Failed to archive {}: {message}", path.display())]
    #[diagnostic(code(envship::archive::failed))]
    Archive {
        /// Directory or archive being processed
        path: Box<std::path::Path>,
        /// The error message describing the failure
        message: String,
    },

    /// A tool install aborted part way through
    #[error("Installing {tool} failed while {stage}")]
    #[diagnostic(
        code(envship::install::failed),
        help("Nothing is rolled back; re-running the install starts from a fresh cache")
    )]
    Install {
        /// Tool being installed
        tool: String,
        /// Stage that was running when the failure occurred
        stage: InstallStage,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },
}

fn exit_label(code: Option<i32>) -> String {
    code.map_or_else(
        || "termination by signal".to_string(),
        |c| format!("exit code {c}"),
    )
}

impl Error {
    /// Create a configuration error with a message
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a missing prerequisite error with an install hint
    pub fn missing_prerequisite(program: impl Into<String>, help: impl Into<String>) -> Self {
        Self::MissingPrerequisite {
            program: program.into(),
            help: Some(help.into()),
        }
    }

    /// Create an I/O error with context
    pub fn io(source: std::io::Error, path: Option<PathBuf>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: path.map(|p| p.into_boxed_path()),
            operation: operation.into(),
        }
    }

    /// Create an archive error
    pub fn archive(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Archive {
            path: path.into().into_boxed_path(),
            message: message.into(),
        }
    }

    /// Attach the tool and stage an install failure happened in
    pub fn install(tool: impl Into<String>, stage: InstallStage, source: Self) -> Self {
        Self::Install {
            tool: tool.into(),
            stage,
            source: Box::new(source),
        }
    }

    /// Innermost error, skipping install context wrappers
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Install { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type for envship operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_display() {
        let error = Error::CommandFailed {
            command: "git clone x y".to_string(),
            code: Some(128),
        };
        assert_eq!(
            error.to_string(),
            "Command `git clone x y` failed with exit code 128"
        );

        let error = Error::CommandFailed {
            command: "scp a b".to_string(),
            code: None,
        };
        assert!(error.to_string().ends_with("termination by signal"));
    }

    #[test]
    fn test_install_error_wraps_stage() {
        let inner = Error::CommandFailed {
            command: "ssh host true".to_string(),
            code: Some(255),
        };
        let error = Error::install("nodenv", InstallStage::Uploaded, inner);

        assert_eq!(
            error.to_string(),
            "Installing nodenv failed while uploading the archive"
        );
        assert!(matches!(
            error.root_cause(),
            Error::CommandFailed {
                code: Some(255),
                ..
            }
        ));
    }

    #[test]
    fn test_configuration_error() {
        let error = Error::configuration("host is empty");
        assert_eq!(error.to_string(), "Configuration error: host is empty");
    }

    #[test]
    fn test_io_error_keeps_operation() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = Error::io(io, Some(PathBuf::from(".cache/pyenv")), "remove cache");
        assert!(error.to_string().starts_with("I/O error during remove cache"));
    }
}

//! Git command wrappers.

use std::path::Path;

use crate::process::{CommandRunner, ExternalCommand};
use crate::{Error, Result};

/// Shallow clone of a single ref: `git clone --branch <ref> --depth 1 <url> <dest>`.
#[must_use]
pub fn shallow_clone(url: &str, git_ref: &str, dest: &Path) -> ExternalCommand {
    ExternalCommand::new("git")
        .args(["clone", "--branch", git_ref, "--depth", "1", url])
        .arg(dest.to_string_lossy())
}

/// Check that a git client is installed.
///
/// # Errors
///
/// Returns [`Error::MissingPrerequisite`] if `git --version` cannot run or
/// exits unsuccessfully.
pub async fn check_available(runner: &dyn CommandRunner) -> Result<()> {
    let probe = ExternalCommand::new("git").arg("--version").quiet();
    runner.run(&probe).await.map_err(|_| {
        Error::missing_prerequisite("git", "Git is not installed. Please install Git first.")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::MockRunner;

    #[test]
    fn test_shallow_clone_arguments() {
        let command = shallow_clone(
            "https://github.com/nodenv/nodenv.git",
            "main",
            Path::new(".cache/nodenv/nodenv"),
        );
        assert_eq!(command.program, "git");
        assert_eq!(
            command.args,
            vec![
                "clone",
                "--branch",
                "main",
                "--depth",
                "1",
                "https://github.com/nodenv/nodenv.git",
                ".cache/nodenv/nodenv"
            ]
        );
    }

    #[tokio::test]
    async fn test_check_available_missing() {
        let runner = MockRunner::new().unavailable("git");
        let err = check_available(&runner).await.unwrap_err();
        assert!(matches!(err, Error::MissingPrerequisite { ref program, .. } if program == "git"));
    }

    #[tokio::test]
    async fn test_check_available_is_quiet() {
        let runner = MockRunner::new();
        check_available(&runner).await.unwrap();
        let commands = runner.commands();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].quiet);
    }
}

//! pyenv installer for envship.
//!
//! Installs [pyenv](https://github.com/pyenv/pyenv). The python-build plugin
//! ships inside the pyenv repository, so no extra plugin clone is needed.

use async_trait::async_trait;
use envship_core::{InstallOptions, ToolDescriptor, ToolInstaller};

/// pyenv's default branch.
const GIT_REF: &str = "master";

/// Mirror serving CPython source tarballs for python-build.
const PYTHON_BUILD_MIRROR_URL: &str = "https://registry.npmmirror.com/-/binary/python";

/// Installer for pyenv.
#[derive(Debug, Clone)]
pub struct PyenvInstaller {
    descriptor: ToolDescriptor,
}

impl Default for PyenvInstaller {
    fn default() -> Self {
        Self::new(&InstallOptions::default())
    }
}

impl PyenvInstaller {
    /// Create an installer from shared options.
    #[must_use]
    pub fn new(options: &InstallOptions) -> Self {
        let descriptor = ToolDescriptor {
            name: "pyenv".to_string(),
            repo_url: options.repo_url("pyenv/pyenv"),
            plugins: Vec::new(),
            git_ref: GIT_REF.to_string(),
            cache_dir: options.cache_dir("pyenv"),
            dist_path: options.dist_path("pyenv"),
        };
        Self { descriptor }
    }
}

#[async_trait]
impl ToolInstaller for PyenvInstaller {
    fn name(&self) -> &'static str {
        "pyenv"
    }

    fn description(&self) -> &'static str {
        "Python version manager (python-build included)"
    }

    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn post_install_notes(&self) -> Vec<String> {
        let root = &self.descriptor.dist_path;
        vec![
            format!(
                "Please ssh into the remote server and add the following lines to your shell profile (~/.bashrc, ~/.zshrc, etc.):\n  export PYENV_ROOT=\"{root}\"\n  export PATH=\"$PYENV_ROOT/bin:$PATH\"\n  eval \"$(pyenv init -)\""
            ),
            format!(
                "To download Python sources from a mirror, also add:\n  export PYTHON_BUILD_MIRROR_URL=\"{PYTHON_BUILD_MIRROR_URL}\"\n  export PYTHON_BUILD_MIRROR_URL_SKIP_CHECKSUM=1"
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envship_core::{Error, InstallStage, MockRunner, RemoteTarget};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_installer_default() {
        let installer = PyenvInstaller::default();
        assert_eq!(installer.name(), "pyenv");

        let d = installer.descriptor();
        assert_eq!(d.repo_url, "https://github.com/pyenv/pyenv.git");
        assert_eq!(d.git_ref, "master");
        assert!(d.plugins.is_empty());
        assert_eq!(d.cache_dir, PathBuf::from(".cache/pyenv"));
        assert_eq!(d.dist_path, "~/.pyenv");
        assert_eq!(d.remote_archive_path(), "~/tools-installer/pyenv.tar.gz");
    }

    #[test]
    fn test_notes_follow_dist_path() {
        let options = InstallOptions::new().with_dist_path(Some("/srv/pyenv".to_string()));
        let notes = PyenvInstaller::new(&options).post_install_notes();

        assert!(notes[0].contains("PYENV_ROOT=\"/srv/pyenv\""));
        assert!(notes[1].contains(PYTHON_BUILD_MIRROR_URL));
    }

    #[tokio::test]
    async fn test_install_single_clone() {
        let temp = TempDir::new().unwrap();
        let options = InstallOptions::new().with_cache_root(temp.path());
        let installer = PyenvInstaller::new(&options);
        let remote = RemoteTarget::new("/keys/id", "deploy", "build01").unwrap();
        let runner = MockRunner::new();

        installer.install(&remote, &runner).await.unwrap();

        assert_eq!(runner.programs(), vec!["git", "ssh", "scp", "ssh"]);
    }

    #[tokio::test]
    async fn test_remote_mkdir_failure_is_fatal() {
        let temp = TempDir::new().unwrap();
        let options = InstallOptions::new().with_cache_root(temp.path());
        let installer = PyenvInstaller::new(&options);
        let remote = RemoteTarget::new("/keys/id", "deploy", "build01").unwrap();
        let runner = MockRunner::new().failing("ssh");

        let err = installer.install(&remote, &runner).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Install {
                stage: InstallStage::RemoteDirEnsured,
                ..
            }
        ));
        assert_eq!(runner.programs(), vec!["git", "ssh"]);
    }
}

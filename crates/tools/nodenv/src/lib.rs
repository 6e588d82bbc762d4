//! nodenv installer for envship.
//!
//! Installs [nodenv](https://github.com/nodenv/nodenv) with the
//! [node-build](https://github.com/nodenv/node-build) plugin nested under
//! `plugins/node-build`, so `nodenv install` works on the remote host
//! without any further setup.

use async_trait::async_trait;
use envship_core::{InstallOptions, Plugin, ToolDescriptor, ToolInstaller};

/// Branch cloned for nodenv and node-build.
const GIT_REF: &str = "main";

/// Release mirror for node-build downloads.
const NODE_BUILD_MIRROR_URL: &str = "https://mirrors.tuna.tsinghua.edu.cn/nodejs-release";

/// Installer for nodenv and node-build.
#[derive(Debug, Clone)]
pub struct NodenvInstaller {
    descriptor: ToolDescriptor,
}

impl Default for NodenvInstaller {
    fn default() -> Self {
        Self::new(&InstallOptions::default())
    }
}

impl NodenvInstaller {
    /// Create an installer from shared options.
    #[must_use]
    pub fn new(options: &InstallOptions) -> Self {
        let descriptor = ToolDescriptor {
            name: "nodenv".to_string(),
            repo_url: options.repo_url("nodenv/nodenv"),
            plugins: vec![Plugin::new(
                "node-build",
                options.repo_url("nodenv/node-build"),
            )],
            git_ref: GIT_REF.to_string(),
            cache_dir: options.cache_dir("nodenv"),
            dist_path: options.dist_path("nodenv"),
        };
        Self { descriptor }
    }
}

#[async_trait]
impl ToolInstaller for NodenvInstaller {
    fn name(&self) -> &'static str {
        "nodenv"
    }

    fn description(&self) -> &'static str {
        "Node.js version manager with the node-build plugin"
    }

    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn post_install_notes(&self) -> Vec<String> {
        let root = &self.descriptor.dist_path;
        vec![
            format!(
                "Please ssh into the remote server and run the following command to add nodenv to your PATH:\n  {root}/bin/nodenv init"
            ),
            format!(
                "To use the Tsinghua Tuna mirror for node-build, add the following line to your shell profile (~/.bashrc, ~/.zshrc, etc.):\n  export NODE_BUILD_MIRROR_URL=\"{NODE_BUILD_MIRROR_URL}\""
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envship_core::{MockRunner, RemoteTarget};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_installer_default() {
        let installer = NodenvInstaller::default();
        assert_eq!(installer.name(), "nodenv");

        let d = installer.descriptor();
        assert_eq!(d.repo_url, "https://github.com/nodenv/nodenv.git");
        assert_eq!(d.git_ref, "main");
        assert_eq!(d.cache_dir, PathBuf::from(".cache/nodenv"));
        assert_eq!(d.dist_path, "~/.nodenv");
    }

    #[test]
    fn test_node_build_plugin() {
        let installer = NodenvInstaller::default();
        let d = installer.descriptor();

        assert_eq!(d.plugins.len(), 1);
        assert_eq!(d.plugins[0].name, "node-build");
        assert_eq!(d.plugins[0].url, "https://github.com/nodenv/node-build.git");
        assert_eq!(
            d.plugin_dir(&d.plugins[0]),
            PathBuf::from(".cache/nodenv/nodenv/plugins/node-build")
        );
    }

    #[test]
    fn test_mirror_base_url() {
        let options = InstallOptions::new().with_git_base_url("https://gitee.com/");
        let installer = NodenvInstaller::new(&options);
        assert_eq!(
            installer.descriptor().repo_url,
            "https://gitee.com/nodenv/nodenv.git"
        );
    }

    #[test]
    fn test_notes_follow_dist_path() {
        let options = InstallOptions::new().with_dist_path(Some("/opt/nodenv".to_string()));
        let notes = NodenvInstaller::new(&options).post_install_notes();

        assert!(notes[0].contains("/opt/nodenv/bin/nodenv init"));
        assert!(notes[1].contains("NODE_BUILD_MIRROR_URL"));
    }

    #[tokio::test]
    async fn test_install_issues_expected_commands() {
        let temp = TempDir::new().unwrap();
        let options = InstallOptions::new().with_cache_root(temp.path());
        let installer = NodenvInstaller::new(&options);
        let remote = RemoteTarget::new("/keys/id", "deploy", "build01").unwrap();
        let runner = MockRunner::new();

        let report = installer.install(&remote, &runner).await.unwrap();

        assert_eq!(runner.programs(), vec!["git", "git", "ssh", "scp", "ssh"]);
        assert_eq!(report.destination, "~/.nodenv");
        assert_eq!(report.notes.len(), 2);
    }
}

//! Tool installer trait and the shared remote install workflow.
//!
//! Every tool (pyenv, nodenv, ...) is described by a [`ToolDescriptor`]:
//! where to clone it from, which plugins to nest under `plugins/`, and where
//! it lands on the remote host. The [`InstallWorkflow`] turns a descriptor
//! into the fixed sequence of steps:
//!
//! ```text
//! Idle → CachePrepared → Cloned → RemoteDirEnsured → Archived → Uploaded → Unpacked → Done
//! ```
//!
//! Any failing step ends the install with [`Error::Install`] carrying the
//! stage; nothing is retried or rolled back.

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::archive;
use crate::cache::{self, DEFAULT_CACHE_ROOT};
use crate::git;
use crate::process::CommandRunner;
use crate::remote::{self, RemoteTarget, STAGING_DIR};
use crate::{Error, Result};

/// Default host used to build repository URLs.
pub const DEFAULT_GIT_BASE_URL: &str = "https://github.com";

/// A plugin repository cloned into the tool's `plugins/` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    /// Directory name under `plugins/` (e.g., "node-build").
    pub name: String,
    /// Clone URL.
    pub url: String,
}

impl Plugin {
    /// Create a plugin entry.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Everything needed to install one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    /// Tool name; also the clone directory and archive base name.
    pub name: String,
    /// Clone URL of the tool itself.
    pub repo_url: String,
    /// Plugins nested under `<clone>/plugins/<name>`.
    pub plugins: Vec<Plugin>,
    /// Branch or tag cloned for the tool and its plugins.
    pub git_ref: String,
    /// Local scratch directory, recreated on every install.
    pub cache_dir: PathBuf,
    /// Final directory on the remote host.
    pub dist_path: String,
}

impl ToolDescriptor {
    /// Directory the tool repository is cloned into.
    #[must_use]
    pub fn clone_dir(&self) -> PathBuf {
        self.cache_dir.join(&self.name)
    }

    /// Directory a plugin is cloned into.
    #[must_use]
    pub fn plugin_dir(&self, plugin: &Plugin) -> PathBuf {
        self.clone_dir().join("plugins").join(&plugin.name)
    }

    /// Local path of the packaged archive.
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.cache_dir.join(format!("{}.tar.gz", self.name))
    }

    /// Remote path the archive is uploaded to.
    #[must_use]
    pub fn remote_archive_path(&self) -> String {
        format!("{STAGING_DIR}/{}.tar.gz", self.name)
    }
}

/// User-adjustable inputs shared by all installers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    git_base_url: String,
    cache_root: PathBuf,
    dist_path: Option<String>,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            git_base_url: DEFAULT_GIT_BASE_URL.to_string(),
            cache_root: PathBuf::from(DEFAULT_CACHE_ROOT),
            dist_path: None,
        }
    }
}

impl InstallOptions {
    /// Create options with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another git host (mirror). A trailing `/` is dropped.
    #[must_use]
    pub fn with_git_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.git_base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Keep tool caches under `root` instead of `.cache`. An empty path is
    /// ignored.
    #[must_use]
    pub fn with_cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        if !root.as_os_str().is_empty() {
            self.cache_root = root;
        }
        self
    }

    /// Install into `path` on the remote host instead of `~/.<tool>`.
    #[must_use]
    pub fn with_dist_path(mut self, path: Option<String>) -> Self {
        self.dist_path = path.filter(|p| !p.trim().is_empty());
        self
    }

    /// Git base URL without trailing slash.
    #[must_use]
    pub fn git_base_url(&self) -> &str {
        &self.git_base_url
    }

    /// Cache root directory.
    #[must_use]
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Clone URL for `owner/repo` on the configured host.
    #[must_use]
    pub fn repo_url(&self, owner_repo: &str) -> String {
        format!("{}/{owner_repo}.git", self.git_base_url)
    }

    /// Cache directory for `tool`.
    #[must_use]
    pub fn cache_dir(&self, tool: &str) -> PathBuf {
        self.cache_root.join(tool)
    }

    /// Remote destination for `tool`, defaulting to `~/.<tool>`.
    #[must_use]
    pub fn dist_path(&self, tool: &str) -> String {
        self.dist_path
            .clone()
            .unwrap_or_else(|| format!("~/.{tool}"))
    }
}

/// Progress of an install.
///
/// `Display` names the work that leads into the stage, so an error tagged
/// with `Uploaded` reads "failed while uploading the archive".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallStage {
    /// Nothing done yet.
    Idle,
    /// Cache directory recreated.
    CachePrepared,
    /// Tool and plugins cloned.
    Cloned,
    /// Remote staging directory exists.
    RemoteDirEnsured,
    /// Local archive written.
    Archived,
    /// Archive copied to the remote host.
    Uploaded,
    /// Archive extracted into the destination.
    Unpacked,
    /// Install finished.
    Done,
}

impl InstallStage {
    /// Stages that perform work, in execution order.
    pub const PIPELINE: [Self; 6] = [
        Self::CachePrepared,
        Self::Cloned,
        Self::RemoteDirEnsured,
        Self::Archived,
        Self::Uploaded,
        Self::Unpacked,
    ];

    /// Stable identifier used in structured logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CachePrepared => "cache_prepared",
            Self::Cloned => "cloned",
            Self::RemoteDirEnsured => "remote_dir_ensured",
            Self::Archived => "archived",
            Self::Uploaded => "uploaded",
            Self::Unpacked => "unpacked",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let activity = match self {
            Self::Idle => "starting",
            Self::CachePrepared => "preparing the cache directory",
            Self::Cloned => "cloning repositories",
            Self::RemoteDirEnsured => "creating the remote staging directory",
            Self::Archived => "archiving the clone",
            Self::Uploaded => "uploading the archive",
            Self::Unpacked => "unpacking on the remote host",
            Self::Done => "finishing",
        };
        f.write_str(activity)
    }
}

/// Outcome of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Tool that was installed.
    pub tool: String,
    /// Remote host, as `user@host[:port]`.
    pub remote: String,
    /// Directory the tool was unpacked into.
    pub destination: String,
    /// Local archive left in the cache.
    pub archive: PathBuf,
    /// Stages completed, in order.
    pub stages: Vec<InstallStage>,
    /// Shell setup guidance for the operator.
    pub notes: Vec<String>,
}

/// A supported tool.
///
/// Implementors only describe the tool; [`ToolInstaller::install`] runs the
/// shared workflow.
#[async_trait]
pub trait ToolInstaller: Send + Sync {
    /// Tool name as typed on the command line (e.g., "nodenv").
    fn name(&self) -> &'static str;

    /// One-line description for help output.
    fn description(&self) -> &'static str;

    /// Repositories and paths for this install.
    fn descriptor(&self) -> &ToolDescriptor;

    /// Guidance printed after a successful install.
    fn post_install_notes(&self) -> Vec<String>;

    /// Clone, package, upload and unpack the tool on `remote`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Install`] naming the stage that failed.
    async fn install(
        &self,
        remote: &RemoteTarget,
        runner: &dyn CommandRunner,
    ) -> Result<InstallReport> {
        let mut report = InstallWorkflow::new(self.descriptor(), remote, runner)
            .run()
            .await?;
        report.notes = self.post_install_notes();
        Ok(report)
    }
}

/// Runs the install stages for one descriptor.
pub struct InstallWorkflow<'a> {
    descriptor: &'a ToolDescriptor,
    remote: &'a RemoteTarget,
    runner: &'a dyn CommandRunner,
    completed: Vec<InstallStage>,
}

impl<'a> InstallWorkflow<'a> {
    /// Create a workflow that has not run any stage yet.
    #[must_use]
    pub fn new(
        descriptor: &'a ToolDescriptor,
        remote: &'a RemoteTarget,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            descriptor,
            remote,
            runner,
            completed: Vec::new(),
        }
    }

    /// Run every stage in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Install`] wrapping the failure of the first stage
    /// that did not complete.
    pub async fn run(mut self) -> Result<InstallReport> {
        info!(
            tool = %self.descriptor.name,
            remote = %self.remote,
            destination = %self.descriptor.dist_path,
            "Installing tool"
        );

        for stage in InstallStage::PIPELINE {
            self.advance(stage).await?;
        }
        info!(tool = %self.descriptor.name, "Installation completed");

        Ok(InstallReport {
            tool: self.descriptor.name.clone(),
            remote: self.remote.to_string(),
            destination: self.descriptor.dist_path.clone(),
            archive: self.descriptor.archive_path(),
            stages: self.completed,
            notes: Vec::new(),
        })
    }

    async fn advance(&mut self, target: InstallStage) -> Result<()> {
        let result = match target {
            InstallStage::CachePrepared => self.prepare_cache().await,
            InstallStage::Cloned => self.clone_repositories().await,
            InstallStage::RemoteDirEnsured => self.ensure_remote_dir().await,
            InstallStage::Archived => self.archive().await,
            InstallStage::Uploaded => self.upload().await,
            InstallStage::Unpacked => self.unpack().await,
            InstallStage::Idle | InstallStage::Done => Ok(()),
        };

        result.map_err(|e| Error::install(&self.descriptor.name, target, e))?;

        debug!(tool = %self.descriptor.name, stage = target.as_str(), "Stage complete");
        self.completed.push(target);
        Ok(())
    }

    async fn prepare_cache(&self) -> Result<()> {
        let dir = &self.descriptor.cache_dir;
        info!(tool = %self.descriptor.name, cache = ?dir, "Creating cache directory");
        cache::recreate_dir(dir).await
    }

    async fn clone_repositories(&self) -> Result<()> {
        let d = self.descriptor;
        self.clone_one(&d.repo_url, &d.clone_dir()).await?;
        for plugin in &d.plugins {
            self.clone_one(&plugin.url, &d.plugin_dir(plugin)).await?;
        }
        Ok(())
    }

    async fn clone_one(&self, url: &str, dest: &Path) -> Result<()> {
        info!(%url, dest = ?dest, git_ref = %self.descriptor.git_ref, "Cloning repository");
        let command = git::shallow_clone(url, &self.descriptor.git_ref, dest);
        self.runner.run(&command).await
    }

    async fn ensure_remote_dir(&self) -> Result<()> {
        info!(remote = %self.remote, dir = STAGING_DIR, "Ensuring remote directory exists");
        let command = self.remote.ssh(remote::ensure_dir_command(STAGING_DIR));
        self.runner.run(&command).await
    }

    async fn archive(&self) -> Result<()> {
        let src = self.descriptor.clone_dir();
        let archive_path = self.descriptor.archive_path();
        info!(src = ?src, archive = ?archive_path, "Compressing clone");

        let task_path = archive_path.clone();
        tokio::task::spawn_blocking(move || archive::create_tar_gz(&src, &task_path))
            .await
            .map_err(|e| Error::archive(archive_path, format!("archive task failed: {e}")))?
    }

    async fn upload(&self) -> Result<()> {
        let local = self.descriptor.archive_path();
        let remote_path = self.descriptor.remote_archive_path();
        info!(local = ?local, remote = %remote_path, "Uploading archive");
        let command = self.remote.scp(&local, &remote_path);
        self.runner.run(&command).await
    }

    async fn unpack(&self) -> Result<()> {
        let dest = &self.descriptor.dist_path;
        info!(tool = %self.descriptor.name, %dest, "Unpacking on remote host");
        let command = self.remote.ssh(remote::unpack_command(
            &self.descriptor.remote_archive_path(),
            dest,
        ));
        self.runner.run(&command).await
    }
}

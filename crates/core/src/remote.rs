//! Remote host connection and ssh/scp command construction.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::process::ExternalCommand;
use crate::{Error, Result};

/// Remote directory that holds uploaded archives before extraction.
pub const STAGING_DIR: &str = "~/tools-installer";

/// Connection parameters for the remote host.
///
/// Built once at the CLI boundary through [`RemoteTarget::new`], which
/// rejects empty values, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    ssh_key: PathBuf,
    user: String,
    host: String,
    port: Option<u16>,
}

impl RemoteTarget {
    /// Create a target from already-present connection values.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the key path, user or host is empty.
    pub fn new(
        ssh_key: impl Into<PathBuf>,
        user: impl Into<String>,
        host: impl Into<String>,
    ) -> Result<Self> {
        let ssh_key = ssh_key.into();
        let user = user.into();
        let host = host.into();

        if ssh_key.as_os_str().is_empty() {
            return Err(Error::configuration("SSH key path is empty"));
        }
        if user.trim().is_empty() {
            return Err(Error::configuration("remote user is empty"));
        }
        if host.trim().is_empty() {
            return Err(Error::configuration("remote host is empty"));
        }

        Ok(Self {
            ssh_key,
            user,
            host,
            port: None,
        })
    }

    /// Use a non-default SSH port.
    #[must_use]
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Path to the private key used for authentication.
    #[must_use]
    pub fn ssh_key(&self) -> &Path {
        &self.ssh_key
    }

    /// Remote user name.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Remote host name or address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// SSH port, if overridden.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// `user@host` destination string.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Build an ssh invocation that runs `remote_command` on the host.
    #[must_use]
    pub fn ssh(&self, remote_command: impl Into<String>) -> ExternalCommand {
        let mut command = ExternalCommand::new("ssh")
            .arg("-i")
            .arg(self.ssh_key.to_string_lossy());
        if let Some(port) = self.port {
            command = command.arg("-p").arg(port.to_string());
        }
        command.arg(self.destination()).arg(remote_command)
    }

    /// Build an scp invocation copying `local` to `remote_path` on the host.
    #[must_use]
    pub fn scp(&self, local: &Path, remote_path: &str) -> ExternalCommand {
        let mut command = ExternalCommand::new("scp")
            .arg("-i")
            .arg(self.ssh_key.to_string_lossy());
        if let Some(port) = self.port {
            command = command.arg("-P").arg(port.to_string());
        }
        command
            .arg(local.to_string_lossy())
            .arg(format!("{}:{remote_path}", self.destination()))
    }
}

impl fmt::Display for RemoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{port}", self.destination()),
            None => write!(f, "{}", self.destination()),
        }
    }
}

/// Remote command creating the staging directory.
#[must_use]
pub fn ensure_dir_command(dir: &str) -> String {
    format!("mkdir -p {dir}")
}

/// Remote command creating `dest` and extracting `archive` into it.
#[must_use]
pub fn unpack_command(archive: &str, dest: &str) -> String {
    format!("mkdir -p {dest} && tar -xzf {archive} -C {dest}")
}

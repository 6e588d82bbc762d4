// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

//! Core types and the remote install workflow for envship.
//!
//! envship provisions version-manager tools (pyenv, nodenv and their build
//! plugins) onto a remote host: it shallow-clones the repositories into a
//! local cache, packages the clone as a `.tar.gz`, copies it over with `scp`
//! and unpacks it with `ssh`.
//!
//! # Architecture
//!
//! - [`ToolInstaller`] - Trait implemented by each tool crate
//! - [`ToolDescriptor`] - Repositories and paths for one install
//! - [`InstallWorkflow`] - The staged clone → archive → upload → unpack run
//! - [`CommandRunner`] - Seam for every external program (git, ssh, scp)
//! - [`RemoteTarget`] - Validated connection parameters
//!
//! # Example
//!
//! ```ignore
//! use envship_core::{InstallOptions, ProcessRunner, RemoteTarget, ToolInstaller};
//!
//! let remote = RemoteTarget::new("~/.ssh/id_ed25519", "deploy", "build01")?;
//! let installer = envship_tools_nodenv::NodenvInstaller::new(&InstallOptions::default());
//! let report = installer.install(&remote, &ProcessRunner::new()).await?;
//! ```

pub mod archive;
pub mod cache;
mod error;
pub mod git;
pub mod installer;
pub mod process;
pub mod remote;

pub use error::{Error, Result};
pub use installer::{
    InstallOptions, InstallReport, InstallStage, InstallWorkflow, Plugin, ToolDescriptor,
    ToolInstaller,
};
pub use process::{CommandRunner, ExternalCommand, ProcessRunner};
#[cfg(any(test, feature = "test-utils"))]
pub use process::MockRunner;
pub use remote::RemoteTarget;

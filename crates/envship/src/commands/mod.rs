//! Subcommand handlers.

pub mod install;
pub mod list;

pub use install::{InstallSummary, execute_install};
pub use list::execute_list;

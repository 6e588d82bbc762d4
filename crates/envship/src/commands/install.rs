//! `envship install`: check git, then install each tool in order.

use tracing::{error, info};

use envship_core::{CommandRunner, InstallReport, git};

use crate::cli::CliError;
use crate::config::InstallSettings;
use crate::tools::Tool;

/// What an install run did.
#[derive(Debug, Default)]
pub struct InstallSummary {
    /// Reports of installed tools, in argument order.
    pub installed: Vec<InstallReport>,
    /// Names that matched no supported tool.
    pub unknown: Vec<String>,
}

/// Install every requested tool on the remote host, one after the other.
///
/// Unknown tool names are logged and skipped. The first failing install
/// stops the whole run.
///
/// # Errors
///
/// Returns a runtime error when git is unavailable or an install fails.
pub async fn execute_install(
    settings: &InstallSettings,
    runner: &dyn CommandRunner,
) -> Result<InstallSummary, CliError> {
    git::check_available(runner).await?;

    info!(
        tools = %settings.tools.join(", "),
        remote = %settings.remote,
        "Will install tools"
    );

    let mut summary = InstallSummary::default();
    for name in &settings.tools {
        let Some(tool) = Tool::from_name(name) else {
            error!("Unknown tool: {name}");
            summary.unknown.push(name.clone());
            continue;
        };

        let installer = tool.installer(&settings.options_for(tool));
        let report = installer.install(&settings.remote, runner).await?;
        print_notes(&report);
        summary.installed.push(report);
    }

    Ok(summary)
}

#[allow(clippy::print_stdout)]
fn print_notes(report: &InstallReport) {
    for note in &report.notes {
        println!("{note}");
    }
}

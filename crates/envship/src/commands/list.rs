//! `envship list`: the tools envship can install.

use std::fmt::Write;

use envship_core::InstallOptions;

use crate::tools::Tool;

/// Render the supported tools, one `name  description` line each.
#[must_use]
pub fn execute_list() -> String {
    let options = InstallOptions::default();
    let mut output = String::new();
    for tool in Tool::all() {
        let installer = tool.installer(&options);
        let _ = writeln!(output, "{:<8}{}", tool.name(), installer.description());
    }
    output
}

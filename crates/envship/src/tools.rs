//! Supported tools.

use std::fmt;

use envship_core::{InstallOptions, ToolInstaller};
use envship_tools_nodenv::NodenvInstaller;
use envship_tools_pyenv::PyenvInstaller;

/// A tool envship knows how to install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// pyenv (python-build in-tree)
    Pyenv,
    /// nodenv plus node-build
    Nodenv,
}

impl Tool {
    /// Every supported tool, in listing order.
    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::Pyenv, Self::Nodenv]
    }

    /// Resolve a command-line name. Matching is exact.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pyenv" => Some(Self::Pyenv),
            "nodenv" => Some(Self::Nodenv),
            _ => None,
        }
    }

    /// Name as typed on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pyenv => "pyenv",
            Self::Nodenv => "nodenv",
        }
    }

    /// Build the installer for this tool.
    #[must_use]
    pub fn installer(self, options: &InstallOptions) -> Box<dyn ToolInstaller> {
        match self {
            Self::Pyenv => Box::new(PyenvInstaller::new(options)),
            Self::Nodenv => Box::new(NodenvInstaller::new(options)),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Tool::from_name("pyenv"), Some(Tool::Pyenv));
        assert_eq!(Tool::from_name("nodenv"), Some(Tool::Nodenv));
        assert_eq!(Tool::from_name("rbenv"), None);
        assert_eq!(Tool::from_name("NODENV"), None);
        assert_eq!(Tool::from_name(""), None);
    }

    #[test]
    fn test_installer_names_match() {
        let options = InstallOptions::default();
        for tool in Tool::all() {
            assert_eq!(tool.installer(&options).name(), tool.name());
            assert_eq!(tool.to_string(), tool.name());
        }
    }
}

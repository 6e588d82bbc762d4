//! Configuration layering for `envship install`.
//!
//! Command-line flags and `ENVSHIP_*` variables are merged by clap; the
//! optional TOML file fills whatever is still unset, and built-in defaults
//! come last. The result is a validated [`InstallSettings`].

use serde::Deserialize;
use std::path::{Path, PathBuf};

use envship_core::{InstallOptions, RemoteTarget};

use crate::cli::{CliError, InstallArgs};
use crate::tools::Tool;

/// Contents of the `--config` TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Private key for ssh/scp.
    pub ssh_key: Option<String>,
    /// Remote login user.
    pub user: Option<String>,
    /// Remote host.
    pub host: Option<String>,
    /// SSH port.
    pub port: Option<u16>,
    /// Git host or mirror.
    pub git_base_url: Option<String>,
    /// Local cache root.
    pub cache_dir: Option<String>,
    /// Per-tool remote destinations.
    #[serde(default)]
    pub dist_paths: DistPaths,
}

/// `[dist_paths]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistPaths {
    /// Destination for pyenv.
    pub pyenv: Option<String>,
    /// Destination for nodenv.
    pub nodenv: Option<String>,
}

impl FileConfig {
    /// Read and parse a config file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or is not
    /// valid TOML for this schema.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::config_with_help(
                format!("Failed to read config file {}: {e}", path.display()),
                "Check the --config path",
            )
        })?;
        Self::parse(&content)
            .map_err(|e| CliError::config(format!("Invalid config file {}: {e}", path.display())))
    }

    /// Parse config file contents.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed input or unknown keys.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Fully resolved inputs of an install run.
#[derive(Debug, Clone)]
pub struct InstallSettings {
    /// Tool names as given, unknown ones included.
    pub tools: Vec<String>,
    /// Validated connection.
    pub remote: RemoteTarget,
    /// Git host or mirror, if overridden.
    pub git_base_url: Option<String>,
    /// Cache root, if overridden.
    pub cache_dir: Option<PathBuf>,
    /// Remote destination overrides.
    pub dist_paths: DistPaths,
}

fn non_empty<T: AsRef<str>>(value: Option<T>) -> Option<T> {
    value.filter(|v| !v.as_ref().trim().is_empty())
}

/// First non-blank value of two layers.
fn layered<T: AsRef<str>>(upper: Option<T>, lower: Option<T>) -> Option<T> {
    non_empty(upper).or_else(|| non_empty(lower))
}

fn required<T: AsRef<str>>(
    value: Option<T>,
    what: &str,
    long: &str,
    short: &str,
) -> Result<T, CliError> {
    non_empty(value)
        .ok_or_else(|| CliError::config(format!("{what} is required: --{long} or --{short}")))
}

impl InstallSettings {
    /// Merge parsed arguments with the config file and validate.
    ///
    /// The SSH key, user and host are checked in that order and only the
    /// first missing one is reported.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first missing connection
    /// parameter.
    pub fn resolve(args: InstallArgs, file: FileConfig) -> Result<Self, CliError> {
        let ssh_key = required(
            layered(args.ssh_key, file.ssh_key),
            "Remote server SSH key",
            "remote-server-ssh-key",
            "ssh-key",
        )?;
        let user = required(
            layered(args.user, file.user),
            "Remote server user",
            "remote-server-user",
            "user",
        )?;
        let host = required(
            layered(args.host, file.host),
            "Remote server host",
            "remote-server-host",
            "host",
        )?;

        let remote =
            RemoteTarget::new(ssh_key, user, host)?.with_port(args.port.or(file.port));

        Ok(Self {
            tools: args.tools,
            remote,
            git_base_url: layered(args.git_base_url, file.git_base_url),
            // Blank cache roots fall back to `.cache`, never the working directory.
            cache_dir: layered(args.cache_dir, file.cache_dir).map(PathBuf::from),
            dist_paths: DistPaths {
                pyenv: layered(args.pyenv_dist_path, file.dist_paths.pyenv),
                nodenv: layered(args.nodenv_dist_path, file.dist_paths.nodenv),
            },
        })
    }

    /// Installer options for `tool`.
    #[must_use]
    pub fn options_for(&self, tool: Tool) -> InstallOptions {
        let mut options = InstallOptions::new();
        if let Some(url) = &self.git_base_url {
            options = options.with_git_base_url(url.as_str());
        }
        if let Some(dir) = &self.cache_dir {
            options = options.with_cache_root(dir);
        }
        let dist_path = match tool {
            Tool::Pyenv => self.dist_paths.pyenv.clone(),
            Tool::Nodenv => self.dist_paths.nodenv.clone(),
        };
        options.with_dist_path(dist_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args(key: Option<&str>, user: Option<&str>, host: Option<&str>) -> InstallArgs {
        InstallArgs {
            tools: vec!["nodenv".to_string()],
            ssh_key: key.map(str::to_string),
            user: user.map(str::to_string),
            host: host.map(str::to_string),
            ..InstallArgs::default()
        }
    }

    fn missing_message(key: Option<&str>, user: Option<&str>, host: Option<&str>) -> String {
        let err = InstallSettings::resolve(args(key, user, host), FileConfig::default())
            .unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
        err.message().to_string()
    }

    #[test]
    fn test_first_missing_parameter_wins() {
        let key = "Remote server SSH key is required: --remote-server-ssh-key or --ssh-key";
        let user = "Remote server user is required: --remote-server-user or --user";
        let host = "Remote server host is required: --remote-server-host or --host";

        assert_eq!(missing_message(None, None, None), key);
        assert_eq!(missing_message(None, Some("u"), Some("h")), key);
        assert_eq!(missing_message(None, None, Some("h")), key);
        assert_eq!(missing_message(Some("k"), None, None), user);
        assert_eq!(missing_message(Some("k"), None, Some("h")), user);
        assert_eq!(missing_message(Some("k"), Some("u"), None), host);
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        assert_eq!(
            missing_message(Some("k"), Some("  "), Some("h")),
            "Remote server user is required: --remote-server-user or --user"
        );
        assert!(missing_message(Some(""), Some("u"), Some("h")).contains("SSH key"));
    }

    #[test]
    fn test_resolve_complete() {
        let settings = InstallSettings::resolve(
            args(Some("/keys/id"), Some("deploy"), Some("build01")),
            FileConfig::default(),
        )
        .unwrap();
        assert_eq!(settings.remote.destination(), "deploy@build01");
        assert_eq!(settings.tools, vec!["nodenv"]);
        assert!(settings.git_base_url.is_none());
    }

    #[test]
    fn test_file_fills_unset_values() {
        let file = FileConfig::parse(
            r#"
ssh_key = "/keys/file"
user = "file-user"
host = "file-host"
port = 2222
git_base_url = "https://mirror.local"

[dist_paths]
nodenv = "/opt/nodenv"
"#,
        )
        .unwrap();

        let settings = InstallSettings::resolve(args(None, Some("cli-user"), None), file).unwrap();

        assert_eq!(settings.remote.user(), "cli-user");
        assert_eq!(settings.remote.host(), "file-host");
        assert_eq!(settings.remote.ssh_key(), Path::new("/keys/file"));
        assert_eq!(settings.remote.port(), Some(2222));

        let options = settings.options_for(Tool::Nodenv);
        assert_eq!(options.git_base_url(), "https://mirror.local");
        assert_eq!(options.dist_path("nodenv"), "/opt/nodenv");

        let options = settings.options_for(Tool::Pyenv);
        assert_eq!(options.dist_path("pyenv"), "~/.pyenv");
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(FileConfig::parse("hostname = \"x\"").is_err());
        assert!(FileConfig::parse("[dist_paths]\nrbenv = \"~/.rbenv\"").is_err());
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "host = \"build01\"").unwrap();

        let config = FileConfig::load(file.path()).unwrap();
        assert_eq!(config.host.as_deref(), Some("build01"));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = FileConfig::load(Path::new("/nonexistent/envship.toml")).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }

    #[test]
    fn test_cache_dir_override() {
        let mut a = args(Some("k"), Some("u"), Some("h"));
        a.cache_dir = Some("/tmp/envship-cache".to_string());
        let settings = InstallSettings::resolve(a, FileConfig::default()).unwrap();

        let options = settings.options_for(Tool::Pyenv);
        assert_eq!(options.cache_dir("pyenv"), PathBuf::from("/tmp/envship-cache/pyenv"));
    }

    #[test]
    fn test_blank_cache_dir_falls_back_to_default() {
        let file = FileConfig::parse("cache_dir = \"\"\n").unwrap();
        let settings =
            InstallSettings::resolve(args(Some("k"), Some("u"), Some("h")), file).unwrap();

        assert!(settings.cache_dir.is_none());
        let options = settings.options_for(Tool::Nodenv);
        assert_eq!(options.cache_dir("nodenv"), PathBuf::from(".cache/nodenv"));

        let mut a = args(Some("k"), Some("u"), Some("h"));
        a.cache_dir = Some("  ".to_string());
        let settings = InstallSettings::resolve(a, FileConfig::default()).unwrap();
        assert!(settings.cache_dir.is_none());
    }

    #[test]
    fn test_blank_flag_does_not_hide_file_value() {
        let file = FileConfig::parse(
            "ssh_key = \"/keys/file\"\ncache_dir = \"/var/cache/envship\"\n",
        )
        .unwrap();
        let mut a = args(Some(""), Some("u"), Some("h"));
        a.cache_dir = Some(String::new());

        let settings = InstallSettings::resolve(a, file).unwrap();

        assert_eq!(settings.remote.ssh_key(), Path::new("/keys/file"));
        assert_eq!(settings.cache_dir, Some(PathBuf::from("/var/cache/envship")));
    }
}

//! Configuration for optiview.
//!
//! Precedence, highest to lowest: CLI flags > environment > `optiview.toml`
//! (discovered upward from the working directory) > built-in defaults.
//!
//! The engine location defaults to a platform-resolved program next to the
//! front end (`compiler.exe` on Windows, `./compiler` elsewhere) and can be
//! overridden at every layer without changing the file protocol.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Wall-clock bound for one engine invocation when nothing overrides it.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Config file searched for in the working directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = "optiview.toml";

/// Environment override for the engine executable.
pub const ENGINE_ENV_VAR: &str = "OPTIVIEW_ENGINE";

/// Environment override for the invocation timeout, in seconds.
pub const TIMEOUT_ENV_VAR: &str = "OPTIVIEW_TIMEOUT_SECS";

/// Platform-resolved default engine program.
#[must_use]
pub fn default_engine_program() -> &'static str {
    if cfg!(windows) { "compiler.exe" } else { "./compiler" }
}

/// Configuration errors. All of them map to the CLI-arguments exit code.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration file {path}: {reason}")]
    InvalidFile { path: Utf8PathBuf, reason: String },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Resolved configuration used by the rest of the crate.
#[derive(Debug, Clone)]
pub struct Config {
    /// Engine program to invoke (name, relative path, or absolute path).
    pub engine_program: Utf8PathBuf,
    /// Hard upper bound on one invocation's wall-clock duration.
    pub timeout: Duration,
    /// Root of the pipeline workspace holding the three exchange files.
    pub workspace_root: Utf8PathBuf,
}

/// Values taken from CLI flags. `None` means "not given on the command line".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<Utf8PathBuf>,
    pub engine: Option<String>,
    pub workdir: Option<Utf8PathBuf>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    engine: EngineSection,
    #[serde(default)]
    workspace: WorkspaceSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineSection {
    path: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorkspaceSection {
    root: Option<String>,
}

/// Raw environment values, captured once so merging stays a pure function.
#[derive(Debug, Default)]
struct EnvOverrides {
    engine: Option<String>,
    timeout_secs: Option<String>,
}

impl EnvOverrides {
    fn capture() -> Self {
        let non_empty = |v: Result<String, std::env::VarError>| v.ok().filter(|s| !s.is_empty());
        Self {
            engine: non_empty(std::env::var(ENGINE_ENV_VAR)),
            timeout_secs: non_empty(std::env::var(TIMEOUT_ENV_VAR)),
        }
    }
}

impl Config {
    /// Resolve the effective configuration from CLI overrides, the
    /// environment, and the discovered (or explicitly given) config file.
    pub fn resolve(overrides: &Overrides) -> Result<Self, ConfigError> {
        let file = match &overrides.config {
            Some(path) => load_file(path)?,
            None => discover_file()?.unwrap_or_default(),
        };
        merge(file, overrides, EnvOverrides::capture())
    }
}

fn merge(
    file: FileConfig,
    overrides: &Overrides,
    env: EnvOverrides,
) -> Result<Config, ConfigError> {
    let engine_program = overrides
        .engine
        .clone()
        .or(env.engine)
        .or(file.engine.path)
        .map_or_else(|| Utf8PathBuf::from(default_engine_program()), Utf8PathBuf::from);

    let env_timeout = env
        .timeout_secs
        .map(|raw| {
            raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: TIMEOUT_ENV_VAR.to_string(),
                value: raw,
            })
        })
        .transpose()?;

    let timeout_secs = overrides
        .timeout_secs
        .or(env_timeout)
        .or(file.engine.timeout_seconds)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: "timeout_seconds".to_string(),
            value: "0".to_string(),
        });
    }

    let workspace_root = overrides
        .workdir
        .clone()
        .or_else(|| file.workspace.root.map(Utf8PathBuf::from))
        .unwrap_or_else(|| Utf8PathBuf::from("."));

    Ok(Config {
        engine_program,
        timeout: Duration::from_secs(timeout_secs),
        workspace_root,
    })
}

fn load_file(path: &Utf8Path) -> Result<FileConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidFile {
        path: path.to_owned(),
        reason: e.to_string(),
    })?;
    toml::from_str(&raw).map_err(|e| ConfigError::InvalidFile {
        path: path.to_owned(),
        reason: e.to_string(),
    })
}

/// Search the working directory and its ancestors for `optiview.toml`.
fn discover_file() -> Result<Option<FileConfig>, ConfigError> {
    let Ok(cwd) = std::env::current_dir() else {
        return Ok(None);
    };
    for dir in cwd.ancestors() {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            let Some(utf8) = Utf8PathBuf::from_path_buf(candidate).ok() else {
                return Ok(None);
            };
            return load_file(&utf8).map(Some);
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(toml_text: &str) -> FileConfig {
        toml::from_str(toml_text).unwrap()
    }

    #[test]
    fn test_built_in_defaults() {
        let config = merge(FileConfig::default(), &Overrides::default(), EnvOverrides::default())
            .unwrap();
        assert_eq!(config.engine_program, default_engine_program());
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.workspace_root, Utf8PathBuf::from("."));
    }

    #[test]
    fn test_file_values_beat_defaults() {
        let file = parse(
            r#"
            [engine]
            path = "/opt/compiler"
            timeout_seconds = 30

            [workspace]
            root = "/tmp/runs"
            "#,
        );
        let config = merge(file, &Overrides::default(), EnvOverrides::default()).unwrap();
        assert_eq!(config.engine_program, Utf8PathBuf::from("/opt/compiler"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.workspace_root, Utf8PathBuf::from("/tmp/runs"));
    }

    #[test]
    fn test_env_beats_file() {
        let file = parse("[engine]\npath = \"/opt/compiler\"\ntimeout_seconds = 30\n");
        let env = EnvOverrides {
            engine: Some("/usr/local/bin/compiler".to_string()),
            timeout_secs: Some("45".to_string()),
        };
        let config = merge(file, &Overrides::default(), env).unwrap();
        assert_eq!(
            config.engine_program,
            Utf8PathBuf::from("/usr/local/bin/compiler")
        );
        assert_eq!(config.timeout, Duration::from_secs(45));
    }

    #[test]
    fn test_cli_beats_env_and_file() {
        let file = parse("[engine]\npath = \"/opt/compiler\"\n");
        let env = EnvOverrides {
            engine: Some("/usr/local/bin/compiler".to_string()),
            timeout_secs: None,
        };
        let overrides = Overrides {
            engine: Some("./my-compiler".to_string()),
            timeout_secs: Some(3),
            ..Overrides::default()
        };
        let config = merge(file, &overrides, env).unwrap();
        assert_eq!(config.engine_program, Utf8PathBuf::from("./my-compiler"));
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_unparsable_env_timeout_is_rejected() {
        let env = EnvOverrides {
            engine: None,
            timeout_secs: Some("soon".to_string()),
        };
        let err = merge(FileConfig::default(), &Overrides::default(), env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let overrides = Overrides {
            timeout_secs: Some(0),
            ..Overrides::default()
        };
        let err = merge(FileConfig::default(), &overrides, EnvOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_load_file_reports_bad_toml() {
        let td = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(td.path().join(CONFIG_FILE_NAME)).unwrap();
        std::fs::write(&path, "[engine\npath=").unwrap();

        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFile { .. }));
    }

    #[test]
    fn test_load_file_rejects_unknown_keys() {
        let td = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(td.path().join(CONFIG_FILE_NAME)).unwrap();
        std::fs::write(&path, "[engine]\nbinary = \"compiler\"\n").unwrap();

        assert!(load_file(&path).is_err());
    }
}

// Configuration loading and parsing (artweave.toml + environment overrides).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "artweave.toml";
pub const BASE_URL_ENV: &str = "ARTWEAVE_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "ARTWEAVE_TIMEOUT_MS";
pub const DEFAULT_TIMEOUT_MS: u64 = 8000;
pub const DEFAULT_LOG_FILTER: &str = "artweave=info,warn";

/// Contents of the config file written on first run.
pub const DEFAULT_CONFIG: &str = include_str!("../defaults/artweave.toml");

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// API root, e.g. `http://localhost:8000`. Required before any request is
    /// made, but its absence is not a load error.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Values read from the process environment. Split out so loading can be
/// tested without mutating the real environment.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub base_url: Option<String>,
    pub timeout_ms: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var(BASE_URL_ENV).ok(),
            timeout_ms: std::env::var(TIMEOUT_ENV).ok(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load `config/artweave.toml` relative to `base_dir` (if present), apply the
/// environment overrides, and validate.
///
/// A missing config file is not an error: every field has a default and the
/// base URL usually comes from the environment.
pub fn load_config_from(base_dir: &Path, env: &EnvOverrides) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let mut config = if path.exists() {
        parse_file(&path)?
    } else {
        Config::default()
    };

    apply_overrides(&mut config, env)?;
    validate(&mut config)?;

    Ok(config)
}

/// Load an explicit config file, then apply overrides and validate.
pub fn load_config_file(path: &Path, env: &EnvOverrides) -> Result<Config, ConfigError> {
    let mut config = parse_file(path)?;
    apply_overrides(&mut config, env)?;
    validate(&mut config)?;
    Ok(config)
}

/// Write [`DEFAULT_CONFIG`] to `path` unless a file is already there.
/// Returns whether the file was created.
pub fn ensure_config_file(path: &Path) -> Result<bool, ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", parent.display()),
        })?;
    }

    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(mut dest) => {
            std::io::Write::write_all(&mut dest, DEFAULT_CONFIG.as_bytes()).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to write {}: {e}", path.display()),
                }
            })?;
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", path.display()),
        }),
    }
}

/// Loads `config/artweave.toml` from the working directory when present.
/// Otherwise uses the per-user config file, seeding it from
/// [`DEFAULT_CONFIG`] on first run.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;

    let env = EnvOverrides::from_env();
    if cwd.join("config").join(CONFIG_FILE).exists() {
        return load_config_from(&cwd, &env);
    }

    match user_config_path() {
        Some(path) => {
            if ensure_config_file(&path)? {
                tracing::info!(path = %path.display(), "wrote default config");
            }
            load_config_file(&path, &env)
        }
        None => load_config_from(&cwd, &env),
    }
}

/// `<user config dir>/artweave.toml`, e.g. `~/.config/artweave/artweave.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "artweave")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_file(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn apply_overrides(config: &mut Config, env: &EnvOverrides) -> Result<(), ConfigError> {
    if let Some(url) = env.base_url.as_deref().map(str::trim) {
        if !url.is_empty() {
            config.api.base_url = Some(url.to_string());
        }
    }

    if let Some(raw) = env.timeout_ms.as_deref().map(str::trim) {
        if !raw.is_empty() {
            config.api.timeout_ms = raw.parse().map_err(|_| ConfigError::ValidationError {
                field: TIMEOUT_ENV.into(),
                message: format!("expected a whole number of milliseconds, got `{raw}`"),
            })?;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check field values and normalize the base URL (trimmed, no trailing `/`).
/// An empty base URL is treated as unset.
fn validate(config: &mut Config) -> Result<(), ConfigError> {
    if config.api.timeout_ms == 0 {
        return Err(ConfigError::ValidationError {
            field: "api.timeout_ms".into(),
            message: "must be greater than 0".into(),
        });
    }

    if let Some(raw) = config.api.base_url.take() {
        let trimmed = raw.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            let url = reqwest::Url::parse(trimmed).map_err(|e| ConfigError::ValidationError {
                field: "api.base_url".into(),
                message: format!("not a valid URL ({e}): `{trimmed}`"),
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::ValidationError {
                    field: "api.base_url".into(),
                    message: format!("scheme must be http or https, got `{}`", url.scheme()),
                });
            }
            config.api.base_url = Some(trimmed.to_string());
        }
    }

    if config.logging.filter.trim().is_empty() {
        config.logging.filter = default_log_filter();
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Fresh scratch directory under the system temp dir.
    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("artweave_config_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_config(dir: &Path, body: &str) {
        let config_dir = dir.join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join(CONFIG_FILE), body).unwrap();
    }

    #[test]
    fn missing_file_yields_defaults_without_base_url() {
        let dir = scratch("missing_file");
        let config = load_config_from(&dir, &EnvOverrides::default()).unwrap();
        assert!(config.api.base_url.is_none());
        assert_eq!(config.api.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.api.timeout(), Duration::from_millis(8000));
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_values_are_loaded_and_normalized() {
        let dir = scratch("file_values");
        write_config(
            &dir,
            r#"
[api]
base_url = "http://localhost:8000/"
timeout_ms = 2500

[logging]
filter = "artweave=debug"
"#,
        );
        let config = load_config_from(&dir, &EnvOverrides::default()).unwrap();
        assert_eq!(config.api.base_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.api.timeout_ms, 2500);
        assert_eq!(config.logging.filter, "artweave=debug");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn env_overrides_file() {
        let dir = scratch("env_overrides");
        write_config(&dir, "[api]\nbase_url = \"http://file.example\"\n");
        let env = EnvOverrides {
            base_url: Some("https://api.example.com".into()),
            timeout_ms: Some("1200".into()),
        };
        let config = load_config_from(&dir, &env).unwrap();
        assert_eq!(config.api.base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.api.timeout_ms, 1200);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_base_url_is_treated_as_unset() {
        let dir = scratch("empty_base_url");
        write_config(&dir, "[api]\nbase_url = \"  \"\n");
        let env = EnvOverrides {
            base_url: Some(String::new()),
            timeout_ms: None,
        };
        let config = load_config_from(&dir, &env).unwrap();
        assert!(config.api.base_url.is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_zero_timeout() {
        let dir = scratch("zero_timeout");
        write_config(&dir, "[api]\ntimeout_ms = 0\n");
        let err = load_config_from(&dir, &EnvOverrides::default()).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "api.timeout_ms"),
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_non_numeric_timeout_env() {
        let dir = scratch("bad_timeout_env");
        let env = EnvOverrides {
            base_url: None,
            timeout_ms: Some("soon".into()),
        };
        let err = load_config_from(&dir, &env).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, message } => {
                assert_eq!(field, TIMEOUT_ENV);
                assert!(message.contains("soon"));
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_invalid_base_url() {
        let dir = scratch("invalid_base_url");
        let env = EnvOverrides {
            base_url: Some("not a url".into()),
            timeout_ms: None,
        };
        let err = load_config_from(&dir, &env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValidationError { ref field, .. } if field == "api.base_url"
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_non_http_scheme() {
        let dir = scratch("ftp_base_url");
        let env = EnvOverrides {
            base_url: Some("ftp://files.example.com".into()),
            timeout_ms: None,
        };
        let err = load_config_from(&dir, &env).unwrap_err();
        match &err {
            ConfigError::ValidationError { message, .. } => assert!(message.contains("ftp")),
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_toml_reports_path() {
        let dir = scratch("malformed_toml");
        write_config(&dir, "[api\nbase_url = ");
        let err = load_config_from(&dir, &EnvOverrides::default()).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with(CONFIG_FILE)),
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn ensure_config_file_seeds_once() {
        let dir = scratch("seed_config");
        let path = dir.join("nested").join(CONFIG_FILE);

        assert!(ensure_config_file(&path).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);

        // A second run must not overwrite the user's edits.
        fs::write(&path, "[api]\ntimeout_ms = 4000\n").unwrap();
        assert!(!ensure_config_file(&path).unwrap());

        let config = load_config_file(&path, &EnvOverrides::default()).unwrap();
        assert_eq!(config.api.timeout_ms, 4000);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn default_config_leaves_base_url_unset() {
        let dir = scratch("default_config");
        let path = dir.join(CONFIG_FILE);
        ensure_config_file(&path).unwrap();

        let config = load_config_file(&path, &EnvOverrides::default()).unwrap();
        assert_eq!(config.api.base_url, None);
        assert_eq!(config.api.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);

        let env = EnvOverrides {
            base_url: Some("http://localhost:8000/".into()),
            ..Default::default()
        };
        let config = load_config_file(&path, &env).unwrap();
        assert_eq!(config.api.base_url.as_deref(), Some("http://localhost:8000"));
        let _ = fs::remove_dir_all(&dir);
    }
}

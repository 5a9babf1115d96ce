//! Shared configuration for HomGar tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), token
//! cache location, and translation to `homgar_core::HomgarConfig`. The CLI
//! adds `GlobalOpts`-aware wrappers on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml, Yaml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use homgar_core::{Credentials, HomgarConfig, TlsVerification, TokenCache};

const KEYRING_SERVICE: &str = "homgar";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' not found in config")]
    UnknownProfile { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_area_code")]
    pub area_code: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            area_code: default_area_code(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_area_code() -> String {
    HomgarConfig::default().area_code
}

/// A named account profile.
///
/// A standalone profile file (`--config account.yaml`) has the same
/// fields at its top level; `email` + `password` is enough.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Account e-mail (or phone number) used to log in.
    pub email: Option<String>,

    /// Password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Phone area code sent with the login request.
    pub area_code: Option<String>,

    /// Override the cloud endpoint.
    pub base_url: Option<String>,

    /// Where to keep the session token. Defaults to the user cache dir.
    pub cache_file: Option<PathBuf>,

    /// Path to an extra CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "homgar", "homgar")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default token cache file for a profile.
pub fn token_cache_path(profile_name: &str) -> PathBuf {
    let file = format!("{profile_name}.token.json");
    project_dirs().map_or_else(
        || dirs_fallback(".cache").join(&file),
        |dirs| dirs.cache_dir().join(&file),
    )
}

fn dirs_fallback(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push("homgar");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// A missing file yields the defaults. Nested keys come from the
/// environment with `__` separators, e.g. `HOMGAR_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HOMGAR_").split("__"));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), profiles = config.profiles.len(), "loaded config");
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Load a single profile from a standalone YAML or TOML file.
///
/// `.toml` files are read as TOML; anything else as YAML.
pub fn load_profile_file(path: &Path) -> Result<Profile, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file not found: {}", path.display()),
        )));
    }

    let figment = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Figment::from(Toml::file(path)),
        _ => Figment::from(Yaml::file(path)),
    };
    Ok(figment.extract()?)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the account e-mail: profile first, then `HOMGAR_EMAIL`.
pub fn resolve_email(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    profile
        .email
        .clone()
        .or_else(|| std::env::var("HOMGAR_EMAIL").ok())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Resolve the password from the credential chain.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Well-known env var
    if let Ok(pw) = std::env::var("HOMGAR_PASSWORD") {
        return Ok(SecretString::from(pw));
    }

    // 3. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve full credentials for a profile.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Credentials, ConfigError> {
    let email = resolve_email(profile, profile_name)?;
    let password = resolve_password(profile, profile_name)?;
    Ok(Credentials::new(email, password.expose_secret()))
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))?;
    entry.set_password(password.expose_secret())?;
    Ok(())
}

// ── HomgarConfig translation ────────────────────────────────────────

/// Build a `HomgarConfig` from a profile -- no CLI flag overrides.
///
/// Missing credentials are not an error here: a cached token may still
/// be usable, and the session reports the problem if it is not.
pub fn profile_to_homgar_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<HomgarConfig, ConfigError> {
    let mut config = HomgarConfig::default();

    if let Some(ref raw) = profile.base_url {
        config.base_url = raw.parse().map_err(|_| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
    }

    config.area_code = profile
        .area_code
        .clone()
        .unwrap_or_else(|| defaults.area_code.clone());
    if config.area_code.is_empty() || !config.area_code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::Validation {
            field: "area_code".into(),
            reason: format!("expected digits, got '{}'", config.area_code),
        });
    }

    config.credentials = match resolve_credentials(profile, profile_name) {
        Ok(credentials) => Some(credentials),
        Err(ConfigError::NoCredentials { .. }) => None,
        Err(e) => return Err(e),
    };

    if let Some(ref ca_path) = profile.ca_cert {
        config.tls = TlsVerification::CustomCa(ca_path.clone());
    }

    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    config.token_cache = TokenCache::File(
        profile
            .cache_file
            .clone()
            .unwrap_or_else(|| token_cache_path(profile_name)),
    );

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg.default_profile_name(), "default");
        assert_eq!(cfg.defaults.timeout, 30);
        assert_eq!(cfg.defaults.area_code, "31");
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn profiles_are_read_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "config.toml",
            r#"
default_profile = "garden"

[defaults]
timeout = 10

[profiles.garden]
email = "grower@example.com"
password = "hunter2"
cache_file = "/tmp/garden.json"
"#,
        );

        let cfg = load_config_from(&path).unwrap();

        assert_eq!(cfg.default_profile_name(), "garden");
        assert_eq!(cfg.defaults.timeout, 10);
        let garden = cfg.profile("garden").unwrap();
        assert_eq!(garden.email.as_deref(), Some("grower@example.com"));
        assert!(matches!(
            cfg.profile("other"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn standalone_yaml_profile_needs_only_email_and_password() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "account.yaml",
            "email: grower@example.com\npassword: hunter2\n",
        );

        let profile = load_profile_file(&path).unwrap();
        let credentials = resolve_credentials(&profile, "account-yaml-test").unwrap();

        assert_eq!(credentials.email, "grower@example.com");
    }

    #[test]
    fn missing_profile_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_profile_file(&dir.path().join("nope.yaml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn homgar_config_uses_profile_overrides() {
        let profile = Profile {
            email: Some("grower@example.com".into()),
            password: Some("hunter2".into()),
            base_url: Some("http://127.0.0.1:9000".into()),
            cache_file: Some(PathBuf::from("/tmp/token.json")),
            timeout: Some(5),
            area_code: Some("1".into()),
            ..Profile::default()
        };

        let config = profile_to_homgar_config(&profile, "override-test", &Defaults::default()).unwrap();

        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.area_code, "1");
        assert_eq!(config.token_cache, TokenCache::File(PathBuf::from("/tmp/token.json")));
        assert!(config.credentials.is_some());
    }

    #[test]
    fn default_cache_path_is_per_profile() {
        let config =
            profile_to_homgar_config(&Profile::default(), "cache-path-test", &Defaults::default())
                .unwrap();

        let TokenCache::File(path) = config.token_cache else {
            panic!("expected file cache");
        };
        assert!(path.ends_with("cache-path-test.token.json"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let profile = Profile {
            base_url: Some("not a url".into()),
            ..Profile::default()
        };

        let result = profile_to_homgar_config(&profile, "bad-url-test", &Defaults::default());

        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "base_url"
        ));
    }

    #[test]
    fn invalid_area_code_is_rejected() {
        let profile = Profile {
            area_code: Some("+31".into()),
            ..Profile::default()
        };

        let result = profile_to_homgar_config(&profile, "bad-area-test", &Defaults::default());

        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "area_code"
        ));
    }

    #[test]
    fn saved_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "garden".into(),
            Profile {
                email: Some("grower@example.com".into()),
                ..Profile::default()
            },
        );

        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(
            loaded.profile("garden").unwrap().email.as_deref(),
            Some("grower@example.com")
        );
    }
}

//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use homgar_config::ConfigError;
use homgar_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the HomGar cloud at {url}")]
    #[diagnostic(
        code(homgar::connection_failed),
        help(
            "Check your network connection.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(homgar::auth_failed),
        help(
            "Verify the account e-mail and password.\n\
             Run: homgar login --remember"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(homgar::no_credentials),
        help(
            "Set HOMGAR_EMAIL and HOMGAR_PASSWORD, pass --config with an account file,\n\
             or run: homgar login --email <EMAIL> --remember"
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(homgar::not_found),
        help("Run: homgar {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("HomGar API error ({code}): {message}")]
    #[diagnostic(code(homgar::api_error))]
    ApiError { code: i64, message: String },

    #[error("HomGar cloud returned HTTP {status}")]
    #[diagnostic(
        code(homgar::http_error),
        help(
            "The service may be down or the base URL may be wrong.\n\
             Response: {message}"
        )
    )]
    HttpError { status: u16, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(homgar::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(homgar::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Add one to: {path}"
        )
    )]
    ProfileNotFound {
        name: String,
        available: String,
        path: String,
    },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(homgar::config))]
    Config { message: String },

    #[error("Keyring error: {message}")]
    #[diagnostic(
        code(homgar::keyring),
        help("Use HOMGAR_PASSWORD or password_env when no system keyring is available.")
    )]
    Keyring { message: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(homgar::timeout),
        help("Increase timeout with --timeout or try again later.")
    )]
    Timeout { seconds: u64 },

    // ── Internal / IO ────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(homgar::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{}s", entity_type.to_lowercase()),
                resource_type: entity_type,
                identifier,
            },

            CoreError::Api { code, message } => CliError::ApiError { code, message },

            CoreError::Http { status, message } => CliError::HttpError { status, message },

            CoreError::Config { message } => CliError::Config { message },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: String::new(),
                path: homgar_config::config_path().display().to_string(),
            },
            ConfigError::Keyring(e) => CliError::Keyring {
                message: e.to_string(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_exit_with_auth_code() {
        let err = CliError::from(CoreError::AuthenticationFailed {
            message: "token rejected".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn core_not_found_suggests_list_command() {
        let err = CliError::from(CoreError::NotFound {
            entity_type: "Home".into(),
            identifier: "42".into(),
        });
        match &err {
            CliError::NotFound { list_command, .. } => assert_eq!(list_command, "homes"),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }

    #[test]
    fn vendor_errors_keep_their_code() {
        let err = CliError::from(CoreError::Api {
            code: 3002,
            message: "device offline".into(),
        });
        assert!(err.to_string().contains("3002"));
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn http_error_pages_are_reported_with_their_status() {
        let err = CliError::from(CoreError::Http {
            status: 503,
            message: "<html>maintenance</html>".into(),
        });
        assert_eq!(err.to_string(), "HomGar cloud returned HTTP 503");
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn missing_credentials_exit_with_auth_code() {
        let err = CliError::from(ConfigError::NoCredentials {
            profile: "default".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn config_validation_is_a_usage_error() {
        let err = CliError::from(ConfigError::Validation {
            field: "area_code".into(),
            reason: "expected digits".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}

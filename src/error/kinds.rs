use std::{fmt, io};

/// Crate-wide `Result` type using [`ShellError`] as the error.
pub type Result<T> = std::result::Result<T, ShellError>;

/// Top-level error type for shell operations.
#[derive(Debug)]
pub enum ShellError {
    /// Configuration errors.
    Config(ConfigError),

    /// API client errors.
    Api(ApiError),

    /// I/O errors.
    Io(io::Error),

    /// Line editor errors.
    Readline(String),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be parsed.
    InvalidFormat(String),

    /// Config could not be serialized.
    SerializeFailed(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Unsupported shell for completion script generation.
    UnsupportedShell(String),
}

/// API client errors.
///
/// These never reach the user during completion; the lookup layer
/// swallows them and serves fallback data instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No credentials are configured for the session.
    NotAuthenticated,

    /// The server answered with a non-success response.
    RequestFailed { path: String, reason: String },

    /// The response body did not have the expected shape.
    InvalidResponse(String),

    /// The requested resource type is unknown to the registry.
    UnknownResourceType(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Config(e) => write!(f, "Configuration error: {e}"),
            ShellError::Api(e) => write!(f, "API error: {e}"),
            ShellError::Io(e) => write!(f, "I/O error: {e}"),
            ShellError::Readline(msg) => write!(f, "Read error: {msg}"),
            ShellError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::SerializeFailed(msg) => write!(f, "Failed to serialize config: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::UnsupportedShell(shell) => {
                write!(
                    f,
                    "Unsupported shell: {shell}. Supported shells: bash, zsh, fish, powershell, elvish"
                )
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotAuthenticated => write!(f, "Not authenticated"),
            ApiError::RequestFailed { path, reason } => {
                write!(f, "Request to {path} failed: {reason}")
            }
            ApiError::InvalidResponse(msg) => write!(f, "Invalid response: {msg}"),
            ApiError::UnknownResourceType(name) => write!(f, "Unknown resource type: {name}"),
        }
    }
}

impl std::error::Error for ShellError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for ApiError {}

/* ========================= Conversions to ShellError ========================= */

impl From<io::Error> for ShellError {
    fn from(err: io::Error) -> Self {
        ShellError::Io(err)
    }
}

impl From<ConfigError> for ShellError {
    fn from(err: ConfigError) -> Self {
        ShellError::Config(err)
    }
}

impl From<ApiError> for ShellError {
    fn from(err: ApiError) -> Self {
        ShellError::Api(err)
    }
}

impl From<toml::de::Error> for ShellError {
    fn from(err: toml::de::Error) -> Self {
        ShellError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<serde_json::Error> for ShellError {
    fn from(err: serde_json::Error) -> Self {
        ShellError::Api(ApiError::InvalidResponse(err.to_string()))
    }
}

impl From<String> for ShellError {
    fn from(msg: String) -> Self {
        ShellError::Generic(msg)
    }
}

impl From<&str> for ShellError {
    fn from(msg: &str) -> Self {
        ShellError::Generic(msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_value() {
        let err = ShellError::Config(ConfigError::InvalidValue {
            field: "history.max_size".to_string(),
            value: "0".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid value '0' for field 'history.max_size'"
        );
    }

    #[test]
    fn test_api_error_conversion() {
        let err: ShellError = ApiError::NotAuthenticated.into();
        assert!(matches!(err, ShellError::Api(ApiError::NotAuthenticated)));
        assert_eq!(err.to_string(), "API error: Not authenticated");
    }

    #[test]
    fn test_toml_error_is_config_error() {
        let parse: std::result::Result<toml::Value, _> = toml::from_str("= broken");
        let err: ShellError = parse.unwrap_err().into();
        assert!(matches!(err, ShellError::Config(ConfigError::InvalidFormat(_))));
    }
}

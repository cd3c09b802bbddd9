use std::{fmt, io};

use crate::error::server::ServerErrorInfo;

/// Crate-wide `Result` type using [`ExportError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Top-level error type for export runs.
///
/// Every variant is fatal: the run aborts and the operator re-runs it.
/// Field type mismatches inside a hit are not represented here because
/// the normalizer skips them silently.
#[derive(Debug)]
pub enum ExportError {
    /// Configuration errors, raised before any network activity.
    Config(ConfigError),

    /// Failures opening or advancing the scroll cursor.
    Transport(TransportError),

    /// A hit carried a field projection or source that could not be decoded.
    Decode(DecodeError),

    /// I/O errors while writing output.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Missing required field.
    MissingField(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/// Transport-specific errors.
#[derive(Debug)]
pub enum TransportError {
    /// The HTTP request could not be sent or its body could not be read.
    RequestFailed(String),

    /// The cluster answered with a non-success status.
    Server { status: u16, info: ServerErrorInfo },

    /// The response envelope could not be decoded.
    InvalidResponse(String),
}

/// Hit decoding errors.
#[derive(Debug)]
pub enum DecodeError {
    /// The `fields` projection of a hit is not a map of arrays.
    InvalidFields { hit: String, reason: String },

    /// The `_source` of a hit does not match the article shape.
    InvalidSource { hit: String, reason: String },

    /// Full-document mode was requested but the hit has no `_source`.
    MissingSource { hit: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Config(e) => write!(f, "Configuration error: {e}"),
            ExportError::Transport(e) => write!(f, "Transport error: {e}"),
            ExportError::Decode(e) => write!(f, "Decode error: {e}"),
            ExportError::Io(e) => write!(f, "I/O error: {e}"),
            ExportError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::MissingField(field) => write!(f, "Missing required field: {field}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::RequestFailed(msg) => write!(f, "Request failed: {msg}"),
            TransportError::Server { status, info } => {
                write!(f, "Server responded with status {status}")?;
                crate::error::server::format_server_error(f, info)
            }
            TransportError::InvalidResponse(msg) => write!(f, "Invalid response: {msg}"),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidFields { hit, reason } => {
                write!(f, "Invalid fields in hit '{hit}': {reason}")
            }
            DecodeError::InvalidSource { hit, reason } => {
                write!(f, "Invalid source in hit '{hit}': {reason}")
            }
            DecodeError::MissingSource { hit } => write!(f, "Hit '{hit}' has no _source"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for ConfigError {}
impl std::error::Error for TransportError {}
impl std::error::Error for DecodeError {}

/* ========================= Conversions to ExportError ========================= */

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<reqwest::Error> for ExportError {
    fn from(err: reqwest::Error) -> Self {
        ExportError::Transport(TransportError::RequestFailed(err.to_string()))
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Transport(TransportError::InvalidResponse(err.to_string()))
    }
}

impl From<toml::de::Error> for ExportError {
    fn from(err: toml::de::Error) -> Self {
        ExportError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<ConfigError> for ExportError {
    fn from(err: ConfigError) -> Self {
        ExportError::Config(err)
    }
}

impl From<TransportError> for ExportError {
    fn from(err: TransportError) -> Self {
        ExportError::Transport(err)
    }
}

impl From<DecodeError> for ExportError {
    fn from(err: DecodeError) -> Self {
        ExportError::Decode(err)
    }
}

impl From<String> for ExportError {
    fn from(msg: String) -> Self {
        ExportError::Generic(msg)
    }
}

impl From<&str> for ExportError {
    fn from(msg: &str) -> Self {
        ExportError::Generic(msg.to_owned())
    }
}

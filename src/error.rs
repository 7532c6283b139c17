//! Error types for decoding and encoding.
//!
//! The decode taxonomy distinguishes an unrecognized scheme from a payload
//! that is structurally broken, so callers can report the two differently:
//! - **UnsupportedScheme**: the URI scheme (or outbound/proxy `type`) is not
//!   one of the supported protocols.
//! - **InvalidFormat**: malformed link structure (e.g. missing `:` in a
//!   `method:password` pair).
//! - **Base64** / **Json** / **Yaml** / **PercentEncoding**: the wrapped
//!   payload failed to decode.

use std::fmt;

/// Result type for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Errors that can occur while decoding a share link or subscription payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Unknown or unsupported URI scheme / proxy type.
    UnsupportedScheme(String),
    /// Malformed link structure (missing separators, wrong shape).
    InvalidFormat(String),
    /// Base64 decoding failed for every accepted alphabet.
    Base64(String),
    /// JSON body or container failed to parse.
    Json(String),
    /// YAML container failed to parse.
    Yaml(String),
    /// Percent-encoded component failed to decode.
    PercentEncoding(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnsupportedScheme(msg) => write!(f, "unsupported scheme: {}", msg),
            DecodeError::InvalidFormat(msg) => write!(f, "invalid format: {}", msg),
            DecodeError::Base64(msg) => write!(f, "base64 decode error: {}", msg),
            DecodeError::Json(msg) => write!(f, "json parse error: {}", msg),
            DecodeError::Yaml(msg) => write!(f, "yaml parse error: {}", msg),
            DecodeError::PercentEncoding(msg) => write!(f, "percent decode error: {}", msg),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<base64::DecodeError> for DecodeError {
    fn from(err: base64::DecodeError) -> Self {
        DecodeError::Base64(err.to_string())
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for DecodeError {
    fn from(err: serde_yaml::Error) -> Self {
        DecodeError::Yaml(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for DecodeError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        DecodeError::InvalidFormat(format!("invalid utf-8: {}", err))
    }
}

/// Errors that can occur while encoding a profile back to a share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The protocol has no defined share-link form (socks, http).
    NoUriForm(String),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::NoUriForm(kind) => {
                write!(f, "protocol {} has no share-link form", kind)
            }
        }
    }
}

impl std::error::Error for EncodeError {}

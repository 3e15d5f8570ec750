//! Error types for the token engine
//!
//! Startup problems (`ConfigError`) are fatal; per-request problems
//! (`TokenError`) are absorbed by the interceptors and only surface as a
//! rejection reason.

use thiserror::Error;

/// Fatal configuration errors raised while building the signing key.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT secret is required (set felfel.jwt.secret or the FELFEL_JWT_SECRET environment variable)")]
    MissingSecret,

    #[error("JWT secret must be at least {min} characters long, got {actual}")]
    SecretTooShort { min: usize, actual: usize },

    #[error("Failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),
}

/// Invalid token lifetime string such as `"15x"` or `"abc"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifetimeError {
    #[error("Token lifetime is empty")]
    Empty,

    #[error("Token lifetime magnitude is not a number: {0:?}")]
    InvalidMagnitude(String),

    #[error("Token lifetime is too large: {0:?}")]
    Overflow(String),
}

/// Reasons a token was not issued or not accepted.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token subject must not be empty")]
    EmptySubject,

    #[error("Token expired")]
    Expired,

    #[error("Token subject does not match expected user")]
    SubjectMismatch,

    #[error("Invalid token lifetime: {0}")]
    Lifetime(#[from] LifetimeError),

    #[error("Failed to encode token: {0}")]
    Encode(jsonwebtoken::errors::Error),

    #[error("Token decoding failed: {0}")]
    Decode(jsonwebtoken::errors::Error),
}

impl TokenError {
    /// Short, token-free label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::EmptySubject => "empty_subject",
            TokenError::Expired => "expired",
            TokenError::SubjectMismatch => "subject_mismatch",
            TokenError::Lifetime(_) => "invalid_lifetime",
            TokenError::Encode(_) => "encode",
            TokenError::Decode(_) => "decode",
        }
    }
}

//! Settings for the token engine
//!
//! Loads the signing secret from:
//! 1. Settings file (`AUTH_CONFIG_FILE`, default `config/auth.{toml,yaml,json}`),
//!    key `felfel.jwt.secret`, or `jwt.secret`
//! 2. `AUTH__FELFEL__JWT__SECRET` / `AUTH__JWT__SECRET` environment variables
//!    (override the file)
//! 3. `FELFEL_JWT_SECRET`, then `JWT_SECRET` environment variables (fallback)
//!
//! In debug builds a `.env` file is read first.
//!
//! # Example
//!
//! ```no_run
//! use jwt_security::{JwtSettings, TokenEngine};
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = JwtSettings::load()?;
//!     // Aborts startup when the secret is missing or shorter than 32 characters
//!     let engine = TokenEngine::from_settings(&settings)?;
//!     # let _ = engine;
//!     Ok(())
//! }
//! ```

use crate::error::ConfigError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use tracing::{info, warn};
use zeroize::Zeroize;

/// Fallback environment variables holding the secret, in lookup order
pub const SECRET_ENV_VARS: [&str; 2] = ["FELFEL_JWT_SECRET", "JWT_SECRET"];

/// Environment variable naming the settings file
pub const CONFIG_FILE_ENV_VAR: &str = "AUTH_CONFIG_FILE";

const DEFAULT_CONFIG_FILE: &str = "config/auth";
const ENV_PREFIX: &str = "AUTH";

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(default)]
    felfel: RawFelfelSection,
    #[serde(default)]
    jwt: RawJwtSection,
}

#[derive(Debug, Default, Deserialize)]
struct RawFelfelSection {
    #[serde(default)]
    jwt: RawJwtSection,
}

#[derive(Debug, Default, Deserialize)]
struct RawJwtSection {
    secret: Option<String>,
}

/// JWT authentication settings
#[derive(Clone, Default)]
pub struct JwtSettings {
    secret: Option<String>,
}

impl JwtSettings {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(secret.into()),
        }
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    /// Load settings from the default sources.
    pub fn load() -> Result<Self> {
        if cfg!(debug_assertions) && dotenvy::dotenv().is_ok() {
            info!("Loaded .env file for development");
        }

        let file = env::var(CONFIG_FILE_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&file).with_context(|| format!("Failed to load auth settings from {file}"))
    }

    /// Load settings using `file` as the (optional) settings file.
    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings = Config::builder()
            .add_source(File::with_name(file).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        let from_settings = [raw.felfel.jwt.secret, raw.jwt.secret]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty());
        if let Some(secret) = from_settings {
            info!(source = "settings", "JWT secret configured");
            return Ok(Self {
                secret: Some(secret),
            });
        }

        for var in SECRET_ENV_VARS {
            if let Ok(secret) = env::var(var) {
                if !secret.is_empty() {
                    info!(source = var, "JWT secret configured");
                    return Ok(Self {
                        secret: Some(secret),
                    });
                }
            }
        }

        warn!("No JWT secret configured");
        Ok(Self { secret: None })
    }
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Drop for JwtSettings {
    fn drop(&mut self) {
        if let Some(secret) = self.secret.as_mut() {
            secret.zeroize();
        }
    }
}

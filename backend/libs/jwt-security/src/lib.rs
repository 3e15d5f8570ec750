//! Stateless JWT authentication core
//!
//! Issues signed bearer tokens, verifies them and resolves them into a
//! [`Principal`]. There is no session store: everything a request needs is in
//! the token, checked against one process-wide HMAC key.
//!
//! **Components**:
//! - `signing_key`: secret → HMAC key, fatal length check at startup
//! - `engine`: token creation, verification and claim extraction
//! - `bearer`: `Authorization: Bearer` resolution shared by all interceptors
//! - `principal`: identity + authorities published into request context
//! - `config`: secret loading from settings file / environment
//!
//! Interceptors live in separate crates (`jwt-filter` for thread-per-request
//! servers, `jwt-propagation` for async tower stacks); both depend only on
//! [`BearerAuthenticator`], never the other way round.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

pub mod bearer;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifetime;
pub mod principal;
pub mod signing_key;

pub use bearer::{bearer_token, AuthOutcome, BearerAuthenticator, BEARER_PREFIX};
pub use config::{JwtSettings, SECRET_ENV_VARS};
pub use engine::{TokenClaims, TokenEngine};
pub use error::{ConfigError, LifetimeError, TokenError};
pub use lifetime::{parse_lifetime, TokenLifetime};
pub use principal::{GrantedAuthority, Principal};
pub use signing_key::{generate_secret, SecretStrength, SigningKey, MIN_SECRET_LENGTH};

/// Load settings and build the process-wide token engine.
///
/// Call once during startup and hand the returned `Arc` to whichever
/// interceptor the server installs. An error here must abort startup.
pub fn init_token_engine() -> Result<Arc<TokenEngine>> {
    let settings = JwtSettings::load()?;
    let engine = TokenEngine::from_settings(&settings)
        .context("JWT secret is required and must be at least 32 characters long")?;

    info!(
        algorithm = ?engine.signing_key().algorithm(),
        "Token engine ready"
    );

    Ok(Arc::new(engine))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE_ENV_VAR;
    use serial_test::serial;
    use std::env;

    fn isolate_env() {
        env::set_var(CONFIG_FILE_ENV_VAR, "does/not/exist/auth");
        for var in SECRET_ENV_VARS {
            env::remove_var(var);
        }
        env::remove_var("AUTH__JWT__SECRET");
        env::remove_var("AUTH__FELFEL__JWT__SECRET");
    }

    #[test]
    #[serial]
    fn test_init_without_secret_fails() {
        isolate_env();

        let err = init_token_engine().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingSecret)
        ));

        env::remove_var(CONFIG_FILE_ENV_VAR);
    }

    #[test]
    #[serial]
    fn test_init_with_short_secret_fails() {
        isolate_env();
        env::set_var("FELFEL_JWT_SECRET", "sixteen-chars-xx");

        let err = init_token_engine().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::SecretTooShort { actual: 16, .. })
        ));

        env::remove_var("FELFEL_JWT_SECRET");
        env::remove_var(CONFIG_FILE_ENV_VAR);
    }

    #[test]
    #[serial]
    fn test_init_builds_shared_engine() {
        isolate_env();
        env::set_var("FELFEL_JWT_SECRET", "m".repeat(48));

        let engine = init_token_engine().unwrap();
        let token = engine
            .create_token(&Principal::new("alice", ["USER"]), "15m")
            .unwrap();
        assert!(engine.is_token_valid(&token, "alice"));
        assert_eq!(
            engine.signing_key().algorithm(),
            jsonwebtoken::Algorithm::HS384
        );

        env::remove_var("FELFEL_JWT_SECRET");
        env::remove_var(CONFIG_FILE_ENV_VAR);
    }
}

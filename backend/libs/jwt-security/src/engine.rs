//! Token engine
//!
//! Single source of truth for the token format: creation, verification and
//! claim extraction. The engine holds nothing but the immutable signing key,
//! so one instance is shared (`Arc<TokenEngine>`) by every request thread.
//!
//! ## Token format
//!
//! Compact JWS (`header.payload.signature`) with claims:
//!
//! | Claim   | Meaning                                  |
//! |---------|------------------------------------------|
//! | `sub`   | username, required and non-empty         |
//! | `roles` | ordered authority strings, may be absent |
//! | `iat`   | issued-at, Unix seconds                  |
//! | `exp`   | expiration, Unix seconds (rounded up)    |
//!
//! The signature is always checked before any claim is read. A token whose
//! `exp` equals the current second is already expired.
//!
//! ## Usage
//!
//! ```rust
//! use jwt_security::{Principal, TokenEngine};
//!
//! let engine = TokenEngine::from_secret("an-example-secret-of-32-characters!").unwrap();
//! let alice = Principal::new("alice", ["ADMIN", "USER"]);
//!
//! let token = engine.create_token(&alice, "15m").unwrap();
//! assert!(engine.is_token_valid(&token, "alice"));
//! assert_eq!(engine.extract_roles(&token).unwrap(), vec!["ADMIN", "USER"]);
//! ```

use crate::config::JwtSettings;
use crate::error::{ConfigError, LifetimeError, TokenError};
use crate::lifetime::TokenLifetime;
use crate::principal::Principal;
use crate::signing_key::SigningKey;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Header, Validation};
use serde::{Deserialize, Deserializer, Serialize};

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (username)
    pub sub: String,
    /// Authorities in grant order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub roles: Vec<String>,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl TokenClaims {
    /// `exp` strictly after `now`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.exp > now.timestamp()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Creates and verifies signed bearer tokens.
pub struct TokenEngine {
    key: SigningKey,
    validation: Validation,
}

impl TokenEngine {
    pub fn new(key: SigningKey) -> Self {
        let mut validation = Validation::new(key.algorithm());
        // Expiry is compared without leeway in `is_live_at`
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self { key, validation }
    }

    /// Build an engine straight from a secret string.
    ///
    /// Fails with [`ConfigError::SecretTooShort`] for secrets under 32
    /// characters; callers are expected to abort startup on error.
    pub fn from_secret(secret: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(SigningKey::from_secret(secret)?))
    }

    /// Build an engine from loaded settings.
    pub fn from_settings(settings: &JwtSettings) -> Result<Self, ConfigError> {
        let secret = settings.secret().ok_or(ConfigError::MissingSecret)?;
        Self::from_secret(secret)
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.key
    }

    /// Issue a token for `principal` that lives for `lifetime`
    /// (`"15m"`, `"24h"`, `"7d"`, or bare seconds).
    pub fn create_token(&self, principal: &Principal, lifetime: &str) -> Result<String, TokenError> {
        let lifetime: TokenLifetime = lifetime.parse()?;
        self.issue(principal, lifetime, Utc::now())
    }

    /// Issue a token with an explicit issue instant.
    pub fn issue(
        &self,
        principal: &Principal,
        lifetime: TokenLifetime,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if principal.username.is_empty() {
            return Err(TokenError::EmptySubject);
        }

        let expires_at = issued_at
            .checked_add_signed(lifetime.as_duration())
            .ok_or_else(|| TokenError::Lifetime(LifetimeError::Overflow(lifetime.to_string())))?;

        let claims = TokenClaims {
            sub: principal.username.clone(),
            roles: principal.authority_names(),
            iat: issued_at.timestamp(),
            exp: expiry_seconds(lifetime, expires_at),
        };

        encode(&Header::new(self.key.algorithm()), &claims, self.key.encoding())
            .map_err(TokenError::Encode)
    }

    /// Verify signature and structure and return the claims.
    ///
    /// Expiry is not checked here; see [`TokenEngine::validate`].
    pub fn claims(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, self.key.decoding(), &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Decode)
    }

    pub fn extract_username(&self, token: &str) -> Result<String, TokenError> {
        self.claims(token).map(|claims| claims.sub)
    }

    /// Roles in token order; a token without a `roles` claim yields `[]`.
    pub fn extract_roles(&self, token: &str) -> Result<Vec<String>, TokenError> {
        self.claims(token).map(|claims| claims.roles)
    }

    /// Full check: signature, non-empty subject and `exp > now`.
    pub fn validate(&self, token: &str) -> Result<Principal, TokenError> {
        let claims = self.claims(token)?;

        if claims.sub.is_empty() {
            return Err(TokenError::EmptySubject);
        }
        if !claims.is_live_at(Utc::now()) {
            return Err(TokenError::Expired);
        }

        Ok(Principal::new(claims.sub, claims.roles))
    }

    /// Like [`TokenEngine::validate`], additionally requiring the subject to
    /// equal `expected_username` exactly.
    pub fn validate_for(&self, token: &str, expected_username: &str) -> Result<Principal, TokenError> {
        let principal = self.validate(token)?;
        if principal.username != expected_username {
            return Err(TokenError::SubjectMismatch);
        }
        Ok(principal)
    }

    /// `true` iff the token verifies, belongs to `expected_username`
    /// (case-sensitive) and has not expired. Never panics.
    pub fn is_token_valid(&self, token: &str, expected_username: &str) -> bool {
        self.validate_for(token, expected_username).is_ok()
    }
}

/// `exp` in whole seconds, rounded up for non-zero lifetimes so a token is
/// never shorter-lived than requested. A zero lifetime stays at the issue
/// second and is expired on arrival.
fn expiry_seconds(lifetime: TokenLifetime, expires_at: DateTime<Utc>) -> i64 {
    if lifetime.as_millis() > 0 && expires_at.timestamp_subsec_nanos() > 0 {
        expires_at.timestamp() + 1
    } else {
        expires_at.timestamp()
    }
}

impl std::fmt::Debug for TokenEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEngine").field("key", &self.key).finish()
    }
}

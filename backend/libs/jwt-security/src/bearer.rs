//! Bearer credential resolution shared by both interceptors
//!
//! The interceptors differ only in where they publish the principal. Reading
//! the header, decoding the token and classifying the result lives here so
//! both apply exactly the same rules.

use crate::engine::TokenEngine;
use crate::error::TokenError;
use crate::principal::Principal;
use http::header::AUTHORIZATION;
use http::HeaderMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Case-sensitive scheme prefix, one space separator.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Result of inspecting a request's credentials.
///
/// Only `Authenticated` changes request context; `NoCredential` and
/// `Rejected` both leave the request anonymous but stay distinguishable
/// for tests and logs.
#[derive(Debug)]
pub enum AuthOutcome {
    /// No `Authorization` header, or not a bearer credential
    NoCredential,
    /// A bearer token was presented but did not prove an identity
    Rejected(TokenError),
    Authenticated(Principal),
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated(_))
    }

    pub fn principal(self) -> Option<Principal> {
        match self {
            AuthOutcome::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AuthOutcome::NoCredential => "no_credential",
            AuthOutcome::Rejected(_) => "rejected",
            AuthOutcome::Authenticated(_) => "authenticated",
        }
    }
}

/// Raw token from `Authorization: Bearer <token>`, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
}

/// Token engine plus the header rules, cheap to clone into each pipeline.
#[derive(Clone, Debug)]
pub struct BearerAuthenticator {
    engine: Arc<TokenEngine>,
}

impl BearerAuthenticator {
    pub fn new(engine: Arc<TokenEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &TokenEngine {
        &self.engine
    }

    /// Subject of a verified token; an empty subject counts as no identity.
    pub fn identify(&self, token: &str) -> Result<String, TokenError> {
        let username = self.engine.extract_username(token)?;
        if username.is_empty() {
            return Err(TokenError::EmptySubject);
        }
        Ok(username)
    }

    /// Check the token is valid for `username` and build its principal.
    pub fn confirm(&self, token: &str, username: &str) -> Result<Principal, TokenError> {
        self.engine.validate_for(token, username)
    }

    /// Resolve a bearer token end to end.
    pub fn authenticate_token(&self, token: &str) -> AuthOutcome {
        let result = self
            .identify(token)
            .and_then(|username| self.confirm(token, &username));

        match result {
            Ok(principal) => AuthOutcome::Authenticated(principal),
            Err(err) => {
                debug!(reason = err.kind(), "Bearer credential rejected");
                AuthOutcome::Rejected(err)
            }
        }
    }

    /// Resolve the request's `Authorization` header end to end.
    pub fn authenticate(&self, headers: &HeaderMap) -> AuthOutcome {
        match bearer_token(headers) {
            Some(token) => self.authenticate_token(token),
            None => {
                trace!("No bearer credential presented");
                AuthOutcome::NoCredential
            }
        }
    }
}

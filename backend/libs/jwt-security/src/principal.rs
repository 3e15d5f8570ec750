//! Principal and authority model
//!
//! The identity a valid token proves. Both interceptors publish this value;
//! downstream authorization reads it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single permission grant, e.g. `"ADMIN"` or `"ROLE_USER"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantedAuthority(String);

impl GrantedAuthority {
    pub fn new(authority: impl Into<String>) -> Self {
        Self(authority.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GrantedAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for GrantedAuthority {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for GrantedAuthority {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Authenticated identity: username plus ordered authorities.
///
/// Fields are public for direct access; the value is cloned into whichever
/// context the active pipeline uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub username: String,
    pub authorities: Vec<GrantedAuthority>,
}

impl Principal {
    pub fn new<I, A>(username: impl Into<String>, authorities: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<GrantedAuthority>,
    {
        Self {
            username: username.into(),
            authorities: authorities.into_iter().map(Into::into).collect(),
        }
    }

    /// Authorities as plain strings, in token order.
    pub fn authority_names(&self) -> Vec<String> {
        self.authorities
            .iter()
            .map(|a| a.as_str().to_string())
            .collect()
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a.as_str() == authority)
    }

    pub fn has_any_authority(&self, authorities: &[&str]) -> bool {
        authorities.iter().any(|a| self.has_authority(a))
    }
}

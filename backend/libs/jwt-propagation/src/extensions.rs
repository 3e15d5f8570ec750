//! Request extension trait for principal access
//!
//! Handlers that hold the request can read the principal stored by
//! [`JwtAuthLayer`](crate::JwtAuthLayer) directly from its extensions.

use jwt_security::Principal;
use thiserror::Error;

/// No principal was attached to the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Request is not authenticated")]
pub struct Unauthenticated;

/// Principal accessors for `http::Request<B>`.
///
/// ## Usage
///
/// ```rust
/// use jwt_propagation::PrincipalExt;
/// use jwt_security::Principal;
///
/// let mut request = http::Request::new(());
/// assert!(request.principal().is_none());
///
/// request.extensions_mut().insert(Principal::new("alice", ["USER"]));
/// assert_eq!(request.require_principal().unwrap().username, "alice");
/// ```
pub trait PrincipalExt {
    fn principal(&self) -> Option<&Principal>;

    /// Principal or [`Unauthenticated`], for handlers that need one.
    fn require_principal(&self) -> Result<&Principal, Unauthenticated> {
        self.principal().ok_or(Unauthenticated)
    }

    fn is_authenticated(&self) -> bool {
        self.principal().is_some()
    }
}

impl<B> PrincipalExt for http::Request<B> {
    fn principal(&self) -> Option<&Principal> {
        self.extensions().get::<Principal>()
    }
}

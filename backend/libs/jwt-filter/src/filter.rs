//! Blocking JWT filter
//!
//! Runs once per request on the request's own thread:
//! 1. Read `Authorization` and strip the `Bearer ` prefix
//! 2. Extract the username from the verified token
//! 3. Leave an already-authenticated thread context alone (first wins)
//! 4. Validate the token for that username and publish the principal
//! 5. Invoke the rest of the chain exactly once
//!
//! Every failure leaves the request anonymous.

use crate::context::SecurityContextHolder;
use http::{HeaderMap, Request};
use jwt_security::{bearer_token, BearerAuthenticator, Principal, TokenError};
use tracing::{debug, trace};

/// The remainder of a request pipeline.
///
/// Taken by value, so a filter can call it at most once; every filter in
/// this crate calls it exactly once.
pub trait FilterChain<B> {
    type Output;

    fn proceed(self, request: Request<B>) -> Self::Output;
}

impl<B, O, F> FilterChain<B> for F
where
    F: FnOnce(Request<B>) -> O,
{
    type Output = O;

    fn proceed(self, request: Request<B>) -> O {
        self(request)
    }
}

/// One stage of a thread-per-request pipeline.
pub trait Filter {
    fn do_filter<B, C>(&self, request: Request<B>, chain: C) -> C::Output
    where
        C: FilterChain<B>;
}

/// What the filter did for a request.
#[derive(Debug)]
pub enum FilterOutcome {
    /// No bearer credential presented
    NoCredential,
    /// Credential presented but not accepted
    Rejected(TokenError),
    /// An earlier stage had already authenticated this thread
    AlreadyAuthenticated,
    /// Principal published into the thread context
    Authenticated(Principal),
}

/// Authentication state for one request on the current thread.
///
/// Clears the thread context on drop if, and only if, this filter put the
/// principal there, so pooled threads start the next request anonymous.
#[must_use = "dropping this clears the published principal"]
pub struct RequestAuthentication {
    outcome: FilterOutcome,
    published: bool,
}

impl RequestAuthentication {
    pub fn outcome(&self) -> &FilterOutcome {
        &self.outcome
    }

    fn anonymous(outcome: FilterOutcome) -> Self {
        Self {
            outcome,
            published: false,
        }
    }
}

impl Drop for RequestAuthentication {
    fn drop(&mut self) {
        if self.published {
            SecurityContextHolder::clear();
        }
    }
}

/// Thread-scoped JWT authentication filter.
#[derive(Clone, Debug)]
pub struct JwtFilter {
    authenticator: BearerAuthenticator,
}

impl JwtFilter {
    pub fn new(authenticator: BearerAuthenticator) -> Self {
        Self { authenticator }
    }

    /// Authenticate the current thread from `headers`.
    ///
    /// Keep the returned value alive for as long as the request runs.
    pub fn authenticate(&self, headers: &HeaderMap) -> RequestAuthentication {
        let Some(token) = bearer_token(headers) else {
            trace!("No bearer credential, continuing unauthenticated");
            return RequestAuthentication::anonymous(FilterOutcome::NoCredential);
        };

        let username = match self.authenticator.identify(token) {
            Ok(username) => username,
            Err(err) => {
                debug!(reason = err.kind(), "Undecodable bearer token, continuing unauthenticated");
                return RequestAuthentication::anonymous(FilterOutcome::Rejected(err));
            }
        };

        if SecurityContextHolder::is_authenticated() {
            debug!("Security context already populated, keeping existing principal");
            return RequestAuthentication::anonymous(FilterOutcome::AlreadyAuthenticated);
        }

        match self.authenticator.confirm(token, &username) {
            Ok(principal) => {
                debug!(
                    username = %principal.username,
                    authorities = principal.authorities.len(),
                    "Request authenticated"
                );
                SecurityContextHolder::set_authentication(principal.clone());
                RequestAuthentication {
                    outcome: FilterOutcome::Authenticated(principal),
                    published: true,
                }
            }
            Err(err) => {
                debug!(reason = err.kind(), "Bearer token not valid, continuing unauthenticated");
                RequestAuthentication::anonymous(FilterOutcome::Rejected(err))
            }
        }
    }
}

impl Filter for JwtFilter {
    fn do_filter<B, C>(&self, request: Request<B>, chain: C) -> C::Output
    where
        C: FilterChain<B>,
    {
        let _authentication = self.authenticate(request.headers());
        chain.proceed(request)
    }
}

//! Tower layer that authenticates requests from bearer tokens
//!
//! For each request:
//! 1. If a [`Principal`] is already present, either in the request extensions
//!    or in the caller's task-local scope, keep it (first wins) and make sure
//!    both carry it
//! 2. Otherwise resolve `Authorization: Bearer <token>` through the token
//!    engine; on success, insert the principal into the request extensions
//!    and poll the inner service's future inside a task-local scope
//! 3. On any failure, call the inner service untouched
//!
//! The layer never fails a request and never suspends: token checks are
//! in-memory HMAC and clock comparisons done inline in `call`.

use crate::context::{current_principal, scope_principal};
use futures::future::Either;
use http::Request;
use jwt_security::{AuthOutcome, BearerAuthenticator, Principal};
use std::task::{Context, Poll};
use tokio::task::futures::TaskLocalFuture;
use tower::{Layer, Service};
use tracing::{debug, trace};

/// Layer producing [`JwtAuthService`].
#[derive(Clone, Debug)]
pub struct JwtAuthLayer {
    authenticator: BearerAuthenticator,
}

impl JwtAuthLayer {
    pub fn new(authenticator: BearerAuthenticator) -> Self {
        Self { authenticator }
    }
}

impl<S> Layer<S> for JwtAuthLayer {
    type Service = JwtAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        JwtAuthService {
            inner,
            authenticator: self.authenticator.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct JwtAuthService<S> {
    inner: S,
    authenticator: BearerAuthenticator,
}

impl<S> JwtAuthService<S> {
    pub fn new(inner: S, authenticator: BearerAuthenticator) -> Self {
        Self {
            inner,
            authenticator,
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, B> Service<Request<B>> for JwtAuthService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Either<TaskLocalFuture<Principal, S::Future>, S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let existing = req
            .extensions()
            .get::<Principal>()
            .cloned()
            .or_else(current_principal);
        if let Some(principal) = existing {
            trace!(username = %principal.username, "Request already authenticated, keeping principal");
            req.extensions_mut().insert(principal.clone());
            return Either::Left(scope_principal(principal, self.inner.call(req)));
        }

        match self.authenticator.authenticate(req.headers()) {
            AuthOutcome::Authenticated(principal) => {
                debug!(
                    username = %principal.username,
                    authorities = principal.authorities.len(),
                    "Request authenticated"
                );
                req.extensions_mut().insert(principal.clone());
                Either::Left(scope_principal(principal, self.inner.call(req)))
            }
            outcome => {
                trace!(outcome = outcome.kind(), "Continuing unauthenticated");
                Either::Right(self.inner.call(req))
            }
        }
    }
}
